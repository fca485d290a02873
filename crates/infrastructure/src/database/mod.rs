use std::sync::Arc;

use courier_core::{CourierError, CourierResult};
use courier_domain::repositories::{ContactRepository, MessageRepository};

pub mod postgres;
pub mod sqlite;

use postgres::{PostgresContactRepository, PostgresMessageRepository};
use sqlite::{SqliteContactRepository, SqliteMessageRepository};

/// Database type detection
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            DatabaseType::PostgreSQL
        } else {
            DatabaseType::SQLite
        }
    }
}

/// Database connection pool enum
pub enum DatabasePool {
    PostgreSQL(sqlx::PgPool),
    SQLite(sqlx::SqlitePool),
}

impl DatabasePool {
    /// Create pool from URL with automatic type detection
    pub async fn new(url: &str, max_connections: u32) -> CourierResult<Self> {
        let db_type = DatabaseType::from_url(url);

        match db_type {
            DatabaseType::PostgreSQL => {
                let pool = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(max_connections)
                    .connect(url)
                    .await
                    .map_err(CourierError::Database)?;
                Ok(DatabasePool::PostgreSQL(pool))
            }
            DatabaseType::SQLite => {
                use sqlx::sqlite::SqliteConnectOptions;
                use std::str::FromStr;

                let connect_options = SqliteConnectOptions::from_str(url)
                    .map_err(CourierError::Database)?
                    .create_if_missing(true);
                let pool = sqlx::sqlite::SqlitePoolOptions::new()
                    .max_connections(max_connections)
                    .connect_with(connect_options)
                    .await
                    .map_err(CourierError::Database)?;
                Ok(DatabasePool::SQLite(pool))
            }
        }
    }

    pub fn database_type(&self) -> DatabaseType {
        match self {
            DatabasePool::PostgreSQL(_) => DatabaseType::PostgreSQL,
            DatabasePool::SQLite(_) => DatabaseType::SQLite,
        }
    }

    /// 初始化两张持久集合：contacts 与 emails
    pub async fn run_migrations(&self) -> CourierResult<()> {
        match self {
            DatabasePool::PostgreSQL(pool) => postgres::run_migrations(pool).await,
            DatabasePool::SQLite(pool) => sqlite::run_migrations(pool).await,
        }
    }

    pub async fn health_check(&self) -> CourierResult<()> {
        match self {
            DatabasePool::PostgreSQL(pool) => {
                sqlx::query("SELECT 1")
                    .execute(pool)
                    .await
                    .map_err(CourierError::Database)?;
            }
            DatabasePool::SQLite(pool) => {
                sqlx::query("SELECT 1")
                    .execute(pool)
                    .await
                    .map_err(CourierError::Database)?;
            }
        }
        Ok(())
    }

    pub async fn close(&self) {
        match self {
            DatabasePool::PostgreSQL(pool) => pool.close().await,
            DatabasePool::SQLite(pool) => pool.close().await,
        }
    }

    /// Factory method for contact repository
    pub fn contact_repository(&self) -> Arc<dyn ContactRepository> {
        match self {
            DatabasePool::PostgreSQL(pool) => {
                Arc::new(PostgresContactRepository::new(pool.clone()))
            }
            DatabasePool::SQLite(pool) => Arc::new(SqliteContactRepository::new(pool.clone())),
        }
    }

    /// Factory method for message repository
    pub fn message_repository(&self) -> Arc<dyn MessageRepository> {
        match self {
            DatabasePool::PostgreSQL(pool) => {
                Arc::new(PostgresMessageRepository::new(pool.clone()))
            }
            DatabasePool::SQLite(pool) => Arc::new(SqliteMessageRepository::new(pool.clone())),
        }
    }
}
