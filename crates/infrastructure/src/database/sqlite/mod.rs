use courier_core::{CourierError, CourierResult};
use sqlx::SqlitePool;
use tracing::debug;

mod sqlite_contact_repository;
mod sqlite_message_repository;

pub use sqlite_contact_repository::SqliteContactRepository;
pub use sqlite_message_repository::SqliteMessageRepository;

/// 创建SQLite表结构
///
/// emails 表的幂等键上带唯一索引，insert-if-absent 依赖它保证
/// 并发重复投递时至多插入一行。
pub async fn run_migrations(pool: &SqlitePool) -> CourierResult<()> {
    debug!("Running SQLite database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            age INTEGER NOT NULL DEFAULT 0
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(CourierError::Database)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS emails (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            to_address TEXT NOT NULL,
            sender TEXT NOT NULL,
            subject TEXT NOT NULL,
            body TEXT,
            idempotency_key TEXT,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(CourierError::Database)?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_emails_idempotency_key
         ON emails(idempotency_key)",
    )
    .execute(pool)
    .await
    .map_err(CourierError::Database)?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_emails_to_address ON emails(to_address)")
        .execute(pool)
        .await
        .map_err(CourierError::Database)?;

    debug!("SQLite migrations complete");
    Ok(())
}
