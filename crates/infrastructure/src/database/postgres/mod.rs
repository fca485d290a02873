use courier_core::{CourierError, CourierResult};
use sqlx::PgPool;
use tracing::debug;

mod postgres_contact_repository;
mod postgres_message_repository;

pub use postgres_contact_repository::PostgresContactRepository;
pub use postgres_message_repository::PostgresMessageRepository;

/// 创建PostgreSQL表结构，与SQLite版本语义一致
pub async fn run_migrations(pool: &PgPool) -> CourierResult<()> {
    debug!("Running PostgreSQL database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id BIGSERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
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
            id BIGSERIAL PRIMARY KEY,
            to_address VARCHAR(255) NOT NULL,
            sender VARCHAR(255) NOT NULL,
            subject TEXT NOT NULL,
            body TEXT,
            idempotency_key VARCHAR(255),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
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

    debug!("PostgreSQL migrations complete");
    Ok(())
}
