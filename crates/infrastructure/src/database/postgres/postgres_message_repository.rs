use async_trait::async_trait;
use chrono::Utc;
use courier_core::{CourierError, CourierResult};
use courier_domain::entities::{EmailFilter, EmailMessage};
use courier_domain::repositories::MessageRepository;
use sqlx::{PgPool, Row};
use tracing::debug;

const SELECT_COLUMNS: &str = "id, to_address, sender, subject, body, idempotency_key, created_at";

pub struct PostgresMessageRepository {
    pool: PgPool,
}

impl PostgresMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_message(row: &sqlx::postgres::PgRow) -> CourierResult<EmailMessage> {
        Ok(EmailMessage {
            id: row.try_get("id")?,
            to: row.try_get("to_address")?,
            sender: row.try_get("sender")?,
            subject: row.try_get("subject")?,
            body: row.try_get("body")?,
            idempotency_key: row.try_get("idempotency_key")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl MessageRepository for PostgresMessageRepository {
    async fn insert(&self, message: &EmailMessage) -> CourierResult<EmailMessage> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO emails (to_address, sender, subject, body, idempotency_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {SELECT_COLUMNS}
            "#,
        ))
        .bind(&message.to)
        .bind(&message.sender)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(&message.idempotency_key)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(CourierError::Database)?;

        let recorded = Self::row_to_message(&row)?;
        debug!("记录邮件成功: {}", recorded.entity_description());
        Ok(recorded)
    }

    async fn insert_idempotent(&self, message: &EmailMessage) -> CourierResult<EmailMessage> {
        let key = match &message.idempotency_key {
            Some(key) => key.clone(),
            // 没有幂等键时退化为普通插入
            None => return self.insert(message).await,
        };

        // 唯一索引保证并发的相同键调用至多插入一行
        let inserted = sqlx::query(&format!(
            r#"
            INSERT INTO emails (to_address, sender, subject, body, idempotency_key, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (idempotency_key) DO NOTHING
            RETURNING {SELECT_COLUMNS}
            "#,
        ))
        .bind(&message.to)
        .bind(&message.sender)
        .bind(&message.subject)
        .bind(&message.body)
        .bind(&key)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(CourierError::Database)?;

        if let Some(row) = inserted {
            let recorded = Self::row_to_message(&row)?;
            debug!("记录邮件成功: {}", recorded.entity_description());
            return Ok(recorded);
        }

        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM emails WHERE idempotency_key = $1"
        ))
        .bind(&key)
        .fetch_one(&self.pool)
        .await
        .map_err(CourierError::Database)?;

        let existing = Self::row_to_message(&row)?;
        debug!("幂等键已存在，复用记录: {}", existing.entity_description());
        Ok(existing)
    }

    async fn get_by_id(&self, id: i64) -> CourierResult<Option<EmailMessage>> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM emails WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(CourierError::Database)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_message(&row)?)),
            None => Ok(None),
        }
    }

    async fn find(
        &self,
        filter: &EmailFilter,
        skip: i64,
        take: i64,
    ) -> CourierResult<Vec<EmailMessage>> {
        // id 是唯一可靠的总序，时间戳在存储精度下可能碰撞
        let rows = match &filter.to {
            Some(to) => {
                sqlx::query(&format!(
                    "SELECT {SELECT_COLUMNS} FROM emails WHERE to_address = $1
                     ORDER BY id DESC LIMIT $2 OFFSET $3"
                ))
                .bind(to)
                .bind(take)
                .bind(skip)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {SELECT_COLUMNS} FROM emails ORDER BY id DESC LIMIT $1 OFFSET $2"
                ))
                .bind(take)
                .bind(skip)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(CourierError::Database)?;

        rows.iter().map(Self::row_to_message).collect()
    }

    async fn count(&self) -> CourierResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM emails")
            .fetch_one(&self.pool)
            .await
            .map_err(CourierError::Database)?;
        Ok(row.try_get("count")?)
    }

    async fn delete_all(&self) -> CourierResult<()> {
        sqlx::query("DELETE FROM emails")
            .execute(&self.pool)
            .await
            .map_err(CourierError::Database)?;
        Ok(())
    }
}
