use async_trait::async_trait;
use chrono::Utc;
use courier_core::{CourierError, CourierResult};
use courier_domain::entities::{EmailFilter, EmailMessage};
use courier_domain::repositories::MessageRepository;
use sqlx::{Row, SqlitePool};
use tracing::debug;

const SELECT_COLUMNS: &str = "id, to_address, sender, subject, body, idempotency_key, created_at";

pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> CourierResult<EmailMessage> {
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
impl MessageRepository for SqliteMessageRepository {
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
            ON CONFLICT(idempotency_key) DO NOTHING
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

        // 键已存在，返回已有记录
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::sqlite::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> SqliteMessageRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteMessageRepository::new(pool)
    }

    fn message(to: &str, subject: &str) -> EmailMessage {
        EmailMessage::new(
            to.to_string(),
            "demo@courier.dev".to_string(),
            subject.to_string(),
            None,
        )
    }

    #[tokio::test]
    async fn test_insert_assigns_monotonic_ids() {
        let repo = setup().await;
        let first = repo.insert(&message("a@x.com", "One")).await.unwrap();
        let second = repo.insert(&message("a@x.com", "Two")).await.unwrap();

        assert!(first.id > 0);
        assert!(second.id > first.id);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_idempotent_returns_existing() {
        let repo = setup().await;
        let msg =
            message("a@x.com", "Hi").with_idempotency_key(Some("req-1".to_string()));

        let first = repo.insert_idempotent(&msg).await.unwrap();
        let second = repo.insert_idempotent(&msg).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_idempotent_distinct_keys_insert_rows() {
        let repo = setup().await;
        let first = repo
            .insert_idempotent(&message("a@x.com", "Hi").with_idempotency_key(Some("k1".into())))
            .await
            .unwrap();
        let second = repo
            .insert_idempotent(&message("a@x.com", "Hi").with_idempotency_key(Some("k2".into())))
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_idempotent_without_key_always_inserts() {
        let repo = setup().await;
        repo.insert_idempotent(&message("a@x.com", "Hi")).await.unwrap();
        repo.insert_idempotent(&message("a@x.com", "Hi")).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let repo = setup().await;
        let recorded = repo.insert(&message("a@x.com", "Hi")).await.unwrap();

        let found = repo.get_by_id(recorded.id).await.unwrap().unwrap();
        assert_eq!(found.subject, "Hi");
        assert!(repo.get_by_id(recorded.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_orders_id_descending() {
        let repo = setup().await;
        let m1 = repo.insert(&message("a@x.com", "M1")).await.unwrap();
        let m2 = repo.insert(&message("a@x.com", "M2")).await.unwrap();
        let m3 = repo.insert(&message("a@x.com", "M3")).await.unwrap();

        let page = repo.find(&EmailFilter::default(), 0, 10).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![m3.id, m2.id, m1.id]);
    }

    #[tokio::test]
    async fn test_find_filters_by_recipient_exact_match() {
        let repo = setup().await;
        repo.insert(&message("a@x.com", "ToA1")).await.unwrap();
        repo.insert(&message("b@x.com", "ToB")).await.unwrap();
        repo.insert(&message("a@x.com", "ToA2")).await.unwrap();
        // 大小写不同的地址不匹配，核心不做规范化
        repo.insert(&message("A@x.com", "ToUpperA")).await.unwrap();

        let page = repo.find(&EmailFilter::by_to("a@x.com"), 0, 10).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].subject, "ToA2");
        assert_eq!(page[1].subject, "ToA1");
        assert!(page.iter().all(|m| m.to == "a@x.com"));
    }

    #[tokio::test]
    async fn test_find_paginates_after_filter_and_order() {
        let repo = setup().await;
        for i in 1..=15 {
            repo.insert(&message("a@x.com", &format!("M{i}"))).await.unwrap();
        }

        let second_page = repo.find(&EmailFilter::default(), 10, 10).await.unwrap();
        assert_eq!(second_page.len(), 5);
        // 跳过10条最新记录后，剩下的是最早的5条
        let subjects: Vec<&str> = second_page.iter().map(|m| m.subject.as_str()).collect();
        assert_eq!(subjects, vec!["M5", "M4", "M3", "M2", "M1"]);
    }

    #[tokio::test]
    async fn test_delete_all_empties_store() {
        let repo = setup().await;
        repo.insert(&message("a@x.com", "Hi")).await.unwrap();
        repo.delete_all().await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
