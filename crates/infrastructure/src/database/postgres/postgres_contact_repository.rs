use async_trait::async_trait;
use courier_core::{CourierError, CourierResult};
use courier_domain::entities::Contact;
use courier_domain::repositories::ContactRepository;
use sqlx::{PgPool, Row};
use tracing::debug;

pub struct PostgresContactRepository {
    pool: PgPool,
}

impl PostgresContactRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_contact(row: &sqlx::postgres::PgRow) -> CourierResult<Contact> {
        Ok(Contact {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            age: row.try_get("age")?,
        })
    }
}

#[async_trait]
impl ContactRepository for PostgresContactRepository {
    async fn create(&self, contact: &Contact) -> CourierResult<Contact> {
        let row = sqlx::query(
            r#"
            INSERT INTO contacts (name, email, age)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, age
            "#,
        )
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(contact.age)
        .fetch_one(&self.pool)
        .await
        .map_err(CourierError::Database)?;

        let created = Self::row_to_contact(&row)?;
        debug!("创建联系人成功: {}", created.entity_description());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> CourierResult<Option<Contact>> {
        let row = sqlx::query("SELECT id, name, email, age FROM contacts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(CourierError::Database)?;

        match row {
            Some(row) => Ok(Some(Self::row_to_contact(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> CourierResult<Vec<Contact>> {
        let rows = sqlx::query("SELECT id, name, email, age FROM contacts ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(CourierError::Database)?;

        rows.iter().map(Self::row_to_contact).collect()
    }

    async fn find_by_age(&self, age: i32) -> CourierResult<Vec<Contact>> {
        let rows =
            sqlx::query("SELECT id, name, email, age FROM contacts WHERE age = $1 ORDER BY id")
                .bind(age)
                .fetch_all(&self.pool)
                .await
                .map_err(CourierError::Database)?;

        rows.iter().map(Self::row_to_contact).collect()
    }

    async fn delete(&self, id: i64) -> CourierResult<bool> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(CourierError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> CourierResult<()> {
        sqlx::query("DELETE FROM contacts")
            .execute(&self.pool)
            .await
            .map_err(CourierError::Database)?;
        Ok(())
    }
}
