use crate::domain::User;
use crate::storage::UserDirectory;
use anyhow::Context;

#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: sqlx::PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserDirectory for PgUserDirectory {
    async fn list_users_with_email(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, (uuid::Uuid, String, String)>(
            "SELECT id, email, name FROM users WHERE email IS NOT NULL ORDER BY created_at",
        )
        .persistent(false)
        .fetch_all(&self.pool)
        .await
        .context("select users for news email failed")?;

        Ok(rows
            .into_iter()
            .map(|(id, email, name)| User {
                id: id.to_string(),
                email,
                name,
            })
            .collect())
    }
}
