use crate::storage::WatchlistStore;
use anyhow::Context;

#[derive(Debug, Clone)]
pub struct PgWatchlistStore {
    pool: sqlx::PgPool,
}

impl PgWatchlistStore {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl WatchlistStore for PgWatchlistStore {
    /// Two-step lookup: the user row by email, then that user's symbols. A
    /// missing user is an empty watchlist, not an error.
    async fn symbols_for_email(&self, email: &str) -> anyhow::Result<Vec<String>> {
        let user_id: Option<(uuid::Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .persistent(false)
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .context("select user by email failed")?;

        let Some((user_id,)) = user_id else {
            return Ok(Vec::new());
        };

        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT symbol FROM watchlists WHERE user_id = $1 ORDER BY added_at")
                .persistent(false)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .context("select watchlist symbols failed")?;

        Ok(rows.into_iter().map(|(symbol,)| symbol).collect())
    }
}
