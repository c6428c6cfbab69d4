pub mod directory;
pub mod lock;
pub mod watchlist;

pub use directory::PgUserDirectory;
pub use watchlist::PgWatchlistStore;

use crate::domain::User;
use anyhow::Context;

/// Read side of the users collection. Only users that can actually receive
/// mail are returned.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_users_with_email(&self) -> anyhow::Result<Vec<User>>;
}

/// Read side of the watchlist association. The notification core never
/// writes it.
#[async_trait::async_trait]
pub trait WatchlistStore: Send + Sync {
    async fn symbols_for_email(&self, email: &str) -> anyhow::Result<Vec<String>>;
}

pub async fn migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("sqlx migrations failed")?;
    Ok(())
}
