pub mod smtp;

pub use smtp::SmtpMailer;

use anyhow::Result;

/// Per-user daily digest payload.
#[derive(Debug, Clone)]
pub struct NewsSummaryEmail {
    pub email: String,
    /// Human-readable date, e.g. "August 24, 2026".
    pub date: String,
    pub news_content: String,
}

/// One-shot signup email payload.
#[derive(Debug, Clone)]
pub struct WelcomeEmail {
    pub email: String,
    pub name: String,
    pub intro: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send_news_summary(&self, email: &NewsSummaryEmail) -> Result<()>;

    async fn send_welcome(&self, email: &WelcomeEmail) -> Result<()>;
}
