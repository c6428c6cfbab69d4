pub mod domain;
pub mod llm;
pub mod mail;
pub mod market;
pub mod news;
pub mod notify;
pub mod search;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub finnhub_api_key: Option<String>,
        pub gemini_api_key: Option<String>,
        pub sentry_dsn: Option<String>,
        pub smtp_host: Option<String>,
        pub smtp_username: Option<String>,
        pub smtp_password: Option<String>,
        pub smtp_from_address: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                finnhub_api_key: std::env::var("FINNHUB_API_KEY").ok(),
                gemini_api_key: std::env::var("GEMINI_API_KEY").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                smtp_host: std::env::var("SMTP_HOST").ok(),
                smtp_username: std::env::var("SMTP_USERNAME").ok(),
                smtp_password: std::env::var("SMTP_PASSWORD").ok(),
                smtp_from_address: std::env::var("SMTP_FROM_ADDRESS").ok(),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_finnhub_api_key(&self) -> anyhow::Result<&str> {
            self.finnhub_api_key
                .as_deref()
                .context("FINNHUB_API_KEY is required")
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("GEMINI_API_KEY is required")
        }

        pub fn require_smtp_host(&self) -> anyhow::Result<&str> {
            self.smtp_host.as_deref().context("SMTP_HOST is required")
        }

        pub fn require_smtp_from_address(&self) -> anyhow::Result<&str> {
            self.smtp_from_address
                .as_deref()
                .context("SMTP_FROM_ADDRESS is required")
        }
    }
}
