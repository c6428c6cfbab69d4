pub mod cache;
pub mod finnhub;
pub mod types;

use crate::domain::RawArticle;
use crate::time::DateRange;
use anyhow::Result;

pub use finnhub::FinnhubClient;
pub use types::{CompanyProfile, SymbolSearchItem, SymbolSearchResponse};

/// Non-2xx answer from the market data provider. The url never includes the
/// API token.
#[derive(Debug, Clone)]
pub struct UpstreamError {
    pub status: u16,
    pub status_text: String,
    pub url: String,
}

impl std::fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "market data provider HTTP {} {} ({})",
            self.status, self.status_text, self.url
        )
    }
}

impl std::error::Error for UpstreamError {}

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Free-text symbol search.
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolSearchItem>>;

    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile>;

    /// News scoped to one symbol within a date window.
    async fn company_news(&self, symbol: &str, range: &DateRange) -> Result<Vec<RawArticle>>;

    /// Market-wide "general" category feed.
    async fn general_news(&self) -> Result<Vec<RawArticle>>;
}
