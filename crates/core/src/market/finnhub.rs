use crate::config::Settings;
use crate::domain::RawArticle;
use crate::market::cache::ResponseCache;
use crate::market::types::{CompanyProfile, SymbolSearchItem, SymbolSearchResponse};
use crate::market::{MarketDataProvider, UpstreamError};
use crate::time::DateRange;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

const PROD_BASE_URL: &str = "https://finnhub.io/api/v1";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SEARCH_TTL: Duration = Duration::from_secs(1800);
const NEWS_TTL: Duration = Duration::from_secs(3600);
const PROFILE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug)]
pub struct FinnhubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    cache: ResponseCache,
}

impl FinnhubClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let token = settings.require_finnhub_api_key()?.to_string();

        let base_url =
            std::env::var("FINNHUB_BASE_URL").unwrap_or_else(|_| PROD_BASE_URL.to_string());
        let timeout_secs = std::env::var("FINNHUB_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::with_base_url(base_url, token, Duration::from_secs(timeout_secs))
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
            cache: ResponseCache::new(),
        })
    }

    /// One GET against the provider. With a TTL, successful bodies are cached
    /// under `cache_key`; without one, every call is a fresh request. Failures
    /// are never cached. No retries here, the callers decide what a failed
    /// fetch means for their batch.
    async fn fetch_json<T>(
        &self,
        cache_key: &str,
        path: &str,
        query: &[(&str, &str)],
        ttl: Option<Duration>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if ttl.is_some() {
            if let Some(body) = self.cache.get(cache_key).await {
                return serde_json::from_str(&body)
                    .context("failed to parse cached provider response");
            }
        }

        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("token", self.token.as_str())])
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        if !status.is_success() {
            return Err(UpstreamError {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                url,
            }
            .into());
        }

        let text = res
            .text()
            .await
            .context("failed to read provider response")?;
        if let Some(ttl) = ttl {
            self.cache.put(cache_key.to_string(), &text, ttl).await;
        }
        serde_json::from_str::<T>(&text)
            .with_context(|| format!("failed to parse provider response from {path}"))
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for FinnhubClient {
    fn provider_name(&self) -> &'static str {
        "finnhub"
    }

    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolSearchItem>> {
        let resp: SymbolSearchResponse = self
            .fetch_json(
                &format!("search:{query}"),
                "/search",
                &[("q", query)],
                Some(SEARCH_TTL),
            )
            .await?;
        Ok(resp.result)
    }

    async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        self.fetch_json(
            &format!("profile:{symbol}"),
            "/stock/profile2",
            &[("symbol", symbol)],
            Some(PROFILE_TTL),
        )
        .await
    }

    async fn company_news(&self, symbol: &str, range: &DateRange) -> Result<Vec<RawArticle>> {
        self.fetch_json(
            &format!("company-news:{symbol}:{}:{}", range.from, range.to),
            "/company-news",
            &[("symbol", symbol), ("from", &range.from), ("to", &range.to)],
            Some(NEWS_TTL),
        )
        .await
    }

    async fn general_news(&self) -> Result<Vec<RawArticle>> {
        self.fetch_json(
            "general-news",
            "/news",
            &[("category", "general")],
            Some(NEWS_TTL),
        )
        .await
    }
}
