use crate::domain::StockSearchResult;
use crate::market::{CompanyProfile, MarketDataProvider};
use anyhow::Result;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Reference list used when the search box is empty. Only the first
/// `POPULAR_COUNT` entries are surfaced.
pub const POPULAR_SYMBOLS: [&str; 20] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "TSLA", "META", "NFLX", "AMD", "INTC", "ORCL", "CRM",
    "ADBE", "PYPL", "UBER", "SHOP", "SPOT", "COIN", "PLTR", "SNOW",
];

const POPULAR_COUNT: usize = 10;
const MAX_RESULTS: usize = 15;
const DEFAULT_EXCHANGE: &str = "US";
const DEFAULT_MEMO_TTL_SECS: u64 = 60;

struct MemoEntry {
    results: Vec<StockSearchResult>,
    expires_at: Instant,
}

/// Best-effort stock search over the market data provider. Failures never
/// reach the caller; they degrade to an empty result list.
pub struct SearchAggregator {
    provider: Arc<dyn MarketDataProvider>,
    memo: RwLock<HashMap<String, MemoEntry>>,
    memo_ttl: Duration,
}

impl SearchAggregator {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        let memo_ttl_secs = std::env::var("SEARCH_MEMO_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_MEMO_TTL_SECS);

        Self::with_memo_ttl(provider, Duration::from_secs(memo_ttl_secs))
    }

    pub fn with_memo_ttl(provider: Arc<dyn MarketDataProvider>, memo_ttl: Duration) -> Self {
        Self {
            provider,
            memo: RwLock::new(HashMap::new()),
            memo_ttl,
        }
    }

    /// Empty or missing query serves the popular list; anything else runs a
    /// free-text symbol search. Capped at `MAX_RESULTS` either way.
    pub async fn search(&self, query: Option<&str>) -> Vec<StockSearchResult> {
        let trimmed = query.unwrap_or_default().trim().to_string();

        if let Some(memoized) = self.memo_get(&trimmed).await {
            return memoized;
        }

        let outcome = if trimmed.is_empty() {
            Ok(self.popular().await)
        } else {
            self.search_query(&trimmed).await
        };

        match outcome {
            Ok(mut results) => {
                results.truncate(MAX_RESULTS);
                self.memo_put(trimmed, results.clone()).await;
                results
            }
            Err(err) => {
                tracing::warn!(query = %trimmed, error = %err, "stock search failed; returning empty result");
                Vec::new()
            }
        }
    }

    /// First `POPULAR_COUNT` reference symbols with their profiles fetched
    /// concurrently. A failed profile lookup degrades that one entry to an
    /// empty name and the default exchange instead of failing the batch.
    async fn popular(&self) -> Vec<StockSearchResult> {
        let symbols: Vec<&str> = POPULAR_SYMBOLS.iter().take(POPULAR_COUNT).copied().collect();
        let profiles = join_all(
            symbols
                .iter()
                .map(|symbol| self.provider.company_profile(symbol)),
        )
        .await;

        symbols
            .into_iter()
            .zip(profiles)
            .map(|(symbol, profile)| {
                let profile = match profile {
                    Ok(profile) => profile,
                    Err(err) => {
                        tracing::warn!(
                            symbol,
                            error = %err,
                            "profile lookup failed; degrading search entry"
                        );
                        CompanyProfile::default()
                    }
                };

                StockSearchResult {
                    symbol: symbol.to_string(),
                    name: profile.name.unwrap_or_default(),
                    exchange: profile
                        .exchange
                        .unwrap_or_else(|| DEFAULT_EXCHANGE.to_string()),
                    kind: "Common Stock".to_string(),
                    is_in_watchlist: false,
                }
            })
            .collect()
    }

    async fn search_query(&self, query: &str) -> Result<Vec<StockSearchResult>> {
        let items = self.provider.search_symbols(query).await?;

        Ok(items
            .into_iter()
            .filter(|item| !item.symbol.trim().is_empty())
            .map(|item| {
                let symbol = item.symbol.trim().to_uppercase();
                StockSearchResult {
                    name: non_blank(item.description).unwrap_or_else(|| symbol.clone()),
                    exchange: non_blank(item.display_symbol)
                        .unwrap_or_else(|| DEFAULT_EXCHANGE.to_string()),
                    kind: non_blank(item.kind).unwrap_or_else(|| "Stock".to_string()),
                    symbol,
                    is_in_watchlist: false,
                }
            })
            .collect())
    }

    async fn memo_get(&self, key: &str) -> Option<Vec<StockSearchResult>> {
        let guard = self.memo.read().await;
        let entry = guard.get(key)?;
        if Instant::now() <= entry.expires_at {
            return Some(entry.results.clone());
        }
        None
    }

    async fn memo_put(&self, key: String, results: Vec<StockSearchResult>) {
        let entry = MemoEntry {
            results,
            expires_at: Instant::now() + self.memo_ttl,
        };
        let mut guard = self.memo.write().await;
        guard.insert(key, entry);
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
