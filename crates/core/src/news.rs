use crate::domain::Article;
use crate::market::MarketDataProvider;
use crate::time::DateRange;
use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;

const ROUNDS: usize = 6;
const GENERAL_NEWS_CAP: usize = 6;
const NEWS_WINDOW_DAYS: i64 = 5;

/// Terminal failure of the news path. Per-round and per-article problems are
/// absorbed before they ever become this.
#[derive(Debug, Clone, Copy)]
pub struct NewsFetchError;

impl std::fmt::Display for NewsFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Failed to fetch news")
    }
}

impl std::error::Error for NewsFetchError {}

/// Seam between news consumers (API, notification pipeline) and the
/// aggregation logic.
#[async_trait::async_trait]
pub trait NewsSource: Send + Sync {
    async fn news_for_symbols(&self, symbols: &[String]) -> Result<Vec<Article>>;
}

pub struct NewsAggregator {
    provider: Arc<dyn MarketDataProvider>,
}

impl NewsAggregator {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Up to six articles for the given watchlist symbols, round-robined so a
    /// short watchlist still fills the batch. Falls back to the general feed
    /// when normalization leaves no symbol. Fails only with `NewsFetchError`;
    /// anything recoverable degrades to a partial result instead.
    pub async fn news_for_symbols(&self, symbols: &[String]) -> Result<Vec<Article>> {
        match self.resolve(symbols).await {
            Ok(articles) => Ok(articles),
            Err(err) => {
                tracing::error!(error = %err, "news aggregation failed");
                Err(NewsFetchError.into())
            }
        }
    }

    async fn resolve(&self, symbols: &[String]) -> Result<Vec<Article>> {
        let clean: Vec<String> = symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        if clean.is_empty() {
            return self.general_news().await;
        }

        let range = DateRange::days_back_from_today(NEWS_WINDOW_DAYS);
        let mut articles: Vec<Article> = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();

        // The seen-url set is shared across rounds, so rounds must stay
        // sequential.
        for round in 0..ROUNDS {
            let symbol = &clean[round % clean.len()];

            let raw = match self.provider.company_news(symbol, &range).await {
                Ok(raw) => raw,
                Err(err) => {
                    tracing::warn!(
                        round,
                        symbol = %symbol,
                        error = %err,
                        "company news fetch failed; skipping round"
                    );
                    continue;
                }
            };

            // First valid, not-yet-seen article wins the round.
            for candidate in &raw {
                let Some(article) = Article::from_raw(candidate, Some(symbol)) else {
                    continue;
                };
                if seen_urls.contains(&article.url) {
                    continue;
                }
                seen_urls.insert(article.url.clone());
                articles.push(article);
                break;
            }
        }

        articles.sort_by(|a, b| b.datetime.cmp(&a.datetime));
        Ok(articles)
    }

    /// General feed: validate, dedupe by id+url+headline keeping the first
    /// occurrence, stop after six survivors. Provider order is preserved.
    async fn general_news(&self) -> Result<Vec<Article>> {
        let raw = self.provider.general_news().await?;

        let mut seen_keys: HashSet<String> = HashSet::new();
        let mut articles: Vec<Article> = Vec::new();

        for candidate in &raw {
            if articles.len() == GENERAL_NEWS_CAP {
                break;
            }
            let Some(article) = Article::from_raw(candidate, None) else {
                continue;
            };
            let key = format!("{}-{}-{}", article.id, article.url, article.title);
            if seen_keys.insert(key) {
                articles.push(article);
            }
        }

        Ok(articles)
    }
}

#[async_trait::async_trait]
impl NewsSource for NewsAggregator {
    async fn news_for_symbols(&self, symbols: &[String]) -> Result<Vec<Article>> {
        NewsAggregator::news_for_symbols(self, symbols).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawArticle;
    use crate::market::{CompanyProfile, SymbolSearchItem};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProvider {
        per_symbol: HashMap<String, Vec<RawArticle>>,
        general: Vec<RawArticle>,
        fail_symbols: Vec<&'static str>,
        fail_general: bool,
        company_calls: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl MarketDataProvider for FakeProvider {
        fn provider_name(&self) -> &'static str {
            "fake"
        }

        async fn search_symbols(&self, _query: &str) -> Result<Vec<SymbolSearchItem>> {
            Ok(Vec::new())
        }

        async fn company_profile(&self, _symbol: &str) -> Result<CompanyProfile> {
            Ok(CompanyProfile::default())
        }

        async fn company_news(&self, symbol: &str, _range: &DateRange) -> Result<Vec<RawArticle>> {
            self.company_calls.lock().unwrap().push(symbol.to_string());
            if self.fail_symbols.contains(&symbol) {
                anyhow::bail!("company news down");
            }
            Ok(self.per_symbol.get(symbol).cloned().unwrap_or_default())
        }

        async fn general_news(&self) -> Result<Vec<RawArticle>> {
            if self.fail_general {
                anyhow::bail!("general news down");
            }
            Ok(self.general.clone())
        }
    }

    fn raw(id: i64, url: &str, datetime: i64) -> RawArticle {
        RawArticle {
            id: Some(id),
            datetime: Some(datetime),
            headline: Some(format!("headline {id}")),
            summary: Some("summary".into()),
            url: Some(url.to_string()),
            ..RawArticle::default()
        }
    }

    fn aggregator(provider: FakeProvider) -> (Arc<FakeProvider>, NewsAggregator) {
        let provider = Arc::new(provider);
        (provider.clone(), NewsAggregator::new(provider))
    }

    #[tokio::test]
    async fn round_robins_symbols_and_sorts_newest_first() {
        let (provider, agg) = aggregator(FakeProvider {
            per_symbol: HashMap::from([
                (
                    "AAPL".to_string(),
                    vec![raw(1, "https://n.test/1", 100), raw(2, "https://n.test/2", 200)],
                ),
                ("MSFT".to_string(), vec![raw(3, "https://n.test/3", 300)]),
            ]),
            ..FakeProvider::default()
        });

        let articles = agg
            .news_for_symbols(&["aapl".to_string(), " msft ".to_string()])
            .await
            .unwrap();

        assert_eq!(
            *provider.company_calls.lock().unwrap(),
            vec!["AAPL", "MSFT", "AAPL", "MSFT", "AAPL", "MSFT"]
        );

        let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![3, 2, 1], "sorted newest first");
        assert_eq!(articles[0].symbol.as_deref(), Some("MSFT"));
        assert_eq!(articles[0].datetime, 300_000);
    }

    #[tokio::test]
    async fn each_round_contributes_at_most_one_article() {
        let symbols: Vec<String> = (0..6).map(|i| format!("SYM{i}")).collect();
        let mut per_symbol = HashMap::new();
        for (i, s) in symbols.iter().enumerate() {
            let base = i as i64 * 10;
            per_symbol.insert(
                s.clone(),
                vec![
                    raw(base, &format!("https://n.test/{base}"), base),
                    raw(base + 1, &format!("https://n.test/{}", base + 1), base + 1),
                ],
            );
        }

        let (_, agg) = aggregator(FakeProvider {
            per_symbol,
            ..FakeProvider::default()
        });

        let articles = agg.news_for_symbols(&symbols).await.unwrap();

        assert_eq!(articles.len(), 6);
        let mut seen_symbols: Vec<&str> =
            articles.iter().filter_map(|a| a.symbol.as_deref()).collect();
        seen_symbols.sort_unstable();
        seen_symbols.dedup();
        assert_eq!(seen_symbols.len(), 6, "one article per symbol");
    }

    #[tokio::test]
    async fn failed_round_does_not_abort_remaining_rounds() {
        let (provider, agg) = aggregator(FakeProvider {
            per_symbol: HashMap::from([(
                "MSFT".to_string(),
                vec![raw(1, "https://n.test/1", 100), raw(2, "https://n.test/2", 200)],
            )]),
            fail_symbols: vec!["AAPL"],
            ..FakeProvider::default()
        });

        let articles = agg
            .news_for_symbols(&["AAPL".to_string(), "MSFT".to_string()])
            .await
            .unwrap();

        assert_eq!(provider.company_calls.lock().unwrap().len(), 6);
        assert_eq!(articles.len(), 2);
        assert!(articles.iter().all(|a| a.symbol.as_deref() == Some("MSFT")));
    }

    #[tokio::test]
    async fn duplicate_urls_across_rounds_are_taken_once() {
        let shared = raw(1, "https://n.test/shared", 100);
        let (_, agg) = aggregator(FakeProvider {
            per_symbol: HashMap::from([
                ("AAPL".to_string(), vec![shared.clone()]),
                (
                    "MSFT".to_string(),
                    vec![shared, raw(2, "https://n.test/2", 200)],
                ),
            ]),
            ..FakeProvider::default()
        });

        let articles = agg
            .news_for_symbols(&["AAPL".to_string(), "MSFT".to_string()])
            .await
            .unwrap();

        let urls: Vec<&str> = articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls.len(), 2);
        assert!(urls.contains(&"https://n.test/shared"));
        assert!(urls.contains(&"https://n.test/2"));
    }

    #[tokio::test]
    async fn blank_symbols_fall_back_to_general_feed() {
        let (provider, agg) = aggregator(FakeProvider {
            general: vec![raw(1, "https://n.test/g1", 100)],
            ..FakeProvider::default()
        });

        let articles = agg
            .news_for_symbols(&[" ".to_string(), String::new()])
            .await
            .unwrap();

        assert!(provider.company_calls.lock().unwrap().is_empty());
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].symbol, None);
    }

    #[tokio::test]
    async fn general_feed_dedupes_and_caps_at_six() {
        let mut general: Vec<RawArticle> = (0..10)
            .map(|i| raw(i, &format!("https://n.test/{i}"), i))
            .collect();
        // Duplicate of the first entry and an invalid one mixed in.
        general.insert(1, raw(0, "https://n.test/0", 0));
        general.insert(2, RawArticle {
            headline: Some("no id".into()),
            ..RawArticle::default()
        });

        let (_, agg) = aggregator(FakeProvider {
            general,
            ..FakeProvider::default()
        });

        let articles = agg.news_for_symbols(&[]).await.unwrap();

        assert_eq!(articles.len(), GENERAL_NEWS_CAP);
        let ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5], "provider order, first wins");
    }

    #[tokio::test]
    async fn general_feed_failure_surfaces_news_fetch_error() {
        let (_, agg) = aggregator(FakeProvider {
            fail_general: true,
            ..FakeProvider::default()
        });

        let err = agg.news_for_symbols(&[]).await.unwrap_err();
        assert!(err.downcast_ref::<NewsFetchError>().is_some());
        assert_eq!(err.to_string(), "Failed to fetch news");
    }
}
