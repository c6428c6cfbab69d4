use serde::{Deserialize, Serialize};

/// Provider-shaped news record. Every field is optional so that one malformed
/// element cannot fail deserialization of the surrounding feed; rejection
/// happens per-article in `is_valid`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    /// Publish time in unix seconds.
    #[serde(default)]
    pub datetime: Option<i64>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Comma-separated related symbols, e.g. "AAPL,MSFT".
    #[serde(default)]
    pub related: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawArticle {
    /// An article is usable only when it has an id and non-blank
    /// headline, url and summary.
    pub fn is_valid(&self) -> bool {
        self.id.is_some()
            && is_present(self.headline.as_deref())
            && is_present(self.url.as_deref())
            && is_present(self.summary.as_deref())
    }
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|s| !s.trim().is_empty())
}

/// Canonical article shape. Built only from a validated `RawArticle` and not
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub source: String,
    /// Publish time in epoch milliseconds.
    pub datetime: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Set only for company-scoped news.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_stocks: Option<Vec<String>>,
}

impl Article {
    /// Normalizes a validated raw article. Returns `None` when the raw
    /// article fails validation. `symbol` is attached (upper-cased) only for
    /// company news; general-feed articles pass `None`.
    pub fn from_raw(raw: &RawArticle, symbol: Option<&str>) -> Option<Self> {
        if !raw.is_valid() {
            return None;
        }

        let related_stocks: Vec<String> = raw
            .related
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Some(Self {
            id: raw.id?,
            title: raw.headline.as_deref()?.trim().to_string(),
            summary: raw.summary.as_deref()?.trim().to_string(),
            url: raw.url.as_deref()?.trim().to_string(),
            source: raw
                .source
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            // Provider reports seconds; the app works in milliseconds.
            datetime: raw.datetime.unwrap_or_default().saturating_mul(1000),
            image: raw
                .image
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            symbol: symbol.map(|s| s.trim().to_uppercase()),
            related_stocks: (!related_stocks.is_empty()).then_some(related_stocks),
        })
    }
}
