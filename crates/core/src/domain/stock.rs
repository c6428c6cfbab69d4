use serde::{Deserialize, Serialize};

/// One row of the stock search surface, enriched with watchlist membership
/// for the requesting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSearchResult {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_in_watchlist: bool,
}
