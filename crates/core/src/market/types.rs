use serde::Deserialize;

/// Envelope of the symbol search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolSearchResponse {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub result: Vec<SymbolSearchItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolSearchItem {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "displaySymbol")]
    pub display_symbol: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Subset of the company profile payload the app reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
}
