pub mod gemini;

pub use gemini::GeminiClient;

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone)]
pub enum Provider {
    Gemini,
}

/// Text-generation capability used for email copy. One prompt in, plain text
/// out.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    fn provider(&self) -> Provider;

    /// `Ok(None)` means the provider answered but produced no usable text
    /// part; callers supply their own fallback copy for that case. `Err` is
    /// reserved for transport and provider failures.
    async fn generate(&self, prompt: &str) -> anyhow::Result<Option<String>>;
}

/// Failure with enough context to debug a misbehaving provider: the stage
/// that failed plus the raw payloads we got back.
#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub stage: &'static str,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LLM error (provider={:?}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for LlmDiagnosticsError {}
