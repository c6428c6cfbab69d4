use crate::config::Settings;
use crate::llm::{LlmDiagnosticsError, Provider, TextGenerator};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_gemini_api_key()?.to_string();
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::with_base_url(base_url, api_key, model, Duration::from_secs(timeout_secs))
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    async fn generate_content(
        &self,
        req: GenerateContentRequest,
    ) -> anyhow::Result<(serde_json::Value, GenerateContentResponse)> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let res = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Gemini response body")?;
        if !status.is_success() {
            let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
            return Err(LlmDiagnosticsError {
                provider: Provider::Gemini,
                stage: "http",
                detail: format!("status={status}"),
                raw_output: Some(text),
                raw_response_json,
            }
            .into());
        }

        let raw_json = serde_json::from_str::<serde_json::Value>(&text)
            .with_context(|| format!("failed to parse Gemini response JSON: {text}"))?;
        let parsed = serde_json::from_value::<GenerateContentResponse>(raw_json.clone())
            .context("failed to decode Gemini response into GenerateContentResponse")?;
        Ok((raw_json, parsed))
    }

    fn response_text(res: &GenerateContentResponse) -> Option<String> {
        // First candidate, first part. Blank text counts as missing.
        let part = res.candidates.first()?.content.as_ref()?.parts.first()?;
        part.text.clone().filter(|t| !t.trim().is_empty())
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn generate(&self, prompt: &str) -> anyhow::Result<Option<String>> {
        let req = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let (raw_json, res) = self.generate_content(req).await?;

        let text = Self::response_text(&res);
        if text.is_none() {
            tracing::warn!(
                finish_reason = res
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref()),
                raw = %raw_json,
                "Gemini response carried no text part"
            );
        }
        Ok(text)
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::with_base_url(
            server.base_url(),
            "test-key",
            "gemini-2.5-flash-lite",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn extracts_first_candidate_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-2.5-flash-lite:generateContent")
                .query_param("key", "test-key")
                .body_includes("summarize these headlines");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [{"text": "Markets rallied."}, {"text": "ignored"}]
                        },
                        "finishReason": "STOP"
                    }]
                }));
        });

        let text = client_for(&server)
            .generate("summarize these headlines")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(text.as_deref(), Some("Markets rallied."));
    }

    #[tokio::test]
    async fn empty_candidates_yield_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({"candidates": []}));
        });

        let text = client_for(&server).generate("prompt").await.unwrap();
        assert_eq!(text, None);
    }

    #[tokio::test]
    async fn http_failure_carries_diagnostics() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(429)
                .header("content-type", "application/json")
                .json_body(json!({"error": {"message": "quota exhausted"}}));
        });

        let err = client_for(&server).generate("prompt").await.unwrap_err();
        let diag = err
            .downcast_ref::<LlmDiagnosticsError>()
            .expect("should be an LlmDiagnosticsError");
        assert_eq!(diag.stage, "http");
        assert!(diag.detail.contains("429"));
        assert!(diag.raw_response_json.is_some());
    }

    #[test]
    fn blank_text_part_counts_as_missing() {
        let res: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "   "}]}
            }]
        }))
        .unwrap();

        assert_eq!(GeminiClient::response_text(&res), None);
    }
}
