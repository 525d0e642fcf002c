//! Google Generative AI oracle
//!
//! Single-shot `generateContent` calls. The whole request, connection
//! included, is bounded by the configured timeout.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::Oracle;
use crate::types::{Result, TeamUpError};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

/// Configuration for the Gemini oracle
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    /// e.g. "gemini-flash-latest"
    pub model: String,
    pub base_url: String,
    /// Bound on a whole call (default: 30 seconds)
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
    status: Option<String>,
}

/// Gemini-backed oracle
pub struct GeminiOracle {
    config: GeminiConfig,
    http_client: reqwest::Client,
}

impl GeminiOracle {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("teamup/1.0")
            .build()
            .map_err(|e| TeamUpError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait::async_trait]
impl Oracle for GeminiOracle {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint();
        debug!(model = %self.config.model, prompt_len = prompt.len(), "Calling oracle");

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TeamUpError::Oracle(format!(
                        "timed out after {}ms",
                        self.config.timeout.as_millis()
                    ))
                } else {
                    TeamUpError::Oracle(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| match e.error.status {
                    Some(s) => format!("{}: {}", s, e.error.message),
                    None => e.error.message,
                })
                .unwrap_or(text);
            return Err(TeamUpError::Oracle(format!(
                "HTTP {} from model {}: {}",
                status, self.config.model, detail
            )));
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TeamUpError::Oracle(format!("unreadable response envelope: {}", e)))?;

        let text = collect_text(payload);
        if text.trim().is_empty() {
            return Err(TeamUpError::Oracle("empty response".into()));
        }
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Concatenate the text parts of the first candidate
fn collect_text(payload: GenerateResponse) -> String {
    payload
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let mut config = GeminiConfig::new("k");
        config.base_url = "http://localhost:9999/models/".to_string();
        let oracle = GeminiOracle::new(config).unwrap();
        assert_eq!(
            oracle.endpoint(),
            "http://localhost:9999/models/gemini-flash-latest:generateContent"
        );
    }

    #[test]
    fn test_collect_text_joins_parts() {
        let payload: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"riskLevel\":" }, { "text": " \"LOW\"}" }] }
            }]
        }))
        .unwrap();
        assert_eq!(collect_text(payload), "{\"riskLevel\": \"LOW\"}");
    }

    #[test]
    fn test_collect_text_without_candidates() {
        let payload: GenerateResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(collect_text(payload), "");
    }

    #[tokio::test]
    async fn test_unreachable_oracle_is_an_oracle_error() {
        let mut config = GeminiConfig::new("k");
        // Nothing listens on the local discard port
        config.base_url = "http://127.0.0.1:9".to_string();
        config.timeout = Duration::from_millis(500);
        let oracle = GeminiOracle::new(config).unwrap();

        let err = oracle.generate("hello").await.unwrap_err();
        assert!(matches!(err, TeamUpError::Oracle(_)));
    }

    #[tokio::test]
    async fn test_silent_upstream_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            // Accept and never answer
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let mut config = GeminiConfig::new("k");
        config.base_url = format!("http://{}", addr);
        config.timeout = Duration::from_millis(300);
        let oracle = GeminiOracle::new(config).unwrap();

        let started = std::time::Instant::now();
        let err = oracle.generate("hello").await.unwrap_err();
        hold.abort();

        match err {
            TeamUpError::Oracle(msg) => assert!(msg.contains("timed out"), "{}", msg),
            other => panic!("expected an oracle error, got {:?}", other),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
