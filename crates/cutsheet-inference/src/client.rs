//! Gemini HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};

use crate::error::{InferenceError, InferenceResult};
use crate::types::{
    Content, FileData, GeminiRequest, GeminiResponse, GenerationConfig, Part,
};

/// Default output-length bound for one analysis.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 8000;

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key
    pub api_key: String,
    /// API base URL (overridable for tests)
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Request timeout. Video analysis can take minutes.
    pub timeout: Duration,
    /// Output-length bound passed to the provider
    pub max_output_tokens: u32,
}

impl GeminiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> InferenceResult<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| InferenceError::config("GEMINI_API_KEY not set"))?;

        Ok(Self {
            api_key,
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            timeout: Duration::from_secs(
                std::env::var("GEMINI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            max_output_tokens: std::env::var("GEMINI_MAX_OUTPUT_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
        })
    }
}

/// Gemini API client.
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> InferenceResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(InferenceError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> InferenceResult<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Analyze a video and return the raw response text.
    ///
    /// The single blocking step of a processing run. A missing, non-text
    /// or empty response is an error; so is any non-2xx status.
    pub async fn analyze_video(&self, prompt: &str, video_url: &str) -> InferenceResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text(prompt.to_string()),
                    Part::FileData(FileData {
                        mime_type: "video/mp4".to_string(),
                        file_uri: video_url.to_string(),
                    }),
                ],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        debug!(model = %self.config.model, "sending video analysis request");

        let response = self.http.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::request_failed(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            InferenceError::request_failed(format!("failed to parse provider response: {}", e))
        })?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| strip_fences(&p.text).to_string())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(InferenceError::EmptyResponse);
        }

        info!(chars = text.len(), "received analysis text");
        Ok(text)
    }
}

/// Tolerate models that wrap their output in a markdown code fence.
fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```markdown")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> GeminiConfig {
        GeminiConfig {
            api_key: "test-key".to_string(),
            base_url,
            model: "gemini-2.5-flash".to_string(),
            timeout: Duration::from_secs(5),
            max_output_tokens: 8000,
        }
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}]}}]
        })
    }

    #[tokio::test]
    async fn test_analyze_video_returns_raw_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"maxOutputTokens": 8000}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(candidate_body("**0:00 - 0:05**")),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(server.uri())).unwrap();
        let text = client
            .analyze_video("describe the scenes", "https://cdn.example/video.mp4")
            .await
            .unwrap();

        assert_eq!(text, "**0:00 - 0:05**");
    }

    #[tokio::test]
    async fn test_fenced_output_is_unwrapped() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
                "```markdown\n**0:00 - 0:05**\n**Plan Wide:** Sky.\n```",
            )))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(server.uri())).unwrap();
        let text = client.analyze_video("p", "https://v").await.unwrap();

        assert_eq!(text, "**0:00 - 0:05**\n**Plan Wide:** Sky.");
    }

    #[tokio::test]
    async fn test_http_error_is_request_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(server.uri())).unwrap();
        let err = client.analyze_video("p", "https://v").await.unwrap_err();

        assert!(matches!(err, InferenceError::RequestFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(server.uri())).unwrap();
        let err = client.analyze_video("p", "https://v").await.unwrap_err();

        assert!(matches!(err, InferenceError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_blank_text_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("   \n  ")))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(server.uri())).unwrap();
        let err = client.analyze_video("p", "https://v").await.unwrap_err();

        assert!(matches!(err, InferenceError::EmptyResponse));
    }
}
