use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Every way the external generation service can let us down.
#[derive(Debug, Error)]
#[error("Failed to generate itinerary: {reason}")]
pub struct GenerationFailed {
    reason: String,
}

impl GenerationFailed {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<reqwest::Error> for GenerationFailed {
    fn from(err: reqwest::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Text in, text out. The seam where tests substitute a fake model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationFailed>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".into(),
            temperature: 0.7,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Google Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    settings: GenerationSettings,
}

impl GeminiClient {
    pub fn new(base_url: Url, api_key: Option<String>) -> Self {
        Self::with_settings(base_url, api_key, GenerationSettings::default())
    }

    pub fn with_settings(
        base_url: Url,
        api_key: Option<String>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key,
            settings,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    fn endpoint(&self) -> Result<Url, GenerationFailed> {
        self.base_url
            .join(&format!(
                "v1beta/models/{}:generateContent",
                self.settings.model
            ))
            .map_err(|err| GenerationFailed::new(format!("invalid endpoint: {err}")))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationFailed> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationFailed::new("GEMINI_API_KEY is not configured"))?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                top_p: self.settings.top_p,
                max_output_tokens: self.settings.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(self.endpoint()?)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationFailed::new(format!(
                "generation service returned {status}: {detail}"
            )));
        }

        let text = response.json::<GenerateContentResponse>().await?.text();
        if text.trim().is_empty() {
            return Err(GenerationFailed::new("generation service returned no text"));
        }
        debug!(chars = text.len(), model = %self.settings.model, "received model output");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const ENDPOINT: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn client_for(server: &MockServer, key: Option<&str>) -> GeminiClient {
        let base = Url::parse(&server.uri()).expect("mock server url");
        GeminiClient::new(base, key.map(str::to_string))
    }

    #[tokio::test]
    async fn returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "parts": [{ "text": "plan Bali" }] }],
                "generationConfig": { "maxOutputTokens": 8192 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "{\"destination\":" }, { "text": "\"Bali\"}" }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server, Some("test-key"))
            .generate("plan Bali")
            .await
            .expect("generation succeeds");
        assert_eq!(text, "{\"destination\":\"Bali\"}");
    }

    #[tokio::test]
    async fn service_error_is_generation_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("bad-key"))
            .generate("plan Bali")
            .await
            .unwrap_err();
        assert!(err.reason().contains("403"));
        assert!(err.reason().contains("API key not valid"));
    }

    #[tokio::test]
    async fn empty_candidates_are_generation_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("test-key"))
            .generate("plan Bali")
            .await
            .unwrap_err();
        assert_eq!(err.reason(), "generation service returned no text");
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_calling_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server, None).generate("plan Bali").await.unwrap_err();
        assert!(err.reason().contains("GEMINI_API_KEY"));
    }
}
