use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::{GenerationError, GenerationResult};
use crate::config;

/// Anything that turns a prompt into raw model text.
#[async_trait]
pub trait CourseGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> GenerationResult<String>;
}

/// Gemini `generateContent` over plain REST.
pub struct GeminiGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
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
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all parts joined.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiGenerator {
    pub fn new(config: &config::Generator, api_key: String) -> GenerationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.base_url().trim_end_matches('/'),
            config.model()
        );

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl CourseGenerator for GeminiGenerator {
    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn generate(&self, prompt: &str) -> GenerationResult<String> {
        let body = GenerateContentRequest {
            contents: [RequestContent {
                role: "user",
                parts: [RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.into_text().ok_or(GenerationError::EmptyResponse)?;
        tracing::debug!("generator returned {} bytes", text.len());
        Ok(text)
    }
}
