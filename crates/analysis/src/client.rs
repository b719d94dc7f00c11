//! Model service client.
//!
//! The pipeline only depends on the [`ModelClient`] trait; tests inject a
//! fake, production uses the blocking [`GeminiClient`] over HTTP.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a single model call.
#[derive(Error, Debug)]
pub enum ModelError {
    /// The service signalled quota exhaustion; the caller may retry.
    #[error("model service rate-limited the request: {0}")]
    RateLimited(String),

    /// Any other failure. Not retried.
    #[error("model call failed: {0}")]
    Call(String),
}

/// A generative-text service: takes instructions plus a document body,
/// returns the raw free-text reply.
pub trait ModelClient {
    fn generate(&self, instructions: &str, body: &str) -> Result<String, ModelError>;
}

/// Explicit model configuration, constructed at startup and passed into
/// the pipeline. No ambient global state.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub model: String,
}

impl ModelConfig {
    /// Configuration for the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-1.5-flash-latest".to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

const GENERATE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    config: ModelConfig,
}

impl GeminiClient {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            config,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl ModelClient for GeminiClient {
    fn generate(&self, instructions: &str, body: &str) -> Result<String, ModelError> {
        let url = format!(
            "{}/{}:generateContent",
            GENERATE_BASE_URL, self.config.model
        );
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart {
                        text: instructions.to_string(),
                    },
                    RequestPart {
                        text: body.to_string(),
                    },
                ],
            }],
        };

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .map_err(|e| ModelError::Call(format!("request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let detail = response.text().unwrap_or_default();
            return Err(ModelError::RateLimited(detail));
        }
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(ModelError::Call(format!(
                "service returned {}: {}",
                status, detail
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| ModelError::Call(format!("unreadable service response: {}", e)))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ModelError::Call("reply contained no text".to_string()));
        }

        Ok(text)
    }
}
