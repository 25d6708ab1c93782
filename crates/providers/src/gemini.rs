//! Completion client for the Gemini `generateContent` endpoint.
//!
//! One POST per submission, no retry, no internal queuing. The HTTP status
//! is not consulted separately: the service reports failures through the
//! JSON `error` object, which we surface verbatim.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use shared::chat::Turn;
use shared::error::ChatError;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Default model; must support vision for the inline-image parts.
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

/// Seam between the session objects and the network. The API key is passed
/// per call because the credential holder owns its lifecycle.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn generate(&self, api_key: &str, contents: Vec<Turn>) -> Result<String, ChatError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Turn>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    error: Option<ErrorBody>,
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
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

pub struct GeminiClient {
    http: Client,
    model: String,
}

impl GeminiClient {
    pub fn new(model: &str) -> Self {
        Self {
            http: Client::new(),
            model: model.to_string(),
        }
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

#[async_trait]
impl CompletionClient for GeminiClient {
    async fn generate(&self, api_key: &str, contents: Vec<Turn>) -> Result<String, ChatError> {
        let url = format!("{}/{}:generateContent?key={}", BASE_URL, self.model, api_key);
        debug!(model = %self.model, turns = contents.len(), "sending generateContent request");

        let request = GenerateContentRequest { contents };
        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("transport failure: {}", e);
                ChatError::Network(e.to_string())
            })?;

        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;
        parse_completion(&body)
    }
}

/// Parse a response body into the generated text or a typed error.
/// Pure so the shapes can be pinned down in tests without a server.
pub fn parse_completion(body: &str) -> Result<String, ChatError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|_| ChatError::MalformedResponse)?;

    if let Some(error) = parsed.error {
        let message = error.message.unwrap_or_else(|| "unknown error".to_string());
        warn!("service reported error: {}", message);
        return Err(ChatError::Api(message));
    }

    let candidates = match parsed.candidates {
        Some(c) if !c.is_empty() => c,
        _ => return Err(ChatError::EmptyResponse),
    };

    candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .ok_or(ChatError::MalformedResponse)
}
