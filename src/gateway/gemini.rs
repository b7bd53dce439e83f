//! Client for Gemini's `generateContent` endpoint.

use async_trait::async_trait;
use http_body_util::BodyExt;
use hyper::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use super::client::HttpClient;
use super::{GatewayError, TextGateway};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiGateway {
    client: HttpClient,
    api_base: String,
    api_key: Option<String>,
}

impl GeminiGateway {
    /// A gateway without a key can be built; every call then fails with
    /// [`GatewayError::MissingCredential`].
    pub fn new(client: HttpClient, api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, model)
    }
}

#[async_trait]
impl TextGateway for GeminiGateway {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GatewayError::MissingCredential)?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };
        let body =
            serde_json::to_string(&request).map_err(|e| GatewayError::Http(e.to_string()))?;

        let uri: hyper::Uri = self
            .endpoint(model)
            .parse()
            .map_err(|e| GatewayError::Http(format!("Invalid URL: {}", e)))?;

        let req = hyper::Request::builder()
            .method(hyper::Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, api_key)
            .body(body)
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        tracing::debug!(model, prompt_len = prompt.len(), "Sending request to Gemini");

        let response = self
            .client
            .request(req)
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?;

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| GatewayError::Connection(e.to_string()))?
            .to_bytes();

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body_bytes).to_string(),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_slice(&body_bytes)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        extract_text(&parsed).ok_or(GatewayError::EmptyResponse)
    }
}

/// Joins the text parts of the first candidate.
fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}
