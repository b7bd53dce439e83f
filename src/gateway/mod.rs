//! Outbound text generation.
//!
//! The request handler only sees [`TextGateway`], so tests can swap the
//! Gemini client for a stub.

pub mod client;
pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use client::create_client;
pub use gemini::GeminiGateway;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("AI service credential is not configured")]
    MissingCredential,

    #[error("AI service connection error: {0}")]
    Connection(String),

    #[error("AI service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response from AI service: {0}")]
    InvalidResponse(String),

    #[error("AI service returned no text")]
    EmptyResponse,

    #[error("HTTP error: {0}")]
    Http(String),
}

/// A remote service that turns a prompt into generated text.
#[async_trait]
pub trait TextGateway: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GatewayError>;
}
