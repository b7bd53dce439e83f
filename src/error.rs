use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::gateway::GatewayError;

pub const NO_QUESTION_MESSAGE: &str = "No question provided.";
pub const UPSTREAM_FAILURE_MESSAGE: &str = "An error occurred while contacting the AI.";

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("No question provided")]
    EmptyQuestion,

    #[error("AI gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        // Upstream and storage failures share one client-facing message
        let (status, error_message) = match self {
            QueryError::EmptyQuestion => (StatusCode::BAD_REQUEST, NO_QUESTION_MESSAGE),
            QueryError::Gateway(_) | QueryError::Database(_) => {
                tracing::error!("Error during AI query or database operation: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_FAILURE_MESSAGE)
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}
