use axum::{Json, extract::State};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::db::{Store, StoreConnection};
use crate::error::QueryError;
use crate::gateway::TextGateway;

/// Model every question is sent to.
pub const MODEL: &str = "gemini-2.5-flash";

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub gateway: Arc<dyn TextGateway>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
}

pub async fn handle_query(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<QueryResponse>, QueryError> {
    let start_time = Utc::now();

    let question = extract_question(&body).ok_or(QueryError::EmptyQuestion)?;
    tracing::info!("Received question: {}", question);

    // The connection is closed on every path once it has been opened
    let mut conn = state.store.open().await?;
    let result = answer_and_record(state.gateway.as_ref(), &mut conn, &question).await;
    conn.close().await;
    let answer = result?;

    let duration_ms = (Utc::now() - start_time).num_milliseconds().max(0);
    tracing::info!(duration_ms, "Answered question");

    Ok(Json(QueryResponse { answer }))
}

async fn answer_and_record(
    gateway: &dyn TextGateway,
    conn: &mut StoreConnection,
    question: &str,
) -> Result<String, QueryError> {
    let answer = gateway.generate(MODEL, question).await?;

    let record = conn.insert(question, &answer).await?;
    tracing::info!(id = record.id, timestamp = %record.timestamp, "Query saved to database");

    Ok(answer)
}

/// Trimmed `question` from a JSON body, or `None` when the body is not a
/// JSON object or the question is missing or blank.
fn extract_question(body: &[u8]) -> Option<String> {
    let request: Value = serde_json::from_slice(body).ok()?;
    let question = request
        .as_object()?
        .get("question")?
        .as_str()?
        .trim()
        .to_string();

    if question.is_empty() {
        None
    } else {
        Some(question)
    }
}
