use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::query::{self, AppState};
use crate::site;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Static page
        .route("/", get(site::index))
        // Question endpoint
        .route("/api/query", post(query::handle_query))
        .with_state(state)
}
