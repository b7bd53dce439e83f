pub mod handler;

pub use handler::{AppState, MODEL, handle_query};
