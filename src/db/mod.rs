pub mod models;
pub mod store;

pub use models::QueryRecord;
pub use store::{Store, StoreConnection};
