use chrono::NaiveDateTime;

/// One answered question as stored in the `queries` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QueryRecord {
    pub id: i64,
    pub question: String,
    pub answer: String,
    /// Assigned by SQLite's `CURRENT_TIMESTAMP` (UTC).
    pub timestamp: NaiveDateTime,
}
