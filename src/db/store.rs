use std::str::FromStr;

use sqlx::Connection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};

use crate::db::QueryRecord;

const SCHEMA: &str = include_str!("schema.sql");

/// Factory for per-request SQLite connections.
///
/// Holds only the parsed connection options; every request opens its own
/// connection with [`Store::open`] and gives it back with
/// [`StoreConnection::close`].
#[derive(Clone, Debug)]
pub struct Store {
    options: SqliteConnectOptions,
}

impl Store {
    pub fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        Ok(Self { options })
    }

    pub async fn open(&self) -> Result<StoreConnection, sqlx::Error> {
        let conn = SqliteConnection::connect_with(&self.options).await?;
        Ok(StoreConnection { conn })
    }

    /// Creates the `queries` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.open().await?;
        let result = conn.ensure_schema().await;
        conn.close().await;
        result
    }
}

/// A connection scoped to a single request.
///
/// Dropping it without calling [`close`](Self::close) still releases the
/// underlying handle, just without a graceful shutdown.
pub struct StoreConnection {
    conn: SqliteConnection,
}

impl StoreConnection {
    pub async fn ensure_schema(&mut self) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(SCHEMA).execute(&mut self.conn).await?;
        Ok(())
    }

    /// Appends one record and commits it.
    pub async fn insert(&mut self, question: &str, answer: &str) -> Result<QueryRecord, sqlx::Error> {
        let mut tx = self.conn.begin().await?;

        let record = sqlx::query_as::<_, QueryRecord>(
            r#"
            INSERT INTO queries (question, answer)
            VALUES (?, ?)
            RETURNING id, question, answer, timestamp
            "#,
        )
        .bind(question)
        .bind(answer)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(record)
    }

    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            tracing::warn!("Failed to close database connection: {}", e);
        }
    }

    #[cfg(test)]
    pub async fn all_records(&mut self) -> Result<Vec<QueryRecord>, sqlx::Error> {
        sqlx::query_as::<_, QueryRecord>(
            "SELECT id, question, answer, timestamp FROM queries ORDER BY id",
        )
        .fetch_all(&mut self.conn)
        .await
    }

    #[cfg(test)]
    pub async fn execute_raw(&mut self, sql: &str) -> Result<(), sqlx::Error> {
        sqlx::raw_sql(sql).execute(&mut self.conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    fn temp_store(dir: &tempfile::TempDir) -> Store {
        let path = dir.path().join("queries.db");
        Store::new(&format!("sqlite:{}", path.display())).unwrap()
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();

        let mut conn = store.open().await.unwrap();

        let tables: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'queries'",
        )
        .fetch_one(&mut conn.conn)
        .await
        .unwrap();
        assert_eq!(tables, 1);

        let columns: Vec<String> = sqlx::query("PRAGMA table_info(queries)")
            .fetch_all(&mut conn.conn)
            .await
            .unwrap()
            .iter()
            .map(|row| row.get::<String, _>("name"))
            .collect();
        assert_eq!(columns, vec!["id", "question", "answer", "timestamp"]);

        conn.close().await;
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        store.ensure_schema().await.unwrap();

        let mut conn = store.open().await.unwrap();
        let first = conn.insert("What is 2+2?", "4").await.unwrap();
        let second = conn.insert("And 3+3?", "6").await.unwrap();
        conn.close().await;

        assert_eq!(first.question, "What is 2+2?");
        assert_eq!(first.answer, "4");
        assert!(second.id > first.id);

        let age = chrono::Utc::now().naive_utc() - first.timestamp;
        assert!(age.num_minutes().abs() < 5);
    }

    #[tokio::test]
    async fn inserts_are_visible_to_later_connections() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);
        store.ensure_schema().await.unwrap();

        let mut writer = store.open().await.unwrap();
        writer.insert("question", "answer").await.unwrap();
        writer.close().await;

        let mut reader = store.open().await.unwrap();
        let records = reader.all_records().await.unwrap();
        reader.close().await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question, "question");
        assert_eq!(records[0].answer, "answer");
    }

    #[tokio::test]
    async fn insert_without_schema_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = temp_store(&dir);

        let mut conn = store.open().await.unwrap();
        let result = conn.insert("question", "answer").await;
        conn.close().await;

        assert!(result.is_err());
    }
}
