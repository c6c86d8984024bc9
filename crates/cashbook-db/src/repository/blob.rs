//! # Blob Repository
//!
//! Raw key/value access to the `kv_store` table.
//!
//! Values are opaque text here. Parsing and repair happen one layer up in
//! [`crate::repository::ledger`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for the `kv_store` table.
#[derive(Debug, Clone)]
pub struct BlobRepository {
    pool: SqlitePool,
}

impl BlobRepository {
    /// Creates a new BlobRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BlobRepository { pool }
    }

    /// Reads a value. `None` when the key was never written.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(key = %key, found = value.is_some(), "Read blob");
        Ok(value)
    }

    /// Inserts or replaces a value.
    pub async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        self.put_many(&[(key, value)]).await
    }

    /// Writes several values in one SQLite transaction.
    ///
    /// Either every entry is stored or none is.
    pub async fn put_many(&self, entries: &[(&str, &str)]) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for &(key, value) in entries {
            sqlx::query(
                r#"
                INSERT INTO kv_store (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(now.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(count = entries.len(), "Wrote blobs");
        Ok(())
    }

    /// Removes a key. Returns true if it existed.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, removed = result.rows_affected(), "Deleted blob");
        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_put_get_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let blobs = db.blobs();

        assert_eq!(blobs.get("k").await.unwrap(), None);

        blobs.put("k", "one").await.unwrap();
        blobs.put("k", "two").await.unwrap();
        assert_eq!(blobs.get("k").await.unwrap().as_deref(), Some("two"));

        assert!(blobs.delete("k").await.unwrap());
        assert!(!blobs.delete("k").await.unwrap());
        assert_eq!(blobs.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_many() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let blobs = db.blobs();

        blobs.put_many(&[("a", "[]"), ("b", "{}")]).await.unwrap();
        assert_eq!(blobs.get("a").await.unwrap().as_deref(), Some("[]"));
        assert_eq!(blobs.get("b").await.unwrap().as_deref(), Some("{}"));
    }
}
