//! # Snapshot Repository
//!
//! One row per key holding the latest `TripSnapshot` as JSON. Every save is
//! a full overwrite; there is no history.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use ojra_core::TripSnapshot;

/// Repository for trip snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    /// Creates a new SnapshotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    /// Stores `snapshot` under `key`, replacing whatever was there.
    pub async fn save(&self, key: &str, snapshot: &TripSnapshot) -> DbResult<()> {
        let payload = serde_json::to_string(snapshot)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO snapshots (key, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(&payload)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = payload.len(), "Snapshot saved");
        Ok(())
    }

    /// Loads the snapshot stored under `key`.
    ///
    /// ## Returns
    /// * `Ok(None)` - Nothing saved yet
    /// * `Err(DbError::Corrupt)` - A row exists but is not a valid snapshot
    pub async fn load(&self, key: &str) -> DbResult<Option<TripSnapshot>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM snapshots WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Removes the snapshot under `key`. Returns whether a row existed.
    pub async fn delete(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM snapshots WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
