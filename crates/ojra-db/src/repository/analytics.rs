//! # Analytics Outbox Repository
//!
//! Usage events are written locally first and delivered later by whatever
//! picks them up; recording never waits on a network.
//!
//! ## Outbox Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  queue(name, props)                                                     │
//! │       │   INSERT (attempts = 0, delivered_at = NULL)                    │
//! │       ▼                                                                 │
//! │  get_pending(limit)   WHERE delivered_at IS NULL ORDER BY created_at    │
//! │       │                                                                 │
//! │       ├── sent     → mark_delivered(id)   delivered_at = now            │
//! │       └── not sent → mark_failed(id, e)   attempts += 1, last_error     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// One queued analytics event.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AnalyticsOutboxEntry {
    pub id: String,
    pub event_name: String,
    /// JSON object text.
    pub properties: String,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl AnalyticsOutboxEntry {
    /// Parses the stored properties back into a JSON object.
    pub fn properties_map(&self) -> DbResult<Map<String, Value>> {
        Ok(serde_json::from_str(&self.properties)?)
    }
}

/// Repository for analytics outbox operations.
#[derive(Debug, Clone)]
pub struct AnalyticsOutboxRepository {
    pool: SqlitePool,
}

impl AnalyticsOutboxRepository {
    /// Creates a new AnalyticsOutboxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AnalyticsOutboxRepository { pool }
    }

    /// Queues an event for delivery.
    pub async fn queue(
        &self,
        event_name: &str,
        properties: &Map<String, Value>,
    ) -> DbResult<AnalyticsOutboxEntry> {
        let entry = AnalyticsOutboxEntry {
            id: Uuid::new_v4().to_string(),
            event_name: event_name.to_string(),
            properties: serde_json::to_string(properties)?,
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
            delivered_at: None,
        };

        debug!(event = %event_name, id = %entry.id, "Queuing analytics event");

        sqlx::query(
            r#"
            INSERT INTO analytics_outbox (
                id, event_name, properties, attempts, last_error, created_at, delivered_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.event_name)
        .bind(&entry.properties)
        .bind(entry.attempts)
        .bind(&entry.last_error)
        .bind(entry.created_at)
        .bind(entry.delivered_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Undelivered events, oldest first.
    pub async fn get_pending(&self, limit: u32) -> DbResult<Vec<AnalyticsOutboxEntry>> {
        let entries = sqlx::query_as::<_, AnalyticsOutboxEntry>(
            r#"
            SELECT id, event_name, properties, attempts, last_error, created_at, delivered_at
            FROM analytics_outbox
            WHERE delivered_at IS NULL
            ORDER BY created_at ASC, rowid ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Counts undelivered events.
    pub async fn pending_count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM analytics_outbox WHERE delivered_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Marks an entry as delivered.
    pub async fn mark_delivered(&self, id: &str) -> DbResult<()> {
        sqlx::query("UPDATE analytics_outbox SET delivered_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Records a failed delivery attempt.
    pub async fn mark_failed(&self, id: &str, error: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE analytics_outbox SET
                attempts = attempts + 1,
                last_error = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
