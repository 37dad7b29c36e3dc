//! # Repository Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SnapshotPersister (console)     AnalyticsRecorder (console)           │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  SnapshotRepository              AnalyticsOutboxRepository              │
//! │  ├── save(key, &snapshot)        ├── queue(name, properties)           │
//! │  ├── load(key)                   ├── get_pending(limit)                │
//! │  └── delete(key)                 ├── pending_count()                   │
//! │                                  └── mark_delivered / mark_failed      │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  snapshots                        analytics_outbox                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SnapshotRepository`](snapshot::SnapshotRepository) - Keyed trip snapshot store
//! - [`AnalyticsOutboxRepository`](analytics::AnalyticsOutboxRepository) - Usage event queue

pub mod analytics;
pub mod snapshot;
