//! # ojra-db: Persistence Layer for Ojra
//!
//! Local SQLite storage for the one thing that must survive a restart (the
//! trip snapshot) and for analytics events waiting to be delivered.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Ojra Data Flow                                 │
//! │                                                                         │
//! │  FareEngine transition ──► observers (console app)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     ojra-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │ SqlitePool    │◄───│ SnapshotRepo   │   │ 001_initial  │  │   │
//! │  │   │               │    │ AnalyticsRepo  │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ~/.local/share/ojra/ojra.db (platform data dir)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Snapshot store and analytics outbox
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ojra_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("ojra.db")).await?;
//!
//! db.snapshots().save("ojraState", &engine.snapshot()).await?;
//! let restored = db.snapshots().load("ojraState").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::analytics::{AnalyticsOutboxEntry, AnalyticsOutboxRepository};
pub use repository::snapshot::SnapshotRepository;
