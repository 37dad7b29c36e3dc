//! # Ojra Console Library
//!
//! Wires the fare engine to a database and a line-based shell.
//!
//! ## Module Organization
//! ```text
//! ojra_console/
//! ├── lib.rs          ◄─── You are here (startup & shutdown)
//! ├── config.rs       ◄─── Environment configuration
//! ├── state.rs        ◄─── Shared engine handle
//! ├── observers.rs    ◄─── Snapshot + analytics observers, store writer
//! ├── commands.rs     ◄─── One function per user action
//! ├── shell.rs        ◄─── stdin command parser, JSON replies
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod observers;
pub mod shell;
pub mod state;

use tokio::io::{self, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use error::StartupError;
use observers::{spawn_store_writer, AnalyticsRecorder, SnapshotPersister};
use ojra_core::FareEngine;
use ojra_db::{Database, DbConfig, DbError};
use state::EngineState;

/// Runs the console until stdin closes or `quit` is read.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Console Startup                                   │
/// │                                                                         │
/// │  1. Initialize Logging (stderr; stdout carries replies only)            │
/// │  2. Load AppConfig from OJRA_* variables                                │
/// │  3. Connect to Database, run migrations                                 │
/// │  4. Restore the saved trip (corrupt snapshot ──► fresh trip)            │
/// │  5. Start store writer, subscribe observers                             │
/// │  6. Run shell over stdin/stdout                                         │
/// │  7. Drop engine ──► writer drains queue ──► close pool                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), StartupError> {
    init_tracing();

    info!("Starting Ojra console");

    let config = AppConfig::load()?;
    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    info!(db_path = ?config.db_path, "Database path determined");

    let db = Database::new(DbConfig::new(&config.db_path)).await?;
    info!("Database connected and migrations applied");

    let mut engine = FareEngine::new(config.engine_config());
    restore_snapshot(&db, &mut engine, &config.state_key).await?;

    let (jobs, writer) = spawn_store_writer(db.clone());
    engine.subscribe(Box::new(SnapshotPersister::new(jobs.clone())));
    engine.subscribe(Box::new(AnalyticsRecorder::new(jobs)));

    let state = EngineState::new(engine);
    shell::run_shell(&state, BufReader::new(io::stdin()), io::stdout()).await?;

    // The observers hold the last senders; dropping the engine lets the
    // writer finish its queue and stop.
    drop(state);
    if let Err(e) = writer.await {
        warn!(error = %e, "Store writer task failed");
    }

    db.close().await;
    info!("Ojra console stopped");
    Ok(())
}

/// Loads the saved trip into the engine, if there is one.
///
/// An unreadable snapshot is logged and skipped so the console still
/// starts; any other database error is returned.
pub async fn restore_snapshot(
    db: &Database,
    engine: &mut FareEngine,
    key: &str,
) -> Result<bool, DbError> {
    match db.snapshots().load(key).await {
        Ok(Some(snapshot)) => {
            engine.restore(snapshot);
            Ok(true)
        }
        Ok(None) => {
            info!(key, "No saved trip; starting fresh");
            Ok(false)
        }
        Err(DbError::Corrupt(reason)) => {
            warn!(key, %reason, "Saved trip unreadable; starting fresh");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=ojra=trace` - Show trace for ojra crates only
/// - Default: INFO, DEBUG for ojra crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ojra=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use ojra_core::{EngineConfig, Money, TripEvent, VehicleType};

    #[tokio::test]
    async fn test_restore_saved_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut first = FareEngine::new(EngineConfig::default());
        first
            .dispatch(TripEvent::SelectVehicle {
                vehicle_type: VehicleType::Minibus,
            })
            .unwrap();
        first
            .dispatch(TripEvent::SetCostPerPerson {
                amount: Money::from_major(7),
            })
            .unwrap();
        db.snapshots().save("ojraState", &first.snapshot()).await.unwrap();

        let mut second = FareEngine::new(EngineConfig::default());
        assert!(restore_snapshot(&db, &mut second, "ojraState").await.unwrap());
        assert_eq!(second.snapshot(), first.snapshot());
    }

    #[tokio::test]
    async fn test_missing_snapshot_starts_fresh() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut engine = FareEngine::new(EngineConfig::default());

        assert!(!restore_snapshot(&db, &mut engine, "ojraState").await.unwrap());
        assert_eq!(engine.state().ledger().len(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_fresh() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("INSERT INTO snapshots (key, payload, updated_at) VALUES ('ojraState', 'not json', '2026-01-01T00:00:00Z')")
            .execute(db.pool())
            .await
            .unwrap();

        let mut engine = FareEngine::new(EngineConfig::default());
        assert!(!restore_snapshot(&db, &mut engine, "ojraState").await.unwrap());
    }
}
