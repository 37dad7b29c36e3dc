//! # Engine Observers
//!
//! Persistence and analytics hook into the engine here. Neither may slow a
//! command down or fail it, so both only enqueue work for a single writer
//! task that owns the database calls.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FareEngine::dispatch (inside EngineState lock)                         │
//! │       │                                                                 │
//! │       ├── SnapshotPersister  ──► WriteJob::SaveSnapshot ─┐              │
//! │       └── AnalyticsRecorder  ──► WriteJob::QueueEvent  ──┤              │
//! │                                                          ▼              │
//! │                                   mpsc (unbounded, FIFO)                │
//! │                                                          │              │
//! │                                          store writer task              │
//! │                                   ├── snapshots().save(key, snap)       │
//! │                                   └── analytics().queue(name, props)    │
//! │                                                                         │
//! │  Jobs are handled strictly in send order, so the stored snapshot is     │
//! │  always the one from the latest transition. Failures are logged.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::{Map, Value};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use ojra_core::{Transition, TripObserver, TripSnapshot};
use ojra_db::Database;

/// Work for the store writer.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteJob {
    SaveSnapshot {
        key: String,
        snapshot: TripSnapshot,
    },
    QueueEvent {
        name: &'static str,
        properties: Map<String, Value>,
    },
}

/// Starts the writer task. It runs until every sender is dropped, then
/// finishes the jobs already queued and exits.
pub fn spawn_store_writer(db: Database) -> (UnboundedSender<WriteJob>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<WriteJob>();

    let handle = tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            write(&db, job).await;
        }
        debug!("Store writer stopped");
    });

    (tx, handle)
}

async fn write(db: &Database, job: WriteJob) {
    match job {
        WriteJob::SaveSnapshot { key, snapshot } => {
            if let Err(e) = db.snapshots().save(&key, &snapshot).await {
                warn!(error = %e, key = %key, "Snapshot save failed");
            }
        }
        WriteJob::QueueEvent { name, properties } => {
            if let Err(e) = db.analytics().queue(name, &properties).await {
                warn!(error = %e, event = name, "Analytics event dropped");
            }
        }
    }
}

/// Saves the full snapshot after every transition.
#[derive(Debug, Clone)]
pub struct SnapshotPersister {
    jobs: UnboundedSender<WriteJob>,
}

impl SnapshotPersister {
    pub fn new(jobs: UnboundedSender<WriteJob>) -> Self {
        SnapshotPersister { jobs }
    }
}

impl TripObserver for SnapshotPersister {
    fn on_transition(&self, transition: &Transition<'_>) {
        let job = WriteJob::SaveSnapshot {
            key: transition.config.state_key.clone(),
            snapshot: transition.state.snapshot(),
        };
        if self.jobs.send(job).is_err() {
            warn!("Store writer gone; snapshot not saved");
        }
    }
}

/// Queues one analytics event per transition.
#[derive(Debug, Clone)]
pub struct AnalyticsRecorder {
    jobs: UnboundedSender<WriteJob>,
}

impl AnalyticsRecorder {
    pub fn new(jobs: UnboundedSender<WriteJob>) -> Self {
        AnalyticsRecorder { jobs }
    }
}

impl TripObserver for AnalyticsRecorder {
    fn on_transition(&self, transition: &Transition<'_>) {
        let job = WriteJob::QueueEvent {
            name: transition.event.name(),
            properties: transition.event.properties(),
        };
        if self.jobs.send(job).is_err() {
            debug!(event = transition.event.name(), "Store writer gone; event dropped");
        }
    }
}
