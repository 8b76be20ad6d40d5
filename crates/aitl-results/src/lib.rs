//! aitl-results: saved runs and timeseries export.

pub mod export;
pub mod store;
pub mod types;

use aitl_sim::SimRecord;
use chrono::Utc;

pub use export::{CSV_HEADER, ticks_to_csv};
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Run already exists: {run_id}")]
    RunExists { run_id: String },
}

/// Manifest for a finished simulation, stamped with the current time.
pub fn manifest_for(record: &SimRecord) -> RunManifest {
    let now = Utc::now();
    RunManifest {
        run_id: run_id_for(&record.scenario, now),
        scenario: record.scenario.clone(),
        timestamp: now.to_rfc3339(),
        dt_s: record.dt_s,
        record_count: record.ticks.len(),
        summary: record.summary.clone(),
    }
}
