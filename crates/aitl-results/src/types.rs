//! Result data types.

use aitl_sim::RunSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type RunId = String;

pub use aitl_sim::TickRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario: String,
    pub timestamp: String,
    pub dt_s: f64,
    pub record_count: usize,
    pub summary: RunSummary,
}

/// Run id of the form `<scenario>_<YYYYmmdd_HHMMSS_mmm>`.
///
/// Ids are only unique to the millisecond; [`RunStore::save_new_run`](crate::RunStore::save_new_run)
/// adds a suffix when a directory with the same id already exists.
pub fn run_id_for(scenario: &str, at: DateTime<Utc>) -> RunId {
    let slug: String = scenario
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}_{}", slug, at.format("%Y%m%d_%H%M%S_%3f"))
}
