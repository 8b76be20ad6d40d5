//! On-disk run store.
//!
//! Each run lives in `<root>/<run_id>/` as a pretty-printed `manifest.json`
//! plus one JSON tick record per line in `timeseries.jsonl`. Saved runs are
//! never overwritten.

use crate::types::{RunId, RunManifest, TickRecord};
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "manifest.json";
const TIMESERIES_FILE: &str = "timeseries.jsonl";

/// Directory of saved simulation runs.
#[derive(Clone, Debug)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    /// Open a store rooted at `root_dir`, creating the directory if needed.
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join(MANIFEST_FILE).exists()
    }

    /// Save a run under exactly `manifest.run_id`.
    ///
    /// # Errors
    ///
    /// [`ResultsError::RunExists`] if a run directory with that id is already present.
    pub fn save_run(&self, manifest: &RunManifest, records: &[TickRecord]) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        match fs::create_dir(&run_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ResultsError::RunExists {
                    run_id: manifest.run_id.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        }
        write_run(&run_dir, manifest, records)
    }

    /// Save a run, suffixing its id with `_2`, `_3`, ... until a free
    /// directory is found. Returns the manifest as stored.
    pub fn save_new_run(
        &self,
        mut manifest: RunManifest,
        records: &[TickRecord],
    ) -> ResultsResult<RunManifest> {
        let base: RunId = manifest.run_id.clone();
        let mut attempt = 1usize;
        let run_dir = loop {
            let candidate = if attempt == 1 {
                base.clone()
            } else {
                format!("{base}_{attempt}")
            };
            let dir = self.run_dir(&candidate);
            match fs::create_dir(&dir) {
                Ok(()) => {
                    manifest.run_id = candidate;
                    break dir;
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        };
        write_run(&run_dir, &manifest, records)?;
        Ok(manifest)
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let path = self.run_dir(run_id).join(MANIFEST_FILE);
        let content = read_run_file(&path, run_id)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_timeseries(&self, run_id: &str) -> ResultsResult<Vec<TickRecord>> {
        let path = self.run_dir(run_id).join(TIMESERIES_FILE);
        let content = read_run_file(&path, run_id)?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(ResultsError::from))
            .collect()
    }

    /// All saved runs, most recent first. Directories without a readable
    /// manifest are skipped.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let run_id = entry.file_name().to_string_lossy().to_string();
            if let Ok(manifest) = self.load_manifest(&run_id) {
                runs.push(manifest);
            }
        }

        runs.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.run_id.cmp(&a.run_id))
        });
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

fn write_run(run_dir: &Path, manifest: &RunManifest, records: &[TickRecord]) -> ResultsResult<()> {
    fs::write(
        run_dir.join(MANIFEST_FILE),
        serde_json::to_string_pretty(manifest)?,
    )?;

    let mut lines = String::new();
    for record in records {
        lines.push_str(&serde_json::to_string(record)?);
        lines.push('\n');
    }
    fs::write(run_dir.join(TIMESERIES_FILE), lines)?;
    Ok(())
}

fn read_run_file(path: &Path, run_id: &str) -> ResultsResult<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ResultsError::RunNotFound {
            run_id: run_id.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}
