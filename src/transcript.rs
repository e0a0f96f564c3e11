//! Run transcript
//!
//! Appends one JSON line per executed step so a run can be reviewed later.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Entry in the transcript
#[derive(Debug, Serialize)]
struct TranscriptEntry<'a> {
    timestamp: DateTime<Utc>,
    run_id: Uuid,
    step: &'a str,
    result: Option<&'a Value>,
    error: Option<String>,
    duration_ms: u64,
    status: &'static str,
}

/// JSONL writer for one run
#[derive(Debug)]
pub struct Transcript {
    path: Option<PathBuf>,
    run_id: Uuid,
}

impl Transcript {
    /// Transcript writing to `path` (JSONL, appended)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            run_id: Uuid::new_v4(),
        }
    }

    /// Transcript that records nothing
    pub fn disabled() -> Self {
        Self {
            path: None,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn from_config(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::new(path),
            None => Self::disabled(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Record the outcome of `step`
    ///
    /// Write failures are logged and otherwise ignored.
    pub fn record(&self, step: &str, outcome: Result<&Value, &crate::Error>, duration_ms: u64) {
        let Some(path) = &self.path else {
            return;
        };

        let (result, error, status) = match outcome {
            Ok(value) => (Some(value), None, "success"),
            Err(e) => (None, Some(e.to_string()), "error"),
        };

        let entry = TranscriptEntry {
            timestamp: Utc::now(),
            run_id: self.run_id,
            step,
            result,
            error,
            duration_ms,
            status,
        };

        if let Err(e) = append(path, &entry) {
            tracing::warn!(error = %e, path = %path.display(), "Failed to write transcript entry");
        }
    }
}

fn append(path: &Path, entry: &TranscriptEntry<'_>) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    let json = serde_json::to_string(entry)?;
    writeln!(file, "{}", json)?;
    Ok(())
}
