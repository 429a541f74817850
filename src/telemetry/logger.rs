//! # Telemetry Logger
//!
//! Writes published telemetry snapshots to rotating JSONL files.
//!
//! This module handles:
//! - Formatting snapshots as JSONL (JSON Lines) via serde_json
//! - Writing to rotating log files (max N records per file)
//! - Retaining only the last M files

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, TelemetryBridgeError};
use crate::telemetry::types::CalibratedTelemetry;

/// One JSONL record: a snapshot plus its RFC3339 capture time.
#[derive(Debug, Serialize)]
struct TelemetryRecord<'a> {
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    telemetry: &'a CalibratedTelemetry,
}

/// Rotating JSONL writer for telemetry snapshots.
pub struct JsonlLogger {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    current_file: Option<File>,
    records_in_current_file: usize,
    file_index: u64,
}

impl std::fmt::Debug for JsonlLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlLogger")
            .field("log_dir", &self.log_dir)
            .field("file_index", &self.file_index)
            .field("records_in_current_file", &self.records_in_current_file)
            .finish_non_exhaustive()
    }
}

impl JsonlLogger {
    /// Creates a logger rooted at `log_dir`, creating the directory if
    /// needed.
    ///
    /// # Arguments
    ///
    /// * `log_dir` - Directory that receives `telemetry-NNNNNN.jsonl` files
    /// * `max_records_per_file` - Rotation threshold, must be > 0
    /// * `max_files_to_keep` - Retention limit, must be > 0
    ///
    /// # Errors
    ///
    /// Returns error if the limits are zero or the directory cannot be
    /// created.
    pub fn new<P: AsRef<Path>>(
        log_dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        if max_records_per_file == 0 {
            return Err(TelemetryBridgeError::TelemetryLog(
                "max_records_per_file must be greater than 0".to_string(),
            ));
        }
        if max_files_to_keep == 0 {
            return Err(TelemetryBridgeError::TelemetryLog(
                "max_files_to_keep must be greater than 0".to_string(),
            ));
        }

        let log_dir = log_dir.as_ref().to_path_buf();
        fs::create_dir_all(&log_dir)?;

        Ok(Self {
            log_dir,
            max_records_per_file,
            max_files_to_keep,
            current_file: None,
            records_in_current_file: 0,
            file_index: 0,
        })
    }

    /// Appends one snapshot as a JSON line, rotating the file when full.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the file write fails.
    pub fn log(&mut self, telemetry: &CalibratedTelemetry, timestamp: DateTime<Utc>) -> Result<()> {
        if self.current_file.is_none() || self.records_in_current_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let record = TelemetryRecord { timestamp, telemetry };
        let line = serde_json::to_string(&record)
            .map_err(|e| TelemetryBridgeError::TelemetryLog(format!("Failed to serialize record: {}", e)))?;

        // rotate() above guarantees an open file here.
        if let Some(file) = self.current_file.as_mut() {
            writeln!(file, "{}", line)?;
            self.records_in_current_file += 1;
        }

        Ok(())
    }

    /// Opens the next log file and prunes files beyond the retention limit.
    fn rotate(&mut self) -> Result<()> {
        self.file_index += 1;
        let path = self.log_dir.join(format!("telemetry-{:06}.jsonl", self.file_index));

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Rotated telemetry log to {}", path.display());

        self.current_file = Some(file);
        self.records_in_current_file = 0;
        self.prune_old_files();
        Ok(())
    }

    /// Deletes the oldest log files past the retention limit.
    ///
    /// Pruning failures are logged and swallowed; losing old telemetry logs
    /// must not interrupt the frame path.
    fn prune_old_files(&self) {
        let mut files = match self.list_log_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("Failed to list telemetry logs for pruning: {}", e);
                return;
            }
        };

        files.sort();
        while files.len() > self.max_files_to_keep {
            let oldest = files.remove(0);
            if let Err(e) = fs::remove_file(&oldest) {
                warn!("Failed to prune telemetry log {}: {}", oldest.display(), e);
            }
        }
    }

    fn list_log_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.log_dir)? {
            let path = entry?.path();
            let is_log = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("telemetry-") && name.ends_with(".jsonl"));
            if is_log {
                files.push(path);
            }
        }
        Ok(files)
    }
}
