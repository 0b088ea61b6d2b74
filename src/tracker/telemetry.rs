use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::sample::TelemetryRecord;

/// Append-only CSV log, one line per cycle.
#[derive(Debug, Clone)]
pub struct TelemetryLog {
    path: PathBuf,
}

impl TelemetryLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &TelemetryRecord) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", record.to_line())
    }
}
