use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("calibration table not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("corrupt calibration table (record {record}): {reason}")]
    Corrupt { record: usize, reason: String },
    #[error("calibration table IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CalibrationError {
    /// Missing or damaged stores are fixed by regenerating the table.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CalibrationError::NotFound(_) | CalibrationError::Corrupt { .. }
        )
    }
}
