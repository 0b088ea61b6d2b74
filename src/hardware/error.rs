use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("device IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unreadable value {value:?} from {}", .path.display())]
    InvalidReading { path: PathBuf, value: String },
    #[error("actuator fault: {0}")]
    Actuator(String),
}
