use thiserror::Error;

use crate::hardware::HardwareError;
use crate::solar::SolarError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("solar target error: {0}")]
    Solar(#[from] SolarError),
    #[error("hardware error: {0}")]
    Hardware(#[from] HardwareError),
}
