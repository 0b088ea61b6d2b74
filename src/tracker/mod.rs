mod error;
mod sample;
mod telemetry;
mod tracker;
mod types;

pub use error::TrackerError;
pub use telemetry::TelemetryLog;
pub use tracker::{CycleReport, Devices, TrackingController};
pub use types::{PanelPosition, TrackerSettings};

#[cfg(test)]
pub use types::TrackerMode;
