use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::calibration::AxisRange;
use crate::hardware::LightReading;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackerMode {
    Idle,
    Seeking,
    Holding,
    Parked,
}

/// A commanded panel orientation, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelPosition {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

impl PanelPosition {
    pub fn new(azimuth_deg: f64, elevation_deg: f64) -> Self {
        Self {
            azimuth_deg,
            elevation_deg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControllerState {
    pub mode: TrackerMode,
    pub last_commanded: PanelPosition,
    pub feedback_iterations_remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// Closed-loop hunt length per cycle.
    pub feedback_iterations: u32,
    /// Allowed sensor deviation from the setpoint before a nudge.
    pub deadband: i32,
    /// Sensor reading when the panel faces the sun.
    pub setpoint: LightReading,
    pub azimuth_limits: AxisRange,
    pub elevation_limits: AxisRange,
    pub park: PanelPosition,
    #[serde(deserialize_with = "crate::config::deserialize_duration")]
    pub pwm_settle: Duration,
    #[serde(deserialize_with = "crate::config::deserialize_duration")]
    pub step_settle: Duration,
    #[serde(deserialize_with = "crate::config::deserialize_duration")]
    pub interval: Duration,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            feedback_iterations: 10,
            deadband: 10,
            setpoint: LightReading {
                azimuth: 127,
                elevation: 127,
            },
            azimuth_limits: AxisRange::new(45.0, 315.0),
            elevation_limits: AxisRange::new(0.0, 90.0),
            park: PanelPosition::new(180.0, 0.0),
            pwm_settle: Duration::from_millis(250),
            step_settle: Duration::from_millis(1),
            interval: Duration::from_secs(30),
        }
    }
}

impl TrackerSettings {
    pub fn clamp(&self, position: PanelPosition) -> PanelPosition {
        PanelPosition {
            azimuth_deg: clamp_finite(position.azimuth_deg, self.azimuth_limits),
            elevation_deg: clamp_finite(position.elevation_deg, self.elevation_limits),
        }
    }
}

fn clamp_finite(value: f64, limits: AxisRange) -> f64 {
    if value.is_nan() {
        limits.min
    } else {
        limits.clamp(value)
    }
}
