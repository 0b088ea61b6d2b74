use serde::{Deserialize, Serialize};

/// Logical pointing range of the azimuth axis, whole degrees.
pub const AZIMUTH_RANGE: AxisRange = AxisRange::new(0.0, 360.0);
/// Logical pointing range of the elevation axis, whole degrees.
pub const ELEVATION_RANGE: AxisRange = AxisRange::new(0.0, 90.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains_range(&self, other: &AxisRange) -> bool {
        other.min >= self.min && other.max <= self.max && other.min <= other.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingDirection {
    /// Actuator units grow with the logical angle.
    Ascending,
    /// Actuator units shrink as the logical angle grows.
    Descending,
}

/// Travel limits of the physical actuators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareRanges {
    /// Azimuth position feedback, analog counts.
    pub azimuth_feedback: AxisRange,
    /// Azimuth stepper pulse-count target.
    pub azimuth_steps: AxisRange,
    /// Elevation position feedback, analog counts.
    pub elevation_feedback: AxisRange,
    /// Elevation servo PWM duty.
    pub elevation_duty: AxisRange,
}

impl Default for HardwareRanges {
    fn default() -> Self {
        Self {
            azimuth_feedback: AxisRange::new(0.0, 255.0),
            azimuth_steps: AxisRange::new(0.0, 1000.0),
            elevation_feedback: AxisRange::new(45.0, 120.0),
            elevation_duty: AxisRange::new(40.0, 105.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalibrationEntry {
    pub index: i32,
    pub azimuth_units: i32,
    pub azimuth_steps: i32,
    pub elevation_units: i32,
    pub elevation_duty: i32,
}
