use serde::{Deserialize, Serialize};

use crate::gps::Fix;

/// Observer location on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub altitude_m: f64,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            latitude_deg: 43.63409,
            longitude_deg: -79.45930,
            altitude_m: 166.0,
        }
    }
}

impl Site {
    /// Parse `"lat, lon"`.
    pub fn from_coordinates(coordinates: &str, altitude_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let latitude_deg: f64 = parts[0].parse().ok()?;
        let longitude_deg: f64 = parts[1].parse().ok()?;
        if !(-90.0..=90.0).contains(&latitude_deg) || !(-180.0..=180.0).contains(&longitude_deg) {
            return None;
        }
        Some(Self {
            latitude_deg,
            longitude_deg,
            altitude_m: altitude_m.unwrap_or(0.0),
        })
    }

    pub fn from_fix(fix: &Fix) -> Self {
        Self {
            latitude_deg: fix.latitude_deg,
            longitude_deg: fix.longitude_deg,
            altitude_m: fix.altitude_m,
        }
    }
}
