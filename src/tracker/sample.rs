use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::types::PanelPosition;
use crate::hardware::WeatherReadings;
use crate::solar::Site;

/// One telemetry line: where the panel was sent, where it is, and the
/// conditions at the time.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub from_fix: bool,
    pub weather: WeatherReadings,
}

impl TelemetryRecord {
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        commanded: PanelPosition,
        site: &Site,
        from_fix: bool,
        weather: WeatherReadings,
    ) -> Self {
        Self {
            timestamp,
            azimuth_deg: commanded.azimuth_deg,
            elevation_deg: commanded.elevation_deg,
            latitude_deg: site.latitude_deg,
            longitude_deg: site.longitude_deg,
            from_fix,
            weather,
        }
    }

    pub fn to_line(&self) -> String {
        format!(
            "{},{:3.0},{:3.0},{:.6},{:.6},{:3.1},{:3.1},{:5.1},{:3.0}",
            self.timestamp.format("%a,%b,%e,%H:%M:%S,%Y"),
            self.azimuth_deg,
            self.elevation_deg,
            self.latitude_deg,
            self.longitude_deg,
            self.weather.temperature_c,
            self.weather.humidity_pct,
            self.weather.pressure_mb,
            self.weather.light_lux,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_fixed_precision_line() {
        let timestamp = FixedOffset::west_opt(4 * 3600)
            .unwrap()
            .with_ymd_and_hms(1993, 6, 3, 21, 49, 8)
            .unwrap();
        let record = TelemetryRecord::new(
            timestamp,
            PanelPosition::new(181.4, 62.6),
            &Site {
                latitude_deg: 43.63409,
                longitude_deg: -79.4593,
                altitude_m: 166.0,
            },
            true,
            WeatherReadings {
                temperature_c: 21.3,
                humidity_pct: 48.0,
                pressure_mb: 1009.5,
                light_lux: 812.0,
            },
        );

        assert_eq!(
            record.to_line(),
            "Thu,Jun, 3,21:49:08,1993,181, 63,43.634090,-79.459300,21.3,48.0,1009.5,812"
        );
    }
}
