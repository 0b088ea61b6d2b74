use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::calibration::{HardwareRanges, TableFormat, AZIMUTH_RANGE, ELEVATION_RANGE};
use crate::hardware::WeatherReadings;
use crate::solar::{Site, SolarSettings};
use crate::tracker::TrackerSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub gps: GpsConfig,
    pub calibration: CalibrationConfig,
    pub tracker: TrackerSettings,
    pub sensors: SensorsConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// `"lat, lon"`, used when the GPS has no fix.
    pub coordinates: String,
    pub altitude_m: f64,
    pub timezone_offset_hours: f64,
    pub delta_ut1: f64,
    pub delta_t: f64,
    pub slope_deg: f64,
    pub azimuth_rotation_deg: f64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let solar = SolarSettings::default();
        Self {
            coordinates: format!(
                "{}, {}",
                solar.default_site.latitude_deg, solar.default_site.longitude_deg
            ),
            altitude_m: solar.default_site.altitude_m,
            timezone_offset_hours: solar.timezone_offset_hours,
            delta_ut1: solar.delta_ut1,
            delta_t: solar.delta_t,
            slope_deg: solar.slope_deg,
            azimuth_rotation_deg: solar.azimuth_rotation_deg,
        }
    }
}

impl SiteConfig {
    pub fn solar_settings(&self) -> Result<SolarSettings, ConfigError> {
        let default_site = Site::from_coordinates(&self.coordinates, Some(self.altitude_m))
            .ok_or_else(|| {
                ConfigError::Invalid(format!("bad site coordinates: {:?}", self.coordinates))
            })?;
        Ok(SolarSettings {
            default_site,
            timezone_offset_hours: self.timezone_offset_hours,
            delta_ut1: self.delta_ut1,
            delta_t: self.delta_t,
            slope_deg: self.slope_deg,
            azimuth_rotation_deg: self.azimuth_rotation_deg,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GpsConfig {
    /// No source means the default site is always used.
    pub source: Option<GpsSourceConfig>,
    pub strict_checksum: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GpsSourceConfig {
    Replay {
        path: PathBuf,
        #[serde(default = "default_capacity")]
        capacity: usize,
    },
    Serial {
        device: PathBuf,
        #[serde(default = "default_capacity")]
        max_sentences: usize,
    },
}

fn default_capacity() -> usize {
    64
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub path: PathBuf,
    pub format: TableFormat,
    pub hardware: HardwareRanges,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("calibration.txt"),
            format: TableFormat::default(),
            hardware: HardwareRanges::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub light: LightSensorConfig,
    pub weather: WeatherReadings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightSensorConfig {
    #[default]
    Simulated,
    Adc {
        azimuth_path: PathBuf,
        elevation_path: PathBuf,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("paneldata.csv"),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.site.solar_settings()?.timezone().map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let tracker = &self.tracker;
        if !AZIMUTH_RANGE.contains_range(&tracker.azimuth_limits) {
            return Err(ConfigError::Invalid(format!(
                "azimuth limits {:?} outside {:?}",
                tracker.azimuth_limits, AZIMUTH_RANGE
            )));
        }
        if !ELEVATION_RANGE.contains_range(&tracker.elevation_limits) {
            return Err(ConfigError::Invalid(format!(
                "elevation limits {:?} outside {:?}",
                tracker.elevation_limits, ELEVATION_RANGE
            )));
        }
        if tracker.deadband < 0 {
            return Err(ConfigError::Invalid("deadband must not be negative".into()));
        }

        let hardware = &self.calibration.hardware;
        for (name, range) in [
            ("azimuth_feedback", hardware.azimuth_feedback),
            ("azimuth_steps", hardware.azimuth_steps),
            ("elevation_feedback", hardware.elevation_feedback),
            ("elevation_duty", hardware.elevation_duty),
        ] {
            if range.min > range.max {
                return Err(ConfigError::Invalid(format!(
                    "calibration {} range is inverted",
                    name
                )));
            }
        }

        match &self.gps.source {
            Some(GpsSourceConfig::Replay { capacity: 0, .. })
            | Some(GpsSourceConfig::Serial {
                max_sentences: 0, ..
            }) => Err(ConfigError::Invalid(
                "gps source must allow at least one sentence".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// Serde adapter for durations written as `250ms`, `30s` or `1m 30s`.
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::AxisRange;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.tracker.feedback_iterations, 10);
        assert_eq!(config.tracker.interval, Duration::from_secs(30));
        assert_eq!(config.tracker.pwm_settle, Duration::from_millis(250));
        assert!(config.gps.source.is_none());
        assert!(!config.gps.strict_checksum);
        assert_eq!(config.calibration.format, TableFormat::Text);
        assert_eq!(config.telemetry.path, PathBuf::from("paneldata.csv"));

        let solar = config.site.solar_settings().unwrap();
        assert_eq!(solar.default_site, Site::default());
        assert_eq!(solar.delta_t, 67.0);
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
site:
  coordinates: "51.4769, -0.0005"
  altitude_m: 46
  timezone_offset_hours: 1
gps:
  source:
    type: replay
    path: logs/gps.nmea
  strict_checksum: true
calibration:
  path: /var/lib/sun-o-mat/table.bin
  format: binary
  hardware:
    azimuth_steps: { min: 0, max: 2000 }
tracker:
  feedback_iterations: 4
  deadband: 6
  setpoint: { azimuth: 130, elevation: 125 }
  azimuth_limits: { min: 60, max: 300 }
  park: { azimuth_deg: 170, elevation_deg: 5 }
  pwm_settle: 100ms
  interval: 1m
sensors:
  light:
    type: adc
    azimuth_path: /sys/bus/iio/devices/iio:device0/in_voltage0_raw
    elevation_path: /sys/bus/iio/devices/iio:device0/in_voltage1_raw
  weather:
    temperature_c: 22.5
telemetry:
  path: /tmp/panel.csv
"#;
        let config = Config::from_yaml(yaml).unwrap();

        let solar = config.site.solar_settings().unwrap();
        assert_eq!(solar.default_site.latitude_deg, 51.4769);
        assert_eq!(solar.default_site.altitude_m, 46.0);
        assert_eq!(solar.timezone_offset_hours, 1.0);

        assert!(matches!(
            config.gps.source,
            Some(GpsSourceConfig::Replay { capacity: 64, .. })
        ));
        assert!(config.gps.strict_checksum);

        assert_eq!(config.calibration.format, TableFormat::Binary);
        assert_eq!(
            config.calibration.hardware.azimuth_steps,
            AxisRange::new(0.0, 2000.0)
        );
        assert_eq!(
            config.calibration.hardware.elevation_duty,
            AxisRange::new(40.0, 105.0)
        );

        assert_eq!(config.tracker.feedback_iterations, 4);
        assert_eq!(config.tracker.setpoint.azimuth, 130);
        assert_eq!(config.tracker.azimuth_limits, AxisRange::new(60.0, 300.0));
        assert_eq!(config.tracker.elevation_limits, AxisRange::new(0.0, 90.0));
        assert_eq!(config.tracker.pwm_settle, Duration::from_millis(100));
        assert_eq!(config.tracker.step_settle, Duration::from_millis(1));
        assert_eq!(config.tracker.interval, Duration::from_secs(60));

        assert!(matches!(config.sensors.light, LightSensorConfig::Adc { .. }));
        assert_eq!(config.sensors.weather.temperature_c, 22.5);
        assert_eq!(config.sensors.weather.pressure_mb, 1013.25);
    }

    #[test]
    fn demo_config_is_valid() {
        let config = Config::from_yaml(include_str!("../demos/sun-o-mat.yaml")).unwrap();
        assert!(matches!(
            config.gps.source,
            Some(GpsSourceConfig::Replay { capacity: 64, .. })
        ));
        assert_eq!(config.tracker.park.azimuth_deg, 180.0);
    }

    #[test]
    fn rejects_limits_outside_calibration_range() {
        let err = Config::from_yaml("tracker:\n  azimuth_limits: { min: 10, max: 400 }\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = Config::from_yaml("tracker:\n  elevation_limits: { min: 50, max: 20 }\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_site_and_sources() {
        assert!(matches!(
            Config::from_yaml("site:\n  coordinates: \"north pole\"\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_yaml("gps:\n  source: { type: serial, device: /dev/ttyS0, max_sentences: 0 }\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unparseable_duration() {
        assert!(matches!(
            Config::from_yaml("tracker:\n  interval: soon\n"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
