use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::HardwareError;

/// Raw readings of the two differential light-sensor pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightReading {
    pub azimuth: i32,
    pub elevation: i32,
}

pub trait LightSensor {
    fn read_light_pair(&mut self) -> Result<LightReading, HardwareError>;
}

/// Always reports the balanced setpoint, i.e. the panel is on the sun.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedLightSensor {
    centre: LightReading,
}

impl SimulatedLightSensor {
    pub fn new(centre: LightReading) -> Self {
        Self { centre }
    }
}

impl LightSensor for SimulatedLightSensor {
    fn read_light_pair(&mut self) -> Result<LightReading, HardwareError> {
        Ok(self.centre)
    }
}

/// Reads both ADC channels from files holding a single integer, such as
/// the `in_voltageN_raw` attributes of a Linux IIO device.
#[derive(Debug, Clone)]
pub struct AdcLightSensor {
    azimuth_path: PathBuf,
    elevation_path: PathBuf,
}

impl AdcLightSensor {
    pub fn new(azimuth_path: PathBuf, elevation_path: PathBuf) -> Self {
        Self {
            azimuth_path,
            elevation_path,
        }
    }
}

impl LightSensor for AdcLightSensor {
    fn read_light_pair(&mut self) -> Result<LightReading, HardwareError> {
        Ok(LightReading {
            azimuth: read_channel(&self.azimuth_path)?,
            elevation: read_channel(&self.elevation_path)?,
        })
    }
}

fn read_channel(path: &Path) -> Result<i32, HardwareError> {
    let raw = fs::read_to_string(path)?;
    raw.trim()
        .parse()
        .map_err(|_| HardwareError::InvalidReading {
            path: path.to_path_buf(),
            value: raw.trim().to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherReadings {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub pressure_mb: f64,
    pub light_lux: f64,
}

impl Default for WeatherReadings {
    fn default() -> Self {
        Self {
            temperature_c: 15.0,
            humidity_pct: 50.0,
            pressure_mb: 1013.25,
            light_lux: 0.0,
        }
    }
}

pub trait WeatherStation {
    fn readings(&mut self) -> Result<WeatherReadings, HardwareError>;
}

/// Constant readings, for sites without a weather station.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedWeather(pub WeatherReadings);

impl WeatherStation for FixedWeather {
    fn readings(&mut self) -> Result<WeatherReadings, HardwareError> {
        Ok(self.0)
    }
}
