//! Wires configured devices, tables and settings into a controller.

use thiserror::Error;

use crate::calibration::{load_or_generate, CalibrationError, CalibrationTable};
use crate::config::{
    CalibrationConfig, Config, ConfigError, GpsConfig, GpsSourceConfig, LightSensorConfig,
    SensorsConfig,
};
use crate::gps::{FixSource, GpsError, NmeaIngest, ReplaySource, StreamSource};
use crate::hardware::{
    AdcLightSensor, DryRunActuators, FixedWeather, LightSensor, SimulatedLightSensor,
};
use crate::solar::{SolarTargetCalculator, SpaEphemeris};
use crate::tracker::{Devices, TelemetryLog, TrackerSettings, TrackingController};

#[derive(Debug, Error)]
pub enum StationError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("gps error: {0}")]
    Gps(#[from] GpsError),
    #[error("calibration error: {0}")]
    Calibration(#[from] CalibrationError),
}

pub fn fix_source(config: &GpsConfig) -> Result<Box<dyn FixSource>, StationError> {
    let source: Box<dyn FixSource> = match &config.source {
        Some(GpsSourceConfig::Replay { path, capacity }) => {
            Box::new(ReplaySource::from_file(path, *capacity)?)
        }
        Some(GpsSourceConfig::Serial {
            device,
            max_sentences,
        }) => Box::new(StreamSource::open(device, *max_sentences)?),
        None => {
            log::info!("No GPS source configured");
            Box::new(ReplaySource::new(Vec::<String>::new(), 1))
        }
    };
    Ok(source)
}

pub fn light_sensor(config: &SensorsConfig, settings: &TrackerSettings) -> Box<dyn LightSensor> {
    match &config.light {
        LightSensorConfig::Simulated => Box::new(SimulatedLightSensor::new(settings.setpoint)),
        LightSensorConfig::Adc {
            azimuth_path,
            elevation_path,
        } => Box::new(AdcLightSensor::new(
            azimuth_path.clone(),
            elevation_path.clone(),
        )),
    }
}

/// Load the persisted table, regenerating when missing or damaged.
/// `force` always regenerates and overwrites the store.
pub fn calibration_table(
    config: &CalibrationConfig,
    force: bool,
) -> Result<CalibrationTable, StationError> {
    if force {
        let table = CalibrationTable::generate(&config.hardware);
        table.persist(&config.path, config.format)?;
        return Ok(table);
    }
    Ok(load_or_generate(
        &config.path,
        config.format,
        &config.hardware,
    )?)
}

pub fn solar_calculator(
    config: &Config,
) -> Result<SolarTargetCalculator<SpaEphemeris>, StationError> {
    Ok(SolarTargetCalculator::new(
        SpaEphemeris,
        config.site.solar_settings()?,
    ))
}

pub fn build_controller(config: &Config) -> Result<TrackingController<SpaEphemeris>, StationError> {
    let table = calibration_table(&config.calibration, false)?;
    let park_steps = table
        .lookup_azimuth(table.clamp_azimuth(config.tracker.park.azimuth_deg))
        .azimuth_steps;

    let devices = Devices {
        actuators: Box::new(DryRunActuators::new(i64::from(park_steps))),
        light: light_sensor(&config.sensors, &config.tracker),
        weather: Box::new(FixedWeather(config.sensors.weather)),
        gps: fix_source(&config.gps)?,
    };

    let controller = TrackingController::new(
        config.tracker,
        table,
        solar_calculator(config)?,
        NmeaIngest::new(config.gps.strict_checksum),
        devices,
    );

    Ok(if config.telemetry.enabled {
        controller.with_telemetry(TelemetryLog::new(config.telemetry.path.clone()))
    } else {
        controller
    })
}
