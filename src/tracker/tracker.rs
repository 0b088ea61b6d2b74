use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::TrackerError;
use super::sample::TelemetryRecord;
use super::telemetry::TelemetryLog;
use super::types::{ControllerState, PanelPosition, TrackerMode, TrackerSettings};
use crate::calibration::CalibrationTable;
use crate::gps::{FixSource, NmeaIngest};
use crate::hardware::{Actuators, LightReading, LightSensor, StepDirection, WeatherStation};
use crate::solar::{SolarEphemeris, SolarTargetCalculator, TargetPosition};

/// The devices a controller owns for its whole life.
pub struct Devices {
    pub actuators: Box<dyn Actuators>,
    pub light: Box<dyn LightSensor>,
    pub weather: Box<dyn WeatherStation>,
    pub gps: Box<dyn FixSource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// Mode the cycle ended in.
    pub mode: TrackerMode,
    /// None for manual positioning.
    pub target: Option<TargetPosition>,
    pub commanded: PanelPosition,
    pub feedback_iterations: u32,
    pub record: TelemetryRecord,
    pub telemetry_error: Option<String>,
}

pub struct TrackingController<E> {
    settings: TrackerSettings,
    table: CalibrationTable,
    calculator: SolarTargetCalculator<E>,
    ingest: NmeaIngest,
    devices: Devices,
    telemetry: Option<TelemetryLog>,
    state: ControllerState,
}

impl<E: SolarEphemeris> TrackingController<E> {
    /// The panel is assumed to rest at the park position on start.
    pub fn new(
        settings: TrackerSettings,
        table: CalibrationTable,
        calculator: SolarTargetCalculator<E>,
        ingest: NmeaIngest,
        devices: Devices,
    ) -> Self {
        Self {
            state: ControllerState {
                mode: TrackerMode::Idle,
                last_commanded: settings.park,
                feedback_iterations_remaining: 0,
            },
            settings,
            table,
            calculator,
            ingest,
            devices,
            telemetry: None,
        }
    }

    pub fn with_telemetry(mut self, log: TelemetryLog) -> Self {
        self.telemetry = Some(log);
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    #[cfg(test)]
    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    #[cfg(test)]
    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }

    /// Run one control cycle: locate, aim open-loop, hunt with the light
    /// sensors, log.
    pub fn cycle(&mut self, now: DateTime<Utc>) -> Result<CycleReport, TrackerError> {
        let result = self.run_cycle(now);
        if let Err(err) = &result {
            log::error!("Tracking cycle failed in {}: {}", self.state.mode, err);
            self.state.mode = TrackerMode::Idle;
            self.state.feedback_iterations_remaining = 0;
        }
        result
    }

    fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleReport, TrackerError> {
        let fix = self.ingest.read_fix(self.devices.gps.as_mut());
        let weather = self.devices.weather.readings()?;
        let target = self.calculator.target(now, &fix, &weather)?;

        let feedback_iterations = if target.elevation_deg <= 0.0 {
            self.park()?;
            0
        } else {
            self.seek(&target)?;
            self.hold()?
        };

        let commanded = self.state.last_commanded;
        let record = TelemetryRecord::new(
            target.computed_at,
            commanded,
            &target.site,
            target.from_fix,
            weather,
        );
        let telemetry_error = self.emit(&record);

        Ok(CycleReport {
            mode: self.state.mode,
            target: Some(target),
            commanded,
            feedback_iterations,
            record,
            telemetry_error,
        })
    }

    /// Drive to an operator-chosen position without the light-sensor hunt.
    pub fn set_position(
        &mut self,
        requested: PanelPosition,
        now: DateTime<Utc>,
    ) -> Result<CycleReport, TrackerError> {
        let weather = self.devices.weather.readings()?;
        let settings = *self.calculator.settings();
        let commanded = self.command(requested)?;
        self.state.mode = TrackerMode::Idle;
        self.state.feedback_iterations_remaining = 0;
        log::info!(
            "Manual position az {:.1} el {:.1}",
            commanded.azimuth_deg,
            commanded.elevation_deg
        );

        let record = TelemetryRecord::new(
            now.with_timezone(&settings.timezone()?),
            commanded,
            &settings.default_site,
            false,
            weather,
        );
        let telemetry_error = self.emit(&record);

        Ok(CycleReport {
            mode: self.state.mode,
            target: None,
            commanded,
            feedback_iterations: 0,
            record,
            telemetry_error,
        })
    }

    fn park(&mut self) -> Result<(), TrackerError> {
        self.state.mode = TrackerMode::Parked;
        self.state.feedback_iterations_remaining = 0;
        let park = self.command(self.settings.park)?;
        log::info!(
            "Sun below horizon, parked at az {:.1} el {:.1}",
            park.azimuth_deg,
            park.elevation_deg
        );
        Ok(())
    }

    fn seek(&mut self, target: &TargetPosition) -> Result<(), TrackerError> {
        self.state.mode = TrackerMode::Seeking;
        let commanded = self.command(PanelPosition::new(target.azimuth_deg, target.elevation_deg))?;
        log::info!(
            "Seeking az {:.1} el {:.1} (target az {:.2} el {:.2})",
            commanded.azimuth_deg,
            commanded.elevation_deg,
            target.azimuth_deg,
            target.elevation_deg
        );
        Ok(())
    }

    /// Bounded hunt: always runs every configured iteration.
    fn hold(&mut self) -> Result<u32, TrackerError> {
        self.state.mode = TrackerMode::Holding;
        let total = self.settings.feedback_iterations;

        for done in 0..total {
            self.state.feedback_iterations_remaining = total - done;
            let reading = self.devices.light.read_light_pair()?;
            let nudged = nudge(
                self.state.last_commanded,
                reading,
                self.settings.setpoint,
                self.settings.deadband,
            );
            let commanded = self.command(nudged)?;
            log::debug!(
                "Feedback {}/{}: light az {} el {} -> az {:.1} el {:.1}",
                done + 1,
                total,
                reading.azimuth,
                reading.elevation,
                commanded.azimuth_deg,
                commanded.elevation_deg
            );
        }

        self.state.feedback_iterations_remaining = 0;
        self.state.mode = TrackerMode::Idle;
        Ok(total)
    }

    /// Clamp, look up actuator units and drive both axes, elevation first.
    fn command(&mut self, requested: PanelPosition) -> Result<PanelPosition, TrackerError> {
        let position = self.settings.clamp(requested);

        let previous = *self
            .table
            .lookup_azimuth(self.table.clamp_azimuth(self.state.last_commanded.azimuth_deg));
        let azimuth = *self
            .table
            .lookup_azimuth(self.table.clamp_azimuth(position.azimuth_deg));
        let elevation = *self
            .table
            .lookup_elevation(self.table.clamp_elevation(position.elevation_deg));

        self.devices
            .actuators
            .command_elevation(elevation.elevation_duty)?;
        settle(self.settings.pwm_settle);

        let delta = azimuth.azimuth_steps - previous.azimuth_steps;
        self.devices
            .actuators
            .command_azimuth(delta.unsigned_abs(), StepDirection::from_delta(delta))?;
        settle(self.settings.step_settle);

        self.state.last_commanded = position;
        Ok(position)
    }

    fn emit(&self, record: &TelemetryRecord) -> Option<String> {
        let log = self.telemetry.as_ref()?;
        match log.append(record) {
            Ok(()) => None,
            Err(err) => {
                log::warn!(
                    "Failed to write telemetry to {}: {}",
                    log.path().display(),
                    err
                );
                Some(err.to_string())
            }
        }
    }
}

/// Move each axis one degree toward the light when its reading is
/// outside the deadband.
fn nudge(
    position: PanelPosition,
    reading: LightReading,
    setpoint: LightReading,
    deadband: i32,
) -> PanelPosition {
    let mut next = position;

    if reading.elevation < setpoint.elevation.saturating_sub(deadband) {
        next.elevation_deg += 1.0;
    } else if reading.elevation > setpoint.elevation.saturating_add(deadband) {
        next.elevation_deg -= 1.0;
    }

    if reading.azimuth < setpoint.azimuth.saturating_sub(deadband) {
        next.azimuth_deg -= 1.0;
    } else if reading.azimuth > setpoint.azimuth.saturating_add(deadband) {
        next.azimuth_deg += 1.0;
    }

    next
}

fn settle(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
