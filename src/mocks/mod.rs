// Test doubles for the hardware and astronomy collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::hardware::{Actuators, HardwareError, LightReading, LightSensor, StepDirection};
use crate::solar::{SolarAngles, SolarEphemeris, SolarError, SolarQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    Azimuth { steps: u32, direction: StepDirection },
    Elevation { duty: i32 },
}

/// Records every command into a log shared with the test.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuators {
    log: Rc<RefCell<Vec<ActuatorCommand>>>,
    fail: bool,
}

impl RecordingActuators {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> Vec<ActuatorCommand> {
        self.log.borrow().clone()
    }

    pub fn elevation_commands(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| matches!(c, ActuatorCommand::Elevation { .. }))
            .count()
    }

    pub fn azimuth_commands(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| matches!(c, ActuatorCommand::Azimuth { .. }))
            .count()
    }
}

impl Actuators for RecordingActuators {
    fn command_azimuth(
        &mut self,
        steps: u32,
        direction: StepDirection,
    ) -> Result<(), HardwareError> {
        if self.fail {
            return Err(HardwareError::Actuator("stepper driver offline".into()));
        }
        self.log
            .borrow_mut()
            .push(ActuatorCommand::Azimuth { steps, direction });
        Ok(())
    }

    fn command_elevation(&mut self, duty: i32) -> Result<(), HardwareError> {
        if self.fail {
            return Err(HardwareError::Actuator("servo offline".into()));
        }
        self.log
            .borrow_mut()
            .push(ActuatorCommand::Elevation { duty });
        Ok(())
    }
}

/// Plays back queued readings, then repeats the last one.
#[derive(Debug, Clone)]
pub struct ScriptedLightSensor {
    queue: Rc<RefCell<VecDeque<LightReading>>>,
    last: LightReading,
    reads: Rc<RefCell<usize>>,
}

impl ScriptedLightSensor {
    pub fn new(readings: impl IntoIterator<Item = LightReading>, fallback: LightReading) -> Self {
        Self {
            queue: Rc::new(RefCell::new(readings.into_iter().collect())),
            last: fallback,
            reads: Rc::new(RefCell::new(0)),
        }
    }

    pub fn constant(reading: LightReading) -> Self {
        Self::new([], reading)
    }

    pub fn reads(&self) -> usize {
        *self.reads.borrow()
    }
}

impl LightSensor for ScriptedLightSensor {
    fn read_light_pair(&mut self) -> Result<LightReading, HardwareError> {
        *self.reads.borrow_mut() += 1;
        if let Some(next) = self.queue.borrow_mut().pop_front() {
            self.last = next;
        }
        Ok(self.last)
    }
}

/// Returns the same angles for every query and remembers the last query.
#[derive(Debug, Clone)]
pub struct FixedEphemeris {
    azimuth_deg: f64,
    incidence_deg: f64,
    last_query: Rc<RefCell<Option<SolarQuery>>>,
}

impl FixedEphemeris {
    pub fn new(azimuth_deg: f64, incidence_deg: f64) -> Self {
        Self {
            azimuth_deg,
            incidence_deg,
            last_query: Rc::new(RefCell::new(None)),
        }
    }

    pub fn last_query(&self) -> Option<SolarQuery> {
        *self.last_query.borrow()
    }
}

impl SolarEphemeris for FixedEphemeris {
    fn solar_angles(&self, query: &SolarQuery) -> Result<SolarAngles, SolarError> {
        *self.last_query.borrow_mut() = Some(*query);
        Ok(SolarAngles {
            azimuth_deg: self.azimuth_deg,
            zenith_deg: self.incidence_deg,
            incidence_deg: self.incidence_deg,
        })
    }
}
