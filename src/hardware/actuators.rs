use serde::Serialize;

use super::error::HardwareError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepDirection {
    /// Stepper count increasing.
    Forward,
    /// Stepper count decreasing.
    Reverse,
}

impl StepDirection {
    pub fn from_delta(delta: i32) -> Self {
        if delta < 0 {
            StepDirection::Reverse
        } else {
            StepDirection::Forward
        }
    }
}

/// Panel drive. Calls block until the hardware has accepted the command.
pub trait Actuators {
    /// Pulse the azimuth stepper `steps` times in `direction`.
    fn command_azimuth(&mut self, steps: u32, direction: StepDirection)
        -> Result<(), HardwareError>;

    /// Write the elevation servo duty.
    fn command_elevation(&mut self, duty: i32) -> Result<(), HardwareError>;
}

/// Logs commands instead of driving pins, keeping track of where the
/// stepper would be.
#[derive(Debug, Default)]
pub struct DryRunActuators {
    step_position: i64,
    duty: Option<i32>,
}

impl DryRunActuators {
    pub fn new(initial_steps: i64) -> Self {
        Self {
            step_position: initial_steps,
            duty: None,
        }
    }

    #[cfg(test)]
    pub fn step_position(&self) -> i64 {
        self.step_position
    }

    #[cfg(test)]
    pub fn duty(&self) -> Option<i32> {
        self.duty
    }
}

impl Actuators for DryRunActuators {
    fn command_azimuth(
        &mut self,
        steps: u32,
        direction: StepDirection,
    ) -> Result<(), HardwareError> {
        match direction {
            StepDirection::Forward => self.step_position += i64::from(steps),
            StepDirection::Reverse => self.step_position -= i64::from(steps),
        }
        log::debug!(
            "[dry run] azimuth {} steps {:?} -> {}",
            steps,
            direction,
            self.step_position
        );
        Ok(())
    }

    fn command_elevation(&mut self, duty: i32) -> Result<(), HardwareError> {
        self.duty = Some(duty);
        log::debug!("[dry run] elevation duty {}", duty);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_follows_delta_sign() {
        assert_eq!(StepDirection::from_delta(-3), StepDirection::Reverse);
        assert_eq!(StepDirection::from_delta(0), StepDirection::Forward);
        assert_eq!(StepDirection::from_delta(12), StepDirection::Forward);
    }

    #[test]
    fn dry_run_tracks_step_position() {
        let mut actuators = DryRunActuators::new(500);
        actuators.command_azimuth(20, StepDirection::Reverse).unwrap();
        actuators.command_azimuth(5, StepDirection::Forward).unwrap();
        actuators.command_elevation(72).unwrap();

        assert_eq!(actuators.step_position(), 485);
        assert_eq!(actuators.duty(), Some(72));
    }
}
