mod actuators;
mod error;
mod sensors;

pub use actuators::{Actuators, DryRunActuators, StepDirection};
pub use error::HardwareError;
pub use sensors::{
    AdcLightSensor, FixedWeather, LightReading, LightSensor, SimulatedLightSensor, WeatherReadings,
    WeatherStation,
};
