mod ephemeris;
mod error;
mod site;
mod target;

pub use ephemeris::{SolarEphemeris, SpaEphemeris};
pub use error::SolarError;
pub use site::Site;
pub use target::{SolarSettings, SolarTargetCalculator, TargetPosition};

#[cfg(test)]
pub use ephemeris::{SolarAngles, SolarQuery};
