mod error;
mod ingest;
mod parsing;
mod source;
mod types;

pub use error::GpsError;
pub use ingest::NmeaIngest;
pub use source::{FixSource, ReplaySource, StreamSource};
pub use types::Fix;

#[cfg(test)]
pub use types::{Hemisphere, MotionSentence, PositionSentence};
