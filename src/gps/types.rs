use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use super::parsing::degree_to_decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// `$GPGGA`: time, position, altitude.
    Position,
    /// `$GPRMC`: speed, course, date.
    Motion,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    pub fn sign(self) -> f64 {
        match self {
            Hemisphere::North | Hemisphere::East => 1.0,
            Hemisphere::South | Hemisphere::West => -1.0,
        }
    }
}

/// Which of the two sentence types have been folded into a [`Fix`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Completeness(u8);

impl Completeness {
    const POSITION: u8 = 0b01;
    const MOTION: u8 = 0b10;
    const BOTH: u8 = Self::POSITION | Self::MOTION;

    pub fn mark(&mut self, kind: MessageKind) {
        self.0 |= match kind {
            MessageKind::Position => Self::POSITION,
            MessageKind::Motion => Self::MOTION,
            MessageKind::Unknown => 0,
        };
    }

    #[cfg(test)]
    pub fn has_position(self) -> bool {
        self.0 & Self::POSITION != 0
    }

    #[cfg(test)]
    pub fn has_motion(self) -> bool {
        self.0 & Self::MOTION != 0
    }

    pub fn is_complete(self) -> bool {
        self.0 & Self::BOTH == Self::BOTH
    }
}

/// Fields of a `$GPGGA` sentence. Latitude and longitude are still in
/// `ddmm.mmmm` form.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSentence {
    pub utc: Option<NaiveTime>,
    pub latitude: f64,
    pub lat_hemisphere: Hemisphere,
    pub longitude: f64,
    pub lon_hemisphere: Hemisphere,
    pub quality: u8,
    pub satellites: u8,
    pub altitude_m: f64,
}

/// Fields of a `$GPRMC` sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSentence {
    pub speed_knots: f64,
    pub course_deg: f64,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Fix {
    pub utc_time: Option<NaiveTime>,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
    pub quality: u8,
    pub satellites: u8,
    pub speed_knots: f64,
    pub course_deg: f64,
    pub date: Option<NaiveDate>,
    pub completeness: Completeness,
}

impl Fix {
    /// Both the position and the motion sentence have been seen.
    pub fn is_usable(&self) -> bool {
        self.completeness.is_complete()
    }

    /// `0,0` is never a real position; receivers report it before they lock.
    pub fn is_sentinel(&self) -> bool {
        self.latitude_deg == 0.0 && self.longitude_deg == 0.0
    }

    pub fn apply_position(&mut self, sentence: &PositionSentence) {
        self.utc_time = sentence.utc;
        self.latitude_deg = degree_to_decimal(sentence.latitude, sentence.lat_hemisphere);
        self.longitude_deg = degree_to_decimal(sentence.longitude, sentence.lon_hemisphere);
        self.altitude_m = sentence.altitude_m;
        self.quality = sentence.quality;
        self.satellites = sentence.satellites;
        self.completeness.mark(MessageKind::Position);
    }

    pub fn apply_motion(&mut self, sentence: &MotionSentence) {
        self.speed_knots = sentence.speed_knots;
        self.course_deg = sentence.course_deg;
        self.date = sentence.date;
        self.completeness.mark(MessageKind::Motion);
    }
}
