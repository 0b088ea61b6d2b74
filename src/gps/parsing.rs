use chrono::{NaiveDate, NaiveTime};

use super::error::GpsError;
use super::types::{Hemisphere, MessageKind, MotionSentence, PositionSentence};

pub const POSITION_TAG: &str = "$GPGGA";
pub const MOTION_TAG: &str = "$GPRMC";

const POSITION_FIELDS: usize = 10;
const MOTION_FIELDS: usize = 10;

/// Classify a sentence by its leading tag. Exact, case-sensitive match only.
pub fn classify(sentence: &str) -> MessageKind {
    match sentence.trim().split(',').next() {
        Some(POSITION_TAG) => MessageKind::Position,
        Some(MOTION_TAG) => MessageKind::Motion,
        _ => MessageKind::Unknown,
    }
}

pub fn parse_position(sentence: &str) -> Result<PositionSentence, GpsError> {
    let fields = split_fields(sentence, POSITION_TAG, POSITION_FIELDS)?;

    Ok(PositionSentence {
        utc: parse_utc(fields[1])?,
        latitude: parse_number("latitude", fields[2])?,
        lat_hemisphere: parse_hemisphere("latitude hemisphere", fields[3], 'N', 'S')?,
        longitude: parse_number("longitude", fields[4])?,
        lon_hemisphere: parse_hemisphere("longitude hemisphere", fields[5], 'E', 'W')?,
        quality: parse_count("fix quality", fields[6])?,
        satellites: parse_count("satellite count", fields[7])?,
        altitude_m: parse_number("altitude", fields[9])?,
    })
}

pub fn parse_motion(sentence: &str) -> Result<MotionSentence, GpsError> {
    let fields = split_fields(sentence, MOTION_TAG, MOTION_FIELDS)?;

    Ok(MotionSentence {
        speed_knots: parse_number("speed", fields[7])?,
        course_deg: parse_number("course", fields[8])?,
        date: parse_date(fields[9])?,
    })
}

/// Convert `ddmm.mmmm` to signed decimal degrees.
///
/// The trailing two integer digits are whole minutes, the fraction is
/// converted to seconds. Each term is rounded to 6 decimals before summing
/// so the result stays within ~0.11 m of the receiver's own precision.
pub fn degree_to_decimal(value: f64, hemisphere: Hemisphere) -> f64 {
    let raw = value.abs();
    let degrees = (raw / 100.0).trunc();
    let minutes = (raw - degrees * 100.0).trunc();
    let seconds = raw.fract() * 60.0;

    let decimal = round6(degrees) + round6(minutes) / 60.0 + round6(seconds) / 3600.0;
    hemisphere.sign() * round6(decimal)
}

/// XOR of every byte between `$` and `*` must equal the trailing hex pair.
pub fn validate_checksum(sentence: &str) -> Result<(), GpsError> {
    let trimmed = sentence.trim();
    let body = trimmed
        .strip_prefix('$')
        .ok_or_else(|| GpsError::InvalidField {
            field: "start delimiter",
            value: trimmed.to_string(),
        })?;
    let (payload, checksum) = body.split_once('*').ok_or(GpsError::MissingChecksum)?;

    let expected =
        u8::from_str_radix(checksum.trim(), 16).map_err(|_| GpsError::InvalidField {
            field: "checksum",
            value: checksum.to_string(),
        })?;
    let computed = payload.bytes().fold(0u8, |acc, b| acc ^ b);

    if expected == computed {
        Ok(())
    } else {
        Err(GpsError::ChecksumMismatch { expected, computed })
    }
}

fn split_fields<'a>(sentence: &'a str, tag: &str, min: usize) -> Result<Vec<&'a str>, GpsError> {
    let trimmed = sentence.trim();
    let payload = trimmed
        .split_once('*')
        .map(|(payload, _)| payload)
        .unwrap_or(trimmed);
    let fields: Vec<&str> = payload.split(',').collect();

    if fields[0] != tag {
        return Err(GpsError::UnexpectedTag(fields[0].to_string()));
    }
    if fields.len() < min {
        return Err(GpsError::TooFewFields {
            expected: min,
            found: fields.len(),
        });
    }
    Ok(fields)
}

// Receivers leave numeric fields empty until they have a lock; those read as
// zero, which keeps the fix at the 0,0 sentinel.
fn parse_number(field: &'static str, value: &str) -> Result<f64, GpsError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0.0);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GpsError::InvalidField {
            field,
            value: value.to_string(),
        })
}

fn parse_count(field: &'static str, value: &str) -> Result<u8, GpsError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value.parse().map_err(|_| GpsError::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn parse_hemisphere(
    field: &'static str,
    value: &str,
    positive: char,
    negative: char,
) -> Result<Hemisphere, GpsError> {
    let hemisphere = |c: char| match c {
        'N' => Hemisphere::North,
        'S' => Hemisphere::South,
        'E' => Hemisphere::East,
        _ => Hemisphere::West,
    };

    match value.trim() {
        "" => Ok(hemisphere(positive)),
        v if v.len() == 1 && v.starts_with(positive) => Ok(hemisphere(positive)),
        v if v.len() == 1 && v.starts_with(negative) => Ok(hemisphere(negative)),
        v => Err(GpsError::InvalidField {
            field,
            value: v.to_string(),
        }),
    }
}

/// `hhmmss` with optional fractional seconds.
fn parse_utc(value: &str) -> Result<Option<NaiveTime>, GpsError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let invalid = || GpsError::InvalidField {
        field: "utc time",
        value: value.to_string(),
    };

    let (whole, fraction) = value.split_once('.').unwrap_or((value, ""));
    if whole.len() != 6 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let hour: u32 = whole[0..2].parse().map_err(|_| invalid())?;
    let minute: u32 = whole[2..4].parse().map_err(|_| invalid())?;
    let second: u32 = whole[4..6].parse().map_err(|_| invalid())?;
    let millis = if fraction.is_empty() {
        0
    } else {
        let fraction: f64 = format!("0.{}", fraction).parse().map_err(|_| invalid())?;
        ((fraction * 1000.0).round() as u32).min(999)
    };

    NaiveTime::from_hms_milli_opt(hour, minute, second, millis)
        .map(Some)
        .ok_or_else(invalid)
}

/// `ddmmyy`, years taken as 20yy.
fn parse_date(value: &str) -> Result<Option<NaiveDate>, GpsError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let invalid = || GpsError::InvalidField {
        field: "date",
        value: value.to_string(),
    };

    if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let day: u32 = value[0..2].parse().map_err(|_| invalid())?;
    let month: u32 = value[2..4].parse().map_err(|_| invalid())?;
    let year: i32 = value[4..6].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(2000 + year, month, day)
        .map(Some)
        .ok_or_else(invalid)
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
