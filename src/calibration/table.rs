use super::error::CalibrationError;
use super::types::{
    AxisRange, CalibrationEntry, HardwareRanges, MappingDirection, AZIMUTH_RANGE, ELEVATION_RANGE,
};

/// One entry per whole degree, 0..=360.
pub const TABLE_SIZE: usize = 361;

/// A clamped azimuth, safe to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AzimuthIndex(usize);

/// A clamped elevation, safe to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevationIndex(usize);

impl AzimuthIndex {
    #[cfg(test)]
    pub fn degrees(self) -> usize {
        self.0
    }
}

impl ElevationIndex {
    #[cfg(test)]
    pub fn degrees(self) -> usize {
        self.0
    }
}

/// Degree to actuator-unit lookup for both axes. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    entries: Vec<CalibrationEntry>,
}

/// Linear interpolation of one actuator column over the whole table.
///
/// Logical indices outside `logical` saturate at the hardware limit.
pub fn interpolate_axis(
    logical: AxisRange,
    hardware: AxisRange,
    direction: MappingDirection,
) -> Vec<i32> {
    (0..TABLE_SIZE)
        .map(|i| {
            let i = logical.clamp(i as f64);
            let fraction = match direction {
                MappingDirection::Descending => (logical.max - i) / logical.span(),
                MappingDirection::Ascending => (i - logical.min) / logical.span(),
            };
            ((fraction * hardware.span()).round() + hardware.min) as i32
        })
        .collect()
}

impl CalibrationTable {
    /// Build the table from the hardware travel limits. Azimuth runs
    /// descending over 0..360, elevation ascending over 0..90.
    pub fn generate(hardware: &HardwareRanges) -> Self {
        let azimuth_units = interpolate_axis(
            AZIMUTH_RANGE,
            hardware.azimuth_feedback,
            MappingDirection::Descending,
        );
        let azimuth_steps = interpolate_axis(
            AZIMUTH_RANGE,
            hardware.azimuth_steps,
            MappingDirection::Descending,
        );
        let elevation_units = interpolate_axis(
            ELEVATION_RANGE,
            hardware.elevation_feedback,
            MappingDirection::Ascending,
        );
        let elevation_duty = interpolate_axis(
            ELEVATION_RANGE,
            hardware.elevation_duty,
            MappingDirection::Ascending,
        );

        let entries = (0..TABLE_SIZE)
            .map(|i| CalibrationEntry {
                index: i as i32,
                azimuth_units: azimuth_units[i],
                azimuth_steps: azimuth_steps[i],
                elevation_units: elevation_units[i],
                elevation_duty: elevation_duty[i],
            })
            .collect();

        Self { entries }
    }

    /// Wrap loaded entries, rejecting anything that is not a complete,
    /// ordered, monotonic table.
    pub fn from_entries(entries: Vec<CalibrationEntry>) -> Result<Self, CalibrationError> {
        if entries.len() != TABLE_SIZE {
            return Err(CalibrationError::Corrupt {
                record: entries.len(),
                reason: format!("expected {} records, found {}", TABLE_SIZE, entries.len()),
            });
        }

        for (i, entry) in entries.iter().enumerate() {
            if entry.index != i as i32 {
                return Err(CalibrationError::Corrupt {
                    record: i,
                    reason: format!("index {} out of order", entry.index),
                });
            }
        }

        for (i, pair) in entries.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            let monotonic = next.azimuth_units <= prev.azimuth_units
                && next.azimuth_steps <= prev.azimuth_steps
                && next.elevation_units >= prev.elevation_units
                && next.elevation_duty >= prev.elevation_duty;
            if !monotonic {
                return Err(CalibrationError::Corrupt {
                    record: i + 1,
                    reason: "actuator units are not monotonic".to_string(),
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CalibrationEntry] {
        &self.entries
    }

    pub fn clamp_azimuth(&self, degrees: f64) -> AzimuthIndex {
        AzimuthIndex(clamp_to_index(degrees, AZIMUTH_RANGE))
    }

    pub fn clamp_elevation(&self, degrees: f64) -> ElevationIndex {
        ElevationIndex(clamp_to_index(degrees, ELEVATION_RANGE))
    }

    pub fn lookup_azimuth(&self, index: AzimuthIndex) -> &CalibrationEntry {
        &self.entries[index.0]
    }

    pub fn lookup_elevation(&self, index: ElevationIndex) -> &CalibrationEntry {
        &self.entries[index.0]
    }
}

fn clamp_to_index(degrees: f64, range: AxisRange) -> usize {
    if degrees.is_nan() {
        return range.min as usize;
    }
    range.clamp(degrees.round()) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CalibrationTable {
        CalibrationTable::generate(&HardwareRanges::default())
    }

    #[test]
    fn generates_full_table() {
        let table = table();
        assert_eq!(table.entries().len(), TABLE_SIZE);
        assert!(CalibrationTable::from_entries(table.entries().to_vec()).is_ok());
    }

    #[test]
    fn azimuth_maps_descending() {
        let table = table();
        let north = table.lookup_azimuth(table.clamp_azimuth(0.0));
        let south = table.lookup_azimuth(table.clamp_azimuth(180.0));
        let full = table.lookup_azimuth(table.clamp_azimuth(360.0));

        assert_eq!(north.azimuth_steps, 1000);
        assert_eq!(south.azimuth_steps, 500);
        assert_eq!(full.azimuth_steps, 0);
        assert_eq!(north.azimuth_units, 255);
        assert_eq!(full.azimuth_units, 0);
        // round(180/360 * 255) = round(127.5)
        assert_eq!(south.azimuth_units, 128);
    }

    #[test]
    fn elevation_maps_ascending_and_saturates() {
        let table = table();
        let horizon = table.lookup_elevation(table.clamp_elevation(0.0));
        let zenith = table.lookup_elevation(table.clamp_elevation(90.0));

        assert_eq!(horizon.elevation_duty, 40);
        assert_eq!(horizon.elevation_units, 45);
        assert_eq!(zenith.elevation_duty, 105);
        assert_eq!(zenith.elevation_units, 120);

        for entry in &table.entries()[91..] {
            assert_eq!(entry.elevation_duty, 105);
            assert_eq!(entry.elevation_units, 120);
        }
    }

    #[test]
    fn interpolation_directions() {
        let hw = AxisRange::new(0.0, 100.0);
        let up = interpolate_axis(AxisRange::new(0.0, 100.0), hw, MappingDirection::Ascending);
        let down = interpolate_axis(AxisRange::new(0.0, 100.0), hw, MappingDirection::Descending);
        assert_eq!(up[25], 25);
        assert_eq!(down[25], 75);
        assert_eq!(up[200], 100);
        assert_eq!(down[200], 0);
    }

    #[test]
    fn clamps_out_of_range_angles() {
        let table = table();
        assert_eq!(table.clamp_azimuth(400.0).degrees(), 360);
        assert_eq!(table.clamp_azimuth(-5.0).degrees(), 0);
        assert_eq!(table.clamp_elevation(-10.0).degrees(), 0);
        assert_eq!(table.clamp_elevation(135.0).degrees(), 90);
        assert_eq!(table.clamp_elevation(f64::NAN).degrees(), 0);
        assert_eq!(table.clamp_azimuth(179.6).degrees(), 180);
    }

    #[test]
    fn rejects_short_or_unordered_tables() {
        let mut entries = table().entries().to_vec();
        entries.pop();
        assert!(matches!(
            CalibrationTable::from_entries(entries),
            Err(CalibrationError::Corrupt { .. })
        ));

        let mut entries = table().entries().to_vec();
        entries.swap(10, 11);
        assert!(matches!(
            CalibrationTable::from_entries(entries),
            Err(CalibrationError::Corrupt { record: 10, .. })
        ));

        let mut entries = table().entries().to_vec();
        entries[50].elevation_duty = 0;
        assert!(matches!(
            CalibrationTable::from_entries(entries),
            Err(CalibrationError::Corrupt { record: 50, .. })
        ));
    }
}
