use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Deserialize;

use super::error::CalibrationError;
use super::table::{CalibrationTable, TABLE_SIZE};
use super::types::{CalibrationEntry, HardwareRanges};

const FIELDS_PER_RECORD: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    /// `$idx,azu,step,elu,pwm` per line, fixed widths.
    #[default]
    Text,
    /// Little-endian `i32` records, five per entry.
    Binary,
}

impl CalibrationTable {
    pub fn write_to<W: Write>(&self, writer: W, format: TableFormat) -> Result<(), CalibrationError> {
        let mut writer = BufWriter::new(writer);
        for entry in self.entries() {
            match format {
                TableFormat::Text => writeln!(
                    writer,
                    "${:3},{:3},{:4},{:3},{:3}",
                    entry.index,
                    entry.azimuth_units,
                    entry.azimuth_steps,
                    entry.elevation_units,
                    entry.elevation_duty
                )?,
                TableFormat::Binary => {
                    for value in [
                        entry.index,
                        entry.azimuth_units,
                        entry.azimuth_steps,
                        entry.elevation_units,
                        entry.elevation_duty,
                    ] {
                        writer.write_i32::<LittleEndian>(value)?;
                    }
                }
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: R, format: TableFormat) -> Result<Self, CalibrationError> {
        let entries = match format {
            TableFormat::Text => read_text(BufReader::new(reader))?,
            TableFormat::Binary => read_binary(BufReader::new(reader))?,
        };
        CalibrationTable::from_entries(entries)
    }

    pub fn persist(&self, path: &Path, format: TableFormat) -> Result<(), CalibrationError> {
        self.write_to(File::create(path)?, format)?;
        log::info!("Saved calibration table to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path, format: TableFormat) -> Result<Self, CalibrationError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CalibrationError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        };
        let table = Self::read_from(file, format)?;
        log::info!("Loaded calibration table from {}", path.display());
        Ok(table)
    }
}

/// Load the persisted table, or regenerate and persist it when the store is
/// missing or damaged. A partially read table is never returned.
pub fn load_or_generate(
    path: &Path,
    format: TableFormat,
    hardware: &HardwareRanges,
) -> Result<CalibrationTable, CalibrationError> {
    match CalibrationTable::load(path, format) {
        Ok(table) => Ok(table),
        Err(e) if e.is_recoverable() => {
            log::warn!("{}; regenerating calibration table", e);
            let table = CalibrationTable::generate(hardware);
            table.persist(path, format)?;
            Ok(table)
        }
        Err(e) => Err(e),
    }
}

fn read_text<R: BufRead>(reader: R) -> Result<Vec<CalibrationEntry>, CalibrationError> {
    let mut entries = Vec::with_capacity(TABLE_SIZE);

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = entries.len();
        let corrupt = |reason: String| CalibrationError::Corrupt { record, reason };

        let body = line
            .strip_prefix('$')
            .ok_or_else(|| corrupt(format!("missing record marker: {:?}", line)))?;
        let values = body
            .split(',')
            .map(|field| field.trim().parse::<i32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| corrupt(format!("{}: {:?}", e, line)))?;

        if values.len() != FIELDS_PER_RECORD {
            return Err(corrupt(format!(
                "expected {} fields, found {}",
                FIELDS_PER_RECORD,
                values.len()
            )));
        }

        entries.push(CalibrationEntry {
            index: values[0],
            azimuth_units: values[1],
            azimuth_steps: values[2],
            elevation_units: values[3],
            elevation_duty: values[4],
        });
    }

    Ok(entries)
}

fn read_binary<R: Read>(mut reader: R) -> Result<Vec<CalibrationEntry>, CalibrationError> {
    let mut entries = Vec::with_capacity(TABLE_SIZE);

    for record in 0..TABLE_SIZE {
        let mut values = [0i32; FIELDS_PER_RECORD];
        for value in values.iter_mut() {
            *value = reader.read_i32::<LittleEndian>().map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => CalibrationError::Corrupt {
                    record,
                    reason: "truncated record".to_string(),
                },
                _ => CalibrationError::Io(e),
            })?;
        }
        entries.push(CalibrationEntry {
            index: values[0],
            azimuth_units: values[1],
            azimuth_steps: values[2],
            elevation_units: values[3],
            elevation_duty: values[4],
        });
    }

    let mut trailing = [0u8; 1];
    if reader.read(&mut trailing)? != 0 {
        return Err(CalibrationError::Corrupt {
            record: TABLE_SIZE,
            reason: "trailing data after last record".to_string(),
        });
    }

    Ok(entries)
}
