use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::error::GpsError;

/// Where NMEA sentences come from. `None` means the source is exhausted for
/// the current ingestion pass.
pub trait FixSource {
    /// Called once before every ingestion pass.
    fn begin_pass(&mut self) {}

    fn next_sentence(&mut self) -> Option<String>;
}

/// A fixed-capacity buffer of recorded sentences. Every pass replays the
/// buffer from its first line.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    lines: Vec<String>,
    capacity: usize,
    cursor: usize,
}

impl ReplaySource {
    pub fn new<I, S>(lines: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().take(capacity).map(Into::into).collect(),
            capacity,
            cursor: 0,
        }
    }

    pub fn from_file(path: &Path, capacity: usize) -> Result<Self, GpsError> {
        let reader = BufReader::new(File::open(path)?);
        let mut lines = Vec::with_capacity(capacity);
        for line in reader.lines().take(capacity) {
            lines.push(line?);
        }
        log::info!(
            "Loaded {} of at most {} replay sentences from {}",
            lines.len(),
            capacity,
            path.display()
        );
        Ok(Self::new(lines, capacity))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl FixSource for ReplaySource {
    fn begin_pass(&mut self) {
        self.cursor = 0;
    }

    fn next_sentence(&mut self) -> Option<String> {
        let line = self.lines.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(line)
    }
}

/// A live receiver stream, read line by line. At most `max_sentences` are
/// taken per pass so a receiver that never completes a fix cannot block
/// forever.
pub struct StreamSource<R> {
    reader: R,
    max_sentences: usize,
    taken: usize,
}

impl StreamSource<BufReader<File>> {
    pub fn open(device: &Path, max_sentences: usize) -> Result<Self, GpsError> {
        log::info!("Opening GPS receiver at {}", device.display());
        Ok(Self::new(BufReader::new(File::open(device)?), max_sentences))
    }
}

impl<R: BufRead> StreamSource<R> {
    pub fn new(reader: R, max_sentences: usize) -> Self {
        Self {
            reader,
            max_sentences,
            taken: 0,
        }
    }
}

impl<R: BufRead> FixSource for StreamSource<R> {
    fn begin_pass(&mut self) {
        self.taken = 0;
    }

    fn next_sentence(&mut self) -> Option<String> {
        if self.taken >= self.max_sentences {
            return None;
        }
        self.taken += 1;

        // Line noise is passed on as text so it is classified and skipped,
        // not mistaken for the end of the stream.
        let mut raw = Vec::new();
        match self.reader.read_until(b'\n', &mut raw) {
            Ok(0) => None,
            Ok(_) => Some(String::from_utf8_lossy(&raw).into_owned()),
            Err(e) => {
                log::warn!("GPS receiver read failed: {}", e);
                None
            }
        }
    }
}
