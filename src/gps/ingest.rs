use super::parsing::{classify, parse_motion, parse_position, validate_checksum};
use super::source::FixSource;
use super::types::{Fix, MessageKind};

/// Assembles a [`Fix`] from a position and a motion sentence.
///
/// In strict mode sentences with a missing or wrong checksum are skipped;
/// otherwise the checksum is not looked at.
#[derive(Debug, Clone, Copy, Default)]
pub struct NmeaIngest {
    strict_checksum: bool,
}

impl NmeaIngest {
    pub fn new(strict_checksum: bool) -> Self {
        Self { strict_checksum }
    }

    /// Pull sentences until both message types have been seen or the source
    /// runs dry. An exhausted source yields whatever was assembled so far.
    pub fn read_fix(&self, source: &mut dyn FixSource) -> Fix {
        source.begin_pass();
        let mut fix = Fix::default();
        let mut consumed = 0usize;

        while !fix.is_usable() {
            let Some(sentence) = source.next_sentence() else {
                log::debug!(
                    "GPS source exhausted after {} sentences, fix incomplete ({:?})",
                    consumed,
                    fix.completeness
                );
                break;
            };
            consumed += 1;
            self.ingest(&mut fix, &sentence);
        }

        if fix.is_usable() {
            log::debug!(
                "GPS fix after {} sentences: {:.6}, {:.6}",
                consumed,
                fix.latitude_deg,
                fix.longitude_deg
            );
        }
        fix
    }

    /// Fold one sentence into `fix`. Anything that does not parse cleanly is
    /// reported as [`MessageKind::Unknown`] and leaves `fix` untouched.
    pub fn ingest(&self, fix: &mut Fix, sentence: &str) -> MessageKind {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            return MessageKind::Unknown;
        }

        if self.strict_checksum {
            if let Err(e) = validate_checksum(sentence) {
                log::warn!("Skipping sentence ({}): {}", e, sentence);
                return MessageKind::Unknown;
            }
        }

        match classify(sentence) {
            MessageKind::Position => match parse_position(sentence) {
                Ok(position) => {
                    fix.apply_position(&position);
                    MessageKind::Position
                }
                Err(e) => {
                    log::debug!("Skipping malformed position sentence: {}", e);
                    MessageKind::Unknown
                }
            },
            MessageKind::Motion => match parse_motion(sentence) {
                Ok(motion) => {
                    fix.apply_motion(&motion);
                    MessageKind::Motion
                }
                Err(e) => {
                    log::debug!("Skipping malformed motion sentence: {}", e);
                    MessageKind::Unknown
                }
            },
            MessageKind::Unknown => MessageKind::Unknown,
        }
    }
}
