use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpsError {
    #[error("unexpected sentence tag: {0}")]
    UnexpectedTag(String),
    #[error("sentence has {found} fields, expected at least {expected}")]
    TooFewFields { expected: usize, found: usize },
    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("sentence has no checksum")]
    MissingChecksum,
    #[error("checksum mismatch: sentence says {expected:02X}, computed {computed:02X}")]
    ChecksumMismatch { expected: u8, computed: u8 },
    #[error("gps source error: {0}")]
    Io(#[from] std::io::Error),
}
