use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolarError {
    #[error("invalid {field}: {value}")]
    InvalidInput { field: &'static str, value: f64 },
    #[error("invalid timezone offset: {0} h")]
    InvalidTimezone(f64),
    #[error("solar position error: {0}")]
    Position(String),
}
