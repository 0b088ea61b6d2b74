mod error;
mod storage;
mod table;
mod types;

pub use error::CalibrationError;
pub use storage::{load_or_generate, TableFormat};
pub use table::CalibrationTable;
pub use types::{AxisRange, HardwareRanges, AZIMUTH_RANGE, ELEVATION_RANGE};
