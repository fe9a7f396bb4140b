//! `tl-output` — report writers for controller runs.
//!
//! | Backend | Files created                                   |
//! |---------|-------------------------------------------------|
//! | CSV     | `state_records.csv`, `scanner_readings.csv`     |
//!
//! Writers implement [`ReportWriter`] and are driven by [`ReportObserver`],
//! which implements `tl_control::CycleObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tl_output::{CsvWriter, ReportObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = ReportObserver::new(writer);
//! controller.run(LightState::Green, 3, &mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::ReportObserver;
pub use row::{ScannerReadingRow, StateRecordRow};
pub use writer::ReportWriter;
