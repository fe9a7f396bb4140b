//! The `ReportWriter` trait implemented by report backends.

use crate::{OutputResult, ScannerReadingRow, StateRecordRow};

/// Sink for the two report streams of a controller run.
///
/// The observer stores errors rather than propagating them; see
/// [`ReportObserver::take_error`][crate::ReportObserver::take_error].
pub trait ReportWriter {
    /// Write one history record.
    fn write_record(&mut self, row: &StateRecordRow) -> OutputResult<()>;

    /// Write every reading of one collection.
    fn write_readings(&mut self, rows: &[ScannerReadingRow]) -> OutputResult<()>;

    /// Flush and close all underlying handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
