//! `ReportObserver<W>` — bridges `CycleObserver` to a `ReportWriter`.

use tl_control::{Choice, CycleObserver, StateRecord};
use tl_scan::CollectionReport;
use tracing::{debug, warn};

use crate::row::{ScannerReadingRow, StateRecordRow};
use crate::writer::ReportWriter;
use crate::{OutputError, OutputResult};

/// A [`CycleObserver`] that writes history records and scanner readings to
/// any [`ReportWriter`].
///
/// `CycleObserver` methods return nothing, so the first write error is kept
/// and later retrieved with [`take_error`][Self::take_error].
pub struct ReportObserver<W: ReportWriter> {
    writer:     W,
    records:    u64,
    readings:   u64,
    last_error: Option<OutputError>,
}

impl<W: ReportWriter> ReportObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records:    0,
            readings:   0,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after the run returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Rows written so far as `(records, readings)`.
    pub fn rows_written(&self) -> (u64, u64) {
        (self.records, self.readings)
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            warn!(error = %e, "report write failed");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: ReportWriter> CycleObserver for ReportObserver<W> {
    fn on_collection(&mut self, cycle: u32, report: &CollectionReport) {
        let rows: Vec<ScannerReadingRow> = report
            .readings
            .iter()
            .map(|r| ScannerReadingRow::new(cycle, r, report.degraded))
            .collect();
        if rows.is_empty() {
            return;
        }
        let result = self.writer.write_readings(&rows);
        if result.is_ok() {
            self.readings += rows.len() as u64;
        }
        self.store_err(result);
    }

    fn on_record(&mut self, record: &StateRecord, choice: &Choice) {
        let result = self.writer.write_record(&StateRecordRow::new(record, choice));
        if result.is_ok() {
            self.records += 1;
        }
        self.store_err(result);
    }

    fn on_stop(&mut self, cycles: u32) {
        let result = self.writer.finish();
        debug!(cycles, records = self.records, readings = self.readings, "report finished");
        self.store_err(result);
    }
}
