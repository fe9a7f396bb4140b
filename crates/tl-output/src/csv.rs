//! CSV report backend.
//!
//! Creates two files in the configured output directory:
//! - `state_records.csv`
//! - `scanner_readings.csv`

use std::fs::{self, File};
use std::path::Path;

use csv::Writer;

use crate::writer::ReportWriter;
use crate::{OutputResult, ScannerReadingRow, StateRecordRow};

pub const STATE_RECORDS_FILE: &str = "state_records.csv";
pub const SCANNER_READINGS_FILE: &str = "scanner_readings.csv";

/// Writes a run report to two CSV files.
pub struct CsvWriter {
    records:  Writer<File>,
    readings: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open both files and write their header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let mut records = Writer::from_path(dir.join(STATE_RECORDS_FILE))?;
        records.write_record(["sequence", "intersection_id", "state", "guard_applied"])?;

        let mut readings = Writer::from_path(dir.join(SCANNER_READINGS_FILE))?;
        readings.write_record([
            "cycle",
            "intersection_id",
            "scanner_id",
            "light_id",
            "cars",
            "trucks",
            "bikes",
            "buses",
            "total",
            "anomaly",
            "sub_scans",
            "degraded",
        ])?;

        Ok(Self {
            records,
            readings,
            finished: false,
        })
    }
}

impl ReportWriter for CsvWriter {
    fn write_record(&mut self, row: &StateRecordRow) -> OutputResult<()> {
        self.records.write_record(&[
            row.sequence.to_string(),
            row.intersection_id.to_string(),
            row.state.label().to_owned(),
            (row.guard_applied as u8).to_string(),
        ])?;
        Ok(())
    }

    fn write_readings(&mut self, rows: &[ScannerReadingRow]) -> OutputResult<()> {
        for row in rows {
            self.readings.write_record(&[
                row.cycle.to_string(),
                row.intersection_id.to_string(),
                row.scanner_id.to_string(),
                row.light_id.to_string(),
                row.cars.to_string(),
                row.trucks.to_string(),
                row.bikes.to_string(),
                row.buses.to_string(),
                row.total.to_string(),
                row.anomaly.label().to_owned(),
                row.sub_scans.to_string(),
                (row.degraded as u8).to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.records.flush()?;
        self.readings.flush()?;
        Ok(())
    }
}
