//! Integration tests for tl-output.

#[cfg(test)]
mod csv_tests {
    use tempfile::TempDir;
    use tl_core::LightState;
    use tl_scan::Anomaly;

    use crate::csv::{CsvWriter, SCANNER_READINGS_FILE, STATE_RECORDS_FILE};
    use crate::row::{ScannerReadingRow, StateRecordRow};
    use crate::writer::ReportWriter;

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn reading_row(scanner_id: u32, anomaly: Anomaly) -> ScannerReadingRow {
        ScannerReadingRow {
            cycle:           2,
            intersection_id: 305,
            scanner_id,
            light_id:        805,
            cars:            4,
            trucks:          1,
            bikes:           0,
            buses:           7,
            total:           12,
            anomaly,
            sub_scans:       3,
            degraded:        false,
        }
    }

    fn headers(path: std::path::PathBuf) -> Vec<String> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        rdr.headers().unwrap().iter().map(str::to_owned).collect()
    }

    #[test]
    fn files_created_with_headers() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        assert_eq!(
            headers(dir.path().join(STATE_RECORDS_FILE)),
            ["sequence", "intersection_id", "state", "guard_applied"]
        );
        assert_eq!(
            headers(dir.path().join(SCANNER_READINGS_FILE)),
            [
                "cycle", "intersection_id", "scanner_id", "light_id", "cars", "trucks",
                "bikes", "buses", "total", "anomaly", "sub_scans", "degraded",
            ]
        );
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = tmp();
        let nested = dir.path().join("runs").join("first");
        let _w = CsvWriter::new(&nested).unwrap();
        assert!(nested.join(STATE_RECORDS_FILE).exists());
    }

    #[test]
    fn state_records_written_in_order() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_record(&StateRecordRow {
            sequence: 1, intersection_id: 305, state: LightState::Green, guard_applied: false,
        })
        .unwrap();
        w.write_record(&StateRecordRow {
            sequence: 2, intersection_id: 306, state: LightState::Green, guard_applied: true,
        })
        .unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(STATE_RECORDS_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][2], "green");
        assert_eq!(&rows[0][3], "0");
        assert_eq!(&rows[1][1], "306");
        assert_eq!(&rows[1][3], "1");
    }

    #[test]
    fn readings_written_with_labels() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_readings(&[reading_row(9023, Anomaly::Clear), reading_row(9024, Anomaly::Detected)])
            .unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join(SCANNER_READINGS_FILE)).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "9023"); // scanner_id
        assert_eq!(&rows[0][8], "12");   // total
        assert_eq!(&rows[0][9], "clear");
        assert_eq!(&rows[1][9], "detected");
        assert_eq!(&rows[1][11], "0");
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

#[cfg(test)]
mod observer_tests {
    use std::sync::Arc;

    use tl_control::{ControllerBuilder, CycleObserver};
    use tl_core::{CycleConfig, LightState, VirtualClock};
    use tl_scan::CollectionReport;

    use crate::csv::{CsvWriter, SCANNER_READINGS_FILE, STATE_RECORDS_FILE};
    use crate::row::{ScannerReadingRow, StateRecordRow};
    use crate::writer::ReportWriter;
    use crate::{OutputError, OutputResult, ReportObserver};

    /// Writer whose every call fails.
    struct BrokenWriter {
        finish_calls: u32,
    }

    fn broken() -> OutputResult<()> {
        Err(OutputError::Io(std::io::Error::other("disk gone")))
    }

    impl ReportWriter for BrokenWriter {
        fn write_record(&mut self, _row: &StateRecordRow) -> OutputResult<()> {
            broken()
        }
        fn write_readings(&mut self, _rows: &[ScannerReadingRow]) -> OutputResult<()> {
            broken()
        }
        fn finish(&mut self) -> OutputResult<()> {
            self.finish_calls += 1;
            broken()
        }
    }

    #[test]
    fn full_run_writes_every_record_and_reading() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = ControllerBuilder::new(CycleConfig::default())
            .paired()
            .clock(Arc::new(VirtualClock::new()))
            .build()
            .unwrap();
        let mut obs = ReportObserver::new(CsvWriter::new(dir.path()).unwrap());
        controller.run(LightState::Green, 3, &mut obs).unwrap();
        assert!(obs.take_error().is_none());
        assert_eq!(obs.rows_written(), (3, 12));

        let mut rdr = csv::Reader::from_path(dir.path().join(STATE_RECORDS_FILE)).unwrap();
        let records: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        for (row, expected) in records.iter().zip(controller.history().records()) {
            assert_eq!(&row[0], expected.sequence.to_string());
            assert_eq!(&row[1], expected.intersection.0.to_string());
            assert_eq!(&row[2], expected.state.label());
        }

        let mut rdr = csv::Reader::from_path(dir.path().join(SCANNER_READINGS_FILE)).unwrap();
        let readings: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(readings.len(), 3 * 4);
        assert!(readings.iter().all(|r| &r[10] == "3"));
    }

    #[test]
    fn first_error_kept_and_taken_once() {
        let mut obs = ReportObserver::new(BrokenWriter { finish_calls: 0 });
        obs.on_collection(1, &CollectionReport::default());
        assert!(obs.take_error().is_none(), "empty collection writes nothing");

        let mut controller = ControllerBuilder::new(CycleConfig::default())
            .paired()
            .clock(Arc::new(VirtualClock::new()))
            .build()
            .unwrap();
        controller.run(LightState::Red, 2, &mut obs).unwrap();

        assert!(matches!(obs.take_error(), Some(OutputError::Io(_))));
        assert!(obs.take_error().is_none());
        assert_eq!(obs.rows_written(), (0, 0));
        assert_eq!(obs.into_writer().finish_calls, 1);
    }
}
