//! Flat row types written by report backends.

use tl_control::{Choice, StateRecord};
use tl_core::LightState;
use tl_scan::{Anomaly, ScanReading};

/// One history record, as appended by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateRecordRow {
    pub sequence:        u64,
    pub intersection_id: u32,
    pub state:           LightState,
    pub guard_applied:   bool,
}

impl StateRecordRow {
    pub fn new(record: &StateRecord, choice: &Choice) -> Self {
        Self {
            sequence:        record.sequence,
            intersection_id: record.intersection.0,
            state:           record.state,
            guard_applied:   choice.guard_applied,
        }
    }
}

/// One scanner's reading from one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerReadingRow {
    pub cycle:           u32,
    pub intersection_id: u32,
    pub scanner_id:      u32,
    pub light_id:        u32,
    pub cars:            u32,
    pub trucks:          u32,
    pub bikes:           u32,
    pub buses:           u32,
    pub total:           u64,
    pub anomaly:         Anomaly,
    pub sub_scans:       u32,
    /// The collection hit its drain deadline.
    pub degraded:        bool,
}

impl ScannerReadingRow {
    pub fn new(cycle: u32, reading: &ScanReading, degraded: bool) -> Self {
        Self {
            cycle,
            intersection_id: reading.intersection.0,
            scanner_id:      reading.scanner.0,
            light_id:        reading.light.0,
            cars:            reading.counts.cars,
            trucks:          reading.counts.trucks,
            bikes:           reading.counts.bikes,
            buses:           reading.counts.buses,
            total:           reading.total(),
            anomaly:         reading.anomaly,
            sub_scans:       reading.sub_scans,
            degraded,
        }
    }
}
