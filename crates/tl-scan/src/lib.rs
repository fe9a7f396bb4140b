//! `tl-scan` — vehicle-counting scanners and concurrent collection.
//!
//! # One collection
//!
//! ```text
//! ScanPool::for_scanners(n)           (n worker threads, one per scanner)
//!   ├─ per scanner: reset counts, fork RNG, spawn ScanJob
//!   │     loop scan_count times:
//!   │        sleep(scan_length)  ── Clock
//!   │        +[0,9] cars, trucks, bikes, buses
//!   │     draw anomaly (2 × clear, 1 × detected)
//!   ├─ drain barrier: wait for every job or the wall deadline
//!   │     deadline hit → cancel flag set, collection marked degraded
//!   └─ copy each tally back into its Scanner → CollectionReport
//! ```
//!
//! Each job owns its RNG and writes only its own tally, so no two tasks ever
//! touch the same counters.  Counters are read only after the barrier.

pub mod counts;
pub mod error;
pub mod pool;
pub mod scanner;

#[cfg(test)]
mod tests;

pub use counts::{Anomaly, VehicleClass, VehicleCounts};
pub use error::{ScanError, ScanResult};
pub use pool::{CollectionReport, ScanPool, ScanReading};
pub use scanner::{ScanSettings, Scanner};
