//! A single simulated camera and the job it runs during a collection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tl_core::{Clock, CycleConfig, IntersectionId, LightId, ScannerId, ScannerRng, Sleep};
use tracing::debug;

use crate::{Anomaly, ScanReading, VehicleClass, VehicleCounts};

/// Largest count one sub-scan can add to a single class.
pub const MAX_DRAW_PER_CLASS: u32 = 9;

// ── ScanSettings ──────────────────────────────────────────────────────────────

/// Sub-scan parameters pushed into every scanner by `configure`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ScanSettings {
    pub scan_count:       u32,
    pub scan_length_secs: u32,
}

impl ScanSettings {
    pub fn new(scan_count: u32, scan_length_secs: u32) -> Self {
        Self { scan_count, scan_length_secs }
    }

    #[inline]
    pub fn sub_scan(&self) -> Duration {
        Duration::from_secs(self.scan_length_secs as u64)
    }
}

impl From<&CycleConfig> for ScanSettings {
    fn from(config: &CycleConfig) -> Self {
        Self::new(config.scan_count, config.scan_length_secs)
    }
}

// ── Scanner ───────────────────────────────────────────────────────────────────

/// One vehicle-counting scanner, bound to a light of an intersection.
///
/// Counters hold the result of the most recent collection.  They are reset
/// to zero when a collection starts and only written back after the drain
/// barrier, so readers never see a half-finished collection.
#[derive(Debug)]
pub struct Scanner {
    id:           ScannerId,
    intersection: IntersectionId,
    light:        LightId,
    settings:     ScanSettings,
    counts:       VehicleCounts,
    anomaly:      Anomaly,
    sub_scans:    u32,
    rng:          ScannerRng,
}

impl Scanner {
    /// Create an idle scanner with zeroed counters and no scan configured.
    pub fn new(id: ScannerId, intersection: IntersectionId, light: LightId, seed: u64) -> Self {
        Self {
            id,
            intersection,
            light,
            settings:  ScanSettings::default(),
            counts:    VehicleCounts::ZERO,
            anomaly:   Anomaly::Unassessed,
            sub_scans: 0,
            rng:       ScannerRng::new(seed, id),
        }
    }

    pub fn id(&self) -> ScannerId {
        self.id
    }

    pub fn intersection(&self) -> IntersectionId {
        self.intersection
    }

    pub fn light(&self) -> LightId {
        self.light
    }

    pub fn settings(&self) -> ScanSettings {
        self.settings
    }

    pub fn counts(&self) -> VehicleCounts {
        self.counts
    }

    pub fn anomaly(&self) -> Anomaly {
        self.anomaly
    }

    /// Sub-scans completed in the most recent collection.
    pub fn sub_scans(&self) -> u32 {
        self.sub_scans
    }

    #[inline]
    pub fn total_vehicles(&self) -> u64 {
        self.counts.total()
    }

    /// Replace the sub-scan parameters used by the next collection.
    pub fn configure(&mut self, settings: ScanSettings) {
        self.settings = settings;
    }

    /// Snapshot of the most recent collection.
    pub fn reading(&self) -> ScanReading {
        ScanReading {
            scanner:      self.id,
            intersection: self.intersection,
            light:        self.light,
            counts:       self.counts,
            anomaly:      self.anomaly,
            sub_scans:    self.sub_scans,
            completed:    self.sub_scans == self.settings.scan_count
                && self.anomaly != Anomaly::Unassessed,
        }
    }

    /// Run one collection on the calling thread.
    pub fn scan_blocking(&mut self, clock: &dyn Clock) -> ScanReading {
        let job = self.prepare();
        let tally = Arc::clone(&job.tally);
        job.run(clock, &AtomicBool::new(false));
        self.absorb(&tally);
        self.reading()
    }

    /// Reset counters and hand out the job for the next collection.
    pub(crate) fn prepare(&mut self) -> ScanJob {
        self.counts = VehicleCounts::ZERO;
        self.anomaly = Anomaly::Unassessed;
        self.sub_scans = 0;
        ScanJob {
            scanner:  self.id,
            settings: self.settings,
            rng:      self.rng.fork(),
            tally:    Arc::new(ScanTally::default()),
        }
    }

    /// Copy a drained tally into the scanner's counters.
    pub(crate) fn absorb(&mut self, tally: &ScanTally) {
        let (counts, sub_scans, anomaly) = tally.snapshot();
        self.counts = counts;
        self.sub_scans = sub_scans;
        self.anomaly = anomaly;
    }
}

// ── ScanTally ─────────────────────────────────────────────────────────────────

/// Counters written by exactly one scan job, read after the drain barrier.
///
/// A fresh tally is allocated per collection, so a job that outlives a
/// cancelled collection only ever writes into its own orphaned tally.
/// Counts and `sub_scans` change together under one lock, so a snapshot
/// holds exactly the draws of the sub-scans it reports.
#[derive(Debug, Default)]
pub(crate) struct ScanTally {
    state: Mutex<TallyState>,
}

#[derive(Copy, Clone, Debug, Default)]
struct TallyState {
    counts:    VehicleCounts,
    sub_scans: u32,
    anomaly:   Anomaly,
}

impl ScanTally {
    fn lock(&self) -> MutexGuard<'_, TallyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_sub_scan(&self, draws: &VehicleCounts) {
        let mut state = self.lock();
        for class in VehicleClass::ALL {
            state.counts.add(class, draws.get(class));
        }
        state.sub_scans += 1;
    }

    fn record_anomaly(&self, anomaly: Anomaly) {
        self.lock().anomaly = anomaly;
    }

    pub(crate) fn snapshot(&self) -> (VehicleCounts, u32, Anomaly) {
        let state = *self.lock();
        (state.counts, state.sub_scans, state.anomaly)
    }
}

// ── ScanJob ───────────────────────────────────────────────────────────────────

/// Everything one scan task needs, owned so it can move onto a pool thread.
pub(crate) struct ScanJob {
    pub(crate) scanner:  ScannerId,
    pub(crate) settings: ScanSettings,
    pub(crate) rng:      ScannerRng,
    pub(crate) tally:    Arc<ScanTally>,
}

impl ScanJob {
    /// Run `scan_count` timed sub-scans, then draw the anomaly outcome.
    ///
    /// `cancel` is checked around every sleep; once set, the job stops
    /// without drawing further counts or an anomaly.
    pub(crate) fn run(mut self, clock: &dyn Clock, cancel: &AtomicBool) {
        let sub_scan = self.settings.sub_scan();
        for _ in 0..self.settings.scan_count {
            if cancel.load(Ordering::Acquire) {
                return;
            }
            if clock.sleep(sub_scan) == Sleep::Interrupted {
                debug!(scanner = %self.scanner, "sub-scan sleep interrupted; counting now");
            }
            if cancel.load(Ordering::Acquire) {
                return;
            }

            let mut draws = VehicleCounts::ZERO;
            for class in VehicleClass::ALL {
                draws.add(class, self.rng.gen_range(0..=MAX_DRAW_PER_CLASS));
            }
            self.tally.record_sub_scan(&draws);
        }

        let anomaly = self
            .rng
            .choose(&Anomaly::OUTCOMES)
            .copied()
            .unwrap_or(Anomaly::Clear);
        self.tally.record_anomaly(anomaly);
    }
}
