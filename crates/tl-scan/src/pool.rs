//! `ScanPool` — one bounded worker pool per collection, with a drain barrier.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tl_core::{Clock, IntersectionId, LightId, ScannerId};
use tracing::{debug, warn};

use crate::{Anomaly, ScanResult, Scanner, VehicleCounts};

// ── Report types ──────────────────────────────────────────────────────────────

/// One scanner's result for a collection.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ScanReading {
    pub scanner:      ScannerId,
    pub intersection: IntersectionId,
    pub light:        LightId,
    pub counts:       VehicleCounts,
    pub anomaly:      Anomaly,
    /// Sub-scans that finished before the drain barrier.
    pub sub_scans:    u32,
    /// `false` if the task was cancelled by the drain deadline.
    pub completed:    bool,
}

impl ScanReading {
    #[inline]
    pub fn total(&self) -> u64 {
        self.counts.total()
    }
}

/// Result of one drained collection across every scanner.
#[derive(Clone, Debug, Default)]
pub struct CollectionReport {
    /// Readings in the order the scanners were submitted.
    pub readings:     Vec<ScanReading>,
    /// `true` when the drain deadline passed and outstanding tasks were
    /// cancelled.  Counts are then partial, not missing.
    pub degraded:     bool,
    /// Wall time spent between submission and the end of the drain.
    pub wall_elapsed: Duration,
}

impl CollectionReport {
    /// Aggregate vehicle totals keyed by intersection, in ascending id order.
    pub fn totals_by_intersection(&self) -> BTreeMap<IntersectionId, u64> {
        let mut totals = BTreeMap::new();
        for reading in &self.readings {
            *totals.entry(reading.intersection).or_insert(0) += reading.total();
        }
        totals
    }

    /// Readings whose anomaly outcome was `Detected`.
    pub fn anomalies(&self) -> impl Iterator<Item = &ScanReading> {
        self.readings.iter().filter(|r| r.anomaly.is_detected())
    }

    /// Number of scan tasks that ran to completion.
    pub fn completed(&self) -> usize {
        self.readings.iter().filter(|r| r.completed).count()
    }
}

// ── ScanPool ──────────────────────────────────────────────────────────────────

/// A worker pool sized to the scanners of one collection.
///
/// Created per collection and consumed by [`collect`][Self::collect].  The
/// thread count is fixed at construction; there is no unbounded spawning.
pub struct ScanPool {
    pool:    rayon::ThreadPool,
    threads: usize,
}

impl ScanPool {
    /// Build a pool with one thread per scanner (at least one thread).
    pub fn for_scanners(scanner_count: usize) -> ScanResult<Self> {
        let threads = scanner_count.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("tl-scan-{i}"))
            .build()?;
        Ok(Self { pool, threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run one collection on every scanner and block until the drain barrier.
    ///
    /// Each scanner gets its own task.  `collect` returns only after every
    /// task has finished, or after `drain_timeout` of wall time, in which
    /// case the remaining tasks are cancelled and their partial counts are
    /// kept (`degraded = true`).  Scanner counters are written back after
    /// the barrier, in submission order.
    pub fn collect<'a, I>(
        self,
        scanners:      I,
        clock:         Arc<dyn Clock>,
        drain_timeout: Duration,
    ) -> CollectionReport
    where
        I: IntoIterator<Item = &'a mut Scanner>,
    {
        let started = Instant::now();
        let cancel = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = mpsc::channel::<ScannerId>();

        // ── Submit ────────────────────────────────────────────────────────
        let mut submitted = Vec::new();
        for scanner in scanners {
            let job = scanner.prepare();
            let tally = Arc::clone(&job.tally);
            let clock = Arc::clone(&clock);
            let cancel = Arc::clone(&cancel);
            let done = done_tx.clone();
            self.pool.spawn(move || {
                let id = job.scanner;
                job.run(clock.as_ref(), &cancel);
                // The receiver is gone if the collection already drained.
                let _ = done.send(id);
            });
            submitted.push((scanner, tally));
        }
        drop(done_tx);

        // ── Drain barrier ─────────────────────────────────────────────────
        let expected = submitted.len();
        // `None` means the timeout is too large to represent: wait unbounded.
        let deadline = started.checked_add(drain_timeout);
        let mut finished = 0usize;
        let mut degraded = false;
        while finished < expected {
            let next = match deadline {
                Some(deadline) => {
                    done_rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                None => done_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match next {
                Ok(id) => {
                    finished += 1;
                    debug!(scanner = %id, finished, expected, "scan task finished");
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    degraded = true;
                    break;
                }
            }
        }
        if degraded {
            cancel.store(true, Ordering::Release);
            warn!(
                finished,
                expected,
                timeout_ms = drain_timeout.as_millis() as u64,
                "scan drain deadline passed; cancelling outstanding scans and using partial counts"
            );
        }

        // ── Publish ───────────────────────────────────────────────────────
        let readings = submitted
            .into_iter()
            .map(|(scanner, tally)| {
                scanner.absorb(&tally);
                scanner.reading()
            })
            .collect();

        let report = CollectionReport {
            readings,
            degraded,
            wall_elapsed: started.elapsed(),
        };
        for reading in report.anomalies() {
            warn!(
                scanner = %reading.scanner,
                intersection = %reading.intersection,
                "traffic anomaly reported; camera needs checking"
            );
        }
        report
    }
}
