//! Tests for scanners and the scan pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tl_core::{
    Clock, IntersectionId, LightId, RealClock, ScannerId, ScannerRng, Sleep, VirtualClock,
};

use crate::scanner::MAX_DRAW_PER_CLASS;
use crate::{Anomaly, ScanPool, ScanSettings, Scanner, VehicleClass, VehicleCounts};

// ── Helpers ───────────────────────────────────────────────────────────────────

const SEED: u64 = 42;

fn scanner(id: u32, intersection: u32, settings: ScanSettings) -> Scanner {
    let mut s = Scanner::new(ScannerId(id), IntersectionId(intersection), LightId(id + 1000), SEED);
    s.configure(settings);
    s
}

/// Replay the draws a scanner's first collection makes.
fn expected_first_collection(id: u32, scan_count: u32) -> (VehicleCounts, Anomaly) {
    let mut root = ScannerRng::new(SEED, ScannerId(id));
    let mut rng = root.fork();
    let mut counts = VehicleCounts::ZERO;
    for _ in 0..scan_count {
        for class in VehicleClass::ALL {
            counts.add(class, rng.gen_range(0..=MAX_DRAW_PER_CLASS));
        }
    }
    let anomaly = *rng.choose(&Anomaly::OUTCOMES).unwrap();
    (counts, anomaly)
}

fn virtual_clock() -> Arc<dyn Clock> {
    Arc::new(VirtualClock::new())
}

/// Clock whose first `instant` sleeps return at once; later sleeps block
/// for the full duration in real time.
struct StallingClock {
    instant: AtomicUsize,
    real:    RealClock,
}

impl StallingClock {
    fn after(instant: usize) -> Self {
        Self { instant: AtomicUsize::new(instant), real: RealClock::new() }
    }
}

impl Clock for StallingClock {
    fn sleep(&self, duration: Duration) -> Sleep {
        let free = self
            .instant
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if free { Sleep::Elapsed } else { self.real.sleep(duration) }
    }

    fn elapsed(&self) -> Duration {
        self.real.elapsed()
    }
}

// ── VehicleCounts ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod counts_tests {
    use super::*;

    #[test]
    fn total_is_sum_of_classes() {
        let c = VehicleCounts { cars: 4, trucks: 1, bikes: 7, buses: 0 };
        assert_eq!(c.total(), 12);
    }

    #[test]
    fn add_saturates() {
        let mut c = VehicleCounts { cars: u32::MAX, ..VehicleCounts::ZERO };
        c.add(VehicleClass::Car, 5);
        assert_eq!(c.cars, u32::MAX);
    }

    #[test]
    fn anomaly_table_is_two_clear_one_detected() {
        let detected = Anomaly::OUTCOMES.iter().filter(|a| a.is_detected()).count();
        assert_eq!(detected, 1);
        assert_eq!(Anomaly::OUTCOMES.len(), 3);
        assert_eq!(Anomaly::default(), Anomaly::Unassessed);
    }
}

// ── Scanner ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scanner_tests {
    use super::*;

    #[test]
    fn new_scanner_is_idle() {
        let s = scanner(1, 10, ScanSettings::new(3, 2));
        assert_eq!(s.counts(), VehicleCounts::ZERO);
        assert_eq!(s.anomaly(), Anomaly::Unassessed);
        assert_eq!(s.total_vehicles(), 0);
        assert_eq!(s.settings(), ScanSettings::new(3, 2));
    }

    #[test]
    fn blocking_scan_matches_replayed_draws() {
        let clock = VirtualClock::new();
        let mut s = scanner(9023, 305, ScanSettings::new(3, 2));
        let reading = s.scan_blocking(&clock);

        let (counts, anomaly) = expected_first_collection(9023, 3);
        assert_eq!(reading.counts, counts);
        assert_eq!(reading.anomaly, anomaly);
        assert_eq!(reading.sub_scans, 3);
        assert!(reading.completed);
        assert_eq!(reading.total(), counts.total());
        // Three sub-scans of two simulated seconds each.
        assert_eq!(clock.elapsed(), Duration::from_secs(6));
        assert_eq!(clock.sleep_count(), 3);
    }

    #[test]
    fn per_sub_scan_draws_are_bounded() {
        let clock = VirtualClock::new();
        let mut s = scanner(5, 1, ScanSettings::new(20, 0));
        let reading = s.scan_blocking(&clock);
        for class in VehicleClass::ALL {
            assert!(reading.counts.get(class) <= 20 * MAX_DRAW_PER_CLASS);
        }
    }

    #[test]
    fn counts_reset_between_collections() {
        let clock = VirtualClock::new();
        let mut s = scanner(5, 1, ScanSettings::new(2, 1));
        s.scan_blocking(&clock);
        s.configure(ScanSettings::new(0, 1));
        let second = s.scan_blocking(&clock);
        assert_eq!(second.counts, VehicleCounts::ZERO);
        assert_eq!(second.sub_scans, 0);
        assert!(second.completed);
    }

    #[test]
    fn interrupted_sub_scan_still_counts() {
        let clock = VirtualClock::new();
        clock.interrupt_next(3);
        let mut s = scanner(9023, 305, ScanSettings::new(3, 2));
        let reading = s.scan_blocking(&clock);
        assert_eq!(reading.sub_scans, 3);
        assert_eq!(reading.counts, expected_first_collection(9023, 3).0);
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }
}

// ── ScanPool ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pool_tests {
    use super::*;

    fn four_scanners(settings: ScanSettings) -> Vec<Scanner> {
        vec![
            scanner(9023, 305, settings),
            scanner(9024, 305, settings),
            scanner(9025, 306, settings),
            scanner(9026, 306, settings),
        ]
    }

    #[test]
    fn pool_has_one_thread_per_scanner() {
        assert_eq!(ScanPool::for_scanners(4).unwrap().threads(), 4);
        assert_eq!(ScanPool::for_scanners(0).unwrap().threads(), 1);
    }

    #[test]
    fn collect_drains_every_scanner() {
        let mut scanners = four_scanners(ScanSettings::new(3, 2));
        let report = ScanPool::for_scanners(scanners.len())
            .unwrap()
            .collect(scanners.iter_mut(), virtual_clock(), Duration::from_secs(5));

        assert!(!report.degraded);
        assert_eq!(report.readings.len(), 4);
        assert_eq!(report.completed(), 4);
        for (reading, s) in report.readings.iter().zip(&scanners) {
            assert_eq!(reading.scanner, s.id());
            assert_eq!(reading.counts, s.counts());
            assert_eq!(reading.sub_scans, 3);
        }
    }

    #[test]
    fn pooled_counts_match_replayed_draws() {
        let mut scanners = four_scanners(ScanSettings::new(4, 1));
        let report = ScanPool::for_scanners(4)
            .unwrap()
            .collect(scanners.iter_mut(), virtual_clock(), Duration::from_secs(5));
        for reading in &report.readings {
            let (counts, anomaly) = expected_first_collection(reading.scanner.0, 4);
            assert_eq!(reading.counts, counts, "scanner {}", reading.scanner);
            assert_eq!(reading.anomaly, anomaly);
        }
    }

    #[test]
    fn intersection_total_is_sum_of_its_scanners() {
        let mut scanners = four_scanners(ScanSettings::new(3, 2));
        let report = ScanPool::for_scanners(4)
            .unwrap()
            .collect(scanners.iter_mut(), virtual_clock(), Duration::from_secs(5));
        let totals = report.totals_by_intersection();

        let sum = |ix: u32| -> u64 {
            scanners
                .iter()
                .filter(|s| s.intersection() == IntersectionId(ix))
                .map(|s| {
                    let c = s.counts();
                    c.cars as u64 + c.trucks as u64 + c.bikes as u64 + c.buses as u64
                })
                .sum()
        };
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&IntersectionId(305)], sum(305));
        assert_eq!(totals[&IntersectionId(306)], sum(306));
        assert_eq!(totals.keys().copied().collect::<Vec<_>>(), [IntersectionId(305), IntersectionId(306)]);
    }

    #[test]
    fn empty_collection_is_not_degraded() {
        let report = ScanPool::for_scanners(0)
            .unwrap()
            .collect(Vec::<&mut Scanner>::new(), virtual_clock(), Duration::ZERO);
        assert!(!report.degraded);
        assert!(report.readings.is_empty());
        assert!(report.totals_by_intersection().is_empty());
    }

    #[test]
    fn drain_deadline_cancels_and_keeps_partial_counts() {
        // Sub-scans of 30 real seconds against a 50 ms drain budget.
        let clock: Arc<dyn Clock> = Arc::new(RealClock::new());
        let mut scanners = four_scanners(ScanSettings::new(3, 30));
        let report = ScanPool::for_scanners(4)
            .unwrap()
            .collect(scanners.iter_mut(), clock, Duration::from_millis(50));

        assert!(report.degraded);
        assert_eq!(report.completed(), 0);
        assert!(report.wall_elapsed < Duration::from_secs(10));
        for reading in &report.readings {
            assert_eq!(reading.sub_scans, 0);
            assert_eq!(reading.counts, VehicleCounts::ZERO);
            assert_eq!(reading.anomaly, Anomaly::Unassessed);
            assert!(!reading.completed);
        }
    }

    #[test]
    fn drain_deadline_keeps_counts_of_finished_sub_scans() {
        // Two sub-scans finish at once, the third stalls past the deadline.
        let clock: Arc<dyn Clock> = Arc::new(StallingClock::after(2));
        let mut scanners = vec![scanner(9023, 305, ScanSettings::new(3, 30))];
        let report = ScanPool::for_scanners(1)
            .unwrap()
            .collect(scanners.iter_mut(), clock, Duration::from_millis(300));

        assert!(report.degraded);
        let reading = report.readings[0];
        assert_eq!(reading.sub_scans, 2);
        assert!(!reading.completed);
        assert_eq!(reading.anomaly, Anomaly::Unassessed);

        let (two_sub_scans, _) = expected_first_collection(9023, 2);
        assert!(two_sub_scans.total() > 0);
        assert_eq!(reading.counts, two_sub_scans);
        assert_eq!(scanners[0].counts(), two_sub_scans);
        assert_eq!(report.totals_by_intersection()[&IntersectionId(305)], two_sub_scans.total());
    }

    #[test]
    fn anomalies_lists_only_detected_readings() {
        let ids = 9023..9043;
        let mut scanners: Vec<Scanner> =
            ids.clone().map(|id| scanner(id, 305, ScanSettings::new(1, 1))).collect();
        let report = ScanPool::for_scanners(scanners.len())
            .unwrap()
            .collect(scanners.iter_mut(), virtual_clock(), Duration::from_secs(5));

        let flagged: Vec<u32> = report.anomalies().map(|r| r.scanner.0).collect();
        let expected: Vec<u32> = ids
            .filter(|&id| expected_first_collection(id, 1).1 == Anomaly::Detected)
            .collect();
        assert_eq!(flagged, expected);
        assert!(report.anomalies().all(|r| r.anomaly.is_detected()));
    }

    #[test]
    fn scanners_recover_after_a_degraded_collection() {
        let slow: Arc<dyn Clock> = Arc::new(RealClock::new());
        let mut scanners = four_scanners(ScanSettings::new(1, 30));
        let first = ScanPool::for_scanners(4)
            .unwrap()
            .collect(scanners.iter_mut(), slow, Duration::from_millis(20));
        assert!(first.degraded);

        for s in &mut scanners {
            s.configure(ScanSettings::new(2, 1));
        }
        let second = ScanPool::for_scanners(4)
            .unwrap()
            .collect(scanners.iter_mut(), virtual_clock(), Duration::from_secs(5));
        assert!(!second.degraded);
        assert_eq!(second.completed(), 4);
        assert!(second.readings.iter().all(|r| r.sub_scans == 2));
    }
}
