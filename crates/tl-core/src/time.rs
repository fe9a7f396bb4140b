//! Cycle configuration and phase-length derivation.
//!
//! # Design
//!
//! A control cycle is sized so that every scanner can finish its sub-scans
//! while the green phase runs, plus a fixed overhead for collection and the
//! decision step:
//!
//!   cycle  = scan_count * scan_length_secs + 4
//!   green  = cycle - 4
//!   yellow = green + 2
//!
//! All arithmetic is integral seconds; `PhaseTimings` is a pure function of
//! the two scan parameters.

use std::fmt;
use std::time::Duration;

/// Seconds reserved each cycle for collection and the decision step.
pub const DECISION_OVERHEAD_SECS: u64 = 4;

/// Seconds the yellow phase runs beyond the green phase.
pub const YELLOW_EXTENSION_SECS: u64 = 2;

// ── PhaseTimings ──────────────────────────────────────────────────────────────

/// Phase lengths for one cycle, in simulated seconds.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PhaseTimings {
    pub cycle_secs:  u64,
    pub green_secs:  u64,
    pub yellow_secs: u64,
}

impl PhaseTimings {
    /// Derive the phase lengths from the scan parameters.
    pub fn derive(scan_count: u32, scan_length_secs: u32) -> Self {
        let cycle_secs = scan_count as u64 * scan_length_secs as u64 + DECISION_OVERHEAD_SECS;
        let green_secs = cycle_secs - DECISION_OVERHEAD_SECS;
        Self {
            cycle_secs,
            green_secs,
            yellow_secs: green_secs + YELLOW_EXTENSION_SECS,
        }
    }

    #[inline]
    pub fn green(&self) -> Duration {
        Duration::from_secs(self.green_secs)
    }

    #[inline]
    pub fn yellow(&self) -> Duration {
        Duration::from_secs(self.yellow_secs)
    }
}

impl fmt::Display for PhaseTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycle {}s (green {}s, yellow {}s)",
            self.cycle_secs, self.green_secs, self.yellow_secs
        )
    }
}

// ── CycleConfig ───────────────────────────────────────────────────────────────

/// Run configuration.
///
/// Set once before a run; the controller only changes the scan parameters
/// through `configure`, and those take effect on the next computed cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CycleConfig {
    /// Sub-scans each scanner performs per collection.
    pub scan_count: u32,

    /// Simulated seconds per sub-scan.
    pub scan_length_secs: u32,

    /// Cycles to run before the controller stops.
    pub max_cycles: u32,

    /// Master RNG seed.  The same seed always produces identical counts.
    pub seed: u64,

    /// Wall-clock seconds the drain barrier waits beyond the expected scan
    /// time before cancelling outstanding scans.
    pub drain_grace_secs: u64,
}

impl CycleConfig {
    /// Phase lengths for the current scan parameters.
    #[inline]
    pub fn timings(&self) -> PhaseTimings {
        PhaseTimings::derive(self.scan_count, self.scan_length_secs)
    }

    /// Simulated time one full collection takes (all sub-scans of one scanner).
    #[inline]
    pub fn scan_duration(&self) -> Duration {
        Duration::from_secs(self.scan_count as u64 * self.scan_length_secs as u64)
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            scan_count:       3,
            scan_length_secs: 2,
            max_cycles:       3,
            seed:             42,
            drain_grace_secs: 2,
        }
    }
}
