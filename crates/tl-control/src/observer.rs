//! Observer trait for the outbound record stream and progress reporting.

use tl_core::{IntersectionId, PhaseTimings};
use tl_scan::CollectionReport;

use crate::{Choice, Phase, StateRecord};

/// Callbacks invoked by [`CycleController`][crate::CycleController] at each
/// cycle and phase boundary.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example — record printer
///
/// ```rust,ignore
/// struct RecordPrinter;
///
/// impl CycleObserver for RecordPrinter {
///     fn on_record(&mut self, record: &StateRecord, _choice: &Choice) {
///         println!("{record}");
///     }
/// }
/// ```
pub trait CycleObserver {
    /// Called when a cycle starts, with the phase lengths it will use.
    fn on_cycle_start(&mut self, _cycle: u32, _timings: &PhaseTimings) {}

    /// Called on entry to every phase.  `green` is the intersection holding
    /// (or, in the yellow phase, just releasing) the green light.
    fn on_phase(&mut self, _cycle: u32, _phase: Phase, _green: Option<IntersectionId>) {}

    /// Called after the drain barrier with every scanner's reading.
    fn on_collection(&mut self, _cycle: u32, _report: &CollectionReport) {}

    /// Called after a record is appended to the history.
    fn on_record(&mut self, _record: &StateRecord, _choice: &Choice) {}

    /// Called once when the controller reaches its terminal state.
    fn on_stop(&mut self, _cycles: u32) {}
}

/// A [`CycleObserver`] that does nothing.
pub struct NoopObserver;

impl CycleObserver for NoopObserver {}
