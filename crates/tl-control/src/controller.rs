//! The `CycleController` and its phase state machine.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tl_core::{Clock, CycleConfig, IntersectionId, LightState, PhaseTimings, Sleep};
use tl_scan::{CollectionReport, ScanPool, ScanSettings};
use tracing::{debug, info, warn};

use crate::{
    decide_next_after, Choice, ControlError, ControlResult, CycleObserver, Decision, HistoryLog,
    Registry, StateRecord,
};

// ── Phase ─────────────────────────────────────────────────────────────────────

/// States of the cycle state machine.
///
/// ```text
/// Green ──► Yellow ──► Transition ──► Green … ──► Stop
///   └─ cycle_count == max_cycles ───────────────────┘
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    Green,
    Yellow,
    Transition,
    Stop,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Green      => "green",
            Phase::Yellow     => "yellow",
            Phase::Transition => "transition",
            Phase::Stop       => "stop",
        })
    }
}

// ── RunSummary ────────────────────────────────────────────────────────────────

/// Totals for a finished run.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct RunSummary {
    pub cycles:               u32,
    pub records:              usize,
    pub degraded_collections: u32,
    pub guard_overrides:      u32,
    /// Simulated time the clock reports at the end of the run.
    pub simulated:            Duration,
}

// ── CycleController ───────────────────────────────────────────────────────────

/// Drives the green → yellow → transition cycle for the registered
/// intersections.
///
/// Phases run strictly one after another on the calling thread.  The only
/// parallelism is inside the collection at the end of each green phase, and
/// the controller blocks until that collection has drained.
///
/// Create via [`ControllerBuilder`][crate::ControllerBuilder].
pub struct CycleController {
    config:   CycleConfig,
    registry: Registry,
    history:  HistoryLog,
    clock:    Arc<dyn Clock>,

    cycle_count: u32,
    phase:       Phase,
    /// Intersection on green this cycle; `None` is an all-red rest cycle.
    green:       Option<IntersectionId>,
    /// Green intersection decided for the next cycle.  `None` keeps the
    /// current one.
    next_green:  Option<Option<IntersectionId>>,
    /// Green hold of cycle 1.  Not part of the history, but the starvation
    /// guard counts it.
    opening:     Option<StateRecord>,

    degraded_collections: u32,
    guard_overrides:      u32,
}

impl CycleController {
    pub(crate) fn new(config: CycleConfig, registry: Registry, clock: Arc<dyn Clock>) -> Self {
        let mut controller = Self {
            config,
            registry,
            history: HistoryLog::new(),
            clock,
            cycle_count: 0,
            phase: Phase::Stop,
            green: None,
            next_green: None,
            opening: None,
            degraded_collections: 0,
            guard_overrides: 0,
        };
        let settings = ScanSettings::from(&controller.config);
        controller.push_scan_settings(settings);
        controller
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Intersection currently holding green, if any.
    pub fn green(&self) -> Option<IntersectionId> {
        self.green
    }

    /// Phase lengths the next cycle will use.
    pub fn timings(&self) -> PhaseTimings {
        self.config.timings()
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == Phase::Stop
    }

    // ── Entry points ──────────────────────────────────────────────────────

    /// Set the scan parameters for every scanner.
    ///
    /// May be called before a run or between cycles; the new values take
    /// effect on the next computed cycle.  Repeating a call with the same
    /// values changes nothing.
    pub fn configure(&mut self, scan_count: u32, scan_length_secs: u32) {
        self.config.scan_count = scan_count;
        self.config.scan_length_secs = scan_length_secs;
        self.push_scan_settings(ScanSettings::new(scan_count, scan_length_secs));
        info!(
            scan_count,
            scan_length_secs,
            timings = %self.config.timings(),
            "scan parameters configured"
        );
    }

    /// Run a full sequence of `max_cycles` cycles starting from `initial`.
    ///
    /// `initial` applies to the first registered intersection; the second
    /// starts in the opposite state.  Each call starts a fresh history.
    pub fn run<O: CycleObserver>(
        &mut self,
        initial:    LightState,
        max_cycles: u32,
        observer:   &mut O,
    ) -> ControlResult<RunSummary> {
        self.begin(initial, max_cycles)?;
        self.run_cycles(u32::MAX, observer)?;
        Ok(self.summary())
    }

    /// Reset the state machine for a new run without executing any cycle.
    pub fn begin(&mut self, initial: LightState, max_cycles: u32) -> ControlResult<()> {
        let first = self
            .registry
            .first()
            .map(|ix| ix.id())
            .ok_or(ControlError::NoOperativeIntersection {
                excluded: self.registry.excluded().len(),
            })?;

        self.green = match initial {
            LightState::Green  => Some(first),
            LightState::Red    => self.registry.other(first),
            LightState::Yellow => return Err(ControlError::InvalidInitialState(initial)),
        };
        self.config.max_cycles = max_cycles;
        self.history = HistoryLog::new();
        self.cycle_count = 0;
        self.next_green = None;
        self.opening = self.green.map(|id| StateRecord {
            intersection: id,
            state:        LightState::Green,
            sequence:     0,
        });
        self.degraded_collections = 0;
        self.guard_overrides = 0;
        self.phase = Phase::Green;

        info!(
            max_cycles,
            initial = %initial,
            intersections = self.registry.len(),
            "control run starting"
        );
        Ok(())
    }

    /// Advance the state machine by at most `n` whole cycles.
    ///
    /// Returns the number of cycles executed.  Stops early when the cycle
    /// limit is reached; once stopped, further calls do nothing.
    pub fn run_cycles<O: CycleObserver>(&mut self, n: u32, observer: &mut O) -> ControlResult<u32> {
        let mut executed = 0;
        loop {
            match self.phase {
                Phase::Green => {
                    if self.cycle_count >= self.config.max_cycles {
                        self.phase = Phase::Stop;
                        info!(cycles = self.cycle_count, "cycle limit reached; controller stopped");
                        observer.on_stop(self.cycle_count);
                        break;
                    }
                    if executed == n {
                        break;
                    }
                    executed += 1;
                    self.green_phase(observer)?;
                }
                Phase::Yellow     => self.yellow_phase(observer),
                Phase::Transition => self.transition(observer),
                Phase::Stop       => break,
            }
        }
        Ok(executed)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            cycles:               self.cycle_count,
            records:              self.history.len(),
            degraded_collections: self.degraded_collections,
            guard_overrides:      self.guard_overrides,
            simulated:            self.clock.elapsed(),
        }
    }

    // ── Phases ────────────────────────────────────────────────────────────

    fn green_phase<O: CycleObserver>(&mut self, observer: &mut O) -> ControlResult<()> {
        self.cycle_count += 1;
        let cycle = self.cycle_count;
        let timings = self.config.timings();
        info!(cycle, %timings, green = ?self.green, "cycle started");
        observer.on_cycle_start(cycle, &timings);

        self.apply_lights(LightState::Green);
        observer.on_phase(cycle, Phase::Green, self.green);
        self.pause(cycle, Phase::Green, timings.green());

        // ── Collection (blocks until drained) ─────────────────────────────
        let report = self.collect()?;
        if report.degraded {
            self.degraded_collections += 1;
        }
        observer.on_collection(cycle, &report);

        // ── Decision ──────────────────────────────────────────────────────
        let counts = self.registry.totals();
        match decide_next_after(&counts, &self.recent_holds()) {
            Decision::NoChange => {
                warn!(cycle, "no traffic data to compare; lights unchanged next cycle");
                self.next_green = None;
            }
            Decision::Next(choice) => self.commit(cycle, choice, observer),
        }

        self.phase = Phase::Yellow;
        Ok(())
    }

    fn yellow_phase<O: CycleObserver>(&mut self, observer: &mut O) {
        let cycle = self.cycle_count;
        self.apply_lights(LightState::Yellow);
        observer.on_phase(cycle, Phase::Yellow, self.green);
        self.pause(cycle, Phase::Yellow, self.config.timings().yellow());
        self.phase = Phase::Transition;
    }

    fn transition<O: CycleObserver>(&mut self, observer: &mut O) {
        let cycle = self.cycle_count;
        if let Some(next) = self.next_green.take() {
            self.green = next;
        }
        self.apply_lights(LightState::Green);
        observer.on_phase(cycle, Phase::Transition, self.green);
        debug!(cycle, green = ?self.green, "transition applied");
        self.phase = Phase::Green;
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn commit<O: CycleObserver>(&mut self, cycle: u32, choice: Choice, observer: &mut O) {
        if choice.guard_applied {
            self.guard_overrides += 1;
            warn!(
                cycle,
                next = %choice.intersection,
                label = %choice.label,
                "density winner already held green twice; starvation guard overrides"
            );
        }

        let record = StateRecord {
            intersection: choice.intersection,
            state:        choice.label,
            sequence:     cycle as u64,
        };
        self.history.append(record);
        observer.on_record(&record, &choice);

        self.next_green = Some(match choice.label {
            LightState::Green => Some(choice.intersection),
            _                 => self.registry.other(choice.intersection),
        });
        info!(cycle, %record, "next state decided");
    }

    /// Most recent green holds, oldest first: the opening hold followed by
    /// the last two records.
    fn recent_holds(&self) -> Vec<StateRecord> {
        self.opening
            .iter()
            .chain(self.history.last_two())
            .copied()
            .collect()
    }

    fn collect(&mut self) -> ControlResult<CollectionReport> {
        let drain_timeout = self
            .clock
            .wall_time(self.config.scan_duration())
            .saturating_add(Duration::from_secs(self.config.drain_grace_secs));
        let pool = ScanPool::for_scanners(self.registry.scanner_count())?;
        let report = pool.collect(self.registry.scanners_mut(), Arc::clone(&self.clock), drain_timeout);

        for reading in &report.readings {
            debug!(
                scanner = %reading.scanner,
                intersection = %reading.intersection,
                counts = %reading.counts,
                total = reading.total(),
                anomaly = %reading.anomaly,
                "scanner reading"
            );
        }
        Ok(report)
    }

    /// Put the green intersection in `green_state` and every other one on red.
    fn apply_lights(&mut self, green_state: LightState) {
        let green = self.green;
        for ix in self.registry.iter_mut() {
            let state = if Some(ix.id()) == green { green_state } else { LightState::Red };
            ix.set_state(state);
        }
    }

    fn pause(&self, cycle: u32, phase: Phase, duration: Duration) {
        if self.clock.sleep(duration) == Sleep::Interrupted {
            warn!(cycle, %phase, "phase sleep interrupted; treating phase as elapsed");
        }
    }

    fn push_scan_settings(&mut self, settings: ScanSettings) {
        for ix in self.registry.iter_mut() {
            ix.configure_scanners(settings);
            for scanner in ix.scanners() {
                debug!(scanner = %scanner.id(), intersection = %ix.id(), "scanner configured");
            }
        }
    }
}
