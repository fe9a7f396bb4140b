//! Fluent builder for constructing a [`CycleController`].

use std::sync::Arc;

use tl_core::{Clock, CycleConfig, IdAllocator, RealClock};
use tracing::{info, warn};

use crate::{
    ControlError, ControlResult, CycleController, Intersection, IntersectionSpec, Registry,
    SetupOutcome,
};

/// Most intersections one controller can pair.
pub const MAX_INTERSECTIONS: usize = 2;

/// Fluent builder for [`CycleController`].
///
/// # Required inputs
///
/// - [`CycleConfig`] — scan parameters, cycle limit, seed, drain grace
/// - at least one operative [`IntersectionSpec`]
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default                     |
/// |---------------|-----------------------------|
/// | `.clock(c)`   | `RealClock::new()`          |
///
/// # Example
///
/// ```rust,ignore
/// let ids = IdAllocator::default();
/// let mut controller = ControllerBuilder::new(CycleConfig::default())
///     .paired()
///     .clock(Arc::new(VirtualClock::new()))
///     .build_with(&ids)?;
/// controller.run(LightState::Green, 3, &mut NoopObserver)?;
/// ```
pub struct ControllerBuilder {
    config: CycleConfig,
    specs:  Vec<IntersectionSpec>,
    clock:  Option<Arc<dyn Clock>>,
}

impl ControllerBuilder {
    pub fn new(config: CycleConfig) -> Self {
        Self {
            config,
            specs: Vec::new(),
            clock: None,
        }
    }

    /// Add one intersection.  Registration order decides id order.
    pub fn intersection(mut self, spec: IntersectionSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Add the standard pair of operative intersections.
    pub fn paired(self) -> Self {
        self.intersection(IntersectionSpec::new("north-south"))
            .intersection(IntersectionSpec::new("east-west"))
    }

    /// Supply the clock used for every phase and sub-scan delay.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build with a fresh [`IdAllocator`].
    pub fn build(self) -> ControlResult<CycleController> {
        self.build_with(&IdAllocator::default())
    }

    /// Bring up every intersection using ids from `ids` and return a
    /// controller over the operative ones.
    ///
    /// Skipped and failed intersections are logged and kept in
    /// [`Registry::excluded`]; only a registry with no operative
    /// intersection is an error.
    pub fn build_with(self, ids: &IdAllocator) -> ControlResult<CycleController> {
        if self.specs.len() > MAX_INTERSECTIONS {
            return Err(ControlError::Config(format!(
                "{} intersections requested; at most {MAX_INTERSECTIONS} can be paired",
                self.specs.len()
            )));
        }

        let outcomes: Vec<SetupOutcome> = self
            .specs
            .iter()
            .map(|spec| {
                let outcome = Intersection::setup(spec, ids, self.config.seed);
                report_setup(spec, &outcome);
                outcome
            })
            .collect();

        let registry = Registry::from_outcomes(outcomes);
        if registry.is_empty() {
            return Err(ControlError::NoOperativeIntersection {
                excluded: registry.excluded().len(),
            });
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(RealClock::new()));
        Ok(CycleController::new(self.config, registry, clock))
    }
}

fn report_setup(spec: &IntersectionSpec, outcome: &SetupOutcome) {
    match outcome {
        SetupOutcome::Ready(ix) => {
            let lights: Vec<_> = ix.lights().iter().map(|l| l.id.0).collect();
            let scanners: Vec<_> = ix.scanners().iter().map(|s| s.id().0).collect();
            info!(
                intersection = %ix.id(),
                label = %spec.label,
                ?lights,
                ?scanners,
                "intersection up and running"
            );
        }
        SetupOutcome::Skipped { id, label } => {
            warn!(intersection = %id, %label, "intersection not operative; skipped");
        }
        SetupOutcome::Failed { id, label, error } => {
            warn!(intersection = %id, %label, %error, "intersection setup failed; excluded from run");
        }
    }
}
