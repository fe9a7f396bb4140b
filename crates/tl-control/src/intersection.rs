//! Intersections, their lights, and the typed setup result.

use tl_core::{IdAllocator, IntersectionId, LightId, LightState};
use tl_scan::{ScanSettings, Scanner};

use crate::SetupError;

// ── TrafficLight ──────────────────────────────────────────────────────────────

/// One light of an intersection.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct TrafficLight {
    pub id:    LightId,
    pub state: LightState,
}

// ── IntersectionSpec ──────────────────────────────────────────────────────────

/// Description of an intersection to bring up at setup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntersectionSpec {
    /// Human-readable name used in logs.
    pub label:         String,
    /// A non-operative intersection is skipped without touching its lights.
    pub operative:     bool,
    /// Whether light A and light B respond during setup.
    pub lights_online: [bool; 2],
}

impl IntersectionSpec {
    /// An operative intersection whose lights are both online.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label:         label.into(),
            operative:     true,
            lights_online: [true, true],
        }
    }

    pub fn not_operative(mut self) -> Self {
        self.operative = false;
        self
    }

    /// Mark light `index` (0 = A, 1 = B) as offline.
    pub fn light_offline(mut self, index: usize) -> Self {
        if let Some(slot) = self.lights_online.get_mut(index) {
            *slot = false;
        }
        self
    }
}

// ── SetupOutcome ──────────────────────────────────────────────────────────────

/// Result of bringing up one intersection.
#[derive(Debug)]
pub enum SetupOutcome {
    Ready(Intersection),
    /// The intersection reported itself non-operative.
    Skipped { id: IntersectionId, label: String },
    /// A component failed; the intersection is excluded from the run.
    Failed { id: IntersectionId, label: String, error: SetupError },
}

impl SetupOutcome {
    pub fn id(&self) -> IntersectionId {
        match self {
            SetupOutcome::Ready(ix)              => ix.id(),
            SetupOutcome::Skipped { id, .. }     => *id,
            SetupOutcome::Failed { id, .. }      => *id,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SetupOutcome::Ready(_))
    }
}

// ── Intersection ──────────────────────────────────────────────────────────────

/// A pair of lights, a scanner per light, and the intersection's state.
///
/// Both lights always show the intersection's state.
#[derive(Debug)]
pub struct Intersection {
    id:       IntersectionId,
    label:    String,
    lights:   [TrafficLight; 2],
    scanners: [Scanner; 2],
    state:    LightState,
}

impl Intersection {
    /// Allocate ids for the intersection and its components and bring it up.
    ///
    /// The intersection id is allocated even when setup does not succeed, so
    /// skipped and failed intersections can be reported by id.
    pub fn setup(spec: &IntersectionSpec, ids: &IdAllocator, seed: u64) -> SetupOutcome {
        let id = ids.next_intersection();
        if !spec.operative {
            return SetupOutcome::Skipped { id, label: spec.label.clone() };
        }

        let light_ids = [ids.next_light(), ids.next_light()];
        if let Some(i) = spec.lights_online.iter().position(|online| !online) {
            return SetupOutcome::Failed {
                id,
                label: spec.label.clone(),
                error: SetupError::LightOffline { intersection: id, light: light_ids[i] },
            };
        }

        let lights = light_ids.map(|light| TrafficLight { id: light, state: LightState::Red });
        let scanners = light_ids.map(|light| Scanner::new(ids.next_scanner(), id, light, seed));

        SetupOutcome::Ready(Intersection {
            id,
            label: spec.label.clone(),
            lights,
            scanners,
            state: LightState::Red,
        })
    }

    pub fn id(&self) -> IntersectionId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> LightState {
        self.state
    }

    pub fn lights(&self) -> &[TrafficLight; 2] {
        &self.lights
    }

    pub fn scanners(&self) -> &[Scanner; 2] {
        &self.scanners
    }

    pub fn scanners_mut(&mut self) -> &mut [Scanner; 2] {
        &mut self.scanners
    }

    /// Set the intersection and both of its lights to `state`.
    pub fn set_state(&mut self, state: LightState) {
        self.state = state;
        for light in &mut self.lights {
            light.state = state;
        }
    }

    /// Push new sub-scan parameters into both scanners.
    pub fn configure_scanners(&mut self, settings: ScanSettings) {
        for scanner in &mut self.scanners {
            scanner.configure(settings);
        }
    }

    /// Vehicles counted by both scanners in the last collection.
    pub fn total_vehicles(&self) -> u64 {
        self.scanners.iter().map(Scanner::total_vehicles).sum()
    }
}
