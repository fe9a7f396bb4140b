use thiserror::Error;
use tl_core::{IntersectionId, LightId, LightState};
use tl_scan::ScanError;

/// Why an intersection could not be brought up.  Fatal to that
/// intersection only; the run continues without it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("light {light} of {intersection} is offline")]
    LightOffline {
        intersection: IntersectionId,
        light:        LightId,
    },
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("controller configuration error: {0}")]
    Config(String),

    #[error("no operative intersection available ({excluded} excluded at setup)")]
    NoOperativeIntersection { excluded: usize },

    #[error("a run must start green or red, not {0}")]
    InvalidInitialState(LightState),

    #[error("scan collection failed: {0}")]
    Scan(#[from] ScanError),
}

pub type ControlResult<T> = Result<T, ControlError>;
