//! `tl-control` — cycle state machine for two paired intersections.
//!
//! # One cycle
//!
//! ```text
//! while cycle_count < max_cycles:
//!   ① Green      — chosen intersection green, the other red;
//!                  sleep(green), then collect from every scanner
//!                  (blocks on the ScanPool drain barrier)
//!   ② Decide     — highest density wins; the starvation guard overrides
//!                  a third straight green hold (the opening green counts);
//!                  the decision is appended to the HistoryLog
//!   ③ Yellow     — green intersection yellow, the other red; sleep(yellow)
//!   ④ Transition — apply the decided green
//! Stop
//! ```
//!
//! Phase lengths come from [`tl_core::PhaseTimings`] and are recomputed at the
//! start of every cycle, so `configure` between cycles takes effect on the
//! next one.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tl_control::{ControllerBuilder, NoopObserver};
//! use tl_core::{CycleConfig, LightState, VirtualClock};
//!
//! let mut controller = ControllerBuilder::new(CycleConfig::default())
//!     .paired()
//!     .clock(Arc::new(VirtualClock::new()))
//!     .build()?;
//! let summary = controller.run(LightState::Green, 3, &mut NoopObserver)?;
//! assert_eq!(summary.records, 3);
//! ```

pub mod builder;
pub mod controller;
pub mod density;
pub mod error;
pub mod history;
pub mod intersection;
pub mod observer;
pub mod registry;


pub use builder::ControllerBuilder;
pub use controller::{CycleController, Phase, RunSummary};
pub use density::{decide_next, decide_next_after, Choice, Decision};
pub use error::{ControlError, ControlResult, SetupError};
pub use history::{HistoryLog, StateRecord};
pub use intersection::{Intersection, IntersectionSpec, SetupOutcome, TrafficLight};
pub use observer::{CycleObserver, NoopObserver};
pub use registry::Registry;
