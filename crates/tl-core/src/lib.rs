//! `tl-core` — foundational types for the paired traffic-light controller.
//!
//! This crate is a dependency of every other `tl-*` crate.  It has no `tl-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|------------------------------------------------------------|
//! | [`ids`]     | `IntersectionId`, `LightId`, `ScannerId`, `IdAllocator`    |
//! | [`state`]   | `LightState`                                               |
//! | [`time`]    | `CycleConfig`, `PhaseTimings`                              |
//! | [`clock`]   | `Clock` trait, `RealClock`, `VirtualClock`                 |
//! | [`rng`]     | `ScannerRng` (per-scanner, deterministic)                  |
//! | [`error`]   | `TlError`, `TlResult`                                      |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to config, ids and states.  |

pub mod clock;
pub mod error;
pub mod ids;
pub mod rng;
pub mod state;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use clock::{Clock, RealClock, Sleep, VirtualClock};
pub use error::{TlError, TlResult};
pub use ids::{IdAllocator, IntersectionId, LightId, ScannerId};
pub use rng::ScannerRng;
pub use state::LightState;
pub use time::{CycleConfig, PhaseTimings};
