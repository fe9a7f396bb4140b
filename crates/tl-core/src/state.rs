//! Light states shared by lights, intersections and history records.

use std::fmt;
use std::str::FromStr;

use crate::TlError;

/// Colour shown by a light (and, by extension, by a whole intersection).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LightState {
    Green,
    Yellow,
    Red,
}

impl LightState {
    /// Lower-case label used in history records and reports.
    pub fn label(self) -> &'static str {
        match self {
            LightState::Green  => "green",
            LightState::Yellow => "yellow",
            LightState::Red    => "red",
        }
    }

    /// The state the paired intersection shows while this one holds `self`
    /// at a committed phase boundary.  Yellow pairs with red.
    pub fn opposite(self) -> LightState {
        match self {
            LightState::Green | LightState::Yellow => LightState::Red,
            LightState::Red                        => LightState::Green,
        }
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LightState {
    type Err = TlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green"  => Ok(LightState::Green),
            "yellow" => Ok(LightState::Yellow),
            "red"    => Ok(LightState::Red),
            _        => Err(TlError::UnknownState(s.to_owned())),
        }
    }
}
