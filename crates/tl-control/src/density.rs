//! Density comparison and the starvation guard.
//!
//! # Rule
//!
//! ```text
//! counts empty                         → NoChange
//! winner = strictly highest total      (tie → lowest id, i.e. first registered)
//! last two holds = {winner, green}×2   → starvation guard:
//!     another intersection exists      → it goes green instead
//!     winner is alone                  → winner rests red for a cycle
//! otherwise                            → winner goes green
//! ```
//!
//! The tie-break is a fixed policy, not a fairness measure.

use std::collections::BTreeMap;

use tl_core::{IntersectionId, LightState};

use crate::{HistoryLog, StateRecord};

/// Which intersection shows which state in the next cycle.
///
/// Any intersection other than `intersection` shows the opposite state.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Choice {
    pub intersection:  IntersectionId,
    pub label:         LightState,
    /// `true` when the starvation guard overrode the density winner.
    pub guard_applied: bool,
}

/// Outcome of [`decide_next`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Decision {
    /// No count data: keep the current lights for the next cycle.
    NoChange,
    Next(Choice),
}

impl Decision {
    pub fn choice(&self) -> Option<&Choice> {
        match self {
            Decision::NoChange  => None,
            Decision::Next(c)   => Some(c),
        }
    }
}

/// Pick the next green intersection from aggregate counts and the history.
pub fn decide_next(counts: &BTreeMap<IntersectionId, u64>, history: &HistoryLog) -> Decision {
    decide_next_after(counts, history.last_two())
}

/// [`decide_next`] against an explicit list of recent green holds, oldest
/// first.  Only the last two entries are consulted.
///
/// The controller uses this to count the opening green of a run, which is
/// held but never recorded.
pub fn decide_next_after(counts: &BTreeMap<IntersectionId, u64>, recent: &[StateRecord]) -> Decision {
    let mut entries = counts.iter();
    let Some((&first, &first_total)) = entries.next() else {
        return Decision::NoChange;
    };

    let (winner, _) = entries.fold((first, first_total), |best, (&id, &total)| {
        if total > best.1 { (id, total) } else { best }
    });

    if !would_starve(winner, recent) {
        return Decision::Next(Choice {
            intersection:  winner,
            label:         LightState::Green,
            guard_applied: false,
        });
    }

    let choice = match counts.keys().copied().find(|&id| id != winner) {
        Some(other) => Choice {
            intersection:  other,
            label:         LightState::Green,
            guard_applied: true,
        },
        None => Choice {
            intersection:  winner,
            label:         LightState::Red,
            guard_applied: true,
        },
    };
    Decision::Next(choice)
}

/// `true` when the two most recent holds both put `candidate` on green.
fn would_starve(candidate: IntersectionId, recent: &[StateRecord]) -> bool {
    let recent = &recent[recent.len().saturating_sub(2)..];
    recent.len() == 2
        && recent
            .iter()
            .all(|r| r.state == LightState::Green && r.intersection == candidate)
}
