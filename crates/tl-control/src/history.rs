//! Append-only record of the per-cycle decisions.

use std::fmt;

use tl_core::{IntersectionId, LightState};

/// One decision: `intersection` shows `state` in the cycle after `sequence`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct StateRecord {
    pub intersection: IntersectionId,
    pub state:        LightState,
    /// The cycle (1-based) whose collection produced this record.
    pub sequence:     u64,
}

impl fmt::Display for StateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.sequence, self.intersection, self.state)
    }
}

/// Cycle-ordered, append-only sequence of [`StateRecord`]s.
///
/// Records are never mutated or removed.  The density comparator only ever
/// reads the two most recent entries.
#[derive(Clone, Debug, Default)]
pub struct HistoryLog {
    records: Vec<StateRecord>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn append(&mut self, record: StateRecord) {
        self.records.push(record);
    }

    /// The two most recent records, oldest first; fewer if not yet available.
    #[inline]
    pub fn last_two(&self) -> &[StateRecord] {
        let start = self.records.len().saturating_sub(2);
        &self.records[start..]
    }

    pub fn last(&self) -> Option<&StateRecord> {
        self.records.last()
    }

    pub fn records(&self) -> &[StateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
