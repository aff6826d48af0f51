//! Shift set diff computation.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::shift::{ScheduledShift, ShiftKey};
use crate::state::SnapshotRecord;

/// What has to change on the calendar for one category.
///
/// Identity is the full [`ShiftKey`]: a shift whose start time moved shows up
/// as one removal plus one addition, never as an update. All three lists are
/// in key order, whatever the order of the inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftDiff {
    pub to_add: Vec<ScheduledShift>,
    pub to_remove: Vec<SnapshotRecord>,
    pub unchanged: Vec<SnapshotRecord>,
}

impl ShiftDiff {
    pub fn compute(current: &[ScheduledShift], previous: &[SnapshotRecord]) -> Self {
        let current_by_key: BTreeMap<ShiftKey, &ScheduledShift> =
            current.iter().map(|s| (s.key(), s)).collect();

        let previous_by_key: BTreeMap<ShiftKey, &SnapshotRecord> =
            previous.iter().map(|r| (r.key(), r)).collect();

        let to_add = current_by_key
            .iter()
            .filter(|(key, _)| !previous_by_key.contains_key(key))
            .map(|(_, shift)| (*shift).clone())
            .collect();

        let (unchanged, to_remove): (Vec<SnapshotRecord>, Vec<SnapshotRecord>) = previous_by_key
            .into_values()
            .cloned()
            .partition(|record| current_by_key.contains_key(&record.key()));

        ShiftDiff {
            to_add,
            to_remove,
            unchanged,
        }
    }

    /// Keep every pending removal whose shift has already started.
    ///
    /// Started and finished shifts stay on the calendar; only future shifts
    /// that vanished from the source are removed. Returns the rescued records.
    pub fn rescue_started(&mut self, now: NaiveDateTime) -> Vec<SnapshotRecord> {
        let (rescued, remaining): (Vec<_>, Vec<_>) = std::mem::take(&mut self.to_remove)
            .into_iter()
            .partition(|record| record.shift.span.has_started(now));

        self.to_remove = remaining;
        if !rescued.is_empty() {
            self.unchanged.extend(rescued.iter().cloned());
            self.unchanged.sort_by_key(|record| record.key());
        }

        rescued
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}
