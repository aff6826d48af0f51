//! Persisted reconciliation state: which shifts are believed to be on the calendar.

mod store;

pub use store::{JsonStateStore, StateLoad, StateStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shift::{ScheduledShift, ShiftCategory, ShiftKey};

/// A shift that has been created on the external calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    #[serde(flatten)]
    pub shift: ScheduledShift,
    /// Opaque reference returned by the calendar when the event was created.
    #[serde(alias = "google_event_id")]
    pub event_id: String,
}

impl SnapshotRecord {
    pub fn new(shift: ScheduledShift, event_id: String) -> Self {
        SnapshotRecord { shift, event_id }
    }

    pub fn key(&self) -> ShiftKey {
        self.shift.key()
    }
}

/// The only persisted entity: one record list per category plus the last run time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationState {
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default, alias = "synced_shifts")]
    pub open_shifts: Vec<SnapshotRecord>,
    #[serde(default)]
    pub picked_shifts: Vec<SnapshotRecord>,
    #[serde(default)]
    pub scheduled_shifts: Vec<SnapshotRecord>,
}

impl ReconciliationState {
    pub fn records(&self, category: ShiftCategory) -> &[SnapshotRecord] {
        match category {
            ShiftCategory::Open => &self.open_shifts,
            ShiftCategory::Picked => &self.picked_shifts,
            ShiftCategory::Scheduled => &self.scheduled_shifts,
        }
    }

    pub fn records_mut(&mut self, category: ShiftCategory) -> &mut Vec<SnapshotRecord> {
        match category {
            ShiftCategory::Open => &mut self.open_shifts,
            ShiftCategory::Picked => &mut self.picked_shifts,
            ShiftCategory::Scheduled => &mut self.scheduled_shifts,
        }
    }

    pub fn len(&self) -> usize {
        self.open_shifts.len() + self.picked_shifts.len() + self.scheduled_shifts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_open_shift_field() {
        let json = r#"{
            "last_run": "2026-02-20T12:00:00+00:00",
            "synced_shifts": [{
                "date": "2026-03-01",
                "start_time": "2026-03-01T08:00:00",
                "end_time": "2026-03-01T16:00:00",
                "assignment": "R24",
                "label": "OPEN 1",
                "google_event_id": "abc123"
            }]
        }"#;

        let state: ReconciliationState = serde_json::from_str(json).unwrap();

        assert_eq!(state.open_shifts.len(), 1);
        assert_eq!(state.open_shifts[0].event_id, "abc123");
        assert_eq!(state.open_shifts[0].shift.label.as_deref(), Some("OPEN 1"));
        assert!(state.picked_shifts.is_empty());
        assert!(state.last_run.is_some());
    }

    #[test]
    fn empty_object_is_empty_state() {
        let state: ReconciliationState = serde_json::from_str("{}").unwrap();
        assert!(state.is_empty());
        assert!(state.last_run.is_none());
    }

    #[test]
    fn records_by_category() {
        let mut state = ReconciliationState::default();
        let shift = ScheduledShift::new(
            crate::time_span::TimeSpan::all_day(chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            "Admin",
            None,
        );
        state
            .records_mut(ShiftCategory::Scheduled)
            .push(SnapshotRecord::new(shift, "evt".into()));

        assert_eq!(state.records(ShiftCategory::Scheduled).len(), 1);
        assert!(state.records(ShiftCategory::Open).is_empty());
        assert_eq!(state.len(), 1);
    }
}
