//! The collaborators a reconciliation run reads from and writes to.
//!
//! Runs are sequential, so implementations only need to be usable from a
//! single task.

#![allow(async_fn_in_trait)]

use chrono_tz::Tz;

use crate::error::ShiftSyncResult;
use crate::shift::{ScheduledShift, ScrapedShifts, ShiftCategory};

/// The tracked person's own schedule.
pub trait PersonalScheduleSource {
    /// Shifts from today through `lookahead_days` ahead, in `zone` wall-clock time.
    async fn fetch(&self, lookahead_days: u32, zone: Tz) -> ShiftSyncResult<Vec<ScheduledShift>>;
}

/// Open and picked-up shifts from the scheduling site.
pub trait OpenShiftSource {
    async fn fetch(&self) -> ShiftSyncResult<ScrapedShifts>;
}

/// Result of removing an event from the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The event was already gone; treated like a successful delete.
    AlreadyAbsent,
    Failed(String),
}

/// The external calendar managed events are written to.
pub trait CalendarSink {
    /// Create an event for `shift` and return the calendar's reference for it.
    async fn create(
        &self,
        shift: &ScheduledShift,
        category: ShiftCategory,
        color: Option<&str>,
    ) -> ShiftSyncResult<String>;

    async fn delete(&self, event_id: &str) -> DeleteOutcome;
}
