//! End-to-end check that the configured calendar accepts writes.
//!
//! A one-minute throwaway event is created an hour from now and removed again
//! straight away.

use chrono::{Duration, NaiveDateTime};

use crate::error::ShiftSyncResult;
use crate::shift::{ScheduledShift, ShiftCategory};
use crate::source::{CalendarSink, DeleteOutcome};

pub const CHECK_EVENT_TITLE: &str = "[shiftsync check, safe to delete]";

#[derive(Debug, Clone)]
pub struct CalendarCheck {
    pub shift: ScheduledShift,
    pub event_id: String,
    pub cleanup: DeleteOutcome,
}

impl CalendarCheck {
    /// The event was created and is gone again.
    pub fn passed(&self) -> bool {
        matches!(
            self.cleanup,
            DeleteOutcome::Deleted | DeleteOutcome::AlreadyAbsent
        )
    }
}

/// The throwaway shift written by [`check_calendar`].
pub fn check_shift(now_local: NaiveDateTime) -> ShiftSyncResult<ScheduledShift> {
    let start = now_local + Duration::hours(1);
    ScheduledShift::personal(
        start.date(),
        start,
        start + Duration::minutes(1),
        CHECK_EVENT_TITLE,
    )
}

/// Create a throwaway event, then delete it.
///
/// A failed create is returned as an error. A failed delete is reported in
/// [`CalendarCheck::cleanup`] so the caller can show the event id to remove by
/// hand.
pub async fn check_calendar<C: CalendarSink>(
    calendar: &C,
    now_local: NaiveDateTime,
) -> ShiftSyncResult<CalendarCheck> {
    let shift = check_shift(now_local)?;

    let event_id = calendar
        .create(&shift, ShiftCategory::Scheduled, None)
        .await?;
    tracing::info!(%event_id, "created check event");

    let cleanup = calendar.delete(&event_id).await;
    tracing::info!(%event_id, ?cleanup, "removed check event");

    Ok(CalendarCheck {
        shift,
        event_id,
        cleanup,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::ShiftSyncError;

    struct RecordingCalendar {
        create_error: Option<&'static str>,
        delete_outcome: DeleteOutcome,
        calls: RefCell<Vec<String>>,
    }

    impl RecordingCalendar {
        fn deleting(delete_outcome: DeleteOutcome) -> Self {
            RecordingCalendar {
                create_error: None,
                delete_outcome,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CalendarSink for RecordingCalendar {
        async fn create(
            &self,
            shift: &ScheduledShift,
            _category: ShiftCategory,
            _color: Option<&str>,
        ) -> ShiftSyncResult<String> {
            if let Some(reason) = self.create_error {
                return Err(ShiftSyncError::Provider(reason.into()));
            }
            self.calls.borrow_mut().push(format!("create {}", shift.assignment));
            Ok("evt-check".into())
        }

        async fn delete(&self, event_id: &str) -> DeleteOutcome {
            self.calls.borrow_mut().push(format!("delete {event_id}"));
            self.delete_outcome.clone()
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-03-01 23:30", "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn check_shift_is_a_minute_an_hour_ahead() {
        let shift = check_shift(now()).unwrap();

        assert_eq!(shift.span.start_time(), now() + Duration::hours(1));
        assert_eq!(shift.span.duration(), Duration::minutes(1));
        // Crossing midnight moves the shift to the next day.
        assert_eq!(shift.span.date(), now().date().succ_opt().unwrap());
    }

    #[tokio::test]
    async fn creates_then_deletes() {
        let calendar = RecordingCalendar::deleting(DeleteOutcome::Deleted);

        let check = check_calendar(&calendar, now()).await.unwrap();

        assert!(check.passed());
        assert_eq!(check.event_id, "evt-check");
        assert_eq!(
            *calendar.calls.borrow(),
            vec![
                format!("create {CHECK_EVENT_TITLE}"),
                "delete evt-check".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn already_absent_counts_as_passed() {
        let calendar = RecordingCalendar::deleting(DeleteOutcome::AlreadyAbsent);

        assert!(check_calendar(&calendar, now()).await.unwrap().passed());
    }

    #[tokio::test]
    async fn failed_delete_fails_the_check() {
        let calendar = RecordingCalendar::deleting(DeleteOutcome::Failed("403".into()));

        let check = check_calendar(&calendar, now()).await.unwrap();

        assert!(!check.passed());
        assert_eq!(check.event_id, "evt-check");
    }

    #[tokio::test]
    async fn failed_create_is_an_error_and_skips_delete() {
        let calendar = RecordingCalendar {
            create_error: Some("insufficient permissions"),
            ..RecordingCalendar::deleting(DeleteOutcome::Deleted)
        };

        let result = check_calendar(&calendar, now()).await;

        assert!(matches!(result, Err(ShiftSyncError::Provider(_))));
        assert!(calendar.calls.borrow().is_empty());
    }
}
