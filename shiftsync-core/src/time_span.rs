//! Wall-clock time spans for shifts.
//!
//! All spans of a run live in one configured zone and carry naive local
//! times. Intervals are half-open: a shift ending at 09:00 and another
//! starting at 09:00 do not overlap.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{ShiftSyncError, ShiftSyncResult};

/// The date a shift belongs to plus its start and end instants.
///
/// `end_time` may fall on the following day for overnight shifts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSpan")]
pub struct TimeSpan {
    date: NaiveDate,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawTimeSpan {
    date: NaiveDate,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
}

impl TryFrom<RawTimeSpan> for TimeSpan {
    type Error = ShiftSyncError;

    fn try_from(raw: RawTimeSpan) -> ShiftSyncResult<Self> {
        TimeSpan::new(raw.date, raw.start_time, raw.end_time)
    }
}

impl TimeSpan {
    pub fn new(
        date: NaiveDate,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> ShiftSyncResult<Self> {
        if start_time >= end_time {
            return Err(ShiftSyncError::InvalidSpan(format!(
                "{} must start before it ends ({} - {})",
                date, start_time, end_time
            )));
        }

        Ok(TimeSpan {
            date,
            start_time,
            end_time,
        })
    }

    /// A span covering the whole of `date`, midnight to midnight.
    pub fn all_day(date: NaiveDate) -> Self {
        let start_time = date.and_time(NaiveTime::MIN);
        TimeSpan {
            date,
            start_time,
            end_time: start_time + Duration::days(1),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveDateTime {
        self.end_time
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// `a.start < b.end && b.start < a.end`. Touching endpoints are not an overlap.
    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start_time < other.end_time && other.start_time < self.end_time
    }

    /// Rest between the two spans, whichever one comes first.
    ///
    /// Zero for back-to-back spans, negative when they overlap.
    pub fn gap(&self, other: &TimeSpan) -> Duration {
        let after = other.start_time - self.end_time;
        let before = self.start_time - other.end_time;
        after.max(before)
    }

    pub fn gap_hours(&self, other: &TimeSpan) -> f64 {
        self.gap(other).num_milliseconds() as f64 / 3_600_000.0
    }

    /// True once `now` is strictly past the start of the span.
    pub fn has_started(&self, now: NaiveDateTime) -> bool {
        self.start_time < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M").unwrap()
    }

    fn span(date: &str, start: &str, end_date: &str, end: &str) -> TimeSpan {
        TimeSpan::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            at(date, start),
            at(end_date, end),
        )
        .unwrap()
    }

    #[test]
    fn touching_spans_do_not_overlap() {
        let night = span("2026-03-01", "01:00", "2026-03-01", "09:00");
        let day = span("2026-03-01", "09:00", "2026-03-01", "17:00");

        assert!(!night.overlaps(&day));
        assert!(!day.overlaps(&night));
        assert_eq!(night.gap(&day), Duration::zero());
    }

    #[test]
    fn nested_span_overlaps_and_has_negative_gap() {
        let long = span("2026-03-01", "07:00", "2026-03-01", "19:00");
        let short = span("2026-03-01", "10:00", "2026-03-01", "12:00");

        assert!(long.overlaps(&short));
        assert!(long.gap(&short) < Duration::zero());
        assert!(short.gap_hours(&long) < 0.0);
    }

    #[test]
    fn gap_is_measured_in_either_direction() {
        let overnight = span("2026-03-01", "22:00", "2026-03-02", "05:00");
        let morning = span("2026-03-02", "07:00", "2026-03-02", "15:00");

        assert_eq!(overnight.gap_hours(&morning), 2.0);
        assert_eq!(morning.gap_hours(&overnight), 2.0);
    }

    #[test]
    fn rejects_inverted_and_empty_spans() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let nine = at("2026-03-01", "09:00");
        let five = at("2026-03-01", "05:00");

        assert!(matches!(
            TimeSpan::new(date, nine, five),
            Err(ShiftSyncError::InvalidSpan(_))
        ));
        assert!(TimeSpan::new(date, nine, nine).is_err());
    }

    #[test]
    fn deserialize_validates_order() {
        let bad = r#"{"date":"2026-03-01","start_time":"2026-03-01T10:00:00","end_time":"2026-03-01T08:00:00"}"#;
        assert!(serde_json::from_str::<TimeSpan>(bad).is_err());

        let good = r#"{"date":"2026-03-01","start_time":"2026-03-01T08:00:00","end_time":"2026-03-01T16:00:00"}"#;
        let parsed: TimeSpan = serde_json::from_str(good).unwrap();
        assert_eq!(parsed.duration(), Duration::hours(8));
    }

    #[test]
    fn all_day_covers_midnight_to_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let whole = TimeSpan::all_day(date);

        assert_eq!(whole.start_time(), at("2026-03-01", "00:00"));
        assert_eq!(whole.end_time(), at("2026-03-02", "00:00"));
    }

    #[test]
    fn started_is_strict() {
        let shift = span("2026-03-01", "08:00", "2026-03-01", "16:00");

        assert!(!shift.has_started(at("2026-03-01", "08:00")));
        assert!(shift.has_started(at("2026-03-01", "08:01")));
        assert!(shift.has_started(at("2026-03-02", "08:00")));
    }

    fn arb_span() -> impl Strategy<Value = TimeSpan> {
        (0i64..10_000, 1i64..2_000).prop_map(|(offset, len)| {
            let base = at("2026-01-01", "00:00") + Duration::minutes(offset);
            TimeSpan::new(base.date(), base, base + Duration::minutes(len)).unwrap()
        })
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in arb_span(), b in arb_span()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
            prop_assert_eq!(a.gap(&b), b.gap(&a));
        }

        #[test]
        fn overlap_iff_negative_gap(a in arb_span(), b in arb_span()) {
            prop_assert_eq!(a.overlaps(&b), a.gap(&b) < Duration::zero());
        }
    }
}
