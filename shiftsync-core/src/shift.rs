//! Shift types shared by sources, the differ and the persisted snapshot.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::ShiftSyncResult;
use crate::time_span::TimeSpan;

/// The three kinds of shifts kept on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftCategory {
    /// Unassigned slots anyone can pick up.
    Open,
    /// Open slots claimed by the tracked person.
    Picked,
    /// The person's own schedule from the calendar feed.
    Scheduled,
}

impl ShiftCategory {
    pub const ALL: [ShiftCategory; 3] = [
        ShiftCategory::Open,
        ShiftCategory::Picked,
        ShiftCategory::Scheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftCategory::Open => "open",
            ShiftCategory::Picked => "picked",
            ShiftCategory::Scheduled => "scheduled",
        }
    }
}

impl fmt::Display for ShiftCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A shift with a concrete time span.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledShift {
    #[serde(flatten)]
    pub span: TimeSpan,
    pub assignment: String,
    #[serde(default)]
    pub label: Option<String>,
}

impl ScheduledShift {
    pub fn new(span: TimeSpan, assignment: impl Into<String>, label: Option<String>) -> Self {
        ScheduledShift {
            span,
            assignment: assignment.into(),
            label,
        }
    }

    /// A personal shift (no slot label).
    pub fn personal(
        date: NaiveDate,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        assignment: impl Into<String>,
    ) -> ShiftSyncResult<Self> {
        Ok(Self::new(
            TimeSpan::new(date, start_time, end_time)?,
            assignment,
            None,
        ))
    }

    /// A scraped shift carrying its slot label (e.g. "OPEN 1").
    pub fn labeled(
        date: NaiveDate,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        assignment: impl Into<String>,
        label: impl Into<String>,
    ) -> ShiftSyncResult<Self> {
        Ok(Self::new(
            TimeSpan::new(date, start_time, end_time)?,
            assignment,
            Some(label.into()),
        ))
    }

    pub fn key(&self) -> ShiftKey {
        ShiftKey {
            date: self.span.date(),
            start_time: self.span.start_time(),
            end_time: self.span.end_time(),
            assignment: self.assignment.clone(),
            label: self.label.clone(),
        }
    }

    /// The label used for display filtering: the slot label, or the assignment
    /// for unlabeled personal shifts.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.assignment)
    }
}

impl fmt::Display for ScheduledShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{} {}", label, self.assignment)?,
            None => write!(f, "{}", self.assignment)?,
        }
        write!(
            f,
            " on {} ({} - {})",
            self.span.date(),
            self.span.start_time().format("%H:%M"),
            self.span.end_time().format("%H:%M")
        )
    }
}

/// Structural identity of a shift across runs.
///
/// Two shifts are the same shift iff every field here is equal; ordering is
/// by date first, so key-ordered collections read chronologically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShiftKey {
    pub date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub assignment: String,
    pub label: Option<String>,
}

impl fmt::Display for ShiftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.date,
            self.start_time.format("%Y-%m-%dT%H:%M:%S"),
            self.end_time.format("%Y-%m-%dT%H:%M:%S"),
            self.assignment
        )?;
        if let Some(label) = &self.label {
            write!(f, "|{}", label)?;
        }
        Ok(())
    }
}

/// A shift as reported by the open-shift source, before validation.
///
/// Times may be missing when the schedule view did not show them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedShift {
    pub date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    pub assignment: String,
    pub label: String,
}

/// Everything the open-shift source reports for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapedShifts {
    #[serde(default)]
    pub open: Vec<ScrapedShift>,
    #[serde(default)]
    pub picked: Vec<ScrapedShift>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn open(label: &str) -> ScheduledShift {
        ScheduledShift::labeled(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            at("2026-03-01 08:00"),
            at("2026-03-01 16:00"),
            "R24",
            label,
        )
        .unwrap()
    }

    #[test]
    fn separately_built_shifts_share_a_key() {
        assert_eq!(open("OPEN 1").key(), open("OPEN 1").key());
        assert_ne!(open("OPEN 1").key(), open("OPEN 2").key());
    }

    #[test]
    fn key_display_matches_legacy_format() {
        assert_eq!(
            open("OPEN 1").key().to_string(),
            "2026-03-01|2026-03-01T08:00:00|2026-03-01T16:00:00|R24|OPEN 1"
        );
    }

    #[test]
    fn display_label_falls_back_to_assignment() {
        let personal = ScheduledShift::personal(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            at("2026-03-01 08:00"),
            at("2026-03-01 16:00"),
            "Admin",
        )
        .unwrap();

        assert_eq!(personal.display_label(), "Admin");
        assert_eq!(open("OPEN 1").display_label(), "OPEN 1");
    }

    #[test]
    fn shift_serializes_flat() {
        let json = serde_json::to_value(open("OPEN 1")).unwrap();

        assert_eq!(json["date"], "2026-03-01");
        assert_eq!(json["start_time"], "2026-03-01T08:00:00");
        assert_eq!(json["label"], "OPEN 1");
    }

    #[test]
    fn scraped_shift_times_are_optional() {
        let json = r#"{"date":"2026-03-01","assignment":"R24","label":"OPEN 1"}"#;
        let scraped: ScrapedShift = serde_json::from_str(json).unwrap();

        assert!(scraped.start_time.is_none());
        assert!(scraped.end_time.is_none());
    }
}
