//! What a run intends to do, before any calendar call is made.

use chrono::{DateTime, Utc};

use crate::conflict::ExcludedCandidate;
use crate::diff::ShiftDiff;
use crate::reconcile::report::{Warning, WarningKind, push_warning};
use crate::shift::{ScheduledShift, ScrapedShift, ShiftCategory};
use crate::state::SnapshotRecord;
use crate::time_span::TimeSpan;

/// The planned changes for one category.
///
/// A disabled category has an empty diff whose `unchanged` list is the
/// previous snapshot, so it is saved back as it was.
#[derive(Debug, Clone)]
pub struct CategoryPlan {
    pub category: ShiftCategory,
    pub enabled: bool,
    pub diff: ShiftDiff,
    /// Removals cancelled because the shift had already started.
    pub rescued: Vec<SnapshotRecord>,
}

impl CategoryPlan {
    pub(crate) fn carried_forward(category: ShiftCategory, previous: &[SnapshotRecord]) -> Self {
        CategoryPlan {
            category,
            enabled: false,
            diff: ShiftDiff {
                unchanged: previous.to_vec(),
                ..Default::default()
            },
            rescued: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReconcilePlan {
    /// The instant the run is evaluated at.
    pub now: DateTime<Utc>,
    pub last_run: Option<DateTime<Utc>>,
    pub categories: Vec<CategoryPlan>,
    pub filtered_out: Vec<ExcludedCandidate>,
    pub warnings: Vec<Warning>,
}

impl ReconcilePlan {
    pub fn category(&self, category: ShiftCategory) -> Option<&CategoryPlan> {
        self.categories.iter().find(|p| p.category == category)
    }

    pub fn has_changes(&self) -> bool {
        self.categories.iter().any(|p| !p.diff.is_empty())
    }
}

/// Turn scraped shifts into scheduled ones.
///
/// A shift missing either time becomes an all-day shift on its date; one whose
/// times are inverted is dropped. Both cases are reported.
pub fn scheduled_from_scraped(
    scraped: Vec<ScrapedShift>,
    category: ShiftCategory,
    warnings: &mut Vec<Warning>,
) -> Vec<ScheduledShift> {
    scraped
        .into_iter()
        .filter_map(|s| {
            let span = match (s.start_time, s.end_time) {
                (Some(start), Some(end)) => match TimeSpan::new(s.date, start, end) {
                    Ok(span) => span,
                    Err(e) => {
                        push_warning(
                            warnings,
                            Warning::new(
                                WarningKind::DataQuality,
                                Some(category),
                                format!("Dropped {} {}: {}", s.label, s.assignment, e),
                            ),
                        );
                        return None;
                    }
                },
                _ => {
                    push_warning(
                        warnings,
                        Warning::new(
                            WarningKind::DataQuality,
                            Some(category),
                            format!(
                                "{} {} on {} has no start or end time; treated as all-day",
                                s.label, s.assignment, s.date
                            ),
                        ),
                    );
                    TimeSpan::all_day(s.date)
                }
            };

            Some(ScheduledShift::new(span, s.assignment, Some(s.label)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn scraped(start: Option<&str>, end: Option<&str>) -> ScrapedShift {
        ScrapedShift {
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            start_time: start.map(at),
            end_time: end.map(at),
            assignment: "R24".into(),
            label: "OPEN 1".into(),
        }
    }

    #[test]
    fn complete_shift_converts_cleanly() {
        let mut warnings = Vec::new();
        let shifts = scheduled_from_scraped(
            vec![scraped(Some("2026-03-01 08:00"), Some("2026-03-01 16:00"))],
            ShiftCategory::Open,
            &mut warnings,
        );

        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].label.as_deref(), Some("OPEN 1"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_time_becomes_all_day_with_warning() {
        let mut warnings = Vec::new();
        let shifts = scheduled_from_scraped(
            vec![scraped(Some("2026-03-01 08:00"), None)],
            ShiftCategory::Picked,
            &mut warnings,
        );

        assert_eq!(shifts[0].span, TimeSpan::all_day(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::DataQuality);
        assert_eq!(warnings[0].category, Some(ShiftCategory::Picked));
    }

    #[test]
    fn inverted_times_are_dropped_with_warning() {
        let mut warnings = Vec::new();
        let shifts = scheduled_from_scraped(
            vec![scraped(Some("2026-03-01 16:00"), Some("2026-03-01 08:00"))],
            ShiftCategory::Open,
            &mut warnings,
        );

        assert!(shifts.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.starts_with("Dropped OPEN 1 R24"));
    }
}
