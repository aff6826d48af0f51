//! The structured outcome of a run, for rendering and notification.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::conflict::ExcludedCandidate;
use crate::shift::ShiftCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A scraped shift was incomplete or malformed.
    DataQuality,
    /// One calendar create or delete failed.
    ItemApply,
    /// The previous state could not be read.
    State,
}

/// Something that went wrong without stopping the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ShiftCategory>,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, category: Option<ShiftCategory>, message: impl Into<String>) -> Self {
        Warning {
            kind,
            category,
            message: message.into(),
        }
    }
}

/// Record a warning and log it.
pub(crate) fn push_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!(
        kind = ?warning.kind,
        category = warning.category.map(|c| c.as_str()),
        "{}",
        warning.message
    );
    warnings.push(warning);
}

/// Counts for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: ShiftCategory,
    pub enabled: bool,
    pub added: usize,
    pub removed: usize,
    /// Removals where the event was already gone from the calendar.
    pub already_absent: usize,
    /// Records carried over unchanged, including rescued ones.
    pub kept: usize,
    pub rescued: usize,
    pub failed: usize,
}

impl CategorySummary {
    pub fn new(category: ShiftCategory, enabled: bool) -> Self {
        CategorySummary {
            category,
            enabled,
            added: 0,
            removed: 0,
            already_absent: 0,
            kept: 0,
            rescued: 0,
            failed: 0,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.added + self.removed + self.already_absent > 0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub categories: Vec<CategorySummary>,
    /// Open shifts kept off the calendar because they clash with the schedule.
    pub filtered_out: Vec<ExcludedCandidate>,
    pub warnings: Vec<Warning>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn summary(&self, category: ShiftCategory) -> Option<&CategorySummary> {
        self.categories.iter().find(|s| s.category == category)
    }

    pub fn total_added(&self) -> usize {
        self.categories.iter().map(|s| s.added).sum()
    }

    pub fn total_removed(&self) -> usize {
        self.categories
            .iter()
            .map(|s| s.removed + s.already_absent)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_for_notifiers() {
        let mut summary = CategorySummary::new(ShiftCategory::Open, true);
        summary.added = 2;
        let now = Utc::now();
        let report = RunReport {
            started_at: now,
            finished_at: now,
            categories: vec![summary],
            filtered_out: vec![],
            warnings: vec![Warning::new(
                WarningKind::ItemApply,
                Some(ShiftCategory::Open),
                "Failed to create R24",
            )],
        };

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["categories"][0]["category"], "open");
        assert_eq!(json["categories"][0]["added"], 2);
        assert_eq!(json["warnings"][0]["kind"], "item_apply");
        assert!(!report.is_clean());
        assert_eq!(report.total_added(), 2);
    }

    #[test]
    fn state_warning_omits_category() {
        let warning = Warning::new(WarningKind::State, None, "corrupt");
        let json = serde_json::to_value(&warning).unwrap();

        assert!(json.get("category").is_none());
    }
}
