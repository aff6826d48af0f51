//! Decide whether a candidate shift fits around an existing schedule.
//!
//! A candidate conflicts with a reference shift when the two overlap, or when
//! the rest between them (in whichever direction applies) is strictly shorter
//! than the configured minimum. Back-to-back shifts have zero rest.

use chrono::Duration;
use serde::Serialize;

use crate::shift::ScheduledShift;

/// Why a candidate was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    Overlap,
    InsufficientRest { gap: Duration },
}

/// The first reference shift a candidate collides with.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict<'a> {
    pub with: &'a ScheduledShift,
    pub reason: ConflictReason,
}

impl std::fmt::Display for Conflict<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            ConflictReason::Overlap => write!(f, "overlaps {}", self.with),
            ConflictReason::InsufficientRest { gap } => write!(
                f,
                "only {}h{:02}m rest around {}",
                gap.num_hours(),
                gap.num_minutes() % 60,
                self.with
            ),
        }
    }
}

/// Convert fractional hours to a millisecond-exact duration.
pub fn rest_duration(min_rest_hours: f64) -> Duration {
    Duration::milliseconds((min_rest_hours * 3_600_000.0).round() as i64)
}

/// Find the first reference shift the candidate conflicts with.
pub fn find_conflict<'a>(
    candidate: &ScheduledShift,
    reference_set: &'a [ScheduledShift],
    min_rest: Duration,
) -> Option<Conflict<'a>> {
    reference_set.iter().find_map(|reference| {
        if candidate.span.overlaps(&reference.span) {
            return Some(Conflict {
                with: reference,
                reason: ConflictReason::Overlap,
            });
        }

        // Reference ends -> candidate starts, and candidate ends -> reference starts.
        // Only the non-negative one is relevant; gap() returns it.
        let gap = candidate.span.gap(&reference.span);
        (gap < min_rest).then_some(Conflict {
            with: reference,
            reason: ConflictReason::InsufficientRest { gap },
        })
    })
}

pub fn is_conflicting(
    candidate: &ScheduledShift,
    reference_set: &[ScheduledShift],
    min_rest_hours: f64,
) -> bool {
    find_conflict(candidate, reference_set, rest_duration(min_rest_hours)).is_some()
}

/// A candidate that was filtered out, with the reason in readable form.
#[derive(Debug, Clone, Serialize)]
pub struct ExcludedCandidate {
    #[serde(flatten)]
    pub shift: ScheduledShift,
    pub reason: String,
}

/// Split candidates into those compatible with the reference set and those
/// that are not. Input order is preserved on both sides.
pub fn partition_candidates(
    candidates: Vec<ScheduledShift>,
    reference_set: &[ScheduledShift],
    min_rest: Duration,
) -> (Vec<ScheduledShift>, Vec<ExcludedCandidate>) {
    let mut available = Vec::new();
    let mut excluded = Vec::new();

    for candidate in candidates {
        match find_conflict(&candidate, reference_set, min_rest) {
            Some(conflict) => {
                let reason = conflict.to_string();
                tracing::info!(shift = %candidate, %reason, "filtered out open shift");
                excluded.push(ExcludedCandidate {
                    shift: candidate,
                    reason,
                });
            }
            None => {
                tracing::debug!(shift = %candidate, "open shift available");
                available.push(candidate);
            }
        }
    }

    (available, excluded)
}
