use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::config::{CategoryColors, Settings, SyncToggles};
use crate::conflict::rest_duration;
use crate::constants::{DEFAULT_LOOKAHEAD_DAYS, DEFAULT_MIN_REST_HOURS};
use crate::error::{ShiftSyncError, ShiftSyncResult};
use crate::shift::{ScheduledShift, ShiftCategory};

/// Everything a run needs to decide, resolved once up front and never mutated.
#[derive(Debug, Clone)]
pub struct SyncPolicy {
    pub zone: Tz,
    pub min_rest_hours: f64,
    pub lookahead_days: u32,
    pub protect_started: bool,
    pub sync: SyncToggles,
    pub colors: CategoryColors,
    /// Lowercased.
    excluded_labels: BTreeSet<String>,
}

impl SyncPolicy {
    /// A policy with default rules in the given zone.
    pub fn new(zone: Tz) -> Self {
        SyncPolicy {
            zone,
            min_rest_hours: DEFAULT_MIN_REST_HOURS,
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            protect_started: true,
            sync: SyncToggles::default(),
            colors: CategoryColors::default(),
            excluded_labels: BTreeSet::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> ShiftSyncResult<Self> {
        if !settings.min_rest_hours.is_finite() || settings.min_rest_hours < 0.0 {
            return Err(ShiftSyncError::Config(format!(
                "min_rest_hours must be a non-negative number, got {}",
                settings.min_rest_hours
            )));
        }

        let zone = match &settings.timezone {
            Some(name) => parse_zone(name)?,
            None => system_zone()?,
        };

        Ok(SyncPolicy {
            zone,
            min_rest_hours: settings.min_rest_hours,
            lookahead_days: settings.lookahead_days,
            protect_started: settings.protect_started,
            sync: settings.sync,
            colors: settings.colors.clone(),
            excluded_labels: BTreeSet::new(),
        }
        .with_excluded_labels(settings.excluded_labels.iter().map(String::as_str)))
    }

    pub fn with_excluded_labels<'a>(mut self, labels: impl IntoIterator<Item = &'a str>) -> Self {
        self.excluded_labels = labels
            .into_iter()
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();
        self
    }

    pub fn min_rest(&self) -> Duration {
        rest_duration(self.min_rest_hours)
    }

    pub fn is_enabled(&self, category: ShiftCategory) -> bool {
        self.sync.is_enabled(category)
    }

    pub fn color(&self, category: ShiftCategory) -> Option<&str> {
        self.colors.for_category(category)
    }

    /// Whether a shift is kept off the calendar. It still blocks open shifts.
    pub fn is_excluded_from_display(&self, shift: &ScheduledShift) -> bool {
        self.excluded_labels
            .contains(&shift.display_label().trim().to_lowercase())
    }

    /// `now` as wall-clock time in the run's zone.
    pub fn local_now(&self, now: DateTime<Utc>) -> NaiveDateTime {
        now.with_timezone(&self.zone).naive_local()
    }
}

fn parse_zone(name: &str) -> ShiftSyncResult<Tz> {
    name.parse::<Tz>()
        .map_err(|_| ShiftSyncError::InvalidTimezone(name.to_string()))
}

fn system_zone() -> ShiftSyncResult<Tz> {
    let name = iana_time_zone::get_timezone().map_err(|e| {
        ShiftSyncError::Config(format!(
            "No timezone configured and the system zone is unknown ({e})"
        ))
    })?;
    parse_zone(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn personal(assignment: &str) -> ScheduledShift {
        ScheduledShift::new(
            crate::time_span::TimeSpan::all_day(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            assignment,
            None,
        )
    }

    #[test]
    fn builds_from_settings() {
        let settings = Settings {
            timezone: Some("America/Chicago".into()),
            min_rest_hours: 12.0,
            excluded_labels: vec!["Vacation".into()],
            ..Default::default()
        };

        let policy = SyncPolicy::from_settings(&settings).unwrap();

        assert_eq!(policy.zone, chrono_tz::America::Chicago);
        assert_eq!(policy.min_rest(), Duration::hours(12));
        assert!(policy.is_excluded_from_display(&personal("vacation ")));
        assert!(!policy.is_excluded_from_display(&personal("R24")));
    }

    #[test]
    fn rejects_unknown_zone() {
        let settings = Settings {
            timezone: Some("Mars/Olympus_Mons".into()),
            ..Default::default()
        };

        assert!(matches!(
            SyncPolicy::from_settings(&settings),
            Err(ShiftSyncError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn rejects_negative_rest() {
        let settings = Settings {
            timezone: Some("UTC".into()),
            min_rest_hours: -1.0,
            ..Default::default()
        };

        assert!(matches!(
            SyncPolicy::from_settings(&settings),
            Err(ShiftSyncError::Config(_))
        ));
    }

    #[test]
    fn local_now_uses_the_zone() {
        let policy = SyncPolicy::new(chrono_tz::America::Chicago);
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 16, 0, 0).unwrap();

        assert_eq!(
            policy.local_now(now),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(10, 0, 0).unwrap()
        );
    }

    #[test]
    fn labeled_shift_matches_on_label() {
        let policy = SyncPolicy::new(chrono_tz::UTC).with_excluded_labels(["OPEN 2"]);
        let shift = ScheduledShift::new(personal("R24").span, "R24", Some("OPEN 2".into()));

        assert!(policy.is_excluded_from_display(&shift));
    }
}
