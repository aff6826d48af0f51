//! RRULE expansion for recurring feed events.
//!
//! Expands a master event into concrete occurrences inside a local-time
//! window, respecting EXDATEs. Occurrences come back as wall-clock times in
//! the run's zone.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::error::{ShiftSyncError, ShiftSyncResult};
use crate::ics::{EventTime, FeedEvent};

/// Upper bound on occurrences generated per master event.
const MAX_OCCURRENCES: u16 = 1000;

/// Format an event time as the value part of a DTSTART/EXDATE line.
///
/// All-day dates, floating times and unknown TZIDs are pinned to `zone`.
fn rrule_value(time: &EventTime, zone: Tz) -> String {
    match time {
        EventTime::DateTimeUtc(dt) => format!(":{}", dt.format("%Y%m%dT%H%M%SZ")),
        EventTime::DateTimeZoned { datetime, tzid } if tzid.parse::<Tz>().is_ok() => {
            format!(";TZID={}:{}", tzid, datetime.format("%Y%m%dT%H%M%S"))
        }
        other => format!(
            ";TZID={}:{}",
            zone.name(),
            other.to_local(zone).format("%Y%m%dT%H%M%S")
        ),
    }
}

/// Build an iCalendar-format rule set string for the rrule crate parser.
fn build_rrule_string(event: &FeedEvent, rrule: &str, zone: Tz) -> String {
    let mut lines = vec![
        format!("DTSTART{}", rrule_value(&event.start, zone)),
        format!("RRULE:{}", rrule),
    ];

    for exdate in &event.exdates {
        lines.push(format!("EXDATE{}", rrule_value(exdate, zone)));
    }

    lines.join("\n")
}

fn to_rrule_tz(local: NaiveDateTime, zone: Tz) -> DateTime<rrule::Tz> {
    let tz = rrule::Tz::Tz(zone);
    tz.from_local_datetime(&local)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&local))
}

/// Local (start, end) pairs of every occurrence that intersects `[from, to)`.
///
/// Non-recurring events yield their single span (if it intersects).
pub fn expand_event(
    event: &FeedEvent,
    zone: Tz,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> ShiftSyncResult<Vec<(NaiveDateTime, NaiveDateTime)>> {
    let start = event.start.to_local(zone);
    let end = event.end.to_local(zone);
    let duration = end - start;

    let Some(rrule) = &event.rrule else {
        return Ok(if start < to && end > from {
            vec![(start, end)]
        } else {
            vec![]
        });
    };

    let rrule_str = build_rrule_string(event, rrule, zone);
    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
        ShiftSyncError::IcsParse(format!(
            "Failed to parse RRULE for event '{}': {}",
            event.summary, e
        ))
    })?;

    // after/before are exclusive; widen by a second, and start early enough
    // to catch occurrences that began before the window but run into it.
    let after = to_rrule_tz(from - duration.max(Duration::zero()), zone) - Duration::seconds(1);
    let before = to_rrule_tz(to, zone);

    let result = rrule_set.after(after).before(before).all(MAX_OCCURRENCES);
    if result.limited {
        tracing::warn!(
            summary = %event.summary,
            limit = MAX_OCCURRENCES,
            "recurring event expansion hit the occurrence limit"
        );
    }

    Ok(result
        .dates
        .iter()
        .map(|occurrence| {
            let start = occurrence.with_timezone(&zone).naive_local();
            (start, start + duration)
        })
        .filter(|(start, end)| *start < to && *end > from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn weekly(exdates: Vec<EventTime>) -> FeedEvent {
        FeedEvent {
            uid: Some("weekly@schedule".into()),
            summary: "Clinic".into(),
            start: EventTime::DateTimeZoned {
                datetime: local("2026-03-02 08:00"),
                tzid: "America/Chicago".into(),
            },
            end: EventTime::DateTimeZoned {
                datetime: local("2026-03-02 12:00"),
                tzid: "America/Chicago".into(),
            },
            rrule: Some("FREQ=WEEKLY;COUNT=4".into()),
            exdates,
            recurrence_id: None,
        }
    }

    #[test]
    fn expands_weekly_rule_across_dst() {
        let zone = chrono_tz::America::Chicago;
        let occurrences = expand_event(
            &weekly(vec![]),
            zone,
            local("2026-03-01 00:00"),
            local("2026-04-01 00:00"),
        )
        .unwrap();

        let starts: Vec<_> = occurrences.iter().map(|(s, _)| *s).collect();
        // Wall-clock time stays at 08:00 after the March 8 DST change.
        assert_eq!(
            starts,
            vec![
                local("2026-03-02 08:00"),
                local("2026-03-09 08:00"),
                local("2026-03-16 08:00"),
                local("2026-03-23 08:00"),
            ]
        );
        assert!(occurrences.iter().all(|(s, e)| *e - *s == Duration::hours(4)));
    }

    #[test]
    fn honours_exdates() {
        let zone = chrono_tz::America::Chicago;
        let exdate = EventTime::DateTimeZoned {
            datetime: local("2026-03-09 08:00"),
            tzid: "America/Chicago".into(),
        };

        let occurrences = expand_event(
            &weekly(vec![exdate]),
            zone,
            local("2026-03-01 00:00"),
            local("2026-04-01 00:00"),
        )
        .unwrap();

        assert_eq!(occurrences.len(), 3);
        assert!(!occurrences.iter().any(|(s, _)| *s == local("2026-03-09 08:00")));
    }

    #[test]
    fn window_cuts_occurrences() {
        let zone = chrono_tz::America::Chicago;
        let occurrences = expand_event(
            &weekly(vec![]),
            zone,
            local("2026-03-10 00:00"),
            local("2026-03-20 00:00"),
        )
        .unwrap();

        assert_eq!(occurrences, vec![(local("2026-03-16 08:00"), local("2026-03-16 12:00"))]);
    }

    #[test]
    fn single_event_outside_window_is_dropped() {
        let event = FeedEvent {
            rrule: None,
            ..weekly(vec![])
        };
        let zone = chrono_tz::America::Chicago;

        assert!(expand_event(&event, zone, local("2026-03-03 00:00"), local("2026-03-10 00:00"))
            .unwrap()
            .is_empty());
        assert_eq!(
            expand_event(&event, zone, local("2026-03-02 10:00"), local("2026-03-10 00:00"))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn all_day_rule_is_pinned_to_zone_midnight() {
        let event = FeedEvent {
            uid: None,
            summary: "Call".into(),
            start: EventTime::Date(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()),
            end: EventTime::Date(NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()),
            rrule: Some("FREQ=DAILY;COUNT=3".into()),
            exdates: vec![],
            recurrence_id: None,
        };

        let occurrences = expand_event(
            &event,
            chrono_tz::America::Chicago,
            local("2026-03-01 00:00"),
            local("2026-03-31 00:00"),
        )
        .unwrap();

        assert_eq!(occurrences.len(), 3);
        assert_eq!(occurrences[2], (local("2026-03-04 00:00"), local("2026-03-05 00:00")));
    }

    #[test]
    fn bad_rule_is_an_error() {
        let event = FeedEvent {
            rrule: Some("FREQ=SOMETIMES".into()),
            ..weekly(vec![])
        };

        assert!(matches!(
            expand_event(&event, chrono_tz::UTC, local("2026-03-01 00:00"), local("2026-04-01 00:00")),
            Err(ShiftSyncError::IcsParse(_))
        ));
    }
}
