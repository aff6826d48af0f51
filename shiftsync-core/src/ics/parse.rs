//! Feed parsing using the icalendar crate's parser.

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    DatePerhapsTime,
    parser::{Component, Property, read_calendar, unfold},
};

use crate::error::{ShiftSyncError, ShiftSyncResult};

/// A DTSTART/DTEND/EXDATE/RECURRENCE-ID value as written in the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    Date(NaiveDate),
    DateTimeUtc(chrono::DateTime<Utc>),
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned { datetime: NaiveDateTime, tzid: String },
}

impl EventTime {
    /// Wall-clock time in `zone`. All-day dates map to midnight; unknown TZIDs
    /// are read as floating.
    pub fn to_local(&self, zone: Tz) -> NaiveDateTime {
        match self {
            EventTime::Date(d) => d.and_time(chrono::NaiveTime::MIN),
            EventTime::DateTimeUtc(dt) => dt.with_timezone(&zone).naive_local(),
            EventTime::DateTimeFloating(dt) => *dt,
            EventTime::DateTimeZoned { datetime, tzid } => match tzid.parse::<Tz>() {
                Ok(source) => source
                    .from_local_datetime(datetime)
                    .earliest()
                    .map(|dt| dt.with_timezone(&zone).naive_local())
                    .unwrap_or(*datetime),
                Err(_) => {
                    tracing::debug!(%tzid, "unknown TZID, reading time as floating");
                    *datetime
                }
            },
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }
}

/// The parts of a VEVENT needed to turn it into shifts.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEvent {
    pub uid: Option<String>,
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
    pub rrule: Option<String>,
    pub exdates: Vec<EventTime>,
    pub recurrence_id: Option<EventTime>,
}

/// Parse every usable VEVENT in a feed.
///
/// Events without DTSTART or DTEND and cancelled events are skipped.
pub fn parse_feed(content: &str) -> ShiftSyncResult<Vec<FeedEvent>> {
    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| ShiftSyncError::IcsParse(e.to_string()))?;

    let events = calendar
        .components
        .iter()
        .flat_map(|c| {
            if c.name == "VCALENDAR" {
                c.components.iter().collect::<Vec<_>>()
            } else {
                vec![c]
            }
        })
        .filter(|c| c.name == "VEVENT")
        .filter_map(parse_vevent)
        .collect();

    Ok(events)
}

fn parse_vevent(vevent: &Component) -> Option<FeedEvent> {
    let summary = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string().trim().to_string())
        .unwrap_or_default();

    let cancelled = vevent
        .find_prop("STATUS")
        .is_some_and(|p| p.val == "CANCELLED");
    if cancelled {
        tracing::debug!(%summary, "skipping cancelled event");
        return None;
    }

    let (Some(start), Some(end)) = (
        vevent.find_prop("DTSTART").and_then(to_event_time),
        vevent.find_prop("DTEND").and_then(to_event_time),
    ) else {
        tracing::debug!(%summary, "skipping event without DTSTART/DTEND");
        return None;
    };

    let exdates = vevent
        .properties
        .iter()
        .filter(|p| p.name == "EXDATE")
        .flat_map(exdate_values)
        .collect();

    Some(FeedEvent {
        uid: vevent.find_prop("UID").map(|p| p.val.to_string()),
        summary,
        start,
        end,
        rrule: vevent.find_prop("RRULE").map(|p| p.val.to_string()),
        exdates,
        recurrence_id: vevent.find_prop("RECURRENCE-ID").and_then(to_event_time),
    })
}

fn to_event_time(prop: &Property) -> Option<EventTime> {
    let dpt = DatePerhapsTime::try_from(prop).ok()?;
    Some(match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            icalendar::CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            icalendar::CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            icalendar::CalendarDateTime::WithTimezone { date_time, tzid } => {
                EventTime::DateTimeZoned {
                    datetime: date_time,
                    tzid,
                }
            }
        },
    })
}

const ICS_DATETIME: &str = "%Y%m%dT%H%M%S";

fn param<'p>(prop: &'p Property, key: &str) -> Option<&'p str> {
    prop.params
        .iter()
        .find(|p| p.key == key)
        .and_then(|p| p.val.as_ref())
        .map(|v| v.as_ref())
}

/// All values of one EXDATE line. A line may list several, comma-separated.
fn exdate_values(prop: &Property) -> Vec<EventTime> {
    let date_only = param(prop, "VALUE") == Some("DATE");
    let tzid = param(prop, "TZID");

    prop.val
        .as_ref()
        .split(',')
        .filter_map(|raw| exdate_value(raw.trim(), date_only, tzid))
        .collect()
}

fn exdate_value(raw: &str, date_only: bool, tzid: Option<&str>) -> Option<EventTime> {
    if date_only {
        return NaiveDate::parse_from_str(raw, "%Y%m%d").ok().map(EventTime::Date);
    }

    let (stamp, is_utc) = match raw.strip_suffix('Z') {
        Some(stamp) => (stamp, true),
        None => (raw, false),
    };
    let datetime = NaiveDateTime::parse_from_str(stamp, ICS_DATETIME).ok()?;

    Some(match (is_utc, tzid) {
        (true, _) => EventTime::DateTimeUtc(datetime.and_utc()),
        (false, Some(tzid)) => EventTime::DateTimeZoned {
            datetime,
            tzid: tzid.to_string(),
        },
        (false, None) => EventTime::DateTimeFloating(datetime),
    })
}
