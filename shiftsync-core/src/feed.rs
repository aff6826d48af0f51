//! The personal schedule, read from an iCalendar subscription URL.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{Days, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

use crate::error::{ShiftSyncError, ShiftSyncResult};
use crate::ics::{FeedEvent, parse_feed};
use crate::recurrence::expand_event;
use crate::shift::ScheduledShift;
use crate::source::PersonalScheduleSource;

const FEED_TIMEOUT: Duration = Duration::from_secs(30);

/// An iCalendar feed over HTTP(S).
#[derive(Debug, Clone)]
pub struct IcsFeed {
    url: String,
    client: reqwest::Client,
}

impl IcsFeed {
    pub fn new(url: &str) -> ShiftSyncResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("shiftsync/", env!("CARGO_PKG_VERSION")))
            .timeout(FEED_TIMEOUT)
            .build()
            .map_err(|e| ShiftSyncError::Feed(e.to_string()))?;

        Ok(IcsFeed {
            url: normalize_feed_url(url),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn download(&self) -> ShiftSyncResult<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ShiftSyncError::Feed(format!("Failed to fetch {}: {}", self.url, e)))?;

        response
            .text()
            .await
            .map_err(|e| ShiftSyncError::Feed(format!("Failed to read {}: {}", self.url, e)))
    }
}

impl PersonalScheduleSource for IcsFeed {
    async fn fetch(&self, lookahead_days: u32, zone: Tz) -> ShiftSyncResult<Vec<ScheduledShift>> {
        let today = Utc::now().with_timezone(&zone).date_naive();
        let from = today.and_time(NaiveTime::MIN);
        let to = from
            .checked_add_days(Days::new(u64::from(lookahead_days)))
            .ok_or_else(|| ShiftSyncError::Config(format!("lookahead_days {lookahead_days} is out of range")))?;

        tracing::info!(url = %self.url, %from, %to, "fetching personal schedule");
        let content = self.download().await?;
        let events = parse_feed(&content)?;
        let shifts = shifts_from_events(&events, zone, from, to)?;

        tracing::info!(events = events.len(), shifts = shifts.len(), "personal schedule loaded");
        Ok(shifts)
    }
}

/// `webcal://` and `webcals://` are HTTPS subscriptions.
fn normalize_feed_url(url: &str) -> String {
    let url = url.trim();
    match url
        .strip_prefix("webcal://")
        .or_else(|| url.strip_prefix("webcals://"))
    {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}

/// Turn parsed feed events into personal shifts intersecting `[from, to)`.
///
/// Recurring events are expanded, with RECURRENCE-ID overrides replacing the
/// generated instance they name. Events with an empty or inverted span are
/// skipped. The result is sorted by key.
pub fn shifts_from_events(
    events: &[FeedEvent],
    zone: Tz,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> ShiftSyncResult<Vec<ScheduledShift>> {
    let overridden: HashSet<(&str, NaiveDateTime)> = events
        .iter()
        .filter_map(|e| Some((e.uid.as_deref()?, e.recurrence_id.as_ref()?.to_local(zone))))
        .collect();

    let mut shifts = Vec::new();

    for event in events {
        let is_master = event.rrule.is_some() && event.recurrence_id.is_none();

        for (start, end) in expand_event(event, zone, from, to)? {
            if is_master
                && event
                    .uid
                    .as_deref()
                    .is_some_and(|uid| overridden.contains(&(uid, start)))
            {
                continue;
            }

            match ScheduledShift::personal(start.date(), start, end, event.summary.clone()) {
                Ok(shift) => shifts.push(shift),
                Err(e) => tracing::warn!(summary = %event.summary, error = %e, "skipping feed event"),
            }
        }
    }

    shifts.sort_by_cached_key(ScheduledShift::key);
    Ok(shifts)
}
