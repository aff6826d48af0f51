//! Defines the JSON protocol used for communication between shiftsync and
//! provider binaries over stdin/stdout.

use std::time::Duration;

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::constants::MANAGED_EVENT_TAG;
use crate::shift::{ScheduledShift, ScrapedShifts, ShiftCategory};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Scrapers drive a browser through a login and several pages.
const SCRAPE_TIMEOUT: Duration = Duration::from_secs(600);

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;

    fn timeout() -> Duration {
        DEFAULT_TIMEOUT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    ListShifts,
    CreateEvent,
    DeleteEvent,
}

/// Request sent from shiftsync to a provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from a provider back to shiftsync.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { error: String },
}

/// List the open and picked-up shifts currently on the schedule.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListShifts {
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl ProviderCommand for ListShifts {
    type Response = ScrapedShifts;
    fn command() -> Command {
        Command::ListShifts
    }

    fn timeout() -> Duration {
        SCRAPE_TIMEOUT
    }
}

/// A calendar event as shiftsync wants it created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub summary: String,
    pub description: String,
    /// Wall-clock times in `time_zone`.
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub time_zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    pub category: ShiftCategory,
    /// Stored by providers that support private event metadata.
    pub shift_key: String,
}

impl EventDraft {
    pub fn for_shift(
        shift: &ScheduledShift,
        category: ShiftCategory,
        color: Option<&str>,
        zone: Tz,
    ) -> Self {
        let prefix = match category {
            ShiftCategory::Open => Some("OPEN"),
            ShiftCategory::Picked => Some("PICKED"),
            ShiftCategory::Scheduled => None,
        };

        let summary = match (prefix, &shift.label) {
            (Some(prefix), Some(label)) => format!("{prefix}: {} ({label})", shift.assignment),
            (Some(prefix), None) => format!("{prefix}: {}", shift.assignment),
            (None, _) => shift.assignment.clone(),
        };

        let mut description = format!("Assignment: {}\n", shift.assignment);
        if let Some(label) = &shift.label {
            description.push_str(&format!("Label: {label}\n"));
        }
        description.push_str(&format!("\n{MANAGED_EVENT_TAG} ({category})"));

        EventDraft {
            summary,
            description,
            start: shift.span.start_time(),
            end: shift.span.end_time(),
            time_zone: zone.name().to_string(),
            color_id: color.map(str::to_string),
            category,
            shift_key: shift.key().to_string(),
        }
    }
}

/// Create a new event.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
    pub event: EventDraft,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEvent {
    pub event_id: String,
}

impl ProviderCommand for CreateEvent {
    type Response = CreatedEvent;
    fn command() -> Command {
        Command::CreateEvent
    }
}

/// Delete an event by id.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
    pub event_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteStatus {
    Deleted,
    AlreadyAbsent,
}

impl ProviderCommand for DeleteEvent {
    type Response = DeleteStatus;
    fn command() -> Command {
        Command::DeleteEvent
    }
}
