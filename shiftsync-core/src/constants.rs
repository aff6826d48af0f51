/// Minimum rest between two shifts when none is configured.
pub const DEFAULT_MIN_REST_HOURS: f64 = 8.0;

/// How many days ahead of today the personal feed is read.
pub const DEFAULT_LOOKAHEAD_DAYS: u32 = 180;

/// Marker placed in every event description so managed events can be told apart.
pub const MANAGED_EVENT_TAG: &str = "Auto-managed by shiftsync";

/// Google Calendar color ids (1=Lavender, 2=Sage, 3=Grape, ..., 9=Blueberry, 11=Tomato).
pub const DEFAULT_OPEN_COLOR: &str = "2";
pub const DEFAULT_PICKED_COLOR: &str = "9";
pub const DEFAULT_SCHEDULED_COLOR: &str = "3";
