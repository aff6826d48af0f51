//! Reading iCalendar feeds.

mod parse;

pub use parse::{EventTime, FeedEvent, parse_feed};
