//! Configuration: user settings and the immutable policy a run is executed with.

mod policy;
mod settings;

pub use policy::SyncPolicy;
pub use settings::{CategoryColors, FeedSettings, Settings, SyncToggles};
