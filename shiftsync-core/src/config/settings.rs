//! User settings at ~/.config/shiftsync/config.toml.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LOOKAHEAD_DAYS, DEFAULT_MIN_REST_HOURS, DEFAULT_OPEN_COLOR, DEFAULT_PICKED_COLOR,
    DEFAULT_SCHEDULED_COLOR,
};
use crate::error::{ShiftSyncError, ShiftSyncResult};
use crate::remote::ProviderBinding;
use crate::shift::ShiftCategory;

fn default_state_file() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("shiftsync").join("state.json"))
        .unwrap_or_else(|| PathBuf::from("~/.shiftsync/state.json"))
}

fn default_min_rest_hours() -> f64 {
    DEFAULT_MIN_REST_HOURS
}

fn default_lookahead_days() -> u32 {
    DEFAULT_LOOKAHEAD_DAYS
}

fn default_true() -> bool {
    true
}

/// Which categories are kept on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncToggles {
    #[serde(default = "default_true")]
    pub open: bool,
    #[serde(default = "default_true")]
    pub picked: bool,
    #[serde(default = "default_true")]
    pub scheduled: bool,
}

impl Default for SyncToggles {
    fn default() -> Self {
        SyncToggles {
            open: true,
            picked: true,
            scheduled: true,
        }
    }
}

impl SyncToggles {
    pub fn is_enabled(&self, category: ShiftCategory) -> bool {
        match category {
            ShiftCategory::Open => self.open,
            ShiftCategory::Picked => self.picked,
            ShiftCategory::Scheduled => self.scheduled,
        }
    }
}

/// Calendar color per category (provider-specific ids).
///
/// Keys left out of a `[colors]` table keep their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryColors {
    pub open: Option<String>,
    pub picked: Option<String>,
    pub scheduled: Option<String>,
}

impl Default for CategoryColors {
    fn default() -> Self {
        CategoryColors {
            open: Some(DEFAULT_OPEN_COLOR.to_string()),
            picked: Some(DEFAULT_PICKED_COLOR.to_string()),
            scheduled: Some(DEFAULT_SCHEDULED_COLOR.to_string()),
        }
    }
}

impl CategoryColors {
    pub fn for_category(&self, category: ShiftCategory) -> Option<&str> {
        match category {
            ShiftCategory::Open => self.open.as_deref(),
            ShiftCategory::Picked => self.picked.as_deref(),
            ShiftCategory::Scheduled => self.scheduled.as_deref(),
        }
    }
}

/// The personal calendar subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSettings {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// IANA zone all shift times are read in. Falls back to the system zone.
    #[serde(default)]
    pub timezone: Option<String>,

    #[serde(default = "default_min_rest_hours")]
    pub min_rest_hours: f64,

    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,

    /// Never remove a shift that has already started.
    #[serde(default = "default_true")]
    pub protect_started: bool,

    /// Labels kept off the calendar (they still block open shifts).
    #[serde(default)]
    pub excluded_labels: Vec<String>,

    #[serde(default)]
    pub sync: SyncToggles,

    #[serde(default)]
    pub colors: CategoryColors,

    #[serde(default)]
    pub feed: Option<FeedSettings>,

    /// Where open and picked-up shifts come from.
    #[serde(default)]
    pub scraper: Option<ProviderBinding>,

    /// The calendar shifts are written to.
    #[serde(default)]
    pub calendar: Option<ProviderBinding>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            state_file: default_state_file(),
            timezone: None,
            min_rest_hours: DEFAULT_MIN_REST_HOURS,
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
            protect_started: true,
            excluded_labels: Vec::new(),
            sync: SyncToggles::default(),
            colors: CategoryColors::default(),
            feed: None,
            scraper: None,
            calendar: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> ShiftSyncResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ShiftSyncError::Config("Could not determine config directory".into()))?
            .join("shiftsync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings from `path` (optional file) overlaid with `SHIFTSYNC_*` env vars.
    pub fn load(path: &Path) -> ShiftSyncResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("SHIFTSYNC")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("excluded_labels")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ShiftSyncError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ShiftSyncError::Config(e.to_string()))
    }

    /// The state file path with `~` expanded.
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.state_file.to_string_lossy()).into_owned())
    }

    pub fn feed(&self) -> ShiftSyncResult<&FeedSettings> {
        self.feed
            .as_ref()
            .ok_or_else(|| ShiftSyncError::Config("No [feed] url configured".into()))
    }

    pub fn scraper(&self) -> ShiftSyncResult<&ProviderBinding> {
        self.scraper
            .as_ref()
            .ok_or_else(|| ShiftSyncError::Config("No [scraper] provider configured".into()))
    }

    pub fn calendar(&self) -> ShiftSyncResult<&ProviderBinding> {
        self.calendar
            .as_ref()
            .ok_or_else(|| ShiftSyncError::Config("No [calendar] provider configured".into()))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> ShiftSyncResult<()> {
        let contents = format!(
            "\
# shiftsync configuration

# Zone all shift times are read in (defaults to the system zone):
# timezone = \"America/Chicago\"

# Minimum hours of rest required around an open shift:
# min_rest_hours = {DEFAULT_MIN_REST_HOURS}

# How many days of the personal feed to read:
# lookahead_days = {DEFAULT_LOOKAHEAD_DAYS}

# Never remove a shift once it has started:
# protect_started = true

# Labels that block open shifts but are not put on the calendar:
# excluded_labels = [\"Vacation\"]

# [sync]
# open = true
# picked = true
# scheduled = true

# [colors]
# open = \"{DEFAULT_OPEN_COLOR}\"
# picked = \"{DEFAULT_PICKED_COLOR}\"
# scheduled = \"{DEFAULT_SCHEDULED_COLOR}\"

# [feed]
# url = \"https://example.com/my-schedule.ics\"

# [scraper]
# provider = \"lightningbolt\"

# [calendar]
# provider = \"google\"
# google_calendar_id = \"primary\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ShiftSyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| ShiftSyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
