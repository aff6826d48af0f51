//! Loading and saving the reconciliation state.

use std::path::{Path, PathBuf};

use crate::error::{ShiftSyncError, ShiftSyncResult};
use crate::state::ReconciliationState;

/// Outcome of reading the persisted state.
#[derive(Debug)]
pub enum StateLoad {
    Loaded(ReconciliationState),
    /// First run: nothing stored yet.
    Missing,
    /// The stored state could not be read; the run starts from empty.
    Corrupt(String),
}

impl StateLoad {
    pub fn into_state(self) -> ReconciliationState {
        match self {
            StateLoad::Loaded(state) => state,
            StateLoad::Missing | StateLoad::Corrupt(_) => ReconciliationState::default(),
        }
    }
}

pub trait StateStore {
    fn load(&self) -> StateLoad;

    /// Write all categories and the timestamp together, or nothing.
    fn save(&self, state: &ReconciliationState) -> ShiftSyncResult<()>;
}

/// State kept as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> StateLoad {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no existing state file, starting fresh");
                return StateLoad::Missing;
            }
            Err(e) => return StateLoad::Corrupt(format!("{}: {}", self.path.display(), e)),
        };

        match serde_json::from_str::<ReconciliationState>(&content) {
            Ok(state) => {
                tracing::info!(
                    open = state.open_shifts.len(),
                    picked = state.picked_shifts.len(),
                    scheduled = state.scheduled_shifts.len(),
                    "loaded state"
                );
                StateLoad::Loaded(state)
            }
            Err(e) => StateLoad::Corrupt(format!("{}: {}", self.path.display(), e)),
        }
    }

    fn save(&self, state: &ReconciliationState) -> ShiftSyncResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        let content = serde_json::to_string_pretty(state)
            .map_err(|e| ShiftSyncError::Serialization(e.to_string()))?;

        // Write then rename so a killed run never leaves a half-written file.
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path).map_err(|e| {
            ShiftSyncError::State(format!("Could not replace {}: {}", self.path.display(), e))
        })?;

        tracing::info!(
            open = state.open_shifts.len(),
            picked = state.picked_shifts.len(),
            scheduled = state.scheduled_shifts.len(),
            "saved state"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::ScheduledShift;
    use crate::state::SnapshotRecord;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sample_state() -> ReconciliationState {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let shift = ScheduledShift::labeled(
            start.date(),
            start,
            start + chrono::Duration::hours(8),
            "R24",
            "OPEN 1",
        )
        .unwrap();

        ReconciliationState {
            last_run: Some(Utc.with_ymd_and_hms(2026, 2, 20, 12, 0, 0).unwrap()),
            open_shifts: vec![SnapshotRecord::new(shift, "evt-1".into())],
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_loads_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));

        assert!(matches!(store.load(), StateLoad::Missing));
    }

    #[test]
    fn corrupt_file_loads_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let load = JsonStateStore::new(&path).load();

        assert!(matches!(load, StateLoad::Corrupt(_)));
        assert!(load.into_state().is_empty());
    }

    #[test]
    fn saved_state_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("nested/state.json"));
        let state = sample_state();

        store.save(&state).unwrap();

        match store.load() {
            StateLoad::Loaded(loaded) => assert_eq!(loaded, state),
            other => panic!("Expected loaded state, got {:?}", other),
        }
        assert!(!dir.path().join("nested/state.json.tmp").exists());
    }

    #[test]
    fn save_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::new(dir.path().join("state.json"));

        store.save(&sample_state()).unwrap();
        store.save(&ReconciliationState::default()).unwrap();

        assert!(store.load().into_state().is_empty());
    }
}
