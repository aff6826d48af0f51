//! Core of shiftsync: keeps a calendar in step with a shift schedule.
//!
//! This crate provides:
//! - `time_span`, `shift` and `conflict` for the shift model and rest rules
//! - `diff` and `state` for comparing runs against the persisted snapshot
//! - `feed` and `remote` for the personal iCal feed and provider binaries
//! - `reconcile` for the run itself
//! - `verify` for checking that the calendar accepts writes

pub mod config;
pub mod conflict;
pub mod constants;
pub mod diff;
pub mod error;
pub mod feed;
pub mod ics;
pub mod recurrence;
pub mod reconcile;
pub mod remote;
pub mod shift;
pub mod source;
pub mod state;
pub mod time_span;
pub mod verify;

pub use config::{Settings, SyncPolicy};
pub use error::{ShiftSyncError, ShiftSyncResult};
pub use reconcile::{Reconciler, RunReport};
pub use shift::{ScheduledShift, ShiftCategory, ShiftKey};
