pub mod config;
pub mod state;
pub mod status;
pub mod sync;
pub mod verify;

use anyhow::Result;
use shiftsync_core::feed::IcsFeed;
use shiftsync_core::remote::{ProviderBinding, RemoteCalendar};
use shiftsync_core::state::JsonStateStore;
use shiftsync_core::{Reconciler, Settings, SyncPolicy};

type ConfiguredReconciler<'a> =
    Reconciler<IcsFeed, ProviderBinding, RemoteCalendar<'a>, JsonStateStore>;

/// Wire the configured feed, scraper, calendar and state file into a reconciler.
fn reconciler(settings: &Settings) -> Result<ConfiguredReconciler<'_>> {
    let policy = SyncPolicy::from_settings(settings)?;
    let feed = IcsFeed::new(&settings.feed()?.url)?;
    let scraper = settings.scraper()?.clone();
    let calendar = settings.calendar()?.calendar(policy.zone);
    let store = JsonStateStore::new(settings.state_path());

    Ok(Reconciler::new(policy, feed, scraper, calendar, store))
}
