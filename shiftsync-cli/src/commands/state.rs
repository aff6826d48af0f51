use anyhow::{Result, bail};
use owo_colors::OwoColorize;
use shiftsync_core::Settings;
use shiftsync_core::state::{JsonStateStore, StateLoad, StateStore};

use crate::render::Render;

pub fn run(settings: &Settings) -> Result<()> {
    let store = JsonStateStore::new(settings.state_path());
    println!("{} {}", "State file:".dimmed(), store.path().display());

    match store.load() {
        StateLoad::Loaded(state) => println!("{}", state.render()),
        StateLoad::Missing => println!("No state saved yet. Run `shiftsync sync` first."),
        StateLoad::Corrupt(reason) => bail!("State file could not be read: {}", reason),
    }

    Ok(())
}
