use anyhow::Result;
use chrono::Utc;
use owo_colors::OwoColorize;
use shiftsync_core::Settings;

use crate::render::PlanRender;
use crate::utils::tui;

/// Show what a sync would do. Nothing is written to the calendar or the state file.
pub async fn run(settings: &Settings, verbose: bool) -> Result<()> {
    let reconciler = super::reconciler(settings)?;

    let spinner = tui::create_spinner("Fetching shifts");
    let plan = reconciler.plan(Utc::now()).await;
    spinner.finish_and_clear();
    let plan = plan?;

    if let Some(last_run) = plan.last_run {
        println!(
            "{}\n",
            format!("Last synced {}", last_run.format("%Y-%m-%d %H:%M UTC")).dimmed()
        );
    }
    println!("{}", plan.render(verbose));

    Ok(())
}
