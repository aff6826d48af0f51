use anyhow::Result;
use chrono::Utc;
use shiftsync_core::Settings;

use crate::render::{PlanRender, Render};
use crate::utils::tui;

pub async fn run(settings: &Settings, json: bool, verbose: bool) -> Result<()> {
    let reconciler = super::reconciler(settings)?;

    let spinner = (!json).then(|| tui::create_spinner("Fetching shifts"));
    let plan = reconciler.plan(Utc::now()).await;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    let plan = plan?;

    if !json {
        println!("{}\n", plan.render(verbose));
    }

    let spinner = (!json && plan.has_changes()).then(|| tui::create_spinner("Updating calendar"));
    let report = reconciler.apply(plan).await;
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    let report = report?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render());
    }

    Ok(())
}
