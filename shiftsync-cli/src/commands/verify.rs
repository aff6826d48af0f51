use anyhow::{Result, bail};
use chrono::Utc;
use owo_colors::OwoColorize;
use shiftsync_core::source::DeleteOutcome;
use shiftsync_core::verify::check_calendar;
use shiftsync_core::{Settings, SyncPolicy};

use crate::utils::tui;

fn step(label: &str, ok: bool, detail: &str) {
    let status = if ok { "ok".green().to_string() } else { "failed".red().to_string() };
    println!("  {:<20} {} {}", label, status, detail.dimmed());
}

/// Write a throwaway event to the configured calendar and remove it again.
pub async fn run(settings: &Settings) -> Result<()> {
    let policy = SyncPolicy::from_settings(settings)?;
    let binding = settings.calendar()?;
    let calendar = binding.calendar(policy.zone);

    println!("Checking calendar provider {}\n", binding.provider.name().bold());

    let spinner = tui::create_spinner("Writing a test event");
    let check = check_calendar(&calendar, policy.local_now(Utc::now())).await;
    spinner.finish_and_clear();

    let check = match check {
        Ok(check) => check,
        Err(e) => {
            step("Create test event", false, &e.to_string());
            bail!("The calendar did not accept a new event. Check the provider's write access.");
        }
    };
    step("Create test event", true, &format!("id={}", check.event_id));

    match &check.cleanup {
        DeleteOutcome::Deleted => step("Delete test event", true, ""),
        DeleteOutcome::AlreadyAbsent => step("Delete test event", true, "already gone"),
        DeleteOutcome::Failed(reason) => step("Delete test event", false, reason),
    }

    if !check.passed() {
        bail!(
            "Created event {} but could not delete it; remove it by hand",
            check.event_id
        );
    }

    println!("\n{}", "Calendar is ready for shiftsync".green());
    Ok(())
}
