//! TUI rendering traits for shiftsync types.
//!
//! Extension traits that add colored terminal rendering to shiftsync-core
//! types using owo_colors.

use owo_colors::OwoColorize;
use shiftsync_core::ScheduledShift;
use shiftsync_core::conflict::ExcludedCandidate;
use shiftsync_core::diff::DiffKind;
use shiftsync_core::reconcile::{CategoryPlan, CategorySummary, ReconcilePlan, RunReport, Warning};
use shiftsync_core::shift::ShiftCategory;
use shiftsync_core::state::{ReconciliationState, SnapshotRecord};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for DiffKind {
    fn render(&self) -> String {
        let symbol = self.symbol();
        match self {
            DiffKind::Create => symbol.green().to_string(),
            DiffKind::Delete => symbol.red().to_string(),
        }
    }
}

impl Render for ShiftCategory {
    fn render(&self) -> String {
        let title = match self {
            ShiftCategory::Open => "Open shifts",
            ShiftCategory::Picked => "Picked-up shifts",
            ShiftCategory::Scheduled => "My schedule",
        };
        title.bold().to_string()
    }
}

impl Render for ScheduledShift {
    fn render(&self) -> String {
        let name = match &self.label {
            Some(label) => format!("{} {}", label, self.assignment),
            None => self.assignment.clone(),
        };
        let time = format!(
            "{} {}-{}",
            self.span.date().format("%a %b %-d"),
            self.span.start_time().format("%H:%M"),
            self.span.end_time().format("%H:%M")
        );
        format!("{} {}", name, time.dimmed())
    }
}

impl Render for Warning {
    fn render(&self) -> String {
        match self.category {
            Some(category) => format!("{} [{}] {}", "!".yellow(), category, self.message.yellow()),
            None => format!("{} {}", "!".yellow(), self.message.yellow()),
        }
    }
}

/// Threshold for compact view (show counts instead of individual shifts)
const COMPACT_THRESHOLD: usize = 5;

fn render_change(kind: DiffKind, shift: &ScheduledShift) -> String {
    let line = match kind {
        DiffKind::Create => shift.render().green().to_string(),
        DiffKind::Delete => shift.render().red().to_string(),
    };
    format!("   {} {}", kind.render(), line)
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

fn render_category_plan(plan: &CategoryPlan, verbose: bool, lines: &mut Vec<String>) {
    lines.push(plan.category.render());

    if !plan.enabled {
        lines.push("   Sync disabled, calendar left as is".dimmed().to_string());
        return;
    }

    let diff = &plan.diff;
    if diff.is_empty() && plan.rescued.is_empty() {
        lines.push("   No changes".dimmed().to_string());
        return;
    }

    if verbose || diff.to_add.len() + diff.to_remove.len() <= COMPACT_THRESHOLD {
        for record in &diff.to_remove {
            lines.push(render_change(DiffKind::Delete, &record.shift));
        }
        for shift in &diff.to_add {
            lines.push(render_change(DiffKind::Create, shift));
        }
    } else {
        let adds = diff.to_add.len();
        let removes = diff.to_remove.len();
        if adds > 0 {
            let label = format!("({} new {})", adds, pluralize("shift", adds));
            lines.push(format!("   {} {}", "+".green(), label.green()));
        }
        if removes > 0 {
            let label = format!("({} removed {})", removes, pluralize("shift", removes));
            lines.push(format!("   {} {}", "-".red(), label.red()));
        }
    }

    for record in &plan.rescued {
        lines.push(format!(
            "   {} {}",
            "=".dimmed(),
            format!("{} (already started, kept)", record.shift.render()).dimmed()
        ));
    }
}

fn render_filtered(filtered: &[ExcludedCandidate], verbose: bool, lines: &mut Vec<String>) {
    if filtered.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(
        format!(
            "{} open {} skipped (conflict with your schedule)",
            filtered.len(),
            pluralize("shift", filtered.len())
        )
        .dimmed()
        .to_string(),
    );

    if verbose {
        for excluded in filtered {
            lines.push(format!(
                "   {} {}",
                excluded.shift.render(),
                format!("- {}", excluded.reason).dimmed()
            ));
        }
    }
}

/// Rendering with a compact/verbose switch.
pub trait PlanRender {
    fn render(&self, verbose: bool) -> String;
}

impl PlanRender for ReconcilePlan {
    fn render(&self, verbose: bool) -> String {
        let mut lines = Vec::new();

        for (i, plan) in self.categories.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            render_category_plan(plan, verbose, &mut lines);
        }

        render_filtered(&self.filtered_out, verbose, &mut lines);

        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.extend(self.warnings.iter().map(Render::render));
        }

        lines.join("\n")
    }
}

impl Render for CategorySummary {
    fn render(&self) -> String {
        if !self.enabled {
            return format!("{:<10} {}", self.category, "disabled".dimmed());
        }

        let mut parts = vec![
            format!("{} added", self.added),
            format!("{} removed", self.removed + self.already_absent),
            format!("{} kept", self.kept),
        ];
        if self.failed > 0 {
            parts.push(format!("{} failed", self.failed).red().to_string());
        }
        format!("{:<10} {}", self.category, parts.join(", "))
    }
}

impl Render for RunReport {
    fn render(&self) -> String {
        let mut lines: Vec<String> = self.categories.iter().map(Render::render).collect();

        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.extend(self.warnings.iter().map(Render::render));
        }

        lines.push(String::new());
        if self.is_clean() {
            lines.push("Sync complete".green().to_string());
        } else {
            let count = self.warnings.len();
            lines.push(
                format!("Sync finished with {} {}", count, pluralize("warning", count))
                    .yellow()
                    .to_string(),
            );
        }

        lines.join("\n")
    }
}

fn render_records(records: &[SnapshotRecord], lines: &mut Vec<String>) {
    if records.is_empty() {
        lines.push("   (none)".dimmed().to_string());
        return;
    }
    for record in records {
        lines.push(format!(
            "   {} {}",
            record.shift.render(),
            record.event_id.dimmed()
        ));
    }
}

impl Render for ReconciliationState {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        let last_run = self
            .last_run
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "never".into());
        lines.push(format!("{} {}", "Last run:".dimmed(), last_run));

        for category in ShiftCategory::ALL {
            let records = self.records(category);
            lines.push(String::new());
            lines.push(format!("{} ({})", category.render(), records.len()));
            render_records(records, &mut lines);
        }

        lines.join("\n")
    }
}
