//! Reconciliation runs.
//!
//! A run is split in two: [`Reconciler::plan`] loads the previous state,
//! acquires the three shift sets, filters open shifts against the schedule
//! and diffs every category; [`Reconciler::apply`] performs the calendar
//! calls and persists the new state. Only acquisition failures and a failed
//! save abort a run; everything else ends up as a [`Warning`] in the report.

mod plan;
mod report;

pub use plan::{CategoryPlan, ReconcilePlan, scheduled_from_scraped};
pub use report::{CategorySummary, RunReport, Warning, WarningKind};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::config::SyncPolicy;
use crate::conflict::partition_candidates;
use crate::diff::ShiftDiff;
use crate::error::ShiftSyncResult;
use crate::shift::{ScheduledShift, ShiftCategory};
use crate::source::{CalendarSink, DeleteOutcome, OpenShiftSource, PersonalScheduleSource};
use crate::state::{ReconciliationState, SnapshotRecord, StateLoad, StateStore};
use report::push_warning;

pub struct Reconciler<P, O, C, S> {
    policy: SyncPolicy,
    personal: P,
    open_shifts: O,
    calendar: C,
    store: S,
}

impl<P, O, C, S> Reconciler<P, O, C, S>
where
    P: PersonalScheduleSource,
    O: OpenShiftSource,
    C: CalendarSink,
    S: StateStore,
{
    pub fn new(policy: SyncPolicy, personal: P, open_shifts: O, calendar: C, store: S) -> Self {
        Reconciler {
            policy,
            personal,
            open_shifts,
            calendar,
            store,
        }
    }

    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Plan and apply in one go.
    pub async fn run(&self) -> ShiftSyncResult<RunReport> {
        let plan = self.plan(Utc::now()).await?;
        self.apply(plan).await
    }

    /// Work out what has to change, without touching the calendar or the state.
    pub async fn plan(&self, now: DateTime<Utc>) -> ShiftSyncResult<ReconcilePlan> {
        let mut warnings = Vec::new();

        let previous = match self.store.load() {
            StateLoad::Loaded(state) => state,
            StateLoad::Missing => ReconciliationState::default(),
            StateLoad::Corrupt(reason) => {
                push_warning(
                    &mut warnings,
                    Warning::new(
                        WarningKind::State,
                        None,
                        format!("Could not read previous state, starting fresh: {reason}"),
                    ),
                );
                ReconciliationState::default()
            }
        };

        let personal = self
            .personal
            .fetch(self.policy.lookahead_days, self.policy.zone)
            .await?;
        let scraped = self.open_shifts.fetch().await?;

        let open = scheduled_from_scraped(scraped.open, ShiftCategory::Open, &mut warnings);
        let picked = scheduled_from_scraped(scraped.picked, ShiftCategory::Picked, &mut warnings);
        tracing::info!(
            personal = personal.len(),
            open = open.len(),
            picked = picked.len(),
            "acquired shifts"
        );

        // Hidden shifts still count as busy time.
        let reference: Vec<ScheduledShift> = personal.iter().chain(&picked).cloned().collect();
        let (available, filtered_out) =
            partition_candidates(open, &reference, self.policy.min_rest());
        tracing::info!(
            available = available.len(),
            filtered = filtered_out.len(),
            "filtered open shifts"
        );

        let (hidden, shown): (Vec<_>, Vec<_>) = personal
            .into_iter()
            .partition(|s| self.policy.is_excluded_from_display(s));
        if !hidden.is_empty() {
            tracing::debug!(count = hidden.len(), "personal shifts hidden by excluded labels");
        }

        let now_local = self.policy.local_now(now);
        let categories = ShiftCategory::ALL
            .into_iter()
            .map(|category| {
                let current = match category {
                    ShiftCategory::Open => &available,
                    ShiftCategory::Picked => &picked,
                    ShiftCategory::Scheduled => &shown,
                };
                self.plan_category(category, current, previous.records(category), now_local)
            })
            .collect();

        Ok(ReconcilePlan {
            now,
            last_run: previous.last_run,
            categories,
            filtered_out,
            warnings,
        })
    }

    fn plan_category(
        &self,
        category: ShiftCategory,
        current: &[ScheduledShift],
        previous: &[SnapshotRecord],
        now_local: NaiveDateTime,
    ) -> CategoryPlan {
        if !self.policy.is_enabled(category) {
            tracing::info!(%category, kept = previous.len(), "sync disabled, keeping previous records");
            return CategoryPlan::carried_forward(category, previous);
        }

        let mut diff = ShiftDiff::compute(current, previous);
        let rescued = if self.policy.protect_started {
            diff.rescue_started(now_local)
        } else {
            Vec::new()
        };
        for record in &rescued {
            tracing::info!(%category, shift = %record.shift, "keeping shift that has already started");
        }

        tracing::info!(
            %category,
            add = diff.to_add.len(),
            remove = diff.to_remove.len(),
            unchanged = diff.unchanged.len(),
            "planned changes"
        );

        CategoryPlan {
            category,
            enabled: true,
            diff,
            rescued,
        }
    }

    /// Make the calendar calls a plan asks for and save the resulting state.
    pub async fn apply(&self, plan: ReconcilePlan) -> ShiftSyncResult<RunReport> {
        let ReconcilePlan {
            now,
            categories,
            filtered_out,
            mut warnings,
            ..
        } = plan;

        let mut state = ReconciliationState {
            last_run: Some(now),
            ..Default::default()
        };
        let mut summaries = Vec::with_capacity(categories.len());

        for plan in categories {
            let category = plan.category;
            let mut summary = CategorySummary::new(category, plan.enabled);
            summary.kept = plan.diff.unchanged.len();
            summary.rescued = plan.rescued.len();

            let mut records = plan.diff.unchanged;

            for record in plan.diff.to_remove {
                match self.calendar.delete(&record.event_id).await {
                    DeleteOutcome::Deleted => {
                        tracing::info!(%category, shift = %record.shift, "removed event");
                        summary.removed += 1;
                    }
                    DeleteOutcome::AlreadyAbsent => {
                        tracing::info!(%category, shift = %record.shift, "event was already gone");
                        summary.already_absent += 1;
                    }
                    DeleteOutcome::Failed(reason) => {
                        summary.failed += 1;
                        push_warning(
                            &mut warnings,
                            Warning::new(
                                WarningKind::ItemApply,
                                Some(category),
                                format!("Failed to remove {}: {}", record.shift, reason),
                            ),
                        );
                        records.push(record);
                    }
                }
            }

            let color = self.policy.color(category);
            for shift in plan.diff.to_add {
                match self.calendar.create(&shift, category, color).await {
                    Ok(event_id) => {
                        tracing::info!(%category, %shift, %event_id, "created event");
                        summary.added += 1;
                        records.push(SnapshotRecord::new(shift, event_id));
                    }
                    Err(e) => {
                        summary.failed += 1;
                        push_warning(
                            &mut warnings,
                            Warning::new(
                                WarningKind::ItemApply,
                                Some(category),
                                format!("Failed to create {}: {}", shift, e),
                            ),
                        );
                    }
                }
            }

            records.sort_by_cached_key(SnapshotRecord::key);
            *state.records_mut(category) = records;
            summaries.push(summary);
        }

        self.store.save(&state)?;

        Ok(RunReport {
            started_at: now,
            finished_at: Utc::now(),
            categories: summaries,
            filtered_out,
            warnings,
        })
    }
}
