//! Scraper and calendar operations via provider binaries.

pub mod protocol;
pub mod provider;

use std::collections::HashMap;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::ShiftSyncResult;
use crate::remote::protocol::{CreateEvent, DeleteEvent, DeleteStatus, EventDraft, ListShifts};
use crate::remote::provider::Provider;
use crate::shift::{ScheduledShift, ScrapedShifts, ShiftCategory};
use crate::source::{CalendarSink, DeleteOutcome, OpenShiftSource};

/// Provider-specific keys from a config table, passed through to the provider.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct ProviderParams(pub HashMap<String, toml::Value>);

impl From<&ProviderParams> for serde_json::Map<String, serde_json::Value> {
    fn from(params: &ProviderParams) -> Self {
        params
            .0
            .iter()
            .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k.clone(), v)))
            .collect()
    }
}

/// A `[scraper]` or `[calendar]` config table: the provider plus its settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderBinding {
    pub provider: Provider,
    #[serde(flatten)]
    pub params: ProviderParams,
}

impl ProviderBinding {
    pub fn new(provider: Provider, params: ProviderParams) -> Self {
        ProviderBinding { provider, params }
    }

    fn params(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::from(&self.params)
    }

    /// Use this binding as a calendar, writing event times in `zone`.
    pub fn calendar(&self, zone: Tz) -> RemoteCalendar<'_> {
        RemoteCalendar {
            binding: self,
            zone,
        }
    }
}

impl OpenShiftSource for ProviderBinding {
    async fn fetch(&self) -> ShiftSyncResult<ScrapedShifts> {
        tracing::info!(provider = self.provider.name(), "scraping open and picked shifts");
        let shifts = self
            .provider
            .call(ListShifts {
                params: self.params(),
            })
            .await?;
        tracing::info!(
            open = shifts.open.len(),
            picked = shifts.picked.len(),
            "scrape finished"
        );
        Ok(shifts)
    }
}

/// A calendar reached through a provider binary.
#[derive(Debug, Clone, Copy)]
pub struct RemoteCalendar<'a> {
    binding: &'a ProviderBinding,
    zone: Tz,
}

impl CalendarSink for RemoteCalendar<'_> {
    async fn create(
        &self,
        shift: &ScheduledShift,
        category: ShiftCategory,
        color: Option<&str>,
    ) -> ShiftSyncResult<String> {
        let created = self
            .binding
            .provider
            .call(CreateEvent {
                params: self.binding.params(),
                event: EventDraft::for_shift(shift, category, color, self.zone),
            })
            .await?;
        Ok(created.event_id)
    }

    async fn delete(&self, event_id: &str) -> DeleteOutcome {
        let result = self
            .binding
            .provider
            .call(DeleteEvent {
                params: self.binding.params(),
                event_id: event_id.to_string(),
            })
            .await;

        match result {
            Ok(DeleteStatus::Deleted) => DeleteOutcome::Deleted,
            Ok(DeleteStatus::AlreadyAbsent) => DeleteOutcome::AlreadyAbsent,
            Err(e) => DeleteOutcome::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_reads_from_toml_table() {
        let binding: ProviderBinding = toml::from_str(
            r#"
provider = "google"
google_calendar_id = "primary"
reminders = false
"#,
        )
        .unwrap();

        assert_eq!(binding.provider.name(), "google");

        let params = binding.params();
        assert_eq!(params["google_calendar_id"], "primary");
        assert_eq!(params["reminders"], false);
        assert!(!params.contains_key("provider"));
    }

    #[tokio::test]
    async fn delete_through_missing_provider_fails_softly() {
        let binding = ProviderBinding::new(
            Provider::from_name("definitely-not-installed-7f3a"),
            ProviderParams::default(),
        );

        let outcome = binding.calendar(chrono_tz::UTC).delete("evt-1").await;

        assert!(matches!(outcome, DeleteOutcome::Failed(_)));
    }
}
