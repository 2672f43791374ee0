use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::core::rounding::round_entries;
use crate::core::workday::fill_admin_time;
use crate::core::{ConfigProvider, Pipeline, RawEntry, RoundingOutcome, TimeEntry};
use crate::utils::error::{Result, RounderError};

const API_KEY_ENV: &str = "TOGGL_API_KEY";

pub struct TogglClient {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl TogglClient {
    pub fn new(base_url: String, api_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_token,
        }
    }

    pub fn from_env(base_url: &str) -> Result<Self> {
        let api_token = std::env::var(API_KEY_ENV).map_err(|_| RounderError::ConfigError {
            message: format!(
                "'{}' environment variable not set. Please set this variable to continue.",
                API_KEY_ENV
            ),
        })?;
        Ok(Self::new(base_url.to_string(), api_token))
    }

    pub async fn fetch_entries(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Vec<RawEntry>> {
        let url = format!("{}/me/time_entries", self.base_url);
        tracing::debug!("Making API request to: {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.api_token, Some("api_token"))
            .query(&[
                ("start_date", start_date.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("end_date", end_date.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ])
            .send()
            .await?;

        tracing::debug!("API response status: {}", response.status());
        if !response.status().is_success() {
            return Err(RounderError::ApiStatusError {
                status: response.status().as_u16(),
                context: "fetching time entries".to_string(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let payload: Value = response.json().await?;
        let Value::Array(items) = payload else {
            return Err(RounderError::ApiStatusError {
                status: 200,
                context: "fetching time entries".to_string(),
                body: "expected a JSON array of time entries".to_string(),
            });
        };

        let mut entries = Vec::new();
        for item in items {
            if let Value::Object(object) = item {
                let mut entry = RawEntry::default();
                for (key, value) in object {
                    match key.as_str() {
                        "start" => entry.start = value.as_str().map(str::to_owned),
                        "stop" => entry.stop = value.as_str().map(str::to_owned),
                        // Recomputed from the rounded endpoints.
                        "duration" => {}
                        _ => {
                            entry.fields.insert(key, value);
                        }
                    }
                }
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// Pushes rounded entries back, one PUT per entry. A rejected update is
    /// logged and the batch continues; entries without workspace/entry ids
    /// cannot be addressed and are skipped.
    pub async fn update_entries(&self, entries: &[TimeEntry]) -> Result<usize> {
        let mut updated = 0;

        for entry in entries {
            let ids = (
                entry.fields.get("workspace_id").and_then(Value::as_i64),
                entry.fields.get("id").and_then(Value::as_i64),
            );
            let (Some(workspace_id), Some(id)) = ids else {
                tracing::warn!("Entry has no workspace_id/id, cannot update it");
                continue;
            };

            let url = format!(
                "{}/workspaces/{}/time_entries/{}",
                self.base_url, workspace_id, id
            );
            let response = self
                .client
                .put(&url)
                .basic_auth(&self.api_token, Some("api_token"))
                .json(&entry_to_json(entry))
                .send()
                .await?;

            if !response.status().is_success() {
                tracing::error!(
                    "Failed to update time entry {}: {} - {}",
                    id,
                    response.status(),
                    response.text().await.unwrap_or_default()
                );
                continue;
            }
            updated += 1;
        }

        Ok(updated)
    }

    /// Creates brand-new entries (admin filler), one POST per entry.
    pub async fn create_entries(&self, entries: &[TimeEntry]) -> Result<usize> {
        let mut created = 0;

        for entry in entries {
            let Some(workspace_id) = entry.fields.get("workspace_id").and_then(Value::as_i64)
            else {
                tracing::warn!("Entry has no workspace_id, cannot create it");
                continue;
            };

            let url = format!("{}/workspaces/{}/time_entries", self.base_url, workspace_id);
            let mut body = entry_to_json(entry);
            if let Value::Object(object) = &mut body {
                object.insert(
                    "created_with".to_string(),
                    Value::String("toggl-rounder".to_string()),
                );
            }

            let response = self
                .client
                .post(&url)
                .basic_auth(&self.api_token, Some("api_token"))
                .json(&body)
                .send()
                .await?;

            if !response.status().is_success() {
                tracing::error!(
                    "Failed to create time entry: {} - {}",
                    response.status(),
                    response.text().await.unwrap_or_default()
                );
                continue;
            }
            created += 1;
        }

        Ok(created)
    }
}

/// One flat JSON object per entry: rounded endpoints, recomputed duration,
/// passthrough fields as they arrived.
fn entry_to_json(entry: &TimeEntry) -> Value {
    let mut body = serde_json::Map::new();
    body.insert("start".to_string(), Value::String(entry.start.to_string()));
    body.insert("stop".to_string(), Value::String(entry.stop.to_string()));
    body.insert("duration".to_string(), Value::from(entry.duration));
    for (key, value) in &entry.fields {
        body.insert(key.clone(), value.clone());
    }
    Value::Object(body)
}

pub struct TogglPipeline<C: ConfigProvider> {
    client: TogglClient,
    config: C,
}

impl<C: ConfigProvider> TogglPipeline<C> {
    pub fn new(client: TogglClient, config: C) -> Self {
        Self { client, config }
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider> Pipeline for TogglPipeline<C> {
    async fn extract(&self) -> Result<Vec<RawEntry>> {
        let now = Utc::now();
        let since = now - Duration::days(self.config.days_back());
        let start_date = since.date_naive().and_time(NaiveTime::MIN).and_utc();

        tracing::info!(
            "Getting time entries from {} to now",
            start_date.format("%Y-%m-%d")
        );
        self.client.fetch_entries(start_date, now).await
    }

    async fn transform(&self, entries: Vec<RawEntry>) -> Result<RoundingOutcome> {
        let mut outcome = round_entries(&entries, self.config.on_invalid())?;
        if let Some(workday) = self.config.workday() {
            outcome.filler = fill_admin_time(&outcome.entries, workday);
        }
        Ok(outcome)
    }

    async fn load(&self, outcome: RoundingOutcome) -> Result<String> {
        let updated = self.client.update_entries(&outcome.entries).await?;
        let created = if outcome.filler.is_empty() {
            0
        } else {
            self.client.create_entries(&outcome.filler).await?
        };

        Ok(if created > 0 {
            format!("updated {} entries, created {} filler entries", updated, created)
        } else {
            format!("updated {} entries", updated)
        })
    }
}
