use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::HubConfig;
use crate::model::{Commit, Model};

/// Browser-ish user agent; the hub serves the trending page differently to
/// unknown clients.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Maximum number of commits fetched and displayed per model
pub const COMMIT_LIMIT: usize = 3;

/// Client for the hub's model API (details, commits, popular listing).
///
/// Every request uses a 30 second timeout. Non-success statuses degrade to
/// None/empty per the error taxonomy; transport errors (timeouts, DNS)
/// propagate to the run-level handler.
pub struct HubClient {
    client: Client,
    api_url: String,
    base_url: String,
}

impl HubClient {
    pub fn new(cfg: &HubConfig) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: cfg.api_url.clone(),
            base_url: cfg.base_url.clone(),
        })
    }

    /// Fetches the full detail record for a model id. Returns None on any
    /// non-200 status; callers treat None as "skip this model".
    pub async fn get_model_details(&self, model_id: &str) -> Result<Option<Value>> {
        let url = format!("{}/{}", self.api_url, model_id);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::OK {
            Ok(Some(response.json().await?))
        } else {
            debug!(
                "Model detail fetch for {} returned status: {}",
                model_id,
                response.status()
            );
            Ok(None)
        }
    }

    /// Fetches the most recent commits for a model, newest first, truncated
    /// to `limit`. Non-200 responses degrade to an empty list; a commit with
    /// an unparseable date is skipped rather than failing the batch.
    pub async fn get_model_commits(&self, model_id: &str, limit: usize) -> Result<Vec<Commit>> {
        let url = format!("{}/api/models/{}/commits", self.base_url, model_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let entries: Vec<Value> = response.json().await?;
        let mut commits = Vec::new();

        for entry in entries.into_iter().take(limit) {
            let raw_date = entry.get("date").and_then(Value::as_str).unwrap_or("");
            let date = match parse_commit_date(raw_date) {
                Some(date) => date,
                None => {
                    warn!("Skipping commit with unparseable date: {:?}", raw_date);
                    continue;
                }
            };

            commits.push(Commit {
                title: entry
                    .get("title")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                date,
                description: entry
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }

        Ok(commits)
    }

    /// Fetches the all-time most downloaded models, each with its recent
    /// commits attached. Non-200 degrades to an empty list.
    pub async fn get_popular_models(&self, limit: usize) -> Result<Vec<Model>> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("sort", "downloads"),
                ("direction", "-1"),
                ("limit", &limit.to_string()),
                ("full", "true"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Popular models fetch returned status: {}", response.status());
            return Ok(Vec::new());
        }

        let entries: Vec<Value> = response.json().await?;
        let mut models = Vec::new();

        for data in &entries {
            let model = Model::from_api_response(data, None);
            let recent_commits = self.get_model_commits(&model.id, COMMIT_LIMIT).await?;
            models.push(Model {
                recent_commits,
                ..model
            });
        }

        info!("Fetched {} popular models", models.len());
        Ok(models)
    }
}

/// Parses an ISO-8601 timestamp as delivered by the hub. The hub uses a `Z`
/// suffix, which is substituted with an explicit `+00:00` offset before
/// parsing.
pub fn parse_commit_date(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = raw.replace('Z', "+00:00");
    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
