use anyhow::Result;
use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveTime};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::hub::{HubClient, COMMIT_LIMIT};
use crate::model::{Commit, Model, TrendHint};
use crate::report::NotionPublisher;
use crate::scrape::TrendScraper;

/// How often the schedule loop wakes up to check the clock
const TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Source of scraped trending hints
#[async_trait]
pub trait TrendSource {
    async fn get_trending_models(&self) -> Vec<TrendHint>;
}

/// Source of authoritative model records from the hub API
#[async_trait]
pub trait ModelSource {
    async fn get_model_details(&self, model_id: &str) -> Result<Option<Value>>;
    async fn get_model_commits(&self, model_id: &str, limit: usize) -> Result<Vec<Commit>>;
    async fn get_popular_models(&self, limit: usize) -> Result<Vec<Model>>;
}

/// Destination for the rendered report
#[async_trait]
pub trait ReportSink {
    async fn create_page(&self, trending: &[Model], popular: &[Model]) -> Result<String>;
}

#[async_trait]
impl TrendSource for TrendScraper {
    async fn get_trending_models(&self) -> Vec<TrendHint> {
        TrendScraper::get_trending_models(self).await
    }
}

#[async_trait]
impl ModelSource for HubClient {
    async fn get_model_details(&self, model_id: &str) -> Result<Option<Value>> {
        HubClient::get_model_details(self, model_id).await
    }

    async fn get_model_commits(&self, model_id: &str, limit: usize) -> Result<Vec<Commit>> {
        HubClient::get_model_commits(self, model_id, limit).await
    }

    async fn get_popular_models(&self, limit: usize) -> Result<Vec<Model>> {
        HubClient::get_popular_models(self, limit).await
    }
}

#[async_trait]
impl ReportSink for NotionPublisher {
    async fn create_page(&self, trending: &[Model], popular: &[Model]) -> Result<String> {
        NotionPublisher::create_page(self, trending, popular).await
    }
}

/// Drives one daily run: scrape hints, build and enrich trending models,
/// fetch popular models, publish when both lists are non-empty.
pub struct ModelTracker<T, M, S> {
    trends: T,
    models: M,
    sink: S,
    model_limit: usize,
}

impl<T, M, S> ModelTracker<T, M, S>
where
    T: TrendSource,
    M: ModelSource,
    S: ReportSink,
{
    pub fn new(trends: T, models: M, sink: S, model_limit: usize) -> Self {
        Self {
            trends,
            models,
            sink,
            model_limit,
        }
    }

    /// Executes a single update. An empty trending or popular list is a
    /// logged non-fatal outcome (no page is published); publish failures and
    /// transport errors propagate to the caller.
    pub async fn run_update(&self) -> Result<()> {
        info!("=== Daily update started ===");

        let hints = self.trends.get_trending_models().await;
        let mut trending = Vec::new();

        for hint in &hints {
            // A missing detail record means "skip this model"
            let Some(details) = self.models.get_model_details(&hint.model_id).await? else {
                debug!("No detail record for {}, skipping", hint.model_id);
                continue;
            };

            let model = Model::from_api_response(&details, Some(hint));
            let commits = self.models.get_model_commits(&model.id, COMMIT_LIMIT).await?;
            trending.push(crate::enrich::enrich(model, Some(hint), commits));
        }

        let popular = self.models.get_popular_models(self.model_limit).await?;

        if !trending.is_empty() && !popular.is_empty() {
            self.sink.create_page(&trending, &popular).await?;
            info!("Update complete");
        } else {
            error!(
                "Model fetch failed: {} trending, {} popular",
                trending.len(),
                popular.len()
            );
        }

        info!("=== Daily update finished ===");
        Ok(())
    }

    /// Long-running mode: sleeps in fixed increments and fires the update
    /// once per day when the configured wall-clock time has arrived. A
    /// failed run is logged and abandoned until the next day's tick. Ctrl-C
    /// exits the loop cleanly.
    pub async fn run_scheduled(&self, update_time: &str) -> Result<()> {
        let target = NaiveTime::parse_from_str(update_time, "%H:%M")?;
        info!("Scheduler started, daily run at {}", update_time);

        let mut last_run: Option<NaiveDate> = None;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupt received, shutting down");
                    return Ok(());
                }
                _ = tokio::time::sleep(TICK_INTERVAL) => {}
            }

            let now = Local::now();
            if now.time() >= target && last_run != Some(now.date_naive()) {
                last_run = Some(now.date_naive());
                if let Err(e) = self.run_update().await {
                    error!("Scheduled run failed: {:#}", e);
                }
            }
        }
    }
}
