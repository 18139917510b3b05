use anyhow::{bail, Result};
use chrono::Local;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use super::{blocks, narration};
use crate::config::{NarrationConfig, NotionConfig};
use crate::model::Model;

const NOTION_PAGES_URL: &str = "https://api.notion.com/v1/pages";
const NOTION_VERSION: &str = "2022-06-28";

/// Publishes the daily report as a new Notion page.
///
/// Narration failures degrade to a fallback script inside the page, but a
/// failure to create the page itself is an error: it means the run produced
/// no visible output, and it propagates to the run boundary.
pub struct NotionPublisher {
    client: Client,
    notion: NotionConfig,
    narration: NarrationConfig,
    hub_base_url: String,
}

impl NotionPublisher {
    pub fn new(
        notion: NotionConfig,
        narration: NarrationConfig,
        hub_base_url: String,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            notion,
            narration,
            hub_base_url,
        })
    }

    /// Generates the news script, assembles the page payload, and creates
    /// the page. Returns the shareable page URL.
    pub async fn create_page(&self, trending: &[Model], popular: &[Model]) -> Result<String> {
        let today = Local::now().format("%Y-%m-%d").to_string();
        info!("Creating report page for {}", today);

        let news_script =
            narration::generate_news_script(&self.client, &self.narration, trending, popular)
                .await;

        let body = json!({
            "parent": {"database_id": self.notion.database_id},
            "properties": blocks::page_properties(&today),
            "children": blocks::page_children(trending, popular, &news_script, &self.hub_base_url),
        });

        let response = self
            .client
            .post(NOTION_PAGES_URL)
            .bearer_auth(&self.notion.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("page creation failed with status {}: {}", status, detail);
        }

        let page: Value = response.json().await?;
        let page_id = page.get("id").and_then(Value::as_str).unwrap_or_default();
        let page_url = format!("https://notion.so/{}", page_id.replace('-', ""));
        info!("Created report page: {}", page_url);

        Ok(page_url)
    }
}
