use anyhow::{anyhow, Result};
use chrono::Local;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::config::NarrationConfig;
use crate::model::Model;

/// Returned whenever script generation fails for any reason
pub const FALLBACK_SCRIPT: &str =
    "The news script could not be generated for this report.";

/// Generates the news-anchor script for the report via the narration
/// service. Never fails: any error while calling the service or parsing its
/// response degrades to the fixed fallback string.
pub async fn generate_news_script(
    client: &Client,
    cfg: &NarrationConfig,
    trending: &[Model],
    popular: &[Model],
) -> String {
    match request_script(client, cfg, trending, popular).await {
        Ok(script) => {
            info!("News script generated ({} chars)", script.len());
            script
        }
        Err(e) => {
            error!("News script generation failed: {:#}", e);
            FALLBACK_SCRIPT.to_string()
        }
    }
}

async fn request_script(
    client: &Client,
    cfg: &NarrationConfig,
    trending: &[Model],
    popular: &[Model],
) -> Result<String> {
    let prompt = build_prompt(trending, popular);

    let body = json!({
        "model": cfg.model,
        "max_tokens": cfg.max_tokens,
        "temperature": cfg.temperature,
        "messages": [{"role": "user", "content": prompt}],
    });

    let response = client
        .post(&cfg.api_url)
        .header("x-api-key", &cfg.api_key)
        .header("anthropic-version", "2023-06-01")
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow!("narration service returned status {}", status));
    }

    let message: Value = response.json().await?;
    extract_text(&message).ok_or_else(|| anyhow!("narration response contained no text block"))
}

/// Pulls the first text block out of a messages-API response
fn extract_text(message: &Value) -> Option<String> {
    message
        .get("content")?
        .as_array()?
        .iter()
        .find_map(|block| block.get("text").and_then(Value::as_str))
        .map(str::to_string)
}

/// Serializes a model the way the report consumes it (derived name, flat
/// stats, reasons and commits inline)
pub fn model_summary(model: &Model) -> Value {
    json!({
        "id": model.id,
        "name": model.name(),
        "author": model.author,
        "description": model.description,
        "downloads": model.stats.downloads,
        "likes": model.stats.likes,
        "recent_downloads": model.stats.recent_downloads,
        "tags": model.tags,
        "last_modified": model.last_modified,
        "trend_reasons": model.trend_reasons,
        "recent_commits": model.recent_commits,
        "private": model.private,
    })
}

fn build_prompt(trending: &[Model], popular: &[Model]) -> String {
    let data = json!({
        "trending_models": trending.iter().map(model_summary).collect::<Vec<_>>(),
        "popular_models": popular.iter().map(model_summary).collect::<Vec<_>>(),
        "date": Local::now().format("%Y-%m-%d").to_string(),
    });
    let data_json = serde_json::to_string_pretty(&data).unwrap_or_default();

    format!(
        "Based on the data below, write a news script meant to be read aloud by an AI news \
anchor, analyzing today's model trends. The data covers the latest trending models and the \
all-time most popular models on Hugging Face.

# Data
```json
{data_json}
```

Keep the following in mind while writing the script:
1. Analyze the trends (companies shipping multiple models, progress in notable fields, and so on)
2. Use the numbers effectively (work concrete figures such as download counts into the story)
3. Cover the movement by domain (audio, image, 3D generation, and so on)
4. Take a long-term view of how these models are being adopted
5. Point out what this suggests about the industry as a whole
6. Mention each model's trend reasons and recent update information

Write the script in natural spoken language that is easy for a listener to follow."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_text_from_content_blocks() {
        let message = json!({
            "content": [
                {"type": "text", "text": "Good morning, here are today's trends."}
            ]
        });
        assert_eq!(
            extract_text(&message).as_deref(),
            Some("Good morning, here are today's trends.")
        );
    }

    #[test]
    fn test_extract_text_skips_non_text_blocks() {
        let message = json!({
            "content": [
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "script"}
            ]
        });
        assert_eq!(extract_text(&message).as_deref(), Some("script"));
    }

    #[test]
    fn test_extract_text_on_malformed_response() {
        assert!(extract_text(&json!({})).is_none());
        assert!(extract_text(&json!({"content": "not an array"})).is_none());
        assert!(extract_text(&json!({"content": []})).is_none());
    }

    #[test]
    fn test_model_summary_derives_name_and_flattens_stats() {
        let model = crate::model::Model::from_api_response(
            &json!({"id": "org/model-x", "downloads": 5, "likes": 2}),
            None,
        );
        let summary = model_summary(&model);

        assert_eq!(summary["name"], "model-x");
        assert_eq!(summary["downloads"], 5);
        assert_eq!(summary["likes"], 2);
        assert_eq!(summary["author"], "Unknown");
    }

    #[test]
    fn test_prompt_embeds_both_lists() {
        let trending = vec![crate::model::Model::from_api_response(
            &json!({"id": "org/trendy"}),
            None,
        )];
        let popular = vec![crate::model::Model::from_api_response(
            &json!({"id": "org/evergreen"}),
            None,
        )];

        let prompt = build_prompt(&trending, &popular);
        assert!(prompt.contains("org/trendy"));
        assert!(prompt.contains("org/evergreen"));
        assert!(prompt.contains("trending_models"));
        assert!(prompt.contains("popular_models"));
    }
}
