use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single commit in a model repository's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub title: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

/// Download/like counters for a model, plus the hub-supplied recent-activity
/// hint. The hint is free text ("1.2M downloads last month"), not a count,
/// and is only ever displayed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    pub downloads: u64,
    pub likes: u64,
    pub recent_downloads: Option<String>,
}

/// Category of a trend-reason annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendReasonKind {
    Update,
    Downloads,
    Description,
    Popularity,
}

/// Human-readable explanation of why a model is currently notable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendReason {
    #[serde(rename = "type")]
    pub kind: TrendReasonKind,
    pub description: String,
}

/// Lightweight per-model signal scraped from the trending page, distinct
/// from the authoritative API detail record. Two hints with the same id are
/// treated as wholly independent; identity is never unified across lists.
#[derive(Debug, Clone, Default)]
pub struct TrendHint {
    pub model_id: String,
    pub recent_downloads: Option<String>,
    pub card_description: Option<String>,
}

/// A model entity built from a hub API detail record. Constructed once with
/// empty commit/reason lists, then enriched exactly once before rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    pub id: String,
    pub author: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Raw last-modified string as delivered by the hub; display-only
    pub last_modified: String,
    pub private: bool,
    pub stats: Stats,
    pub recent_commits: Vec<Commit>,
    pub trend_reasons: Vec<TrendReason>,
}

impl Model {
    /// Builds a Model from a raw API payload with best-effort defaults.
    /// Construction never fails: any missing or malformed field degrades to
    /// a default (empty id, "Unknown" author, zero counts) instead of
    /// erroring. The optional trend hint only contributes the
    /// recent-downloads text; the detail record wins for everything else.
    pub fn from_api_response(data: &Value, hint: Option<&TrendHint>) -> Self {
        let stats = Stats {
            downloads: data.get("downloads").and_then(Value::as_u64).unwrap_or(0),
            likes: data.get("likes").and_then(Value::as_u64).unwrap_or(0),
            recent_downloads: hint.and_then(|h| h.recent_downloads.clone()),
        };

        Model {
            id: data
                .get("id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            author: data
                .get("author")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string(),
            description: data
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            tags: data
                .get("tags")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            last_modified: data
                .get("lastModified")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            private: data.get("private").and_then(Value::as_bool).unwrap_or(false),
            stats,
            recent_commits: Vec::new(),
            trend_reasons: Vec::new(),
        }
    }

    /// Short display name: the part of the id after the last `/`
    pub fn name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

/// Formats a count with thousands separators ("1,234,567")
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_api_response_with_empty_payload() {
        // Every optional field missing should yield defaults, not an error
        let model = Model::from_api_response(&json!({}), None);

        assert_eq!(model.id, "");
        assert_eq!(model.author, "Unknown");
        assert_eq!(model.description, None);
        assert!(model.tags.is_empty());
        assert_eq!(model.last_modified, "");
        assert!(!model.private);
        assert_eq!(model.stats.downloads, 0);
        assert_eq!(model.stats.likes, 0);
        assert_eq!(model.stats.recent_downloads, None);
        assert!(model.recent_commits.is_empty());
        assert!(model.trend_reasons.is_empty());
    }

    #[test]
    fn test_from_api_response_with_full_payload() {
        let data = json!({
            "id": "meta-llama/Llama-3-8B",
            "author": "meta-llama",
            "description": "An open weights model",
            "tags": ["text-generation", "llama"],
            "lastModified": "2024-04-18T12:00:00.000Z",
            "private": true,
            "downloads": 1234567,
            "likes": 4321,
        });
        let model = Model::from_api_response(&data, None);

        assert_eq!(model.id, "meta-llama/Llama-3-8B");
        assert_eq!(model.author, "meta-llama");
        assert_eq!(model.description.as_deref(), Some("An open weights model"));
        assert_eq!(model.tags, vec!["text-generation", "llama"]);
        assert!(model.private);
        assert_eq!(model.stats.downloads, 1234567);
        assert_eq!(model.stats.likes, 4321);
    }

    #[test]
    fn test_trend_hint_only_supplies_recent_downloads() {
        let hint = TrendHint {
            model_id: "org/model".to_string(),
            recent_downloads: Some("1.2M downloads".to_string()),
            card_description: Some("ignored here".to_string()),
        };
        let model = Model::from_api_response(&json!({"id": "org/model"}), Some(&hint));

        assert_eq!(
            model.stats.recent_downloads.as_deref(),
            Some("1.2M downloads")
        );
        // The card description feeds classification, never the entity itself
        assert_eq!(model.description, None);
    }

    #[test]
    fn test_name_is_segment_after_last_slash() {
        let model = Model::from_api_response(&json!({"id": "org/sub/model-x"}), None);
        assert_eq!(model.name(), "model-x");

        let bare = Model::from_api_response(&json!({"id": "standalone"}), None);
        assert_eq!(bare.name(), "standalone");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_trend_reason_serializes_kind_as_type() {
        let reason = TrendReason {
            kind: TrendReasonKind::Popularity,
            description: "🌟 Popular".to_string(),
        };
        let value = serde_json::to_value(&reason).unwrap();
        assert_eq!(value["type"], "popularity");
    }
}
