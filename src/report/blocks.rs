//! Notion block-JSON construction for the daily report page.
//!
//! Only builds payloads; submitting them is the publisher's job.

use serde_json::{json, Value};

use crate::model::{format_count, Model};

/// Model descriptions are cut to this many characters on the page
const DESCRIPTION_BLOCK_LEN: usize = 500;

/// Commits shown per model
const COMMIT_DISPLAY_LIMIT: usize = 3;

/// Tags shown in the stats line
const TAG_DISPLAY_LIMIT: usize = 5;

fn rich_text(content: &str) -> Value {
    json!([{"type": "text", "text": {"content": content}}])
}

fn heading_1(content: &str) -> Value {
    json!({
        "object": "block",
        "type": "heading_1",
        "heading_1": {"rich_text": rich_text(content)},
    })
}

fn heading_3(content: &str) -> Value {
    json!({
        "object": "block",
        "type": "heading_3",
        "heading_3": {"rich_text": rich_text(content)},
    })
}

fn paragraph(content: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": {"rich_text": rich_text(content)},
    })
}

fn callout(content: &str, emoji: &str) -> Value {
    json!({
        "object": "block",
        "type": "callout",
        "callout": {
            "rich_text": rich_text(content),
            "icon": {"emoji": emoji},
        },
    })
}

fn link_paragraph(content: &str, url: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": {
            "rich_text": [{
                "type": "text",
                "text": {"content": content, "link": {"url": url}},
            }],
        },
    })
}

fn divider() -> Value {
    json!({"object": "block", "type": "divider", "divider": {}})
}

/// Page properties for the report: title, date, and a fixed catch-up tag
pub fn page_properties(today: &str) -> Value {
    json!({
        "title": {
            "title": [{"text": {"content": format!("HF Models Report - {}", today)}}]
        },
        "Date": {"date": {"start": today}},
        "Tags": {"multi_select": [{"name": "catch-up"}]},
    })
}

/// Builds the full ordered block sequence for the report page:
/// narration → trending section → divider → popular section.
pub fn page_children(
    trending: &[Model],
    popular: &[Model],
    news_script: &str,
    hub_base_url: &str,
) -> Vec<Value> {
    let mut children = vec![
        heading_1("📰 AI News Anchor Script"),
        callout(news_script, "🎤"),
        divider(),
        heading_1("🔥 Real-Time Trending Models"),
        paragraph("Models attracting attention right now\n\n"),
    ];

    for (idx, model) in trending.iter().enumerate() {
        children.extend(model_blocks(model, idx + 1, true, hub_base_url));
    }

    children.push(divider());
    children.push(heading_1("🌟 Most Downloaded Models"));
    children.push(paragraph("Models with the highest all-time downloads\n\n"));

    for (idx, model) in popular.iter().enumerate() {
        children.extend(model_blocks(model, idx + 1, false, hub_base_url));
    }

    children
}

/// Blocks for a single model entry. The trend-reasons callout only appears
/// for trending models.
pub fn model_blocks(model: &Model, idx: usize, is_trending: bool, hub_base_url: &str) -> Vec<Value> {
    let mut blocks = vec![heading_3(&format!("{}. {}", idx, model.id))];

    if let Some(description) = &model.description {
        // Truncated to 500 chars; ellipsis appended unconditionally
        let snippet: String = description.chars().take(DESCRIPTION_BLOCK_LEN).collect();
        blocks.push(paragraph(&format!("{}...", snippet)));
    }

    if is_trending && !model.trend_reasons.is_empty() {
        let reasons = model
            .trend_reasons
            .iter()
            .map(|reason| reason.description.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        blocks.push(callout(&reasons, "🔥"));
    }

    blocks.push(paragraph(&stats_text(model)));

    if !model.recent_commits.is_empty() {
        blocks.push(heading_3("Recent Updates"));

        for commit in model.recent_commits.iter().take(COMMIT_DISPLAY_LIMIT) {
            let mut commit_text = format!(
                "📅 {}\n🔄 {}",
                commit.date.format("%Y-%m-%d %H:%M"),
                commit.title
            );
            if let Some(description) = &commit.description {
                commit_text.push_str(&format!("\n📝 {}", description));
            }
            blocks.push(callout(&commit_text, "📌"));
        }
    }

    blocks.push(link_paragraph(
        "🔗 View on Hugging Face",
        &format!("{}/{}", hub_base_url, model.id),
    ));
    blocks.push(divider());

    blocks
}

fn stats_text(model: &Model) -> String {
    let mut text = format!(
        "👤 Author: {}\n⭐ Likes: {}\n📥 Downloads: {}\n",
        model.author,
        format_count(model.stats.likes),
        format_count(model.stats.downloads),
    );

    if let Some(recent) = &model.stats.recent_downloads {
        text.push_str(&format!("📈 Recent Downloads: {}\n", recent));
    }

    let tags: Vec<&str> = model
        .tags
        .iter()
        .take(TAG_DISPLAY_LIMIT)
        .map(String::as_str)
        .collect();
    text.push_str(&format!(
        "🏷 Tags: {}\n📝 Last Modified: {}",
        tags.join(", "),
        model.last_modified
    ));

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Commit, TrendReason, TrendReasonKind};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn model_with(description: Option<String>) -> Model {
        let mut model = Model::from_api_response(
            &json!({"id": "org/model", "author": "org", "downloads": 1500, "likes": 10}),
            None,
        );
        model.description = description;
        model
    }

    fn block_type(block: &Value) -> &str {
        block["type"].as_str().unwrap()
    }

    #[test]
    fn test_model_blocks_start_with_ranked_heading() {
        let blocks = model_blocks(&model_with(None), 4, false, "https://huggingface.co");
        assert_eq!(block_type(&blocks[0]), "heading_3");
        assert_eq!(
            blocks[0]["heading_3"]["rich_text"][0]["text"]["content"],
            "4. org/model"
        );
    }

    #[test]
    fn test_description_of_exactly_500_chars_still_gets_ellipsis() {
        let description = "y".repeat(500);
        let blocks = model_blocks(&model_with(Some(description.clone())), 1, false, "");

        let content = blocks[1]["paragraph"]["rich_text"][0]["text"]["content"]
            .as_str()
            .unwrap();
        assert_eq!(content, format!("{}...", description));
    }

    #[test]
    fn test_long_description_is_cut_to_500_chars() {
        let blocks = model_blocks(&model_with(Some("z".repeat(800))), 1, false, "");
        let content = blocks[1]["paragraph"]["rich_text"][0]["text"]["content"]
            .as_str()
            .unwrap();
        assert_eq!(content.chars().count(), 503); // 500 + "..."
    }

    #[test]
    fn test_trend_reason_callout_only_for_trending() {
        let mut model = model_with(None);
        model.trend_reasons.push(TrendReason {
            kind: TrendReasonKind::Downloads,
            description: "📈 Recent Activity: lots".to_string(),
        });

        let trending_blocks = model_blocks(&model, 1, true, "");
        assert!(trending_blocks.iter().any(|b| block_type(b) == "callout"));

        let popular_blocks = model_blocks(&model, 1, false, "");
        assert!(!popular_blocks.iter().any(|b| block_type(b) == "callout"));
    }

    #[test]
    fn test_commits_are_capped_at_three() {
        let mut model = model_with(None);
        for i in 0..5 {
            model.recent_commits.push(Commit {
                title: format!("commit {}", i),
                date: Utc.with_ymd_and_hms(2024, 1, 1 + i, 0, 0, 0).unwrap(),
                description: None,
            });
        }

        let blocks = model_blocks(&model, 1, false, "");
        let commit_callouts = blocks.iter().filter(|b| block_type(b) == "callout").count();
        assert_eq!(commit_callouts, 3);
    }

    #[test]
    fn test_link_block_points_at_hub_page() {
        let blocks = model_blocks(&model_with(None), 1, false, "https://huggingface.co");
        let link = blocks
            .iter()
            .find(|b| b["paragraph"]["rich_text"][0]["text"]["link"].is_object())
            .unwrap();
        assert_eq!(
            link["paragraph"]["rich_text"][0]["text"]["link"]["url"],
            "https://huggingface.co/org/model"
        );
    }

    #[test]
    fn test_page_children_section_order() {
        let trending = vec![model_with(None)];
        let popular = vec![model_with(None)];
        let children = page_children(&trending, &popular, "the script", "");

        // Narration first
        assert_eq!(block_type(&children[0]), "heading_1");
        assert_eq!(
            children[0]["heading_1"]["rich_text"][0]["text"]["content"],
            "📰 AI News Anchor Script"
        );
        assert_eq!(
            children[1]["callout"]["rich_text"][0]["text"]["content"],
            "the script"
        );

        // Both section headers present, trending before popular
        let headings: Vec<&str> = children
            .iter()
            .filter(|b| block_type(b) == "heading_1")
            .map(|b| b["heading_1"]["rich_text"][0]["text"]["content"].as_str().unwrap())
            .collect();
        assert_eq!(
            headings,
            vec![
                "📰 AI News Anchor Script",
                "🔥 Real-Time Trending Models",
                "🌟 Most Downloaded Models",
            ]
        );
    }

    #[test]
    fn test_page_properties_shape() {
        let properties = page_properties("2024-04-18");
        assert_eq!(
            properties["title"]["title"][0]["text"]["content"],
            "HF Models Report - 2024-04-18"
        );
        assert_eq!(properties["Date"]["date"]["start"], "2024-04-18");
        assert_eq!(properties["Tags"]["multi_select"][0]["name"], "catch-up");
    }

    #[test]
    fn test_stats_text_includes_recent_downloads_when_present() {
        let mut model = model_with(None);
        assert!(!stats_text(&model).contains("Recent Downloads"));

        model.stats.recent_downloads = Some("9k this week".to_string());
        let text = stats_text(&model);
        assert!(text.contains("📈 Recent Downloads: 9k this week"));
        assert!(text.contains("📥 Downloads: 1,500"));
    }
}
