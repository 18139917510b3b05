//! Enrichment and trend classification.
//!
//! Classification is an ordered table of independent rules. Each rule looks
//! at the immutable (model, hint) pair and contributes at most one reason;
//! rules never remove or reorder what earlier rules produced. Adding a new
//! heuristic means appending a function to `RULES`.

use crate::model::{format_count, Commit, Model, TrendHint, TrendReason, TrendReasonKind};

/// Downloads above this count earn a popularity reason
const POPULARITY_THRESHOLD: u64 = 1_000_000;

/// Card descriptions are cut to this many characters in the reason text
const DESCRIPTION_SNIPPET_LEN: usize = 200;

type Rule = fn(&Model, Option<&TrendHint>) -> Option<TrendReason>;

/// Evaluation order is fixed: downloads hint, card description, recent
/// update, popularity.
const RULES: [Rule; 4] = [
    downloads_hint_rule,
    card_description_rule,
    recent_update_rule,
    popularity_rule,
];

/// Returns a fully-populated copy of the model: commits attached and trend
/// reasons computed from the committed facts plus the optional scraped hint.
///
/// This is a single-shot transformation. Calling it again on an already
/// enriched model appends commits and reasons on top of the existing ones;
/// each model instance is enriched exactly once per run.
pub fn enrich(model: Model, hint: Option<&TrendHint>, commits: Vec<Commit>) -> Model {
    let enriched = Model {
        recent_commits: commits,
        ..model
    };
    let trend_reasons = classify(&enriched, hint);
    Model {
        trend_reasons,
        ..enriched
    }
}

/// Runs the classification rules alone. Deterministic and idempotent given
/// the same (model, hint) inputs.
pub fn classify(model: &Model, hint: Option<&TrendHint>) -> Vec<TrendReason> {
    RULES.iter().filter_map(|rule| rule(model, hint)).collect()
}

fn downloads_hint_rule(_model: &Model, hint: Option<&TrendHint>) -> Option<TrendReason> {
    let recent = hint?.recent_downloads.as_deref()?;
    Some(TrendReason {
        kind: TrendReasonKind::Downloads,
        description: format!("📈 Recent Activity: {}", recent),
    })
}

fn card_description_rule(_model: &Model, hint: Option<&TrendHint>) -> Option<TrendReason> {
    let card_description = hint?.card_description.as_deref()?;
    // Ellipsis is appended unconditionally, even for short descriptions
    let snippet: String = card_description.chars().take(DESCRIPTION_SNIPPET_LEN).collect();
    Some(TrendReason {
        kind: TrendReasonKind::Description,
        description: format!("📝 Latest Update: {}...", snippet),
    })
}

fn recent_update_rule(model: &Model, _hint: Option<&TrendHint>) -> Option<TrendReason> {
    let latest = model.recent_commits.first()?;
    Some(TrendReason {
        kind: TrendReasonKind::Update,
        description: format!(
            "🔄 Recent Update: {} ({})",
            latest.title,
            latest.date.format("%Y-%m-%d")
        ),
    })
}

fn popularity_rule(model: &Model, _hint: Option<&TrendHint>) -> Option<TrendReason> {
    if model.stats.downloads > POPULARITY_THRESHOLD {
        Some(TrendReason {
            kind: TrendReasonKind::Popularity,
            description: format!(
                "🌟 Popular: {} total downloads",
                format_count(model.stats.downloads)
            ),
        })
    } else {
        None
    }
}
