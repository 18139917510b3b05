use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::HubConfig;
use crate::hub::USER_AGENT;
use crate::model::TrendHint;

// Selectors mirror the hub's trending page markup. Parsed once; the literals
// are known-valid CSS.
static CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article.overview-card-wrapper").expect("valid selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));
static SPAN: Lazy<Selector> = Lazy::new(|| Selector::parse("span").expect("valid selector"));
static DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div[class*=\"description\"]").expect("valid selector"));

/// Scrapes the hub's trending listing page into lightweight per-model hints.
///
/// The scraper is deliberately forgiving: any failure at the page level
/// degrades to an empty result, and any failure at the card level skips that
/// card. A bad page or card must never abort the daily batch.
pub struct TrendScraper {
    client: Client,
    base_url: String,
    limit: usize,
}

impl TrendScraper {
    pub fn new(cfg: &HubConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.base_url.clone(),
            limit: cfg.model_limit,
        })
    }

    /// Fetches the trending page and extracts up to `model_limit` hints in
    /// page order (the page is relevance-ranked by the hub).
    pub async fn get_trending_models(&self) -> Vec<TrendHint> {
        info!("Scraping trending models...");
        let url = format!("{}/models?sort=trending", self.base_url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch trending page: {}", e);
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            warn!("Trending page returned status: {}", response.status());
            return Vec::new();
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read trending page body: {}", e);
                return Vec::new();
            }
        };

        let hints = parse_trending(&body, self.limit);
        info!("Scraped {} trending model cards", hints.len());
        hints
    }
}

/// Parses trending-page markup into hints. Only the first `limit` cards are
/// considered; a card without a resolvable model link is dropped without
/// shifting the cards that follow it.
pub fn parse_trending(html: &str, limit: usize) -> Vec<TrendHint> {
    let document = Html::parse_document(html);

    document
        .select(&CARD)
        .take(limit)
        .filter_map(|card| {
            let hint = extract_card(card);
            if hint.is_none() {
                debug!("Skipping trending card without a model link");
            }
            hint
        })
        .collect()
}

/// Extracts a hint from a single model card, or None when the card has no
/// hyperlink to resolve an id from.
fn extract_card(card: ElementRef) -> Option<TrendHint> {
    let href = card.select(&LINK).next()?.value().attr("href")?;
    let model_id = href.trim_matches('/').to_string();

    // First span mentioning downloads (case-insensitive) is the activity hint
    let recent_downloads = card
        .select(&SPAN)
        .map(|span| element_text(span))
        .find(|text| text.to_lowercase().contains("downloads"))
        .map(|text| text.trim().to_string());

    let card_description = card
        .select(&DESCRIPTION)
        .next()
        .map(|div| element_text(div).trim().to_string());

    Some(TrendHint {
        model_id,
        recent_downloads,
        card_description,
    })
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}
