//! Dailymotion search scraper.
//!
//! Scrapes `https://www.dailymotion.com/search/<query>/videos`. Result cards
//! are marked with `data-testid="video-card"`; the card's first link carries
//! the title in its `title` attribute and a site-relative `href`. Without that
//! attribute the link's own text is used, minus the duration badge that sits
//! inside the anchor.

use super::{PlatformExtractor, element_text, find_by_class, image_source, text_excluding_class};
use crate::error::{Result, ScrapeError};
use crate::models::{NO_TITLE, NOT_AVAILABLE, Platform, UNKNOWN, VideoRecord, scrape_timestamp};
use crate::utils::{clean_text, resolve_asset, resolve_url, text_or};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static VIDEO_CARD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-testid="video-card"]"#).unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static DURATION_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)duration").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct DailymotionExtractor;

impl PlatformExtractor for DailymotionExtractor {
    fn platform(&self) -> Platform {
        Platform::Dailymotion
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search/{}/videos",
            Platform::Dailymotion.origin(),
            urlencoding::encode(query)
        )
    }

    fn parse(&self, body: &str) -> Vec<Result<VideoRecord>> {
        let document = Html::parse_document(body);
        let cards: Vec<_> = document.select(&VIDEO_CARD).collect();
        debug!(cards = cards.len(), "Dailymotion video cards");
        cards.iter().map(video_record).collect()
    }
}

fn video_record(card: &ElementRef<'_>) -> Result<VideoRecord> {
    let origin = Platform::Dailymotion.origin();
    let link = card
        .select(&LINK)
        .next()
        .ok_or_else(|| ScrapeError::Parse("Dailymotion card without link".to_string()))?;
    let href = link.value().attr("href").unwrap_or_default();
    let url = resolve_url(origin, href)
        .ok_or_else(|| ScrapeError::Parse(format!("Dailymotion link '{href}' is not a Dailymotion URL")))?;

    let title = match link.value().attr("title").map(clean_text).filter(|t| !t.is_empty()) {
        Some(title) => title,
        None => text_or(Some(text_excluding_class(&link, &DURATION_CLASS).as_str()), NO_TITLE),
    };
    let thumbnail = card
        .select(&IMG)
        .next()
        .map(|img| resolve_asset(origin, image_source(&img)))
        .unwrap_or_default();
    let duration = find_by_class(card, None, &DURATION_CLASS).map(|el| element_text(&el));

    Ok(VideoRecord {
        platform: Platform::Dailymotion,
        title,
        url,
        thumbnail,
        duration: text_or(duration.as_deref(), UNKNOWN),
        views: NOT_AVAILABLE.to_string(),
        scraped_at: scrape_timestamp(),
    })
}
