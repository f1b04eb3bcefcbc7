//! Vimeo search scraper.
//!
//! Scrapes `https://vimeo.com/search?q=...`. Each result is a container whose
//! class contains a `search_result` / `search-result` token. Inside it:
//! - an `<a>` with a `link`-like class carries the title and the video URL;
//!   when several match (thumbnail link, uploader link), one whose class also
//!   says `title` wins, then the first with visible text
//! - the first `<img>` is the thumbnail
//! - an element with a `duration`-like class holds the running time
//!
//! Vimeo search results never show a view count, so `views` is always `N/A`.

use super::{
    PlatformExtractor, element_text, find_by_class, has_class_matching, image_source, outermost_by_class,
};
use crate::error::{Result, ScrapeError};
use crate::models::{NO_TITLE, NOT_AVAILABLE, Platform, UNKNOWN, VideoRecord, scrape_timestamp};
use crate::utils::{clean_text, resolve_asset, resolve_url, text_or};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static RESULT_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^search[_-]?result(?:[_-]?item)?$").unwrap());
static LINK_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)link").unwrap());
static TITLE_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)title").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static DURATION_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)duration").unwrap());
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

#[derive(Debug, Clone, Copy, Default)]
pub struct VimeoExtractor;

impl PlatformExtractor for VimeoExtractor {
    fn platform(&self) -> Platform {
        Platform::Vimeo
    }

    fn search_url(&self, query: &str) -> String {
        format!("{}/search?q={}", Platform::Vimeo.origin(), urlencoding::encode(query))
    }

    fn parse(&self, body: &str) -> Vec<Result<VideoRecord>> {
        let document = Html::parse_document(body);
        let containers = outermost_by_class(&document, &RESULT_CLASS);
        debug!(containers = containers.len(), "Vimeo result containers");
        containers.iter().map(video_record).collect()
    }
}

/// The link that names the video among the container's `link`-classed anchors.
fn title_link<'a>(container: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let links: Vec<_> = container
        .select(&ANCHOR)
        .filter(|a| has_class_matching(a, &LINK_CLASS))
        .collect();
    links
        .iter()
        .find(|a| has_class_matching(a, &TITLE_CLASS))
        .or_else(|| links.iter().find(|a| !clean_text(&element_text(a)).is_empty()))
        .or_else(|| links.first())
        .copied()
}

fn video_record(container: &ElementRef<'_>) -> Result<VideoRecord> {
    let origin = Platform::Vimeo.origin();
    let link = title_link(container)
        .ok_or_else(|| ScrapeError::Parse("Vimeo result without link element".to_string()))?;
    let href = link.value().attr("href").unwrap_or_default();
    let url = resolve_url(origin, href)
        .ok_or_else(|| ScrapeError::Parse(format!("Vimeo link '{href}' is not a Vimeo URL")))?;

    let link_text = clean_text(&element_text(&link));
    let title = if link_text.is_empty() {
        text_or(link.value().attr("title"), NO_TITLE)
    } else {
        link_text
    };
    let thumbnail = container
        .select(&IMG)
        .next()
        .map(|img| resolve_asset(origin, image_source(&img)))
        .unwrap_or_default();
    let duration = find_by_class(container, None, &DURATION_CLASS).map(|el| element_text(&el));

    Ok(VideoRecord {
        platform: Platform::Vimeo,
        title,
        url,
        thumbnail,
        duration: text_or(duration.as_deref(), UNKNOWN),
        views: NOT_AVAILABLE.to_string(),
        scraped_at: scrape_timestamp(),
    })
}
