//! Helpers shared by the platform extractors.
//!
//! This module provides small pure functions used throughout the scrapers:
//! - URL resolution against a platform origin
//! - Sentinel defaulting and whitespace cleanup for scraped text
//! - Locating a JSON payload embedded in a script block
//! - String truncation for logging

use scraper::{Html, Selector};
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

static SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("script").unwrap());

/// Truncate a string for logging purposes.
///
/// Long strings are cut after `max` bytes (moved back to the nearest char
/// boundary) and a byte count indicator is appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log("a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleaned text, or `sentinel` when nothing readable is left.
pub fn text_or(value: Option<&str>, sentinel: &str) -> String {
    value
        .map(clean_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| sentinel.to_string())
}

/// Resolve a link against a platform origin.
///
/// Relative and protocol-relative links are joined onto `origin`; absolute
/// links are accepted as-is. Returns `None` for empty links and for links that
/// end up on a different origin, so a record URL always starts with its
/// platform's origin.
pub fn resolve_url(origin: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(origin).ok()?;
    let resolved = base.join(href).ok()?;
    if resolved.origin() != base.origin() {
        debug!(%origin, %href, "Link leaves platform origin");
        return None;
    }
    Some(resolved.to_string())
}

/// Resolve an asset URL such as a thumbnail.
///
/// Unlike [`resolve_url`], assets may live on any host (CDNs). Missing or
/// unparseable values become an empty string.
pub fn resolve_asset(origin: &str, src: Option<&str>) -> String {
    let Some(src) = src.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    if src.starts_with("data:") {
        return String::new();
    }
    Url::parse(origin)
        .and_then(|base| base.join(src))
        .map(|u| u.to_string())
        .unwrap_or_default()
}

/// Pull a JSON object out of the first script block containing `marker`.
///
/// The script text is sliced from its first `{` to its last `}`, which drops
/// surrounding statements such as `var ytInitialData = ...;`. Only the first
/// matching block is considered. Any failure yields `None`.
#[instrument(level = "debug", skip(html), fields(bytes = html.len()))]
pub fn extract_embedded_json(html: &str, marker: &str) -> Option<Value> {
    let document = Html::parse_document(html);
    let script = document
        .select(&SCRIPT_SELECTOR)
        .map(|el| el.text().collect::<String>())
        .find(|text| text.contains(marker))?;

    let start = script.find('{')?;
    let end = script.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&script[start..=end]) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(error = %e, preview = %truncate_for_log(&script[start..=end], 200), "Embedded JSON did not parse");
            None
        }
    }
}
