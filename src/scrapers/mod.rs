//! Platform scrapers that turn a search-results page into [`VideoRecord`]s.
//!
//! Each platform module implements [`PlatformExtractor`]. An extractor only
//! knows how to build its search URL and how to read its platform's markup;
//! fetching, status checks and truncation are shared in [`extract`].
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | YouTube | [`youtube`] | Embedded JSON | Result list lives in a script block |
//! | Vimeo | [`vimeo`] | HTML scraping | Containers matched by class pattern |
//! | Dailymotion | [`dailymotion`] | HTML scraping | Containers marked by `data-testid` |
//!
//! # Failure Scope
//!
//! - A failed request or non-2xx status fails the whole source.
//! - A malformed item fails only that item; the rest of the page is kept.

use crate::error::{Result, ScrapeError};
use crate::http::Fetcher;
use crate::models::{Platform, VideoRecord};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use once_cell::sync::Lazy;
use tracing::{debug, info, instrument};

pub mod dailymotion;
pub mod vimeo;
pub mod youtube;

static ANY_ELEMENT: Lazy<Selector> = Lazy::new(|| Selector::parse("*").unwrap());

/// Platform-specific half of a scraper.
pub trait PlatformExtractor: Send + Sync {
    fn platform(&self) -> Platform;

    /// Search-results page URL for `query`.
    fn search_url(&self, query: &str) -> String;

    /// Read every candidate item from a results page, in document order.
    ///
    /// Items that cannot form a record come back as `Err` so the caller can
    /// skip them individually.
    fn parse(&self, body: &str) -> Vec<Result<VideoRecord>>;
}

/// Fetch and parse one platform's results for `query`.
///
/// Returns at most `max_results` records: the first well-formed items in page
/// order. Malformed items are skipped and do not count towards the limit.
///
/// # Errors
///
/// Returns the transport error, or [`ScrapeError::Status`] for a non-2xx
/// response. Parsing never fails the whole source.
#[instrument(level = "info", skip_all, fields(platform = %extractor.platform(), %query, max_results = max_results))]
pub async fn extract<F: Fetcher>(
    extractor: &dyn PlatformExtractor,
    fetcher: &F,
    query: &str,
    max_results: usize,
) -> Result<Vec<VideoRecord>> {
    let url = extractor.search_url(query);
    let response = fetcher.fetch(&url).await?;
    if !response.is_success() {
        return Err(ScrapeError::Status {
            url,
            status: response.status,
        });
    }

    let items = extractor.parse(&response.body);
    let candidates = items.len();
    let mut skipped = 0usize;
    let records: Vec<VideoRecord> = items
        .into_iter()
        .filter_map(|item| match item {
            Ok(record) => Some(record),
            Err(e) => {
                skipped += 1;
                debug!(error = %e, "Skipping malformed item");
                None
            }
        })
        .take(max_results)
        .collect();

    info!(
        count = records.len(),
        candidates,
        skipped,
        "Extracted video records"
    );
    Ok(records)
}

/// Whether any whitespace-separated class token of `element` matches `pattern`.
pub(crate) fn has_class_matching(element: &ElementRef<'_>, pattern: &Regex) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|classes| classes.split_whitespace().any(|c| pattern.is_match(c)))
}

/// Outer-most elements of `document` whose class matches `pattern`.
///
/// An element nested inside another match is part of that match, not a
/// separate result.
pub(crate) fn outermost_by_class<'a>(document: &'a Html, pattern: &Regex) -> Vec<ElementRef<'a>> {
    document
        .select(&ANY_ELEMENT)
        .filter(|el| has_class_matching(el, pattern))
        .filter(|el| {
            !el.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| has_class_matching(&ancestor, pattern))
        })
        .collect()
}

/// First descendant of `root` with tag `tag` (any tag when `None`) whose class
/// matches `pattern`.
pub(crate) fn find_by_class<'a>(
    root: &ElementRef<'a>,
    tag: Option<&str>,
    pattern: &Regex,
) -> Option<ElementRef<'a>> {
    root.select(&ANY_ELEMENT).find(|el| {
        tag.is_none_or(|t| el.value().name() == t) && has_class_matching(el, pattern)
    })
}

/// Concatenated text content of an element.
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Text content of an element, leaving out any descendant whose class matches
/// `skip` (and everything below it).
pub(crate) fn text_excluding_class(element: &ElementRef<'_>, skip: &Regex) -> String {
    let mut text = String::new();
    for child in element.children() {
        if let Some(child_el) = ElementRef::wrap(child) {
            if !has_class_matching(&child_el, skip) {
                text.push_str(&text_excluding_class(&child_el, skip));
            }
        } else if let Some(t) = child.value().as_text() {
            text.push_str(t);
        }
    }
    text
}

/// Best image source of an `<img>`: `src`, then lazy-load attributes, then the
/// first `srcset` candidate.
pub(crate) fn image_source<'a>(img: &ElementRef<'a>) -> Option<&'a str> {
    let attrs = img.value();
    attrs
        .attr("src")
        .filter(|s| !s.trim().is_empty() && !s.starts_with("data:"))
        .or_else(|| attrs.attr("data-src"))
        .or_else(|| {
            attrs
                .attr("srcset")
                .and_then(|set| set.split(',').next())
                .and_then(|candidate| candidate.split_whitespace().next())
        })
}

/// Parsed items serialized with the scrape time zeroed, for comparing two
/// parses of the same page.
#[cfg(test)]
pub(crate) fn without_timestamps(items: Vec<Result<VideoRecord>>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| {
            let mut record = item.unwrap();
            record.scraped_at = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;
            serde_json::to_string(&record).unwrap()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StubFetcher;
    use crate::models::{NOT_AVAILABLE, UNKNOWN};

    /// Extractor over a fake format: one line per item, `id` or `!` for a bad item.
    struct LineExtractor;

    impl PlatformExtractor for LineExtractor {
        fn platform(&self) -> Platform {
            Platform::Vimeo
        }

        fn search_url(&self, query: &str) -> String {
            format!("https://vimeo.com/search?q={}", urlencoding::encode(query))
        }

        fn parse(&self, body: &str) -> Vec<Result<VideoRecord>> {
            body.lines()
                .map(|line| {
                    if line == "!" {
                        return Err(ScrapeError::Parse("bad line".to_string()));
                    }
                    Ok(VideoRecord {
                        platform: Platform::Vimeo,
                        title: line.to_string(),
                        url: format!("https://vimeo.com/{line}"),
                        thumbnail: String::new(),
                        duration: UNKNOWN.to_string(),
                        views: NOT_AVAILABLE.to_string(),
                        scraped_at: crate::models::scrape_timestamp(),
                    })
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn test_extract_skips_bad_items_and_truncates() {
        let fetcher = StubFetcher::new().page("vimeo.com", 200, "1\n!\n2\n3\n4");
        let records = extract(&LineExtractor, &fetcher, "cats", 3).await.unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["1", "2", "3"]);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_extract_non_success_status() {
        let fetcher = StubFetcher::new().page("vimeo.com", 429, "1\n2");
        let err = extract(&LineExtractor, &fetcher, "cats", 5).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 429, .. }));
    }

    #[tokio::test]
    async fn test_extract_transport_failure() {
        let fetcher = StubFetcher::new().unreachable("vimeo.com");
        let err = extract(&LineExtractor, &fetcher, "cats", 5).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_extract_encodes_query() {
        let fetcher = StubFetcher::new().page("vimeo.com", 200, "");
        let records = extract(&LineExtractor, &fetcher, "cats & dogs", 5).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(fetcher.requested(), vec!["https://vimeo.com/search?q=cats%20%26%20dogs"]);
    }

    #[test]
    fn test_outermost_by_class_ignores_nested_matches() {
        let html = Html::parse_document(
            r#"<div class="search_result"><span class="search_result_meta">x</span></div>
               <div class="other search_result">y</div>"#,
        );
        let pattern = Regex::new(r"^search[_-]result").unwrap();
        assert_eq!(outermost_by_class(&html, &pattern).len(), 2);
    }

    #[test]
    fn test_image_source_fallbacks() {
        let html = Html::parse_fragment(
            r#"<img id="a" src="/a.jpg"><img id="b" src="data:image/gif;base64,x" data-src="/b.jpg"><img id="c" srcset="/c1.jpg 1x, /c2.jpg 2x">"#,
        );
        let img = Selector::parse("img").unwrap();
        let sources: Vec<_> = html.select(&img).map(|el| image_source(&el)).collect();
        assert_eq!(sources, vec![Some("/a.jpg"), Some("/b.jpg"), Some("/c1.jpg")]);
    }

    #[test]
    fn test_text_excluding_class_skips_matching_subtrees() {
        let html = Html::parse_fragment(
            r#"<a href="/v"> Caption <img src="/t.jpg"><span class="badge Duration"><b>03:15</b></span> text </a>"#,
        );
        let link = html.select(&Selector::parse("a").unwrap()).next().unwrap();
        let pattern = Regex::new(r"(?i)duration").unwrap();
        assert_eq!(text_excluding_class(&link, &pattern), " Caption  text ");
    }
}
