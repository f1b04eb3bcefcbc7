//! YouTube search scraper.
//!
//! The results page at `https://www.youtube.com/results?search_query=...`
//! renders almost nothing as markup. Its result list is a JSON object assigned
//! inside a script block (`var ytInitialData = {...};`), so this extractor
//! pulls that payload out and walks it instead of selecting elements.
//!
//! # Payload Shape
//!
//! ```text
//! contents.twoColumnSearchResultsRenderer.primaryContents
//!   .sectionListRenderer.contents[]          <- sections
//!     .itemSectionRenderer.contents[]        <- entries
//!       .videoRenderer { videoId, title.runs[0].text, thumbnail.thumbnails[],
//!                        lengthText.simpleText, viewCountText.simpleText }
//! ```
//!
//! The key names come from [`YouTubeConfig`] so a layout change upstream can be
//! followed without a rebuild.

use super::PlatformExtractor;
use crate::config::YouTubeConfig;
use crate::error::{Result, ScrapeError};
use crate::models::{NO_TITLE, Platform, UNKNOWN, VideoRecord, scrape_timestamp};
use crate::utils::{extract_embedded_json, resolve_asset, text_or};
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default)]
pub struct YouTubeExtractor {
    config: YouTubeConfig,
}

impl YouTubeExtractor {
    pub fn new(config: YouTubeConfig) -> Self {
        Self { config }
    }

    /// The `videoRenderer` objects of every item section, in page order.
    fn video_entries<'a>(&self, data: &'a Value) -> Vec<&'a Value> {
        let sections = self
            .config
            .results_path
            .iter()
            .try_fold(data, |node, key| node.get(key));
        let Some(sections) = sections.and_then(Value::as_array) else {
            warn!(path = ?self.config.results_path, "YouTube result path not found in payload");
            return Vec::new();
        };

        sections
            .iter()
            .filter_map(|section| section.get(&self.config.section_key))
            .filter_map(|section| section.get("contents").and_then(Value::as_array))
            .flatten()
            .filter_map(|entry| entry.get(&self.config.item_key))
            .collect()
    }
}

impl PlatformExtractor for YouTubeExtractor {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/results?search_query={}",
            Platform::YouTube.origin(),
            urlencoding::encode(query)
        )
    }

    fn parse(&self, body: &str) -> Vec<Result<VideoRecord>> {
        let Some(data) = extract_embedded_json(body, &self.config.marker) else {
            debug!(marker = %self.config.marker, "No embedded result payload");
            return Vec::new();
        };
        self.video_entries(&data).into_iter().map(video_record).collect()
    }
}

fn video_record(renderer: &Value) -> Result<VideoRecord> {
    let video_id = renderer
        .get("videoId")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ScrapeError::Parse("videoRenderer without videoId".to_string()))?;

    let title = renderer
        .pointer("/title/runs/0/text")
        .or_else(|| renderer.pointer("/title/simpleText"))
        .and_then(Value::as_str);
    let thumbnail = renderer
        .pointer("/thumbnail/thumbnails")
        .and_then(Value::as_array)
        .and_then(|thumbs| thumbs.last())
        .and_then(|thumb| thumb.get("url"))
        .and_then(Value::as_str);
    let duration = renderer.pointer("/lengthText/simpleText").and_then(Value::as_str);
    let views = renderer.pointer("/viewCountText/simpleText").and_then(Value::as_str);

    let origin = Platform::YouTube.origin();
    Ok(VideoRecord {
        platform: Platform::YouTube,
        title: text_or(title, NO_TITLE),
        url: format!("{origin}/watch?v={}", urlencoding::encode(video_id.trim())),
        thumbnail: resolve_asset(origin, thumbnail),
        duration: text_or(duration, UNKNOWN),
        views: text_or(views, UNKNOWN),
        scraped_at: scrape_timestamp(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    pub fn video(id: &str) -> Value {
        json!({
            "videoRenderer": {
                "videoId": id,
                "title": { "runs": [{ "text": format!("Video {id}") }, { "text": " (extra)" }] },
                "thumbnail": { "thumbnails": [
                    { "url": format!("https://i.ytimg.com/vi/{id}/default.jpg"), "width": 120 },
                    { "url": format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg"), "width": 480 }
                ]},
                "lengthText": { "simpleText": "4:20" },
                "viewCountText": { "simpleText": "1,234 views" }
            }
        })
    }

    pub fn page_with(entries: Vec<Value>) -> String {
        let data = json!({
            "responseContext": {},
            "contents": { "twoColumnSearchResultsRenderer": { "primaryContents": {
                "sectionListRenderer": { "contents": [
                    { "itemSectionRenderer": { "contents": entries } },
                    { "continuationItemRenderer": {} }
                ]}
            }}}
        });
        format!(
            "<html><head><script>var ytcfg = {{}};</script></head><body>\
             <script nonce=\"abc\">var ytInitialData = {data};</script></body></html>"
        )
    }

    pub fn page(ids: &[&str]) -> String {
        page_with(ids.iter().map(|id| video(id)).collect())
    }
}
