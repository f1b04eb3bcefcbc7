//! Data models for scraped videos and the collections built from them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Platform`]: The video hosts that are searched, in their fixed scrape order
//! - [`VideoRecord`]: One normalized search result
//! - [`QueryRequest`]: A validated search request
//! - [`ResultAggregate`]: The platform-grouped results of one run
//!
//! Missing fields are filled with the sentinel strings below instead of being
//! omitted, so every record serializes to the same set of columns.

use crate::error::ScrapeError;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Placeholder title for results whose title could not be read.
pub const NO_TITLE: &str = "No Title";
/// Placeholder for a duration or view count the platform did not render.
pub const UNKNOWN: &str = "Unknown";
/// Placeholder for a field the platform never exposes in search results.
pub const NOT_AVAILABLE: &str = "N/A";

/// Upper bound on results requested from a single platform.
pub const MAX_RESULTS_LIMIT: usize = 20;
/// Minimum number of non-whitespace characters in a query.
pub const MIN_QUERY_CHARS: usize = 2;

const SCRAPED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A video host that can be searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    YouTube,
    Vimeo,
    Dailymotion,
}

impl Platform {
    /// Every platform, in the order sources are scraped and results grouped.
    pub const ALL: [Platform; 3] = [Platform::YouTube, Platform::Vimeo, Platform::Dailymotion];

    /// Scheme and host that every record URL for this platform starts with.
    pub fn origin(&self) -> &'static str {
        match self {
            Platform::YouTube => "https://www.youtube.com",
            Platform::Vimeo => "https://vimeo.com",
            Platform::Dailymotion => "https://www.dailymotion.com",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::YouTube => "YouTube",
            Platform::Vimeo => "Vimeo",
            Platform::Dailymotion => "Dailymotion",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown platform '{s}' (expected YouTube, Vimeo or Dailymotion)"))
    }
}

/// One video found in a platform's search results.
///
/// Records are built once by an extractor and never modified afterwards.
/// Field order here is the column order of the CSV export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    /// The platform the video was found on.
    pub platform: Platform,
    /// Display title, or [`NO_TITLE`].
    pub title: String,
    /// Absolute URL of the video page on the platform's origin.
    pub url: String,
    /// Absolute thumbnail URL, or an empty string.
    pub thumbnail: String,
    /// Duration as displayed by the platform, or [`UNKNOWN`].
    pub duration: String,
    /// View count as displayed by the platform, or [`UNKNOWN`] / [`NOT_AVAILABLE`].
    pub views: String,
    /// When the record was extracted, truncated to whole seconds.
    #[serde(serialize_with = "serialize_scraped_at", deserialize_with = "deserialize_scraped_at")]
    pub scraped_at: DateTime<Utc>,
}

/// Current time truncated to second precision.
pub fn scrape_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now)
}

fn serialize_scraped_at<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&at.format(SCRAPED_AT_FORMAT).to_string())
}

fn deserialize_scraped_at<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(d)?;
    chrono::NaiveDateTime::parse_from_str(&raw, SCRAPED_AT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// A search request that has passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    query: String,
    max_results_per_platform: usize,
}

impl QueryRequest {
    /// Validate a raw query and per-platform limit.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Validation`] if the query has fewer than
    /// [`MIN_QUERY_CHARS`] non-whitespace characters or the limit is outside
    /// `1..=MAX_RESULTS_LIMIT`.
    pub fn new(query: &str, max_results_per_platform: usize) -> Result<Self, ScrapeError> {
        let query = query.trim();
        let visible = query.chars().filter(|c| !c.is_whitespace()).count();
        if visible < MIN_QUERY_CHARS {
            return Err(ScrapeError::Validation(format!(
                "query must contain at least {MIN_QUERY_CHARS} non-whitespace characters"
            )));
        }
        if !(1..=MAX_RESULTS_LIMIT).contains(&max_results_per_platform) {
            return Err(ScrapeError::Validation(format!(
                "max results per platform must be between 1 and {MAX_RESULTS_LIMIT}, got {max_results_per_platform}"
            )));
        }
        Ok(Self {
            query: query.to_string(),
            max_results_per_platform,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_results_per_platform(&self) -> usize {
        self.max_results_per_platform
    }
}

/// The records produced by one run, grouped by platform in scrape order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultAggregate {
    records: Vec<VideoRecord>,
}

impl ResultAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one source's records after everything already collected.
    pub fn extend(&mut self, records: Vec<VideoRecord>) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record count for every platform in scrape order, zero counts included.
    pub fn counts_by_platform(&self) -> Vec<(Platform, usize)> {
        let counts = self.records.iter().map(|r| r.platform).counts();
        Platform::ALL
            .into_iter()
            .map(|p| (p, counts.get(&p).copied().unwrap_or(0)))
            .collect()
    }

    /// Records from a single platform, in their original order.
    pub fn filter_platform(&self, platform: Platform) -> Vec<&VideoRecord> {
        self.records.iter().filter(|r| r.platform == platform).collect()
    }

    /// Records matching an optional platform filter.
    pub fn select(&self, platform: Option<Platform>) -> Vec<&VideoRecord> {
        match platform {
            Some(p) => self.filter_platform(p),
            None => self.records().iter().collect(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_record(platform: Platform, id: &str) -> VideoRecord {
    VideoRecord {
        platform,
        title: format!("Video {id}"),
        url: format!("{}/{id}", platform.origin()),
        thumbnail: String::new(),
        duration: UNKNOWN.to_string(),
        views: NOT_AVAILABLE.to_string(),
        scraped_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
    }
}
