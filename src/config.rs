//! Runtime configuration loaded from an optional YAML file.
//!
//! Every key is optional; anything left out falls back to [`ScoutConfig::default`].
//!
//! ```yaml
//! user_agent: "Mozilla/5.0 ..."
//! request_timeout_secs: 15
//! politeness_delay_ms: 1000
//! schedule: sequential
//! youtube:
//!   marker: ytInitialData
//!   results_path: [contents, twoColumnSearchResultsRenderer, primaryContents, sectionListRenderer, contents]
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;
use tokio::fs;
use tracing::{info, instrument};

/// Desktop browser identification sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// How the orchestrator schedules the per-platform sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    /// One source at a time with the politeness delay in between.
    #[default]
    Sequential,
    /// All sources at once; results are re-grouped in platform order afterwards.
    Concurrent,
}

/// Where the YouTube search page keeps its result list.
///
/// The page embeds its data as a JSON object assigned inside a script block.
/// The key path is undocumented upstream, so it is configurable rather than
/// baked into the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTubeConfig {
    /// Substring identifying the script block that carries the JSON payload.
    pub marker: String,
    /// Object keys leading from the payload root to the array of sections.
    pub results_path: Vec<String>,
    /// Key of a section holding video entries.
    pub section_key: String,
    /// Key wrapping a single video inside a section's `contents`.
    pub item_key: String,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            marker: "ytInitialData".to_string(),
            results_path: [
                "contents",
                "twoColumnSearchResultsRenderer",
                "primaryContents",
                "sectionListRenderer",
                "contents",
            ]
            .map(String::from)
            .to_vec(),
            section_key: "itemSectionRenderer".to_string(),
            item_key: "videoRenderer".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Pause between two sources in sequential mode.
    pub politeness_delay_ms: u64,
    pub schedule: ScheduleMode,
    pub youtube: YouTubeConfig,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 15,
            connect_timeout_secs: 10,
            politeness_delay_ms: 1000,
            schedule: ScheduleMode::Sequential,
            youtube: YouTubeConfig::default(),
        }
    }
}

impl ScoutConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to an empty mapping.
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }
}

/// Load configuration from `path`, or the defaults when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid YAML for
/// [`ScoutConfig`].
#[instrument(level = "info")]
pub async fn load_config(path: Option<&str>) -> Result<ScoutConfig, Box<dyn Error>> {
    let Some(path) = path else {
        info!("No config file given; using defaults");
        return Ok(ScoutConfig::default());
    };
    let raw = fs::read_to_string(path).await?;
    let config = ScoutConfig::from_yaml(&raw)?;
    info!(path, schedule = ?config.schedule, delay_ms = config.politeness_delay_ms, "Loaded configuration");
    Ok(config)
}
