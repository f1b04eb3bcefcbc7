//! Command-line interface definitions for Video Scout.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Output paths and the config file can also come from environment variables.

use crate::models::{MAX_RESULTS_LIMIT, Platform};
use clap::Parser;

/// Command-line arguments for the Video Scout application.
///
/// # Examples
///
/// ```sh
/// # Search all platforms, 10 results each, log a summary
/// video_scout "lofi hip hop"
///
/// # 5 per platform, export everything to CSV and only Vimeo to JSON
/// video_scout "drone footage" -n 5 -o videos.csv
/// video_scout "drone footage" -n 5 -p vimeo -j vimeo.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Free-text search query (at least 2 non-whitespace characters)
    pub query: String,

    /// Maximum results to keep from each platform
    #[arg(short = 'n', long, default_value_t = 10, value_parser = clap::value_parser!(u16).range(1..=MAX_RESULTS_LIMIT as i64))]
    pub max_results: u16,

    /// Only export results from this platform (YouTube, Vimeo or Dailymotion)
    #[arg(short, long)]
    pub platform: Option<Platform>,

    /// Write the (filtered) results as CSV to this file
    #[arg(short = 'o', long)]
    pub csv_output: Option<String>,

    /// Write the (filtered) run as JSON to this file
    #[arg(short, long)]
    pub json_output: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "VIDEO_SCOUT_CONFIG")]
    pub config: Option<String>,

    /// Override the pause between platforms, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Query all platforms at once instead of one after another
    #[arg(long)]
    pub concurrent: bool,
}
