//! # Video Scout
//!
//! A multi-source video search pipeline that queries YouTube, Vimeo and
//! Dailymotion for a free-text query, extracts structured metadata from each
//! platform's search page, and merges everything into one normalized list.
//!
//! ## Features
//!
//! - Per-platform extractors: embedded JSON for YouTube, HTML scraping for
//!   Vimeo and Dailymotion
//! - Failure isolation: a broken or unreachable platform only produces a warning
//! - Fixed politeness delay between platforms
//! - CSV and JSON export, optionally filtered to one platform
//!
//! ## Usage
//!
//! ```sh
//! video_scout "lofi hip hop" -n 5 -o ./videos.csv -j ./run.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Validation**: Reject queries shorter than 2 characters before any request
//! 2. **Scraping**: Fetch and parse each platform's search page in fixed order
//! 3. **Aggregation**: Concatenate records, platform by platform
//! 4. **Output**: Log a per-platform summary and write the requested exports

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod http;
mod models;
mod orchestrator;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::{ScheduleMode, load_config};
use http::HttpClient;
use orchestrator::{Orchestrator, Progress};
use outputs::{csv, json};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("video_scout starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Load config ----
    let mut config = load_config(args.config.as_deref()).await?;
    if let Some(delay_ms) = args.delay_ms {
        config.politeness_delay_ms = delay_ms;
    }
    if args.concurrent {
        config.schedule = ScheduleMode::Concurrent;
    }

    // ---- Scrape ----
    let client = HttpClient::new(&config)?;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<Progress>();
    let progress_log = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            info!(
                platform = %progress.platform,
                percent = (progress.fraction() * 100.0).round() as u32,
                state = ?progress.state,
                "Progress"
            );
        }
    });

    let orchestrator = Orchestrator::new(client, &config).with_progress(tx);
    let run = match orchestrator.scrape_all(&args.query, usize::from(args.max_results)).await {
        Ok(run) => run,
        Err(e) => {
            error!(error = %e, "Query rejected");
            return Err(e.into());
        }
    };
    drop(orchestrator);
    let _ = progress_log.await;

    // ---- Summary ----
    for warning in &run.warnings {
        warn!(platform = %warning.platform, reason = %warning.reason, "No results from platform");
    }
    for (platform, count) in run.aggregate.counts_by_platform() {
        info!(%platform, count, "Videos found");
    }
    match run.summary_message() {
        Some(message) => info!("{message}"),
        None => info!(total = run.aggregate.len(), "Search complete"),
    }

    // ---- Exports ----
    let selected = run.aggregate.select(args.platform);
    if let Some(ref path) = args.csv_output {
        if let Err(e) = csv::write_csv_file(Path::new(path), &selected) {
            error!(%path, error = %e, "Failed to write CSV export");
        }
    }
    if let Some(ref path) = args.json_output {
        if let Err(e) = json::write_run(&run, args.platform, Path::new(path)).await {
            error!(%path, error = %e, "Failed to write JSON export");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
