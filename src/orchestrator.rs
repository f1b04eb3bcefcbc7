//! Runs every platform scraper for one query and merges the results.
//!
//! # Run Lifecycle
//!
//! ```text
//! NotStarted -> Scraping(YouTube) -> Scraping(Vimeo) -> Scraping(Dailymotion) -> Completed
//! ```
//!
//! A source that fails (network error, non-2xx status) contributes no records
//! and a [`SourceWarning`]; the run always reaches `Completed`. Only query
//! validation stops a run, and it does so before any request is made.

use crate::config::{ScheduleMode, ScoutConfig};
use crate::error::Result;
use crate::http::Fetcher;
use crate::models::{Platform, QueryRequest, ResultAggregate, VideoRecord};
use crate::scrapers::{
    PlatformExtractor, dailymotion::DailymotionExtractor, extract, vimeo::VimeoExtractor,
    youtube::YouTubeExtractor,
};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    NotStarted,
    Scraping(Platform),
    Completed,
}

/// Emitted once per finished source, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub platform: Platform,
    pub completed: usize,
    pub total: usize,
    pub state: RunState,
}

impl Progress {
    /// Share of sources finished so far, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// A source that produced no records because it failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceWarning {
    pub platform: Platform,
    pub reason: String,
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeRun {
    pub query: String,
    pub aggregate: ResultAggregate,
    pub warnings: Vec<SourceWarning>,
    pub state: RunState,
}

impl ScrapeRun {
    /// Message for an empty result set, `None` when there are records.
    pub fn summary_message(&self) -> Option<String> {
        self.aggregate.is_empty().then(|| {
            format!(
                "No videos found for '{}'. Try a different query.",
                self.query
            )
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    pub politeness_delay: Duration,
    pub schedule: ScheduleMode,
}

impl From<&ScoutConfig> for OrchestratorSettings {
    fn from(config: &ScoutConfig) -> Self {
        Self {
            politeness_delay: config.politeness_delay(),
            schedule: config.schedule,
        }
    }
}

pub struct Orchestrator<F> {
    fetcher: F,
    extractors: Vec<Box<dyn PlatformExtractor>>,
    settings: OrchestratorSettings,
    progress: Option<UnboundedSender<Progress>>,
}

impl<F: Fetcher> Orchestrator<F> {
    /// Orchestrator over the three platforms in their fixed order.
    pub fn new(fetcher: F, config: &ScoutConfig) -> Self {
        let extractors: Vec<Box<dyn PlatformExtractor>> = vec![
            Box::new(YouTubeExtractor::new(config.youtube.clone())),
            Box::new(VimeoExtractor),
            Box::new(DailymotionExtractor),
        ];
        Self {
            fetcher,
            extractors,
            settings: OrchestratorSettings::from(config),
            progress: None,
        }
    }

    /// Send a [`Progress`] for each finished source to `tx`. A dropped
    /// receiver is ignored.
    pub fn with_progress(mut self, tx: UnboundedSender<Progress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Validate `query` and scrape every platform for it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ScrapeError::Validation`] when the query or limit is invalid.
    /// Source failures are reported in [`ScrapeRun::warnings`] instead.
    #[instrument(level = "info", skip(self))]
    pub async fn scrape_all(&self, query: &str, max_results_per_platform: usize) -> Result<ScrapeRun> {
        debug!(state = ?RunState::NotStarted, "Validating query");
        let request = QueryRequest::new(query, max_results_per_platform)?;
        let t0 = Instant::now();

        let outcomes = match self.settings.schedule {
            ScheduleMode::Sequential => self.run_sequential(&request).await,
            ScheduleMode::Concurrent => self.run_concurrent(&request).await,
        };

        let mut aggregate = ResultAggregate::new();
        let mut warnings = Vec::new();
        for (platform, outcome) in outcomes {
            match outcome {
                Ok(records) => aggregate.extend(records),
                Err(e) => {
                    warn!(%platform, transport = e.is_transport(), error = %e, "Source failed; continuing without it");
                    warnings.push(SourceWarning {
                        platform,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            total = aggregate.len(),
            failed_sources = warnings.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Scrape run completed"
        );

        Ok(ScrapeRun {
            query: request.query().to_string(),
            aggregate,
            warnings,
            state: RunState::Completed,
        })
    }

    async fn run_sequential(&self, request: &QueryRequest) -> Vec<(Platform, Result<Vec<VideoRecord>>)> {
        let total = self.extractors.len();
        let mut outcomes = Vec::with_capacity(total);

        for (i, extractor) in self.extractors.iter().enumerate() {
            let platform = extractor.platform();
            info!(%platform, state = ?RunState::Scraping(platform), "Scraping source");
            let outcome = extract(
                extractor.as_ref(),
                &self.fetcher,
                request.query(),
                request.max_results_per_platform(),
            )
            .await;
            outcomes.push((platform, outcome));
            self.report(platform, i + 1, total);

            if i + 1 < total && !self.settings.politeness_delay.is_zero() {
                sleep(self.settings.politeness_delay).await;
            }
        }
        outcomes
    }

    async fn run_concurrent(&self, request: &QueryRequest) -> Vec<(Platform, Result<Vec<VideoRecord>>)> {
        let total = self.extractors.len();
        let mut completed = 0usize;

        let mut outcomes: Vec<(Platform, Result<Vec<VideoRecord>>)> = stream::iter(self.extractors.iter())
            .map(|extractor| async move {
                let platform = extractor.platform();
                let outcome = extract(
                    extractor.as_ref(),
                    &self.fetcher,
                    request.query(),
                    request.max_results_per_platform(),
                )
                .await;
                (platform, outcome)
            })
            .buffer_unordered(total.max(1))
            .inspect(|(platform, _)| {
                completed += 1;
                self.report(*platform, completed, total);
            })
            .collect()
            .await;

        // Completion order is arbitrary; restore platform grouping.
        outcomes.sort_by_key(|(platform, _)| *platform);
        outcomes
    }

    fn report(&self, platform: Platform, completed: usize, total: usize) {
        let state = if completed == total {
            RunState::Completed
        } else {
            RunState::Scraping(platform)
        };
        let progress = Progress {
            platform,
            completed,
            total,
            state,
        };
        info!(%platform, completed, total, fraction = progress.fraction(), "Source finished");
        if let Some(tx) = &self.progress {
            let _ = tx.send(progress);
        }
    }
}
