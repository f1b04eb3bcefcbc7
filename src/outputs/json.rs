//! JSON export of a finished run.
//!
//! # Output Shape
//!
//! ```json
//! {
//!   "query": "cats",
//!   "generated_at": "2025-05-06 20:30:00",
//!   "platform": null,
//!   "counts": { "YouTube": 10, "Vimeo": 8, "Dailymotion": 0 },
//!   "warnings": [{ "platform": "Dailymotion", "reason": "... returned HTTP 503" }],
//!   "records": [ ... ]
//! }
//! ```

use crate::models::{Platform, VideoRecord};
use crate::orchestrator::{ScrapeRun, SourceWarning};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
pub struct RunExport<'a> {
    pub query: &'a str,
    pub generated_at: String,
    /// The platform filter applied to `records`, if any.
    pub platform: Option<Platform>,
    pub counts: BTreeMap<Platform, usize>,
    pub warnings: &'a [SourceWarning],
    pub records: Vec<&'a VideoRecord>,
}

impl<'a> RunExport<'a> {
    /// Snapshot of `run`, with records narrowed to `platform` when given.
    ///
    /// Counts always cover the whole run.
    pub fn new(run: &'a ScrapeRun, platform: Option<Platform>) -> Self {
        Self {
            query: &run.query,
            generated_at: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            platform,
            counts: run.aggregate.counts_by_platform().into_iter().collect(),
            warnings: &run.warnings,
            records: run.aggregate.select(platform),
        }
    }
}

/// Write `run` as pretty-printed JSON to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization, directory creation or the write fails.
#[instrument(level = "info", skip(run, path), fields(path = %path.display()))]
pub async fn write_run(
    run: &ScrapeRun,
    platform: Option<Platform>,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(&RunExport::new(run, platform))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResultAggregate, sample_record};
    use crate::orchestrator::RunState;

    fn run() -> ScrapeRun {
        let mut aggregate = ResultAggregate::new();
        aggregate.extend(vec![sample_record(Platform::YouTube, "y")]);
        aggregate.extend(vec![sample_record(Platform::Vimeo, "v")]);
        ScrapeRun {
            query: "cats".to_string(),
            aggregate,
            warnings: vec![SourceWarning {
                platform: Platform::Dailymotion,
                reason: "https://www.dailymotion.com/search/cats/videos returned HTTP 503".to_string(),
            }],
            state: RunState::Completed,
        }
    }

    #[test]
    fn test_export_filters_records_but_not_counts() {
        let run = run();
        let export = RunExport::new(&run, Some(Platform::Vimeo));
        assert_eq!(export.records.len(), 1);
        assert_eq!(export.records[0].platform, Platform::Vimeo);
        assert_eq!(export.counts[&Platform::YouTube], 1);
        assert_eq!(export.counts[&Platform::Dailymotion], 0);
    }

    #[tokio::test]
    async fn test_write_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/run.json");
        write_run(&run(), None, &path).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["query"], "cats");
        assert_eq!(value["counts"]["Vimeo"], 1);
        assert_eq!(value["records"].as_array().unwrap().len(), 2);
        assert_eq!(value["warnings"][0]["platform"], "Dailymotion");
        assert_eq!(value["records"][0]["url"], "https://www.youtube.com/y");
    }
}
