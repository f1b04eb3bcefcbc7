//! CSV export of video records.
//!
//! The header row is derived from [`VideoRecord`]'s field order:
//!
//! ```text
//! platform,title,url,thumbnail,duration,views,scraped_at
//! ```

use crate::models::VideoRecord;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tracing::{info, instrument};

/// Column names, in the order they are written.
pub const COLUMNS: [&str; 7] = [
    "platform",
    "title",
    "url",
    "thumbnail",
    "duration",
    "views",
    "scraped_at",
];

/// Write `records` as CSV to `writer`.
///
/// The header row is always written, even for an empty selection, so the
/// output has a fixed schema.
pub fn write_records<W: Write>(writer: W, records: &[&VideoRecord]) -> Result<(), Box<dyn Error>> {
    let mut csv_writer = ::csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(COLUMNS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write `records` to a CSV file at `path`, creating parent directories.
#[instrument(level = "info", skip(records), fields(count = records.len()))]
pub fn write_csv_file(path: &Path, records: &[&VideoRecord]) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_records(file, records)?;
    info!(path = %path.display(), "Wrote CSV export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Platform, sample_record};

    #[test]
    fn test_header_and_rows() {
        let a = sample_record(Platform::YouTube, "a");
        let mut b = sample_record(Platform::Vimeo, "b");
        b.title = "Comma, \"quoted\" title".to_string();

        let mut out = Vec::new();
        write_records(&mut out, &[&a, &b]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "platform,title,url,thumbnail,duration,views,scraped_at");
        assert_eq!(
            lines[1],
            "YouTube,Video a,https://www.youtube.com/a,,Unknown,N/A,2023-11-14 22:13:20"
        );
        assert_eq!(
            lines[2],
            "Vimeo,\"Comma, \"\"quoted\"\" title\",https://vimeo.com/b,,Unknown,N/A,2023-11-14 22:13:20"
        );
    }

    #[test]
    fn test_empty_selection_writes_header_only() {
        let mut out = Vec::new();
        write_records(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "platform,title,url,thumbnail,duration,views,scraped_at\n");
    }

    #[test]
    fn test_header_matches_record_fields() {
        let record = sample_record(Platform::Dailymotion, "x");
        let value = serde_json::to_value(&record).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        let mut expected: Vec<_> = COLUMNS.iter().map(|c| c.to_string()).collect();
        expected.sort();
        let mut keys = keys;
        keys.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_write_csv_file_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exports/videos.csv");
        let record = sample_record(Platform::Vimeo, "1");
        write_csv_file(&path, &[&record]).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 2);
    }
}
