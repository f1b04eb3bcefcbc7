use thiserror::Error;

/// Failures that can occur while validating a query or scraping a source.
///
/// Only [`ScrapeError::Validation`] ever reaches the caller of a run; every
/// other variant is folded into a per-source warning by the orchestrator.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out after {secs} seconds")]
    Timeout { url: String, secs: u64 },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Invalid query: {0}")]
    Validation(String),
}

impl ScrapeError {
    /// Whether the failure happened while talking to the platform rather than
    /// while reading its response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScrapeError::Transport { .. } | ScrapeError::Timeout { .. } | ScrapeError::Status { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let e = ScrapeError::Status {
            url: "https://www.dailymotion.com/search/cats/videos".to_string(),
            status: 503,
        };
        assert_eq!(
            e.to_string(),
            "https://www.dailymotion.com/search/cats/videos returned HTTP 503"
        );
        assert!(e.is_transport());
    }

    #[test]
    fn test_parse_is_not_transport() {
        assert!(!ScrapeError::Parse("bad".to_string()).is_transport());
        assert!(!ScrapeError::Validation("short".to_string()).is_transport());
    }
}
