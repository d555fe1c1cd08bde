//! Ingestion error types.
//!
//! Every variant is fatal to the run: partial graphs are never
//! persisted, and operators re-run the whole pipeline after a failure.

use crate::feed::FeedError;
use crate::graph::StoreError;

/// Errors that abort an ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Required environment variables are unset
    #[error("missing required env: {0}")]
    MissingEnv(String),

    /// Upstream fetch or parse failure
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// A required feed parsed to zero rows
    #[error("no rows parsed from {url}")]
    NoRows { url: String },

    /// Station normalization produced nothing: the candidate field lists
    /// no longer match the feed schema
    #[error("could not normalize station records; check field names and response format")]
    NoStationRecords,

    /// Normalization produced no line groupings at all
    #[error("no line data generated; check line normalization and response payload")]
    NoLineGroupings,

    /// A Seoul line parsed to an unusable station count
    #[error("too few stations for {line}: parsed {count}")]
    TooFewStations { line: String, count: usize },

    /// Graph persistence failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = IngestError::MissingEnv("SUBWAY_STATION_API_URL".to_string());
        assert_eq!(err.to_string(), "missing required env: SUBWAY_STATION_API_URL");

        let err = IngestError::NoRows {
            url: "http://api.test/rows".to_string(),
        };
        assert_eq!(err.to_string(), "no rows parsed from http://api.test/rows");

        let err = IngestError::TooFewStations {
            line: "3호선".to_string(),
            count: 1,
        };
        assert_eq!(err.to_string(), "too few stations for 3호선: parsed 1");
    }
}
