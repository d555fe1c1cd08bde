//! Feed fetch and parse error types.

/// A payload that could not be parsed in its detected format.
#[derive(Debug, thiserror::Error)]
#[error("unparseable {format} payload: {message}")]
pub struct ParseError {
    pub format: &'static str,
    pub message: String,
}

/// Errors from fetching or parsing an upstream feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response status
    #[error("request failed ({status}) for {url}")]
    Status { status: u16, url: String },

    /// Payload could not be parsed; carries the offending URL
    #[error("{source} from {url}")]
    Parse {
        url: String,
        #[source]
        source: ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FeedError::Status {
            status: 502,
            url: "http://example.test/feed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "request failed (502) for http://example.test/feed"
        );

        let err = FeedError::Parse {
            url: "http://example.test/feed".to_string(),
            source: ParseError {
                format: "JSON",
                message: "expected value at line 1".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "unparseable JSON payload: expected value at line 1 from http://example.test/feed"
        );
    }
}
