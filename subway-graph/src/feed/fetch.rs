//! HTTP feed client.

use reqwest::header::{self, HeaderMap, HeaderValue};

use super::error::FeedError;
use super::parse::parse_rows;
use crate::normalize::RawRecord;

/// Accept header offered to upstream providers.
const ACCEPT_FEEDS: &str = "application/json, application/xml, text/xml, text/csv, text/plain;q=0.9";

/// Known credential-placeholder spellings in feed URL templates.
/// `${API_KEY}` must precede `{API_KEY}` or the shorter form eats it.
pub const API_KEY_PLACEHOLDERS: &[&str] = &["(인증키)", "${API_KEY}", "{API_KEY}", "__API_KEY__"];

/// Substitute the API key for every known placeholder spelling.
pub fn fill_api_key(template: &str, api_key: &str) -> String {
    let mut url = template.to_string();
    for placeholder in API_KEY_PLACEHOLDERS {
        url = url.replace(placeholder, api_key);
    }
    url
}

/// A fetched feed body plus the content-type the server declared.
#[derive(Debug, Clone)]
pub struct FetchedFeed {
    pub text: String,
    pub content_type: String,
}

/// Configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Async HTTP client for upstream open-data feeds.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
}

impl FeedClient {
    /// Create a new feed client.
    pub fn new(config: FeedClientConfig) -> Result<Self, FeedError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT_FEEDS));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { http })
    }

    /// Fetch a feed body, failing on any non-success status.
    pub async fn fetch_text(&self, url: &str) -> Result<FetchedFeed, FeedError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = response.text().await?;

        Ok(FetchedFeed { text, content_type })
    }

    /// Fetch a feed and parse it into records. Parse failures carry the
    /// offending URL.
    pub async fn fetch_rows(&self, url: &str) -> Result<Vec<RawRecord>, FeedError> {
        let feed = self.fetch_text(url).await?;
        parse_rows(&feed.text, &feed.content_type).map_err(|source| FeedError::Parse {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_api_key_handles_all_placeholder_spellings() {
        assert_eq!(
            fill_api_key("http://api.test/(인증키)/rows", "KEY"),
            "http://api.test/KEY/rows"
        );
        assert_eq!(
            fill_api_key("http://api.test/{API_KEY}/rows", "KEY"),
            "http://api.test/KEY/rows"
        );
        assert_eq!(
            fill_api_key("http://api.test/${API_KEY}/rows", "KEY"),
            "http://api.test/KEY/rows"
        );
        assert_eq!(
            fill_api_key("http://api.test/__API_KEY__/rows", "KEY"),
            "http://api.test/KEY/rows"
        );
    }

    #[test]
    fn fill_api_key_leaves_plain_urls_alone() {
        assert_eq!(
            fill_api_key("http://api.test/rows", "KEY"),
            "http://api.test/rows"
        );
    }

    #[test]
    fn config_defaults() {
        let config = FeedClientConfig::default();
        assert_eq!(config.timeout_secs, 30);
    }
}
