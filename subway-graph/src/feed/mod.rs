//! Upstream feed fetching and parsing.
//!
//! Feeds arrive as JSON, XML, or CSV, with the row array buried at an
//! unpredictable nesting depth in JSON payloads. The fetch layer handles
//! credential-placeholder substitution and content-type capture; the
//! parse layer turns any supported payload into a flat record sequence.

mod error;
mod fetch;
mod parse;

pub use error::{FeedError, ParseError};
pub use fetch::{API_KEY_PLACEHOLDERS, FeedClient, FeedClientConfig, FetchedFeed, fill_api_key};
pub use parse::{FeedFormat, classify, parse_rows};
