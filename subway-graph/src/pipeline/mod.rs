//! Ingestion pipelines.
//!
//! Both pipelines rebuild line topologies from scratch and persist one
//! grouping file per line, all-or-nothing: any fetch, parse, or
//! normalization failure aborts the run before anything is written.

mod error;
mod feeds;
mod seoul;

pub use error::IngestError;
pub use feeds::{FeedIngestConfig, IngestSummary, run_feed_ingestion};
pub use seoul::{SEOUL_LINES, SeoulLinesConfig, run_seoul_lines};
