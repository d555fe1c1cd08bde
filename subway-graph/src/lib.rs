//! Subway reachability graph builder and search.
//!
//! Answers: "which stations are exactly N stops away from here,
//! counting a same-station line change as zero stops but one transfer?"
//!
//! The crate has two halves: an ingestion pipeline that turns messy
//! open-data feeds (CSV/XML/JSON, inconsistent field names) into
//! per-line graph files, and a query engine over the assembled graph.

pub mod feed;
pub mod graph;
pub mod normalize;
pub mod pipeline;
pub mod search;
pub mod topology;
