//! Paginated single-provider ingestion for the Seoul numbered lines.
//!
//! Each line is fetched page by page from the Seoul open-data portal;
//! independent lines fetch concurrently. Any one line failing aborts
//! the whole run. Transfers here come from cross-linking same-name
//! instances in the fresh build, not from prior state.

use futures::future::try_join_all;
use tracing::info;

use super::error::IngestError;
use super::feeds::IngestSummary;
use crate::feed::FeedClient;
use crate::graph::{GraphStore, SubwayGraph, build_line_adjacency, link_same_name_transfers, partition_by_line};
use crate::normalize::{LineContext, RawRecord, normalize_line_name, normalize_station_name, parse_order};

/// Required env: Seoul open-data API key.
pub const SEOUL_API_KEY_ENV: &str = "SEOUL_OPEN_API_KEY";
/// Optional env: endpoint template override.
pub const ENDPOINT_TEMPLATE_ENV: &str = "SEOUL_LINE_ENDPOINT_TEMPLATE";
/// Optional env: page size override.
pub const PAGE_SIZE_ENV: &str = "SEOUL_LINE_PAGE_SIZE";

/// The managed Seoul numbered lines.
pub const SEOUL_LINES: &[&str] = &[
    "1호선", "2호선", "3호선", "4호선", "5호선", "6호선", "7호선", "8호선", "9호선",
];

const DEFAULT_ENDPOINT_TEMPLATE: &str =
    "http://openapi.seoul.go.kr:8088/{API_KEY}/json/SearchSTNBySubwayLineInfo/{START}/{END}/{LINE}";
const DEFAULT_PAGE_SIZE: usize = 1000;

// The single-provider schema is narrow; these are its known spellings.
const STATION_NAME_FIELDS: &[&str] = &["STATION_NM", "STATN_NM", "stationName", "역명"];
const LINE_NAME_FIELDS: &[&str] = &["LINE_NUM", "LINE_NM", "lineName", "호선"];
const ORDER_FIELDS: &[&str] = &["STATION_ORD", "ORD", "ROW_NUM", "역순번"];

/// Configuration for the Seoul per-line ingestion run.
#[derive(Debug, Clone)]
pub struct SeoulLinesConfig {
    pub api_key: String,
    pub endpoint_template: String,
    pub page_size: usize,
}

impl SeoulLinesConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint_template: DEFAULT_ENDPOINT_TEMPLATE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set a custom endpoint template (for testing).
    pub fn with_endpoint_template(mut self, template: impl Into<String>) -> Self {
        self.endpoint_template = template.into();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Read the configuration from the environment. The API key is
    /// required; template and page size have defaults.
    pub fn from_env() -> Result<Self, IngestError> {
        let api_key = std::env::var(SEOUL_API_KEY_ENV)
            .map_err(|_| IngestError::MissingEnv(SEOUL_API_KEY_ENV.to_string()))?;

        let mut config = Self::new(api_key);
        if let Ok(template) = std::env::var(ENDPOINT_TEMPLATE_ENV) {
            config = config.with_endpoint_template(template);
        }
        if let Some(page_size) = std::env::var(PAGE_SIZE_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config = config.with_page_size(page_size);
        }
        Ok(config)
    }
}

fn page_url(config: &SeoulLinesConfig, line: &str, start: usize, end: usize) -> String {
    config
        .endpoint_template
        .replace("{API_KEY}", &config.api_key)
        .replace("{LINE}", &urlencoding::encode(line))
        .replace("{START}", &start.to_string())
        .replace("{END}", &end.to_string())
}

async fn fetch_line_rows(
    client: &FeedClient,
    config: &SeoulLinesConfig,
    line: &str,
) -> Result<Vec<RawRecord>, IngestError> {
    let mut all = Vec::new();
    let mut start = 1;

    loop {
        let end = start + config.page_size - 1;
        let url = page_url(config, line, start, end);
        let rows = client.fetch_rows(&url).await?;
        if rows.is_empty() {
            break;
        }

        let page_len = rows.len();
        all.extend(rows);
        if page_len < config.page_size {
            break;
        }
        start += config.page_size;
    }

    Ok(all)
}

/// Parse, filter to the requested line, sort by order (feed position
/// breaking ties), and deduplicate.
fn ordered_unique_stations(rows: &[RawRecord], requested_line: &str) -> Vec<String> {
    let mut parsed: Vec<(String, f64, usize)> = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let station = normalize_station_name(&row.pick(STATION_NAME_FIELDS));
        let line_raw = row.pick(LINE_NAME_FIELDS);
        let line = if line_raw.is_empty() {
            requested_line.to_string()
        } else {
            normalize_line_name(&line_raw, &LineContext::default())
        };

        if station.is_empty() || line != requested_line {
            continue;
        }

        let order = parse_order(&row.pick(ORDER_FIELDS)).unwrap_or((idx + 1) as f64);
        parsed.push((station, order, idx));
    }

    parsed.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.2.cmp(&b.2))
    });

    let mut seen = std::collections::HashSet::new();
    parsed
        .into_iter()
        .filter(|(station, _, _)| seen.insert(station.clone()))
        .map(|(station, _, _)| station)
        .collect()
}

/// Run the Seoul per-line ingestion end to end.
pub async fn run_seoul_lines(
    client: &FeedClient,
    store: &GraphStore,
    config: &SeoulLinesConfig,
) -> Result<IngestSummary, IngestError> {
    let fetches = SEOUL_LINES.iter().map(|line| async move {
        let rows = fetch_line_rows(client, config, line).await?;
        if rows.is_empty() {
            return Err(IngestError::NoRows {
                url: page_url(config, line, 1, config.page_size),
            });
        }

        let stations = ordered_unique_stations(&rows, line);
        if stations.len() < 2 {
            return Err(IngestError::TooFewStations {
                line: (*line).to_string(),
                count: stations.len(),
            });
        }

        info!(line = %line, stations = stations.len(), "fetched line");
        Ok(((*line).to_string(), stations))
    });

    let topologies: Vec<(String, Vec<String>)> = try_join_all(fetches).await?;

    let mut merged = SubwayGraph::new();
    for (line, stations) in &topologies {
        merged.merge(build_line_adjacency(line, stations));
    }
    link_same_name_transfers(&mut merged);

    let groupings = partition_by_line(&merged);
    if groupings.is_empty() {
        return Err(IngestError::NoLineGroupings);
    }
    store.write_groupings(&groupings).await?;

    Ok(IngestSummary {
        groupings: groupings
            .iter()
            .map(|g| (g.file_name.clone(), g.graph.len()))
            .collect(),
    })
}
