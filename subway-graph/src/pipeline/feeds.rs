//! The heterogeneous two-feed ingestion run.
//!
//! Fetches the station-registry and distance/sequence feeds
//! concurrently, normalizes both, reconstructs per-line topologies, and
//! rebuilds the grouping files with transfer links recovered from the
//! previously persisted graph.

use tracing::{info, warn};

use super::error::IngestError;
use crate::feed::{FeedClient, fill_api_key};
use crate::graph::{GraphStore, TransferIndex, assemble_line_groupings};
use crate::normalize::{distance_records, station_records};
use crate::topology::collect_topologies;

/// Required env: station-registry feed URL template.
pub const STATION_URL_ENV: &str = "SUBWAY_STATION_API_URL";
/// Required env: distance/sequence feed URL template.
pub const DISTANCE_URL_ENV: &str = "SUBWAY_DISTANCE_API_URL";
/// Optional env: credential substituted into URL templates.
pub const API_KEY_ENV: &str = "DATA_GO_API_KEY";

/// Configuration for the two-feed ingestion run.
#[derive(Debug, Clone)]
pub struct FeedIngestConfig {
    /// Station-registry feed URL template
    pub station_url: String,
    /// Distance/sequence feed URL template
    pub distance_url: String,
    /// API key substituted for credential placeholders
    pub api_key: String,
}

impl FeedIngestConfig {
    /// Read the configuration from the environment. Both feed URLs are
    /// required; the API key is optional (some providers embed it).
    pub fn from_env() -> Result<Self, IngestError> {
        let station_url = std::env::var(STATION_URL_ENV).ok();
        let distance_url = std::env::var(DISTANCE_URL_ENV).ok();

        let missing: Vec<&str> = [
            (STATION_URL_ENV, &station_url),
            (DISTANCE_URL_ENV, &distance_url),
        ]
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(IngestError::MissingEnv(missing.join(", ")));
        }

        Ok(Self {
            station_url: station_url.unwrap_or_default(),
            distance_url: distance_url.unwrap_or_default(),
            api_key: std::env::var(API_KEY_ENV).unwrap_or_default(),
        })
    }
}

/// What an ingestion run produced: (file name, station count) per
/// grouping.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub groupings: Vec<(String, usize)>,
}

/// Run the two-feed ingestion end to end.
///
/// Both fetches run concurrently and either failing aborts the run;
/// nothing is written until every grouping is assembled.
pub async fn run_feed_ingestion(
    client: &FeedClient,
    store: &GraphStore,
    config: &FeedIngestConfig,
) -> Result<IngestSummary, IngestError> {
    let station_url = fill_api_key(&config.station_url, &config.api_key);
    let distance_url = fill_api_key(&config.distance_url, &config.api_key);

    let (station_rows, distance_rows) = tokio::try_join!(
        client.fetch_rows(&station_url),
        client.fetch_rows(&distance_url),
    )?;

    if station_rows.is_empty() {
        return Err(IngestError::NoRows { url: station_url });
    }
    if distance_rows.is_empty() {
        return Err(IngestError::NoRows { url: distance_url });
    }
    info!(
        station_rows = station_rows.len(),
        distance_rows = distance_rows.len(),
        "fetched feeds"
    );

    let registry = station_records(&station_rows);
    if registry.is_empty() {
        return Err(IngestError::NoStationRecords);
    }

    let distance = distance_records(&distance_rows, &registry);
    if distance.is_empty() {
        // Recoverable: topology falls back to the registry's order
        // values or first-seen order.
        let sample = distance_rows
            .first()
            .map(|row| row.keys().collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        warn!(
            raw_keys = %sample,
            "distance normalization produced no records; using station records only"
        );
    }

    let topologies = collect_topologies(
        &registry,
        if distance.is_empty() { &registry } else { &distance },
    );

    let existing = store.load_merged().await?;
    let transfers = TransferIndex::from_graph(&existing);
    info!(
        prior_nodes = existing.len(),
        transfer_stations = transfers.len(),
        "recovered transfer relations from prior graph"
    );

    let groupings = assemble_line_groupings(&topologies, &transfers);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_holds_templates_verbatim() {
        let config = FeedIngestConfig {
            station_url: "http://api.test/{API_KEY}/stations".to_string(),
            distance_url: "http://api.test/(인증키)/distance".to_string(),
            api_key: "KEY".to_string(),
        };
        assert_eq!(
            fill_api_key(&config.station_url, &config.api_key),
            "http://api.test/KEY/stations"
        );
        assert_eq!(
            fill_api_key(&config.distance_url, &config.api_key),
            "http://api.test/KEY/distance"
        );
    }
}
