//! Rebuild the per-line graph files from the two national feeds.

use std::process;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use subway_graph::feed::{FeedClient, FeedClientConfig};
use subway_graph::graph::GraphStore;
use subway_graph::pipeline::{FeedIngestConfig, run_feed_ingestion};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    if let Err(e) = run().await {
        error!("{e}");
        process::exit(1);
    }
}

async fn run() -> Result<(), subway_graph::pipeline::IngestError> {
    let config = FeedIngestConfig::from_env()?;
    let client = FeedClient::new(FeedClientConfig::default())?;
    let store = GraphStore::from_env();

    let summary = run_feed_ingestion(&client, &store, &config).await?;
    for (file_name, stations) in &summary.groupings {
        info!(file = %file_name, stations, "wrote line file");
    }
    info!(lines = summary.groupings.len(), "line data updated");
    Ok(())
}
