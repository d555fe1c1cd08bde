//! Rebuild the Seoul numbered-line graph files from the Seoul open-data API.

use std::process;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use subway_graph::feed::{FeedClient, FeedClientConfig};
use subway_graph::graph::GraphStore;
use subway_graph::pipeline::{SEOUL_LINES, SeoulLinesConfig, run_seoul_lines};

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
    let config = SeoulLinesConfig::from_env()?;
    let client = FeedClient::new(FeedClientConfig::default())?;
    let store = GraphStore::from_env();

    info!(lines = SEOUL_LINES.len(), "fetching Seoul lines");
    let summary = run_seoul_lines(&client, &store, &config).await?;
    for (file_name, stations) in &summary.groupings {
        info!(file = %file_name, stations, "wrote line file");
    }
    Ok(())
}
