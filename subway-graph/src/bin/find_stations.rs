//! Query the persisted graph: which stations are exactly N stops away?
//!
//! Usage: find-stations <station-name> <distance>

use std::process;

use tracing::error;
use tracing_subscriber::EnvFilter;

use subway_graph::graph::{GraphStore, StoreError};
use subway_graph::normalize::normalize_station_name;
use subway_graph::search::find_stations_at_distance;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [station, distance] = args.as_slice() else {
        eprintln!("usage: find-stations <station-name> <distance>");
        process::exit(2);
    };

    let Ok(distance) = distance.parse::<i64>() else {
        eprintln!("distance must be an integer, got {distance:?}");
        process::exit(2);
    };
    if distance < 0 {
        eprintln!("distance must be non-negative, got {distance}");
        process::exit(2);
    }

    if let Err(e) = run(station, distance as usize).await {
        error!("{e}");
        process::exit(1);
    }
}

async fn run(station: &str, distance: usize) -> Result<(), StoreError> {
    let store = GraphStore::from_env();
    let graph = store.load_merged().await?;
    let index = graph.name_index();

    let start = normalize_station_name(station);
    let hits = find_stations_at_distance(&graph, &index, &start, distance);

    if hits.is_empty() {
        println!("no stations found {distance} stops from {start}");
        return Ok(());
    }

    for hit in hits {
        println!(
            "{} ({}, {} transfer{})",
            hit.name,
            hit.line,
            hit.transfers,
            if hit.transfers == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
