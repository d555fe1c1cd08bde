//! Check the persisted Seoul line files for structural problems.
//!
//! Asymmetric neighbor pairs within the managed set are reported as
//! warnings; malformed entries are errors and fail the run.

use std::process;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use subway_graph::graph::{GraphStore, MANAGED_LINE_FILES, StoreError, validate};

const MAX_REPORTED_WARNINGS: usize = 100;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    match run().await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

async fn run() -> Result<bool, StoreError> {
    let store = GraphStore::from_env();
    let nodes = store.load_raw(MANAGED_LINE_FILES).await?;
    let report = validate(&nodes);

    for warning in report.warnings.iter().take(MAX_REPORTED_WARNINGS) {
        warn!("{warning}");
    }
    if report.warnings.len() > MAX_REPORTED_WARNINGS {
        warn!(
            suppressed = report.warnings.len() - MAX_REPORTED_WARNINGS,
            "further warnings suppressed"
        );
    }

    for err in &report.errors {
        error!("{err}");
    }

    if report.is_clean() {
        info!(
            stations = nodes.len(),
            warnings = report.warnings.len(),
            "validation passed"
        );
    }
    Ok(report.is_clean())
}
