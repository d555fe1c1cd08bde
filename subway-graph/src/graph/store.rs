//! Reading and writing persisted per-line graph files.
//!
//! Each grouping is one pretty-printed JSON object keyed by station
//! instance id. The files are rewritten wholesale on each ingestion run;
//! there is no incremental mutation.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::assemble::LineGrouping;
use super::model::SubwayGraph;

/// Default data directory, shared with the presentation layer.
const DEFAULT_DATA_DIR: &str = "public/data";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SUBWAY_DATA_DIR";

/// Errors from graph persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A grouping file is not valid graph JSON
    #[error("corrupt graph file {path}: {message}")]
    Corrupt { path: String, message: String },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    fn corrupt(path: &Path, message: impl ToString) -> Self {
        Self::Corrupt {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }
}

/// Handle on the per-line graph file directory.
#[derive(Debug, Clone)]
pub struct GraphStore {
    dir: PathBuf,
}

impl GraphStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the directory from `SUBWAY_DATA_DIR`, defaulting to
    /// `public/data`.
    pub fn from_env() -> Self {
        let dir = std::env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load and union every `.json` grouping in the directory.
    ///
    /// A missing directory reads as an empty graph: the first ingestion
    /// run has no prior state.
    pub async fn load_merged(&self) -> Result<SubwayGraph, StoreError> {
        let mut graph = SubwayGraph::new();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(graph),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| StoreError::io(&path, e))?;
            let fragment: SubwayGraph =
                serde_json::from_str(&text).map_err(|e| StoreError::corrupt(&path, e))?;
            graph.merge(fragment);
        }

        Ok(graph)
    }

    /// Load specific grouping files leniently, as raw JSON node objects,
    /// for validation. Every requested file must exist.
    pub async fn load_raw(&self, files: &[&str]) -> Result<HashMap<String, Value>, StoreError> {
        let mut nodes = HashMap::new();

        for file in files {
            let path = self.dir.join(file);
            let text = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| StoreError::io(&path, e))?;
            let fragment: HashMap<String, Value> =
                serde_json::from_str(&text).map_err(|e| StoreError::corrupt(&path, e))?;
            nodes.extend(fragment);
        }

        Ok(nodes)
    }

    /// Write each grouping as pretty JSON. Writes have no ordering
    /// dependency and run concurrently.
    pub async fn write_groupings(&self, groupings: &[LineGrouping]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io(&self.dir, e))?;

        let writes = groupings.iter().map(|grouping| {
            let path = self.dir.join(&grouping.file_name);
            async move {
                // Sort by id so reruns produce byte-identical files.
                let ordered: BTreeMap<_, _> = grouping.graph.nodes().iter().collect();
                let body =
                    to_pretty_json(&ordered).map_err(|e| StoreError::corrupt(&path, e))?;
                tokio::fs::write(&path, body)
                    .await
                    .map_err(|e| StoreError::io(&path, e))?;
                info!(
                    file = %grouping.file_name,
                    stations = grouping.graph.len(),
                    "wrote line grouping"
                );
                Ok::<(), StoreError>(())
            }
        });

        futures::future::try_join_all(writes).await?;
        Ok(())
    }
}

/// Serialize with 4-space indentation and a trailing newline, matching
/// the persisted file format the presentation layer already consumes.
fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::assemble::build_line_adjacency;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn round_trip_reproduces_ids_and_neighbors() {
        let tmp = tempfile::tempdir().unwrap();
        let store = GraphStore::new(tmp.path());

        let mut merged = SubwayGraph::new();
        merged.merge(build_line_adjacency("2호선", &names(&["교대", "강남", "역삼"])));
        merged.merge(build_line_adjacency("신분당선", &names(&["강남", "양재"])));
        let groupings = crate::graph::assemble::partition_by_line(&merged);

        store.write_groupings(&groupings).await.unwrap();
        let loaded = store.load_merged().await.unwrap();

        assert_eq!(loaded, merged);
    }

    #[tokio::test]
    async fn missing_directory_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = GraphStore::new(tmp.path().join("nope"));
        assert!(store.load_merged().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_json_files_are_ignored_on_load() {
        let tmp = tempfile::tempdir().unwrap();
        tokio::fs::write(tmp.path().join("README.md"), "# notes")
            .await
            .unwrap();
        let store = GraphStore::new(tmp.path());
        assert!(store.load_merged().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_grouping_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        tokio::fs::write(tmp.path().join("line2.json"), "{broken")
            .await
            .unwrap();
        let store = GraphStore::new(tmp.path());
        assert!(matches!(
            store.load_merged().await,
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn load_raw_requires_every_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = GraphStore::new(tmp.path());
        assert!(matches!(
            store.load_raw(&["line1.json"]).await,
            Err(StoreError::Io { .. })
        ));
    }

    #[test]
    fn pretty_json_uses_four_space_indent_and_trailing_newline() {
        let mut graph = SubwayGraph::new();
        graph.insert(crate::graph::StationInstance::new("강남_2", "강남", "2호선"));
        let body = to_pretty_json(&graph).unwrap();
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("    \"강남_2\""));
        assert!(text.ends_with("}\n"));
    }
}
