//! Per-line adjacency construction, transfer recovery, and output
//! partitioning.
//!
//! Assembly is two-phase: prior persisted state is loaded read-only into
//! a [`TransferIndex`] first, then the fresh build consults that index.
//! The index is passed explicitly; nothing here touches shared state.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use super::model::{StationInstance, SubwayGraph};

static SEOUL_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([1-9])호선$").unwrap());

/// Sanitized token of a line label for file naming: whitespace and
/// punctuation removed, `unknown` when nothing remains.
pub fn line_token(line: &str) -> String {
    let token: String = line
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || ('가'..='힣').contains(c))
        .collect();
    if token.is_empty() {
        "unknown".to_string()
    } else {
        token
    }
}

/// Output file name for a canonical line. Numeric Seoul lines get the
/// short `lineN.json` form.
pub fn line_file_name(line: &str) -> String {
    if let Some(caps) = SEOUL_LINE.captures(line) {
        return format!("line{}.json", &caps[1]);
    }
    if line == "분당선" {
        return "lineBunDang.json".to_string();
    }
    format!("line_{}.json", line_token(line))
}

/// Line-specific id suffix for a canonical line.
pub fn line_suffix(line: &str) -> String {
    if let Some(caps) = SEOUL_LINE.captures(line) {
        return caps[1].to_string();
    }
    if line == "분당선" {
        return "분당".to_string();
    }
    line_token(line)
}

/// Deterministic station-instance id: name plus the line suffix.
pub fn station_id(name: &str, line: &str) -> String {
    format!("{name}_{}", line_suffix(line))
}

fn transfer_key(line: &str, name: &str) -> String {
    format!("{line}|{name}")
}

/// Transfer relations recovered from a previously persisted graph:
/// `line|name` → the `line|name` keys it transfers to on other lines.
#[derive(Debug, Default)]
pub struct TransferIndex {
    relations: HashMap<String, BTreeSet<String>>,
}

impl TransferIndex {
    /// Read-only phase-one scan of the prior graph. Any neighbor link
    /// crossing lines between resolvable nodes is a transfer relation.
    pub fn from_graph(existing: &SubwayGraph) -> Self {
        let mut relations: HashMap<String, BTreeSet<String>> = HashMap::new();

        for node in existing.iter() {
            for neighbor_id in &node.neighbors {
                let Some(neighbor) = existing.get(neighbor_id) else {
                    continue;
                };
                if neighbor.line == node.line {
                    continue;
                }
                relations
                    .entry(transfer_key(&node.line, &node.name))
                    .or_default()
                    .insert(transfer_key(&neighbor.line, &neighbor.name));
            }
        }

        Self { relations }
    }

    /// Transfer targets for a (line, name), in sorted order.
    pub fn targets(&self, line: &str, name: &str) -> impl Iterator<Item = &String> {
        self.relations
            .get(&transfer_key(line, name))
            .into_iter()
            .flatten()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

/// One persisted output grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct LineGrouping {
    pub file_name: String,
    pub graph: SubwayGraph,
}

/// Build one line's instances with same-line neighbor links to the
/// immediately preceding and following station (none at the two ends).
pub fn build_line_adjacency(line: &str, stations: &[String]) -> SubwayGraph {
    let mut graph = SubwayGraph::new();

    for (idx, station) in stations.iter().enumerate() {
        let mut node = StationInstance::new(station_id(station, line), station, line);
        if idx > 0 {
            node.push_neighbor(&station_id(&stations[idx - 1], line));
        }
        if idx + 1 < stations.len() {
            node.push_neighbor(&station_id(&stations[idx + 1], line));
        }
        graph.insert(node);
    }

    graph
}

/// Assemble all line groupings: fresh same-line adjacency per topology,
/// transfer links reattached from the prior-state index, partitioned by
/// line file.
pub fn assemble_line_groupings(
    topologies: &[(String, Vec<String>)],
    transfers: &TransferIndex,
) -> Vec<LineGrouping> {
    let mut merged = SubwayGraph::new();
    let mut id_by_line_station: HashMap<String, String> = HashMap::new();

    for (line, stations) in topologies {
        for station in stations {
            id_by_line_station.insert(transfer_key(line, station), station_id(station, line));
        }
        merged.merge(build_line_adjacency(line, stations));
    }

    for node in merged.iter_mut() {
        let targets: Vec<&String> = transfers.targets(&node.line, &node.name).collect();
        for target in targets {
            if let Some(id) = id_by_line_station.get(target) {
                node.push_neighbor(id);
            }
        }
    }

    partition_by_line(&merged)
}

/// Cross-link every pair of same-name instances on different lines.
/// Used by the single-provider pipeline, which has no prior state to
/// recover transfers from.
pub fn link_same_name_transfers(graph: &mut SubwayGraph) {
    let ids_by_name = graph.name_index();

    for ids in ids_by_name.values() {
        if ids.len() < 2 {
            continue;
        }
        for id in ids {
            let Some(node) = graph.get_mut(id) else { continue };
            for other in ids {
                if other != id {
                    node.push_neighbor(other);
                }
            }
        }
    }
}

/// Partition a merged graph into per-line-file groupings, sorted for
/// deterministic output.
pub fn partition_by_line(graph: &SubwayGraph) -> Vec<LineGrouping> {
    let mut nodes: Vec<&StationInstance> = graph.iter().collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    let mut groupings: Vec<LineGrouping> = Vec::new();
    for node in nodes {
        let file_name = line_file_name(&node.line);
        match groupings.iter_mut().find(|g| g.file_name == file_name) {
            Some(grouping) => grouping.graph.insert(node.clone()),
            None => {
                let mut fresh = SubwayGraph::new();
                fresh.insert(node.clone());
                groupings.push(LineGrouping {
                    file_name,
                    graph: fresh,
                });
            }
        }
    }

    groupings.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    groupings
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn station_names() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::hash_set("[A-Z][a-z]{1,6}", 2..12)
            .prop_map(|set| set.into_iter().collect())
    }

    proptest! {
        /// Fresh same-line adjacency is always symmetric.
        #[test]
        fn adjacency_symmetric(stations in station_names()) {
            let graph = build_line_adjacency("2호선", &stations);
            for node in graph.iter() {
                for neighbor_id in &node.neighbors {
                    let neighbor = graph.get(neighbor_id).unwrap();
                    prop_assert!(neighbor.neighbors.contains(&node.id));
                }
            }
        }

        /// Interior stations get two links, end stations one.
        #[test]
        fn adjacency_degree(stations in station_names()) {
            let graph = build_line_adjacency("2호선", &stations);
            for (idx, station) in stations.iter().enumerate() {
                let node = graph.get(&station_id(station, "2호선")).unwrap();
                let expected = if idx == 0 || idx + 1 == stations.len() { 1 } else { 2 };
                prop_assert_eq!(node.neighbors.len(), expected);
            }
        }
    }
}
