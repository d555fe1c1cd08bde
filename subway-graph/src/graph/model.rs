//! Graph node and container types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One (station name, line) pair as a distinct graph node.
///
/// `neighbors` holds the immediate same-line predecessor/successor ids
/// plus zero or more transfer links to same-name instances on other lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationInstance {
    pub id: String,
    pub name: String,
    pub line: String,
    pub neighbors: Vec<String>,
}

impl StationInstance {
    pub fn new(id: impl Into<String>, name: impl Into<String>, line: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            line: line.into(),
            neighbors: Vec::new(),
        }
    }

    /// Append a neighbor id unless already present.
    pub fn push_neighbor(&mut self, id: &str) {
        if !self.neighbors.iter().any(|existing| existing == id) {
            self.neighbors.push(id.to_string());
        }
    }
}

/// Display name → instance ids. One name maps to multiple ids at
/// transfer hubs.
pub type NameIndex = HashMap<String, Vec<String>>;

/// The station-instance graph: instance id → instance.
///
/// Serialized transparently, so a persisted grouping file is a plain
/// id-keyed JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubwayGraph {
    nodes: HashMap<String, StationInstance>,
}

impl SubwayGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: StationInstance) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub fn get(&self, id: &str) -> Option<&StationInstance> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut StationInstance> {
        self.nodes.get_mut(id)
    }

    /// Union another graph into this one. Colliding ids are replaced.
    pub fn merge(&mut self, other: SubwayGraph) {
        self.nodes.extend(other.nodes);
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationInstance> {
        self.nodes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StationInstance> {
        self.nodes.values_mut()
    }

    pub fn nodes(&self) -> &HashMap<String, StationInstance> {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Build the display-name → ids index. Ids are sorted so the index
    /// is deterministic.
    pub fn name_index(&self) -> NameIndex {
        let mut index: NameIndex = HashMap::new();
        for node in self.nodes.values() {
            index.entry(node.name.clone()).or_default().push(node.id.clone());
        }
        for ids in index.values_mut() {
            ids.sort();
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_neighbor_deduplicates() {
        let mut node = StationInstance::new("강남_2", "강남", "2호선");
        node.push_neighbor("역삼_2");
        node.push_neighbor("역삼_2");
        node.push_neighbor("교대_2");
        assert_eq!(node.neighbors, vec!["역삼_2", "교대_2"]);
    }

    #[test]
    fn merge_unions_and_replaces() {
        let mut a = SubwayGraph::new();
        a.insert(StationInstance::new("강남_2", "강남", "2호선"));

        let mut b = SubwayGraph::new();
        let mut replacement = StationInstance::new("강남_2", "강남", "2호선");
        replacement.push_neighbor("역삼_2");
        b.insert(replacement);
        b.insert(StationInstance::new("양재_신분당", "양재", "신분당선"));

        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get("강남_2").unwrap().neighbors, vec!["역삼_2"]);
    }

    #[test]
    fn name_index_collects_all_instances_sorted() {
        let mut graph = SubwayGraph::new();
        graph.insert(StationInstance::new("강남_신분당", "강남", "신분당선"));
        graph.insert(StationInstance::new("강남_2", "강남", "2호선"));
        graph.insert(StationInstance::new("역삼_2", "역삼", "2호선"));

        let index = graph.name_index();
        assert_eq!(index["강남"], vec!["강남_2", "강남_신분당"]);
        assert_eq!(index["역삼"], vec!["역삼_2"]);
    }

    #[test]
    fn serializes_as_plain_id_keyed_object() {
        let mut graph = SubwayGraph::new();
        graph.insert(StationInstance::new("강남_2", "강남", "2호선"));

        let json = serde_json::to_value(&graph).unwrap();
        assert!(json.get("강남_2").is_some());
        assert_eq!(json["강남_2"]["line"], "2호선");

        let back: SubwayGraph = serde_json::from_value(json).unwrap();
        assert_eq!(back, graph);
    }
}
