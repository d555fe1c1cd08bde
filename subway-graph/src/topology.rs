//! Per-line station-order reconstruction.
//!
//! Feeds are inconsistent about ordering: some carry authoritative
//! sequence numbers, some only carry (station → next-station) adjacency
//! pairs, and some carry neither. Reconstruction therefore runs in tiers:
//! explicit order values win, then a walk over the directed edge graph,
//! then first-seen feed order.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};

use crate::normalize::LineRecord;

/// Everything observed about one line during an ingestion run.
#[derive(Debug, Clone, Default)]
pub struct LineObservations {
    /// (station, order value) pairs from rows carrying an explicit order
    pub ordered: Vec<(String, f64)>,
    /// Directed (station, next-station) adjacency pairs
    pub edges: Vec<(String, String)>,
    /// Every station mention, in feed order
    pub fallback: Vec<String>,
}

/// Group normalized records by line and reconstruct each line's station
/// order. Distance records contribute order values, edges, and fallback
/// mentions; registry records contribute order values and fallback only.
pub fn collect_topologies(
    registry: &[LineRecord],
    distance: &[LineRecord],
) -> Vec<(String, Vec<String>)> {
    let mut by_line: Vec<(String, LineObservations)> = Vec::new();

    for record in distance {
        let obs = observations_for(&mut by_line, &record.line);
        if let Some(order) = record.order {
            obs.ordered.push((record.station.clone(), order));
        }
        if !record.next_station.is_empty() {
            obs.edges
                .push((record.station.clone(), record.next_station.clone()));
        }
        obs.fallback.push(record.station.clone());
    }

    for record in registry {
        let obs = observations_for(&mut by_line, &record.line);
        if let Some(order) = record.order {
            obs.ordered.push((record.station.clone(), order));
        }
        obs.fallback.push(record.station.clone());
    }

    by_line
        .into_iter()
        .map(|(line, obs)| (line, reconstruct(&obs)))
        .collect()
}

fn observations_for<'a>(
    by_line: &'a mut Vec<(String, LineObservations)>,
    line: &str,
) -> &'a mut LineObservations {
    let pos = match by_line.iter().position(|(name, _)| name == line) {
        Some(pos) => pos,
        None => {
            by_line.push((line.to_string(), LineObservations::default()));
            by_line.len() - 1
        }
    };
    &mut by_line[pos].1
}

/// Derive the definitive station order for one line.
pub fn reconstruct(obs: &LineObservations) -> Vec<String> {
    let mut stations = order_by_value(&obs.ordered);

    if stations.is_empty() && !obs.edges.is_empty() {
        stations = order_from_edges(&obs.edges);
    }

    if stations.is_empty() {
        stations = obs.fallback.clone();
    }

    dedup_non_empty(stations)
}

/// Order-value tier: minimum order per station, ascending, first-seen
/// order breaking ties (stable sort).
fn order_by_value(ordered: &[(String, f64)]) -> Vec<String> {
    if ordered.is_empty() {
        return Vec::new();
    }

    let mut best: HashMap<&str, f64> = HashMap::new();
    let mut names: Vec<&str> = Vec::new();
    for (name, order) in ordered {
        match best.entry(name.as_str()) {
            Entry::Occupied(mut entry) => {
                if *order < *entry.get() {
                    entry.insert(*order);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(*order);
                names.push(name);
            }
        }
    }

    names.sort_by(|a, b| {
        best[a]
            .partial_cmp(&best[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    names.into_iter().map(str::to_string).collect()
}

/// Edge tier: breadth-first walk over the directed adjacency graph,
/// seeded from zero-in-degree nodes (or an arbitrary deterministic node
/// when none exist, e.g. a cycle). Unreached fragments are appended in
/// first-seen order.
fn order_from_edges(edges: &[(String, String)]) -> Vec<String> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut indegree: HashMap<&str, usize> = HashMap::new();
    let mut all_nodes: Vec<&str> = Vec::new();
    let mut known: HashSet<&str> = HashSet::new();

    for (from, to) in edges {
        for node in [from.as_str(), to.as_str()] {
            if known.insert(node) {
                all_nodes.push(node);
            }
        }

        let outgoing = adjacency.entry(from.as_str()).or_default();
        if !outgoing.contains(&to.as_str()) {
            outgoing.push(to.as_str());
            *indegree.entry(to.as_str()).or_default() += 1;
        }
        indegree.entry(from.as_str()).or_default();
    }

    let starts: Vec<&str> = all_nodes
        .iter()
        .copied()
        .filter(|node| indegree.get(node).copied().unwrap_or(0) == 0)
        .collect();

    let mut queue: VecDeque<&str> = if starts.is_empty() {
        all_nodes.first().copied().into_iter().collect()
    } else {
        starts.into_iter().collect()
    };

    let mut visited: HashSet<&str> = HashSet::new();
    let mut ordered: Vec<String> = Vec::new();

    while let Some(current) = queue.pop_front() {
        if !visited.insert(current) {
            continue;
        }
        ordered.push(current.to_string());

        if let Some(nexts) = adjacency.get(current) {
            for next in nexts {
                if !visited.contains(next) {
                    queue.push_back(next);
                }
            }
        }
    }

    for node in all_nodes {
        if !visited.contains(node) {
            ordered.push(node.to_string());
        }
    }

    ordered
}

fn dedup_non_empty(stations: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    stations
        .into_iter()
        .filter(|station| !station.is_empty() && seen.insert(station.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs() -> LineObservations {
        LineObservations::default()
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn order_values_win_with_min_collapse() {
        let mut o = obs();
        // Duplicate observations across feeds keep the minimum order.
        o.ordered = vec![
            ("B".into(), 2.0),
            ("A".into(), 1.0),
            ("B".into(), 9.0),
            ("C".into(), 3.5),
        ];
        o.edges = vec![("C".into(), "A".into())]; // must be ignored
        assert_eq!(reconstruct(&o), names(&["A", "B", "C"]));
    }

    #[test]
    fn order_ties_break_by_first_seen() {
        let mut o = obs();
        o.ordered = vec![("B".into(), 1.0), ("A".into(), 1.0), ("C".into(), 0.5)];
        assert_eq!(reconstruct(&o), names(&["C", "B", "A"]));
    }

    #[test]
    fn edges_reconstruct_a_simple_path() {
        let mut o = obs();
        o.edges = vec![
            ("S2".into(), "S3".into()),
            ("S1".into(), "S2".into()),
        ];
        assert_eq!(reconstruct(&o), names(&["S1", "S2", "S3"]));
    }

    #[test]
    fn cycle_still_covers_all_nodes_deterministically() {
        let mut o = obs();
        o.edges = vec![
            ("S1".into(), "S2".into()),
            ("S2".into(), "S3".into()),
            ("S3".into(), "S1".into()),
        ];
        // No zero-in-degree node: the walk seeds from the first-seen node.
        assert_eq!(reconstruct(&o), names(&["S1", "S2", "S3"]));
    }

    #[test]
    fn disconnected_fragment_is_appended() {
        let mut o = obs();
        o.edges = vec![
            ("A".into(), "B".into()),
            ("X".into(), "Y".into()),
            ("Y".into(), "X".into()),
        ];
        let result = reconstruct(&o);
        assert_eq!(&result[..2], &names(&["A", "B"])[..]);
        assert_eq!(result.len(), 4);
        assert!(result.contains(&"X".to_string()));
        assert!(result.contains(&"Y".to_string()));
    }

    #[test]
    fn fallback_uses_first_seen_order() {
        let mut o = obs();
        o.fallback = names(&["C", "A", "C", "B", ""]);
        assert_eq!(reconstruct(&o), names(&["C", "A", "B"]));
    }

    #[test]
    fn reconstruction_is_idempotent_on_an_ordered_sequence() {
        let mut first = obs();
        first.ordered = vec![("A".into(), 1.0), ("B".into(), 2.0), ("C".into(), 3.0)];
        let sequence = reconstruct(&first);

        let mut second = obs();
        second.ordered = sequence
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx as f64))
            .collect();
        assert_eq!(reconstruct(&second), sequence);

        // And through the fallback tier as well.
        let mut third = obs();
        third.fallback = sequence.clone();
        assert_eq!(reconstruct(&third), sequence);
    }

    #[test]
    fn collect_topologies_groups_by_line() {
        let registry = vec![
            LineRecord {
                line: "2호선".into(),
                station: "강남".into(),
                next_station: String::new(),
                order: Some(1.0),
            },
            LineRecord {
                line: "2호선".into(),
                station: "역삼".into(),
                next_station: String::new(),
                order: Some(2.0),
            },
            LineRecord {
                line: "경춘선".into(),
                station: "상봉".into(),
                next_station: String::new(),
                order: None,
            },
        ];
        let distance = vec![LineRecord {
            line: "경춘선".into(),
            station: "상봉".into(),
            next_station: "망우".into(),
            order: None,
        }];

        let topologies = collect_topologies(&registry, &distance);
        assert_eq!(topologies.len(), 2);

        let line2 = topologies.iter().find(|(l, _)| l == "2호선").unwrap();
        assert_eq!(line2.1, names(&["강남", "역삼"]));

        // No order values for 경춘선: edges decide.
        let gyeongchun = topologies.iter().find(|(l, _)| l == "경춘선").unwrap();
        assert_eq!(gyeongchun.1, names(&["상봉", "망우"]));
    }
}
