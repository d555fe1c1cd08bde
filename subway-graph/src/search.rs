//! Exact-distance reachability with minimum-transfer tie-breaking.
//!
//! A hop along a line costs one unit of distance; stepping to the same
//! station on another line costs nothing but counts as one transfer.
//! This makes the query a 0/1-weighted shortest path, solved with the
//! deque variant of breadth-first search (Dijkstra specialized for edge
//! weights in {0, 1}): zero-cost transfer edges go to the front of the
//! queue, unit-cost line edges to the back, so nodes still come off the
//! queue in non-decreasing distance order.

use std::collections::{HashMap, VecDeque};

use crate::graph::{NameIndex, SubwayGraph};

/// One search result: a station name reachable at exactly the target
/// distance, with the fewest transfers achieving it and a representative
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub name: String,
    pub line: String,
    pub transfers: u32,
}

/// Find every station name whose minimum distance from `start_name` is
/// exactly `target_distance`.
///
/// Per reachable instance the best (distance, transfers) pair is tracked
/// lexicographically: distance first, then transfers. A name qualifies
/// only when its minimum distance across all instances equals the target
/// exactly; a name whose nearest instance is closer is never reported,
/// even if some farther instance of it sits at the target.
///
/// An unknown start name yields an empty result. Distance 0 yields the
/// start itself. Negative distances are unrepresentable here; callers
/// validate signed input before calling.
pub fn find_stations_at_distance(
    graph: &SubwayGraph,
    index: &NameIndex,
    start_name: &str,
    target_distance: usize,
) -> Vec<SearchHit> {
    let Some(start_ids) = index.get(start_name) else {
        return Vec::new();
    };

    // Best known (distance, transfers) per instance id.
    let mut best: HashMap<&str, (usize, u32)> = HashMap::new();
    let mut queue: VecDeque<(&str, usize, u32)> = VecDeque::new();

    for id in start_ids {
        if graph.get(id).is_some() {
            best.insert(id.as_str(), (0, 0));
            queue.push_back((id.as_str(), 0, 0));
        }
    }

    while let Some((id, distance, transfers)) = queue.pop_front() {
        // A better path to this instance was found after this state
        // was queued.
        if best.get(id).is_some_and(|&b| b < (distance, transfers)) {
            continue;
        }
        if distance >= target_distance {
            continue;
        }
        let Some(node) = graph.get(id) else { continue };

        for neighbor_id in &node.neighbors {
            // Dangling references into excluded external files.
            let Some(neighbor) = graph.get(neighbor_id) else {
                continue;
            };

            let is_transfer = neighbor.name == node.name && neighbor.line != node.line;
            let candidate = if is_transfer {
                (distance, transfers + 1)
            } else {
                (distance + 1, transfers)
            };

            if best
                .get(neighbor_id.as_str())
                .is_none_or(|&b| candidate < b)
            {
                best.insert(neighbor_id.as_str(), candidate);
                if is_transfer {
                    queue.push_front((neighbor_id.as_str(), candidate.0, candidate.1));
                } else {
                    queue.push_back((neighbor_id.as_str(), candidate.0, candidate.1));
                }
            }
        }
    }

    collect_hits(graph, &best, target_distance)
}

/// Group visited instances by display name and keep names whose minimum
/// distance is exactly the target.
fn collect_hits(
    graph: &SubwayGraph,
    best: &HashMap<&str, (usize, u32)>,
    target_distance: usize,
) -> Vec<SearchHit> {
    let mut min_distance: HashMap<&str, usize> = HashMap::new();
    for (id, (distance, _)) in best {
        let Some(node) = graph.get(id) else { continue };
        min_distance
            .entry(node.name.as_str())
            .and_modify(|d| *d = (*d).min(*distance))
            .or_insert(*distance);
    }

    // Per qualifying name: fewest transfers among instances at the
    // target distance, line label as deterministic tie-break.
    let mut hits: HashMap<&str, (u32, &str)> = HashMap::new();
    for (id, (distance, transfers)) in best {
        let Some(node) = graph.get(id) else { continue };
        if *distance != target_distance
            || min_distance.get(node.name.as_str()) != Some(&target_distance)
        {
            continue;
        }

        let candidate = (*transfers, node.line.as_str());
        hits.entry(node.name.as_str())
            .and_modify(|current| {
                if candidate < *current {
                    *current = candidate;
                }
            })
            .or_insert(candidate);
    }

    let mut results: Vec<SearchHit> = hits
        .into_iter()
        .map(|(name, (transfers, line))| SearchHit {
            name: name.to_string(),
            line: line.to_string(),
            transfers,
        })
        .collect();
    results.sort_by(|a, b| a.name.cmp(&b.name));
    results
}
