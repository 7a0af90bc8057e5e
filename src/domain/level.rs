//! Level assignment: shortest hop count from the root over recorded edges.

use std::collections::{HashMap, VecDeque};

use crate::domain::graph::Edge;

/// Level given to nodes with no recorded path from the root.
pub const UNREACHABLE_LEVEL: usize = 999;

/// Shortest-hop levels keyed by node identity. Nodes missing from the map
/// are unreachable; use [`level_of`] to apply the sentinel.
pub fn assign_levels(root: &str, edges: &[Edge]) -> HashMap<String, usize> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        adjacency.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
    }

    let mut levels: HashMap<String, usize> = HashMap::new();
    levels.insert(root.to_string(), 0);
    let mut queue = VecDeque::from([(root, 0usize)]);

    while let Some((current, level)) = queue.pop_front() {
        for &next in adjacency.get(current).into_iter().flatten() {
            if !levels.contains_key(next) {
                levels.insert(next.to_string(), level + 1);
                queue.push_back((next, level + 1));
            }
        }
    }

    levels
}

pub fn level_of(levels: &HashMap<String, usize>, id: &str) -> usize {
    levels.get(id).copied().unwrap_or(UNREACHABLE_LEVEL)
}
