//! Breadth-first dependency discovery.
//!
//! One traversal owns its worklist and visited set. The first time an
//! identity is popped it is registered and (depth permitting) expanded;
//! later pops of the same identity are skipped. Every resolved reference
//! still records an edge, so cycles show up as edges in both directions.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::domain::graph::DependencyGraph;
use crate::ports::DependencySource;

#[derive(Debug, Clone, Copy)]
pub struct Traversal {
    pub max_depth: usize,
}

impl Traversal {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Discover the graph reachable from `root`.
    ///
    /// An unknown root yields an empty graph; callers decide whether that
    /// is fatal.
    pub fn run<S: DependencySource + ?Sized>(&self, source: &mut S, root: &str) -> DependencyGraph {
        let mut graph = DependencyGraph::new(root);
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        queue.push_back((root.to_string(), 0));

        while let Some((current, depth)) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }

            let Some(detail) = source.lookup(&current) else {
                warn!("Cannot find {}, dropping this branch", current);
                continue;
            };
            graph.add_node(&current, detail.clone());

            if depth >= self.max_depth {
                debug!("Depth limit reached at {}", current);
                continue;
            }
            if source.is_leaf(&current, &detail) {
                continue;
            }

            let references = source.references(&current, &detail);
            debug!("{} -> {} references", current, references.len());
            for next in references {
                graph.add_edge(&current, &next);
                if !visited.contains(&next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        let dropped = graph.prune_dangling_edges();
        if dropped > 0 {
            debug!("Dropped {} edges to unresolved nodes", dropped);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::NodeDetail;
    use std::collections::HashMap;

    /// In-memory source: identity -> references. Identities absent from the
    /// map are unknown.
    struct MapSource {
        refs: HashMap<&'static str, Vec<&'static str>>,
        leaves: Vec<&'static str>,
        expanded: Vec<String>,
    }

    impl MapSource {
        fn new(edges: &[(&'static str, &[&'static str])]) -> Self {
            Self {
                refs: edges.iter().map(|(k, v)| (*k, v.to_vec())).collect(),
                leaves: Vec::new(),
                expanded: Vec::new(),
            }
        }
    }

    impl DependencySource for MapSource {
        fn lookup(&mut self, id: &str) -> Option<NodeDetail> {
            self.refs.contains_key(id).then(|| NodeDetail::External { name: id.to_string() })
        }

        fn is_leaf(&self, id: &str, _detail: &NodeDetail) -> bool {
            self.leaves.iter().any(|leaf| *leaf == id)
        }

        fn references(&mut self, id: &str, _detail: &NodeDetail) -> Vec<String> {
            self.expanded.push(id.to_string());
            self.refs[id].iter().map(|s| s.to_string()).collect()
        }
    }

    fn ids(g: &DependencyGraph) -> Vec<&str> {
        g.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn cycle_terminates_with_one_edge_each_way() {
        let mut src = MapSource::new(&[("a", &["b"]), ("b", &["a"])]);
        let g = Traversal::new(10).run(&mut src, "a");
        assert_eq!(ids(&g), vec!["a", "b"]);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.degree("a"), (1, 1));
        assert_eq!(g.degree("b"), (1, 1));
    }

    #[test]
    fn depth_zero_registers_only_root() {
        let mut src = MapSource::new(&[("a", &["b"]), ("b", &[])]);
        let g = Traversal::new(0).run(&mut src, "a");
        assert_eq!(ids(&g), vec!["a"]);
        assert!(g.edges.is_empty());
        assert!(src.expanded.is_empty());
    }

    #[test]
    fn depth_bound_registers_frontier_without_expanding_it() {
        let mut src = MapSource::new(&[("a", &["b"]), ("b", &["c"]), ("c", &[])]);
        let g = Traversal::new(1).run(&mut src, "a");
        assert_eq!(ids(&g), vec!["a", "b"]);
        assert_eq!(src.expanded, vec!["a"]);
    }

    #[test]
    fn unknown_references_are_dropped() {
        let mut src = MapSource::new(&[("a", &["b", "ghost"]), ("b", &[])]);
        let g = Traversal::new(5).run(&mut src, "a");
        assert_eq!(ids(&g), vec!["a", "b"]);
        assert_eq!(g.edge_count(), 1);
        assert!(!g.contains("ghost"));
    }

    #[test]
    fn revisited_destination_still_gets_edge() {
        // a -> b, a -> c, c -> b: b is expanded once but has two incoming edges.
        let mut src = MapSource::new(&[("a", &["b", "c"]), ("b", &[]), ("c", &["b"])]);
        let g = Traversal::new(5).run(&mut src, "a");
        assert_eq!(g.degree("b"), (0, 2));
        assert_eq!(src.expanded.iter().filter(|id| *id == "b").count(), 1);
    }

    #[test]
    fn duplicate_references_keep_parallel_edges() {
        let mut src = MapSource::new(&[("a", &["b", "b"]), ("b", &[])]);
        let g = Traversal::new(5).run(&mut src, "a");
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn leaves_are_registered_but_not_expanded() {
        let mut src = MapSource::new(&[("a", &["lib"]), ("lib", &["x"]), ("x", &[])]);
        src.leaves.push("lib");
        let g = Traversal::new(5).run(&mut src, "a");
        assert_eq!(ids(&g), vec!["a", "lib"]);
    }

    #[test]
    fn unknown_root_gives_empty_graph() {
        let mut src = MapSource::new(&[]);
        let g = Traversal::new(5).run(&mut src, "nope");
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.root, "nope");
    }
}
