// Dependency graph structures for depviz.
// Represents files or build targets and their "depends on" relationships.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::target::TargetInfo;

/// Metadata captured for a node when it is first registered.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDetail {
    /// A source or header file, identified by its canonical path.
    File { path: PathBuf, size: u64 },
    /// A build target declared in a manifest.
    Target(TargetInfo),
    /// A `#name` dependency outside the source tree. Never expanded.
    External { name: String },
}

impl NodeDetail {
    /// Display name: file basename, target name, or external library name.
    pub fn display_name(&self) -> String {
        match self {
            NodeDetail::File { path, .. } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            NodeDetail::Target(info) => info.name.clone(),
            NodeDetail::External { name } => name.clone(),
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self, NodeDetail::External { .. })
    }

    /// Tag used by renderers and statistics ("file", "external" or the target kind).
    pub fn kind_tag(&self) -> &'static str {
        match self {
            NodeDetail::File { .. } => "file",
            NodeDetail::Target(info) => info.kind.as_str(),
            NodeDetail::External { .. } => "external",
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        match self {
            NodeDetail::File { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// A node in the dependency graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: String, // canonical identity
    pub detail: NodeDetail,
}

/// A directed "from depends on to" edge. Parallel edges are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// The graph produced by one traversal. Nodes keep discovery order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    pub root: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
    index: HashMap<String, usize>,
}

impl DependencyGraph {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Register a node. Returns false when the identity was already present;
    /// the first registration wins.
    pub fn add_node(&mut self, id: &str, detail: NodeDetail) -> bool {
        if self.index.contains_key(id) {
            return false;
        }
        self.index.insert(id.to_string(), self.nodes.len());
        self.nodes.push(GraphNode {
            id: id.to_string(),
            detail,
        });
        true
    }

    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Drop edges whose destination was never registered.
    /// Returns the number of removed edges.
    pub fn prune_dangling_edges(&mut self) -> usize {
        let before = self.edges.len();
        let index = &self.index;
        self.edges.retain(|e| index.contains_key(&e.to));
        before - self.edges.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges touching `id` as (outgoing, incoming), duplicates included.
    pub fn degree(&self, id: &str) -> (usize, usize) {
        self.edges.iter().fold((0, 0), |(out, inc), e| {
            (
                out + usize::from(e.from == id),
                inc + usize::from(e.to == id),
            )
        })
    }
}
