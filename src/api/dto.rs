//! Flat graph records handed to renderers.
//!
//! A [`ModuleDto`] is everything a renderer needs: identities are final,
//! weights and clusters are precomputed, and nodes are already in
//! presentation order (level, then cluster, then name).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::cluster::{classify, Cluster};
use crate::domain::graph::{DependencyGraph, NodeDetail};
use crate::domain::level::{assign_levels, level_of};
use crate::domain::metric::weight;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleDto {
    /// Display name of the analysis root.
    pub source_file: String,
    pub source_path: String,
    pub nodes: Vec<NodeDto>,
    pub links: Vec<EdgeDto>,
    pub node_count: usize,
    pub edge_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: String,
    pub name: String,
    pub path: String,
    pub size: u64,
    pub cluster: String,
    pub is_source: bool,
    pub level: usize,
    pub dep_count: usize,
    pub dependent_count: usize,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srcs_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdrs_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDto {
    pub source: String,
    pub target: String,
    /// Weight of the destination node.
    pub size: u64,
}

impl ModuleDto {
    /// Project a finished graph. `project_root` anchors `Project/...` clusters.
    pub fn from_graph(graph: &DependencyGraph, project_root: &Path) -> Self {
        let levels = assign_levels(&graph.root, &graph.edges);

        let mut degrees: HashMap<&str, (usize, usize)> = HashMap::new();
        for edge in &graph.edges {
            degrees.entry(edge.from.as_str()).or_default().0 += 1;
            degrees.entry(edge.to.as_str()).or_default().1 += 1;
        }

        let mut ranked: Vec<(Cluster, NodeDto)> = graph
            .nodes
            .iter()
            .map(|node| {
                let cluster = classify(&node.detail, project_root);
                let (dep_count, dependent_count) =
                    degrees.get(node.id.as_str()).copied().unwrap_or_default();
                let (kind, srcs_count, hdrs_count) = match &node.detail {
                    NodeDetail::File { .. } => (None, None, None),
                    NodeDetail::Target(info) => (
                        Some(info.kind.to_string()),
                        Some(info.srcs.len()),
                        Some(info.hdrs.len()),
                    ),
                    NodeDetail::External { .. } => (Some("external".to_string()), Some(0), Some(0)),
                };
                let dto = NodeDto {
                    id: node.id.clone(),
                    name: node.detail.display_name(),
                    path: node.id.clone(),
                    size: weight(&node.detail),
                    cluster: cluster.label.clone(),
                    is_source: node.id == graph.root,
                    level: level_of(&levels, &node.id),
                    dep_count,
                    dependent_count,
                    kind,
                    srcs_count,
                    hdrs_count,
                };
                (cluster, dto)
            })
            .collect();

        ranked.sort_by(|(ca, a), (cb, b)| {
            a.level
                .cmp(&b.level)
                .then_with(|| ca.cmp(cb))
                .then_with(|| a.name.cmp(&b.name))
        });
        let nodes: Vec<NodeDto> = ranked.into_iter().map(|(_, dto)| dto).collect();

        let weights: HashMap<&str, u64> = nodes.iter().map(|n| (n.id.as_str(), n.size)).collect();
        let links: Vec<EdgeDto> = graph
            .edges
            .iter()
            .map(|e| EdgeDto {
                source: e.from.clone(),
                target: e.to.clone(),
                size: weights.get(e.to.as_str()).copied().unwrap_or(0),
            })
            .collect();

        let source_file = graph
            .node(&graph.root)
            .and_then(|n| n.detail.file_path().map(|_| n.detail.display_name()))
            .unwrap_or_else(|| graph.root.clone());

        ModuleDto {
            source_file,
            source_path: graph.root.clone(),
            node_count: nodes.len(),
            edge_count: links.len(),
            nodes,
            links,
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeDto> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
