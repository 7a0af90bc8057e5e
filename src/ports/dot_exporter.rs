//! Dependency DOT Exporter
//!
//! Exports module records as Graphviz DOT, grouping nodes into cluster
//! subgraphs and coloring them by weight.

use std::collections::BTreeMap;

use crate::api::dto::{ModuleDto, NodeDto};
use crate::domain::metric::{format_size, weight_color};
use crate::ports::GraphExporter;

const HEAVY_WEIGHT: u64 = 200 * 1024;
const LARGE_WEIGHT: u64 = 50 * 1024;

pub struct DotExporter;

impl GraphExporter for DotExporter {
    fn render(&self, modules: &[ModuleDto]) -> String {
        modules
            .iter()
            .enumerate()
            .map(|(i, m)| Self::to_dot(m, i))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DotExporter {
    /// Convert one module to a DOT digraph.
    pub fn to_dot(module: &ModuleDto, index: usize) -> String {
        let mut lines = Vec::new();

        lines.push(format!("digraph Dependencies_{} {{", index));
        lines.push(format!("    label=\"{}\";", Self::escape_label(&module.source_file)));
        lines.push("    rankdir=LR;".to_string()); // Left to right
        lines.push("    node [shape=box, style=\"filled,rounded\", fontname=\"Helvetica\"];".to_string());
        lines.push("    edge [color=\"#55555533\", arrowsize=0.5, weight=1];".to_string());
        lines.push("    compound=true;".to_string());
        lines.push("    concentrate=true;".to_string());

        // Clusters in order of first appearance; nodes are already sorted
        // by level, then cluster priority.
        let mut clusters: Vec<(&str, Vec<&NodeDto>)> = Vec::new();
        for node in &module.nodes {
            match clusters.iter_mut().find(|(name, _)| *name == node.cluster) {
                Some((_, members)) => members.push(node),
                None => clusters.push((node.cluster.as_str(), vec![node])),
            }
        }

        for (cluster_id, (name, nodes)) in clusters.iter().enumerate() {
            lines.push("".to_string());
            lines.push(format!("    subgraph cluster_{} {{", cluster_id));
            lines.push(format!("        label=\"{}\";", Self::escape_label(name)));
            lines.push("        style=filled;".to_string());
            lines.push("        color=lightgrey;".to_string());
            lines.push("        fillcolor=\"#f5f5f5\";".to_string());
            for node in nodes {
                let label = format!("{}\\n({})", Self::escape_label(&node.name), format_size(node.size));
                let penwidth = if node.is_source { "3.0" } else { "1.0" };
                lines.push(format!(
                    "        \"{}\" [label=\"{}\", fillcolor=\"{}\", penwidth={}];",
                    Self::escape_label(&node.id),
                    label,
                    weight_color(node.size),
                    penwidth
                ));
            }
            lines.push("    }".to_string());
        }

        lines.push("".to_string());

        let cluster_of: BTreeMap<&str, &str> = module
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.cluster.as_str()))
            .collect();

        // Light edges first, heavy ones drawn on top
        let mut edges: Vec<_> = module.links.iter().collect();
        edges.sort_by_key(|e| e.size);

        for edge in edges {
            let cross_cluster = cluster_of.get(edge.source.as_str()) != cluster_of.get(edge.target.as_str());
            let style = Self::edge_style(edge.size, cross_cluster);
            lines.push(format!(
                "    \"{}\" -> \"{}\" [{}];",
                Self::escape_label(&edge.source),
                Self::escape_label(&edge.target),
                style
            ));
        }

        lines.push("}".to_string());

        lines.join("\n")
    }

    fn edge_style(dst_size: u64, cross_cluster: bool) -> String {
        if dst_size > HEAVY_WEIGHT {
            "color=\"#B71C1C\", penwidth=2.5, weight=5".to_string()
        } else if dst_size > LARGE_WEIGHT {
            "color=\"#EF9A9A\", penwidth=1.5, weight=3".to_string()
        } else if cross_cluster {
            "color=\"#1E88E5\", penwidth=1.2, weight=2".to_string()
        } else {
            "weight=1".to_string()
        }
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}
