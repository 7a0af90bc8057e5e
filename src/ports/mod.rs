use std::path::Path;

use crate::api::dto::ModuleDto;
use crate::domain::graph::NodeDetail;

pub mod dot_exporter;

/// A front end that knows how to look up nodes and read their references.
///
/// Implementations absorb every per-node failure: an unknown identity is
/// `None`, an unreadable node has no references.
pub trait DependencySource {
    /// Metadata for `id`, or `None` when it cannot be found.
    fn lookup(&mut self, id: &str) -> Option<NodeDetail>;

    /// Nodes that are registered but never expanded.
    fn is_leaf(&self, _id: &str, _detail: &NodeDetail) -> bool {
        false
    }

    /// Canonical identities `id` refers to, in declaration order.
    fn references(&mut self, id: &str, detail: &NodeDetail) -> Vec<String>;
}

pub trait GraphExporter {
    fn render(&self, modules: &[ModuleDto]) -> String;

    fn export(&self, modules: &[ModuleDto], path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.render(modules))
    }
}
