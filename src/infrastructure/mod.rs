// Infrastructure implementations for depviz.

pub mod blade_source;
pub mod concurrency;
pub mod config;
pub mod include_source;

pub use blade_source::{find_blade_root, BladeSource, ManifestCache};
pub use include_source::{IncludeResolver, IncludeSource};

use crate::api::dto::ModuleDto;
use crate::ports::GraphExporter;

/// Writes module records as a pretty-printed JSON array.
pub struct JsonExporter;

impl GraphExporter for JsonExporter {
    fn render(&self, modules: &[ModuleDto]) -> String {
        // Plain data with string keys; serialization cannot fail.
        serde_json::to_string_pretty(modules).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trips_modules() {
        let module = ModuleDto {
            source_file: "a:x".into(),
            source_path: "a:x".into(),
            nodes: vec![],
            links: vec![],
            node_count: 0,
            edge_count: 0,
        };
        let text = JsonExporter.render(&[module.clone()]);
        let back: Vec<ModuleDto> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, vec![module]);
    }
}
