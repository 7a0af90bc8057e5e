//! Analysis use cases: run a traversal, project it, hand it to an exporter.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::api::dto::ModuleDto;
use crate::domain::graph::{DependencyGraph, NodeDetail};
use crate::domain::target::TargetSpec;
use crate::domain::traversal::Traversal;
use crate::error::{DepvizError, Result};
use crate::infrastructure::config::{BladeConfig, IncludeConfig};
use crate::infrastructure::include_source::{canonical, path_id};
use crate::infrastructure::{find_blade_root, BladeSource, IncludeResolver, IncludeSource};
use crate::ports::GraphExporter;

/// `#include` analysis of one or more source files.
pub struct IncludeAnalyzer {
    config: IncludeConfig,
    project_root: PathBuf,
}

impl IncludeAnalyzer {
    pub fn new(config: IncludeConfig, project_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            project_root: project_root.into(),
        }
    }

    /// Traverse the include graph rooted at `file`.
    pub fn analyze_file(&self, file: &Path) -> Result<DependencyGraph> {
        let root = canonical(file)
            .filter(|p| p.is_file())
            .ok_or_else(|| DepvizError::SourceNotFound(file.to_path_buf()))?;

        let resolver = IncludeResolver::new(self.config.resolved_search_paths());
        let mut source = IncludeSource::new(resolver, self.config.deep_system);
        let graph = Traversal::new(self.config.max_depth).run(&mut source, &path_id(&root));

        info!(
            "{}: {} files, {} includes",
            file.display(),
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Analyze every file independently, in parallel, keeping input order.
    /// Missing files are skipped; no analyzable file at all is an error.
    pub fn analyze_files(&self, files: &[PathBuf]) -> Result<Vec<ModuleDto>> {
        let modules: Vec<ModuleDto> = files
            .par_iter()
            .filter_map(|file| match self.analyze_file(file) {
                Ok(graph) => Some(ModuleDto::from_graph(&graph, &self.project_root)),
                Err(e) => {
                    warn!("Skipping {}: {}", file.display(), e);
                    None
                }
            })
            .collect();

        if modules.is_empty() {
            return Err(DepvizError::NoSources);
        }
        Ok(modules)
    }
}

/// Per-kind target counts of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetStats {
    pub by_kind: BTreeMap<String, usize>,
    pub external: usize,
}

impl TargetStats {
    pub fn from_graph(graph: &DependencyGraph) -> Self {
        let mut stats = TargetStats::default();
        for node in &graph.nodes {
            *stats.by_kind.entry(node.detail.kind_tag().to_string()).or_default() += 1;
            if let NodeDetail::External { .. } = node.detail {
                stats.external += 1;
            }
        }
        stats
    }
}

#[derive(Debug, Clone)]
pub struct TargetReport {
    pub graph: DependencyGraph,
    pub module: ModuleDto,
    pub stats: TargetStats,
}

/// Blade target analysis under one blade root.
pub struct TargetAnalyzer {
    root: PathBuf,
    max_depth: usize,
}

impl TargetAnalyzer {
    pub fn new(root: impl Into<PathBuf>, max_depth: usize) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DepvizError::MissingBladeRoot(root));
        }
        Ok(Self { root, max_depth })
    }

    /// Use the configured root, or discover one above `start_dir`.
    pub fn from_config(config: &BladeConfig, start_dir: &Path) -> Result<Self> {
        let root = match &config.root {
            Some(root) => root.clone(),
            None => find_blade_root(start_dir)
                .ok_or_else(|| DepvizError::BladeRootNotFound(start_dir.to_path_buf()))?,
        };
        Self::new(root, config.max_depth)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn analyze(&self, target: &str) -> Result<TargetReport> {
        let spec = TargetSpec::parse(target)?.to_string();

        let mut source = BladeSource::new(&self.root);
        let graph = Traversal::new(self.max_depth).run(&mut source, &spec);
        if !graph.contains(&spec) {
            return Err(DepvizError::TargetNotFound(spec));
        }

        info!(
            "{}: {} targets, {} dependencies, {} manifests read",
            spec,
            graph.node_count(),
            graph.edge_count(),
            source.cache().reads()
        );

        let module = ModuleDto::from_graph(&graph, &self.root);
        let stats = TargetStats::from_graph(&graph);
        Ok(TargetReport {
            graph,
            module,
            stats,
        })
    }
}

pub struct AnalyzeUsecase<'a> {
    pub exporter: &'a dyn GraphExporter,
}

impl<'a> AnalyzeUsecase<'a> {
    pub fn run(&self, modules: &[ModuleDto], export_path: &Path) -> std::io::Result<()> {
        self.exporter.export(modules, export_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn isolated(depth: usize) -> IncludeConfig {
        IncludeConfig {
            use_default_search_paths: false,
            max_depth: depth,
            ..IncludeConfig::default()
        }
    }

    #[test]
    fn missing_source_is_rejected() {
        let dir = tempdir().unwrap();
        let analyzer = IncludeAnalyzer::new(isolated(3), dir.path());
        let err = analyzer.analyze_file(&dir.path().join("nope.cpp")).unwrap_err();
        assert!(matches!(err, DepvizError::SourceNotFound(_)));
    }

    #[test]
    fn analyze_files_skips_missing_and_keeps_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.cpp"), "").unwrap();
        fs::write(dir.path().join("b.cpp"), "").unwrap();
        let analyzer = IncludeAnalyzer::new(isolated(3), dir.path());

        let files = vec![
            dir.path().join("b.cpp"),
            dir.path().join("missing.cpp"),
            dir.path().join("a.cpp"),
        ];
        let modules = analyzer.analyze_files(&files).unwrap();
        let names: Vec<&str> = modules.iter().map(|m| m.source_file.as_str()).collect();
        assert_eq!(names, vec!["b.cpp", "a.cpp"]);

        let none = analyzer.analyze_files(&[dir.path().join("missing.cpp")]);
        assert!(matches!(none, Err(DepvizError::NoSources)));
    }

    #[test]
    fn target_analyzer_rejects_bad_spec_and_missing_root() {
        let dir = tempdir().unwrap();
        let analyzer = TargetAnalyzer::new(dir.path(), 5).unwrap();
        assert!(matches!(
            analyzer.analyze("no_separator"),
            Err(DepvizError::InvalidTargetSpec(_))
        ));
        assert!(matches!(
            analyzer.analyze("a:x"),
            Err(DepvizError::TargetNotFound(_))
        ));
        assert!(matches!(
            TargetAnalyzer::new(dir.path().join("gone"), 5),
            Err(DepvizError::MissingBladeRoot(_))
        ));
    }

    #[test]
    fn stats_count_kinds_and_externals() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        fs::write(
            dir.path().join("a/BUILD"),
            "cc_binary(name='x', deps=[':y', '#ext', '#z'])\ncc_library(name='y')\n",
        )
        .unwrap();

        let report = TargetAnalyzer::new(dir.path(), 10).unwrap().analyze("a:x").unwrap();
        assert_eq!(report.stats.external, 2);
        assert_eq!(report.stats.by_kind.get("cc_binary"), Some(&1));
        assert_eq!(report.stats.by_kind.get("cc_library"), Some(&1));
        assert_eq!(report.stats.by_kind.get("external"), Some(&2));
    }

    #[test]
    fn usecase_writes_through_exporter() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.cpp"), "").unwrap();
        let modules = IncludeAnalyzer::new(isolated(1), dir.path())
            .analyze_files(&[dir.path().join("a.cpp")])
            .unwrap();

        let out = dir.path().join("graph.json");
        let usecase = AnalyzeUsecase {
            exporter: &crate::infrastructure::JsonExporter,
        };
        usecase.run(&modules, &out).unwrap();
        assert!(fs::read_to_string(&out).unwrap().contains("\"source_file\": \"a.cpp\""));
    }
}
