//! `#include` front end: resolves include directives against search paths
//! and reads them from source files on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::domain::graph::NodeDetail;
use crate::ports::DependencySource;

static INCLUDE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*#\s*include\s+(["<])([^">]+)[">]"#).expect("valid include regex")
});

/// Paths under this prefix are system headers.
pub const SYSTEM_PREFIX: &str = "/usr/";

/// One `#include` directive as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    pub name: String,
    /// `"name"` rather than `<name>`.
    pub quoted: bool,
}

/// Extract include directives from source text, in order.
pub fn scan_includes(source: &str) -> Vec<IncludeDirective> {
    source
        .lines()
        .filter_map(|line| INCLUDE_PATTERN.captures(line))
        .map(|caps| IncludeDirective {
            quoted: &caps[1] == "\"",
            name: caps[2].to_string(),
        })
        .collect()
}

/// Maps include names to canonical file paths.
#[derive(Debug, Clone)]
pub struct IncludeResolver {
    search_paths: Vec<PathBuf>,
}

impl IncludeResolver {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Quoted includes try the including file's directory first; then every
    /// search path is probed in order. `None` when nothing matches.
    pub fn resolve(&self, directive: &IncludeDirective, current_dir: &Path) -> Option<PathBuf> {
        let local = directive
            .quoted
            .then(|| current_dir.join(&directive.name));

        local
            .into_iter()
            .chain(self.search_paths.iter().map(|dir| dir.join(&directive.name)))
            .find(|candidate| candidate.is_file())
            .and_then(|found| canonical(&found))
    }
}

/// Canonical absolute form of an existing path.
pub fn canonical(path: &Path) -> Option<PathBuf> {
    fs::canonicalize(path).ok()
}

pub fn path_id(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Filesystem-backed source for one include traversal.
pub struct IncludeSource {
    resolver: IncludeResolver,
    deep_system: bool,
}

impl IncludeSource {
    pub fn new(resolver: IncludeResolver, deep_system: bool) -> Self {
        Self {
            resolver,
            deep_system,
        }
    }

    fn read_source(path: &Path) -> Option<String> {
        match fs::read(path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                None
            }
        }
    }
}

impl DependencySource for IncludeSource {
    fn lookup(&mut self, id: &str) -> Option<NodeDetail> {
        let path = PathBuf::from(id);
        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Some(NodeDetail::File { path, size })
    }

    fn is_leaf(&self, id: &str, _detail: &NodeDetail) -> bool {
        !self.deep_system && id.starts_with(SYSTEM_PREFIX)
    }

    fn references(&mut self, id: &str, _detail: &NodeDetail) -> Vec<String> {
        let path = Path::new(id);
        let Some(text) = Self::read_source(path) else {
            return Vec::new();
        };
        let current_dir = path.parent().unwrap_or(Path::new("/"));

        scan_includes(&text)
            .iter()
            .filter_map(|directive| {
                let resolved = self.resolver.resolve(directive, current_dir);
                if resolved.is_none() {
                    debug!("Unresolved include {} in {}", directive.name, id);
                }
                resolved
            })
            .map(|p| path_id(&p))
            .collect()
    }
}
