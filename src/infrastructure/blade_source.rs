//! Blade front end: locates `BUILD` manifests under a blade root and reads
//! target declarations from them.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::domain::graph::NodeDetail;
use crate::domain::manifest::{parse_manifest, TargetTable};
use crate::domain::target::{resolve_dep, TargetSpec};
use crate::ports::DependencySource;

pub const MANIFEST_FILE: &str = "BUILD";
pub const ROOT_MARKER: &str = "BLADE_ROOT";

/// Walk upward from `start` looking for a directory holding `BLADE_ROOT`.
pub fn find_blade_root(start: &Path) -> Option<PathBuf> {
    let start = fs::canonicalize(start).unwrap_or_else(|_| start.to_path_buf());
    start
        .ancestors()
        .find(|dir| dir.join(ROOT_MARKER).is_file())
        .map(Path::to_path_buf)
}

/// Parsed manifests for one traversal, keyed by manifest path.
/// Each manifest is read at most once; failures are cached as empty tables.
#[derive(Debug, Default)]
pub struct ManifestCache {
    tables: HashMap<PathBuf, TargetTable>,
    reads: usize,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target table of the manifest at `path`, parsing it on first use.
    pub fn table(&mut self, path: &Path, directory: &str) -> &TargetTable {
        if !self.tables.contains_key(path) {
            self.reads += 1;
            let table = load_manifest(path, directory);
            self.tables.insert(path.to_path_buf(), table);
        }
        &self.tables[path]
    }

    /// Number of manifests actually read from disk.
    pub fn reads(&self) -> usize {
        self.reads
    }
}

fn load_manifest(path: &Path, directory: &str) -> TargetTable {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Cannot read manifest {}: {}", path.display(), e);
            return TargetTable::new();
        }
    };
    match parse_manifest(&text, directory) {
        Ok(table) => {
            debug!("Parsed {} targets from {}", table.len(), path.display());
            table
        }
        Err(e) => {
            warn!("Failed to parse manifest {}: {}", path.display(), e);
            TargetTable::new()
        }
    }
}

/// Manifest-backed source for one target traversal.
pub struct BladeSource {
    root: PathBuf,
    cache: ManifestCache,
}

impl BladeSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: ManifestCache::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &ManifestCache {
        &self.cache
    }

    fn manifest_path(&self, dir: &str) -> PathBuf {
        self.root.join(dir).join(MANIFEST_FILE)
    }
}

impl DependencySource for BladeSource {
    fn lookup(&mut self, id: &str) -> Option<NodeDetail> {
        if let Some(name) = id.strip_prefix('#') {
            return Some(NodeDetail::External {
                name: name.to_string(),
            });
        }

        let spec = match TargetSpec::parse(id) {
            Ok(spec) => spec,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };
        let manifest = self.manifest_path(&spec.dir);
        if !manifest.is_file() {
            debug!("No {} in {}", MANIFEST_FILE, self.root.join(&spec.dir).display());
            return None;
        }

        self.cache
            .table(&manifest, &spec.dir)
            .get(&spec.name)
            .cloned()
            .map(NodeDetail::Target)
    }

    fn is_leaf(&self, _id: &str, detail: &NodeDetail) -> bool {
        detail.is_external()
    }

    fn references(&mut self, _id: &str, detail: &NodeDetail) -> Vec<String> {
        match detail {
            NodeDetail::Target(info) => info
                .deps
                .iter()
                .map(|dep| resolve_dep(dep, &info.directory))
                .collect(),
            _ => Vec::new(),
        }
    }
}
