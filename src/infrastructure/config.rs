//! Analyzer configuration.
//!
//! Values come from three layers: built-in defaults, an optional TOML file,
//! and command-line overrides applied by the caller.
//!
//! ```toml
//! [includes]
//! search_paths = ["third_party/include"]
//! use_default_search_paths = true
//! max_depth = 3
//! deep_system = false
//!
//! [blade]
//! root = "/home/me/repo"
//! max_depth = 10
//!
//! [project]
//! root = "."
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DepvizError, Result};

/// Include search paths probed after the including file's own directory.
pub const DEFAULT_INCLUDE_PATHS: &[&str] = &[
    ".",
    "build64_release",
    "/usr/include",
    "/usr/local/include",
    "/usr/lib/gcc/x86_64-redhat-linux/8/include",
    "/usr/include/c++/8",
    "/usr/include/c++/8/x86_64-redhat-linux",
];

pub const DEFAULT_INCLUDE_DEPTH: usize = 3;
pub const DEFAULT_BLADE_DEPTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IncludeConfig {
    /// Extra search paths, appended after the defaults.
    pub search_paths: Vec<PathBuf>,
    pub use_default_search_paths: bool,
    pub max_depth: usize,
    pub deep_system: bool,
}

impl Default for IncludeConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            use_default_search_paths: true,
            max_depth: DEFAULT_INCLUDE_DEPTH,
            deep_system: false,
        }
    }
}

impl IncludeConfig {
    /// Effective search path list, in probe order.
    pub fn resolved_search_paths(&self) -> Vec<PathBuf> {
        let defaults = DEFAULT_INCLUDE_PATHS
            .iter()
            .map(PathBuf::from)
            .filter(|_| self.use_default_search_paths);
        defaults.chain(self.search_paths.iter().cloned()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BladeConfig {
    /// Directory holding `BLADE_ROOT`; discovered from the working
    /// directory when unset.
    pub root: Option<PathBuf>,
    pub max_depth: usize,
}

impl Default for BladeConfig {
    fn default() -> Self {
        Self {
            root: None,
            max_depth: DEFAULT_BLADE_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Base for `Project/...` clusters; the working directory when unset.
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub includes: IncludeConfig,
    pub blade: BladeConfig,
    pub project: ProjectConfig,
}

impl AnalyzerConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| DepvizError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| DepvizError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Defaults when `path` is `None`.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Project root for clustering: configured, else the working directory.
    pub fn project_root(&self) -> PathBuf {
        let root = self
            .project
            .root
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        fs::canonicalize(&root).unwrap_or(root)
    }
}
