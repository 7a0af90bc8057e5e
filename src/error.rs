//! Error types for depviz.
//!
//! Only failures that make a requested analysis meaningless are errors:
//! a bad target spec, a missing root, an unreadable config. Everything that
//! goes wrong for a single node during traversal is logged and absorbed.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::manifest::Pos;

/// Result type for depviz operations.
pub type Result<T> = std::result::Result<T, DepvizError>;

/// Configuration-level failures that reject a whole analysis request.
#[derive(Debug, Error)]
pub enum DepvizError {
    #[error("invalid target spec `{0}`, expected `path/to/dir:target_name`")]
    InvalidTargetSpec(String),

    #[error("no BLADE_ROOT found in {} or any parent directory", .0.display())]
    BladeRootNotFound(PathBuf),

    #[error("blade root does not exist: {}", .0.display())]
    MissingBladeRoot(PathBuf),

    #[error("target {0} not found")]
    TargetNotFound(String),

    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("no source files could be analyzed")]
    NoSources,

    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Syntax error in a manifest. Fatal for that manifest only.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("line {line}, column {column}: {message}")]
pub struct ManifestError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ManifestError {
    pub fn new(at: Pos, message: impl Into<String>) -> Self {
        Self {
            line: at.line,
            column: at.column,
            message: message.into(),
        }
    }
}
