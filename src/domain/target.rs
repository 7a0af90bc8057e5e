//! Build target identities.
//!
//! A target is named `dir:name`, where `dir` is the manifest directory
//! relative to the blade root (empty for the root itself). Dependency
//! references inside a manifest come in four shapes:
//!
//! - `#name` - an external library, kept verbatim as its own identity
//! - `:name` - a sibling target in the same manifest
//! - `//dir:name` - a root-relative target
//! - anything else - passed through unchanged

use std::fmt;

use crate::error::DepvizError;

/// The fixed vocabulary of manifest statements that declare a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetKind {
    CcLibrary,
    CcBinary,
    CcTest,
    ProtoLibrary,
    CcPlugin,
    LexYaccLibrary,
    ResourceLibrary,
    SwigLibrary,
    GenRule,
    ForeignCcLibrary,
}

impl TargetKind {
    pub const ALL: [TargetKind; 10] = [
        TargetKind::CcLibrary,
        TargetKind::CcBinary,
        TargetKind::CcTest,
        TargetKind::ProtoLibrary,
        TargetKind::CcPlugin,
        TargetKind::LexYaccLibrary,
        TargetKind::ResourceLibrary,
        TargetKind::SwigLibrary,
        TargetKind::GenRule,
        TargetKind::ForeignCcLibrary,
    ];

    /// Map a manifest call name to a target kind.
    pub fn from_call(name: &str) -> Option<TargetKind> {
        Self::ALL.iter().copied().find(|k| k.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::CcLibrary => "cc_library",
            TargetKind::CcBinary => "cc_binary",
            TargetKind::CcTest => "cc_test",
            TargetKind::ProtoLibrary => "proto_library",
            TargetKind::CcPlugin => "cc_plugin",
            TargetKind::LexYaccLibrary => "lex_yacc_library",
            TargetKind::ResourceLibrary => "resource_library",
            TargetKind::SwigLibrary => "swig_library",
            TargetKind::GenRule => "gen_rule",
            TargetKind::ForeignCcLibrary => "foreign_cc_library",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared metadata of one target, as recorded from its manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetInfo {
    pub kind: TargetKind,
    pub name: String,
    /// Manifest directory relative to the blade root ("" for the root).
    pub directory: String,
    /// Raw dependency references, unresolved.
    pub deps: Vec<String>,
    pub srcs: Vec<String>,
    pub hdrs: Vec<String>,
}

/// A parsed `dir:name` target specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetSpec {
    pub dir: String,
    pub name: String,
}

impl TargetSpec {
    /// Parse and canonicalize a target spec such as `//ads/show:server`.
    pub fn parse(spec: &str) -> Result<TargetSpec, DepvizError> {
        let (path_part, name) = spec
            .split_once(':')
            .ok_or_else(|| DepvizError::InvalidTargetSpec(spec.to_string()))?;
        if name.is_empty() {
            return Err(DepvizError::InvalidTargetSpec(spec.to_string()));
        }
        let path_part = path_part.strip_prefix("//").unwrap_or(path_part);
        Ok(TargetSpec {
            dir: normalize_dir(path_part),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dir, self.name)
    }
}

/// Collapse `.` segments, empty segments and trailing slashes.
pub fn normalize_dir(dir: &str) -> String {
    dir.split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolve a raw dependency reference declared in the manifest at `current_dir`.
pub fn resolve_dep(dep: &str, current_dir: &str) -> String {
    if dep.starts_with('#') {
        return dep.to_string();
    }
    if let Some(name) = dep.strip_prefix(':') {
        return format!("{}:{}", normalize_dir(current_dir), name);
    }
    // `//a/b:x`, `a/b/:x` and `a/./b:x` all name the same target.
    let rest = dep.strip_prefix("//").unwrap_or(dep);
    match TargetSpec::parse(rest) {
        Ok(spec) => spec.to_string(),
        Err(_) => rest.to_string(),
    }
}
