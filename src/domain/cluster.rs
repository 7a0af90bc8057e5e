//! Cluster classification.
//!
//! File nodes are bucketed by directory heuristics, checked in order:
//! known third-party libraries, system headers, generated output, then the
//! project tree. Target nodes are bucketed by their manifest directory.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Component, Path};

use crate::domain::graph::NodeDetail;

/// Path fragments identifying third-party libraries, in priority order.
pub const THIRD_PARTY_LIBS: &[(&str, &str)] = &[
    ("boost", "Boost"),
    ("absl", "Abseil"),
    ("brpc", "bRPC"),
    ("bthread", "bThread"),
    ("butil", "bUtil"),
    ("gflags", "gflags"),
    ("glog", "glog"),
    ("google/protobuf", "Protobuf"),
    ("tbb", "TBB"),
    ("mysql++", "MySQL++"),
    ("rapidjson", "RapidJSON"),
];

/// System directory prefixes, most specific first.
pub const SYSTEM_PREFIXES: &[(&str, &str)] = &[
    ("/usr/include/c++", "C++ Standard Library"),
    ("/usr/lib/gcc", "C++ Standard Library"),
    ("/usr/include", "Linux Headers"),
    ("/usr", "Other"),
];

/// Directory fragment marking build output.
pub const GENERATED_MARKER: &str = "build64_release";

const PROJECT_SEGMENTS: usize = 3;

/// Cluster categories in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClusterCategory {
    Project,
    ThirdParty,
    Generated,
    System,
    External,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cluster {
    pub category: ClusterCategory,
    pub label: String,
}

impl Cluster {
    fn new(category: ClusterCategory, label: impl Into<String>) -> Self {
        Self {
            category,
            label: label.into(),
        }
    }
}

impl Ord for Cluster {
    fn cmp(&self, other: &Self) -> Ordering {
        self.category
            .cmp(&other.category)
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl PartialOrd for Cluster {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Classify any node.
pub fn classify(detail: &NodeDetail, project_root: &Path) -> Cluster {
    match detail {
        NodeDetail::File { path, .. } => classify_file(path, project_root),
        NodeDetail::Target(info) => classify_directory(&info.directory),
        NodeDetail::External { name } => {
            Cluster::new(ClusterCategory::External, format!("External/{}", name))
        }
    }
}

/// Classify a file by the directory that contains it.
pub fn classify_file(path: &Path, project_root: &Path) -> Cluster {
    let directory = path.parent().unwrap_or(Path::new(""));
    let dir_str = directory.to_string_lossy();

    if let Some((_, name)) = THIRD_PARTY_LIBS
        .iter()
        .find(|(fragment, _)| dir_str.contains(fragment))
    {
        return Cluster::new(ClusterCategory::ThirdParty, format!("Third-Party/{}", name));
    }

    if let Some((_, name)) = SYSTEM_PREFIXES
        .iter()
        .find(|(prefix, _)| dir_str.starts_with(prefix))
    {
        return Cluster::new(ClusterCategory::System, format!("System/{}", name));
    }

    if dir_str.contains(GENERATED_MARKER) {
        return Cluster::new(ClusterCategory::Generated, "Generated/Proto Files");
    }

    let relative = directory.strip_prefix(project_root).unwrap_or(directory);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .take(PROJECT_SEGMENTS)
        .collect();

    if segments.is_empty() {
        Cluster::new(ClusterCategory::Project, "Project/Root")
    } else {
        Cluster::new(ClusterCategory::Project, format!("Project/{}", segments.join("/")))
    }
}

/// Classify a build target by its manifest directory.
pub fn classify_directory(directory: &str) -> Cluster {
    if directory.is_empty() {
        Cluster::new(ClusterCategory::Other, "Other")
    } else {
        Cluster::new(ClusterCategory::Project, directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::target::{TargetInfo, TargetKind};
    use std::path::PathBuf;

    fn file_cluster(path: &str) -> String {
        classify_file(Path::new(path), Path::new("/work/proj")).label
    }

    #[test]
    fn third_party_beats_system() {
        assert_eq!(file_cluster("/usr/include/boost/asio.hpp"), "Third-Party/Boost");
        assert_eq!(
            file_cluster("/usr/local/include/google/protobuf/message.h"),
            "Third-Party/Protobuf"
        );
    }

    #[test]
    fn system_subcategories() {
        assert_eq!(file_cluster("/usr/include/c++/8/vector"), "System/C++ Standard Library");
        assert_eq!(file_cluster("/usr/lib/gcc/x86_64/8/include/stddef.h"), "System/C++ Standard Library");
        assert_eq!(file_cluster("/usr/include/stdio.h"), "System/Linux Headers");
        assert_eq!(file_cluster("/usr/local/include/foo.h"), "System/Other");
    }

    #[test]
    fn generated_files() {
        assert_eq!(
            file_cluster("/work/proj/build64_release/ads/proto/msg.pb.h"),
            "Generated/Proto Files"
        );
    }

    #[test]
    fn project_paths_are_compressed_to_three_segments() {
        assert_eq!(file_cluster("/work/proj/main.cpp"), "Project/Root");
        assert_eq!(file_cluster("/work/proj/ads/show/x.h"), "Project/ads/show");
        assert_eq!(file_cluster("/work/proj/a/b/c/d/e.h"), "Project/a/b/c");
        assert_eq!(file_cluster("/opt/elsewhere/x/y.h"), "Project/opt/elsewhere/x");
    }

    #[test]
    fn target_and_external_clusters() {
        let target = NodeDetail::Target(TargetInfo {
            kind: TargetKind::CcLibrary,
            name: "x".into(),
            directory: "ads/show".into(),
            deps: vec![],
            srcs: vec![],
            hdrs: vec![],
        });
        let root = PathBuf::from("/");
        assert_eq!(classify(&target, &root).label, "ads/show");
        let ext = NodeDetail::External { name: "glog".into() };
        assert_eq!(classify(&ext, &root).label, "External/glog");
        assert_eq!(classify_directory("").label, "Other");
    }

    #[test]
    fn category_order_project_first_system_last() {
        let mut clusters = vec![
            Cluster::new(ClusterCategory::System, "System/Other"),
            Cluster::new(ClusterCategory::Generated, "Generated/Proto Files"),
            Cluster::new(ClusterCategory::Project, "Project/b"),
            Cluster::new(ClusterCategory::ThirdParty, "Third-Party/Boost"),
            Cluster::new(ClusterCategory::Project, "Project/a"),
        ];
        clusters.sort();
        let labels: Vec<&str> = clusters.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Project/a", "Project/b", "Third-Party/Boost", "Generated/Proto Files", "System/Other"]
        );
    }
}
