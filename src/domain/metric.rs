//! Node weights used for layout and sizing.
//!
//! Files weigh their byte size. Targets get a synthesized score that grows
//! with declared sources, then headers, then dependencies.

use crate::domain::graph::NodeDetail;
use crate::domain::target::TargetInfo;

pub const TARGET_BASE_WEIGHT: u64 = 10_000;
pub const SRC_WEIGHT: u64 = 5_000;
pub const HDR_WEIGHT: u64 = 2_000;
pub const DEP_WEIGHT: u64 = 1_000;
pub const EXTERNAL_WEIGHT: u64 = 5_000;

/// Fill colors by weight, smallest bucket first.
pub const WEIGHT_COLORS: &[(u64, &str)] = &[
    (10 * 1024, "#E8F5E9"),
    (50 * 1024, "#FFF9C4"),
    (200 * 1024, "#FFCC80"),
    (u64::MAX, "#EF9A9A"),
];

pub fn weight(detail: &NodeDetail) -> u64 {
    match detail {
        NodeDetail::File { size, .. } => *size,
        NodeDetail::Target(info) => target_weight(info),
        NodeDetail::External { .. } => EXTERNAL_WEIGHT,
    }
}

pub fn target_weight(info: &TargetInfo) -> u64 {
    TARGET_BASE_WEIGHT
        + info.srcs.len() as u64 * SRC_WEIGHT
        + info.hdrs.len() as u64 * HDR_WEIGHT
        + info.deps.len() as u64 * DEP_WEIGHT
}

pub fn weight_color(weight: u64) -> &'static str {
    WEIGHT_COLORS
        .iter()
        .find(|(threshold, _)| weight < *threshold)
        .map(|(_, color)| *color)
        .unwrap_or(WEIGHT_COLORS[WEIGHT_COLORS.len() - 1].1)
}

/// Human readable size, e.g. `12.5KB`.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB"] {
        if size < 1024.0 {
            return format!("{:.1}{}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1}GB", size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::target::TargetKind;
    use std::path::PathBuf;

    fn target(srcs: usize, hdrs: usize, deps: usize) -> TargetInfo {
        TargetInfo {
            kind: TargetKind::CcLibrary,
            name: "t".into(),
            directory: "d".into(),
            deps: vec![":x".into(); deps],
            srcs: vec!["a.cc".into(); srcs],
            hdrs: vec!["a.h".into(); hdrs],
        }
    }

    #[test]
    fn more_sources_never_weigh_less() {
        for n in 0..5 {
            assert!(target_weight(&target(n + 1, 2, 3)) >= target_weight(&target(n, 2, 3)));
        }
    }

    #[test]
    fn sources_outweigh_headers_outweigh_deps() {
        assert!(target_weight(&target(1, 0, 0)) > target_weight(&target(0, 1, 0)));
        assert!(target_weight(&target(0, 1, 0)) > target_weight(&target(0, 0, 1)));
        assert_eq!(target_weight(&target(0, 0, 0)), TARGET_BASE_WEIGHT);
    }

    #[test]
    fn file_and_external_weights() {
        let file = NodeDetail::File {
            path: PathBuf::from("/a.h"),
            size: 4321,
        };
        assert_eq!(weight(&file), 4321);
        assert_eq!(weight(&NodeDetail::External { name: "z".into() }), EXTERNAL_WEIGHT);
    }

    #[test]
    fn color_buckets() {
        assert_eq!(weight_color(0), "#E8F5E9");
        assert_eq!(weight_color(20 * 1024), "#FFF9C4");
        assert_eq!(weight_color(100 * 1024), "#FFCC80");
        assert_eq!(weight_color(u64::MAX), "#EF9A9A");
    }

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(512), "512.0B");
        assert_eq!(format_size(2048), "2.0KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0MB");
    }
}
