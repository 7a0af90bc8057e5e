// Core graph model and algorithms. Nothing here touches the filesystem.

pub mod cluster;
pub mod graph;
pub mod level;
pub mod line_markers;
pub mod manifest;
pub mod metric;
pub mod target;
pub mod traversal;
