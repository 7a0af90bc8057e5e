//! Preprocessed (`.i`) file attribution.
//!
//! Counts the non-blank lines each original file contributes to a
//! preprocessor output, using the `# <line> "<file>"` markers it contains.

use std::collections::HashMap;
use std::io::{self, BufRead};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

static LINE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^#\s+\d+\s+"([^"]+)""#).expect("valid line marker regex"));

const PROGRESS_INTERVAL: usize = 100_000;

#[derive(Debug, Clone, PartialEq)]
pub struct LineAttribution {
    /// Every line read, markers and blanks included.
    pub total_lines: usize,
    /// (file, code lines), most lines first, ties by name.
    pub files: Vec<(String, usize)>,
}

impl LineAttribution {
    pub fn code_lines(&self) -> usize {
        self.files.iter().map(|(_, n)| n).sum()
    }

    /// Share of code lines, in percent.
    pub fn percentage(&self, lines: usize) -> f64 {
        let total = self.code_lines().max(1);
        lines as f64 * 100.0 / total as f64
    }
}

pub fn attribute_lines<R: BufRead>(reader: R) -> io::Result<LineAttribution> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut current = String::from("unknown");
    let mut total_lines = 0;

    for chunk in reader.split(b'\n') {
        let bytes = chunk?;
        let line = String::from_utf8_lossy(&bytes);
        total_lines += 1;
        if total_lines % PROGRESS_INTERVAL == 0 {
            debug!("Processed {} lines", total_lines);
        }

        if let Some(caps) = LINE_MARKER.captures(&line) {
            current = caps[1].to_string();
        } else if !line.trim().is_empty() {
            *counts.entry(current.clone()).or_default() += 1;
        }
    }

    let mut files: Vec<(String, usize)> = counts.into_iter().collect();
    files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ok(LineAttribution { total_lines, files })
}
