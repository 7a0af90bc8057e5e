//! Benchmarks for include traversal and graph projection.
//!
//! Run with: `cargo bench`

use std::fs;
use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use depviz::api::dto::ModuleDto;
use depviz::application::IncludeAnalyzer;
use depviz::infrastructure::config::IncludeConfig;
use tempfile::tempdir;

// ═══════════════════════════════════════════════════════════════════════════
// Synthetic Data Generators
// ═══════════════════════════════════════════════════════════════════════════

/// Layered header tree: every header in layer `n` includes `fan_out`
/// headers of layer `n + 1`, wrapping around so headers are shared.
fn create_include_tree(root: &Path, layers: usize, width: usize, fan_out: usize) {
    for layer in 0..layers {
        for i in 0..width {
            let mut text = String::new();
            if layer + 1 < layers {
                for k in 0..fan_out {
                    text.push_str(&format!("#include \"h_{}_{}.h\"\n", layer + 1, (i + k) % width));
                }
            }
            text.push_str(&format!("struct S_{}_{} {{ int v; }};\n", layer, i));
            fs::write(root.join(format!("h_{}_{}.h", layer, i)), text).unwrap();
        }
    }
    let mut main = String::new();
    for i in 0..width {
        main.push_str(&format!("#include \"h_0_{}.h\"\n", i));
    }
    fs::write(root.join("main.cpp"), main).unwrap();
}

fn config(depth: usize) -> IncludeConfig {
    IncludeConfig {
        use_default_search_paths: false,
        max_depth: depth,
        ..IncludeConfig::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Benchmarks
// ═══════════════════════════════════════════════════════════════════════════

fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("include_traversal");

    for width in [10usize, 50, 200] {
        let dir = tempdir().unwrap();
        create_include_tree(dir.path(), 4, width, 3);
        let analyzer = IncludeAnalyzer::new(config(8), dir.path());
        let main = dir.path().join("main.cpp");

        group.bench_with_input(BenchmarkId::new("width", width), &width, |b, _| {
            b.iter(|| black_box(analyzer.analyze_file(&main).unwrap()))
        });
    }

    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    create_include_tree(dir.path(), 5, 100, 4);
    let graph = IncludeAnalyzer::new(config(10), dir.path())
        .analyze_file(&dir.path().join("main.cpp"))
        .unwrap();

    c.bench_function("module_projection", |b| {
        b.iter(|| black_box(ModuleDto::from_graph(&graph, dir.path())))
    });
}

criterion_group!(benches, bench_traversal, bench_projection);
criterion_main!(benches);
