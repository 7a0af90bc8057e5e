// Command-line entry point for depviz.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use depviz::api::dto::ModuleDto;
use depviz::api::server;
use depviz::application::{AnalyzeUsecase, IncludeAnalyzer, TargetAnalyzer};
use depviz::domain::line_markers::attribute_lines;
use depviz::infrastructure::concurrency::init_thread_pool;
use depviz::infrastructure::config::AnalyzerConfig;
use depviz::infrastructure::JsonExporter;
use depviz::ports::dot_exporter::DotExporter;

const DEFAULT_JSON_OUTPUT: &str = "dependency_graph.json";
const DEFAULT_BLADE_JSON_OUTPUT: &str = "blade_dependency_graph.json";
const DEFAULT_DOT_OUTPUT: &str = "dependencies.dot";

#[derive(Parser, Debug)]
#[command(author, version, about = "Dependency graphs for C/C++ includes and Blade targets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow `#include` directives from one or more source files
    Includes {
        /// Source files to analyze
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Extra include search path (repeatable)
        #[arg(short = 'I', long = "include")]
        include: Vec<PathBuf>,

        /// Maximum include depth
        #[arg(long)]
        depth: Option<usize>,

        /// Also expand headers under /usr/
        #[arg(long)]
        deep_system: bool,

        /// Do not probe the built-in search paths
        #[arg(long)]
        no_default_paths: bool,

        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,

        /// Output file path (ignored with --format both)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Base directory for project clusters
        #[arg(long)]
        project_root: Option<PathBuf>,

        /// Worker threads (default: half the cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Follow Blade target dependencies from one target
    Blade {
        /// Target such as //path/to/dir:name
        target: String,

        /// Directory holding BLADE_ROOT (discovered upward when omitted)
        #[arg(long)]
        blade_root: Option<PathBuf>,

        #[arg(long)]
        depth: Option<usize>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Report which files contribute the most lines to a preprocessed file
    Ifile {
        file: PathBuf,

        /// Number of files to list
        #[arg(long, default_value_t = 50)]
        top: usize,
    },

    /// Run the line-JSON graph service
    Serve {
        #[arg(long, default_value_t = 4599)]
        port: u16,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Dot,
    Both,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DEPVIZ_LOG")
        .unwrap_or_else(|_| EnvFilter::new("depviz=info,warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Includes {
            files,
            include,
            depth,
            deep_system,
            no_default_paths,
            format,
            output,
            project_root,
            jobs,
            config,
        } => {
            let mut cfg = AnalyzerConfig::load_or_default(config.as_deref())?;
            cfg.includes.search_paths.extend(include);
            if let Some(depth) = depth {
                cfg.includes.max_depth = depth;
            }
            cfg.includes.deep_system |= deep_system;
            if no_default_paths {
                cfg.includes.use_default_search_paths = false;
            }
            if project_root.is_some() {
                cfg.project.root = project_root;
            }

            init_thread_pool(jobs)?;
            let modules = IncludeAnalyzer::new(cfg.includes.clone(), cfg.project_root())
                .analyze_files(&files)?;

            for module in &modules {
                println!(
                    "{}: {} nodes, {} edges",
                    module.source_file, module.node_count, module.edge_count
                );
            }
            write_outputs(&modules, format, output.as_deref(), DEFAULT_JSON_OUTPUT)
        }

        Command::Blade {
            target,
            blade_root,
            depth,
            format,
            output,
            config,
        } => {
            let mut cfg = AnalyzerConfig::load_or_default(config.as_deref())?;
            if blade_root.is_some() {
                cfg.blade.root = blade_root;
            }
            if let Some(depth) = depth {
                cfg.blade.max_depth = depth;
            }

            let cwd = std::env::current_dir().context("Cannot read working directory")?;
            let analyzer = TargetAnalyzer::from_config(&cfg.blade, &cwd)?;
            println!("Blade root: {}", analyzer.root().display());

            let report = analyzer.analyze(&target)?;
            println!(
                "{}: {} targets, {} dependencies",
                report.module.source_file, report.module.node_count, report.module.edge_count
            );
            println!("Target statistics:");
            for (kind, count) in &report.stats.by_kind {
                println!("  {:<20} {}", kind, count);
            }
            println!("  external dependencies: {}", report.stats.external);

            write_outputs(
                std::slice::from_ref(&report.module),
                format,
                output.as_deref(),
                DEFAULT_BLADE_JSON_OUTPUT,
            )
        }

        Command::Ifile { file, top } => {
            let reader = File::open(&file)
                .map(BufReader::new)
                .with_context(|| format!("Cannot open {}", file.display()))?;
            let report = attribute_lines(reader)?;

            println!("Total lines: {}", report.total_lines);
            println!("Code lines:  {}", report.code_lines());
            println!("{:>10}  {:>7}  File", "Lines", "Share");
            for (name, lines) in report.files.iter().take(top) {
                println!("{:>10}  {:>6.2}%  {}", lines, report.percentage(*lines), name);
            }
            Ok(())
        }

        Command::Serve { port } => server::start_server(port),
    }
}

fn write_outputs(
    modules: &[ModuleDto],
    format: Format,
    output: Option<&Path>,
    default_json: &str,
) -> Result<()> {
    let mut targets: Vec<(AnalyzeUsecase, PathBuf)> = Vec::new();
    let json = AnalyzeUsecase { exporter: &JsonExporter };
    let dot = AnalyzeUsecase { exporter: &DotExporter };

    match (format, output) {
        (Format::Json, Some(path)) => targets.push((json, path.to_path_buf())),
        (Format::Json, None) => targets.push((json, PathBuf::from(default_json))),
        (Format::Dot, Some(path)) => targets.push((dot, path.to_path_buf())),
        (Format::Dot, None) => targets.push((dot, PathBuf::from(DEFAULT_DOT_OUTPUT))),
        (Format::Both, _) => {
            targets.push((json, PathBuf::from(default_json)));
            targets.push((dot, PathBuf::from(DEFAULT_DOT_OUTPUT)));
        }
    }

    for (usecase, path) in targets {
        usecase
            .run(modules, &path)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        println!("Output written to {}", path.display());
    }
    Ok(())
}
