//! Command-line interface for dirsnap.
//!
//! Collects roots and filter patterns, writes the snapshot document and prints a final
//! status line.

use clap::Parser;
use dirsnap::{
    BinaryDetection, DEFAULT_MAX_FILE_SIZE, DisplayPath, SnapBuilder, SnapOptions, SnapshotReport,
    load_patterns, snapshot_to_file,
};
use std::path::PathBuf;
use std::process::exit;

/// dirsnap — directory tree and file contents in one Markdown document
#[derive(Parser)]
#[command(name = "dirsnap", version, about, long_about = None)]
struct Cli {
    /// Directories to scan; arguments starting with `!` or containing `*?[]` are soft filters
    inputs: Vec<String>,

    /// Directory to scan (repeatable)
    #[arg(short = 'd', long = "dir", num_args = 1..)]
    dirs: Vec<PathBuf>,

    /// Soft filter: keep the entry in the tree, skip its content
    #[arg(short = 'f', long = "filter", num_args = 1..)]
    soft: Vec<String>,

    /// Hard filter: drop the entry from both tree and contents
    #[arg(short = 'F', long = "Filter", num_args = 1..)]
    hard: Vec<String>,

    /// Pattern file loaded into the soft tier (`#` starts a comment)
    #[arg(short = 'c', long = "config", alias = "fc")]
    soft_config: Vec<PathBuf>,

    /// Pattern file loaded into the hard tier
    #[arg(long = "hard-config", alias = "Fc")]
    hard_config: Vec<PathBuf>,

    /// Output file (`*.md`) or output directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Always list every file instead of folding long directories
    #[arg(long)]
    no_fold: bool,

    /// Include hidden files and directories
    #[arg(long)]
    hidden: bool,

    /// Files larger than this many bytes get no content block
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_size: u64,

    /// Binary detection strategy
    #[arg(long, default_value = "simple", value_parser = parse_binary_detection)]
    binary_detection: BinaryDetection,

    /// Label content blocks with `<root>/<relative path>` instead of the absolute path
    #[arg(long)]
    relative_paths: bool,

    /// Print the run report as JSON instead of the status line
    #[arg(long)]
    json: bool,

    /// More diagnostics
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Parse string into BinaryDetection enum.
fn parse_binary_detection(s: &str) -> Result<BinaryDetection, String> {
    match s {
        "simple" => Ok(BinaryDetection::Simple),
        "accurate" => Ok(BinaryDetection::Accurate),
        "none" => Ok(BinaryDetection::None),
        _ => Err(format!("invalid binary detection method: {}", s)),
    }
}

fn is_pattern(arg: &str) -> bool {
    arg.starts_with('!') || arg.contains(['*', '?', '[', ']'])
}

/// `--filter "*.png *.jpg"` is two patterns.
fn split_patterns(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split_whitespace())
        .map(str::to_string)
        .collect()
}

impl Cli {
    fn into_options(self) -> Result<SnapOptions, String> {
        let mut soft = Vec::new();
        for path in &self.soft_config {
            soft.extend(load_patterns(path).map_err(|e| e.to_string())?);
        }
        soft.extend(split_patterns(&self.soft));

        let mut hard = Vec::new();
        for path in &self.hard_config {
            hard.extend(load_patterns(path).map_err(|e| e.to_string())?);
        }
        hard.extend(split_patterns(&self.hard));

        let mut roots = self.dirs;
        for input in self.inputs {
            if is_pattern(&input) {
                soft.extend(input.split_whitespace().map(str::to_string));
            } else {
                roots.push(PathBuf::from(input));
            }
        }
        if roots.is_empty() {
            roots.push(PathBuf::from("."));
        }

        let mut builder = SnapBuilder::with_roots(roots)
            .hard_filters(hard)
            .soft_filters(soft)
            .fold(!self.no_fold)
            .include_hidden(self.hidden)
            .max_file_size(self.max_size)
            .binary_detection(self.binary_detection)
            .display(if self.relative_paths {
                DisplayPath::Relative
            } else {
                DisplayPath::Physical
            });
        if let Some(out) = self.out {
            builder = builder.output(out);
        }
        Ok(builder.build())
    }
}

#[cfg(feature = "logging")]
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match (quiet, verbose) {
            (true, _) => tracing_subscriber::EnvFilter::new("warn"),
            (false, 0) => tracing_subscriber::EnvFilter::new("info,globset=warn"),
            (false, 1) => tracing_subscriber::EnvFilter::new("debug,globset=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() {
    let cli = Cli::parse();
    #[cfg(feature = "logging")]
    setup_logging(cli.verbose, cli.quiet);
    let json = cli.json;

    let options = match cli.into_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    match snapshot_to_file(&options) {
        Ok(report) => finish(&report, json),
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    }
}

fn finish(report: &SnapshotReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("JSON serialization error: {}", e);
                exit(1);
            }
        }
    } else if let Some(path) = &report.output {
        println!("Snapshot written to: {}", path.display());
    }

    if !report.is_success() {
        for failure in &report.errors {
            eprintln!("Error processing {}: {}", failure.root.display(), failure.message);
        }
        exit(1);
    }
    if !json {
        println!(
            "Done: {} files, {} skipped, {} converted.",
            report.files.len(),
            report.skipped.len(),
            report.converted.len()
        );
    }
}
