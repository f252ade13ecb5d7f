#![warn(clippy::pedantic)]

//! # solgraph CLI
//!
//! Command line interface for building and resolving Solidity ASTs.
//!
//! 1. Build    (always)               – parse every file and build one tree.
//! 2. Resolve  (`--resolve`)          – bind references across the files.
//! 3. Output   (`--json <path>`)      – write the tree as JSON, `-` for stdout.
//!
//! Status lines, build diagnostics, and unresolved references go to stderr so that
//! `--json -` leaves stdout holding only the tree.
//!
//! ## Exit codes
//! * 0 – success.
//! * 1 – usage / IO failure, or unresolved references with `--fail-on-unresolved`.
//!
//! ## Example
//! ```bash
//! solgraph src/Token.sol src/Math.sol --resolve --json out/tree.json
//! ```

mod parser;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};

use anyhow::Context;
use clap::Parser;
use parser::Cli;
use solgraph::ast::tree::Tree;
use solgraph::{parse_sources, resolve};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Cli::parse();
    init_logging(args.verbose);

    for path in &args.paths {
        if !path.exists() {
            eprintln!("Error: path not found: {}", path.display());
            process::exit(1);
        }
    }

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Cli) -> anyhow::Result<ExitCode> {
    let sources = read_sources(&args.paths)?;
    let mut output = parse_sources(&sources)?;
    for (path, _) in &sources {
        eprintln!("Parsed: {path}");
    }
    for diagnostic in &output.diagnostics {
        eprintln!("warning: {diagnostic}");
    }

    let mut unresolved = Vec::new();
    if args.resolve {
        unresolved = resolve(&mut output.tree);
        for reference in &unresolved {
            eprintln!("unresolved: {reference}");
        }
        eprintln!("Resolved: {} unresolved reference(s)", unresolved.len());
    }

    if let Some(destination) = &args.json {
        write_json(&output.tree, destination)?;
    }

    if args.fail_on_unresolved && !unresolved.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Reads each file under its canonical path.
fn read_sources(paths: &[PathBuf]) -> anyhow::Result<Vec<(String, String)>> {
    paths
        .iter()
        .map(|path| {
            let absolute = path
                .canonicalize()
                .with_context(|| format!("failed to canonicalize {}", path.display()))?;
            let source = fs::read_to_string(&absolute)
                .with_context(|| format!("failed to read {}", absolute.display()))?;
            Ok((absolute.to_string_lossy().into_owned(), source))
        })
        .collect()
}

/// Writes the tree to stdout for `-`, otherwise to a temporary file in the
/// destination directory that then replaces the destination.
fn write_json(tree: &Tree, destination: &Path) -> anyhow::Result<()> {
    let json = tree.to_json_string().context("failed to serialize the tree")?;
    if destination == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}").context("failed to write to stdout")?;
        return Ok(());
    }

    let directory = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&directory)
        .with_context(|| format!("failed to create {}", directory.display()))?;
    let mut file = tempfile::NamedTempFile::new_in(&directory)
        .with_context(|| format!("failed to create a file in {}", directory.display()))?;
    file.write_all(json.as_bytes())
        .context("failed to write the tree")?;
    file.persist(destination)
        .with_context(|| format!("failed to write {}", destination.display()))?;
    debug!(path = %destination.display(), bytes = json.len(), "wrote tree");
    eprintln!("JSON written to: {}", destination.display());
    Ok(())
}
