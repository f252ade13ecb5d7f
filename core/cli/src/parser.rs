//! Command line argument parsing for solgraph.
//!
//! This module defines the CLI interface using `clap`. The `Cli` struct captures
//! all command line flags and arguments passed to the `solgraph` binary.

use std::path::PathBuf;

use clap::Parser;

/// Command line interface definition for solgraph.
///
/// Every run builds the AST of all given files into one tree. Resolution and
/// JSON output are opt-in and run in that order regardless of flag order.
///
/// ## Examples
///
/// Build only, reporting syntax problems:
/// ```bash
/// solgraph contracts/Token.sol
/// ```
///
/// Resolve two files that import each other and print the tree:
/// ```bash
/// solgraph contracts/Token.sol contracts/Math.sol --resolve --json -
/// ```
///
/// Gate CI on every reference resolving:
/// ```bash
/// solgraph contracts/*.sol --resolve --fail-on-unresolved
/// ```
#[derive(Parser)]
#[command(
    name = "solgraph",
    author,
    version,
    about = "Solidity semantic AST builder (solgraph)",
    long_about = "The 'solgraph' command builds a semantic AST over one or more Solidity files. \
--resolve binds references across the files; --json writes the resulting tree."
)]
pub(crate) struct Cli {
    /// Solidity source files to build into one tree.
    ///
    /// Paths are canonicalized before building, so imports between the files are
    /// matched against absolute paths.
    #[clap(required = true, num_args = 1..)]
    pub(crate) paths: Vec<PathBuf>,

    /// Bind identifiers, members, type names, and imports to their declarations.
    ///
    /// References that cannot be bound are listed on stderr.
    #[clap(long = "resolve", action = clap::ArgAction::SetTrue)]
    pub(crate) resolve: bool,

    /// Write the tree as JSON to this path, or to stdout when the path is `-`.
    #[clap(long = "json", value_name = "PATH")]
    pub(crate) json: Option<PathBuf>,

    /// Exit with code 1 when any reference stays unresolved.
    #[clap(
        long = "fail-on-unresolved",
        requires = "resolve",
        action = clap::ArgAction::SetTrue
    )]
    pub(crate) fail_on_unresolved: bool,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[clap(long = "verbose", action = clap::ArgAction::SetTrue)]
    pub(crate) verbose: bool,
}
