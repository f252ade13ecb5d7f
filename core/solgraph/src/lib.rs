#![warn(clippy::pedantic)]
//! Core Orchestration Crate for solgraph
//!
//! This crate provides the entry points for turning Solidity source code into a
//! resolved semantic AST.
//!
//! ## Overview
//!
//! ```text
//! .sol sources → tree-sitter → semantic AST (Tree) → reference resolution
//! ```
//!
//! Each phase is exposed as a standalone function so callers can stop after
//! building and inspect the unresolved tree.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use solgraph::{parse_sources, resolve};
//!
//! fn analyze(path: &str, source: &str) -> anyhow::Result<()> {
//!     let mut output = parse_sources(&[(path, source)])?;
//!     for unresolved in resolve(&mut output.tree) {
//!         eprintln!("{unresolved}");
//!     }
//!     println!("{}", output.tree.to_json_string()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Phases
//!
//! ### Build
//!
//! [`parse`] and [`parse_sources`] run the tree-sitter Solidity grammar over each
//! source and hand the parse trees to [`Builder`], which allocates one node per
//! construct. Every file becomes a `SourceUnit` in the same [`Tree`], so node ids
//! are unique across files and imports can later be linked between them.
//!
//! Syntax errors and constructs the builder does not recognize do not fail the
//! build. They are returned as diagnostics in [`BuildOutput`] next to the tree.
//!
//! ### Resolve
//!
//! [`resolve`] binds identifiers, member accesses, type names, and assembly
//! identifiers to their declarations, links imports, linearizes inheritance, and
//! fills the types the builder left open. References that cannot be bound are
//! returned as [`UnresolvedReference`] values; resolution never aborts.
//!
//! ## Architecture
//!
//! - [`solgraph_ast`] - node kinds, the [`Tree`] arena, the builder, type rules,
//!   visitors, and serialization
//! - [`solgraph_resolver`] - the reference resolution passes
//!
//! [`Builder`]: solgraph_ast::builder::Builder
//! [`Tree`]: solgraph_ast::tree::Tree

use anyhow::Context;
use solgraph_ast::builder::{BuildOutput, Builder};
use solgraph_ast::tree::Tree;
use tracing::debug;

pub use solgraph_ast as ast;
pub use solgraph_resolver as resolver;
pub use solgraph_resolver::UnresolvedReference;

/// Path given to the source unit built by [`parse`].
pub const DEFAULT_SOURCE_PATH: &str = "main.sol";

/// Parses one Solidity source and builds its AST.
///
/// The source becomes a single source unit at [`DEFAULT_SOURCE_PATH`].
///
/// ```rust,no_run
/// let output = solgraph::parse("contract C { uint x; }")?;
/// assert_eq!(output.tree.contracts().len(), 1);
/// # Ok::<(), anyhow::Error>(())
/// ```
///
/// # Errors
///
/// Returns an error if the Solidity grammar cannot be loaded or tree-sitter
/// produces no parse tree.
pub fn parse(source_code: &str) -> anyhow::Result<BuildOutput> {
    parse_sources(&[(DEFAULT_SOURCE_PATH, source_code)])
}

/// Parses several Solidity sources and builds them into one AST.
///
/// Each entry is `(absolute_path, source)`. Paths are used verbatim as the source
/// unit paths that imports are matched against.
///
/// # Errors
///
/// Returns an error if the Solidity grammar cannot be loaded, tree-sitter
/// produces no parse tree for a source, or the builder rejects a parse tree.
pub fn parse_sources<P, S>(sources: &[(P, S)]) -> anyhow::Result<BuildOutput>
where
    P: AsRef<str>,
    S: AsRef<str>,
{
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_solidity::LANGUAGE.into())
        .context("failed to load the Solidity grammar")?;

    let mut parse_trees = Vec::with_capacity(sources.len());
    for (path, source) in sources {
        let parse_tree = parser
            .parse(source.as_ref(), None)
            .with_context(|| format!("failed to parse {}", path.as_ref()))?;
        parse_trees.push(parse_tree);
    }

    let mut builder = Builder::new();
    for ((path, source), parse_tree) in sources.iter().zip(&parse_trees) {
        builder
            .add_source_code(
                parse_tree.root_node(),
                source.as_ref().as_bytes(),
                path.as_ref(),
            )
            .with_context(|| format!("failed to add {}", path.as_ref()))?;
    }
    let output = builder.build_ast();
    debug!(
        units = output.tree.source_unit_ids().len(),
        nodes = output.tree.len(),
        diagnostics = output.diagnostics.len(),
        "built AST"
    );
    Ok(output)
}

/// Resolves references across the whole tree.
///
/// Returns the references that could not be bound. Running it again on the same
/// tree leaves the tree unchanged.
pub fn resolve(tree: &mut Tree) -> Vec<UnresolvedReference> {
    let unresolved = solgraph_resolver::resolve_references(tree);
    debug!(unresolved = unresolved.len(), "resolved references");
    unresolved
}
