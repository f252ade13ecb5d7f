#![warn(clippy::pedantic)]
//! Reference Resolution for Solidity ASTs
//!
//! This crate binds every name in a [`Tree`] to the declaration it refers to and
//! fills the types the builder could not work out from syntax alone.
//!
//! ## What Gets Bound
//!
//! **Declarations referenced by name**:
//! - Identifiers, resolved through block, function, contract, and unit scopes
//! - Member accesses on contracts, `this`, `super`, structs, enums, libraries, and
//!   import aliases, plus functions attached with `using ... for`
//! - User-defined type names and dotted identifier paths such as `Lib.Order`
//! - Assembly identifiers, including `x.slot` and `x.offset`
//!
//! **Structure**:
//! - Import directives to the source units they name, with aliases and symbol
//!   exports flowing through import chains
//! - Inheritance specifiers, linearized base lists, and contract dependencies
//! - Modifier invocations that name a base contract become constructor specifiers
//!
//! **Types**:
//! - Declarations whose type names point at user-defined types
//! - Calls, by the return parameters of the chosen overload
//! - Index accesses, `new` expressions, tuples, operators, and conditionals
//!
//! ## Error Handling
//!
//! Resolution never stops at the first failure. Each reference that cannot be bound
//! is reported once as an [`UnresolvedReference`] carrying its source location, and
//! the node keeps an absent declaration and type. Names the language provides
//! without a declaration (`msg`, `keccak256`, `this`, ...) are never reported.
//!
//! ## Quick Start
//!
//! ```ignore
//! let mut tree = builder.build_ast().tree;
//! for unresolved in solgraph_resolver::resolve_references(&mut tree) {
//!     eprintln!("{unresolved}");
//! }
//! ```
//!
//! Resolving an already resolved tree leaves it unchanged and reports the same
//! unresolved references again.

use solgraph_ast::tree::Tree;

use crate::resolver::Resolver;

pub mod errors;
mod expressions;
mod imports;
mod inheritance;
mod resolver;
mod scope;
mod type_names;
mod types;
mod yul;

pub use errors::{ReferenceKind, UnresolvedReference};

/// Binds references and completes types across the whole tree.
///
/// Returns the references that could not be bound, in the order they were found.
pub fn resolve_references(tree: &mut Tree) -> Vec<UnresolvedReference> {
    Resolver::default().run(tree)
}
