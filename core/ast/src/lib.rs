#![warn(clippy::pedantic)]
//! Semantic AST for Solidity.
//!
//! [`builder::Builder`] turns tree-sitter parse trees into a [`tree::Tree`] of typed
//! nodes. The tree can be walked with a [`visitor::Visitor`], serialized with
//! [`tree::Tree::to_json`], and handed to the resolver crate to bind references.

pub mod builder;
pub mod errors;
pub mod json;
pub mod nodes;
pub(crate) mod nodes_impl;
pub mod tree;
pub mod type_rules;
pub mod typed_struct;
pub mod visitor;
