//! End to end tests for solgraph: Solidity sources are parsed with tree-sitter,
//! built into a tree, resolved, and inspected.

#[cfg(test)]
mod builder;
#[cfg(test)]
mod resolver;
#[cfg(test)]
mod serialization;
#[cfg(test)]
mod tree;
#[cfg(test)]
mod utils;
