//! JSON form of a [`Tree`].
//!
//! The document lists the source unit ids, the global node ids, and every node in
//! ascending id order. Each node carries `id`, `node_type`, `src`, and its kind's
//! own fields, so a tree decodes back to an equal one.

use serde::{Deserialize, Serialize};

use crate::errors::AstError;
use crate::nodes::{AstNode, NodeId};
use crate::tree::Tree;

#[derive(Serialize, Deserialize)]
struct TreeRepr {
    source_units: Vec<NodeId>,
    global_nodes: Vec<NodeId>,
    nodes: Vec<AstNode>,
}

impl Tree {
    /// Serializes the tree to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::Serialization`] if a node cannot be encoded.
    pub fn to_json(&self) -> Result<serde_json::Value, AstError> {
        let nodes = self
            .ids()
            .into_iter()
            .filter_map(|id| self.nodes.get(&id).cloned())
            .collect();
        let repr = TreeRepr {
            source_units: self.source_units.clone(),
            global_nodes: self.global_nodes.clone(),
            nodes,
        };
        Ok(serde_json::to_value(repr)?)
    }

    /// Serializes the tree to an indented JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::Serialization`] if a node cannot be encoded.
    pub fn to_json_string(&self) -> Result<String, AstError> {
        Ok(serde_json::to_string_pretty(&self.to_json()?)?)
    }

    /// Decodes a tree written by [`Tree::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`AstError::Serialization`] for malformed JSON or an unknown
    /// `node_type`, and [`AstError::InvariantViolation`] when ids repeat or the
    /// top-level lists name nodes that are not in the document.
    pub fn from_json(value: serde_json::Value) -> Result<Tree, AstError> {
        let repr: TreeRepr = serde_json::from_value(value)?;
        let mut tree = Tree::default();
        for node in repr.nodes {
            let id = node.id();
            if tree.nodes.insert(id, node).is_some() {
                return Err(AstError::InvariantViolation {
                    reason: format!("node id {id} appears more than once"),
                });
            }
        }
        for id in repr.source_units.iter().chain(&repr.global_nodes) {
            if !tree.nodes.contains_key(id) {
                return Err(AstError::InvariantViolation {
                    reason: format!("top-level node {id} is missing from the document"),
                });
            }
        }
        tree.source_units = repr.source_units;
        tree.global_nodes = repr.global_nodes;
        Ok(tree)
    }

    /// Decodes a tree from a JSON string.
    ///
    /// # Errors
    ///
    /// See [`Tree::from_json`].
    pub fn from_json_str(json: &str) -> Result<Tree, AstError> {
        Tree::from_json(serde_json::from_str(json)?)
    }
}
