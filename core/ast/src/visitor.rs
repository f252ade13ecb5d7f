//! Tree traversal.
//!
//! [`Visitor`] is called around every node in pre-order; [`walk`] drives it over a
//! subtree. [`Tree::execute_type_visit`] is the filtered form used for "every node
//! of kind K" queries, with the callback able to stop the traversal.
//!
//! ```text
//! struct CountCalls(usize);
//!
//! impl<'ast> Visitor<'ast> for CountCalls {
//!     fn visit(&mut self, node: &'ast AstNode, _tree: &'ast Tree) -> bool {
//!         if node.node_type() == NodeType::FunctionCall {
//!             self.0 += 1;
//!         }
//!         true
//!     }
//! }
//! ```

use crate::nodes::{AstNode, NodeType};
use crate::tree::Tree;

pub trait Visitor<'ast> {
    /// Called before the node's children. Returning `false` skips them.
    fn visit(&mut self, node: &'ast AstNode, tree: &'ast Tree) -> bool {
        let _ = (node, tree);
        true
    }

    /// Called after the node's children, including when they were skipped.
    fn leave(&mut self, node: &'ast AstNode, tree: &'ast Tree) {
        let _ = (node, tree);
    }
}

pub fn walk<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, node: &'ast AstNode, tree: &'ast Tree) {
    if visitor.visit(node, tree) {
        for child in node.children() {
            if let Some(child) = tree.get_by_id(child) {
                walk(visitor, child, tree);
            }
        }
    }
    visitor.leave(node, tree);
}

impl Tree {
    /// Walks every source unit in build order.
    pub fn walk<'ast, V: Visitor<'ast> + ?Sized>(&'ast self, visitor: &mut V) {
        for unit in &self.source_units {
            if let Some(node) = self.get_by_id(*unit) {
                walk(visitor, node, self);
            }
        }
    }

    /// Calls `callback` on every node of `node_type` in pre-order until it returns
    /// `false`. Returns `true` when the traversal ran to completion.
    pub fn execute_type_visit<F>(&self, node_type: NodeType, mut callback: F) -> bool
    where
        F: FnMut(&AstNode) -> bool,
    {
        let mut stack: Vec<i64> = self.source_units.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.get_by_id(id) else {
                continue;
            };
            if node.node_type() == node_type && !callback(node) {
                return false;
            }
            stack.extend(node.children().into_iter().rev());
        }
        true
    }
}
