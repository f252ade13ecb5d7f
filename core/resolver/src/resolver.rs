//! Resolution driver.
//!
//! The resolver runs in phases over the whole tree, each one relying on the
//! bindings made by the ones before it:
//!
//! 1. **link_imports** - bind import directives to source units and export the
//!    imported symbols from the importing unit
//! 2. **resolve_base_contracts** - bind the base names of inheritance specifiers
//! 3. **linearize_contracts** - fill linearized base and dependency lists
//! 4. **resolve_type_names** - bind user-defined type names and identifier paths
//! 5. **rebuild_declaration_types** - type declarations and composite type names
//! 6. **resolve_expressions** - bind identifiers and member accesses, type calls
//! 7. **resolve_yul** - bind assembly identifiers
//! 8. **rebuild_composite_types** - recompute operator, tuple, and branch types
//!
//! Resolution continues after a name fails to resolve so that every unresolved
//! reference is reported in one run. Reports are deduplicated per node and name.

use rustc_hash::FxHashSet;
use solgraph_ast::nodes::{AstNode, NodeId, NodeType};
use solgraph_ast::tree::Tree;
use tracing::debug;

use crate::errors::{ReferenceKind, UnresolvedReference};

#[derive(Default)]
pub(crate) struct Resolver {
    unresolved: Vec<UnresolvedReference>,
    reported: FxHashSet<(NodeId, String)>,
}

impl Resolver {
    pub(crate) fn run(mut self, tree: &mut Tree) -> Vec<UnresolvedReference> {
        self.link_imports(tree);
        debug!(unresolved = self.unresolved.len(), "linked imports");
        self.resolve_base_contracts(tree);
        Self::linearize_contracts(tree);
        debug!("linearized contracts");
        self.resolve_type_names(tree);
        debug!(unresolved = self.unresolved.len(), "resolved type names");
        Self::rebuild_declaration_types(tree);
        self.resolve_expressions(tree);
        debug!(unresolved = self.unresolved.len(), "resolved expressions");
        self.resolve_yul(tree);
        Self::rebuild_composite_types(tree);
        debug!(unresolved = self.unresolved.len(), "resolution finished");
        self.unresolved
    }

    /// Records a reference that could not be bound, once per node and name.
    pub(crate) fn report(&mut self, tree: &Tree, id: NodeId, name: &str, kind: ReferenceKind) {
        if !self.reported.insert((id, name.to_string())) {
            return;
        }
        let path = tree
            .enclosing_source_unit(id)
            .map(|unit| unit.absolute_path.clone())
            .unwrap_or_default();
        let src = tree.get_by_id(id).map(|node| *node.src()).unwrap_or_default();
        debug!(%path, line = src.line, column = src.column, %kind, name, "unresolved reference");
        self.unresolved.push(UnresolvedReference {
            id,
            name: name.to_string(),
            kind,
            path,
            line: src.line,
            column: src.column,
        });
    }
}

/// Ids of every node of the given kinds, ascending.
pub(crate) fn ids_of(tree: &Tree, kinds: &[NodeType]) -> Vec<NodeId> {
    tree.filter_nodes(|node| kinds.contains(&node.node_type()))
        .into_iter()
        .map(AstNode::id)
        .collect()
}
