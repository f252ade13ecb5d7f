use solgraph_ast::nodes::{AstNode, NodeId, NodeType};
use solgraph_ast::tree::Tree;
use tracing::trace;

use crate::resolver::{Resolver, ids_of};

impl Resolver {
    /// Binds the base names of inheritance specifiers. Linearization needs these
    /// before any other name inside a contract can be looked up through its bases.
    pub(crate) fn resolve_base_contracts(&mut self, tree: &mut Tree) {
        for id in ids_of(tree, &[NodeType::InheritanceSpecifier]) {
            if let Some(AstNode::InheritanceSpecifier(specifier)) = tree.get_by_id(id) {
                let base_name = specifier.base_name;
                self.resolve_path(tree, base_name);
            }
        }
    }

    /// Fills `linearized_base_contracts` (the contract, then its direct bases in
    /// specifier order) and `contract_dependencies` (the direct bases alone).
    /// Ids already listed are skipped, so running twice changes nothing.
    pub(crate) fn linearize_contracts(tree: &mut Tree) {
        for id in ids_of(tree, &[NodeType::ContractDefinition]) {
            let order: Vec<NodeId> = std::iter::once(id).chain(direct_bases(tree, id)).collect();
            trace!(contract = id, ?order, "linearized");
            let Some(AstNode::ContractDefinition(contract)) = tree.get_by_id_mut(id) else {
                continue;
            };
            for base in order {
                if !contract.linearized_base_contracts.contains(&base) {
                    contract.linearized_base_contracts.push(base);
                }
                if base != id && !contract.contract_dependencies.contains(&base) {
                    contract.contract_dependencies.push(base);
                }
            }
        }
    }
}

/// Contracts named by the inheritance specifiers of `contract`, in order.
fn direct_bases(tree: &Tree, contract: NodeId) -> Vec<NodeId> {
    let Some(AstNode::ContractDefinition(contract)) = tree.get_by_id(contract) else {
        return Vec::new();
    };
    contract
        .base_contracts
        .iter()
        .filter_map(|specifier| match tree.get_by_id(*specifier) {
            Some(AstNode::InheritanceSpecifier(specifier)) => tree
                .get_by_id(specifier.base_name)
                .and_then(AstNode::referenced_declaration),
            _ => None,
        })
        .filter(|base| matches!(tree.get_by_id(*base), Some(AstNode::ContractDefinition(_))))
        .collect()
}
