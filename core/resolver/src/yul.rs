use solgraph_ast::nodes::{AstNode, NodeId, NodeType};
use solgraph_ast::tree::Tree;
use tracing::trace;

use crate::errors::ReferenceKind;
use crate::resolver::{Resolver, ids_of};
use crate::scope;

impl Resolver {
    /// Binds identifiers inside inline assembly. Assembly scopes are searched first;
    /// past the assembly block the identifier sees the Solidity locals, parameters,
    /// and state variables around it. `x.slot` and `x.offset` bind to `x`.
    pub(crate) fn resolve_yul(&mut self, tree: &mut Tree) {
        for id in ids_of(tree, &[NodeType::YulIdentifier]) {
            let Some(AstNode::YulIdentifier(identifier)) = tree.get_by_id(id) else {
                continue;
            };
            if identifier.builtin || identifier.referenced_declaration.is_some() {
                continue;
            }
            let name = identifier.name.clone();
            let base = name.split_once('.').map_or(name.as_str(), |(base, _)| base);
            let declaration = assembly_lookup(tree, id, base).or_else(|| {
                scope::lookup(tree, base, id, |node| {
                    matches!(node, AstNode::VariableDeclaration(_))
                })
                .first()
                .copied()
            });
            match declaration {
                Some(declaration) => {
                    trace!(node = id, declaration, %name, "bound assembly identifier");
                    tree.update_node_reference_by_id(id, declaration, None);
                }
                None => self.report(tree, id, &name, ReferenceKind::YulIdentifier),
            }
        }
    }
}

fn assembly_lookup(tree: &Tree, from: NodeId, name: &str) -> Option<NodeId> {
    let position = tree.get_by_id(from)?.src().start;
    let mut child = from;
    for ancestor in tree.ancestors(from) {
        let found = match ancestor {
            AstNode::YulBlock(block) => block_declaration(tree, &block.statements, name, position),
            AstNode::YulFunctionDefinition(function) => function
                .parameters
                .iter()
                .chain(&function.return_variables)
                .copied()
                .find(|id| tree.get_by_id(*id).and_then(AstNode::name) == Some(name)),
            AstNode::YulForLoop(for_loop) => for_loop
                .pre
                .filter(|pre| *pre != child)
                .and_then(|pre| match tree.get_by_id(pre) {
                    Some(AstNode::YulBlock(pre)) => {
                        block_declaration(tree, &pre.statements, name, position)
                    }
                    _ => None,
                }),
            AstNode::InlineAssembly(_) => return None,
            _ => None,
        };
        if found.is_some() {
            return found;
        }
        child = ancestor.id();
    }
    None
}

/// A variable declared in `statements` before `position`, or a function declared
/// anywhere in them.
fn block_declaration(
    tree: &Tree,
    statements: &[NodeId],
    name: &str,
    position: u32,
) -> Option<NodeId> {
    statements.iter().rev().find_map(|statement| match tree.get_by_id(*statement)? {
        AstNode::YulVariableDeclaration(declaration) if declaration.src.end < position => {
            declaration
                .variables
                .iter()
                .copied()
                .find(|id| tree.get_by_id(*id).and_then(AstNode::name) == Some(name))
        }
        AstNode::YulFunctionDefinition(function) if function.name == name => {
            Some(function.id)
        }
        _ => None,
    })
}
