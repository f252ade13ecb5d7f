use solgraph_ast::nodes::{AstNode, ModifierInvocationKind, NodeId, NodeType, TypeDescription};
use solgraph_ast::tree::Tree;
use solgraph_ast::type_rules;
use tracing::trace;

use crate::errors::ReferenceKind;
use crate::resolver::{Resolver, ids_of};
use crate::scope;
use crate::types;

impl Resolver {
    /// Binds every user-defined type name and identifier path, then marks modifier
    /// invocations that name a base contract as constructor specifiers.
    pub(crate) fn resolve_type_names(&mut self, tree: &mut Tree) {
        for id in ids_of(tree, &[NodeType::UserDefinedTypeName, NodeType::IdentifierPath]) {
            self.resolve_path(tree, id);
        }

        for id in ids_of(tree, &[NodeType::ModifierInvocation]) {
            let Some(AstNode::ModifierInvocation(invocation)) = tree.get_by_id(id) else {
                continue;
            };
            let names_contract = tree
                .get_by_id(invocation.modifier_name)
                .and_then(AstNode::referenced_declaration)
                .and_then(|declaration| tree.get_by_id(declaration))
                .is_some_and(|declaration| {
                    matches!(declaration, AstNode::ContractDefinition(_))
                });
            if names_contract
                && let Some(AstNode::ModifierInvocation(invocation)) = tree.get_by_id_mut(id)
            {
                invocation.kind = ModifierInvocationKind::BaseConstructorSpecifier;
            }
        }
    }

    /// Binds a dotted type name or identifier path such as `Lib.Order`. The first
    /// segment is looked up from the node's position, the rest inside whatever the
    /// previous segment declares.
    pub(crate) fn resolve_path(&mut self, tree: &mut Tree, id: NodeId) {
        let (name, kind) = match tree.get_by_id(id) {
            Some(AstNode::UserDefinedTypeName(n)) if n.referenced_declaration.is_none() => {
                (n.name.clone(), ReferenceKind::TypeName)
            }
            Some(AstNode::IdentifierPath(n)) if n.referenced_declaration.is_none() => {
                (n.name.clone(), ReferenceKind::IdentifierPath)
            }
            _ => return,
        };
        let Some(declaration) = find_path(tree, id, &name, kind) else {
            self.report(tree, id, &name, kind);
            return;
        };
        let type_description = match kind {
            ReferenceKind::TypeName => types::reference_type(tree, declaration),
            _ => None,
        };
        trace!(node = id, declaration, %name, "bound path");
        tree.update_node_reference_by_id(id, declaration, type_description.as_ref());
    }

    /// Types declarations and composite type names whose types depend on names the
    /// builder could not see. Children carry larger ids than their parents, so a
    /// descending pass types every part before the whole.
    pub(crate) fn rebuild_declaration_types(tree: &mut Tree) {
        let mut ids = ids_of(
            tree,
            &[
                NodeType::Mapping,
                NodeType::ArrayTypeName,
                NodeType::FunctionTypeName,
                NodeType::VariableDeclaration,
                NodeType::FunctionDefinition,
            ],
        );
        ids.reverse();
        for id in ids {
            if tree.type_of(id).is_some() {
                continue;
            }
            if let Some(type_description) = declaration_type(tree, id) {
                trace!(node = id, %type_description, "typed declaration");
                tree.set_type_if_absent(id, type_description);
            }
        }
    }
}

fn find_path(tree: &Tree, id: NodeId, path: &str, kind: ReferenceKind) -> Option<NodeId> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let rest: Vec<&str> = segments.collect();
    let accept_last = |node: &AstNode| match kind {
        ReferenceKind::TypeName => is_type_declaration(node),
        _ => node.is_declaration() && !matches!(node, AstNode::VariableDeclaration(_)),
    };
    let mut current = if rest.is_empty() {
        *scope::lookup(tree, first, id, &accept_last).first()?
    } else {
        *scope::lookup(tree, first, id, |node| {
            scope::container_of_declaration(tree, node.id()).is_some()
        })
        .first()?
    };
    for segment in rest {
        let container = scope::container_of_declaration(tree, current)?;
        current = *scope::members_of(tree, container, segment).first()?;
    }
    tree.get_by_id(current)
        .is_some_and(&accept_last)
        .then_some(current)
}

fn is_type_declaration(node: &AstNode) -> bool {
    matches!(
        node,
        AstNode::ContractDefinition(_)
            | AstNode::StructDefinition(_)
            | AstNode::EnumDefinition(_)
            | AstNode::UserDefinedValueTypeDefinition(_)
    )
}

fn declaration_type(tree: &Tree, id: NodeId) -> Option<TypeDescription> {
    match tree.get_by_id(id)? {
        AstNode::Mapping(mapping) => Some(type_rules::mapping(
            tree.type_of(mapping.key_type)?,
            tree.type_of(mapping.value_type)?,
        )),
        AstNode::ArrayTypeName(array) => {
            let length = match array.length.and_then(|length| tree.get_by_id(length)) {
                Some(AstNode::Literal(literal)) => Some(literal.value.clone()),
                Some(AstNode::Identifier(identifier)) => Some(identifier.name.clone()),
                _ => None,
            };
            Some(type_rules::array(
                tree.type_of(array.base_type)?,
                length.as_deref(),
            ))
        }
        AstNode::FunctionTypeName(function) => Some(type_rules::function(
            function.visibility,
            function.state_mutability,
            &known_types(tree, function.parameter_types)?,
            &known_types(tree, function.return_parameter_types)?,
        )),
        AstNode::FunctionDefinition(function) => Some(type_rules::function(
            function.visibility,
            function.state_mutability,
            &known_types(tree, function.parameters)?,
            &known_types(tree, function.return_parameters)?,
        )),
        AstNode::VariableDeclaration(variable) => Some(type_rules::located(
            tree.type_of(variable.type_name?)?,
            variable.storage_location,
            variable.state_variable,
        )),
        _ => None,
    }
}

fn known_types(tree: &Tree, list: NodeId) -> Option<Vec<TypeDescription>> {
    types::parameter_types(tree, list)?.into_iter().collect()
}
