use solgraph_ast::nodes::{
    AstNode, FunctionCallKind, NodeId, NodeType, StorageLocation, TypeDescription,
};
use solgraph_ast::tree::Tree;
use solgraph_ast::type_rules;
use tracing::trace;

use crate::errors::ReferenceKind;
use crate::resolver::{Resolver, ids_of};
use crate::scope;
use crate::types;

const EXPRESSION_KINDS: &[NodeType] = &[
    NodeType::Identifier,
    NodeType::MemberAccess,
    NodeType::IndexAccess,
    NodeType::IndexRangeAccess,
    NodeType::FunctionCall,
    NodeType::FunctionCallOptions,
    NodeType::NewExpression,
    NodeType::MetaType,
    NodeType::TupleExpression,
    NodeType::BinaryOperation,
    NodeType::UnaryPrefixOperation,
    NodeType::UnarySuffixOperation,
    NodeType::Assignment,
    NodeType::Conditional,
];

const COMPOSITE_KINDS: &[NodeType] = &[
    NodeType::TupleExpression,
    NodeType::BinaryOperation,
    NodeType::UnaryPrefixOperation,
    NodeType::UnarySuffixOperation,
    NodeType::Assignment,
    NodeType::Conditional,
];

impl Resolver {
    /// Binds and types expressions innermost first. Every operand, callee, and
    /// argument of a node has a larger id than the node, so walking ids downward
    /// sees `a` before `a.b`, and the arguments of a call before its callee.
    pub(crate) fn resolve_expressions(&mut self, tree: &mut Tree) {
        let mut ids = ids_of(tree, EXPRESSION_KINDS);
        ids.reverse();
        for id in ids {
            let Some(node_type) = tree.get_by_id(id).map(AstNode::node_type) else {
                continue;
            };
            match node_type {
                NodeType::Identifier => self.resolve_identifier(tree, id),
                NodeType::MemberAccess => self.resolve_member_access(tree, id),
                NodeType::IndexAccess => type_index_access(tree, id),
                NodeType::FunctionCall => type_function_call(tree, id),
                NodeType::NewExpression => type_new_expression(tree, id),
                _ => {
                    if let Some(type_description) = derived_type(tree, id) {
                        tree.set_type_if_absent(id, type_description);
                    }
                }
            }
        }
    }

    /// Recomputes the types of operators, tuples, assignments, and conditionals
    /// from their operands now that the operands are bound.
    pub(crate) fn rebuild_composite_types(tree: &mut Tree) {
        let mut ids = ids_of(tree, COMPOSITE_KINDS);
        ids.reverse();
        for id in ids {
            let Some(type_description) = derived_type(tree, id) else {
                continue;
            };
            if tree.type_of(id) == Some(&type_description) {
                continue;
            }
            if let Some(node) = tree.get_by_id_mut(id) {
                node.set_type_description(type_description);
            }
        }
    }

    fn resolve_identifier(&mut self, tree: &mut Tree, id: NodeId) {
        let Some(AstNode::Identifier(identifier)) = tree.get_by_id(id) else {
            return;
        };
        if identifier.referenced_declaration.is_some() {
            return;
        }
        let name = identifier.name.clone();
        let candidates = scope::lookup(tree, &name, id, is_bindable);
        if candidates.is_empty() {
            if !is_builtin(&name) {
                self.report(tree, id, &name, ReferenceKind::Identifier);
            }
            return;
        }
        bind(tree, id, &candidates, 0);
    }

    /// Binds `a.b` inside whatever `a` is, falling back to functions attached with
    /// `using for` and then to the built-in members of `a`'s type. A chain whose
    /// object did not resolve stays untyped without another report.
    fn resolve_member_access(&mut self, tree: &mut Tree, id: NodeId) {
        let Some(AstNode::MemberAccess(access)) = tree.get_by_id(id) else {
            return;
        };
        if access.referenced_declaration.is_some() {
            return;
        }
        let Some(object) = access.expression else {
            return;
        };
        let member = access.member_name.clone();

        let container = types::container_of_expression(tree, object);
        let members = container
            .map(|container| scope::members_of(tree, container, &member))
            .unwrap_or_default();
        if !members.is_empty() {
            bind(tree, id, &members, 0);
            return;
        }

        let receiver = tree.type_of(object).cloned();
        if let Some(receiver) = &receiver {
            let attached = attached_functions(tree, id, receiver, &member);
            if !attached.is_empty() {
                bind(tree, id, &attached, 1);
                return;
            }
            if let Some(type_description) = type_rules::magic_member(receiver, &member) {
                tree.set_type_if_absent(id, type_description);
                return;
            }
        }

        if tree.type_of(id).is_none()
            && let Some(container) = container
            && container.reports_missing()
        {
            self.report(tree, id, &member, ReferenceKind::Member);
        }
    }
}

/// Binds `id` to the best of `candidates` and lets the binding travel upward.
/// `skip` leading parameters are not matched against arguments, which is how a
/// function attached with `using for` receives its object.
fn bind(tree: &mut Tree, id: NodeId, candidates: &[NodeId], skip: usize) {
    let arguments = call_arguments(tree, id);
    let Some(chosen) = choose_overload(tree, candidates, arguments.as_deref(), skip) else {
        return;
    };
    let signature = arguments.as_ref().and_then(|arguments| {
        let known: Option<Vec<TypeDescription>> = arguments.iter().cloned().collect();
        known.map(|known| type_rules::callee_signature(&known))
    });
    // A called function takes the shape of its arguments; conversions and
    // constructors keep the type of what they name.
    let type_description = match types::callable_parameters(tree, chosen) {
        Some(_) if signature.is_some() => signature.clone(),
        _ => types::reference_type(tree, chosen),
    };
    if candidates.len() > 1
        && let Some(AstNode::Identifier(identifier)) = tree.get_by_id_mut(id)
        && identifier.overloaded_declarations.is_empty()
    {
        identifier.overloaded_declarations = candidates.to_vec();
    }
    trace!(
        node = id,
        declaration = chosen,
        signature = signature.as_ref().map(|s| s.type_identifier.as_str()),
        "bound reference"
    );
    tree.update_node_reference_by_id(id, chosen, type_description.as_ref());
}

/// Argument types of the call whose callee is `callee`, possibly through call
/// options such as `f{value: 1}(x)`.
fn call_arguments(tree: &Tree, callee: NodeId) -> Option<Vec<Option<TypeDescription>>> {
    let parent = tree.find_parent_node(callee)?;
    let call = match tree.get_by_id(parent)? {
        AstNode::FunctionCall(call) if call.expression == Some(callee) => call,
        AstNode::FunctionCallOptions(options) if options.expression == Some(callee) => {
            match tree.get_by_id(tree.find_parent_node(parent)?)? {
                AstNode::FunctionCall(call) if call.expression == Some(parent) => call,
                _ => return None,
            }
        }
        _ => return None,
    };
    Some(
        call.arguments
            .iter()
            .map(|argument| tree.type_of(*argument).cloned())
            .collect(),
    )
}

/// Picks the candidate whose parameters accept the argument types, then one with
/// the right number of parameters, then the first.
fn choose_overload(
    tree: &Tree,
    candidates: &[NodeId],
    arguments: Option<&[Option<TypeDescription>]>,
    skip: usize,
) -> Option<NodeId> {
    let first = *candidates.first()?;
    let Some(arguments) = arguments.filter(|_| candidates.len() > 1) else {
        return Some(first);
    };
    let parameters = |candidate: NodeId| {
        types::callable_parameters(tree, candidate)
            .and_then(|list| types::parameter_types(tree, list))
            .map(|parameters| parameters.into_iter().skip(skip).collect::<Vec<_>>())
    };
    let accepts = |candidate: &NodeId| {
        parameters(*candidate).is_some_and(|parameters| {
            parameters.len() == arguments.len()
                && parameters.iter().zip(arguments).all(|pair| match pair {
                    (Some(parameter), Some(argument)) => {
                        type_rules::argument_matches(argument, parameter)
                    }
                    _ => false,
                })
        })
    };
    let same_arity = |candidate: &NodeId| {
        parameters(*candidate).is_some_and(|parameters| parameters.len() == arguments.len())
    };
    candidates
        .iter()
        .copied()
        .find(accepts)
        .or_else(|| candidates.iter().copied().find(same_arity))
        .or(Some(first))
}

/// Library and free functions attached to `receiver` by `using for` directives in
/// the enclosing contract, the enclosing unit, or any unit's global directives.
fn attached_functions(
    tree: &Tree,
    from: NodeId,
    receiver: &TypeDescription,
    name: &str,
) -> Vec<NodeId> {
    let using = |ids: &[NodeId]| -> Vec<NodeId> {
        ids.iter()
            .copied()
            .filter(|id| matches!(tree.get_by_id(*id), Some(AstNode::UsingForDirective(_))))
            .collect()
    };
    let mut directives = Vec::new();
    if let Some(contract) = tree.enclosing_contract(from) {
        directives.extend(using(&contract.nodes));
    }
    let unit = tree.enclosing_source_unit(from).map(|unit| unit.id);
    for other in tree.source_units() {
        let candidates = using(&other.nodes);
        if Some(other.id) == unit {
            directives.extend(candidates);
        } else {
            directives.extend(candidates.into_iter().filter(|id| {
                matches!(tree.get_by_id(*id), Some(AstNode::UsingForDirective(d)) if d.is_global)
            }));
        }
    }

    let mut found = Vec::new();
    let mut push = |id: NodeId| {
        if !found.contains(&id) {
            found.push(id);
        }
    };
    for directive in directives {
        let Some(AstNode::UsingForDirective(directive)) = tree.get_by_id(directive) else {
            continue;
        };
        let applies = directive.type_name.is_none_or(|target| {
            tree.type_of(target)
                .is_some_and(|target| types::attaches_to(receiver, target))
        });
        if !applies {
            continue;
        }
        let library = directive
            .library_name
            .and_then(|path| tree.get_by_id(path))
            .and_then(AstNode::referenced_declaration);
        if let Some(AstNode::ContractDefinition(library)) = library.and_then(|l| tree.get_by_id(l))
        {
            for member in &library.nodes {
                if let Some(AstNode::FunctionDefinition(function)) = tree.get_by_id(*member)
                    && function.name == name
                {
                    push(*member);
                }
            }
        }
        for path in &directive.function_list {
            let declaration = tree
                .get_by_id(*path)
                .and_then(AstNode::referenced_declaration);
            if let Some(declaration) = declaration
                && let Some(AstNode::FunctionDefinition(function)) = tree.get_by_id(declaration)
                && function.name == name
            {
                push(declaration);
            }
        }
    }
    found
}

fn type_index_access(tree: &mut Tree, id: NodeId) {
    let Some(AstNode::IndexAccess(access)) = tree.get_by_id(id) else {
        return;
    };
    if access.type_description.is_some() {
        return;
    }
    let base = access.base_expression;
    let index = access.index_expression;
    let type_description = base
        .and_then(|base| types::element_type(tree, base))
        .or_else(|| {
            base.and_then(|base| tree.type_of(base))
                .or_else(|| index.and_then(|index| tree.type_of(index)))
                .cloned()
        });
    if let Some(type_description) = type_description {
        tree.set_type_if_absent(id, type_description);
    }
}

/// Types a call from what its callee was bound to, and records what kind of call
/// it is: a struct constructor, a conversion to a contract, enum, or value type,
/// or an ordinary call.
fn type_function_call(tree: &mut Tree, id: NodeId) {
    let Some(AstNode::FunctionCall(call)) = tree.get_by_id(id) else {
        return;
    };
    let Some(callee) = call.expression else {
        return;
    };
    let target = match tree.get_by_id(callee) {
        Some(AstNode::FunctionCallOptions(options)) => options.expression.unwrap_or(callee),
        _ => callee,
    };
    let (kind, type_description, declaration) = call_shape(tree, target);
    let Some(AstNode::FunctionCall(call)) = tree.get_by_id_mut(id) else {
        return;
    };
    if call.kind == FunctionCallKind::FunctionCall {
        call.kind = kind;
    }
    if call.referenced_declaration.is_none() {
        call.referenced_declaration = declaration;
    }
    if call.type_description.is_none() {
        call.type_description = type_description;
    }
}

fn call_shape(
    tree: &Tree,
    target: NodeId,
) -> (FunctionCallKind, Option<TypeDescription>, Option<NodeId>) {
    let ordinary = |type_description| (FunctionCallKind::FunctionCall, type_description, None);
    let Some(callee) = tree.get_by_id(target) else {
        return ordinary(None);
    };
    let Some(declaration) = callee.referenced_declaration() else {
        return match callee {
            AstNode::NewExpression(new) => ordinary(new.type_description.clone()),
            AstNode::MemberAccess(access) => ordinary(value_type_conversion(
                tree,
                access.expression,
                &access.member_name,
            )),
            _ => ordinary(None),
        };
    };
    match tree.get_by_id(declaration) {
        Some(AstNode::FunctionDefinition(function)) => (
            FunctionCallKind::FunctionCall,
            types::returns_type(tree, function.return_parameters),
            Some(declaration),
        ),
        Some(AstNode::EventDefinition(_) | AstNode::ErrorDefinition(_)) => (
            FunctionCallKind::FunctionCall,
            Some(type_rules::tuple(&[])),
            Some(declaration),
        ),
        Some(AstNode::StructDefinition(structure)) => (
            FunctionCallKind::StructConstructorCall,
            structure
                .type_description
                .as_ref()
                .map(|t| type_rules::located(t, StorageLocation::Memory, false)),
            Some(declaration),
        ),
        Some(
            AstNode::ContractDefinition(_)
            | AstNode::EnumDefinition(_)
            | AstNode::UserDefinedValueTypeDefinition(_),
        ) => (
            FunctionCallKind::TypeConversion,
            types::reference_type(tree, declaration),
            Some(declaration),
        ),
        Some(AstNode::VariableDeclaration(variable)) => {
            match variable.type_name.and_then(|type_name| tree.get_by_id(type_name)) {
                Some(AstNode::FunctionTypeName(function)) => {
                    ordinary(types::returns_type(tree, function.return_parameter_types))
                }
                _ => ordinary(None),
            }
        }
        _ => ordinary(None),
    }
}

/// Result of `T.wrap(x)` and `T.unwrap(t)` for a user-defined value type `T`.
fn value_type_conversion(
    tree: &Tree,
    object: Option<NodeId>,
    member: &str,
) -> Option<TypeDescription> {
    let declaration = tree.get_by_id(object?)?.referenced_declaration()?;
    let Some(AstNode::UserDefinedValueTypeDefinition(value_type)) = tree.get_by_id(declaration)
    else {
        return None;
    };
    match member {
        "wrap" => value_type.type_description.clone(),
        "unwrap" => tree.type_of(value_type.underlying_type).cloned(),
        _ => None,
    }
}

/// Types `new T` and records contracts created from inside another contract as
/// dependencies of that contract.
fn type_new_expression(tree: &mut Tree, id: NodeId) {
    let Some(AstNode::NewExpression(new)) = tree.get_by_id(id) else {
        return;
    };
    let Some(type_name) = new.type_name else {
        return;
    };
    if let Some(type_description) = tree
        .type_of(type_name)
        .map(|t| type_rules::located(t, StorageLocation::Memory, false))
    {
        tree.set_type_if_absent(id, type_description);
    }
    let created = tree
        .get_by_id(type_name)
        .and_then(AstNode::referenced_declaration)
        .filter(|d| matches!(tree.get_by_id(*d), Some(AstNode::ContractDefinition(_))));
    let creator = tree.enclosing_contract(id).map(|contract| contract.id);
    if let (Some(created), Some(creator)) = (created, creator)
        && created != creator
        && let Some(AstNode::ContractDefinition(contract)) = tree.get_by_id_mut(creator)
        && !contract.contract_dependencies.contains(&created)
    {
        contract.contract_dependencies.push(created);
    }
}

/// The type rule of kinds whose type follows from their children alone.
fn derived_type(tree: &Tree, id: NodeId) -> Option<TypeDescription> {
    let type_of = |child: Option<NodeId>| child.and_then(|child| tree.type_of(child));
    match tree.get_by_id(id)? {
        AstNode::TupleExpression(tuple) => {
            // Holes and untyped components drop out of the tuple type.
            let types: Vec<TypeDescription> = tuple
                .components
                .iter()
                .filter_map(|component| type_of(*component).cloned())
                .collect();
            let first = types.first()?;
            if tuple.is_inline_array {
                let length = tuple.components.len().to_string();
                let array = type_rules::array(first, Some(&length));
                Some(type_rules::located(&array, StorageLocation::Memory, false))
            } else if tuple.components.len() == 1 {
                Some(first.clone())
            } else {
                Some(type_rules::tuple(&types))
            }
        }
        AstNode::BinaryOperation(operation) => {
            type_rules::binary(operation.operator, type_of(operation.left_expression))
        }
        AstNode::UnaryPrefixOperation(operation) => {
            type_rules::unary(operation.operator, type_of(operation.sub_expression))
        }
        AstNode::UnarySuffixOperation(operation) => {
            type_rules::unary(operation.operator, type_of(operation.sub_expression))
        }
        AstNode::Assignment(assignment) => type_of(assignment.right_hand_side).cloned(),
        AstNode::Conditional(conditional) => type_of(conditional.true_expression).cloned(),
        AstNode::IndexRangeAccess(access) => type_of(access.base_expression).cloned(),
        AstNode::FunctionCallOptions(options) => type_of(options.expression).cloned(),
        AstNode::MetaType(meta) => type_of(meta.type_name).map(type_rules::meta_type),
        _ => None,
    }
}

fn is_bindable(node: &AstNode) -> bool {
    node.is_declaration()
        && !matches!(
            node,
            AstNode::YulTypedName(_) | AstNode::YulFunctionDefinition(_)
        )
}

/// Names the language provides without a declaration.
fn is_builtin(name: &str) -> bool {
    type_rules::magic_identifier(name).is_some()
        || type_rules::builtin_function(name).is_some()
        || matches!(name, "type" | "string" | "bytes" | "address" | "payable" | "_")
}
