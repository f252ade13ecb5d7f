//! Name lookup over the tree.
//!
//! Scopes are not materialized; a lookup walks the parent chain of the referring
//! node and asks each enclosing construct for the names it declares. The nearest
//! construct with a match wins, which gives shadowing in this order:
//!
//! 1. locals declared by earlier statements of the enclosing blocks
//! 2. parameters and return parameters of the enclosing function or modifier
//! 3. members of the enclosing contract, then of its bases, depth first
//! 4. symbols of the source unit, then of the units it imports, then of every unit

use solgraph_ast::nodes::{AstNode, ContractDefinition, NodeId, SourceUnit};
use solgraph_ast::tree::Tree;

/// Something whose members can be named with `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Container {
    Contract(NodeId),
    /// The bases of a contract, as seen through `super`.
    Super(NodeId),
    Struct(NodeId),
    Enum(NodeId),
    Module(NodeId),
    /// A user-defined value type, whose only members are `wrap` and `unwrap`.
    ValueType(NodeId),
}

impl Container {
    /// Whether a missing member of this container is worth reporting.
    pub(crate) fn reports_missing(self) -> bool {
        !matches!(self, Container::ValueType(_))
    }
}

/// Declarations visible as `name` from `from`, nearest scope first.
///
/// Returns every overload when the match is callable, otherwise a single id.
pub(crate) fn lookup<F>(tree: &Tree, name: &str, from: NodeId, accept: F) -> Vec<NodeId>
where
    F: Fn(&AstNode) -> bool,
{
    let Some(origin) = tree.get_by_id(from) else {
        return Vec::new();
    };
    let position = origin.src().start;
    let mut child = from;
    for ancestor in tree.ancestors(from) {
        let found = match ancestor {
            AstNode::Block(block) => earlier_locals(tree, &block.statements, name, position),
            AstNode::UncheckedBlock(block) => {
                earlier_locals(tree, &block.statements, name, position)
            }
            AstNode::ForStatement(statement) => statement
                .initialization_expression
                .filter(|init| *init != child)
                .map(|init| earlier_locals(tree, &[init], name, position))
                .unwrap_or_default(),
            AstNode::TryStatement(statement) if statement.block == Some(child) => statement
                .return_parameters
                .map(|list| parameters_named(tree, list, name))
                .unwrap_or_default(),
            AstNode::TryCatchClause(clause) => clause
                .parameters
                .map(|list| parameters_named(tree, list, name))
                .unwrap_or_default(),
            AstNode::FunctionDefinition(function) => {
                let mut found = parameters_named(tree, function.parameters, name);
                found.extend(parameters_named(tree, function.return_parameters, name));
                found
            }
            AstNode::ModifierDefinition(modifier) => {
                parameters_named(tree, modifier.parameters, name)
            }
            AstNode::ContractDefinition(contract) => contract_members(tree, contract, name, false),
            AstNode::SourceUnit(unit) => unit_symbols(tree, unit, name),
            _ => Vec::new(),
        };
        let found: Vec<NodeId> = found
            .into_iter()
            .filter(|id| tree.get_by_id(*id).is_some_and(&accept))
            .collect();
        if !found.is_empty() {
            return found;
        }
        child = ancestor.id();
    }
    Vec::new()
}

/// Members named `name` inside a container.
pub(crate) fn members_of(tree: &Tree, container: Container, name: &str) -> Vec<NodeId> {
    match container {
        Container::Contract(id) | Container::Super(id) => match tree.get_by_id(id) {
            Some(AstNode::ContractDefinition(contract)) => contract_members(
                tree,
                contract,
                name,
                matches!(container, Container::Super(_)),
            ),
            _ => Vec::new(),
        },
        Container::Struct(id) => match tree.get_by_id(id) {
            Some(AstNode::StructDefinition(structure)) => named(tree, &structure.members, name),
            _ => Vec::new(),
        },
        Container::Enum(id) => match tree.get_by_id(id) {
            Some(AstNode::EnumDefinition(enumeration)) => {
                named(tree, &enumeration.members, name)
            }
            _ => Vec::new(),
        },
        Container::Module(id) => match tree.get_by_id(id) {
            Some(AstNode::SourceUnit(unit)) => symbols_named(unit, name),
            _ => Vec::new(),
        },
        Container::ValueType(_) => Vec::new(),
    }
}

/// The container a declaration opens when it is named on the left of a `.`.
pub(crate) fn container_of_declaration(tree: &Tree, declaration: NodeId) -> Option<Container> {
    match tree.get_by_id(declaration)? {
        AstNode::ContractDefinition(_) => Some(Container::Contract(declaration)),
        AstNode::StructDefinition(_) => Some(Container::Struct(declaration)),
        AstNode::EnumDefinition(_) => Some(Container::Enum(declaration)),
        AstNode::SourceUnit(_) => Some(Container::Module(declaration)),
        AstNode::UserDefinedValueTypeDefinition(_) => Some(Container::ValueType(declaration)),
        _ => None,
    }
}

/// Contract ids searched for members of `contract`: itself, then the bases of
/// each listed contract depth first. Each id appears once.
pub(crate) fn lineage(tree: &Tree, contract: &ContractDefinition) -> Vec<NodeId> {
    let mut order = vec![contract.id];
    for base in &contract.linearized_base_contracts {
        walk_bases(tree, *base, &mut order);
    }
    order
}

fn walk_bases(tree: &Tree, contract: NodeId, order: &mut Vec<NodeId>) {
    if order.contains(&contract) {
        return;
    }
    order.push(contract);
    if let Some(AstNode::ContractDefinition(contract)) = tree.get_by_id(contract) {
        for base in &contract.linearized_base_contracts {
            walk_bases(tree, *base, order);
        }
    }
}

fn contract_members(
    tree: &Tree,
    contract: &ContractDefinition,
    name: &str,
    bases_only: bool,
) -> Vec<NodeId> {
    let mut found = Vec::new();
    for base in lineage(tree, contract).into_iter().skip(usize::from(bases_only)) {
        let Some(AstNode::ContractDefinition(base)) = tree.get_by_id(base) else {
            continue;
        };
        for member in &base.nodes {
            let Some(node) = tree.get_by_id(*member) else {
                continue;
            };
            if !node.is_declaration() || node.name() != Some(name) {
                continue;
            }
            if !is_overloadable(node) {
                if found.is_empty() {
                    return vec![*member];
                }
                continue;
            }
            found.push(*member);
        }
    }
    found
}

fn is_overloadable(node: &AstNode) -> bool {
    matches!(
        node,
        AstNode::FunctionDefinition(_) | AstNode::EventDefinition(_) | AstNode::ErrorDefinition(_)
    )
}

fn unit_symbols(tree: &Tree, unit: &SourceUnit, name: &str) -> Vec<NodeId> {
    let own = symbols_named(unit, name);
    if !own.is_empty() {
        return own;
    }
    let imported = unit.nodes.iter().filter_map(|id| match tree.get_by_id(*id) {
        Some(AstNode::ImportDirective(import)) => import.source_unit,
        _ => None,
    });
    for target in imported {
        if let Some(AstNode::SourceUnit(target)) = tree.get_by_id(target) {
            let found = symbols_named(target, name);
            if !found.is_empty() {
                return found;
            }
        }
    }
    for other in tree.source_units() {
        if other.id == unit.id {
            continue;
        }
        let found = symbols_named(other, name);
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

fn symbols_named(unit: &SourceUnit, name: &str) -> Vec<NodeId> {
    let mut found: Vec<NodeId> = Vec::new();
    for symbol in unit.exported_symbols.iter().filter(|s| s.name == name) {
        if !found.contains(&symbol.id) {
            found.push(symbol.id);
        }
    }
    found
}

/// Locals declared by statements that end before `position`, latest first.
fn earlier_locals(tree: &Tree, statements: &[NodeId], name: &str, position: u32) -> Vec<NodeId> {
    statements
        .iter()
        .rev()
        .filter_map(|id| tree.get_by_id(*id))
        .filter(|statement| statement.src().end < position)
        .find_map(|statement| match statement {
            AstNode::VariableDeclarationStatement(statement) => {
                let declared: Vec<NodeId> = statement.declared().collect();
                named(tree, &declared, name).first().copied()
            }
            _ => None,
        })
        .into_iter()
        .collect()
}

fn parameters_named(tree: &Tree, list: NodeId, name: &str) -> Vec<NodeId> {
    match tree.get_by_id(list) {
        Some(AstNode::ParameterList(list)) => named(tree, &list.parameters, name),
        _ => Vec::new(),
    }
}

fn named(tree: &Tree, ids: &[NodeId], name: &str) -> Vec<NodeId> {
    ids.iter()
        .copied()
        .filter(|id| tree.get_by_id(*id).and_then(AstNode::name) == Some(name))
        .collect()
}
