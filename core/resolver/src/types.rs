//! Type lookups that need the tree: the type a reference to a declaration takes,
//! the declaration a type points back to, and element types of indexed values.

use solgraph_ast::nodes::{AstNode, NodeId, StorageLocation, TypeDescription};
use solgraph_ast::tree::Tree;
use solgraph_ast::type_rules;

use crate::scope::{self, Container};

/// Type of an expression that refers to `declaration`.
pub(crate) fn reference_type(tree: &Tree, declaration: NodeId) -> Option<TypeDescription> {
    match tree.get_by_id(declaration)? {
        AstNode::EnumValue(_) => tree
            .find_parent_node(declaration)
            .and_then(|parent| tree.type_of(parent))
            .cloned(),
        AstNode::SourceUnit(unit) => Some(type_rules::module(&unit.absolute_path, unit.id)),
        node => node.type_description().cloned(),
    }
}

/// Declaration id embedded in a contract, struct, enum, value type, or module
/// type identifier.
pub(crate) fn declaration_of_type(type_identifier: &str) -> Option<NodeId> {
    if let Some(id) = type_identifier.strip_prefix("t_module_") {
        return id.parse().ok();
    }
    let rest = [
        "t_contract$_",
        "t_struct$_",
        "t_enum$_",
        "t_userDefinedValueType$_",
    ]
    .iter()
    .find_map(|prefix| type_identifier.strip_prefix(prefix))?;
    let (_, tail) = rest.split_once("_$")?;
    let digits: String = tail.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// What a `.` after the expression `object` looks into.
pub(crate) fn container_of_expression(tree: &Tree, object: NodeId) -> Option<Container> {
    let node = tree.get_by_id(object)?;
    if let AstNode::Identifier(identifier) = node
        && identifier.referenced_declaration.is_none()
    {
        let contract = tree.enclosing_contract(object).map(|contract| contract.id);
        match identifier.name.as_str() {
            "this" => return contract.map(Container::Contract),
            "super" => return contract.map(Container::Super),
            _ => {}
        }
    }
    if let Some(container) = node
        .referenced_declaration()
        .and_then(|declaration| scope::container_of_declaration(tree, declaration))
    {
        return Some(container);
    }
    let declaration = declaration_of_type(&tree.type_of(object)?.type_identifier)?;
    match tree.get_by_id(declaration)? {
        AstNode::ContractDefinition(_) => Some(Container::Contract(declaration)),
        AstNode::StructDefinition(_) => Some(Container::Struct(declaration)),
        AstNode::SourceUnit(_) => Some(Container::Module(declaration)),
        _ => None,
    }
}

/// The type name node that declares the value of `expression`, when it can be
/// traced back to one.
pub(crate) fn type_name_of_expression(tree: &Tree, expression: NodeId) -> Option<NodeId> {
    match tree.get_by_id(expression)? {
        AstNode::Identifier(_) | AstNode::MemberAccess(_) => {
            let declaration = tree.get_by_id(expression)?.referenced_declaration()?;
            match tree.get_by_id(declaration)? {
                AstNode::VariableDeclaration(variable) => variable.type_name,
                _ => None,
            }
        }
        AstNode::IndexAccess(access) => {
            match tree.get_by_id(type_name_of_expression(tree, access.base_expression?)?)? {
                AstNode::Mapping(mapping) => Some(mapping.value_type),
                AstNode::ArrayTypeName(array) => Some(array.base_type),
                _ => None,
            }
        }
        AstNode::TupleExpression(tuple) if tuple.components.len() == 1 => {
            type_name_of_expression(tree, tuple.components[0]?)
        }
        AstNode::FunctionCall(call) => {
            let Some(AstNode::FunctionDefinition(function)) =
                tree.get_by_id(call.referenced_declaration?)
            else {
                return None;
            };
            let Some(AstNode::ParameterList(returns)) = tree.get_by_id(function.return_parameters)
            else {
                return None;
            };
            match returns.parameters.as_slice() {
                [single] => match tree.get_by_id(*single)? {
                    AstNode::VariableDeclaration(variable) => variable.type_name,
                    _ => None,
                },
                _ => None,
            }
        }
        _ => None,
    }
}

/// Type of `base[index]`.
pub(crate) fn element_type(tree: &Tree, base: NodeId) -> Option<TypeDescription> {
    let base_type = tree.type_of(base)?;
    if let Some(type_name) = type_name_of_expression(tree, base) {
        match tree.get_by_id(type_name) {
            Some(AstNode::Mapping(mapping)) => {
                return tree
                    .type_of(mapping.value_type)
                    .map(|value| type_rules::located(value, StorageLocation::Default, true));
            }
            Some(AstNode::ArrayTypeName(array)) => {
                return tree
                    .type_of(array.base_type)
                    .map(|element| relocate(element, base_type));
            }
            _ => {}
        }
    }
    base_type
        .type_identifier
        .starts_with("t_bytes")
        .then(|| type_rules::elementary("bytes1", false))
}

/// Places `element` in the data location of the value that holds it.
fn relocate(element: &TypeDescription, holder: &TypeDescription) -> TypeDescription {
    let holder = holder.type_identifier.as_str();
    if holder.ends_with("_memory_ptr") {
        type_rules::located(element, StorageLocation::Memory, false)
    } else if holder.ends_with("_calldata_ptr") {
        type_rules::located(element, StorageLocation::Calldata, false)
    } else if holder.ends_with("_storage_ptr") {
        type_rules::located(element, StorageLocation::Storage, false)
    } else {
        type_rules::located(element, StorageLocation::Default, true)
    }
}

/// Declared types of a parameter list; `None` entries are not known yet.
pub(crate) fn parameter_types(tree: &Tree, list: NodeId) -> Option<Vec<Option<TypeDescription>>> {
    let Some(AstNode::ParameterList(list)) = tree.get_by_id(list) else {
        return None;
    };
    Some(
        list.parameters
            .iter()
            .map(|parameter| tree.type_of(*parameter).cloned())
            .collect(),
    )
}

/// Parameter list a callable declaration takes its arguments through.
pub(crate) fn callable_parameters(tree: &Tree, declaration: NodeId) -> Option<NodeId> {
    match tree.get_by_id(declaration)? {
        AstNode::FunctionDefinition(function) => Some(function.parameters),
        AstNode::ModifierDefinition(modifier) => Some(modifier.parameters),
        AstNode::EventDefinition(event) => Some(event.parameters),
        AstNode::ErrorDefinition(error) => Some(error.parameters),
        _ => None,
    }
}

/// Result type of calling a function whose return parameters are `returns`.
pub(crate) fn returns_type(tree: &Tree, returns: NodeId) -> Option<TypeDescription> {
    let types: Option<Vec<TypeDescription>> = parameter_types(tree, returns)?.into_iter().collect();
    types.map(|types| type_rules::call_result(&types))
}

/// Whether `receiver` is the type a `using ... for <target>` directive attaches to.
pub(crate) fn attaches_to(receiver: &TypeDescription, target: &TypeDescription) -> bool {
    type_rules::argument_matches(receiver, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_ids_are_read_back_from_type_identifiers() {
        assert_eq!(declaration_of_type("t_contract$_Token_$12"), Some(12));
        assert_eq!(declaration_of_type("t_struct$_Order_$40_storage_ptr"), Some(40));
        assert_eq!(declaration_of_type("t_enum$_State_$7"), Some(7));
        assert_eq!(declaration_of_type("t_module_3"), Some(3));
        assert_eq!(declaration_of_type("t_uint256"), None);
        assert_eq!(
            declaration_of_type("t_array$_t_struct$_Order_$40_storage_$dyn_storage"),
            None
        );
    }

    #[test]
    fn elements_follow_the_location_of_their_array() {
        let element = type_rules::structure("S", "S", 4);
        let memory = TypeDescription::new(
            "struct S[] memory",
            "t_array$_t_struct$_S_$4_storage_$dyn_memory_ptr",
        );
        assert_eq!(
            relocate(&element, &memory).type_identifier,
            "t_struct$_S_$4_memory_ptr"
        );
        let storage = TypeDescription::new(
            "struct S[]",
            "t_array$_t_struct$_S_$4_storage_$dyn_storage",
        );
        assert_eq!(
            relocate(&element, &storage).type_identifier,
            "t_struct$_S_$4_storage"
        );
    }
}
