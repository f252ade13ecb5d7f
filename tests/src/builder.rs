use crate::utils::{
    SOURCE_PATH, build_ast, build_tree, contract, function, identifiers, type_identifier, variable,
};
use solgraph_ast::builder::Builder;
use solgraph_ast::errors::AstError;
use solgraph_ast::nodes::{
    AstNode, ContractKind, FunctionKind, LiteralKind, NodeId, NodeType, StorageLocation,
};
use solgraph_ast::tree::Tree;
use solgraph_ast::type_rules;

/// Node types of the statements of the block `block`.
fn statement_types(tree: &Tree, block: NodeId) -> Vec<NodeType> {
    let statements = match tree.get_by_id(block) {
        Some(AstNode::Block(block)) => &block.statements,
        Some(AstNode::UncheckedBlock(block)) => &block.statements,
        other => panic!("{block} is not a block: {other:?}"),
    };
    statements
        .iter()
        .map(|id| tree.get_by_id(*id).unwrap().node_type())
        .collect()
}

fn body_of(tree: &Tree, function: NodeId) -> NodeId {
    match tree.get_by_id(function) {
        Some(AstNode::FunctionDefinition(function)) => function.body.unwrap(),
        Some(AstNode::ModifierDefinition(modifier)) => modifier.body.unwrap(),
        other => panic!("{function} has no body: {other:?}"),
    }
}

#[test]
fn test_build_contract_members() {
    let source = r#"
contract Counter {
    uint256 count;
    function inc(uint256 by) public returns (uint256) {
        count += by;
        return count;
    }
}
"#;
    let output = build_ast(source);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let tree = output.tree;

    let source_units = tree.source_units();
    assert_eq!(source_units.len(), 1);
    assert_eq!(source_units[0].absolute_path, crate::utils::SOURCE_PATH);

    let counter = contract(&tree, "Counter");
    assert_eq!(counter.kind, ContractKind::Contract);
    assert_eq!(counter.nodes.len(), 2);

    let functions = tree.functions();
    assert_eq!(functions.len(), 1);
    assert_eq!(functions[0].name, "inc");
    assert_eq!(functions[0].kind, FunctionKind::Function);
    assert!(functions[0].implemented);
}

#[test]
fn test_build_contract_kinds() {
    let source = r#"
interface IToken { function total() external view returns (uint256); }
library Math { function one() internal pure returns (uint256) { return 1; } }
abstract contract Base { function f() public virtual; }
"#;
    let tree = build_tree(source);
    assert_eq!(contract(&tree, "IToken").kind, ContractKind::Interface);
    assert_eq!(contract(&tree, "Math").kind, ContractKind::Library);
    let base = contract(&tree, "Base");
    assert_eq!(base.kind, ContractKind::Contract);
    assert!(base.is_abstract);
}

#[test]
fn test_state_variables_are_typed_from_elementary_names() {
    let source = r#"
contract C {
    uint256 public total;
    address owner;
    bool paused;
}
"#;
    let tree = build_tree(source);
    let total = variable(&tree, "total");
    assert_eq!(type_identifier(&tree, total), Some("t_uint256"));
    let Some(AstNode::VariableDeclaration(total)) = tree.get_by_id(total) else {
        panic!("total is not a variable");
    };
    assert!(total.state_variable);
    assert_eq!(total.storage_location, StorageLocation::Default);

    assert_eq!(type_identifier(&tree, variable(&tree, "owner")), Some("t_address"));
    assert_eq!(type_identifier(&tree, variable(&tree, "paused")), Some("t_bool"));
}

#[test]
fn test_number_literals_are_rationals() {
    let source = r#"
contract C {
    function f() public pure returns (uint256) {
        uint256 a = 42;
        return a * 3.14;
    }
}
"#;
    let tree = build_tree(source);
    let literal_type = |value: &str| {
        tree.filter_nodes(|node| matches!(node, AstNode::Literal(l) if l.value == value))
            .first()
            .and_then(|node| node.type_description())
            .map(|t| t.type_identifier.clone())
    };
    assert_eq!(literal_type("42").as_deref(), Some("t_rational_42_by_1"));
    assert_eq!(literal_type("3.14").as_deref(), Some("t_rational_314_by_100"));
}

#[test]
fn test_string_and_bool_literals() {
    let source = r#"
contract C {
    function f() public pure returns (bool) {
        string memory s = "hi";
        return true;
    }
}
"#;
    let tree = build_tree(source);
    let literals = tree.filter_nodes(|node| node.node_type() == NodeType::Literal);
    assert_eq!(literals.len(), 2);
    let AstNode::Literal(string) = literals[0] else {
        panic!("expected a literal");
    };
    assert_eq!(string.kind, LiteralKind::String);
    assert_eq!(string.value, "hi");
    assert_eq!(string.hex_value, "6869");
    let AstNode::Literal(boolean) = literals[1] else {
        panic!("expected a literal");
    };
    assert_eq!(boolean.kind, LiteralKind::Bool);
    assert_eq!(
        boolean.type_description.as_ref().map(|t| t.type_identifier.as_str()),
        Some("t_bool")
    );
}

#[test]
fn test_builtin_identifiers_are_typed_when_built() {
    let source = r#"
contract C {
    function f() public view {
        require(msg.sender != address(0), "zero");
    }
}
"#;
    let tree = build_tree(source);
    let msg = crate::utils::identifiers(&tree, "msg");
    assert_eq!(msg.len(), 1);
    assert_eq!(
        msg[0].type_description.as_ref().map(|t| t.type_identifier.as_str()),
        Some("t_magic_message")
    );
    assert!(msg[0].referenced_declaration.is_none());
}

#[test]
fn test_parameters_and_returns_belong_to_the_function() {
    let source = r#"
contract C {
    function f(uint256 a, bool b) public pure returns (uint256 r) { r = a; }
}
"#;
    let tree = build_tree(source);
    let f = function(&tree, "f");
    for name in ["a", "b", "r"] {
        let parameter = variable(&tree, name);
        let list = tree.find_parent_node(parameter).unwrap();
        assert_eq!(tree.get_by_id(list).unwrap().node_type(), NodeType::ParameterList);
        assert_eq!(tree.find_parent_node(list), Some(f));
    }
}

#[test]
fn test_file_level_declarations_are_global_nodes() {
    let source = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

struct Point { uint256 x; uint256 y; }
error Unauthorized(address caller);
function double(uint256 v) pure returns (uint256) { return v * 2; }
contract C {}
"#;
    let tree = build_tree(source);
    let root = tree.root();
    assert_eq!(root.source_units.len(), 1);
    let unit = root.source_units[0];
    assert_eq!(unit.license.as_deref(), Some("MIT"));

    let globals: Vec<NodeType> = root.global_nodes.iter().map(|node| node.node_type()).collect();
    assert_eq!(
        globals,
        vec![
            NodeType::StructDefinition,
            NodeType::ErrorDefinition,
            NodeType::FunctionDefinition
        ]
    );

    let exported: Vec<&str> = unit.exported_symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(exported, vec!["Point", "Unauthorized", "double", "C"]);
    assert_eq!(tree.functions()[0].kind, FunctionKind::FreeFunction);
}

#[test]
fn test_syntax_errors_are_diagnostics() {
    let source = r#"
contract C {
    function f( public {}
}
"#;
    let output = build_ast(source);
    assert!(!output.diagnostics.is_empty());
    assert_eq!(output.tree.source_units().len(), 1);
}

#[test]
fn test_import_directive_records_aliases() {
    let source = r#"
import "./Math.sol" as M;
import {Token as T, Owned} from "../lib/Token.sol";
"#;
    let tree = build_tree(source);
    let imports: Vec<_> = tree
        .filter_nodes(|node| node.node_type() == NodeType::ImportDirective)
        .into_iter()
        .filter_map(|node| match node {
            AstNode::ImportDirective(import) => Some(import),
            _ => None,
        })
        .collect();
    assert_eq!(imports.len(), 2);

    assert_eq!(imports[0].file, "./Math.sol");
    assert_eq!(imports[0].absolute_path, "/project/contracts/Math.sol");
    assert_eq!(imports[0].unit_alias.as_deref(), Some("M"));

    assert_eq!(imports[1].absolute_path, "/project/lib/Token.sol");
    let aliases: Vec<(&str, &str)> = imports[1]
        .symbol_aliases
        .iter()
        .map(|alias| (alias.foreign.as_str(), alias.local_name()))
        .collect();
    assert_eq!(aliases, vec![("Token", "T"), ("Owned", "Owned")]);
}

#[test]
fn test_inline_assembly_is_built() {
    let source = r#"
contract C {
    function f(uint256 x) public pure returns (uint256 y) {
        assembly {
            let doubled := mul(x, 2)
            y := doubled
        }
    }
}
"#;
    let output = build_ast(source);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let tree = output.tree;
    assert_eq!(
        tree.filter_nodes(|node| node.node_type() == NodeType::InlineAssembly).len(),
        1
    );
    let typed_names = tree.filter_nodes(|node| node.node_type() == NodeType::YulTypedName);
    assert_eq!(typed_names.len(), 1);
    assert_eq!(typed_names[0].name(), Some("doubled"));
}

#[test]
fn test_function_and_modifier_bodies_keep_their_statements() {
    let source = r#"
contract C {
    modifier guarded() {
        require(true);
        _;
    }
    function f() public guarded {
        uint256 x = 1;
        if (x > 0) {
            x = 2;
        } else x = 3;
        for (uint256 i = 0; i < 2; i++) x += i;
    }
}
"#;
    let output = build_ast(source);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let tree = output.tree;

    let modifier = tree
        .filter_nodes(|node| node.node_type() == NodeType::ModifierDefinition)[0]
        .id();
    assert_eq!(
        statement_types(&tree, body_of(&tree, modifier)),
        vec![NodeType::ExpressionStatement, NodeType::PlaceholderStatement]
    );
    assert_eq!(
        statement_types(&tree, body_of(&tree, function(&tree, "f"))),
        vec![
            NodeType::VariableDeclarationStatement,
            NodeType::IfStatement,
            NodeType::ForStatement
        ]
    );

    let Some(AstNode::IfStatement(branch)) = tree
        .filter_nodes(|node| node.node_type() == NodeType::IfStatement)
        .into_iter()
        .next()
    else {
        panic!("no if statement");
    };
    let true_body = branch.true_body.unwrap();
    assert_eq!(statement_types(&tree, true_body), vec![NodeType::ExpressionStatement]);
    let false_body = tree.get_by_id(branch.false_body.unwrap()).unwrap();
    assert_eq!(false_body.node_type(), NodeType::ExpressionStatement);

    let Some(AstNode::ForStatement(for_loop)) = tree
        .filter_nodes(|node| node.node_type() == NodeType::ForStatement)
        .into_iter()
        .next()
    else {
        panic!("no for statement");
    };
    assert!(for_loop.initialization_expression.is_some());
    assert!(for_loop.body.is_some());
}

#[test]
fn test_unchecked_block_is_built() {
    let source = r#"
contract C {
    function f(uint256 a) public pure returns (uint256) {
        unchecked {
            a = a + 1;
        }
        return a;
    }
}
"#;
    let output = build_ast(source);
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    let tree = output.tree;
    let body = body_of(&tree, function(&tree, "f"));
    assert_eq!(
        statement_types(&tree, body),
        vec![NodeType::UncheckedBlock, NodeType::Return]
    );

    let unchecked = tree.filter_nodes(|node| node.node_type() == NodeType::UncheckedBlock);
    assert_eq!(unchecked.len(), 1);
    assert_eq!(
        statement_types(&tree, unchecked[0].id()),
        vec![NodeType::ExpressionStatement]
    );
}

#[test]
fn test_tuple_type_skips_untyped_components() {
    let source = r#"
contract C {
    function f(uint256 x) public pure returns (uint256, bool) {
        return (x, true);
    }
    function g() public pure returns (uint256[3] memory) {
        return [1, 2, 3];
    }
}
"#;
    let tree = build_tree(source);
    let x = identifiers(&tree, "x")[0].id;
    let tuple = tree.find_parent_node(x).unwrap();
    assert_eq!(tree.get_by_id(tuple).unwrap().node_type(), NodeType::TupleExpression);
    // `x` is not bound yet, so only the literal contributes.
    assert_eq!(
        tree.type_of(tuple),
        Some(&type_rules::tuple(&[type_rules::bool_type()]))
    );

    let arrays: Vec<_> = tree
        .filter_nodes(|node| matches!(node, AstNode::TupleExpression(t) if t.is_inline_array));
    assert_eq!(arrays.len(), 1);
    let first = type_rules::number_literal("1", None).unwrap();
    let expected = type_rules::located(
        &type_rules::array(&first, Some("3")),
        StorageLocation::Memory,
        false,
    );
    assert_eq!(arrays[0].type_description(), Some(&expected));
}

#[test]
fn test_unknown_binary_operator_is_reported_and_omitted() {
    // The grammar only produces operators the builder knows, so the tree is
    // parsed from `+` and built against text where the operator reads `@`.
    let parsed_from = "contract C { function f(uint256 a) public pure { a + a; } }";
    let built_from = parsed_from.replace('+', "@");
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_solidity::LANGUAGE.into())
        .unwrap();
    let parsed = parser.parse(parsed_from, None).unwrap();
    let mut builder = Builder::new();
    builder
        .add_source_code(parsed.root_node(), built_from.as_bytes(), SOURCE_PATH)
        .unwrap();
    let output = builder.build_ast();

    assert!(
        output
            .diagnostics
            .iter()
            .any(|diagnostic| matches!(diagnostic, AstError::UnrecognizedConstruct { .. })),
        "{:?}",
        output.diagnostics
    );
    let tree = output.tree;
    assert!(
        tree.filter_nodes(|node| node.node_type() == NodeType::BinaryOperation)
            .is_empty()
    );
    let Some(AstNode::ExpressionStatement(statement)) = tree
        .filter_nodes(|node| node.node_type() == NodeType::ExpressionStatement)
        .into_iter()
        .next()
    else {
        panic!("no expression statement");
    };
    assert_eq!(statement.expression, None);
}
