use crate::utils::{
    SOURCE_PATH, contract, function, identifiers, member_accesses, read_test_file, resolve_files,
    resolve_source, resolve_token, type_identifier,
};
use solgraph_ast::nodes::{AstNode, FunctionCallKind, ModifierInvocationKind, NodeId, NodeType};
use solgraph_ast::tree::Tree;
use solgraph_ast::type_rules;
use solgraph_resolver::ReferenceKind;

/// The declaration the only identifier called `name` is bound to.
fn bound_identifier(tree: &Tree, name: &str) -> Option<NodeId> {
    let found = identifiers(tree, name);
    assert_eq!(found.len(), 1, "expected one identifier named {name}");
    found[0].referenced_declaration
}

fn parameters_of(tree: &Tree, function: NodeId) -> Vec<NodeId> {
    let Some(AstNode::FunctionDefinition(function)) = tree.get_by_id(function) else {
        panic!("{function} is not a function");
    };
    match tree.get_by_id(function.parameters) {
        Some(AstNode::ParameterList(list)) => list.parameters.clone(),
        _ => panic!("function without a parameter list"),
    }
}

fn calls(tree: &Tree) -> Vec<&solgraph_ast::nodes::FunctionCall> {
    tree.filter_nodes(|node| node.node_type() == NodeType::FunctionCall)
        .into_iter()
        .filter_map(|node| match node {
            AstNode::FunctionCall(call) => Some(call),
            _ => None,
        })
        .collect()
}

#[test]
fn test_parameter_shadows_state_variable() {
    let source = r#"
contract C {
    uint256 value;
    function get(uint256 value) public pure returns (uint256) {
        return value;
    }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let parameter = parameters_of(&tree, function(&tree, "get"))[0];
    assert_eq!(bound_identifier(&tree, "value"), Some(parameter));
}

#[test]
fn test_local_declared_later_is_not_visible() {
    let source = r#"
contract C {
    uint256 total;
    function f() public view returns (uint256) {
        uint256 before = total;
        uint256 total = 2;
        return before + total;
    }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let uses = identifiers(&tree, "total");
    assert_eq!(uses.len(), 2);
    let state = tree
        .filter_nodes(|node| {
            matches!(node, AstNode::VariableDeclaration(v)
                if v.name == "total" && v.state_variable)
        })[0]
        .id();
    let local = tree
        .filter_nodes(|node| {
            matches!(node, AstNode::VariableDeclaration(v)
                if v.name == "total" && !v.state_variable)
        })[0]
        .id();
    assert_eq!(uses[0].referenced_declaration, Some(state));
    assert_eq!(uses[1].referenced_declaration, Some(local));
}

#[test]
fn test_inherited_members_are_visible() {
    let source = r#"
contract A {
    uint256 x;
}
contract B is A {
    function f() public view returns (uint256) {
        return x;
    }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let a = contract(&tree, "A").id;
    let b = contract(&tree, "B");
    assert_eq!(b.linearized_base_contracts, vec![b.id, a]);
    assert_eq!(b.contract_dependencies, vec![a]);
    assert_eq!(contract(&tree, "A").linearized_base_contracts, vec![a]);

    let x = crate::utils::variable(&tree, "x");
    assert_eq!(bound_identifier(&tree, "x"), Some(x));
    assert_eq!(type_identifier(&tree, identifiers(&tree, "x")[0].id), Some("t_uint256"));
}

#[test]
fn test_linearization_lists_direct_bases() {
    let source = r#"
contract A { uint256 x; }
contract B is A {}
contract C is A {}
contract D is B, C {
    function f() public view returns (uint256) { return x; }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let [b, c] = ["B", "C"].map(|name| contract(&tree, name).id);
    let d = contract(&tree, "D");
    assert_eq!(d.linearized_base_contracts, vec![d.id, b, c]);
    assert_eq!(d.contract_dependencies, vec![b, c]);

    // Members of bases of bases are still in scope.
    let x = crate::utils::variable(&tree, "x");
    assert_eq!(bound_identifier(&tree, "x"), Some(x));
}

#[test]
fn test_message_members_are_typed() {
    let source = r#"
contract C {
    function f() public payable {
        address who = msg.sender;
        uint256 paid = msg.value;
    }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let sender = member_accesses(&tree, "sender");
    assert_eq!(type_identifier(&tree, sender[0].id), Some("t_address"));
    let value = member_accesses(&tree, "value");
    assert_eq!(type_identifier(&tree, value[0].id), Some("t_uint256"));
    assert!(sender[0].referenced_declaration.is_none());
}

#[test]
fn test_unknown_identifier_is_reported_once() {
    let source = r#"
contract C {
    function f() public pure returns (uint256) {
        return missing;
    }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert_eq!(unresolved.len(), 1, "{unresolved:?}");
    let reference = &unresolved[0];
    assert_eq!(reference.name, "missing");
    assert_eq!(reference.kind, ReferenceKind::Identifier);
    assert_eq!(reference.path, SOURCE_PATH);
    assert_eq!(reference.line, 4);

    let missing = identifiers(&tree, "missing");
    assert_eq!(missing[0].id, reference.id);
    assert!(missing[0].referenced_declaration.is_none());
    assert!(missing[0].type_description.is_none());
}

#[test]
fn test_resolving_twice_changes_nothing() {
    let (tree, first) = resolve_token();
    let mut again = tree.clone();
    let second = solgraph::resolve(&mut again);
    assert_eq!(again, tree);
    assert_eq!(second, first);

    let (tree, first) = resolve_source(&read_test_file("Unresolved.sol"));
    let mut again = tree.clone();
    let second = solgraph::resolve(&mut again);
    assert_eq!(again, tree);
    assert_eq!(second, first);
    assert_eq!(second.len(), 1);
}

#[test]
fn test_imports_bind_across_files() {
    let (tree, unresolved) = resolve_token();
    assert!(unresolved.is_empty(), "{unresolved:?}");

    let math_unit = tree.source_unit_by_path("/p/Math.sol").unwrap().id;
    let import = tree
        .filter_nodes(|node| node.node_type() == NodeType::ImportDirective)[0];
    let AstNode::ImportDirective(import) = import else {
        panic!("expected an import");
    };
    assert_eq!(import.absolute_path, "/p/Math.sol");
    assert_eq!(import.source_unit, Some(math_unit));

    let library = contract(&tree, "Math").id;
    assert_eq!(bound_identifier(&tree, "Math"), Some(library));
    let token_unit = tree.source_unit_by_path("/p/Token.sol").unwrap();
    assert!(
        token_unit
            .exported_symbols
            .iter()
            .any(|symbol| symbol.name == "Math" && symbol.id == library)
    );
}

#[test]
fn test_missing_import_is_reported() {
    let token = read_test_file("Token.sol");
    let (_, unresolved) = resolve_files(&[("/p/Token.sol", token.as_str())]);
    assert!(
        unresolved
            .iter()
            .any(|r| r.kind == ReferenceKind::Import && r.name == "./Math.sol"),
        "{unresolved:?}"
    );
}

#[test]
fn test_unit_alias_reaches_into_the_imported_file() {
    let main = r#"
import "./Math.sol" as M;
contract C {
    function f() public pure returns (uint256) {
        return M.Math.add(1, 2);
    }
}
"#;
    let math = read_test_file("Math.sol");
    let (tree, unresolved) =
        resolve_files(&[("/p/Main.sol", main), ("/p/Math.sol", math.as_str())]);
    assert!(unresolved.is_empty(), "{unresolved:?}");

    let math_unit = tree.source_unit_by_path("/p/Math.sol").unwrap().id;
    assert_eq!(bound_identifier(&tree, "M"), Some(math_unit));
    assert_eq!(
        member_accesses(&tree, "Math")[0].referenced_declaration,
        Some(contract(&tree, "Math").id)
    );
    let add = function(&tree, "add");
    assert_eq!(member_accesses(&tree, "add")[0].referenced_declaration, Some(add));
}

#[test]
fn test_using_for_attaches_library_functions() {
    let (tree, unresolved) = resolve_token();
    assert!(unresolved.is_empty(), "{unresolved:?}");

    let add = function(&tree, "add");
    let accesses = member_accesses(&tree, "add");
    assert_eq!(accesses.len(), 2);
    assert!(accesses.iter().all(|access| access.referenced_declaration == Some(add)));

    let balance = crate::utils::variable(&tree, "balance");
    let balances = member_accesses(&tree, "balance");
    assert_eq!(balances.len(), 3);
    assert!(balances.iter().all(|access| access.referenced_declaration == Some(balance)));
}

#[test]
fn test_calls_are_typed_by_their_return_parameters() {
    let (tree, _) = resolve_token();

    let add = function(&tree, "add");
    let add_calls: Vec<_> = calls(&tree)
        .into_iter()
        .filter(|call| call.referenced_declaration == Some(add))
        .collect();
    assert_eq!(add_calls.len(), 2);
    for call in add_calls {
        assert_eq!(call.kind, FunctionCallKind::FunctionCall);
        assert_eq!(
            call.type_description.as_ref().map(|t| t.type_identifier.as_str()),
            Some("t_uint256")
        );
    }

    let transfer = tree
        .filter_nodes(|node| matches!(node, AstNode::EventDefinition(e) if e.name == "Transfer"))[0]
        .id();
    let emitted = calls(&tree)
        .into_iter()
        .find(|call| call.referenced_declaration == Some(transfer))
        .unwrap();
    assert_eq!(emitted.type_description, Some(type_rules::tuple(&[])));
}

#[test]
fn test_overloads_are_chosen_by_argument_types() {
    let source = r#"
contract C {
    function f(uint256 a) public pure returns (uint256) { return a; }
    function f(bool b) public pure returns (bool) { return b; }
    function g() public pure returns (bool) {
        f(1);
        return f(true);
    }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let overloads: Vec<NodeId> = tree
        .filter_nodes(|node| matches!(node, AstNode::FunctionDefinition(f) if f.name == "f"))
        .into_iter()
        .map(AstNode::id)
        .collect();
    assert_eq!(overloads.len(), 2);

    let uses = identifiers(&tree, "f");
    assert_eq!(uses.len(), 2);
    assert_eq!(uses[0].referenced_declaration, Some(overloads[0]));
    assert_eq!(uses[1].referenced_declaration, Some(overloads[1]));
    for used in &uses {
        assert_eq!(used.overloaded_declarations, overloads);
    }

    let bool_call = calls(&tree)
        .into_iter()
        .find(|call| call.referenced_declaration == Some(overloads[1]))
        .unwrap();
    assert_eq!(
        bool_call.type_description.as_ref().map(|t| t.type_identifier.as_str()),
        Some("t_bool")
    );
}

#[test]
fn test_struct_members_and_constructor_calls() {
    let source = r#"
contract C {
    struct P { uint256 x; bool flag; }
    function f() public pure returns (uint256) {
        P memory p = P(1, true);
        return p.x;
    }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let structure = tree
        .filter_nodes(|node| node.node_type() == NodeType::StructDefinition)[0]
        .id();
    let constructor = calls(&tree)
        .into_iter()
        .find(|call| call.referenced_declaration == Some(structure))
        .unwrap();
    assert_eq!(constructor.kind, FunctionCallKind::StructConstructorCall);
    assert!(
        constructor
            .type_description
            .as_ref()
            .is_some_and(|t| t.type_identifier.ends_with("_memory_ptr"))
    );

    let x = crate::utils::variable(&tree, "x");
    let access = &member_accesses(&tree, "x")[0];
    assert_eq!(access.referenced_declaration, Some(x));
    assert_eq!(type_identifier(&tree, access.id), Some("t_uint256"));
}

#[test]
fn test_contract_conversion_and_enum_members() {
    let source = r#"
contract Target {}
contract C {
    enum State { Open, Closed }
    function f(address at) public pure returns (State) {
        Target t = Target(at);
        return State.Closed;
    }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let target = contract(&tree, "Target").id;
    let conversion = calls(&tree)
        .into_iter()
        .find(|call| call.referenced_declaration == Some(target))
        .unwrap();
    assert_eq!(conversion.kind, FunctionCallKind::TypeConversion);
    assert_eq!(conversion.type_description.as_ref(), tree.type_of(target));

    let closed = tree
        .filter_nodes(|node| matches!(node, AstNode::EnumValue(v) if v.name == "Closed"))[0]
        .id();
    let state = tree
        .filter_nodes(|node| node.node_type() == NodeType::EnumDefinition)[0]
        .id();
    let access = &member_accesses(&tree, "Closed")[0];
    assert_eq!(access.referenced_declaration, Some(closed));
    assert_eq!(tree.type_of(access.id), tree.type_of(state));
}

#[test]
fn test_unknown_member_is_reported() {
    let source = r#"
contract C {
    struct P { uint256 x; }
    function f(P memory p) public pure returns (uint256) {
        return p.y;
    }
}
"#;
    let (_, unresolved) = resolve_source(source);
    assert_eq!(unresolved.len(), 1, "{unresolved:?}");
    assert_eq!(unresolved[0].kind, ReferenceKind::Member);
    assert_eq!(unresolved[0].name, "y");
}

#[test]
fn test_assembly_identifiers_bind_to_locals_and_parameters() {
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
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let yul_binding = |name: &str| {
        tree.filter_nodes(|node| matches!(node, AstNode::YulIdentifier(i) if i.name == name))
            .into_iter()
            .filter_map(|node| match node {
                AstNode::YulIdentifier(identifier) => Some(identifier.referenced_declaration),
                _ => None,
            })
            .collect::<Vec<_>>()
    };
    let x = crate::utils::variable(&tree, "x");
    let y = crate::utils::variable(&tree, "y");
    let doubled = tree
        .filter_nodes(|node| node.node_type() == NodeType::YulTypedName)[0]
        .id();
    assert_eq!(yul_binding("x"), vec![Some(x)]);
    assert_eq!(yul_binding("y"), vec![Some(y)]);
    assert_eq!(yul_binding("doubled"), vec![Some(doubled)]);
}

#[test]
fn test_base_constructor_arguments_are_marked() {
    let source = r#"
contract A {
    constructor(uint256 v) {}
}
contract B is A {
    modifier guarded() { _; }
    constructor() A(1) guarded {}
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let kinds: Vec<ModifierInvocationKind> = tree
        .filter_nodes(|node| node.node_type() == NodeType::ModifierInvocation)
        .into_iter()
        .filter_map(|node| match node {
            AstNode::ModifierInvocation(invocation) => Some(invocation.kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            ModifierInvocationKind::BaseConstructorSpecifier,
            ModifierInvocationKind::ModifierInvocation
        ]
    );
}

#[test]
fn test_created_contracts_are_dependencies() {
    let source = r#"
contract Child {}
contract Factory {
    function make() public returns (Child) {
        return new Child();
    }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let child = contract(&tree, "Child").id;
    assert_eq!(contract(&tree, "Factory").contract_dependencies, vec![child]);
    assert!(contract(&tree, "Child").contract_dependencies.is_empty());
}

#[test]
fn test_callee_is_typed_from_call_arguments() {
    let source = r#"
contract C {
    function f(uint256 a) public pure returns (uint256) { return a; }
    function g() public pure returns (uint256) { return f(1); }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert!(unresolved.is_empty(), "{unresolved:?}");
    let f = function(&tree, "f");
    let callee = identifiers(&tree, "f")[0];
    assert_eq!(callee.referenced_declaration, Some(f));

    let one = type_rules::number_literal("1", None).unwrap();
    let signature = tree.type_of(callee.id).unwrap();
    assert_eq!(signature, &type_rules::callee_signature(&[one]));
    assert_eq!(signature.type_string, "function(int_const 1)");

    let call = calls(&tree)
        .into_iter()
        .find(|call| call.referenced_declaration == Some(f))
        .unwrap();
    assert_eq!(
        call.type_description.as_ref().map(|t| t.type_identifier.as_str()),
        Some("t_uint256")
    );
}

#[test]
fn test_tuple_types_drop_holes_and_untyped_components() {
    let source = r#"
contract C {
    function g() public pure returns (uint256, bool) { return (1, true); }
    function f() public {
        uint256 a;
        bool b;
        (, b) = g();
        (a, zz) = g();
    }
}
"#;
    let (tree, unresolved) = resolve_source(source);
    assert_eq!(unresolved.len(), 1, "{unresolved:?}");
    assert_eq!(unresolved[0].name, "zz");

    let tuple_holding = |name: &str| {
        let component = identifiers(&tree, name)[0].id;
        let tuple = tree.find_parent_node(component).unwrap();
        assert_eq!(tree.get_by_id(tuple).unwrap().node_type(), NodeType::TupleExpression);
        tuple
    };
    let type_of_variable =
        |name: &str| tree.type_of(crate::utils::variable(&tree, name)).cloned().unwrap();

    assert_eq!(
        tree.type_of(tuple_holding("b")),
        Some(&type_rules::tuple(&[type_of_variable("b")]))
    );
    assert_eq!(
        tree.type_of(tuple_holding("zz")),
        Some(&type_rules::tuple(&[type_of_variable("a")]))
    );
}
