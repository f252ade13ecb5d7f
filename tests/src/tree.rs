use crate::utils::{build_tree, contract, function, resolve_token, variable};
use rustc_hash::FxHashSet;
use solgraph_ast::nodes::{AstNode, NodeId, NodeType};
use solgraph_ast::tree::Tree;
use solgraph_ast::visitor::Visitor;

const SOURCE: &str = r#"
pragma solidity ^0.8.20;

contract Vault {
    mapping(address => uint256) balances;

    event Deposited(address who, uint256 amount);

    function deposit() external payable {
        balances[msg.sender] += msg.value;
        emit Deposited(msg.sender, msg.value);
    }

    function drain(address payable to) external {
        for (uint256 i = 0; i < 3; i++) {
            if (balances[to] > i) {
                to.transfer(i);
            }
        }
    }
}
"#;

/// Every node except source units has a parent that lists it among its children,
/// and the parent was allocated first.
fn assert_tree_is_well_formed(tree: &Tree) {
    let source_units: FxHashSet<NodeId> = tree.source_unit_ids().iter().copied().collect();
    for id in tree.ids() {
        let node = tree.get_by_id(id).unwrap();
        assert_eq!(node.id(), id);
        if source_units.contains(&id) {
            assert_eq!(tree.find_parent_node(id), None);
            continue;
        }
        let parent = tree
            .find_parent_node(id)
            .unwrap_or_else(|| panic!("{} {id} has no parent", node.node_type()));
        assert!(parent < id, "parent {parent} of {id} was allocated later");
        let parent_node = tree
            .get_by_id(parent)
            .unwrap_or_else(|| panic!("parent {parent} of {id} is not in the tree"));
        assert!(
            parent_node.children().contains(&id),
            "{} {parent} does not list {} {id} as a child",
            parent_node.node_type(),
            node.node_type()
        );
        let root = tree.ancestors(id).last().map(AstNode::id);
        assert!(root.is_some_and(|root| source_units.contains(&root)));
    }
}

#[test]
fn test_nodes_are_reachable_from_their_parents() {
    let tree = build_tree(SOURCE);
    assert!(!tree.is_empty());
    assert_tree_is_well_formed(&tree);
}

#[test]
fn test_ids_are_unique_across_files() {
    let (tree, _) = resolve_token();
    assert_tree_is_well_formed(&tree);

    let units = tree.source_units();
    assert_eq!(units.len(), 2);
    let first_unit_ids: FxHashSet<NodeId> = tree
        .ids()
        .into_iter()
        .filter(|id| tree.enclosing_source_unit(*id).map(|unit| unit.id) == Some(units[0].id))
        .collect();
    assert!(first_unit_ids.iter().all(|id| *id < units[1].id));
    assert_eq!(tree.source_unit_by_path("/p/Math.sol").map(|u| u.id), Some(units[1].id));
}

#[test]
fn test_enclosing_queries() {
    let tree = build_tree(SOURCE);
    let i = variable(&tree, "i");
    let drain = function(&tree, "drain");
    let vault = contract(&tree, "Vault").id;

    assert_eq!(tree.enclosing(i, NodeType::FunctionDefinition).map(AstNode::id), Some(drain));
    assert_eq!(tree.enclosing_contract(i).map(|c| c.id), Some(vault));
    assert_eq!(
        tree.enclosing_source_unit(i).map(|unit| unit.id),
        Some(tree.source_unit_ids()[0])
    );
    let nearest = tree.ancestors(i).next().map(AstNode::node_type);
    assert_eq!(nearest, Some(NodeType::VariableDeclarationStatement));
}

#[test]
fn test_filter_nodes_is_ordered_by_id() {
    let tree = build_tree(SOURCE);
    let calls = tree.filter_nodes(|node| node.node_type() == NodeType::FunctionCall);
    assert_eq!(calls.len(), 2);
    assert!(calls.windows(2).all(|pair| pair[0].id() < pair[1].id()));
}

struct KindCounter {
    visited: Vec<NodeId>,
    left: usize,
    skip: NodeType,
}

impl<'ast> Visitor<'ast> for KindCounter {
    fn visit(&mut self, node: &'ast AstNode, _tree: &'ast Tree) -> bool {
        self.visited.push(node.id());
        node.node_type() != self.skip
    }

    fn leave(&mut self, _node: &'ast AstNode, _tree: &'ast Tree) {
        self.left += 1;
    }
}

#[test]
fn test_walk_visits_every_node_once() {
    let tree = build_tree(SOURCE);
    let mut visitor = KindCounter {
        visited: Vec::new(),
        left: 0,
        skip: NodeType::YulBlock,
    };
    tree.walk(&mut visitor);

    assert_eq!(visitor.visited.len(), tree.len());
    assert_eq!(visitor.left, tree.len());
    let unique: FxHashSet<NodeId> = visitor.visited.iter().copied().collect();
    assert_eq!(unique.len(), tree.len());
    assert_eq!(visitor.visited.first(), tree.source_unit_ids().first());
}

#[test]
fn test_walk_skips_children_when_asked() {
    let tree = build_tree(SOURCE);
    let mut visitor = KindCounter {
        visited: Vec::new(),
        left: 0,
        skip: NodeType::FunctionDefinition,
    };
    tree.walk(&mut visitor);

    let functions = tree.functions();
    assert_eq!(functions.len(), 2);
    for function in functions {
        assert!(visitor.visited.contains(&function.id));
        assert!(!visitor.visited.contains(&function.parameters));
    }
    assert_eq!(visitor.left, visitor.visited.len());
}

#[test]
fn test_type_visit_stops_when_callback_declines() {
    let tree = build_tree(SOURCE);
    let mut seen = Vec::new();
    let completed = tree.execute_type_visit(NodeType::MemberAccess, |node| {
        seen.push(node.id());
        true
    });
    assert!(completed);
    assert_eq!(seen.len(), 5);

    let mut first = None;
    let completed = tree.execute_type_visit(NodeType::MemberAccess, |node| {
        first = Some(node.id());
        false
    });
    assert!(!completed);
    assert_eq!(first, seen.first().copied());
}
