use crate::utils::{build_tree, resolve_token};
use solgraph_ast::errors::AstError;
use solgraph_ast::nodes::{AstNode, NodeType};
use solgraph_ast::tree::Tree;
use solgraph_ast::typed_struct::{TypedStruct, type_url};

#[test]
fn test_resolved_tree_survives_json() -> anyhow::Result<()> {
    let (tree, _) = resolve_token();
    let value = tree.to_json()?;
    assert_eq!(
        value["nodes"].as_array().map(Vec::len),
        Some(tree.len()),
        "every node is written"
    );
    assert_eq!(Tree::from_json(value)?, tree);

    let text = tree.to_json_string()?;
    assert_eq!(Tree::from_json_str(&text)?, tree);
    Ok(())
}

#[test]
fn test_json_nodes_are_tagged_and_ordered() {
    let tree = build_tree("contract C { function f() public {} }");
    let value = tree.to_json().unwrap();
    let nodes = value["nodes"].as_array().unwrap();
    let ids: Vec<i64> = nodes.iter().map(|node| node["id"].as_i64().unwrap()).collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    assert_eq!(nodes[0]["node_type"], "SOURCE_UNIT");
    assert_eq!(value["source_units"][0], nodes[0]["id"]);
    assert!(nodes.iter().all(|node| node["src"]["line"].as_u64().is_some()));
}

#[test]
fn test_json_with_repeated_ids_is_rejected() {
    let tree = build_tree("contract C {}");
    let mut value = tree.to_json().unwrap();
    let nodes = value["nodes"].as_array_mut().unwrap();
    let first = nodes[0].clone();
    nodes.push(first);
    assert!(matches!(
        Tree::from_json(value),
        Err(AstError::InvariantViolation { .. })
    ));
}

#[test]
fn test_json_naming_missing_source_unit_is_rejected() {
    let tree = build_tree("contract C {}");
    let mut value = tree.to_json().unwrap();
    value["source_units"] = serde_json::json!([9999]);
    assert!(matches!(
        Tree::from_json(value),
        Err(AstError::InvariantViolation { .. })
    ));
    assert!(Tree::from_json_str("{ not json").is_err());
}

#[test]
fn test_every_node_travels_as_a_typed_struct() -> anyhow::Result<()> {
    let (tree, _) = resolve_token();
    for id in tree.ids() {
        let node = tree.get_by_id(id).unwrap();
        let envelope = node.to_typed_struct()?;
        assert_eq!(envelope.type_url, type_url(node.node_type()));
        assert!(envelope.type_url.starts_with("type.solgraph.dev/solgraph.ast."));
        assert_eq!(envelope.node_type(), Some(node.node_type()));
        assert_eq!(&envelope.into_node()?, node);
    }
    Ok(())
}

#[test]
fn test_typed_struct_with_wrong_payload_is_rejected() {
    let tree = build_tree("contract C {}");
    let unit = tree.source_units()[0];
    let contract = tree.contracts()[0];
    let mut envelope = AstNode::ContractDefinition(contract.clone())
        .to_typed_struct()
        .unwrap();
    envelope.type_url = type_url(NodeType::SourceUnit);
    assert!(matches!(
        envelope.into_node(),
        Err(AstError::TypeUrlMismatch { .. })
    ));

    let garbage = TypedStruct {
        type_url: type_url(NodeType::SourceUnit),
        value: b"{}".to_vec(),
    };
    assert!(matches!(garbage.into_node(), Err(AstError::Serialization(_))));
    assert_eq!(unit.nodes, vec![contract.id]);
}
