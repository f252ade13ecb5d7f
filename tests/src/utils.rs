use solgraph::UnresolvedReference;
use solgraph_ast::builder::{BuildOutput, Builder};
use solgraph_ast::nodes::{AstNode, ContractDefinition, Identifier, MemberAccess, NodeId};
use solgraph_ast::tree::Tree;

pub(crate) const SOURCE_PATH: &str = "/project/contracts/Main.sol";

pub(crate) fn get_test_data_path() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::env::current_dir().unwrap());
    manifest_dir.join("test_data").join("sol")
}

pub(crate) fn read_test_file(name: &str) -> String {
    std::fs::read_to_string(get_test_data_path().join(name)).unwrap()
}

/// Builds one source at [`SOURCE_PATH`] without resolving it.
pub(crate) fn build_ast(source_code: &str) -> BuildOutput {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_solidity::LANGUAGE.into())
        .expect("Error loading Solidity grammar");
    let parsed = parser.parse(source_code, None).unwrap();
    let mut builder = Builder::new();
    builder
        .add_source_code(parsed.root_node(), source_code.as_bytes(), SOURCE_PATH)
        .unwrap();
    builder.build_ast()
}

pub(crate) fn build_tree(source_code: &str) -> Tree {
    build_ast(source_code).tree
}

pub(crate) fn resolve_source(source_code: &str) -> (Tree, Vec<UnresolvedReference>) {
    resolve_files(&[(SOURCE_PATH, source_code)])
}

pub(crate) fn resolve_files(files: &[(&str, &str)]) -> (Tree, Vec<UnresolvedReference>) {
    let mut output = solgraph::parse_sources(files).unwrap();
    let unresolved = solgraph::resolve(&mut output.tree);
    (output.tree, unresolved)
}

/// `Token.sol` and the `Math.sol` it imports, resolved together under `/p/`.
pub(crate) fn resolve_token() -> (Tree, Vec<UnresolvedReference>) {
    let token = read_test_file("Token.sol");
    let math = read_test_file("Math.sol");
    resolve_files(&[("/p/Token.sol", token.as_str()), ("/p/Math.sol", math.as_str())])
}

pub(crate) fn contract<'a>(tree: &'a Tree, name: &str) -> &'a ContractDefinition {
    tree.contracts()
        .into_iter()
        .find(|contract| contract.name == name)
        .unwrap_or_else(|| panic!("no contract named {name}"))
}

/// Id of the only declaration called `name` of the kind `matches` accepts.
pub(crate) fn declaration(tree: &Tree, name: &str, matches: fn(&AstNode) -> bool) -> NodeId {
    let found: Vec<NodeId> = tree
        .filter_nodes(|node| node.is_declaration() && node.name() == Some(name) && matches(node))
        .into_iter()
        .map(AstNode::id)
        .collect();
    assert_eq!(found.len(), 1, "expected one declaration named {name}, found {found:?}");
    found[0]
}

pub(crate) fn variable(tree: &Tree, name: &str) -> NodeId {
    declaration(tree, name, |node| matches!(node, AstNode::VariableDeclaration(_)))
}

pub(crate) fn function(tree: &Tree, name: &str) -> NodeId {
    declaration(tree, name, |node| matches!(node, AstNode::FunctionDefinition(_)))
}

pub(crate) fn identifiers<'a>(tree: &'a Tree, name: &str) -> Vec<&'a Identifier> {
    tree.filter_nodes(|node| matches!(node, AstNode::Identifier(i) if i.name == name))
        .into_iter()
        .filter_map(|node| match node {
            AstNode::Identifier(identifier) => Some(identifier),
            _ => None,
        })
        .collect()
}

pub(crate) fn member_accesses<'a>(tree: &'a Tree, member: &str) -> Vec<&'a MemberAccess> {
    tree.filter_nodes(|node| matches!(node, AstNode::MemberAccess(m) if m.member_name == member))
        .into_iter()
        .filter_map(|node| match node {
            AstNode::MemberAccess(access) => Some(access),
            _ => None,
        })
        .collect()
}

pub(crate) fn type_identifier(tree: &Tree, id: NodeId) -> Option<&str> {
    tree.type_of(id).map(|t| t.type_identifier.as_str())
}
