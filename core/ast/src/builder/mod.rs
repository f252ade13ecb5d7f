//! AST builder that converts tree-sitter Solidity parse trees into a [`Tree`].
//!
//! The `Builder` walks each parse tree depth-first and creates one typed node per
//! construct. For every node it:
//!
//! - allocates an id before building any child, from a counter owned by the builder
//! - records the span and the id of the owning node in the node's [`Src`]
//! - derives the types that follow from the syntax alone (literals, elementary type
//!   names, built-in identifiers)
//!
//! # Example
//!
//! ```no_run
//! use solgraph_ast::builder::Builder;
//! use tree_sitter::Parser;
//!
//! let source = "contract C { uint256 x; }";
//! let mut parser = Parser::new();
//! parser.set_language(&tree_sitter_solidity::LANGUAGE.into()).unwrap();
//! let parsed = parser.parse(source, None).unwrap();
//!
//! let mut builder = Builder::new();
//! builder
//!     .add_source_code(parsed.root_node(), source.as_bytes(), "/contracts/C.sol")
//!     .unwrap();
//! let output = builder.build_ast();
//! assert!(output.diagnostics.is_empty());
//! ```
//!
//! # Error Handling
//!
//! Problems found while building are recorded as [`AstError`] diagnostics and logged
//! with `tracing`; the offending child is left out and the rest of the file is still
//! built. Only a root node that is not a `source_file` is rejected outright.
//!
//! # Parent Selection
//!
//! Build operations receive an [`Ancestors`] value holding the innermost enclosing
//! source unit, contract, function, statement, declaration and expression. The parent
//! of a new node is the first one present in the order expression, declaration,
//! statement, function, contract, source unit. Entering a slot clears every slot that
//! ranks above it, so the parent is always the node that owns the child.

mod declarations;
mod expressions;
mod statements;
mod yul;

use std::borrow::Cow;

use tracing::{debug, warn};
use tree_sitter::Node;

use crate::errors::AstError;
use crate::nodes::{AstNode, ContractKind, ExportedSymbol, NodeId, NodeType, SourceUnit, Src};
use crate::tree::Tree;

/// Innermost enclosing nodes of the construct being built.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Ancestors {
    source_unit: Option<NodeId>,
    contract: Option<NodeId>,
    function: Option<NodeId>,
    block: Option<NodeId>,
    body: Option<NodeId>,
    declaration: Option<NodeId>,
    expression: Option<NodeId>,
    return_parameters: Option<NodeId>,
}

impl Ancestors {
    fn source_unit(id: NodeId) -> Self {
        Self {
            source_unit: Some(id),
            ..Self::default()
        }
    }

    fn contract(self, id: NodeId) -> Self {
        Self {
            source_unit: self.source_unit,
            contract: Some(id),
            ..Self::default()
        }
    }

    fn function(self, id: NodeId) -> Self {
        Self {
            source_unit: self.source_unit,
            contract: self.contract,
            function: Some(id),
            ..Self::default()
        }
    }

    fn with_return_parameters(self, id: NodeId) -> Self {
        Self {
            return_parameters: Some(id),
            ..self
        }
    }

    fn body(self, id: NodeId) -> Self {
        Self {
            body: Some(id),
            declaration: None,
            expression: None,
            ..self
        }
    }

    /// Enters a block, which is also the scope of the locals declared in it.
    fn block(self, id: NodeId) -> Self {
        Self {
            block: Some(id),
            ..self.body(id)
        }
    }

    fn declaration(self, id: NodeId) -> Self {
        Self {
            declaration: Some(id),
            expression: None,
            ..self
        }
    }

    fn expression(self, id: NodeId) -> Self {
        Self {
            expression: Some(id),
            ..self
        }
    }

    fn parent_id(&self) -> Option<NodeId> {
        self.expression
            .or(self.declaration)
            .or(self.body)
            .or(self.function)
            .or(self.contract)
            .or(self.source_unit)
    }

    /// Declaration scope recorded on variables and functions.
    fn scope(&self) -> NodeId {
        self.block
            .or(self.function)
            .or(self.contract)
            .or(self.source_unit)
            .unwrap_or_default()
    }
}

/// Result of a build session.
#[derive(Debug)]
pub struct BuildOutput {
    pub tree: Tree,
    pub diagnostics: Vec<AstError>,
}

pub struct Builder<'a> {
    tree: Tree,
    source_code: Vec<(Node<'a>, &'a [u8], String)>,
    diagnostics: Vec<AstError>,
    next_id: NodeId,
    path: String,
    contract: Option<(String, ContractKind)>,
}

impl Default for Builder<'_> {
    fn default() -> Self {
        Builder::new()
    }
}

impl<'a> Builder<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: Tree::default(),
            source_code: Vec::new(),
            diagnostics: Vec::new(),
            next_id: 1,
            path: String::new(),
            contract: None,
        }
    }

    /// Adds a parse tree and its source to the builder.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::InvariantViolation`] if `root` is not a `source_file` node.
    pub fn add_source_code(
        &mut self,
        root: Node<'a>,
        code: &'a [u8],
        absolute_path: impl Into<String>,
    ) -> Result<(), AstError> {
        if root.kind() != "source_file" {
            return Err(AstError::InvariantViolation {
                reason: format!(
                    "expected a root node of kind `source_file`, found `{}`",
                    root.kind()
                ),
            });
        }
        self.source_code.push((root, code, absolute_path.into()));
        Ok(())
    }

    /// Builds one source unit per added source, in the order they were added.
    #[must_use]
    pub fn build_ast(mut self) -> BuildOutput {
        for (root, code, path) in std::mem::take(&mut self.source_code) {
            self.path.clone_from(&path);
            self.build_source_unit(&root, code, path);
        }
        BuildOutput {
            tree: self.tree,
            diagnostics: self.diagnostics,
        }
    }

    fn build_source_unit(&mut self, root: &Node, code: &[u8], absolute_path: String) {
        self.collect_errors(root, code);
        let id = self.next_id();
        let src = Self::get_location(root, None);
        let ctx = Ancestors::source_unit(id);
        let mut nodes = Vec::new();
        let mut exported_symbols = Vec::new();

        for child in named_children(root) {
            let Some(child_id) = self.build_source_unit_member(ctx, &child, code) else {
                continue;
            };
            nodes.push(child_id);
            let Some(node) = self.tree.get_by_id(child_id) else {
                continue;
            };
            let is_global = !matches!(
                node.node_type(),
                NodeType::PragmaDirective
                    | NodeType::ImportDirective
                    | NodeType::ContractDefinition
            );
            if let Some(name) = node.name().filter(|_| node.is_declaration()) {
                exported_symbols.push(ExportedSymbol {
                    id: child_id,
                    name: name.to_string(),
                    absolute_path: absolute_path.clone(),
                });
            }
            if is_global {
                self.tree.global_nodes.push(child_id);
            }
        }

        debug!(
            path = %absolute_path,
            nodes = nodes.len(),
            exported = exported_symbols.len(),
            "built source unit"
        );
        let license = spdx_license(&String::from_utf8_lossy(code));
        self.tree.add_node(AstNode::SourceUnit(SourceUnit {
            id,
            src,
            absolute_path,
            license,
            exported_symbols,
            nodes,
        }));
    }

    fn build_source_unit_member(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> Option<NodeId> {
        match node.kind() {
            "pragma_directive" => Some(self.build_pragma_directive(ctx, node, code)),
            "import_directive" => Some(self.build_import_directive(ctx, node, code)),
            "contract_declaration" | "interface_declaration" | "library_declaration" => {
                Some(self.build_contract_definition(ctx, node, code))
            }
            "function_definition" => Some(self.build_function_definition(ctx, node, code)),
            "constant_variable_declaration" => {
                Some(self.build_state_variable_declaration(ctx, node, code))
            }
            "struct_declaration" => Some(self.build_struct_definition(ctx, node, code)),
            "enum_declaration" => Some(self.build_enum_definition(ctx, node, code)),
            "event_definition" => Some(self.build_event_definition(ctx, node, code)),
            "error_declaration" => Some(self.build_error_definition(ctx, node, code)),
            "user_defined_type_definition" => {
                Some(self.build_user_defined_value_type_definition(ctx, node, code))
            }
            "using_directive" => Some(self.build_using_for_directive(ctx, node, code)),
            "ERROR" => None,
            _ => {
                self.unrecognized("source unit member", node);
                None
            }
        }
    }

    fn next_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn get_location(node: &Node, parent_id: Option<NodeId>) -> Src {
        Self::span(node, node, parent_id)
    }

    /// Span from the start of `first` to the end of `last`.
    #[allow(clippy::cast_possible_truncation)]
    fn span(first: &Node, last: &Node, parent_id: Option<NodeId>) -> Src {
        let start = first.start_byte() as u32;
        let end_byte = (last.end_byte() as u32).max(start);
        let position = first.start_position();
        Src {
            line: position.row as u32 + 1,
            column: position.column as u32,
            start,
            end: end_byte.saturating_sub(1).max(start),
            length: end_byte - start,
            parent_id,
        }
    }

    fn collect_errors(&mut self, node: &Node, code: &[u8]) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.is_error() || child.is_missing() {
                let location = Self::get_location(&child, None);
                let snippet: String = if child.is_missing() {
                    format!("missing {}", child.kind())
                } else {
                    text(&child, code).chars().take(30).collect()
                };
                warn!(
                    path = %self.path,
                    line = location.line,
                    column = location.column,
                    %snippet,
                    "syntax error"
                );
                self.diagnostics.push(AstError::SyntaxError {
                    path: self.path.clone(),
                    line: location.line,
                    column: location.column,
                    snippet,
                });
            }
        }
    }

    fn unrecognized(&mut self, context: &'static str, node: &Node) {
        let location = Self::get_location(node, None);
        warn!(
            path = %self.path,
            line = location.line,
            column = location.column,
            kind = node.kind(),
            context,
            "unrecognized construct"
        );
        self.diagnostics.push(AstError::UnrecognizedConstruct {
            path: self.path.clone(),
            line: location.line,
            column: location.column,
            context,
            kind: node.kind().to_string(),
        });
    }

    fn malformed_literal(&mut self, node: &Node, code: &[u8], reason: String) {
        let location = Self::get_location(node, None);
        let literal = text(node, code).into_owned();
        warn!(
            path = %self.path,
            line = location.line,
            column = location.column,
            %literal,
            %reason,
            "malformed literal"
        );
        self.diagnostics.push(AstError::MalformedLiteral {
            path: self.path.clone(),
            line: location.line,
            column: location.column,
            literal,
            reason,
        });
    }

    fn missing_child(&mut self, node: &Node, what: &str) {
        let location = Self::get_location(node, None);
        let reason = format!(
            "{}:{}:{}: `{}` has no {what}",
            self.path,
            location.line,
            location.column,
            node.kind()
        );
        warn!(%reason, "missing child");
        self.diagnostics
            .push(AstError::InvariantViolation { reason });
    }

    /// Qualifies a declaration name with the enclosing contract, if any.
    fn canonical_name(&self, name: &str) -> String {
        match &self.contract {
            Some((contract, _)) => format!("{contract}.{name}"),
            None => name.to_string(),
        }
    }
}

fn text<'c>(node: &Node, code: &'c [u8]) -> Cow<'c, str> {
    code.get(node.start_byte()..node.end_byte())
        .map_or(Cow::Borrowed(""), String::from_utf8_lossy)
}

/// Named children, skipping comments.
fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

fn all_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Whether a direct child is the keyword `token`. Some keywords, `unchecked`
/// among them, are named nodes in the grammar, so named-ness is not checked.
fn has_token(node: &Node, token: &str) -> bool {
    all_children(node).iter().any(|child| child.kind() == token)
}

fn first_of_kind<'t>(node: &Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    named_children(node)
        .into_iter()
        .find(|child| kinds.contains(&child.kind()))
}

fn children_of_kind<'t>(node: &Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    named_children(node)
        .into_iter()
        .filter(|child| kinds.contains(&child.kind()))
        .collect()
}

/// First named child that follows the anonymous `token`.
fn after_token<'t>(node: &Node<'t>, token: &str) -> Option<Node<'t>> {
    all_children(node)
        .into_iter()
        .skip_while(|child| child.is_named() || child.kind() != token)
        .skip(1)
        .find(Node::is_named)
}

/// Field child, falling back to the first named child of one of `kinds`.
fn field_or_kind<'t>(node: &Node<'t>, field: &str, kinds: &[&str]) -> Option<Node<'t>> {
    node.child_by_field_name(field)
        .or_else(|| first_of_kind(node, kinds))
}

/// Strips `expression` wrapper nodes some grammar versions insert.
fn unwrap_expression(node: Node) -> Node {
    let mut current = node;
    while current.kind() == "expression" {
        match named_children(&current).as_slice() {
            [only] => current = *only,
            _ => break,
        }
    }
    current
}

fn identifier_text(node: &Node, code: &[u8]) -> String {
    text(node, code)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// The `SPDX-License-Identifier` value of a source file, if one is declared.
fn spdx_license(source: &str) -> Option<String> {
    const MARKER: &str = "SPDX-License-Identifier:";
    let at = source.find(MARKER)?;
    let license: String = source[at + MARKER.len()..]
        .trim_start()
        .chars()
        .take_while(|c| !c.is_whitespace())
        .collect();
    let license = license.trim_end_matches("*/").to_string();
    (!license.is_empty()).then_some(license)
}

/// Resolves an import path against the importing file's path.
///
/// Relative imports (`./`, `../`) are joined with the importer's directory and
/// normalized; anything else is taken as written.
#[must_use]
pub fn normalize_import_path(importer: &str, file: &str) -> String {
    if !(file.starts_with("./") || file.starts_with("../")) {
        return file.to_string();
    }
    let directory = importer.rsplit_once('/').map_or("", |(dir, _)| dir);
    let mut parts: Vec<&str> = directory.split('/').collect();
    for segment in file.split('/') {
        match segment {
            "." | "" => {}
            ".." => {
                if parts.len() > 1 || parts.first().is_some_and(|p| !p.is_empty()) {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if importer.starts_with('/') && !joined.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_imports_are_joined_with_the_importer_directory() {
        assert_eq!(
            normalize_import_path("/project/contracts/Token.sol", "./IERC20.sol"),
            "/project/contracts/IERC20.sol"
        );
        assert_eq!(
            normalize_import_path("/project/contracts/Token.sol", "../lib/Math.sol"),
            "/project/lib/Math.sol"
        );
        assert_eq!(
            normalize_import_path("/project/Token.sol", "@oz/token/ERC20.sol"),
            "@oz/token/ERC20.sol"
        );
    }

    #[test]
    fn license_is_read_from_the_spdx_comment() {
        assert_eq!(
            spdx_license("// SPDX-License-Identifier: MIT\npragma solidity ^0.8.0;"),
            Some("MIT".to_string())
        );
        assert_eq!(
            spdx_license("/* SPDX-License-Identifier: GPL-3.0*/"),
            Some("GPL-3.0".to_string())
        );
        assert_eq!(spdx_license("contract C {}"), None);
    }

    #[test]
    fn parent_follows_the_innermost_slot() {
        let unit = Ancestors::source_unit(1);
        let contract = unit.contract(2);
        let function = contract.function(3);
        let body = function.block(4);
        let expression = body.body(9).expression(5);
        assert_eq!(expression.parent_id(), Some(5));
        assert_eq!(expression.body(6).parent_id(), Some(6));
        assert_eq!(expression.declaration(7).parent_id(), Some(7));
        assert_eq!(body.contract(8).parent_id(), Some(8));
        assert_eq!(body.scope(), 4);
        assert_eq!(body.body(9).scope(), 4);
        assert_eq!(function.scope(), 3);
    }
}
