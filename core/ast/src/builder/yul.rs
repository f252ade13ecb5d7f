use tree_sitter::Node;

use super::{Ancestors, Builder, all_children, named_children, text};
use crate::nodes::{
    AstNode, NodeId, YulAssignment, YulBlock, YulBreak, YulCase, YulContinue,
    YulExpressionStatement, YulForLoop, YulFunctionCall, YulFunctionDefinition, YulIdentifier,
    YulIf, YulLeave, YulLiteral, YulLiteralKind, YulSwitch, YulTypedName, YulVariableDeclaration,
};
use crate::type_rules;

/// EVM opcodes callable as Yul functions.
const EVM_BUILTINS: &[&str] = &[
    "stop", "add", "sub", "mul", "div", "sdiv", "mod", "smod", "exp", "not", "lt", "gt", "slt",
    "sgt", "eq", "iszero", "and", "or", "xor", "byte", "shl", "shr", "sar", "addmod", "mulmod",
    "signextend", "keccak256", "pc", "pop", "mload", "mstore", "mstore8", "sload", "sstore",
    "tload", "tstore", "msize", "gas", "address", "balance", "selfbalance", "caller",
    "callvalue", "calldataload", "calldatasize", "calldatacopy", "codesize", "codecopy",
    "extcodesize", "extcodecopy", "returndatasize", "returndatacopy", "mcopy", "extcodehash",
    "create", "create2", "call", "callcode", "delegatecall", "staticcall", "return", "revert",
    "selfdestruct", "invalid", "log0", "log1", "log2", "log3", "log4", "chainid", "basefee",
    "blobbasefee", "blobhash", "origin", "gasprice", "blockhash", "coinbase", "timestamp",
    "number", "difficulty", "prevrandao", "gaslimit", "datasize", "dataoffset", "datacopy",
    "setimmutable", "loadimmutable", "linkersymbol", "memoryguard",
];

const YUL_LITERAL_KINDS: &[&str] = &[
    "yul_decimal_number",
    "yul_hex_number",
    "yul_string_literal",
    "yul_hex_string_literal",
    "yul_boolean",
];

impl Builder<'_> {
    /// Builds the block delimited by the braces directly under `owner`, which is
    /// either a `yul_block` or the `assembly` statement itself.
    pub(super) fn build_yul_block(&mut self, ctx: Ancestors, owner: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(owner, code);
        let id = self.next_id();
        let children = all_children(owner);
        let open = children.iter().position(|child| child.kind() == "{");
        let close = children.iter().rposition(|child| child.kind() == "}");
        let src = match (open, close) {
            (Some(open), Some(close)) => {
                Self::span(&children[open], &children[close], ctx.parent_id())
            }
            _ => Self::get_location(owner, ctx.parent_id()),
        };
        let inner = ctx.body(id);
        let statements = match (open, close) {
            (Some(open), Some(close)) if open < close => children[open + 1..close]
                .iter()
                .filter(|child| child.is_named())
                .filter_map(|statement| self.build_yul_statement(inner, statement, code))
                .collect(),
            _ => Vec::new(),
        };
        self.tree.add_node(AstNode::YulBlock(YulBlock {
            id,
            src,
            statements,
        }));
        id
    }

    fn build_yul_statement(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> Option<NodeId> {
        self.collect_errors(node, code);
        match node.kind() {
            "yul_block" => Some(self.build_yul_block(ctx, node, code)),
            "yul_variable_declaration" => Some(self.build_yul_variable_declaration(ctx, node, code)),
            "yul_assignment" => Some(self.build_yul_assignment(ctx, node, code)),
            "yul_function_call" => {
                let id = self.next_id();
                let src = Self::get_location(node, ctx.parent_id());
                let expression = self.build_yul_function_call(ctx.body(id), node, code);
                self.tree
                    .add_node(AstNode::YulExpressionStatement(YulExpressionStatement {
                        id,
                        src,
                        expression,
                    }));
                Some(id)
            }
            "yul_if_statement" => Some(self.build_yul_if(ctx, node, code)),
            "yul_for_statement" => Some(self.build_yul_for_loop(ctx, node, code)),
            "yul_switch_statement" => Some(self.build_yul_switch(ctx, node, code)),
            "yul_function_definition" => Some(self.build_yul_function_definition(ctx, node, code)),
            "yul_leave" => {
                let id = self.next_id();
                let src = Self::get_location(node, ctx.parent_id());
                self.tree.add_node(AstNode::YulLeave(YulLeave { id, src }));
                Some(id)
            }
            "yul_break" => {
                let id = self.next_id();
                let src = Self::get_location(node, ctx.parent_id());
                self.tree.add_node(AstNode::YulBreak(YulBreak { id, src }));
                Some(id)
            }
            "yul_continue" => {
                let id = self.next_id();
                let src = Self::get_location(node, ctx.parent_id());
                self.tree
                    .add_node(AstNode::YulContinue(YulContinue { id, src }));
                Some(id)
            }
            "yul_label" | "ERROR" => None,
            _ => {
                self.unrecognized("assembly statement", node);
                None
            }
        }
    }

    fn build_yul_expression(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> Option<NodeId> {
        match node.kind() {
            "yul_function_call" => Some(self.build_yul_function_call(ctx, node, code)),
            "yul_identifier" | "yul_path" | "yul_evm_builtin" => {
                Some(self.build_yul_identifier(ctx, node, code))
            }
            kind if YUL_LITERAL_KINDS.contains(&kind) => Some(self.build_yul_literal(ctx, node, code)),
            "ERROR" => None,
            _ => {
                self.unrecognized("assembly expression", node);
                None
            }
        }
    }

    fn build_yul_identifier(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let name: String = text(node, code)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let builtin = node.kind() == "yul_evm_builtin" || EVM_BUILTINS.contains(&name.as_str());
        self.tree.add_node(AstNode::YulIdentifier(YulIdentifier {
            id,
            src,
            name,
            builtin,
            referenced_declaration: None,
        }));
        id
    }

    fn build_yul_literal(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let raw = text(node, code).trim().to_string();
        let (kind, value, hex_value) = match node.kind() {
            "yul_string_literal" => match type_rules::decode_string_literal(&raw, "") {
                Ok(bytes) => (
                    YulLiteralKind::String,
                    String::from_utf8_lossy(&bytes).into_owned(),
                    hex::encode(&bytes),
                ),
                Err(reason) => {
                    self.malformed_literal(node, code, reason);
                    (YulLiteralKind::String, raw.clone(), hex::encode(&raw))
                }
            },
            "yul_hex_string_literal" => match type_rules::decode_hex_literal(&raw) {
                Ok(bytes) => {
                    let digits = hex::encode(bytes);
                    (YulLiteralKind::HexString, digits.clone(), digits)
                }
                Err(reason) => {
                    self.malformed_literal(node, code, reason);
                    (YulLiteralKind::HexString, raw.clone(), hex::encode(&raw))
                }
            },
            "yul_boolean" => (YulLiteralKind::Bool, raw.clone(), hex::encode(&raw)),
            _ => (YulLiteralKind::Number, raw.clone(), hex::encode(&raw)),
        };
        self.tree.add_node(AstNode::YulLiteral(YulLiteral {
            id,
            src,
            kind,
            value,
            hex_value,
        }));
        id
    }

    fn build_yul_function_call(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let callee = node
            .child_by_field_name("function")
            .or_else(|| named_children(node).first().copied())
            .unwrap_or(*node);
        let function_name = self.build_yul_identifier(inner, &callee, code);
        let arguments = named_children(node)
            .iter()
            .filter(|argument| argument.id() != callee.id())
            .filter_map(|argument| self.build_yul_expression(inner, argument, code))
            .collect();
        self.tree
            .add_node(AstNode::YulFunctionCall(YulFunctionCall {
                id,
                src,
                function_name,
                arguments,
            }));
        id
    }

    fn build_yul_typed_name(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        self.tree.add_node(AstNode::YulTypedName(YulTypedName {
            id,
            src,
            name: text(node, code).trim().to_string(),
        }));
        id
    }

    /// `let a, b := f()`: the names before `:=` and the value after it.
    fn build_yul_variable_declaration(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.body(id);
        let (names, value) = split_at_assign(node);
        let variables = names
            .iter()
            .filter(|name| name.kind() == "yul_identifier")
            .map(|name| self.build_yul_typed_name(inner.declaration(id), name, code))
            .collect();
        let value = value.and_then(|value| self.build_yul_expression(inner, &value, code));
        self.tree
            .add_node(AstNode::YulVariableDeclaration(YulVariableDeclaration {
                id,
                src,
                variables,
                value,
            }));
        id
    }

    fn build_yul_assignment(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let (names, value) = split_at_assign(node);
        let variable_names = names
            .iter()
            .filter(|name| matches!(name.kind(), "yul_identifier" | "yul_path"))
            .map(|name| self.build_yul_identifier(inner, name, code))
            .collect();
        let value = value.and_then(|value| self.build_yul_expression(inner, &value, code));
        self.tree.add_node(AstNode::YulAssignment(YulAssignment {
            id,
            src,
            variable_names,
            value,
        }));
        id
    }

    fn build_yul_if(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.body(id);
        let parts = named_children(node);
        let condition = parts
            .iter()
            .find(|part| part.kind() != "yul_block")
            .and_then(|condition| self.build_yul_expression(inner, condition, code));
        let body = parts
            .iter()
            .find(|part| part.kind() == "yul_block")
            .map(|body| self.build_yul_block(inner, body, code));
        self.tree.add_node(AstNode::YulIf(YulIf {
            id,
            src,
            condition,
            body,
        }));
        id
    }

    /// `for { pre } condition { post } { body }`
    fn build_yul_for_loop(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.body(id);
        let parts = named_children(node);
        let blocks: Vec<&Node> = parts.iter().filter(|part| part.kind() == "yul_block").collect();
        let pre = blocks
            .first()
            .map(|pre| self.build_yul_block(inner, pre, code));
        let condition = parts
            .iter()
            .find(|part| part.kind() != "yul_block")
            .and_then(|condition| self.build_yul_expression(inner, condition, code));
        let post = blocks
            .get(1)
            .map(|post| self.build_yul_block(inner, post, code));
        let body = blocks
            .get(2)
            .map(|body| self.build_yul_block(inner, body, code));
        self.tree.add_node(AstNode::YulForLoop(YulForLoop {
            id,
            src,
            pre,
            condition,
            post,
            body,
        }));
        id
    }

    /// The grammar lists `case <literal> <block>` and `default <block>` flat under
    /// the switch; each arm becomes its own case node spanning keyword to block.
    fn build_yul_switch(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.body(id);
        let children = all_children(node);
        let expression = children
            .iter()
            .skip_while(|child| child.kind() != "switch")
            .skip(1)
            .find(|child| child.is_named())
            .and_then(|expression| self.build_yul_expression(inner, expression, code));

        let mut cases = Vec::new();
        for (at, keyword) in children.iter().enumerate() {
            if !matches!(keyword.kind(), "case" | "default") {
                continue;
            }
            let Some(block_at) = children[at..]
                .iter()
                .position(|child| child.kind() == "yul_block")
                .map(|offset| at + offset)
            else {
                self.missing_child(node, "case body");
                continue;
            };
            let case_id = self.next_id();
            let case_src = Self::span(keyword, &children[block_at], inner.parent_id());
            let case_ctx = inner.body(case_id);
            let value = if keyword.kind() == "case" {
                children[at + 1..block_at]
                    .iter()
                    .find(|child| child.is_named())
                    .and_then(|literal| self.build_yul_expression(case_ctx, literal, code))
            } else {
                None
            };
            let body = Some(self.build_yul_block(case_ctx, &children[block_at], code));
            self.tree.add_node(AstNode::YulCase(YulCase {
                id: case_id,
                src: case_src,
                value,
                body,
            }));
            cases.push(case_id);
        }

        self.tree.add_node(AstNode::YulSwitch(YulSwitch {
            id,
            src,
            expression,
            cases,
        }));
        id
    }

    /// `function name(a, b) -> r { ... }`
    fn build_yul_function_definition(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.body(id);
        let mut name = String::new();
        let mut parameters = Vec::new();
        let mut return_variables = Vec::new();
        let mut body = None;
        let mut after_arrow = false;
        for child in all_children(node) {
            match child.kind() {
                "->" => after_arrow = true,
                "yul_identifier" if name.is_empty() => {
                    name = text(&child, code).trim().to_string();
                }
                "yul_identifier" if after_arrow => {
                    return_variables.push(self.build_yul_typed_name(inner, &child, code));
                }
                "yul_identifier" => {
                    parameters.push(self.build_yul_typed_name(inner, &child, code));
                }
                "yul_block" => body = Some(self.build_yul_block(inner, &child, code)),
                _ => {}
            }
        }
        if name.is_empty() {
            self.missing_child(node, "name");
        }
        self.tree
            .add_node(AstNode::YulFunctionDefinition(YulFunctionDefinition {
                id,
                src,
                name,
                parameters,
                return_variables,
                body,
            }));
        id
    }
}

/// Named children before and the first named child after `:=`.
fn split_at_assign<'t>(node: &Node<'t>) -> (Vec<Node<'t>>, Option<Node<'t>>) {
    let children = all_children(node);
    let at = children
        .iter()
        .position(|child| child.kind() == ":=")
        .unwrap_or(children.len());
    let names = children[..at]
        .iter()
        .copied()
        .filter(|child| child.is_named())
        .collect();
    let value = children[at..].iter().copied().find(|child| child.is_named());
    (names, value)
}
