use tree_sitter::Node;

use super::{
    Ancestors, Builder, after_token, all_children, children_of_kind, field_or_kind,
    first_of_kind, has_token, named_children, text, unwrap_expression,
};
use crate::nodes::{
    AstNode, Block, Break, Continue, DoWhileStatement, EmitStatement, ExpressionStatement,
    ForStatement, IfStatement, InlineAssembly, NodeId, PlaceholderStatement, Return,
    RevertStatement, TryCatchClause, TryStatement, UncheckedBlock, VariableDeclarationStatement,
    WhileStatement,
};

impl Builder<'_> {
    /// Builds a `{ ... }` block, or an `unchecked { ... }` block.
    pub(super) fn build_block(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.block(id);
        let statements = named_children(node)
            .iter()
            .filter(|statement| statement.kind() != "unchecked")
            .filter_map(|statement| self.build_statement(inner, statement, code))
            .collect();
        let block = if has_token(node, "unchecked") {
            AstNode::UncheckedBlock(UncheckedBlock {
                id,
                src,
                statements,
            })
        } else {
            AstNode::Block(Block {
                id,
                src,
                statements,
            })
        };
        self.tree.add_node(block);
        id
    }

    pub(super) fn build_statement(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> Option<NodeId> {
        match node.kind() {
            "statement" => match named_children(node).as_slice() {
                [only] => self.build_statement(ctx, only, code),
                _ => {
                    self.unrecognized("statement", node);
                    None
                }
            },
            "block_statement" | "function_body" => Some(self.build_block(ctx, node, code)),
            "expression_statement" => Some(self.build_expression_statement(ctx, node, code)),
            "variable_declaration_statement" => {
                Some(self.build_variable_declaration_statement(ctx, node, code))
            }
            "if_statement" => Some(self.build_if_statement(ctx, node, code)),
            "for_statement" => Some(self.build_for_statement(ctx, node, code)),
            "while_statement" => Some(self.build_while_statement(ctx, node, code)),
            "do_while_statement" => Some(self.build_do_while_statement(ctx, node, code)),
            "continue_statement" => {
                let id = self.next_id();
                let src = Self::get_location(node, ctx.parent_id());
                self.tree.add_node(AstNode::Continue(Continue { id, src }));
                Some(id)
            }
            "break_statement" => {
                let id = self.next_id();
                let src = Self::get_location(node, ctx.parent_id());
                self.tree.add_node(AstNode::Break(Break { id, src }));
                Some(id)
            }
            "return_statement" => Some(self.build_return_statement(ctx, node, code)),
            "emit_statement" => Some(self.build_emit_statement(ctx, node, code)),
            "revert_statement" => Some(self.build_revert_statement(ctx, node, code)),
            "try_statement" => Some(self.build_try_statement(ctx, node, code)),
            "assembly_statement" => Some(self.build_inline_assembly(ctx, node, code)),
            "ERROR" => None,
            _ => {
                self.unrecognized("statement", node);
                None
            }
        }
    }

    fn build_expression_statement(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let inner_node = named_children(node).first().copied().map(unwrap_expression);
        if inner_node.is_some_and(|inner| inner.kind() == "identifier" && text(&inner, code) == "_")
        {
            let id = self.next_id();
            let src = Self::get_location(node, ctx.parent_id());
            self.tree
                .add_node(AstNode::PlaceholderStatement(PlaceholderStatement { id, src }));
            return id;
        }

        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let expression = inner_node.and_then(|inner| self.build_expression(ctx.body(id), &inner, code));
        self.tree
            .add_node(AstNode::ExpressionStatement(ExpressionStatement {
                id,
                src,
                expression,
            }));
        id
    }

    fn build_variable_declaration_statement(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.body(id);

        let mut declarations = Vec::new();
        if let Some(single) = first_of_kind(node, &["variable_declaration"]) {
            declarations.push(Some(self.build_variable_declaration(inner, &single, code)));
        } else if let Some(tuple) = first_of_kind(node, &["variable_declaration_tuple"]) {
            // Holes keep their position: `(, uint b)` declares only the second slot.
            let mut current = None;
            for child in all_children(&tuple) {
                match child.kind() {
                    "variable_declaration" => {
                        current = Some(self.build_variable_declaration(inner, &child, code));
                    }
                    "," => declarations.push(current.take()),
                    ")" if current.is_some() || !declarations.is_empty() => {
                        declarations.push(current.take());
                    }
                    _ => {}
                }
            }
        } else {
            self.missing_child(node, "declaration");
        }

        let initial_value = node
            .child_by_field_name("value")
            .or_else(|| after_token(node, "="))
            .and_then(|value| self.build_expression(inner, &value, code));
        self.tree.add_node(AstNode::VariableDeclarationStatement(
            VariableDeclarationStatement {
                id,
                src,
                declarations,
                initial_value,
            },
        ));
        id
    }

    fn build_if_statement(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.body(id);
        let statements = statement_children(node);
        let condition = node
            .child_by_field_name("condition")
            .or_else(|| after_token(node, "("))
            .and_then(|condition| self.build_expression(inner, &condition, code));
        let true_body = node
            .child_by_field_name("body")
            .or_else(|| statements.first().copied())
            .and_then(|body| self.build_statement(inner, &body, code));
        let false_body = node
            .child_by_field_name("else")
            .or_else(|| after_token(node, "else"))
            .and_then(|body| self.build_statement(inner, &body, code));
        self.tree.add_node(AstNode::IfStatement(IfStatement {
            id,
            src,
            condition,
            true_body,
            false_body,
        }));
        id
    }

    fn build_for_statement(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.body(id);

        let initialization_expression = node
            .child_by_field_name("initial")
            .filter(|initial| initial.is_named())
            .and_then(|initial| self.build_statement(inner, &initial, code));
        let condition = node
            .child_by_field_name("condition")
            .filter(|condition| condition.is_named())
            .map(|condition| match condition.kind() {
                "expression_statement" => named_children(&condition)
                    .first()
                    .copied()
                    .unwrap_or(condition),
                _ => condition,
            })
            .and_then(|condition| self.build_expression(inner, &condition, code));
        let loop_expression = node
            .child_by_field_name("update")
            .and_then(|update| self.build_expression(inner, &update, code));
        let body = node
            .child_by_field_name("body")
            .or_else(|| statement_children(node).pop())
            .and_then(|body| self.build_statement(inner, &body, code));

        self.tree.add_node(AstNode::ForStatement(ForStatement {
            id,
            src,
            initialization_expression,
            condition,
            loop_expression,
            body,
        }));
        id
    }

    fn build_while_statement(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.body(id);
        let condition = node
            .child_by_field_name("condition")
            .or_else(|| after_token(node, "("))
            .and_then(|condition| self.build_expression(inner, &condition, code));
        let body = node
            .child_by_field_name("body")
            .or_else(|| statement_children(node).pop())
            .and_then(|body| self.build_statement(inner, &body, code));
        self.tree.add_node(AstNode::WhileStatement(WhileStatement {
            id,
            src,
            condition,
            body,
        }));
        id
    }

    fn build_do_while_statement(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.body(id);
        let body = node
            .child_by_field_name("body")
            .or_else(|| statement_children(node).first().copied())
            .and_then(|body| self.build_statement(inner, &body, code));
        let condition = node
            .child_by_field_name("condition")
            .or_else(|| after_token(node, "("))
            .and_then(|condition| self.build_expression(inner, &condition, code));
        self.tree
            .add_node(AstNode::DoWhileStatement(DoWhileStatement {
                id,
                src,
                condition,
                body,
            }));
        id
    }

    fn build_return_statement(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let expression = named_children(node)
            .first()
            .and_then(|value| self.build_expression(ctx.body(id), value, code));
        self.tree.add_node(AstNode::Return(Return {
            id,
            src,
            expression,
            function_return_parameters: ctx.return_parameters,
        }));
        id
    }

    fn build_emit_statement(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let callee = node
            .child_by_field_name("name")
            .or_else(|| after_token(node, "emit"));
        let event_call = match callee {
            Some(callee) => self.build_statement_call(ctx.body(id), node, callee, code),
            None => {
                self.missing_child(node, "event");
                None
            }
        };
        self.tree.add_node(AstNode::EmitStatement(EmitStatement {
            id,
            src,
            event_call,
        }));
        id
    }

    /// `revert E(...)` calls the named error; a bare `revert(...)` calls the
    /// built-in `revert` function spelled by the keyword.
    fn build_revert_statement(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let callee = node
            .child_by_field_name("error")
            .or_else(|| {
                all_children(node)
                    .into_iter()
                    .find(|child| child.kind() == "revert")
            })
            .unwrap_or(*node);
        let error_call = self.build_statement_call(ctx.body(id), node, callee, code);
        self.tree.add_node(AstNode::RevertStatement(RevertStatement {
            id,
            src,
            error_call,
        }));
        id
    }

    fn build_try_statement(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.body(id);
        let external_call = node
            .child_by_field_name("attempt")
            .or_else(|| after_token(node, "try"))
            .and_then(|attempt| self.build_expression(inner, &attempt, code));

        let children = all_children(node);
        let return_parameters = children
            .iter()
            .position(|child| child.kind() == "returns")
            .map(|at| {
                let end = children[at..]
                    .iter()
                    .position(|child| child.kind() == ")")
                    .map_or(children.len(), |close| at + close + 1);
                self.build_parameters(inner, node, &children[at..end], &["parameter"], code)
            });

        let block = field_or_kind(node, "body", &["block_statement"])
            .map(|body| self.build_block(inner, &body, code));
        let clauses = children_of_kind(node, &["catch_clause"])
            .iter()
            .map(|clause| self.build_catch_clause(inner, clause, code))
            .collect();
        self.tree.add_node(AstNode::TryStatement(TryStatement {
            id,
            src,
            external_call,
            return_parameters,
            block,
            clauses,
        }));
        id
    }

    fn build_catch_clause(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.declaration(id);
        let error_name = first_of_kind(node, &["identifier"])
            .map(|name| text(&name, code).into_owned())
            .unwrap_or_default();
        let parameters = has_token(node, "(")
            .then(|| self.build_parameter_list(inner, node, &["parameter"], code));
        let block = field_or_kind(node, "body", &["block_statement"])
            .map(|body| self.build_block(inner, &body, code));
        self.tree.add_node(AstNode::TryCatchClause(TryCatchClause {
            id,
            src,
            error_name,
            parameters,
            block,
        }));
        id
    }

    fn build_inline_assembly(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let flags = first_of_kind(node, &["assembly_flags"])
            .map(|flags| {
                named_children(&flags)
                    .iter()
                    .map(|flag| text(flag, code).trim_matches('"').to_string())
                    .collect()
            })
            .unwrap_or_default();
        let block = self.build_yul_block(ctx.body(id), node, code);
        self.tree.add_node(AstNode::InlineAssembly(InlineAssembly {
            id,
            src,
            flags,
            block,
        }));
        id
    }
}

/// Named children that are statements, in source order.
fn statement_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    named_children(node)
        .into_iter()
        .filter(|child| child.kind() == "statement" || child.kind().ends_with("_statement"))
        .collect()
}
