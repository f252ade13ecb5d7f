use tree_sitter::Node;

use super::declarations::TYPE_NAME_KINDS;
use super::{
    Ancestors, Builder, after_token, all_children, first_of_kind, identifier_text, named_children,
    text, unwrap_expression,
};
use crate::nodes::{
    Assignment, AssignmentOperator, AstNode, BinaryOperation, BinaryOperator, Conditional,
    ElementaryTypeNameExpression, FunctionCall, FunctionCallKind, FunctionCallOptions, Identifier,
    IndexAccess, IndexRangeAccess, Literal, LiteralKind, MemberAccess, MetaType, NewExpression,
    NodeId, PayableConversion, Src, StorageLocation, TupleExpression, TypeDescription,
    UnaryOperator, UnaryPrefixOperation, UnarySuffixOperation,
};
use crate::type_rules;

impl Builder<'_> {
    pub(super) fn build_expression(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> Option<NodeId> {
        let node = unwrap_expression(*node);
        self.collect_errors(&node, code);
        match node.kind() {
            "identifier" => Some(self.build_identifier(ctx, &node, code)),
            "number_literal" | "string_literal" | "hex_string_literal"
            | "unicode_string_literal" | "boolean_literal" => {
                Some(self.build_literal(ctx, &node, code))
            }
            "binary_expression" => self.build_binary_operation(ctx, &node, code),
            "unary_expression" | "update_expression" => {
                Some(self.build_unary_operation(ctx, &node, code))
            }
            "assignment_expression" | "augmented_assignment_expression" => {
                Some(self.build_assignment(ctx, &node, code))
            }
            "ternary_expression" => Some(self.build_conditional(ctx, &node, code)),
            "call_expression" => Some(self.build_function_call(ctx, &node, code)),
            "struct_expression" => Some(self.build_function_call_options(ctx, &node, code)),
            "member_expression" => Some(self.build_member_access(ctx, &node, code)),
            "array_access" => Some(self.build_index_access(ctx, &node, code)),
            "slice_access" => Some(self.build_index_range_access(ctx, &node, code)),
            "tuple_expression" | "parenthesized_expression" | "inline_array_expression" => {
                Some(self.build_tuple_expression(ctx, &node, code))
            }
            "new_expression" => Some(self.build_new_expression(ctx, &node, code)),
            "meta_type_expression" => Some(self.build_meta_type(ctx, &node, code)),
            "payable_conversion_expression" => {
                Some(self.build_payable_conversion(ctx, &node, code))
            }
            "type_cast_expression" => Some(self.build_type_cast(ctx, &node, code)),
            "primitive_type" => Some(self.build_elementary_type_name_expression(ctx, &node, code)),
            "user_defined_type" | "identifier_path" => {
                let segments: Vec<Node> = named_children(&node)
                    .into_iter()
                    .filter(|child| child.kind() == "identifier")
                    .collect();
                if segments.is_empty() {
                    Some(self.build_identifier(ctx, &node, code))
                } else {
                    Some(self.build_path_expression(ctx, &segments, code))
                }
            }
            "type_name" => match first_of_kind(&node, TYPE_NAME_KINDS) {
                Some(inner) if named_children(&node).len() == 1 => {
                    self.build_expression(ctx, &inner, code)
                }
                _ => {
                    self.unrecognized("expression", &node);
                    None
                }
            },
            "ERROR" => None,
            _ => {
                self.unrecognized("expression", &node);
                None
            }
        }
    }

    /// Identifiers naming built-in functions or globals are typed here; every
    /// other identifier is typed when it is bound.
    fn build_identifier(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let name = identifier_text(node, code);
        self.identifier_named(ctx, node, name)
    }

    fn identifier_named(&mut self, ctx: Ancestors, node: &Node, name: String) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let type_description = type_rules::builtin_function(&name)
            .map(|(callee, _)| callee)
            .or_else(|| type_rules::magic_identifier(&name));
        self.tree.add_node(AstNode::Identifier(Identifier {
            id,
            src,
            name,
            referenced_declaration: None,
            overloaded_declarations: Vec::new(),
            type_description,
        }));
        id
    }

    /// Builds `a.b.c` as member accesses over an identifier, outermost first.
    fn build_path_expression(&mut self, ctx: Ancestors, segments: &[Node], code: &[u8]) -> NodeId {
        let (last, rest) = match segments.split_last() {
            Some((last, rest)) if !rest.is_empty() => (last, rest),
            _ => return self.build_identifier(ctx, &segments[0], code),
        };
        let id = self.next_id();
        let src = Self::span(&segments[0], last, ctx.parent_id());
        let expression = Some(self.build_path_expression(ctx.expression(id), rest, code));
        self.add_member_access(id, src, expression, text(last, code).into_owned());
        id
    }

    fn build_literal(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let raw = text(node, code).into_owned();
        let mut subdenomination = None;

        let decoded: Result<(LiteralKind, String, String, TypeDescription), String> =
            match node.kind() {
                "number_literal" => {
                    let unit = first_of_kind(node, &["number_unit"]);
                    let number = match unit {
                        Some(unit) => code
                            .get(node.start_byte()..unit.start_byte())
                            .map(String::from_utf8_lossy)
                            .unwrap_or_default()
                            .trim()
                            .to_string(),
                        None => raw.trim().to_string(),
                    };
                    subdenomination = unit.map(|unit| text(&unit, code).into_owned());
                    type_rules::number_literal(&number, subdenomination.as_deref())
                        .map(|ty| (LiteralKind::Number, hex::encode(&number), number, ty))
                        .ok_or_else(|| "not a valid number".to_string())
                }
                "boolean_literal" => Ok((
                    LiteralKind::Bool,
                    hex::encode(raw.trim()),
                    raw.trim().to_string(),
                    type_rules::bool_type(),
                )),
                "hex_string_literal" => type_rules::decode_hex_literal(&raw).map(|bytes| {
                    let digits = hex::encode(bytes);
                    (
                        LiteralKind::HexString,
                        digits.clone(),
                        digits,
                        type_rules::hex_string_literal(&raw),
                    )
                }),
                "unicode_string_literal" => {
                    type_rules::decode_string_literal(&raw, "unicode").map(|bytes| {
                        let value = String::from_utf8_lossy(&bytes).into_owned();
                        let ty = type_rules::unicode_string_literal(&format!("\"{value}\""));
                        (LiteralKind::UnicodeString, hex::encode(&bytes), value, ty)
                    })
                }
                _ => type_rules::decode_string_literal(&raw, "").map(|bytes| {
                    let value = String::from_utf8_lossy(&bytes).into_owned();
                    let ty = type_rules::string_literal(&format!("\"{value}\""));
                    (LiteralKind::String, hex::encode(&bytes), value, ty)
                }),
            };

        let (kind, hex_value, value, type_description) = match decoded {
            Ok(decoded) => decoded,
            Err(reason) => {
                self.malformed_literal(node, code, reason);
                let kind = match node.kind() {
                    "number_literal" => LiteralKind::Number,
                    "hex_string_literal" => LiteralKind::HexString,
                    "unicode_string_literal" => LiteralKind::UnicodeString,
                    _ => LiteralKind::String,
                };
                (kind, hex::encode(&raw), raw, type_rules::unknown())
            }
        };
        self.tree.add_node(AstNode::Literal(Literal {
            id,
            src,
            kind,
            value,
            hex_value,
            subdenomination,
            type_description: Some(type_description),
        }));
        id
    }

    /// Omitted, with a diagnostic, when the operator is not one the node kind models.
    fn build_binary_operation(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> Option<NodeId> {
        let token = operator_text(node, code);
        let Some(operator) = BinaryOperator::from_token(&token) else {
            self.unrecognized("binary operator", node);
            return None;
        };
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let left_expression = node
            .child_by_field_name("left")
            .and_then(|left| self.build_expression(inner, &left, code));
        let right_expression = node
            .child_by_field_name("right")
            .and_then(|right| self.build_expression(inner, &right, code));
        let left_type = left_expression.and_then(|left| self.tree.type_of(left));
        let type_description = type_rules::binary(operator, left_type);
        self.tree
            .add_node(AstNode::BinaryOperation(BinaryOperation {
                id,
                src,
                operator,
                left_expression,
                right_expression,
                type_description,
            }));
        Some(id)
    }

    /// Builds `!x`, `-x`, `delete x`, and the prefix and suffix forms of `++`/`--`.
    fn build_unary_operation(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let operator_node = node.child_by_field_name("operator");
        let argument = node
            .child_by_field_name("argument")
            .or_else(|| named_children(node).first().copied());
        let token = operator_node.map_or_else(|| operator_text(node, code), |op| {
            text(&op, code).trim().to_string()
        });
        let operator = UnaryOperator::from_token(&token).unwrap_or_else(|| {
            self.unrecognized("unary operator", node);
            UnaryOperator::Not
        });
        let is_suffix = match (operator_node, argument) {
            (Some(op), Some(argument)) => op.start_byte() > argument.start_byte(),
            _ => false,
        };
        let sub_expression =
            argument.and_then(|argument| self.build_expression(inner, &argument, code));
        let type_description =
            type_rules::unary(operator, sub_expression.and_then(|sub| self.tree.type_of(sub)));
        let node = if is_suffix {
            AstNode::UnarySuffixOperation(UnarySuffixOperation {
                id,
                src,
                operator,
                sub_expression,
                type_description,
            })
        } else {
            AstNode::UnaryPrefixOperation(UnaryPrefixOperation {
                id,
                src,
                operator,
                sub_expression,
                type_description,
            })
        };
        self.tree.add_node(node);
        id
    }

    fn build_assignment(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let token = node
            .child_by_field_name("operator")
            .map_or_else(|| operator_text(node, code), |op| text(&op, code).trim().to_string());
        let operator = AssignmentOperator::from_token(&token).unwrap_or_else(|| {
            self.unrecognized("assignment operator", node);
            AssignmentOperator::Assign
        });
        let left_hand_side = node
            .child_by_field_name("left")
            .and_then(|left| self.build_expression(inner, &left, code));
        let right_hand_side = node
            .child_by_field_name("right")
            .and_then(|right| self.build_expression(inner, &right, code));
        let type_description = right_hand_side
            .and_then(|rhs| self.tree.type_of(rhs))
            .cloned();
        self.tree.add_node(AstNode::Assignment(Assignment {
            id,
            src,
            operator,
            left_hand_side,
            right_hand_side,
            type_description,
        }));
        id
    }

    fn build_conditional(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let parts = named_children(node);
        let condition = node
            .child_by_field_name("condition")
            .or_else(|| parts.first().copied())
            .and_then(|condition| self.build_expression(inner, &condition, code));
        let true_expression = node
            .child_by_field_name("consequence")
            .or_else(|| parts.get(1).copied())
            .and_then(|value| self.build_expression(inner, &value, code));
        let false_expression = node
            .child_by_field_name("alternative")
            .or_else(|| parts.get(2).copied())
            .and_then(|value| self.build_expression(inner, &value, code));
        let type_description = true_expression
            .and_then(|value| self.tree.type_of(value))
            .cloned();
        self.tree.add_node(AstNode::Conditional(Conditional {
            id,
            src,
            condition,
            true_expression,
            false_expression,
            type_description,
        }));
        id
    }

    fn build_function_call(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let callee = node
            .child_by_field_name("function")
            .or_else(|| named_children(node).first().copied());
        let expression = callee.and_then(|callee| self.build_expression(inner, &callee, code));
        let (names, arguments) = self.call_arguments(inner, node, code);
        self.add_function_call(id, src, expression, arguments, names);
        id
    }

    /// Builds the call made by an `emit` or `revert` statement, spanning from the
    /// callee to the closing parenthesis of `owner`'s argument list.
    pub(super) fn build_statement_call(
        &mut self,
        ctx: Ancestors,
        owner: &Node,
        callee: Node,
        code: &[u8],
    ) -> Option<NodeId> {
        let owns_arguments = all_children(owner).iter().any(|child| child.kind() == "(");
        if !owns_arguments && unwrap_expression(callee).kind() == "call_expression" {
            return self.build_expression(ctx, &callee, code);
        }
        let id = self.next_id();
        let last = all_children(owner)
            .into_iter()
            .rev()
            .find(|child| child.kind() == ")")
            .unwrap_or(callee);
        let src = Self::span(&callee, &last, ctx.parent_id());
        let inner = ctx.expression(id);
        let expression = if callee.is_named() {
            self.build_expression(inner, &callee, code)
        } else {
            let name = text(&callee, code).into_owned();
            Some(self.identifier_named(inner, &callee, name))
        };
        let (names, arguments) = self.call_arguments(inner, owner, code);
        self.add_function_call(id, src, expression, arguments, names);
        Some(id)
    }

    /// Adds a call node, typing it from what the callee already tells about it.
    fn add_function_call(
        &mut self,
        id: NodeId,
        src: Src,
        expression: Option<NodeId>,
        arguments: Vec<NodeId>,
        names: Vec<String>,
    ) {
        let mut kind = FunctionCallKind::FunctionCall;
        let type_description = match expression.and_then(|callee| self.tree.get_by_id(callee)) {
            Some(AstNode::Identifier(callee)) => {
                type_rules::builtin_function(&callee.name).map(|(_, result)| result)
            }
            Some(AstNode::MemberAccess(callee)) => callee.type_description.clone(),
            Some(AstNode::ElementaryTypeNameExpression(callee)) => {
                kind = FunctionCallKind::TypeConversion;
                self.tree.type_of(callee.type_name).cloned()
            }
            Some(AstNode::NewExpression(callee)) => callee.type_description.clone(),
            _ => None,
        };
        self.tree.add_node(AstNode::FunctionCall(FunctionCall {
            id,
            src,
            kind,
            expression,
            arguments,
            names,
            referenced_declaration: None,
            type_description,
        }));
    }

    /// Positional or named arguments of the call list directly under `owner`.
    fn call_arguments(
        &mut self,
        ctx: Ancestors,
        owner: &Node,
        code: &[u8],
    ) -> (Vec<String>, Vec<NodeId>) {
        let mut names = Vec::new();
        let mut arguments = Vec::new();
        for (name, argument) in self.build_call_arguments(ctx, owner, code) {
            if let Some(name) = name {
                names.push(name);
            }
            arguments.push(argument);
        }
        (names, arguments)
    }

    /// Builds the arguments between the parentheses directly under `owner`,
    /// pairing each with its name when the call uses `{name: value}` syntax.
    pub(super) fn build_call_arguments(
        &mut self,
        ctx: Ancestors,
        owner: &Node,
        code: &[u8],
    ) -> Vec<(Option<String>, NodeId)> {
        let mut arguments = Vec::new();
        let mut inside = false;
        for child in all_children(owner) {
            match child.kind() {
                "(" if !inside => inside = true,
                ")" if inside => break,
                "call_argument" if inside => {
                    let struct_arguments: Vec<Node> = named_children(&child)
                        .into_iter()
                        .filter(|part| part.kind() == "call_struct_argument")
                        .collect();
                    if struct_arguments.is_empty() {
                        let value = named_children(&child).first().copied().unwrap_or(child);
                        if let Some(argument) = self.build_expression(ctx, &value, code) {
                            arguments.push((None, argument));
                        }
                    }
                    for part in struct_arguments {
                        if let Some(named) = self.build_named_argument(ctx, &part, code) {
                            arguments.push(named);
                        }
                    }
                }
                "call_struct_argument" if inside => {
                    if let Some(named) = self.build_named_argument(ctx, &child, code) {
                        arguments.push(named);
                    }
                }
                _ if inside && child.is_named() => {
                    if let Some(argument) = self.build_expression(ctx, &child, code) {
                        arguments.push((None, argument));
                    }
                }
                _ => {}
            }
        }
        arguments
    }

    fn build_named_argument(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> Option<(Option<String>, NodeId)> {
        let name = node
            .child_by_field_name("name")
            .or_else(|| first_of_kind(node, &["identifier"]))
            .map(|name| text(&name, code).into_owned());
        let value = node
            .child_by_field_name("value")
            .or_else(|| after_token(node, ":"))?;
        let argument = self.build_expression(ctx, &value, code)?;
        Some((name, argument))
    }

    /// Builds `target{value: v, gas: g}`.
    fn build_function_call_options(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let target = node
            .child_by_field_name("type")
            .or_else(|| named_children(node).first().copied());
        let expression = target.and_then(|target| self.build_expression(inner, &target, code));

        let mut names = Vec::new();
        let mut options = Vec::new();
        let mut pending_name = None;
        let mut inside = false;
        for child in all_children(node) {
            match child.kind() {
                "{" => inside = true,
                "}" => inside = false,
                "struct_field_assignment" | "call_struct_argument" if inside => {
                    if let Some((name, option)) = self.build_named_argument(inner, &child, code) {
                        names.extend(name);
                        options.push(option);
                    }
                }
                "identifier" if inside && pending_name.is_none() => {
                    pending_name = Some(text(&child, code).into_owned());
                }
                _ if inside && child.is_named() => {
                    if let Some(option) = self.build_expression(inner, &child, code) {
                        names.extend(pending_name.take());
                        options.push(option);
                    }
                }
                _ => {}
            }
        }

        let type_description = expression
            .and_then(|target| self.tree.type_of(target))
            .cloned();
        self.tree
            .add_node(AstNode::FunctionCallOptions(FunctionCallOptions {
                id,
                src,
                expression,
                options,
                names,
                type_description,
            }));
        id
    }

    fn build_member_access(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let object = node
            .child_by_field_name("object")
            .or_else(|| named_children(node).first().copied());
        let expression = object.and_then(|object| self.build_expression(inner, &object, code));
        let member_name = node
            .child_by_field_name("property")
            .or_else(|| named_children(node).last().copied())
            .map(|property| text(&property, code).into_owned())
            .unwrap_or_default();
        self.add_member_access(id, src, expression, member_name);
        id
    }

    /// Adds a member access, typed when its receiver is a built-in value.
    fn add_member_access(
        &mut self,
        id: NodeId,
        src: Src,
        expression: Option<NodeId>,
        member_name: String,
    ) {
        let type_description = expression
            .and_then(|object| self.tree.type_of(object))
            .and_then(|receiver| type_rules::magic_member(receiver, &member_name));
        self.tree.add_node(AstNode::MemberAccess(MemberAccess {
            id,
            src,
            expression,
            member_name,
            referenced_declaration: None,
            type_description,
        }));
    }

    fn build_index_access(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let base_expression = node
            .child_by_field_name("base")
            .or_else(|| named_children(node).first().copied())
            .and_then(|base| self.build_expression(inner, &base, code));
        let index_expression = node
            .child_by_field_name("index")
            .or_else(|| after_token(node, "["))
            .and_then(|index| self.build_expression(inner, &index, code));
        self.tree.add_node(AstNode::IndexAccess(IndexAccess {
            id,
            src,
            base_expression,
            index_expression,
            type_description: None,
        }));
        id
    }

    fn build_index_range_access(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let base_expression = node
            .child_by_field_name("base")
            .or_else(|| named_children(node).first().copied())
            .and_then(|base| self.build_expression(inner, &base, code));
        let colon = all_children(node)
            .into_iter()
            .find(|child| child.kind() == ":")
            .map(|colon| colon.start_byte());
        let start_expression = node
            .child_by_field_name("from")
            .or_else(|| {
                after_token(node, "[")
                    .filter(|from| colon.is_none_or(|colon| from.end_byte() <= colon))
            })
            .and_then(|from| self.build_expression(inner, &from, code));
        let end_expression = node
            .child_by_field_name("to")
            .or_else(|| after_token(node, ":"))
            .and_then(|to| self.build_expression(inner, &to, code));
        let type_description = base_expression
            .and_then(|base| self.tree.type_of(base))
            .cloned();
        self.tree
            .add_node(AstNode::IndexRangeAccess(IndexRangeAccess {
                id,
                src,
                base_expression,
                start_expression,
                end_expression,
                type_description,
            }));
        id
    }

    /// Builds tuples, parenthesized expressions, and inline arrays. Empty slots
    /// such as the first one in `(, b)` are kept as holes.
    fn build_tuple_expression(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let is_inline_array = node.kind() == "inline_array_expression";

        let mut components: Vec<Option<NodeId>> = Vec::new();
        let mut current = None;
        let mut seen_separator = false;
        for child in all_children(node) {
            match child.kind() {
                "," => {
                    components.push(current.take());
                    seen_separator = true;
                }
                ")" | "]" if current.is_some() || seen_separator => {
                    components.push(current.take());
                }
                _ if child.is_named() => {
                    current = self.build_expression(inner, &child, code);
                }
                _ => {}
            }
        }

        // Holes and untyped components drop out of the tuple type.
        let types: Vec<TypeDescription> = components
            .iter()
            .filter_map(|component| component.and_then(|c| self.tree.type_of(c)).cloned())
            .collect();
        let type_description = match types.first() {
            None => None,
            Some(first) if is_inline_array => {
                let length = components.len().to_string();
                Some(type_rules::located(
                    &type_rules::array(first, Some(&length)),
                    StorageLocation::Memory,
                    false,
                ))
            }
            Some(first) if node.kind() == "parenthesized_expression" => Some(first.clone()),
            Some(first) if components.len() == 1 && !seen_separator => Some(first.clone()),
            Some(_) => Some(type_rules::tuple(&types)),
        };
        self.tree
            .add_node(AstNode::TupleExpression(TupleExpression {
                id,
                src,
                components,
                is_inline_array,
                type_description,
            }));
        id
    }

    /// `new T` alone, or `new T(args)` as a call whose callee is the `new` expression.
    fn build_new_expression(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        if !all_children(node).iter().any(|child| child.kind() == "(") {
            return self.new_expression(ctx, node, node, code);
        }
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let type_end = node
            .child_by_field_name("name")
            .or_else(|| first_of_kind(node, TYPE_NAME_KINDS))
            .unwrap_or(*node);
        let expression = Some(self.new_expression(inner, node, &type_end, code));
        let (names, arguments) = self.call_arguments(inner, node, code);
        self.add_function_call(id, src, expression, arguments, names);
        id
    }

    fn new_expression(&mut self, ctx: Ancestors, node: &Node, last: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::span(node, last, ctx.parent_id());
        let type_name = node
            .child_by_field_name("name")
            .or_else(|| first_of_kind(node, TYPE_NAME_KINDS))
            .and_then(|type_name| self.build_type_name(ctx.expression(id), &type_name, code));
        let type_description = type_name
            .and_then(|type_name| self.tree.type_of(type_name))
            .filter(|ty| type_rules::is_reference(ty))
            .map(|ty| type_rules::located(ty, StorageLocation::Memory, false));
        self.tree.add_node(AstNode::NewExpression(NewExpression {
            id,
            src,
            type_name,
            type_description,
        }));
        id
    }

    fn build_meta_type(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let type_name = first_of_kind(node, TYPE_NAME_KINDS)
            .and_then(|type_name| self.build_type_name(ctx.expression(id), &type_name, code));
        let type_description = type_name
            .and_then(|type_name| self.tree.type_of(type_name))
            .map(type_rules::meta_type);
        self.tree.add_node(AstNode::MetaType(MetaType {
            id,
            src,
            type_name,
            type_description,
        }));
        id
    }

    fn build_payable_conversion(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let (_, arguments) = self.call_arguments(ctx.expression(id), node, code);
        self.tree
            .add_node(AstNode::PayableConversion(PayableConversion {
                id,
                src,
                arguments,
                type_description: Some(type_rules::address(true)),
            }));
        id
    }

    /// `uint8(x)` written with an elementary type as the callee.
    fn build_type_cast(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let expression = first_of_kind(node, &["primitive_type"])
            .map(|callee| self.build_elementary_type_name_expression(inner, &callee, code));
        let (names, arguments) = self.call_arguments(inner, node, code);
        self.add_function_call(id, src, expression, arguments, names);
        id
    }

    fn build_elementary_type_name_expression(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let name = identifier_text(node, code);
        let type_name = self.build_elementary_type_name(ctx.expression(id), node, &name);
        let type_description = self.tree.type_of(type_name).map(type_rules::meta_type);
        self.tree.add_node(AstNode::ElementaryTypeNameExpression(
            ElementaryTypeNameExpression {
                id,
                src,
                type_name,
                type_description,
            },
        ));
        id
    }
}

/// Operator token of an expression: its `operator` field, or its first anonymous
/// child that is not punctuation.
fn operator_text(node: &Node, code: &[u8]) -> String {
    if let Some(operator) = node.child_by_field_name("operator") {
        return text(&operator, code).trim().to_string();
    }
    all_children(node)
        .iter()
        .find(|child| !child.is_named() && !matches!(child.kind(), "(" | ")"))
        .map(|child| text(child, code).trim().to_string())
        .unwrap_or_default()
}
