use tree_sitter::Node;

use super::{
    Ancestors, Builder, after_token, all_children, children_of_kind, field_or_kind,
    first_of_kind, has_token, identifier_text, named_children, normalize_import_path, text,
};
use crate::nodes::{
    ArrayTypeName, AstNode, ContractDefinition, ContractKind, ElementaryTypeName, EnumDefinition,
    EnumValue, ErrorDefinition, EventDefinition, FunctionDefinition, FunctionKind,
    FunctionTypeName, IdentifierPath, ImportDirective, InheritanceSpecifier, Mapping,
    ModifierDefinition, ModifierInvocation, ModifierInvocationKind, Mutability, NodeId,
    OverrideSpecifier, ParameterList, PragmaDirective, StateMutability, StorageLocation,
    StructDefinition, SymbolAlias, TypeDescription, UserDefinedTypeName,
    UserDefinedValueTypeDefinition, UsingForDirective, VariableDeclaration, Visibility,
};
use crate::type_rules;

pub(super) const TYPE_NAME_KINDS: &[&str] = &[
    "type_name",
    "primitive_type",
    "user_defined_type",
    "mapping",
    "array_type",
    "function_type",
];

const LOCATION_KINDS: &[&str] = &["storage_location", "memory", "storage", "calldata"];

impl Builder<'_> {
    pub(super) fn build_pragma_directive(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let full = text(node, code).into_owned();
        let literals = full
            .trim()
            .trim_start_matches("pragma")
            .trim_end_matches(';')
            .split_whitespace()
            .map(str::to_string)
            .collect();
        self.tree.add_node(AstNode::PragmaDirective(PragmaDirective {
            id,
            src,
            literals,
            text: full,
        }));
        id
    }

    pub(super) fn build_import_directive(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let mut file = String::new();
        let mut unit_alias = None;
        let mut symbol_aliases: Vec<SymbolAlias> = Vec::new();
        let mut in_braces = false;
        let mut pending_alias = false;

        for child in all_children(node) {
            match child.kind() {
                "{" => in_braces = true,
                "}" => in_braces = false,
                "as" => pending_alias = true,
                "string" | "string_literal" => {
                    file = text(&child, code)
                        .trim_matches(|c| c == '"' || c == '\'')
                        .to_string();
                }
                "identifier" => {
                    let name = text(&child, code).into_owned();
                    if pending_alias {
                        match symbol_aliases.last_mut() {
                            Some(alias) if in_braces => alias.local = Some(name),
                            _ => unit_alias = Some(name),
                        }
                        pending_alias = false;
                    } else if in_braces {
                        symbol_aliases.push(SymbolAlias {
                            foreign: name,
                            local: None,
                            referenced_declaration: None,
                        });
                    }
                }
                _ => {}
            }
        }

        if file.is_empty() {
            self.missing_child(node, "import path");
        }
        let absolute_path = normalize_import_path(&self.path, &file);
        self.tree.add_node(AstNode::ImportDirective(ImportDirective {
            id,
            src,
            file,
            absolute_path,
            unit_alias,
            symbol_aliases,
            source_unit: None,
        }));
        id
    }

    pub(super) fn build_contract_definition(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let kind = match node.kind() {
            "interface_declaration" => ContractKind::Interface,
            "library_declaration" => ContractKind::Library,
            _ => ContractKind::Contract,
        };
        let name = self.declaration_name(node, code);
        let inner = ctx.contract(id);
        let previous = self.contract.replace((name.clone(), kind));

        let base_contracts = children_of_kind(node, &["inheritance_specifier"])
            .iter()
            .map(|base| self.build_inheritance_specifier(inner, base, code))
            .collect();

        let mut nodes = Vec::new();
        if let Some(body) = field_or_kind(node, "body", &["contract_body"]) {
            self.collect_errors(&body, code);
            for member in named_children(&body) {
                if let Some(member_id) = self.build_contract_member(inner, &member, code) {
                    nodes.push(member_id);
                }
            }
        } else {
            self.missing_child(node, "body");
        }

        self.contract = previous;
        self.tree
            .add_node(AstNode::ContractDefinition(ContractDefinition {
                id,
                src,
                type_description: Some(type_rules::contract(&name, id, kind)),
                name,
                kind,
                is_abstract: has_token(node, "abstract"),
                base_contracts,
                linearized_base_contracts: vec![id],
                contract_dependencies: Vec::new(),
                nodes,
            }));
        id
    }

    fn build_contract_member(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> Option<NodeId> {
        match node.kind() {
            "function_definition" | "constructor_definition" | "fallback_receive_definition" => {
                Some(self.build_function_definition(ctx, node, code))
            }
            "modifier_definition" => Some(self.build_modifier_definition(ctx, node, code)),
            "state_variable_declaration" | "constant_variable_declaration" => {
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
                self.unrecognized("contract member", node);
                None
            }
        }
    }

    fn build_inheritance_specifier(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.declaration(id);
        let base = node
            .child_by_field_name("ancestor")
            .or_else(|| first_of_kind(node, &["user_defined_type", "identifier"]))
            .unwrap_or(*node);
        let base_name = self.build_identifier_path(inner, &base, code);
        let arguments = self
            .build_call_arguments(inner, node, code)
            .into_iter()
            .map(|(_, argument)| argument)
            .collect();
        self.tree
            .add_node(AstNode::InheritanceSpecifier(InheritanceSpecifier {
                id,
                src,
                base_name,
                arguments,
            }));
        id
    }

    pub(super) fn build_identifier_path(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        let id = self.next_id();
        let segments = path_segments(node);
        let (src, name) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (
                Self::span(first, last, ctx.parent_id()),
                segments
                    .iter()
                    .map(|segment| identifier_text(segment, code))
                    .collect::<Vec<_>>()
                    .join("."),
            ),
            _ => {
                self.missing_child(node, "name");
                (Self::get_location(node, ctx.parent_id()), String::new())
            }
        };
        self.tree.add_node(AstNode::IdentifierPath(IdentifierPath {
            id,
            src,
            name,
            referenced_declaration: None,
        }));
        id
    }

    pub(super) fn build_using_for_directive(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.declaration(id);
        let mut library_name = None;
        let mut function_list = Vec::new();
        let mut type_name = None;
        let mut after_for = false;
        let mut in_braces = false;

        for child in all_children(node) {
            match child.kind() {
                "for" => after_for = true,
                "{" => in_braces = true,
                "}" => in_braces = false,
                kind if after_for && TYPE_NAME_KINDS.contains(&kind) => {
                    type_name = self.build_type_name(inner, &child, code);
                }
                "user_defined_type" | "identifier" | "type_alias" | "using_alias"
                    if !after_for =>
                {
                    let path = self.build_identifier_path(inner, &child, code);
                    if in_braces {
                        function_list.push(path);
                    } else {
                        library_name = Some(path);
                    }
                }
                _ => {}
            }
        }

        self.tree
            .add_node(AstNode::UsingForDirective(UsingForDirective {
                id,
                src,
                library_name,
                function_list,
                type_name,
                is_global: has_token(node, "global") || first_of_kind(node, &["global"]).is_some(),
            }));
        id
    }

    pub(super) fn build_struct_definition(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let name = self.declaration_name(node, code);
        let canonical_name = self.canonical_name(&name);
        let inner = ctx.declaration(id);
        let body = field_or_kind(node, "body", &["struct_body"]).unwrap_or(*node);
        let members = children_of_kind(&body, &["struct_member"])
            .iter()
            .map(|member| self.build_variable_declaration(inner, member, code))
            .collect();
        self.tree.add_node(AstNode::StructDefinition(StructDefinition {
            id,
            src,
            type_description: Some(type_rules::structure(&canonical_name, &name, id)),
            name,
            canonical_name,
            visibility: Visibility::Public,
            members,
        }));
        id
    }

    pub(super) fn build_enum_definition(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let name = self.declaration_name(node, code);
        let canonical_name = self.canonical_name(&name);
        let inner = ctx.declaration(id);
        let name_node = node.child_by_field_name("name").map(|name| name.id());
        let body = field_or_kind(node, "body", &["enum_body"]).unwrap_or(*node);
        let mut members = Vec::new();
        for value in children_of_kind(&body, &["enum_value", "identifier"]) {
            if Some(value.id()) == name_node {
                continue;
            }
            let value_id = self.next_id();
            self.tree.add_node(AstNode::EnumValue(EnumValue {
                id: value_id,
                src: Self::get_location(&value, inner.parent_id()),
                name: text(&value, code).into_owned(),
            }));
            members.push(value_id);
        }
        self.tree.add_node(AstNode::EnumDefinition(EnumDefinition {
            id,
            src,
            type_description: Some(type_rules::enumeration(&canonical_name, &name, id)),
            name,
            canonical_name,
            members,
        }));
        id
    }

    pub(super) fn build_event_definition(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let name = self.declaration_name(node, code);
        let inner = ctx.declaration(id);
        let parameters = self.build_parameter_list(inner, node, &["event_parameter"], code);
        self.tree.add_node(AstNode::EventDefinition(EventDefinition {
            id,
            src,
            type_description: Some(type_rules::event(&name, id)),
            name,
            anonymous: has_token(node, "anonymous"),
            parameters,
        }));
        id
    }

    pub(super) fn build_error_definition(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let name = self.declaration_name(node, code);
        let inner = ctx.declaration(id);
        let parameters = self.build_parameter_list(inner, node, &["error_parameter"], code);
        self.tree.add_node(AstNode::ErrorDefinition(ErrorDefinition {
            id,
            src,
            type_description: Some(type_rules::error(&name, id)),
            name,
            parameters,
        }));
        id
    }

    pub(super) fn build_user_defined_value_type_definition(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let name = self.declaration_name(node, code);
        let canonical_name = self.canonical_name(&name);
        let inner = ctx.declaration(id);
        let underlying = after_token(node, "is")
            .or_else(|| first_of_kind(node, TYPE_NAME_KINDS))
            .and_then(|underlying| self.build_type_name(inner, &underlying, code));
        let underlying_type = underlying.unwrap_or_else(|| {
            self.missing_child(node, "underlying type");
            self.build_elementary_type_name(inner, node, "uint256")
        });
        self.tree.add_node(AstNode::UserDefinedValueTypeDefinition(
            UserDefinedValueTypeDefinition {
                id,
                src,
                type_description: Some(type_rules::user_defined_value_type(
                    &canonical_name,
                    &name,
                    id,
                )),
                name,
                canonical_name,
                underlying_type,
            },
        ));
        id
    }

    /// Builds functions, constructors, fallback and receive functions, and free functions.
    pub(super) fn build_function_definition(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let contract_kind = self.contract.as_ref().map(|(_, kind)| *kind);
        let kind = match node.kind() {
            "constructor_definition" => FunctionKind::Constructor,
            "fallback_receive_definition" if has_token(node, "receive") => FunctionKind::Receive,
            "fallback_receive_definition" => FunctionKind::Fallback,
            _ if contract_kind.is_none() => FunctionKind::FreeFunction,
            _ => FunctionKind::Function,
        };
        let name = match kind {
            FunctionKind::Function | FunctionKind::FreeFunction => {
                self.declaration_name(node, code)
            }
            _ => String::new(),
        };
        let inner = ctx.function(id);

        let parameters = self.build_parameter_list(inner, node, &["parameter"], code);
        let (modifiers, overrides) = self.build_function_modifiers(inner, node, code);
        let return_parameters = match first_of_kind(node, &["return_type_definition"]) {
            Some(returns) => self.build_parameter_list(inner, &returns, &["parameter"], code),
            None => self.build_empty_parameter_list(inner, node),
        };
        let body = field_or_kind(node, "body", &["function_body"]).map(|body| {
            self.build_block(inner.with_return_parameters(return_parameters), &body, code)
        });

        let visibility = keyword_child(node, code, "visibility")
            .and_then(|keyword| Visibility::from_keyword(&keyword))
            .unwrap_or(match (kind, contract_kind) {
                (_, Some(ContractKind::Interface))
                | (FunctionKind::Fallback | FunctionKind::Receive, _) => Visibility::External,
                (FunctionKind::FreeFunction, _) => Visibility::Internal,
                _ => Visibility::Public,
            });
        let state_mutability = self.state_mutability_of(node, code);
        let type_description = self.function_type(
            visibility,
            state_mutability,
            parameters,
            return_parameters,
        );

        self.tree
            .add_node(AstNode::FunctionDefinition(FunctionDefinition {
                id,
                src,
                name,
                kind,
                visibility,
                state_mutability,
                is_virtual: is_virtual(node),
                implemented: body.is_some(),
                modifiers,
                overrides,
                parameters,
                return_parameters,
                body,
                scope: ctx.scope(),
                type_description,
            }));
        id
    }

    fn build_function_modifiers(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> (Vec<NodeId>, Option<NodeId>) {
        let mut modifiers = Vec::new();
        let mut overrides = None;
        for child in named_children(node) {
            match child.kind() {
                "modifier_invocation" => {
                    modifiers.push(self.build_modifier_invocation(ctx, &child, code));
                }
                "override_specifier" => {
                    overrides = Some(self.build_override_specifier(ctx, &child, code));
                }
                _ => {}
            }
        }
        (modifiers, overrides)
    }

    pub(super) fn build_modifier_definition(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let name = self.declaration_name(node, code);
        let inner = ctx.function(id);
        let parameters = self.build_parameter_list(inner, node, &["parameter"], code);
        let overrides = first_of_kind(node, &["override_specifier"])
            .map(|specifier| self.build_override_specifier(inner, &specifier, code));
        let body = field_or_kind(node, "body", &["function_body"])
            .map(|body| self.build_block(inner, &body, code));
        self.tree
            .add_node(AstNode::ModifierDefinition(ModifierDefinition {
                id,
                src,
                type_description: Some(type_rules::modifier(&name, id)),
                name,
                visibility: Visibility::Internal,
                is_virtual: is_virtual(node),
                overrides,
                parameters,
                body,
            }));
        id
    }

    fn build_modifier_invocation(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.declaration(id);
        let name_node = first_of_kind(node, &["identifier_path"]).unwrap_or(*node);
        let modifier_name = self.build_identifier_path(inner, &name_node, code);
        let arguments = self
            .build_call_arguments(inner, node, code)
            .into_iter()
            .map(|(_, argument)| argument)
            .collect();
        self.tree
            .add_node(AstNode::ModifierInvocation(ModifierInvocation {
                id,
                src,
                modifier_name,
                arguments,
                kind: ModifierInvocationKind::ModifierInvocation,
            }));
        id
    }

    fn build_override_specifier(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.declaration(id);
        let overrides = children_of_kind(node, &["user_defined_type", "identifier"])
            .iter()
            .map(|base| self.build_identifier_path(inner, base, code))
            .collect();
        self.tree
            .add_node(AstNode::OverrideSpecifier(OverrideSpecifier {
                id,
                src,
                overrides,
            }));
        id
    }

    /// Builds the parameter list formed by the `kinds` children of `owner`.
    ///
    /// The grammar keeps parameters inline, so the list spans the parentheses
    /// around them, or the owner itself when there are none.
    pub(super) fn build_parameter_list(
        &mut self,
        ctx: Ancestors,
        owner: &Node,
        kinds: &[&str],
        code: &[u8],
    ) -> NodeId {
        let children = all_children(owner);
        self.build_parameters(ctx, owner, &children, kinds, code)
    }

    /// Builds a parameter list from the `kinds` nodes among `tokens`, a run of
    /// `owner`'s children.
    pub(super) fn build_parameters(
        &mut self,
        ctx: Ancestors,
        owner: &Node,
        tokens: &[Node],
        kinds: &[&str],
        code: &[u8],
    ) -> NodeId {
        let id = self.next_id();
        let open = tokens.iter().position(|child| child.kind() == "(");
        let close = open.and_then(|open| {
            tokens[open..]
                .iter()
                .position(|child| child.kind() == ")")
                .map(|close| open + close)
        });
        let src = match (open, close) {
            (Some(open), Some(close)) => Self::span(&tokens[open], &tokens[close], ctx.parent_id()),
            _ => Self::get_location(owner, ctx.parent_id()),
        };
        let inner = ctx.declaration(id);
        let parameters = tokens
            .iter()
            .filter(|child| kinds.contains(&child.kind()))
            .map(|parameter| self.build_variable_declaration(inner, parameter, code))
            .collect();
        self.tree.add_node(AstNode::ParameterList(ParameterList {
            id,
            src,
            parameters,
        }));
        id
    }

    pub(super) fn build_empty_parameter_list(&mut self, ctx: Ancestors, owner: &Node) -> NodeId {
        let id = self.next_id();
        let mut src = Self::get_location(owner, ctx.parent_id());
        src.end = src.start;
        src.length = 0;
        self.tree.add_node(AstNode::ParameterList(ParameterList {
            id,
            src,
            parameters: Vec::new(),
        }));
        id
    }

    /// Builds a parameter, local variable, struct member, or event/error parameter.
    pub(super) fn build_variable_declaration(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.declaration(id);
        let type_name = field_or_kind(node, "type", TYPE_NAME_KINDS)
            .and_then(|type_name| self.build_type_name(inner, &type_name, code));
        let storage_location = storage_location_of(node, code);
        let name = node
            .child_by_field_name("name")
            .or_else(|| children_of_kind(node, &["identifier"]).pop())
            .map(|name| text(&name, code).into_owned())
            .unwrap_or_default();
        let type_description = self.declaration_type(type_name, storage_location, false);
        self.tree
            .add_node(AstNode::VariableDeclaration(VariableDeclaration {
                id,
                src,
                name,
                type_name,
                storage_location,
                visibility: Visibility::Internal,
                mutability: Mutability::Mutable,
                state_variable: false,
                constant: false,
                indexed: has_token(node, "indexed"),
                value: None,
                overrides: None,
                scope: ctx.scope(),
                type_description,
            }));
        id
    }

    /// Builds state variables and file-level constants.
    pub(super) fn build_state_variable_declaration(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.declaration(id);
        let type_name = field_or_kind(node, "type", TYPE_NAME_KINDS)
            .and_then(|type_name| self.build_type_name(inner, &type_name, code));
        let overrides = first_of_kind(node, &["override_specifier"])
            .map(|specifier| self.build_override_specifier(inner, &specifier, code));
        let name = self.declaration_name(node, code);
        let value = node
            .child_by_field_name("value")
            .or_else(|| after_token(node, "="))
            .and_then(|value| self.build_expression(inner, &value, code));

        let is_constant = node.kind() == "constant_variable_declaration"
            || has_token(node, "constant")
            || first_of_kind(node, &["constant"]).is_some();
        let is_immutable =
            has_token(node, "immutable") || first_of_kind(node, &["immutable"]).is_some();
        let mutability = if is_constant {
            Mutability::Constant
        } else if is_immutable {
            Mutability::Immutable
        } else {
            Mutability::Mutable
        };
        let visibility = keyword_child(node, code, "visibility")
            .and_then(|keyword| Visibility::from_keyword(&keyword))
            .unwrap_or_default();
        let state_variable = ctx.contract.is_some();
        let type_description =
            self.declaration_type(type_name, StorageLocation::Default, state_variable);

        self.tree
            .add_node(AstNode::VariableDeclaration(VariableDeclaration {
                id,
                src,
                name,
                type_name,
                storage_location: StorageLocation::Default,
                visibility,
                mutability,
                state_variable,
                constant: is_constant,
                indexed: false,
                value,
                overrides,
                scope: ctx.scope(),
                type_description,
            }));
        id
    }

    /// Type of a declaration: its type name's type placed in its data location.
    fn declaration_type(
        &self,
        type_name: Option<NodeId>,
        location: StorageLocation,
        state_variable: bool,
    ) -> Option<TypeDescription> {
        let base = self.tree.type_of(type_name?)?;
        Some(type_rules::located(base, location, state_variable))
    }

    fn function_type(
        &self,
        visibility: Visibility,
        state_mutability: StateMutability,
        parameters: NodeId,
        returns: NodeId,
    ) -> Option<TypeDescription> {
        let parameters = self.parameter_types(parameters)?;
        let returns = self.parameter_types(returns)?;
        Some(type_rules::function(
            visibility,
            state_mutability,
            &parameters,
            &returns,
        ))
    }

    /// Types of every parameter in a list, or `None` if any is not known yet.
    fn parameter_types(&self, list: NodeId) -> Option<Vec<TypeDescription>> {
        let Some(AstNode::ParameterList(list)) = self.tree.get_by_id(list) else {
            return None;
        };
        list.parameters
            .iter()
            .map(|parameter| self.tree.type_of(*parameter).cloned())
            .collect()
    }

    pub(super) fn build_type_name(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        code: &[u8],
    ) -> Option<NodeId> {
        match node.kind() {
            "type_name" => {
                if has_token(node, "mapping") {
                    Some(self.build_mapping(ctx, node, code))
                } else if has_token(node, "function") {
                    Some(self.build_function_type_name(ctx, node, code))
                } else if has_token(node, "[") {
                    Some(self.build_array_type_name(ctx, node, code))
                } else if let Some(inner) = first_of_kind(node, TYPE_NAME_KINDS) {
                    self.build_type_name(ctx, &inner, code)
                } else {
                    self.unrecognized("type name", node);
                    None
                }
            }
            "mapping" => Some(self.build_mapping(ctx, node, code)),
            "array_type" => Some(self.build_array_type_name(ctx, node, code)),
            "function_type" => Some(self.build_function_type_name(ctx, node, code)),
            "primitive_type" => {
                let name = identifier_text(node, code);
                Some(self.build_elementary_type_name(ctx, node, &name))
            }
            "user_defined_type" | "identifier" | "identifier_path" => {
                Some(self.build_user_defined_type_name(ctx, node, code))
            }
            "ERROR" => None,
            _ => {
                self.unrecognized("type name", node);
                None
            }
        }
    }

    /// Builds an elementary type name; `address payable` is spelled without spaces
    /// by [`identifier_text`], so the `payable` suffix is split off here.
    pub(super) fn build_elementary_type_name(
        &mut self,
        ctx: Ancestors,
        node: &Node,
        name: &str,
    ) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let (name, payable) = match name.strip_suffix("payable") {
            Some(base) if !base.is_empty() => (base, true),
            _ => (name, false),
        };
        let name = type_rules::canonical_elementary_name(name);
        let state_mutability = payable.then_some(StateMutability::Payable);
        self.tree
            .add_node(AstNode::ElementaryTypeName(ElementaryTypeName {
                id,
                src,
                type_description: Some(type_rules::elementary(&name, payable)),
                name,
                state_mutability,
            }));
        id
    }

    fn build_user_defined_type_name(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        self.tree
            .add_node(AstNode::UserDefinedTypeName(UserDefinedTypeName {
                id,
                src,
                name: identifier_text(node, code),
                referenced_declaration: None,
                type_description: None,
            }));
        id
    }

    fn build_mapping(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);

        let mut key = node.child_by_field_name("key_type");
        let mut value = node.child_by_field_name("value_type");
        let mut key_name = None;
        let mut value_name = None;
        let mut after_arrow = false;
        for child in all_children(node) {
            let kind = child.kind();
            if kind == "=>" {
                after_arrow = true;
            } else if TYPE_NAME_KINDS.contains(&kind) && !after_arrow && key.is_none() {
                key = Some(child);
            } else if TYPE_NAME_KINDS.contains(&kind) && after_arrow && value.is_none() {
                value = Some(child);
            } else if kind == "identifier"
                && Some(child.id()) != key.map(|k| k.id())
                && Some(child.id()) != value.map(|v| v.id())
            {
                let name = Some(text(&child, code).into_owned());
                if after_arrow {
                    value_name = name;
                } else {
                    key_name = name;
                }
            }
        }

        let key_type = self.required_type_name(inner, node, key, "key type", code);
        let value_type = self.required_type_name(inner, node, value, "value type", code);
        let type_description = match (self.tree.type_of(key_type), self.tree.type_of(value_type)) {
            (Some(key), Some(value)) => Some(type_rules::mapping(key, value)),
            _ => None,
        };
        self.tree.add_node(AstNode::Mapping(Mapping {
            id,
            src,
            key_type,
            key_name,
            value_type,
            value_name,
            type_description,
        }));
        id
    }

    fn build_array_type_name(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.expression(id);
        let base = field_or_kind(node, "base", TYPE_NAME_KINDS);
        let base_type = self.required_type_name(inner, node, base, "element type", code);
        let length_node = after_token(node, "[");
        let length = length_node.and_then(|length| self.build_expression(inner, &length, code));
        let length_text = length_node.map(|length| identifier_text(&length, code));
        let type_description = self
            .tree
            .type_of(base_type)
            .map(|base| type_rules::array(base, length_text.as_deref()));
        self.tree.add_node(AstNode::ArrayTypeName(ArrayTypeName {
            id,
            src,
            base_type,
            length,
            type_description,
        }));
        id
    }

    fn build_function_type_name(&mut self, ctx: Ancestors, node: &Node, code: &[u8]) -> NodeId {
        self.collect_errors(node, code);
        let id = self.next_id();
        let src = Self::get_location(node, ctx.parent_id());
        let inner = ctx.declaration(id);
        // Return parameters of a function type are inline after `returns`.
        let children = all_children(node);
        let split = children
            .iter()
            .position(|child| child.kind() == "returns")
            .unwrap_or(children.len());
        let (before, after) = children.split_at(split);
        let parameter_types = self.build_parameters(inner, node, before, &["parameter"], code);
        let return_parameter_types = match first_of_kind(node, &["return_type_definition"]) {
            Some(returns) => self.build_parameter_list(inner, &returns, &["parameter"], code),
            None if !after.is_empty() => {
                self.build_parameters(inner, node, after, &["parameter"], code)
            }
            None => self.build_empty_parameter_list(inner, node),
        };
        let visibility = keyword_child(node, code, "visibility")
            .and_then(|keyword| Visibility::from_keyword(&keyword))
            .unwrap_or_default();
        let state_mutability = self.state_mutability_of(node, code);
        let type_description = self.function_type(
            visibility,
            state_mutability,
            parameter_types,
            return_parameter_types,
        );
        self.tree
            .add_node(AstNode::FunctionTypeName(FunctionTypeName {
                id,
                src,
                parameter_types,
                return_parameter_types,
                visibility,
                state_mutability,
                type_description,
            }));
        id
    }

    /// Builds a type name that the enclosing construct cannot do without. A missing
    /// one is recorded and replaced by `uint256` so the parent keeps its shape.
    fn required_type_name(
        &mut self,
        ctx: Ancestors,
        owner: &Node,
        node: Option<Node>,
        what: &str,
        code: &[u8],
    ) -> NodeId {
        if let Some(id) = node.and_then(|node| self.build_type_name(ctx, &node, code)) {
            return id;
        }
        self.missing_child(owner, what);
        self.build_elementary_type_name(ctx, owner, "uint256")
    }

    fn state_mutability_of(&self, node: &Node, code: &[u8]) -> StateMutability {
        keyword_child(node, code, "state_mutability")
            .and_then(|keyword| StateMutability::from_keyword(&keyword))
            .or_else(|| has_token(node, "payable").then_some(StateMutability::Payable))
            .unwrap_or_default()
    }

    /// Name of a declaration: its `name` field or its first identifier.
    fn declaration_name(&mut self, node: &Node, code: &[u8]) -> String {
        match field_or_kind(node, "name", &["identifier"]) {
            Some(name) => text(&name, code).into_owned(),
            None => {
                self.missing_child(node, "name");
                String::new()
            }
        }
    }
}

/// Nodes spelling a dotted path. A path node stands for itself; any other node
/// contributes its leading identifiers, up to an argument list or an alias.
fn path_segments<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    if matches!(
        node.kind(),
        "identifier" | "user_defined_type" | "identifier_path"
    ) {
        return vec![*node];
    }
    all_children(node)
        .into_iter()
        .take_while(|child| !matches!(child.kind(), "(" | "as" | "call_argument"))
        .filter(|child| matches!(child.kind(), "identifier" | "user_defined_type"))
        .collect()
}

fn is_virtual(node: &Node) -> bool {
    has_token(node, "virtual") || first_of_kind(node, &["virtual"]).is_some()
}

/// Text of the first named child of `kind`, such as `visibility` or `state_mutability`.
fn keyword_child(node: &Node, code: &[u8], kind: &str) -> Option<String> {
    first_of_kind(node, &[kind]).map(|child| text(&child, code).trim().to_string())
}

fn storage_location_of(node: &Node, code: &[u8]) -> StorageLocation {
    node.child_by_field_name("location")
        .or_else(|| first_of_kind(node, LOCATION_KINDS))
        .and_then(|location| StorageLocation::from_keyword(text(&location, code).trim()))
        .or_else(|| {
            ["memory", "storage", "calldata"]
                .into_iter()
                .find(|keyword| has_token(node, keyword))
                .and_then(StorageLocation::from_keyword)
        })
        .unwrap_or_default()
}
