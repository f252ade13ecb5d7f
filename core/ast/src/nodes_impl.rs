use crate::nodes::{
    AssignmentOperator, AstNode, BinaryOperator, ContractKind, NodeId, OperatorCategory,
    StateMutability, StorageLocation, TypeDescription, UnaryOperator,
    VariableDeclarationStatement, Visibility,
};
use crate::type_rules;

/// Expands `$body` for every node kind that carries a `type_description` field.
macro_rules! with_typed_kinds {
    ($node:expr, $binding:ident => $body:expr, _ => $fallback:expr) => {
        match $node {
            AstNode::ContractDefinition($binding) => $body,
            AstNode::StructDefinition($binding) => $body,
            AstNode::EnumDefinition($binding) => $body,
            AstNode::EventDefinition($binding) => $body,
            AstNode::ErrorDefinition($binding) => $body,
            AstNode::UserDefinedValueTypeDefinition($binding) => $body,
            AstNode::FunctionDefinition($binding) => $body,
            AstNode::ModifierDefinition($binding) => $body,
            AstNode::VariableDeclaration($binding) => $body,
            AstNode::ElementaryTypeName($binding) => $body,
            AstNode::UserDefinedTypeName($binding) => $body,
            AstNode::Mapping($binding) => $body,
            AstNode::ArrayTypeName($binding) => $body,
            AstNode::FunctionTypeName($binding) => $body,
            AstNode::Identifier($binding) => $body,
            AstNode::Literal($binding) => $body,
            AstNode::BinaryOperation($binding) => $body,
            AstNode::UnaryPrefixOperation($binding) => $body,
            AstNode::UnarySuffixOperation($binding) => $body,
            AstNode::Assignment($binding) => $body,
            AstNode::Conditional($binding) => $body,
            AstNode::FunctionCall($binding) => $body,
            AstNode::FunctionCallOptions($binding) => $body,
            AstNode::MemberAccess($binding) => $body,
            AstNode::IndexAccess($binding) => $body,
            AstNode::IndexRangeAccess($binding) => $body,
            AstNode::TupleExpression($binding) => $body,
            AstNode::NewExpression($binding) => $body,
            AstNode::MetaType($binding) => $body,
            AstNode::PayableConversion($binding) => $body,
            AstNode::ElementaryTypeNameExpression($binding) => $body,
            _ => $fallback,
        }
    };
}

fn push(children: &mut Vec<NodeId>, id: Option<NodeId>) {
    if let Some(id) = id {
        children.push(id);
    }
}

impl AstNode {
    /// Direct syntactic children in source order.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn children(&self) -> Vec<NodeId> {
        let mut children = Vec::new();
        match self {
            AstNode::SourceUnit(n) => children.extend(&n.nodes),
            AstNode::ContractDefinition(n) => {
                children.extend(&n.base_contracts);
                children.extend(&n.nodes);
            }
            AstNode::InheritanceSpecifier(n) => {
                children.push(n.base_name);
                children.extend(&n.arguments);
            }
            AstNode::UsingForDirective(n) => {
                push(&mut children, n.library_name);
                children.extend(&n.function_list);
                push(&mut children, n.type_name);
            }
            AstNode::StructDefinition(n) => children.extend(&n.members),
            AstNode::EnumDefinition(n) => children.extend(&n.members),
            AstNode::EventDefinition(n) => children.push(n.parameters),
            AstNode::ErrorDefinition(n) => children.push(n.parameters),
            AstNode::UserDefinedValueTypeDefinition(n) => children.push(n.underlying_type),
            AstNode::FunctionDefinition(n) => {
                children.push(n.parameters);
                children.extend(&n.modifiers);
                push(&mut children, n.overrides);
                children.push(n.return_parameters);
                push(&mut children, n.body);
            }
            AstNode::ModifierDefinition(n) => {
                children.push(n.parameters);
                push(&mut children, n.overrides);
                push(&mut children, n.body);
            }
            AstNode::ModifierInvocation(n) => {
                children.push(n.modifier_name);
                children.extend(&n.arguments);
            }
            AstNode::OverrideSpecifier(n) => children.extend(&n.overrides),
            AstNode::ParameterList(n) => children.extend(&n.parameters),
            AstNode::VariableDeclaration(n) => {
                push(&mut children, n.type_name);
                push(&mut children, n.overrides);
                push(&mut children, n.value);
            }
            AstNode::Mapping(n) => {
                children.push(n.key_type);
                children.push(n.value_type);
            }
            AstNode::ArrayTypeName(n) => {
                children.push(n.base_type);
                push(&mut children, n.length);
            }
            AstNode::FunctionTypeName(n) => {
                children.push(n.parameter_types);
                children.push(n.return_parameter_types);
            }
            AstNode::Block(n) => children.extend(&n.statements),
            AstNode::UncheckedBlock(n) => children.extend(&n.statements),
            AstNode::ExpressionStatement(n) => push(&mut children, n.expression),
            AstNode::VariableDeclarationStatement(n) => {
                children.extend(n.declarations.iter().flatten());
                push(&mut children, n.initial_value);
            }
            AstNode::IfStatement(n) => {
                push(&mut children, n.condition);
                push(&mut children, n.true_body);
                push(&mut children, n.false_body);
            }
            AstNode::ForStatement(n) => {
                push(&mut children, n.initialization_expression);
                push(&mut children, n.condition);
                push(&mut children, n.loop_expression);
                push(&mut children, n.body);
            }
            AstNode::WhileStatement(n) => {
                push(&mut children, n.condition);
                push(&mut children, n.body);
            }
            AstNode::DoWhileStatement(n) => {
                push(&mut children, n.body);
                push(&mut children, n.condition);
            }
            AstNode::Return(n) => push(&mut children, n.expression),
            AstNode::EmitStatement(n) => push(&mut children, n.event_call),
            AstNode::RevertStatement(n) => push(&mut children, n.error_call),
            AstNode::TryStatement(n) => {
                push(&mut children, n.external_call);
                push(&mut children, n.return_parameters);
                push(&mut children, n.block);
                children.extend(&n.clauses);
            }
            AstNode::TryCatchClause(n) => {
                push(&mut children, n.parameters);
                push(&mut children, n.block);
            }
            AstNode::InlineAssembly(n) => children.push(n.block),
            AstNode::BinaryOperation(n) => {
                push(&mut children, n.left_expression);
                push(&mut children, n.right_expression);
            }
            AstNode::UnaryPrefixOperation(n) => push(&mut children, n.sub_expression),
            AstNode::UnarySuffixOperation(n) => push(&mut children, n.sub_expression),
            AstNode::Assignment(n) => {
                push(&mut children, n.left_hand_side);
                push(&mut children, n.right_hand_side);
            }
            AstNode::Conditional(n) => {
                push(&mut children, n.condition);
                push(&mut children, n.true_expression);
                push(&mut children, n.false_expression);
            }
            AstNode::FunctionCall(n) => {
                push(&mut children, n.expression);
                children.extend(&n.arguments);
            }
            AstNode::FunctionCallOptions(n) => {
                push(&mut children, n.expression);
                children.extend(&n.options);
            }
            AstNode::MemberAccess(n) => push(&mut children, n.expression),
            AstNode::IndexAccess(n) => {
                push(&mut children, n.base_expression);
                push(&mut children, n.index_expression);
            }
            AstNode::IndexRangeAccess(n) => {
                push(&mut children, n.base_expression);
                push(&mut children, n.start_expression);
                push(&mut children, n.end_expression);
            }
            AstNode::TupleExpression(n) => children.extend(n.components.iter().flatten()),
            AstNode::NewExpression(n) => push(&mut children, n.type_name),
            AstNode::MetaType(n) => push(&mut children, n.type_name),
            AstNode::PayableConversion(n) => children.extend(&n.arguments),
            AstNode::ElementaryTypeNameExpression(n) => children.push(n.type_name),
            AstNode::YulBlock(n) => children.extend(&n.statements),
            AstNode::YulVariableDeclaration(n) => {
                children.extend(&n.variables);
                push(&mut children, n.value);
            }
            AstNode::YulAssignment(n) => {
                children.extend(&n.variable_names);
                push(&mut children, n.value);
            }
            AstNode::YulFunctionCall(n) => {
                children.push(n.function_name);
                children.extend(&n.arguments);
            }
            AstNode::YulExpressionStatement(n) => children.push(n.expression),
            AstNode::YulIf(n) => {
                push(&mut children, n.condition);
                push(&mut children, n.body);
            }
            AstNode::YulForLoop(n) => {
                push(&mut children, n.pre);
                push(&mut children, n.condition);
                push(&mut children, n.post);
                push(&mut children, n.body);
            }
            AstNode::YulSwitch(n) => {
                push(&mut children, n.expression);
                children.extend(&n.cases);
            }
            AstNode::YulCase(n) => {
                push(&mut children, n.value);
                push(&mut children, n.body);
            }
            AstNode::YulFunctionDefinition(n) => {
                children.extend(&n.parameters);
                children.extend(&n.return_variables);
                push(&mut children, n.body);
            }
            AstNode::PragmaDirective(_)
            | AstNode::ImportDirective(_)
            | AstNode::EnumValue(_)
            | AstNode::ElementaryTypeName(_)
            | AstNode::UserDefinedTypeName(_)
            | AstNode::IdentifierPath(_)
            | AstNode::Continue(_)
            | AstNode::Break(_)
            | AstNode::PlaceholderStatement(_)
            | AstNode::Identifier(_)
            | AstNode::Literal(_)
            | AstNode::YulTypedName(_)
            | AstNode::YulLeave(_)
            | AstNode::YulBreak(_)
            | AstNode::YulContinue(_)
            | AstNode::YulIdentifier(_)
            | AstNode::YulLiteral(_) => {}
        }
        children
    }

    #[must_use]
    pub fn type_description(&self) -> Option<&TypeDescription> {
        with_typed_kinds!(self, n => n.type_description.as_ref(), _ => None)
    }

    /// Overwrites the type of a typed node. Returns `false` for kinds without a type.
    pub fn set_type_description(&mut self, type_description: TypeDescription) -> bool {
        with_typed_kinds!(self, n => {
            n.type_description = Some(type_description);
            true
        }, _ => false)
    }

    #[must_use]
    pub fn referenced_declaration(&self) -> Option<NodeId> {
        match self {
            AstNode::Identifier(n) => n.referenced_declaration,
            AstNode::MemberAccess(n) => n.referenced_declaration,
            AstNode::UserDefinedTypeName(n) => n.referenced_declaration,
            AstNode::IdentifierPath(n) => n.referenced_declaration,
            AstNode::FunctionCall(n) => n.referenced_declaration,
            AstNode::YulIdentifier(n) => n.referenced_declaration,
            _ => None,
        }
    }

    /// Declared name of the node, if its kind has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            AstNode::ContractDefinition(n) => Some(&n.name),
            AstNode::StructDefinition(n) => Some(&n.name),
            AstNode::EnumDefinition(n) => Some(&n.name),
            AstNode::EnumValue(n) => Some(&n.name),
            AstNode::EventDefinition(n) => Some(&n.name),
            AstNode::ErrorDefinition(n) => Some(&n.name),
            AstNode::UserDefinedValueTypeDefinition(n) => Some(&n.name),
            AstNode::FunctionDefinition(n) => Some(&n.name),
            AstNode::ModifierDefinition(n) => Some(&n.name),
            AstNode::VariableDeclaration(n) => Some(&n.name),
            AstNode::ElementaryTypeName(n) => Some(&n.name),
            AstNode::UserDefinedTypeName(n) => Some(&n.name),
            AstNode::IdentifierPath(n) => Some(&n.name),
            AstNode::Identifier(n) => Some(&n.name),
            AstNode::MemberAccess(n) => Some(&n.member_name),
            AstNode::YulTypedName(n) => Some(&n.name),
            AstNode::YulFunctionDefinition(n) => Some(&n.name),
            AstNode::YulIdentifier(n) => Some(&n.name),
            _ => None,
        }
    }

    /// Kinds that an identifier may be bound to.
    #[must_use]
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            AstNode::ContractDefinition(_)
                | AstNode::StructDefinition(_)
                | AstNode::EnumDefinition(_)
                | AstNode::EnumValue(_)
                | AstNode::EventDefinition(_)
                | AstNode::ErrorDefinition(_)
                | AstNode::UserDefinedValueTypeDefinition(_)
                | AstNode::FunctionDefinition(_)
                | AstNode::ModifierDefinition(_)
                | AstNode::VariableDeclaration(_)
                | AstNode::SourceUnit(_)
                | AstNode::YulTypedName(_)
                | AstNode::YulFunctionDefinition(_)
        )
    }

    /// Applies a binding arriving from `from`, which is either this node itself or
    /// one of its children, and reports whether the node took it.
    ///
    /// A direct binding (`from == self.id()`) stores the declaration on kinds that
    /// record one. A binding propagated from a child only fills the node's type,
    /// mapped through the kind's typing rule, and is declined by kinds whose type
    /// does not follow from that child.
    pub fn accept_reference(
        &mut self,
        from: NodeId,
        declaration: NodeId,
        type_description: Option<&TypeDescription>,
    ) -> bool {
        let direct = from == self.id();
        match self {
            AstNode::Identifier(n) => {
                if !direct || n.referenced_declaration.is_some() {
                    return false;
                }
                n.referenced_declaration = Some(declaration);
                fill(&mut n.type_description, type_description.cloned());
                true
            }
            AstNode::MemberAccess(n) => {
                if !direct {
                    return false;
                }
                n.referenced_declaration.get_or_insert(declaration);
                fill(&mut n.type_description, type_description.cloned());
                true
            }
            AstNode::UserDefinedTypeName(n) => {
                if !direct {
                    return false;
                }
                n.referenced_declaration.get_or_insert(declaration);
                fill(&mut n.type_description, type_description.cloned());
                true
            }
            AstNode::IdentifierPath(n) => {
                if !direct {
                    return false;
                }
                n.referenced_declaration.get_or_insert(declaration);
                true
            }
            AstNode::YulIdentifier(n) => {
                if !direct {
                    return false;
                }
                n.referenced_declaration.get_or_insert(declaration);
                true
            }
            AstNode::IndexAccess(n) => {
                if !direct {
                    return false;
                }
                fill(&mut n.type_description, type_description.cloned());
                true
            }
            AstNode::IndexRangeAccess(n) => {
                if !(direct || n.base_expression == Some(from)) {
                    return false;
                }
                fill(&mut n.type_description, type_description.cloned());
                true
            }
            AstNode::BinaryOperation(n) => {
                let follows_left = type_rules::binary_category(n.operator).result_follows_operand();
                let from_left = n.left_expression == Some(from);
                let from_right = n.right_expression == Some(from);
                if !(from_left || (from_right && !follows_left)) {
                    return false;
                }
                fill(
                    &mut n.type_description,
                    type_rules::binary(n.operator, type_description),
                );
                true
            }
            AstNode::UnaryPrefixOperation(n) => {
                fill(&mut n.type_description, type_rules::unary(n.operator, type_description));
                true
            }
            AstNode::UnarySuffixOperation(n) => {
                fill(&mut n.type_description, type_rules::unary(n.operator, type_description));
                true
            }
            AstNode::Assignment(n) => {
                if n.right_hand_side != Some(from) {
                    return false;
                }
                fill(&mut n.type_description, type_description.cloned());
                true
            }
            AstNode::Conditional(n) => {
                if n.true_expression != Some(from) {
                    return false;
                }
                fill(&mut n.type_description, type_description.cloned());
                true
            }
            _ => false,
        }
    }
}

fn fill(slot: &mut Option<TypeDescription>, value: Option<TypeDescription>) {
    if slot.is_none() {
        *slot = value;
    }
}

impl OperatorCategory {
    /// Whether an operation of this category has the type of its left operand.
    #[must_use]
    pub fn result_follows_operand(self) -> bool {
        !matches!(
            self,
            OperatorCategory::Comparison
                | OperatorCategory::Equality
                | OperatorCategory::And
                | OperatorCategory::Or
        )
    }
}

impl BinaryOperator {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Exp => "**",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::Sar => ">>>",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitXor => "^",
            BinaryOperator::BitOr => "|",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::Le => "<=",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }

    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Mod,
            "**" => BinaryOperator::Exp,
            "<<" => BinaryOperator::Shl,
            ">>" => BinaryOperator::Shr,
            ">>>" => BinaryOperator::Sar,
            "&" => BinaryOperator::BitAnd,
            "^" => BinaryOperator::BitXor,
            "|" => BinaryOperator::BitOr,
            "<" => BinaryOperator::Lt,
            ">" => BinaryOperator::Gt,
            "<=" => BinaryOperator::Le,
            ">=" => BinaryOperator::Ge,
            "==" => BinaryOperator::Eq,
            "!=" => BinaryOperator::Ne,
            "&&" => BinaryOperator::And,
            "||" => BinaryOperator::Or,
            _ => return None,
        })
    }
}

impl UnaryOperator {
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "!" => UnaryOperator::Not,
            "~" => UnaryOperator::BitNot,
            "-" => UnaryOperator::Neg,
            "+" => UnaryOperator::Plus,
            "delete" => UnaryOperator::Delete,
            "++" => UnaryOperator::Increment,
            "--" => UnaryOperator::Decrement,
            _ => return None,
        })
    }
}

impl AssignmentOperator {
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => AssignmentOperator::Assign,
            "+=" => AssignmentOperator::AddAssign,
            "-=" => AssignmentOperator::SubAssign,
            "*=" => AssignmentOperator::MulAssign,
            "/=" => AssignmentOperator::DivAssign,
            "%=" => AssignmentOperator::ModAssign,
            "|=" => AssignmentOperator::BitOrAssign,
            "&=" => AssignmentOperator::BitAndAssign,
            "^=" => AssignmentOperator::BitXorAssign,
            "<<=" => AssignmentOperator::ShlAssign,
            ">>=" => AssignmentOperator::ShrAssign,
            ">>>=" => AssignmentOperator::SarAssign,
            _ => return None,
        })
    }
}

impl VariableDeclarationStatement {
    /// Declared variables, skipping the holes of `(, x) = ...` tuples.
    pub fn declared(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.declarations.iter().flatten().copied()
    }
}

impl Visibility {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Internal => "internal",
            Visibility::Public => "public",
            Visibility::Private => "private",
            Visibility::External => "external",
        }
    }

    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "internal" => Some(Visibility::Internal),
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            "external" => Some(Visibility::External),
            _ => None,
        }
    }
}

impl StateMutability {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StateMutability::NonPayable => "nonpayable",
            StateMutability::Payable => "payable",
            StateMutability::View => "view",
            StateMutability::Pure => "pure",
        }
    }

    /// Parses a mutability keyword. `constant` is the pre-0.5 spelling of `view`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "payable" => Some(StateMutability::Payable),
            "view" | "constant" => Some(StateMutability::View),
            "pure" => Some(StateMutability::Pure),
            "nonpayable" => Some(StateMutability::NonPayable),
            _ => None,
        }
    }
}

impl StorageLocation {
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "memory" => Some(StorageLocation::Memory),
            "storage" => Some(StorageLocation::Storage),
            "calldata" => Some(StorageLocation::Calldata),
            _ => None,
        }
    }
}

impl ContractKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContractKind::Contract => "contract",
            ContractKind::Interface => "interface",
            ContractKind::Library => "library",
        }
    }
}
