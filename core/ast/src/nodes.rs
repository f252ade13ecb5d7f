use core::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Identity of a node inside one [`Tree`](crate::tree::Tree).
pub type NodeId = i64;

/// Source span of a node plus the identity of the node that owns it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Src {
    pub line: u32,
    pub column: u32,
    pub start: u32,
    pub end: u32,
    pub length: u32,
    pub parent_id: Option<NodeId>,
}

impl Src {
    #[must_use]
    pub fn new(line: u32, column: u32, start: u32, end: u32, parent_id: Option<NodeId>) -> Self {
        Self {
            line,
            column,
            start,
            end,
            length: end.saturating_sub(start) + 1,
            parent_id,
        }
    }
}

impl Display for Src {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Best-effort type of a node: a display string and a canonical identifier.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TypeDescription {
    pub type_string: String,
    pub type_identifier: String,
}

impl TypeDescription {
    #[must_use]
    pub fn new(type_string: impl Into<String>, type_identifier: impl Into<String>) -> Self {
        Self {
            type_string: type_string.into(),
            type_identifier: type_identifier.into(),
        }
    }

    #[must_use]
    pub fn is_magic(&self) -> bool {
        self.type_identifier.starts_with("t_magic_")
    }
}

impl Display for TypeDescription {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.type_string, self.type_identifier)
    }
}

/// A name made visible to importers of a source unit.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ExportedSymbol {
    pub id: NodeId,
    pub name: String,
    pub absolute_path: String,
}

/// One `{foreign as local}` entry of an import directive.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SymbolAlias {
    pub foreign: String,
    pub local: Option<String>,
    pub referenced_declaration: Option<NodeId>,
}

impl SymbolAlias {
    /// The name the symbol is known by inside the importing unit.
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.local.as_deref().unwrap_or(&self.foreign)
    }
}

#[macro_export]
macro_rules! ast_node {
    (
        $(#[$outer:meta])*
        $struct_vis:vis struct $name:ident {
            $(
                $(#[$field_attr:meta])*
                $field_vis:vis $field_name:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Clone, PartialEq, Debug, ::serde::Serialize, ::serde::Deserialize)]
        $struct_vis struct $name {
            pub id: $crate::nodes::NodeId,
            pub src: $crate::nodes::Src,
            $(
                $(#[$field_attr])*
                $field_vis $field_name : $field_ty,
            )*
        }
    };
}

macro_rules! ast_nodes {
    (
        $(
            $(#[$outer:meta])*
            $struct_vis:vis struct $name:ident { $($fields:tt)* }
        )+
    ) => {
        $(
            ast_node! {
                $(#[$outer])*
                $struct_vis struct $name { $($fields)* }
            }
        )+
    };
}

/// Declares the closed set of node kinds: the `NodeType` discriminant and the
/// `AstNode` sum type whose variants wrap the payload struct of the same name.
macro_rules! ast_node_kinds {
    (
        $( $variant:ident => $tag:literal ),+ $(,)?
    ) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub enum NodeType {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl NodeType {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( NodeType::$variant => $tag, )+
                }
            }

            /// Name of the payload message, used in typed-struct URLs.
            #[must_use]
            pub fn message_name(self) -> &'static str {
                match self {
                    $( NodeType::$variant => stringify!($variant), )+
                }
            }

            #[must_use]
            pub fn from_message_name(name: &str) -> Option<NodeType> {
                match name {
                    $( stringify!($variant) => Some(NodeType::$variant), )+
                    _ => None,
                }
            }
        }

        impl Display for NodeType {
            fn fmt(&self, f: &mut Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
        #[serde(tag = "node_type")]
        pub enum AstNode {
            $(
                #[serde(rename = $tag)]
                $variant($variant),
            )+
        }

        impl AstNode {
            #[must_use]
            pub fn id(&self) -> NodeId {
                match self {
                    $( AstNode::$variant(node) => node.id, )+
                }
            }

            #[must_use]
            pub fn src(&self) -> &Src {
                match self {
                    $( AstNode::$variant(node) => &node.src, )+
                }
            }

            pub fn src_mut(&mut self) -> &mut Src {
                match self {
                    $( AstNode::$variant(node) => &mut node.src, )+
                }
            }

            #[must_use]
            pub fn node_type(&self) -> NodeType {
                match self {
                    $( AstNode::$variant(_) => NodeType::$variant, )+
                }
            }
        }

        $(
            impl From<$variant> for AstNode {
                fn from(node: $variant) -> Self {
                    AstNode::$variant(node)
                }
            }
        )+
    };
}

ast_node_kinds! {
    SourceUnit => "SOURCE_UNIT",
    PragmaDirective => "PRAGMA_DIRECTIVE",
    ImportDirective => "IMPORT_DIRECTIVE",
    ContractDefinition => "CONTRACT_DEFINITION",
    InheritanceSpecifier => "INHERITANCE_SPECIFIER",
    UsingForDirective => "USING_FOR_DIRECTIVE",
    StructDefinition => "STRUCT_DEFINITION",
    EnumDefinition => "ENUM_DEFINITION",
    EnumValue => "ENUM_VALUE",
    EventDefinition => "EVENT_DEFINITION",
    ErrorDefinition => "ERROR_DEFINITION",
    UserDefinedValueTypeDefinition => "USER_DEFINED_VALUE_TYPE_DEFINITION",
    FunctionDefinition => "FUNCTION_DEFINITION",
    ModifierDefinition => "MODIFIER_DEFINITION",
    ModifierInvocation => "MODIFIER_INVOCATION",
    OverrideSpecifier => "OVERRIDE_SPECIFIER",
    ParameterList => "PARAMETER_LIST",
    VariableDeclaration => "VARIABLE_DECLARATION",
    ElementaryTypeName => "ELEMENTARY_TYPE_NAME",
    UserDefinedTypeName => "USER_DEFINED_TYPE_NAME",
    IdentifierPath => "IDENTIFIER_PATH",
    Mapping => "MAPPING_TYPE_NAME",
    ArrayTypeName => "ARRAY_TYPE_NAME",
    FunctionTypeName => "FUNCTION_TYPE_NAME",
    Block => "BLOCK",
    UncheckedBlock => "UNCHECKED_BLOCK",
    ExpressionStatement => "EXPRESSION_STATEMENT",
    VariableDeclarationStatement => "VARIABLE_DECLARATION_STATEMENT",
    IfStatement => "IF_STATEMENT",
    ForStatement => "FOR_STATEMENT",
    WhileStatement => "WHILE_STATEMENT",
    DoWhileStatement => "DO_WHILE_STATEMENT",
    Continue => "CONTINUE",
    Break => "BREAK",
    Return => "RETURN_STATEMENT",
    EmitStatement => "EMIT_STATEMENT",
    RevertStatement => "REVERT_STATEMENT",
    TryStatement => "TRY_STATEMENT",
    TryCatchClause => "TRY_CATCH_CLAUSE",
    PlaceholderStatement => "PLACEHOLDER_STATEMENT",
    InlineAssembly => "INLINE_ASSEMBLY",
    Identifier => "IDENTIFIER",
    Literal => "LITERAL",
    BinaryOperation => "BINARY_OPERATION",
    UnaryPrefixOperation => "UNARY_PREFIX_OPERATION",
    UnarySuffixOperation => "UNARY_SUFFIX_OPERATION",
    Assignment => "ASSIGNMENT",
    Conditional => "CONDITIONAL_EXPRESSION",
    FunctionCall => "FUNCTION_CALL",
    FunctionCallOptions => "FUNCTION_CALL_OPTIONS",
    MemberAccess => "MEMBER_ACCESS",
    IndexAccess => "INDEX_ACCESS",
    IndexRangeAccess => "INDEX_RANGE_ACCESS",
    TupleExpression => "TUPLE_EXPRESSION",
    NewExpression => "NEW_EXPRESSION",
    MetaType => "META_TYPE",
    PayableConversion => "PAYABLE_CONVERSION",
    ElementaryTypeNameExpression => "ELEMENTARY_TYPE_NAME_EXPRESSION",
    YulBlock => "YUL_BLOCK",
    YulVariableDeclaration => "YUL_VARIABLE_DECLARATION",
    YulTypedName => "YUL_TYPED_NAME",
    YulAssignment => "YUL_ASSIGNMENT",
    YulFunctionCall => "YUL_FUNCTION_CALL",
    YulExpressionStatement => "YUL_EXPRESSION_STATEMENT",
    YulIf => "YUL_IF",
    YulForLoop => "YUL_FOR_LOOP",
    YulSwitch => "YUL_SWITCH",
    YulCase => "YUL_CASE",
    YulFunctionDefinition => "YUL_FUNCTION_DEFINITION",
    YulLeave => "YUL_LEAVE",
    YulBreak => "YUL_BREAK",
    YulContinue => "YUL_CONTINUE",
    YulIdentifier => "YUL_IDENTIFIER",
    YulLiteral => "YUL_LITERAL",
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractKind {
    #[default]
    Contract,
    Interface,
    Library,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    #[default]
    Function,
    Constructor,
    Fallback,
    Receive,
    FreeFunction,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Internal,
    Public,
    Private,
    External,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateMutability {
    #[default]
    NonPayable,
    Payable,
    View,
    Pure,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    #[default]
    Mutable,
    Immutable,
    Constant,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageLocation {
    #[default]
    Default,
    Memory,
    Storage,
    Calldata,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Number,
    Bool,
    String,
    HexString,
    UnicodeString,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YulLiteralKind {
    Number,
    String,
    Bool,
    HexString,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionCallKind {
    FunctionCall,
    TypeConversion,
    StructConstructorCall,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierInvocationKind {
    ModifierInvocation,
    BaseConstructorSpecifier,
}

/// Grouping of binary operators by the parse rule that produces them.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperatorCategory {
    Additive,
    Multiplicative,
    Exponent,
    Shift,
    BitAnd,
    BitXor,
    BitOr,
    Comparison,
    Equality,
    And,
    Or,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Mod,
    #[serde(rename = "**")]
    Exp,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = ">>>")]
    Sar,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum UnaryOperator {
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "~")]
    BitNot,
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "delete")]
    Delete,
    #[serde(rename = "++")]
    Increment,
    #[serde(rename = "--")]
    Decrement,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AssignmentOperator {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    AddAssign,
    #[serde(rename = "-=")]
    SubAssign,
    #[serde(rename = "*=")]
    MulAssign,
    #[serde(rename = "/=")]
    DivAssign,
    #[serde(rename = "%=")]
    ModAssign,
    #[serde(rename = "|=")]
    BitOrAssign,
    #[serde(rename = "&=")]
    BitAndAssign,
    #[serde(rename = "^=")]
    BitXorAssign,
    #[serde(rename = "<<=")]
    ShlAssign,
    #[serde(rename = ">>=")]
    ShrAssign,
    #[serde(rename = ">>>=")]
    SarAssign,
}

ast_nodes! {

    pub struct SourceUnit {
        pub absolute_path: String,
        pub license: Option<String>,
        pub exported_symbols: Vec<ExportedSymbol>,
        pub nodes: Vec<NodeId>,
    }

    pub struct PragmaDirective {
        pub literals: Vec<String>,
        pub text: String,
    }

    pub struct ImportDirective {
        pub file: String,
        pub absolute_path: String,
        pub unit_alias: Option<String>,
        pub symbol_aliases: Vec<SymbolAlias>,
        pub source_unit: Option<NodeId>,
    }

    pub struct ContractDefinition {
        pub name: String,
        pub kind: ContractKind,
        pub is_abstract: bool,
        pub base_contracts: Vec<NodeId>,
        pub linearized_base_contracts: Vec<NodeId>,
        pub contract_dependencies: Vec<NodeId>,
        pub nodes: Vec<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct InheritanceSpecifier {
        pub base_name: NodeId,
        pub arguments: Vec<NodeId>,
    }

    pub struct UsingForDirective {
        pub library_name: Option<NodeId>,
        pub function_list: Vec<NodeId>,
        pub type_name: Option<NodeId>,
        pub is_global: bool,
    }

    pub struct StructDefinition {
        pub name: String,
        pub canonical_name: String,
        pub visibility: Visibility,
        pub members: Vec<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct EnumDefinition {
        pub name: String,
        pub canonical_name: String,
        pub members: Vec<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct EnumValue {
        pub name: String,
    }

    pub struct EventDefinition {
        pub name: String,
        pub anonymous: bool,
        pub parameters: NodeId,
        pub type_description: Option<TypeDescription>,
    }

    pub struct ErrorDefinition {
        pub name: String,
        pub parameters: NodeId,
        pub type_description: Option<TypeDescription>,
    }

    pub struct UserDefinedValueTypeDefinition {
        pub name: String,
        pub canonical_name: String,
        pub underlying_type: NodeId,
        pub type_description: Option<TypeDescription>,
    }

    pub struct FunctionDefinition {
        pub name: String,
        pub kind: FunctionKind,
        pub visibility: Visibility,
        pub state_mutability: StateMutability,
        pub is_virtual: bool,
        pub implemented: bool,
        pub modifiers: Vec<NodeId>,
        pub overrides: Option<NodeId>,
        pub parameters: NodeId,
        pub return_parameters: NodeId,
        pub body: Option<NodeId>,
        pub scope: NodeId,
        pub type_description: Option<TypeDescription>,
    }

    pub struct ModifierDefinition {
        pub name: String,
        pub visibility: Visibility,
        pub is_virtual: bool,
        pub overrides: Option<NodeId>,
        pub parameters: NodeId,
        pub body: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct ModifierInvocation {
        pub modifier_name: NodeId,
        pub arguments: Vec<NodeId>,
        pub kind: ModifierInvocationKind,
    }

    pub struct OverrideSpecifier {
        pub overrides: Vec<NodeId>,
    }

    pub struct ParameterList {
        pub parameters: Vec<NodeId>,
    }

    pub struct VariableDeclaration {
        pub name: String,
        pub type_name: Option<NodeId>,
        pub storage_location: StorageLocation,
        pub visibility: Visibility,
        pub mutability: Mutability,
        pub state_variable: bool,
        pub constant: bool,
        pub indexed: bool,
        pub value: Option<NodeId>,
        pub overrides: Option<NodeId>,
        pub scope: NodeId,
        pub type_description: Option<TypeDescription>,
    }

    pub struct ElementaryTypeName {
        pub name: String,
        pub state_mutability: Option<StateMutability>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct UserDefinedTypeName {
        pub name: String,
        pub referenced_declaration: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct IdentifierPath {
        pub name: String,
        pub referenced_declaration: Option<NodeId>,
    }

    pub struct Mapping {
        pub key_type: NodeId,
        pub key_name: Option<String>,
        pub value_type: NodeId,
        pub value_name: Option<String>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct ArrayTypeName {
        pub base_type: NodeId,
        pub length: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct FunctionTypeName {
        pub parameter_types: NodeId,
        pub return_parameter_types: NodeId,
        pub visibility: Visibility,
        pub state_mutability: StateMutability,
        pub type_description: Option<TypeDescription>,
    }

    pub struct Block {
        pub statements: Vec<NodeId>,
    }

    pub struct UncheckedBlock {
        pub statements: Vec<NodeId>,
    }

    pub struct ExpressionStatement {
        pub expression: Option<NodeId>,
    }

    pub struct VariableDeclarationStatement {
        pub declarations: Vec<Option<NodeId>>,
        pub initial_value: Option<NodeId>,
    }

    pub struct IfStatement {
        pub condition: Option<NodeId>,
        pub true_body: Option<NodeId>,
        pub false_body: Option<NodeId>,
    }

    pub struct ForStatement {
        pub initialization_expression: Option<NodeId>,
        pub condition: Option<NodeId>,
        pub loop_expression: Option<NodeId>,
        pub body: Option<NodeId>,
    }

    pub struct WhileStatement {
        pub condition: Option<NodeId>,
        pub body: Option<NodeId>,
    }

    pub struct DoWhileStatement {
        pub condition: Option<NodeId>,
        pub body: Option<NodeId>,
    }

    pub struct Continue {}

    pub struct Break {}

    pub struct Return {
        pub expression: Option<NodeId>,
        pub function_return_parameters: Option<NodeId>,
    }

    pub struct EmitStatement {
        pub event_call: Option<NodeId>,
    }

    pub struct RevertStatement {
        pub error_call: Option<NodeId>,
    }

    pub struct TryStatement {
        pub external_call: Option<NodeId>,
        pub return_parameters: Option<NodeId>,
        pub block: Option<NodeId>,
        pub clauses: Vec<NodeId>,
    }

    pub struct TryCatchClause {
        pub error_name: String,
        pub parameters: Option<NodeId>,
        pub block: Option<NodeId>,
    }

    pub struct PlaceholderStatement {}

    pub struct InlineAssembly {
        pub flags: Vec<String>,
        pub block: NodeId,
    }

    pub struct Identifier {
        pub name: String,
        pub referenced_declaration: Option<NodeId>,
        pub overloaded_declarations: Vec<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct Literal {
        pub kind: LiteralKind,
        pub value: String,
        pub hex_value: String,
        pub subdenomination: Option<String>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct BinaryOperation {
        pub operator: BinaryOperator,
        pub left_expression: Option<NodeId>,
        pub right_expression: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct UnaryPrefixOperation {
        pub operator: UnaryOperator,
        pub sub_expression: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct UnarySuffixOperation {
        pub operator: UnaryOperator,
        pub sub_expression: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct Assignment {
        pub operator: AssignmentOperator,
        pub left_hand_side: Option<NodeId>,
        pub right_hand_side: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct Conditional {
        pub condition: Option<NodeId>,
        pub true_expression: Option<NodeId>,
        pub false_expression: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct FunctionCall {
        pub kind: FunctionCallKind,
        pub expression: Option<NodeId>,
        pub arguments: Vec<NodeId>,
        pub names: Vec<String>,
        pub referenced_declaration: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct FunctionCallOptions {
        pub expression: Option<NodeId>,
        pub options: Vec<NodeId>,
        pub names: Vec<String>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct MemberAccess {
        pub expression: Option<NodeId>,
        pub member_name: String,
        pub referenced_declaration: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct IndexAccess {
        pub base_expression: Option<NodeId>,
        pub index_expression: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct IndexRangeAccess {
        pub base_expression: Option<NodeId>,
        pub start_expression: Option<NodeId>,
        pub end_expression: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct TupleExpression {
        pub components: Vec<Option<NodeId>>,
        pub is_inline_array: bool,
        pub type_description: Option<TypeDescription>,
    }

    pub struct NewExpression {
        pub type_name: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct MetaType {
        pub type_name: Option<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct PayableConversion {
        pub arguments: Vec<NodeId>,
        pub type_description: Option<TypeDescription>,
    }

    pub struct ElementaryTypeNameExpression {
        pub type_name: NodeId,
        pub type_description: Option<TypeDescription>,
    }

    pub struct YulBlock {
        pub statements: Vec<NodeId>,
    }

    pub struct YulVariableDeclaration {
        pub variables: Vec<NodeId>,
        pub value: Option<NodeId>,
    }

    pub struct YulTypedName {
        pub name: String,
    }

    pub struct YulAssignment {
        pub variable_names: Vec<NodeId>,
        pub value: Option<NodeId>,
    }

    pub struct YulFunctionCall {
        pub function_name: NodeId,
        pub arguments: Vec<NodeId>,
    }

    pub struct YulExpressionStatement {
        pub expression: NodeId,
    }

    pub struct YulIf {
        pub condition: Option<NodeId>,
        pub body: Option<NodeId>,
    }

    pub struct YulForLoop {
        pub pre: Option<NodeId>,
        pub condition: Option<NodeId>,
        pub post: Option<NodeId>,
        pub body: Option<NodeId>,
    }

    pub struct YulSwitch {
        pub expression: Option<NodeId>,
        pub cases: Vec<NodeId>,
    }

    /// A `case` arm; `value` is absent for `default`.
    pub struct YulCase {
        pub value: Option<NodeId>,
        pub body: Option<NodeId>,
    }

    pub struct YulFunctionDefinition {
        pub name: String,
        pub parameters: Vec<NodeId>,
        pub return_variables: Vec<NodeId>,
        pub body: Option<NodeId>,
    }

    pub struct YulLeave {}

    pub struct YulBreak {}

    pub struct YulContinue {}

    pub struct YulIdentifier {
        pub name: String,
        pub builtin: bool,
        pub referenced_declaration: Option<NodeId>,
    }

    pub struct YulLiteral {
        pub kind: YulLiteralKind,
        pub value: String,
        pub hex_value: String,
    }

}
