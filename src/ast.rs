//! ESTree node types.
//!
//! Every node struct serializes with a leading `type` tag followed by its
//! flattened [`Span`] (`start`, `end`, and the optional `range`/`loc`).
//! Container enums such as [`Expression`] are untagged: each variant's node
//! carries its own tag.

use serde::{Serialize, Serializer};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LineColumn {
    pub line: u32,
    pub column: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub start: LineColumn,
    pub end: LineColumn,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[usize; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
}

macro_rules! enum_span {
    ($name:ident { $($variant:ident),* $(,)? }) => {
        impl $name {
            pub fn span(&self) -> &Span {
                match self {
                    $($name::$variant(node) => node.span(),)*
                }
            }
        }
    };
}

macro_rules! node_span {
    ($($name:ident),* $(,)?) => {
        $(impl $name {
            pub fn span(&self) -> &Span {
                &self.span
            }
        })*
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Script,
    Module,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub struct Program {
    #[serde(flatten)]
    pub span: Span,
    pub source_type: SourceType,
    pub body: Vec<Statement>,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
#[allow(clippy::large_enum_variant)]
pub enum Statement {
    Expression(ExpressionStatement),
    Block(BlockStatement),
    Empty(EmptyStatement),
    Debugger(DebuggerStatement),
    With(WithStatement),
    Return(ReturnStatement),
    Labeled(LabeledStatement),
    Break(BreakStatement),
    Continue(ContinueStatement),
    If(IfStatement),
    Switch(SwitchStatement),
    Throw(ThrowStatement),
    Try(TryStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    For(ForStatement),
    ForIn(ForInStatement),
    ForOf(ForOfStatement),
    Function(Function),
    Variable(VariableDeclaration),
    Class(Class),
    Import(ImportDeclaration),
    ExportNamed(ExportNamedDeclaration),
    ExportDefault(ExportDefaultDeclaration),
    ExportAll(ExportAllDeclaration),
}

enum_span!(Statement {
    Expression, Block, Empty, Debugger, With, Return, Labeled, Break, Continue, If, Switch, Throw,
    Try, While, DoWhile, For, ForIn, ForOf, Function, Variable, Class, Import, ExportNamed,
    ExportDefault, ExportAll,
});

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ExpressionStatement {
    #[serde(flatten)]
    pub span: Span,
    pub expression: Box<Expression>,
    /// Raw text of a directive prologue entry, without quotes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directive: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct BlockStatement {
    #[serde(flatten)]
    pub span: Span,
    pub body: Vec<Statement>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct EmptyStatement {
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct DebuggerStatement {
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct WithStatement {
    #[serde(flatten)]
    pub span: Span,
    pub object: Box<Expression>,
    pub body: Box<Statement>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ReturnStatement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Option<Box<Expression>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct LabeledStatement {
    #[serde(flatten)]
    pub span: Span,
    pub label: Identifier,
    pub body: Box<Statement>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct BreakStatement {
    #[serde(flatten)]
    pub span: Span,
    pub label: Option<Identifier>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ContinueStatement {
    #[serde(flatten)]
    pub span: Span,
    pub label: Option<Identifier>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct IfStatement {
    #[serde(flatten)]
    pub span: Span,
    pub test: Box<Expression>,
    pub consequent: Box<Statement>,
    pub alternate: Option<Box<Statement>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct SwitchStatement {
    #[serde(flatten)]
    pub span: Span,
    pub discriminant: Box<Expression>,
    pub cases: Vec<SwitchCase>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct SwitchCase {
    #[serde(flatten)]
    pub span: Span,
    pub test: Option<Expression>,
    pub consequent: Vec<Statement>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ThrowStatement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Box<Expression>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct TryStatement {
    #[serde(flatten)]
    pub span: Span,
    pub block: BlockStatement,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<BlockStatement>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct CatchClause {
    #[serde(flatten)]
    pub span: Span,
    pub param: Option<Pattern>,
    pub body: BlockStatement,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct WhileStatement {
    #[serde(flatten)]
    pub span: Span,
    pub test: Box<Expression>,
    pub body: Box<Statement>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct DoWhileStatement {
    #[serde(flatten)]
    pub span: Span,
    pub body: Box<Statement>,
    pub test: Box<Expression>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ForStatement {
    #[serde(flatten)]
    pub span: Span,
    pub init: Option<ForInit>,
    pub test: Option<Box<Expression>>,
    pub update: Option<Box<Expression>>,
    pub body: Box<Statement>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ForInit {
    Variable(VariableDeclaration),
    Expression(Box<Expression>),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ForInStatement {
    #[serde(flatten)]
    pub span: Span,
    pub left: ForTarget,
    pub right: Box<Expression>,
    pub body: Box<Statement>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ForOfStatement {
    #[serde(flatten)]
    pub span: Span,
    #[serde(rename = "await")]
    pub is_await: bool,
    pub left: ForTarget,
    pub right: Box<Expression>,
    pub body: Box<Statement>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ForTarget {
    Variable(VariableDeclaration),
    Pattern(Pattern),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct VariableDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub declarations: Vec<VariableDeclarator>,
    pub kind: VariableKind,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct VariableDeclarator {
    #[serde(flatten)]
    pub span: Span,
    pub id: Pattern,
    pub init: Option<Box<Expression>>,
}

// ---------------------------------------------------------------------------
// Functions and classes
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FunctionType {
    FunctionDeclaration,
    FunctionExpression,
}

/// A function declaration or expression. Methods, getters and setters use
/// the expression form as their `value`.
#[derive(Clone, Debug, Serialize)]
pub struct Function {
    #[serde(rename = "type")]
    pub kind: FunctionType,
    #[serde(flatten)]
    pub span: Span,
    pub id: Option<Identifier>,
    pub generator: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub params: Vec<Pattern>,
    pub body: BlockStatement,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ArrowFunctionExpression {
    #[serde(flatten)]
    pub span: Span,
    pub id: Option<Identifier>,
    /// True when the body is a bare expression rather than a block.
    pub expression: bool,
    pub generator: bool,
    #[serde(rename = "async")]
    pub is_async: bool,
    pub params: Vec<Pattern>,
    pub body: ArrowBody,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ArrowBody {
    Block(BlockStatement),
    Expression(Box<Expression>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ClassType {
    ClassDeclaration,
    ClassExpression,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    #[serde(rename = "type")]
    pub kind: ClassType,
    #[serde(flatten)]
    pub span: Span,
    pub id: Option<Identifier>,
    pub super_class: Option<Box<Expression>>,
    pub body: ClassBody,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ClassBody {
    #[serde(flatten)]
    pub span: Span,
    pub body: Vec<ClassElement>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ClassElement {
    Method(MethodDefinition),
    Property(PropertyDefinition),
    StaticBlock(StaticBlock),
}

enum_span!(ClassElement { Method, Property, StaticBlock });

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    Constructor,
    Method,
    Get,
    Set,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct MethodDefinition {
    #[serde(flatten)]
    pub span: Span,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub computed: bool,
    pub key: PropertyKey,
    pub kind: MethodKind,
    pub value: Function,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct PropertyDefinition {
    #[serde(flatten)]
    pub span: Span,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub computed: bool,
    pub key: PropertyKey,
    pub value: Option<Box<Expression>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct StaticBlock {
    #[serde(flatten)]
    pub span: Span,
    pub body: Vec<Statement>,
}

/// Key of a property, method or field. Non-computed keys are only ever
/// identifiers, literals or private names.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum PropertyKey {
    Identifier(Identifier),
    Literal(Literal),
    PrivateIdentifier(PrivateIdentifier),
    Computed(Box<Expression>),
}

enum_span!(PropertyKey { Identifier, Literal, PrivateIdentifier, Computed });

impl PropertyKey {
    pub fn is_computed(&self) -> bool {
        matches!(self, PropertyKey::Computed(_))
    }

    /// The property name of a non-computed, non-private key.
    pub fn static_name(&self) -> Option<String> {
        match self {
            PropertyKey::Identifier(id) => Some(id.name.clone()),
            PropertyKey::Literal(lit) => match &lit.value {
                LiteralValue::String(s) => Some(s.clone()),
                LiteralValue::Number(n) => Some(number_to_string(*n)),
                LiteralValue::BigInt => lit.bigint.clone(),
                _ => None,
            },
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Expression {
    Identifier(Identifier),
    PrivateIdentifier(PrivateIdentifier),
    Literal(Literal),
    This(ThisExpression),
    Super(Super),
    Array(ArrayExpression),
    Object(ObjectExpression),
    Function(Function),
    Arrow(ArrowFunctionExpression),
    Class(Class),
    Template(TemplateLiteral),
    TaggedTemplate(TaggedTemplateExpression),
    Unary(UnaryExpression),
    Update(UpdateExpression),
    Binary(BinaryExpression),
    Logical(LogicalExpression),
    Assignment(AssignmentExpression),
    Conditional(ConditionalExpression),
    Call(CallExpression),
    New(NewExpression),
    Member(MemberExpression),
    Chain(ChainExpression),
    Sequence(SequenceExpression),
    Yield(YieldExpression),
    Await(AwaitExpression),
    Meta(MetaProperty),
    Import(ImportExpression),
}

enum_span!(Expression {
    Identifier, PrivateIdentifier, Literal, This, Super, Array, Object, Function, Arrow, Class,
    Template, TaggedTemplate, Unary, Update, Binary, Logical, Assignment, Conditional, Call, New,
    Member, Chain, Sequence, Yield, Await, Meta, Import,
});

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct Identifier {
    #[serde(flatten)]
    pub span: Span,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub struct PrivateIdentifier {
    #[serde(flatten)]
    pub span: Span,
    pub name: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct Literal {
    #[serde(flatten)]
    pub span: Span,
    pub value: LiteralValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<RegExpValue>,
    /// Decimal digits of a BigInt literal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bigint: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    /// Serialized as `null`; the pattern lives in `regex`.
    RegExp,
    /// Serialized as `null`; the digits live in `bigint`.
    BigInt,
}

impl Serialize for LiteralValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LiteralValue::Null | LiteralValue::RegExp | LiteralValue::BigInt => serializer.serialize_unit(),
            LiteralValue::Boolean(b) => serializer.serialize_bool(*b),
            // Integral values print without a fraction, as far as u64 reaches.
            LiteralValue::Number(n) if n.fract() == 0.0 && *n >= 0.0 && *n < 18_446_744_073_709_551_616.0 => {
                serializer.serialize_u64(*n as u64)
            }
            LiteralValue::Number(n) => serializer.serialize_f64(*n),
            LiteralValue::String(s) => serializer.serialize_str(s),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RegExpValue {
    pub pattern: String,
    pub flags: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ThisExpression {
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct Super {
    #[serde(flatten)]
    pub span: Span,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ArrayExpression {
    #[serde(flatten)]
    pub span: Span,
    pub elements: Vec<Option<ExpressionOrSpread>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ExpressionOrSpread {
    Expression(Expression),
    Spread(SpreadElement),
}

enum_span!(ExpressionOrSpread { Expression, Spread });

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct SpreadElement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Box<Expression>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ObjectExpression {
    #[serde(flatten)]
    pub span: Span,
    pub properties: Vec<ObjectProperty>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ObjectProperty {
    Property(Property),
    Spread(SpreadElement),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct Property {
    #[serde(flatten)]
    pub span: Span,
    pub method: bool,
    pub shorthand: bool,
    pub computed: bool,
    pub key: PropertyKey,
    pub value: Box<Expression>,
    pub kind: PropertyKind,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct TemplateLiteral {
    #[serde(flatten)]
    pub span: Span,
    pub expressions: Vec<Expression>,
    pub quasis: Vec<TemplateElement>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct TemplateElement {
    #[serde(flatten)]
    pub span: Span,
    pub value: TemplateValue,
    pub tail: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TemplateValue {
    pub raw: String,
    /// None when the chunk holds an escape that is only legal in tagged
    /// templates.
    pub cooked: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct TaggedTemplateExpression {
    #[serde(flatten)]
    pub span: Span,
    pub tag: Box<Expression>,
    pub quasi: TemplateLiteral,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UnaryOperator {
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "~")]
    BitNot,
    #[serde(rename = "typeof")]
    Typeof,
    #[serde(rename = "void")]
    Void,
    #[serde(rename = "delete")]
    Delete,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct UnaryExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: UnaryOperator,
    pub prefix: bool,
    pub argument: Box<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum UpdateOperator {
    #[serde(rename = "++")]
    Increment,
    #[serde(rename = "--")]
    Decrement,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct UpdateExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: UpdateOperator,
    pub prefix: bool,
    pub argument: Box<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "===")]
    StrictEqual,
    #[serde(rename = "!==")]
    StrictNotEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanEqual,
    #[serde(rename = "<<")]
    LeftShift,
    #[serde(rename = ">>")]
    RightShift,
    #[serde(rename = ">>>")]
    UnsignedRightShift,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Remainder,
    #[serde(rename = "**")]
    Exponent,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "instanceof")]
    Instanceof,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct BinaryExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LogicalOperator {
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "??")]
    Nullish,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct LogicalExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: LogicalOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AssignmentOperator {
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    Add,
    #[serde(rename = "-=")]
    Subtract,
    #[serde(rename = "*=")]
    Multiply,
    #[serde(rename = "/=")]
    Divide,
    #[serde(rename = "%=")]
    Remainder,
    #[serde(rename = "**=")]
    Exponent,
    #[serde(rename = "<<=")]
    LeftShift,
    #[serde(rename = ">>=")]
    RightShift,
    #[serde(rename = ">>>=")]
    UnsignedRightShift,
    #[serde(rename = "|=")]
    BitOr,
    #[serde(rename = "^=")]
    BitXor,
    #[serde(rename = "&=")]
    BitAnd,
    #[serde(rename = "&&=")]
    And,
    #[serde(rename = "||=")]
    Or,
    #[serde(rename = "??=")]
    Nullish,
}

impl AssignmentOperator {
    /// Logical assignments, which only accept simple targets.
    pub fn is_logical(self) -> bool {
        matches!(
            self,
            AssignmentOperator::And | AssignmentOperator::Or | AssignmentOperator::Nullish
        )
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct AssignmentExpression {
    #[serde(flatten)]
    pub span: Span,
    pub operator: AssignmentOperator,
    pub left: Box<Pattern>,
    pub right: Box<Expression>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ConditionalExpression {
    #[serde(flatten)]
    pub span: Span,
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct CallExpression {
    #[serde(flatten)]
    pub span: Span,
    pub callee: Box<Expression>,
    pub arguments: Vec<ExpressionOrSpread>,
    pub optional: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct NewExpression {
    #[serde(flatten)]
    pub span: Span,
    pub callee: Box<Expression>,
    pub arguments: Vec<ExpressionOrSpread>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct MemberExpression {
    #[serde(flatten)]
    pub span: Span,
    pub object: Box<Expression>,
    pub property: Box<Expression>,
    pub computed: bool,
    pub optional: bool,
}

/// Wraps an optional chain (`a?.b.c`) as a whole.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ChainExpression {
    #[serde(flatten)]
    pub span: Span,
    pub expression: Box<Expression>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct SequenceExpression {
    #[serde(flatten)]
    pub span: Span,
    pub expressions: Vec<Expression>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct YieldExpression {
    #[serde(flatten)]
    pub span: Span,
    pub delegate: bool,
    pub argument: Option<Box<Expression>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct AwaitExpression {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Box<Expression>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct MetaProperty {
    #[serde(flatten)]
    pub span: Span,
    pub meta: Identifier,
    pub property: Identifier,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ImportExpression {
    #[serde(flatten)]
    pub span: Span,
    pub source: Box<Expression>,
    pub options: Option<Box<Expression>>,
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// Binding and assignment targets. `Member` only appears in assignment
/// targets, never in declarations or parameters.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Pattern {
    Identifier(Identifier),
    Member(MemberExpression),
    Object(ObjectPattern),
    Array(ArrayPattern),
    Assignment(AssignmentPattern),
    Rest(RestElement),
}

enum_span!(Pattern { Identifier, Member, Object, Array, Assignment, Rest });

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ObjectPattern {
    #[serde(flatten)]
    pub span: Span,
    pub properties: Vec<ObjectPatternProperty>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ObjectPatternProperty {
    Property(AssignmentProperty),
    Rest(RestElement),
}

/// A property inside an object pattern. Serialized as `Property` with
/// `kind: "init"`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename = "Property")]
pub struct AssignmentProperty {
    #[serde(flatten)]
    pub span: Span,
    pub method: bool,
    pub shorthand: bool,
    pub computed: bool,
    pub key: PropertyKey,
    pub value: Pattern,
    pub kind: PropertyKind,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ArrayPattern {
    #[serde(flatten)]
    pub span: Span,
    pub elements: Vec<Option<Pattern>>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct AssignmentPattern {
    #[serde(flatten)]
    pub span: Span,
    pub left: Box<Pattern>,
    pub right: Box<Expression>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct RestElement {
    #[serde(flatten)]
    pub span: Span,
    pub argument: Box<Pattern>,
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

/// `foo` or `"foo"` in import/export specifiers and attribute keys.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ModuleExportName {
    Identifier(Identifier),
    Literal(Literal),
}

enum_span!(ModuleExportName { Identifier, Literal });

impl ModuleExportName {
    pub fn name(&self) -> String {
        match self {
            ModuleExportName::Identifier(id) => id.name.clone(),
            ModuleExportName::Literal(lit) => match &lit.value {
                LiteralValue::String(s) => s.clone(),
                _ => String::new(),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ImportDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub specifiers: Vec<ImportDeclarationSpecifier>,
    pub source: Literal,
    pub attributes: Vec<ImportAttribute>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ImportDeclarationSpecifier {
    Named(ImportSpecifier),
    Default(ImportDefaultSpecifier),
    Namespace(ImportNamespaceSpecifier),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ImportSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub imported: ModuleExportName,
    pub local: Identifier,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ImportDefaultSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub local: Identifier,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ImportNamespaceSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub local: Identifier,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ImportAttribute {
    #[serde(flatten)]
    pub span: Span,
    pub key: ModuleExportName,
    pub value: Literal,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ExportNamedDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub declaration: Option<Box<Statement>>,
    pub specifiers: Vec<ExportSpecifier>,
    pub source: Option<Literal>,
    pub attributes: Vec<ImportAttribute>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ExportSpecifier {
    #[serde(flatten)]
    pub span: Span,
    pub local: ModuleExportName,
    pub exported: ModuleExportName,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ExportDefaultDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub declaration: ExportDefaultKind,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum ExportDefaultKind {
    Function(Function),
    Class(Class),
    Expression(Box<Expression>),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub struct ExportAllDeclaration {
    #[serde(flatten)]
    pub span: Span,
    pub exported: Option<ModuleExportName>,
    pub source: Literal,
    pub attributes: Vec<ImportAttribute>,
}

node_span!(
    ExpressionStatement, BlockStatement, EmptyStatement, DebuggerStatement, WithStatement,
    ReturnStatement, LabeledStatement, BreakStatement, ContinueStatement, IfStatement,
    SwitchStatement, ThrowStatement, TryStatement, WhileStatement, DoWhileStatement, ForStatement,
    ForInStatement, ForOfStatement, VariableDeclaration, Function, Class, MethodDefinition,
    PropertyDefinition, StaticBlock, Identifier, PrivateIdentifier, Literal, ThisExpression, Super,
    ArrayExpression, SpreadElement, ObjectExpression, ArrowFunctionExpression, TemplateLiteral,
    TaggedTemplateExpression, UnaryExpression, UpdateExpression, BinaryExpression,
    LogicalExpression, AssignmentExpression, ConditionalExpression, CallExpression, NewExpression,
    MemberExpression, ChainExpression, SequenceExpression, YieldExpression, AwaitExpression,
    MetaProperty, ImportExpression, ObjectPattern, ArrayPattern, AssignmentPattern, RestElement,
    ImportDeclaration, ExportNamedDeclaration, ExportDefaultDeclaration, ExportAllDeclaration,
);

/// Property-name spelling of a numeric key (`{1.5: x}` names "1.5").
pub fn number_to_string(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        format!("{n}")
    }
}
