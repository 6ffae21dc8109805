use crate::source::Position;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// Every diagnostic the lexer, parser and validator can raise. `Display`
/// renders the user-facing message.
#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    // Lexical
    UnexpectedCharacter(char),
    UnterminatedString,
    UnterminatedTemplate,
    UnterminatedComment,
    UnterminatedRegExp,
    InvalidEscape,
    InvalidHexEscape,
    InvalidUnicodeEscape,
    UnicodeOutOfRange,
    InvalidIdentifierEscape,
    MissingDigits,
    MissingExponent,
    NumericSeparator,
    IdentifierAfterNumber,
    InvalidBigInt,
    InvalidRegExpFlag(char),
    DuplicateRegExpFlag(char),
    InvalidRegExp(String, &'static str),

    // Syntactic
    UnexpectedToken(String),
    UnexpectedEnd,
    Expected(&'static str),
    UnexpectedReserved,
    UnexpectedStrictReserved,
    EscapedKeyword,
    InvalidMetaProperty,

    // Early errors
    StrictOctalLiteral,
    StrictDecimalWithLeadingZero,
    StrictOctalEscape,
    StrictEightOrNineEscape,
    TemplateOctalEscape,
    StrictWith,
    StrictDelete,
    StrictEvalArguments,
    DuplicateBinding(String),
    DuplicateParameter,
    LetInLexicalBinding,
    InvalidAssignmentTarget,
    InvalidDestructuringTarget,
    InvalidUpdateTarget,
    InvalidForTarget(&'static str),
    ForInOfInitializer(&'static str),
    ForInOfMultipleBindings(&'static str),
    ForOfAsync,
    ForOfLet,
    ForAwaitOutsideAsync,
    MissingInitializer(&'static str),
    IllegalBreak,
    IllegalContinue,
    UndefinedLabel(String),
    IllegalContinueLabel(String),
    DuplicateLabel(String),
    IllegalReturn,
    NewlineAfterThrow,
    MultipleDefaults,
    NoCatchOrFinally,
    LexicalInSingleStatement,
    StrictFunctionPosition,
    SloppyFunctionPosition,
    AsyncOrGeneratorPosition,
    UseStrictNonSimple,
    YieldInParameter,
    AwaitInParameter,
    ArgumentsInClassInit,
    UnexpectedSuper,
    InvalidNewTarget,
    ImportMetaOutsideModule,
    ImportOutsideModule,
    ExportOutsideModule,
    DuplicateExport(String),
    UndefinedExport(String),
    StringLocalExport,
    MalformedExportName,
    DuplicateImportAttribute(String),
    DuplicateConstructor,
    SpecialConstructor(&'static str),
    StaticPrototype,
    ConstructorField,
    PrivateConstructor,
    DuplicatePrivateName(String),
    UndeclaredPrivateName(String),
    DeletePrivate,
    GetterArity,
    SetterArity,
    SetterRest,
    DuplicateProto,
    ShorthandInitializer,
    RestNotLast,
    RestInitializer,
    InvalidRestAssignment,
    InvalidRestBinding,
    NullishMix,
    UnaryBeforeExponent,
    OptionalChainNew,
    OptionalChainTemplate,
    MalformedArrowParameters,

    // Limits
    TooDeep,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ErrorKind::*;
        match self {
            UnexpectedCharacter(ch) => write!(f, "Invalid or unexpected token '{}'", ch.escape_default()),
            UnterminatedString => f.write_str("Unterminated string literal"),
            UnterminatedTemplate => f.write_str("Unterminated template literal"),
            UnterminatedComment => f.write_str("Unterminated block comment"),
            UnterminatedRegExp => f.write_str("Unterminated regular expression"),
            InvalidEscape => f.write_str("Invalid escape sequence"),
            InvalidHexEscape => f.write_str("Invalid hexadecimal escape sequence"),
            InvalidUnicodeEscape => f.write_str("Invalid Unicode escape sequence"),
            UnicodeOutOfRange => f.write_str("Undefined Unicode code-point"),
            InvalidIdentifierEscape => f.write_str("Invalid Unicode escape sequence in identifier"),
            MissingDigits => f.write_str("Missing digits after numeric literal prefix"),
            MissingExponent => f.write_str("Missing exponent digits"),
            NumericSeparator => f.write_str("Numeric separators are not allowed here"),
            IdentifierAfterNumber => f.write_str("Identifier starts immediately after numeric literal"),
            InvalidBigInt => f.write_str("Invalid BigInt literal"),
            InvalidRegExpFlag(ch) => write!(f, "Invalid regular expression flag '{ch}'"),
            DuplicateRegExpFlag(ch) => write!(f, "Duplicate regular expression flag '{ch}'"),
            InvalidRegExp(pattern, reason) => {
                write!(f, "Invalid regular expression: /{pattern}/: {reason}")
            }

            UnexpectedToken(token) => write!(f, "Unexpected token '{token}'"),
            UnexpectedEnd => f.write_str("Unexpected end of input"),
            Expected(what) => write!(f, "Expected '{what}'"),
            UnexpectedReserved => f.write_str("Unexpected reserved word"),
            UnexpectedStrictReserved => f.write_str("Unexpected strict mode reserved word"),
            EscapedKeyword => f.write_str("Keyword must not contain escaped characters"),
            InvalidMetaProperty => f.write_str("Invalid meta property"),

            StrictOctalLiteral => f.write_str("Octal literals are not allowed in strict mode"),
            StrictDecimalWithLeadingZero => {
                f.write_str("Decimals with leading zeros are not allowed in strict mode")
            }
            StrictOctalEscape => f.write_str("Octal escape sequences are not allowed in strict mode"),
            StrictEightOrNineEscape => f.write_str("\\8 and \\9 are not allowed in strict mode"),
            TemplateOctalEscape => {
                f.write_str("Octal escape sequences are not allowed in template strings")
            }
            StrictWith => f.write_str("Strict mode code may not include a with statement"),
            StrictDelete => f.write_str("Delete of an unqualified identifier in strict mode"),
            StrictEvalArguments => f.write_str("Unexpected eval or arguments in strict mode"),
            DuplicateBinding(name) => write!(f, "Identifier '{name}' has already been declared"),
            DuplicateParameter => f.write_str("Duplicate parameter name not allowed in this context"),
            LetInLexicalBinding => f.write_str("let is disallowed as a lexically bound name"),
            InvalidAssignmentTarget => f.write_str("Invalid left-hand side in assignment"),
            InvalidDestructuringTarget => f.write_str("Invalid destructuring assignment target"),
            InvalidUpdateTarget => {
                f.write_str("Invalid left-hand side expression in update operation")
            }
            InvalidForTarget(kind) => write!(f, "Invalid left-hand side in for-{kind} loop"),
            ForInOfInitializer(kind) => {
                write!(f, "for-{kind} loop variable declaration may not have an initializer")
            }
            ForInOfMultipleBindings(kind) => {
                write!(f, "Invalid left-hand side in for-{kind} loop: Must have a single binding")
            }
            ForOfAsync => f.write_str("The left-hand side of a for-of loop may not be 'async'"),
            ForOfLet => f.write_str("The left-hand side of a for-of loop may not be 'let'"),
            ForAwaitOutsideAsync => f.write_str(
                "for await is only valid in async functions and the top level bodies of modules",
            ),
            MissingInitializer(kind) => write!(f, "Missing initializer in {kind} declaration"),
            IllegalBreak => f.write_str("Illegal break statement"),
            IllegalContinue => {
                f.write_str("Illegal continue statement: no surrounding iteration statement")
            }
            UndefinedLabel(label) => write!(f, "Undefined label '{label}'"),
            IllegalContinueLabel(label) => write!(
                f,
                "Illegal continue statement: '{label}' does not denote an iteration statement"
            ),
            DuplicateLabel(label) => write!(f, "Label '{label}' has already been declared"),
            IllegalReturn => f.write_str("Illegal return statement"),
            NewlineAfterThrow => f.write_str("Illegal newline after throw"),
            MultipleDefaults => f.write_str("More than one default clause in switch statement"),
            NoCatchOrFinally => f.write_str("Missing catch or finally after try"),
            LexicalInSingleStatement => {
                f.write_str("Lexical declaration cannot appear in a single-statement context")
            }
            StrictFunctionPosition => f.write_str(
                "In strict mode code, functions can only be declared at top level or inside a block",
            ),
            SloppyFunctionPosition => f.write_str(
                "In non-strict mode code, functions can only be declared at top level, inside a block, or as the body of an if statement",
            ),
            AsyncOrGeneratorPosition => f.write_str(
                "Async functions and generators can only be declared at the top level or inside a block",
            ),
            UseStrictNonSimple => f.write_str(
                "Illegal 'use strict' directive in function with non-simple parameter list",
            ),
            YieldInParameter => f.write_str("Yield expression not allowed in formal parameter"),
            AwaitInParameter => f.write_str("Illegal await-expression in formal parameters"),
            ArgumentsInClassInit => f.write_str(
                "'arguments' is not allowed in class field initializer or static initialization block",
            ),
            UnexpectedSuper => f.write_str("'super' keyword unexpected here"),
            InvalidNewTarget => f.write_str("new.target expression is not allowed here"),
            ImportMetaOutsideModule => f.write_str("Cannot use 'import.meta' outside a module"),
            ImportOutsideModule => f.write_str("Cannot use import statement outside a module"),
            ExportOutsideModule => f.write_str("Cannot use export statement outside a module"),
            DuplicateExport(name) => write!(f, "Duplicate export of '{name}'"),
            UndefinedExport(name) => write!(f, "Export '{name}' is not defined in module"),
            StringLocalExport => f.write_str(
                "A string literal cannot be used as an exported binding without 'from'",
            ),
            MalformedExportName => {
                f.write_str("An export name cannot include a lone surrogate")
            }
            DuplicateImportAttribute(key) => {
                write!(f, "Import attribute has duplicate key '{key}'")
            }
            DuplicateConstructor => f.write_str("A class may only have one constructor"),
            SpecialConstructor(kind) => write!(f, "Class constructor may not be {kind}"),
            StaticPrototype => {
                f.write_str("Classes may not have a static property named 'prototype'")
            }
            ConstructorField => f.write_str("Classes may not have a field named 'constructor'"),
            PrivateConstructor => {
                f.write_str("Classes may not have a private field named '#constructor'")
            }
            DuplicatePrivateName(name) => {
                write!(f, "Identifier '#{name}' has already been declared")
            }
            UndeclaredPrivateName(name) => {
                write!(f, "Private field '#{name}' must be declared in an enclosing class")
            }
            DeletePrivate => f.write_str("Private fields can not be deleted"),
            GetterArity => f.write_str("Getter must not have any formal parameters"),
            SetterArity => f.write_str("Setter must have exactly one formal parameter"),
            SetterRest => f.write_str("Setter function argument must not be a rest parameter"),
            DuplicateProto => {
                f.write_str("Duplicate __proto__ fields are not allowed in object literals")
            }
            ShorthandInitializer => f.write_str("Invalid shorthand property initializer"),
            RestNotLast => f.write_str("Rest element must be last element"),
            RestInitializer => f.write_str("Rest parameter may not have a default initializer"),
            InvalidRestAssignment => f.write_str(
                "'...' must be followed by an assignable reference in assignment contexts",
            ),
            InvalidRestBinding => {
                f.write_str("'...' must be followed by an identifier in declaration contexts")
            }
            NullishMix => f.write_str("Cannot mix '??' with '&&' or '||' without parentheses"),
            UnaryBeforeExponent => f.write_str(
                "Unary operator used immediately before exponentiation expression; parentheses are required",
            ),
            OptionalChainNew => f.write_str("Invalid optional chain from new expression"),
            OptionalChainTemplate => f.write_str("Invalid tagged template on optional chain"),
            MalformedArrowParameters => f.write_str("Malformed arrow function parameter list"),

            TooDeep => f.write_str("Maximum nesting depth exceeded"),
        }
    }
}

/// The first error found in the source. Parsing stops as soon as one is
/// produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub index: usize,
    pub line: u32,
    pub column: u32,
}

impl ParseError {
    pub fn new(kind: ErrorKind, at: Position) -> Self {
        ParseError {
            kind,
            index: at.offset,
            line: at.line,
            column: at.column,
        }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxError: {} ({}:{})", self.kind, self.line, self.column)
    }
}

impl std::error::Error for ParseError {}

impl Serialize for ParseError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ParseError", 4)?;
        state.serialize_field("message", &self.message())?;
        state.serialize_field("index", &self.index)?;
        state.serialize_field("line", &self.line)?;
        state.serialize_field("column", &self.column)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let err = ParseError::new(
            ErrorKind::IllegalBreak,
            Position {
                offset: 4,
                line: 2,
                column: 1,
            },
        );
        assert_eq!(err.to_string(), "SyntaxError: Illegal break statement (2:1)");
        assert_eq!(err.index, 4);
    }

    #[test]
    fn serializes_flat_object() {
        let err = ParseError::new(ErrorKind::DuplicateBinding("x".into()), Position::START);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["message"], "Identifier 'x' has already been declared");
        assert_eq!(json["line"], 1);
        assert_eq!(json["column"], 0);
    }
}
