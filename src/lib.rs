//! An ECMAScript parser producing ESTree-shaped syntax trees.
//!
//! ```
//! use esparse::{parse_script, Options};
//!
//! let program = parse_script("var foo, bar;", Options::default()).unwrap();
//! let json = serde_json::to_value(&program).unwrap();
//! assert_eq!(json["body"][0]["type"], "VariableDeclaration");
//! ```
//!
//! Parsing stops at the first syntax or early error, which is returned as a
//! [`ParseError`] carrying its offset, line and column. Input nested deeper
//! than [`parser::MAX_DEPTH`] fails with [`ErrorKind::TooDeep`]; reaching that
//! depth needs a few megabytes of stack in an unoptimized build.

pub mod ast;
pub mod context;
pub mod error;
pub mod factory;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod regexp;
pub mod scope;
pub mod source;
pub mod validate;

pub use ast::Program;
pub use error::{ErrorKind, ParseError};
pub use options::Options;
pub use parser::Parser;

/// Parses `source` with the script goal, whatever `options.module` says.
pub fn parse_script(source: &str, options: Options) -> Result<Program, ParseError> {
    Parser::new(source, Options { module: false, ..options }).parse_program()
}

/// Parses `source` with the module goal: strict, with `import`/`export` and
/// top-level `await`.
pub fn parse_module(source: &str, options: Options) -> Result<Program, ParseError> {
    Parser::new(source, Options { module: true, ..options }).parse_program()
}

/// Parses with the goal selected by `options.module`.
pub fn parse(source: &str, options: Options) -> Result<Program, ParseError> {
    Parser::new(source, options).parse_program()
}
