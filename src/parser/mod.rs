use crate::ast::*;
use crate::context::Context;
use crate::error::{ErrorKind, ParseError};
use crate::factory::NodeFactory;
use crate::lexer::{Keyword, LegacyEscape, Lexer, Token};
use crate::options::Options;
use crate::scope::{BindingKind, ScopeFlags, ScopeStack};
use crate::source::{LineIndex, Position};
use crate::validate::{self, Label, LabelKind};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

mod declarations;
mod expressions;
mod modules;
mod patterns;
mod statements;

use patterns::CoverErrors;

/// Deepest nesting of statements, expressions and patterns before parsing
/// gives up with `TooDeep` instead of exhausting the stack.
pub const MAX_DEPTH: u32 = 256;

type Result<T> = std::result::Result<T, ParseError>;

#[derive(Clone, Copy, PartialEq)]
enum PrivateNameKind {
    Getter,
    Setter,
    Other,
}

/// Private names declared by one class body, plus references to names not
/// yet seen (a member may be used before its declaration).
#[derive(Default)]
struct PrivateScope {
    declared: FxHashMap<String, (PrivateNameKind, bool)>,
    unresolved: Vec<(String, Position)>,
}

/// Where a statement appears, which decides whether declarations are
/// allowed there.
#[derive(Clone, Copy, PartialEq, Eq)]
enum StatementPosition {
    /// StatementListItem: declarations allowed.
    ListItem,
    /// Body of a loop, `with`, or `else`.
    Single,
    /// Consequent of an `if`.
    IfBody,
    /// Body of a labelled statement.
    Labelled,
}

pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    options: Options,
    factory: NodeFactory,
    line_index: LineIndex,

    current: Token,
    start: Position,
    end: Position,
    prev_end: Position,
    newline_before: bool,
    escaped: bool,
    legacy_escape: Option<LegacyEscape>,
    lone_surrogate: bool,
    template_error: Option<ParseError>,
    template_content: (Position, Position),

    ctx: Context,
    labels: Vec<Label>,
    scopes: ScopeStack,
    private_scopes: Vec<PrivateScope>,
    /// Inner spans of every parenthesized expression.
    parenthesized: FxHashSet<(usize, usize)>,
    /// Start offset of the assignment expression being parsed, where an
    /// arrow function may begin.
    potential_arrow_at: Option<usize>,
    yield_pos: Option<Position>,
    await_pos: Option<Position>,
    await_ident_pos: Option<Position>,

    exported: FxHashSet<String>,
    export_references: Vec<(String, Position)>,

    depth: u32,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, options: Options) -> Self {
        let mut lexer = Lexer::new(source);
        lexer.set_html_comments(options.annex_b() && !options.module);
        let ctx = if options.module {
            Context::default().with(Context::MODULE | Context::STRICT | Context::AWAIT)
        } else {
            Context::default()
                .with_if(options.implied_strict, Context::STRICT)
                .with_if(options.top_level_await, Context::AWAIT)
                .with_if(options.global_return, Context::RETURN)
        };
        Self {
            source,
            lexer,
            options,
            factory: NodeFactory::new(options.loc, options.ranges),
            line_index: LineIndex::new(source),
            current: Token::Eof,
            start: Position::START,
            end: Position::START,
            prev_end: Position::START,
            newline_before: false,
            escaped: false,
            legacy_escape: None,
            lone_surrogate: false,
            template_error: None,
            template_content: (Position::START, Position::START),
            ctx,
            labels: Vec::new(),
            scopes: ScopeStack::new(options.module, options.legacy_octal()),
            private_scopes: Vec::new(),
            parenthesized: FxHashSet::default(),
            potential_arrow_at: None,
            yield_pos: None,
            await_pos: None,
            await_ident_pos: None,
            exported: FxHashSet::default(),
            export_references: Vec::new(),
            depth: 0,
        }
    }

    pub fn parse_program(mut self) -> Result<Program> {
        debug!(
            len = self.source.len(),
            module = self.options.module,
            "parsing program"
        );
        self.advance()?;
        let (body, _) = self.parse_body_items(&Token::Eof)?;
        self.check_export_references()?;
        let source_type = if self.options.module {
            SourceType::Module
        } else {
            SourceType::Script
        };
        debug!(statements = body.len(), "parsed program");
        Ok(Program {
            span: self.factory.span(Position::START, self.end),
            source_type,
            body,
        })
    }

    // -----------------------------------------------------------------------
    // Token plumbing
    // -----------------------------------------------------------------------

    fn advance(&mut self) -> Result<Token> {
        self.prev_end = self.end;
        let token = self.lexer.next_token()?;
        let old = std::mem::replace(&mut self.current, token);
        self.sync_token();
        Ok(old)
    }

    /// Copies the lexer's view of the token it just produced.
    fn sync_token(&mut self) {
        self.start = self.lexer.token_start();
        self.end = self.lexer.position();
        self.newline_before = self.lexer.newline_before();
        self.escaped = self.lexer.escaped();
        self.legacy_escape = self.lexer.legacy_escape();
        self.lone_surrogate = self.lexer.lone_surrogate();
        self.template_error = self.lexer.template_error().cloned();
        self.template_content = self.lexer.template_content();
    }

    /// Re-reads the current `/` or `/=` as a regular expression literal.
    fn rescan_regex(&mut self) -> Result<()> {
        self.current = self.lexer.read_regex()?;
        self.end = self.lexer.position();
        Ok(())
    }

    /// Re-reads the current `}` as the continuation of a template.
    fn rescan_template_continuation(&mut self) -> Result<()> {
        self.current = self.lexer.read_template_continuation()?;
        self.end = self.lexer.position();
        self.template_error = self.lexer.template_error().cloned();
        self.template_content = self.lexer.template_content();
        Ok(())
    }

    /// The token after the current one, and whether a line break precedes it.
    fn peek(&self) -> Result<(Token, bool)> {
        let mut lexer = self.lexer.clone();
        let token = lexer.next_token()?;
        Ok((token, lexer.newline_before()))
    }

    fn at(&self, token: &Token) -> bool {
        &self.current == token
    }

    fn at_keyword(&self, kw: Keyword) -> bool {
        self.current.is_keyword(kw)
    }

    /// An unescaped identifier spelled `name` (`get`, `set`, `as`, ...).
    fn at_contextual(&self, name: &str) -> bool {
        !self.escaped && matches!(&self.current, Token::Identifier(n) if n == name)
    }

    fn eat(&mut self, expected: &Token) -> Result<()> {
        if &self.current == expected {
            self.advance()?;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn consume(&mut self, expected: &Token) -> Result<bool> {
        if &self.current == expected {
            self.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn eat_keyword(&mut self, kw: Keyword) -> Result<()> {
        if self.at_keyword(kw) && !self.escaped {
            self.advance()?;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn can_insert_semicolon(&self) -> bool {
        self.newline_before || matches!(self.current, Token::RightBrace | Token::Eof)
    }

    fn eat_semicolon(&mut self) -> Result<()> {
        if self.current == Token::Semicolon {
            self.advance()?;
            return Ok(());
        }
        if self.can_insert_semicolon() {
            return Ok(());
        }
        Err(self.unexpected())
    }

    // -----------------------------------------------------------------------
    // Errors and spans
    // -----------------------------------------------------------------------

    fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, self.start)
    }

    fn error_at(&self, kind: ErrorKind, offset: usize) -> ParseError {
        ParseError::new(kind, self.position_of(offset))
    }

    fn unexpected(&self) -> ParseError {
        match self.current {
            Token::Eof => self.error(ErrorKind::UnexpectedEnd),
            _ => self.error(ErrorKind::UnexpectedToken(self.token_text().to_string())),
        }
    }

    fn token_text(&self) -> &'a str {
        self.source
            .get(self.start.offset..self.end.offset)
            .unwrap_or_default()
    }

    fn position_of(&self, offset: usize) -> Position {
        self.line_index.position_of(self.source, offset)
    }

    /// Span from `start` to the end of the last consumed token.
    fn finish(&self, start: Position) -> Span {
        self.factory.span(start, self.prev_end)
    }

    /// Position of a node's start, for nodes built from an earlier span.
    fn start_of(&self, span: &Span) -> Position {
        self.position_of(span.start)
    }

    fn is_parenthesized(&self, span: &Span) -> bool {
        self.parenthesized.contains(&(span.start, span.end))
    }

    fn with_context<T>(&mut self, ctx: Context, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let saved = std::mem::replace(&mut self.ctx, ctx);
        let result = f(self);
        self.ctx = saved;
        result
    }

    /// Runs `f` one nesting level deeper.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(ErrorKind::TooDeep));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // -----------------------------------------------------------------------
    // Identifiers
    // -----------------------------------------------------------------------

    /// True when the current token can be read as an identifier (including
    /// contextual keywords, which `take_identifier` then validates).
    fn at_identifier(&self) -> bool {
        match &self.current {
            Token::Identifier(_) => true,
            Token::Keyword(kw) => kw.is_contextual(),
            _ => false,
        }
    }

    fn take_identifier(&mut self) -> Result<Identifier> {
        let start = self.start;
        let name = match &self.current {
            Token::Identifier(name) => {
                if self.escaped && validate::is_keyword(name) {
                    return Err(self.error(ErrorKind::EscapedKeyword));
                }
                name.clone()
            }
            Token::Keyword(kw) if kw.is_contextual() => kw.to_string(),
            Token::Keyword(_) | Token::BooleanLiteral(_) | Token::NullLiteral => {
                return Err(self.error(ErrorKind::UnexpectedReserved));
            }
            _ => return Err(self.unexpected()),
        };
        self.advance()?;
        Ok(self.factory.identifier(name, start, self.prev_end))
    }

    /// Validates an identifier used as a reference.
    fn check_reference(&mut self, id: &Identifier) -> Result<()> {
        validate::check_identifier(&id.name, self.ctx)
            .map_err(|kind| self.error_at(kind, id.span.start))?;
        if id.name == "await" && self.await_ident_pos.is_none() {
            self.await_ident_pos = Some(self.start_of(&id.span));
        }
        Ok(())
    }

    fn check_binding(&self, id: &Identifier, ctx: Context) -> Result<()> {
        validate::check_binding_identifier(&id.name, ctx).map_err(|kind| self.error_at(kind, id.span.start))
    }

    fn parse_identifier_reference(&mut self) -> Result<Identifier> {
        let id = self.take_identifier()?;
        self.check_reference(&id)?;
        Ok(id)
    }

    fn parse_binding_identifier(&mut self) -> Result<Identifier> {
        let id = self.take_identifier()?;
        self.check_binding(&id, self.ctx)?;
        if id.name == "await" && self.await_ident_pos.is_none() {
            self.await_ident_pos = Some(self.start_of(&id.span));
        }
        Ok(id)
    }

    /// Any IdentifierName, keywords included (member names, property keys).
    fn parse_identifier_name(&mut self) -> Result<Identifier> {
        let start = self.start;
        let Some(name) = self.current.identifier_name() else {
            return Err(self.unexpected());
        };
        self.advance()?;
        Ok(self.factory.identifier(name, start, self.prev_end))
    }

    fn declare(&mut self, id: &Identifier, kind: BindingKind) -> Result<()> {
        if !self.scopes.declare(&id.name, kind) {
            return Err(self.error_at(ErrorKind::DuplicateBinding(id.name.clone()), id.span.start));
        }
        Ok(())
    }

    fn declare_pattern(&mut self, pattern: &Pattern, kind: BindingKind) -> Result<()> {
        for id in patterns::binding_identifiers(pattern) {
            self.declare(id, kind)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Bodies and directives
    // -----------------------------------------------------------------------

    /// Parses statement list items up to `end`, starting with a directive
    /// prologue. Returns the items and whether the prologue held
    /// `"use strict"`; strictness is switched on in `self.ctx` as soon as it
    /// is seen.
    fn parse_body_items(&mut self, end: &Token) -> Result<(Vec<Statement>, bool)> {
        let mut body = Vec::new();
        let mut use_strict = false;
        let mut prologue = true;
        let mut legacy_escape = None;
        while &self.current != end {
            if self.current == Token::Eof {
                return Err(self.unexpected());
            }
            if !prologue || !matches!(self.current, Token::StringLiteral(_)) {
                prologue = false;
                body.push(self.parse_statement_list_item()?);
                continue;
            }
            let (token_start, token_end) = (self.start.offset, self.end.offset);
            let escape = self.legacy_escape;
            let mut stmt = self.parse_statement_list_item()?;
            let Some(raw) = self.directive_text(&stmt, token_start, token_end) else {
                prologue = false;
                body.push(stmt);
                continue;
            };
            if validate::is_use_strict_directive(raw) {
                use_strict = true;
                self.ctx = self.ctx.with(Context::STRICT);
                if let Some(escape) = legacy_escape {
                    return Err(legacy_escape_error(escape));
                }
            }
            if legacy_escape.is_none() {
                legacy_escape = escape;
            }
            if self.options.directives
                && let Statement::Expression(es) = &mut stmt
            {
                es.directive = Some(raw[1..raw.len() - 1].to_string());
            }
            body.push(stmt);
        }
        Ok((body, use_strict))
    }

    /// Raw source of a directive when `stmt` is a lone string literal
    /// statement whose literal is the token at `token_start..token_end`.
    fn directive_text(&self, stmt: &Statement, token_start: usize, token_end: usize) -> Option<&'a str> {
        let Statement::Expression(es) = stmt else {
            return None;
        };
        let Expression::Literal(lit) = es.expression.as_ref() else {
            return None;
        };
        let is_directive = matches!(lit.value, LiteralValue::String(_))
            && es.span.start == token_start
            && lit.span.start == token_start
            && lit.span.end == token_end;
        if !is_directive {
            return None;
        }
        self.source.get(token_start..token_end)
    }

    /// Legacy octal escapes are rejected in strict code and when web
    /// compatibility is disabled.
    fn check_legacy_escape(&self, escape: Option<LegacyEscape>) -> Result<()> {
        match escape {
            Some(escape) if self.ctx.is_strict() || !self.options.legacy_octal() => {
                Err(legacy_escape_error(escape))
            }
            _ => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Private names
    // -----------------------------------------------------------------------

    fn use_private_name(&mut self, name: &str, at: Position) -> Result<()> {
        match self.private_scopes.last_mut() {
            Some(scope) => {
                if !scope.declared.contains_key(name) {
                    scope.unresolved.push((name.to_string(), at));
                }
                Ok(())
            }
            None => Err(ParseError::new(ErrorKind::UndeclaredPrivateName(name.to_string()), at)),
        }
    }

    fn declare_private_name(&mut self, id: &PrivateIdentifier, kind: PrivateNameKind, is_static: bool) -> Result<()> {
        let at = self.start_of(&id.span);
        let Some(scope) = self.private_scopes.last_mut() else {
            return Ok(());
        };
        let ok = match scope.declared.get(&id.name) {
            None => true,
            Some(&(existing, existing_static)) => {
                existing_static == is_static
                    && matches!(
                        (existing, kind),
                        (PrivateNameKind::Getter, PrivateNameKind::Setter)
                            | (PrivateNameKind::Setter, PrivateNameKind::Getter)
                    )
            }
        };
        if !ok {
            return Err(ParseError::new(ErrorKind::DuplicatePrivateName(id.name.clone()), at));
        }
        let kind = if scope.declared.contains_key(&id.name) {
            PrivateNameKind::Other
        } else {
            kind
        };
        scope.declared.insert(id.name.clone(), (kind, is_static));
        Ok(())
    }

    /// Closes a class body's private scope. Names it does not declare move
    /// to the enclosing class, or fail at the outermost one.
    fn exit_private_scope(&mut self) -> Result<()> {
        let Some(scope) = self.private_scopes.pop() else {
            return Ok(());
        };
        for (name, at) in scope.unresolved {
            if scope.declared.contains_key(&name) {
                continue;
            }
            match self.private_scopes.last_mut() {
                Some(outer) => outer.unresolved.push((name, at)),
                None => return Err(ParseError::new(ErrorKind::UndeclaredPrivateName(name), at)),
            }
        }
        Ok(())
    }
}

fn legacy_escape_error(escape: LegacyEscape) -> ParseError {
    match escape {
        LegacyEscape::Octal(at) => ParseError::new(ErrorKind::StrictOctalEscape, at),
        LegacyEscape::EightOrNine(at) => ParseError::new(ErrorKind::StrictEightOrNineEscape, at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Program {
        Parser::new(src, Options::default()).parse_program().unwrap()
    }

    fn parse_err(src: &str) -> ParseError {
        Parser::new(src, Options::default()).parse_program().unwrap_err()
    }

    #[test]
    fn empty_program() {
        let prog = parse("  // nothing\n");
        assert!(prog.body.is_empty());
        assert_eq!(prog.span.start, 0);
        assert_eq!(prog.span.end, 13);
        assert_eq!(prog.source_type, SourceType::Script);
    }

    /// Parses on a thread with room for the deepest allowed nesting.
    fn parse_deep(src: String) -> std::result::Result<Program, ParseError> {
        std::thread::Builder::new()
            .stack_size(256 * 1024 * 1024)
            .spawn(move || Parser::new(&src, Options::default()).parse_program())
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let shallow = format!("{}1{}", "(".repeat(50), ")".repeat(50));
        assert!(parse_deep(shallow).is_ok());
        let arrays = format!("{}{}", "[".repeat(3000), "]".repeat(3000));
        assert_eq!(parse_deep(arrays).unwrap_err().kind, ErrorKind::TooDeep);
        let parens = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
        assert_eq!(parse_deep(parens).unwrap_err().kind, ErrorKind::TooDeep);
        let blocks = format!("{}{}", "{".repeat(5000), "}".repeat(5000));
        assert_eq!(parse_deep(blocks).unwrap_err().kind, ErrorKind::TooDeep);
        let unary = format!("{}x", "!".repeat(5000));
        assert_eq!(parse_deep(unary).unwrap_err().kind, ErrorKind::TooDeep);
        let power = format!("x{}", "**x".repeat(5000));
        assert_eq!(parse_deep(power).unwrap_err().kind, ErrorKind::TooDeep);
        let pattern = format!("var {}x{} = y;", "[".repeat(5000), "]".repeat(5000));
        assert_eq!(parse_deep(pattern).unwrap_err().kind, ErrorKind::TooDeep);
    }

    #[test]
    fn asi() {
        let prog = parse("a\nb");
        assert_eq!(prog.body.len(), 2);
        assert!(matches!(parse_err("a b").kind, ErrorKind::UnexpectedToken(ref t) if t == "b"));
    }

    #[test]
    fn use_strict_switches_mode() {
        assert_eq!(parse_err("'use strict'; with (a) {}").kind, ErrorKind::StrictWith);
        assert!(matches!(&parse("'use\\x20strict'; with (a) {}").body[1], Statement::With(_)));
        assert!(matches!(&parse("('use strict'); with (a) {}").body[1], Statement::With(_)));
    }

    #[test]
    fn octal_escape_before_use_strict() {
        let err = parse_err("'\\01'; 'use strict';");
        assert_eq!(err.kind, ErrorKind::StrictOctalEscape);
        assert_eq!(err.index, 1);
        let err = parse_err("'use strict'; 'a\\8';");
        assert_eq!(err.kind, ErrorKind::StrictEightOrNineEscape);
        assert_eq!(err.index, 16);
        assert!(Parser::new("'\\01'; 'a';", Options::default()).parse_program().is_ok());
    }

    #[test]
    fn directive_field_is_opt_in() {
        let options = Options {
            directives: true,
            ..Options::default()
        };
        let prog = Parser::new("'use strict'; 'x'\n1", options).parse_program().unwrap();
        let Statement::Expression(es) = &prog.body[0] else {
            panic!("expected a directive");
        };
        assert_eq!(es.directive.as_deref(), Some("use strict"));
        let Statement::Expression(last) = &prog.body[2] else {
            panic!("expected an expression statement");
        };
        assert!(last.directive.is_none());
        let Statement::Expression(plain) = &parse("'use strict'").body[0] else {
            panic!("expected an expression statement");
        };
        assert!(plain.directive.is_none());
    }

    #[test]
    fn undeclared_private_name() {
        assert_eq!(
            parse_err("this.#x").kind,
            ErrorKind::UndeclaredPrivateName("x".into())
        );
        assert_eq!(
            parse_err("class A { m() { this.#y } }").kind,
            ErrorKind::UndeclaredPrivateName("y".into())
        );
        parse("class A { m() { this.#x } #x }");
        parse("class A { #x; m() { class B { n() { this.#x } } } }");
    }

    #[test]
    fn private_accessor_pairs() {
        parse("class A { get #a() {} set #a(v) {} }");
        assert_eq!(
            parse_err("class A { #a; #a }").kind,
            ErrorKind::DuplicatePrivateName("a".into())
        );
        assert_eq!(
            parse_err("class A { get #a() {} static set #a(v) {} }").kind,
            ErrorKind::DuplicatePrivateName("a".into())
        );
    }
}
