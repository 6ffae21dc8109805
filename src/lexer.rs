use crate::error::{ErrorKind, ParseError};
use crate::regexp;
use crate::source::{Cursor, Position, is_line_terminator};
use num_bigint::BigUint;
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    // Identifiers and keywords. An identifier written with escapes is always
    // `Identifier`, even when it spells a keyword.
    Identifier(String),
    Keyword(Keyword),
    PrivateName(String),

    // Literals
    NumericLiteral(f64),
    LegacyOctalLiteral(f64),
    BigIntLiteral(String),
    StringLiteral(String),
    BooleanLiteral(bool),
    NullLiteral,
    RegExpLiteral { pattern: String, flags: String },

    // Template literals: (cooked, raw). Cooked is None after an invalid escape.
    NoSubstitutionTemplate(Option<String>, String),
    TemplateHead(Option<String>, String),
    TemplateMiddle(Option<String>, String),
    TemplateTail(Option<String>, String),

    // Punctuators
    LeftBrace,                // {
    RightBrace,               // }
    LeftParen,                // (
    RightParen,               // )
    LeftBracket,              // [
    RightBracket,             // ]
    Dot,                      // .
    Ellipsis,                 // ...
    Semicolon,                // ;
    Comma,                    // ,
    LessThan,                 // <
    GreaterThan,              // >
    LessThanEqual,            // <=
    GreaterThanEqual,         // >=
    Equal,                    // ==
    NotEqual,                 // !=
    StrictEqual,              // ===
    StrictNotEqual,           // !==
    Plus,                     // +
    Minus,                    // -
    Star,                     // *
    Percent,                  // %
    Exponent,                 // **
    Increment,                // ++
    Decrement,                // --
    LeftShift,                // <<
    RightShift,               // >>
    UnsignedRightShift,       // >>>
    Ampersand,                // &
    Pipe,                     // |
    Caret,                    // ^
    Bang,                     // !
    Tilde,                    // ~
    LogicalAnd,               // &&
    LogicalOr,                // ||
    NullishCoalescing,        // ??
    Question,                 // ?
    OptionalChain,            // ?.
    Colon,                    // :
    Assign,                   // =
    PlusAssign,               // +=
    MinusAssign,              // -=
    StarAssign,               // *=
    PercentAssign,            // %=
    ExponentAssign,           // **=
    LeftShiftAssign,          // <<=
    RightShiftAssign,         // >>=
    UnsignedRightShiftAssign, // >>>=
    AmpersandAssign,          // &=
    PipeAssign,               // |=
    CaretAssign,              // ^=
    LogicalAndAssign,         // &&=
    LogicalOrAssign,          // ||=
    NullishAssign,            // ??=
    Arrow,                    // =>
    Slash,                    // /
    SlashAssign,              // /=

    Eof,
}

impl Token {
    /// True for tokens that may start an IdentifierName (property keys,
    /// member names), which includes every keyword and literal word.
    pub fn is_identifier_name(&self) -> bool {
        matches!(
            self,
            Token::Identifier(_) | Token::Keyword(_) | Token::BooleanLiteral(_) | Token::NullLiteral
        )
    }

    /// The IdentifierName spelled by this token, if any.
    pub fn identifier_name(&self) -> Option<String> {
        match self {
            Token::Identifier(name) => Some(name.clone()),
            Token::Keyword(kw) => Some(kw.to_string()),
            Token::BooleanLiteral(b) => Some(b.to_string()),
            Token::NullLiteral => Some("null".to_string()),
            _ => None,
        }
    }

    pub fn is_keyword(&self, kw: Keyword) -> bool {
        matches!(self, Token::Keyword(k) if *k == kw)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    Async,
    Await,
    Break,
    Case,
    Catch,
    Class,
    Const,
    Continue,
    Debugger,
    Default,
    Delete,
    Do,
    Else,
    Enum,
    Export,
    Extends,
    Finally,
    For,
    Function,
    If,
    Import,
    In,
    Instanceof,
    Let,
    New,
    Of,
    Return,
    Static,
    Super,
    Switch,
    This,
    Throw,
    Try,
    Typeof,
    Var,
    Void,
    While,
    With,
    Yield,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("async", Keyword::Async), ("await", Keyword::Await), ("break", Keyword::Break),
    ("case", Keyword::Case), ("catch", Keyword::Catch), ("class", Keyword::Class),
    ("const", Keyword::Const), ("continue", Keyword::Continue), ("debugger", Keyword::Debugger),
    ("default", Keyword::Default), ("delete", Keyword::Delete), ("do", Keyword::Do),
    ("else", Keyword::Else), ("enum", Keyword::Enum), ("export", Keyword::Export),
    ("extends", Keyword::Extends), ("finally", Keyword::Finally), ("for", Keyword::For),
    ("function", Keyword::Function), ("if", Keyword::If), ("import", Keyword::Import),
    ("in", Keyword::In), ("instanceof", Keyword::Instanceof), ("let", Keyword::Let),
    ("new", Keyword::New), ("of", Keyword::Of), ("return", Keyword::Return),
    ("static", Keyword::Static), ("super", Keyword::Super), ("switch", Keyword::Switch),
    ("this", Keyword::This), ("throw", Keyword::Throw), ("try", Keyword::Try),
    ("typeof", Keyword::Typeof), ("var", Keyword::Var), ("void", Keyword::Void),
    ("while", Keyword::While), ("with", Keyword::With), ("yield", Keyword::Yield),
];

impl Keyword {
    pub fn from_str(s: &str) -> Option<Keyword> {
        KEYWORDS.iter().find(|(name, _)| *name == s).map(|&(_, kw)| kw)
    }

    pub fn as_str(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, kw)| *kw == self)
            .map_or("", |&(name, _)| name)
    }

    /// Contextual keywords are ordinary identifiers outside the productions
    /// that give them meaning.
    pub fn is_contextual(self) -> bool {
        matches!(
            self,
            Keyword::Async | Keyword::Await | Keyword::Let | Keyword::Of | Keyword::Static | Keyword::Yield
        )
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A legacy escape seen inside the last string literal, kept so the parser
/// can reject it once it knows whether the literal is strict code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegacyEscape {
    Octal(Position),
    EightOrNine(Position),
}

#[derive(Clone)]
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    token_start: Position,
    newline_before: bool,
    escaped: bool,
    legacy_escape: Option<LegacyEscape>,
    lone_surrogate: bool,
    template_error: Option<ParseError>,
    template_content: (Position, Position),
    html_comments: bool,
    seen_token: bool,
}

enum EscapeSite {
    String,
    Template,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
            token_start: Position::START,
            newline_before: false,
            escaped: false,
            legacy_escape: None,
            lone_surrogate: false,
            template_error: None,
            template_content: (Position::START, Position::START),
            html_comments: false,
            seen_token: false,
        }
    }

    /// Enables `<!--` and `-->` comments (web-compatible scripts only).
    pub fn set_html_comments(&mut self, enabled: bool) {
        self.html_comments = enabled;
    }

    pub fn token_start(&self) -> Position {
        self.token_start
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn newline_before(&self) -> bool {
        self.newline_before
    }

    pub fn escaped(&self) -> bool {
        self.escaped
    }

    pub fn legacy_escape(&self) -> Option<LegacyEscape> {
        self.legacy_escape
    }

    /// Whether the last string literal escaped an unpaired surrogate. Its
    /// value holds U+FFFD in that position.
    pub fn lone_surrogate(&self) -> bool {
        self.lone_surrogate
    }

    /// The first invalid escape of the last template chunk. Fatal unless the
    /// template is tagged.
    pub fn template_error(&self) -> Option<&ParseError> {
        self.template_error.as_ref()
    }

    /// Span of the last template chunk's characters, without delimiters.
    pub fn template_content(&self) -> (Position, Position) {
        self.template_content
    }

    fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, self.cursor.position())
    }

    fn error_at(&self, kind: ErrorKind, at: Position) -> ParseError {
        ParseError::new(kind, at)
    }

    fn is_whitespace(ch: char) -> bool {
        matches!(
            ch,
            '\t' | '\u{000B}' | '\u{000C}' | ' ' | '\u{00A0}' | '\u{FEFF}'
        ) || (ch.is_whitespace() && !is_line_terminator(ch) && ch != '\u{0085}')
    }

    pub fn is_identifier_start(ch: char) -> bool {
        ch == '_' || ch == '$' || ch.is_ascii_alphabetic() || unicode_id_start(ch)
    }

    pub fn is_identifier_continue(ch: char) -> bool {
        ch == '_'
            || ch == '$'
            || ch.is_ascii_alphanumeric()
            || ch == '\u{200C}'
            || ch == '\u{200D}'
            || unicode_id_continue(ch)
    }

    /// Skips whitespace, line terminators and comments, noting whether a
    /// line terminator was crossed.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        if self.cursor.offset() == 0 && self.cursor.rest().starts_with("#!") {
            self.skip_line_comment();
        }
        while let Some(ch) = self.cursor.peek() {
            if Self::is_whitespace(ch) {
                self.cursor.advance();
            } else if is_line_terminator(ch) {
                self.cursor.advance();
                self.newline_before = true;
            } else if ch == '/' && self.cursor.peek_next() == Some('/') {
                self.skip_line_comment();
            } else if ch == '/' && self.cursor.peek_next() == Some('*') {
                if self.skip_block_comment()? {
                    self.newline_before = true;
                }
            } else if self.html_comments && ch == '<' && self.cursor.rest().starts_with("<!--") {
                self.skip_line_comment();
            } else if self.html_comments
                && ch == '-'
                && (self.newline_before || !self.seen_token)
                && self.cursor.rest().starts_with("-->")
            {
                self.skip_line_comment();
            } else {
                break;
            }
        }
        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.cursor.peek() {
            if is_line_terminator(ch) {
                break;
            }
            self.cursor.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<bool, ParseError> {
        let start = self.cursor.position();
        self.cursor.advance();
        self.cursor.advance();
        let mut has_line_terminator = false;
        loop {
            match self.cursor.advance() {
                Some('*') if self.cursor.peek() == Some('/') => {
                    self.cursor.advance();
                    return Ok(has_line_terminator);
                }
                Some(ch) if is_line_terminator(ch) => has_line_terminator = true,
                Some(_) => {}
                None => return Err(self.error_at(ErrorKind::UnterminatedComment, start)),
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ParseError> {
        self.newline_before = false;
        self.escaped = false;
        self.legacy_escape = None;
        self.lone_surrogate = false;
        self.template_error = None;
        self.skip_trivia()?;
        self.token_start = self.cursor.position();

        let ch = match self.cursor.peek() {
            None => return Ok(Token::Eof),
            Some(ch) => ch,
        };
        self.seen_token = true;

        if ch == '\'' || ch == '"' {
            self.cursor.advance();
            let s = self.read_string(ch)?;
            return Ok(Token::StringLiteral(s));
        }

        if ch == '`' {
            self.cursor.advance();
            let (cooked, raw, is_tail) = self.read_template_chars()?;
            return Ok(if is_tail {
                Token::NoSubstitutionTemplate(cooked, raw)
            } else {
                Token::TemplateHead(cooked, raw)
            });
        }

        if ch.is_ascii_digit()
            || (ch == '.' && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit()))
        {
            return self.read_numeric_literal();
        }

        if Self::is_identifier_start(ch) || ch == '\\' {
            let (name, escaped) = self.read_identifier_name()?;
            self.escaped = escaped;
            if escaped {
                return Ok(Token::Identifier(name));
            }
            return Ok(match name.as_str() {
                "true" => Token::BooleanLiteral(true),
                "false" => Token::BooleanLiteral(false),
                "null" => Token::NullLiteral,
                _ => match Keyword::from_str(&name) {
                    Some(kw) => Token::Keyword(kw),
                    None => Token::Identifier(name),
                },
            });
        }

        if ch == '#' {
            self.cursor.advance();
            match self.cursor.peek() {
                Some(c) if Self::is_identifier_start(c) || c == '\\' => {
                    let (name, _) = self.read_identifier_name()?;
                    return Ok(Token::PrivateName(name));
                }
                _ => return Err(self.error_at(ErrorKind::UnexpectedCharacter('#'), self.token_start)),
            }
        }

        self.cursor.advance();
        self.read_punctuator(ch)
    }

    fn read_identifier_name(&mut self) -> Result<(String, bool), ParseError> {
        let start = self.cursor.offset();
        let mut name = String::new();
        let mut escaped = false;
        let mut first = true;
        while let Some(ch) = self.cursor.peek() {
            if ch == '\\' {
                let at = self.cursor.position();
                self.cursor.advance();
                if !self.cursor.eat('u') {
                    return Err(self.error_at(ErrorKind::InvalidIdentifierEscape, at));
                }
                let cp = self.read_unicode_escape()?;
                let decoded = char::from_u32(cp)
                    .filter(|&c| {
                        if first {
                            Self::is_identifier_start(c)
                        } else {
                            Self::is_identifier_continue(c)
                        }
                    })
                    .ok_or_else(|| self.error_at(ErrorKind::InvalidIdentifierEscape, at))?;
                if !escaped {
                    name.push_str(self.cursor.slice(start, at.offset));
                    escaped = true;
                }
                name.push(decoded);
            } else if (first && Self::is_identifier_start(ch))
                || (!first && Self::is_identifier_continue(ch))
            {
                self.cursor.advance();
                if escaped {
                    name.push(ch);
                }
            } else {
                break;
            }
            first = false;
        }
        if !escaped {
            name.push_str(self.cursor.slice(start, self.cursor.offset()));
        }
        Ok((name, escaped))
    }

    fn read_string(&mut self, quote: char) -> Result<String, ParseError> {
        let start = self.cursor.offset();
        let mut units: Option<Vec<u16>> = None;
        loop {
            match self.cursor.peek() {
                None => return Err(self.error_at(ErrorKind::UnterminatedString, self.token_start)),
                Some(ch) if ch == quote => {
                    let end = self.cursor.offset();
                    self.cursor.advance();
                    return Ok(match units {
                        Some(units) => {
                            self.lone_surrogate = char::decode_utf16(units.iter().copied()).any(|c| c.is_err());
                            String::from_utf16_lossy(&units)
                        }
                        None => self.cursor.slice(start, end).to_string(),
                    });
                }
                Some('\n' | '\r') => {
                    return Err(self.error_at(ErrorKind::UnterminatedString, self.token_start));
                }
                Some('\\') => {
                    let buf = units.get_or_insert_with(|| {
                        self.cursor
                            .slice(start, self.cursor.offset())
                            .encode_utf16()
                            .collect()
                    });
                    let mut pending = std::mem::take(buf);
                    let backslash = self.cursor.position();
                    self.cursor.advance();
                    self.read_escape_sequence(&mut pending, EscapeSite::String, backslash)?;
                    units = Some(pending);
                }
                Some(ch) => {
                    self.cursor.advance();
                    if let Some(buf) = units.as_mut() {
                        push_utf16(buf, ch);
                    }
                }
            }
        }
    }

    /// Decodes the escape after the backslash at `at` into `out`.
    fn read_escape_sequence(&mut self, out: &mut Vec<u16>, site: EscapeSite, at: Position) -> Result<(), ParseError> {
        let Some(ch) = self.cursor.advance() else {
            return Err(self.error_at(ErrorKind::UnterminatedString, self.token_start));
        };
        match ch {
            'n' => out.push(0x0A),
            'r' => out.push(0x0D),
            't' => out.push(0x09),
            'b' => out.push(0x08),
            'f' => out.push(0x0C),
            'v' => out.push(0x0B),
            '0' if !self.cursor.peek().is_some_and(|c| c.is_ascii_digit()) => out.push(0),
            '0'..='7' => {
                if let EscapeSite::Template = site {
                    return Err(self.error_at(ErrorKind::TemplateOctalEscape, at));
                }
                self.legacy_escape.get_or_insert(LegacyEscape::Octal(at));
                let mut val = ch as u32 - '0' as u32;
                if let Some(d) = self.cursor.peek().and_then(|c| c.to_digit(8)) {
                    self.cursor.advance();
                    val = val * 8 + d;
                    if ch <= '3'
                        && let Some(d) = self.cursor.peek().and_then(|c| c.to_digit(8))
                    {
                        self.cursor.advance();
                        val = val * 8 + d;
                    }
                }
                out.push(val as u16);
            }
            '8' | '9' => {
                if let EscapeSite::Template = site {
                    return Err(self.error_at(ErrorKind::TemplateOctalEscape, at));
                }
                self.legacy_escape.get_or_insert(LegacyEscape::EightOrNine(at));
                out.push(ch as u16);
            }
            'x' => {
                let hi = self.cursor.peek().and_then(|c| c.to_digit(16));
                let lo = self.cursor.peek_next().and_then(|c| c.to_digit(16));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        self.cursor.advance();
                        self.cursor.advance();
                        out.push((hi * 16 + lo) as u16);
                    }
                    _ => return Err(self.error_at(ErrorKind::InvalidHexEscape, at)),
                }
            }
            'u' => {
                let cp = self.read_unicode_escape()?;
                if cp > 0xFFFF {
                    if let Some(c) = char::from_u32(cp) {
                        push_utf16(out, c);
                    }
                } else {
                    out.push(cp as u16);
                }
            }
            '\r' => {
                self.cursor.eat('\n');
            }
            c if is_line_terminator(c) => {}
            c => push_utf16(out, c),
        }
        Ok(())
    }

    /// Reads the part of a `\u` escape after the `u`, returning the code
    /// point. Surrogate halves are returned as-is.
    fn read_unicode_escape(&mut self) -> Result<u32, ParseError> {
        let at = self.cursor.position();
        if self.cursor.eat('{') {
            let mut val: u32 = 0;
            let mut digits = 0;
            loop {
                match self.cursor.peek() {
                    Some('}') if digits > 0 => {
                        self.cursor.advance();
                        return Ok(val);
                    }
                    Some(c) if c.is_ascii_hexdigit() => {
                        val = val * 16 + c.to_digit(16).unwrap_or(0);
                        if val > 0x10FFFF {
                            return Err(self.error_at(ErrorKind::UnicodeOutOfRange, at));
                        }
                        digits += 1;
                        self.cursor.advance();
                    }
                    _ => return Err(self.error(ErrorKind::InvalidUnicodeEscape)),
                }
            }
        }
        let mut val: u32 = 0;
        for _ in 0..4 {
            match self.cursor.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    self.cursor.advance();
                    val = val * 16 + d;
                }
                None => return Err(self.error(ErrorKind::InvalidUnicodeEscape)),
            }
        }
        Ok(val)
    }

    fn read_numeric_literal(&mut self) -> Result<Token, ParseError> {
        let start = self.cursor.offset();
        let first = self.cursor.peek();

        if first == Some('0') {
            match self.cursor.peek_next() {
                Some('x' | 'X') => return self.read_radix_literal(16),
                Some('o' | 'O') => return self.read_radix_literal(8),
                Some('b' | 'B') => return self.read_radix_literal(2),
                Some(c) if c.is_ascii_digit() => return self.read_legacy_octal_or_decimal(),
                Some('_') => {
                    self.cursor.advance();
                    return Err(self.error(ErrorKind::NumericSeparator));
                }
                _ => {}
            }
        }

        let mut is_integer = true;
        if first != Some('.') {
            self.read_digits(10)?;
        }
        if self.cursor.peek() == Some('.') {
            is_integer = false;
            self.cursor.advance();
            if self.cursor.peek() == Some('_') {
                return Err(self.error(ErrorKind::NumericSeparator));
            }
            self.read_digits(10)?;
        }
        if self.read_exponent()? {
            is_integer = false;
        }

        if self.cursor.peek() == Some('n') {
            if !is_integer {
                return Err(self.error(ErrorKind::InvalidBigInt));
            }
            let digits: String = self
                .cursor
                .slice(start, self.cursor.offset())
                .chars()
                .filter(|&c| c != '_')
                .collect();
            self.cursor.advance();
            self.check_after_number()?;
            return Ok(Token::BigIntLiteral(bigint_decimal(&digits, 10)));
        }
        self.check_after_number()?;

        let clean: String = self
            .cursor
            .slice(start, self.cursor.offset())
            .chars()
            .filter(|&c| c != '_')
            .collect();
        let val: f64 = clean
            .parse()
            .map_err(|_| self.error_at(ErrorKind::MissingDigits, self.token_start))?;
        Ok(Token::NumericLiteral(val))
    }

    /// Reads digits of `radix` with `_` separators between digits. Returns
    /// whether any digit was read.
    fn read_digits(&mut self, radix: u32) -> Result<bool, ParseError> {
        let mut any = false;
        let mut last_separator = false;
        loop {
            match self.cursor.peek() {
                Some('_') => {
                    if !any || last_separator {
                        return Err(self.error(ErrorKind::NumericSeparator));
                    }
                    self.cursor.advance();
                    last_separator = true;
                }
                Some(c) if c.is_digit(radix) => {
                    self.cursor.advance();
                    any = true;
                    last_separator = false;
                }
                _ => break,
            }
        }
        if last_separator {
            return Err(self.error(ErrorKind::NumericSeparator));
        }
        Ok(any)
    }

    fn read_exponent(&mut self) -> Result<bool, ParseError> {
        if !matches!(self.cursor.peek(), Some('e' | 'E')) {
            return Ok(false);
        }
        self.cursor.advance();
        if matches!(self.cursor.peek(), Some('+' | '-')) {
            self.cursor.advance();
        }
        if !self.read_digits(10)? {
            return Err(self.error(ErrorKind::MissingExponent));
        }
        Ok(true)
    }

    fn read_radix_literal(&mut self, radix: u32) -> Result<Token, ParseError> {
        self.cursor.advance(); // 0
        self.cursor.advance(); // x/o/b
        let digits_start = self.cursor.offset();
        if !self.read_digits(radix)? {
            return Err(self.error(ErrorKind::MissingDigits));
        }
        let digits: String = self
            .cursor
            .slice(digits_start, self.cursor.offset())
            .chars()
            .filter(|&c| c != '_')
            .collect();
        if self.cursor.eat('n') {
            self.check_after_number()?;
            return Ok(Token::BigIntLiteral(bigint_decimal(&digits, radix)));
        }
        self.check_after_number()?;
        let val = bigint_decimal(&digits, radix).parse().unwrap_or(f64::INFINITY);
        Ok(Token::NumericLiteral(val))
    }

    fn read_legacy_octal_or_decimal(&mut self) -> Result<Token, ParseError> {
        let start = self.cursor.offset();
        let mut is_octal = true;
        while let Some(ch) = self.cursor.peek() {
            if ch.is_ascii_digit() {
                if ch >= '8' {
                    is_octal = false;
                }
                self.cursor.advance();
            } else if ch == '_' {
                return Err(self.error(ErrorKind::NumericSeparator));
            } else {
                break;
            }
        }
        if is_octal {
            self.check_after_number()?;
            let digits = self.cursor.slice(start + 1, self.cursor.offset());
            let val = bigint_decimal(digits, 8).parse().unwrap_or(f64::INFINITY);
            return Ok(Token::LegacyOctalLiteral(val));
        }
        // NonOctalDecimalIntegerLiteral, optionally with fraction and exponent
        if self.cursor.peek() == Some('.') {
            self.cursor.advance();
            self.read_digits(10)?;
        }
        self.read_exponent()?;
        if self.cursor.peek() == Some('n') {
            return Err(self.error(ErrorKind::InvalidBigInt));
        }
        self.check_after_number()?;
        let clean: String = self
            .cursor
            .slice(start, self.cursor.offset())
            .chars()
            .filter(|&c| c != '_')
            .collect();
        let val: f64 = clean
            .parse()
            .map_err(|_| self.error_at(ErrorKind::MissingDigits, self.token_start))?;
        Ok(Token::LegacyOctalLiteral(val))
    }

    fn check_after_number(&self) -> Result<(), ParseError> {
        match self.cursor.peek() {
            Some(c) if Self::is_identifier_start(c) || c == '\\' || c.is_ascii_digit() => {
                Err(self.error(ErrorKind::IdentifierAfterNumber))
            }
            _ => Ok(()),
        }
    }

    /// Re-scans the current `/` or `/=` token as a regular expression
    /// literal. Called by the parser when a slash appears where an
    /// expression may start.
    pub fn read_regex(&mut self) -> Result<Token, ParseError> {
        let body_start = self.token_start.offset + 1;
        let mut in_class = false;
        loop {
            match self.cursor.peek() {
                None => return Err(self.error_at(ErrorKind::UnterminatedRegExp, self.token_start)),
                Some(c) if is_line_terminator(c) => {
                    return Err(self.error_at(ErrorKind::UnterminatedRegExp, self.token_start));
                }
                Some('\\') => {
                    self.cursor.advance();
                    match self.cursor.peek() {
                        Some(c) if !is_line_terminator(c) => {
                            self.cursor.advance();
                        }
                        _ => {
                            return Err(self.error_at(ErrorKind::UnterminatedRegExp, self.token_start));
                        }
                    }
                }
                Some('[') => {
                    in_class = true;
                    self.cursor.advance();
                }
                Some(']') => {
                    in_class = false;
                    self.cursor.advance();
                }
                Some('/') if !in_class => break,
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
        let pattern = self.cursor.slice(body_start, self.cursor.offset()).to_string();
        self.cursor.advance();

        let flags_start = self.cursor.offset();
        while let Some(c) = self.cursor.peek() {
            if c == '\\' {
                return Err(self.error(ErrorKind::InvalidRegExpFlag(c)));
            }
            if !Self::is_identifier_continue(c) {
                break;
            }
            self.cursor.advance();
        }
        let flags = self.cursor.slice(flags_start, self.cursor.offset()).to_string();
        regexp::validate_flags(&flags).map_err(|kind| self.error_at(kind, self.token_start))?;
        regexp::validate_pattern(&pattern, &flags)
            .map_err(|reason| self.error_at(ErrorKind::InvalidRegExp(pattern.clone(), reason), self.token_start))?;
        Ok(Token::RegExpLiteral { pattern, flags })
    }

    /// Template characters up to `` ` `` or `${`: the cooked value (`None`
    /// when an escape is invalid), the raw text, and whether the chunk ends
    /// the template.
    fn read_template_chars(&mut self) -> Result<(Option<String>, String, bool), ParseError> {
        let content_start = self.cursor.position();
        let mut cooked: Option<Vec<u16>> = Some(Vec::new());
        let mut raw = String::new();
        loop {
            let here = self.cursor.position();
            match self.cursor.peek() {
                None => return Err(self.error_at(ErrorKind::UnterminatedTemplate, self.token_start)),
                Some('`') => {
                    self.template_content = (content_start, here);
                    self.cursor.advance();
                    return Ok((cooked.map(|c| String::from_utf16_lossy(&c)), raw, true));
                }
                Some('$') if self.cursor.peek_next() == Some('{') => {
                    self.template_content = (content_start, here);
                    self.cursor.advance();
                    self.cursor.advance();
                    return Ok((cooked.map(|c| String::from_utf16_lossy(&c)), raw, false));
                }
                Some('\\') => {
                    self.cursor.advance();
                    let before = self.cursor.offset();
                    let mut decoded = Vec::new();
                    match self.read_escape_sequence(&mut decoded, EscapeSite::Template, here) {
                        Ok(()) => {
                            if let Some(c) = cooked.as_mut() {
                                c.extend_from_slice(&decoded);
                            }
                        }
                        Err(err) => {
                            if self.template_error.is_none() {
                                self.template_error = Some(err);
                            }
                            cooked = None;
                        }
                    }
                    raw.push('\\');
                    raw.push_str(&normalize_line_endings(self.cursor.slice(before, self.cursor.offset())));
                }
                Some('\r') => {
                    self.cursor.advance();
                    self.cursor.eat('\n');
                    raw.push('\n');
                    if let Some(c) = cooked.as_mut() {
                        c.push(0x0A);
                    }
                }
                Some(ch) => {
                    self.cursor.advance();
                    raw.push(ch);
                    if let Some(c) = cooked.as_mut() {
                        push_utf16(c, ch);
                    }
                }
            }
        }
    }

    /// Continues a template after the `}` closing a substitution.
    pub fn read_template_continuation(&mut self) -> Result<Token, ParseError> {
        self.template_error = None;
        let (cooked, raw, is_tail) = self.read_template_chars()?;
        if is_tail {
            Ok(Token::TemplateTail(cooked, raw))
        } else {
            Ok(Token::TemplateMiddle(cooked, raw))
        }
    }

    fn read_punctuator(&mut self, ch: char) -> Result<Token, ParseError> {
        let c = &mut self.cursor;
        let token = match ch {
            '{' => Token::LeftBrace,
            '}' => Token::RightBrace,
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '[' => Token::LeftBracket,
            ']' => Token::RightBracket,
            ';' => Token::Semicolon,
            ',' => Token::Comma,
            '~' => Token::Tilde,
            ':' => Token::Colon,

            '.' => {
                if c.peek() == Some('.') && c.peek_next() == Some('.') {
                    c.advance();
                    c.advance();
                    Token::Ellipsis
                } else {
                    Token::Dot
                }
            }

            '?' => {
                if c.eat('?') {
                    if c.eat('=') {
                        Token::NullishAssign
                    } else {
                        Token::NullishCoalescing
                    }
                } else if c.peek() == Some('.') && !c.peek_next().is_some_and(|d| d.is_ascii_digit()) {
                    c.advance();
                    Token::OptionalChain
                } else {
                    Token::Question
                }
            }

            '<' => {
                if c.eat('<') {
                    if c.eat('=') { Token::LeftShiftAssign } else { Token::LeftShift }
                } else if c.eat('=') {
                    Token::LessThanEqual
                } else {
                    Token::LessThan
                }
            }

            '>' => {
                if c.eat('>') {
                    if c.eat('>') {
                        if c.eat('=') {
                            Token::UnsignedRightShiftAssign
                        } else {
                            Token::UnsignedRightShift
                        }
                    } else if c.eat('=') {
                        Token::RightShiftAssign
                    } else {
                        Token::RightShift
                    }
                } else if c.eat('=') {
                    Token::GreaterThanEqual
                } else {
                    Token::GreaterThan
                }
            }

            '=' => {
                if c.eat('=') {
                    if c.eat('=') { Token::StrictEqual } else { Token::Equal }
                } else if c.eat('>') {
                    Token::Arrow
                } else {
                    Token::Assign
                }
            }

            '!' => {
                if c.eat('=') {
                    if c.eat('=') { Token::StrictNotEqual } else { Token::NotEqual }
                } else {
                    Token::Bang
                }
            }

            '+' => {
                if c.eat('+') {
                    Token::Increment
                } else if c.eat('=') {
                    Token::PlusAssign
                } else {
                    Token::Plus
                }
            }

            '-' => {
                if c.eat('-') {
                    Token::Decrement
                } else if c.eat('=') {
                    Token::MinusAssign
                } else {
                    Token::Minus
                }
            }

            '*' => {
                if c.eat('*') {
                    if c.eat('=') { Token::ExponentAssign } else { Token::Exponent }
                } else if c.eat('=') {
                    Token::StarAssign
                } else {
                    Token::Star
                }
            }

            '/' => {
                if c.eat('=') { Token::SlashAssign } else { Token::Slash }
            }

            '%' => {
                if c.eat('=') { Token::PercentAssign } else { Token::Percent }
            }

            '&' => {
                if c.eat('&') {
                    if c.eat('=') { Token::LogicalAndAssign } else { Token::LogicalAnd }
                } else if c.eat('=') {
                    Token::AmpersandAssign
                } else {
                    Token::Ampersand
                }
            }

            '|' => {
                if c.eat('|') {
                    if c.eat('=') { Token::LogicalOrAssign } else { Token::LogicalOr }
                } else if c.eat('=') {
                    Token::PipeAssign
                } else {
                    Token::Pipe
                }
            }

            '^' => {
                if c.eat('=') { Token::CaretAssign } else { Token::Caret }
            }

            _ => return Err(self.error_at(ErrorKind::UnexpectedCharacter(ch), self.token_start)),
        };
        Ok(token)
    }

    #[cfg(test)]
    pub fn tokenize_all(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                tokens.push(token);
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }
}

fn push_utf16(out: &mut Vec<u16>, ch: char) {
    let mut buf = [0u16; 2];
    out.extend_from_slice(ch.encode_utf16(&mut buf));
}

fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

/// Decimal digits of an integer literal written in `radix`.
fn bigint_decimal(digits: &str, radix: u32) -> String {
    BigUint::parse_bytes(digits.as_bytes(), radix)
        .map(|n| n.to_string())
        .unwrap_or_else(|| "0".to_string())
}

fn unicode_id_start(ch: char) -> bool {
    !ch.is_ascii()
        && (unicode_ident::is_xid_start(ch)
            || matches!(ch, '\u{1885}' | '\u{1886}' | '\u{2118}' | '\u{212E}' | '\u{309B}' | '\u{309C}'))
}

fn unicode_id_continue(ch: char) -> bool {
    !ch.is_ascii() && (unicode_ident::is_xid_continue(ch) || unicode_id_start(ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(src);
        lexer.tokenize_all().unwrap()
    }

    fn lex_err(src: &str) -> ErrorKind {
        let mut lexer = Lexer::new(src);
        lexer.tokenize_all().unwrap_err().kind
    }

    #[test]
    fn empty_source() {
        assert_eq!(lex(""), vec![Token::Eof]);
    }

    #[test]
    fn identifiers_and_keywords() {
        assert_eq!(
            lex("var x = 42;"),
            vec![
                Token::Keyword(Keyword::Var),
                Token::Identifier("x".into()),
                Token::Assign,
                Token::NumericLiteral(42.0),
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn escaped_keyword_stays_identifier() {
        let mut lexer = Lexer::new(r"\u0061wait");
        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("await".into()));
        assert!(lexer.escaped());
        assert_eq!(lex(r"a\u{62}c"), vec![Token::Identifier("abc".into()), Token::Eof]);
        assert_eq!(lex_err(r"\u0030x"), ErrorKind::InvalidIdentifierEscape);
        assert_eq!(lex_err(r"a\x62"), ErrorKind::InvalidIdentifierEscape);
    }

    #[test]
    fn string_literals() {
        assert_eq!(lex(r#""hello""#), vec![Token::StringLiteral("hello".into()), Token::Eof]);
        assert_eq!(lex(r"'he\nllo'"), vec![Token::StringLiteral("he\nllo".into()), Token::Eof]);
        assert_eq!(lex("'a\\\nb'"), vec![Token::StringLiteral("ab".into()), Token::Eof]);
        assert_eq!(lex_err("'abc\n'"), ErrorKind::UnterminatedString);
    }

    #[test]
    fn legacy_escapes_are_recorded() {
        let mut lexer = Lexer::new(r"'\101'");
        assert_eq!(lexer.next_token().unwrap(), Token::StringLiteral("A".into()));
        assert!(matches!(lexer.legacy_escape(), Some(LegacyEscape::Octal(_))));
        let mut lexer = Lexer::new(r"'\8'");
        assert_eq!(lexer.next_token().unwrap(), Token::StringLiteral("8".into()));
        assert!(matches!(lexer.legacy_escape(), Some(LegacyEscape::EightOrNine(_))));
        let mut lexer = Lexer::new(r"'\0'");
        lexer.next_token().unwrap();
        assert_eq!(lexer.legacy_escape(), None);
    }

    #[test]
    fn legacy_escape_points_at_backslash() {
        let mut lexer = Lexer::new(r"'ab\01'");
        lexer.next_token().unwrap();
        assert!(matches!(lexer.legacy_escape(), Some(LegacyEscape::Octal(at)) if at.offset == 3));
        let mut lexer = Lexer::new(r"'a\9'");
        lexer.next_token().unwrap();
        assert!(matches!(lexer.legacy_escape(), Some(LegacyEscape::EightOrNine(at)) if at.offset == 2));
    }

    #[test]
    fn unpaired_surrogates_are_flagged() {
        let mut lexer = Lexer::new(r"'\uD800'");
        assert_eq!(lexer.next_token().unwrap(), Token::StringLiteral("\u{FFFD}".into()));
        assert!(lexer.lone_surrogate());
        let mut lexer = Lexer::new(r"'\uD83D\uDE00' 'x'");
        lexer.next_token().unwrap();
        assert!(!lexer.lone_surrogate());
        let mut lexer = Lexer::new(r"'\uDE00' 'x'");
        lexer.next_token().unwrap();
        assert!(lexer.lone_surrogate());
        lexer.next_token().unwrap();
        assert!(!lexer.lone_surrogate());
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(lex("0xff"), vec![Token::NumericLiteral(255.0), Token::Eof]);
        assert_eq!(lex("0b1010"), vec![Token::NumericLiteral(10.0), Token::Eof]);
        assert_eq!(lex("0o77"), vec![Token::NumericLiteral(63.0), Token::Eof]);
        assert_eq!(lex("1_000"), vec![Token::NumericLiteral(1000.0), Token::Eof]);
        assert_eq!(lex("1e3"), vec![Token::NumericLiteral(1000.0), Token::Eof]);
        assert_eq!(lex(".5"), vec![Token::NumericLiteral(0.5), Token::Eof]);
        assert_eq!(lex("5."), vec![Token::NumericLiteral(5.0), Token::Eof]);
        assert_eq!(lex("010"), vec![Token::LegacyOctalLiteral(8.0), Token::Eof]);
        assert_eq!(lex("09.5"), vec![Token::LegacyOctalLiteral(9.5), Token::Eof]);
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!(lex_err("1__0"), ErrorKind::NumericSeparator);
        assert_eq!(lex_err("1_"), ErrorKind::NumericSeparator);
        assert_eq!(lex_err("0_1"), ErrorKind::NumericSeparator);
        assert_eq!(lex_err("0x"), ErrorKind::MissingDigits);
        assert_eq!(lex_err("1e"), ErrorKind::MissingExponent);
        assert_eq!(lex_err("3in x"), ErrorKind::IdentifierAfterNumber);
        assert_eq!(lex_err("1.5n"), ErrorKind::InvalidBigInt);
    }

    #[test]
    fn boolean_null() {
        assert_eq!(
            lex("true false null"),
            vec![
                Token::BooleanLiteral(true),
                Token::BooleanLiteral(false),
                Token::NullLiteral,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn punctuators() {
        assert_eq!(lex("==="), vec![Token::StrictEqual, Token::Eof]);
        assert_eq!(lex("!=="), vec![Token::StrictNotEqual, Token::Eof]);
        assert_eq!(lex("=>"), vec![Token::Arrow, Token::Eof]);
        assert_eq!(lex("..."), vec![Token::Ellipsis, Token::Eof]);
        assert_eq!(lex(">>>="), vec![Token::UnsignedRightShiftAssign, Token::Eof]);
        assert_eq!(lex("a?.5:1")[1], Token::Question);
        assert_eq!(lex("a?.b")[1], Token::OptionalChain);
    }

    #[test]
    fn comments_set_newline_flag() {
        let mut lexer = Lexer::new("a /* x\n */ b // c\nd");
        lexer.next_token().unwrap();
        assert!(!lexer.newline_before());
        lexer.next_token().unwrap();
        assert!(lexer.newline_before());
        lexer.next_token().unwrap();
        assert!(lexer.newline_before());
        assert_eq!(lex_err("/* open"), ErrorKind::UnterminatedComment);
    }

    #[test]
    fn hashbang_and_html_comments() {
        assert_eq!(lex("#!/usr/bin/env node\n42"), vec![Token::NumericLiteral(42.0), Token::Eof]);
        let mut lexer = Lexer::new("x <!-- hidden\n--> also hidden\ny");
        lexer.set_html_comments(true);
        assert_eq!(
            lexer.tokenize_all().unwrap(),
            vec![Token::Identifier("x".into()), Token::Identifier("y".into()), Token::Eof]
        );
        assert_eq!(lex("x<!--y")[1], Token::LessThan);
        let mut lexer = Lexer::new("x --> y");
        lexer.set_html_comments(true);
        assert_eq!(lexer.tokenize_all().unwrap()[1], Token::Decrement);
    }

    #[test]
    fn template_literal() {
        assert_eq!(
            lex("`hello`"),
            vec![Token::NoSubstitutionTemplate(Some("hello".into()), "hello".into()), Token::Eof]
        );
        assert_eq!(
            lex("`a\r\nb`"),
            vec![Token::NoSubstitutionTemplate(Some("a\nb".into()), "a\nb".into()), Token::Eof]
        );
    }

    #[test]
    fn template_invalid_escape_is_soft() {
        let mut lexer = Lexer::new(r"`\unicode`");
        assert_eq!(
            lexer.next_token().unwrap(),
            Token::NoSubstitutionTemplate(None, r"\unicode".into())
        );
        assert_eq!(lexer.template_error().map(|e| e.kind.clone()), Some(ErrorKind::InvalidUnicodeEscape));
        let mut lexer = Lexer::new(r"`\01`");
        lexer.next_token().unwrap();
        assert_eq!(lexer.template_error().map(|e| e.kind.clone()), Some(ErrorKind::TemplateOctalEscape));
    }

    #[test]
    fn template_continuation() {
        let mut lexer = Lexer::new("`a${x}b${y}c`");
        assert_eq!(lexer.next_token().unwrap(), Token::TemplateHead(Some("a".into()), "a".into()));
        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("x".into()));
        assert_eq!(lexer.next_token().unwrap(), Token::RightBrace);
        assert_eq!(
            lexer.read_template_continuation().unwrap(),
            Token::TemplateMiddle(Some("b".into()), "b".into())
        );
        assert_eq!(lexer.next_token().unwrap(), Token::Identifier("y".into()));
        assert_eq!(lexer.next_token().unwrap(), Token::RightBrace);
        assert_eq!(
            lexer.read_template_continuation().unwrap(),
            Token::TemplateTail(Some("c".into()), "c".into())
        );
    }

    #[test]
    fn regex_rescan() {
        let mut lexer = Lexer::new("/[/]+\\//gi");
        assert_eq!(lexer.next_token().unwrap(), Token::Slash);
        assert_eq!(
            lexer.read_regex().unwrap(),
            Token::RegExpLiteral {
                pattern: "[/]+\\/".into(),
                flags: "gi".into()
            }
        );
        let mut lexer = Lexer::new("/a/gg");
        lexer.next_token().unwrap();
        assert_eq!(lexer.read_regex().unwrap_err().kind, ErrorKind::DuplicateRegExpFlag('g'));
        let mut lexer = Lexer::new("/=a/");
        assert_eq!(lexer.next_token().unwrap(), Token::SlashAssign);
        assert_eq!(
            lexer.read_regex().unwrap(),
            Token::RegExpLiteral {
                pattern: "=a".into(),
                flags: String::new()
            }
        );
    }

    #[test]
    fn bigint_literal() {
        assert_eq!(lex("42n"), vec![Token::BigIntLiteral("42".into()), Token::Eof]);
        assert_eq!(lex("0xFFn"), vec![Token::BigIntLiteral("255".into()), Token::Eof]);
        assert_eq!(lex("1_0n"), vec![Token::BigIntLiteral("10".into()), Token::Eof]);
    }

    #[test]
    fn private_names() {
        assert_eq!(lex("#x"), vec![Token::PrivateName("x".into()), Token::Eof]);
        assert_eq!(lex_err("# x"), ErrorKind::UnexpectedCharacter('#'));
    }

    #[test]
    fn unicode_escape_in_string() {
        assert_eq!(lex(r#""\u0041""#), vec![Token::StringLiteral("A".into()), Token::Eof]);
        assert_eq!(lex(r#""\u{1F600}""#), vec![Token::StringLiteral("😀".into()), Token::Eof]);
        assert_eq!(lex(r#""\uD83D\uDE00""#), vec![Token::StringLiteral("😀".into()), Token::Eof]);
        assert_eq!(lex_err(r#""\u{110000}""#), ErrorKind::UnicodeOutOfRange);
        assert_eq!(lex_err(r#""\x4""#), ErrorKind::InvalidHexEscape);
    }
}
