use std::str::Chars;

/// A point in the source: byte offset plus 1-based line and 0-based column
/// (counted in Unicode scalar values).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position {
        offset: 0,
        line: 1,
        column: 0,
    };
}

pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Character cursor over the source text. Cloning is cheap, which is what
/// the lexer relies on for lookahead.
#[derive(Clone)]
pub struct Cursor<'a> {
    source: &'a str,
    chars: Chars<'a>,
    current: Option<char>,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            current,
            offset: 0,
            line: 1,
            column: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn peek(&self) -> Option<char> {
        self.current
    }

    pub fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    pub fn peek_at(&self, n: usize) -> Option<char> {
        if n == 0 {
            return self.current;
        }
        self.chars.clone().nth(n - 1)
    }

    /// Consumes one character, keeping line/column in step. CR LF counts as
    /// a single line break, attributed to the LF.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.current?;
        self.offset += ch.len_utf8();
        self.current = self.chars.next();
        match ch {
            '\r' if self.current == Some('\n') => self.column += 1,
            c if is_line_terminator(c) => {
                self.line += 1;
                self.column = 0;
            }
            _ => self.column += 1,
        }
        Some(ch)
    }

    pub fn eat(&mut self, expected: char) -> bool {
        if self.current == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn is_eof(&self) -> bool {
        self.current.is_none()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn position(&self) -> Position {
        Position {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.source[start..end]
    }

    pub fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }
}

/// Offsets of every line start, for mapping a bare byte offset back to a
/// line/column pair when reporting errors against an earlier node.
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = source.char_indices().peekable();
        while let Some((i, ch)) = chars.next() {
            match ch {
                '\r' => {
                    if let Some((_, '\n')) = chars.peek() {
                        continue;
                    }
                    line_starts.push(i + 1);
                }
                '\n' => line_starts.push(i + 1),
                '\u{2028}' | '\u{2029}' => line_starts.push(i + ch.len_utf8()),
                _ => {}
            }
        }
        Self { line_starts }
    }

    pub fn position_of(&self, source: &str, offset: usize) -> Position {
        let offset = offset.min(source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.line_starts[line];
        let column = source
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        Position {
            offset,
            line: line as u32 + 1,
            column: column as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_tracks_lines_and_columns() {
        let mut cursor = Cursor::new("ab\ncd");
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.position(), Position { offset: 2, line: 1, column: 2 });
        cursor.advance();
        assert_eq!(cursor.position(), Position { offset: 3, line: 2, column: 0 });
    }

    #[test]
    fn crlf_is_one_line_break() {
        let mut cursor = Cursor::new("a\r\nb");
        while cursor.peek() != Some('b') {
            cursor.advance();
        }
        assert_eq!(cursor.position().line, 2);
        assert_eq!(cursor.position().column, 0);
    }

    #[test]
    fn columns_count_scalar_values() {
        let mut cursor = Cursor::new("é=");
        cursor.advance();
        assert_eq!(cursor.position().offset, 2);
        assert_eq!(cursor.position().column, 1);
    }

    #[test]
    fn line_index_matches_cursor() {
        let source = "x\r\n\u{2028}yz\rw";
        let index = LineIndex::new(source);
        let mut cursor = Cursor::new(source);
        loop {
            assert_eq!(index.position_of(source, cursor.offset()), cursor.position());
            if cursor.advance().is_none() {
                break;
            }
        }
    }
}
