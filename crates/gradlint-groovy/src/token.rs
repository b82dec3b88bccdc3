//! Lexer for the Groovy-flavored build-script subset.
//!
//! Tokens carry both byte offsets into the source (for raw-text recovery of
//! opaque expressions) and 1-indexed line/column positions (for spans).
//! Newlines are tokens because they terminate statements and command-style
//! argument lists.

use gradlint_error::{Error, Result};
use strum_macros::{Display, IntoStaticStr};

use gradlint_core::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum TokenKind {
    Ident,
    /// Single-quoted string, or a double-quoted one without interpolation.
    Str,
    /// Double-quoted string containing `$` interpolation.
    GStr,
    Num,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Dot,
    Eq,
    Semi,
    Newline,
    /// Any operator or character the subset does not model.
    Unknown,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range into the source, end exclusive.
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub col: u32,
    pub end_line: u32,
    /// Inclusive column of the last character.
    pub end_col: u32,
}

impl Token {
    pub fn span(&self) -> Span {
        Span::new(self.line, self.col, self.end_line, self.end_col)
    }

    /// Raw lexeme text.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

/// Lex the whole source. The returned vector always ends with an [`TokenKind::Eof`]
/// token. Fails only on unterminated string literals.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).run()
}

/// Resolve the escape sequences the subset understands; unknown escapes keep
/// the escaped character verbatim.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

struct Lexer<'s> {
    source: &'s str,
    chars: Vec<(usize, char)>,
    pos: usize,
    line: u32,
    col: u32,
    tokens: Vec<Token>,
}

impl<'s> Lexer<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
            line: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).map(|&(_, c)| c)
    }

    /// Current byte offset, clamped to the source length at the end.
    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|&(o, _)| o)
            .unwrap_or(self.source.len())
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        let &(offset, ch) = self.chars.get(self.pos)?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some((offset, ch))
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: u32, col: u32, end_col: u32) {
        self.tokens.push(Token {
            kind,
            start,
            end: self.offset(),
            line,
            col,
            end_line: line,
            end_col,
        });
    }

    fn single(&mut self, kind: TokenKind) {
        let (line, col) = (self.line, self.col);
        let start = self.offset();
        self.bump();
        self.push(kind, start, line, col, col);
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\n' => self.single(TokenKind::Newline),
                '/' if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                '/' if self.peek_at(1) == Some('*') => {
                    self.bump();
                    self.bump();
                    while let Some(c) = self.peek() {
                        if c == '*' && self.peek_at(1) == Some('/') {
                            self.bump();
                            self.bump();
                            break;
                        }
                        self.bump();
                    }
                }
                '\'' | '"' => self.lex_string(ch)?,
                c if c.is_ascii_digit() => self.lex_number(),
                c if c.is_alphabetic() || c == '_' || c == '$' => self.lex_ident(),
                '{' => self.single(TokenKind::LBrace),
                '}' => self.single(TokenKind::RBrace),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                '[' => self.single(TokenKind::LBracket),
                ']' => self.single(TokenKind::RBracket),
                ',' => self.single(TokenKind::Comma),
                ':' => self.single(TokenKind::Colon),
                '.' => self.single(TokenKind::Dot),
                ';' => self.single(TokenKind::Semi),
                '=' => {
                    if self.peek_at(1) == Some('=') {
                        let (line, col) = (self.line, self.col);
                        let start = self.offset();
                        self.bump();
                        self.bump();
                        self.push(TokenKind::Unknown, start, line, col, col + 1);
                    } else {
                        self.single(TokenKind::Eq);
                    }
                }
                _ => self.single(TokenKind::Unknown),
            }
        }
        let end = self.source.len();
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            start: end,
            end,
            line: self.line,
            col: self.col,
            end_line: self.line,
            end_col: self.col,
        });
        Ok(self.tokens)
    }

    fn lex_ident(&mut self) {
        let (line, col) = (self.line, self.col);
        let start = self.offset();
        let mut end_col = col;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                end_col = self.col;
                self.bump();
            } else {
                break;
            }
        }
        self.push(TokenKind::Ident, start, line, col, end_col);
    }

    fn lex_number(&mut self) {
        let (line, col) = (self.line, self.col);
        let start = self.offset();
        let mut end_col = col;
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            let take = c.is_ascii_digit()
                || (c == '.'
                    && !seen_dot
                    && self.peek_at(1).is_some_and(|n| n.is_ascii_digit()));
            if !take {
                break;
            }
            if c == '.' {
                seen_dot = true;
            }
            end_col = self.col;
            self.bump();
        }
        self.push(TokenKind::Num, start, line, col, end_col);
    }

    fn lex_string(&mut self, quote: char) -> Result<()> {
        let (line, col) = (self.line, self.col);
        let start = self.offset();
        self.bump();
        let mut interpolated = false;
        let end_col;
        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(Error::syntax_error(format!(
                        "unterminated string literal at line {line}"
                    ))
                    .with_operation("groovy::tokenize"));
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                Some('$') if quote == '"' => {
                    interpolated = true;
                    self.bump();
                }
                Some(c) if c == quote => {
                    end_col = self.col;
                    self.bump();
                    break;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let kind = if interpolated {
            TokenKind::GStr
        } else {
            TokenKind::Str
        };
        self.push(kind, start, line, col, end_col);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_basic_kinds() {
        assert_eq!(
            kinds("apply plugin: 'java'"),
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Str,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_positions_are_one_indexed_inclusive() {
        let tokens = tokenize("id 'java'").unwrap();
        assert_eq!(tokens[0].span(), Span::new(1, 1, 1, 2));
        assert_eq!(tokens[1].span(), Span::new(1, 4, 1, 9));
        assert_eq!(tokens[1].text("id 'java'"), "'java'");
    }

    #[test]
    fn test_newlines_and_comments() {
        let source = "a // trailing\n/* block\ncomment */ b\n";
        let tokens = tokenize(source).unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Ident,
                TokenKind::Newline,
                TokenKind::Ident,
                TokenKind::Newline,
                TokenKind::Eof
            ]
        );
        // `b` sits on line 3 after the block comment
        assert_eq!(tokens[2].line, 3);
        assert_eq!(tokens[2].col, 12);
    }

    #[test]
    fn test_interpolated_string_detection() {
        let tokens = tokenize(r#"x "org:lib:$v" 'plain'"#).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::GStr);
        assert_eq!(tokens[2].kind, TokenKind::Str);
    }

    #[test]
    fn test_escaped_quote_does_not_terminate() {
        let tokens = tokenize(r"'it\'s'").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].end_col, 7);
        assert_eq!(unescape(r"it\'s"), "it's");
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        assert!(tokenize("id 'oops\n").is_err());
    }

    #[test]
    fn test_double_equals_is_not_assignment() {
        let tokens = tokenize("a == b").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Unknown);
        assert_eq!(tokens[1].end_col, 4);
    }
}
