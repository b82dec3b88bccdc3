//! Recursive-descent parser for the build-script subset.
//!
//! The parser is deliberately tolerant: it fully models the statement shapes
//! the lint vocabulary needs (blocks, calls in parenthesized and command
//! syntax, chained juxtaposed calls, assignments, named-argument maps) and
//! degrades everything else to [`NodeKind::Opaque`] nodes carrying the raw
//! source text, so one exotic expression never aborts a whole file. Hard
//! errors are reserved for structurally broken input such as unbalanced
//! braces.

use smallvec::{SmallVec, smallvec};

use gradlint_core::{
    Assign, Call, ChainedCall, Literal, NamedArg, NodeId, NodeKind, ScriptTree, Span,
};
use gradlint_error::{Error, Result};

use crate::token::{self, Token, TokenKind};

/// Parse one build script into a [`ScriptTree`].
pub fn parse(source: &str) -> Result<ScriptTree> {
    let tokens = token::tokenize(source)?;
    Parser {
        source,
        tokens,
        pos: 0,
        tree: ScriptTree::new(),
    }
    .run()
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    tree: ScriptTree,
}

fn split_path(mut segments: Vec<String>) -> (Vec<String>, String) {
    let name = segments.pop().unwrap_or_default();
    (segments, name)
}

fn is_command_arg_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Str | TokenKind::GStr | TokenKind::Num | TokenKind::Ident | TokenKind::LBracket
    )
}

impl Parser<'_> {
    fn cur(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn kind(&self) -> TokenKind {
        self.cur().kind
    }

    fn nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Consume the current token, returning its index. Never advances past
    /// the trailing Eof token.
    fn bump(&mut self) -> usize {
        let idx = self.pos;
        if self.kind() != TokenKind::Eof {
            self.pos += 1;
        }
        idx
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<usize> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(Error::syntax_error(format!(
                "expected {} at line {}",
                what,
                self.cur().line
            ))
            .with_operation("groovy::parse"))
        }
    }

    fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.bump();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.kind(), TokenKind::Newline | TokenKind::Semi) {
            self.bump();
        }
    }

    fn token_text(&self, idx: usize) -> &str {
        self.tokens[idx].text(self.source)
    }

    fn span_between(&self, a: usize, b: usize) -> Span {
        let s = &self.tokens[a];
        let e = &self.tokens[b];
        Span::new(s.line, s.col, e.end_line, e.end_col)
    }

    fn span_from(&self, start: usize) -> Span {
        self.span_between(start, self.pos.saturating_sub(1).max(start))
    }

    fn run(mut self) -> Result<ScriptTree> {
        let mut stmts: SmallVec<[NodeId; 8]> = smallvec![];
        self.skip_separators();
        while !self.at(TokenKind::Eof) {
            if self.at(TokenKind::RBrace) {
                return Err(Error::syntax_error(format!(
                    "unmatched '}}' at line {}",
                    self.cur().line
                ))
                .with_operation("groovy::parse"));
            }
            stmts.push(self.parse_statement()?);
            self.skip_separators();
        }
        let span = match (stmts.first(), stmts.last()) {
            (Some(&first), Some(&last)) => self.tree.span(first).to(self.tree.span(last)),
            _ => Span::point(1, 1),
        };
        let root = self.tree.add(span, NodeKind::Script(stmts));
        self.tree.set_root(root);
        Ok(self.tree)
    }

    fn parse_statement(&mut self) -> Result<NodeId> {
        match self.kind() {
            TokenKind::Ident => self.parse_ident_statement(),
            _ => self.parse_opaque_statement(),
        }
    }

    /// A statement opening with a dotted identifier path: an assignment, a
    /// call in one of its surface forms, or a bare reference.
    fn parse_ident_statement(&mut self) -> Result<NodeId> {
        let start = self.pos;
        let segments = self.parse_path();
        let path_span = self.span_from(start);
        match self.kind() {
            TokenKind::Eq => {
                self.bump();
                let value = self.parse_expression()?;
                let span = path_span.to(self.tree.span(value));
                Ok(self.tree.add(
                    span,
                    NodeKind::Assign(Assign {
                        target: segments,
                        value,
                    }),
                ))
            }
            TokenKind::LParen => self.finish_paren_call(segments, path_span),
            TokenKind::LBrace => {
                let closure = self.parse_closure()?;
                let (receiver, name) = split_path(segments);
                let span = path_span.to(self.tree.span(closure));
                Ok(self.tree.add(
                    span,
                    NodeKind::Call(Call {
                        receiver,
                        name,
                        args: smallvec![],
                        chain: Vec::new(),
                        closure: Some(closure),
                    }),
                ))
            }
            k if is_command_arg_start(k) => self.finish_command_call(segments, path_span),
            _ => Ok(self.tree.add(path_span, NodeKind::Path(segments))),
        }
    }

    /// `Ident (. Ident)*`; consumes as far as the dotted chain goes.
    fn parse_path(&mut self) -> Vec<String> {
        let mut segments = vec![self.token_text(self.pos).to_string()];
        self.bump();
        while self.at(TokenKind::Dot) && self.nth_kind(1) == TokenKind::Ident {
            self.bump();
            segments.push(self.token_text(self.pos).to_string());
            self.bump();
        }
        segments
    }

    fn finish_paren_call(&mut self, segments: Vec<String>, path_span: Span) -> Result<NodeId> {
        self.bump();
        let args = self.parse_args(true)?;
        self.skip_newlines();
        let rparen = self.expect(TokenKind::RParen, "')'")?;
        let mut end_span = self.tokens[rparen].span();
        let chain = self.parse_chain(&mut end_span)?;
        let closure = if self.at(TokenKind::LBrace) {
            let c = self.parse_closure()?;
            end_span = self.tree.span(c);
            Some(c)
        } else {
            None
        };
        let (receiver, name) = split_path(segments);
        Ok(self.tree.add(
            path_span.to(end_span),
            NodeKind::Call(Call {
                receiver,
                name,
                args,
                chain,
                closure,
            }),
        ))
    }

    fn finish_command_call(&mut self, segments: Vec<String>, path_span: Span) -> Result<NodeId> {
        let args = self.parse_args(false)?;
        let mut end_span = args
            .last()
            .map(|&arg| self.tree.span(arg))
            .unwrap_or(path_span);
        let chain = self.parse_chain(&mut end_span)?;
        let closure = if self.at(TokenKind::LBrace) {
            let c = self.parse_closure()?;
            end_span = self.tree.span(c);
            Some(c)
        } else {
            None
        };
        let (receiver, name) = split_path(segments);
        Ok(self.tree.add(
            path_span.to(end_span),
            NodeKind::Call(Call {
                receiver,
                name,
                args,
                chain,
                closure,
            }),
        ))
    }

    /// Comma-separated arguments. `key: value` pairs, wherever they appear in
    /// the list, are gathered into a single [`NodeKind::NamedArgs`] node that
    /// takes the position of the first pair.
    fn parse_args(&mut self, in_parens: bool) -> Result<SmallVec<[NodeId; 4]>> {
        let mut args: SmallVec<[NodeId; 4]> = smallvec![];
        let mut named: Vec<NamedArg> = Vec::new();
        let mut named_at = 0usize;
        let mut named_span: Option<Span> = None;
        if in_parens {
            self.skip_newlines();
            if self.at(TokenKind::RParen) {
                return Ok(args);
            }
        }
        loop {
            let is_named = matches!(self.kind(), TokenKind::Ident | TokenKind::Str)
                && self.nth_kind(1) == TokenKind::Colon;
            if is_named {
                let key_idx = self.bump();
                self.bump();
                if in_parens {
                    self.skip_newlines();
                }
                let value = self.parse_expression()?;
                if named.is_empty() {
                    named_at = args.len();
                    named_span = Some(self.tokens[key_idx].span());
                }
                let value_span = self.tree.span(value);
                named_span = named_span.map(|s| s.to(value_span));
                named.push(NamedArg {
                    key: self.key_text(key_idx),
                    value,
                });
            } else {
                args.push(self.parse_expression()?);
            }
            if in_parens {
                self.skip_newlines();
            }
            if self.at(TokenKind::Comma) {
                self.bump();
                // a list may continue on the next line in either form
                self.skip_newlines();
                continue;
            }
            break;
        }
        if !named.is_empty() {
            let span = named_span.unwrap_or_else(|| Span::point(1, 1));
            let node = self.tree.add(span, NodeKind::NamedArgs(named));
            args.insert(named_at.min(args.len()), node);
        }
        Ok(args)
    }

    fn key_text(&self, idx: usize) -> String {
        let raw = self.token_text(idx);
        if self.tokens[idx].kind == TokenKind::Str {
            token::unescape(&raw[1..raw.len() - 1])
        } else {
            raw.to_string()
        }
    }

    /// Juxtaposed chained calls after a call's arguments, e.g. the
    /// `version '1.0'` in `id 'java' version '1.0'`. Restricted to literal
    /// arguments so ordinary statements are never swallowed.
    fn parse_chain(&mut self, end_span: &mut Span) -> Result<Vec<ChainedCall>> {
        let mut chain = Vec::new();
        loop {
            if self.kind() != TokenKind::Ident {
                break;
            }
            let next = self.nth_kind(1);
            let literal_next = matches!(
                next,
                TokenKind::Str | TokenKind::GStr | TokenKind::Num
            ) || (next == TokenKind::Ident
                && matches!(self.token_text(self.pos + 1), "true" | "false"));
            if !literal_next {
                break;
            }
            let name = self.token_text(self.pos).to_string();
            self.bump();
            let arg = self.parse_expression()?;
            *end_span = self.tree.span(arg);
            chain.push(ChainedCall { name, arg });
        }
        Ok(chain)
    }

    fn parse_closure(&mut self) -> Result<NodeId> {
        let lbrace = self.bump();
        self.skip_separators();
        let mut stmts: SmallVec<[NodeId; 8]> = smallvec![];
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Eof) {
                return Err(Error::syntax_error(format!(
                    "unterminated block opened at line {}",
                    self.tokens[lbrace].line
                ))
                .with_operation("groovy::parse"));
            }
            stmts.push(self.parse_statement()?);
            self.skip_separators();
        }
        let rbrace = self.bump();
        Ok(self
            .tree
            .add(self.span_between(lbrace, rbrace), NodeKind::Closure(stmts)))
    }

    fn parse_expression(&mut self) -> Result<NodeId> {
        if self.expression_is_opaque() {
            return self.parse_opaque_expression();
        }
        match self.kind() {
            TokenKind::Str | TokenKind::GStr => {
                let idx = self.bump();
                let tok = &self.tokens[idx];
                let raw = tok.text(self.source);
                let value = token::unescape(&raw[1..raw.len() - 1]);
                Ok(self.tree.add(
                    tok.span(),
                    NodeKind::Literal(Literal::Str {
                        value,
                        interpolated: tok.kind == TokenKind::GStr,
                    }),
                ))
            }
            TokenKind::Num => {
                let idx = self.bump();
                let value = self.token_text(idx).parse::<f64>().unwrap_or(0.0);
                Ok(self
                    .tree
                    .add(self.tokens[idx].span(), NodeKind::Literal(Literal::Number(value))))
            }
            TokenKind::Ident if matches!(self.token_text(self.pos), "true" | "false") => {
                let idx = self.bump();
                let value = self.token_text(idx) == "true";
                Ok(self
                    .tree
                    .add(self.tokens[idx].span(), NodeKind::Literal(Literal::Bool(value))))
            }
            TokenKind::Ident => {
                let start = self.pos;
                let segments = self.parse_path();
                let path_span = self.span_from(start);
                match self.kind() {
                    TokenKind::LParen => self.finish_paren_call(segments, path_span),
                    TokenKind::LBrace => {
                        let closure = self.parse_closure()?;
                        let (receiver, name) = split_path(segments);
                        let span = path_span.to(self.tree.span(closure));
                        Ok(self.tree.add(
                            span,
                            NodeKind::Call(Call {
                                receiver,
                                name,
                                args: smallvec![],
                                chain: Vec::new(),
                                closure: Some(closure),
                            }),
                        ))
                    }
                    _ => Ok(self.tree.add(path_span, NodeKind::Path(segments))),
                }
            }
            _ => self.parse_opaque_expression(),
        }
    }

    /// Lookahead: does this expression contain an operator the subset does
    /// not model at its top level? If so the whole expression is kept opaque
    /// instead of being half-parsed.
    fn expression_is_opaque(&self) -> bool {
        let mut depth = 0usize;
        let mut i = self.pos;
        loop {
            match self.tokens.get(i).map(|t| t.kind).unwrap_or(TokenKind::Eof) {
                TokenKind::Eof => return false,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                TokenKind::Comma | TokenKind::Newline | TokenKind::Semi if depth == 0 => {
                    return false;
                }
                TokenKind::Unknown | TokenKind::Eq if depth == 0 => return true,
                _ => {}
            }
            i += 1;
        }
    }

    /// Consume one balanced expression verbatim, up to the next top-level
    /// delimiter.
    fn parse_opaque_expression(&mut self) -> Result<NodeId> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::Eof => break,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    depth += 1;
                    self.bump();
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.bump();
                }
                TokenKind::Comma | TokenKind::Newline | TokenKind::Semi if depth == 0 => break,
                _ => {
                    self.bump();
                }
            }
        }
        if self.pos == start {
            return Err(Error::syntax_error(format!(
                "expected expression at line {}",
                self.cur().line
            ))
            .with_operation("groovy::parse"));
        }
        self.opaque_between(start, self.pos - 1)
    }

    /// A statement the subset does not model; preserved verbatim.
    fn parse_opaque_statement(&mut self) -> Result<NodeId> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::Eof => break,
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    depth += 1;
                    self.bump();
                }
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                    self.bump();
                }
                TokenKind::Newline | TokenKind::Semi if depth == 0 => break,
                _ => {
                    self.bump();
                }
            }
        }
        if self.pos == start {
            // stray delimiter; consume it so the statement loop advances
            self.bump();
        }
        self.opaque_between(start, self.pos - 1)
    }

    fn opaque_between(&mut self, start: usize, end: usize) -> Result<NodeId> {
        let first = &self.tokens[start];
        let last = &self.tokens[end];
        let text = self.source[first.start..last.end].to_string();
        tracing::trace!(line = first.line, "opaque expression: {}", text);
        Ok(self
            .tree
            .add(self.span_between(start, end), NodeKind::Opaque(text)))
    }
}
