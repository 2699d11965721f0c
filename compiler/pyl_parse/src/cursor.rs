//! Token cursor.

use std::mem::discriminant;

use pyl_ir::Span;
use pyl_lexer::{Token, TokenKind};

use crate::ParseError;

/// Position in a token list that always ends with `Eof`.
///
/// `offset` is added to every span handed out, so a token list lexed from
/// a fragment of the unit (an f-string field) reports unit positions.
pub(crate) struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
    offset: u32,
}

/// A token list parked while a fragment is being parsed.
pub(crate) struct Saved {
    tokens: Vec<Token>,
    pos: usize,
    offset: u32,
}

impl Cursor {
    pub(crate) fn new(tokens: Vec<Token>) -> Self {
        Cursor {
            tokens,
            pos: 0,
            offset: 0,
        }
    }

    /// Amount added to the spans of the current token list.
    pub(crate) fn offset(&self) -> u32 {
        self.offset
    }

    fn shift(&self, span: Span) -> Span {
        Span::new(span.start + self.offset, span.end + self.offset)
    }

    #[inline]
    pub(crate) fn current(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.shift(self.tokens[self.pos.min(self.tokens.len() - 1)].span)
    }

    /// Token `n` positions ahead of the current one.
    pub(crate) fn peek(&self, n: usize) -> &TokenKind {
        &self.tokens[(self.pos + n).min(self.tokens.len() - 1)].kind
    }

    /// Span of the most recently consumed token.
    pub(crate) fn prev_span(&self) -> Span {
        if self.pos == 0 {
            self.current_span()
        } else {
            self.shift(self.tokens[self.pos - 1].span)
        }
    }

    /// Consume the current token and return its (shifted) span.
    pub(crate) fn advance(&mut self) -> Span {
        let span = self.current_span();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        span
    }

    /// Same variant as `kind`, ignoring any payload.
    #[inline]
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        discriminant(self.current()) == discriminant(kind)
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(what))
        }
    }

    pub(crate) fn unexpected(&self, what: &str) -> ParseError {
        ParseError::new(
            format!("expected {what}, found {}", self.current().describe()),
            self.current_span(),
        )
    }

    pub(crate) fn expect_name(&mut self) -> Result<(String, Span), ParseError> {
        match self.current() {
            TokenKind::Name(name) => {
                let name = name.clone();
                let span = self.advance();
                Ok((name, span))
            }
            _ => Err(self.unexpected("a name")),
        }
    }

    /// Swap in a fragment's tokens whose spans start at `offset`.
    pub(crate) fn enter(&mut self, tokens: Vec<Token>, offset: u32) -> Saved {
        Saved {
            tokens: std::mem::replace(&mut self.tokens, tokens),
            pos: std::mem::replace(&mut self.pos, 0),
            offset: std::mem::replace(&mut self.offset, offset),
        }
    }

    pub(crate) fn restore(&mut self, saved: Saved) {
        self.tokens = saved.tokens;
        self.pos = saved.pos;
        self.offset = saved.offset;
    }
}
