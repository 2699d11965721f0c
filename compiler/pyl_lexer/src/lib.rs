//! Tokenizer for the optimizer's input language, built on logos.
//!
//! Logos recognizes the flat token stream; [`lex`] then layers the
//! line structure on top: newlines inside brackets are dropped, and the
//! leading whitespace of each logical line becomes `Indent`/`Dedent`
//! tokens against a stack of open indentation levels.

mod escape;
mod lex_error;
mod token;

use logos::Logos;
use pyl_ir::Span;

pub use escape::{decode_bytes, decode_str};
pub use lex_error::{LexError, LexErrorKind};
pub use token::{StrToken, Token, TokenKind};

/// Raw token from logos, before layout processing.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\x0C]+")]
enum RawToken {
    #[regex(r"#[^\r\n]*")]
    Comment,

    #[regex(r"\\[ \t]*(\r\n|\n|\r)")]
    LineContinuation,

    #[regex(r"\r\n|\n|\r")]
    Newline,

    #[regex(r#"([rRbBuUfF]|[rR][bBfF]|[bBfF][rR])?["']"#, lex_string)]
    Str,

    #[regex(r"0[xX](_?[0-9a-fA-F])+")]
    HexInt,
    #[regex(r"0[oO](_?[0-7])+")]
    OctInt,
    #[regex(r"0[bB](_?[01])+")]
    BinInt,
    #[regex(r"[0-9](_?[0-9])*")]
    DecInt,
    #[regex(r"[0-9](_?[0-9])*\.([0-9](_?[0-9])*)?([eE][+-]?[0-9](_?[0-9])*)?")]
    #[regex(r"\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?")]
    #[regex(r"[0-9](_?[0-9])*[eE][+-]?[0-9](_?[0-9])*")]
    Float,
    #[regex(r"[0-9](_?[0-9])*[jJ]")]
    #[regex(r"[0-9](_?[0-9])*\.([0-9](_?[0-9])*)?([eE][+-]?[0-9](_?[0-9])*)?[jJ]")]
    #[regex(r"\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?[jJ]")]
    #[regex(r"[0-9](_?[0-9])*[eE][+-]?[0-9](_?[0-9])*[jJ]")]
    Imaginary,

    #[regex(r"[A-Za-z_\x{80}-\x{10FFFF}][A-Za-z0-9_\x{80}-\x{10FFFF}]*")]
    Ident,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(":")]
    Colon,
    #[token(":=")]
    ColonEq,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token("->")]
    Arrow,
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    DoubleStar,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("@")]
    At,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("<<")]
    LShift,
    #[token(">>")]
    RShift,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtE,
    #[token(">=")]
    GtE,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("**=")]
    DoubleStarEq,
    #[token("/=")]
    SlashEq,
    #[token("//=")]
    DoubleSlashEq,
    #[token("%=")]
    PercentEq,
    #[token("@=")]
    AtEq,
    #[token("|=")]
    PipeEq,
    #[token("&=")]
    AmpEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    LShiftEq,
    #[token(">>=")]
    RShiftEq,
}

/// Scan the rest of a string literal whose prefix and opening quote have
/// just been matched. A backslash always escapes the next character, even
/// in raw literals, so `r"\""` stays one literal.
fn lex_string(lex: &mut logos::Lexer<RawToken>) -> bool {
    let quote = lex.slice().as_bytes()[lex.slice().len() - 1];
    let triple = lex.remainder().as_bytes().starts_with(&[quote, quote]);
    if triple {
        lex.bump(2);
    }
    let rest = lex.remainder().as_bytes();
    let mut i = 0;
    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            b'\n' | b'\r' if !triple => return false,
            c if c == quote => {
                if !triple {
                    lex.bump(i + 1);
                    return true;
                }
                if rest[i..].starts_with(&[quote, quote, quote]) {
                    lex.bump(i + 3);
                    return true;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    false
}

/// `true` if `ident` is reserved and cannot name a module or variable.
pub fn is_keyword(ident: &str) -> bool {
    keyword(ident).is_some()
}

fn keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "False" => TokenKind::False,
        "None" => TokenKind::None,
        "True" => TokenKind::True,
        "and" => TokenKind::And,
        "as" => TokenKind::As,
        "assert" => TokenKind::Assert,
        "async" => TokenKind::Async,
        "await" => TokenKind::Await,
        "break" => TokenKind::Break,
        "class" => TokenKind::Class,
        "continue" => TokenKind::Continue,
        "def" => TokenKind::Def,
        "del" => TokenKind::Del,
        "elif" => TokenKind::Elif,
        "else" => TokenKind::Else,
        "except" => TokenKind::Except,
        "finally" => TokenKind::Finally,
        "for" => TokenKind::For,
        "from" => TokenKind::From,
        "global" => TokenKind::Global,
        "if" => TokenKind::If,
        "import" => TokenKind::Import,
        "in" => TokenKind::In,
        "is" => TokenKind::Is,
        "lambda" => TokenKind::Lambda,
        "nonlocal" => TokenKind::Nonlocal,
        "not" => TokenKind::Not,
        "or" => TokenKind::Or,
        "pass" => TokenKind::Pass,
        "raise" => TokenKind::Raise,
        "return" => TokenKind::Return,
        "try" => TokenKind::Try,
        "while" => TokenKind::While,
        "with" => TokenKind::With,
        "yield" => TokenKind::Yield,
        _ => return None,
    })
}

/// Tokenize `source` into a layout-aware token list ending in `Eof`.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Layout::new(source).run()
}

struct Layout<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    indents: Vec<u32>,
    brackets: Vec<(char, Span)>,
    at_line_start: bool,
}

impl<'src> Layout<'src> {
    fn new(source: &'src str) -> Self {
        Layout {
            source,
            tokens: Vec::new(),
            indents: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut logos = RawToken::lexer(self.source);
        while let Some(result) = logos.next() {
            let span = Span::from_range(logos.span());
            let slice = logos.slice();
            let raw = result.map_err(|()| {
                let kind = if slice.ends_with(['"', '\'']) {
                    LexErrorKind::UnterminatedString
                } else {
                    LexErrorKind::UnexpectedChar
                };
                LexError::new(span, kind)
            })?;
            match raw {
                RawToken::Comment | RawToken::LineContinuation => {}
                RawToken::Newline => {
                    if self.brackets.is_empty() && !self.at_line_start {
                        self.push(TokenKind::Newline, span);
                        self.at_line_start = true;
                    }
                }
                _ => {
                    if self.at_line_start {
                        self.indent(span)?;
                        self.at_line_start = false;
                    }
                    let kind = self.convert(raw, slice, span)?;
                    self.push(kind, span);
                }
            }
        }

        let end = Span::from_range(self.source.len()..self.source.len());
        if let Some(&(open, span)) = self.brackets.last() {
            return Err(LexError::new(span, LexErrorKind::UnmatchedBracket(open)));
        }
        if !self.at_line_start {
            self.push(TokenKind::Newline, end);
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.push(TokenKind::Dedent, end);
        }
        self.push(TokenKind::Eof, end);
        Ok(self.tokens)
    }

    fn push(&mut self, kind: TokenKind, span: Span) {
        self.tokens.push(Token::new(kind, span));
    }

    /// Column of the token starting at `span`, with tabs to multiples of 8.
    fn column(&self, span: Span) -> u32 {
        let start = span.start as usize;
        let line_start = self.source[..start].rfind(['\n', '\r']).map_or(0, |i| i + 1);
        self.source[line_start..start].chars().fold(0, |col, c| match c {
            '\t' => (col / 8 + 1) * 8,
            _ => col + 1,
        })
    }

    fn indent(&mut self, span: Span) -> Result<(), LexError> {
        let column = self.column(span);
        let current = self.indents.last().copied().unwrap_or(0);
        if column > current {
            self.indents.push(column);
            self.push(TokenKind::Indent, span);
        } else {
            while column < self.indents.last().copied().unwrap_or(0) {
                self.indents.pop();
                self.push(TokenKind::Dedent, span);
            }
            if column != self.indents.last().copied().unwrap_or(0) {
                return Err(LexError::new(span, LexErrorKind::InconsistentDedent));
            }
        }
        Ok(())
    }

    fn open(&mut self, c: char, span: Span) {
        self.brackets.push((c, span));
    }

    fn close(&mut self, c: char, span: Span) -> Result<(), LexError> {
        let expected = match c {
            ')' => '(',
            ']' => '[',
            _ => '{',
        };
        match self.brackets.pop() {
            Some((open, _)) if open == expected => Ok(()),
            _ => Err(LexError::new(span, LexErrorKind::UnmatchedBracket(c))),
        }
    }

    fn convert(&mut self, raw: RawToken, slice: &str, span: Span) -> Result<TokenKind, LexError> {
        Ok(match raw {
            RawToken::Ident => keyword(slice).unwrap_or_else(|| TokenKind::Name(slice.to_owned())),
            RawToken::Str => TokenKind::Str(string_token(slice, span)),
            RawToken::HexInt => int_token(&slice[2..], 16, slice),
            RawToken::OctInt => int_token(&slice[2..], 8, slice),
            RawToken::BinInt => int_token(&slice[2..], 2, slice),
            RawToken::DecInt => int_token(slice, 10, slice),
            RawToken::Float => TokenKind::Float(slice.replace('_', "").parse().unwrap_or(f64::INFINITY)),
            RawToken::Imaginary => {
                let digits = slice[..slice.len() - 1].replace('_', "");
                TokenKind::Imaginary(digits.parse().unwrap_or(f64::INFINITY))
            }
            RawToken::LParen => {
                self.open('(', span);
                TokenKind::LParen
            }
            RawToken::LBracket => {
                self.open('[', span);
                TokenKind::LBracket
            }
            RawToken::LBrace => {
                self.open('{', span);
                TokenKind::LBrace
            }
            RawToken::RParen => {
                self.close(')', span)?;
                TokenKind::RParen
            }
            RawToken::RBracket => {
                self.close(']', span)?;
                TokenKind::RBracket
            }
            RawToken::RBrace => {
                self.close('}', span)?;
                TokenKind::RBrace
            }
            RawToken::Colon => TokenKind::Colon,
            RawToken::ColonEq => TokenKind::ColonEq,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Ellipsis => TokenKind::Ellipsis,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::DoubleStar => TokenKind::DoubleStar,
            RawToken::Slash => TokenKind::Slash,
            RawToken::DoubleSlash => TokenKind::DoubleSlash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::At => TokenKind::At,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Caret => TokenKind::Caret,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::LShift => TokenKind::LShift,
            RawToken::RShift => TokenKind::RShift,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::LtE => TokenKind::LtE,
            RawToken::GtE => TokenKind::GtE,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::PlusEq => TokenKind::PlusEq,
            RawToken::MinusEq => TokenKind::MinusEq,
            RawToken::StarEq => TokenKind::StarEq,
            RawToken::DoubleStarEq => TokenKind::DoubleStarEq,
            RawToken::SlashEq => TokenKind::SlashEq,
            RawToken::DoubleSlashEq => TokenKind::DoubleSlashEq,
            RawToken::PercentEq => TokenKind::PercentEq,
            RawToken::AtEq => TokenKind::AtEq,
            RawToken::PipeEq => TokenKind::PipeEq,
            RawToken::AmpEq => TokenKind::AmpEq,
            RawToken::CaretEq => TokenKind::CaretEq,
            RawToken::LShiftEq => TokenKind::LShiftEq,
            RawToken::RShiftEq => TokenKind::RShiftEq,
            RawToken::Comment | RawToken::LineContinuation | RawToken::Newline => TokenKind::Newline,
        })
    }
}

fn int_token(digits: &str, radix: u32, text: &str) -> TokenKind {
    let digits = digits.trim_start_matches('_').replace('_', "");
    match i64::from_str_radix(&digits, radix) {
        Ok(value) => TokenKind::Int(value),
        Err(_) => TokenKind::LongInt(text.to_owned()),
    }
}

fn string_token(slice: &str, span: Span) -> StrToken {
    let prefix_len = slice.find(['"', '\'']).unwrap_or(0);
    let prefix = slice[..prefix_len].to_ascii_lowercase();
    let rest = &slice[prefix_len..];
    let quote_len = if rest.len() >= 6 && (rest.starts_with("\"\"\"") || rest.starts_with("'''")) {
        3
    } else {
        1
    };
    let body = &rest[quote_len..rest.len() - quote_len];
    let offset = u32::try_from(prefix_len + quote_len).unwrap_or(0);
    StrToken {
        raw: prefix.contains('r'),
        bytes: prefix.contains('b'),
        format: prefix.contains('f'),
        body: body.to_owned(),
        body_start: span.start + offset,
    }
}
