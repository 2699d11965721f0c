//! Token kinds produced by [`crate::lex`].

use pyl_ir::Span;

/// A string literal as written, before escape processing.
#[derive(Clone, Debug, PartialEq)]
pub struct StrToken {
    pub raw: bool,
    pub bytes: bool,
    pub format: bool,
    /// Text between the quotes.
    pub body: String,
    /// Byte offset of `body` in the source.
    pub body_start: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Name(String),
    Int(i64),
    /// Integer literal wider than `i64`, as written.
    LongInt(String),
    Float(f64),
    Imaginary(f64),
    Str(StrToken),

    // Keywords
    False,
    None,
    True,
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    ColonEq,
    Comma,
    Semi,
    Dot,
    Ellipsis,
    Arrow,
    Eq,

    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    At,
    Pipe,
    Amp,
    Caret,
    Tilde,
    LShift,
    RShift,
    Lt,
    Gt,
    LtE,
    GtE,
    EqEq,
    NotEq,

    // Augmented assignment
    PlusEq,
    MinusEq,
    StarEq,
    DoubleStarEq,
    SlashEq,
    DoubleSlashEq,
    PercentEq,
    AtEq,
    PipeEq,
    AmpEq,
    CaretEq,
    LShiftEq,
    RShiftEq,

    // Layout
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl TokenKind {
    /// Human-readable description for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Name(name) => format!("name `{name}`"),
            TokenKind::Int(_) | TokenKind::LongInt(_) | TokenKind::Float(_) | TokenKind::Imaginary(_) => {
                "number".to_owned()
            }
            TokenKind::Str(_) => "string".to_owned(),
            TokenKind::Newline => "newline".to_owned(),
            TokenKind::Indent => "indent".to_owned(),
            TokenKind::Dedent => "dedent".to_owned(),
            TokenKind::Eof => "end of file".to_owned(),
            other => format!("`{other:?}`"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}
