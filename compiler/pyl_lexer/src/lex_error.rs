//! Lexer errors.

use pyl_ir::Span;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("invalid character in source")]
    UnexpectedChar,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent,
    #[error("invalid escape sequence `{0}`")]
    InvalidEscape(String),
    #[error("bytes can only contain ASCII literal characters")]
    NonAsciiBytes,
    #[error("unmatched `{0}`")]
    UnmatchedBracket(char),
}

impl LexError {
    pub fn new(span: Span, kind: LexErrorKind) -> Self {
        LexError { span, kind }
    }
}

#[cfg(test)]
mod tests;
