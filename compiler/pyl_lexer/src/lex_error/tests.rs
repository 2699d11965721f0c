use super::*;

#[test]
fn messages_name_the_problem() {
    let err = LexError::new(Span::new(3, 4), LexErrorKind::UnterminatedString);
    assert_eq!(err.to_string(), "unterminated string literal");
    let err = LexError::new(Span::new(0, 1), LexErrorKind::InvalidEscape("\\N".into()));
    assert_eq!(err.to_string(), "invalid escape sequence `\\N`");
    let err = LexError::new(Span::new(0, 1), LexErrorKind::UnmatchedBracket(')'));
    assert_eq!(err.to_string(), "unmatched `)`");
}
