//! Escape processing for string and bytes literals.

use pyl_ir::Span;

use crate::lex_error::{LexError, LexErrorKind};

/// Decoded code unit: a char for text literals, a byte for bytes literals.
enum Unit {
    Char(char),
    Byte(u8),
}

fn invalid(span: Span, text: &str) -> LexError {
    LexError::new(span, LexErrorKind::InvalidEscape(text.to_owned()))
}

/// Walk `body`, resolving escapes. `bytes` selects bytes-literal rules.
fn cook(body: &str, raw: bool, bytes: bool, span: Span, mut emit: impl FnMut(Unit)) -> Result<(), LexError> {
    if raw {
        body.chars().for_each(|c| emit(Unit::Char(c)));
        return Ok(());
    }
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            emit(Unit::Char(c));
            continue;
        }
        let Some(next) = chars.next() else {
            emit(Unit::Char('\\'));
            break;
        };
        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' | '\'' | '"' => emit(Unit::Char(next)),
            'a' => emit(Unit::Char('\x07')),
            'b' => emit(Unit::Char('\x08')),
            'f' => emit(Unit::Char('\x0c')),
            'n' => emit(Unit::Char('\n')),
            'r' => emit(Unit::Char('\r')),
            't' => emit(Unit::Char('\t')),
            'v' => emit(Unit::Char('\x0b')),
            '0'..='7' => {
                let mut value = next.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if bytes {
                    emit(Unit::Byte(u8::try_from(value & 0xff).unwrap_or(0)));
                } else {
                    emit(Unit::Char(char::from_u32(value).ok_or_else(|| invalid(span, "\\ooo"))?));
                }
            }
            'x' => {
                let value = hex_digits(&mut chars, 2).ok_or_else(|| invalid(span, "\\x"))?;
                if bytes {
                    emit(Unit::Byte(u8::try_from(value).unwrap_or(0)));
                } else {
                    emit(Unit::Char(char::from_u32(value).ok_or_else(|| invalid(span, "\\x"))?));
                }
            }
            'u' | 'U' if !bytes => {
                let width = if next == 'u' { 4 } else { 8 };
                let value = hex_digits(&mut chars, width).ok_or_else(|| invalid(span, &format!("\\{next}")))?;
                emit(Unit::Char(char::from_u32(value).ok_or_else(|| invalid(span, &format!("\\{next}")))?));
            }
            'N' if !bytes => return Err(invalid(span, "\\N")),
            other => {
                emit(Unit::Char('\\'));
                emit(Unit::Char(other));
            }
        }
    }
    Ok(())
}

fn hex_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, count: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        let digit = chars.next()?.to_digit(16)?;
        value = value.checked_mul(16)?.checked_add(digit)?;
    }
    Some(value)
}

/// Decode the body of a text literal.
pub fn decode_str(body: &str, raw: bool, span: Span) -> Result<String, LexError> {
    let mut out = String::with_capacity(body.len());
    cook(body, raw, false, span, |unit| match unit {
        Unit::Char(c) => out.push(c),
        Unit::Byte(b) => out.push(char::from(b)),
    })?;
    Ok(out)
}

/// Decode the body of a bytes literal.
pub fn decode_bytes(body: &str, raw: bool, span: Span) -> Result<Vec<u8>, LexError> {
    if !body.is_ascii() {
        return Err(LexError::new(span, LexErrorKind::NonAsciiBytes));
    }
    let mut out = Vec::with_capacity(body.len());
    cook(body, raw, true, span, |unit| match unit {
        Unit::Char(c) => out.push(u8::try_from(u32::from(c)).unwrap_or(b'?')),
        Unit::Byte(b) => out.push(b),
    })?;
    Ok(out)
}
