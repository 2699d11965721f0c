//! F-string bodies: literal text, replacement fields and format specs.
//!
//! Field expressions are lexed on their own and parsed with the cursor
//! temporarily pointed at the fragment, so their spans land at the right
//! place in the unit.

use pyl_ir::{FStringPart, NodeId, Span};
use pyl_lexer::{decode_str, TokenKind};

use super::expr::push_part;
use crate::{ParseError, Parser};

/// How the expression of a replacement field ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FieldEnd {
    Close,
    Conversion,
    Spec,
    Debug,
}

impl Parser {
    /// Split an f-string body into parts. `base` is the unit offset of the
    /// first byte of `body`.
    pub(crate) fn fstring_parts(&mut self, body: &str, raw: bool, base: u32) -> Result<Vec<FStringPart>, ParseError> {
        let (parts, end) = self.fstring_run(body, raw, base, 0, false)?;
        debug_assert_eq!(end, body.len());
        Ok(parts)
    }

    /// Literal text and fields starting at `from`. Inside a format spec the
    /// run stops at the closing `}` of the enclosing field, whose index is
    /// returned; otherwise it runs to the end of `body`.
    fn fstring_run(
        &mut self,
        body: &str,
        raw: bool,
        base: u32,
        from: usize,
        in_spec: bool,
    ) -> Result<(Vec<FStringPart>, usize), ParseError> {
        let bytes = body.as_bytes();
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut text_start = from;
        let mut i = from;
        while i < bytes.len() {
            match bytes[i] {
                b'{' if !in_spec && bytes.get(i + 1) == Some(&b'{') => {
                    text.push_str(&body[text_start..=i]);
                    i += 2;
                    text_start = i;
                }
                b'}' if !in_spec && bytes.get(i + 1) == Some(&b'}') => {
                    text.push_str(&body[text_start..=i]);
                    i += 2;
                    text_start = i;
                }
                b'{' => {
                    text.push_str(&body[text_start..i]);
                    flush_text(&mut parts, &mut text, raw, span_at(base, text_start, i))?;
                    let (field, next) = self.fstring_field(body, raw, base, i)?;
                    for part in field {
                        push_part(&mut parts, part);
                    }
                    i = next;
                    text_start = i;
                }
                b'}' if in_spec => {
                    text.push_str(&body[text_start..i]);
                    flush_text(&mut parts, &mut text, raw, span_at(base, text_start, i))?;
                    return Ok((parts, i));
                }
                b'}' => {
                    return Err(ParseError::new(
                        "f-string: single '}' is not allowed",
                        span_at(base, i, i + 1),
                    ));
                }
                _ => i += 1,
            }
        }
        if in_spec {
            return Err(ParseError::new("f-string: expecting '}'", span_at(base, i, i)));
        }
        text.push_str(&body[text_start..]);
        flush_text(&mut parts, &mut text, raw, span_at(base, text_start, i))?;
        Ok((parts, i))
    }

    /// One `{expr[=][!c][:spec]}` field whose `{` is at `open`. Returns the
    /// parts it contributes and the index just past its `}`.
    fn fstring_field(
        &mut self,
        body: &str,
        raw: bool,
        base: u32,
        open: usize,
    ) -> Result<(Vec<FStringPart>, usize), ParseError> {
        let bytes = body.as_bytes();
        let start = open + 1;
        let (expr_end, how) = field_expression_end(bytes, start)
            .ok_or_else(|| ParseError::new("f-string: expecting '}'", span_at(base, open, body.len())))?;
        let source = &body[start..expr_end];
        if source.trim().is_empty() {
            return Err(ParseError::new(
                "f-string: empty expression not allowed",
                span_at(base, open, expr_end),
            ));
        }
        let value = self.fstring_expression(source, base + offset(open))?;

        let mut out = Vec::new();
        let mut k = expr_end;
        let mut how = how;
        if how == FieldEnd::Debug {
            k += 1;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            out.push(FStringPart::Text(body[start..k].to_owned()));
            how = match bytes.get(k) {
                Some(b'!') => FieldEnd::Conversion,
                Some(b':') => FieldEnd::Spec,
                Some(b'}') => FieldEnd::Close,
                _ => return Err(ParseError::new("f-string: expecting '}'", span_at(base, open, k))),
            };
        }

        let mut conversion = None;
        if how == FieldEnd::Conversion {
            conversion = match bytes.get(k + 1) {
                Some(c @ (b's' | b'r' | b'a')) => Some(char::from(*c)),
                _ => {
                    return Err(ParseError::new(
                        "f-string: invalid conversion character: expected 's', 'r', or 'a'",
                        span_at(base, k, k + 2),
                    ))
                }
            };
            k += 2;
            how = match bytes.get(k) {
                Some(b':') => FieldEnd::Spec,
                Some(b'}') => FieldEnd::Close,
                _ => return Err(ParseError::new("f-string: expecting '}'", span_at(base, open, k))),
            };
        }

        let mut spec = Vec::new();
        if how == FieldEnd::Spec {
            let (parts, close) = self.fstring_run(body, raw, base, k + 1, true)?;
            spec = parts;
            k = close;
        }

        if bytes.get(k) != Some(&b'}') {
            return Err(ParseError::new("f-string: expecting '}'", span_at(base, open, k)));
        }
        if !out.is_empty() && conversion.is_none() && spec.is_empty() {
            conversion = Some('r');
        }
        out.push(FStringPart::Field {
            value,
            conversion,
            spec,
        });
        Ok((out, k + 1))
    }

    /// Parse a field's expression; `brace` is the unit offset of its `{`.
    fn fstring_expression(&mut self, source: &str, brace: u32) -> Result<NodeId, ParseError> {
        let wrapped = format!("({source})");
        let tokens = pyl_lexer::lex(&wrapped).map_err(|err| {
            let err = ParseError::from(err);
            ParseError::new(err.message, Span::new(err.span.start + brace, err.span.end + brace))
        })?;
        let saved = self.cursor.enter(tokens, brace);
        let result = self.fragment();
        self.cursor.restore(saved);
        result
    }

    fn fragment(&mut self) -> Result<NodeId, ParseError> {
        self.cursor.expect(&TokenKind::LParen, "`(`")?;
        let value = if self.cursor.check(&TokenKind::Yield) {
            self.yield_expr()?
        } else {
            self.star_expressions()?
        };
        self.cursor.expect(&TokenKind::RParen, "`)`")?;
        self.cursor.eat(&TokenKind::Newline);
        if !self.cursor.check(&TokenKind::Eof) {
            return Err(self.cursor.unexpected("`}`"));
        }
        Ok(value)
    }
}

fn flush_text(parts: &mut Vec<FStringPart>, text: &mut String, raw: bool, span: Span) -> Result<(), ParseError> {
    if !text.is_empty() {
        push_part(parts, FStringPart::Text(decode_str(text, raw, span)?));
        text.clear();
    }
    Ok(())
}

/// Scan a field expression starting at `from`, skipping nested brackets
/// and string literals. Returns the index of the first top-level `}`,
/// `!`, `:` or self-documenting `=`.
fn field_expression_end(bytes: &[u8], from: usize) -> Option<(usize, FieldEnd)> {
    let mut depth = 0usize;
    let mut i = from;
    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        match bytes[i] {
            quote @ (b'\'' | b'"') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'}' if depth > 0 => depth -= 1,
            b'}' => return Some((i, FieldEnd::Close)),
            b'!' | b'=' | b'<' | b'>' if next == Some(b'=') => i += 1,
            b'!' if depth == 0 => return Some((i, FieldEnd::Conversion)),
            b':' if depth == 0 => return Some((i, FieldEnd::Spec)),
            b'=' if depth == 0 => return Some((i, FieldEnd::Debug)),
            _ => {}
        }
        i += 1;
    }
    None
}

fn offset(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

fn span_at(base: u32, start: usize, end: usize) -> Span {
    Span::new(base.saturating_add(offset(start)), base.saturating_add(offset(end)))
}
