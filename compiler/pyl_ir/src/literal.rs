//! Literal constants and their canonical source spelling.
//!
//! The spelling helpers produce the same text the target runtime's `repr()`
//! produces, so a folded value prints back exactly as the program would
//! have printed it.

use std::fmt::Write;

/// A constant appearing in source, or produced by folding.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    /// An integer literal too wide for `i64`, kept as written.
    LongInt(String),
    Float(f64),
    /// Imaginary literal such as `2j`; holds the imaginary part.
    Imaginary(f64),
    Str(String),
    Bytes(Vec<u8>),
    Ellipsis,
}

impl Literal {
    /// Source text for this literal, or `None` when the value has no
    /// literal spelling (infinities and NaN).
    pub fn to_source(&self) -> Option<String> {
        Some(match self {
            Literal::None => "None".to_owned(),
            Literal::Bool(true) => "True".to_owned(),
            Literal::Bool(false) => "False".to_owned(),
            Literal::Int(v) => v.to_string(),
            Literal::LongInt(text) => text.clone(),
            Literal::Float(v) => {
                if !v.is_finite() {
                    return None;
                }
                float_repr(*v)
            }
            Literal::Imaginary(v) => {
                if !v.is_finite() {
                    return None;
                }
                let text = float_repr(*v);
                match text.strip_suffix(".0") {
                    Some(int_part) => format!("{int_part}j"),
                    None => format!("{text}j"),
                }
            }
            Literal::Str(s) => str_repr(s),
            Literal::Bytes(b) => bytes_repr(b),
            Literal::Ellipsis => "...".to_owned(),
        })
    }

    /// `True` for literals that are interned singletons at runtime.
    pub fn is_singleton(&self) -> bool {
        matches!(self, Literal::None | Literal::Bool(_) | Literal::Ellipsis)
    }
}

/// Shortest round-tripping float spelling, switching to exponent form
/// below `1e-4` and from `1e16` upward.
pub fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let sign = if value.is_sign_negative() { "-" } else { "" };
    let sci = format!("{:e}", value.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();

    if (-4..16).contains(&exp) {
        let mut out = String::from(sign);
        if exp >= 0 {
            let int_len = usize::try_from(exp).unwrap_or(0) + 1;
            if digits.len() <= int_len {
                out.push_str(&digits);
                out.extend(std::iter::repeat('0').take(int_len - digits.len()));
                out.push_str(".0");
            } else {
                out.push_str(&digits[..int_len]);
                out.push('.');
                out.push_str(&digits[int_len..]);
            }
        } else {
            out.push_str("0.");
            let zeros = usize::try_from(-exp - 1).unwrap_or(0);
            out.extend(std::iter::repeat('0').take(zeros));
            out.push_str(&digits);
        }
        out
    } else {
        let mut out = String::from(sign);
        out.push_str(&digits[..1]);
        if digits.len() > 1 {
            out.push('.');
            out.push_str(&digits[1..]);
        }
        let exp_sign = if exp < 0 { '-' } else { '+' };
        let _ = write!(out, "e{exp_sign}{:02}", exp.abs());
        out
    }
}

fn pick_quote(has_single: bool, has_double: bool) -> char {
    if has_single && !has_double {
        '"'
    } else {
        '\''
    }
}

/// Quoted string spelling with the runtime's quote selection.
pub fn str_repr(s: &str) -> String {
    let quote = pick_quote(s.contains('\''), s.contains('"'));
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                if code < 0x100 {
                    let _ = write!(out, "\\x{code:02x}");
                } else if code < 0x1_0000 {
                    let _ = write!(out, "\\u{code:04x}");
                } else {
                    let _ = write!(out, "\\U{code:08x}");
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// `b'...'` spelling; non-ASCII and control bytes become `\xhh`.
pub fn bytes_repr(bytes: &[u8]) -> String {
    let quote = pick_quote(bytes.contains(&b'\''), bytes.contains(&b'"'));
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(quote);
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if char::from(b) == quote => {
                out.push('\\');
                out.push(char::from(b));
            }
            0x20..=0x7e => out.push(char::from(b)),
            b => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests;
