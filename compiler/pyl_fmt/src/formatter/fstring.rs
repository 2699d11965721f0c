//! F-string rendering.

use std::fmt::Write;

use pyl_ir::{FStringPart, Tree};

use super::expr::render_expr;
use crate::precedence::Precedence;

/// Quotes tried in order; the first one no field expression contains wins.
const QUOTES: [&str; 4] = ["'", "\"", "'''", "\"\"\""];

pub(super) fn render_fstring(tree: &Tree, parts: &[FStringPart]) -> String {
    let mut fields = Vec::new();
    collect_fields(tree, parts, &mut fields);
    let quote = QUOTES
        .iter()
        .copied()
        .find(|quote| {
            fields
                .iter()
                .all(|field| !field.contains(quote) && !field.ends_with(&quote[..1]))
        })
        .unwrap_or("'");

    let mut fields = fields.into_iter();
    let mut out = String::from("f");
    out.push_str(quote);
    write_parts(parts, quote, &mut fields, &mut out, false);
    out.push_str(quote);
    out
}

/// Render every field expression up front, in output order.
fn collect_fields(tree: &Tree, parts: &[FStringPart], out: &mut Vec<String>) {
    for part in parts {
        if let FStringPart::Field { value, spec, .. } = part {
            let mut text = render_expr(tree, *value, Precedence::Or);
            // `{{` would read as an escaped brace.
            if text.starts_with('{') {
                text.insert(0, ' ');
            }
            out.push(text);
            collect_fields(tree, spec, out);
        }
    }
}

fn write_parts(
    parts: &[FStringPart],
    quote: &str,
    fields: &mut impl Iterator<Item = String>,
    out: &mut String,
    in_spec: bool,
) {
    for part in parts {
        match part {
            FStringPart::Text(text) => escape_text(text, quote, out, in_spec),
            FStringPart::Field {
                conversion, spec, ..
            } => {
                out.push('{');
                out.push_str(&fields.next().unwrap_or_default());
                if let Some(conversion) = conversion {
                    out.push('!');
                    out.push(*conversion);
                }
                if !spec.is_empty() {
                    out.push(':');
                    write_parts(spec, quote, fields, out, true);
                }
                out.push('}');
            }
        }
    }
}

fn escape_text(text: &str, quote: &str, out: &mut String, in_spec: bool) {
    let single = quote.len() == 1;
    let quote_char = quote.chars().next().unwrap_or('\'');
    for c in text.chars() {
        match c {
            '{' | '}' if !in_spec => {
                out.push(c);
                out.push(c);
            }
            '\\' => out.push_str("\\\\"),
            '\n' if single => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote_char => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() && c != '\n' => {
                let code = u32::from(c);
                let _ = if code < 0x100 {
                    write!(out, "\\x{code:02x}")
                } else {
                    write!(out, "\\u{code:04x}")
                };
            }
            c => out.push(c),
        }
    }
}
