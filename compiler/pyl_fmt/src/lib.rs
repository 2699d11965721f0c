//! Tree serializer.
//!
//! Turns a [`pyl_ir::Tree`] back into source text with a canonical layout:
//! four-space indentation, one statement per line, and only the
//! parentheses that precedence requires. Original formatting and comments
//! are not preserved; meaning is.
//!
//! Serializing is idempotent on its own output:
//! `serialize(parse(serialize(t))) == serialize(t)`.
//!
//! # Modules
//!
//! - [`emitter`]: output abstraction
//! - [`precedence`]: binding strength of expression forms
//! - [`formatter`]: statement layout and expression rendering

pub mod emitter;
pub mod formatter;
pub mod precedence;

use pyl_ir::{NodeId, NodeKind, Tree};

pub use emitter::{Emitter, StringEmitter};
pub use formatter::{render_expr, Formatter};
pub use precedence::Precedence;

/// Spaces per indentation level.
pub const INDENT_WIDTH: usize = 4;

/// Serialize a whole tree. A non-empty result ends with a newline.
pub fn serialize(tree: &Tree) -> String {
    let mut formatter = Formatter::new(tree, StringEmitter::with_capacity(tree.len() * 8));
    match tree.kind(tree.root()) {
        NodeKind::Module { body } => formatter.module(body),
        _ => formatter.statement(tree.root()),
    }
    let mut emitter = formatter.finish();
    emitter.trim_trailing_blank_lines();
    emitter.output()
}

/// Serialize one expression without surrounding parentheses.
pub fn serialize_expr(tree: &Tree, id: NodeId) -> String {
    render_expr(tree, id, Precedence::NamedExpr)
}

/// Serialize a statement subtree at indentation zero.
pub fn serialize_stmt(tree: &Tree, id: NodeId) -> String {
    let mut formatter = Formatter::new(tree, StringEmitter::new());
    formatter.statement(id);
    formatter.finish().output()
}

#[cfg(test)]
mod tests;
