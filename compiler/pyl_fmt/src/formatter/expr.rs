//! Expression rendering with minimal parentheses.

use std::fmt::Write;

use pyl_ir::{Comprehension, Keyword, Literal, NodeId, NodeKind, Param, Params, Tree};

use super::fstring::render_fstring;
use crate::precedence::Precedence;

/// Render `id` for a position that requires at least `prec`.
pub fn render_expr(tree: &Tree, id: NodeId, prec: Precedence) -> String {
    let mut out = String::new();
    ExprWriter { tree, out: &mut out }.expr(id, prec);
    out
}

/// `a, b=1, *args, c, **kw` as it appears between the parentheses of a
/// `def`.
pub fn render_params(tree: &Tree, params: &Params) -> String {
    let mut out = String::new();
    ExprWriter { tree, out: &mut out }.params(params, true);
    out
}

/// Call-style argument list without the parentheses.
pub fn render_arguments(tree: &Tree, args: &[NodeId], keywords: &[Keyword]) -> String {
    let mut out = String::new();
    ExprWriter { tree, out: &mut out }.arguments(args, keywords);
    out
}

pub(super) struct ExprWriter<'a> {
    pub(super) tree: &'a Tree,
    pub(super) out: &'a mut String,
}

impl ExprWriter<'_> {
    pub(super) fn expr(&mut self, id: NodeId, prec: Precedence) {
        pyl_stack::ensure_sufficient_stack(|| {
            let kind = self.tree.kind(id);
            let single_tuple = matches!(kind, NodeKind::Tuple { elts, .. } if elts.len() == 1);
            if Precedence::of(kind) < prec || single_tuple {
                self.out.push('(');
                self.expr_inner(id);
                self.out.push(')');
            } else {
                self.expr_inner(id);
            }
        });
    }

    fn comma_list(&mut self, items: &[NodeId], prec: Precedence) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(item, prec);
        }
    }

    #[allow(clippy::too_many_lines, reason = "one arm per expression kind")]
    fn expr_inner(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::BoolOp { op, values } => {
                let own = Precedence::of(tree.kind(id));
                let word = match op {
                    pyl_ir::BoolOperator::And => " and ",
                    pyl_ir::BoolOperator::Or => " or ",
                };
                for (i, &value) in values.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(word);
                    }
                    self.expr(value, own.next());
                }
            }
            NodeKind::NamedExpr { target, value } => {
                self.expr(*target, Precedence::Atom);
                self.out.push_str(" := ");
                self.expr(*value, Precedence::Test);
            }
            NodeKind::BinOp { left, op, right } => {
                let own = Precedence::of_binary(*op);
                // The exponent is a unary-level operand: `2 ** -1`.
                let (left_prec, right_prec) = if *op == pyl_ir::Operator::Pow {
                    (own.next(), Precedence::Factor)
                } else {
                    (own, own.next())
                };
                self.expr(*left, left_prec);
                self.out.push(' ');
                self.out.push_str(op.symbol());
                self.out.push(' ');
                self.expr(*right, right_prec);
            }
            NodeKind::UnaryOp { op, operand } => {
                let own = Precedence::of(tree.kind(id));
                self.out.push_str(op.symbol());
                self.expr(*operand, own);
            }
            NodeKind::Lambda { params, body } => {
                self.out.push_str("lambda");
                if !params.is_empty() {
                    self.out.push(' ');
                    self.params(params, false);
                }
                self.out.push_str(": ");
                self.expr(*body, Precedence::Test);
            }
            NodeKind::IfExp { test, body, orelse } => {
                self.expr(*body, Precedence::Or);
                self.out.push_str(" if ");
                self.expr(*test, Precedence::Or);
                self.out.push_str(" else ");
                self.expr(*orelse, Precedence::Test);
            }
            NodeKind::Dict { keys, values } => {
                self.out.push('{');
                for (i, (key, &value)) in keys.iter().zip(values).enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    match key {
                        Some(key) => {
                            self.expr(*key, Precedence::Test);
                            self.out.push_str(": ");
                            self.expr(value, Precedence::Test);
                        }
                        None => {
                            self.out.push_str("**");
                            self.expr(value, Precedence::BitOr);
                        }
                    }
                }
                self.out.push('}');
            }
            NodeKind::Set { elts } => {
                if elts.is_empty() {
                    // There is no empty set display.
                    self.out.push_str("{*()}");
                } else {
                    self.out.push('{');
                    self.comma_list(elts, Precedence::Test);
                    self.out.push('}');
                }
            }
            NodeKind::ListComp { elt, generators } => {
                self.out.push('[');
                self.expr(*elt, Precedence::Test);
                self.generators(generators);
                self.out.push(']');
            }
            NodeKind::SetComp { elt, generators } => {
                self.out.push('{');
                self.expr(*elt, Precedence::Test);
                self.generators(generators);
                self.out.push('}');
            }
            NodeKind::DictComp { key, value, generators } => {
                self.out.push('{');
                self.expr(*key, Precedence::Test);
                self.out.push_str(": ");
                self.expr(*value, Precedence::Test);
                self.generators(generators);
                self.out.push('}');
            }
            NodeKind::GeneratorExp { elt, generators } => {
                self.out.push('(');
                self.expr(*elt, Precedence::Test);
                self.generators(generators);
                self.out.push(')');
            }
            NodeKind::Await { value } => {
                self.out.push_str("await ");
                self.expr(*value, Precedence::Atom);
            }
            NodeKind::Yield { value } => {
                self.out.push_str("yield");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(*value, Precedence::Tuple);
                }
            }
            NodeKind::YieldFrom { value } => {
                self.out.push_str("yield from ");
                self.expr(*value, Precedence::Test);
            }
            NodeKind::Compare {
                left,
                ops,
                comparators,
            } => {
                self.expr(*left, Precedence::Cmp.next());
                for (op, &right) in ops.iter().zip(comparators) {
                    self.out.push(' ');
                    self.out.push_str(op.symbol());
                    self.out.push(' ');
                    self.expr(right, Precedence::Cmp.next());
                }
            }
            NodeKind::Call { func, args, keywords } => {
                self.expr(*func, Precedence::Atom);
                self.out.push('(');
                self.arguments(args, keywords);
                self.out.push(')');
            }
            NodeKind::FormattedString { parts } => {
                let text = render_fstring(tree, parts);
                self.out.push_str(&text);
            }
            NodeKind::Constant(literal) => self.literal(literal),
            NodeKind::Attribute { value, attr, .. } => {
                // `1.real` would lex as a float.
                if matches!(
                    tree.kind(*value),
                    NodeKind::Constant(Literal::Int(_) | Literal::LongInt(_))
                ) {
                    self.out.push('(');
                    self.expr_inner(*value);
                    self.out.push(')');
                } else {
                    self.expr(*value, Precedence::Atom);
                }
                self.out.push('.');
                self.out.push_str(attr);
            }
            NodeKind::Subscript { value, slice, .. } => {
                self.expr(*value, Precedence::Atom);
                self.out.push('[');
                match tree.kind(*slice) {
                    NodeKind::Tuple { elts, .. } if !elts.is_empty() => {
                        self.comma_list(elts, Precedence::Test);
                        if elts.len() == 1 {
                            self.out.push(',');
                        }
                    }
                    _ => self.expr(*slice, Precedence::Test),
                }
                self.out.push(']');
            }
            NodeKind::Starred { value, .. } => {
                self.out.push('*');
                self.expr(*value, Precedence::BitOr);
            }
            NodeKind::Name { id, .. } => self.out.push_str(id),
            NodeKind::List { elts, .. } => {
                self.out.push('[');
                self.comma_list(elts, Precedence::Test);
                self.out.push(']');
            }
            NodeKind::Tuple { elts, .. } => {
                if elts.is_empty() {
                    self.out.push_str("()");
                } else {
                    self.comma_list(elts, Precedence::Test);
                    if elts.len() == 1 {
                        self.out.push(',');
                    }
                }
            }
            NodeKind::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    self.expr(*lower, Precedence::Test);
                }
                self.out.push(':');
                if let Some(upper) = upper {
                    self.expr(*upper, Precedence::Test);
                }
                if let Some(step) = step {
                    self.out.push(':');
                    self.expr(*step, Precedence::Test);
                }
            }
            // Statements never appear in expression position.
            _ => self.out.push_str("..."),
        }
    }

    fn literal(&mut self, literal: &Literal) {
        if let Some(text) = literal.to_source() {
            self.out.push_str(&text);
            return;
        }
        // Infinities have no literal; `1e309` overflows to one when read back.
        let (Literal::Float(v) | Literal::Imaginary(v)) = literal else {
            return;
        };
        let suffix = if matches!(literal, Literal::Imaginary(_)) { "j" } else { "" };
        if v.is_nan() {
            let _ = write!(self.out, "(1e309{suffix} - 1e309{suffix})");
        } else if v.is_sign_negative() {
            let _ = write!(self.out, "-1e309{suffix}");
        } else {
            let _ = write!(self.out, "1e309{suffix}");
        }
    }

    fn generators(&mut self, generators: &[Comprehension]) {
        for generator in generators {
            self.out.push_str(if generator.is_async { " async for " } else { " for " });
            self.expr(generator.target, Precedence::Tuple);
            self.out.push_str(" in ");
            self.expr(generator.iter, Precedence::Or);
            for &cond in &generator.ifs {
                self.out.push_str(" if ");
                self.expr(cond, Precedence::Or);
            }
        }
    }

    pub(super) fn arguments(&mut self, args: &[NodeId], keywords: &[Keyword]) {
        let mut first = true;
        for &arg in args {
            if !first {
                self.out.push_str(", ");
            }
            first = false;
            self.expr(arg, Precedence::Test);
        }
        for keyword in keywords {
            if !first {
                self.out.push_str(", ");
            }
            first = false;
            match &keyword.arg {
                Some(name) => {
                    self.out.push_str(name);
                    self.out.push('=');
                    self.expr(keyword.value, Precedence::Test);
                }
                None => {
                    self.out.push_str("**");
                    self.expr(keyword.value, Precedence::BitOr);
                }
            }
        }
    }

    fn param(&mut self, param: &Param, annotated: bool) {
        self.out.push_str(&param.name);
        let annotation = param.annotation.filter(|_| annotated);
        if let Some(annotation) = annotation {
            self.out.push_str(": ");
            self.expr(annotation, Precedence::Test);
        }
        if let Some(default) = param.default {
            self.out.push_str(if annotation.is_some() { " = " } else { "=" });
            self.expr(default, Precedence::Test);
        }
    }

    pub(super) fn params(&mut self, params: &Params, annotated: bool) {
        let mut pieces_written = 0usize;
        let mut sep = |out: &mut String| {
            if pieces_written > 0 {
                out.push_str(", ");
            }
            pieces_written += 1;
        };
        for param in &params.posonly {
            sep(self.out);
            self.param(param, annotated);
        }
        if !params.posonly.is_empty() {
            sep(self.out);
            self.out.push('/');
        }
        for param in &params.args {
            sep(self.out);
            self.param(param, annotated);
        }
        if let Some(vararg) = &params.vararg {
            sep(self.out);
            self.out.push('*');
            self.param(vararg, annotated);
        } else if !params.kwonly.is_empty() {
            sep(self.out);
            self.out.push('*');
        }
        for param in &params.kwonly {
            sep(self.out);
            self.param(param, annotated);
        }
        if let Some(kwarg) = &params.kwarg {
            sep(self.out);
            self.out.push_str("**");
            self.param(kwarg, annotated);
        }
    }
}
