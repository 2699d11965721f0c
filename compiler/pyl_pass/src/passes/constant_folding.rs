//! Constant folding.
//!
//! Replaces an operator whose operands are all literal expressions
//! (constants, signed numbers and displays built from them) with the
//! literal it evaluates to. Covered forms:
//!
//! - binary and unary operators
//! - comparison chains
//! - `and`/`or` chains whose literals decide or pass through the result
//! - literal `if` tests, normalised to `True`/`False`
//!
//! An operation that raises at runtime is left in place, so the program
//! still raises, and flagged. One this crate cannot decide (integer
//! overflow, results past the size guard) is left alone silently.

use pyl_ir::{transform, walk_children, BoolOperator, Literal, NodeId, NodeKind, Rewrite, Transformer, Tree};
use pyl_object::{binary, compare_chain, unary, Object, ObjectError, ObjectResult};

use crate::{OptLevel, Pass, PassContext};

#[derive(Debug, Default)]
pub struct ConstantFolding;

impl Pass for ConstantFolding {
    fn name(&self) -> &'static str {
        "ConstantFolding"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O1
    }

    fn transform(&mut self, cx: &mut PassContext<'_>, tree: &mut Tree) {
        transform(&mut Folder { cx }, tree);
    }
}

struct Folder<'a, 'cx> {
    cx: &'a mut PassContext<'cx>,
}

impl Transformer for Folder<'_, '_> {
    fn visit(&mut self, tree: &mut Tree, id: NodeId) -> Rewrite {
        walk_children(self, tree, id);
        match tree.kind(id) {
            NodeKind::BoolOp { op, values } => {
                let (op, values) = (*op, values.clone());
                self.fold_bool(tree, id, op, &values)
            }
            NodeKind::If { test, .. } => {
                let test = *test;
                self.normalise_test(tree, id, test);
                Rewrite::Keep
            }
            _ => match evaluate(tree, id) {
                Some(Ok(value)) => {
                    let span = tree.span(id);
                    match value.to_literal_expr(tree, span) {
                        Some(literal) => {
                            self.cx.done();
                            Rewrite::Replace(literal)
                        }
                        None => Rewrite::Keep,
                    }
                }
                Some(Err(err @ ObjectError::Raised { .. })) => {
                    self.cx.flag(tree, err.to_string(), &[id]);
                    Rewrite::Keep
                }
                Some(Err(ObjectError::Undecidable)) | None => Rewrite::Keep,
            },
        }
    }
}

impl Folder<'_, '_> {
    /// Drop literals that pass evaluation on to the next operand and cut
    /// the chain at the first literal that decides it.
    fn fold_bool(&mut self, tree: &mut Tree, id: NodeId, op: BoolOperator, values: &[NodeId]) -> Rewrite {
        let Some(last) = values.len().checked_sub(1) else {
            return Rewrite::Keep;
        };
        let mut kept = Vec::with_capacity(values.len());
        for (i, &value) in values.iter().enumerate() {
            let Some(literal) = Object::from_expr(tree, value) else {
                kept.push(value);
                continue;
            };
            let decides = literal.is_truthy() == (op == BoolOperator::Or);
            if decides || i == last {
                kept.push(value);
                break;
            }
        }
        if kept.len() == values.len() {
            return Rewrite::Keep;
        }
        self.cx.done();
        if let [only] = kept[..] {
            return Rewrite::Replace(only);
        }
        if let NodeKind::BoolOp { values, .. } = tree.kind_mut(id) {
            *values = kept;
        }
        Rewrite::Keep
    }

    fn normalise_test(&mut self, tree: &mut Tree, id: NodeId, test: NodeId) {
        if matches!(tree.kind(test), NodeKind::Constant(Literal::Bool(_))) {
            return;
        }
        let Some(value) = Object::from_expr(tree, test) else {
            return;
        };
        let span = tree.span(test);
        let normalised = tree.alloc(NodeKind::Constant(Literal::Bool(value.is_truthy())), span);
        if let NodeKind::If { test, .. } = tree.kind_mut(id) {
            *test = normalised;
        }
        self.cx.done();
    }
}

/// Value of an operator node whose operands are all literal, or `None`
/// when some operand is not.
fn evaluate(tree: &Tree, id: NodeId) -> Option<ObjectResult<Object>> {
    let literal = |operand: NodeId| Object::from_expr(tree, operand);
    Some(match tree.kind(id) {
        NodeKind::BinOp { left, op, right } => binary(*op, &literal(*left)?, &literal(*right)?),
        NodeKind::UnaryOp { op, operand } => {
            // `-1` is already as literal as it gets
            if Object::from_expr(tree, id).is_some() {
                return None;
            }
            unary(*op, &literal(*operand)?)
        }
        NodeKind::Compare {
            left,
            ops,
            comparators,
        } => {
            let left = literal(*left)?;
            let rest = ops
                .iter()
                .zip(comparators)
                .map(|(op, &operand)| Some((*op, literal(operand)?)))
                .collect::<Option<Vec<_>>>()?;
            compare_chain(&left, &rest).map(Object::Bool)
        }
        _ => return None,
    })
}

#[cfg(test)]
mod tests;
