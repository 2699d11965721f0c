//! Removal of documentation: docstrings and type annotations.

use pyl_ir::{transform, walk_children, Literal, NodeId, NodeKind, Rewrite, Transformer, Tree};

use crate::util::fill_empty_blocks;
use crate::{OptLevel, Pass, PassContext};

/// Drops string statements from module, class and function bodies, and
/// annotations everywhere except class bodies, where they may declare
/// fields.
#[derive(Debug, Default)]
pub struct DocumentRemover;

impl Pass for DocumentRemover {
    fn name(&self) -> &'static str {
        "DocumentRemover"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O1
    }

    fn transform(&mut self, cx: &mut PassContext<'_>, tree: &mut Tree) {
        transform(&mut Remover { cx, in_class: false }, tree);
    }
}

struct Remover<'a, 'cx> {
    cx: &'a mut PassContext<'cx>,
    /// Directly inside a class body, not inside one of its methods.
    in_class: bool,
}

impl Transformer for Remover<'_, '_> {
    fn visit(&mut self, tree: &mut Tree, id: NodeId) -> Rewrite {
        let in_class = match tree.kind(id) {
            NodeKind::ClassDef { .. } => true,
            NodeKind::FunctionDef { .. } | NodeKind::Lambda { .. } => false,
            _ => self.in_class,
        };
        let outer = std::mem::replace(&mut self.in_class, in_class);
        walk_children(self, tree, id);
        self.in_class = outer;

        match tree.kind(id) {
            NodeKind::Module { .. } | NodeKind::ClassDef { .. } => {
                self.strip_docstrings(tree, id);
                fill_empty_blocks(tree, id);
                Rewrite::Keep
            }
            NodeKind::FunctionDef { .. } => {
                self.strip_docstrings(tree, id);
                self.strip_signature(tree, id);
                fill_empty_blocks(tree, id);
                Rewrite::Keep
            }
            NodeKind::AnnAssign { target, value, .. } if !self.in_class => {
                self.cx.done();
                match *value {
                    Some(value) => {
                        let span = tree.span(id);
                        let targets = vec![*target];
                        Rewrite::Replace(tree.alloc(NodeKind::Assign { targets, value }, span))
                    }
                    None => Rewrite::Delete,
                }
            }
            _ => Rewrite::Keep,
        }
    }
}

impl Remover<'_, '_> {
    fn strip_docstrings(&mut self, tree: &mut Tree, id: NodeId) {
        let body = match tree.kind(id) {
            NodeKind::Module { body } | NodeKind::ClassDef { body, .. } | NodeKind::FunctionDef { body, .. } => {
                body.clone()
            }
            _ => return,
        };
        let kept: Vec<NodeId> = body.iter().copied().filter(|&stmt| !is_string_statement(tree, stmt)).collect();
        if kept.len() == body.len() {
            return;
        }
        for _ in kept.len()..body.len() {
            self.cx.done();
        }
        if let NodeKind::Module { body } | NodeKind::ClassDef { body, .. } | NodeKind::FunctionDef { body, .. } =
            tree.kind_mut(id)
        {
            *body = kept;
        }
    }

    fn strip_signature(&mut self, tree: &mut Tree, id: NodeId) {
        let NodeKind::FunctionDef { params, returns, .. } = tree.kind_mut(id) else {
            return;
        };
        let mut removed = usize::from(returns.take().is_some());
        for param in params.iter_mut() {
            removed += usize::from(param.annotation.take().is_some());
        }
        for _ in 0..removed {
            self.cx.done();
        }
    }
}

fn is_string_statement(tree: &Tree, stmt: NodeId) -> bool {
    matches!(tree.kind(stmt), NodeKind::Expr { value } if matches!(tree.kind(*value), NodeKind::Constant(Literal::Str(_))))
}

#[cfg(test)]
mod tests;
