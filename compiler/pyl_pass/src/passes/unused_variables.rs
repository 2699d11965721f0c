//! Removal of stores nothing reads.
//!
//! Each module and function scope is analyzed once per cycle: a local
//! that is bound but never loaded in the scope, nor used by any nested
//! scope, nor deleted, is dead. Stores of literal values to dead names are
//! removed; augmented assignments to them are removed too, keeping their
//! right-hand side when evaluating it may have effects.
//!
//! Scopes that reach their namespace dynamically (`locals()`, `eval`, ...)
//! or star-import are left alone. At module level, names listed in
//! `__all__`, dunder names and names declared `global` anywhere survive.

use pyl_ir::{scope, transform, walk_children, ExprContext, NodeId, NodeKind, Rewrite, Transformer, Tree};
use pyl_object::Object;
use rustc_hash::FxHashSet;

use crate::util::{exported_names, fill_empty_blocks};
use crate::{OptLevel, Pass, PassContext};

#[derive(Debug, Default)]
pub struct UnusedVariableRemover;

impl Pass for UnusedVariableRemover {
    fn name(&self) -> &'static str {
        "UnusedVariableRemover"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O2
    }

    fn transform(&mut self, cx: &mut PassContext<'_>, tree: &mut Tree) {
        let mut protected = scope::global_declarations(tree, tree.root());
        protected.extend(exported_names(tree));
        let mut remover = Remover {
            cx,
            protected,
            frames: Vec::new(),
        };
        transform(&mut remover, tree);
    }
}

/// Names of one scope that may be pruned.
#[derive(Debug, Default)]
struct Frame {
    dead: FxHashSet<String>,
    bound: FxHashSet<String>,
}

struct Remover<'a, 'cx> {
    cx: &'a mut PassContext<'cx>,
    protected: FxHashSet<String>,
    frames: Vec<Frame>,
}

impl Transformer for Remover<'_, '_> {
    fn visit(&mut self, tree: &mut Tree, id: NodeId) -> Rewrite {
        match tree.kind(id) {
            NodeKind::Module { .. } | NodeKind::FunctionDef { .. } => {
                let frame = self.frame(tree, id);
                self.frames.push(frame);
                walk_children(self, tree, id);
                self.frames.pop();
            }
            NodeKind::ClassDef { .. } | NodeKind::Lambda { .. } => {
                self.frames.push(Frame::default());
                walk_children(self, tree, id);
                self.frames.pop();
            }
            NodeKind::Assign { .. } | NodeKind::AnnAssign { .. } | NodeKind::AugAssign { .. } => {
                return self.prune(tree, id);
            }
            _ => walk_children(self, tree, id),
        }
        fill_empty_blocks(tree, id);
        Rewrite::Keep
    }
}

impl Remover<'_, '_> {
    fn frame(&self, tree: &Tree, id: NodeId) -> Frame {
        let info = scope::analyze(tree, id);
        if info.dynamic || info.star_import {
            return Frame::default();
        }
        let is_module = matches!(tree.kind(id), NodeKind::Module { .. });
        let deleted: FxHashSet<&str> = tree
            .descendants(id)
            .into_iter()
            .filter_map(|node| match tree.kind(node) {
                NodeKind::Name {
                    id,
                    ctx: ExprContext::Del,
                } => Some(id.as_str()),
                _ => None,
            })
            .collect();
        let dead = info
            .bound
            .iter()
            .filter(|name| {
                info.is_local(name)
                    && !info.params.contains(*name)
                    && !info.loads.contains(*name)
                    && !info.nested.contains(*name)
                    && !deleted.contains(name.as_str())
                    && !(is_module && (self.protected.contains(*name) || is_dunder(name)))
            })
            .cloned()
            .collect();
        Frame {
            dead,
            bound: info.bound.iter().cloned().collect(),
        }
    }

    fn is_dead(&self, tree: &Tree, target: NodeId) -> bool {
        let Some(frame) = self.frames.last() else {
            return false;
        };
        matches!(tree.kind(target), NodeKind::Name { id, .. } if frame.dead.contains(id))
    }

    /// Evaluating `value` cannot have effects.
    fn is_pure(&self, tree: &Tree, value: NodeId) -> bool {
        match tree.kind(value) {
            NodeKind::Name { id, .. } => self.frames.last().is_some_and(|frame| frame.bound.contains(id)),
            _ => Object::from_expr(tree, value).is_some(),
        }
    }

    fn prune(&mut self, tree: &mut Tree, id: NodeId) -> Rewrite {
        match tree.kind(id) {
            NodeKind::Assign { targets, value } => {
                if Object::from_expr(tree, *value).is_none() {
                    return Rewrite::Keep;
                }
                let kept: Vec<NodeId> = targets.iter().copied().filter(|&t| !self.is_dead(tree, t)).collect();
                let removed = targets.len() - kept.len();
                if removed == 0 {
                    return Rewrite::Keep;
                }
                for _ in 0..removed {
                    self.cx.done();
                }
                if kept.is_empty() {
                    return Rewrite::Delete;
                }
                if let NodeKind::Assign { targets, .. } = tree.kind_mut(id) {
                    *targets = kept;
                }
                Rewrite::Keep
            }
            NodeKind::AnnAssign { target, value, .. } => {
                let literal = value.map_or(true, |value| Object::from_expr(tree, value).is_some());
                if literal && self.is_dead(tree, *target) {
                    self.cx.done();
                    return Rewrite::Delete;
                }
                Rewrite::Keep
            }
            NodeKind::AugAssign { target, value, .. } => {
                if !self.is_dead(tree, *target) {
                    return Rewrite::Keep;
                }
                let value = *value;
                self.cx.done();
                if self.is_pure(tree, value) {
                    return Rewrite::Delete;
                }
                let span = tree.span(id);
                Rewrite::Replace(tree.alloc(NodeKind::Expr { value }, span))
            }
            _ => Rewrite::Keep,
        }
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

#[cfg(test)]
mod tests;
