//! Rewriting traversal.
//!
//! A [`Transformer`] is asked about every node and answers with a
//! [`Rewrite`]. The answer is applied to the slot the node occupies in its
//! parent: list slots (statement bodies, element lists, call arguments)
//! accept any answer; single slots accept a replacement; optional slots
//! additionally accept deletion. Answers a slot cannot hold are ignored and
//! the original child stays.

use crate::node::{Comprehension, FStringPart, NodeId, NodeKind, Params};
use crate::tree::Tree;

/// Outcome of visiting one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rewrite {
    Keep,
    Replace(NodeId),
    /// Replace one list element with zero or more nodes.
    Splice(Vec<NodeId>),
    Delete,
}

impl Rewrite {
    /// Single node this rewrite leaves in a required slot, if any.
    fn single(self, original: NodeId) -> NodeId {
        match self {
            Rewrite::Keep | Rewrite::Delete => original,
            Rewrite::Replace(id) => id,
            Rewrite::Splice(ids) if ids.len() == 1 => ids[0],
            Rewrite::Splice(_) => original,
        }
    }
}

pub trait Transformer {
    /// Visit `id`; the default walks the children and keeps the node.
    fn visit(&mut self, tree: &mut Tree, id: NodeId) -> Rewrite {
        walk_children(self, tree, id);
        Rewrite::Keep
    }
}

/// Run `t` over the whole tree starting at the root module.
pub fn transform<T: Transformer + ?Sized>(t: &mut T, tree: &mut Tree) {
    let root = tree.root();
    if let Rewrite::Replace(new_root) = t.visit(tree, root) {
        tree.set_root(new_root);
    }
}

/// Visit every child of `id` and apply the answers.
///
/// The node's kind is cloned for the duration of the walk, so a visitor
/// must not rewrite an ancestor of the node it is visiting.
pub fn walk_children<T: Transformer + ?Sized>(t: &mut T, tree: &mut Tree, id: NodeId) {
    pyl_stack::ensure_sufficient_stack(|| {
        let mut kind = tree.kind(id).clone();
        let mut w = Walker { t, tree };
        w.kind(&mut kind);
        w.tree.replace(id, kind);
    });
}

struct Walker<'a, T: ?Sized> {
    t: &'a mut T,
    tree: &'a mut Tree,
}

impl<T: Transformer + ?Sized> Walker<'_, T> {
    fn one(&mut self, slot: &mut NodeId) {
        *slot = self.t.visit(self.tree, *slot).single(*slot);
    }

    fn opt(&mut self, slot: &mut Option<NodeId>) {
        if let Some(id) = *slot {
            *slot = match self.t.visit(self.tree, id) {
                Rewrite::Delete => None,
                rewrite => Some(rewrite.single(id)),
            };
        }
    }

    fn list(&mut self, slot: &mut Vec<NodeId>) {
        let old = std::mem::take(slot);
        let mut out = Vec::with_capacity(old.len());
        for id in old {
            match self.t.visit(self.tree, id) {
                Rewrite::Keep => out.push(id),
                Rewrite::Replace(new) => out.push(new),
                Rewrite::Splice(ids) => out.extend(ids),
                Rewrite::Delete => {}
            }
        }
        *slot = out;
    }

    /// Elements whose count must not change (comparators, dict values).
    fn fixed(&mut self, slot: &mut [NodeId]) {
        for id in slot {
            self.one(id);
        }
    }

    fn params(&mut self, params: &mut Params) {
        for param in params.iter_mut() {
            self.opt(&mut param.default);
        }
        for param in params.iter_mut() {
            self.opt(&mut param.annotation);
        }
    }

    fn generators(&mut self, gens: &mut [Comprehension]) {
        for g in gens {
            self.one(&mut g.iter);
            self.one(&mut g.target);
            self.list(&mut g.ifs);
        }
    }

    fn fstring(&mut self, parts: &mut [FStringPart]) {
        for part in parts {
            if let FStringPart::Field { value, spec, .. } = part {
                self.one(value);
                self.fstring(spec);
            }
        }
    }

    fn kind(&mut self, kind: &mut NodeKind) {
        match kind {
            NodeKind::Module { body } => self.list(body),
            NodeKind::FunctionDef {
                params,
                body,
                decorators,
                returns,
                ..
            } => {
                self.list(decorators);
                self.params(params);
                self.opt(returns);
                self.list(body);
            }
            NodeKind::ClassDef {
                bases,
                keywords,
                body,
                decorators,
                ..
            } => {
                self.list(decorators);
                self.list(bases);
                for k in keywords {
                    self.one(&mut k.value);
                }
                self.list(body);
            }
            NodeKind::Return { value } | NodeKind::Yield { value } => self.opt(value),
            NodeKind::Delete { targets } => self.list(targets),
            NodeKind::Assign { targets, value } => {
                self.one(value);
                self.list(targets);
            }
            NodeKind::AugAssign { target, value, .. } => {
                self.one(target);
                self.one(value);
            }
            NodeKind::AnnAssign {
                target,
                annotation,
                value,
                ..
            } => {
                self.opt(value);
                self.one(annotation);
                self.one(target);
            }
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                self.one(iter);
                self.one(target);
                self.list(body);
                self.list(orelse);
            }
            NodeKind::While { test, body, orelse } | NodeKind::If { test, body, orelse } => {
                self.one(test);
                self.list(body);
                self.list(orelse);
            }
            NodeKind::With { items, body, .. } => {
                for item in items {
                    self.one(&mut item.context);
                    self.opt(&mut item.vars);
                }
                self.list(body);
            }
            NodeKind::Raise { exc, cause } => {
                self.opt(exc);
                self.opt(cause);
            }
            NodeKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                self.list(body);
                self.list(handlers);
                self.list(orelse);
                self.list(finalbody);
            }
            NodeKind::ExceptHandler { typ, body, .. } => {
                self.opt(typ);
                self.list(body);
            }
            NodeKind::Assert { test, msg } => {
                self.one(test);
                self.opt(msg);
            }
            NodeKind::Import { .. }
            | NodeKind::ImportFrom { .. }
            | NodeKind::Global { .. }
            | NodeKind::Nonlocal { .. }
            | NodeKind::Pass
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Constant(_)
            | NodeKind::Name { .. } => {}
            NodeKind::Expr { value }
            | NodeKind::Await { value }
            | NodeKind::YieldFrom { value }
            | NodeKind::Attribute { value, .. }
            | NodeKind::Starred { value, .. }
            | NodeKind::UnaryOp { operand: value, .. } => self.one(value),
            NodeKind::BoolOp { values, .. } => self.fixed(values),
            NodeKind::NamedExpr { target, value } => {
                self.one(value);
                self.one(target);
            }
            NodeKind::BinOp { left, right, .. } => {
                self.one(left);
                self.one(right);
            }
            NodeKind::Lambda { params, body } => {
                self.params(params);
                self.one(body);
            }
            NodeKind::IfExp { test, body, orelse } => {
                self.one(test);
                self.one(body);
                self.one(orelse);
            }
            NodeKind::Dict { keys, values } => {
                for (key, value) in keys.iter_mut().zip(values.iter_mut()) {
                    if let Some(key) = key {
                        self.one(key);
                    }
                    self.one(value);
                }
            }
            NodeKind::Set { elts } | NodeKind::List { elts, .. } | NodeKind::Tuple { elts, .. } => {
                self.list(elts);
            }
            NodeKind::ListComp { elt, generators }
            | NodeKind::SetComp { elt, generators }
            | NodeKind::GeneratorExp { elt, generators } => {
                self.generators(generators);
                self.one(elt);
            }
            NodeKind::DictComp {
                key,
                value,
                generators,
            } => {
                self.generators(generators);
                self.one(key);
                self.one(value);
            }
            NodeKind::Compare {
                left, comparators, ..
            } => {
                self.one(left);
                self.fixed(comparators);
            }
            NodeKind::Call {
                func,
                args,
                keywords,
            } => {
                self.one(func);
                self.list(args);
                for k in keywords {
                    self.one(&mut k.value);
                }
            }
            NodeKind::FormattedString { parts } => self.fstring(parts),
            NodeKind::Subscript { value, slice, .. } => {
                self.one(value);
                self.one(slice);
            }
            NodeKind::Slice { lower, upper, step } => {
                self.opt(lower);
                self.opt(upper);
                self.opt(step);
            }
        }
    }
}

#[cfg(test)]
mod tests;
