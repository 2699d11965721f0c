//! Folding of pure builtin calls over literal arguments.

use pyl_ir::{transform, walk_children, ExprContext, NodeId, NodeKind, Rewrite, Transformer, Tree};
use pyl_object::{call_builtin, is_pure_builtin, Object, ObjectError};

use crate::util::Rebinds;
use crate::{OptLevel, Pass, PassContext};

/// Replaces `len('abc')`, `sorted((3, 1))`, `max(1, 2)` and the like with
/// their result.
///
/// Only the builtins listed in [`pyl_object::PURE_BUILTINS`] are called,
/// and only when the unit never rebinds their name.
#[derive(Debug, Default)]
pub struct BuiltinFolding;

impl Pass for BuiltinFolding {
    fn name(&self) -> &'static str {
        "BuiltinFolding"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O2
    }

    fn transform(&mut self, cx: &mut PassContext<'_>, tree: &mut Tree) {
        let rebinds = Rebinds::collect(tree);
        transform(&mut Folder { cx, rebinds: &rebinds }, tree);
    }
}

struct Folder<'a, 'cx> {
    cx: &'a mut PassContext<'cx>,
    rebinds: &'a Rebinds,
}

impl Transformer for Folder<'_, '_> {
    fn visit(&mut self, tree: &mut Tree, id: NodeId) -> Rewrite {
        walk_children(self, tree, id);
        let Some((name, args, kwargs)) = self.literal_call(tree, id) else {
            return Rewrite::Keep;
        };
        match call_builtin(&name, &args, &kwargs) {
            Ok(value) => {
                let span = tree.span(id);
                let Some(literal) = value.to_literal_expr(tree, span) else {
                    return Rewrite::Keep;
                };
                self.cx.done();
                Rewrite::Replace(literal)
            }
            Err(err @ ObjectError::Raised { .. }) => {
                self.cx.flag(tree, err.to_string(), &[id]);
                Rewrite::Keep
            }
            Err(ObjectError::Undecidable) => Rewrite::Keep,
        }
    }
}

type LiteralCall = (String, Vec<Object>, Vec<(String, Object)>);

impl Folder<'_, '_> {
    /// The builtin name and literal arguments of a foldable call.
    fn literal_call(&self, tree: &Tree, id: NodeId) -> Option<LiteralCall> {
        let NodeKind::Call { func, args, keywords } = tree.kind(id) else {
            return None;
        };
        let NodeKind::Name {
            id: name,
            ctx: ExprContext::Load,
        } = tree.kind(*func)
        else {
            return None;
        };
        if !is_pure_builtin(name) || self.rebinds.contains(name) {
            return None;
        }
        let args = args
            .iter()
            .map(|&arg| Object::from_expr(tree, arg))
            .collect::<Option<Vec<_>>>()?;
        let kwargs = keywords
            .iter()
            .map(|kw| Some((kw.arg.clone()?, Object::from_expr(tree, kw.value)?)))
            .collect::<Option<Vec<_>>>()?;
        Some((name.clone(), args, kwargs))
    }
}

#[cfg(test)]
mod tests;
