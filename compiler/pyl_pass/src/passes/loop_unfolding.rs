//! Unfolding of counting loops over a literal `range`.
//!
//! ```text
//! for i in range(2):        i = 0
//!     f(i)           ==>    f(i)
//!                           i = 1
//!                           f(i)
//! ```
//!
//! Only loops whose iteration count times body length fits the configured
//! budget are unfolded, and only when `range` can only be the builtin and
//! the body cannot leave the loop early.

use pyl_ir::{transform, walk_children, ExprContext, Literal, NodeId, NodeKind, Rewrite, Transformer, Tree};
use pyl_object::Object;
use tracing::debug;

use crate::util::Rebinds;
use crate::{OptLevel, Pass, PassContext};

#[derive(Debug, Default)]
pub struct LoopUnfolding;

impl Pass for LoopUnfolding {
    fn name(&self) -> &'static str {
        "LoopUnfolding"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O2
    }

    fn transform(&mut self, cx: &mut PassContext<'_>, tree: &mut Tree) {
        if Rebinds::collect(tree).contains("range") {
            return;
        }
        let budget = cx.config().loop_unfold_budget;
        transform(&mut Unfolder { cx, budget }, tree);
    }
}

struct Unfolder<'a, 'cx> {
    cx: &'a mut PassContext<'cx>,
    budget: usize,
}

/// `start`, `stop` and `step` of a literal `range(...)` call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Range {
    start: i64,
    stop: i64,
    step: i64,
}

impl Range {
    fn len(self) -> u128 {
        let (start, stop, step) = (i128::from(self.start), i128::from(self.stop), i128::from(self.step));
        let len = if step > 0 {
            (stop - start + step - 1).div_euclid(step)
        } else {
            (start - stop - step - 1).div_euclid(-step)
        };
        u128::try_from(len).unwrap_or(0)
    }

    fn values(self) -> impl Iterator<Item = i64> {
        let Range { start, step, .. } = self;
        (0..self.len()).map_while(move |i| {
            let offset = i128::try_from(i).ok()? * i128::from(step);
            i64::try_from(i128::from(start) + offset).ok()
        })
    }
}

impl Transformer for Unfolder<'_, '_> {
    fn visit(&mut self, tree: &mut Tree, id: NodeId) -> Rewrite {
        let NodeKind::For {
            target,
            iter,
            body,
            orelse,
            is_async: false,
        } = tree.kind(id)
        else {
            walk_children(self, tree, id);
            return Rewrite::Keep;
        };
        let (target, iter, body, orelse) = (*target, *iter, body.clone(), orelse.clone());
        let NodeKind::Name { id: name, .. } = tree.kind(target) else {
            walk_children(self, tree, id);
            return Rewrite::Keep;
        };
        let name = name.clone();
        let Some(range) = literal_range(tree, iter) else {
            walk_children(self, tree, id);
            return Rewrite::Keep;
        };
        if range.step == 0 {
            self.cx.flag(tree, "ValueError: range() arg 3 must not be zero.", &[iter]);
            walk_children(self, tree, id);
            return Rewrite::Keep;
        }
        let iterations = range.len();
        let cost = iterations.saturating_mul(body.len() as u128);
        if cost > self.budget as u128 || body.iter().any(|&stmt| exits_loop(tree, stmt)) {
            walk_children(self, tree, id);
            return Rewrite::Keep;
        }

        let span = tree.span(id);
        let mut out = Vec::new();
        for value in range.values() {
            let target = tree.alloc(NodeKind::name(name.as_str(), ExprContext::Store), span);
            let value = tree.alloc(NodeKind::Constant(Literal::Int(value)), span);
            out.push(tree.alloc(
                NodeKind::Assign {
                    targets: vec![target],
                    value,
                },
                span,
            ));
            for &stmt in &body {
                out.push(tree.deep_copy(stmt));
            }
        }
        out.extend(orelse);
        debug!(%name, iterations, "unfolded loop");
        self.cx.done();
        Rewrite::Splice(out)
    }
}

/// `range(stop)`, `range(start, stop)` or `range(start, stop, step)` with
/// integer literal arguments.
fn literal_range(tree: &Tree, iter: NodeId) -> Option<Range> {
    let NodeKind::Call { func, args, keywords } = tree.kind(iter) else {
        return None;
    };
    if !keywords.is_empty() || !matches!(tree.kind(*func), NodeKind::Name { id, .. } if id == "range") {
        return None;
    }
    let ints = args
        .iter()
        .map(|&arg| match Object::from_expr(tree, arg)? {
            Object::Int(v) => Some(v),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    match ints[..] {
        [stop] => Some(Range { start: 0, stop, step: 1 }),
        [start, stop] => Some(Range { start, stop, step: 1 }),
        [start, stop, step] => Some(Range { start, stop, step }),
        _ => None,
    }
}

/// `true` if `stmt` contains a `break` or `continue` of the enclosing loop.
fn exits_loop(tree: &Tree, stmt: NodeId) -> bool {
    match tree.kind(stmt) {
        NodeKind::Break | NodeKind::Continue => true,
        // these own their `break`/`continue`, except in their `else` block
        NodeKind::For { orelse, .. } | NodeKind::While { orelse, .. } => {
            orelse.iter().any(|&s| exits_loop(tree, s))
        }
        NodeKind::FunctionDef { .. } | NodeKind::ClassDef { .. } => false,
        kind => kind
            .blocks()
            .into_iter()
            .flatten()
            .any(|&s| exits_loop(tree, s)),
    }
}
