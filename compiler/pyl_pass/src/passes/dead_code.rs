//! Dead-code elimination for branches whose test is a literal.

use pyl_ir::{transform, walk_children, NodeId, NodeKind, Rewrite, Transformer, Tree};
use pyl_object::Object;

use crate::util::fill_empty_blocks;
use crate::{OptLevel, Pass, PassContext};

/// Collapses `if`, `while` and conditional expressions with a literal test
/// to the branch that runs.
#[derive(Debug, Default)]
pub struct DeadCodeElimination;

impl Pass for DeadCodeElimination {
    fn name(&self) -> &'static str {
        "DeadCodeElimination"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O1
    }

    fn transform(&mut self, cx: &mut PassContext<'_>, tree: &mut Tree) {
        transform(&mut Eliminator { cx }, tree);
    }
}

struct Eliminator<'a, 'cx> {
    cx: &'a mut PassContext<'cx>,
}

impl Transformer for Eliminator<'_, '_> {
    fn visit(&mut self, tree: &mut Tree, id: NodeId) -> Rewrite {
        walk_children(self, tree, id);
        let rewrite = match tree.kind(id) {
            NodeKind::If { test, body, orelse } => match truth(tree, *test) {
                Some(true) => Rewrite::Splice(body.clone()),
                Some(false) => Rewrite::Splice(orelse.clone()),
                None => Rewrite::Keep,
            },
            NodeKind::While { test, orelse, .. } => match truth(tree, *test) {
                Some(false) => Rewrite::Splice(orelse.clone()),
                _ => Rewrite::Keep,
            },
            NodeKind::IfExp { test, body, orelse } => match truth(tree, *test) {
                Some(true) => Rewrite::Replace(*body),
                Some(false) => Rewrite::Replace(*orelse),
                None => Rewrite::Keep,
            },
            _ => Rewrite::Keep,
        };
        if rewrite == Rewrite::Keep {
            fill_empty_blocks(tree, id);
        } else {
            self.cx.done();
        }
        rewrite
    }
}

fn truth(tree: &Tree, test: NodeId) -> Option<bool> {
    Object::from_expr(tree, test).map(|value| value.is_truthy())
}
