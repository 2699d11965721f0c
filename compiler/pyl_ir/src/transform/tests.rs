use super::*;
use crate::{ExprContext, Literal, Span};

/// Drops `pass`, doubles `break`, and replaces the name `old` with `new`.
struct Rewriter;

impl Transformer for Rewriter {
    fn visit(&mut self, tree: &mut Tree, id: NodeId) -> Rewrite {
        match tree.kind(id).clone() {
            NodeKind::Pass => Rewrite::Delete,
            NodeKind::Break => {
                let extra = tree.synth(NodeKind::Break);
                Rewrite::Splice(vec![id, extra])
            }
            NodeKind::Name { id: name, ctx } if name == "old" => {
                Rewrite::Replace(tree.synth(NodeKind::name("new", ctx)))
            }
            _ => {
                walk_children(self, tree, id);
                Rewrite::Keep
            }
        }
    }
}

fn body(tree: &Tree) -> Vec<NodeKind> {
    tree.body().iter().map(|&id| tree.kind(id).clone()).collect()
}

#[test]
fn list_slots_accept_splice_and_delete() {
    let mut tree = Tree::new();
    let pass = tree.synth(NodeKind::Pass);
    let brk = tree.synth(NodeKind::Break);
    let root = tree.root();
    tree.replace(root, NodeKind::Module { body: vec![pass, brk] });

    transform(&mut Rewriter, &mut tree);
    assert_eq!(body(&tree), vec![NodeKind::Break, NodeKind::Break]);
}

#[test]
fn single_slots_take_replacements() {
    let mut tree = Tree::new();
    let name = tree.alloc(NodeKind::name("old", ExprContext::Load), Span::new(0, 3));
    let stmt = tree.alloc(NodeKind::Expr { value: name }, Span::new(0, 3));
    let root = tree.root();
    tree.replace(root, NodeKind::Module { body: vec![stmt] });

    transform(&mut Rewriter, &mut tree);
    let NodeKind::Expr { value } = tree.kind(stmt) else {
        panic!("statement kind changed");
    };
    assert_eq!(tree.kind(*value), &NodeKind::name("new", ExprContext::Load));
}

#[test]
fn required_slot_ignores_delete() {
    let mut tree = Tree::new();
    let pass = tree.synth(NodeKind::Pass);
    let test = tree.synth(NodeKind::Constant(Literal::Bool(true)));
    let stmt = tree.synth(NodeKind::While {
        test,
        body: vec![pass],
        orelse: vec![],
    });
    let root = tree.root();
    tree.replace(root, NodeKind::Module { body: vec![stmt] });

    transform(&mut Rewriter, &mut tree);
    let NodeKind::While { test: kept, body, .. } = tree.kind(stmt) else {
        panic!("statement kind changed");
    };
    assert_eq!(*kept, test);
    assert!(body.is_empty());
}
