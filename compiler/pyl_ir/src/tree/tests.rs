use super::*;
use crate::{ExprContext, Literal, Operator};

fn module_with(tree: &mut Tree, stmts: Vec<NodeId>) {
    let root = tree.root();
    tree.replace(root, NodeKind::Module { body: stmts });
}

fn assign_sum(tree: &mut Tree) -> NodeId {
    let x = tree.alloc(NodeKind::name("x", ExprContext::Store), Span::new(0, 1));
    let one = tree.alloc(NodeKind::Constant(Literal::Int(1)), Span::new(4, 5));
    let two = tree.alloc(NodeKind::Constant(Literal::Int(2)), Span::new(8, 9));
    let sum = tree.alloc(
        NodeKind::BinOp {
            left: one,
            op: Operator::Add,
            right: two,
        },
        Span::new(4, 9),
    );
    tree.alloc(
        NodeKind::Assign {
            targets: vec![x],
            value: sum,
        },
        Span::new(0, 9),
    )
}

#[test]
fn new_tree_is_empty_module() {
    let tree = Tree::new();
    assert!(tree.body().is_empty());
    assert_eq!(tree.len(), 1);
}

#[test]
fn deep_copy_allocates_fresh_nodes() {
    let mut tree = Tree::new();
    let stmt = assign_sum(&mut tree);
    let before = tree.len();
    let copy = tree.deep_copy(stmt);
    assert_eq!(tree.len(), before * 2 - 1);
    assert_ne!(copy, stmt);
    assert_eq!(tree.span(copy), tree.span(stmt));

    let NodeKind::Assign { value, .. } = tree.kind(copy).clone() else {
        panic!("copy should be an assignment");
    };
    let NodeKind::Assign { value: orig, .. } = tree.kind(stmt).clone() else {
        panic!("original should be an assignment");
    };
    assert_ne!(value, orig);

    let copied = tree.descendants(copy);
    let original = tree.descendants(stmt);
    assert_eq!(copied.len(), original.len());
    for (&new, &old) in copied.iter().zip(&original) {
        assert_ne!(new, old);
        assert_eq!(std::mem::discriminant(tree.kind(new)), std::mem::discriminant(tree.kind(old)));
        if tree.kind(old).children().is_empty() {
            assert_eq!(tree.kind(new), tree.kind(old));
        }
    }
}

#[test]
fn descendants_are_preorder() {
    let mut tree = Tree::new();
    let stmt = assign_sum(&mut tree);
    let kinds: Vec<_> = tree
        .descendants(stmt)
        .into_iter()
        .map(|id| match tree.kind(id) {
            NodeKind::Assign { .. } => "assign",
            NodeKind::BinOp { .. } => "binop",
            NodeKind::Constant(_) => "const",
            NodeKind::Name { .. } => "name",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, ["assign", "binop", "const", "const", "name"]);
}

#[test]
fn fix_positions_inherits_parent_span() {
    let mut tree = Tree::new();
    let stmt = assign_sum(&mut tree);
    let pass = tree.synth(NodeKind::Pass);
    let cond = tree.synth(NodeKind::Constant(Literal::Bool(true)));
    let if_stmt = tree.alloc(
        NodeKind::If {
            test: cond,
            body: vec![pass],
            orelse: vec![],
        },
        Span::new(20, 30),
    );
    module_with(&mut tree, vec![stmt, if_stmt]);
    tree.fix_positions();
    assert_eq!(tree.span(tree.root()), Span::new(0, 0));
    assert_eq!(tree.span(pass), Span::new(20, 30));
    assert_eq!(tree.span(cond), Span::new(20, 30));
    assert_eq!(tree.span(stmt), Span::new(0, 9));
}

#[test]
fn any_finds_nested_kind() {
    let mut tree = Tree::new();
    let stmt = assign_sum(&mut tree);
    assert!(tree.any(stmt, |k| matches!(k, NodeKind::BinOp { .. })));
    assert!(!tree.any(stmt, |k| matches!(k, NodeKind::Call { .. })));
}

#[test]
fn grafting_the_newest_node_reclaims_its_slot() {
    let mut tree = Tree::new();
    let stmt = assign_sum(&mut tree);
    let NodeKind::Assign { value: sum, .. } = tree.kind(stmt).clone() else {
        panic!("expected an assignment");
    };
    let before = tree.len();
    let literal = tree.alloc(NodeKind::Constant(Literal::Int(3)), Span::new(4, 9));
    tree.graft(sum, literal);
    assert_eq!(tree.len(), before);
    assert_eq!(tree.kind(sum), &NodeKind::Constant(Literal::Int(3)));
    assert_eq!(tree.span(sum), Span::new(4, 9));
}

#[test]
fn grafting_an_older_node_leaves_a_placeholder() {
    let mut tree = Tree::new();
    let stmt = assign_sum(&mut tree);
    let NodeKind::Assign { targets, value: sum } = tree.kind(stmt).clone() else {
        panic!("expected an assignment");
    };
    let copy = tree.deep_copy(targets[0]);
    let later = tree.synth(NodeKind::Pass);
    let before = tree.len();
    tree.graft(sum, copy);
    assert_eq!(tree.len(), before);
    assert_eq!(tree.kind(sum), tree.kind(targets[0]));
    assert_eq!(tree.kind(copy), &NodeKind::Pass);
    assert_eq!(tree.kind(later), &NodeKind::Pass);
}
