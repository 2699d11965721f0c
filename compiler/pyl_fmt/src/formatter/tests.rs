#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use pyl_ir::{ExprContext, Literal, NodeKind, Operator, Span, Tree, UnaryOperator};

use crate::{serialize, serialize_expr};

fn constant(tree: &mut Tree, literal: Literal) -> pyl_ir::NodeId {
    tree.synth(NodeKind::Constant(literal))
}

#[test]
fn test_binop_parenthesises_lower_precedence_operand() {
    let mut tree = Tree::new();
    let a = tree.synth(NodeKind::name("a", ExprContext::Load));
    let b = tree.synth(NodeKind::name("b", ExprContext::Load));
    let c = tree.synth(NodeKind::name("c", ExprContext::Load));
    let sum = tree.synth(NodeKind::BinOp {
        left: a,
        op: Operator::Add,
        right: b,
    });
    let product = tree.synth(NodeKind::BinOp {
        left: sum,
        op: Operator::Mult,
        right: c,
    });
    assert_eq!(serialize_expr(&tree, product), "(a + b) * c");
}

#[test]
fn test_right_operand_of_same_precedence_is_parenthesised() {
    let mut tree = Tree::new();
    let a = tree.synth(NodeKind::name("a", ExprContext::Load));
    let b = tree.synth(NodeKind::name("b", ExprContext::Load));
    let c = tree.synth(NodeKind::name("c", ExprContext::Load));
    let inner = tree.synth(NodeKind::BinOp {
        left: b,
        op: Operator::Sub,
        right: c,
    });
    let outer = tree.synth(NodeKind::BinOp {
        left: a,
        op: Operator::Sub,
        right: inner,
    });
    assert_eq!(serialize_expr(&tree, outer), "a - (b - c)");
}

#[test]
fn test_negative_constant_as_power_base() {
    let mut tree = Tree::new();
    let base = constant(&mut tree, Literal::Int(-2));
    let exp = constant(&mut tree, Literal::Int(2));
    let pow = tree.synth(NodeKind::BinOp {
        left: base,
        op: Operator::Pow,
        right: exp,
    });
    assert_eq!(serialize_expr(&tree, pow), "(-2) ** 2");
}

#[test]
fn test_non_finite_floats() {
    let mut tree = Tree::new();
    let inf = constant(&mut tree, Literal::Float(f64::INFINITY));
    let neg = constant(&mut tree, Literal::Float(f64::NEG_INFINITY));
    assert_eq!(serialize_expr(&tree, inf), "1e309");
    assert_eq!(serialize_expr(&tree, neg), "-1e309");
}

#[test]
fn test_attribute_on_int_literal() {
    let mut tree = Tree::new();
    let one = constant(&mut tree, Literal::Int(1));
    let attr = tree.synth(NodeKind::Attribute {
        value: one,
        attr: "real".to_owned(),
        ctx: ExprContext::Load,
    });
    assert_eq!(serialize_expr(&tree, attr), "(1).real");
}

#[test]
fn test_not_operator_spacing() {
    let mut tree = Tree::new();
    let x = tree.synth(NodeKind::name("x", ExprContext::Load));
    let not = tree.synth(NodeKind::UnaryOp {
        op: UnaryOperator::Not,
        operand: x,
    });
    assert_eq!(serialize_expr(&tree, not), "not x");
}

#[test]
fn test_empty_block_gets_pass() {
    let mut tree = Tree::new();
    let test = constant(&mut tree, Literal::Bool(true));
    let stmt = tree.alloc(
        NodeKind::While {
            test,
            body: Vec::new(),
            orelse: Vec::new(),
        },
        Span::DUMMY,
    );
    let root = tree.root();
    tree.replace(root, NodeKind::Module { body: vec![stmt] });
    assert_eq!(serialize(&tree), "while True:\n    pass\n");
}

#[test]
fn test_empty_module() {
    assert_eq!(serialize(&Tree::new()), "");
}
