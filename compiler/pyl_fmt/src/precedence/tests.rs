use super::*;

#[test]
fn test_ordering() {
    assert!(Precedence::Tuple < Precedence::Test);
    assert!(Precedence::Arith < Precedence::Term);
    assert_eq!(Precedence::Atom.next(), Precedence::Atom);
    assert_eq!(Precedence::Test.next(), Precedence::Or);
}

#[test]
fn test_negative_constants_bind_like_unary_minus() {
    assert_eq!(Precedence::of(&NodeKind::Constant(Literal::Int(-1))), Precedence::Factor);
    assert_eq!(Precedence::of(&NodeKind::Constant(Literal::Float(-0.0))), Precedence::Factor);
    assert_eq!(Precedence::of(&NodeKind::Constant(Literal::Int(1))), Precedence::Atom);
}
