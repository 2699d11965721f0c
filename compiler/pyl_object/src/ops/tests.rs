#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;

fn int(v: i64) -> Object {
    Object::Int(v)
}

fn s(v: &str) -> Object {
    Object::Str(v.to_owned())
}

fn raised(exc: ExcType, message: &str) -> ObjectError {
    ObjectError::raised(exc, message)
}

#[test]
fn integer_arithmetic() {
    assert_eq!(binary(Operator::Add, &int(2), &int(3)).unwrap(), int(5));
    assert_eq!(binary(Operator::Sub, &int(2), &int(3)).unwrap(), int(-1));
    assert_eq!(binary(Operator::Mult, &int(-4), &int(3)).unwrap(), int(-12));
    assert_eq!(binary(Operator::Add, &Object::Bool(true), &int(1)).unwrap(), int(2));
}

#[test]
fn floor_semantics() {
    assert_eq!(binary(Operator::FloorDiv, &int(7), &int(2)).unwrap(), int(3));
    assert_eq!(binary(Operator::FloorDiv, &int(-7), &int(2)).unwrap(), int(-4));
    assert_eq!(binary(Operator::Mod, &int(-7), &int(2)).unwrap(), int(1));
    assert_eq!(binary(Operator::Mod, &int(7), &int(-2)).unwrap(), int(-1));
    assert_eq!(
        binary(Operator::FloorDiv, &Object::Float(-7.0), &int(2)).unwrap(),
        Object::Float(-4.0)
    );
    assert_eq!(
        binary(Operator::Mod, &Object::Float(-1.0), &int(3)).unwrap(),
        Object::Float(2.0)
    );
}

#[test]
fn true_division_yields_float() {
    assert_eq!(binary(Operator::Div, &int(7), &int(2)).unwrap(), Object::Float(3.5));
    assert_eq!(binary(Operator::Div, &int(4), &int(2)).unwrap(), Object::Float(2.0));
}

#[test]
fn division_by_zero_raises() {
    assert_eq!(
        binary(Operator::Div, &int(1), &int(0)).unwrap_err(),
        raised(ExcType::ZeroDivisionError, "division by zero")
    );
    assert_eq!(
        binary(Operator::FloorDiv, &int(1), &int(0)).unwrap_err(),
        raised(ExcType::ZeroDivisionError, "integer division or modulo by zero")
    );
    assert_eq!(
        binary(Operator::Div, &Object::Float(1.0), &Object::Float(0.0)).unwrap_err(),
        raised(ExcType::ZeroDivisionError, "float division by zero")
    );
}

#[test]
fn power() {
    assert_eq!(binary(Operator::Pow, &int(2), &int(10)).unwrap(), int(1024));
    assert_eq!(binary(Operator::Pow, &int(2), &int(-1)).unwrap(), Object::Float(0.5));
    assert_eq!(binary(Operator::Pow, &int(-1), &int(1_000_001)).unwrap(), int(-1));
    assert_eq!(
        binary(Operator::Pow, &int(0), &int(-1)).unwrap_err(),
        raised(ExcType::ZeroDivisionError, "0.0 cannot be raised to a negative power")
    );
    assert_eq!(
        binary(Operator::Pow, &Object::Float(10.0), &int(400)).unwrap_err(),
        raised(ExcType::OverflowError, "(34, 'Numerical result out of range')")
    );
    assert_eq!(
        binary(Operator::Pow, &int(-8), &Object::Float(0.5)).unwrap_err(),
        ObjectError::Undecidable
    );
}

#[test]
fn integer_overflow_is_undecidable() {
    assert_eq!(binary(Operator::Add, &int(i64::MAX), &int(1)).unwrap_err(), ObjectError::Undecidable);
    assert_eq!(binary(Operator::Pow, &int(10), &int(30)).unwrap_err(), ObjectError::Undecidable);
    assert_eq!(binary(Operator::LShift, &int(1), &int(70)).unwrap_err(), ObjectError::Undecidable);
    assert_eq!(unary(UnaryOperator::USub, &int(i64::MIN)).unwrap_err(), ObjectError::Undecidable);
}

#[test]
fn shifts_and_bitwise() {
    assert_eq!(binary(Operator::LShift, &int(3), &int(4)).unwrap(), int(48));
    assert_eq!(binary(Operator::RShift, &int(-9), &int(1)).unwrap(), int(-5));
    assert_eq!(binary(Operator::RShift, &int(5), &int(200)).unwrap(), int(0));
    assert_eq!(
        binary(Operator::LShift, &int(1), &int(-1)).unwrap_err(),
        raised(ExcType::ValueError, "negative shift count")
    );
    assert_eq!(binary(Operator::BitXor, &int(6), &int(3)).unwrap(), int(5));
    assert_eq!(
        binary(Operator::BitAnd, &Object::Bool(true), &Object::Bool(false)).unwrap(),
        Object::Bool(false)
    );
    assert_eq!(binary(Operator::BitOr, &Object::Bool(true), &int(2)).unwrap(), int(3));
    assert_eq!(
        binary(Operator::BitAnd, &Object::Float(1.0), &int(1)).unwrap_err(),
        raised(ExcType::TypeError, "unsupported operand type(s) for &: 'float' and 'int'")
    );
}

#[test]
fn sequences() {
    assert_eq!(binary(Operator::Add, &s("ab"), &s("cd")).unwrap(), s("abcd"));
    assert_eq!(binary(Operator::Mult, &s("ab"), &int(3)).unwrap(), s("ababab"));
    assert_eq!(binary(Operator::Mult, &int(2), &s("x")).unwrap(), s("xx"));
    assert_eq!(binary(Operator::Mult, &s("x"), &int(-1)).unwrap(), s(""));
    assert_eq!(
        binary(Operator::Add, &Object::Tuple(vec![int(1)]), &Object::Tuple(vec![int(2)])).unwrap(),
        Object::Tuple(vec![int(1), int(2)])
    );
    assert_eq!(
        binary(Operator::Add, &s("a"), &int(1)).unwrap_err(),
        raised(ExcType::TypeError, "can only concatenate str (not \"int\") to str")
    );
    assert_eq!(
        binary(Operator::Mult, &s("a"), &Object::Float(2.0)).unwrap_err(),
        raised(ExcType::TypeError, "can't multiply sequence by non-int of type 'float'")
    );
    assert_eq!(binary(Operator::Mult, &s("ab"), &int(5000)).unwrap_err(), ObjectError::Undecidable);
    assert_eq!(binary(Operator::Mod, &s("%d"), &int(1)).unwrap_err(), ObjectError::Undecidable);
}

#[test]
fn containers_repeat() {
    let pair = Object::Tuple(vec![int(1), s("a")]);
    assert_eq!(
        binary(Operator::Mult, &pair, &int(2)).unwrap(),
        Object::Tuple(vec![int(1), s("a"), int(1), s("a")])
    );
    assert_eq!(
        binary(Operator::Mult, &int(3), &Object::List(vec![int(0)])).unwrap(),
        Object::List(vec![int(0), int(0), int(0)])
    );
    assert_eq!(binary(Operator::Mult, &Object::List(vec![int(0)]), &int(0)).unwrap(), Object::List(vec![]));
}

#[test]
fn matmult_is_a_type_error() {
    assert_eq!(
        binary(Operator::MatMult, &int(1), &int(2)).unwrap_err(),
        raised(ExcType::TypeError, "unsupported operand type(s) for @: 'int' and 'int'")
    );
}

#[test]
fn set_operators() {
    let a = Object::new_set(vec![int(1), int(2)]).unwrap();
    let b = Object::new_set(vec![int(2), int(3)]).unwrap();
    assert_eq!(binary(Operator::BitOr, &a, &b).unwrap().repr(), "{1, 2, 3}");
    assert_eq!(binary(Operator::BitAnd, &a, &b).unwrap().repr(), "{2}");
    assert_eq!(binary(Operator::Sub, &a, &b).unwrap().repr(), "{1}");
    assert_eq!(binary(Operator::BitXor, &a, &b).unwrap().repr(), "{1, 3}");
}

#[test]
fn unary_operators() {
    assert_eq!(unary(UnaryOperator::USub, &int(3)).unwrap(), int(-3));
    assert_eq!(unary(UnaryOperator::Invert, &int(0)).unwrap(), int(-1));
    assert_eq!(unary(UnaryOperator::Invert, &Object::Bool(true)).unwrap(), int(-2));
    assert_eq!(unary(UnaryOperator::UAdd, &Object::Bool(true)).unwrap(), int(1));
    assert_eq!(unary(UnaryOperator::Not, &s("")).unwrap(), Object::Bool(true));
    assert_eq!(
        unary(UnaryOperator::USub, &s("x")).unwrap_err(),
        raised(ExcType::TypeError, "bad operand type for unary -: 'str'")
    );
}

#[test]
fn comparisons() {
    assert!(compare(CmpOperator::Lt, &int(1), &Object::Float(1.5)).unwrap());
    assert!(compare(CmpOperator::Eq, &int(1), &Object::Float(1.0)).unwrap());
    assert!(compare(CmpOperator::GtE, &s("b"), &s("abc")).unwrap());
    assert!(compare(
        CmpOperator::Lt,
        &Object::Tuple(vec![int(1), int(2)]),
        &Object::Tuple(vec![int(1), int(3)])
    )
    .unwrap());
    assert!(compare(
        CmpOperator::Lt,
        &Object::List(vec![int(1)]),
        &Object::List(vec![int(1), int(0)])
    )
    .unwrap());
    assert!(!compare(CmpOperator::Lt, &Object::Float(f64::NAN), &int(1)).unwrap());
    assert_eq!(
        compare(CmpOperator::Lt, &s("a"), &int(1)).unwrap_err(),
        raised(ExcType::TypeError, "'<' not supported between instances of 'str' and 'int'")
    );
}

#[test]
fn large_ints_compare_exactly_with_floats() {
    let big = int((1 << 53) + 1);
    let float = Object::Float(9_007_199_254_740_992.0);
    assert!(compare(CmpOperator::Gt, &big, &float).unwrap());
    assert!(!compare(CmpOperator::Eq, &big, &float).unwrap());
}

#[test]
fn identity_only_on_singletons() {
    assert!(compare(CmpOperator::Is, &Object::None, &Object::None).unwrap());
    assert!(compare(CmpOperator::IsNot, &int(1), &Object::None).unwrap());
    assert!(!compare(CmpOperator::Is, &int(1), &Object::Bool(true)).unwrap());
    assert_eq!(compare(CmpOperator::Is, &int(1), &int(1)).unwrap_err(), ObjectError::Undecidable);
}

#[test]
fn membership() {
    assert!(compare(CmpOperator::In, &s("b"), &s("abc")).unwrap());
    assert!(compare(CmpOperator::NotIn, &int(4), &Object::List(vec![int(1)])).unwrap());
    assert!(compare(CmpOperator::In, &Object::Float(2.0), &Object::new_set(vec![int(2)]).unwrap()).unwrap());
    assert!(compare(CmpOperator::In, &int(98), &Object::Bytes(b"abc".to_vec())).unwrap());
    assert_eq!(
        compare(CmpOperator::In, &int(1), &s("abc")).unwrap_err(),
        raised(ExcType::TypeError, "'in <string>' requires string as left operand, not int")
    );
    assert_eq!(
        compare(CmpOperator::In, &int(1), &int(2)).unwrap_err(),
        raised(ExcType::TypeError, "argument of type 'int' is not iterable")
    );
}

#[test]
fn chains_short_circuit() {
    let rest = [(CmpOperator::Lt, int(2)), (CmpOperator::Lt, int(3))];
    assert!(compare_chain(&int(1), &rest).unwrap());
    // the failing first link hides the type error in the second
    let rest = [(CmpOperator::Gt, int(2)), (CmpOperator::Lt, s("x"))];
    assert!(!compare_chain(&int(1), &rest).unwrap());
}
