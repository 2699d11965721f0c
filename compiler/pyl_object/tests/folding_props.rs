//! Integer folding agrees with checked machine arithmetic.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use pyl_ir::{CmpOperator, Operator};
use pyl_object::{binary, compare, ExcType, Object, ObjectError};

fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if (a % b != 0) && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        Some(r + b)
    } else {
        Some(r)
    }
}

fn expected(op: Operator, a: i64, b: i64) -> Result<Object, ObjectError> {
    let int = |v: Option<i64>| v.map(Object::Int).ok_or(ObjectError::Undecidable);
    match op {
        Operator::Add => int(a.checked_add(b)),
        Operator::Sub => int(a.checked_sub(b)),
        Operator::Mult => int(a.checked_mul(b)),
        Operator::FloorDiv if b == 0 => Err(ObjectError::raised(
            ExcType::ZeroDivisionError,
            "integer division or modulo by zero",
        )),
        Operator::FloorDiv => int(floor_div(a, b)),
        Operator::Mod if b == 0 => Err(ObjectError::raised(
            ExcType::ZeroDivisionError,
            "integer modulo by zero",
        )),
        Operator::Mod => int(floor_mod(a, b)),
        Operator::BitAnd => Ok(Object::Int(a & b)),
        Operator::BitOr => Ok(Object::Int(a | b)),
        Operator::BitXor => Ok(Object::Int(a ^ b)),
        _ => unreachable!(),
    }
}

fn operator() -> impl Strategy<Value = Operator> {
    prop_oneof![
        Just(Operator::Add),
        Just(Operator::Sub),
        Just(Operator::Mult),
        Just(Operator::FloorDiv),
        Just(Operator::Mod),
        Just(Operator::BitAnd),
        Just(Operator::BitOr),
        Just(Operator::BitXor),
    ]
}

fn operand() -> impl Strategy<Value = i64> {
    prop_oneof![-100_i64..100, any::<i64>(), Just(i64::MIN), Just(i64::MAX), Just(0)]
}

proptest! {
    #[test]
    fn integer_operators_match_checked_arithmetic(op in operator(), a in operand(), b in operand()) {
        prop_assert_eq!(binary(op, &Object::Int(a), &Object::Int(b)), expected(op, a, b));
    }

    #[test]
    fn floor_division_identity(a in -10_000_i64..10_000, b in -100_i64..100) {
        prop_assume!(b != 0);
        let q = binary(Operator::FloorDiv, &Object::Int(a), &Object::Int(b)).unwrap();
        let r = binary(Operator::Mod, &Object::Int(a), &Object::Int(b)).unwrap();
        let (Object::Int(q), Object::Int(r)) = (q, r) else {
            panic!("integer operands give integer results");
        };
        prop_assert_eq!(q * b + r, a);
        prop_assert!(r == 0 || (r < 0) == (b < 0));
    }

    #[test]
    fn integer_ordering_matches_rust(a in any::<i64>(), b in any::<i64>()) {
        let (x, y) = (Object::Int(a), Object::Int(b));
        prop_assert_eq!(compare(CmpOperator::Lt, &x, &y).unwrap(), a < b);
        prop_assert_eq!(compare(CmpOperator::GtE, &x, &y).unwrap(), a >= b);
        prop_assert_eq!(compare(CmpOperator::Eq, &x, &y).unwrap(), a == b);
    }
}
