#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;

fn int(v: i64) -> Object {
    Object::Int(v)
}

fn s(v: &str) -> Object {
    Object::Str(v.to_owned())
}

fn call(name: &str, args: &[Object]) -> ObjectResult<Object> {
    call_builtin(name, args, &[])
}

fn call_kw(name: &str, args: &[Object], kwargs: &[(&str, Object)]) -> ObjectResult<Object> {
    let kwargs: Vec<_> = kwargs.iter().map(|(k, v)| ((*k).to_owned(), v.clone())).collect();
    call_builtin(name, args, &kwargs)
}

fn raised(exc: ExcType, message: &str) -> ObjectError {
    ObjectError::raised(exc, message)
}

#[test]
fn allow_list() {
    assert!(is_pure_builtin("len"));
    assert!(is_pure_builtin("sorted"));
    assert!(!is_pure_builtin("print"));
    assert!(!is_pure_builtin("open"));
    assert_eq!(call("print", &[int(1)]).unwrap_err(), ObjectError::Undecidable);
}

#[test]
fn abs_and_arity() {
    assert_eq!(call("abs", &[int(-3)]).unwrap(), int(3));
    assert_eq!(call("abs", &[Object::Float(-0.5)]).unwrap(), Object::Float(0.5));
    assert_eq!(
        call("abs", &[int(1), int(2)]).unwrap_err(),
        raised(ExcType::TypeError, "abs() takes exactly one argument (2 given)")
    );
    assert_eq!(
        call("abs", &[s("x")]).unwrap_err(),
        raised(ExcType::TypeError, "bad operand type for abs(): 'str'")
    );
}

#[test]
fn round_half_to_even() {
    assert_eq!(call("round", &[Object::Float(2.5)]).unwrap(), int(2));
    assert_eq!(call("round", &[Object::Float(3.5)]).unwrap(), int(4));
    assert_eq!(call("round", &[Object::Float(-0.5)]).unwrap(), int(0));
    assert_eq!(call("round", &[int(1250), int(-2)]).unwrap(), int(1200));
    assert_eq!(call("round", &[int(1350), int(-2)]).unwrap(), int(1400));
    assert_eq!(call("round", &[int(-150), int(-2)]).unwrap(), int(-200));
    assert_eq!(call("round", &[Object::Float(2.675), int(2)]).unwrap(), Object::Float(2.67));
    assert_eq!(
        call_kw("round", &[Object::Float(1.234_56)], &[("ndigits", int(3))]).unwrap(),
        Object::Float(1.235)
    );
    // exactly representable tie
    assert_eq!(call("round", &[Object::Float(0.125), int(2)]).unwrap_err(), ObjectError::Undecidable);
    assert_eq!(
        call("round", &[Object::Float(f64::INFINITY)]).unwrap_err(),
        raised(ExcType::OverflowError, "cannot convert float infinity to integer")
    );
}

#[test]
fn pow_with_modulus() {
    assert_eq!(call("pow", &[int(2), int(10)]).unwrap(), int(1024));
    assert_eq!(call("pow", &[int(3), int(4), int(5)]).unwrap(), int(1));
    assert_eq!(call("pow", &[int(2), int(3), int(-5)]).unwrap(), int(-2));
    assert_eq!(call_kw("pow", &[int(3), int(4)], &[("mod", int(5))]).unwrap(), int(1));
    assert_eq!(
        call("pow", &[int(2), int(3), int(0)]).unwrap_err(),
        raised(ExcType::ValueError, "pow() 3rd argument cannot be 0")
    );
    assert_eq!(
        call("pow", &[Object::Float(2.0), int(3), int(5)]).unwrap_err(),
        raised(
            ExcType::TypeError,
            "pow() 3rd argument not allowed unless all arguments are integers"
        )
    );
}

#[test]
fn divmod_floors() {
    assert_eq!(call("divmod", &[int(-7), int(2)]).unwrap(), Object::Tuple(vec![int(-4), int(1)]));
    assert_eq!(
        call("divmod", &[Object::Float(7.5), int(2)]).unwrap(),
        Object::Tuple(vec![Object::Float(3.0), Object::Float(1.5)])
    );
    assert_eq!(
        call("divmod", &[int(1), int(0)]).unwrap_err(),
        raised(ExcType::ZeroDivisionError, "integer division or modulo by zero")
    );
}

#[test]
fn sum_min_max() {
    let list = Object::List(vec![int(3), int(1), int(2)]);
    assert_eq!(call("sum", &[list.clone()]).unwrap(), int(6));
    assert_eq!(call("sum", &[list.clone(), int(10)]).unwrap(), int(16));
    assert_eq!(call_kw("sum", &[list.clone()], &[("start", Object::Float(0.5))]).unwrap(), Object::Float(6.5));
    assert_eq!(
        call("sum", &[list.clone(), s("")]).unwrap_err(),
        raised(ExcType::TypeError, "sum() can't sum strings [use ''.join(seq) instead]")
    );
    assert_eq!(call("min", &[list.clone()]).unwrap(), int(1));
    assert_eq!(call("max", &[int(4), int(9), int(2)]).unwrap(), int(9));
    assert_eq!(call("max", &[s("ab")]).unwrap(), s("b"));
    assert_eq!(
        call("min", &[Object::List(vec![])]).unwrap_err(),
        raised(ExcType::ValueError, "min() iterable argument is empty")
    );
    assert_eq!(call_kw("min", &[Object::List(vec![])], &[("default", int(0))]).unwrap(), int(0));
    assert_eq!(call_kw("max", &[list], &[("key", s("f"))]).unwrap_err(), ObjectError::Undecidable);
}

#[test]
fn max_keeps_first_of_equals() {
    assert_eq!(call("max", &[int(1), Object::Float(1.0)]).unwrap(), int(1));
}

#[test]
fn conversions() {
    assert_eq!(call("str", &[int(12)]).unwrap(), s("12"));
    assert_eq!(call("str", &[]).unwrap(), s(""));
    assert_eq!(call("str", &[Object::Bytes(b"a".to_vec())]).unwrap(), s("b'a'"));
    assert_eq!(call("int", &[s(" -42 ")]).unwrap(), int(-42));
    assert_eq!(call("int", &[s("1_000")]).unwrap(), int(1000));
    assert_eq!(call("int", &[s("ff"), int(16)]).unwrap(), int(255));
    assert_eq!(call("int", &[s("0x1f"), int(0)]).unwrap(), int(31));
    assert_eq!(call("int", &[Object::Float(-2.9)]).unwrap(), int(-2));
    assert_eq!(
        call("int", &[s("12a")]).unwrap_err(),
        raised(ExcType::ValueError, "invalid literal for int() with base 10: '12a'")
    );
    assert_eq!(
        call("int", &[s("010"), int(0)]).unwrap_err(),
        raised(ExcType::ValueError, "invalid literal for int() with base 0: '010'")
    );
    assert_eq!(
        call("int", &[Object::List(vec![])]).unwrap_err(),
        raised(
            ExcType::TypeError,
            "int() argument must be a string, a bytes-like object or a real number, not 'list'"
        )
    );
    assert_eq!(call("float", &[s("1.5")]).unwrap(), Object::Float(1.5));
    assert_eq!(call("float", &[int(2)]).unwrap(), Object::Float(2.0));
    assert_eq!(call("float", &[s("nan")]).unwrap_err(), ObjectError::Undecidable);
    assert_eq!(
        call("float", &[s("x")]).unwrap_err(),
        raised(ExcType::ValueError, "could not convert string to float: 'x'")
    );
    assert_eq!(call("bool", &[s("")]).unwrap(), Object::Bool(false));
    assert_eq!(call("bool", &[]).unwrap(), Object::Bool(false));
}

#[test]
fn containers() {
    assert_eq!(
        call("tuple", &[s("ab")]).unwrap(),
        Object::Tuple(vec![s("a"), s("b")])
    );
    assert_eq!(call("list", &[]).unwrap(), Object::List(vec![]));
    assert_eq!(call("set", &[Object::List(vec![int(1), int(1)])]).unwrap().repr(), "{1}");
    let pairs = Object::List(vec![Object::Tuple(vec![s("a"), int(1)])]);
    assert_eq!(call_kw("dict", &[pairs], &[("b", int(2))]).unwrap().repr(), "{'a': 1, 'b': 2}");
    assert_eq!(
        call("dict", &[Object::List(vec![Object::Tuple(vec![int(1)])])]).unwrap_err(),
        raised(
            ExcType::ValueError,
            "dictionary update sequence element #0 has length 1; 2 is required"
        )
    );
    assert_eq!(call("len", &[s("héllo")]).unwrap(), int(5));
    assert_eq!(
        call("len", &[int(1)]).unwrap_err(),
        raised(ExcType::TypeError, "object of type 'int' has no len()")
    );
}

#[test]
fn sorted_is_stable_and_ignores_set_order() {
    let set = Object::new_set(vec![int(3), int(1), int(2)]).unwrap();
    assert_eq!(call("sorted", &[set]).unwrap(), Object::List(vec![int(1), int(2), int(3)]));
    let mixed = Object::List(vec![int(1), Object::Float(1.0), int(0)]);
    assert_eq!(
        call_kw("sorted", &[mixed], &[("reverse", Object::Bool(true))]).unwrap(),
        Object::List(vec![int(1), Object::Float(1.0), int(0)])
    );
    let err = call("sorted", &[Object::List(vec![int(1), s("a")])]).unwrap_err();
    assert!(matches!(err, ObjectError::Raised { exc: ExcType::TypeError, .. }));
}

#[test]
fn all_and_any() {
    assert_eq!(call("all", &[Object::List(vec![])]).unwrap(), Object::Bool(true));
    assert_eq!(call("any", &[Object::Tuple(vec![int(0), s("x")])]).unwrap(), Object::Bool(true));
    assert_eq!(call("all", &[Object::Tuple(vec![int(1), int(0)])]).unwrap(), Object::Bool(false));
}
