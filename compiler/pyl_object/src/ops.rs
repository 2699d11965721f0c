//! Operator evaluation with runtime semantics.
//!
//! Every operator kind is handled explicitly. Integer results that leave
//! the `i64` range and float results that are NaN are
//! [`ObjectError::Undecidable`]; everything the runtime would reject is
//! [`ObjectError::Raised`] with the runtime's message.

use std::cmp::Ordering;

use pyl_ir::{CmpOperator, Operator, UnaryOperator};

use crate::exc::{exc_err_fmt, ExcType, ObjectError, ObjectResult};
use crate::object::{check_size, Object, ObjectDict, ObjectSet};

/// Largest magnitude every `i64` below which converts to `f64` exactly.
const F64_EXACT: u64 = 1 << 53;

#[derive(Clone, Copy, Debug)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(obj: &Object) -> Option<Num> {
        match obj {
            Object::Bool(b) => Some(Num::Int(i64::from(*b))),
            Object::Int(v) => Some(Num::Int(*v)),
            Object::Float(v) => Some(Num::Float(*v)),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss, reason = "matches the runtime's int-to-float rounding")]
    fn to_f64(self) -> f64 {
        match self {
            Num::Int(v) => v as f64,
            Num::Float(v) => v,
        }
    }
}

/// Evaluate `left <op> right`.
pub fn binary(op: Operator, left: &Object, right: &Object) -> ObjectResult<Object> {
    if let (Object::Bool(a), Object::Bool(b)) = (left, right) {
        match op {
            Operator::BitAnd => return Ok(Object::Bool(a & b)),
            Operator::BitOr => return Ok(Object::Bool(a | b)),
            Operator::BitXor => return Ok(Object::Bool(a ^ b)),
            _ => {}
        }
    }
    if let (Some(a), Some(b)) = (Num::of(left), Num::of(right)) {
        return match (a, b) {
            (Num::Int(a), Num::Int(b)) => int_binary(op, a, b),
            _ => float_binary(op, a, b, left, right),
        };
    }
    match op {
        Operator::Add => concat(left, right),
        Operator::Mult => match (left, right) {
            (seq, Object::Bool(_) | Object::Int(_)) | (Object::Bool(_) | Object::Int(_), seq)
                if seq.py_len().is_some() && !matches!(seq, Object::Set(_) | Object::Dict(_)) =>
            {
                let count = match (left, right) {
                    (_, Object::Int(n)) | (Object::Int(n), _) => *n,
                    (_, Object::Bool(b)) | (Object::Bool(b), _) => i64::from(*b),
                    _ => 0,
                };
                repeat(seq, count)
            }
            (Object::Str(_) | Object::Bytes(_) | Object::Tuple(_) | Object::List(_), other)
            | (other, Object::Str(_) | Object::Bytes(_) | Object::Tuple(_) | Object::List(_)) => {
                exc_err_fmt!(ExcType::TypeError; "can't multiply sequence by non-int of type '{}'", other.type_name())
            }
            _ => unsupported(op, left, right),
        },
        // printf-style formatting is not modelled
        Operator::Mod if matches!(left, Object::Str(_) | Object::Bytes(_)) => {
            Err(ObjectError::Undecidable)
        }
        Operator::BitOr | Operator::BitAnd | Operator::BitXor | Operator::Sub => {
            match (left, right) {
                (Object::Set(a), Object::Set(b)) => set_op(op, a, b),
                (Object::Dict(a), Object::Dict(b)) if op == Operator::BitOr => {
                    let mut merged = a.clone();
                    for (key, entry) in b {
                        match merged.get_mut(key) {
                            Some(existing) => existing.1 = entry.1.clone(),
                            None => {
                                merged.insert(key.clone(), entry.clone());
                            }
                        }
                    }
                    check_size(merged.len())?;
                    Ok(Object::Dict(merged))
                }
                _ => unsupported(op, left, right),
            }
        }
        _ => unsupported(op, left, right),
    }
}

fn unsupported<T>(op: Operator, left: &Object, right: &Object) -> ObjectResult<T> {
    exc_err_fmt!(
        ExcType::TypeError;
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op.symbol(),
        left.type_name(),
        right.type_name()
    )
}

fn int_binary(op: Operator, a: i64, b: i64) -> ObjectResult<Object> {
    let overflow = || ObjectError::Undecidable;
    let value = match op {
        Operator::Add => a.checked_add(b).ok_or_else(overflow)?,
        Operator::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        Operator::Mult => a.checked_mul(b).ok_or_else(overflow)?,
        Operator::Div => {
            if b == 0 {
                return exc_err_fmt!(ExcType::ZeroDivisionError; "division by zero");
            }
            if a.unsigned_abs() > F64_EXACT || b.unsigned_abs() > F64_EXACT {
                return Err(ObjectError::Undecidable);
            }
            return float_result(Num::Int(a).to_f64() / Num::Int(b).to_f64());
        }
        Operator::FloorDiv => {
            if b == 0 {
                return exc_err_fmt!(ExcType::ZeroDivisionError; "integer division or modulo by zero");
            }
            floor_divmod(a, b).ok_or_else(overflow)?.0
        }
        Operator::Mod => {
            if b == 0 {
                return exc_err_fmt!(ExcType::ZeroDivisionError; "integer modulo by zero");
            }
            floor_divmod(a, b).ok_or_else(overflow)?.1
        }
        Operator::Pow => return int_pow(a, b),
        Operator::LShift => {
            if b < 0 {
                return exc_err_fmt!(ExcType::ValueError; "negative shift count");
            }
            if a == 0 {
                0
            } else {
                let shift = u32::try_from(b).ok().filter(|s| *s < 63).ok_or_else(overflow)?;
                let shifted = a << shift;
                if shifted >> shift != a {
                    return Err(ObjectError::Undecidable);
                }
                shifted
            }
        }
        Operator::RShift => {
            if b < 0 {
                return exc_err_fmt!(ExcType::ValueError; "negative shift count");
            }
            let shift = u32::try_from(b.min(63)).unwrap_or(63);
            a >> shift
        }
        Operator::BitOr => a | b,
        Operator::BitXor => a ^ b,
        Operator::BitAnd => a & b,
        Operator::MatMult => return unsupported(op, &Object::Int(a), &Object::Int(b)),
    };
    Ok(Object::Int(value))
}

/// Quotient and remainder rounded toward negative infinity.
pub(crate) fn floor_divmod(a: i64, b: i64) -> Option<(i64, i64)> {
    let quot = a.checked_div(b)?;
    let rem = a.checked_rem(b)?;
    if rem != 0 && (rem < 0) != (b < 0) {
        Some((quot - 1, rem + b))
    } else {
        Some((quot, rem))
    }
}

fn int_pow(base: i64, exp: i64) -> ObjectResult<Object> {
    if exp < 0 {
        if base == 0 {
            return exc_err_fmt!(ExcType::ZeroDivisionError; "0.0 cannot be raised to a negative power");
        }
        if base.unsigned_abs() > F64_EXACT {
            return Err(ObjectError::Undecidable);
        }
        return float_pow(Num::Int(base).to_f64(), Num::Int(exp).to_f64());
    }
    match base {
        0 => return Ok(Object::Int(i64::from(exp == 0))),
        1 => return Ok(Object::Int(1)),
        -1 => return Ok(Object::Int(if exp % 2 == 0 { 1 } else { -1 })),
        _ => {}
    }
    u32::try_from(exp)
        .ok()
        .and_then(|exp| base.checked_pow(exp))
        .map(Object::Int)
        .ok_or(ObjectError::Undecidable)
}

fn float_pow(base: f64, exp: f64) -> ObjectResult<Object> {
    if base == 0.0 && exp < 0.0 {
        return exc_err_fmt!(ExcType::ZeroDivisionError; "0.0 cannot be raised to a negative power");
    }
    if base < 0.0 && exp.fract() != 0.0 && exp.is_finite() {
        // complex result
        return Err(ObjectError::Undecidable);
    }
    let value = base.powf(exp);
    if value.is_infinite() && base.is_finite() && exp.is_finite() {
        return exc_err_fmt!(ExcType::OverflowError; "(34, 'Numerical result out of range')");
    }
    float_result(value)
}

fn float_result(value: f64) -> ObjectResult<Object> {
    if value.is_nan() {
        Err(ObjectError::Undecidable)
    } else {
        Ok(Object::Float(value))
    }
}

fn float_binary(op: Operator, a: Num, b: Num, left: &Object, right: &Object) -> ObjectResult<Object> {
    let (x, y) = (a.to_f64(), b.to_f64());
    match op {
        Operator::Add => float_result(x + y),
        Operator::Sub => float_result(x - y),
        Operator::Mult => float_result(x * y),
        Operator::Div => {
            if y == 0.0 {
                return exc_err_fmt!(ExcType::ZeroDivisionError; "float division by zero");
            }
            float_result(x / y)
        }
        Operator::FloorDiv => {
            if y == 0.0 {
                return exc_err_fmt!(ExcType::ZeroDivisionError; "float floor division by zero");
            }
            float_result(float_floor_divmod(x, y).0)
        }
        Operator::Mod => {
            if y == 0.0 {
                return exc_err_fmt!(ExcType::ZeroDivisionError; "float modulo by zero");
            }
            float_result(float_floor_divmod(x, y).1)
        }
        Operator::Pow => float_pow(x, y),
        Operator::MatMult
        | Operator::LShift
        | Operator::RShift
        | Operator::BitOr
        | Operator::BitXor
        | Operator::BitAnd => unsupported(op, left, right),
    }
}

/// Float floor division and modulo; the remainder takes the divisor's sign.
pub(crate) fn float_floor_divmod(x: f64, y: f64) -> (f64, f64) {
    let mut rem = x % y;
    let mut div = (x - rem) / y;
    if rem == 0.0 {
        rem = 0.0_f64.copysign(y);
    } else if (y < 0.0) != (rem < 0.0) {
        rem += y;
        div -= 1.0;
    }
    let floor = if div == 0.0 {
        0.0_f64.copysign(x / y)
    } else {
        let mut floor = div.floor();
        if div - floor > 0.5 {
            floor += 1.0;
        }
        floor
    };
    (floor, rem)
}

fn concat(left: &Object, right: &Object) -> ObjectResult<Object> {
    let result = match (left, right) {
        (Object::Str(a), Object::Str(b)) => Object::Str(format!("{a}{b}")),
        (Object::Bytes(a), Object::Bytes(b)) => Object::Bytes([a.as_slice(), b].concat()),
        (Object::Tuple(a), Object::Tuple(b)) => Object::Tuple([a.as_slice(), b].concat()),
        (Object::List(a), Object::List(b)) => Object::List([a.as_slice(), b].concat()),
        (Object::Str(_) | Object::Tuple(_) | Object::List(_), other) => {
            return exc_err_fmt!(
                ExcType::TypeError;
                "can only concatenate {} (not \"{}\") to {}",
                left.type_name(),
                other.type_name(),
                left.type_name()
            );
        }
        _ => return unsupported(Operator::Add, left, right),
    };
    check_size(result.py_len().unwrap_or(0))?;
    Ok(result)
}

fn repeat(seq: &Object, count: i64) -> ObjectResult<Object> {
    let count = usize::try_from(count.max(0)).map_err(|_| ObjectError::Undecidable)?;
    let len = seq.py_len().unwrap_or(0);
    check_size(len.checked_mul(count).ok_or(ObjectError::Undecidable)?)?;
    Ok(match seq {
        Object::Str(s) => Object::Str(s.repeat(count)),
        Object::Bytes(b) => Object::Bytes(b.repeat(count)),
        Object::Tuple(items) => Object::Tuple(repeat_items(items, count)),
        Object::List(items) => Object::List(repeat_items(items, count)),
        _ => return Err(ObjectError::Undecidable),
    })
}

fn repeat_items(items: &[Object], count: usize) -> Vec<Object> {
    let mut out = Vec::with_capacity(items.len() * count);
    for _ in 0..count {
        out.extend_from_slice(items);
    }
    out
}

fn set_op(op: Operator, a: &ObjectSet, b: &ObjectSet) -> ObjectResult<Object> {
    let mut out = ObjectSet::default();
    match op {
        Operator::BitOr => {
            out.clone_from(a);
            for (key, item) in b {
                out.entry(key.clone()).or_insert_with(|| item.clone());
            }
        }
        Operator::BitAnd => {
            out.extend(a.iter().filter(|(k, _)| b.contains_key(*k)).map(|(k, v)| (k.clone(), v.clone())));
        }
        Operator::Sub => {
            out.extend(a.iter().filter(|(k, _)| !b.contains_key(*k)).map(|(k, v)| (k.clone(), v.clone())));
        }
        _ => {
            out.extend(a.iter().filter(|(k, _)| !b.contains_key(*k)).map(|(k, v)| (k.clone(), v.clone())));
            out.extend(b.iter().filter(|(k, _)| !a.contains_key(*k)).map(|(k, v)| (k.clone(), v.clone())));
        }
    }
    check_size(out.len())?;
    Ok(Object::Set(out))
}

/// Evaluate a unary operator.
pub fn unary(op: UnaryOperator, operand: &Object) -> ObjectResult<Object> {
    if op == UnaryOperator::Not {
        return Ok(Object::Bool(!operand.is_truthy()));
    }
    let value = match (op, Num::of(operand)) {
        (UnaryOperator::USub, Some(Num::Int(v))) => {
            Object::Int(v.checked_neg().ok_or(ObjectError::Undecidable)?)
        }
        (UnaryOperator::USub, Some(Num::Float(v))) => Object::Float(-v),
        (UnaryOperator::UAdd, Some(Num::Int(v))) => Object::Int(v),
        (UnaryOperator::UAdd, Some(Num::Float(v))) => Object::Float(v),
        (UnaryOperator::Invert, Some(Num::Int(v))) => Object::Int(!v),
        _ => {
            let symbol = op.symbol();
            return exc_err_fmt!(ExcType::TypeError; "bad operand type for unary {symbol}: '{}'", operand.type_name());
        }
    };
    Ok(value)
}

/// Evaluate one comparison.
///
/// `is`/`is not` are decidable only when an operand is a singleton; two
/// equal non-singleton values may or may not be the same object.
pub fn compare(op: CmpOperator, left: &Object, right: &Object) -> ObjectResult<bool> {
    match op {
        CmpOperator::Eq => Ok(left.py_eq(right)),
        CmpOperator::NotEq => Ok(!left.py_eq(right)),
        CmpOperator::Is | CmpOperator::IsNot => {
            if !left.is_singleton() && !right.is_singleton() {
                return Err(ObjectError::Undecidable);
            }
            let same = match (left, right) {
                (Object::None, Object::None) | (Object::Ellipsis, Object::Ellipsis) => true,
                (Object::Bool(a), Object::Bool(b)) => a == b,
                _ => false,
            };
            Ok(same == (op == CmpOperator::Is))
        }
        CmpOperator::In => contains(right, left),
        CmpOperator::NotIn => contains(right, left).map(|found| !found),
        CmpOperator::Lt | CmpOperator::LtE | CmpOperator::Gt | CmpOperator::GtE => {
            ordering(op, left, right)
        }
    }
}

/// Evaluate `left op0 c0 op1 c1 ...` with short-circuiting.
pub fn compare_chain(left: &Object, rest: &[(CmpOperator, Object)]) -> ObjectResult<bool> {
    let mut current = left;
    for (op, next) in rest {
        if !compare(*op, current, next)? {
            return Ok(false);
        }
        current = next;
    }
    Ok(true)
}

/// Numeric ordering, exact across int and float. `None` involves NaN.
pub(crate) fn num_cmp(a: &Object, b: &Object) -> Option<Ordering> {
    match (Num::of(a)?, Num::of(b)?) {
        (Num::Int(x), Num::Int(y)) => Some(x.cmp(&y)),
        (Num::Float(x), Num::Float(y)) => x.partial_cmp(&y),
        (Num::Int(x), Num::Float(y)) => int_float_cmp(x, y),
        (Num::Float(x), Num::Int(y)) => int_float_cmp(y, x).map(Ordering::reverse),
    }
}

fn int_float_cmp(int: i64, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    if int.unsigned_abs() <= F64_EXACT {
        return Num::Int(int).to_f64().partial_cmp(&float);
    }
    if float >= 9.223_372_036_854_776e18 {
        return Some(Ordering::Less);
    }
    if float < -9.223_372_036_854_776e18 {
        return Some(Ordering::Greater);
    }
    #[allow(clippy::cast_possible_truncation, reason = "in range after the checks above")]
    let whole = float.trunc() as i64;
    match int.cmp(&whole) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - float.trunc())),
        other => Some(other),
    }
}

fn ordering(op: CmpOperator, left: &Object, right: &Object) -> ObjectResult<bool> {
    let apply = |ord: Option<Ordering>| match ord {
        None => false,
        Some(ord) => match op {
            CmpOperator::Lt => ord == Ordering::Less,
            CmpOperator::LtE => ord != Ordering::Greater,
            CmpOperator::Gt => ord == Ordering::Greater,
            _ => ord != Ordering::Less,
        },
    };
    match (left, right) {
        (a, b) if a.is_number() && b.is_number() => Ok(apply(num_cmp(a, b))),
        (Object::Str(a), Object::Str(b)) => Ok(apply(Some(a.cmp(b)))),
        (Object::Bytes(a), Object::Bytes(b)) => Ok(apply(Some(a.cmp(b)))),
        (Object::Tuple(a), Object::Tuple(b)) | (Object::List(a), Object::List(b)) => {
            match a.iter().zip(b).find(|(x, y)| !x.py_eq(y)) {
                Some((x, y)) => ordering(op, x, y),
                None => Ok(apply(Some(a.len().cmp(&b.len())))),
            }
        }
        (Object::Set(a), Object::Set(b)) => {
            let subset = |x: &ObjectSet, y: &ObjectSet| x.keys().all(|k| y.contains_key(k));
            Ok(match op {
                CmpOperator::Lt => a.len() < b.len() && subset(a, b),
                CmpOperator::LtE => subset(a, b),
                CmpOperator::Gt => a.len() > b.len() && subset(b, a),
                _ => subset(b, a),
            })
        }
        _ => exc_err_fmt!(
            ExcType::TypeError;
            "'{}' not supported between instances of '{}' and '{}'",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ),
    }
}

fn contains(container: &Object, item: &Object) -> ObjectResult<bool> {
    match container {
        Object::Str(s) => match item {
            Object::Str(needle) => Ok(s.contains(needle.as_str())),
            other => exc_err_fmt!(
                ExcType::TypeError;
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ),
        },
        Object::Bytes(haystack) => match item {
            Object::Bytes(needle) => {
                Ok(needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle.as_slice()))
            }
            Object::Int(v) => match u8::try_from(*v) {
                Ok(byte) => Ok(haystack.contains(&byte)),
                Err(_) => exc_err_fmt!(ExcType::ValueError; "byte must be in range(0, 256)"),
            },
            Object::Bool(b) => Ok(haystack.contains(&u8::from(*b))),
            other => exc_err_fmt!(
                ExcType::TypeError;
                "a bytes-like object is required, not '{}'",
                other.type_name()
            ),
        },
        Object::Tuple(items) | Object::List(items) => Ok(items.iter().any(|x| x.py_eq(item))),
        Object::Set(set) => Ok(set.contains_key(&item.hash_key()?)),
        Object::Dict(dict) => dict_contains(dict, item),
        other => exc_err_fmt!(
            ExcType::TypeError;
            "argument of type '{}' is not iterable",
            other.type_name()
        ),
    }
}

fn dict_contains(dict: &ObjectDict, key: &Object) -> ObjectResult<bool> {
    Ok(dict.contains_key(&key.hash_key()?))
}

#[cfg(test)]
mod tests;
