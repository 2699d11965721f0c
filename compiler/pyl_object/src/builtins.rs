//! Builtins that may be evaluated at compile time.
//!
//! Each one accepts the argument shapes the runtime accepts, raises what
//! the runtime raises, and answers [`ObjectError::Undecidable`] for
//! shapes it does not model (a `key=` function, printf-style formatting,
//! non-default encodings).

use std::cmp::Ordering;

use pyl_ir::{CmpOperator, Operator};

use crate::exc::{exc_err_fmt, ExcType, ObjectError, ObjectResult};
use crate::object::{check_size, Object};
use crate::ops::{binary, compare, float_floor_divmod, floor_divmod};

/// Builtins without side effects whose result depends only on their
/// arguments.
pub const PURE_BUILTINS: &[&str] = &[
    "abs", "round", "pow", "divmod", "sum", "min", "max", "str", "int", "float", "bool", "tuple",
    "list", "dict", "set", "len", "sorted", "all", "any",
];

pub fn is_pure_builtin(name: &str) -> bool {
    PURE_BUILTINS.contains(&name)
}

/// Call the pure builtin `name`.
///
/// Names outside [`PURE_BUILTINS`] are undecidable.
pub fn call_builtin(name: &str, args: &[Object], kwargs: &[(String, Object)]) -> ObjectResult<Object> {
    let call = Call { name, args, kwargs };
    match name {
        "abs" => call.abs(),
        "round" => call.round(),
        "pow" => call.pow(),
        "divmod" => call.divmod(),
        "sum" => call.sum(),
        "min" => call.min_max(Ordering::Less),
        "max" => call.min_max(Ordering::Greater),
        "str" => call.str(),
        "int" => call.int(),
        "float" => call.float(),
        "bool" => {
            call.no_kwargs()?;
            Ok(Object::Bool(call.at_most(1)?.first().is_some_and(Object::is_truthy)))
        }
        "tuple" => call.sequence().map(Object::Tuple),
        "list" => call.sequence().map(Object::List),
        "set" => Object::new_set(call.members()?),
        "dict" => call.dict(),
        "len" => call.len(),
        "sorted" => call.sorted(),
        "all" => {
            call.no_kwargs()?;
            Ok(Object::Bool(call.exactly(1)?[0].members()?.iter().all(Object::is_truthy)))
        }
        "any" => {
            call.no_kwargs()?;
            Ok(Object::Bool(call.exactly(1)?[0].members()?.iter().any(Object::is_truthy)))
        }
        _ => Err(ObjectError::Undecidable),
    }
}

struct Call<'a> {
    name: &'a str,
    args: &'a [Object],
    kwargs: &'a [(String, Object)],
}

impl<'a> Call<'a> {
    fn no_kwargs(&self) -> ObjectResult<()> {
        if self.kwargs.is_empty() {
            Ok(())
        } else {
            exc_err_fmt!(ExcType::TypeError; "{}() takes no keyword arguments", self.name)
        }
    }

    fn exactly(&self, count: usize) -> ObjectResult<&'a [Object]> {
        if self.args.len() == count {
            return Ok(self.args);
        }
        if count == 1 {
            exc_err_fmt!(
                ExcType::TypeError;
                "{}() takes exactly one argument ({} given)",
                self.name,
                self.args.len()
            )
        } else {
            exc_err_fmt!(
                ExcType::TypeError;
                "{} expected {} arguments, got {}",
                self.name,
                count,
                self.args.len()
            )
        }
    }

    fn at_most(&self, count: usize) -> ObjectResult<&'a [Object]> {
        if self.args.len() <= count {
            Ok(self.args)
        } else {
            exc_err_fmt!(
                ExcType::TypeError;
                "{}() takes at most {} argument{} ({} given)",
                self.name,
                count,
                if count == 1 { "" } else { "s" },
                self.args.len()
            )
        }
    }

    /// Keyword argument `name`, rejecting any other keyword.
    fn keyword(&self, allowed: &[&str], name: &str) -> ObjectResult<Option<&'a Object>> {
        for (key, _) in self.kwargs {
            if !allowed.contains(&key.as_str()) {
                return exc_err_fmt!(
                    ExcType::TypeError;
                    "'{}' is an invalid keyword argument for {}()",
                    key,
                    self.name
                );
            }
        }
        Ok(self.kwargs.iter().find(|(key, _)| key == name).map(|(_, value)| value))
    }

    /// The single optional iterable argument of a constructor.
    fn sequence(&self) -> ObjectResult<Vec<Object>> {
        self.no_kwargs()?;
        match self.at_most(1)? {
            [] => Ok(Vec::new()),
            [iterable, ..] => iterable.iterate(),
        }
    }

    /// Like [`Call::sequence`], for consumers that ignore order.
    fn members(&self) -> ObjectResult<Vec<Object>> {
        self.no_kwargs()?;
        match self.at_most(1)? {
            [] => Ok(Vec::new()),
            [iterable, ..] => iterable.members(),
        }
    }

    fn abs(&self) -> ObjectResult<Object> {
        self.no_kwargs()?;
        match &self.exactly(1)?[0] {
            Object::Bool(b) => Ok(Object::Int(i64::from(*b))),
            Object::Int(v) => v.checked_abs().map(Object::Int).ok_or(ObjectError::Undecidable),
            Object::Float(v) => Ok(Object::Float(v.abs())),
            other => exc_err_fmt!(ExcType::TypeError; "bad operand type for abs(): '{}'", other.type_name()),
        }
    }

    fn round(&self) -> ObjectResult<Object> {
        let ndigits_kw = self.keyword(&["ndigits"], "ndigits")?;
        let (number, ndigits) = match (self.at_most(2)?, ndigits_kw) {
            ([number], kw) => (number, kw),
            ([number, ndigits], None) => (number, Some(ndigits)),
            ([], _) => {
                return exc_err_fmt!(ExcType::TypeError; "round() missing required argument 'number' (pos 1)");
            }
            _ => {
                return exc_err_fmt!(ExcType::TypeError; "argument for round() given by name ('ndigits') and position (2)");
            }
        };
        let digits = match ndigits {
            None | Some(Object::None) => None,
            Some(Object::Int(d)) => Some(*d),
            Some(Object::Bool(b)) => Some(i64::from(*b)),
            Some(other) => {
                return exc_err_fmt!(
                    ExcType::TypeError;
                    "'{}' object cannot be interpreted as an integer",
                    other.type_name()
                );
            }
        };
        match (number, digits) {
            (Object::Bool(b), None) => Ok(Object::Int(i64::from(*b))),
            (Object::Bool(b), Some(d)) => round_int(i64::from(*b), d),
            (Object::Int(v), None) => Ok(Object::Int(*v)),
            (Object::Int(v), Some(d)) => round_int(*v, d),
            (Object::Float(v), None) => float_to_int(v.round_ties_even()),
            (Object::Float(v), Some(d)) => round_float(*v, d),
            (other, _) => exc_err_fmt!(
                ExcType::TypeError;
                "type {} doesn't define __round__ method",
                other.type_name()
            ),
        }
    }

    fn pow(&self) -> ObjectResult<Object> {
        let modulus = self.keyword(&["base", "exp", "mod"], "mod")?;
        if self.kwargs.iter().any(|(key, _)| key != "mod") {
            return Err(ObjectError::Undecidable);
        }
        match (self.args, modulus) {
            ([base, exp], None | Some(Object::None)) | ([base, exp, Object::None], None) => {
                binary(Operator::Pow, base, exp)
            }
            ([base, exp, modulus], None) | ([base, exp], Some(modulus)) => {
                modular_pow(base, exp, modulus)
            }
            ([], _) | ([_], _) => {
                exc_err_fmt!(ExcType::TypeError; "pow() missing required argument 'exp' (pos 2)")
            }
            _ => exc_err_fmt!(
                ExcType::TypeError;
                "pow() takes at most 3 arguments ({} given)",
                self.args.len()
            ),
        }
    }

    fn divmod(&self) -> ObjectResult<Object> {
        self.no_kwargs()?;
        let args = self.exactly(2)?;
        let (a, b) = (&args[0], &args[1]);
        match (a, b) {
            (Object::Int(_) | Object::Bool(_), Object::Int(_) | Object::Bool(_)) => {
                let (x, y) = (int_of(a), int_of(b));
                if y == 0 {
                    return exc_err_fmt!(ExcType::ZeroDivisionError; "integer division or modulo by zero");
                }
                let (q, r) = floor_divmod(x, y).ok_or(ObjectError::Undecidable)?;
                Ok(Object::Tuple(vec![Object::Int(q), Object::Int(r)]))
            }
            (x, y) if x.is_number() && y.is_number() => {
                let (x, y) = (float_of(x), float_of(y));
                if y == 0.0 {
                    return exc_err_fmt!(ExcType::ZeroDivisionError; "float divmod()");
                }
                let (q, r) = float_floor_divmod(x, y);
                if q.is_nan() || r.is_nan() {
                    return Err(ObjectError::Undecidable);
                }
                Ok(Object::Tuple(vec![Object::Float(q), Object::Float(r)]))
            }
            _ => exc_err_fmt!(
                ExcType::TypeError;
                "unsupported operand type(s) for divmod(): '{}' and '{}'",
                a.type_name(),
                b.type_name()
            ),
        }
    }

    fn sum(&self) -> ObjectResult<Object> {
        let start_kw = self.keyword(&["start"], "start")?;
        let (iterable, start) = match (self.args, start_kw) {
            ([iterable], None) => (iterable, &Object::Int(0)),
            ([iterable], Some(start)) | ([iterable, start], None) => (iterable, start),
            _ => {
                return exc_err_fmt!(
                    ExcType::TypeError;
                    "sum() takes at most 2 arguments ({} given)",
                    self.args.len()
                );
            }
        };
        match start {
            Object::Str(_) => {
                return exc_err_fmt!(ExcType::TypeError; "sum() can't sum strings [use ''.join(seq) instead]");
            }
            Object::Bytes(_) => {
                return exc_err_fmt!(ExcType::TypeError; "sum() can't sum bytes [use b''.join(seq) instead]");
            }
            _ => {}
        }
        let mut total = start.clone();
        for item in iterable.iterate()? {
            total = binary(Operator::Add, &total, &item)?;
        }
        Ok(total)
    }

    /// `min` when `want` is `Less`, `max` when it is `Greater`.
    fn min_max(&self, want: Ordering) -> ObjectResult<Object> {
        if self.keyword(&["key", "default"], "key")?.is_some_and(|key| *key != Object::None) {
            return Err(ObjectError::Undecidable);
        }
        let default = self.keyword(&["key", "default"], "default")?;
        let items = match self.args {
            [] => {
                return exc_err_fmt!(
                    ExcType::TypeError;
                    "{} expected at least 1 argument, got 0",
                    self.name
                );
            }
            [iterable] => iterable.members()?,
            many => {
                if default.is_some() {
                    return exc_err_fmt!(
                        ExcType::TypeError;
                        "Cannot specify a default for {}() with multiple positional arguments",
                        self.name
                    );
                }
                many.to_vec()
            }
        };
        let op = if want == Ordering::Less {
            CmpOperator::Lt
        } else {
            CmpOperator::Gt
        };
        let mut iter = items.into_iter();
        let Some(mut best) = iter.next() else {
            return match default {
                Some(default) => Ok(default.clone()),
                None => exc_err_fmt!(ExcType::ValueError; "{}() iterable argument is empty", self.name),
            };
        };
        for item in iter {
            if compare(op, &item, &best)? {
                best = item;
            }
        }
        Ok(best)
    }

    fn str(&self) -> ObjectResult<Object> {
        if !self.kwargs.is_empty() || self.args.len() > 1 {
            // decoding bytes with an explicit encoding
            return Err(ObjectError::Undecidable);
        }
        match self.args.first() {
            Some(value) => value.py_str().map(Object::Str),
            None => Ok(Object::Str(String::new())),
        }
    }

    fn int(&self) -> ObjectResult<Object> {
        let base_kw = self.keyword(&["base"], "base")?;
        let (value, base) = match (self.at_most(2)?, base_kw) {
            ([], None) => return Ok(Object::Int(0)),
            ([value], base) => (value, base),
            ([value, base], None) => (value, Some(base)),
            _ => return exc_err_fmt!(ExcType::TypeError; "int() missing string argument"),
        };
        if let Some(base) = base {
            let base = match base {
                Object::Int(b) => *b,
                Object::Bool(b) => i64::from(*b),
                other => {
                    return exc_err_fmt!(
                        ExcType::TypeError;
                        "'{}' object cannot be interpreted as an integer",
                        other.type_name()
                    );
                }
            };
            let text = match value {
                Object::Str(s) => s.clone(),
                Object::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
                _ => return exc_err_fmt!(ExcType::TypeError; "int() can't convert non-string with explicit base"),
            };
            return parse_int(&text, base, value);
        }
        match value {
            Object::Bool(b) => Ok(Object::Int(i64::from(*b))),
            Object::Int(v) => Ok(Object::Int(*v)),
            Object::Float(v) => float_to_int(v.trunc()),
            Object::Str(s) => parse_int(s, 10, value),
            Object::Bytes(b) => parse_int(&String::from_utf8_lossy(b), 10, value),
            other => exc_err_fmt!(
                ExcType::TypeError;
                "int() argument must be a string, a bytes-like object or a real number, not '{}'",
                other.type_name()
            ),
        }
    }

    fn float(&self) -> ObjectResult<Object> {
        self.no_kwargs()?;
        let value = match self.at_most(1)? {
            [] => return Ok(Object::Float(0.0)),
            [value, ..] => value,
        };
        let result = match value {
            Object::Bool(_) | Object::Int(_) => float_of(value),
            Object::Float(v) => *v,
            Object::Str(s) => parse_float(s, value)?,
            Object::Bytes(b) => parse_float(&String::from_utf8_lossy(b), value)?,
            other => {
                return exc_err_fmt!(
                    ExcType::TypeError;
                    "float() argument must be a string or a real number, not '{}'",
                    other.type_name()
                );
            }
        };
        if result.is_nan() {
            return Err(ObjectError::Undecidable);
        }
        Ok(Object::Float(result))
    }

    fn dict(&self) -> ObjectResult<Object> {
        let mut pairs = Vec::new();
        match self.at_most(1)? {
            [] => {}
            [Object::Dict(dict)] => pairs.extend(dict.values().cloned()),
            [iterable] => {
                for (i, element) in iterable.iterate()?.into_iter().enumerate() {
                    let Ok(items) = element.iterate() else {
                        return exc_err_fmt!(
                            ExcType::TypeError;
                            "cannot convert dictionary update sequence element #{i} to a sequence"
                        );
                    };
                    match <[Object; 2]>::try_from(items) {
                        Ok([key, value]) => pairs.push((key, value)),
                        Err(items) => {
                            return exc_err_fmt!(
                                ExcType::ValueError;
                                "dictionary update sequence element #{i} has length {}; 2 is required",
                                items.len()
                            );
                        }
                    }
                }
            }
            _ => return Err(ObjectError::Undecidable),
        }
        pairs.extend(
            self.kwargs
                .iter()
                .map(|(key, value)| (Object::Str(key.clone()), value.clone())),
        );
        Object::new_dict(pairs)
    }

    fn len(&self) -> ObjectResult<Object> {
        self.no_kwargs()?;
        let value = &self.exactly(1)?[0];
        match value.py_len() {
            Some(len) => Ok(Object::Int(i64::try_from(len).map_err(|_| ObjectError::Undecidable)?)),
            None => exc_err_fmt!(
                ExcType::TypeError;
                "object of type '{}' has no len()",
                value.type_name()
            ),
        }
    }

    fn sorted(&self) -> ObjectResult<Object> {
        if self.keyword(&["key", "reverse"], "key")?.is_some_and(|key| *key != Object::None) {
            return Err(ObjectError::Undecidable);
        }
        let reverse = self
            .keyword(&["key", "reverse"], "reverse")?
            .is_some_and(Object::is_truthy);
        let [iterable] = self.args else {
            return exc_err_fmt!(
                ExcType::TypeError;
                "sorted expected 1 argument, got {}",
                self.args.len()
            );
        };
        let mut items = iterable.members()?;
        check_size(items.len())?;
        let mut error = None;
        if reverse {
            items.reverse();
        }
        items.sort_by(|a, b| {
            if error.is_some() {
                return Ordering::Equal;
            }
            let less = |x: &Object, y: &Object| compare(CmpOperator::Lt, x, y);
            match (less(a, b), less(b, a)) {
                (Ok(true), _) => Ordering::Less,
                (Ok(false), Ok(true)) => Ordering::Greater,
                (Ok(false), Ok(false)) => Ordering::Equal,
                (Err(e), _) | (_, Err(e)) => {
                    error = Some(e);
                    Ordering::Equal
                }
            }
        });
        if let Some(error) = error {
            return Err(error);
        }
        if reverse {
            items.reverse();
        }
        Ok(Object::List(items))
    }
}

fn int_of(obj: &Object) -> i64 {
    match obj {
        Object::Bool(b) => i64::from(*b),
        Object::Int(v) => *v,
        _ => 0,
    }
}

#[allow(clippy::cast_precision_loss, reason = "matches the runtime's int-to-float rounding")]
fn float_of(obj: &Object) -> f64 {
    match obj {
        Object::Float(v) => *v,
        other => int_of(other) as f64,
    }
}

fn float_to_int(value: f64) -> ObjectResult<Object> {
    if value.is_nan() {
        return exc_err_fmt!(ExcType::ValueError; "cannot convert float NaN to integer");
    }
    if value.is_infinite() {
        return exc_err_fmt!(ExcType::OverflowError; "cannot convert float infinity to integer");
    }
    if value.abs() >= 9.223_372_036_854_776e18 {
        return Err(ObjectError::Undecidable);
    }
    #[allow(clippy::cast_possible_truncation, reason = "integral and in range")]
    Ok(Object::Int(value as i64))
}

/// Round an int to `digits` decimal places, half to even.
fn round_int(value: i64, digits: i64) -> ObjectResult<Object> {
    if digits >= 0 {
        return Ok(Object::Int(value));
    }
    let Some(factor) = u32::try_from(-digits).ok().and_then(|e| 10_i64.checked_pow(e)) else {
        // every i64 rounds to zero at this precision
        return Ok(Object::Int(0));
    };
    let (mut quot, rem) = floor_divmod(value, factor).ok_or(ObjectError::Undecidable)?;
    let twice = i128::from(rem) * 2;
    if twice > i128::from(factor) || (twice == i128::from(factor) && quot % 2 != 0) {
        quot += 1;
    }
    quot.checked_mul(factor).map(Object::Int).ok_or(ObjectError::Undecidable)
}

/// Round a float to `digits` decimal places, half to even on the exact
/// binary value. Values too close to a tie to decide are undecidable.
fn round_float(value: f64, digits: i64) -> ObjectResult<Object> {
    if !value.is_finite() {
        return Ok(Object::Float(value));
    }
    let Ok(digits) = usize::try_from(digits) else {
        return Err(ObjectError::Undecidable);
    };
    if digits > 15 {
        return Ok(Object::Float(value));
    }
    let wide = format!("{:.*}", digits + 25, value.abs());
    let tail = wide.get(wide.len() - 25..).unwrap_or("");
    if tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0') {
        return Err(ObjectError::Undecidable);
    }
    let rounded: f64 = format!("{value:.digits$}").parse().map_err(|_| ObjectError::Undecidable)?;
    Ok(Object::Float(rounded))
}

fn modular_pow(base: &Object, exp: &Object, modulus: &Object) -> ObjectResult<Object> {
    let (Object::Int(_) | Object::Bool(_), Object::Int(_) | Object::Bool(_), Object::Int(_) | Object::Bool(_)) =
        (base, exp, modulus)
    else {
        return exc_err_fmt!(ExcType::TypeError; "pow() 3rd argument not allowed unless all arguments are integers");
    };
    let (base, exp, modulus) = (int_of(base), int_of(exp), int_of(modulus));
    if modulus == 0 {
        return exc_err_fmt!(ExcType::ValueError; "pow() 3rd argument cannot be 0");
    }
    if exp < 0 {
        // modular inverse
        return Err(ObjectError::Undecidable);
    }
    let m = i128::from(modulus);
    let mut result: i128 = 1 % m;
    let mut b = i128::from(base).rem_euclid(m.abs());
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result = (result * b).rem_euclid(m.abs());
        }
        b = (b * b).rem_euclid(m.abs());
        e >>= 1;
    }
    // the result takes the sign of the modulus
    if m < 0 && result != 0 {
        result += m;
    }
    i64::try_from(result).map(Object::Int).map_err(|_| ObjectError::Undecidable)
}

fn parse_int(text: &str, base: i64, original: &Object) -> ObjectResult<Object> {
    let invalid = || {
        exc_err_fmt!(
            ExcType::ValueError;
            "invalid literal for int() with base {}: {}",
            base,
            original.repr()
        )
    };
    if base != 0 && !(2..=36).contains(&base) {
        return exc_err_fmt!(ExcType::ValueError; "int() base must be >= 2 and <= 36, or 0");
    }
    let trimmed = text.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let lower = body.to_ascii_lowercase();
    let prefixed = |prefix: &str, radix: i64| {
        lower
            .strip_prefix(prefix)
            .filter(|_| base == radix || base == 0)
            .map(|rest| (rest.strip_prefix('_').unwrap_or(rest).to_owned(), radix))
    };
    let (digits, radix) = prefixed("0x", 16)
        .or_else(|| prefixed("0o", 8))
        .or_else(|| prefixed("0b", 2))
        .unwrap_or_else(|| (lower.clone(), if base == 0 { 10 } else { base }));
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
        || (base == 0
            && radix == 10
            && digits.starts_with('0')
            && !digits.trim_start_matches(['0', '_']).is_empty())
    {
        return invalid();
    }
    let clean: String = digits.chars().filter(|&c| c != '_').collect();
    let radix = u32::try_from(radix).unwrap_or(10);
    if !clean.chars().all(|c| c.is_digit(radix)) {
        return invalid();
    }
    let magnitude = u64::from_str_radix(&clean, radix).map_err(|_| ObjectError::Undecidable)?;
    let value = if negative {
        0_i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    };
    value.map(Object::Int).ok_or(ObjectError::Undecidable)
}

fn parse_float(text: &str, original: &Object) -> ObjectResult<f64> {
    let trimmed = text.trim();
    let valid_underscores = !trimmed.starts_with('_')
        && !trimmed.ends_with('_')
        && !trimmed.contains("__")
        && trimmed
            .char_indices()
            .filter(|(_, c)| *c == '_')
            .all(|(i, _)| {
                let bytes = trimmed.as_bytes();
                bytes[i - 1].is_ascii_digit() && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
            });
    let clean: String = trimmed.chars().filter(|&c| c != '_').collect();
    match clean.parse::<f64>() {
        Ok(value) if valid_underscores => Ok(value),
        _ => exc_err_fmt!(
            ExcType::ValueError;
            "could not convert string to float: {}",
            original.repr()
        ),
    }
}

#[cfg(test)]
mod tests;
