//! The [`Object`] value type, hashing, equality and conversions.

use std::fmt::Write;

use indexmap::IndexMap;
use pyl_ir::{
    bytes_repr, float_repr, str_repr, ExprContext, Literal, NodeId, NodeKind, Span, Tree, UnaryOperator,
};
use rustc_hash::FxBuildHasher;

use crate::exc::{exc_err_fmt, ExcType, ObjectError, ObjectResult};

/// Longest sequence or string a computation may produce.
pub const MAX_SIZE: usize = 4096;

/// Hash identity of a hashable object.
///
/// Numbers that compare equal share a key, so `1`, `1.0` and `True` are
/// the same set member, as at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Ellipsis,
    Int(i64),
    /// Bit pattern of a float with a fractional part.
    Float(u64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<HashKey>),
}

/// Insertion-ordered set members, keyed by hash identity.
pub type ObjectSet = IndexMap<HashKey, Object, FxBuildHasher>;
/// Insertion-ordered `(key, value)` entries, keyed by hash identity.
pub type ObjectDict = IndexMap<HashKey, (Object, Object), FxBuildHasher>;

/// A fully known value.
///
/// `PartialEq` is structural (`Int(1) != Float(1.0)`); runtime equality
/// is [`Object::py_eq`].
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Ellipsis,
    Tuple(Vec<Object>),
    List(Vec<Object>),
    Set(ObjectSet),
    Dict(ObjectDict),
}

pub(crate) fn check_size(len: usize) -> ObjectResult<()> {
    if len > MAX_SIZE {
        Err(ObjectError::Undecidable)
    } else {
        Ok(())
    }
}

impl Object {
    /// Runtime class name, as used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::None => "NoneType",
            Object::Bool(_) => "bool",
            Object::Int(_) => "int",
            Object::Float(_) => "float",
            Object::Str(_) => "str",
            Object::Bytes(_) => "bytes",
            Object::Ellipsis => "ellipsis",
            Object::Tuple(_) => "tuple",
            Object::List(_) => "list",
            Object::Set(_) => "set",
            Object::Dict(_) => "dict",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Object::None => false,
            Object::Bool(b) => *b,
            Object::Int(v) => *v != 0,
            Object::Float(v) => *v != 0.0,
            Object::Str(s) => !s.is_empty(),
            Object::Bytes(b) => !b.is_empty(),
            Object::Ellipsis => true,
            Object::Tuple(items) | Object::List(items) => !items.is_empty(),
            Object::Set(set) => !set.is_empty(),
            Object::Dict(dict) => !dict.is_empty(),
        }
    }

    /// `None`, `True`, `False` and `...`: the values whose identity is known.
    pub fn is_singleton(&self) -> bool {
        matches!(self, Object::None | Object::Bool(_) | Object::Ellipsis)
    }

    /// `true` when no part of the value can be mutated in place.
    pub fn is_immutable(&self) -> bool {
        match self {
            Object::List(_) | Object::Set(_) | Object::Dict(_) => false,
            Object::Tuple(items) => items.iter().all(Object::is_immutable),
            _ => true,
        }
    }

    /// Length of a sized value.
    pub fn py_len(&self) -> Option<usize> {
        match self {
            Object::Str(s) => Some(s.chars().count()),
            Object::Bytes(b) => Some(b.len()),
            Object::Tuple(items) | Object::List(items) => Some(items.len()),
            Object::Set(set) => Some(set.len()),
            Object::Dict(dict) => Some(dict.len()),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Object::Bool(_) | Object::Int(_) | Object::Float(_))
    }

    pub fn hash_key(&self) -> ObjectResult<HashKey> {
        Ok(match self {
            Object::None => HashKey::None,
            Object::Ellipsis => HashKey::Ellipsis,
            Object::Bool(b) => HashKey::Int(i64::from(*b)),
            Object::Int(v) => HashKey::Int(*v),
            Object::Float(v) => float_key(*v)?,
            Object::Str(s) => HashKey::Str(s.clone()),
            Object::Bytes(b) => HashKey::Bytes(b.clone()),
            Object::Tuple(items) => {
                HashKey::Tuple(items.iter().map(Object::hash_key).collect::<ObjectResult<_>>()?)
            }
            Object::List(_) | Object::Set(_) | Object::Dict(_) => {
                return exc_err_fmt!(ExcType::TypeError; "unhashable type: '{}'", self.type_name());
            }
        })
    }

    /// Build a set, keeping the first of equal members.
    pub fn new_set(items: impl IntoIterator<Item = Object>) -> ObjectResult<Object> {
        let mut set = ObjectSet::default();
        for item in items {
            let key = item.hash_key()?;
            set.entry(key).or_insert(item);
        }
        check_size(set.len())?;
        Ok(Object::Set(set))
    }

    /// Build a dict; a repeated key keeps its first spelling and the last value.
    pub fn new_dict(pairs: impl IntoIterator<Item = (Object, Object)>) -> ObjectResult<Object> {
        let mut dict = ObjectDict::default();
        for (key, value) in pairs {
            let hash = key.hash_key()?;
            match dict.get_mut(&hash) {
                Some(entry) => entry.1 = value,
                None => {
                    dict.insert(hash, (key, value));
                }
            }
        }
        check_size(dict.len())?;
        Ok(Object::Dict(dict))
    }

    /// Runtime `==`.
    pub fn py_eq(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::None, Object::None) | (Object::Ellipsis, Object::Ellipsis) => true,
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Bytes(a), Object::Bytes(b)) => a == b,
            (Object::Tuple(a), Object::Tuple(b)) | (Object::List(a), Object::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.py_eq(y))
            }
            (Object::Set(a), Object::Set(b)) => {
                a.len() == b.len() && a.keys().all(|k| b.contains_key(k))
            }
            (Object::Dict(a), Object::Dict(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, (_, v))| b.get(k).is_some_and(|(_, w)| v.py_eq(w)))
            }
            (a, b) if a.is_number() && b.is_number() => {
                crate::ops::num_cmp(a, b) == Some(std::cmp::Ordering::Equal)
            }
            _ => false,
        }
    }

    /// Elements produced by iterating the value, in runtime order.
    ///
    /// Sets with more than one member have no predictable order and are
    /// undecidable here; see [`Object::members`].
    pub fn iterate(&self) -> ObjectResult<Vec<Object>> {
        match self {
            Object::Set(set) if set.len() > 1 => Err(ObjectError::Undecidable),
            Object::Str(s) => Ok(s.chars().map(|c| Object::Str(c.to_string())).collect()),
            Object::Bytes(b) => Ok(b.iter().map(|&v| Object::Int(i64::from(v))).collect()),
            Object::Tuple(items) | Object::List(items) => Ok(items.clone()),
            Object::Set(set) => Ok(set.values().cloned().collect()),
            Object::Dict(dict) => Ok(dict.values().map(|(k, _)| k.clone()).collect()),
            _ => exc_err_fmt!(ExcType::TypeError; "'{}' object is not iterable", self.type_name()),
        }
    }

    /// Elements of an iterable for consumers that ignore order.
    pub fn members(&self) -> ObjectResult<Vec<Object>> {
        match self {
            Object::Set(set) => Ok(set.values().cloned().collect()),
            other => other.iterate(),
        }
    }

    pub fn from_literal(literal: &Literal) -> Option<Object> {
        Some(match literal {
            Literal::None => Object::None,
            Literal::Bool(b) => Object::Bool(*b),
            Literal::Int(v) => Object::Int(*v),
            Literal::Float(v) => Object::Float(*v),
            Literal::Str(s) => Object::Str(s.clone()),
            Literal::Bytes(b) => Object::Bytes(b.clone()),
            Literal::Ellipsis => Object::Ellipsis,
            Literal::LongInt(_) | Literal::Imaginary(_) => return None,
        })
    }

    /// The value of a literal expression: constants, signed numbers and
    /// displays of them.
    pub fn from_expr(tree: &Tree, id: NodeId) -> Option<Object> {
        let items = |elts: &[NodeId]| -> Option<Vec<Object>> {
            elts.iter().map(|&e| Object::from_expr(tree, e)).collect()
        };
        match tree.kind(id) {
            NodeKind::Constant(lit) => Object::from_literal(lit),
            // `-1` parses as a unary minus applied to `1`
            NodeKind::UnaryOp {
                op: op @ (UnaryOperator::USub | UnaryOperator::UAdd),
                operand,
            } => match tree.kind(*operand) {
                NodeKind::Constant(lit @ (Literal::Int(_) | Literal::Float(_))) => {
                    crate::ops::unary(*op, &Object::from_literal(lit)?).ok()
                }
                _ => None,
            },
            NodeKind::Tuple { elts, ctx: ExprContext::Load } => Some(Object::Tuple(items(elts)?)),
            NodeKind::List { elts, ctx: ExprContext::Load } => Some(Object::List(items(elts)?)),
            NodeKind::Set { elts } => Object::new_set(items(elts)?).ok(),
            NodeKind::Dict { keys, values } => {
                let mut pairs = Vec::with_capacity(keys.len());
                for (key, &value) in keys.iter().zip(values) {
                    pairs.push((Object::from_expr(tree, (*key)?)?, Object::from_expr(tree, value)?));
                }
                Object::new_dict(pairs).ok()
            }
            _ => None,
        }
    }

    /// Build an expression evaluating to this value, if it has a literal
    /// spelling. Non-finite floats have none.
    pub fn to_literal_expr(&self, tree: &mut Tree, span: Span) -> Option<NodeId> {
        let elements = |tree: &mut Tree, items: &[&Object]| -> Option<Vec<NodeId>> {
            items.iter().map(|item| item.to_literal_expr(tree, span)).collect()
        };
        let kind = match self {
            Object::None => NodeKind::Constant(Literal::None),
            Object::Bool(b) => NodeKind::Constant(Literal::Bool(*b)),
            Object::Int(v) => NodeKind::Constant(Literal::Int(*v)),
            Object::Float(v) if v.is_finite() => NodeKind::Constant(Literal::Float(*v)),
            Object::Float(_) => return None,
            Object::Str(s) => NodeKind::Constant(Literal::Str(s.clone())),
            Object::Bytes(b) => NodeKind::Constant(Literal::Bytes(b.clone())),
            Object::Ellipsis => NodeKind::Constant(Literal::Ellipsis),
            Object::Tuple(items) => NodeKind::Tuple {
                elts: elements(tree, &items.iter().collect::<Vec<_>>())?,
                ctx: ExprContext::Load,
            },
            Object::List(items) => NodeKind::List {
                elts: elements(tree, &items.iter().collect::<Vec<_>>())?,
                ctx: ExprContext::Load,
            },
            Object::Set(set) => NodeKind::Set {
                elts: elements(tree, &set.values().collect::<Vec<_>>())?,
            },
            Object::Dict(dict) => {
                let keys = elements(tree, &dict.values().map(|(k, _)| k).collect::<Vec<_>>())?;
                let values = elements(tree, &dict.values().map(|(_, v)| v).collect::<Vec<_>>())?;
                NodeKind::Dict {
                    keys: keys.into_iter().map(Some).collect(),
                    values,
                }
            }
        };
        Some(tree.alloc(kind, span))
    }

    /// `repr(self)`.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        self.repr_into(&mut out);
        out
    }

    /// `str(self)`.
    ///
    /// Undecidable when the text depends on the iteration order of a set,
    /// which the runtime derives from hash values.
    pub fn py_str(&self) -> ObjectResult<String> {
        if self.has_unstable_order() {
            return Err(ObjectError::Undecidable);
        }
        Ok(match self {
            Object::Str(s) => s.clone(),
            other => other.repr(),
        })
    }

    fn has_unstable_order(&self) -> bool {
        match self {
            Object::Set(set) => set.len() > 1 || set.values().any(Object::has_unstable_order),
            Object::Tuple(items) | Object::List(items) => items.iter().any(Object::has_unstable_order),
            Object::Dict(dict) => dict
                .values()
                .any(|(k, v)| k.has_unstable_order() || v.has_unstable_order()),
            _ => false,
        }
    }

    fn repr_into(&self, out: &mut String) {
        fn seq<'a>(out: &mut String, items: impl Iterator<Item = &'a Object>) {
            for (i, item) in items.enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                item.repr_into(out);
            }
        }
        match self {
            Object::None => out.push_str("None"),
            Object::Bool(true) => out.push_str("True"),
            Object::Bool(false) => out.push_str("False"),
            Object::Int(v) => {
                let _ = write!(out, "{v}");
            }
            Object::Float(v) => out.push_str(&float_repr(*v)),
            Object::Str(s) => out.push_str(&str_repr(s)),
            Object::Bytes(b) => out.push_str(&bytes_repr(b)),
            Object::Ellipsis => out.push_str("Ellipsis"),
            Object::Tuple(items) => {
                out.push('(');
                seq(out, items.iter());
                if items.len() == 1 {
                    out.push(',');
                }
                out.push(')');
            }
            Object::List(items) => {
                out.push('[');
                seq(out, items.iter());
                out.push(']');
            }
            Object::Set(set) if set.is_empty() => out.push_str("set()"),
            Object::Set(set) => {
                out.push('{');
                seq(out, set.values());
                out.push('}');
            }
            Object::Dict(dict) => {
                out.push('{');
                for (i, (key, value)) in dict.values().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    key.repr_into(out);
                    out.push_str(": ");
                    value.repr_into(out);
                }
                out.push('}');
            }
        }
    }
}

fn float_key(value: f64) -> ObjectResult<HashKey> {
    if value.is_nan() {
        return Err(ObjectError::Undecidable);
    }
    if value.fract() == 0.0 && value.abs() < 9.223_372_036_854_776e18 {
        #[allow(clippy::cast_possible_truncation, reason = "integral and in range")]
        return Ok(HashKey::Int(value as i64));
    }
    Ok(HashKey::Float(value.to_bits()))
}
