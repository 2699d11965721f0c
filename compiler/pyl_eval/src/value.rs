//! Values a name can hold during simulation.

use std::fmt;
use std::rc::Rc;

use pyl_ir::{NodeId, Params, Span, Tree};
use pyl_object::{ExcType, Object, ObjectError, ObjectResult};
use rustc_hash::FxHashSet;

use crate::namespace::{LocalScope, Namespace};
use crate::variable::Variable;

/// What the engine knows about a value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Nothing is known at compile time.
    #[default]
    Unknown,
    /// A fully known object.
    Constant(Object),
    /// A function the engine may call.
    Function(Rc<Function>),
}

impl Value {
    pub fn constant(&self) -> Option<&Object> {
        match self {
            Value::Constant(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Unknown => "object",
            Value::Constant(obj) => obj.type_name(),
            Value::Function(_) => "function",
        }
    }

    /// Truth value, when testing it cannot run user code.
    pub fn truthiness(&self) -> Option<bool> {
        match self {
            Value::Unknown => None,
            Value::Constant(obj) => Some(obj.is_truthy()),
            Value::Function(_) => Some(true),
        }
    }

    /// The value as it may be stored in a variable.
    ///
    /// Mutable objects can change behind any call the engine does not
    /// follow, so they are forgotten at binding time.
    #[must_use]
    pub fn storable(self) -> Value {
        match self {
            Value::Constant(obj) if !obj.is_immutable() => Value::Unknown,
            other => other,
        }
    }

    /// `obj.attr = ...` on this value.
    pub fn set_attr(&self, attr: &str) -> ObjectResult<()> {
        match self {
            Value::Constant(obj) => Err(ObjectError::raised(
                ExcType::AttributeError,
                format!("'{}' object has no attribute '{attr}'", obj.type_name()),
            )),
            Value::Unknown | Value::Function(_) => Ok(()),
        }
    }

    /// Literal spelling of a constant that may be copied into the tree.
    ///
    /// Strings, bytes and tuples longer than `limit` stay behind their name.
    pub fn to_literal_expr(&self, tree: &mut Tree, span: Span, limit: usize) -> Option<NodeId> {
        let Value::Constant(obj) = self else {
            return None;
        };
        if !obj.is_immutable() || !fits(obj, limit) {
            return None;
        }
        obj.to_literal_expr(tree, span)
    }
}

fn fits(obj: &Object, limit: usize) -> bool {
    match obj {
        Object::Str(s) => s.chars().count() <= limit,
        Object::Bytes(b) => b.len() <= limit,
        Object::Tuple(items) => items.len() <= limit && items.iter().all(|item| fits(item, limit)),
        _ => true,
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Constant(obj)
    }
}

/// A callable value.
pub struct Function {
    pub name: String,
    pub kind: FunctionKind,
}

pub enum FunctionKind {
    /// A builtin computed on host objects.
    Builtin(&'static str),
    /// A `def` or `lambda` of the unit.
    Defined(Closure),
}

/// Code of a defined function plus the namespace it closes over.
pub struct Closure {
    /// The `FunctionDef` or `Lambda` node.
    pub node: NodeId,
    pub params: Params,
    pub body: Body,
    /// Default values by parameter name, evaluated when the function was
    /// defined.
    pub defaults: Vec<(String, Variable)>,
    pub env: LocalScope<Namespace>,
    /// Names local to the body.
    pub locals: FxHashSet<String>,
    /// `false` for generators, coroutines and functions with a default the
    /// engine could not evaluate.
    pub callable: bool,
}

pub enum Body {
    Block(Vec<NodeId>),
    /// The expression of a `lambda`.
    Expr(NodeId),
}

impl Closure {
    pub fn default_for(&self, name: &str) -> Option<&Variable> {
        self.defaults.iter().find(|(param, _)| param == name).map(|(_, var)| var)
    }
}

impl Function {
    pub fn builtin(name: &'static str) -> Self {
        Function {
            name: name.to_owned(),
            kind: FunctionKind::Builtin(name),
        }
    }

    pub fn closure(&self) -> Option<&Closure> {
        match &self.kind {
            FunctionKind::Defined(closure) => Some(closure),
            FunctionKind::Builtin(_) => None,
        }
    }
}

// Closures reach back into the namespaces that hold them, so only the name
// is printed.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FunctionKind::Builtin(_) => write!(f, "<built-in function {}>", self.name),
            FunctionKind::Defined(_) => write!(f, "<function {}>", self.name),
        }
    }
}
