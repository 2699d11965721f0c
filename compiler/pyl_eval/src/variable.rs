//! Variable slots and read tracking.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// A storage slot for one binding of a name.
///
/// Handles are cheap to copy and share the slot: reading through any of
/// them marks the binding as used. A join slot, created where control flow
/// merges, lists the slots it may stand for, and reading it marks every
/// one of those too.
pub struct Variable(Rc<Slot>);

struct Slot {
    value: Value,
    read: Cell<bool>,
    maybe_unbound: bool,
    sources: Vec<Variable>,
}

impl Variable {
    pub fn new(value: Value) -> Self {
        Variable(Rc::new(Slot {
            value,
            read: Cell::new(false),
            maybe_unbound: false,
            sources: Vec::new(),
        }))
    }

    /// A slot standing for whichever of `sources` a merged path took.
    pub fn join(value: Value, sources: Vec<Variable>, maybe_unbound: bool) -> Self {
        Variable(Rc::new(Slot {
            value,
            read: Cell::new(false),
            maybe_unbound,
            sources,
        }))
    }

    /// Another handle to the same slot.
    pub fn alias(&self) -> Variable {
        Variable(Rc::clone(&self.0))
    }

    /// A fresh slot holding the current value. The source is not marked as
    /// read.
    pub fn rebind(&self) -> Variable {
        Variable::new(self.0.value.clone())
    }

    /// The value, counting as a read.
    pub fn get(&self) -> Value {
        self.mark_read();
        self.0.value.clone()
    }

    /// The value without counting as a read.
    pub fn peek(&self) -> &Value {
        &self.0.value
    }

    pub fn is_read(&self) -> bool {
        self.0.read.get()
    }

    /// `true` if some path reaching this slot never bound the name.
    pub fn is_maybe_unbound(&self) -> bool {
        self.0.maybe_unbound
    }

    pub fn ptr_eq(&self, other: &Variable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Count a read without fetching the value.
    pub fn mark_read(&self) {
        let mut pending = vec![self.alias()];
        while let Some(var) = pending.pop() {
            if !var.0.read.replace(true) {
                pending.extend(var.0.sources.iter().map(Variable::alias));
            }
        }
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("value", &self.0.value)
            .field("read", &self.0.read.get())
            .field("sources", &self.0.sources.len())
            .finish()
    }
}
