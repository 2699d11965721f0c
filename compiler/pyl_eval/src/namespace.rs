//! Namespaces and the scope stack of a simulation.
//!
//! Frames form a lexical chain through their parent link rather than
//! through the call stack: a function's frame hangs off the namespace its
//! closure captured, so free names resolve where the function was defined.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use indexmap::IndexMap;
use pyl_ir::NodeId;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::value::Value;
use crate::variable::Variable;

/// A single-threaded shared namespace.
///
/// Wraps `Rc<RefCell<T>>` so every allocation goes through
/// [`LocalScope::new`]. Closures and the scope stack hold clones of the
/// same handle.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// `true` if both handles share one namespace.
    pub fn ptr_eq(&self, other: &LocalScope<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Name to slot map, in first-binding order.
pub type Bindings = IndexMap<String, Variable, FxBuildHasher>;

/// Work deferred until the namespace that registered it is finalized.
///
/// Module-level stores register one per bound name. When the slot was never
/// read by then, the store was dead and the statement is removed.
#[derive(Debug)]
pub struct PostTask {
    pub variable: Variable,
    pub statement: NodeId,
    /// The name target to drop from a multi-target assignment.
    pub target: Option<NodeId>,
    /// The stored value has no side effects and may go with the statement.
    pub pure: bool,
}

/// The bindings of one scope instance.
#[derive(Debug)]
pub struct Namespace {
    scope: NodeId,
    vars: Bindings,
    /// Names the scope's code binds somewhere; reading one before it is
    /// bound is an `UnboundLocalError`, not a lookup in the parent.
    locals: FxHashSet<String>,
    parent: Option<LocalScope<Namespace>>,
    post: Vec<PostTask>,
}

impl Namespace {
    pub fn new(scope: NodeId) -> Self {
        Namespace {
            scope,
            vars: Bindings::default(),
            locals: FxHashSet::default(),
            parent: None,
            post: Vec::new(),
        }
    }

    pub fn with_parent(scope: NodeId, parent: LocalScope<Namespace>, locals: FxHashSet<String>) -> Self {
        Namespace {
            scope,
            vars: Bindings::default(),
            locals,
            parent: Some(parent),
            post: Vec::new(),
        }
    }

    /// The node that opened the scope.
    pub fn scope(&self) -> NodeId {
        self.scope
    }

    pub fn parent(&self) -> Option<&LocalScope<Namespace>> {
        self.parent.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn is_local(&self, name: &str) -> bool {
        self.locals.contains(name)
    }

    /// Bind `name` to a fresh slot holding `value`; returns a handle to it.
    pub fn bind(&mut self, name: &str, value: Value) -> Variable {
        let var = Variable::new(value);
        self.insert(name, var.alias());
        var
    }

    pub fn insert(&mut self, name: &str, var: Variable) {
        if let Some(slot) = self.vars.get_mut(name) {
            *slot = var;
        } else {
            self.vars.insert(name.to_owned(), var);
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Variable> {
        self.vars.shift_remove(name)
    }

    /// Handles to every current binding.
    pub fn snapshot(&self) -> Bindings {
        self.vars.iter().map(|(name, var)| (name.clone(), var.alias())).collect()
    }

    /// Swap in `bindings`, returning the ones they replace.
    pub fn restore(&mut self, bindings: Bindings) -> Bindings {
        std::mem::replace(&mut self.vars, bindings)
    }

    pub fn on_exit(&mut self, task: PostTask) {
        self.post.push(task);
    }

    /// Hand over the deferred work, in registration order.
    pub fn finalize(&mut self) -> Vec<PostTask> {
        std::mem::take(&mut self.post)
    }
}

/// Outcome of resolving a name.
#[derive(Debug)]
pub enum Lookup {
    Found(Variable),
    /// Resolved in the builtins namespace.
    Builtin(Variable),
    /// A local of the innermost scope that holds it, read before binding.
    Unbound,
    Missing,
}

/// The namespaces visible to the code being simulated.
#[derive(Debug)]
pub struct ScopeStack {
    builtins: Namespace,
    global: LocalScope<Namespace>,
    /// Call frames, innermost last.
    frames: Vec<LocalScope<Namespace>>,
}

impl ScopeStack {
    pub fn new(global: Namespace, builtins: Namespace) -> Self {
        ScopeStack {
            builtins,
            global: LocalScope::new(global),
            frames: Vec::new(),
        }
    }

    pub fn global(&self) -> &LocalScope<Namespace> {
        &self.global
    }

    /// The namespace stores go to.
    pub fn current(&self) -> &LocalScope<Namespace> {
        self.frames.last().unwrap_or(&self.global)
    }

    /// Number of call frames above the module.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, frame: Namespace) {
        self.frames.push(LocalScope::new(frame));
    }

    /// Drop the innermost frame, returning its deferred work.
    pub fn pop(&mut self) -> Vec<PostTask> {
        self.frames.pop().map(|frame| frame.borrow_mut().finalize()).unwrap_or_default()
    }

    /// Resolve `name` from the current frame outwards, then in builtins.
    pub fn lookup(&self, name: &str) -> Lookup {
        let mut scope = self.current().clone();
        loop {
            let parent = {
                let ns = scope.borrow();
                if let Some(var) = ns.get(name) {
                    return Lookup::Found(var.alias());
                }
                if ns.is_local(name) {
                    return Lookup::Unbound;
                }
                ns.parent().cloned()
            };
            match parent {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        match self.builtins.get(name) {
            Some(var) => Lookup::Builtin(var.alias()),
            None => Lookup::Missing,
        }
    }
}

#[cfg(test)]
mod tests;
