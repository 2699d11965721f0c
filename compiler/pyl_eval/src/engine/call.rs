//! Calls and the statements of simulated function bodies.
//!
//! A call to a function of the unit runs its body in a fresh frame whose
//! parent is the namespace the function closed over. Inside a call only
//! decidable control flow is followed: an `if` on an unknown test or a loop
//! over an unknown iterable gives up on the whole outermost call, whose
//! value then becomes unknown.

use std::rc::Rc;

use pyl_ir::{scope, Keyword, NodeId, NodeKind, Operator, Tree};
use pyl_object::{binary, call_builtin, is_pure_builtin, ExcType, Object};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use super::{Catch, Flow, Simulator, TryFrame, OVERFLOW_MESSAGE};
use crate::error::{EvalAbort, EvalResult};
use crate::interrupt::Interrupt;
use crate::namespace::{Lookup, Namespace};
use crate::value::{Body, Closure, Function, FunctionKind, Value};
use crate::variable::Variable;

/// An augmented assignment to a name: the name, its new slot and whether
/// the statement could be dropped should the slot stay unread.
pub(super) type AugStore = (String, Variable, bool);

impl Simulator<'_, '_> {
    pub(super) fn eval_call(
        &mut self,
        tree: &mut Tree,
        id: NodeId,
        func: NodeId,
        args: &[NodeId],
        keywords: &[Keyword],
    ) -> EvalResult<Value> {
        let callee = self.eval(tree, func)?;
        let mut positional = Vec::with_capacity(args.len());
        let mut named = Vec::with_capacity(keywords.len());
        let mut spread = false;
        for &arg in args {
            if let NodeKind::Starred { value, .. } = tree.kind(arg) {
                let value = *value;
                match self.eval(tree, value)?.constant().map(Object::iterate) {
                    Some(Ok(items)) => positional.extend(items.into_iter().map(Value::Constant)),
                    _ => spread = true,
                }
            } else {
                positional.push(self.eval(tree, arg)?);
            }
        }
        for keyword in keywords {
            let value = self.eval(tree, keyword.value)?;
            match &keyword.arg {
                Some(name) => named.push((name.clone(), value)),
                None => spread = true,
            }
        }
        if self.interrupts.is_active() {
            return Ok(Value::Unknown);
        }
        if spread {
            return Ok(self.opaque());
        }
        let value = self.call(tree, id, &callee, positional, named)?;
        if self.conditional > 0 && self.interrupts.is_active() {
            self.interrupts.take();
            return Ok(self.opaque());
        }
        if self.committing() && value.constant().is_none() && !self.interrupts.is_active() {
            self.inline(tree, id, &callee, args.is_empty() && keywords.is_empty());
        }
        Ok(value)
    }

    fn call(
        &mut self,
        tree: &mut Tree,
        site: NodeId,
        callee: &Value,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> EvalResult<Value> {
        match callee {
            Value::Unknown => Ok(self.opaque()),
            Value::Constant(obj) => {
                let result = pyl_object::ObjectError::raised(
                    ExcType::TypeError,
                    format!("'{}' object is not callable", obj.type_name()),
                );
                self.host(tree, site, Err(result))
            }
            Value::Function(function) => match &function.kind {
                FunctionKind::Builtin(name) => {
                    let objects: Option<Vec<Object>> = args.iter().map(|v| v.constant().cloned()).collect();
                    let keywords: Option<Vec<(String, Object)>> = kwargs
                        .iter()
                        .map(|(k, v)| Some((k.clone(), v.constant()?.clone())))
                        .collect();
                    match (objects, keywords) {
                        (Some(objects), Some(keywords)) => {
                            let result = call_builtin(name, &objects, &keywords);
                            self.host(tree, site, result)
                        }
                        _ => Ok(self.opaque()),
                    }
                }
                FunctionKind::Defined(closure) => self.simulate(tree, site, &function.name, closure, args, kwargs),
            },
        }
    }

    fn simulate(
        &mut self,
        tree: &mut Tree,
        site: NodeId,
        name: &str,
        closure: &Closure,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> EvalResult<Value> {
        if !closure.callable {
            return Ok(self.opaque());
        }
        if self.scopes.depth() > 0 {
            return self.enter(tree, site, name, closure, args, kwargs);
        }
        self.steps = 0;
        match self.enter(tree, site, name, closure, args, kwargs) {
            Ok(value) => Ok(value),
            Err(abort) => {
                self.interrupts.take();
                self.try_frames.clear();
                if abort == EvalAbort::DepthExceeded {
                    self.cx.flag(tree, OVERFLOW_MESSAGE, &[site]);
                }
                debug!(function = name, %abort, "simulated call gave up");
                Ok(self.opaque())
            }
        }
    }

    fn enter(
        &mut self,
        tree: &mut Tree,
        site: NodeId,
        name: &str,
        closure: &Closure,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> EvalResult<Value> {
        if self.scopes.depth() >= self.limits.max_depth {
            return Err(EvalAbort::DepthExceeded);
        }
        let frame = match bind_arguments(name, closure, args, kwargs) {
            Ok(frame) => frame,
            Err(message) => {
                self.cx.flag(tree, format!("TypeError: {message}"), &[site]);
                return Ok(self.opaque());
            }
        };
        trace!(function = name, depth = self.scopes.depth(), "call");
        self.scopes.push(frame);
        let conditional = std::mem::take(&mut self.conditional);
        let outcome = pyl_stack::ensure_sufficient_stack(|| self.run_body(tree, &closure.body));
        self.conditional = conditional;
        for task in self.scopes.pop() {
            self.finish(tree, task);
        }
        outcome
    }

    fn run_body(&mut self, tree: &mut Tree, body: &Body) -> EvalResult<Value> {
        let stmts = match body {
            Body::Expr(expr) => return self.eval(tree, *expr),
            Body::Block(stmts) => stmts,
        };
        match self.exec_block(tree, stmts)? {
            Flow::Normal => Ok(Value::Constant(Object::None)),
            Flow::Break | Flow::Continue => Err(EvalAbort::Undecidable),
            Flow::Interrupted => match self.interrupts.take() {
                Some(Interrupt::Return(value)) => Ok(value),
                Some(exception) => {
                    // Still in flight for the caller.
                    self.interrupts.resume(exception);
                    Ok(Value::Unknown)
                }
                None => Ok(Value::Unknown),
            },
        }
    }

    pub(super) fn exec_block(&mut self, tree: &mut Tree, stmts: &[NodeId]) -> EvalResult<Flow> {
        for &stmt in stmts {
            self.step()?;
            let flow = self.exec(tree, stmt)?;
            if self.interrupts.is_active() {
                return Ok(Flow::Interrupted);
            }
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, tree: &mut Tree, stmt: NodeId) -> EvalResult<Flow> {
        match tree.kind(stmt).clone() {
            NodeKind::Expr { value } => {
                self.eval(tree, value)?;
            }
            NodeKind::Assign { targets, value } => {
                let value = self.eval(tree, value)?;
                for target in targets {
                    if self.interrupts.is_active() {
                        break;
                    }
                    self.bind_target(tree, target, value.clone())?;
                }
            }
            NodeKind::AnnAssign {
                target,
                value: Some(value),
                ..
            } => {
                let value = self.eval(tree, value)?;
                if !self.interrupts.is_active() {
                    self.bind_target(tree, target, value)?;
                }
            }
            NodeKind::AugAssign { target, op, value } => {
                self.aug_assign(tree, stmt, target, op, value)?;
            }
            NodeKind::If { test, body, orelse } => {
                let test = self.eval(tree, test)?;
                if self.interrupts.is_active() {
                    return Ok(Flow::Interrupted);
                }
                return match test.truthiness() {
                    Some(true) => self.exec_block(tree, &body),
                    Some(false) => self.exec_block(tree, &orelse),
                    None => Err(EvalAbort::Undecidable),
                };
            }
            NodeKind::While { test, body, orelse } => loop {
                self.step()?;
                let test = self.eval(tree, test)?;
                if self.interrupts.is_active() {
                    return Ok(Flow::Interrupted);
                }
                match test.truthiness() {
                    None => return Err(EvalAbort::Undecidable),
                    Some(false) => return self.exec_block(tree, &orelse),
                    Some(true) => match self.exec_block(tree, &body)? {
                        Flow::Break => return Ok(Flow::Normal),
                        Flow::Interrupted => return Ok(Flow::Interrupted),
                        Flow::Normal | Flow::Continue => {}
                    },
                }
            },
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            } => {
                if is_async {
                    return Err(EvalAbort::Undecidable);
                }
                let items = self.iteration(tree, iter)?;
                for item in items {
                    if self.interrupts.is_active() {
                        return Ok(Flow::Interrupted);
                    }
                    self.step()?;
                    self.bind_target(tree, target, Value::Constant(item))?;
                    match self.exec_block(tree, &body)? {
                        Flow::Break => return Ok(Flow::Normal),
                        Flow::Interrupted => return Ok(Flow::Interrupted),
                        Flow::Normal | Flow::Continue => {}
                    }
                }
                if self.interrupts.is_active() {
                    return Ok(Flow::Interrupted);
                }
                return self.exec_block(tree, &orelse);
            }
            NodeKind::Break => return Ok(Flow::Break),
            NodeKind::Continue => return Ok(Flow::Continue),
            NodeKind::Return { value } => {
                let value = match value {
                    Some(value) => self.eval(tree, value)?,
                    None => Value::Constant(Object::None),
                };
                if !self.interrupts.is_active() {
                    self.interrupts.returns(value);
                }
                return Ok(Flow::Interrupted);
            }
            NodeKind::Raise { exc, cause } => {
                // A bare `raise` re-raises whatever is being handled.
                let Some(exc) = exc else {
                    return Err(EvalAbort::Undecidable);
                };
                let raised = self.exception_of(tree, exc)?;
                if let Some(cause) = cause {
                    self.eval(tree, cause)?;
                }
                if !self.interrupts.is_active() {
                    let Some((exc, message)) = raised else {
                        return Err(EvalAbort::Undecidable);
                    };
                    self.throw(exc, message)?;
                }
                return Ok(Flow::Interrupted);
            }
            NodeKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => return self.exec_try(tree, &body, &handlers, &orelse, &finalbody),
            NodeKind::Assert { test, msg } => {
                let test = self.eval(tree, test)?;
                if self.interrupts.is_active() {
                    return Ok(Flow::Interrupted);
                }
                match test.truthiness() {
                    Some(true) => {}
                    None => return Err(EvalAbort::Undecidable),
                    Some(false) => {
                        let message = match msg {
                            Some(msg) => self
                                .eval(tree, msg)?
                                .constant()
                                .and_then(|obj| obj.py_str().ok())
                                .unwrap_or_default(),
                            None => String::new(),
                        };
                        self.throw(ExcType::AssertionError, message)?;
                        return Ok(Flow::Interrupted);
                    }
                }
            }
            NodeKind::FunctionDef { name, .. } => {
                let value = self.make_function(tree, stmt)?;
                self.bind(&name, value);
            }
            NodeKind::Delete { targets } => {
                for target in targets {
                    self.exec_delete(tree, target)?;
                }
            }
            NodeKind::Import { names } | NodeKind::ImportFrom { names, .. } => {
                self.taint();
                for alias in names.iter().filter(|alias| alias.name != "*") {
                    self.bind(alias.bound_name(), Value::Unknown);
                }
            }
            NodeKind::Global { .. } | NodeKind::Nonlocal { .. } | NodeKind::Pass | NodeKind::AnnAssign { .. } => {}
            // Class bodies and context managers run code the engine does
            // not model.
            _ => return Err(EvalAbort::Undecidable),
        }
        Ok(Flow::Normal)
    }

    fn exec_try(
        &mut self,
        tree: &mut Tree,
        body: &[NodeId],
        handlers: &[NodeId],
        orelse: &[NodeId],
        finalbody: &[NodeId],
    ) -> EvalResult<Flow> {
        let frame = self.scopes.depth();
        let catches = handlers.iter().map(|&h| (h, self.catch_of(tree, h))).collect();
        self.try_frames.push(TryFrame {
            frame,
            handlers: catches,
        });
        let body_flow = self.exec_block(tree, body);
        self.try_frames.pop();
        let mut flow = body_flow?;
        if let Some(handler) = self.interrupts.reaches(frame, handlers) {
            self.interrupts.take();
            if let NodeKind::ExceptHandler { name, body, .. } = tree.kind(handler).clone() {
                if let Some(name) = &name {
                    self.bind(name, Value::Unknown);
                }
                flow = self.exec_block(tree, &body)?;
                if let Some(name) = &name {
                    self.scopes.current().borrow_mut().remove(name);
                }
            }
        } else if flow == Flow::Normal && !self.interrupts.is_active() {
            flow = self.exec_block(tree, orelse)?;
        }
        if finalbody.is_empty() {
            return Ok(flow);
        }
        let pending = self.interrupts.take();
        let final_flow = self.exec_block(tree, finalbody)?;
        if final_flow != Flow::Normal || self.interrupts.is_active() {
            return Ok(final_flow);
        }
        match pending {
            Some(interrupt) => {
                self.interrupts.resume(interrupt);
                Ok(Flow::Interrupted)
            }
            None => Ok(flow),
        }
    }

    /// Resolve an `except` clause's classes before its `try` runs.
    fn catch_of(&self, tree: &Tree, handler: NodeId) -> Catch {
        let NodeKind::ExceptHandler { typ, .. } = tree.kind(handler) else {
            return Catch::Opaque;
        };
        let Some(typ) = *typ else {
            return Catch::All;
        };
        let classes = match tree.kind(typ) {
            NodeKind::Tuple { elts, .. } => elts.clone(),
            _ => vec![typ],
        };
        let mut types = Vec::new();
        for class in classes {
            let NodeKind::Name { id: name, .. } = tree.kind(class) else {
                return Catch::Opaque;
            };
            if self.volatile.contains(name) {
                return Catch::Opaque;
            }
            match self.scopes.lookup(name) {
                Lookup::Builtin(var) => {
                    var.mark_read();
                    // Builtin classes outside the modelled hierarchy catch
                    // nothing the engine raises.
                    if let Ok(exc) = name.parse::<ExcType>() {
                        types.push(exc);
                    }
                }
                _ => return Catch::Opaque,
            }
        }
        Catch::Types(types)
    }

    /// The class and message of `raise exc`, when `exc` names a builtin
    /// exception the engine models.
    pub(super) fn exception_of(&mut self, tree: &mut Tree, exc: NodeId) -> EvalResult<Option<(ExcType, String)>> {
        let Some((class, args)) = exception_call(tree, exc) else {
            self.eval(tree, exc)?;
            return Ok(None);
        };
        let builtin = match self.scopes.lookup(&class) {
            Lookup::Builtin(var) if !self.volatile.contains(&class) => {
                var.mark_read();
                true
            }
            _ => false,
        };
        let Some(exc_type) = builtin.then(|| class.parse::<ExcType>().ok()).flatten() else {
            self.eval(tree, exc)?;
            return Ok(None);
        };
        let mut objects = Vec::with_capacity(args.len());
        for arg in args {
            if let Value::Constant(obj) = self.eval(tree, arg)? {
                objects.push(obj);
            }
        }
        let message = match objects.as_slice() {
            [] => String::new(),
            [one] => one.py_str().unwrap_or_default(),
            many => Object::Tuple(many.to_vec()).repr(),
        };
        Ok(Some((exc_type, message)))
    }

    fn exec_delete(&mut self, tree: &mut Tree, target: NodeId) -> EvalResult<()> {
        match tree.kind(target).clone() {
            NodeKind::Name { id: name, .. } => {
                let removed = self.scopes.current().borrow_mut().remove(&name);
                match removed {
                    Some(var) => var.mark_read(),
                    None => return Err(EvalAbort::Undecidable),
                }
            }
            NodeKind::Tuple { elts, .. } | NodeKind::List { elts, .. } => {
                for elt in elts {
                    self.exec_delete(tree, elt)?;
                }
            }
            NodeKind::Attribute { value, .. } => {
                self.eval(tree, value)?;
                self.taint();
            }
            NodeKind::Subscript { value, slice, .. } => {
                self.eval(tree, value)?;
                self.eval(tree, slice)?;
                self.taint();
            }
            _ => {}
        }
        Ok(())
    }

    /// `target op= value`, shared by both modes.
    pub(super) fn aug_assign(
        &mut self,
        tree: &mut Tree,
        stmt: NodeId,
        target: NodeId,
        op: Operator,
        value: NodeId,
    ) -> EvalResult<Option<AugStore>> {
        match tree.kind(target).clone() {
            NodeKind::Name { id: name, .. } => {
                let old = self.load(&name)?;
                let (rhs, pure) = self.eval_pure(tree, value)?;
                if self.interrupts.is_active() {
                    return Ok(None);
                }
                let result = match (old.constant(), rhs.constant()) {
                    (Some(l), Some(r)) => {
                        let result = binary(op, l, r);
                        self.host(tree, stmt, result)?
                    }
                    _ => self.opaque(),
                };
                if self.interrupts.is_active() {
                    return Ok(None);
                }
                let known = matches!(old, Value::Constant(_)) && pure && matches!(result, Value::Constant(_));
                let var = self.bind(&name, result);
                Ok(Some((name, var, known)))
            }
            NodeKind::Attribute { value: base, .. } => {
                self.eval(tree, base)?;
                self.eval(tree, value)?;
                self.taint();
                Ok(None)
            }
            NodeKind::Subscript { value: base, slice, .. } => {
                self.eval(tree, base)?;
                self.eval(tree, slice)?;
                self.eval(tree, value)?;
                self.taint();
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Store `value` into an assignment target, unpacking as the runtime
    /// does.
    pub(super) fn bind_target(&mut self, tree: &mut Tree, target: NodeId, value: Value) -> EvalResult<()> {
        match tree.kind(target).clone() {
            NodeKind::Name { id: name, .. } => {
                self.bind(&name, value);
            }
            NodeKind::Tuple { elts, .. } | NodeKind::List { elts, .. } => self.unpack(tree, &elts, &value)?,
            NodeKind::Starred { value: inner, .. } => self.bind_target(tree, inner, value)?,
            NodeKind::Attribute { value: base, attr, .. } => {
                let base = self.eval(tree, base)?;
                self.taint();
                if let Err(pyl_object::ObjectError::Raised { exc, message }) = base.set_attr(&attr) {
                    self.throw(exc, message)?;
                }
            }
            NodeKind::Subscript { value: base, slice, .. } => {
                self.eval(tree, base)?;
                self.eval(tree, slice)?;
                self.taint();
            }
            _ => {}
        }
        Ok(())
    }

    fn unpack(&mut self, tree: &mut Tree, elts: &[NodeId], value: &Value) -> EvalResult<()> {
        let items = match value.constant().map(Object::iterate) {
            Some(Ok(items)) => items,
            Some(Err(pyl_object::ObjectError::Raised { exc, message })) => return self.throw(exc, message),
            other => {
                if other.is_none() {
                    // Iterating an unknown value may run user code.
                    self.taint();
                }
                for &elt in elts {
                    self.bind_target(tree, elt, Value::Unknown)?;
                }
                return Ok(());
            }
        };
        let star = elts
            .iter()
            .position(|&elt| matches!(tree.kind(elt), NodeKind::Starred { .. }));
        let Some(star) = star else {
            if items.len() != elts.len() {
                let message = if items.len() > elts.len() {
                    format!("too many values to unpack (expected {})", elts.len())
                } else {
                    format!("not enough values to unpack (expected {}, got {})", elts.len(), items.len())
                };
                return self.throw(ExcType::ValueError, message);
            }
            for (&elt, item) in elts.iter().zip(items) {
                self.bind_target(tree, elt, Value::Constant(item))?;
            }
            return Ok(());
        };
        if items.len() + 1 < elts.len() {
            let message = format!(
                "not enough values to unpack (expected at least {}, got {})",
                elts.len() - 1,
                items.len()
            );
            return self.throw(ExcType::ValueError, message);
        }
        let mut head = items;
        let tail = head.split_off(head.len() - (elts.len() - star - 1));
        let middle = head.split_off(star);
        for (&elt, item) in elts[..star].iter().zip(head) {
            self.bind_target(tree, elt, Value::Constant(item))?;
        }
        self.bind_target(tree, elts[star], Value::Constant(Object::List(middle)))?;
        for (&elt, item) in elts[star + 1..].iter().zip(tail) {
            self.bind_target(tree, elt, Value::Constant(item))?;
        }
        Ok(())
    }

    /// What a `for` loop of a simulated call iterates over.
    fn iteration(&mut self, tree: &mut Tree, iter: NodeId) -> EvalResult<Items> {
        if let Some(args) = self.range_call(tree, iter) {
            let mut bounds = Vec::with_capacity(args.len());
            for arg in args {
                match self.eval(tree, arg)? {
                    Value::Constant(Object::Int(n)) => bounds.push(n),
                    Value::Constant(Object::Bool(b)) => bounds.push(i64::from(b)),
                    Value::Constant(obj) => {
                        let message = format!("'{}' object cannot be interpreted as an integer", obj.type_name());
                        self.throw(ExcType::TypeError, message)?;
                        return Ok(Items::empty());
                    }
                    _ => return Err(EvalAbort::Undecidable),
                }
            }
            let (start, stop, step) = match bounds[..] {
                [stop] => (0, stop, 1),
                [start, stop] => (start, stop, 1),
                [start, stop, step] => (start, stop, step),
                _ => return Err(EvalAbort::Undecidable),
            };
            if step == 0 {
                self.throw(ExcType::ValueError, "range() arg 3 must not be zero")?;
                return Ok(Items::empty());
            }
            return Ok(Items::Range { next: start, stop, step });
        }
        match self.eval(tree, iter)? {
            Value::Constant(obj) => match obj.iterate() {
                Ok(items) => Ok(Items::Objects(items.into_iter())),
                Err(pyl_object::ObjectError::Raised { exc, message }) => {
                    self.throw(exc, message)?;
                    Ok(Items::empty())
                }
                Err(pyl_object::ObjectError::Undecidable) => Err(EvalAbort::Undecidable),
            },
            _ if self.interrupts.is_active() => Ok(Items::empty()),
            _ => Err(EvalAbort::Undecidable),
        }
    }

    /// Arguments of `range(...)` when the name still means the builtin.
    fn range_call(&self, tree: &Tree, iter: NodeId) -> Option<Vec<NodeId>> {
        let NodeKind::Call { func, args, keywords } = tree.kind(iter) else {
            return None;
        };
        let NodeKind::Name { id, .. } = tree.kind(*func) else {
            return None;
        };
        if id != "range" || !keywords.is_empty() || self.volatile.contains(id) {
            return None;
        }
        if args.iter().any(|&arg| matches!(tree.kind(arg), NodeKind::Starred { .. })) {
            return None;
        }
        match self.scopes.lookup(id) {
            Lookup::Builtin(var) => {
                var.mark_read();
                Some(args.clone())
            }
            _ => None,
        }
    }

    /// Build the value a `def` statement or `lambda` expression creates.
    pub(super) fn make_function(&mut self, tree: &mut Tree, node: NodeId) -> EvalResult<Value> {
        let (name, params, body, decorators, returns, is_async) = match tree.kind(node).clone() {
            NodeKind::FunctionDef {
                name,
                params,
                body,
                decorators,
                returns,
                is_async,
            } => (name, params, Body::Block(body), decorators, returns, is_async),
            NodeKind::Lambda { params, body } => ("<lambda>".to_owned(), params, Body::Expr(body), Vec::new(), None, false),
            _ => return Ok(Value::Unknown),
        };
        for &decorator in &decorators {
            self.eval(tree, decorator)?;
        }
        let mut callable = !is_async && !is_generator(tree, &body);
        let mut defaults = Vec::new();
        for param in params.iter() {
            if let Some(default) = param.default {
                let value = self.eval(tree, default)?.storable();
                callable &= !value.is_unknown();
                defaults.push((param.name.clone(), Variable::new(value)));
            }
        }
        for annotation in params.iter().filter_map(|p| p.annotation).chain(returns) {
            self.observe(tree, annotation);
        }
        if !decorators.is_empty() {
            return Ok(self.opaque());
        }
        let info = scope::analyze(tree, node);
        let locals: FxHashSet<String> = info.bound.iter().filter(|name| info.is_local(name)).cloned().collect();
        Ok(Value::Function(Rc::new(Function {
            name,
            kind: FunctionKind::Defined(Closure {
                node,
                params,
                body,
                defaults,
                env: self.scopes.current().clone(),
                locals,
                callable,
            }),
        })))
    }

    /// Replace a call to a module-level function whose whole body is
    /// `return expr` with a copy of `expr`.
    fn inline(&mut self, tree: &mut Tree, site: NodeId, callee: &Value, no_args: bool) {
        let Value::Function(function) = callee else {
            return;
        };
        let Some(closure) = function.closure() else {
            return;
        };
        if !no_args || !closure.callable || !closure.params.is_empty() || !closure.env.ptr_eq(self.scopes.global()) {
            return;
        }
        let expr = match &closure.body {
            Body::Expr(expr) => *expr,
            Body::Block(stmts) => match stmts.as_slice() {
                [only] => match tree.kind(*only) {
                    NodeKind::Return { value: Some(value) } => *value,
                    _ => return,
                },
                _ => return,
            },
        };
        if !self.inlinable(tree, expr) {
            return;
        }
        let copy = tree.deep_copy(expr);
        tree.graft(site, copy);
        debug!(function = %function.name, "inlined call");
        self.cx.done();
    }

    /// `true` if `expr` evaluates the same at module level: no bindings,
    /// no nested scopes and no calls other than to pure builtins.
    fn inlinable(&self, tree: &Tree, expr: NodeId) -> bool {
        tree.descendants(expr).into_iter().all(|id| match tree.kind(id) {
            NodeKind::NamedExpr { .. }
            | NodeKind::Yield { .. }
            | NodeKind::YieldFrom { .. }
            | NodeKind::Await { .. } => false,
            kind if kind.is_scope() => false,
            NodeKind::Call { func, .. } => match tree.kind(*func) {
                NodeKind::Name { id: name, .. } => {
                    is_pure_builtin(name)
                        && !self.volatile.contains(name)
                        && matches!(self.scopes.lookup(name), Lookup::Builtin(_))
                }
                _ => false,
            },
            _ => true,
        })
    }
}

/// Bind call arguments to parameters the way the runtime does, or explain
/// why the call raises `TypeError`.
fn bind_arguments(
    name: &str,
    closure: &Closure,
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
) -> Result<Namespace, String> {
    let params = &closure.params;
    let mut frame = Namespace::with_parent(closure.node, closure.env.clone(), closure.locals.clone());
    let positional: Vec<&str> = params
        .posonly
        .iter()
        .chain(&params.args)
        .map(|p| p.name.as_str())
        .collect();
    let mut bound = FxHashSet::default();
    let given = args.len();
    let mut args = args.into_iter();
    for &param in &positional {
        let Some(value) = args.next() else {
            break;
        };
        frame.bind(param, value.storable());
        bound.insert(param.to_owned());
    }
    let extra: Vec<Value> = args.collect();
    match &params.vararg {
        Some(vararg) => {
            let items: Option<Vec<Object>> = extra.iter().map(|v| v.constant().cloned()).collect();
            frame.bind(&vararg.name, items.map_or(Value::Unknown, |items| Value::Constant(Object::Tuple(items))));
        }
        None if !extra.is_empty() => {
            let required = positional.iter().filter(|p| closure.default_for(p).is_none()).count();
            let takes = if required == positional.len() {
                format!("{} positional argument{}", positional.len(), plural(positional.len()))
            } else {
                format!("from {required} to {} positional arguments", positional.len())
            };
            let verb = if given == 1 { "was" } else { "were" };
            return Err(format!("{name}() takes {takes} but {given} {verb} given"));
        }
        None => {}
    }
    for (key, value) in kwargs {
        let keyword_param = params.args.iter().chain(&params.kwonly).any(|p| p.name == key);
        if keyword_param {
            if !bound.insert(key.clone()) {
                return Err(format!("{name}() got multiple values for argument '{key}'"));
            }
            frame.bind(&key, value.storable());
        } else if params.kwarg.is_none() {
            if params.posonly.iter().any(|p| p.name == key) {
                return Err(format!(
                    "{name}() got some positional-only arguments passed as keyword arguments: '{key}'"
                ));
            }
            return Err(format!("{name}() got an unexpected keyword argument '{key}'"));
        }
    }
    if let Some(kwarg) = &params.kwarg {
        frame.bind(&kwarg.name, Value::Unknown);
    }
    let mut missing = Vec::new();
    for &param in &positional {
        if bound.contains(param) {
            continue;
        }
        match closure.default_for(param) {
            Some(default) => frame.insert(param, default.rebind()),
            None => missing.push(param),
        }
    }
    if !missing.is_empty() {
        return Err(format!(
            "{name}() missing {} required positional argument{}: {}",
            missing.len(),
            plural(missing.len()),
            quoted_list(&missing)
        ));
    }
    for param in &params.kwonly {
        if bound.contains(&param.name) {
            continue;
        }
        match closure.default_for(&param.name) {
            Some(default) => frame.insert(&param.name, default.rebind()),
            None => missing.push(&param.name),
        }
    }
    if !missing.is_empty() {
        return Err(format!(
            "{name}() missing {} required keyword-only argument{}: {}",
            missing.len(),
            plural(missing.len()),
            quoted_list(&missing)
        ));
    }
    Ok(frame)
}

/// `Class` or `Class(args)` with no keywords.
fn exception_call(tree: &Tree, exc: NodeId) -> Option<(String, Vec<NodeId>)> {
    match tree.kind(exc) {
        NodeKind::Name { id, .. } => Some((id.clone(), Vec::new())),
        NodeKind::Call { func, args, keywords } if keywords.is_empty() => match tree.kind(*func) {
            NodeKind::Name { id, .. } => Some((id.clone(), args.clone())),
            _ => None,
        },
        _ => None,
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// `'a'`, `'a' and 'b'`, `'a', 'b', and 'c'`.
fn quoted_list(names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|name| format!("'{name}'")).collect();
    match quoted.as_slice() {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

/// `true` if calling the function creates a generator or coroutine.
fn is_generator(tree: &Tree, body: &Body) -> bool {
    let mut stack = match body {
        Body::Block(stmts) => stmts.clone(),
        Body::Expr(expr) => vec![*expr],
    };
    while let Some(id) = stack.pop() {
        let kind = tree.kind(id);
        if matches!(
            kind,
            NodeKind::Yield { .. } | NodeKind::YieldFrom { .. } | NodeKind::Await { .. }
        ) {
            return true;
        }
        if !kind.is_scope() {
            stack.extend(kind.children());
        }
    }
    false
}

/// Values a simulated `for` loop binds in turn.
enum Items {
    Objects(std::vec::IntoIter<Object>),
    Range { next: i64, stop: i64, step: i64 },
}

impl Items {
    fn empty() -> Self {
        Items::Objects(Vec::new().into_iter())
    }
}

impl Iterator for Items {
    type Item = Object;

    fn next(&mut self) -> Option<Object> {
        match self {
            Items::Objects(items) => items.next(),
            Items::Range { next, stop, step } => {
                let more = if *step > 0 { *next < *stop } else { *next > *stop };
                if !more {
                    return None;
                }
                let current = *next;
                *next = next.checked_add(*step).unwrap_or(*stop);
                Some(Object::Int(current))
            }
        }
    }
}
