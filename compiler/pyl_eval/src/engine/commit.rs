//! Module-level simulation.
//!
//! Every top-level statement runs at most once, so what is learned about
//! it can be written back into the tree. Control flow the engine cannot
//! decide is followed along every path: an undecided `if` runs both
//! branches from the same bindings and merges them, and loop, `try` and
//! `with` bodies run once with every name they assign made unknown.

use indexmap::IndexSet;
use pyl_ir::{ExprContext, NodeId, NodeKind, Operator, Tree};
use pyl_object::ExcType;
use rustc_hash::FxBuildHasher;
use tracing::debug;

use super::{describe, is_dunder, Flow, Simulator};
use crate::namespace::{Bindings, Lookup, PostTask};
use crate::value::Value;
use crate::variable::Variable;

/// Slots a region replaced on entry, by name.
type RegionEntry = Vec<(String, Variable)>;

impl Simulator<'_, '_> {
    pub(super) fn commit_block(&mut self, tree: &mut Tree, stmts: &[NodeId]) -> Flow {
        for &stmt in stmts {
            if self.abandoned || self.interrupts.is_active() {
                return Flow::Interrupted;
            }
            let flow = self.commit_statement(tree, stmt);
            if self.interrupts.is_active() {
                if self.uncertain == 0 {
                    self.abandon(tree, stmt);
                }
                return Flow::Interrupted;
            }
            if flow != Flow::Normal {
                return flow;
            }
        }
        Flow::Normal
    }

    fn commit_statement(&mut self, tree: &mut Tree, stmt: NodeId) -> Flow {
        match tree.kind(stmt).clone() {
            NodeKind::Expr { value } => {
                self.commit_expr(tree, value);
            }
            NodeKind::Assign { targets, value } => {
                let (value, pure) = self.commit_value(tree, value);
                let multi = targets.len() > 1;
                for target in targets {
                    self.commit_store(tree, stmt, target, &value, pure, multi);
                }
            }
            NodeKind::AnnAssign {
                target,
                annotation,
                value,
                ..
            } => {
                self.observe(tree, annotation);
                if let Some(value) = value {
                    let (value, pure) = self.commit_value(tree, value);
                    self.commit_store(tree, stmt, target, &value, pure, false);
                }
            }
            NodeKind::AugAssign { target, op, value } => self.commit_aug_assign(tree, stmt, target, op, value),
            NodeKind::If { test, body, orelse } => return self.commit_if(tree, test, &body, &orelse),
            NodeKind::While { test, body, orelse } => return self.commit_while(tree, stmt, test, &body, &orelse),
            NodeKind::For {
                iter, body, orelse, ..
            } => {
                self.commit_expr(tree, iter);
                if self.interrupts.is_active() {
                    return Flow::Normal;
                }
                let entry = self.enter_region(tree, stmt);
                self.commit_block(tree, &body);
                self.commit_block(tree, &orelse);
                self.exit_region(entry);
            }
            NodeKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                let entry = self.enter_region(tree, stmt);
                self.commit_block(tree, &body);
                self.interrupts.take();
                for handler in handlers {
                    if let NodeKind::ExceptHandler { typ, name, body } = tree.kind(handler).clone() {
                        if let Some(typ) = typ {
                            self.commit_expr(tree, typ);
                        }
                        if let Some(name) = name {
                            self.forget(&name);
                        }
                        self.commit_block(tree, &body);
                        self.interrupts.take();
                    }
                }
                self.commit_block(tree, &orelse);
                self.interrupts.take();
                self.commit_block(tree, &finalbody);
                self.exit_region(entry);
            }
            NodeKind::With { items, body, .. } => {
                for item in &items {
                    self.commit_expr(tree, item.context);
                    if let Some(vars) = item.vars {
                        self.observe(tree, vars);
                    }
                }
                if self.interrupts.is_active() {
                    return Flow::Normal;
                }
                let entry = self.enter_region(tree, stmt);
                self.commit_block(tree, &body);
                self.exit_region(entry);
            }
            NodeKind::FunctionDef { name, decorators, .. } => {
                let value = self.make_function(tree, stmt).unwrap_or_default();
                let var = self.bind(&name, value);
                if decorators.is_empty() {
                    self.defer(stmt, None, &name, var, true);
                }
            }
            NodeKind::ClassDef {
                name,
                bases,
                keywords,
                decorators,
                ..
            } => {
                for expr in decorators.into_iter().chain(bases).chain(keywords.iter().map(|kw| kw.value)) {
                    self.commit_expr(tree, expr);
                }
                self.bind(&name, Value::Unknown);
            }
            NodeKind::Delete { targets } => {
                for target in targets {
                    self.commit_delete(tree, target);
                }
            }
            NodeKind::Raise { exc, cause } => return self.commit_raise(tree, exc, cause),
            NodeKind::Assert { test, msg } => {
                let test = self.commit_expr(tree, test);
                match test.truthiness() {
                    Some(true) => {}
                    Some(false) => {
                        let message = msg
                            .map(|msg| self.commit_expr(tree, msg))
                            .and_then(|value| value.constant().and_then(|obj| obj.py_str().ok()))
                            .unwrap_or_default();
                        self.commit_throw(ExcType::AssertionError, message);
                    }
                    None => {
                        if let Some(msg) = msg {
                            self.commit_conditional(tree, msg);
                        }
                    }
                }
            }
            NodeKind::Import { names } | NodeKind::ImportFrom { names, .. } => {
                for alias in names.iter().filter(|alias| alias.name != "*") {
                    self.bind(alias.bound_name(), Value::Unknown);
                }
            }
            NodeKind::Break => return Flow::Break,
            NodeKind::Continue => return Flow::Continue,
            _ => {}
        }
        Flow::Normal
    }

    pub(super) fn commit_expr(&mut self, tree: &mut Tree, id: NodeId) -> Value {
        self.commit_value(tree, id).0
    }

    fn commit_value(&mut self, tree: &mut Tree, id: NodeId) -> (Value, bool) {
        match self.eval_pure(tree, id) {
            Ok(out) => out,
            Err(abort) => {
                debug!(%abort, "module-level evaluation gave up");
                (Value::Unknown, false)
            }
        }
    }

    fn commit_conditional(&mut self, tree: &mut Tree, id: NodeId) {
        if let Err(abort) = self.eval_conditional(tree, id) {
            debug!(%abort, "module-level evaluation gave up");
        }
    }

    fn commit_store(&mut self, tree: &mut Tree, stmt: NodeId, target: NodeId, value: &Value, pure: bool, multi: bool) {
        if let NodeKind::Name { id: name, .. } = tree.kind(target) {
            let name = name.clone();
            let var = self.bind(&name, value.clone());
            self.defer(stmt, multi.then_some(target), &name, var, pure);
        } else if let Err(abort) = self.bind_target(tree, target, value.clone()) {
            debug!(%abort, "module-level store gave up");
        }
    }

    fn commit_aug_assign(&mut self, tree: &mut Tree, stmt: NodeId, target: NodeId, op: Operator, value: NodeId) {
        match self.aug_assign(tree, stmt, target, op, value) {
            Ok(Some((name, var, known))) => {
                if known {
                    self.defer(stmt, None, &name, var, true);
                }
            }
            Ok(None) => {}
            Err(abort) => debug!(%abort, "module-level store gave up"),
        }
    }

    /// Register the removal of `stmt` should `var` never be read.
    fn defer(&mut self, stmt: NodeId, target: Option<NodeId>, name: &str, var: Variable, pure: bool) {
        if self.repeated > 0 || self.protected.contains(name) || is_dunder(name) {
            return;
        }
        self.scopes.global().borrow_mut().on_exit(PostTask {
            variable: var,
            statement: stmt,
            target,
            pure,
        });
    }

    fn commit_if(&mut self, tree: &mut Tree, test: NodeId, body: &[NodeId], orelse: &[NodeId]) -> Flow {
        let test = self.commit_expr(tree, test);
        if self.interrupts.is_active() {
            return Flow::Normal;
        }
        match test.truthiness() {
            Some(true) => self.commit_block(tree, body),
            Some(false) => self.commit_block(tree, orelse),
            None => {
                let scope = self.scopes.current().clone();
                let entry = scope.borrow().snapshot();
                self.uncertain += 1;
                self.commit_block(tree, body);
                self.interrupts.take();
                let after_body = scope.borrow_mut().restore(entry);
                self.commit_block(tree, orelse);
                self.interrupts.take();
                self.uncertain -= 1;
                let after_orelse = scope.borrow().snapshot();
                scope.borrow_mut().restore(merge(after_body, after_orelse));
                Flow::Normal
            }
        }
    }

    fn commit_while(&mut self, tree: &mut Tree, stmt: NodeId, test: NodeId, body: &[NodeId], orelse: &[NodeId]) -> Flow {
        // The first test sees the entry bindings; later ones may not.
        self.frozen += 1;
        let first = self.commit_expr(tree, test);
        self.frozen -= 1;
        if self.interrupts.is_active() {
            return Flow::Normal;
        }
        if first.truthiness() == Some(false) {
            self.commit_expr(tree, test);
            return self.commit_block(tree, orelse);
        }
        let entry = self.enter_region(tree, stmt);
        self.commit_expr(tree, test);
        self.commit_block(tree, body);
        self.commit_block(tree, orelse);
        self.exit_region(entry);
        Flow::Normal
    }

    fn commit_delete(&mut self, tree: &mut Tree, target: NodeId) {
        match tree.kind(target).clone() {
            NodeKind::Name { id: name, .. } => match self.scopes.lookup(&name) {
                Lookup::Found(var) => {
                    var.mark_read();
                    self.scopes.current().borrow_mut().remove(&name);
                }
                _ if self.star_import || self.volatile.contains(&name) => {}
                _ => self.commit_throw(ExcType::NameError, format!("name '{name}' is not defined")),
            },
            NodeKind::Tuple { elts, .. } | NodeKind::List { elts, .. } => {
                for elt in elts {
                    self.commit_delete(tree, elt);
                }
            }
            NodeKind::Attribute { value, .. } => {
                self.commit_expr(tree, value);
            }
            NodeKind::Subscript { value, slice, .. } => {
                self.commit_expr(tree, value);
                self.commit_expr(tree, slice);
            }
            _ => {}
        }
    }

    fn commit_raise(&mut self, tree: &mut Tree, exc: Option<NodeId>, cause: Option<NodeId>) -> Flow {
        let raised = match exc {
            Some(exc) => self.exception_of(tree, exc).unwrap_or(None),
            None => None,
        };
        if let Some(cause) = cause {
            self.commit_expr(tree, cause);
        }
        if self.interrupts.is_active() {
            return Flow::Normal;
        }
        match raised {
            Some((exc, message)) => {
                self.commit_throw(exc, message);
                Flow::Normal
            }
            None => {
                if self.uncertain == 0 {
                    debug!("module raises an exception the engine cannot name, simulation abandoned");
                    self.abandoned = true;
                }
                Flow::Interrupted
            }
        }
    }

    /// Module-level code has no simulated handlers to route to.
    fn commit_throw(&mut self, exc: ExcType, message: String) {
        if !self.interrupts.is_active() {
            self.interrupts.throw(exc, message, None);
        }
    }

    /// A module-level exception nothing can catch: the rest of the unit
    /// never runs, so nothing more is learned or removed.
    fn abandon(&mut self, tree: &Tree, stmt: NodeId) {
        if let Some(message) = self.interrupts.take().as_ref().and_then(describe) {
            self.cx.flag(tree, format!("(Simulation) {message}"), &[stmt]);
        }
        debug!(?stmt, "module always raises here, simulation abandoned");
        self.abandoned = true;
    }

    /// Make every name `stmt` assigns unknown before simulating its body.
    fn enter_region(&mut self, tree: &Tree, stmt: NodeId) -> RegionEntry {
        self.repeated += 1;
        self.uncertain += 1;
        assigned_names(tree, stmt)
            .into_iter()
            .map(|name| {
                let var = self.forget(&name);
                (name, var)
            })
            .collect()
    }

    /// Merge the bindings left by a region with the ones it started from.
    fn exit_region(&mut self, entry: RegionEntry) {
        self.interrupts.take();
        self.repeated -= 1;
        self.uncertain -= 1;
        let scope = self.scopes.current().clone();
        let mut ns = scope.borrow_mut();
        for (name, start) in entry {
            let mut maybe_unbound = start.is_maybe_unbound();
            let mut sources = vec![start.alias()];
            match ns.get(&name) {
                Some(current) if !current.ptr_eq(&start) => {
                    maybe_unbound |= current.is_maybe_unbound();
                    sources.push(current.alias());
                }
                Some(_) => {}
                None => maybe_unbound = true,
            }
            ns.insert(&name, Variable::join(Value::Unknown, sources, maybe_unbound));
        }
    }
}

/// Bindings after an `if` whose branches left `left` and `right`.
fn merge(left: Bindings, mut right: Bindings) -> Bindings {
    let mut out = Bindings::default();
    for (name, a) in left {
        let var = match right.shift_remove(&name) {
            Some(b) if a.ptr_eq(&b) => a,
            Some(b) => {
                let value = match (a.peek(), b.peek()) {
                    (Value::Constant(x), Value::Constant(y)) if x == y => Value::Constant(x.clone()),
                    _ => Value::Unknown,
                };
                let maybe_unbound = a.is_maybe_unbound() || b.is_maybe_unbound();
                Variable::join(value, vec![a, b], maybe_unbound)
            }
            None => Variable::join(Value::Unknown, vec![a], true),
        };
        out.insert(name, var);
    }
    for (name, b) in right {
        out.insert(name, Variable::join(Value::Unknown, vec![b], true));
    }
    out
}

/// Names `stmt` binds in the scope it runs in.
fn assigned_names(tree: &Tree, stmt: NodeId) -> IndexSet<String, FxBuildHasher> {
    let mut out = IndexSet::default();
    let mut stack = vec![stmt];
    while let Some(id) = stack.pop() {
        let kind = tree.kind(id);
        match kind {
            NodeKind::Name { id: name, ctx } if *ctx != ExprContext::Load => {
                out.insert(name.clone());
            }
            NodeKind::FunctionDef { name, .. }
            | NodeKind::ClassDef { name, .. }
            | NodeKind::ExceptHandler {
                name: Some(name), ..
            } => {
                out.insert(name.clone());
            }
            NodeKind::Import { names } | NodeKind::ImportFrom { names, .. } => {
                out.extend(
                    names
                        .iter()
                        .filter(|alias| alias.name != "*")
                        .map(|alias| alias.bound_name().to_owned()),
                );
            }
            _ => {}
        }
        if !matches!(
            kind,
            NodeKind::FunctionDef { .. } | NodeKind::ClassDef { .. } | NodeKind::Lambda { .. }
        ) {
            stack.extend(kind.children().into_iter().rev());
        }
    }
    out
}
