//! Expression evaluation, shared by module-level and call simulation.

use pyl_ir::{BoolOperator, CmpOperator, ExprContext, FStringPart, NodeId, NodeKind, Tree, UnaryOperator};
use pyl_object::{binary, compare_chain, unary, ExcType, Object, ObjectError, ObjectResult, MAX_SIZE};
use tracing::trace;

use super::Simulator;
use crate::error::EvalResult;
use crate::namespace::Lookup;
use crate::value::Value;

impl Simulator<'_, '_> {
    pub(super) fn eval(&mut self, tree: &mut Tree, id: NodeId) -> EvalResult<Value> {
        self.eval_pure(tree, id).map(|(value, _)| value)
    }

    /// Evaluate `id`, also reporting whether doing so is free of side
    /// effects. Pure constant results at module level are written back.
    pub(super) fn eval_pure(&mut self, tree: &mut Tree, id: NodeId) -> EvalResult<(Value, bool)> {
        pyl_stack::ensure_sufficient_stack(|| {
            let outer = std::mem::replace(&mut self.pure, true);
            let value = self.eval_kind(tree, id);
            let pure = self.pure;
            self.pure = outer && pure;
            let value = value?;
            // An expression that raised has no value of its own.
            let pure = pure && !self.interrupts.is_active();
            if pure && self.committing() {
                self.write_back(tree, id, &value);
            }
            Ok((value, pure))
        })
    }

    /// Evaluate a subexpression the program may skip at runtime. An
    /// exception it raises is not the program's.
    pub(super) fn eval_conditional(&mut self, tree: &mut Tree, id: NodeId) -> EvalResult<Value> {
        self.conditional += 1;
        let value = self.eval(tree, id);
        self.conditional -= 1;
        value
    }

    fn eval_kind(&mut self, tree: &mut Tree, id: NodeId) -> EvalResult<Value> {
        if self.interrupts.is_active() {
            return Ok(Value::Unknown);
        }
        match tree.kind(id).clone() {
            NodeKind::Constant(literal) => Ok(Object::from_literal(&literal).map_or(Value::Unknown, Value::Constant)),
            NodeKind::Name { id: name, .. } => self.load(&name),
            NodeKind::NamedExpr { target, value } => {
                let value = self.eval(tree, value)?;
                if let NodeKind::Name { id: name, .. } = tree.kind(target) {
                    let name = name.clone();
                    self.bind(&name, value.clone());
                }
                Ok(value)
            }
            NodeKind::BinOp { left, op, right } => {
                let left = self.eval(tree, left)?;
                let right = self.eval(tree, right)?;
                match (left.constant(), right.constant()) {
                    (Some(l), Some(r)) => {
                        let result = binary(op, l, r);
                        self.host(tree, id, result)
                    }
                    _ => Ok(self.opaque()),
                }
            }
            NodeKind::UnaryOp { op, operand } => {
                let operand = self.eval(tree, operand)?;
                match (&operand, op) {
                    (Value::Constant(obj), _) => {
                        let result = unary(op, obj);
                        self.host(tree, id, result)
                    }
                    (Value::Function(_), UnaryOperator::Not) => Ok(Value::Constant(Object::Bool(false))),
                    _ => Ok(self.opaque()),
                }
            }
            NodeKind::BoolOp { op, values } => self.eval_bool(tree, op, &values),
            NodeKind::Compare {
                left,
                ops,
                comparators,
            } => self.eval_compare(tree, id, left, &ops, &comparators),
            NodeKind::IfExp { test, body, orelse } => {
                let test = self.eval(tree, test)?;
                match test.truthiness() {
                    Some(true) => self.eval(tree, body),
                    Some(false) => self.eval(tree, orelse),
                    None => {
                        self.taint();
                        self.eval_conditional(tree, body)?;
                        self.eval_conditional(tree, orelse)?;
                        Ok(Value::Unknown)
                    }
                }
            }
            NodeKind::Call { func, args, keywords } => self.eval_call(tree, id, func, &args, &keywords),
            NodeKind::Lambda { .. } => self.make_function(tree, id),
            NodeKind::Tuple { elts, .. } => Ok(self
                .eval_items(tree, &elts)?
                .map_or(Value::Unknown, |items| Value::Constant(Object::Tuple(items)))),
            NodeKind::List { elts, .. } => Ok(self
                .eval_items(tree, &elts)?
                .map_or(Value::Unknown, |items| Value::Constant(Object::List(items)))),
            NodeKind::Set { elts } => match self.eval_items(tree, &elts)? {
                Some(items) => {
                    let result = Object::new_set(items);
                    self.host(tree, id, result)
                }
                None => Ok(Value::Unknown),
            },
            NodeKind::Dict { keys, values } => self.eval_dict(tree, id, &keys, &values),
            NodeKind::ListComp { generators, .. }
            | NodeKind::SetComp { generators, .. }
            | NodeKind::GeneratorExp { generators, .. }
            | NodeKind::DictComp { generators, .. } => {
                // Only the first iterable is evaluated in the enclosing scope.
                if let Some(first) = generators.first() {
                    self.eval(tree, first.iter)?;
                }
                for node in tree.descendants(id) {
                    if let NodeKind::NamedExpr { target, .. } = tree.kind(node) {
                        if let NodeKind::Name { id: name, .. } = tree.kind(*target) {
                            let name = name.clone();
                            self.forget(&name);
                        }
                    }
                }
                Ok(self.opaque())
            }
            NodeKind::FormattedString { parts } => {
                let mut fields = Vec::new();
                collect_fields(&parts, &mut fields);
                for field in fields {
                    if self.eval(tree, field)?.constant().is_none() {
                        self.taint();
                    }
                }
                Ok(Value::Unknown)
            }
            NodeKind::Attribute { value, .. } => {
                self.eval(tree, value)?;
                Ok(self.opaque())
            }
            NodeKind::Subscript { value, slice, .. } => {
                self.eval(tree, value)?;
                self.eval(tree, slice)?;
                Ok(self.opaque())
            }
            NodeKind::Slice { lower, upper, step } => {
                for part in [lower, upper, step].into_iter().flatten() {
                    self.eval(tree, part)?;
                }
                Ok(Value::Unknown)
            }
            NodeKind::Starred { value, .. }
            | NodeKind::Await { value }
            | NodeKind::YieldFrom { value }
            | NodeKind::Yield { value: Some(value) } => {
                self.eval(tree, value)?;
                Ok(self.opaque())
            }
            _ => Ok(self.opaque()),
        }
    }

    /// Load `name` the way the runtime resolves it.
    pub(super) fn load(&mut self, name: &str) -> EvalResult<Value> {
        let found = self.scopes.lookup(name);
        if self.volatile.contains(name) {
            if let Lookup::Found(var) | Lookup::Builtin(var) = &found {
                var.mark_read();
            }
            return Ok(self.opaque());
        }
        match found {
            Lookup::Found(var) => {
                if var.is_maybe_unbound() {
                    self.taint();
                }
                Ok(var.get())
            }
            Lookup::Builtin(var) => Ok(var.get()),
            Lookup::Unbound => {
                self.throw(
                    ExcType::UnboundLocalError,
                    format!("cannot access local variable '{name}' where it is not associated with a value"),
                )?;
                Ok(Value::Unknown)
            }
            Lookup::Missing if self.star_import => Ok(self.opaque()),
            Lookup::Missing => {
                self.throw(ExcType::NameError, format!("name '{name}' is not defined"))?;
                Ok(Value::Unknown)
            }
        }
    }

    /// Count a read of every name `id` loads, without evaluating it.
    pub(super) fn observe(&mut self, tree: &Tree, id: NodeId) {
        for node in tree.descendants(id) {
            if let NodeKind::Name {
                id: name,
                ctx: ExprContext::Load,
            } = tree.kind(node)
            {
                if let Lookup::Found(var) | Lookup::Builtin(var) = self.scopes.lookup(name) {
                    var.mark_read();
                }
            }
        }
    }

    /// Turn the outcome of a host computation into a value. Module-level
    /// errors are reported; inside a call they are raised.
    pub(super) fn host(&mut self, tree: &Tree, id: NodeId, result: ObjectResult<Object>) -> EvalResult<Value> {
        match result {
            Ok(obj) => Ok(Value::Constant(obj)),
            Err(ObjectError::Undecidable) => Ok(self.opaque()),
            Err(err @ ObjectError::Raised { .. }) if self.scopes.depth() == 0 => {
                self.cx.flag(tree, err.to_string(), &[id]);
                Ok(self.opaque())
            }
            Err(ObjectError::Raised { exc, message }) => {
                self.throw(exc, message)?;
                Ok(Value::Unknown)
            }
        }
    }

    fn eval_bool(&mut self, tree: &mut Tree, op: BoolOperator, values: &[NodeId]) -> EvalResult<Value> {
        let mut decided = true;
        for (i, &operand) in values.iter().enumerate() {
            if !decided {
                self.eval_conditional(tree, operand)?;
                continue;
            }
            let value = self.eval(tree, operand)?;
            if self.interrupts.is_active() || i + 1 == values.len() {
                return Ok(value);
            }
            match value.truthiness() {
                Some(truthy) if truthy == (op == BoolOperator::Or) => return Ok(value),
                Some(_) => {}
                None => {
                    self.taint();
                    decided = false;
                }
            }
        }
        Ok(Value::Unknown)
    }

    fn eval_compare(
        &mut self,
        tree: &mut Tree,
        id: NodeId,
        left: NodeId,
        ops: &[CmpOperator],
        comparators: &[NodeId],
    ) -> EvalResult<Value> {
        let left = self.eval(tree, left)?;
        let mut rest = Vec::with_capacity(comparators.len());
        let mut known = left.constant().is_some();
        for (i, (&op, &operand)) in ops.iter().zip(comparators).enumerate() {
            let value = if i == 0 {
                self.eval(tree, operand)?
            } else {
                self.eval_conditional(tree, operand)?
            };
            match value {
                Value::Constant(obj) => rest.push((op, obj)),
                _ => known = false,
            }
        }
        match left {
            Value::Constant(left) if known => {
                let result = compare_chain(&left, &rest).map(Object::Bool);
                self.host(tree, id, result)
            }
            _ => Ok(self.opaque()),
        }
    }

    /// Elements of a display, with `*iterable` spread; `None` when some
    /// element is unknown.
    fn eval_items(&mut self, tree: &mut Tree, elts: &[NodeId]) -> EvalResult<Option<Vec<Object>>> {
        let mut items = Vec::with_capacity(elts.len());
        let mut known = true;
        for &elt in elts {
            let (node, spread) = match tree.kind(elt) {
                NodeKind::Starred { value, .. } => (*value, true),
                _ => (elt, false),
            };
            match (self.eval(tree, node)?, spread) {
                (Value::Constant(obj), false) => items.push(obj),
                (Value::Constant(obj), true) => match obj.iterate() {
                    Ok(elements) => items.extend(elements),
                    Err(_) => known = false,
                },
                (_, true) => {
                    self.taint();
                    known = false;
                }
                (_, false) => known = false,
            }
        }
        Ok((known && items.len() <= MAX_SIZE).then_some(items))
    }

    fn eval_dict(&mut self, tree: &mut Tree, id: NodeId, keys: &[Option<NodeId>], values: &[NodeId]) -> EvalResult<Value> {
        let mut pairs = Vec::with_capacity(values.len());
        let mut known = true;
        for (key, &value) in keys.iter().zip(values) {
            let Some(key) = *key else {
                self.eval(tree, value)?;
                self.taint();
                known = false;
                continue;
            };
            let key = self.eval(tree, key)?;
            let value = self.eval(tree, value)?;
            match (key, value) {
                (Value::Constant(k), Value::Constant(v)) => pairs.push((k, v)),
                (Value::Constant(_), _) => known = false,
                // Hashing an unknown key may run user code.
                _ => {
                    self.taint();
                    known = false;
                }
            }
        }
        if !known {
            return Ok(Value::Unknown);
        }
        let result = Object::new_dict(pairs);
        self.host(tree, id, result)
    }

    /// Replace a module-level expression with the literal it is known to
    /// evaluate to.
    fn write_back(&mut self, tree: &mut Tree, id: NodeId, value: &Value) {
        let foldable = matches!(
            tree.kind(id),
            NodeKind::Name { .. }
                | NodeKind::BinOp { .. }
                | NodeKind::UnaryOp { .. }
                | NodeKind::BoolOp { .. }
                | NodeKind::Compare { .. }
                | NodeKind::IfExp { .. }
                | NodeKind::Call { .. }
                | NodeKind::Tuple { .. }
        );
        if !foldable || Object::from_expr(tree, id).is_some() {
            return;
        }
        let span = tree.span(id);
        let Some(literal) = value.to_literal_expr(tree, span, self.limits.literal_limit) else {
            return;
        };
        tree.graft(id, literal);
        trace!(?id, "written back");
        self.cx.done();
    }
}

fn collect_fields(parts: &[FStringPart], out: &mut Vec<NodeId>) {
    for part in parts {
        if let FStringPart::Field { value, spec, .. } = part {
            out.push(*value);
            collect_fields(spec, out);
        }
    }
}
