//! The partial-evaluation pass.
//!
//! [`PredictEngine`] simulates a unit's module-level code in program order,
//! binding names to what is known about them, and writes back what it
//! learns:
//!
//! - a pure expression whose value is a known immutable constant becomes
//!   that literal (name loads included)
//! - a call to a zero-argument module-level function whose body is a
//!   single `return expr` is replaced with `expr`
//! - a module-level store, `def` or augmented assignment no later code
//!   reads is removed
//!
//! Calls to functions of the unit are simulated with their own frames
//! when their control flow can be decided; anything else makes the call's
//! value unknown. Rewrites happen only at module level, where each
//! statement runs at most once.
//!
//! A unit that reaches a namespace through `globals()`, `locals()`,
//! `eval` and the like is left untouched.

mod call;
mod commit;
mod expr;

use pyl_ir::{scope, NodeId, NodeKind, Tree};
use pyl_object::ExcType;
use pyl_pass::{util, InitContext, OptLevel, Pass, PassConfig, PassContext};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::builtins::{builtins_namespace, module_namespace};
use crate::error::{EvalAbort, EvalResult};
use crate::interrupt::{HandlerTarget, Interrupt, InterruptManager};
use crate::namespace::{PostTask, ScopeStack};
use crate::value::Value;
use crate::variable::Variable;

/// Reported once at the outermost call site when simulated calls nest
/// past the configured depth.
pub const OVERFLOW_MESSAGE: &str = "Eval overflow! Something may have gone wrong.";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Limits {
    max_depth: usize,
    step_budget: usize,
    literal_limit: usize,
}

impl Limits {
    fn from_config(config: &PassConfig) -> Self {
        Limits {
            max_depth: config.max_predict_depth,
            step_budget: config.eval_step_budget,
            literal_limit: config.inline_literal_limit,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits::from_config(&PassConfig::default())
    }
}

/// Partial evaluation of module-level code.
#[derive(Debug, Default)]
pub struct PredictEngine {
    limits: Limits,
}

impl Pass for PredictEngine {
    fn name(&self) -> &'static str {
        "PredictEngine"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O3
    }

    fn init(&mut self, cx: &InitContext<'_>) {
        self.limits = Limits::from_config(cx.config);
    }

    fn transform(&mut self, cx: &mut PassContext<'_>, tree: &mut Tree) {
        strip_placeholders(cx, tree);
        let info = scope::analyze(tree, tree.root());
        if info.dynamic {
            debug!(unit = %cx.unit().display_path(), "namespace used dynamically, not simulated");
            return;
        }
        let mut protected = scope::global_declarations(tree, tree.root());
        let mut volatile = protected.clone();
        volatile.extend(nonlocal_declarations(tree));
        protected.extend(util::exported_names(tree));
        protected.extend(info.nested);
        let simulator = Simulator {
            cx,
            limits: self.limits,
            scopes: ScopeStack::new(module_namespace(tree.root()), builtins_namespace(tree.root())),
            interrupts: InterruptManager::new(),
            try_frames: Vec::new(),
            protected,
            volatile,
            star_import: info.star_import,
            pure: true,
            steps: 0,
            repeated: 0,
            uncertain: 0,
            conditional: 0,
            frozen: 0,
            abandoned: false,
        };
        simulator.run(tree);
    }
}

/// How a block of statements ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Flow {
    Normal,
    Break,
    Continue,
    /// A return or exception is in flight, or the path cannot go on.
    Interrupted,
}

/// What an `except` clause catches, decided before its `try` body runs.
#[derive(Debug)]
enum Catch {
    All,
    Types(Vec<ExcType>),
    /// A class the engine cannot resolve.
    Opaque,
}

/// A `try` statement being executed by a simulated call.
#[derive(Debug)]
struct TryFrame {
    frame: usize,
    handlers: Vec<(NodeId, Catch)>,
}

/// Per-run state of the engine over one unit.
struct Simulator<'a, 'cx> {
    cx: &'a mut PassContext<'cx>,
    limits: Limits,
    scopes: ScopeStack,
    interrupts: InterruptManager,
    /// `try` statements of simulated calls, innermost last.
    try_frames: Vec<TryFrame>,
    /// Module names whose stores are never removed.
    protected: FxHashSet<String>,
    /// Names some function declares `global` or `nonlocal`; any call may
    /// rebind them.
    volatile: FxHashSet<String>,
    star_import: bool,
    /// No side effect observed since the innermost evaluation began.
    pure: bool,
    /// Statements executed by the current outermost call.
    steps: usize,
    /// Module-level loop, `try` and `with` bodies being simulated.
    repeated: usize,
    /// Module-level paths that may not be taken at runtime.
    uncertain: usize,
    /// Subexpressions that may not be evaluated at runtime.
    conditional: usize,
    /// Evaluations whose results must not be written back.
    frozen: usize,
    abandoned: bool,
}

impl Simulator<'_, '_> {
    fn run(mut self, tree: &mut Tree) {
        let body = tree.body().to_vec();
        self.commit_block(tree, &body);
        let tasks = self.scopes.global().borrow_mut().finalize();
        for task in tasks {
            self.finish(tree, task);
        }
    }

    /// `true` while rewrites of the evaluated code are allowed.
    fn committing(&self) -> bool {
        self.scopes.depth() == 0 && self.frozen == 0
    }

    fn taint(&mut self) {
        self.pure = false;
    }

    /// An unknown value produced by an operation with possible side effects.
    fn opaque(&mut self) -> Value {
        self.taint();
        Value::Unknown
    }

    fn step(&mut self) -> EvalResult<()> {
        self.steps += 1;
        if self.steps > self.limits.step_budget {
            return Err(EvalAbort::StepBudget);
        }
        Ok(())
    }

    /// Raise `exc` in the code being simulated.
    ///
    /// The exception is routed to its handler right away; a handler the
    /// engine cannot match makes the whole call undecidable.
    fn throw(&mut self, exc: ExcType, message: impl Into<String>) -> EvalResult<()> {
        if self.interrupts.is_active() {
            return Ok(());
        }
        if self.conditional > 0 {
            self.taint();
            return Ok(());
        }
        let target = self.route(exc)?;
        let message = message.into();
        trace!(%exc, %message, ?target, "raise");
        self.interrupts.throw(exc, message, target);
        Ok(())
    }

    fn route(&self, exc: ExcType) -> EvalResult<Option<HandlerTarget>> {
        for frame in self.try_frames.iter().rev() {
            for (handler, catch) in &frame.handlers {
                let target = HandlerTarget {
                    frame: frame.frame,
                    handler: *handler,
                };
                match catch {
                    Catch::All => return Ok(Some(target)),
                    Catch::Types(types) if types.iter().any(|&t| exc.is_subclass_of(t)) => {
                        return Ok(Some(target))
                    }
                    Catch::Types(_) => {}
                    Catch::Opaque => return Err(EvalAbort::Undecidable),
                }
            }
        }
        Ok(None)
    }

    /// Bind `name` in the current namespace to a fresh slot.
    fn bind(&mut self, name: &str, value: Value) -> Variable {
        if self.scopes.depth() > 0 && self.volatile.contains(name) {
            self.taint();
        }
        self.scopes.current().borrow_mut().bind(name, value.storable())
    }

    /// Rebind `name` to an unknown value that may stand for its current
    /// binding.
    fn forget(&mut self, name: &str) -> Variable {
        let scope = self.scopes.current().clone();
        let mut ns = scope.borrow_mut();
        let old = ns.get(name).map(Variable::alias);
        let maybe_unbound = old.as_ref().map_or(true, Variable::is_maybe_unbound);
        let var = Variable::join(Value::Unknown, old.into_iter().collect(), maybe_unbound);
        ns.insert(name, var.alias());
        var
    }

    /// Remove a dead store registered by [`Simulator::defer`].
    fn finish(&mut self, tree: &mut Tree, task: PostTask) {
        if self.abandoned || task.variable.is_read() {
            return;
        }
        if let (NodeKind::Assign { targets, .. }, Some(target)) = (tree.kind_mut(task.statement), task.target) {
            if targets.len() > 1 {
                targets.retain(|&t| t != target);
                trace!(statement = ?task.statement, "dropped dead target");
                self.cx.done();
                return;
            }
        }
        let replacement = match tree.kind(task.statement) {
            NodeKind::Assign { value, .. }
            | NodeKind::AugAssign { value, .. }
            | NodeKind::AnnAssign {
                value: Some(value), ..
            } => {
                if task.pure {
                    NodeKind::Pass
                } else {
                    NodeKind::Expr { value: *value }
                }
            }
            NodeKind::FunctionDef { .. } => NodeKind::Pass,
            _ => return,
        };
        tree.replace(task.statement, replacement);
        debug!(statement = ?task.statement, "removed dead store");
        self.cx.done();
    }
}

/// Drop `pass` and bare non-string constants from every block, keeping
/// one statement where the block may not be empty.
fn strip_placeholders(cx: &mut PassContext<'_>, tree: &mut Tree) {
    for id in tree.descendants(tree.root()) {
        if tree.kind(id).blocks().is_empty() {
            continue;
        }
        let mut kind = tree.replace(id, NodeKind::Pass);
        let keep_one = !matches!(kind, NodeKind::Module { .. });
        let mut removed = 0;
        for block in kind.statement_blocks_mut() {
            removed += strip_block(tree, block, keep_one);
        }
        tree.replace(id, kind);
        for _ in 0..removed {
            cx.done();
        }
    }
}

fn strip_block(tree: &Tree, block: &mut Vec<NodeId>, keep_one: bool) -> usize {
    let before = block.len();
    let mut kept: Vec<NodeId> = block
        .iter()
        .copied()
        .filter(|&stmt| !util::is_noop_statement(tree, stmt))
        .collect();
    if kept.is_empty() && keep_one {
        match block.first() {
            Some(&first) => kept.push(first),
            None => return 0,
        }
    }
    let removed = before - kept.len();
    *block = kept;
    removed
}

fn nonlocal_declarations(tree: &Tree) -> FxHashSet<String> {
    let mut out = FxHashSet::default();
    for id in tree.descendants(tree.root()) {
        if let NodeKind::Nonlocal { names } = tree.kind(id) {
            out.extend(names.iter().cloned());
        }
    }
    out
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Describe an exception the way the runtime prints it.
fn describe(interrupt: &Interrupt) -> Option<String> {
    match interrupt {
        Interrupt::Exception { exc, message, .. } => Some(format!("{exc}: {message}")),
        Interrupt::Return(_) => None,
    }
}

#[cfg(test)]
mod tests;
