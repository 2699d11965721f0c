//! Partial evaluation for the pylang optimizer.
//!
//! [`PredictEngine`] runs a unit's module-level code symbolically. Names are
//! bound to [`Value`]s held in [`Variable`] slots, which remember whether
//! anything read them; the slots live in [`Namespace`]s chained the way
//! the runtime chains scopes. Calls to the unit's own functions are
//! simulated, with returns and exceptions carried by the
//! [`InterruptManager`].
//!
//! What the simulation learns is written back as literals, inlined calls
//! and removed dead stores.

mod builtins;
mod engine;
mod error;
mod interrupt;
mod namespace;
mod value;
mod variable;

#[cfg(test)]
mod test_util;

pub use builtins::{builtins_namespace, module_namespace, BUILTIN_NAMES, MODULE_NAMES};
pub use engine::{PredictEngine, OVERFLOW_MESSAGE};
pub use error::{EvalAbort, EvalResult};
pub use interrupt::{HandlerTarget, Interrupt, InterruptManager};
pub use namespace::{Bindings, LocalScope, Lookup, Namespace, PostTask, ScopeStack};
pub use value::{Body, Closure, Function, FunctionKind, Value};
pub use variable::Variable;
