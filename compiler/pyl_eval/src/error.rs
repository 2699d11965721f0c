//! Why a simulated call was given up.

use thiserror::Error;

/// A simulated call stopped before reaching a result.
///
/// None of these is an error in the program being optimized: the call is
/// simply left for runtime and its value becomes unknown.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalAbort {
    /// Control flow or a value the engine does not model.
    #[error("control flow depends on a value unknown at compile time")]
    Undecidable,
    /// The outermost call executed more statements than allowed.
    #[error("statement budget exhausted")]
    StepBudget,
    /// Simulated calls nested deeper than allowed.
    #[error("call depth limit exceeded")]
    DepthExceeded,
}

pub type EvalResult<T> = Result<T, EvalAbort>;
