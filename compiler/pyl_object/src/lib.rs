//! Host-level values for compile-time evaluation.
//!
//! An [`Object`] is a fully known runtime value of the target language.
//! The operations here compute exactly what the program would compute at
//! runtime, or report that they cannot:
//!
//! - [`ObjectError::Raised`]: the program would raise this exception
//! - [`ObjectError::Undecidable`]: the result is not modelled (integer
//!   overflow past `i64`, oversized results, NaN, unsupported shapes)
//!
//! Folding passes replace an expression only on `Ok`.

mod builtins;
mod exc;
mod object;
mod ops;

pub use builtins::{call_builtin, is_pure_builtin, PURE_BUILTINS};
pub use exc::{ExcType, ObjectError, ObjectResult};
pub use object::{HashKey, Object, ObjectDict, ObjectSet, MAX_SIZE};
pub use ops::{binary, compare, compare_chain, unary};
