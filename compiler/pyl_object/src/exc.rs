//! Exception kinds and the evaluation error type.

use strum::{Display, EnumString, IntoStaticStr};
use thiserror::Error;

/// Result of a host-level computation.
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Built-in exception classes the evaluator can raise or catch.
///
/// Display and `FromStr` use the runtime class names, so `"KeyError"`
/// parses to [`ExcType::KeyError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ExcType {
    BaseException,
    Exception,

    ArithmeticError,
    ZeroDivisionError,
    OverflowError,

    LookupError,
    IndexError,
    KeyError,

    TypeError,
    ValueError,

    NameError,
    /// Reading a local before its first assignment.
    UnboundLocalError,

    AssertionError,
    AttributeError,

    RuntimeError,
    RecursionError,
}

impl ExcType {
    /// `true` if `except handler:` catches `self`.
    #[must_use]
    pub fn is_subclass_of(self, handler: ExcType) -> bool {
        if self == handler {
            return true;
        }
        match handler {
            ExcType::BaseException => true,
            ExcType::Exception => self != ExcType::BaseException,
            ExcType::ArithmeticError => {
                matches!(self, ExcType::ZeroDivisionError | ExcType::OverflowError)
            }
            ExcType::LookupError => matches!(self, ExcType::IndexError | ExcType::KeyError),
            ExcType::NameError => self == ExcType::UnboundLocalError,
            ExcType::RuntimeError => self == ExcType::RecursionError,
            _ => false,
        }
    }
}

/// Why a computation produced no value.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ObjectError {
    /// The program itself would raise this exception.
    #[error("{exc}: {message}")]
    Raised { exc: ExcType, message: String },
    /// The answer exists but is not modelled at compile time.
    #[error("result cannot be decided at compile time")]
    Undecidable,
}

impl ObjectError {
    pub fn raised(exc: ExcType, message: impl Into<String>) -> Self {
        ObjectError::Raised {
            exc,
            message: message.into(),
        }
    }
}

/// `Err(ObjectError::Raised { .. })` with a formatted message.
macro_rules! exc_err_fmt {
    ($exc:expr; $($fmt_args:tt)*) => {
        Err($crate::exc::ObjectError::raised($exc, format!($($fmt_args)*)))
    };
}
pub(crate) use exc_err_fmt;

#[cfg(test)]
mod tests;
