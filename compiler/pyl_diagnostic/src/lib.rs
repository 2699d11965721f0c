//! Diagnostics produced while optimizing.
//!
//! Passes never fail a unit for something they notice about the program
//! (a division by zero in a folded expression, a call that is certain to
//! raise); they record a warning and leave the code alone. This crate
//! holds those warnings until the run ends and renders them.
//!
//! - [`Diagnostic`] / [`Label`] / [`Severity`]: one report with its spans
//! - [`DiagnosticQueue`]: insertion-ordered, duplicate-free collection
//! - [`LineIndex`]: byte offset to line/column lookup
//! - [`emitter`]: terminal rendering

mod diagnostic;
pub mod emitter;
mod line_index;
mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
pub use line_index::LineIndex;
pub use queue::DiagnosticQueue;
