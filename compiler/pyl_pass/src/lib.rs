//! Pass framework for the pylang optimizer.
//!
//! A [`Pass`] rewrites one unit's [`pyl_ir::Tree`] in place and counts its
//! rewrites on the [`PassContext`] it is handed. The pipeline keeps running
//! every enabled pass until a whole cycle counts nothing.
//!
//! # Passes
//!
//! | Pass | Level | |
//! |---|---|---|
//! | [`ConstantFolding`] | O1 | operators over literals |
//! | [`DeadCodeElimination`] | O1 | branches with literal tests |
//! | [`LoopUnfolding`] | O2 | `for` over a literal `range` |
//! | [`DocumentRemover`] | O1 | docstrings and annotations |
//! | [`UnusedVariableRemover`] | O2 | stores nobody reads |
//! | [`VariableRenamer`] | O2 | short names for locals |
//! | [`BuiltinFolding`] | O2 | pure builtins over literals |
//!
//! [`default_passes`] lists them in registration order. The
//! partial-evaluation engine and native conversion live in their own
//! crates and implement the same trait.

mod config;
mod context;
mod pass;
pub mod passes;
mod unit;
pub mod util;

#[cfg(test)]
mod test_util;

pub use config::{OptLevel, PassConfig};
pub use context::{FlagSet, InitContext, PassContext};
pub use pass::Pass;
pub use passes::{
    default_passes, BuiltinFolding, ConstantFolding, DeadCodeElimination, DocumentRemover, LoopUnfolding,
    UnusedVariableRemover, VariableRenamer,
};
pub use unit::{NativeArtifact, SourceUnit, Unit, UnitView};
