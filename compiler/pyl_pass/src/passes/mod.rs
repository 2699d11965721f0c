//! The tree-rewriting passes that need no evaluation engine.

mod builtin_folding;
mod constant_folding;
mod dead_code;
mod document_remover;
mod loop_unfolding;
mod renamer;
mod unused_variables;

pub use builtin_folding::BuiltinFolding;
pub use constant_folding::ConstantFolding;
pub use dead_code::DeadCodeElimination;
pub use document_remover::DocumentRemover;
pub use loop_unfolding::LoopUnfolding;
pub use renamer::VariableRenamer;
pub use unused_variables::UnusedVariableRemover;

use crate::Pass;

/// The passes of this crate, in registration order.
pub fn default_passes() -> Vec<Box<dyn Pass>> {
    vec![
        Box::new(ConstantFolding),
        Box::new(DeadCodeElimination),
        Box::new(LoopUnfolding::default()),
        Box::new(DocumentRemover),
        Box::new(UnusedVariableRemover),
        Box::new(VariableRenamer),
        Box::new(BuiltinFolding),
    ]
}
