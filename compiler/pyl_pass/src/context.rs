//! State a pass sees while it runs.
//!
//! Passes never reach for globals: the unit being transformed, the run's
//! configuration, the diagnostics sink and the output set all arrive
//! through a [`PassContext`] built by the pipeline for one pass run.

use pyl_diagnostic::{Diagnostic, DiagnosticQueue};
use pyl_ir::{NodeId, Tree};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::config::PassConfig;
use crate::unit::{Unit, UnitView};

/// Handed to [`crate::Pass::init`] once, at registration.
#[derive(Copy, Clone, Debug)]
pub struct InitContext<'a> {
    pub config: &'a PassConfig,
}

/// Problems one pass instance already reported.
///
/// The same node is looked at on every cycle of the fixed point; a report
/// is keyed on its message, unit and node set so it is made only once.
#[derive(Debug, Default)]
pub struct FlagSet {
    seen: FxHashSet<(String, String, Vec<NodeId>)>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a report; `false` if it was made before.
    pub fn insert(&mut self, message: &str, path: &str, nodes: &[NodeId]) -> bool {
        let mut nodes = nodes.to_vec();
        nodes.sort_unstable();
        nodes.dedup();
        self.seen.insert((message.to_owned(), path.to_owned(), nodes))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Everything one pass run over one unit may touch besides the tree.
pub struct PassContext<'a> {
    unit: UnitView<'a>,
    config: &'a PassConfig,
    diagnostics: &'a mut DiagnosticQueue,
    flags: &'a mut FlagSet,
    outputs: &'a mut Vec<Unit>,
    changes: usize,
}

impl<'a> PassContext<'a> {
    pub fn new(
        unit: UnitView<'a>,
        config: &'a PassConfig,
        diagnostics: &'a mut DiagnosticQueue,
        flags: &'a mut FlagSet,
        outputs: &'a mut Vec<Unit>,
    ) -> Self {
        PassContext {
            unit,
            config,
            diagnostics,
            flags,
            outputs,
            changes: 0,
        }
    }

    pub fn unit(&self) -> UnitView<'a> {
        self.unit
    }

    pub fn config(&self) -> &'a PassConfig {
        self.config
    }

    /// Count one rewrite.
    pub fn done(&mut self) {
        self.changes += 1;
    }

    pub fn changes(&self) -> usize {
        self.changes
    }

    pub fn is_changed(&self) -> bool {
        self.changes > 0
    }

    pub fn reset_changes(&mut self) {
        self.changes = 0;
    }

    /// Report a problem the program will hit at runtime, underlining
    /// `nodes`. Returns `false` when this pass already reported it.
    pub fn flag(&mut self, tree: &Tree, message: impl Into<String>, nodes: &[NodeId]) -> bool {
        let message = message.into();
        let path = self.unit.display_path();
        if !self.flags.insert(&message, &path, nodes) {
            return false;
        }
        debug!(%path, %message, "flagged");
        let mut diagnostic = Diagnostic::warning(message).with_file(path);
        for (i, &node) in nodes.iter().enumerate() {
            let span = tree.span(node);
            diagnostic = if i == 0 {
                diagnostic.with_label(span, "")
            } else {
                diagnostic.with_secondary_label(span, "")
            };
        }
        self.diagnostics.push(diagnostic);
        true
    }

    /// Queue a diagnostic that is not tied to a single pass report.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add a unit synthesized by this pass to the run's output.
    pub fn emit(&mut self, unit: Unit) {
        self.outputs.push(unit);
    }
}
