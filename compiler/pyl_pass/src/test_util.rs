//! Drivers for running a single pass over source text in tests.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use pyl_diagnostic::DiagnosticQueue;

use crate::{FlagSet, Pass, PassConfig, PassContext, UnitView};

pub(crate) struct Outcome {
    pub text: String,
    pub changes: usize,
    pub messages: Vec<String>,
}

/// Parse `source`, run `pass` over it once and serialize the result.
pub(crate) fn run_once(pass: &mut dyn Pass, source: &str) -> Outcome {
    run_with(pass, source, &PassConfig::with_level(crate::OptLevel::O3), 1)
}

/// Run `pass` cycle after cycle until it stops reporting changes.
pub(crate) fn run_fixpoint(pass: &mut dyn Pass, source: &str) -> Outcome {
    run_with(pass, source, &PassConfig::with_level(crate::OptLevel::O3), 20)
}

pub(crate) fn run_with(pass: &mut dyn Pass, source: &str, config: &PassConfig, max_cycles: usize) -> Outcome {
    let mut tree = pyl_parse::parse(source).unwrap();
    let mut diagnostics = DiagnosticQueue::new();
    let mut flags = FlagSet::new();
    let mut outputs = Vec::new();
    let unit = UnitView {
        path: Path::new("test.py"),
        text: source,
    };
    pass.init(&crate::InitContext { config });
    pass.on_parse_unit(&unit, &tree);
    let mut changes = 0;
    for _ in 0..max_cycles {
        let mut cx = PassContext::new(unit, config, &mut diagnostics, &mut flags, &mut outputs);
        pass.on_pre_transform(&mut cx);
        pass.transform(&mut cx, &mut tree);
        pass.on_post_transform(&mut cx, &mut tree);
        tree.fix_positions();
        if !cx.is_changed() {
            break;
        }
        changes += cx.changes();
    }
    Outcome {
        text: pyl_fmt::serialize(&tree),
        changes,
        messages: diagnostics.iter().map(|d| d.message.clone()).collect(),
    }
}
