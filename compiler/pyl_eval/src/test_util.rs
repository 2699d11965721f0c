//! Drivers for running the engine over source text in tests.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use pyl_diagnostic::DiagnosticQueue;
use pyl_pass::{FlagSet, InitContext, OptLevel, Pass, PassConfig, PassContext, UnitView};

use crate::PredictEngine;

pub(crate) struct Outcome {
    pub text: String,
    pub messages: Vec<String>,
}

/// Simulate `source` until the engine stops rewriting it.
pub(crate) fn predict(source: &str) -> Outcome {
    predict_with(source, &PassConfig::with_level(OptLevel::O3))
}

pub(crate) fn predict_with(source: &str, config: &PassConfig) -> Outcome {
    let mut tree = pyl_parse::parse(source).unwrap();
    let mut diagnostics = DiagnosticQueue::new();
    let mut flags = FlagSet::new();
    let mut outputs = Vec::new();
    let unit = UnitView {
        path: Path::new("test.py"),
        text: source,
    };
    let mut engine = PredictEngine::default();
    engine.init(&InitContext { config });
    engine.on_parse_unit(&unit, &tree);
    for _ in 0..20 {
        let mut cx = PassContext::new(unit, config, &mut diagnostics, &mut flags, &mut outputs);
        engine.on_pre_transform(&mut cx);
        engine.transform(&mut cx, &mut tree);
        engine.on_post_transform(&mut cx, &mut tree);
        tree.fix_positions();
        if !cx.is_changed() {
            break;
        }
    }
    Outcome {
        text: pyl_fmt::serialize(&tree),
        messages: diagnostics.iter().map(|d| d.message.clone()).collect(),
    }
}
