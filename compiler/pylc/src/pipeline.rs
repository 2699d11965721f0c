//! The pass manager.

use pyl_diagnostic::DiagnosticQueue;
use pyl_ir::{Literal, NodeKind, Tree};
use pyl_pass::{FlagSet, InitContext, Pass, PassConfig, PassContext, SourceUnit, Unit};
use rustc_hash::FxHashSet;
use tracing::{debug, debug_span, info, warn};

use crate::config::PipelineConfig;
use crate::decode::read_source;
use crate::error::PipelineError;
use crate::input::InputFile;
use crate::native::NativeConvertor;

/// String statement that keeps a unit out of every transformation.
pub const SKIP_MARKER: &str = "pylang: skip";

struct Registered {
    pass: Box<dyn Pass>,
    /// Reports this pass instance already made.
    flags: FlagSet,
}

struct ParsedUnit {
    source: SourceUnit,
    tree: Tree,
    skip: bool,
}

/// Units of one run and the passes applied to them.
pub struct Pipeline {
    config: PassConfig,
    max_cycles: usize,
    passes: Vec<Registered>,
    /// Every unit that decoded, as read.
    originals: Vec<SourceUnit>,
    units: Vec<ParsedUnit>,
    diagnostics: DiagnosticQueue,
}

impl Pipeline {
    pub fn new(config: PassConfig, max_cycles: usize) -> Self {
        Pipeline {
            config,
            max_cycles,
            passes: Vec::new(),
            originals: Vec::new(),
            units: Vec::new(),
            diagnostics: DiagnosticQueue::new(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.pass_config(), config.max_cycles)
    }

    /// Every pass the optimizer ships, in the order they run.
    #[must_use]
    pub fn with_default_passes(mut self) -> Self {
        for pass in pyl_pass::default_passes() {
            self.register(pass);
        }
        self.register(Box::new(pyl_eval::PredictEngine::default()));
        self.register(Box::new(NativeConvertor::default()));
        self
    }

    /// Append `pass`. Within a cycle later passes see the rewrites of
    /// earlier ones.
    pub fn register(&mut self, mut pass: Box<dyn Pass>) {
        pass.init(&InitContext { config: &self.config });
        debug!(pass = pass.name(), level = %pass.level(), post = pass.is_post(), "registered");
        self.passes.push(Registered {
            pass,
            flags: FlagSet::new(),
        });
    }

    pub fn config(&self) -> &PassConfig {
        &self.config
    }

    /// Read `input` and add it. Undecodable files are dropped with a
    /// warning; returns whether the unit was added.
    pub fn add_file(&mut self, input: &InputFile) -> bool {
        match read_source(&input.path) {
            Ok(text) => {
                self.add_source(SourceUnit::new(&input.relative, text));
                true
            }
            Err(err) => {
                warn!(%err, "unit dropped");
                false
            }
        }
    }

    /// Add a decoded unit. A unit that does not parse is only copied to
    /// the output.
    pub fn add_source(&mut self, source: SourceUnit) {
        self.originals.push(source.clone());
        let tree = match pyl_parse::parse(&source.text) {
            Ok(tree) => tree,
            Err(err) => {
                warn!(path = %source.path.display(), %err, "unit not parsed, copied unchanged");
                return;
            }
        };
        for registered in &mut self.passes {
            registered.pass.on_parse_unit(&source.view(), &tree);
        }
        let skip = has_skip_marker(&tree);
        if skip {
            info!(path = %source.path.display(), "skip marker found, unit left unchanged");
        }
        self.units.push(ParsedUnit { source, tree, skip });
    }

    /// Run every pass to a fixed point, then the post passes once, and
    /// collect the output units.
    ///
    /// The output holds each transformed unit, then whatever the passes
    /// synthesized, then every original not already present by path.
    pub fn transform(&mut self) -> Result<Vec<Unit>, PipelineError> {
        let Pipeline {
            config,
            max_cycles,
            passes,
            originals,
            units,
            diagnostics,
        } = self;
        let mut emitted = Vec::new();

        let mut cycle = 0;
        loop {
            cycle += 1;
            if cycle > *max_cycles {
                return Err(PipelineError::CycleLimit { cycles: *max_cycles });
            }
            info!("transforming cycle {cycle}");
            let mut changed = false;
            for unit in units.iter_mut().filter(|unit| !unit.skip) {
                let _span = debug_span!("unit", path = %unit.source.path.display()).entered();
                for registered in passes.iter_mut() {
                    if registered.pass.is_post() || registered.pass.level() > config.level {
                        continue;
                    }
                    changed |= run_pass(registered, unit, config, diagnostics, &mut emitted);
                }
            }
            if !changed {
                break;
            }
        }

        for unit in units.iter_mut().filter(|unit| !unit.skip) {
            let _span = debug_span!("post", path = %unit.source.path.display()).entered();
            for registered in passes.iter_mut() {
                if registered.pass.is_post() && registered.pass.level() <= config.level {
                    run_pass(registered, unit, config, diagnostics, &mut emitted);
                }
            }
        }

        let mut outputs: Vec<Unit> = units
            .iter()
            .filter(|unit| !unit.skip)
            .map(|unit| Unit::Source(SourceUnit::new(&unit.source.path, pyl_fmt::serialize(&unit.tree))))
            .collect();
        outputs.extend(emitted);
        let mut present: FxHashSet<_> = outputs.iter().map(|unit| unit.path().to_path_buf()).collect();
        for original in originals.iter() {
            if present.insert(original.path.clone()) {
                outputs.push(Unit::Source(original.clone()));
            }
        }
        info!(units = outputs.len(), "transform done");
        Ok(outputs)
    }

    pub fn diagnostics(&self) -> &DiagnosticQueue {
        &self.diagnostics
    }

    /// Original text of the unit a diagnostic's `file` names.
    pub fn source_text(&self, file: &str) -> Option<&str> {
        self.originals
            .iter()
            .find(|source| source.view().display_path() == file)
            .map(|source| source.text.as_str())
    }
}

/// One run of one pass over one unit; `true` if it rewrote anything.
fn run_pass(
    registered: &mut Registered,
    unit: &mut ParsedUnit,
    config: &PassConfig,
    diagnostics: &mut DiagnosticQueue,
    emitted: &mut Vec<Unit>,
) -> bool {
    let pass = &mut registered.pass;
    let mut cx = PassContext::new(unit.source.view(), config, diagnostics, &mut registered.flags, emitted);
    pass.on_pre_transform(&mut cx);
    pass.transform(&mut cx, &mut unit.tree);
    pass.on_post_transform(&mut cx, &mut unit.tree);
    unit.tree.fix_positions();
    let changes = cx.changes();
    if changes > 0 {
        debug!(pass = pass.name(), changes, "changed");
    }
    changes > 0
}

/// `true` if the statements opening the unit carry [`SKIP_MARKER`].
/// Docstrings, other string statements and `__future__` imports may come
/// before it.
fn has_skip_marker(tree: &Tree) -> bool {
    for &stmt in tree.body() {
        match tree.kind(stmt) {
            NodeKind::Expr { value } => match tree.kind(*value) {
                NodeKind::Constant(Literal::Str(text)) if text.trim() == SKIP_MARKER => return true,
                NodeKind::Constant(Literal::Str(_)) => {}
                _ => return false,
            },
            NodeKind::ImportFrom {
                module: Some(module), ..
            } if module == "__future__" => {}
            _ => return false,
        }
    }
    false
}
