//! Native conversion of marked functions.
//!
//! A module-level function decorated with `native` from the
//! `pylang_annotations` package is compiled, together with the rest of
//! its unit, into an extension module. The definition is then replaced by
//! an import of the compiled function:
//!
//! ```python
//! if __name__ == "__main__":
//!     from m_native import f
//! else:
//!     from .m_native import f
//! ```
//!
//! Compilation goes through a [`NativeCompiler`]; [`CythonCompiler`] is
//! the one used outside tests.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use pyl_ir::{scope, Alias, NodeId, NodeKind, Tree};
use pyl_pass::{NativeArtifact, OptLevel, Pass, PassContext, SourceUnit, Unit};
use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Package providing the `native` decorator.
const ANNOTATIONS: &str = "pylang_annotations";
const ANNOTATIONS_MODULE: &str = "pylang_annotations.annotations";

/// Attempts at finding a free module name.
const NAME_ATTEMPTS: usize = 1000;

/// Compiles a unit into an extension module.
pub trait NativeCompiler {
    /// Compile `source`. The artifact's module name must not be one of
    /// `existing`. `None` when compilation is unavailable or fails.
    fn compile(&self, source: &SourceUnit, existing: &FxHashSet<String>) -> Option<NativeArtifact>;
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("native build did not finish within {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("native build failed: {0}")]
    Failed(ExitStatus),

    #[error("no free module name for `{0}`")]
    NoName(String),

    #[error("native build produced no extension module")]
    NoOutput,
}

/// Builds extension modules with Cython and a C compiler.
#[derive(Clone, Debug)]
pub struct CythonCompiler {
    compiler: PathBuf,
    python: PathBuf,
    timeout: Duration,
}

const SETUP_SCRIPT: &str = "\
import os
from setuptools import setup
from Cython.Build import cythonize

setup(ext_modules=cythonize([os.environ[\"PYLANG_NATIVE_MODULE\"]]))
";

impl CythonCompiler {
    pub fn new(compiler: impl Into<PathBuf>, timeout: Duration) -> Self {
        CythonCompiler {
            compiler: compiler.into(),
            python: PathBuf::from("python3"),
            timeout,
        }
    }

    /// Use another interpreter to run the build.
    #[must_use]
    pub fn with_python(mut self, python: impl Into<PathBuf>) -> Self {
        self.python = python.into();
        self
    }

    /// Find a C compiler on the `PATH`.
    pub fn probe() -> Option<PathBuf> {
        const CANDIDATES: [&[&str]; 3] = [&["cl"], &["clang", "--version"], &["gcc", "--version"]];
        CANDIDATES.iter().find_map(|command| {
            let (program, args) = command.split_first()?;
            let status = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .ok()?;
            status.success().then(|| PathBuf::from(program))
        })
    }

    fn build(&self, source: &SourceUnit, existing: &FxHashSet<String>) -> Result<NativeArtifact, CompileError> {
        let stem = source.path.file_stem().and_then(OsStr::to_str).unwrap_or_default();
        let name = native_name(stem, existing).ok_or_else(|| CompileError::NoName(stem.to_owned()))?;
        let dir = tempfile::tempdir()?;
        let module = format!("{name}.pyx");
        fs::write(dir.path().join(&module), &source.text)?;
        fs::write(dir.path().join("setup.py"), SETUP_SCRIPT)?;

        info!("compiling {} as a native module", source.path.display());
        let mut child = Command::new(&self.python)
            .arg("setup.py")
            .arg("build_ext")
            .arg("--build-lib")
            .arg(dir.path())
            .current_dir(dir.path())
            .env("CC", &self.compiler)
            .env("PYLANG_NATIVE_MODULE", &module)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if started.elapsed() > self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CompileError::Timeout(self.timeout));
            }
            thread::sleep(Duration::from_millis(50));
        };
        if !status.success() {
            return Err(CompileError::Failed(status));
        }

        let (path, ext) = find_extension(dir.path(), &name)?.ok_or(CompileError::NoOutput)?;
        Ok(NativeArtifact {
            path: source.path.with_file_name(format!("{name}.{ext}")),
            bytes: fs::read(path)?,
        })
    }
}

impl NativeCompiler for CythonCompiler {
    fn compile(&self, source: &SourceUnit, existing: &FxHashSet<String>) -> Option<NativeArtifact> {
        match self.build(source, existing) {
            Ok(artifact) => Some(artifact),
            Err(err) => {
                debug!(path = %source.path.display(), %err, "native build failed");
                None
            }
        }
    }
}

/// The built extension for module `name` in `dir`, with its suffix.
fn find_extension(dir: &Path, name: &str) -> io::Result<Option<(PathBuf, &'static str)>> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(file) = path.file_name().and_then(OsStr::to_str) else {
            continue;
        };
        if !file.starts_with(name) {
            continue;
        }
        let ext = if file.ends_with(".pyd") {
            "pyd"
        } else if file.ends_with(".so") {
            "so"
        } else {
            continue;
        };
        return Ok(Some((path, ext)));
    }
    Ok(None)
}

/// A module name for the compiled form of unit `stem`: `<stem>_native`,
/// prefixed with `_<i>_` until it is an identifier, not a keyword and not
/// in `existing`.
pub fn native_name(stem: &str, existing: &FxHashSet<String>) -> Option<String> {
    let mut base = stem.to_owned();
    for i in 0..NAME_ATTEMPTS {
        let candidate = format!("{base}_native");
        if is_identifier(&candidate) && !pyl_lexer::is_keyword(&candidate) && !existing.contains(&candidate) {
            return Some(candidate);
        }
        base = format!("_{i}_{base}");
    }
    None
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c == '_' || c.is_alphabetic()) && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Post pass replacing marked functions with imports of their compiled
/// form.
#[derive(Default)]
pub struct NativeConvertor {
    compiler: Option<Box<dyn NativeCompiler>>,
    /// A compiler was looked for, successfully or not.
    resolved: bool,
    configured: Option<PathBuf>,
    timeout: Duration,
}

impl NativeConvertor {
    /// Convert with `compiler` instead of looking for a C toolchain.
    pub fn with_compiler(compiler: Box<dyn NativeCompiler>) -> Self {
        NativeConvertor {
            compiler: Some(compiler),
            resolved: true,
            ..NativeConvertor::default()
        }
    }

    /// The configured compiler, else one found on the `PATH`. Looked up
    /// on first use so runs without marked functions never probe.
    fn compiler(&mut self) -> Option<&dyn NativeCompiler> {
        if !self.resolved {
            self.resolved = true;
            let path = self.configured.clone().or_else(CythonCompiler::probe);
            match path {
                Some(path) => {
                    debug!(compiler = %path.display(), "native compiler");
                    self.compiler = Some(Box::new(CythonCompiler::new(path, self.timeout)));
                }
                None => warn!("C compiler not available, native optimization will be skipped"),
            }
        }
        self.compiler.as_deref()
    }
}

impl Pass for NativeConvertor {
    fn name(&self) -> &'static str {
        "NativeConvertor"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O3
    }

    fn is_post(&self) -> bool {
        true
    }

    fn init(&mut self, cx: &pyl_pass::InitContext<'_>) {
        if !self.resolved {
            self.configured.clone_from(&cx.config.compiler);
        }
        self.timeout = cx.config.native_timeout;
    }

    fn transform(&mut self, cx: &mut PassContext<'_>, tree: &mut Tree) {
        let spellings = markers(tree);
        if spellings.is_empty() {
            return;
        }
        let marked: Vec<(NodeId, String)> = tree
            .body()
            .iter()
            .filter_map(|&stmt| match tree.kind(stmt) {
                NodeKind::FunctionDef { name, decorators, .. }
                    if decorators.iter().any(|&d| is_marker(tree, d, &spellings)) =>
                {
                    Some((stmt, name.clone()))
                }
                _ => None,
            })
            .collect();
        if marked.is_empty() {
            return;
        }
        let Some(compiler) = self.compiler() else {
            return;
        };

        let unit = cx.unit();
        let source = SourceUnit::new(unit.path, pyl_fmt::serialize(tree));
        let existing = scope::all_names(tree, tree.root());
        let Some(artifact) = compiler.compile(&source, &existing) else {
            warn!(path = %unit.display_path(), "native compilation failed, unit left as is");
            return;
        };
        let Some(module) = artifact.path.file_stem().and_then(OsStr::to_str).map(str::to_owned) else {
            warn!(path = %artifact.path.display(), "artifact has no module name");
            return;
        };

        for (stmt, name) in marked {
            let snippet = format!(
                "if __name__ == \"__main__\":\n    from {module} import {name}\nelse:\n    from .{module} import {name}\n"
            );
            match pyl_parse::parse_statements_into(tree, &snippet) {
                Ok(stmts) if stmts.len() == 1 => {
                    let span = tree.span(stmt);
                    for node in tree.descendants(stmts[0]) {
                        tree.set_span(node, span);
                    }
                    let kind = tree.kind(stmts[0]).clone();
                    tree.replace(stmt, kind);
                    debug!(function = %name, %module, "converted to native");
                    cx.done();
                }
                _ => warn!(function = %name, "cannot build the native import"),
            }
        }
        cx.emit(Unit::Artifact(artifact));
    }
}

/// Dotted decorator spellings that denote the `native` marker, resolved
/// from the unit's module-level imports. A spelling whose root name is
/// bound anywhere else in the unit is dropped.
fn markers(tree: &Tree) -> FxHashSet<String> {
    let mut found = FxHashSet::default();
    for &stmt in tree.body() {
        match tree.kind(stmt) {
            NodeKind::Import { names } => {
                for alias in names {
                    import_markers(alias, &mut found);
                }
            }
            NodeKind::ImportFrom {
                module: Some(module),
                names,
                level: 0,
            } => {
                for alias in names {
                    from_markers(module, alias, &mut found);
                }
            }
            _ => {}
        }
    }
    found.retain(|marker| {
        let root = marker.split('.').next().unwrap_or(marker);
        binding_count(tree, root) == 1
    });
    found
}

fn import_markers(alias: &Alias, found: &mut FxHashSet<String>) {
    let bound = alias.bound_name();
    match (alias.name.as_str(), &alias.asname) {
        (ANNOTATIONS, _) => {
            found.insert(format!("{bound}.native"));
            found.insert(format!("{bound}.annotations.native"));
        }
        (ANNOTATIONS_MODULE, Some(asname)) => {
            found.insert(format!("{asname}.native"));
        }
        (ANNOTATIONS_MODULE, None) => {
            found.insert(format!("{ANNOTATIONS_MODULE}.native"));
            found.insert(format!("{ANNOTATIONS}.native"));
        }
        _ => {}
    }
}

fn from_markers(module: &str, alias: &Alias, found: &mut FxHashSet<String>) {
    let bound = alias.bound_name();
    match (module, alias.name.as_str()) {
        (ANNOTATIONS | ANNOTATIONS_MODULE, "native") => {
            found.insert(bound.to_owned());
        }
        (ANNOTATIONS, "annotations") => {
            found.insert(format!("{bound}.native"));
        }
        _ => {}
    }
}

/// Places in the unit that bind `name`.
fn binding_count(tree: &Tree, name: &str) -> usize {
    tree.descendants(tree.root())
        .into_iter()
        .map(|node| match tree.kind(node) {
            NodeKind::Name { id, ctx } => usize::from(id == name && *ctx != pyl_ir::ExprContext::Load),
            NodeKind::FunctionDef { name: bound, params, .. } => {
                usize::from(bound == name) + params.iter().filter(|p| p.name == name).count()
            }
            NodeKind::Lambda { params, .. } => params.iter().filter(|p| p.name == name).count(),
            NodeKind::ClassDef { name: bound, .. } => usize::from(bound == name),
            NodeKind::Import { names } | NodeKind::ImportFrom { names, .. } => {
                names.iter().filter(|alias| alias.bound_name() == name).count()
            }
            NodeKind::ExceptHandler { name: Some(bound), .. } => usize::from(bound == name),
            _ => 0,
        })
        .sum()
}

/// `true` if decorator `id`, called or bare, spells one of `markers`.
fn is_marker(tree: &Tree, id: NodeId, markers: &FxHashSet<String>) -> bool {
    let target = match tree.kind(id) {
        NodeKind::Call { func, .. } => *func,
        _ => id,
    };
    dotted(tree, target).is_some_and(|path| markers.contains(&path))
}

fn dotted(tree: &Tree, id: NodeId) -> Option<String> {
    match tree.kind(id) {
        NodeKind::Name { id, .. } => Some(id.clone()),
        NodeKind::Attribute { value, attr, .. } => Some(format!("{}.{attr}", dotted(tree, *value)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
