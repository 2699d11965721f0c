//! Renaming of function locals to short synthetic names.

use pyl_ir::{scope, NodeId, NodeKind, Tree};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{OptLevel, Pass, PassContext};

/// Gives each plain local of a function the next free name of the
/// sequence `a_`, `b_`, ..., `z_`, `aa_`, `ab_`, ...
///
/// Parameters are callers' keywords and keep their names. Names visible to
/// nested scopes, declared `global`/`nonlocal`, or bound by `import`,
/// `def`, `class` or `except ... as` keep theirs too, as do all names of
/// a function that reaches its namespace dynamically.
#[derive(Debug, Default)]
pub struct VariableRenamer;

impl Pass for VariableRenamer {
    fn name(&self) -> &'static str {
        "VariableRenamer"
    }

    fn level(&self) -> OptLevel {
        OptLevel::O2
    }

    fn transform(&mut self, cx: &mut PassContext<'_>, tree: &mut Tree) {
        let functions: Vec<NodeId> = tree
            .descendants(tree.root())
            .into_iter()
            .filter(|&id| matches!(tree.kind(id), NodeKind::FunctionDef { .. }))
            .collect();
        for function in functions {
            let mapping = mapping(tree, function);
            if mapping.is_empty() {
                continue;
            }
            let NodeKind::FunctionDef { body, .. } = tree.kind(function) else {
                continue;
            };
            let names: Vec<NodeId> = body.iter().flat_map(|&stmt| tree.descendants(stmt)).collect();
            for node in names {
                if let NodeKind::Name { id, .. } = tree.kind_mut(node) {
                    if let Some(new) = mapping.get(id.as_str()) {
                        id.clone_from(new);
                        cx.done();
                    }
                }
            }
        }
    }
}

/// Old name to new name, for the locals of `function` that change.
fn mapping(tree: &Tree, function: NodeId) -> FxHashMap<String, String> {
    let info = scope::analyze(tree, function);
    if info.dynamic || info.star_import {
        return FxHashMap::default();
    }
    let candidates: Vec<&String> = info
        .bound
        .iter()
        .filter(|name| {
            info.is_local(name)
                && !info.params.contains(*name)
                && !info.nested.contains(*name)
                && !info.declared.contains(*name)
        })
        .collect();
    let renamed: FxHashSet<&str> = candidates.iter().map(|name| name.as_str()).collect();
    let taken: FxHashSet<String> = scope::all_names(tree, function)
        .into_iter()
        .filter(|name| !renamed.contains(name.as_str()))
        .collect();

    let mut mapping = FxHashMap::default();
    let mut counter = 0;
    for name in candidates {
        let new = loop {
            counter += 1;
            let candidate = synthetic_name(counter);
            if !taken.contains(&candidate) {
                break candidate;
            }
        };
        if *name != new {
            mapping.insert(name.clone(), new);
        }
    }
    mapping
}

/// `n`-th name of the bijective base-26 sequence, counting from 1.
fn synthetic_name(mut n: u64) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    letters.push(b'_');
    String::from_utf8(letters).unwrap_or_default()
}
