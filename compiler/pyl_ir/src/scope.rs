//! Name-binding analysis of a single scope.

use indexmap::IndexSet;
use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::node::{Comprehension, ExprContext, NodeId, NodeKind, Params};
use crate::tree::Tree;

/// Builtins that read or write a namespace behind the compiler's back.
pub const DYNAMIC_BUILTINS: &[&str] = &["globals", "locals", "vars", "eval", "exec", "__import__"];

/// What one scope binds and reads.
#[derive(Debug, Default)]
pub struct ScopeInfo {
    /// Names bound in this scope (parameters included), first binding first.
    pub bound: IndexSet<String, FxBuildHasher>,
    pub params: FxHashSet<String>,
    pub loads: FxHashSet<String>,
    pub globals: FxHashSet<String>,
    pub nonlocals: FxHashSet<String>,
    /// Names bound by `import`, `def`, `class` or `except ... as`.
    pub declared: FxHashSet<String>,
    /// Every identifier used, in any context, inside a nested scope.
    pub nested: FxHashSet<String>,
    pub star_import: bool,
    /// A dynamic namespace builtin is referenced somewhere in the scope.
    pub dynamic: bool,
}

impl ScopeInfo {
    /// `true` if `name` is a local of this scope.
    pub fn is_local(&self, name: &str) -> bool {
        self.bound.contains(name) && !self.globals.contains(name) && !self.nonlocals.contains(name)
    }

    fn bind(&mut self, name: &str) {
        if !self.bound.contains(name) {
            self.bound.insert(name.to_owned());
        }
    }
}

/// Analyze the scope opened by `scope` (a module, function, lambda or class).
pub fn analyze(tree: &Tree, scope: NodeId) -> ScopeInfo {
    let mut info = ScopeInfo::default();
    match tree.kind(scope) {
        NodeKind::FunctionDef { params, body, .. } => {
            bind_params(&mut info, params);
            for &stmt in body {
                walk(tree, stmt, &mut info);
            }
        }
        NodeKind::Lambda { params, body } => {
            bind_params(&mut info, params);
            walk(tree, *body, &mut info);
        }
        NodeKind::Module { body } | NodeKind::ClassDef { body, .. } => {
            for &stmt in body {
                walk(tree, stmt, &mut info);
            }
        }
        _ => walk(tree, scope, &mut info),
    }
    info.dynamic |= DYNAMIC_BUILTINS
        .iter()
        .any(|name| info.loads.contains(*name) || info.nested.contains(*name));
    info
}

fn bind_params(info: &mut ScopeInfo, params: &Params) {
    for param in params.iter() {
        info.bind(&param.name);
        info.params.insert(param.name.clone());
    }
}

fn walk(tree: &Tree, id: NodeId, info: &mut ScopeInfo) {
    pyl_stack::ensure_sufficient_stack(|| match tree.kind(id) {
        NodeKind::Name { id: name, ctx } => {
            if *ctx == ExprContext::Load {
                info.loads.insert(name.clone());
            } else {
                info.bind(name);
            }
        }
        NodeKind::FunctionDef {
            name,
            params,
            body,
            decorators,
            returns,
            ..
        } => {
            info.bind(name);
            info.declared.insert(name.clone());
            for &d in decorators {
                walk(tree, d, info);
            }
            outer_params(tree, params, info);
            if let Some(r) = returns {
                walk(tree, *r, info);
            }
            for &stmt in body {
                nested(tree, stmt, info, false);
            }
        }
        NodeKind::ClassDef {
            name,
            bases,
            keywords,
            body,
            decorators,
        } => {
            info.bind(name);
            info.declared.insert(name.clone());
            for &id in decorators.iter().chain(bases) {
                walk(tree, id, info);
            }
            for k in keywords {
                walk(tree, k.value, info);
            }
            for &stmt in body {
                nested(tree, stmt, info, false);
            }
        }
        NodeKind::Lambda { params, body } => {
            outer_params(tree, params, info);
            nested(tree, *body, info, false);
        }
        NodeKind::ListComp { elt, generators }
        | NodeKind::SetComp { elt, generators }
        | NodeKind::GeneratorExp { elt, generators } => {
            comprehension(tree, generators, &[*elt], info);
        }
        NodeKind::DictComp {
            key,
            value,
            generators,
        } => comprehension(tree, generators, &[*key, *value], info),
        NodeKind::Import { names } => {
            for alias in names {
                info.bind(alias.bound_name());
                info.declared.insert(alias.bound_name().to_owned());
            }
        }
        NodeKind::ImportFrom { names, .. } => {
            for alias in names {
                if alias.name == "*" {
                    info.star_import = true;
                } else {
                    info.bind(alias.bound_name());
                    info.declared.insert(alias.bound_name().to_owned());
                }
            }
        }
        NodeKind::ExceptHandler { typ, name, body } => {
            if let Some(t) = typ {
                walk(tree, *t, info);
            }
            if let Some(name) = name {
                info.bind(name);
                info.declared.insert(name.clone());
            }
            for &stmt in body {
                walk(tree, stmt, info);
            }
        }
        NodeKind::Global { names } => info.globals.extend(names.iter().cloned()),
        NodeKind::Nonlocal { names } => info.nonlocals.extend(names.iter().cloned()),
        kind => kind.for_each_child(|child| walk(tree, child, info)),
    });
}

fn outer_params(tree: &Tree, params: &Params, info: &mut ScopeInfo) {
    for param in params.iter() {
        if let Some(default) = param.default {
            walk(tree, default, info);
        }
        if let Some(annotation) = param.annotation {
            walk(tree, annotation, info);
        }
    }
}

fn comprehension(tree: &Tree, generators: &[Comprehension], elts: &[NodeId], info: &mut ScopeInfo) {
    let mut inner = Vec::new();
    for (i, g) in generators.iter().enumerate() {
        if i == 0 {
            walk(tree, g.iter, info);
        } else {
            inner.push(g.iter);
        }
        inner.push(g.target);
        inner.extend(&g.ifs);
    }
    inner.extend(elts);
    for id in inner {
        nested(tree, id, info, true);
    }
}

/// Record every identifier under `id` as used by a nested scope.
///
/// Walrus targets directly inside a comprehension still bind in the
/// enclosing scope; `binds_outer` tracks whether that rule applies.
fn nested(tree: &Tree, id: NodeId, info: &mut ScopeInfo, binds_outer: bool) {
    pyl_stack::ensure_sufficient_stack(|| match tree.kind(id) {
        NodeKind::Name { id: name, .. } => {
            info.nested.insert(name.clone());
        }
        NodeKind::Global { names } | NodeKind::Nonlocal { names } => {
            info.nested.extend(names.iter().cloned());
        }
        NodeKind::NamedExpr { target, value } => {
            if let (true, NodeKind::Name { id: name, .. }) = (binds_outer, tree.kind(*target)) {
                info.bind(name);
            }
            nested(tree, *value, info, binds_outer);
            nested(tree, *target, info, binds_outer);
        }
        kind @ (NodeKind::FunctionDef { .. } | NodeKind::Lambda { .. } | NodeKind::ClassDef { .. }) => {
            if let NodeKind::FunctionDef { name, .. } | NodeKind::ClassDef { name, .. } = kind {
                info.nested.insert(name.clone());
            }
            kind.for_each_child(|child| nested(tree, child, info, false));
        }
        kind => kind.for_each_child(|child| nested(tree, child, info, binds_outer)),
    });
}

/// Every identifier spelled anywhere under `id`: names, parameters,
/// definitions, import bindings and declarations.
pub fn all_names(tree: &Tree, id: NodeId) -> FxHashSet<String> {
    let mut out = FxHashSet::default();
    for node in tree.descendants(id) {
        match tree.kind(node) {
            NodeKind::Name { id, .. } => {
                out.insert(id.clone());
            }
            NodeKind::FunctionDef { name, params, .. } => {
                out.insert(name.clone());
                out.extend(params.iter().map(|p| p.name.clone()));
            }
            NodeKind::Lambda { params, .. } => {
                out.extend(params.iter().map(|p| p.name.clone()));
            }
            NodeKind::ClassDef { name, .. } => {
                out.insert(name.clone());
            }
            NodeKind::Import { names } | NodeKind::ImportFrom { names, .. } => {
                out.extend(names.iter().map(|a| a.bound_name().to_owned()));
            }
            NodeKind::ExceptHandler { name: Some(name), .. } => {
                out.insert(name.clone());
            }
            NodeKind::Global { names } | NodeKind::Nonlocal { names } => {
                out.extend(names.iter().cloned());
            }
            _ => {}
        }
    }
    out
}

/// Names declared `global` anywhere under `id`, nested scopes included.
pub fn global_declarations(tree: &Tree, id: NodeId) -> FxHashSet<String> {
    let mut out = FxHashSet::default();
    for node in tree.descendants(id) {
        if let NodeKind::Global { names } = tree.kind(node) {
            out.extend(names.iter().cloned());
        }
    }
    out
}
