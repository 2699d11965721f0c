//! Tree queries shared by several passes.

use pyl_ir::{ExprContext, Literal, NodeId, NodeKind, Tree};
use rustc_hash::FxHashSet;

/// Every name some statement of a unit binds, in any scope.
///
/// Rewrites that trust a builtin's meaning (`range`, `len`, ...) first
/// check the name is never rebound. A star import may bind anything.
#[derive(Debug, Default)]
pub struct Rebinds {
    names: FxHashSet<String>,
    star_import: bool,
}

impl Rebinds {
    pub fn collect(tree: &Tree) -> Self {
        let mut out = Rebinds::default();
        for id in tree.descendants(tree.root()) {
            match tree.kind(id) {
                NodeKind::Name { id: name, ctx } if *ctx != ExprContext::Load => {
                    out.names.insert(name.clone());
                }
                NodeKind::FunctionDef { name, params, .. } => {
                    out.names.insert(name.clone());
                    out.names.extend(params.iter().map(|p| p.name.clone()));
                }
                NodeKind::Lambda { params, .. } => {
                    out.names.extend(params.iter().map(|p| p.name.clone()));
                }
                NodeKind::ClassDef { name, .. }
                | NodeKind::ExceptHandler {
                    name: Some(name), ..
                } => {
                    out.names.insert(name.clone());
                }
                NodeKind::Import { names } | NodeKind::ImportFrom { names, .. } => {
                    for alias in names {
                        if alias.name == "*" {
                            out.star_import = true;
                        } else {
                            out.names.insert(alias.bound_name().to_owned());
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// `true` if `name` may not refer to the builtin of that name.
    pub fn contains(&self, name: &str) -> bool {
        self.star_import || self.names.contains(name)
    }
}

/// Names listed in a module-level `__all__`.
pub fn exported_names(tree: &Tree) -> FxHashSet<String> {
    let mut out = FxHashSet::default();
    for &stmt in tree.body() {
        let (targets, value): (&[NodeId], NodeId) = match tree.kind(stmt) {
            NodeKind::Assign { targets, value } => (targets, *value),
            NodeKind::AugAssign { target, value, .. } => (std::slice::from_ref(target), *value),
            NodeKind::AnnAssign {
                target,
                value: Some(value),
                ..
            } => (std::slice::from_ref(target), *value),
            _ => continue,
        };
        let names_all = targets
            .iter()
            .any(|&t| matches!(tree.kind(t), NodeKind::Name { id, .. } if id == "__all__"));
        if !names_all {
            continue;
        }
        if let NodeKind::List { elts, .. } | NodeKind::Tuple { elts, .. } = tree.kind(value) {
            for &elt in elts {
                if let NodeKind::Constant(Literal::Str(name)) = tree.kind(elt) {
                    out.insert(name.clone());
                }
            }
        }
    }
    out
}

/// Give statement blocks that must not be empty a `pass`.
pub fn fill_empty_blocks(tree: &mut Tree, id: NodeId) {
    let mut kind = tree.replace(id, NodeKind::Pass);
    match &mut kind {
        NodeKind::FunctionDef { body, .. }
        | NodeKind::ClassDef { body, .. }
        | NodeKind::For { body, .. }
        | NodeKind::While { body, .. }
        | NodeKind::If { body, .. }
        | NodeKind::With { body, .. }
        | NodeKind::ExceptHandler { body, .. } => {
            if body.is_empty() {
                body.push(tree.synth(NodeKind::Pass));
            }
        }
        NodeKind::Try {
            body,
            handlers,
            finalbody,
            ..
        } => {
            if body.is_empty() {
                body.push(tree.synth(NodeKind::Pass));
            }
            if handlers.is_empty() && finalbody.is_empty() {
                finalbody.push(tree.synth(NodeKind::Pass));
            }
        }
        _ => {}
    }
    tree.replace(id, kind);
}

/// `true` for a statement that does nothing: `pass` or a bare non-string
/// constant. Strings are left alone, they may be docstrings.
pub fn is_noop_statement(tree: &Tree, id: NodeId) -> bool {
    match tree.kind(id) {
        NodeKind::Pass => true,
        NodeKind::Expr { value } => matches!(
            tree.kind(*value),
            NodeKind::Constant(lit) if !matches!(lit, Literal::Str(_))
        ),
        _ => false,
    }
}
