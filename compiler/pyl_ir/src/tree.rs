//! Arena storage for one unit's syntax tree.

use crate::node::{NodeId, NodeKind};
use crate::span::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// A parsed unit: every node lives in `nodes`, the root is a `Module`.
///
/// Nodes are never freed, apart from the newest one when [`Tree::graft`]
/// moves it into place; detached subtrees simply become unreachable from
/// the root. Handles to live nodes stay valid for the tree's lifetime.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl Tree {
    /// A tree holding an empty module.
    pub fn new() -> Self {
        let mut tree = Tree {
            nodes: Vec::new(),
            root: NodeId::new(0),
        };
        tree.root = tree.alloc(NodeKind::Module { body: Vec::new() }, Span::DUMMY);
        tree
    }

    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let index = u32::try_from(self.nodes.len()).unwrap_or(u32::MAX);
        self.nodes.push(Node { kind, span });
        NodeId::new(index)
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    /// Swap the kind of `id`, keeping its handle and span.
    pub fn replace(&mut self, id: NodeId, kind: NodeKind) -> NodeKind {
        std::mem::replace(&mut self.nodes[id.index()].kind, kind)
    }

    /// Move the kind of the detached node `source` into `target`.
    ///
    /// When `source` is the newest node its slot is reclaimed, so a subtree
    /// built only to be grafted leaves no orphan behind.
    pub fn graft(&mut self, target: NodeId, source: NodeId) {
        let newest = source.index() + 1 == self.nodes.len();
        let kind = if newest && source != target && source != self.root {
            match self.nodes.pop() {
                Some(node) => node.kind,
                None => return,
            }
        } else {
            self.replace(source, NodeKind::Pass)
        };
        self.replace(target, kind);
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = span;
    }

    /// Number of allocated nodes, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Top-level statements of the module.
    pub fn body(&self) -> &[NodeId] {
        match self.kind(self.root) {
            NodeKind::Module { body } => body,
            _ => &[],
        }
    }

    /// Copy the subtree under `id` into fresh nodes; spans are preserved.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        pyl_stack::ensure_sufficient_stack(|| {
            let mut kind = self.kind(id).clone();
            kind.map_children(|child| self.deep_copy(child));
            let span = self.span(id);
            self.alloc(kind, span)
        })
    }

    /// Every node reachable from `id`, parents before children.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            let children = self.kind(next).children();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// `true` if any node under `id` (inclusive) satisfies `pred`.
    pub fn any(&self, id: NodeId, mut pred: impl FnMut(&NodeKind) -> bool) -> bool {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let kind = self.kind(next);
            if pred(kind) {
                return true;
            }
            stack.extend(kind.children());
        }
        false
    }

    /// Give every reachable synthesized node its parent's span.
    ///
    /// After this runs no reachable node carries [`Span::DUMMY`], so a
    /// diagnostic on any node can be resolved to a source line.
    pub fn fix_positions(&mut self) {
        if self.span(self.root).is_dummy() {
            self.set_span(self.root, Span::new(0, 0));
        }
        let mut stack = vec![self.root];
        while let Some(parent) = stack.pop() {
            let parent_span = self.span(parent);
            for child in self.kind(parent).children() {
                if self.span(child).is_dummy() {
                    self.set_span(child, parent_span);
                }
                stack.push(child);
            }
        }
    }

    /// Shorthand for a synthesized node.
    pub fn synth(&mut self, kind: NodeKind) -> NodeId {
        self.alloc(kind, Span::DUMMY)
    }
}

#[cfg(test)]
mod tests;
