//! Syntax tree for the pylang optimizer.
//!
//! - [`Span`]: byte ranges into the unit's original text
//! - [`Tree`]: arena of [`Node`]s addressed by [`NodeId`]
//! - [`NodeKind`]: one closed variant per syntactic form
//! - [`Transformer`] / [`Rewrite`]: rewriting traversal where a visit can
//!   keep, replace, splice or delete the visited node
//! - [`scope`]: which names a scope binds, reads and shares with nested scopes
//!
//! Passes mutate a tree in place. Nodes are never shared between trees;
//! duplicating a subtree goes through [`Tree::deep_copy`].

mod literal;
mod node;
pub mod scope;
mod span;
mod transform;
mod tree;

pub use literal::{bytes_repr, float_repr, str_repr, Literal};
pub use node::{
    Alias, BoolOperator, CmpOperator, Comprehension, ExprContext, FStringPart, Keyword, NodeId,
    NodeKind, Operator, Param, Params, UnaryOperator, WithItem,
};
pub use span::Span;
pub use transform::{transform, walk_children, Rewrite, Transformer};
pub use tree::{Node, Tree};
