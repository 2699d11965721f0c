//! Grammar productions, split by statement, expression and f-string.

mod expr;
mod fstring;
mod stmt;

use pyl_ir::{ExprContext, NodeId, NodeKind};

use crate::{ParseError, Parser};

impl Parser {
    /// Mark `id` (and any nested tuple/list/starred elements) as a target.
    pub(crate) fn set_ctx(&mut self, id: NodeId, new_ctx: ExprContext) -> Result<(), ParseError> {
        let mut nested = Vec::new();
        match self.tree.kind_mut(id) {
            NodeKind::Name { ctx, .. } | NodeKind::Attribute { ctx, .. } | NodeKind::Subscript { ctx, .. } => {
                *ctx = new_ctx;
            }
            NodeKind::Starred { value, ctx } => {
                *ctx = new_ctx;
                nested.push(*value);
            }
            NodeKind::Tuple { elts, ctx } | NodeKind::List { elts, ctx } => {
                *ctx = new_ctx;
                nested.extend(elts.iter().copied());
            }
            _ => {
                let verb = if new_ctx == ExprContext::Del { "delete" } else { "assign to" };
                return Err(ParseError::new(format!("cannot {verb} expression"), self.tree.span(id)));
            }
        }
        for child in nested {
            self.set_ctx(child, new_ctx)?;
        }
        Ok(())
    }
}
