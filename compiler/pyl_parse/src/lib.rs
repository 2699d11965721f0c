//! Recursive-descent parser producing a [`pyl_ir::Tree`].
//!
//! The grammar follows the input language's reference grammar closely
//! enough that every accepted program keeps its meaning. Forms the
//! optimizer cannot represent (`match`, `except*`, type parameter lists)
//! are rejected with a [`ParseError`], which makes the caller leave the
//! unit untouched.

mod cursor;
mod error;
mod grammar;

use pyl_ir::{NodeId, NodeKind, Span, Tree};

use cursor::Cursor;
pub use error::ParseError;

/// Parse a whole unit.
pub fn parse(source: &str) -> Result<Tree, ParseError> {
    let tokens = pyl_lexer::lex(source)?;
    let mut parser = Parser::new(tokens, Tree::new());
    let body = parser.module()?;
    let root = parser.tree.root();
    parser.tree.replace(root, NodeKind::Module { body });
    parser.tree.set_span(root, Span::from_range(0..source.len()));
    Ok(parser.tree)
}

/// Parse `source` as a single expression and add it to `tree`.
///
/// Spans of the new nodes are relative to `source`.
pub fn parse_expression_into(tree: &mut Tree, source: &str) -> Result<NodeId, ParseError> {
    let tokens = pyl_lexer::lex(source)?;
    let mut parser = Parser::new(tokens, std::mem::take(tree));
    let result = parser.standalone_expression();
    *tree = parser.tree;
    result
}

/// Parse `source` as a statement list and add it to `tree`, returning
/// the new top-level statements.
pub fn parse_statements_into(tree: &mut Tree, source: &str) -> Result<Vec<NodeId>, ParseError> {
    let tokens = pyl_lexer::lex(source)?;
    let mut parser = Parser::new(tokens, std::mem::take(tree));
    let result = parser.module();
    *tree = parser.tree;
    result
}

pub(crate) struct Parser {
    cursor: Cursor,
    tree: Tree,
}

impl Parser {
    fn new(tokens: Vec<pyl_lexer::Token>, tree: Tree) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            tree,
        }
    }

    /// Span of the current token.
    fn here(&self) -> Span {
        self.cursor.current_span()
    }

    /// Allocate a node spanning from `start` to the last consumed token.
    fn finish(&mut self, kind: NodeKind, start: Span) -> NodeId {
        let end = self.cursor.prev_span();
        self.tree.alloc(kind, Span::new(start.start, end.end.max(start.start)))
    }

    /// Allocate a compound statement ending where its last block ends.
    fn finish_compound(&mut self, kind: NodeKind, start: Span) -> NodeId {
        let end = kind
            .blocks()
            .iter()
            .rev()
            .find_map(|block| block.last())
            .map_or(start.end, |&last| self.tree.span(last).end);
        self.tree.alloc(kind, Span::new(start.start, end.max(start.start)))
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.here())
    }
}

#[cfg(test)]
mod tests;
