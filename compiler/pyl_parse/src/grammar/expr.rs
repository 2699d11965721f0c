//! Expressions, from lowest to highest precedence.

use pyl_ir::{
    BoolOperator, CmpOperator, Comprehension, ExprContext, FStringPart, Keyword, Literal, NodeId, NodeKind,
    Operator, UnaryOperator,
};
use pyl_lexer::{decode_bytes, decode_str, TokenKind};

use crate::{ParseError, Parser};

impl Parser {
    /// A complete expression list followed by end of input.
    pub(crate) fn standalone_expression(&mut self) -> Result<NodeId, ParseError> {
        while self.cursor.eat(&TokenKind::Newline) {}
        let expr = self.star_expressions()?;
        self.cursor.eat(&TokenKind::Newline);
        if !self.cursor.check(&TokenKind::Eof) {
            return Err(self.cursor.unexpected("end of expression"));
        }
        Ok(expr)
    }

    /// Whether the current token can begin an expression.
    fn starts_expression(&self) -> bool {
        matches!(
            self.cursor.current(),
            TokenKind::Name(_)
                | TokenKind::Int(_)
                | TokenKind::LongInt(_)
                | TokenKind::Float(_)
                | TokenKind::Imaginary(_)
                | TokenKind::Str(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::None
                | TokenKind::Ellipsis
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::Tilde
                | TokenKind::Not
                | TokenKind::Lambda
                | TokenKind::Await
                | TokenKind::Star
        )
    }

    /// `a, *b, c` as a tuple, or a single expression without a comma.
    pub(crate) fn star_expressions(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        let first = self.star_expression()?;
        if !self.cursor.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            elts.push(self.star_expression()?);
        }
        Ok(self.finish(
            NodeKind::Tuple {
                elts,
                ctx: ExprContext::Load,
            },
            start,
        ))
    }

    fn star_expression(&mut self) -> Result<NodeId, ParseError> {
        if self.cursor.check(&TokenKind::Star) {
            let start = self.cursor.advance();
            let value = self.bitwise_or()?;
            return Ok(self.finish(
                NodeKind::Starred {
                    value,
                    ctx: ExprContext::Load,
                },
                start,
            ));
        }
        self.named_expression()
    }

    /// A single assignment target, possibly starred.
    pub(crate) fn star_target(&mut self) -> Result<NodeId, ParseError> {
        if self.cursor.check(&TokenKind::Star) {
            let start = self.cursor.advance();
            let value = self.bitwise_or()?;
            return Ok(self.finish(
                NodeKind::Starred {
                    value,
                    ctx: ExprContext::Load,
                },
                start,
            ));
        }
        self.bitwise_or()
    }

    /// Targets of `for` and comprehension clauses; stops before `in`.
    pub(crate) fn target_list(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        let first = self.star_target()?;
        if !self.cursor.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            if self.cursor.check(&TokenKind::In) {
                break;
            }
            elts.push(self.star_target()?);
        }
        Ok(self.finish(
            NodeKind::Tuple {
                elts,
                ctx: ExprContext::Load,
            },
            start,
        ))
    }

    pub(crate) fn named_expression(&mut self) -> Result<NodeId, ParseError> {
        if let (TokenKind::Name(name), TokenKind::ColonEq) = (self.cursor.current(), self.cursor.peek(1)) {
            let name = name.clone();
            let start = self.cursor.advance();
            let target = self.tree.alloc(NodeKind::name(name, ExprContext::Store), start);
            self.cursor.advance();
            let value = self.expression()?;
            return Ok(self.finish(NodeKind::NamedExpr { target, value }, start));
        }
        self.expression()
    }

    pub(crate) fn expression(&mut self) -> Result<NodeId, ParseError> {
        pyl_stack::ensure_sufficient_stack(|| {
            if self.cursor.check(&TokenKind::Lambda) {
                return self.lambda();
            }
            let start = self.here();
            let body = self.disjunction()?;
            if !self.cursor.eat(&TokenKind::If) {
                return Ok(body);
            }
            let test = self.disjunction()?;
            self.cursor.expect(&TokenKind::Else, "`else`")?;
            let orelse = self.expression()?;
            Ok(self.finish(NodeKind::IfExp { test, body, orelse }, start))
        })
    }

    fn lambda(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance();
        let params = self.parameters(false, &TokenKind::Colon)?;
        self.cursor.expect(&TokenKind::Colon, "`:`")?;
        let body = self.expression()?;
        Ok(self.finish(NodeKind::Lambda { params, body }, start))
    }

    fn disjunction(&mut self) -> Result<NodeId, ParseError> {
        self.bool_chain(&TokenKind::Or, BoolOperator::Or, Self::conjunction)
    }

    fn conjunction(&mut self) -> Result<NodeId, ParseError> {
        self.bool_chain(&TokenKind::And, BoolOperator::And, Self::inversion)
    }

    fn bool_chain(
        &mut self,
        token: &TokenKind,
        op: BoolOperator,
        next: fn(&mut Self) -> Result<NodeId, ParseError>,
    ) -> Result<NodeId, ParseError> {
        let start = self.here();
        let first = next(self)?;
        if !self.cursor.check(token) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.cursor.eat(token) {
            values.push(next(self)?);
        }
        Ok(self.finish(NodeKind::BoolOp { op, values }, start))
    }

    fn inversion(&mut self) -> Result<NodeId, ParseError> {
        if self.cursor.check(&TokenKind::Not) {
            let start = self.cursor.advance();
            let operand = self.inversion()?;
            return Ok(self.finish(
                NodeKind::UnaryOp {
                    op: UnaryOperator::Not,
                    operand,
                },
                start,
            ));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        let left = self.bitwise_or()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        loop {
            let op = match (self.cursor.current(), self.cursor.peek(1)) {
                (TokenKind::EqEq, _) => CmpOperator::Eq,
                (TokenKind::NotEq, _) => CmpOperator::NotEq,
                (TokenKind::Lt, _) => CmpOperator::Lt,
                (TokenKind::LtE, _) => CmpOperator::LtE,
                (TokenKind::Gt, _) => CmpOperator::Gt,
                (TokenKind::GtE, _) => CmpOperator::GtE,
                (TokenKind::In, _) => CmpOperator::In,
                (TokenKind::Not, TokenKind::In) => {
                    self.cursor.advance();
                    CmpOperator::NotIn
                }
                (TokenKind::Is, TokenKind::Not) => {
                    self.cursor.advance();
                    CmpOperator::IsNot
                }
                (TokenKind::Is, _) => CmpOperator::Is,
                _ => break,
            };
            self.cursor.advance();
            ops.push(op);
            comparators.push(self.bitwise_or()?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(self.finish(
            NodeKind::Compare {
                left,
                ops,
                comparators,
            },
            start,
        ))
    }

    fn binary_level(
        &mut self,
        ops: &[(TokenKind, Operator)],
        next: fn(&mut Self) -> Result<NodeId, ParseError>,
    ) -> Result<NodeId, ParseError> {
        let start = self.here();
        let mut left = next(self)?;
        while let Some(op) = ops
            .iter()
            .find(|(token, _)| self.cursor.check(token))
            .map(|&(_, op)| op)
        {
            self.cursor.advance();
            let right = next(self)?;
            left = self.finish(NodeKind::BinOp { left, op, right }, start);
        }
        Ok(left)
    }

    pub(crate) fn bitwise_or(&mut self) -> Result<NodeId, ParseError> {
        self.binary_level(&[(TokenKind::Pipe, Operator::BitOr)], Self::bitwise_xor)
    }

    fn bitwise_xor(&mut self) -> Result<NodeId, ParseError> {
        self.binary_level(&[(TokenKind::Caret, Operator::BitXor)], Self::bitwise_and)
    }

    fn bitwise_and(&mut self) -> Result<NodeId, ParseError> {
        self.binary_level(&[(TokenKind::Amp, Operator::BitAnd)], Self::shift_expr)
    }

    fn shift_expr(&mut self) -> Result<NodeId, ParseError> {
        self.binary_level(
            &[(TokenKind::LShift, Operator::LShift), (TokenKind::RShift, Operator::RShift)],
            Self::sum,
        )
    }

    fn sum(&mut self) -> Result<NodeId, ParseError> {
        self.binary_level(
            &[(TokenKind::Plus, Operator::Add), (TokenKind::Minus, Operator::Sub)],
            Self::term,
        )
    }

    fn term(&mut self) -> Result<NodeId, ParseError> {
        self.binary_level(
            &[
                (TokenKind::Star, Operator::Mult),
                (TokenKind::Slash, Operator::Div),
                (TokenKind::DoubleSlash, Operator::FloorDiv),
                (TokenKind::Percent, Operator::Mod),
                (TokenKind::At, Operator::MatMult),
            ],
            Self::factor,
        )
    }

    fn factor(&mut self) -> Result<NodeId, ParseError> {
        pyl_stack::ensure_sufficient_stack(|| {
            let op = match self.cursor.current() {
                TokenKind::Plus => UnaryOperator::UAdd,
                TokenKind::Minus => UnaryOperator::USub,
                TokenKind::Tilde => UnaryOperator::Invert,
                _ => return self.power(),
            };
            let start = self.cursor.advance();
            let operand = self.factor()?;
            Ok(self.finish(NodeKind::UnaryOp { op, operand }, start))
        })
    }

    fn power(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        let base = self.await_primary()?;
        if !self.cursor.eat(&TokenKind::DoubleStar) {
            return Ok(base);
        }
        let exponent = self.factor()?;
        Ok(self.finish(
            NodeKind::BinOp {
                left: base,
                op: Operator::Pow,
                right: exponent,
            },
            start,
        ))
    }

    fn await_primary(&mut self) -> Result<NodeId, ParseError> {
        if self.cursor.check(&TokenKind::Await) {
            let start = self.cursor.advance();
            let value = self.primary()?;
            return Ok(self.finish(NodeKind::Await { value }, start));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        let mut expr = self.atom()?;
        loop {
            if self.cursor.eat(&TokenKind::Dot) {
                let attr = self.cursor.expect_name()?.0;
                expr = self.finish(
                    NodeKind::Attribute {
                        value: expr,
                        attr,
                        ctx: ExprContext::Load,
                    },
                    start,
                );
            } else if self.cursor.eat(&TokenKind::LParen) {
                let (args, keywords) = self.call_arguments()?;
                self.cursor.expect(&TokenKind::RParen, "`)`")?;
                expr = self.finish(
                    NodeKind::Call {
                        func: expr,
                        args,
                        keywords,
                    },
                    start,
                );
            } else if self.cursor.eat(&TokenKind::LBracket) {
                let slice = self.slices()?;
                self.cursor.expect(&TokenKind::RBracket, "`]`")?;
                expr = self.finish(
                    NodeKind::Subscript {
                        value: expr,
                        slice,
                        ctx: ExprContext::Load,
                    },
                    start,
                );
            } else {
                return Ok(expr);
            }
        }
    }

    /// Arguments after `(`, up to (not including) `)`.
    pub(crate) fn call_arguments(&mut self) -> Result<(Vec<NodeId>, Vec<Keyword>), ParseError> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let start = self.here();
            if self.cursor.eat(&TokenKind::Star) {
                let value = self.expression()?;
                args.push(self.finish(
                    NodeKind::Starred {
                        value,
                        ctx: ExprContext::Load,
                    },
                    start,
                ));
            } else if self.cursor.eat(&TokenKind::DoubleStar) {
                let value = self.expression()?;
                keywords.push(Keyword { arg: None, value });
            } else if let (TokenKind::Name(name), TokenKind::Eq) = (self.cursor.current(), self.cursor.peek(1)) {
                let arg = Some(name.clone());
                self.cursor.advance();
                self.cursor.advance();
                let value = self.expression()?;
                keywords.push(Keyword { arg, value });
            } else {
                let value = self.named_expression()?;
                if self.at_comprehension() {
                    let generators = self.generators()?;
                    args.push(self.finish(NodeKind::GeneratorExp { elt: value, generators }, start));
                } else {
                    args.push(value);
                }
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok((args, keywords))
    }

    fn slices(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        let first = self.slice_item()?;
        if !self.cursor.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            if self.cursor.check(&TokenKind::RBracket) {
                break;
            }
            elts.push(self.slice_item()?);
        }
        Ok(self.finish(
            NodeKind::Tuple {
                elts,
                ctx: ExprContext::Load,
            },
            start,
        ))
    }

    fn slice_bound_ends(&self) -> bool {
        matches!(
            self.cursor.current(),
            TokenKind::Colon | TokenKind::RBracket | TokenKind::Comma
        )
    }

    fn slice_item(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        let lower = if self.cursor.check(&TokenKind::Colon) {
            None
        } else {
            let expr = self.star_expression()?;
            if !self.cursor.check(&TokenKind::Colon) {
                return Ok(expr);
            }
            Some(expr)
        };
        self.cursor.expect(&TokenKind::Colon, "`:`")?;
        let upper = if self.slice_bound_ends() {
            None
        } else {
            Some(self.expression()?)
        };
        let step = if self.cursor.eat(&TokenKind::Colon) && !self.slice_bound_ends() {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(self.finish(NodeKind::Slice { lower, upper, step }, start))
    }

    fn at_comprehension(&self) -> bool {
        match self.cursor.current() {
            TokenKind::For => true,
            TokenKind::Async => matches!(self.cursor.peek(1), TokenKind::For),
            _ => false,
        }
    }

    fn generators(&mut self) -> Result<Vec<Comprehension>, ParseError> {
        let mut generators = Vec::new();
        while self.at_comprehension() {
            let is_async = self.cursor.eat(&TokenKind::Async);
            self.cursor.advance();
            let target = self.target_list()?;
            self.set_ctx(target, ExprContext::Store)?;
            self.cursor.expect(&TokenKind::In, "`in`")?;
            let iter = self.disjunction()?;
            let mut ifs = Vec::new();
            while self.cursor.eat(&TokenKind::If) {
                ifs.push(self.disjunction()?);
            }
            generators.push(Comprehension {
                target,
                iter,
                ifs,
                is_async,
            });
        }
        Ok(generators)
    }

    pub(crate) fn yield_expr(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance();
        if self.cursor.eat(&TokenKind::From) {
            let value = self.expression()?;
            return Ok(self.finish(NodeKind::YieldFrom { value }, start));
        }
        let value = if self.starts_expression() {
            Some(self.star_expressions()?)
        } else {
            None
        };
        Ok(self.finish(NodeKind::Yield { value }, start))
    }

    fn constant(&mut self, literal: Literal) -> NodeId {
        let span = self.cursor.advance();
        self.tree.alloc(NodeKind::Constant(literal), span)
    }

    fn atom(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        match self.cursor.current() {
            TokenKind::Name(name) => {
                let name = name.clone();
                self.cursor.advance();
                Ok(self.tree.alloc(NodeKind::name(name, ExprContext::Load), start))
            }
            TokenKind::True => Ok(self.constant(Literal::Bool(true))),
            TokenKind::False => Ok(self.constant(Literal::Bool(false))),
            TokenKind::None => Ok(self.constant(Literal::None)),
            TokenKind::Ellipsis => Ok(self.constant(Literal::Ellipsis)),
            TokenKind::Int(v) => {
                let v = *v;
                Ok(self.constant(Literal::Int(v)))
            }
            TokenKind::LongInt(text) => {
                let text = text.clone();
                Ok(self.constant(Literal::LongInt(text)))
            }
            TokenKind::Float(v) => {
                let v = *v;
                Ok(self.constant(Literal::Float(v)))
            }
            TokenKind::Imaginary(v) => {
                let v = *v;
                Ok(self.constant(Literal::Imaginary(v)))
            }
            TokenKind::Str(_) => self.strings(),
            TokenKind::LParen => self.parenthesized(),
            TokenKind::LBracket => self.list_display(),
            TokenKind::LBrace => self.brace_display(),
            _ => Err(self.cursor.unexpected("an expression")),
        }
    }

    fn parenthesized(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance();
        if self.cursor.eat(&TokenKind::RParen) {
            return Ok(self.finish(
                NodeKind::Tuple {
                    elts: Vec::new(),
                    ctx: ExprContext::Load,
                },
                start,
            ));
        }
        if self.cursor.check(&TokenKind::Yield) {
            let value = self.yield_expr()?;
            self.cursor.expect(&TokenKind::RParen, "`)`")?;
            return Ok(value);
        }
        let first = self.star_expression()?;
        if self.at_comprehension() {
            let generators = self.generators()?;
            self.cursor.expect(&TokenKind::RParen, "`)`")?;
            return Ok(self.finish(NodeKind::GeneratorExp { elt: first, generators }, start));
        }
        if !self.cursor.check(&TokenKind::Comma) {
            self.cursor.expect(&TokenKind::RParen, "`)`")?;
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.cursor.eat(&TokenKind::Comma) {
            if self.cursor.check(&TokenKind::RParen) {
                break;
            }
            elts.push(self.star_expression()?);
        }
        self.cursor.expect(&TokenKind::RParen, "`)`")?;
        Ok(self.finish(
            NodeKind::Tuple {
                elts,
                ctx: ExprContext::Load,
            },
            start,
        ))
    }

    fn list_display(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance();
        let mut elts = Vec::new();
        if !self.cursor.check(&TokenKind::RBracket) {
            let first = self.star_expression()?;
            if self.at_comprehension() {
                let generators = self.generators()?;
                self.cursor.expect(&TokenKind::RBracket, "`]`")?;
                return Ok(self.finish(NodeKind::ListComp { elt: first, generators }, start));
            }
            elts.push(first);
            while self.cursor.eat(&TokenKind::Comma) {
                if self.cursor.check(&TokenKind::RBracket) {
                    break;
                }
                elts.push(self.star_expression()?);
            }
        }
        self.cursor.expect(&TokenKind::RBracket, "`]`")?;
        Ok(self.finish(
            NodeKind::List {
                elts,
                ctx: ExprContext::Load,
            },
            start,
        ))
    }

    fn brace_display(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance();
        if self.cursor.eat(&TokenKind::RBrace) {
            return Ok(self.finish(
                NodeKind::Dict {
                    keys: Vec::new(),
                    values: Vec::new(),
                },
                start,
            ));
        }

        let (first_key, first_value) = if self.cursor.eat(&TokenKind::DoubleStar) {
            (None, Some(self.bitwise_or()?))
        } else {
            let first = self.star_expression()?;
            if self.cursor.eat(&TokenKind::Colon) {
                (Some(first), Some(self.expression()?))
            } else {
                (Some(first), None)
            }
        };

        match (first_key, first_value) {
            (key, Some(value)) => {
                if let (Some(key), true) = (key, self.at_comprehension()) {
                    let generators = self.generators()?;
                    self.cursor.expect(&TokenKind::RBrace, "`}`")?;
                    return Ok(self.finish(NodeKind::DictComp { key, value, generators }, start));
                }
                let mut keys = vec![key];
                let mut values = vec![value];
                while self.cursor.eat(&TokenKind::Comma) {
                    if self.cursor.check(&TokenKind::RBrace) {
                        break;
                    }
                    if self.cursor.eat(&TokenKind::DoubleStar) {
                        keys.push(None);
                        values.push(self.bitwise_or()?);
                    } else {
                        keys.push(Some(self.expression()?));
                        self.cursor.expect(&TokenKind::Colon, "`:`")?;
                        values.push(self.expression()?);
                    }
                }
                self.cursor.expect(&TokenKind::RBrace, "`}`")?;
                Ok(self.finish(NodeKind::Dict { keys, values }, start))
            }
            (Some(first), None) => {
                if self.at_comprehension() {
                    let generators = self.generators()?;
                    self.cursor.expect(&TokenKind::RBrace, "`}`")?;
                    return Ok(self.finish(NodeKind::SetComp { elt: first, generators }, start));
                }
                let mut elts = vec![first];
                while self.cursor.eat(&TokenKind::Comma) {
                    if self.cursor.check(&TokenKind::RBrace) {
                        break;
                    }
                    elts.push(self.star_expression()?);
                }
                self.cursor.expect(&TokenKind::RBrace, "`}`")?;
                Ok(self.finish(NodeKind::Set { elts }, start))
            }
            (None, None) => Err(self.error("expected a dictionary entry")),
        }
    }

    /// Adjacent string literals, concatenated.
    fn strings(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        let mut pieces = Vec::new();
        while let TokenKind::Str(token) = self.cursor.current() {
            let token = token.clone();
            let span = self.cursor.advance();
            pieces.push((token, span));
        }

        let bytes = pieces.iter().filter(|(t, _)| t.bytes).count();
        if bytes != 0 && bytes != pieces.len() {
            return Err(ParseError::new("cannot mix bytes and nonbytes literals", start));
        }
        if bytes != 0 {
            let mut out = Vec::new();
            for (token, span) in &pieces {
                out.extend(decode_bytes(&token.body, token.raw, *span)?);
            }
            return Ok(self.finish(NodeKind::Constant(Literal::Bytes(out)), start));
        }

        if pieces.iter().any(|(t, _)| t.format) {
            let mut parts = Vec::new();
            for (token, span) in &pieces {
                let found = if token.format {
                    let base = token.body_start + self.cursor.offset();
                    self.fstring_parts(&token.body, token.raw, base)?
                } else {
                    vec![FStringPart::Text(decode_str(&token.body, token.raw, *span)?)]
                };
                for part in found {
                    push_part(&mut parts, part);
                }
            }
            return Ok(self.finish(NodeKind::FormattedString { parts }, start));
        }

        let mut text = String::new();
        for (token, span) in &pieces {
            text.push_str(&decode_str(&token.body, token.raw, *span)?);
        }
        Ok(self.finish(NodeKind::Constant(Literal::Str(text)), start))
    }
}

/// Append `part`, merging adjacent text.
pub(crate) fn push_part(parts: &mut Vec<FStringPart>, part: FStringPart) {
    if let (Some(FStringPart::Text(last)), FStringPart::Text(text)) = (parts.last_mut(), &part) {
        last.push_str(text);
        return;
    }
    if matches!(&part, FStringPart::Text(t) if t.is_empty()) {
        return;
    }
    parts.push(part);
}
