//! Statements and blocks.

use pyl_ir::{Alias, ExprContext, NodeId, NodeKind, Operator, Param, Params, WithItem};
use pyl_lexer::TokenKind;

use crate::{ParseError, Parser};

impl Parser {
    /// Statements up to end of input.
    pub(crate) fn module(&mut self) -> Result<Vec<NodeId>, ParseError> {
        let mut body = Vec::new();
        loop {
            while self.cursor.eat(&TokenKind::Newline) {}
            if self.cursor.check(&TokenKind::Eof) {
                break;
            }
            if self.cursor.check(&TokenKind::Indent) {
                return Err(self.error("unexpected indent"));
            }
            self.statement(&mut body)?;
        }
        Ok(body)
    }

    fn statement(&mut self, out: &mut Vec<NodeId>) -> Result<(), ParseError> {
        pyl_stack::ensure_sufficient_stack(|| {
            let start = self.here();
            let stmt = match self.cursor.current() {
                TokenKind::If => self.if_stmt()?,
                TokenKind::While => self.while_stmt()?,
                TokenKind::For => self.for_stmt(start, false)?,
                TokenKind::Try => self.try_stmt()?,
                TokenKind::With => self.with_stmt(start, false)?,
                TokenKind::Def => self.function_def(Vec::new(), start, false)?,
                TokenKind::Class => self.class_def(Vec::new(), start)?,
                TokenKind::At => self.decorated()?,
                TokenKind::Async => {
                    self.cursor.advance();
                    match self.cursor.current() {
                        TokenKind::For => self.for_stmt(start, true)?,
                        TokenKind::With => self.with_stmt(start, true)?,
                        TokenKind::Def => self.function_def(Vec::new(), start, true)?,
                        _ => return Err(self.cursor.unexpected("`def`, `for` or `with` after `async`")),
                    }
                }
                _ => return self.simple_statements(out),
            };
            out.push(stmt);
            Ok(())
        })
    }

    /// `:` followed by an indented block or a same-line statement list.
    fn block(&mut self) -> Result<Vec<NodeId>, ParseError> {
        self.cursor.expect(&TokenKind::Colon, "`:`")?;
        let mut body = Vec::new();
        if self.cursor.eat(&TokenKind::Newline) {
            self.cursor.expect(&TokenKind::Indent, "an indented block")?;
            while !self.cursor.check(&TokenKind::Dedent) && !self.cursor.check(&TokenKind::Eof) {
                self.statement(&mut body)?;
            }
            self.cursor.eat(&TokenKind::Dedent);
        } else {
            self.simple_statements(&mut body)?;
        }
        Ok(body)
    }

    fn simple_statements(&mut self, out: &mut Vec<NodeId>) -> Result<(), ParseError> {
        loop {
            out.push(self.simple_statement()?);
            if !self.cursor.eat(&TokenKind::Semi) || self.at_statement_end() {
                break;
            }
        }
        if !self.cursor.eat(&TokenKind::Newline) && !self.cursor.check(&TokenKind::Eof) {
            return Err(self.cursor.unexpected("end of statement"));
        }
        Ok(())
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.cursor.current(),
            TokenKind::Newline | TokenKind::Semi | TokenKind::Eof
        )
    }

    fn simple_statement(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        match self.cursor.current() {
            TokenKind::Pass => {
                self.cursor.advance();
                Ok(self.finish(NodeKind::Pass, start))
            }
            TokenKind::Break => {
                self.cursor.advance();
                Ok(self.finish(NodeKind::Break, start))
            }
            TokenKind::Continue => {
                self.cursor.advance();
                Ok(self.finish(NodeKind::Continue, start))
            }
            TokenKind::Return => {
                self.cursor.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.star_expressions()?)
                };
                Ok(self.finish(NodeKind::Return { value }, start))
            }
            TokenKind::Raise => {
                self.cursor.advance();
                let mut exc = None;
                let mut cause = None;
                if !self.at_statement_end() {
                    exc = Some(self.expression()?);
                    if self.cursor.eat(&TokenKind::From) {
                        cause = Some(self.expression()?);
                    }
                }
                Ok(self.finish(NodeKind::Raise { exc, cause }, start))
            }
            TokenKind::Global | TokenKind::Nonlocal => {
                let is_global = self.cursor.check(&TokenKind::Global);
                self.cursor.advance();
                let mut names = vec![self.cursor.expect_name()?.0];
                while self.cursor.eat(&TokenKind::Comma) {
                    names.push(self.cursor.expect_name()?.0);
                }
                let kind = if is_global {
                    NodeKind::Global { names }
                } else {
                    NodeKind::Nonlocal { names }
                };
                Ok(self.finish(kind, start))
            }
            TokenKind::Del => {
                self.cursor.advance();
                let mut targets = Vec::new();
                loop {
                    let target = self.bitwise_or()?;
                    self.set_ctx(target, ExprContext::Del)?;
                    targets.push(target);
                    if !self.cursor.eat(&TokenKind::Comma) || self.at_statement_end() {
                        break;
                    }
                }
                Ok(self.finish(NodeKind::Delete { targets }, start))
            }
            TokenKind::Assert => {
                self.cursor.advance();
                let test = self.expression()?;
                let msg = if self.cursor.eat(&TokenKind::Comma) {
                    Some(self.expression()?)
                } else {
                    None
                };
                Ok(self.finish(NodeKind::Assert { test, msg }, start))
            }
            TokenKind::Import => self.import(),
            TokenKind::From => self.import_from(),
            _ => self.expression_statement(),
        }
    }

    fn expression_statement(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        let parenthesized = self.cursor.check(&TokenKind::LParen);
        let first = self.assignment_value()?;

        if self.cursor.eat(&TokenKind::Colon) {
            let annotation = self.expression()?;
            let value = if self.cursor.eat(&TokenKind::Eq) {
                Some(self.assignment_value()?)
            } else {
                None
            };
            let simple = !parenthesized && matches!(self.tree.kind(first), NodeKind::Name { .. });
            self.set_ctx(first, ExprContext::Store)?;
            return Ok(self.finish(
                NodeKind::AnnAssign {
                    target: first,
                    annotation,
                    value,
                    simple,
                },
                start,
            ));
        }

        if let Some(op) = augmented_operator(self.cursor.current()) {
            self.cursor.advance();
            if !matches!(
                self.tree.kind(first),
                NodeKind::Name { .. } | NodeKind::Attribute { .. } | NodeKind::Subscript { .. }
            ) {
                return Err(ParseError::new(
                    "illegal expression for augmented assignment",
                    self.tree.span(first),
                ));
            }
            self.set_ctx(first, ExprContext::Store)?;
            let value = self.assignment_value()?;
            return Ok(self.finish(
                NodeKind::AugAssign {
                    target: first,
                    op,
                    value,
                },
                start,
            ));
        }

        if self.cursor.check(&TokenKind::Eq) {
            let mut targets = vec![first];
            while self.cursor.eat(&TokenKind::Eq) {
                targets.push(self.assignment_value()?);
            }
            let value = targets.pop().unwrap_or(first);
            for &target in &targets {
                self.set_ctx(target, ExprContext::Store)?;
            }
            return Ok(self.finish(NodeKind::Assign { targets, value }, start));
        }

        Ok(self.finish(NodeKind::Expr { value: first }, start))
    }

    /// Right-hand side of an assignment: a yield or an expression list.
    fn assignment_value(&mut self) -> Result<NodeId, ParseError> {
        if self.cursor.check(&TokenKind::Yield) {
            self.yield_expr()
        } else {
            self.star_expressions()
        }
    }

    fn dotted_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.cursor.expect_name()?.0;
        while self.cursor.eat(&TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.cursor.expect_name()?.0);
        }
        Ok(name)
    }

    fn import(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance();
        let mut names = Vec::new();
        loop {
            let name = self.dotted_name()?;
            let asname = if self.cursor.eat(&TokenKind::As) {
                Some(self.cursor.expect_name()?.0)
            } else {
                None
            };
            names.push(Alias { name, asname });
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(self.finish(NodeKind::Import { names }, start))
    }

    fn import_from(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance();
        let mut level = 0;
        loop {
            if self.cursor.eat(&TokenKind::Dot) {
                level += 1;
            } else if self.cursor.eat(&TokenKind::Ellipsis) {
                level += 3;
            } else {
                break;
            }
        }
        let module = if matches!(self.cursor.current(), TokenKind::Name(_)) {
            Some(self.dotted_name()?)
        } else {
            None
        };
        if level == 0 && module.is_none() {
            return Err(self.cursor.unexpected("a module name"));
        }
        self.cursor.expect(&TokenKind::Import, "`import`")?;

        let mut names = Vec::new();
        if self.cursor.eat(&TokenKind::Star) {
            names.push(Alias {
                name: "*".to_owned(),
                asname: None,
            });
        } else {
            let parenthesized = self.cursor.eat(&TokenKind::LParen);
            loop {
                let name = self.cursor.expect_name()?.0;
                let asname = if self.cursor.eat(&TokenKind::As) {
                    Some(self.cursor.expect_name()?.0)
                } else {
                    None
                };
                names.push(Alias { name, asname });
                if !self.cursor.eat(&TokenKind::Comma) || (parenthesized && self.cursor.check(&TokenKind::RParen)) {
                    break;
                }
            }
            if parenthesized {
                self.cursor.expect(&TokenKind::RParen, "`)`")?;
            }
        }
        Ok(self.finish(NodeKind::ImportFrom { module, names, level }, start))
    }

    fn if_stmt(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance();
        let test = self.named_expression()?;
        let body = self.block()?;
        let orelse = if self.cursor.check(&TokenKind::Elif) {
            vec![self.if_stmt()?]
        } else if self.cursor.eat(&TokenKind::Else) {
            self.block()?
        } else {
            Vec::new()
        };
        Ok(self.finish_compound(NodeKind::If { test, body, orelse }, start))
    }

    fn while_stmt(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance();
        let test = self.named_expression()?;
        let body = self.block()?;
        let orelse = if self.cursor.eat(&TokenKind::Else) {
            self.block()?
        } else {
            Vec::new()
        };
        Ok(self.finish_compound(NodeKind::While { test, body, orelse }, start))
    }

    fn for_stmt(&mut self, start: pyl_ir::Span, is_async: bool) -> Result<NodeId, ParseError> {
        self.cursor.advance();
        let target = self.target_list()?;
        self.set_ctx(target, ExprContext::Store)?;
        self.cursor.expect(&TokenKind::In, "`in`")?;
        let iter = self.star_expressions()?;
        let body = self.block()?;
        let orelse = if self.cursor.eat(&TokenKind::Else) {
            self.block()?
        } else {
            Vec::new()
        };
        Ok(self.finish_compound(
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            },
            start,
        ))
    }

    fn try_stmt(&mut self) -> Result<NodeId, ParseError> {
        let start = self.cursor.advance();
        let body = self.block()?;
        let mut handlers = Vec::new();
        while self.cursor.check(&TokenKind::Except) {
            let handler_start = self.cursor.advance();
            if self.cursor.check(&TokenKind::Star) {
                return Err(self.error("`except*` is not supported"));
            }
            let typ = if self.cursor.check(&TokenKind::Colon) {
                None
            } else {
                Some(self.expression()?)
            };
            let name = if self.cursor.eat(&TokenKind::As) {
                Some(self.cursor.expect_name()?.0)
            } else {
                None
            };
            let handler_body = self.block()?;
            handlers.push(self.finish_compound(
                NodeKind::ExceptHandler {
                    typ,
                    name,
                    body: handler_body,
                },
                handler_start,
            ));
        }
        let orelse = if !handlers.is_empty() && self.cursor.eat(&TokenKind::Else) {
            self.block()?
        } else {
            Vec::new()
        };
        let finalbody = if self.cursor.eat(&TokenKind::Finally) {
            self.block()?
        } else {
            Vec::new()
        };
        if handlers.is_empty() && finalbody.is_empty() {
            return Err(self.cursor.unexpected("`except` or `finally`"));
        }
        Ok(self.finish_compound(
            NodeKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            },
            start,
        ))
    }

    /// `with (a as b, c):` groups its items in parentheses; tell that
    /// apart from a parenthesized context expression.
    fn parenthesized_with_items(&self) -> bool {
        let mut depth = 0usize;
        let mut n = 0;
        loop {
            match self.cursor.peek(n) {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return matches!(self.cursor.peek(n + 1), TokenKind::Colon);
                    }
                }
                TokenKind::Eof | TokenKind::Newline => return false,
                _ => {}
            }
            n += 1;
        }
    }

    fn with_item(&mut self) -> Result<WithItem, ParseError> {
        let context = self.expression()?;
        let vars = if self.cursor.eat(&TokenKind::As) {
            let target = self.star_target()?;
            self.set_ctx(target, ExprContext::Store)?;
            Some(target)
        } else {
            None
        };
        Ok(WithItem { context, vars })
    }

    fn with_stmt(&mut self, start: pyl_ir::Span, is_async: bool) -> Result<NodeId, ParseError> {
        self.cursor.advance();
        let mut items = Vec::new();
        if self.cursor.check(&TokenKind::LParen) && self.parenthesized_with_items() {
            self.cursor.advance();
            while !self.cursor.check(&TokenKind::RParen) {
                items.push(self.with_item()?);
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.cursor.expect(&TokenKind::RParen, "`)`")?;
        } else {
            loop {
                items.push(self.with_item()?);
                if !self.cursor.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        let body = self.block()?;
        Ok(self.finish_compound(NodeKind::With { items, body, is_async }, start))
    }

    fn decorated(&mut self) -> Result<NodeId, ParseError> {
        let start = self.here();
        let mut decorators = Vec::new();
        while self.cursor.eat(&TokenKind::At) {
            decorators.push(self.named_expression()?);
            self.cursor.expect(&TokenKind::Newline, "a newline after the decorator")?;
        }
        match self.cursor.current() {
            TokenKind::Def => self.function_def(decorators, start, false),
            TokenKind::Class => self.class_def(decorators, start),
            TokenKind::Async => {
                self.cursor.advance();
                if !self.cursor.check(&TokenKind::Def) {
                    return Err(self.cursor.unexpected("`def`"));
                }
                self.function_def(decorators, start, true)
            }
            _ => Err(self.cursor.unexpected("`def` or `class` after decorators")),
        }
    }

    fn function_def(
        &mut self,
        decorators: Vec<NodeId>,
        start: pyl_ir::Span,
        is_async: bool,
    ) -> Result<NodeId, ParseError> {
        self.cursor.advance();
        let name = self.cursor.expect_name()?.0;
        if self.cursor.check(&TokenKind::LBracket) {
            return Err(self.error("type parameter lists are not supported"));
        }
        self.cursor.expect(&TokenKind::LParen, "`(`")?;
        let params = self.parameters(true, &TokenKind::RParen)?;
        self.cursor.expect(&TokenKind::RParen, "`)`")?;
        let returns = if self.cursor.eat(&TokenKind::Arrow) {
            Some(self.expression()?)
        } else {
            None
        };
        let body = self.block()?;
        Ok(self.finish_compound(
            NodeKind::FunctionDef {
                name,
                params,
                body,
                decorators,
                returns,
                is_async,
            },
            start,
        ))
    }

    fn class_def(&mut self, decorators: Vec<NodeId>, start: pyl_ir::Span) -> Result<NodeId, ParseError> {
        self.cursor.advance();
        let name = self.cursor.expect_name()?.0;
        if self.cursor.check(&TokenKind::LBracket) {
            return Err(self.error("type parameter lists are not supported"));
        }
        let (bases, keywords) = if self.cursor.eat(&TokenKind::LParen) {
            let args = self.call_arguments()?;
            self.cursor.expect(&TokenKind::RParen, "`)`")?;
            args
        } else {
            (Vec::new(), Vec::new())
        };
        let body = self.block()?;
        Ok(self.finish_compound(
            NodeKind::ClassDef {
                name,
                bases,
                keywords,
                body,
                decorators,
            },
            start,
        ))
    }

    /// Parameter list up to (not including) `closing`. Annotations are
    /// only accepted for `def`.
    pub(crate) fn parameters(&mut self, annotated: bool, closing: &TokenKind) -> Result<Params, ParseError> {
        let mut params = Params::default();
        let mut after_star = false;
        loop {
            if self.cursor.check(closing) {
                break;
            }
            if self.cursor.eat(&TokenKind::Slash) {
                params.posonly = std::mem::take(&mut params.args);
            } else if self.cursor.eat(&TokenKind::DoubleStar) {
                params.kwarg = Some(self.parameter(annotated, false)?);
            } else if self.cursor.eat(&TokenKind::Star) {
                after_star = true;
                if !self.cursor.check(&TokenKind::Comma) && !self.cursor.check(closing) {
                    params.vararg = Some(self.parameter(annotated, false)?);
                }
            } else {
                let param = self.parameter(annotated, true)?;
                if after_star {
                    params.kwonly.push(param);
                } else {
                    params.args.push(param);
                }
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn parameter(&mut self, annotated: bool, with_default: bool) -> Result<Param, ParseError> {
        let mut param = Param::new(self.cursor.expect_name()?.0);
        if annotated && self.cursor.eat(&TokenKind::Colon) {
            param.annotation = Some(self.expression()?);
        }
        if with_default && self.cursor.eat(&TokenKind::Eq) {
            param.default = Some(self.expression()?);
        }
        Ok(param)
    }
}

fn augmented_operator(kind: &TokenKind) -> Option<Operator> {
    Some(match kind {
        TokenKind::PlusEq => Operator::Add,
        TokenKind::MinusEq => Operator::Sub,
        TokenKind::StarEq => Operator::Mult,
        TokenKind::AtEq => Operator::MatMult,
        TokenKind::SlashEq => Operator::Div,
        TokenKind::PercentEq => Operator::Mod,
        TokenKind::DoubleStarEq => Operator::Pow,
        TokenKind::LShiftEq => Operator::LShift,
        TokenKind::RShiftEq => Operator::RShift,
        TokenKind::PipeEq => Operator::BitOr,
        TokenKind::CaretEq => Operator::BitXor,
        TokenKind::AmpEq => Operator::BitAnd,
        TokenKind::DoubleSlashEq => Operator::FloorDiv,
        _ => return None,
    })
}
