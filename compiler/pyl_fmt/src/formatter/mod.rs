//! Statement layout.
//!
//! Statements go to an [`Emitter`] one line at a time; expressions are
//! rendered to strings first (see `expr`) since a line is only emitted
//! once it is complete.

mod expr;
mod fstring;

use pyl_ir::{Alias, NodeId, NodeKind, Tree, WithItem};

use crate::emitter::Emitter;
use crate::precedence::Precedence;
use crate::INDENT_WIDTH;

pub use expr::render_expr;

/// Serializes statements of one tree.
pub struct Formatter<'t, E: Emitter> {
    tree: &'t Tree,
    emitter: E,
    indent: usize,
}

impl<'t, E: Emitter> Formatter<'t, E> {
    pub fn new(tree: &'t Tree, emitter: E) -> Self {
        Formatter {
            tree,
            emitter,
            indent: 0,
        }
    }

    pub fn finish(self) -> E {
        self.emitter
    }

    /// Module body: top-level definitions are set off by a blank line.
    pub fn module(&mut self, body: &[NodeId]) {
        for (i, &stmt) in body.iter().enumerate() {
            let is_def = self.is_definition(stmt);
            if i > 0 && (is_def || self.is_definition(body[i - 1])) {
                self.emitter.emit_newline();
            }
            self.statement(stmt);
        }
    }

    fn is_definition(&self, id: NodeId) -> bool {
        matches!(
            self.tree.kind(id),
            NodeKind::FunctionDef { .. } | NodeKind::ClassDef { .. }
        )
    }

    fn expr(&self, id: NodeId, prec: Precedence) -> String {
        render_expr(self.tree, id, prec)
    }

    fn line(&mut self, text: &str) {
        self.emitter.emit_indent(self.indent * INDENT_WIDTH);
        self.emitter.emit(text);
        self.emitter.emit_newline();
    }

    fn block(&mut self, body: &[NodeId]) {
        self.indent += 1;
        if body.is_empty() {
            self.line("pass");
        }
        for &stmt in body {
            self.statement(stmt);
        }
        self.indent -= 1;
    }

    fn header_and_block(&mut self, header: &str, body: &[NodeId]) {
        self.line(header);
        self.block(body);
    }

    /// `else:` block, if any.
    fn orelse(&mut self, orelse: &[NodeId]) {
        if !orelse.is_empty() {
            self.header_and_block("else:", orelse);
        }
    }

    fn decorators(&mut self, decorators: &[NodeId]) {
        for &decorator in decorators {
            let text = format!("@{}", self.expr(decorator, Precedence::NamedExpr));
            self.line(&text);
        }
    }

    pub fn statement(&mut self, id: NodeId) {
        pyl_stack::ensure_sufficient_stack(|| self.statement_inner(id));
    }

    #[allow(clippy::too_many_lines, reason = "one arm per statement kind")]
    fn statement_inner(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::Module { body } => self.module(body),
            NodeKind::FunctionDef {
                name,
                params,
                body,
                decorators,
                returns,
                is_async,
            } => {
                self.decorators(decorators);
                let mut header = String::new();
                if *is_async {
                    header.push_str("async ");
                }
                header.push_str("def ");
                header.push_str(name);
                header.push('(');
                header.push_str(&expr::render_params(tree, params));
                header.push(')');
                if let Some(returns) = returns {
                    header.push_str(" -> ");
                    header.push_str(&self.expr(*returns, Precedence::Test));
                }
                header.push(':');
                self.header_and_block(&header, body);
            }
            NodeKind::ClassDef {
                name,
                bases,
                keywords,
                body,
                decorators,
            } => {
                self.decorators(decorators);
                let args = expr::render_arguments(tree, bases, keywords);
                let header = if args.is_empty() {
                    format!("class {name}:")
                } else {
                    format!("class {name}({args}):")
                };
                self.header_and_block(&header, body);
            }
            NodeKind::Return { value } => match value {
                Some(value) => {
                    let text = format!("return {}", self.expr(*value, Precedence::Tuple));
                    self.line(&text);
                }
                None => self.line("return"),
            },
            NodeKind::Delete { targets } => {
                let targets: Vec<String> = targets.iter().map(|&t| self.expr(t, Precedence::BitOr)).collect();
                self.line(&format!("del {}", targets.join(", ")));
            }
            NodeKind::Assign { targets, value } => {
                let mut text = String::new();
                for &target in targets {
                    text.push_str(&self.expr(target, Precedence::Tuple));
                    text.push_str(" = ");
                }
                text.push_str(&self.expr(*value, Precedence::Tuple));
                self.line(&text);
            }
            NodeKind::AugAssign { target, op, value } => {
                let text = format!(
                    "{} {}= {}",
                    self.expr(*target, Precedence::BitOr),
                    op.symbol(),
                    self.expr(*value, Precedence::Tuple)
                );
                self.line(&text);
            }
            NodeKind::AnnAssign {
                target,
                annotation,
                value,
                simple,
            } => {
                let mut text = self.expr(*target, Precedence::BitOr);
                if !simple && matches!(tree.kind(*target), NodeKind::Name { .. }) {
                    text = format!("({text})");
                }
                text.push_str(": ");
                text.push_str(&self.expr(*annotation, Precedence::Test));
                if let Some(value) = value {
                    text.push_str(" = ");
                    text.push_str(&self.expr(*value, Precedence::Tuple));
                }
                self.line(&text);
            }
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            } => {
                let header = format!(
                    "{}for {} in {}:",
                    if *is_async { "async " } else { "" },
                    self.expr(*target, Precedence::Tuple),
                    self.expr(*iter, Precedence::Tuple)
                );
                self.header_and_block(&header, body);
                self.orelse(orelse);
            }
            NodeKind::While { test, body, orelse } => {
                let header = format!("while {}:", self.expr(*test, Precedence::NamedExpr.next()));
                self.header_and_block(&header, body);
                self.orelse(orelse);
            }
            NodeKind::If { .. } => self.if_chain(id, "if"),
            NodeKind::With { items, body, is_async } => {
                let items = self.with_items(items);
                let header = format!("{}with {items}:", if *is_async { "async " } else { "" });
                self.header_and_block(&header, body);
            }
            NodeKind::Raise { exc, cause } => {
                let mut text = "raise".to_owned();
                if let Some(exc) = exc {
                    text.push(' ');
                    text.push_str(&self.expr(*exc, Precedence::Test));
                    if let Some(cause) = cause {
                        text.push_str(" from ");
                        text.push_str(&self.expr(*cause, Precedence::Test));
                    }
                }
                self.line(&text);
            }
            NodeKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                self.header_and_block("try:", body);
                for &handler in handlers {
                    self.statement(handler);
                }
                self.orelse(orelse);
                if !finalbody.is_empty() {
                    self.header_and_block("finally:", finalbody);
                }
            }
            NodeKind::ExceptHandler { typ, name, body } => {
                let mut header = "except".to_owned();
                if let Some(typ) = typ {
                    header.push(' ');
                    header.push_str(&self.expr(*typ, Precedence::Test));
                    if let Some(name) = name {
                        header.push_str(" as ");
                        header.push_str(name);
                    }
                }
                header.push(':');
                self.header_and_block(&header, body);
            }
            NodeKind::Assert { test, msg } => {
                let mut text = format!("assert {}", self.expr(*test, Precedence::Test));
                if let Some(msg) = msg {
                    text.push_str(", ");
                    text.push_str(&self.expr(*msg, Precedence::Test));
                }
                self.line(&text);
            }
            NodeKind::Import { names } => self.line(&format!("import {}", aliases(names))),
            NodeKind::ImportFrom { module, names, level } => {
                let dots = ".".repeat(usize::try_from(*level).unwrap_or(0));
                let text = format!(
                    "from {dots}{} import {}",
                    module.as_deref().unwrap_or(""),
                    aliases(names)
                );
                self.line(&text);
            }
            NodeKind::Global { names } => self.line(&format!("global {}", names.join(", "))),
            NodeKind::Nonlocal { names } => self.line(&format!("nonlocal {}", names.join(", "))),
            NodeKind::Expr { value } => {
                let text = self.expr(*value, Precedence::Tuple);
                self.line(&text);
            }
            NodeKind::Pass => self.line("pass"),
            NodeKind::Break => self.line("break"),
            NodeKind::Continue => self.line("continue"),
            _ => {
                // A bare expression in statement position.
                let text = self.expr(id, Precedence::Tuple);
                self.line(&text);
            }
        }
    }

    /// `if`/`elif`/`else`; an `else` holding exactly one `if` becomes `elif`.
    fn if_chain(&mut self, id: NodeId, keyword: &str) {
        let tree = self.tree;
        let NodeKind::If { test, body, orelse } = tree.kind(id) else {
            return;
        };
        let header = format!("{keyword} {}:", self.expr(*test, Precedence::NamedExpr.next()));
        self.header_and_block(&header, body);
        match orelse.as_slice() {
            [only] if matches!(tree.kind(*only), NodeKind::If { .. }) => self.if_chain(*only, "elif"),
            _ => self.orelse(orelse),
        }
    }

    fn with_items(&self, items: &[WithItem]) -> String {
        let rendered: Vec<String> = items
            .iter()
            .map(|item| {
                let context = self.expr(item.context, Precedence::Test);
                match item.vars {
                    Some(vars) => format!("{context} as {}", self.expr(vars, Precedence::BitOr)),
                    None => context,
                }
            })
            .collect();
        let text = rendered.join(", ");
        // `with (a, b):` would read back as two items.
        match items {
            [WithItem { context, vars: None }]
                if matches!(self.tree.kind(*context), NodeKind::Tuple { elts, .. } if !elts.is_empty()) =>
            {
                format!("({text})")
            }
            _ => text,
        }
    }
}

fn aliases(names: &[Alias]) -> String {
    names
        .iter()
        .map(|alias| match &alias.asname {
            Some(asname) => format!("{} as {asname}", alias.name),
            None => alias.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests;
