//! Node kinds of the syntax tree.
//!
//! Every syntactic form is one [`NodeKind`] variant; children are
//! [`NodeId`] handles into the owning [`crate::Tree`]. Helper structs
//! (parameters, keywords, aliases) carry no identity of their own.

use std::fmt;

use smallvec::SmallVec;

use crate::literal::Literal;

/// Handle of a node inside its [`crate::Tree`] arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Binary arithmetic and bitwise operators.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

impl Operator {
    pub const fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mult => "*",
            Operator::MatMult => "@",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "**",
            Operator::LShift => "<<",
            Operator::RShift => ">>",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::BitAnd => "&",
            Operator::FloorDiv => "//",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UnaryOperator {
    Invert,
    Not,
    UAdd,
    USub,
}

impl UnaryOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Invert => "~",
            UnaryOperator::Not => "not ",
            UnaryOperator::UAdd => "+",
            UnaryOperator::USub => "-",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BoolOperator {
    And,
    Or,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CmpOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOperator {
    pub const fn symbol(self) -> &'static str {
        match self {
            CmpOperator::Eq => "==",
            CmpOperator::NotEq => "!=",
            CmpOperator::Lt => "<",
            CmpOperator::LtE => "<=",
            CmpOperator::Gt => ">",
            CmpOperator::GtE => ">=",
            CmpOperator::Is => "is",
            CmpOperator::IsNot => "is not",
            CmpOperator::In => "in",
            CmpOperator::NotIn => "not in",
        }
    }
}

/// Whether a name, attribute or subscript is read, written or deleted.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ExprContext {
    Load,
    Store,
    Del,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<NodeId>,
    pub default: Option<NodeId>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            annotation: None,
            default: None,
        }
    }
}

/// A full parameter list: `a, /, b=1, *args, c, **kw`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    pub posonly: Vec<Param>,
    pub args: Vec<Param>,
    pub vararg: Option<Param>,
    pub kwonly: Vec<Param>,
    pub kwarg: Option<Param>,
}

impl Params {
    /// Every parameter in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.posonly
            .iter()
            .chain(&self.args)
            .chain(&self.vararg)
            .chain(&self.kwonly)
            .chain(&self.kwarg)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Param> {
        self.posonly
            .iter_mut()
            .chain(&mut self.args)
            .chain(&mut self.vararg)
            .chain(&mut self.kwonly)
            .chain(&mut self.kwarg)
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// `name=value` in a call or class header; `arg` is `None` for `**value`.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: NodeId,
}

/// `name as asname` in an import.
#[derive(Clone, Debug, PartialEq)]
pub struct Alias {
    pub name: String,
    pub asname: Option<String>,
}

impl Alias {
    /// The local name an import binds.
    pub fn bound_name(&self) -> &str {
        match &self.asname {
            Some(asname) => asname,
            None => self.name.split('.').next().unwrap_or(&self.name),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WithItem {
    pub context: NodeId,
    pub vars: Option<NodeId>,
}

/// One `for target in iter if cond` clause of a comprehension.
#[derive(Clone, Debug, PartialEq)]
pub struct Comprehension {
    pub target: NodeId,
    pub iter: NodeId,
    pub ifs: Vec<NodeId>,
    pub is_async: bool,
}

/// Piece of an f-string.
#[derive(Clone, Debug, PartialEq)]
pub enum FStringPart {
    Text(String),
    Field {
        value: NodeId,
        conversion: Option<char>,
        spec: Vec<FStringPart>,
    },
}

/// All syntactic forms, statements and expressions alike.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Module {
        body: Vec<NodeId>,
    },

    // Statements
    FunctionDef {
        name: String,
        params: Params,
        body: Vec<NodeId>,
        decorators: Vec<NodeId>,
        returns: Option<NodeId>,
        is_async: bool,
    },
    ClassDef {
        name: String,
        bases: Vec<NodeId>,
        keywords: Vec<Keyword>,
        body: Vec<NodeId>,
        decorators: Vec<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    Delete {
        targets: Vec<NodeId>,
    },
    Assign {
        targets: Vec<NodeId>,
        value: NodeId,
    },
    AugAssign {
        target: NodeId,
        op: Operator,
        value: NodeId,
    },
    AnnAssign {
        target: NodeId,
        annotation: NodeId,
        value: Option<NodeId>,
        /// `true` when the target is a plain name not wrapped in parentheses.
        simple: bool,
    },
    For {
        target: NodeId,
        iter: NodeId,
        body: Vec<NodeId>,
        orelse: Vec<NodeId>,
        is_async: bool,
    },
    While {
        test: NodeId,
        body: Vec<NodeId>,
        orelse: Vec<NodeId>,
    },
    If {
        test: NodeId,
        body: Vec<NodeId>,
        orelse: Vec<NodeId>,
    },
    With {
        items: Vec<WithItem>,
        body: Vec<NodeId>,
        is_async: bool,
    },
    Raise {
        exc: Option<NodeId>,
        cause: Option<NodeId>,
    },
    Try {
        body: Vec<NodeId>,
        handlers: Vec<NodeId>,
        orelse: Vec<NodeId>,
        finalbody: Vec<NodeId>,
    },
    ExceptHandler {
        typ: Option<NodeId>,
        name: Option<String>,
        body: Vec<NodeId>,
    },
    Assert {
        test: NodeId,
        msg: Option<NodeId>,
    },
    Import {
        names: Vec<Alias>,
    },
    ImportFrom {
        module: Option<String>,
        names: Vec<Alias>,
        level: u32,
    },
    Global {
        names: Vec<String>,
    },
    Nonlocal {
        names: Vec<String>,
    },
    Expr {
        value: NodeId,
    },
    Pass,
    Break,
    Continue,

    // Expressions
    BoolOp {
        op: BoolOperator,
        values: Vec<NodeId>,
    },
    NamedExpr {
        target: NodeId,
        value: NodeId,
    },
    BinOp {
        left: NodeId,
        op: Operator,
        right: NodeId,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: NodeId,
    },
    Lambda {
        params: Params,
        body: NodeId,
    },
    IfExp {
        test: NodeId,
        body: NodeId,
        orelse: NodeId,
    },
    /// `keys[i]` is `None` for a `**mapping` entry.
    Dict {
        keys: Vec<Option<NodeId>>,
        values: Vec<NodeId>,
    },
    Set {
        elts: Vec<NodeId>,
    },
    ListComp {
        elt: NodeId,
        generators: Vec<Comprehension>,
    },
    SetComp {
        elt: NodeId,
        generators: Vec<Comprehension>,
    },
    DictComp {
        key: NodeId,
        value: NodeId,
        generators: Vec<Comprehension>,
    },
    GeneratorExp {
        elt: NodeId,
        generators: Vec<Comprehension>,
    },
    Await {
        value: NodeId,
    },
    Yield {
        value: Option<NodeId>,
    },
    YieldFrom {
        value: NodeId,
    },
    Compare {
        left: NodeId,
        ops: Vec<CmpOperator>,
        comparators: Vec<NodeId>,
    },
    Call {
        func: NodeId,
        args: Vec<NodeId>,
        keywords: Vec<Keyword>,
    },
    FormattedString {
        parts: Vec<FStringPart>,
    },
    Constant(Literal),
    Attribute {
        value: NodeId,
        attr: String,
        ctx: ExprContext,
    },
    Subscript {
        value: NodeId,
        slice: NodeId,
        ctx: ExprContext,
    },
    Starred {
        value: NodeId,
        ctx: ExprContext,
    },
    Name {
        id: String,
        ctx: ExprContext,
    },
    List {
        elts: Vec<NodeId>,
        ctx: ExprContext,
    },
    Tuple {
        elts: Vec<NodeId>,
        ctx: ExprContext,
    },
    Slice {
        lower: Option<NodeId>,
        upper: Option<NodeId>,
        step: Option<NodeId>,
    },
}

impl NodeKind {
    pub fn name(id: impl Into<String>, ctx: ExprContext) -> Self {
        NodeKind::Name { id: id.into(), ctx }
    }

    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDef { .. }
                | NodeKind::ClassDef { .. }
                | NodeKind::Return { .. }
                | NodeKind::Delete { .. }
                | NodeKind::Assign { .. }
                | NodeKind::AugAssign { .. }
                | NodeKind::AnnAssign { .. }
                | NodeKind::For { .. }
                | NodeKind::While { .. }
                | NodeKind::If { .. }
                | NodeKind::With { .. }
                | NodeKind::Raise { .. }
                | NodeKind::Try { .. }
                | NodeKind::Assert { .. }
                | NodeKind::Import { .. }
                | NodeKind::ImportFrom { .. }
                | NodeKind::Global { .. }
                | NodeKind::Nonlocal { .. }
                | NodeKind::Expr { .. }
                | NodeKind::Pass
                | NodeKind::Break
                | NodeKind::Continue
        )
    }

    /// `true` for nodes that open a new name scope.
    pub fn is_scope(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDef { .. }
                | NodeKind::ClassDef { .. }
                | NodeKind::Lambda { .. }
                | NodeKind::ListComp { .. }
                | NodeKind::SetComp { .. }
                | NodeKind::DictComp { .. }
                | NodeKind::GeneratorExp { .. }
        )
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            NodeKind::Constant(lit) => Some(lit),
            _ => None,
        }
    }

    /// Statement lists owned by this node, in source order.
    pub fn blocks(&self) -> SmallVec<[&Vec<NodeId>; 4]> {
        let mut out = SmallVec::new();
        match self {
            NodeKind::Module { body }
            | NodeKind::FunctionDef { body, .. }
            | NodeKind::ClassDef { body, .. }
            | NodeKind::With { body, .. }
            | NodeKind::ExceptHandler { body, .. } => out.push(body),
            NodeKind::For { body, orelse, .. }
            | NodeKind::While { body, orelse, .. }
            | NodeKind::If { body, orelse, .. } => {
                out.push(body);
                out.push(orelse);
            }
            NodeKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                out.push(body);
                out.push(handlers);
                out.push(orelse);
                out.push(finalbody);
            }
            _ => {}
        }
        out
    }

    /// Mutable counterpart of [`NodeKind::blocks`], handler lists excluded.
    pub fn statement_blocks_mut(&mut self) -> SmallVec<[&mut Vec<NodeId>; 4]> {
        let mut out = SmallVec::new();
        match self {
            NodeKind::Module { body }
            | NodeKind::FunctionDef { body, .. }
            | NodeKind::ClassDef { body, .. }
            | NodeKind::With { body, .. }
            | NodeKind::ExceptHandler { body, .. } => out.push(body),
            NodeKind::For { body, orelse, .. }
            | NodeKind::While { body, orelse, .. }
            | NodeKind::If { body, orelse, .. } => {
                out.push(body);
                out.push(orelse);
            }
            NodeKind::Try {
                body,
                orelse,
                finalbody,
                ..
            } => {
                out.push(body);
                out.push(orelse);
                out.push(finalbody);
            }
            _ => {}
        }
        out
    }

    /// Every direct child, in evaluation order.
    pub fn children(&self) -> SmallVec<[NodeId; 4]> {
        let mut out = SmallVec::new();
        self.for_each_child(|id| out.push(id));
        out
    }

    /// Call `f` on every direct child, in evaluation order.
    pub fn for_each_child(&self, mut f: impl FnMut(NodeId)) {
        fn params(p: &Params, f: &mut impl FnMut(NodeId)) {
            for param in p.iter() {
                if let Some(default) = param.default {
                    f(default);
                }
            }
            for param in p.iter() {
                if let Some(annotation) = param.annotation {
                    f(annotation);
                }
            }
        }
        fn generators(gens: &[Comprehension], f: &mut impl FnMut(NodeId)) {
            for g in gens {
                f(g.iter);
                f(g.target);
                g.ifs.iter().copied().for_each(&mut *f);
            }
        }
        fn fstring(parts: &[FStringPart], f: &mut impl FnMut(NodeId)) {
            for part in parts {
                if let FStringPart::Field { value, spec, .. } = part {
                    f(*value);
                    fstring(spec, f);
                }
            }
        }
        let f = &mut f;
        match self {
            NodeKind::Module { body } => body.iter().copied().for_each(f),
            NodeKind::FunctionDef {
                params: p,
                body,
                decorators,
                returns,
                ..
            } => {
                decorators.iter().copied().for_each(&mut *f);
                params(p, f);
                returns.iter().copied().for_each(&mut *f);
                body.iter().copied().for_each(f);
            }
            NodeKind::ClassDef {
                bases,
                keywords,
                body,
                decorators,
                ..
            } => {
                decorators.iter().copied().for_each(&mut *f);
                bases.iter().copied().for_each(&mut *f);
                keywords.iter().for_each(|k| f(k.value));
                body.iter().copied().for_each(f);
            }
            NodeKind::Return { value } | NodeKind::Yield { value } => {
                value.iter().copied().for_each(f);
            }
            NodeKind::Delete { targets } => targets.iter().copied().for_each(f),
            NodeKind::Assign { targets, value } => {
                f(*value);
                targets.iter().copied().for_each(f);
            }
            NodeKind::AugAssign { target, value, .. } => {
                f(*target);
                f(*value);
            }
            NodeKind::AnnAssign {
                target,
                annotation,
                value,
                ..
            } => {
                value.iter().copied().for_each(&mut *f);
                f(*annotation);
                f(*target);
            }
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                f(*iter);
                f(*target);
                body.iter().chain(orelse).copied().for_each(f);
            }
            NodeKind::While { test, body, orelse } | NodeKind::If { test, body, orelse } => {
                f(*test);
                body.iter().chain(orelse).copied().for_each(f);
            }
            NodeKind::With { items, body, .. } => {
                for item in items {
                    f(item.context);
                    item.vars.iter().copied().for_each(&mut *f);
                }
                body.iter().copied().for_each(f);
            }
            NodeKind::Raise { exc, cause } => {
                exc.iter().chain(cause).copied().for_each(f);
            }
            NodeKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => body
                .iter()
                .chain(handlers)
                .chain(orelse)
                .chain(finalbody)
                .copied()
                .for_each(f),
            NodeKind::ExceptHandler { typ, body, .. } => {
                typ.iter().copied().for_each(&mut *f);
                body.iter().copied().for_each(f);
            }
            NodeKind::Assert { test, msg } => {
                f(*test);
                msg.iter().copied().for_each(f);
            }
            NodeKind::Import { .. }
            | NodeKind::ImportFrom { .. }
            | NodeKind::Global { .. }
            | NodeKind::Nonlocal { .. }
            | NodeKind::Pass
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Constant(_)
            | NodeKind::Name { .. } => {}
            NodeKind::Expr { value }
            | NodeKind::Await { value }
            | NodeKind::YieldFrom { value }
            | NodeKind::Attribute { value, .. }
            | NodeKind::Starred { value, .. } => f(*value),
            NodeKind::BoolOp { values, .. } => values.iter().copied().for_each(f),
            NodeKind::NamedExpr { target, value } => {
                f(*value);
                f(*target);
            }
            NodeKind::BinOp { left, right, .. } => {
                f(*left);
                f(*right);
            }
            NodeKind::UnaryOp { operand, .. } => f(*operand),
            NodeKind::Lambda { params: p, body } => {
                params(p, f);
                f(*body);
            }
            NodeKind::IfExp { test, body, orelse } => {
                f(*test);
                f(*body);
                f(*orelse);
            }
            NodeKind::Dict { keys, values } => {
                for (key, value) in keys.iter().zip(values) {
                    key.iter().copied().for_each(&mut *f);
                    f(*value);
                }
            }
            NodeKind::Set { elts } | NodeKind::List { elts, .. } | NodeKind::Tuple { elts, .. } => {
                elts.iter().copied().for_each(f);
            }
            NodeKind::ListComp { elt, generators: g }
            | NodeKind::SetComp { elt, generators: g }
            | NodeKind::GeneratorExp { elt, generators: g } => {
                generators(g, f);
                f(*elt);
            }
            NodeKind::DictComp {
                key,
                value,
                generators: g,
            } => {
                generators(g, f);
                f(*key);
                f(*value);
            }
            NodeKind::Compare {
                left, comparators, ..
            } => {
                f(*left);
                comparators.iter().copied().for_each(f);
            }
            NodeKind::Call {
                func,
                args,
                keywords,
            } => {
                f(*func);
                args.iter().copied().for_each(&mut *f);
                keywords.iter().for_each(|k| f(k.value));
            }
            NodeKind::FormattedString { parts } => fstring(parts, f),
            NodeKind::Subscript { value, slice, .. } => {
                f(*value);
                f(*slice);
            }
            NodeKind::Slice { lower, upper, step } => {
                lower.iter().chain(upper).chain(step).copied().for_each(f);
            }
        }
    }

    /// Rewrite every child handle in place.
    pub fn map_children(&mut self, mut f: impl FnMut(NodeId) -> NodeId) {
        fn params(p: &mut Params, f: &mut impl FnMut(NodeId) -> NodeId) {
            for param in p.iter_mut() {
                if let Some(default) = &mut param.default {
                    *default = f(*default);
                }
                if let Some(annotation) = &mut param.annotation {
                    *annotation = f(*annotation);
                }
            }
        }
        fn generators(gens: &mut [Comprehension], f: &mut impl FnMut(NodeId) -> NodeId) {
            for g in gens {
                g.iter = f(g.iter);
                g.target = f(g.target);
                list(&mut g.ifs, f);
            }
        }
        fn fstring(parts: &mut [FStringPart], f: &mut impl FnMut(NodeId) -> NodeId) {
            for part in parts {
                if let FStringPart::Field { value, spec, .. } = part {
                    *value = f(*value);
                    fstring(spec, f);
                }
            }
        }
        fn list(ids: &mut [NodeId], f: &mut impl FnMut(NodeId) -> NodeId) {
            for id in ids {
                *id = f(*id);
            }
        }
        fn opt(id: &mut Option<NodeId>, f: &mut impl FnMut(NodeId) -> NodeId) {
            if let Some(id) = id {
                *id = f(*id);
            }
        }
        let f = &mut f;
        match self {
            NodeKind::Module { body } => list(body, f),
            NodeKind::FunctionDef {
                params: p,
                body,
                decorators,
                returns,
                ..
            } => {
                list(decorators, f);
                params(p, f);
                opt(returns, f);
                list(body, f);
            }
            NodeKind::ClassDef {
                bases,
                keywords,
                body,
                decorators,
                ..
            } => {
                list(decorators, f);
                list(bases, f);
                for k in keywords {
                    k.value = f(k.value);
                }
                list(body, f);
            }
            NodeKind::Return { value } | NodeKind::Yield { value } => opt(value, f),
            NodeKind::Delete { targets } => list(targets, f),
            NodeKind::Assign { targets, value } => {
                *value = f(*value);
                list(targets, f);
            }
            NodeKind::AugAssign { target, value, .. } => {
                *target = f(*target);
                *value = f(*value);
            }
            NodeKind::AnnAssign {
                target,
                annotation,
                value,
                ..
            } => {
                opt(value, f);
                *annotation = f(*annotation);
                *target = f(*target);
            }
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
                ..
            } => {
                *iter = f(*iter);
                *target = f(*target);
                list(body, f);
                list(orelse, f);
            }
            NodeKind::While { test, body, orelse } | NodeKind::If { test, body, orelse } => {
                *test = f(*test);
                list(body, f);
                list(orelse, f);
            }
            NodeKind::With { items, body, .. } => {
                for item in items {
                    item.context = f(item.context);
                    opt(&mut item.vars, f);
                }
                list(body, f);
            }
            NodeKind::Raise { exc, cause } => {
                opt(exc, f);
                opt(cause, f);
            }
            NodeKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                list(body, f);
                list(handlers, f);
                list(orelse, f);
                list(finalbody, f);
            }
            NodeKind::ExceptHandler { typ, body, .. } => {
                opt(typ, f);
                list(body, f);
            }
            NodeKind::Assert { test, msg } => {
                *test = f(*test);
                opt(msg, f);
            }
            NodeKind::Import { .. }
            | NodeKind::ImportFrom { .. }
            | NodeKind::Global { .. }
            | NodeKind::Nonlocal { .. }
            | NodeKind::Pass
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Constant(_)
            | NodeKind::Name { .. } => {}
            NodeKind::Expr { value }
            | NodeKind::Await { value }
            | NodeKind::YieldFrom { value }
            | NodeKind::Attribute { value, .. }
            | NodeKind::Starred { value, .. }
            | NodeKind::UnaryOp { operand: value, .. } => *value = f(*value),
            NodeKind::BoolOp { values, .. } => list(values, f),
            NodeKind::NamedExpr { target, value } => {
                *value = f(*value);
                *target = f(*target);
            }
            NodeKind::BinOp { left, right, .. } => {
                *left = f(*left);
                *right = f(*right);
            }
            NodeKind::Lambda { params: p, body } => {
                params(p, f);
                *body = f(*body);
            }
            NodeKind::IfExp { test, body, orelse } => {
                *test = f(*test);
                *body = f(*body);
                *orelse = f(*orelse);
            }
            NodeKind::Dict { keys, values } => {
                for key in keys.iter_mut() {
                    opt(key, f);
                }
                list(values, f);
            }
            NodeKind::Set { elts } | NodeKind::List { elts, .. } | NodeKind::Tuple { elts, .. } => {
                list(elts, f);
            }
            NodeKind::ListComp { elt, generators: g }
            | NodeKind::SetComp { elt, generators: g }
            | NodeKind::GeneratorExp { elt, generators: g } => {
                generators(g, f);
                *elt = f(*elt);
            }
            NodeKind::DictComp {
                key,
                value,
                generators: g,
            } => {
                generators(g, f);
                *key = f(*key);
                *value = f(*value);
            }
            NodeKind::Compare {
                left, comparators, ..
            } => {
                *left = f(*left);
                list(comparators, f);
            }
            NodeKind::Call {
                func,
                args,
                keywords,
            } => {
                *func = f(*func);
                list(args, f);
                for k in keywords {
                    k.value = f(k.value);
                }
            }
            NodeKind::FormattedString { parts } => fstring(parts, f),
            NodeKind::Subscript { value, slice, .. } => {
                *value = f(*value);
                *slice = f(*slice);
            }
            NodeKind::Slice { lower, upper, step } => {
                opt(lower, f);
                opt(upper, f);
                opt(step, f);
            }
        }
    }
}
