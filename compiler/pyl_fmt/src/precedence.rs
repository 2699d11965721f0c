//! Operator precedence, lowest first, used to decide where parentheses
//! are required.

use pyl_ir::{BoolOperator, Literal, NodeKind, Operator, UnaryOperator};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    NamedExpr,
    Tuple,
    Yield,
    Test,
    Or,
    And,
    Not,
    Cmp,
    BitOr,
    BitXor,
    BitAnd,
    Shift,
    Arith,
    Term,
    Factor,
    Power,
    Await,
    Atom,
}

impl Precedence {
    /// The next tighter level.
    pub fn next(self) -> Self {
        use Precedence::{
            And, Arith, Atom, Await, BitAnd, BitOr, BitXor, Cmp, Factor, NamedExpr, Not, Or, Power, Shift, Term,
            Test, Tuple, Yield,
        };
        match self {
            NamedExpr => Tuple,
            Tuple => Yield,
            Yield => Test,
            Test => Or,
            Or => And,
            And => Not,
            Not => Cmp,
            Cmp => BitOr,
            BitOr => BitXor,
            BitXor => BitAnd,
            BitAnd => Shift,
            Shift => Arith,
            Arith => Term,
            Term => Factor,
            Factor => Power,
            Power => Await,
            Await | Atom => Atom,
        }
    }

    pub fn of_binary(op: Operator) -> Self {
        match op {
            Operator::BitOr => Precedence::BitOr,
            Operator::BitXor => Precedence::BitXor,
            Operator::BitAnd => Precedence::BitAnd,
            Operator::LShift | Operator::RShift => Precedence::Shift,
            Operator::Add | Operator::Sub => Precedence::Arith,
            Operator::Mult | Operator::MatMult | Operator::Div | Operator::Mod | Operator::FloorDiv => {
                Precedence::Term
            }
            Operator::Pow => Precedence::Power,
        }
    }

    /// Binding strength of an expression node as written.
    pub fn of(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::NamedExpr { .. } => Precedence::NamedExpr,
            NodeKind::Tuple { elts, .. } if !elts.is_empty() => Precedence::Tuple,
            NodeKind::Yield { .. } | NodeKind::YieldFrom { .. } => Precedence::Yield,
            NodeKind::Lambda { .. } | NodeKind::IfExp { .. } => Precedence::Test,
            NodeKind::BoolOp {
                op: BoolOperator::Or, ..
            } => Precedence::Or,
            NodeKind::BoolOp {
                op: BoolOperator::And, ..
            } => Precedence::And,
            NodeKind::UnaryOp {
                op: UnaryOperator::Not,
                ..
            } => Precedence::Not,
            NodeKind::Compare { .. } => Precedence::Cmp,
            NodeKind::BinOp { op, .. } => Precedence::of_binary(*op),
            NodeKind::UnaryOp { .. } => Precedence::Factor,
            NodeKind::Await { .. } => Precedence::Await,
            NodeKind::Constant(literal) if is_negative(literal) => Precedence::Factor,
            _ => Precedence::Atom,
        }
    }
}

/// Literals whose spelling starts with a minus sign.
fn is_negative(literal: &Literal) -> bool {
    match literal {
        Literal::Int(v) => *v < 0,
        Literal::LongInt(text) => text.starts_with('-'),
        Literal::Float(v) | Literal::Imaginary(v) => v.is_sign_negative(),
        _ => false,
    }
}

#[cfg(test)]
mod tests;
