//! Operators of the shape algebra
//!
//! Four small closed sums: arithmetic over sizes, comparisons and logical
//! connectives for `SubjectTo` predicates, and the unary shape operators.

use serde::{Deserialize, Serialize};

/// Binary arithmetic operators over sizelikes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOpKind {
    Add, // +
    Sub, // -
    Mul, // ×
    Div, // ÷ (integer division, truncating)
}

/// Comparison operators for predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Eq,  // =
    Ne,  // ≠
    Lt,  // <
    Lte, // ≤
    Gt,  // >
    Gte, // ≥
    Bc,  // ⚟ (broadcastable)
}

/// Logical connectives for predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOp {
    And, // ∧
    Or,  // ∨
}

/// Unary shape operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOpKind {
    /// D — dimensionality of a shape
    Dims,
    /// Π — product of dimensions
    Prod,
    /// Σ — sum of dimensions
    Sum,
    /// ∀ — element-wise comparison mode
    ForAll,
    /// K — opaque constant tag; never reduces
    Const,
}

impl BinOpKind {
    /// Unicode glyph for this operator
    pub fn glyph(&self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "×",
            BinOpKind::Div => "÷",
        }
    }

    /// ASCII fallback accepted by the lexer
    pub fn ascii(&self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
        }
    }
}

impl CmpOp {
    pub fn glyph(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "≠",
            CmpOp::Lt => "<",
            CmpOp::Lte => "≤",
            CmpOp::Gt => ">",
            CmpOp::Gte => "≥",
            CmpOp::Bc => "⚟",
        }
    }

    pub fn ascii(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Lte => "<=",
            CmpOp::Gt => ">",
            CmpOp::Gte => ">=",
            CmpOp::Bc => "⚟",
        }
    }

    /// Compare two concrete sizes under this operator.
    ///
    /// `Bc` is not an integer comparison; callers handle it separately.
    pub fn eval_ints(&self, a: usize, b: usize) -> Option<bool> {
        match self {
            CmpOp::Eq => Some(a == b),
            CmpOp::Ne => Some(a != b),
            CmpOp::Lt => Some(a < b),
            CmpOp::Lte => Some(a <= b),
            CmpOp::Gt => Some(a > b),
            CmpOp::Gte => Some(a >= b),
            CmpOp::Bc => None,
        }
    }
}

impl LogicOp {
    pub fn glyph(&self) -> &'static str {
        match self {
            LogicOp::And => "∧",
            LogicOp::Or => "∨",
        }
    }

    pub fn ascii(&self) -> &'static str {
        match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
        }
    }
}

impl UnaryOpKind {
    pub fn glyph(&self) -> &'static str {
        match self {
            UnaryOpKind::Dims => "D",
            UnaryOpKind::Prod => "Π",
            UnaryOpKind::Sum => "Σ",
            UnaryOpKind::ForAll => "∀",
            UnaryOpKind::Const => "K",
        }
    }

    pub fn ascii(&self) -> &'static str {
        match self {
            UnaryOpKind::Dims => "D",
            UnaryOpKind::Prod => "P",
            UnaryOpKind::Sum => "S",
            UnaryOpKind::ForAll => "∀",
            UnaryOpKind::Const => "K",
        }
    }
}
