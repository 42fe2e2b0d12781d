//! Solver errors
//!
//! The taxonomy distinguishes unification failures (two terms cannot be
//! made equal), resolution failures (an operator was asked for a concrete
//! value it cannot produce), and constraint violations. Domain errors from
//! concrete shape operations bubble up unchanged.

use caliper_ast::error::ShapeError;
use caliper_ast::expr::{Expr, SubjectTo, Var};
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SolveError {
    #[error("Unification fail: {0} ~ {1} cannot proceed")]
    UnificationFail(Expr, Expr),

    #[error(
        "Unification fail: {a} ~ {b} cannot proceed as they do not contain \
         the same amount of sub-expressions; {a} has {na} sub-expression(s) \
         while {b} has {nb}"
    )]
    SubExprMismatch {
        a: Expr,
        b: Expr,
        na: usize,
        nb: usize,
    },

    #[error("Occurs check: {var} occurs in {expr}; binding it would build an infinite expression")]
    OccursCheck { var: Var, expr: Expr },

    #[error("Cannot resolve {0} to a concrete value: free variables remain")]
    Unresolvable(Expr),

    #[error("Cannot compare {a} {op} {b}")]
    BadComparison { op: &'static str, a: Expr, b: Expr },

    #[error("SubjectTo {0} resolved to false. Cannot continue")]
    ConstraintViolated(SubjectTo),

    #[error("{0} is not an arrow expression; only arrows can be applied")]
    NotAnArrow(Expr),

    #[error("Failed to solve [{{{lhs} = {rhs}}}] | {fresh}: {source}")]
    FailedToSolve {
        lhs: Expr,
        rhs: Expr,
        fresh: Var,
        source: Box<SolveError>,
    },

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

pub type SolveResult<T> = Result<T, SolveError>;
