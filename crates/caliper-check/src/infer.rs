//! Application inference
//!
//! [`infer_app`] applies an arrow expression to an argument: it unifies
//! the argument against the arrow's domain, substitutes the resulting
//! bindings through the codomain, evaluates any refinement predicate, and
//! reduces whatever became ground. When the codomain is itself an arrow
//! the caller keeps applying — curried application.

use caliper_ast::expr::{Compound, Expr, Var};
use caliper_ast::shape::var_alphabet;

use crate::error::{SolveError, SolveResult};
use crate::reduce::reduce;
use crate::solve;
use crate::unify::unify;

/// Apply `expr` (an arrow, possibly refined) to `arg`, returning the
/// instantiated codomain.
pub fn infer_app(expr: &Expr, arg: &Expr) -> SolveResult<Expr> {
    let (arrow, retained) = match expr {
        Expr::Compound(c) => ((*c.expr).clone(), Some(c.subject_to.clone())),
        other => (other.clone(), None),
    };
    if !matches!(arrow, Expr::Arrow(_)) {
        return Err(SolveError::NotAnArrow(expr.clone()));
    }

    // solve  dom → cod ~ arg → ρ  for a fresh result variable ρ
    let fresh = fresh_var(&arrow, arg)?;
    let goal = Expr::arrow(arg.clone(), Expr::Var(fresh));
    let ss = unify(&arrow, &goal).map_err(|err| SolveError::FailedToSolve {
        lhs: arrow.clone(),
        rhs: goal.clone(),
        fresh,
        source: Box::new(err),
    })?;

    let ret = ss.apply(&Expr::Var(fresh));

    match retained {
        None => reduce(&ret),
        Some(st) => {
            let st = ss.apply_subject_to(&st);
            match solve::eval(&st)? {
                Some(false) => Err(SolveError::ConstraintViolated(st)),
                Some(true) => reduce(&ret),
                // still symbolic: carry the predicate forward
                None => Ok(Expr::Compound(Compound {
                    expr: Box::new(reduce(&ret)?),
                    subject_to: st,
                })),
            }
        }
    }
}

/// Pick a result variable that cannot collide: the alphabet position just
/// past the highest variable used by either side.
fn fresh_var(expr: &Expr, arg: &Expr) -> SolveResult<Var> {
    let mut used = expr.freevars();
    used.extend(arg.freevars());

    let mut last_used = None;
    for (i, c) in var_alphabet().enumerate() {
        if used.contains(&Var(c)) {
            last_used = Some(i);
        }
    }
    let next = match last_used {
        None => 0,
        Some(i) => i + 1,
    };
    var_alphabet().nth(next).map(Var).ok_or(SolveError::Shape(
        caliper_ast::error::ShapeError::AlphabetExhausted {
            wanted: next + 1,
            available: var_alphabet().count(),
        },
    ))
}
