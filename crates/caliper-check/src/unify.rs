//! Unification
//!
//! Produces a most-general unifier for two shape expressions, or fails.
//! Variables bind to anything that passes the occurs check; concrete
//! sequences unify element-wise; operator terms of the same kind unify
//! positionally; an operator term against a concrete term is given one
//! chance to reduce before the pair is rejected.

use caliper_ast::expr::{Expr, Var};
use caliper_ast::slice::Slicelike;

use crate::error::{SolveError, SolveResult};
use crate::reduce::reduce;
use crate::subst::Subst;

/// Unify two expressions, returning a substitution that makes them equal.
pub fn unify(e1: &Expr, e2: &Expr) -> SolveResult<Subst> {
    match (e1, e2) {
        // ============ Variables ============
        (Expr::Var(v), t) => bind(*v, t),
        (t, Expr::Var(v)) => bind(*v, t),

        // ============ Concrete sequences ============
        // a Shape against an Abstract promotes to element-wise unification
        (Expr::Shape(_), Expr::Shape(_))
        | (Expr::Shape(_), Expr::Abstract(_))
        | (Expr::Abstract(_), Expr::Shape(_))
        | (Expr::Abstract(_), Expr::Abstract(_)) => unify_elementwise(e1, e2),

        // ============ Arrows ============
        (Expr::Arrow(a1), Expr::Arrow(a2)) => {
            let s1 = unify(&a1.lhs, &a2.lhs)?;
            let s2 = unify(&s1.apply(&a1.rhs), &s1.apply(&a2.rhs))?;
            Ok(s1.compose(s2))
        }

        // a refined expression unifies through its inner expression;
        // predicates are evaluated elsewhere, never unified
        (Expr::Compound(c), t) => unify(&c.expr, t),
        (t, Expr::Compound(c)) => unify(t, &c.expr),

        // ============ Monolithic terms ============
        (Expr::Size(x), Expr::Size(y)) if x == y => Ok(Subst::new()),
        (Expr::Axis(x), Expr::Axis(y)) if x == y => Ok(Subst::new()),
        (Expr::Axes(x), Expr::Axes(y)) if x == y => Ok(Subst::new()),
        (Expr::Sizes(x), Expr::Sizes(y)) if x == y => Ok(Subst::new()),
        (Expr::Range(x), Expr::Range(y)) if x == y => Ok(Subst::new()),

        // ============ Operator terms of the same kind ============
        (Expr::BinOp(x), Expr::BinOp(y)) if x.op == y.op => {
            let s1 = unify(&x.a, &y.a)?;
            let s2 = unify(&s1.apply(&x.b), &s1.apply(&y.b))?;
            Ok(s1.compose(s2))
        }
        (Expr::UnaryOp(x), Expr::UnaryOp(y)) if x.op == y.op => unify(&x.a, &y.a),
        (Expr::Index(x), Expr::Index(y)) if x.i == y.i => unify(&x.a, &y.a),
        (Expr::Transpose(x), Expr::Transpose(y)) if x.axes == y.axes => unify(&x.a, &y.a),
        (Expr::Slice(x), Expr::Slice(y)) => {
            let s1 = unify_slicelike(&x.slice, &y.slice, e1, e2)?;
            let s2 = unify(&s1.apply(&x.a), &s1.apply(&y.a))?;
            Ok(s1.compose(s2))
        }
        (Expr::Repeat(x), Expr::Repeat(y)) if x.along == y.along && x.repeats == y.repeats => {
            unify(&x.a, &y.a)
        }
        (Expr::Concat(x), Expr::Concat(y)) if x.along == y.along => {
            let s1 = unify(&x.a, &y.a)?;
            let s2 = unify(&s1.apply(&x.b), &s1.apply(&y.b))?;
            Ok(s1.compose(s2))
        }
        (Expr::Broadcast(x), Expr::Broadcast(y)) => {
            let s1 = unify(&x.a, &y.a)?;
            let s2 = unify(&s1.apply(&x.b), &s1.apply(&y.b))?;
            Ok(s1.compose(s2))
        }
        (Expr::Reduct(x), Expr::Reduct(y)) if x.along == y.along => unify(&x.a, &y.a),

        // ============ Operator against concrete ============
        // give a reducible operator one chance to become concrete
        _ => {
            if is_operator(e1) {
                let r1 = reduce(e1)?;
                if r1 != *e1 {
                    return unify(&r1, e2);
                }
            }
            if is_operator(e2) {
                let r2 = reduce(e2)?;
                if r2 != *e2 {
                    return unify(e1, &r2);
                }
            }
            Err(SolveError::UnificationFail(e1.clone(), e2.clone()))
        }
    }
}

/// Bind a variable, refusing bindings that would build an infinite term.
fn bind(var: Var, term: &Expr) -> SolveResult<Subst> {
    if let Expr::Var(w) = term {
        if *w == var {
            return Ok(Subst::new());
        }
    }
    if term.freevars().contains(&var) {
        return Err(SolveError::OccursCheck {
            var,
            expr: term.clone(),
        });
    }
    Ok(Subst::singleton(var, term.clone()))
}

/// Unify two sequences element-wise, threading the substitution left to
/// right.
fn unify_elementwise(e1: &Expr, e2: &Expr) -> SolveResult<Subst> {
    let xs = e1.sub_exprs();
    let ys = e2.sub_exprs();
    if xs.len() != ys.len() {
        return Err(SolveError::SubExprMismatch {
            a: e1.clone(),
            b: e2.clone(),
            na: xs.len(),
            nb: ys.len(),
        });
    }
    let mut ss = Subst::new();
    for (x, y) in xs.iter().zip(&ys) {
        let s = unify(&ss.apply(x), &ss.apply(y))?;
        ss = ss.compose(s);
    }
    Ok(ss)
}

fn unify_slicelike(
    s1: &Slicelike,
    s2: &Slicelike,
    whole1: &Expr,
    whole2: &Expr,
) -> SolveResult<Subst> {
    match (s1, s2) {
        _ if s1 == s2 => Ok(Subst::new()),
        (Slicelike::Var(v), Slicelike::Range(r)) | (Slicelike::Range(r), Slicelike::Var(v)) => {
            Ok(Subst::singleton(*v, Expr::Range(*r)))
        }
        _ => Err(SolveError::UnificationFail(
            whole1.clone(),
            whole2.clone(),
        )),
    }
}

fn is_operator(e: &Expr) -> bool {
    matches!(
        e,
        Expr::BinOp(_)
            | Expr::UnaryOp(_)
            | Expr::Index(_)
            | Expr::Transpose(_)
            | Expr::Slice(_)
            | Expr::Repeat(_)
            | Expr::Concat(_)
            | Expr::Broadcast(_)
            | Expr::Reduct(_)
    )
}
