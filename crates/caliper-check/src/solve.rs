//! Constraint evaluation
//!
//! `SubjectTo` predicates are evaluated only after substitution has
//! grounded their operands. A predicate with free variables is retained by
//! the caller; a ground predicate evaluates to a boolean, and `false`
//! fails the enclosing application.

use caliper_ast::expr::{Expr, SubjectTo, UnaryOp};
use caliper_ast::op::{CmpOp, LogicOp, UnaryOpKind};
use caliper_ast::shape::Shape;

use crate::error::{SolveError, SolveResult};
use crate::reduce::{reduce, try_size};

/// Evaluate a predicate. `Ok(None)` means the predicate still contains
/// free variables and must be retained.
pub fn eval(st: &SubjectTo) -> SolveResult<Option<bool>> {
    if !st.is_ground() {
        return Ok(None);
    }
    eval_ground(st).map(Some)
}

fn eval_ground(st: &SubjectTo) -> SolveResult<bool> {
    match st {
        SubjectTo::Logic { op, a, b } => match op {
            // short-circuit
            LogicOp::And => Ok(eval_ground(a)? && eval_ground(b)?),
            LogicOp::Or => Ok(eval_ground(a)? || eval_ground(b)?),
        },
        SubjectTo::Cmp { op, a, b } => eval_cmp(*op, a, b),
    }
}

fn eval_cmp(op: CmpOp, a: &Expr, b: &Expr) -> SolveResult<bool> {
    // the constant tag is transparent to evaluation
    let (a, forall_a) = strip_tags(a);
    let (b, forall_b) = strip_tags(b);
    let a = reduce(&a)?;
    let b = reduce(&b)?;

    // ∀-tagged comparisons are element-wise over the dimension lists
    if forall_a || forall_b {
        return eval_forall(op, &a, &b);
    }

    // broadcastability is a shape-level test
    if op == CmpOp::Bc {
        let (x, y) = match (shape_of(&a), shape_of(&b)) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(SolveError::BadComparison {
                    op: op.glyph(),
                    a,
                    b,
                })
            }
        };
        return Ok(x.broadcast(&y).is_ok());
    }

    // integer comparison when both sides resolve to sizes
    if let (Some(x), Some(y)) = (try_size(&a)?, try_size(&b)?) {
        if let Some(verdict) = op.eval_ints(x, y) {
            return Ok(verdict);
        }
    }

    // shape comparison: soft equality, or element-wise ordering
    if let (Some(x), Some(y)) = (shape_of(&a), shape_of(&b)) {
        return match op {
            CmpOp::Eq => Ok(x.soft_eq(&y)),
            CmpOp::Ne => Ok(!x.soft_eq(&y)),
            _ => eval_elementwise(op, &x.0, &y.0),
        };
    }

    // structural equality as the last resort
    match op {
        CmpOp::Eq => Ok(a == b),
        CmpOp::Ne => Ok(a != b),
        _ => Err(SolveError::BadComparison {
            op: op.glyph(),
            a,
            b,
        }),
    }
}

fn eval_forall(op: CmpOp, a: &Expr, b: &Expr) -> SolveResult<bool> {
    match (a.dim_list(), b.dim_list()) {
        (Some(xs), Some(ys)) => eval_elementwise(op, &xs, &ys),
        _ => Err(SolveError::BadComparison {
            op: op.glyph(),
            a: a.clone(),
            b: b.clone(),
        }),
    }
}

/// Element-wise comparison; sequences of unequal length never compare.
fn eval_elementwise(op: CmpOp, xs: &[usize], ys: &[usize]) -> SolveResult<bool> {
    if xs.len() != ys.len() {
        return Ok(false);
    }
    for (&x, &y) in xs.iter().zip(ys) {
        match op.eval_ints(x, y) {
            Some(true) => {}
            Some(false) => return Ok(false),
            None => {
                return Err(SolveError::BadComparison {
                    op: op.glyph(),
                    a: Expr::size(x),
                    b: Expr::size(y),
                })
            }
        }
    }
    Ok(true)
}

/// Strip `K` and `∀` tags off an operand, reporting whether a `∀` was seen.
fn strip_tags(e: &Expr) -> (Expr, bool) {
    let mut cur = e;
    let mut forall = false;
    loop {
        match cur {
            Expr::UnaryOp(UnaryOp {
                op: UnaryOpKind::Const,
                a,
            }) => cur = a,
            Expr::UnaryOp(UnaryOp {
                op: UnaryOpKind::ForAll,
                a,
            }) => {
                forall = true;
                cur = a;
            }
            _ => return (cur.clone(), forall),
        }
    }
}

fn shape_of(e: &Expr) -> Option<Shape> {
    match e {
        Expr::Shape(s) => Some(s.clone()),
        _ => e.dim_list().map(Shape),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caliper_ast::expr::{Sizes, SubjectTo};
    use caliper_ast::op::UnaryOpKind::*;

    fn cmp(op: CmpOp, a: Expr, b: Expr) -> SubjectTo {
        SubjectTo::cmp(op, a, b)
    }

    #[test]
    fn non_ground_predicates_are_retained() {
        let st = cmp(
            CmpOp::Eq,
            Expr::unary(Prod, Expr::shape([2, 3])),
            Expr::unary(Prod, Expr::var('b')),
        );
        assert_eq!(eval(&st).unwrap(), None);
    }

    #[test]
    fn product_equality() {
        let st = cmp(
            CmpOp::Eq,
            Expr::unary(Prod, Expr::shape([2, 3])),
            Expr::unary(Prod, Expr::shape([3, 2])),
        );
        assert_eq!(eval(&st).unwrap(), Some(true));

        let st = cmp(
            CmpOp::Eq,
            Expr::unary(Prod, Expr::shape([2, 3])),
            Expr::unary(Prod, Expr::shape([6, 2])),
        );
        assert_eq!(eval(&st).unwrap(), Some(false));
    }

    #[test]
    fn dims_comparison() {
        use caliper_ast::expr::Axes;
        let st = cmp(
            CmpOp::Eq,
            Expr::unary(Dims, Expr::Axes(Axes(vec![0, 1, 3, 2]))),
            Expr::unary(Dims, Expr::shape([1, 2, 3, 4])),
        );
        assert_eq!(eval(&st).unwrap(), Some(true));

        let st = cmp(
            CmpOp::Eq,
            Expr::unary(Dims, Expr::Axes(Axes(vec![0, 1, 3, 2]))),
            Expr::unary(Dims, Expr::shape([2, 3, 4])),
        );
        assert_eq!(eval(&st).unwrap(), Some(false));
    }

    #[test]
    fn indexed_comparison() {
        let st = cmp(CmpOp::Gte, Expr::index(0, Expr::shape([5, 3, 4])), Expr::size(2));
        assert_eq!(eval(&st).unwrap(), Some(true));

        let st = cmp(CmpOp::Gte, Expr::index(0, Expr::shape([1, 3, 4])), Expr::size(2));
        assert_eq!(eval(&st).unwrap(), Some(false));
    }

    #[test]
    fn forall_is_elementwise() {
        let st = cmp(
            CmpOp::Lt,
            Expr::unary(ForAll, Expr::Sizes(Sizes(vec![0, 0, 1, 0]))),
            Expr::unary(ForAll, Expr::shape([1, 2, 3, 4])),
        );
        assert_eq!(eval(&st).unwrap(), Some(true));

        let st = cmp(
            CmpOp::Lt,
            Expr::unary(ForAll, Expr::Sizes(Sizes(vec![0, 0, 4, 0]))),
            Expr::unary(ForAll, Expr::shape([1, 2, 3, 4])),
        );
        assert_eq!(eval(&st).unwrap(), Some(false));
    }

    #[test]
    fn broadcastable() {
        let st = cmp(
            CmpOp::Bc,
            Expr::unary(Const, Expr::shape([2, 3, 4])),
            Expr::unary(Const, Expr::shape([2, 1, 4])),
        );
        assert_eq!(eval(&st).unwrap(), Some(true));

        let st = cmp(
            CmpOp::Bc,
            Expr::unary(Const, Expr::shape([2, 3])),
            Expr::unary(Const, Expr::shape([2, 4])),
        );
        assert_eq!(eval(&st).unwrap(), Some(false));
    }

    #[test]
    fn logic_short_circuits() {
        let truthy = cmp(CmpOp::Eq, Expr::size(1), Expr::size(1));
        let falsy = cmp(CmpOp::Eq, Expr::size(1), Expr::size(2));
        // the second operand of this Or would error if evaluated eagerly
        let poisoned = cmp(CmpOp::Lt, Expr::shape([1]), Expr::Range(caliper_ast::slice::Range::new(0, 1, 1)));

        let st = SubjectTo::or(truthy.clone(), poisoned);
        assert_eq!(eval(&st).unwrap(), Some(true));

        let st = SubjectTo::and(truthy, falsy.clone());
        assert_eq!(eval(&st).unwrap(), Some(false));

        let st = SubjectTo::or(falsy.clone(), falsy);
        assert_eq!(eval(&st).unwrap(), Some(false));
    }

    #[test]
    fn shape_equality_is_soft() {
        let st = cmp(CmpOp::Eq, Expr::shape([2]), Expr::shape([2, 1]));
        assert_eq!(eval(&st).unwrap(), Some(true));

        let st = cmp(CmpOp::Eq, Expr::shape([1]), Expr::shape([]));
        assert_eq!(eval(&st).unwrap(), Some(false));
    }
}
