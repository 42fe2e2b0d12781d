//! Operator reduction
//!
//! [`reduce`] rewrites an expression bottom-up, evaluating every operator
//! term whose operands have become ground and leaving everything else
//! symbolic. It is best-effort: an operator that still contains free
//! variables is returned as-is, while a ground but ill-typed operator (an
//! out-of-range index, a non-permutation transpose) is a hard error.
//!
//! [`resolve_size`] is the strict counterpart for size-kind expressions:
//! it either produces a concrete integer or fails.

use caliper_ast::expr::{
    BroadcastOf, Compound, ConcatOf, Expr, IndexOf, RepeatOf, ReductOf, Size, SliceOf,
    TransposeOf, UnaryOp,
};
use caliper_ast::op::{BinOpKind, UnaryOpKind};
use caliper_ast::shape::{Abstract, Shape};
use caliper_ast::slice::{Range, Slicelike};
use caliper_ast::error::ShapeError;
use caliper_ast::expr::Axis;

use crate::error::{SolveError, SolveResult};

/// Reduce an expression bottom-up, best-effort.
///
/// A fully reduced `Abstract` whose entries are all sizes canonicalizes to
/// `Shape`.
pub fn reduce(expr: &Expr) -> SolveResult<Expr> {
    match expr {
        Expr::Shape(_)
        | Expr::Var(_)
        | Expr::Size(_)
        | Expr::Axis(_)
        | Expr::Axes(_)
        | Expr::Sizes(_)
        | Expr::Range(_) => Ok(expr.clone()),

        Expr::Abstract(a) => reduce_abstract(a),

        Expr::Arrow(ar) => Ok(Expr::arrow(reduce(&ar.lhs)?, reduce(&ar.rhs)?)),

        Expr::Compound(c) => Ok(Expr::Compound(Compound {
            expr: Box::new(reduce(&c.expr)?),
            subject_to: c.subject_to.clone(),
        })),

        Expr::BinOp(b) => {
            let a2 = reduce(&b.a)?;
            let b2 = reduce(&b.b)?;
            let folded = Expr::binop(b.op, a2, b2);
            match try_size(&folded)? {
                Some(n) => Ok(Expr::size(n)),
                None => Ok(folded),
            }
        }

        // `∀` never yields a size, and `K` only passes a ground size
        // through, so the tags survive exactly when they should
        Expr::UnaryOp(u) => {
            let a2 = reduce(&u.a)?;
            let folded = Expr::unary(u.op, a2);
            match try_size(&folded)? {
                Some(n) => Ok(Expr::size(n)),
                None => Ok(folded),
            }
        }

        Expr::Index(i) => {
            let a2 = reduce(&i.a)?;
            let kept = Expr::Index(IndexOf {
                i: i.i,
                a: Box::new(a2),
            });
            match try_size(&kept)? {
                Some(n) => Ok(Expr::size(n)),
                None => Ok(kept),
            }
        }

        Expr::Transpose(t) => {
            let a2 = reduce(&t.a)?;
            match &a2 {
                Expr::Shape(s) => Ok(match s.transpose(&t.axes.0)? {
                    Some(permuted) => Expr::Shape(permuted),
                    // identity permutation: a no-op, not an error
                    None => a2.clone(),
                }),
                Expr::Abstract(ab) => Ok(match ab.transpose(&t.axes.0)? {
                    Some(permuted) => Expr::Abstract(permuted),
                    None => a2.clone(),
                }),
                _ => Ok(Expr::Transpose(TransposeOf {
                    axes: t.axes.clone(),
                    a: Box::new(a2),
                })),
            }
        }

        Expr::Slice(s) => reduce_slice(s),

        Expr::Repeat(r) => {
            let a2 = reduce(&r.a)?;
            match &a2 {
                Expr::Shape(sh) => {
                    let (repeated, _, _) = sh.repeat(r.along, &r.repeats)?;
                    Ok(Expr::Shape(repeated))
                }
                Expr::Abstract(ab) => {
                    let (repeated, _, _) = ab.repeat(r.along, &r.repeats)?;
                    Ok(repeated)
                }
                _ => Ok(Expr::Repeat(RepeatOf {
                    along: r.along,
                    repeats: r.repeats.clone(),
                    a: Box::new(a2),
                })),
            }
        }

        Expr::Concat(c) => {
            let a2 = reduce(&c.a)?;
            let b2 = reduce(&c.b)?;
            match (&a2, &b2) {
                (Expr::Shape(x), Expr::Shape(y)) => {
                    Ok(Expr::Shape(x.concat(c.along, &[y.clone()])?))
                }
                _ => Ok(Expr::Concat(ConcatOf {
                    along: c.along,
                    a: Box::new(a2),
                    b: Box::new(b2),
                })),
            }
        }

        Expr::Broadcast(b) => {
            let a2 = reduce(&b.a)?;
            let b2 = reduce(&b.b)?;
            match (&a2, &b2) {
                (Expr::Shape(x), Expr::Shape(y)) => Ok(Expr::Shape(x.broadcast(y)?)),
                _ => Ok(Expr::Broadcast(BroadcastOf {
                    a: Box::new(a2),
                    b: Box::new(b2),
                })),
            }
        }

        Expr::Reduct(r) => {
            let a2 = reduce(&r.a)?;
            match &a2 {
                Expr::Shape(s) => Ok(Expr::Shape(reduct_dims(&s.0, r.along)?.map(Shape).unwrap_or_else(Shape::scalar))),
                Expr::Abstract(ab) => Ok(match reduct_dims(&ab.0, r.along)? {
                    Some(entries) => Abstract(entries).canonical(),
                    None => Expr::Shape(Shape::scalar()),
                }),
                _ => Ok(Expr::Reduct(ReductOf {
                    a: Box::new(a2),
                    along: r.along,
                })),
            }
        }
    }
}

/// Drop one entry (or all of them). `Ok(None)` is the scalar collapse.
fn reduct_dims<T: Clone>(dims: &[T], along: Axis) -> SolveResult<Option<Vec<T>>> {
    match along {
        Axis::All => Ok(None),
        Axis::At(ax) => {
            if ax >= dims.len() {
                return Err(SolveError::Shape(ShapeError::InvalidAxis {
                    axis: ax,
                    dims: dims.len(),
                }));
            }
            let mut out = dims.to_vec();
            out.remove(ax);
            Ok(Some(out))
        }
    }
}

fn reduce_abstract(a: &Abstract) -> SolveResult<Expr> {
    let mut entries = Vec::with_capacity(a.0.len());
    for entry in &a.0 {
        let reduced = reduce(&entry.to_expr())?;
        entries.push(
            caliper_ast::expr::Sizelike::from_expr(&reduced).unwrap_or_else(|| entry.clone()),
        );
    }
    Ok(Abstract(entries).canonical())
}

fn reduce_slice(s: &SliceOf) -> SolveResult<Expr> {
    let a2 = reduce(&s.a)?;
    match (&s.slice, &a2) {
        // a var slice is not yet reducible
        (Slicelike::Var(_), _) => Ok(Expr::Slice(SliceOf {
            slice: s.slice.clone(),
            a: Box::new(a2),
        })),
        (Slicelike::Range(r), Expr::Shape(shape)) => {
            Ok(Expr::Shape(shape.slice(&[Some(*r)])?))
        }
        (Slicelike::Ranges(rs), Expr::Shape(shape)) => {
            let slices: Vec<Option<Range>> = rs.iter().map(|&r| Some(r)).collect();
            Ok(Expr::Shape(shape.slice(&slices)?))
        }
        (Slicelike::Range(r), Expr::Abstract(ab)) => Ok(ab.slice(&[Some(*r)])?),
        (Slicelike::Ranges(rs), Expr::Abstract(ab)) => {
            let slices: Vec<Option<Range>> = rs.iter().map(|&r| Some(r)).collect();
            Ok(ab.slice(&slices)?)
        }
        // the sizelike case: slicing a single dimension
        (Slicelike::Range(r), operand) => match try_size(operand)? {
            Some(n) => Ok(Expr::size(r.sliced_size(n)?)),
            None => Ok(Expr::Slice(SliceOf {
                slice: s.slice.clone(),
                a: Box::new(a2),
            })),
        },
        _ => Ok(Expr::Slice(SliceOf {
            slice: s.slice.clone(),
            a: Box::new(a2),
        })),
    }
}

/// Strictly resolve a size-kind expression to a concrete integer.
pub fn resolve_size(expr: &Expr) -> SolveResult<usize> {
    match expr {
        Expr::Size(Size(n)) => Ok(*n),

        Expr::BinOp(b) => {
            let x = resolve_size(&b.a)?;
            let y = resolve_size(&b.b)?;
            match b.op {
                BinOpKind::Add => Ok(x + y),
                BinOpKind::Sub => x
                    .checked_sub(y)
                    .ok_or(SolveError::Shape(ShapeError::Underflow { a: x, b: y })),
                BinOpKind::Mul => Ok(x * y),
                BinOpKind::Div => {
                    if y == 0 {
                        Err(SolveError::Shape(ShapeError::DivByZero))
                    } else {
                        Ok(x / y)
                    }
                }
            }
        }

        Expr::UnaryOp(u) => resolve_unary_size(u),

        Expr::Index(i) => {
            let a2 = reduce(&i.a)?;
            match &a2 {
                Expr::Shape(s) => Ok(s.dim(i.i as isize)?),
                Expr::Abstract(ab) => {
                    let entry = ab.dim_size(i.i)?;
                    resolve_size(&entry.to_expr())
                }
                _ => Err(SolveError::Unresolvable(expr.clone())),
            }
        }

        Expr::Slice(s) => match &s.slice {
            Slicelike::Range(r) => {
                let n = resolve_size(&s.a)?;
                Ok(r.sliced_size(n)?)
            }
            _ => Err(SolveError::Unresolvable(expr.clone())),
        },

        _ => Err(SolveError::Unresolvable(expr.clone())),
    }
}

fn resolve_unary_size(u: &UnaryOp) -> SolveResult<usize> {
    match u.op {
        UnaryOpKind::Dims => {
            let a2 = reduce(&u.a)?;
            dims_of(&a2).ok_or_else(|| SolveError::Unresolvable(Expr::UnaryOp(u.clone())))
        }
        UnaryOpKind::Prod | UnaryOpKind::Sum => {
            let a2 = reduce(&u.a)?;
            let dims = a2
                .dim_list()
                .ok_or_else(|| SolveError::Unresolvable(Expr::UnaryOp(u.clone())))?;
            Ok(match u.op {
                UnaryOpKind::Prod => dims.iter().product(),
                _ => dims.iter().sum(),
            })
        }
        // the constant tag is opaque during rewriting but transparent when
        // a concrete value is demanded
        UnaryOpKind::Const => resolve_size(&u.a),
        UnaryOpKind::ForAll => Err(SolveError::Unresolvable(Expr::UnaryOp(u.clone()))),
    }
}

/// The dimensionality of a concrete sequence term.
pub fn dims_of(expr: &Expr) -> Option<usize> {
    match expr {
        Expr::Shape(s) => Some(s.dims()),
        Expr::Abstract(a) => Some(a.dims()),
        Expr::Axes(a) => Some(a.0.len()),
        Expr::Sizes(s) => Some(s.0.len()),
        _ => None,
    }
}

/// `Ok(Some(n))` when the expression resolves to a size, `Ok(None)` when it
/// is still symbolic, and an error when it is ground but ill-typed.
pub(crate) fn try_size(expr: &Expr) -> SolveResult<Option<usize>> {
    match resolve_size(expr) {
        Ok(n) => Ok(Some(n)),
        Err(SolveError::Unresolvable(_)) => Ok(None),
        Err(err) => Err(err),
    }
}
