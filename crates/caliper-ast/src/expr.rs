//! Shape expressions
//!
//! The closed term language of the algebra. Every term is an immutable
//! value: operations elsewhere in the workspace (substitution, reduction,
//! unification) build new terms rather than mutating.
//!
//! The grammar is three closed sums: [`Expr`] for expressions,
//! [`Sizelike`] for the entries of an [`Abstract`], and
//! [`Slicelike`](crate::slice::Slicelike) for slice arguments.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::op::{BinOpKind, CmpOp, LogicOp, UnaryOpKind};
use crate::shape::{Abstract, Shape};
use crate::slice::{Range, Slicelike};

// ============ Atoms ============

/// A variable, named by a single lowercase Latin (`a..z`) or Greek
/// (`α..ω`) letter
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Var(pub char);

/// A concrete, non-negative dimension size
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Size(pub usize);

/// An axis selector: a single axis, or all of them at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Every axis — flattening repeats, scalar-collapsing reductions
    All,
    /// One axis, counted from the outermost dimension
    At(usize),
}

/// An ordered list of axis numbers, usually a permutation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Axes(pub Vec<usize>);

/// An ordered list of concrete sizes, used e.g. as an indexing argument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sizes(pub Vec<usize>);

// ============ Operator terms ============

/// Symbolic arithmetic over sizelikes: `a + 1`, `h × w`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinOp {
    pub op: BinOpKind,
    pub a: Box<Expr>,
    pub b: Box<Expr>,
}

/// A unary shape operator applied to an expression: `Π a`, `D a`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnaryOp {
    pub op: UnaryOpKind,
    pub a: Box<Expr>,
}

/// Symbolic version of `s[i]` on a shape `s`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexOf {
    pub i: usize,
    pub a: Box<Expr>,
}

/// Symbolic version of transposing a shape by an axes permutation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransposeOf {
    pub axes: Axes,
    pub a: Box<Expr>,
}

/// Symbolic version of slicing a shape
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SliceOf {
    pub slice: Slicelike,
    pub a: Box<Expr>,
}

/// Symbolic version of repeating a shape along an axis
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepeatOf {
    pub along: Axis,
    pub repeats: Vec<usize>,
    pub a: Box<Expr>,
}

/// Symbolic version of concatenating two shapes along an axis
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConcatOf {
    pub along: Axis,
    pub a: Box<Expr>,
    pub b: Box<Expr>,
}

/// The result of mutually broadcasting two shapes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BroadcastOf {
    pub a: Box<Expr>,
    pub b: Box<Expr>,
}

/// The result of reducing a shape along one axis (or all of them)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReductOf {
    pub a: Box<Expr>,
    pub along: Axis,
}

// ============ Structure ============

/// A function from one shape to another; curried and right-associative
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arrow {
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

/// An expression refined by a [`SubjectTo`] predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Compound {
    pub expr: Box<Expr>,
    pub subject_to: SubjectTo,
}

/// A boolean predicate over shape expressions
///
/// Leaves compare two expressions; inner nodes are logical connectives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectTo {
    Cmp {
        op: CmpOp,
        a: Box<Expr>,
        b: Box<Expr>,
    },
    Logic {
        op: LogicOp,
        a: Box<SubjectTo>,
        b: Box<SubjectTo>,
    },
}

/// An entry of an [`Abstract`]: a dimension that may still be symbolic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sizelike {
    Size(Size),
    Var(Var),
    BinOp(BinOp),
    UnaryOp(UnaryOp),
    /// The size that results from slicing a sizelike
    SliceOf(Box<SliceOf>),
}

/// A shape expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Shape(Shape),
    Abstract(Abstract),
    Arrow(Arrow),
    Compound(Compound),
    Var(Var),
    Size(Size),
    BinOp(BinOp),
    UnaryOp(UnaryOp),
    Axis(Axis),
    Axes(Axes),
    Sizes(Sizes),
    Range(Range),
    Index(IndexOf),
    Transpose(TransposeOf),
    Slice(SliceOf),
    Repeat(RepeatOf),
    Concat(ConcatOf),
    Broadcast(BroadcastOf),
    Reduct(ReductOf),
}

// ============ Constructors ============

impl Expr {
    pub fn var(c: char) -> Expr {
        Expr::Var(Var(c))
    }

    pub fn size(n: usize) -> Expr {
        Expr::Size(Size(n))
    }

    pub fn shape(dims: impl IntoIterator<Item = usize>) -> Expr {
        Expr::Shape(Shape::new(dims))
    }

    pub fn arrow(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Arrow(Arrow {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    pub fn compound(expr: Expr, subject_to: SubjectTo) -> Expr {
        Expr::Compound(Compound {
            expr: Box::new(expr),
            subject_to,
        })
    }

    pub fn binop(op: BinOpKind, a: Expr, b: Expr) -> Expr {
        Expr::BinOp(BinOp {
            op,
            a: Box::new(a),
            b: Box::new(b),
        })
    }

    pub fn unary(op: UnaryOpKind, a: Expr) -> Expr {
        Expr::UnaryOp(UnaryOp { op, a: Box::new(a) })
    }

    pub fn index(i: usize, a: Expr) -> Expr {
        Expr::Index(IndexOf { i, a: Box::new(a) })
    }

    pub fn transpose(axes: impl IntoIterator<Item = usize>, a: Expr) -> Expr {
        Expr::Transpose(TransposeOf {
            axes: Axes(axes.into_iter().collect()),
            a: Box::new(a),
        })
    }

    pub fn slice_of(slice: impl Into<Slicelike>, a: Expr) -> Expr {
        Expr::Slice(SliceOf {
            slice: slice.into(),
            a: Box::new(a),
        })
    }

    pub fn repeat_of(along: Axis, repeats: impl IntoIterator<Item = usize>, a: Expr) -> Expr {
        Expr::Repeat(RepeatOf {
            along,
            repeats: repeats.into_iter().collect(),
            a: Box::new(a),
        })
    }

    pub fn concat_of(along: Axis, a: Expr, b: Expr) -> Expr {
        Expr::Concat(ConcatOf {
            along,
            a: Box::new(a),
            b: Box::new(b),
        })
    }

    pub fn broadcast_of(a: Expr, b: Expr) -> Expr {
        Expr::Broadcast(BroadcastOf {
            a: Box::new(a),
            b: Box::new(b),
        })
    }

    pub fn reduct_of(a: Expr, along: Axis) -> Expr {
        Expr::Reduct(ReductOf {
            a: Box::new(a),
            along,
        })
    }

    /// A multi-axis reduction, built as a nested chain of [`ReductOf`].
    ///
    /// Axes are sorted in reverse so the innermost reduction carries the
    /// largest axis; every link of the chain then refers to the dimensions
    /// of the original shape.
    pub fn reduce_along(a: Expr, axes: impl IntoIterator<Item = usize>) -> Expr {
        let mut axes: Vec<usize> = axes.into_iter().collect();
        axes.sort_unstable_by(|x, y| y.cmp(x));
        let mut ret = a;
        for ax in axes {
            ret = Expr::reduct_of(ret, Axis::At(ax));
        }
        ret
    }
}

/// Build a right-associative arrow chain from a list of expressions.
///
/// `make_arrow([a, b, c])` is `a → (b → c)`. Returns `None` when fewer
/// than two expressions are given.
pub fn make_arrow(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
    let mut exprs: Vec<Expr> = exprs.into_iter().collect();
    if exprs.len() < 2 {
        return None;
    }
    let mut ret = exprs.pop()?;
    while let Some(e) = exprs.pop() {
        ret = Expr::arrow(e, ret);
    }
    Some(ret)
}

impl SubjectTo {
    pub fn cmp(op: CmpOp, a: Expr, b: Expr) -> SubjectTo {
        SubjectTo::Cmp {
            op,
            a: Box::new(a),
            b: Box::new(b),
        }
    }

    pub fn and(a: SubjectTo, b: SubjectTo) -> SubjectTo {
        SubjectTo::Logic {
            op: LogicOp::And,
            a: Box::new(a),
            b: Box::new(b),
        }
    }

    pub fn or(a: SubjectTo, b: SubjectTo) -> SubjectTo {
        SubjectTo::Logic {
            op: LogicOp::Or,
            a: Box::new(a),
            b: Box::new(b),
        }
    }
}

impl From<Shape> for Expr {
    fn from(s: Shape) -> Expr {
        Expr::Shape(s)
    }
}

impl From<Abstract> for Expr {
    fn from(a: Abstract) -> Expr {
        Expr::Abstract(a)
    }
}

impl From<Var> for Expr {
    fn from(v: Var) -> Expr {
        Expr::Var(v)
    }
}

impl From<Size> for Expr {
    fn from(s: Size) -> Expr {
        Expr::Size(s)
    }
}

impl From<Range> for Expr {
    fn from(r: Range) -> Expr {
        Expr::Range(r)
    }
}

// ============ Sizelike conversions ============

impl Sizelike {
    /// Lift this sizelike into expression position.
    pub fn to_expr(&self) -> Expr {
        match self {
            Sizelike::Size(s) => Expr::Size(*s),
            Sizelike::Var(v) => Expr::Var(*v),
            Sizelike::BinOp(b) => Expr::BinOp(b.clone()),
            Sizelike::UnaryOp(u) => Expr::UnaryOp(u.clone()),
            Sizelike::SliceOf(s) => Expr::Slice((**s).clone()),
        }
    }

    /// Lower an expression back into sizelike position, if it fits.
    pub fn from_expr(e: &Expr) -> Option<Sizelike> {
        match e {
            Expr::Size(s) => Some(Sizelike::Size(*s)),
            Expr::Var(v) => Some(Sizelike::Var(*v)),
            Expr::BinOp(b) => Some(Sizelike::BinOp(b.clone())),
            Expr::UnaryOp(u) => Some(Sizelike::UnaryOp(u.clone())),
            Expr::Slice(s) => Some(Sizelike::SliceOf(Box::new(s.clone()))),
            _ => None,
        }
    }
}

impl From<Size> for Sizelike {
    fn from(s: Size) -> Sizelike {
        Sizelike::Size(s)
    }
}

impl From<Var> for Sizelike {
    fn from(v: Var) -> Sizelike {
        Sizelike::Var(v)
    }
}

impl From<usize> for Sizelike {
    fn from(n: usize) -> Sizelike {
        Sizelike::Size(Size(n))
    }
}

// ============ Free variables ============

impl Expr {
    /// The set of variables occurring unbound anywhere in this term,
    /// de-duplicated and order-insensitive.
    pub fn freevars(&self) -> BTreeSet<Var> {
        let mut vars = BTreeSet::new();
        self.collect_freevars(&mut vars);
        vars
    }

    fn collect_freevars(&self, vars: &mut BTreeSet<Var>) {
        match self {
            Expr::Var(v) => {
                vars.insert(*v);
            }
            Expr::Shape(_)
            | Expr::Size(_)
            | Expr::Axis(_)
            | Expr::Axes(_)
            | Expr::Sizes(_)
            | Expr::Range(_) => {}
            Expr::Abstract(a) => {
                for s in &a.0 {
                    s.to_expr().collect_freevars(vars);
                }
            }
            Expr::Arrow(ar) => {
                ar.lhs.collect_freevars(vars);
                ar.rhs.collect_freevars(vars);
            }
            Expr::Compound(c) => {
                c.expr.collect_freevars(vars);
                c.subject_to.collect_freevars(vars);
            }
            Expr::BinOp(b) => {
                b.a.collect_freevars(vars);
                b.b.collect_freevars(vars);
            }
            Expr::UnaryOp(u) => u.a.collect_freevars(vars),
            Expr::Index(i) => i.a.collect_freevars(vars),
            Expr::Transpose(t) => t.a.collect_freevars(vars),
            Expr::Slice(s) => {
                if let Slicelike::Var(v) = &s.slice {
                    vars.insert(*v);
                }
                s.a.collect_freevars(vars);
            }
            Expr::Repeat(r) => r.a.collect_freevars(vars),
            Expr::Concat(c) => {
                c.a.collect_freevars(vars);
                c.b.collect_freevars(vars);
            }
            Expr::Broadcast(b) => {
                b.a.collect_freevars(vars);
                b.b.collect_freevars(vars);
            }
            Expr::Reduct(r) => r.a.collect_freevars(vars),
        }
    }

    /// Whether this term contains no free variables.
    pub fn is_ground(&self) -> bool {
        self.freevars().is_empty()
    }
}

impl SubjectTo {
    /// Free variables of both operands, recursively.
    pub fn freevars(&self) -> BTreeSet<Var> {
        let mut vars = BTreeSet::new();
        self.collect_freevars(&mut vars);
        vars
    }

    fn collect_freevars(&self, vars: &mut BTreeSet<Var>) {
        match self {
            SubjectTo::Cmp { a, b, .. } => {
                a.collect_freevars(vars);
                b.collect_freevars(vars);
            }
            SubjectTo::Logic { a, b, .. } => {
                a.collect_freevars(vars);
                b.collect_freevars(vars);
            }
        }
    }

    pub fn is_ground(&self) -> bool {
        self.freevars().is_empty()
    }
}

// ============ Structural subterms ============

impl Expr {
    /// The immediate structural subterms, in positional order.
    ///
    /// Constraint predicates are deliberately not included: a `Compound`
    /// exposes only its refined expression. Predicates are evaluated, never
    /// unified.
    pub fn sub_exprs(&self) -> Vec<Expr> {
        match self {
            Expr::Var(_)
            | Expr::Size(_)
            | Expr::Axis(_)
            | Expr::Axes(_)
            | Expr::Sizes(_)
            | Expr::Range(_) => vec![],
            Expr::Shape(s) => s.0.iter().map(|&n| Expr::size(n)).collect(),
            Expr::Abstract(a) => a.0.iter().map(Sizelike::to_expr).collect(),
            Expr::Arrow(ar) => vec![(*ar.lhs).clone(), (*ar.rhs).clone()],
            Expr::Compound(c) => vec![(*c.expr).clone()],
            Expr::BinOp(b) => vec![(*b.a).clone(), (*b.b).clone()],
            Expr::UnaryOp(u) => vec![(*u.a).clone()],
            Expr::Index(i) => vec![Expr::size(i.i), (*i.a).clone()],
            Expr::Transpose(t) => vec![Expr::Axes(t.axes.clone()), (*t.a).clone()],
            Expr::Slice(s) => {
                let mut ret = match &s.slice {
                    Slicelike::Range(r) => vec![Expr::Range(*r)],
                    Slicelike::Ranges(rs) => rs.iter().map(|&r| Expr::Range(r)).collect(),
                    Slicelike::Var(v) => vec![Expr::Var(*v)],
                };
                ret.push((*s.a).clone());
                ret
            }
            Expr::Repeat(r) => vec![Expr::Axis(r.along), (*r.a).clone()],
            Expr::Concat(c) => {
                vec![Expr::Axis(c.along), (*c.a).clone(), (*c.b).clone()]
            }
            Expr::Broadcast(b) => vec![(*b.a).clone(), (*b.b).clone()],
            Expr::Reduct(r) => vec![(*r.a).clone()],
        }
    }

    /// The dimensions of this term as plain integers, when it is a fully
    /// concrete sequence (`Shape`, `Sizes`, `Axes`, or an all-`Size`
    /// `Abstract`).
    pub fn dim_list(&self) -> Option<Vec<usize>> {
        match self {
            Expr::Shape(s) => Some(s.0.clone()),
            Expr::Sizes(s) => Some(s.0.clone()),
            Expr::Axes(a) => Some(a.0.clone()),
            Expr::Abstract(a) => a.to_shape().map(|s| s.0),
            _ => None,
        }
    }
}

impl Axis {
    /// Resolve this selector against a shape of `dims` dimensions:
    /// `All` stands for axis 0 once a flattening/collapse has been decided.
    pub fn resolve(&self, _dims: usize) -> usize {
        match self {
            Axis::All => 0,
            Axis::At(a) => *a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn make_arrow_right_associative() {
        let got = make_arrow([Expr::var('a'), Expr::var('b'), Expr::var('c')]).unwrap();
        let want = Expr::arrow(Expr::var('a'), Expr::arrow(Expr::var('b'), Expr::var('c')));
        assert_eq!(got, want);
        assert!(make_arrow([Expr::var('a')]).is_none());
    }

    #[test]
    fn freevars_recurse_into_operator_terms() {
        let e = Expr::arrow(
            Expr::var('a'),
            Expr::binop(
                crate::op::BinOpKind::Mul,
                Expr::var('b'),
                Expr::unary(UnaryOpKind::Prod, Expr::var('c')),
            ),
        );
        let vars = e.freevars();
        assert_eq!(
            vars.into_iter().collect::<Vec<_>>(),
            vec![Var('a'), Var('b'), Var('c')]
        );
    }

    #[test]
    fn freevars_of_shapes_are_empty() {
        assert!(Expr::shape([2, 3]).freevars().is_empty());
        assert!(Expr::Axes(Axes(vec![0, 1])).freevars().is_empty());
    }

    #[test]
    fn sub_exprs_skip_predicates() {
        let c = Expr::compound(
            Expr::var('a'),
            SubjectTo::cmp(CmpOp::Eq, Expr::var('b'), Expr::size(2)),
        );
        assert_eq!(c.sub_exprs(), vec![Expr::var('a')]);
        // ... but freevars sees through them
        assert_eq!(c.freevars().len(), 2);
    }

    #[test]
    fn reduce_along_nests_innermost_largest() {
        let e = Expr::reduce_along(Expr::var('a'), [0, 1]);
        let want = Expr::reduct_of(Expr::reduct_of(Expr::var('a'), Axis::At(1)), Axis::At(0));
        assert_eq!(e, want);
    }
}
