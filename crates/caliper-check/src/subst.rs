//! Substitutions
//!
//! A [`Subst`] is an ordered list of `Var ↦ Expr` bindings, produced by
//! unification and consumed by `apply`. Entries may refer to variables
//! bound by other entries; `apply` re-applies until a fixpoint so that it
//! is idempotent on its own output.

use caliper_ast::expr::{
    Arrow, BroadcastOf, Compound, ConcatOf, Expr, IndexOf, RepeatOf, ReductOf, Sizelike,
    SliceOf, SubjectTo, TransposeOf, Var,
};
use caliper_ast::shape::Abstract;
use caliper_ast::slice::Slicelike;

/// An ordered list of variable bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subst {
    subs: Vec<(Var, Expr)>,
}

impl Subst {
    pub fn new() -> Self {
        Subst::default()
    }

    /// A substitution with a single binding
    pub fn singleton(var: Var, expr: Expr) -> Self {
        Subst {
            subs: vec![(var, expr)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    /// The binding for `var`, if any
    pub fn get(&self, var: Var) -> Option<&Expr> {
        self.subs.iter().find(|(v, _)| *v == var).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Var, Expr)> {
        self.subs.iter()
    }

    /// Compose two substitutions: `other` is applied to every right-hand
    /// side of `self`, then its own bindings are appended. Bindings already
    /// present in `self` win (their right-hand sides have just been
    /// updated to agree).
    pub fn compose(self, other: Subst) -> Subst {
        let mut subs: Vec<(Var, Expr)> = self
            .subs
            .into_iter()
            .map(|(v, e)| (v, other.apply(&e)))
            .collect();
        for (v, e) in other.subs {
            if !subs.iter().any(|(w, _)| *w == v) {
                subs.push((v, e));
            }
        }
        Subst { subs }
    }

    /// Apply the substitution, re-applying until stable. Applying the empty
    /// substitution is the identity.
    pub fn apply(&self, expr: &Expr) -> Expr {
        if self.is_empty() {
            return expr.clone();
        }
        let mut cur = self.apply_once(expr);
        // each pass shortens every binding chain by one; cycles cannot
        // occur in unifier output (occurs check), so this caps cleanly
        for _ in 0..self.subs.len() {
            let next = self.apply_once(&cur);
            if next == cur {
                break;
            }
            cur = next;
        }
        cur
    }

    /// Apply the substitution through a predicate's operands.
    pub fn apply_subject_to(&self, st: &SubjectTo) -> SubjectTo {
        match st {
            SubjectTo::Cmp { op, a, b } => SubjectTo::Cmp {
                op: *op,
                a: Box::new(self.apply(a)),
                b: Box::new(self.apply(b)),
            },
            SubjectTo::Logic { op, a, b } => SubjectTo::Logic {
                op: *op,
                a: Box::new(self.apply_subject_to(a)),
                b: Box::new(self.apply_subject_to(b)),
            },
        }
    }

    fn apply_once(&self, expr: &Expr) -> Expr {
        match expr {
            Expr::Var(v) => self.get(*v).cloned().unwrap_or_else(|| expr.clone()),
            Expr::Shape(_)
            | Expr::Size(_)
            | Expr::Axis(_)
            | Expr::Axes(_)
            | Expr::Sizes(_)
            | Expr::Range(_) => expr.clone(),
            // an abstract whose entries all ground out becomes the
            // structurally equal shape
            Expr::Abstract(a) => {
                Abstract(a.0.iter().map(|s| self.apply_sizelike(s)).collect()).canonical()
            }
            Expr::Arrow(ar) => Expr::Arrow(Arrow {
                lhs: Box::new(self.apply_once(&ar.lhs)),
                rhs: Box::new(self.apply_once(&ar.rhs)),
            }),
            Expr::Compound(c) => Expr::Compound(Compound {
                expr: Box::new(self.apply_once(&c.expr)),
                subject_to: self.apply_subject_to(&c.subject_to),
            }),
            Expr::BinOp(b) => Expr::binop(b.op, self.apply_once(&b.a), self.apply_once(&b.b)),
            Expr::UnaryOp(u) => Expr::unary(u.op, self.apply_once(&u.a)),
            Expr::Index(i) => Expr::Index(IndexOf {
                i: i.i,
                a: Box::new(self.apply_once(&i.a)),
            }),
            Expr::Transpose(t) => Expr::Transpose(TransposeOf {
                axes: t.axes.clone(),
                a: Box::new(self.apply_once(&t.a)),
            }),
            Expr::Slice(s) => Expr::Slice(SliceOf {
                slice: self.apply_slicelike(&s.slice),
                a: Box::new(self.apply_once(&s.a)),
            }),
            Expr::Repeat(r) => Expr::Repeat(RepeatOf {
                along: r.along,
                repeats: r.repeats.clone(),
                a: Box::new(self.apply_once(&r.a)),
            }),
            Expr::Concat(c) => Expr::Concat(ConcatOf {
                along: c.along,
                a: Box::new(self.apply_once(&c.a)),
                b: Box::new(self.apply_once(&c.b)),
            }),
            Expr::Broadcast(b) => Expr::Broadcast(BroadcastOf {
                a: Box::new(self.apply_once(&b.a)),
                b: Box::new(self.apply_once(&b.b)),
            }),
            Expr::Reduct(r) => Expr::Reduct(ReductOf {
                a: Box::new(self.apply_once(&r.a)),
                along: r.along,
            }),
        }
    }

    // A substituted abstract entry must remain a sizelike; a binding that
    // does not fit (a var bound to a whole shape, say) leaves the entry
    // untouched.
    fn apply_sizelike(&self, s: &Sizelike) -> Sizelike {
        let applied = self.apply_once(&s.to_expr());
        Sizelike::from_expr(&applied).unwrap_or_else(|| s.clone())
    }

    fn apply_slicelike(&self, s: &Slicelike) -> Slicelike {
        match s {
            Slicelike::Var(v) => match self.get(*v) {
                Some(Expr::Range(r)) => Slicelike::Range(*r),
                Some(Expr::Var(w)) => Slicelike::Var(*w),
                _ => s.clone(),
            },
            _ => s.clone(),
        }
    }
}

impl FromIterator<(Var, Expr)> for Subst {
    fn from_iter<I: IntoIterator<Item = (Var, Expr)>>(iter: I) -> Self {
        Subst {
            subs: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_substitution_is_identity() {
        let e = Expr::arrow(Expr::var('a'), Expr::var('b'));
        assert_eq!(Subst::new().apply(&e), e);
    }

    #[test]
    fn chained_entries_resolve_to_fixpoint() {
        // a ↦ (b), b ↦ 2  — applying once leaves a b behind; apply
        // re-runs until stable
        let ss: Subst = [
            (Var('a'), Expr::Abstract(Abstract(vec![Sizelike::Var(Var('b'))]))),
            (Var('b'), Expr::size(2)),
        ]
        .into_iter()
        .collect();

        let got = ss.apply(&Expr::var('a'));
        assert_eq!(got, Expr::shape([2]));
        // idempotent on its own output
        assert_eq!(ss.apply(&got), got);
    }

    #[test]
    fn compose_updates_earlier_bindings() {
        let s1 = Subst::singleton(Var('a'), Expr::var('b'));
        let s2 = Subst::singleton(Var('b'), Expr::size(3));
        let ss = s1.compose(s2);
        assert_eq!(ss.apply(&Expr::var('a')), Expr::size(3));
        assert_eq!(ss.apply(&Expr::var('b')), Expr::size(3));
    }

    #[test]
    fn freevars_shrink_under_substitution() {
        let e = Expr::arrow(Expr::var('a'), Expr::var('b'));
        let ss = Subst::singleton(Var('a'), Expr::shape([2, 3]));
        let applied = ss.apply(&e);
        let fv = applied.freevars();
        assert!(!fv.contains(&Var('a')));
        assert!(fv.contains(&Var('b')));
    }

    #[test]
    fn slice_vars_substitute_to_ranges() {
        use caliper_ast::slice::Range;
        let e = Expr::slice_of(Slicelike::Var(Var('b')), Expr::shape([5, 3, 4]));
        let ss = Subst::singleton(Var('b'), Expr::Range(Range::new(0, 2, 1)));
        let got = ss.apply(&e);
        assert_eq!(
            got,
            Expr::slice_of(Range::new(0, 2, 1), Expr::shape([5, 3, 4]))
        );
    }
}
