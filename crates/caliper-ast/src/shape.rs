//! Concrete and abstract shapes
//!
//! A [`Shape`] is a fully concrete sequence of dimensions; `Shape(vec![])`
//! is the canonical scalar. An [`Abstract`] is the same sequence with at
//! least one symbolic entry. Both expose the operation surface used by
//! operator reduction: transpose, slice, repeat, concat, broadcast, and the
//! vector/scalar predicates.

use serde::{Deserialize, Serialize};

use crate::error::{ShapeError, ShapeResult};
use crate::expr::{Axis, BinOp, Expr, Size, Sizelike, SliceOf, UnaryOp, Var};
use crate::op::{BinOpKind, UnaryOpKind};
use crate::slice::{Range, Slicelike};

/// The shape of a multidimensional array
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape(pub Vec<usize>);

/// A shape with symbolic dimensions
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Abstract(pub Vec<Sizelike>);

/// The alphabet available for generated variables: `a..z` then `α..ψ`.
pub fn var_alphabet() -> impl Iterator<Item = char> {
    ('a'..='z').chain('α'..='ψ')
}

/// Generate an abstract shape of `d` fresh variables, named in alphabet
/// order. Pure and stateless: repeated calls return equal sequences.
pub fn gen(d: usize) -> ShapeResult<Abstract> {
    let available = var_alphabet().count();
    if d == 0 {
        return Err(ShapeError::EmptyGen);
    }
    if d > available {
        return Err(ShapeError::AlphabetExhausted {
            wanted: d,
            available,
        });
    }
    Ok(Abstract(
        var_alphabet().take(d).map(|c| Sizelike::Var(Var(c))).collect(),
    ))
}

/// Associative concatenation of two shape-or-abstract sequences.
///
/// The result is a `Shape` when both operands are fully concrete, an
/// `Abstract` otherwise. `None` when either operand is not a sequence.
pub fn cons(a: &Expr, b: &Expr) -> Option<Expr> {
    let mut entries = seq_entries(a)?;
    entries.extend(seq_entries(b)?);
    Some(Abstract(entries).canonical())
}

fn seq_entries(e: &Expr) -> Option<Vec<Sizelike>> {
    match e {
        Expr::Shape(s) => Some(s.0.iter().map(|&n| Sizelike::Size(Size(n))).collect()),
        Expr::Abstract(a) => Some(a.0.clone()),
        _ => None,
    }
}

/// Validate a permutation and apply it: `out[i] = data[axes[i]]`.
///
/// `Ok(None)` signals that `axes` is the identity permutation and the
/// caller should treat the operation as a no-op rather than an error.
fn permuted<T: Clone>(axes: &[usize], data: &[T]) -> ShapeResult<Option<Vec<T>>> {
    if axes.len() != data.len() {
        return Err(ShapeError::DimMismatch {
            expected: data.len(),
            got: axes.len(),
        });
    }
    let mut seen = vec![false; data.len()];
    for &ax in axes {
        if ax >= data.len() {
            return Err(ShapeError::InvalidAxis {
                axis: ax,
                dims: data.len(),
            });
        }
        if seen[ax] {
            return Err(ShapeError::RepeatedAxis { axis: ax });
        }
        seen[ax] = true;
    }
    if axes.iter().enumerate().all(|(i, &ax)| i == ax) {
        return Ok(None);
    }
    Ok(Some(axes.iter().map(|&ax| data[ax].clone()).collect()))
}

// ============ Shape ============

impl Shape {
    pub fn new(dims: impl IntoIterator<Item = usize>) -> Self {
        Shape(dims.into_iter().collect())
    }

    /// The unique scalar shape `()`
    pub fn scalar() -> Self {
        Shape(Vec::new())
    }

    /// Number of dimensions
    pub fn dims(&self) -> usize {
        self.0.len()
    }

    /// Product of all dimensions; 1 for the scalar shape
    pub fn total_size(&self) -> usize {
        self.0.iter().product()
    }

    /// The dimension at `d`, with negative indexing from the end.
    /// The scalar shape reports size 0 at dimension 0.
    pub fn dim(&self, d: isize) -> ShapeResult<usize> {
        if self.is_scalar() {
            return if d == 0 {
                Ok(0)
            } else {
                Err(ShapeError::InvalidDim {
                    dim: d,
                    dims: 0,
                })
            };
        }
        let dims = self.dims() as isize;
        let idx = if d < 0 { dims + d } else { d };
        if idx < 0 || idx >= dims {
            return Err(ShapeError::InvalidDim {
                dim: d,
                dims: self.dims(),
            });
        }
        Ok(self.0[idx as usize])
    }

    // ============ Predicates ============

    pub fn is_scalar(&self) -> bool {
        self.0.is_empty()
    }

    /// Scalar, all-zero, or a total size of one
    pub fn is_scalar_equiv(&self) -> bool {
        if self.is_scalar() {
            return true;
        }
        if self.0.iter().all(|&d| d == 0) {
            return true;
        }
        self.total_size() == 1
    }

    /// Vanilla vector, column vector, or row vector
    pub fn is_vector(&self) -> bool {
        self.is_col_vec() || self.is_row_vec() || self.0.len() == 1
    }

    /// `(x, 1)` with `x > 1`
    pub fn is_col_vec(&self) -> bool {
        self.0.len() == 2 && self.0[1] == 1 && self.0[0] > 1
    }

    /// `(1, x)` with `x > 1`
    pub fn is_row_vec(&self) -> bool {
        self.0.len() == 2 && self.0[0] == 1 && self.0[1] > 1
    }

    /// At most one non-unit dimension: `(1, 1, …, n, …, 1)`
    pub fn is_vector_like(&self) -> bool {
        self.0.iter().filter(|&&d| d != 1).count() <= 1
    }

    /// Two-dimensional; row and column vectors count as matrices
    pub fn is_matrix(&self) -> bool {
        self.0.len() == 2
    }

    /// Soft equality: scalars are all equal, and a length-1 vector equals a
    /// row/column vector whose non-unit size matches.
    pub fn soft_eq(&self, other: &Shape) -> bool {
        if self.is_scalar() && other.is_scalar() {
            return true;
        }

        if self.is_vector() && other.is_vector() {
            match (self.0.len(), other.0.len()) {
                (2, 1) => {
                    return (self.is_col_vec() && self.0[0] == other.0[0])
                        || (self.is_row_vec() && self.0[1] == other.0[0]);
                }
                (1, 2) => {
                    return (other.is_col_vec() && other.0[0] == self.0[0])
                        || (other.is_row_vec() && other.0[1] == self.0[0]);
                }
                _ => {}
            }
        }

        self.0 == other.0
    }

    // ============ Operations ============

    /// Permute the dimensions. `Ok(None)` means the permutation is the
    /// identity and the shape is unchanged.
    pub fn transpose(&self, axes: &[usize]) -> ShapeResult<Option<Shape>> {
        Ok(permuted(axes, &self.0)?.map(Shape))
    }

    /// The shape after slicing. `None` entries leave their axis untouched;
    /// sliced-away size-1 axes are dropped.
    pub fn slice(&self, slices: &[Option<Range>]) -> ShapeResult<Shape> {
        if slices.len() > self.dims() {
            return Err(ShapeError::DimMismatch {
                expected: self.dims(),
                got: slices.len(),
            });
        }

        let mut ret = self.0.clone();
        for (d, size) in self.0.iter().enumerate() {
            if let Some(Some(r)) = slices.get(d) {
                ret[d] = r.sliced_size(*size)?;
            }
        }

        drop_sliced_ones(&mut ret, slices, |&n| n == 1);
        Ok(Shape(ret))
    }

    /// The shape after repeating `repeats` along an axis.
    ///
    /// Returns the new shape, the per-entry repeat counts actually used
    /// (a single count is broadcast to the axis size), and the size of the
    /// repeated axis.
    pub fn repeat(
        &self,
        along: Axis,
        repeats: &[usize],
    ) -> ShapeResult<(Shape, Vec<usize>, usize)> {
        let (mut new_shape, size, axis) = match along {
            Axis::All => {
                let size = self.total_size();
                (Shape(vec![size]), size, 0)
            }
            Axis::At(ax) if self.is_scalar() => (Shape(vec![1; ax + 1]), 1, ax),
            Axis::At(ax)
                if self.is_vector() && !self.is_row_vec() && !self.is_col_vec() && ax == 1 =>
            {
                let mut dims = self.0.clone();
                dims.push(1);
                (Shape(dims), 1, ax)
            }
            Axis::At(ax) => {
                if ax >= self.dims() {
                    return Err(ShapeError::InvalidAxis {
                        axis: ax,
                        dims: self.dims(),
                    });
                }
                (self.clone(), self.0[ax], ax)
            }
        };

        let mut reps = repeats.to_vec();
        if reps.len() == 1 {
            reps = vec![reps[0]; size];
        }
        if reps.len() != size {
            return Err(ShapeError::RepeatMismatch {
                expected: size,
                got: reps.len(),
            });
        }

        new_shape.0[axis] = reps.iter().sum();
        Ok((new_shape, reps, size))
    }

    /// Concatenate other shapes along an axis. All shapes must agree on
    /// every dimension except `along`, which sums.
    pub fn concat(&self, along: Axis, others: &[Shape]) -> ShapeResult<Shape> {
        let dims = self.dims();
        for other in others {
            if other.dims() != dims {
                return Err(ShapeError::DimMismatch {
                    expected: dims,
                    got: other.dims(),
                });
            }
        }

        let axis = along.resolve(dims);
        if axis >= dims {
            return Err(ShapeError::InvalidAxis { axis, dims });
        }

        let mut new_shape = self.clone();
        for other in others {
            for d in 0..dims {
                if d == axis {
                    new_shape.0[d] += other.0[d];
                } else if new_shape.0[d] != other.0[d] {
                    return Err(ShapeError::DimMismatch {
                        expected: new_shape.0[d],
                        got: other.0[d],
                    });
                }
            }
        }
        Ok(new_shape)
    }

    /// Mutually broadcast two shapes under the right-aligned rule: each
    /// trailing pair must match or contain a 1; the longer prefix passes
    /// through.
    pub fn broadcast(&self, other: &Shape) -> ShapeResult<Shape> {
        let (long, short) = if self.dims() >= other.dims() {
            (&self.0, &other.0)
        } else {
            (&other.0, &self.0)
        };
        let offset = long.len() - short.len();

        let mut out = long.clone();
        for (i, &s) in short.iter().enumerate() {
            let l = long[offset + i];
            out[offset + i] = if l == s || s == 1 {
                l
            } else if l == 1 {
                s
            } else {
                return Err(ShapeError::Broadcast {
                    dim: offset + i,
                    a: l,
                    b: s,
                });
            };
        }
        Ok(Shape(out))
    }

    pub fn to_abstract(&self) -> Abstract {
        Abstract(self.0.iter().map(|&n| Sizelike::Size(Size(n))).collect())
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Shape {
        Shape(dims)
    }
}

// ============ Abstract ============

impl Abstract {
    pub fn new(entries: impl IntoIterator<Item = Sizelike>) -> Self {
        Abstract(entries.into_iter().collect())
    }

    pub fn dims(&self) -> usize {
        self.0.len()
    }

    pub fn dim_size(&self, d: usize) -> ShapeResult<Sizelike> {
        if d >= self.dims() {
            return Err(ShapeError::InvalidDim {
                dim: d as isize,
                dims: self.dims(),
            });
        }
        Ok(self.0[d].clone())
    }

    /// `Some(shape)` when every entry is a concrete size.
    pub fn to_shape(&self) -> Option<Shape> {
        let mut dims = Vec::with_capacity(self.0.len());
        for entry in &self.0 {
            match entry {
                Sizelike::Size(Size(n)) => dims.push(*n),
                _ => return None,
            }
        }
        Some(Shape(dims))
    }

    /// Canonicalize: an all-`Size` abstract becomes the equal `Shape`.
    pub fn canonical(self) -> Expr {
        match self.to_shape() {
            Some(s) => Expr::Shape(s),
            None => Expr::Abstract(self),
        }
    }

    /// Permute the entries symbolically. `Ok(None)` is the identity no-op.
    pub fn transpose(&self, axes: &[usize]) -> ShapeResult<Option<Abstract>> {
        Ok(permuted(axes, &self.0)?.map(Abstract))
    }

    /// The shape expression after slicing.
    ///
    /// Fully concrete abstracts delegate to [`Shape::slice`]. Symbolic
    /// entries with a slice applied become `Sizelike::SliceOf` wrappers,
    /// to be folded once substitution grounds them.
    pub fn slice(&self, slices: &[Option<Range>]) -> ShapeResult<Expr> {
        if let Some(shape) = self.to_shape() {
            return shape.slice(slices).map(Expr::Shape);
        }
        if slices.len() > self.dims() {
            return Err(ShapeError::DimMismatch {
                expected: self.dims(),
                got: slices.len(),
            });
        }

        let mut entries = Vec::with_capacity(self.0.len());
        for (d, entry) in self.0.iter().enumerate() {
            let sl = slices.get(d).copied().flatten();
            let Some(r) = sl else {
                entries.push(entry.clone());
                continue;
            };
            let sliced = match entry {
                Sizelike::Size(Size(n)) => Sizelike::Size(Size(r.sliced_size(*n)?)),
                Sizelike::Var(_) | Sizelike::BinOp(_) | Sizelike::UnaryOp(_) => {
                    Sizelike::SliceOf(Box::new(SliceOf {
                        slice: Slicelike::Range(r),
                        a: Box::new(entry.to_expr()),
                    }))
                }
                Sizelike::SliceOf(_) => {
                    return Err(ShapeError::UnsliceableEntry { dim: d });
                }
            };
            entries.push(sliced);
        }

        drop_sliced_ones(&mut entries, slices, |e| {
            matches!(e, Sizelike::Size(Size(1)))
        });
        Ok(Abstract(entries).canonical())
    }

    /// The shape expression after repeating along an axis.
    ///
    /// A symbolic axis repeated by a single count becomes
    /// `BinOp{Mul, axis, count}`; a symbolic axis with explicit per-entry
    /// counts is taken on faith and summed.
    pub fn repeat(
        &self,
        along: Axis,
        repeats: &[usize],
    ) -> ShapeResult<(Expr, Option<Vec<usize>>, Option<usize>)> {
        let (mut entries, sz, axis) = match along {
            Axis::All => {
                let sz = Sizelike::UnaryOp(UnaryOp {
                    op: UnaryOpKind::Prod,
                    a: Box::new(Expr::Abstract(self.clone())),
                });
                (vec![sz.clone()], sz, 0)
            }
            Axis::At(ax) if self.dims() == 1 && ax == 1 => {
                let mut entries = self.0.clone();
                entries.push(Sizelike::Size(Size(1)));
                (entries, Sizelike::Size(Size(1)), ax)
            }
            Axis::At(ax) => {
                if ax >= self.dims() {
                    return Err(ShapeError::InvalidAxis {
                        axis: ax,
                        dims: self.dims(),
                    });
                }
                (self.0.clone(), self.0[ax].clone(), ax)
            }
        };

        match sz {
            Sizelike::Size(Size(n)) => {
                let mut reps = repeats.to_vec();
                if n > 0 && reps.len() == 1 {
                    reps = vec![reps[0]; n];
                }
                if n > 0 && reps.len() != n {
                    return Err(ShapeError::RepeatMismatch {
                        expected: n,
                        got: reps.len(),
                    });
                }
                entries[axis] = Sizelike::Size(Size(reps.iter().sum()));
                Ok((Abstract(entries).canonical(), Some(reps), Some(n)))
            }
            symbolic => {
                if repeats.len() == 1 {
                    entries[axis] = Sizelike::BinOp(BinOp {
                        op: BinOpKind::Mul,
                        a: Box::new(symbolic.to_expr()),
                        b: Box::new(Expr::size(repeats[0])),
                    });
                    Ok((
                        Expr::Abstract(Abstract(entries)),
                        Some(repeats.to_vec()),
                        None,
                    ))
                } else {
                    // the symbolic axis size cannot be checked against the
                    // repeat count; taken on faith
                    entries[axis] = Sizelike::Size(Size(repeats.iter().sum()));
                    Ok((Abstract(entries).canonical(), None, None))
                }
            }
        }
    }
}

impl From<Vec<Sizelike>> for Abstract {
    fn from(entries: Vec<Sizelike>) -> Abstract {
        Abstract(entries)
    }
}

/// Drop every size-1 entry whose original axis had an explicit slice.
fn drop_sliced_ones<T>(
    entries: &mut Vec<T>,
    slices: &[Option<Range>],
    is_one: impl Fn(&T) -> bool,
) {
    let mut offset = 0;
    let mut d = 0;
    while d < entries.len() {
        let orig = offset + d;
        if is_one(&entries[d]) && orig < slices.len() && slices[orig].is_some() {
            entries.remove(d);
            offset += 1;
        } else {
            d += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(dims: &[usize]) -> Shape {
        Shape(dims.to_vec())
    }

    fn r(start: usize, end: usize) -> Option<Range> {
        Some(Range::new(start, end, 1))
    }

    #[test]
    fn gen_is_deterministic() {
        let a = gen(2).unwrap();
        let b = gen(2).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            a,
            Abstract(vec![Sizelike::Var(Var('a')), Sizelike::Var(Var('b'))])
        );
    }

    #[test]
    fn gen_covers_latin_and_greek() {
        let all = gen(50).unwrap();
        assert_eq!(all.dims(), 50);
        assert_eq!(all.0[0], Sizelike::Var(Var('a')));
        assert_eq!(all.0[25], Sizelike::Var(Var('z')));
        assert_eq!(all.0[26], Sizelike::Var(Var('α')));
        assert_eq!(all.0[49], Sizelike::Var(Var('ψ')));
        assert!(gen(51).is_err());
        assert!(gen(0).is_err());
    }

    #[test]
    fn soft_equality() {
        let eq_cases = [
            (s(&[]), s(&[])),
            (s(&[2]), s(&[2, 1])),
            (s(&[1, 2]), s(&[2])),
            (s(&[1, 2, 3]), s(&[1, 2, 3])),
        ];
        for (a, b) in &eq_cases {
            assert!(a.soft_eq(b), "{a:?} = {b:?}");
            assert!(b.soft_eq(a), "{b:?} = {a:?}");
        }

        let ne_cases = [
            (s(&[]), s(&[1])),
            (s(&[2]), s(&[1, 3])),
            (s(&[1, 2, 3]), s(&[1, 2, 4])),
            (s(&[2, 1]), s(&[1, 2])),
            (s(&[2, 3]), s(&[3, 2])),
        ];
        for (a, b) in &ne_cases {
            assert!(!a.soft_eq(b), "{a:?} ≠ {b:?}");
            assert!(!b.soft_eq(a), "{b:?} ≠ {a:?}");
        }
    }

    #[test]
    fn predicates() {
        let scalar = s(&[]);
        assert!(scalar.is_scalar());
        assert!(scalar.is_scalar_equiv());
        assert!(!scalar.is_vector());

        let unit = s(&[1]);
        assert!(!unit.is_scalar());
        assert!(unit.is_scalar_equiv());
        assert!(unit.is_vector());
        assert!(unit.is_vector_like());

        let col = s(&[2, 1]);
        assert!(col.is_col_vec());
        assert!(!col.is_row_vec());
        assert!(col.is_vector());
        assert!(col.is_vector_like());
        assert!(col.is_matrix());

        let row = s(&[1, 2]);
        assert!(row.is_row_vec());
        assert!(!row.is_col_vec());
        assert!(row.is_vector());

        let mat = s(&[2, 2]);
        assert!(mat.is_matrix());
        assert!(!mat.is_vector());

        let ones = s(&[1, 1]);
        assert!(ones.is_scalar_equiv());
        assert!(ones.is_vector_like());
        assert!(!ones.is_vector());

        assert!(s(&[0, 0, 0]).is_scalar_equiv());
        assert!(!s(&[1, 2, 0, 3]).is_scalar_equiv());
        assert!(!s(&[2, 3]).is_scalar_equiv());
    }

    #[test]
    fn dim_with_negative_indexing() {
        let shape = s(&[2, 3, 4]);
        assert_eq!(shape.dim(0).unwrap(), 2);
        assert_eq!(shape.dim(1).unwrap(), 3);
        assert_eq!(shape.dim(2).unwrap(), 4);
        assert_eq!(shape.dim(-1).unwrap(), 4);
        assert_eq!(shape.dim(-2).unwrap(), 3);
        assert_eq!(shape.dim(-3).unwrap(), 2);
        assert!(shape.dim(3).is_err());
        assert!(shape.dim(-4).is_err());

        assert_eq!(s(&[]).dim(0).unwrap(), 0);
        assert!(s(&[]).dim(-1).is_err());
    }

    #[test]
    fn transpose_and_noop() {
        let shape = s(&[1, 2, 3, 4]);
        assert_eq!(
            shape.transpose(&[0, 1, 3, 2]).unwrap(),
            Some(s(&[1, 2, 4, 3]))
        );
        assert_eq!(shape.transpose(&[0, 1, 2, 3]).unwrap(), None);
        assert!(shape.transpose(&[0, 1]).is_err());
        assert!(shape.transpose(&[0, 0, 1, 2]).is_err());
        assert!(shape.transpose(&[0, 1, 2, 4]).is_err());
    }

    #[test]
    fn slicing() {
        // scalars cannot be sliced
        assert_eq!(Shape::scalar().slice(&[]).unwrap(), Shape::scalar());
        assert!(Shape::scalar().slice(&[r(0, 1)]).is_err());

        // vec[0] collapses to the scalar shape
        assert_eq!(s(&[2]).slice(&[r(0, 1)]).unwrap(), Shape::scalar());
        assert!(s(&[2]).slice(&[r(3, 4)]).is_err());
        assert!(s(&[2]).slice(&[None, r(0, 1)]).is_err());

        // stepped slice
        assert_eq!(
            s(&[5]).slice(&[Some(Range::new(1, 4, 2))]).unwrap(),
            Shape::scalar()
        );

        // interior 1s survive only when unsliced
        assert_eq!(
            s(&[1, 2, 2]).slice(&[r(0, 1), None, None]).unwrap(),
            s(&[2, 2])
        );
        assert_eq!(
            s(&[1, 2, 2]).slice(&[None, r(0, 1), None]).unwrap(),
            s(&[1, 2])
        );
        assert_eq!(
            s(&[1, 1, 2, 2]).slice(&[r(0, 1), None, None, None]).unwrap(),
            s(&[1, 2, 2])
        );
        assert_eq!(s(&[1, 1, 2, 2]).slice(&[r(0, 1)]).unwrap(), s(&[1, 2, 2]));
    }

    #[test]
    fn repeating() {
        let cases: &[(&[usize], &[usize], Axis, &[usize], &[usize], usize)] = &[
            (&[], &[3], Axis::At(0), &[3], &[3], 1),
            (&[], &[3], Axis::At(1), &[1, 3], &[3], 1),
            (&[2], &[3], Axis::At(0), &[6], &[3, 3], 2),
            (&[2], &[3], Axis::At(1), &[2, 3], &[3], 1),
            (&[2, 1], &[3], Axis::At(0), &[6, 1], &[3, 3], 2),
            (&[2, 1], &[3], Axis::At(1), &[2, 3], &[3], 1),
            (&[1, 2], &[3], Axis::At(0), &[3, 2], &[3], 1),
            (&[1, 2], &[3], Axis::At(1), &[1, 6], &[3, 3], 2),
            (&[2, 3, 2], &[1, 2, 1], Axis::At(1), &[2, 4, 2], &[1, 2, 1], 3),
            (
                &[2, 3, 2],
                &[2],
                Axis::All,
                &[24],
                &[2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2],
                12,
            ),
            (&[2, 3, 2], &[2], Axis::At(2), &[2, 3, 4], &[2, 2], 2),
        ];
        for (shape, repeats, axis, want, want_reps, want_size) in cases {
            let (got, reps, size) = s(shape).repeat(*axis, repeats).unwrap();
            assert_eq!(got, s(want), "{shape:?} repeat {repeats:?} along {axis:?}");
            assert_eq!(reps, want_reps.to_vec());
            assert_eq!(size, *want_size);
        }

        assert!(s(&[2, 1]).repeat(Axis::At(2), &[3]).is_err());
        assert!(s(&[2, 3, 2]).repeat(Axis::At(0), &[3, 1, 2]).is_err());
    }

    #[test]
    fn concatenating() {
        assert_eq!(
            s(&[2, 2])
                .concat(Axis::At(0), &[s(&[2, 2]), s(&[2, 2])])
                .unwrap(),
            s(&[6, 2])
        );
        assert_eq!(
            s(&[2, 2])
                .concat(Axis::At(1), &[s(&[2, 2]), s(&[2, 2])])
                .unwrap(),
            s(&[2, 6])
        );
        assert_eq!(
            s(&[2, 2])
                .concat(Axis::All, &[s(&[2, 2]), s(&[2, 2])])
                .unwrap(),
            s(&[6, 2])
        );
        assert_eq!(s(&[2]).concat(Axis::At(0), &[]).unwrap(), s(&[2]));

        assert!(s(&[2, 2]).concat(Axis::At(0), &[s(&[2, 3, 2])]).is_err());
        assert!(s(&[2, 2]).concat(Axis::At(5), &[s(&[2, 2])]).is_err());
        assert!(s(&[2, 2])
            .concat(Axis::At(0), &[s(&[2, 2]), s(&[2, 3])])
            .is_err());
    }

    #[test]
    fn broadcasting() {
        assert_eq!(
            s(&[2, 3, 4]).broadcast(&s(&[2, 1, 4])).unwrap(),
            s(&[2, 3, 4])
        );
        assert_eq!(s(&[5, 4]).broadcast(&s(&[4])).unwrap(), s(&[5, 4]));
        assert_eq!(s(&[1]).broadcast(&s(&[3, 2])).unwrap(), s(&[3, 2]));
        assert!(s(&[2, 3]).broadcast(&s(&[2, 4])).is_err());
    }

    #[test]
    fn abstract_transpose() {
        let a = Abstract(vec![
            Sizelike::Size(Size(1)),
            Sizelike::BinOp(BinOp {
                op: BinOpKind::Add,
                a: Box::new(Expr::size(1)),
                b: Box::new(Expr::size(2)),
            }),
        ]);
        assert_eq!(a.transpose(&[0, 1]).unwrap(), None);
        let flipped = a.transpose(&[1, 0]).unwrap().unwrap();
        assert_eq!(flipped.0[0], a.0[1]);
        assert_eq!(flipped.0[1], a.0[0]);
    }

    #[test]
    fn abstract_slice_wraps_symbolic_entries() {
        // all-var abstract with nothing sliced is unchanged
        let ab = gen(2).unwrap();
        assert_eq!(ab.slice(&[]).unwrap(), Expr::Abstract(gen(2).unwrap()));

        // a sliced var wraps
        let got = ab.slice(&[None, r(1, 2)]).unwrap();
        let want = Expr::Abstract(Abstract(vec![
            Sizelike::Var(Var('a')),
            Sizelike::SliceOf(Box::new(SliceOf {
                slice: Slicelike::Range(Range::new(1, 2, 1)),
                a: Box::new(Expr::var('b')),
            })),
        ]));
        assert_eq!(got, want);

        // fully concrete abstracts delegate to Shape::slice
        let conc = Abstract(vec![Sizelike::Size(Size(2))]);
        assert_eq!(conc.slice(&[r(0, 1)]).unwrap(), Expr::Shape(Shape::scalar()));
        assert!(conc.slice(&[r(3, 4)]).is_err());

        // mixed entries: sizes slice concretely, vars wrap
        let mixed = Abstract(vec![Sizelike::Var(Var('a')), Sizelike::Size(Size(2))]);
        let got = mixed.slice(&[r(2, 3), r(0, 2)]).unwrap();
        let want = Expr::Abstract(Abstract(vec![
            Sizelike::SliceOf(Box::new(SliceOf {
                slice: Slicelike::Range(Range::new(2, 3, 1)),
                a: Box::new(Expr::var('a')),
            })),
            Sizelike::Size(Size(2)),
        ]));
        assert_eq!(got, want);
    }

    #[test]
    fn abstract_repeat() {
        let a1 = Abstract(vec![Sizelike::Var(Var('a'))]);

        // symbolic axis, generic repeat: multiply
        let (got, reps, size) = a1.repeat(Axis::At(0), &[3]).unwrap();
        let want = Expr::Abstract(Abstract(vec![Sizelike::BinOp(BinOp {
            op: BinOpKind::Mul,
            a: Box::new(Expr::var('a')),
            b: Box::new(Expr::size(3)),
        })]));
        assert_eq!(got, want);
        assert_eq!(reps, Some(vec![3]));
        assert_eq!(size, None);

        // appended trailing axis is concrete
        let (got, reps, size) = a1.repeat(Axis::At(1), &[3]).unwrap();
        let want = Expr::Abstract(Abstract(vec![
            Sizelike::Var(Var('a')),
            Sizelike::Size(Size(3)),
        ]));
        assert_eq!(got, want);
        assert_eq!(reps, Some(vec![3]));
        assert_eq!(size, Some(1));

        // explicit counts on a symbolic axis are summed on faith
        let ab = gen(2).unwrap();
        let (got, reps, size) = ab.repeat(Axis::At(0), &[1, 3]).unwrap();
        let want = Expr::Abstract(Abstract(vec![
            Sizelike::Size(Size(4)),
            Sizelike::Var(Var('b')),
        ]));
        assert_eq!(got, want);
        assert_eq!(reps, None);
        assert_eq!(size, None);

        let (got, _, _) = ab.repeat(Axis::At(1), &[3]).unwrap();
        let want = Expr::Abstract(Abstract(vec![
            Sizelike::Var(Var('a')),
            Sizelike::BinOp(BinOp {
                op: BinOpKind::Mul,
                a: Box::new(Expr::var('b')),
                b: Box::new(Expr::size(3)),
            }),
        ]));
        assert_eq!(got, want);
    }

    #[test]
    fn cons_flattens() {
        let a = Expr::shape([1, 2]);
        let b = Expr::shape([3]);
        assert_eq!(cons(&a, &b).unwrap(), Expr::shape([1, 2, 3]));

        let c = Expr::Abstract(gen(1).unwrap());
        assert_eq!(
            cons(&a, &c).unwrap(),
            Expr::Abstract(Abstract(vec![
                Sizelike::Size(Size(1)),
                Sizelike::Size(Size(2)),
                Sizelike::Var(Var('a')),
            ]))
        );

        assert_eq!(
            cons(&Expr::shape([]), &Expr::shape([])).unwrap(),
            Expr::shape([])
        );
        assert!(cons(&a, &Expr::var('x')).is_none());
    }
}
