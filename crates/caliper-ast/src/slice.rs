//! Slicing ranges
//!
//! A [`Range`] is a concrete `start:end:step` slice. A [`Slicelike`] is what
//! a [`SliceOf`](crate::expr::SliceOf) term carries: a single range, one
//! range per axis, or a still-unbound variable.

use serde::{Deserialize, Serialize};

use crate::error::{ShapeError, ShapeResult};
use crate::expr::Var;

/// A concrete slicing range over one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: usize,
    pub end: usize,
    pub step: usize,
}

impl Range {
    pub fn new(start: usize, end: usize, step: usize) -> Self {
        Range { start, end, step }
    }

    /// A single-point slice `[i]`, equivalent to `i:i+1:1`
    pub fn point(i: usize) -> Self {
        Range {
            start: i,
            end: i + 1,
            step: 1,
        }
    }

    /// The size of a dimension of size `size` after this slice is applied.
    ///
    /// Bounds: `start < end ≤ size`; anything else is an error. With a step
    /// above 1 the result is `(end - start) / step`, floored at 1.
    pub fn sliced_size(&self, size: usize) -> ShapeResult<usize> {
        if self.start >= self.end || self.end > size {
            return Err(ShapeError::InvalidSlice {
                start: self.start,
                end: self.end,
                size,
            });
        }
        let span = self.end - self.start;
        if self.step > 1 {
            Ok((span / self.step).max(1))
        } else {
            Ok(span)
        }
    }
}

/// Anything that can stand in slice position of a `SliceOf` term
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slicelike {
    /// One range, applied to the leading axis
    Range(Range),
    /// One range per axis
    Ranges(Vec<Range>),
    /// Not yet known; `SliceOf` is irreducible until this is substituted
    Var(Var),
}

impl Slicelike {
    pub fn is_var(&self) -> bool {
        matches!(self, Slicelike::Var(_))
    }
}

impl From<Range> for Slicelike {
    fn from(r: Range) -> Self {
        Slicelike::Range(r)
    }
}

impl From<Vec<Range>> for Slicelike {
    fn from(rs: Vec<Range>) -> Self {
        Slicelike::Ranges(rs)
    }
}
