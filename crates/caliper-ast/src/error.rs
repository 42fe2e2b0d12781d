//! Domain errors for concrete shape operations

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Invalid axis {axis} for a shape with {dims} dimension(s)")]
    InvalidAxis { axis: usize, dims: usize },

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimMismatch { expected: usize, got: usize },

    #[error("Repeated axis {axis} in permutation pattern")]
    RepeatedAxis { axis: usize },

    #[error("Invalid slice range {start}:{end} for a dimension of size {size}")]
    InvalidSlice {
        start: usize,
        end: usize,
        size: usize,
    },

    #[error("Invalid dimension {dim} for a shape with {dims} dimension(s)")]
    InvalidDim { dim: isize, dims: usize },

    #[error("Expected {expected} repeat(s), got {got}")]
    RepeatMismatch { expected: usize, got: usize },

    #[error("Entry {dim} is already a slice and cannot be sliced again")]
    UnsliceableEntry { dim: usize },

    #[error("Cannot generate an abstract shape with zero dimensions")]
    EmptyGen,

    #[error("Cannot broadcast: dimension {dim} has sizes {a} and {b}, neither of which is 1")]
    Broadcast { dim: usize, a: usize, b: usize },

    #[error("Division by zero in a size expression")]
    DivByZero,

    #[error("Size underflow: {a} - {b} is negative")]
    Underflow { a: usize, b: usize },

    #[error("Cannot generate {wanted} fresh variables; the alphabet has {available}")]
    AlphabetExhausted { wanted: usize, available: usize },
}

pub type ShapeResult<T> = Result<T, ShapeError>;
