//! # Caliper AST
//!
//! The term algebra of the Caliper shape-expression language: a small
//! symbolic grammar for describing the shapes of multidimensional arrays.
//!
//! A term can denote a concrete shape (`(2, 3, 4)`), a shape with free
//! variables (`(a, b)`), an arithmetic or structural function over shapes
//! (`Π a`, `T⁽⁰ ¹ ³ ²⁾ a`, `a[0:2]`), an arrow connecting input shapes to
//! an output shape, or an expression refined by a predicate
//! (`{ a → b → b | (Π a = Π b) }`).
//!
//! This crate owns the terms and everything value-like about them:
//! structural queries (`freevars`, `sub_exprs`), the concrete operation
//! surface of [`Shape`](shape::Shape) and [`Abstract`](shape::Abstract),
//! notation, and serialization. Substitution, reduction, unification and
//! inference live in `caliper-check`; the textual parser in
//! `caliper-parse`.
//!
//! ## Example
//!
//! ```rust
//! use caliper_ast::prelude::*;
//!
//! // MatMul: (a, b) → (b, c) → (a, c)
//! let matmul = make_arrow([
//!     Expr::Abstract(Abstract(vec![Var('a').into(), Var('b').into()])),
//!     Expr::Abstract(Abstract(vec![Var('b').into(), Var('c').into()])),
//!     Expr::Abstract(Abstract(vec![Var('a').into(), Var('c').into()])),
//! ])
//! .unwrap();
//!
//! assert_eq!(matmul.to_string(), "(a, b) → (b, c) → (a, c)");
//! ```

pub mod error;
pub mod expr;
pub mod op;
pub mod pretty;
pub mod ser;
pub mod shape;
pub mod slice;

/// Prelude - common imports
pub mod prelude {
    pub use crate::error::{ShapeError, ShapeResult};
    pub use crate::expr::{
        make_arrow, Arrow, Axes, Axis, BinOp, BroadcastOf, Compound, ConcatOf, Expr, IndexOf,
        RepeatOf, ReductOf, Size, Sizelike, Sizes, SliceOf, SubjectTo, TransposeOf, UnaryOp, Var,
    };
    pub use crate::op::{BinOpKind, CmpOp, LogicOp, UnaryOpKind};
    pub use crate::shape::{cons, gen, Abstract, Shape};
    pub use crate::slice::{Range, Slicelike};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn scalar_is_the_empty_shape() {
        assert!(Shape::scalar().is_scalar());
        assert_eq!(Shape::scalar(), Shape(vec![]));
    }

    #[test]
    fn gen_alphabet_display() {
        let two = gen(2).unwrap();
        assert_eq!(two.to_string(), "(a, b)");

        let all = gen(50).unwrap();
        assert_eq!(
            all.to_string(),
            "(a, b, c, d, e, f, g, h, i, j, k, l, m, n, o, p, q, r, s, t, u, v, w, x, y, z, \
             α, β, γ, δ, ε, ζ, η, θ, ι, κ, λ, μ, ν, ξ, ο, π, ρ, ς, σ, τ, υ, φ, χ, ψ)"
        );
    }

    #[test]
    fn trace_signature() {
        let trace = Expr::arrow(
            Expr::Abstract(Abstract(vec![Var('a').into(), Var('a').into()])),
            Expr::shape([]),
        );
        assert_eq!(trace.to_string(), "(a, a) → ()");
    }
}
