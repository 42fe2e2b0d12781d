//! # Caliper Check
//!
//! Hindley–Milner-style inference over Caliper shape expressions.
//!
//! Given an arrow expression and a concrete argument, [`infer_app`]
//! unifies the argument with the arrow's domain, instantiates the free
//! variables of the codomain, evaluates refinement predicates, and reduces
//! built-in operators — returning the remaining arrow or the resolved
//! shape.
//!
//! ## Example
//!
//! ```rust
//! use caliper_ast::prelude::*;
//! use caliper_check::infer_app;
//!
//! // MatMul: (a, b) → (b, c) → (a, c)
//! let matmul = make_arrow([
//!     Expr::Abstract(Abstract(vec![Var('a').into(), Var('b').into()])),
//!     Expr::Abstract(Abstract(vec![Var('b').into(), Var('c').into()])),
//!     Expr::Abstract(Abstract(vec![Var('a').into(), Var('c').into()])),
//! ])
//! .unwrap();
//!
//! let partial = infer_app(&matmul, &Expr::shape([2, 3])).unwrap();
//! assert_eq!(partial.to_string(), "(3, c) → (2, c)");
//!
//! let result = infer_app(&partial, &Expr::shape([3, 4])).unwrap();
//! assert_eq!(result, Expr::shape([2, 4]));
//! ```

pub mod error;
pub mod infer;
pub mod reduce;
pub mod solve;
pub mod subst;
pub mod unify;

pub use error::{SolveError, SolveResult};
pub use infer::infer_app;
pub use reduce::{reduce, resolve_size};
pub use solve::eval;
pub use subst::Subst;
pub use unify::unify;
