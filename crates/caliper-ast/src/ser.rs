//! Serialization for shape expressions
//!
//! Two formats, both isomorphic to the in-memory term:
//! - JSON (via serde_json), for tooling
//! - binary (via bincode), for compact interchange

use thiserror::Error;

use crate::expr::Expr;

/// Serialization error
#[derive(Error, Debug)]
pub enum SerError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Binary error: {0}")]
    Binary(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, SerError>;

// ============ JSON ============

/// Serialize an expression to pretty-printed JSON
pub fn to_json(expr: &Expr) -> Result<String> {
    Ok(serde_json::to_string_pretty(expr)?)
}

/// Serialize an expression to compact JSON (no whitespace)
pub fn to_json_compact(expr: &Expr) -> Result<String> {
    Ok(serde_json::to_string(expr)?)
}

/// Deserialize an expression from JSON
pub fn from_json(json: &str) -> Result<Expr> {
    Ok(serde_json::from_str(json)?)
}

// ============ Binary ============

/// Serialize an expression to binary
pub fn to_binary(expr: &Expr) -> Result<Vec<u8>> {
    Ok(bincode::serialize(expr)?)
}

/// Deserialize an expression from binary
pub fn from_binary(bytes: &[u8]) -> Result<Expr> {
    Ok(bincode::deserialize(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{make_arrow, Expr, SubjectTo};
    use crate::op::{CmpOp, UnaryOpKind};

    fn reshape() -> Expr {
        Expr::compound(
            make_arrow([Expr::var('a'), Expr::var('b'), Expr::var('b')]).unwrap(),
            SubjectTo::cmp(
                CmpOp::Eq,
                Expr::unary(UnaryOpKind::Prod, Expr::var('a')),
                Expr::unary(UnaryOpKind::Prod, Expr::var('b')),
            ),
        )
    }

    #[test]
    fn json_roundtrip() {
        let expr = reshape();
        let json = to_json(&expr).unwrap();
        assert_eq!(from_json(&json).unwrap(), expr);
    }

    #[test]
    fn binary_roundtrip() {
        let expr = reshape();
        let bytes = to_binary(&expr).unwrap();
        assert_eq!(from_binary(&bytes).unwrap(), expr);
    }
}
