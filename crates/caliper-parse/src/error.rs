//! Parse errors

use thiserror::Error;

use crate::lexer::Token;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unrecognized input: {text:?}")]
    Unrecognized { text: String },

    #[error("Unexpected token {found:?}, expected {expected}")]
    Unexpected { found: Token, expected: String },

    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("Trailing input after a complete expression: {found:?}")]
    Trailing { found: Token },

    #[error("{0} cannot appear inside a shape")]
    NotASizelike(String),
}

pub type ParseResult<T> = Result<T, ParseError>;
