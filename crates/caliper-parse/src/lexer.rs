//! Lexer for shape expressions
//!
//! Tokenizes the surface syntax using logos. Every Unicode operator has an
//! ASCII fallback: `->` for `→`, `P`/`S` for `Π`/`Σ`, `&&`/`||` for
//! `∧`/`∨`, `!=`/`<=`/`>=` for `≠`/`≤`/`≥`.

use logos::Logos;

use crate::error::{ParseError, ParseResult};

/// Token type
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    // ============ Delimiters ============
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("|")]
    Pipe,
    #[token("→")]
    #[token("->")]
    Arrow,

    // ============ Markers ============
    #[token("T")]
    Transpose,
    #[token("X")]
    AxesMark,
    #[token("Sz")]
    SizesMark,

    // ============ Unary operators ============
    #[token("Π")]
    #[token("P")]
    Prod,
    #[token("Σ")]
    #[token("S")]
    Sum,
    #[token("D")]
    Dims,
    #[token("∀")]
    ForAll,
    #[token("K")]
    Const,

    // ============ Binary operators ============
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("×")]
    #[token("*")]
    Star,
    #[token("÷")]
    #[token("/")]
    Slash,

    // ============ Comparison operators ============
    #[token("=")]
    Eq,
    #[token("≠")]
    #[token("!=")]
    Ne,
    #[token("≤")]
    #[token("<=")]
    Le,
    #[token("≥")]
    #[token(">=")]
    Ge,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("⚟")]
    Bc,

    // ============ Logic operators ============
    #[token("∧")]
    #[token("&&")]
    And,
    #[token("∨")]
    #[token("||")]
    Or,

    // ============ Atoms ============
    /// A variable letter: lowercase Latin or Greek
    #[regex(r"[a-zα-ω]", |lex| lex.slice().chars().next())]
    Letter(char),

    /// A base-10 non-negative integer
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<usize>().ok())]
    Number(usize),
}

/// Tokenize a source string, failing on the first unrecognized character.
pub fn lex(src: &str) -> ParseResult<Vec<Token>> {
    let mut toks = Vec::new();
    for (tok, span) in Token::lexer(src).spanned() {
        match tok {
            Ok(t) => toks.push(t),
            Err(()) => {
                return Err(ParseError::Unrecognized {
                    text: src[span].to_string(),
                })
            }
        }
    }
    Ok(toks)
}
