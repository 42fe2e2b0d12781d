//! Parser for shape expressions
//!
//! Recursive descent over the token buffer. Arrows are right-associative;
//! parenthesized sequences flatten the way `cons` does, so `(1, (a,))`
//! parses as `(1, a)`; a bracketed suffix is an index (`a[0]`), a slice
//! (`a[0:2]`), or a per-axis slice list (`a[0:2, 3:4]`).
//!
//! Binary operators take exactly two operands and only stand inside a
//! sequence or a predicate: `(a*b, b*c)` and `(D b = D a - 1)` parse,
//! while a bare `0*0` and the chain `a*b+c` do not. Open-ended slices
//! and negative literals are rejected.

use caliper_ast::expr::{Expr, SubjectTo, Var};
use caliper_ast::op::{BinOpKind, CmpOp, LogicOp, UnaryOpKind};
use caliper_ast::shape::Abstract;
use caliper_ast::slice::{Range, Slicelike};

use crate::error::{ParseError, ParseResult};
use crate::lexer::{lex, Token};

/// Parse a complete shape expression.
pub fn parse(src: &str) -> ParseResult<Expr> {
    let mut parser = Parser {
        toks: lex(src)?,
        pos: 0,
    };
    let expr = parser.parse_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(found) => Err(ParseError::Trailing { found }),
    }
}

struct Parser {
    toks: Vec<Token>,
    pos: usize,
}

impl Parser {
    // ============ Utilities ============

    fn peek(&self) -> Option<Token> {
        self.toks.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, token: Token) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.at(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> ParseResult<()> {
        match self.next() {
            Some(t) if t == token => Ok(()),
            Some(found) => Err(ParseError::Unexpected {
                found,
                expected: expected.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: expected.to_string(),
            }),
        }
    }

    fn expect_number(&mut self, expected: &str) -> ParseResult<usize> {
        match self.next() {
            Some(Token::Number(n)) => Ok(n),
            Some(found) => Err(ParseError::Unexpected {
                found,
                expected: expected.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: expected.to_string(),
            }),
        }
    }

    // ============ Entry points ============

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        if self.at(Token::LBrace) {
            self.parse_compound()
        } else {
            self.parse_arrow()
        }
    }

    /// `{ expr | predicate }`
    fn parse_compound(&mut self) -> ParseResult<Expr> {
        self.expect(Token::LBrace, "'{'")?;
        let expr = self.parse_arrow()?;
        self.expect(Token::Pipe, "'|'")?;
        let st = self.parse_predicate()?;
        self.expect(Token::RBrace, "'}'")?;
        Ok(Expr::compound(expr, st))
    }

    /// Right-associative arrow chain. Components are unary terms; a
    /// binary operation cannot stand as a component on its own.
    fn parse_arrow(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_unary()?;
        if self.eat(Token::Arrow) {
            let rhs = self.parse_arrow()?;
            return Ok(Expr::arrow(lhs, rhs));
        }
        Ok(lhs)
    }

    /// A sequence element: like an arrow component, but a binary
    /// operation may stand alone here, as in `(a*b, b*c)`.
    fn parse_element(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_operand()?;
        if self.eat(Token::Arrow) {
            let rhs = self.parse_element()?;
            return Ok(Expr::arrow(lhs, rhs));
        }
        Ok(lhs)
    }

    // ============ Operands ============

    /// A term with at most one binary operator: `a`, `D a`, `a + 1`.
    /// Reachable only from sequence elements and predicate operands.
    fn parse_operand(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_unary()?;
        if let Some(op) = self.peek_binop() {
            self.pos += 1;
            let rhs = self.parse_unary()?;
            return Ok(Expr::binop(op, lhs, rhs));
        }
        Ok(lhs)
    }

    fn peek_binop(&self) -> Option<BinOpKind> {
        match self.peek() {
            Some(Token::Plus) => Some(BinOpKind::Add),
            Some(Token::Minus) => Some(BinOpKind::Sub),
            Some(Token::Star) => Some(BinOpKind::Mul),
            Some(Token::Slash) => Some(BinOpKind::Div),
            _ => None,
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek() {
            Some(Token::Prod) => Some(UnaryOpKind::Prod),
            Some(Token::Sum) => Some(UnaryOpKind::Sum),
            Some(Token::Dims) => Some(UnaryOpKind::Dims),
            Some(Token::ForAll) => Some(UnaryOpKind::ForAll),
            Some(Token::Const) => Some(UnaryOpKind::Const),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let operand = self.parse_unary()?;
            return Ok(Expr::unary(op, operand));
        }

        if self.eat(Token::Transpose) {
            let axes = self.parse_axes_literal()?;
            let operand = self.parse_unary()?;
            return Ok(Expr::transpose(axes, operand));
        }

        self.parse_postfix()
    }

    /// A primary expression followed by any number of bracket suffixes.
    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        while self.at(Token::LBracket) {
            expr = self.parse_bracket_suffix(expr)?;
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.peek() {
            Some(Token::LParen) => self.parse_paren(),
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(Expr::size(n))
            }
            Some(Token::Letter(c)) => {
                self.pos += 1;
                Ok(Expr::var(c))
            }
            Some(Token::AxesMark) => {
                let axes = self.parse_axes_literal()?;
                Ok(Expr::Axes(caliper_ast::expr::Axes(axes)))
            }
            Some(Token::SizesMark) => {
                self.pos += 1;
                let sizes = self.parse_int_list()?;
                Ok(Expr::Sizes(caliper_ast::expr::Sizes(sizes)))
            }
            Some(Token::LBracket) => {
                let range = self.parse_range_literal()?;
                Ok(Expr::Range(range))
            }
            Some(found) => Err(ParseError::Unexpected {
                found,
                expected: "an expression".to_string(),
            }),
            None => Err(ParseError::UnexpectedEof {
                expected: "an expression".to_string(),
            }),
        }
    }

    /// `X[0 1 3 2]` — whitespace-separated axis numbers.
    fn parse_axes_literal(&mut self) -> ParseResult<Vec<usize>> {
        self.expect(Token::AxesMark, "'X'")?;
        self.parse_int_list()
    }

    fn parse_int_list(&mut self) -> ParseResult<Vec<usize>> {
        self.expect(Token::LBracket, "'['")?;
        let mut ints = Vec::new();
        while let Some(Token::Number(n)) = self.peek() {
            self.pos += 1;
            ints.push(n);
        }
        self.expect(Token::RBracket, "']'")?;
        Ok(ints)
    }

    /// A standalone slice literal: `[0:2]`, `[0:2:1]`, or the point `[0]`.
    fn parse_range_literal(&mut self) -> ParseResult<Range> {
        self.expect(Token::LBracket, "'['")?;
        let range = self.parse_range_body()?;
        self.expect(Token::RBracket, "']'")?;
        Ok(range)
    }

    fn parse_range_body(&mut self) -> ParseResult<Range> {
        let start = self.expect_number("a slice start")?;
        if !self.eat(Token::Colon) {
            return Ok(Range::point(start));
        }
        let end = self.expect_number("a slice end")?;
        let step = if self.eat(Token::Colon) {
            self.expect_number("a slice step")?
        } else {
            1
        };
        Ok(Range::new(start, end, step))
    }

    /// `a[…]`: an index, a variable slice, a range, or a range list.
    fn parse_bracket_suffix(&mut self, operand: Expr) -> ParseResult<Expr> {
        self.expect(Token::LBracket, "'['")?;

        if let Some(Token::Letter(c)) = self.peek() {
            self.pos += 1;
            self.expect(Token::RBracket, "']'")?;
            return Ok(Expr::slice_of(Slicelike::Var(Var(c)), operand));
        }

        let mut ranges = Vec::new();
        let mut first_is_point = false;
        loop {
            let before = self.pos;
            let range = self.parse_range_body()?;
            if ranges.is_empty() {
                // `a[0]` is an index, but only when it stands alone
                first_is_point = self.pos == before + 1;
            }
            ranges.push(range);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBracket, "']'")?;

        if ranges.len() == 1 {
            if first_is_point {
                return Ok(Expr::index(ranges[0].start, operand));
            }
            return Ok(Expr::slice_of(ranges[0], operand));
        }
        Ok(Expr::slice_of(ranges, operand))
    }

    // ============ Parenthesized sequences ============

    /// `(...)` — a shape/abstract sequence, or plain grouping.
    fn parse_paren(&mut self) -> ParseResult<Expr> {
        self.expect(Token::LParen, "'('")?;
        if self.eat(Token::RParen) {
            return Ok(Expr::shape([]));
        }

        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            items.push(self.parse_element()?);
            if self.eat(Token::Comma) {
                saw_comma = true;
                if self.eat(Token::RParen) {
                    break;
                }
                continue;
            }
            self.expect(Token::RParen, "')' or ','")?;
            break;
        }

        // a single non-sequence item is just grouping: `(a → b)`
        if items.len() == 1 && !saw_comma && !is_sequence_element(&items[0]) {
            return Ok(items.remove(0));
        }

        let mut entries = Vec::new();
        for item in items {
            entries.extend(element_entries(item)?);
        }
        Ok(Abstract(entries).canonical())
    }

    // ============ Predicates ============

    /// `(operand cmp operand)` or `(pred ∧ pred)`, always parenthesized.
    fn parse_predicate(&mut self) -> ParseResult<SubjectTo> {
        self.expect(Token::LParen, "'('")?;

        // a nested predicate and a parenthesized operand both start with
        // '('; try the predicate reading first and fall back
        if self.at(Token::LParen) {
            let save = self.pos;
            if let Ok(a) = self.parse_predicate() {
                if let Some(op) = self.peek_logic() {
                    self.pos += 1;
                    let b = self.parse_predicate()?;
                    self.expect(Token::RParen, "')'")?;
                    return Ok(SubjectTo::Logic {
                        op,
                        a: Box::new(a),
                        b: Box::new(b),
                    });
                }
            }
            self.pos = save;
        }

        let a = self.parse_operand()?;
        let op = self.expect_cmp()?;
        let b = self.parse_operand()?;
        self.expect(Token::RParen, "')'")?;
        Ok(SubjectTo::cmp(op, a, b))
    }

    fn peek_logic(&self) -> Option<LogicOp> {
        match self.peek() {
            Some(Token::And) => Some(LogicOp::And),
            Some(Token::Or) => Some(LogicOp::Or),
            _ => None,
        }
    }

    fn expect_cmp(&mut self) -> ParseResult<CmpOp> {
        let op = match self.peek() {
            Some(Token::Eq) => CmpOp::Eq,
            Some(Token::Ne) => CmpOp::Ne,
            Some(Token::Lt) => CmpOp::Lt,
            Some(Token::Le) => CmpOp::Lte,
            Some(Token::Gt) => CmpOp::Gt,
            Some(Token::Ge) => CmpOp::Gte,
            Some(Token::Bc) => CmpOp::Bc,
            Some(found) => {
                return Err(ParseError::Unexpected {
                    found,
                    expected: "a comparison operator".to_string(),
                })
            }
            None => {
                return Err(ParseError::UnexpectedEof {
                    expected: "a comparison operator".to_string(),
                })
            }
        };
        self.pos += 1;
        Ok(op)
    }
}

/// Whether a parenthesized single item reads as a one-element sequence
/// (`(a)`, `(1)`) rather than as grouping (`(a → b)`).
fn is_sequence_element(e: &Expr) -> bool {
    matches!(
        e,
        Expr::Shape(_)
            | Expr::Abstract(_)
            | Expr::Size(_)
            | Expr::Var(_)
            | Expr::BinOp(_)
            | Expr::UnaryOp(_)
    )
}

/// Flatten a sequence element into abstract entries.
fn element_entries(e: Expr) -> ParseResult<Vec<caliper_ast::expr::Sizelike>> {
    use caliper_ast::expr::Sizelike;
    match e {
        Expr::Shape(s) => Ok(s.to_abstract().0),
        Expr::Abstract(a) => Ok(a.0),
        other => Sizelike::from_expr(&other)
            .map(|s| vec![s])
            .ok_or_else(|| ParseError::NotASizelike(other.to_string())),
    }
}
