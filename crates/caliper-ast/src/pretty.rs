//! Notation for shape expressions
//!
//! `Display` impls for every term, matching the surface syntax the parser
//! reads back in: `(a, b)` sequences, `→` arrows, `{ expr | predicate }`
//! compounds, superscripted transpose/reduction axes.

use std::fmt;

use crate::expr::{
    Arrow, Axes, Axis, BinOp, BroadcastOf, Compound, ConcatOf, Expr, IndexOf, RepeatOf,
    ReductOf, Size, Sizelike, SliceOf, SubjectTo, TransposeOf, UnaryOp, Var,
};
use crate::shape::{Abstract, Shape};
use crate::slice::{Range, Slicelike};

const SUP_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// A number in superscript digits: `13` becomes `¹³`.
fn sup_int(n: usize) -> String {
    let mut out = String::new();
    for c in n.to_string().chars() {
        out.push(SUP_DIGITS[(c as usize) - ('0' as usize)]);
    }
    out
}

/// A list of axes in superscript digits: `⁽⁰ ¹ ³ ²⁾`.
fn sup_axes(axes: &[usize]) -> String {
    let mut out = String::from("⁽");
    for (i, &ax) in axes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&sup_int(ax));
    }
    out.push('⁾');
    out
}

fn sup_axis(axis: Axis) -> String {
    match axis {
        Axis::All => "⁼".to_string(),
        Axis::At(n) => sup_int(n),
    }
}

/// `start:end` or `start:end:step`, without surrounding brackets.
fn range_body(r: &Range) -> String {
    if r.step > 1 {
        format!("{}:{}:{}", r.start, r.end, r.step)
    } else {
        format!("{}:{}", r.start, r.end)
    }
}

/// Write an operand, parenthesizing nested binary operations.
fn write_operand(f: &mut fmt::Formatter<'_>, e: &Expr) -> fmt::Result {
    match e {
        Expr::BinOp(_) => write!(f, "({})", e),
        _ => write!(f, "{}", e),
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::All => write!(f, "⁼"),
            Axis::At(n) => write!(f, "{}", n),
        }
    }
}

impl fmt::Display for Axes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X[")?;
        for (i, ax) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", ax)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for crate::expr::Sizes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sz[")?;
        for (i, sz) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", sz)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", range_body(self))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Abstract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Sizelike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sizelike::Size(s) => write!(f, "{}", s),
            Sizelike::Var(v) => write!(f, "{}", v),
            Sizelike::BinOp(b) => write!(f, "{}", b),
            Sizelike::UnaryOp(u) => write!(f, "{}", u),
            Sizelike::SliceOf(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_operand(f, &self.a)?;
        write!(f, " {} ", self.op.glyph())?;
        write_operand(f, &self.b)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.op.glyph())?;
        write_operand(f, &self.a)
    }
}

impl fmt::Display for IndexOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_operand(f, &self.a)?;
        write!(f, "[{}]", self.i)
    }
}

impl fmt::Display for TransposeOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{} {}", sup_axes(&self.axes.0), self.a)
    }
}

impl fmt::Display for SliceOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_operand(f, &self.a)?;
        match &self.slice {
            Slicelike::Range(r) => write!(f, "{}", r),
            Slicelike::Ranges(rs) => {
                write!(f, "[")?;
                for (i, r) in rs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", range_body(r))?;
                }
                write!(f, "]")
            }
            Slicelike::Var(v) => write!(f, "[{}]", v),
        }
    }
}

impl fmt::Display for RepeatOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Repeat{}{{", sup_axis(self.along))?;
        for (i, rep) in self.repeats.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", rep)?;
        }
        write!(f, "}} {}", self.a)
    }
}

impl fmt::Display for ConcatOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :{{{}}}: {}", self.a, self.along, self.b)
    }
}

impl fmt::Display for BroadcastOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}||{})", self.a, self.b)
    }
}

impl fmt::Display for ReductOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}{}", sup_axis(self.along), self.a)
    }
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.lhs {
            Expr::Arrow(_) | Expr::Compound(_) => write!(f, "({})", self.lhs)?,
            _ => write!(f, "{}", self.lhs)?,
        }
        write!(f, " → {}", self.rhs)
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ {} | {} }}", self.expr, self.subject_to)
    }
}

impl fmt::Display for SubjectTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectTo::Cmp { op, a, b } => write!(f, "({} {} {})", a, op.glyph(), b),
            SubjectTo::Logic { op, a, b } => write!(f, "({} {} {})", a, op.glyph(), b),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Shape(x) => write!(f, "{}", x),
            Expr::Abstract(x) => write!(f, "{}", x),
            Expr::Arrow(x) => write!(f, "{}", x),
            Expr::Compound(x) => write!(f, "{}", x),
            Expr::Var(x) => write!(f, "{}", x),
            Expr::Size(x) => write!(f, "{}", x),
            Expr::BinOp(x) => write!(f, "{}", x),
            Expr::UnaryOp(x) => write!(f, "{}", x),
            Expr::Axis(x) => write!(f, "{}", x),
            Expr::Axes(x) => write!(f, "{}", x),
            Expr::Sizes(x) => write!(f, "{}", x),
            Expr::Range(x) => write!(f, "{}", x),
            Expr::Index(x) => write!(f, "{}", x),
            Expr::Transpose(x) => write!(f, "{}", x),
            Expr::Slice(x) => write!(f, "{}", x),
            Expr::Repeat(x) => write!(f, "{}", x),
            Expr::Concat(x) => write!(f, "{}", x),
            Expr::Broadcast(x) => write!(f, "{}", x),
            Expr::Reduct(x) => write!(f, "{}", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::make_arrow;
    use crate::op::{CmpOp, UnaryOpKind};

    fn ab(chars: &[char]) -> Expr {
        Expr::Abstract(Abstract(
            chars.iter().map(|&c| Sizelike::Var(Var(c))).collect(),
        ))
    }

    #[test]
    fn arrows_are_right_associative() {
        let matmul = make_arrow([ab(&['a', 'b']), ab(&['b', 'c']), ab(&['a', 'c'])]).unwrap();
        assert_eq!(matmul.to_string(), "(a, b) → (b, c) → (a, c)");

        let wrong = Expr::arrow(
            Expr::arrow(ab(&['a', 'b']), ab(&['b', 'c'])),
            ab(&['a', 'c']),
        );
        assert_eq!(wrong.to_string(), "((a, b) → (b, c)) → (a, c)");

        let map = make_arrow([
            Expr::arrow(Expr::var('a'), Expr::var('a')),
            Expr::var('b'),
            Expr::var('b'),
        ])
        .unwrap();
        assert_eq!(map.to_string(), "(a → a) → b → b");
    }

    #[test]
    fn shapes_and_sequences() {
        assert_eq!(Expr::shape([]).to_string(), "()");
        assert_eq!(Expr::shape([2]).to_string(), "(2)");
        assert_eq!(Expr::shape([5, 2, 3, 1, 10]).to_string(), "(5, 2, 3, 1, 10)");
        assert_eq!(
            Expr::Axes(Axes(vec![0, 1, 3, 2])).to_string(),
            "X[0 1 3 2]"
        );
        assert_eq!(
            Expr::Sizes(crate::expr::Sizes(vec![0, 0, 1, 0])).to_string(),
            "Sz[0 0 1 0]"
        );
        assert_eq!(Expr::Sizes(crate::expr::Sizes(vec![])).to_string(), "Sz[]");
    }

    #[test]
    fn transpose_compound() {
        let axes = Axes(vec![0, 1, 3, 2]);
        let simple = make_arrow([
            Expr::var('a'),
            Expr::Axes(axes.clone()),
            Expr::transpose(axes.0.clone(), Expr::var('a')),
        ])
        .unwrap();
        let transpose = Expr::compound(
            simple,
            SubjectTo::cmp(
                CmpOp::Eq,
                Expr::unary(UnaryOpKind::Dims, Expr::Axes(axes)),
                Expr::unary(UnaryOpKind::Dims, Expr::var('a')),
            ),
        );
        assert_eq!(
            transpose.to_string(),
            "{ a → X[0 1 3 2] → T⁽⁰ ¹ ³ ²⁾ a | (D X[0 1 3 2] = D a) }"
        );
    }

    #[test]
    fn reductions_and_broadcasts() {
        let sum = Expr::arrow(
            Expr::var('a'),
            Expr::reduce_along(Expr::var('a'), [0, 1]),
        );
        assert_eq!(sum.to_string(), "a → /⁰/¹a");

        let all = Expr::arrow(Expr::var('a'), Expr::reduct_of(Expr::var('a'), Axis::All));
        assert_eq!(all.to_string(), "a → /⁼a");

        let bc = Expr::broadcast_of(Expr::var('a'), Expr::var('b'));
        assert_eq!(bc.to_string(), "(a||b)");
    }

    #[test]
    fn slices_are_unambiguous() {
        // a single-point range always prints its end
        assert_eq!(Range::point(0).to_string(), "[0:1]");
        assert_eq!(Range::new(0, 2, 1).to_string(), "[0:2]");
        assert_eq!(Range::new(0, 4, 2).to_string(), "[0:4:2]");

        let sliced = Expr::slice_of(
            vec![Range::new(0, 2, 1), Range::new(0, 2, 1), Range::point(3)],
            Expr::var('a'),
        );
        assert_eq!(sliced.to_string(), "a[0:2, 0:2, 3:4]");

        let by_var = Expr::slice_of(Slicelike::Var(Var('b')), Expr::var('a'));
        assert_eq!(by_var.to_string(), "a[b]");
    }

    #[test]
    fn nested_arithmetic_parenthesizes() {
        use crate::op::BinOpKind::*;
        // ((h + 2) - 3) ÷ 1
        let e = Expr::binop(
            Div,
            Expr::binop(Sub, Expr::binop(Add, Expr::var('h'), Expr::size(2)), Expr::size(3)),
            Expr::size(1),
        );
        assert_eq!(e.to_string(), "((h + 2) - 3) ÷ 1");
    }
}
