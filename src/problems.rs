//! A catalogue of worked differentiation and simplification problems.
//!
//! Used by the `leibniz` binary and the benchmarks, and handy as test input.

use crate::expr::Expression;
use crate::sexpr;

/// A named expression to reduce.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub name: &'static str,
    pub expression: Expression,
}

impl Problem {
    pub fn new(name: &'static str, expression: Expression) -> Self {
        Self { name, expression }
    }
}

/// Returns the built-in problems, simplest first.
pub fn catalog() -> Vec<Problem> {
    vec![
        Problem::new("constant folding", sexpr!((* 3 4))),
        Problem::new("nested folding", sexpr!((* 2 (+ 1 (^ 2 3))))),
        Problem::new("constant", sexpr!((DERIV 5 X))),
        Problem::new("identity", sexpr!((DERIV X X))),
        Problem::new("other variable", sexpr!((DERIV Y X))),
        Problem::new("cube", sexpr!((DERIV (^ X 3) X))),
        Problem::new("sum", sexpr!((DERIV (+ X (^ X 2)) X))),
        Problem::new("difference", sexpr!((DERIV (- (^ X 2) X) X))),
        Problem::new("scaled square", sexpr!((DERIV (* 3 (^ X 2)) X))),
        Problem::new("product", sexpr!((DERIV (* X Y) X))),
        Problem::new("square of product", sexpr!((DERIV (* X X) X))),
        Problem::new(
            "polynomial",
            sexpr!((DERIV (+ (* 4 (^ X 3)) (- (* 2 X) 7)) X)),
        ),
        Problem::new("power of a sum", sexpr!((DERIV (^ (+ X 1) 2) X))),
        Problem::new("second derivative", sexpr!((DERIV (DERIV (^ X 4) X) X))),
        Problem::new("zero exponent", sexpr!((DERIV (^ X 0) X))),
    ]
}
