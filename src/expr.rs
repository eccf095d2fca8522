//! Expression module for representing symbolic expressions.
//!
//! An [`Expression`] is an immutable tree with three kinds of node:
//!
//! - `Number`: a floating point literal
//! - `Symbol`: an opaque name, either a variable such as `X` or an operator
//! - `Compound`: an ordered list of expressions in prefix form, where the first
//!   element is by convention an operator symbol (`+`, `-`, `*`, `/`, `^`,
//!   `DERIV`) and the rest are its operands
//!
//! Transformations never mutate a tree; they build a new one. Compounds own
//! their elements, so a tree cannot contain itself.
//!
//! Trees are most easily written with the [`sexpr!`](crate::sexpr) macro:
//!
//! ```
//! use leibniz::{sexpr, expr::Expression};
//!
//! let e = sexpr!((DERIV (^ X 3) X));
//! assert_eq!(e.operator(), Some("DERIV"));
//! assert_eq!(e.to_string(), "(DERIV (^ X 3) X)");
//! ```

use itertools::Itertools;

/// Operator symbols understood by the built-in rule library.
pub mod ops {
    pub const ADD: &str = "+";
    pub const SUB: &str = "-";
    pub const MUL: &str = "*";
    pub const DIV: &str = "/";
    pub const POW: &str = "^";
    /// `(DERIV E V)` is the derivative of `E` with respect to `V`
    pub const DERIV: &str = "DERIV";
}

/// A node of a symbolic expression tree.
///
/// Equality is strict structural equality: two trees are equal iff they have
/// the same variant and shape and are equal at every position. Numbers compare
/// with `f64` semantics, so a tree containing `NaN` is never equal to anything.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A floating point literal
    Number(f64),
    /// A variable or operator name
    Symbol(String),
    /// An operator applied to operands, in prefix order
    Compound(Vec<Expression>),
}

impl Expression {
    pub fn number(value: f64) -> Self {
        Expression::Number(value)
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expression::Symbol(name.into())
    }

    pub fn compound(items: impl IntoIterator<Item = Expression>) -> Self {
        Expression::Compound(items.into_iter().collect())
    }

    /// Builds `(op operand...)`.
    pub fn apply(op: &str, operands: impl IntoIterator<Item = Expression>) -> Self {
        Expression::Compound(
            std::iter::once(Expression::symbol(op))
                .chain(operands)
                .collect(),
        )
    }

    /// Builds `(DERIV expr var)`, the derivative of `expr` with respect to `var`.
    pub fn deriv(expr: Expression, var: Expression) -> Self {
        Expression::apply(ops::DERIV, [expr, var])
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Expression::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expression::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_atom(&self) -> bool {
        !matches!(self, Expression::Compound(_))
    }

    /// Returns the elements of a compound, or an empty slice for atoms.
    pub fn items(&self) -> &[Expression] {
        match self {
            Expression::Compound(items) => items,
            _ => &[],
        }
    }

    /// Returns the operator symbol of a compound in prefix form.
    pub fn operator(&self) -> Option<&str> {
        self.items().first().and_then(Expression::as_symbol)
    }

    /// Returns the operands of a compound (everything after the operator).
    pub fn operands(&self) -> &[Expression] {
        self.items().get(1..).unwrap_or(&[])
    }

    /// Checks whether `needle` occurs anywhere in this tree.
    ///
    /// The tree itself counts as an occurrence, so `X` contains `X`. Otherwise
    /// the search descends through compounds and stops at the first element
    /// that equals `needle`.
    pub fn contains(&self, needle: &Expression) -> bool {
        self == needle
            || match self {
                Expression::Compound(items) => items.iter().any(|item| item.contains(needle)),
                _ => false,
            }
    }

    /// Number of nodes in the tree, counting every atom and compound once.
    pub fn size(&self) -> usize {
        match self {
            Expression::Compound(items) => 1 + items.iter().map(Expression::size).sum::<usize>(),
            _ => 1,
        }
    }

    /// Length of the longest path from this node to an atom.
    pub fn depth(&self) -> usize {
        match self {
            Expression::Compound(items) => {
                1 + items.iter().map(Expression::depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::Number(value)
    }
}

impl From<&str> for Expression {
    fn from(name: &str) -> Self {
        Expression::Symbol(name.to_owned())
    }
}

impl From<String> for Expression {
    fn from(name: String) -> Self {
        Expression::Symbol(name)
    }
}

impl From<Vec<Expression>> for Expression {
    fn from(items: Vec<Expression>) -> Self {
        Expression::Compound(items)
    }
}

/// Formats expressions as prefix S-expressions, e.g. `(* 3 (^ X 2))`.
///
/// Numbers use the `f64` formatting, so whole numbers print without a
/// fractional part.
impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Number(value) => write!(f, "{value}"),
            Expression::Symbol(name) => write!(f, "{name}"),
            Expression::Compound(items) => write!(f, "({})", items.iter().join(" ")),
        }
    }
}

/// Builds an [`Expression`] from S-expression tokens.
///
/// Identifiers and the operators `+ - * / ^` become symbols, numeric literals
/// become numbers and parenthesised groups become compounds. A braced block
/// splices in any Rust value convertible into an expression, which is also the
/// way to write negative numbers:
///
/// ```
/// use leibniz::{sexpr, expr::Expression};
///
/// let inner = sexpr!((^ X 2));
/// let e = sexpr!((+ {-1.0} {inner}));
/// assert_eq!(e.to_string(), "(+ -1 (^ X 2))");
/// ```
#[macro_export]
macro_rules! sexpr {
    (( $($item:tt)* )) => {
        $crate::expr::Expression::Compound(vec![$($crate::sexpr!($item)),*])
    };
    ({ $value:expr }) => {
        $crate::expr::Expression::from($value)
    };
    (+) => {
        $crate::expr::Expression::symbol("+")
    };
    (-) => {
        $crate::expr::Expression::symbol("-")
    };
    (*) => {
        $crate::expr::Expression::symbol("*")
    };
    (/) => {
        $crate::expr::Expression::symbol("/")
    };
    (^) => {
        $crate::expr::Expression::symbol("^")
    };
    ($name:ident) => {
        $crate::expr::Expression::symbol(stringify!($name))
    };
    ($value:literal) => {
        $crate::expr::Expression::Number($value as f64)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_builds_trees() {
        assert_eq!(sexpr!(5), Expression::Number(5.0));
        assert_eq!(sexpr!(2.5), Expression::Number(2.5));
        assert_eq!(sexpr!(X), Expression::symbol("X"));
        assert_eq!(
            sexpr!((* 3 (^ X 2))),
            Expression::apply(
                ops::MUL,
                [
                    Expression::number(3.0),
                    Expression::apply(
                        ops::POW,
                        [Expression::symbol("X"), Expression::number(2.0)]
                    ),
                ]
            )
        );
        assert_eq!(sexpr!(()), Expression::Compound(vec![]));

        let x = Expression::symbol("X");
        assert_eq!(sexpr!((DERIV {x.clone()} X)), Expression::deriv(x.clone(), x));
    }

    #[test]
    fn test_accessors() {
        let e = sexpr!((+ Y (* 2 X)));
        assert_eq!(e.operator(), Some("+"));
        assert_eq!(e.operands(), &[sexpr!(Y), sexpr!((* 2 X))]);
        assert_eq!(e.items().len(), 3);
        assert!(!e.is_atom());

        assert_eq!(sexpr!(7).as_number(), Some(7.0));
        assert_eq!(sexpr!(X).as_number(), None);
        assert_eq!(sexpr!(X).as_symbol(), Some("X"));
        assert_eq!(sexpr!(X).operator(), None);
        assert!(sexpr!(X).operands().is_empty());
        // An operator position holding a compound has no operator symbol
        assert_eq!(sexpr!(((+ 1 2) 3)).operator(), None);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(sexpr!((+ X 1)), sexpr!((+ X 1)));
        assert_ne!(sexpr!((+ X 1)), sexpr!((+ 1 X)));
        assert_ne!(sexpr!((+ X 1)), sexpr!((+ X 1 0)));
        // A number never equals a symbol, even with the same spelling
        assert_ne!(sexpr!(1), Expression::symbol("1"));
        assert_ne!(Expression::Number(f64::NAN), Expression::Number(f64::NAN));
    }

    #[test]
    fn test_contains() {
        let x = sexpr!(X);
        assert!(sexpr!((+ Y (* 2 X))).contains(&x));
        assert!(!sexpr!((+ Y 5)).contains(&x));
        assert!(x.contains(&x));
        assert!(!sexpr!(5).contains(&x));
        // Compound needles are found as whole subtrees
        assert!(sexpr!((* 3 (^ X 2))).contains(&sexpr!((^ X 2))));
        assert!(!sexpr!((* 3 (^ X 2))).contains(&sexpr!((^ X 3))));
    }

    #[test]
    fn test_size_and_depth() {
        assert_eq!(sexpr!(X).size(), 1);
        assert_eq!(sexpr!(X).depth(), 0);
        let e = sexpr!((* 3 (^ X 2)));
        assert_eq!(e.size(), 7);
        assert_eq!(e.depth(), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", sexpr!(12)), "12");
        assert_eq!(format!("{}", sexpr!(0.5)), "0.5");
        assert_eq!(format!("{}", sexpr!(X)), "X");
        assert_eq!(
            format!("{}", sexpr!((+ 1 (* 2 X)))),
            "(+ 1 (* 2 X))"
        );
        assert_eq!(format!("{}", sexpr!(())), "()");
    }
}
