//! Symbolic differentiation and simplification by term rewriting.
//!
//! This crate represents symbolic expressions as trees in prefix form, matches
//! them against patterns with named wildcards, and rewrites them with a fixed
//! library of rules until no rule fires any more.
//!
//! # Features
//!
//! - Structural pattern matching with wildcard capture
//! - Rules as plain `(predicate, transform, label)` values
//! - A built-in library covering the power, sum, difference, product and
//!   constant rules of differentiation plus algebraic clean-up
//! - Fixpoint reduction with optional step tracing and pass limit
//!
//! # Example
//!
//! ```rust
//! use leibniz::{reduce, sexpr};
//!
//! // d/dX (X + X^2)
//! let problem = sexpr!((DERIV (+ X (^ X 2)) X));
//! let result = reduce(&problem).unwrap();
//! assert_eq!(result.to_string(), "(+ 1 (* 2 X))");
//! ```

pub use expr::Expression;
pub use pattern::{Bindings, Pattern};
pub use rewriter::{apply_all_rules, apply_rule, reduce, Rewriter, RewriterConfig};
pub use rule::Rule;

pub mod prelude {
    pub use crate::errors::{RewriteError, TransformError};
    pub use crate::expr::{ops, Expression};
    pub use crate::pattern::{Bindings, Pattern};
    pub use crate::rewriter::{
        apply_all_rules, apply_rule, reduce, Rewriter, RewriterConfig, Step, Trace,
    };
    pub use crate::rule::Rule;
    pub use crate::rules::RULES;
    pub use crate::{pattern, sexpr};
}

/// Error types for the various failure modes
pub mod errors;
/// Expression tree representation
pub mod expr;
/// Structural pattern matching and wildcard bindings
pub mod pattern;
/// Worked example problems
pub mod problems;
/// Rule passes and fixpoint reduction
pub mod rewriter;
/// Rewrite rules and the single-rule applier
pub mod rule;
/// The built-in differentiation and simplification rules
pub mod rules;
