//! Error types for the leibniz crate.
//!
//! Matching itself never fails: a pattern either fits or it doesn't, and that
//! outcome is carried by `bool`/`Option`. The errors below cover what is left:
//!
//! - `TransformError`: a rule transform read a binding its predicate never
//!   produced, or one of the wrong kind. These are rule-authoring defects; the
//!   built-in library never triggers them.
//! - `RewriteError`: high-level errors of the rewriter, wrapping transform
//!   failures with the label of the offending rule and reporting an exhausted
//!   pass limit.

use thiserror::Error;

/// Errors raised while a rule builds its replacement from a bindings table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The transform asked for a wildcard that the predicate did not bind
    #[error("wildcard `{0}` is not bound")]
    Unbound(String),
    /// The transform expected a numeric binding but found another expression
    #[error("wildcard `{0}` is not bound to a number")]
    NotANumber(String),
    /// The constant folder met an operator it cannot evaluate
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),
}

/// Errors that can occur while rewriting expressions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewriteError {
    /// A rule matched but could not build its replacement
    #[error("rule {rule} failed to build its replacement")]
    Transform {
        rule: &'static str,
        #[source]
        source: TransformError,
    },
    /// Reduction was still changing the expression when the pass limit ran out
    #[error("no fixpoint reached within {limit} passes")]
    PassLimitExceeded { limit: usize },
}
