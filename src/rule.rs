//! Rewrite rules and the single-rule applier.
//!
//! A [`Rule`] pairs a predicate with a transform under a label. The predicate
//! decides whether an expression node has the rule's shape (and passes its
//! guards), filling a [`Bindings`] table along the way; the transform builds
//! the replacement from that table.
//!
//! [`Rule::apply`] rewrites every outermost node of a tree where the rule
//! fires. Its result keeps the two outcomes apart: `Ok(None)` means the rule
//! fired nowhere, while `Ok(Some(e))` carries the rewritten tree, even when
//! `e` is the number `0`.

use log::debug;

use crate::errors::{RewriteError, TransformError};
use crate::expr::Expression;
use crate::pattern::Bindings;

/// Decides whether a node matches, recording wildcards in the table.
pub type Predicate = fn(&Expression, &mut Bindings) -> bool;

/// Builds the replacement for a matched node.
pub type Transform = fn(&Bindings) -> Result<Expression, TransformError>;

/// A labelled rewrite rule.
///
/// Rules are plain data built from function pointers, so they can live in
/// constants and be shared freely.
#[derive(Clone, Copy)]
pub struct Rule {
    label: &'static str,
    predicate: Predicate,
    transform: Transform,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("label", &self.label).finish()
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label)
    }
}

impl Rule {
    pub const fn new(label: &'static str, predicate: Predicate, transform: Transform) -> Self {
        Self {
            label,
            predicate,
            transform,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Runs the predicate against a single node, without descending into it.
    pub fn matches(&self, target: &Expression, bindings: &mut Bindings) -> bool {
        (self.predicate)(target, bindings)
    }

    /// Runs the transform on a table filled by [`matches`](Self::matches).
    pub fn transform(&self, bindings: &Bindings) -> Result<Expression, RewriteError> {
        (self.transform)(bindings).map_err(|source| RewriteError::Transform {
            rule: self.label,
            source,
        })
    }

    /// Applies the rule everywhere it fires inside `expr`.
    ///
    /// Only compounds are candidates. A node the rule fires on is replaced as
    /// a whole and its original subtree is not visited further; otherwise each
    /// element is tried independently and the compound is rebuilt if any of
    /// them changed.
    ///
    /// # Returns
    /// * `Ok(Some(expr))` - The rewritten tree if the rule fired at least once
    /// * `Ok(None)` - The rule fired nowhere
    pub fn apply(&self, expr: &Expression) -> Result<Option<Expression>, RewriteError> {
        self.apply_observed(expr, &mut |_: &Expression, _: &Expression| {})
    }

    /// Same as [`apply`](Self::apply), calling `on_fire(before, after)` for
    /// every node the rule replaces.
    pub fn apply_observed<F>(
        &self,
        expr: &Expression,
        on_fire: &mut F,
    ) -> Result<Option<Expression>, RewriteError>
    where
        F: FnMut(&Expression, &Expression),
    {
        let Expression::Compound(items) = expr else {
            return Ok(None);
        };

        let mut bindings = Bindings::new();
        if self.matches(expr, &mut bindings) {
            let replacement = self.transform(&bindings)?;
            debug!("rule {} fires: {} => {}", self.label, expr, replacement);
            on_fire(expr, &replacement);
            return Ok(Some(replacement));
        }

        let mut fired = false;
        let mut rebuilt = Vec::with_capacity(items.len());
        for item in items {
            match self.apply_observed(item, on_fire)? {
                Some(replacement) => {
                    fired = true;
                    rebuilt.push(replacement);
                }
                None => rebuilt.push(item.clone()),
            }
        }

        Ok(fired.then_some(Expression::Compound(rebuilt)))
    }
}
