//! Rule passes and fixpoint reduction.
//!
//! A [`Rewriter`] owns an ordered list of rules (the built-in [`RULES`] by
//! default). One pass applies every rule in order, each to the output of the
//! previous one; [`Rewriter::reduce`] repeats passes until a pass changes
//! nothing.
//!
//! # Example
//!
//! ```
//! use leibniz::{reduce, sexpr};
//!
//! let derivative = reduce(&sexpr!((DERIV (^ X 3) X))).unwrap();
//! assert_eq!(derivative, sexpr!((* 3 (^ X 2))));
//! ```
//!
//! Termination depends on the rule set. Every rule in the built-in library
//! either removes a `DERIV` or shrinks the tree, so reduction always reaches a
//! fixpoint; a custom rule set can bound the work with
//! [`RewriterConfig::with_max_passes`].
//!
//! Reducing a reduced expression gives it back unchanged, and the two compare
//! equal unless a number in them is `NaN`: `(/ 0 0)` folds to `NaN`, which is
//! a fixpoint but never equal to itself.

use std::borrow::Cow;

use log::{debug, trace};

use crate::errors::RewriteError;
use crate::expr::Expression;
use crate::rule::Rule;
use crate::rules::RULES;

/// Tuning knobs for a [`Rewriter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriterConfig {
    /// Upper bound on the number of passes of one reduction, counting the
    /// final pass that confirms the fixpoint. `None` means unbounded.
    pub max_passes: Option<usize>,
}

impl RewriterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = Some(max_passes);
        self
    }
}

/// One rule firing recorded during a traced reduction.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// 1-based number of the pass the rule fired in
    pub pass: usize,
    /// Label of the rule that fired
    pub rule: &'static str,
    /// The node the rule matched
    pub before: Expression,
    /// Its replacement
    pub after: Expression,
}

/// The firings of a reduction, in the order they happened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    steps: Vec<Step>,
}

impl Trace {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Labels of the rules that fired, in firing order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.rule).collect()
    }

    /// Number of passes that changed the expression.
    pub fn passes(&self) -> usize {
        self.steps.last().map_or(0, |step| step.pass)
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pass {}: {}: {} => {}",
            self.pass, self.rule, self.before, self.after
        )
    }
}

impl std::fmt::Display for Trace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for step in &self.steps {
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Applies an ordered rule list to expressions.
#[derive(Debug, Clone)]
pub struct Rewriter {
    rules: Cow<'static, [Rule]>,
    config: RewriterConfig,
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new(Cow::Borrowed(&RULES[..]))
    }
}

impl Rewriter {
    /// Creates a rewriter over `rules`, applied in the given order.
    ///
    /// Accepts a borrowed `'static` slice such as `&RULES[..6]` or an owned
    /// `Vec<Rule>`.
    pub fn new(rules: impl Into<Cow<'static, [Rule]>>) -> Self {
        Self {
            rules: rules.into(),
            config: RewriterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RewriterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    /// Runs one pass: every rule once, in order, each on the output of the
    /// previous rule.
    ///
    /// # Returns
    /// * `Ok(Some(expr))` - The rewritten expression if any rule fired
    /// * `Ok(None)` - No rule fired anywhere in the expression
    pub fn apply_all(&self, expr: &Expression) -> Result<Option<Expression>, RewriteError> {
        self.pass(expr, 1, None)
    }

    /// Reduces `expr` to a fixpoint of the rule list.
    ///
    /// # Errors
    /// * `RewriteError::Transform` - A rule could not build its replacement
    /// * `RewriteError::PassLimitExceeded` - The configured pass limit ran out
    pub fn reduce(&self, expr: &Expression) -> Result<Expression, RewriteError> {
        self.run(expr, None)
    }

    /// Like [`reduce`](Self::reduce), also returning every rule firing.
    pub fn reduce_traced(&self, expr: &Expression) -> Result<(Expression, Trace), RewriteError> {
        let mut trace = Trace::default();
        let reduced = self.run(expr, Some(&mut trace))?;
        Ok((reduced, trace))
    }

    fn run(
        &self,
        expr: &Expression,
        mut trace: Option<&mut Trace>,
    ) -> Result<Expression, RewriteError> {
        let mut current = expr.clone();
        let mut passes = 0;
        loop {
            if let Some(limit) = self.config.max_passes {
                if passes >= limit {
                    return Err(RewriteError::PassLimitExceeded { limit });
                }
            }
            passes += 1;

            trace!("pass {passes}: {current}");
            match self.pass(&current, passes, trace.as_deref_mut())? {
                Some(next) => current = next,
                None => {
                    debug!("fixpoint after {passes} passes: {expr} => {current}");
                    return Ok(current);
                }
            }
        }
    }

    fn pass(
        &self,
        expr: &Expression,
        pass: usize,
        mut trace: Option<&mut Trace>,
    ) -> Result<Option<Expression>, RewriteError> {
        let mut current = Cow::Borrowed(expr);
        let mut fired = false;

        for rule in self.rules.iter() {
            let mut record = |before: &Expression, after: &Expression| {
                if let Some(trace) = trace.as_deref_mut() {
                    trace.steps.push(Step {
                        pass,
                        rule: rule.label(),
                        before: before.clone(),
                        after: after.clone(),
                    });
                }
            };

            if let Some(next) = rule.apply_observed(&current, &mut record)? {
                current = Cow::Owned(next);
                fired = true;
            }
        }

        Ok(fired.then(|| current.into_owned()))
    }
}

/// Applies a single rule everywhere it fires inside `expr`.
///
/// See [`Rule::apply`].
pub fn apply_rule(rule: &Rule, expr: &Expression) -> Result<Option<Expression>, RewriteError> {
    rule.apply(expr)
}

/// Runs one pass of the built-in rule library over `expr`.
pub fn apply_all_rules(expr: &Expression) -> Result<Option<Expression>, RewriteError> {
    Rewriter::default().apply_all(expr)
}

/// Reduces `expr` with the built-in rule library until no rule fires.
pub fn reduce(expr: &Expression) -> Result<Expression, RewriteError> {
    Rewriter::default().reduce(expr)
}
