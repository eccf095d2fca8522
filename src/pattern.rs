//! Structural pattern matching with wildcard capture.
//!
//! A [`Pattern`] has the same shape as an [`Expression`], except that some
//! positions are named wildcards. Matching walks pattern and target together
//! and records what each wildcard stood for in a [`Bindings`] table:
//!
//! ```
//! use leibniz::{pattern, sexpr};
//!
//! let skeleton = pattern!((DERIV ?E ?V));
//! let bindings = skeleton.matches(&sexpr!((DERIV (^ X 2) X))).unwrap();
//! assert_eq!(bindings.get("E"), Some(&sexpr!((^ X 2))));
//! assert_eq!(bindings.get("V"), Some(&sexpr!(X)));
//! ```
//!
//! A wildcard name may appear more than once in a pattern. The first
//! occurrence binds; every later occurrence only matches an expression that is
//! structurally equal to that binding, so `(+ ?E ?E)` matches `(+ X X)` but not
//! `(+ X Y)`.

use std::collections::HashMap;

use itertools::Itertools;

use crate::errors::TransformError;
use crate::expr::Expression;

/// Suffix that marks a template symbol as a wildcard, as in `E?`.
pub const WILDCARD_MARKER: char = '?';

/// A template tree with named wildcard positions.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Matches only a structurally equal expression
    Literal(Expression),
    /// Matches any expression and binds it under the given name
    Wildcard(String),
    /// Matches a compound of the same length, element by element
    Compound(Vec<Pattern>),
}

/// Wildcard bindings produced by one match attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    table: HashMap<String, Expression>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`.
    ///
    /// If `name` is already bound, nothing is recorded and the call only
    /// reports whether the existing binding equals `value`.
    pub fn bind(&mut self, name: &str, value: &Expression) -> bool {
        match self.table.get(name) {
            Some(bound) => bound == value,
            None => {
                self.table.insert(name.to_owned(), value.clone());
                true
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Expression> {
        self.table.get(name)
    }

    /// Returns the binding of `name` if it is a number.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Expression::as_number)
    }

    /// Like [`get`](Self::get), for transforms that rely on the binding.
    pub fn require(&self, name: &str) -> Result<&Expression, TransformError> {
        self.get(name)
            .ok_or_else(|| TransformError::Unbound(name.to_owned()))
    }

    /// Like [`number`](Self::number), for transforms that rely on the binding.
    pub fn require_number(&self, name: &str) -> Result<f64, TransformError> {
        self.require(name)?
            .as_number()
            .ok_or_else(|| TransformError::NotANumber(name.to_owned()))
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expression)> {
        self.table.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Pattern {
    pub fn literal(value: impl Into<Expression>) -> Self {
        Pattern::Literal(value.into())
    }

    pub fn wildcard(name: impl Into<String>) -> Self {
        Pattern::Wildcard(name.into())
    }

    pub fn compound(items: impl IntoIterator<Item = Pattern>) -> Self {
        Pattern::Compound(items.into_iter().collect())
    }

    /// Converts a template expression into a pattern.
    ///
    /// Symbols ending in [`WILDCARD_MARKER`] become wildcards named after the
    /// symbol with the marker stripped, so `E?` is the wildcard `E`. Compounds
    /// are converted element-wise and every other atom becomes a literal.
    pub fn from_template(template: &Expression) -> Self {
        match template {
            Expression::Symbol(name) => match name.strip_suffix(WILDCARD_MARKER) {
                Some(base) => Pattern::Wildcard(base.to_owned()),
                None => Pattern::Literal(template.clone()),
            },
            Expression::Number(_) => Pattern::Literal(template.clone()),
            Expression::Compound(items) => {
                Pattern::Compound(items.iter().map(Pattern::from_template).collect())
            }
        }
    }

    /// Matches `target` against this pattern, recording wildcards in `bindings`.
    ///
    /// Compounds are matched left to right and the first failing element stops
    /// the walk. Bindings made before a failure stay in the table, so callers
    /// that retry with another pattern should start from a cleared table.
    pub fn match_into(&self, target: &Expression, bindings: &mut Bindings) -> bool {
        match (self, target) {
            (Pattern::Literal(literal), _) => literal == target,
            (Pattern::Wildcard(name), _) => bindings.bind(name, target),
            (Pattern::Compound(patterns), Expression::Compound(items)) => {
                patterns.len() == items.len()
                    && patterns
                        .iter()
                        .zip(items)
                        .all(|(pattern, item)| pattern.match_into(item, bindings))
            }
            (Pattern::Compound(_), _) => false,
        }
    }

    /// Matches `target` against this pattern starting from an empty table.
    pub fn matches(&self, target: &Expression) -> Option<Bindings> {
        let mut bindings = Bindings::new();
        self.match_into(target, &mut bindings).then_some(bindings)
    }

    /// Names of the wildcards in this pattern, in first-occurrence order.
    pub fn wildcards(&self) -> Vec<&str> {
        fn collect<'a>(pattern: &'a Pattern, names: &mut Vec<&'a str>) {
            match pattern {
                Pattern::Literal(_) => {}
                Pattern::Wildcard(name) => {
                    if !names.contains(&name.as_str()) {
                        names.push(name);
                    }
                }
                Pattern::Compound(items) => items.iter().for_each(|item| collect(item, names)),
            }
        }

        let mut names = Vec::new();
        collect(self, &mut names);
        names
    }
}

/// Formats patterns in template notation, e.g. `(DERIV (^ E? N?) V?)`.
impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pattern::Literal(value) => write!(f, "{value}"),
            Pattern::Wildcard(name) => write!(f, "{name}{WILDCARD_MARKER}"),
            Pattern::Compound(items) => write!(f, "({})", items.iter().join(" ")),
        }
    }
}

/// Builds a [`Pattern`] from S-expression tokens.
///
/// Accepts the same syntax as [`sexpr!`](crate::sexpr); in addition `?name`
/// inside a group is the wildcard `name`.
///
/// ```
/// use leibniz::pattern;
///
/// let p = pattern!((* ?V1 (* ?V2 ?E)));
/// assert_eq!(p.to_string(), "(* V1? (* V2? E?))");
/// assert_eq!(p.wildcards(), ["V1", "V2", "E"]);
/// ```
#[macro_export]
macro_rules! pattern {
    (@seq [$($done:expr),*]) => {
        vec![$($done),*]
    };
    (@seq [$($done:expr),*] ? $name:ident $($rest:tt)*) => {
        $crate::pattern!(@seq [$($done,)* $crate::pattern::Pattern::wildcard(stringify!($name))] $($rest)*)
    };
    (@seq [$($done:expr),*] $head:tt $($rest:tt)*) => {
        $crate::pattern!(@seq [$($done,)* $crate::pattern!($head)] $($rest)*)
    };
    (( $($item:tt)* )) => {
        $crate::pattern::Pattern::Compound($crate::pattern!(@seq [] $($item)*))
    };
    (? $name:ident) => {
        $crate::pattern::Pattern::wildcard(stringify!($name))
    };
    ($atom:tt) => {
        $crate::pattern::Pattern::Literal($crate::sexpr!($atom))
    };
}
