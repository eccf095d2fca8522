//! The built-in rule library: symbolic differentiation and algebraic
//! simplification.
//!
//! [`RULES`] lists every rule in the order a rewriting pass applies them.
//! Each rule is also available on its own as a constant.
//!
//! Differentiation problems are written as `(DERIV E V)`, the derivative of
//! `E` with respect to the variable `V`:
//!
//! | Rule | Pattern | Guard | Replacement |
//! |---|---|---|---|
//! | `power-rule` | `(DERIV (^ E N) V)` | `N` is a number | `(* (* N (^ E N-1)) (DERIV E V))` |
//! | `identity-rule` | `(DERIV E V)` | `E` equals `V` | `1` |
//! | `sum-rule` | `(DERIV (+ E1 E2) V)` | | `(+ (DERIV E1 V) (DERIV E2 V))` |
//! | `difference-rule` | `(DERIV (- E1 E2) V)` | | `(- (DERIV E1 V) (DERIV E2 V))` |
//! | `constant-rule` | `(DERIV E V)` | `V` does not occur in `E` | `0` |
//! | `product-rule` | `(DERIV (* E1 E2) V)` | | `(+ (* E2 (DERIV E1 V)) (* E1 (DERIV E2 V)))` |
//! | `exponent-zero-rule` | `(^ E V)` | `V` is `0` | `1` |
//! | `exponent-one-rule` | `(^ E V)` | `V` is `1` | `E` |
//! | `unity-rule` | `(+ E V)`, `(+ V E)`, `(* E V)`, `(* V E)` | `V` is `0` for `+`, `1` for `*` | `E` |
//! | `zero-product-rule` | `(* E V)`, `(* V E)` | `V` is `0` | `0` |
//! | `constant-fold-rule` | `(op V1 V2)` | numbers, `op` arithmetic | `V1 op V2` |
//! | `coefficient-fold-rule` | `(* V1 (* V2 E))` | `V1`, `V2` numbers | `(* V1*V2 E)` |

use std::sync::LazyLock;

use crate::errors::TransformError;
use crate::expr::{ops, Expression};
use crate::pattern::{Bindings, Pattern};
use crate::rule::Rule;
use crate::{pattern, sexpr};

/// d/dV E^N = N * E^(N-1) * dE/dV
pub const POWER_RULE: Rule = Rule::new("power-rule", power_pattern, power_transform);
/// d/dV V = 1
pub const IDENTITY_RULE: Rule = Rule::new("identity-rule", identity_pattern, identity_transform);
/// (u + v)' = u' + v'
pub const SUM_RULE: Rule = Rule::new("sum-rule", sum_pattern, sum_transform);
/// (u - v)' = u' - v'
pub const DIFFERENCE_RULE: Rule =
    Rule::new("difference-rule", difference_pattern, difference_transform);
/// d/dV C = 0 when C does not depend on V
pub const CONSTANT_RULE: Rule = Rule::new("constant-rule", constant_pattern, constant_transform);
/// (u v)' = v u' + u v'
pub const PRODUCT_RULE: Rule = Rule::new("product-rule", product_pattern, product_transform);
/// E^0 = 1
pub const EXPONENT_ZERO_RULE: Rule = Rule::new(
    "exponent-zero-rule",
    exponent_zero_pattern,
    exponent_zero_transform,
);
/// E^1 = E
pub const EXPONENT_ONE_RULE: Rule = Rule::new(
    "exponent-one-rule",
    exponent_one_pattern,
    exponent_one_transform,
);
/// E + 0 = 0 + E = E * 1 = 1 * E = E
pub const UNITY_RULE: Rule = Rule::new("unity-rule", unity_pattern, unity_transform);
/// E * 0 = 0 * E = 0
pub const ZERO_PRODUCT_RULE: Rule = Rule::new(
    "zero-product-rule",
    zero_product_pattern,
    zero_product_transform,
);
/// 3 + 4 = 7, for every arithmetic operator
pub const CONSTANT_FOLD_RULE: Rule = Rule::new(
    "constant-fold-rule",
    constant_fold_pattern,
    constant_fold_transform,
);
/// 3 * (2 * E) = 6 * E
pub const COEFFICIENT_FOLD_RULE: Rule = Rule::new(
    "coefficient-fold-rule",
    coefficient_fold_pattern,
    coefficient_fold_transform,
);

/// The rule library, in application order.
pub static RULES: [Rule; 12] = [
    POWER_RULE,
    IDENTITY_RULE,
    SUM_RULE,
    DIFFERENCE_RULE,
    CONSTANT_RULE,
    PRODUCT_RULE,
    EXPONENT_ZERO_RULE,
    EXPONENT_ONE_RULE,
    UNITY_RULE,
    ZERO_PRODUCT_RULE,
    CONSTANT_FOLD_RULE,
    COEFFICIENT_FOLD_RULE,
];

/// Looks up a library rule by its label.
pub fn by_label(label: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.label() == label)
}

/// Evaluates `a op b` for the arithmetic operators.
pub fn fold(op: &str, a: f64, b: f64) -> Option<f64> {
    match op {
        ops::ADD => Some(a + b),
        ops::SUB => Some(a - b),
        ops::MUL => Some(a * b),
        ops::DIV => Some(a / b),
        ops::POW => Some(a.powf(b)),
        _ => None,
    }
}

/// A check run on the bindings after a skeleton matched.
type Guard = fn(&Bindings) -> bool;

static POWER_SKELETON: LazyLock<Pattern> = LazyLock::new(|| pattern!((DERIV (^ ?E ?N) ?V)));
static DERIV_SKELETON: LazyLock<Pattern> = LazyLock::new(|| pattern!((DERIV ?E ?V)));
static SUM_SKELETON: LazyLock<Pattern> = LazyLock::new(|| pattern!((DERIV (+ ?E1 ?E2) ?V)));
static DIFFERENCE_SKELETON: LazyLock<Pattern> =
    LazyLock::new(|| pattern!((DERIV (- ?E1 ?E2) ?V)));
static PRODUCT_SKELETON: LazyLock<Pattern> = LazyLock::new(|| pattern!((DERIV (* ?E1 ?E2) ?V)));
static EXPONENT_SKELETON: LazyLock<Pattern> = LazyLock::new(|| pattern!((^ ?E ?V)));
static BINARY_SKELETON: LazyLock<Pattern> = LazyLock::new(|| pattern!((?op ?V1 ?V2)));
static COEFFICIENT_SKELETON: LazyLock<Pattern> =
    LazyLock::new(|| pattern!((* ?V1 (* ?V2 ?E))));

static UNITY_ALTERNATIVES: LazyLock<[(Pattern, Guard); 4]> = LazyLock::new(|| {
    [
        (pattern!((+ ?E ?V)), is_zero as Guard),
        (pattern!((+ ?V ?E)), is_zero as Guard),
        (pattern!((* ?E ?V)), is_one as Guard),
        (pattern!((* ?V ?E)), is_one as Guard),
    ]
});
static ZERO_PRODUCT_ALTERNATIVES: LazyLock<[(Pattern, Guard); 2]> = LazyLock::new(|| {
    [
        (pattern!((* ?E ?V)), is_zero as Guard),
        (pattern!((* ?V ?E)), is_zero as Guard),
    ]
});

/// Tries each `(skeleton, guard)` pair in order against a cleared table and
/// stops at the first one that matches and passes its guard.
fn first_match(
    target: &Expression,
    bindings: &mut Bindings,
    alternatives: &[(Pattern, Guard)],
) -> bool {
    alternatives.iter().any(|(skeleton, guard)| {
        bindings.clear();
        skeleton.match_into(target, bindings) && guard(bindings)
    })
}

fn is_zero(bindings: &Bindings) -> bool {
    bindings.number("V") == Some(0.0)
}

fn is_one(bindings: &Bindings) -> bool {
    bindings.number("V") == Some(1.0)
}

fn power_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    POWER_SKELETON.match_into(target, bindings) && bindings.number("N").is_some()
}

fn power_transform(bindings: &Bindings) -> Result<Expression, TransformError> {
    let e = bindings.require("E")?;
    let n = bindings.require_number("N")?;
    let v = bindings.require("V")?;
    Ok(sexpr!((* (* {n} (^ {e.clone()} {n - 1.0})) (DERIV {e.clone()} {v.clone()}))))
}

fn identity_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    DERIV_SKELETON.match_into(target, bindings) && bindings.get("E") == bindings.get("V")
}

fn identity_transform(_: &Bindings) -> Result<Expression, TransformError> {
    Ok(sexpr!(1))
}

fn sum_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    SUM_SKELETON.match_into(target, bindings)
}

fn sum_transform(bindings: &Bindings) -> Result<Expression, TransformError> {
    distribute(ops::ADD, bindings)
}

fn difference_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    DIFFERENCE_SKELETON.match_into(target, bindings)
}

fn difference_transform(bindings: &Bindings) -> Result<Expression, TransformError> {
    distribute(ops::SUB, bindings)
}

/// `(op (DERIV E1 V) (DERIV E2 V))`
fn distribute(op: &str, bindings: &Bindings) -> Result<Expression, TransformError> {
    let e1 = bindings.require("E1")?;
    let e2 = bindings.require("E2")?;
    let v = bindings.require("V")?;
    Ok(Expression::apply(
        op,
        [
            Expression::deriv(e1.clone(), v.clone()),
            Expression::deriv(e2.clone(), v.clone()),
        ],
    ))
}

fn constant_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    DERIV_SKELETON.match_into(target, bindings)
        && match (bindings.get("E"), bindings.get("V")) {
            (Some(e), Some(v)) => !e.contains(v),
            _ => false,
        }
}

fn constant_transform(_: &Bindings) -> Result<Expression, TransformError> {
    Ok(sexpr!(0))
}

fn product_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    PRODUCT_SKELETON.match_into(target, bindings)
}

fn product_transform(bindings: &Bindings) -> Result<Expression, TransformError> {
    let e1 = bindings.require("E1")?;
    let e2 = bindings.require("E2")?;
    let v = bindings.require("V")?;
    Ok(sexpr!((+
        (* {e2.clone()} (DERIV {e1.clone()} {v.clone()}))
        (* {e1.clone()} (DERIV {e2.clone()} {v.clone()})))))
}

fn exponent_zero_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    EXPONENT_SKELETON.match_into(target, bindings) && is_zero(bindings)
}

fn exponent_zero_transform(_: &Bindings) -> Result<Expression, TransformError> {
    Ok(sexpr!(1))
}

fn exponent_one_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    EXPONENT_SKELETON.match_into(target, bindings) && is_one(bindings)
}

fn exponent_one_transform(bindings: &Bindings) -> Result<Expression, TransformError> {
    Ok(bindings.require("E")?.clone())
}

fn unity_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    first_match(target, bindings, &*UNITY_ALTERNATIVES)
}

fn unity_transform(bindings: &Bindings) -> Result<Expression, TransformError> {
    Ok(bindings.require("E")?.clone())
}

fn zero_product_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    first_match(target, bindings, &*ZERO_PRODUCT_ALTERNATIVES)
}

fn zero_product_transform(_: &Bindings) -> Result<Expression, TransformError> {
    Ok(sexpr!(0))
}

fn constant_fold_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    BINARY_SKELETON.match_into(target, bindings)
        && match (
            bindings.get("op").and_then(Expression::as_symbol),
            bindings.number("V1"),
            bindings.number("V2"),
        ) {
            (Some(op), Some(a), Some(b)) => fold(op, a, b).is_some(),
            _ => false,
        }
}

fn constant_fold_transform(bindings: &Bindings) -> Result<Expression, TransformError> {
    let op = bindings.require("op")?;
    let a = bindings.require_number("V1")?;
    let b = bindings.require_number("V2")?;
    op.as_symbol()
        .and_then(|op| fold(op, a, b))
        .map(Expression::Number)
        .ok_or_else(|| TransformError::UnsupportedOperator(op.to_string()))
}

fn coefficient_fold_pattern(target: &Expression, bindings: &mut Bindings) -> bool {
    COEFFICIENT_SKELETON.match_into(target, bindings)
        && bindings.number("V1").is_some()
        && bindings.number("V2").is_some()
}

fn coefficient_fold_transform(bindings: &Bindings) -> Result<Expression, TransformError> {
    let v1 = bindings.require_number("V1")?;
    let v2 = bindings.require_number("V2")?;
    let e = bindings.require("E")?;
    Ok(sexpr!((* {v1 * v2} {e.clone()})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RewriteError;

    /// Runs a rule's predicate on a single node and, if it holds, its transform.
    fn fire(rule: &Rule, target: &Expression) -> Option<Expression> {
        let mut bindings = Bindings::new();
        rule.matches(target, &mut bindings)
            .then(|| rule.transform(&bindings).unwrap())
    }

    #[test]
    fn test_library_order() {
        let labels: Vec<_> = RULES.iter().map(Rule::label).collect();
        assert_eq!(
            labels,
            [
                "power-rule",
                "identity-rule",
                "sum-rule",
                "difference-rule",
                "constant-rule",
                "product-rule",
                "exponent-zero-rule",
                "exponent-one-rule",
                "unity-rule",
                "zero-product-rule",
                "constant-fold-rule",
                "coefficient-fold-rule",
            ]
        );
    }

    #[test]
    fn test_by_label() {
        assert_eq!(by_label("unity-rule").map(Rule::label), Some("unity-rule"));
        assert!(by_label("chain-rule").is_none());
    }

    #[test]
    fn test_skeletons_are_built_once() {
        assert_eq!(POWER_SKELETON.to_string(), "(DERIV (^ E? N?) V?)");
        assert_eq!(COEFFICIENT_SKELETON.to_string(), "(* V1? (* V2? E?))");
        let unity: Vec<_> = UNITY_ALTERNATIVES
            .iter()
            .map(|(skeleton, _)| skeleton.to_string())
            .collect();
        assert_eq!(unity, ["(+ E? V?)", "(+ V? E?)", "(* E? V?)", "(* V? E?)"]);

        // Every use hands out the same tree
        assert!(std::ptr::eq(&*DERIV_SKELETON, &*DERIV_SKELETON));
        let before: *const Pattern = &ZERO_PRODUCT_ALTERNATIVES[0].0;
        assert_eq!(fire(&ZERO_PRODUCT_RULE, &sexpr!((* X 0))), Some(sexpr!(0)));
        assert!(std::ptr::eq(before, &ZERO_PRODUCT_ALTERNATIVES[0].0));
    }

    #[test]
    fn test_power_rule() {
        assert_eq!(
            fire(&POWER_RULE, &sexpr!((DERIV (^ X 3) X))),
            Some(sexpr!((* (* 3 (^ X 2)) (DERIV X X))))
        );
        // The exponent must be a number
        assert_eq!(fire(&POWER_RULE, &sexpr!((DERIV (^ X N) X))), None);
        assert_eq!(fire(&POWER_RULE, &sexpr!((DERIV (* X 3) X))), None);
    }

    #[test]
    fn test_identity_rule() {
        assert_eq!(fire(&IDENTITY_RULE, &sexpr!((DERIV X X))), Some(sexpr!(1)));
        assert_eq!(fire(&IDENTITY_RULE, &sexpr!((DERIV Y X))), None);
    }

    #[test]
    fn test_sum_and_difference_rules() {
        assert_eq!(
            fire(&SUM_RULE, &sexpr!((DERIV (+ X Y) X))),
            Some(sexpr!((+ (DERIV X X) (DERIV Y X))))
        );
        assert_eq!(
            fire(&DIFFERENCE_RULE, &sexpr!((DERIV (- X Y) X))),
            Some(sexpr!((- (DERIV X X) (DERIV Y X))))
        );
        assert_eq!(fire(&SUM_RULE, &sexpr!((DERIV (- X Y) X))), None);
        assert_eq!(fire(&DIFFERENCE_RULE, &sexpr!((DERIV (+ X Y) X))), None);
    }

    #[test]
    fn test_constant_rule() {
        assert_eq!(fire(&CONSTANT_RULE, &sexpr!((DERIV 5 X))), Some(sexpr!(0)));
        assert_eq!(fire(&CONSTANT_RULE, &sexpr!((DERIV Y X))), Some(sexpr!(0)));
        assert_eq!(
            fire(&CONSTANT_RULE, &sexpr!((DERIV (+ Y 5) X))),
            Some(sexpr!(0))
        );
        assert_eq!(fire(&CONSTANT_RULE, &sexpr!((DERIV (+ Y (* 2 X)) X))), None);
        // The variable itself is not a constant
        assert_eq!(fire(&CONSTANT_RULE, &sexpr!((DERIV X X))), None);
    }

    #[test]
    fn test_product_rule() {
        assert_eq!(
            fire(&PRODUCT_RULE, &sexpr!((DERIV (* X Y) X))),
            Some(sexpr!((+ (* Y (DERIV X X)) (* X (DERIV Y X)))))
        );
    }

    #[test]
    fn test_exponent_rules() {
        assert_eq!(fire(&EXPONENT_ZERO_RULE, &sexpr!((^ X 0))), Some(sexpr!(1)));
        assert_eq!(fire(&EXPONENT_ZERO_RULE, &sexpr!((^ X 1))), None);
        assert_eq!(
            fire(&EXPONENT_ONE_RULE, &sexpr!((^ (+ X 1) 1))),
            Some(sexpr!((+ X 1)))
        );
        assert_eq!(fire(&EXPONENT_ONE_RULE, &sexpr!((^ X 2))), None);
        assert_eq!(fire(&EXPONENT_ONE_RULE, &sexpr!((^ X Y))), None);
    }

    #[test]
    fn test_unity_rule() {
        assert_eq!(fire(&UNITY_RULE, &sexpr!((+ X 0))), Some(sexpr!(X)));
        assert_eq!(fire(&UNITY_RULE, &sexpr!((+ 0 X))), Some(sexpr!(X)));
        assert_eq!(fire(&UNITY_RULE, &sexpr!((* X 1))), Some(sexpr!(X)));
        assert_eq!(fire(&UNITY_RULE, &sexpr!((* 1 (^ X 2)))), Some(sexpr!((^ X 2))));
        // The neutral element depends on the operator
        assert_eq!(fire(&UNITY_RULE, &sexpr!((+ X 1))), None);
        assert_eq!(fire(&UNITY_RULE, &sexpr!((* X 0))), None);
        assert_eq!(fire(&UNITY_RULE, &sexpr!((- X 0))), None);
        // Both operands neutral: the first alternative wins and keeps the left
        assert_eq!(fire(&UNITY_RULE, &sexpr!((+ 0 0))), Some(sexpr!(0)));
    }

    #[test]
    fn test_zero_product_rule() {
        assert_eq!(fire(&ZERO_PRODUCT_RULE, &sexpr!((* 5 0))), Some(sexpr!(0)));
        assert_eq!(fire(&ZERO_PRODUCT_RULE, &sexpr!((* 0 X))), Some(sexpr!(0)));
        assert_eq!(fire(&ZERO_PRODUCT_RULE, &sexpr!((* X 1))), None);
        assert_eq!(fire(&ZERO_PRODUCT_RULE, &sexpr!((+ X 0))), None);
    }

    #[test]
    fn test_constant_fold_rule() {
        assert_eq!(fire(&CONSTANT_FOLD_RULE, &sexpr!((+ 3 4))), Some(sexpr!(7)));
        assert_eq!(fire(&CONSTANT_FOLD_RULE, &sexpr!((- 2 5))), Some(sexpr!({-3.0})));
        assert_eq!(fire(&CONSTANT_FOLD_RULE, &sexpr!((* 3 4))), Some(sexpr!(12)));
        assert_eq!(fire(&CONSTANT_FOLD_RULE, &sexpr!((/ 1 4))), Some(sexpr!(0.25)));
        assert_eq!(fire(&CONSTANT_FOLD_RULE, &sexpr!((^ 2 10))), Some(sexpr!(1024)));
        assert_eq!(
            fire(&CONSTANT_FOLD_RULE, &sexpr!((/ 1 0))),
            Some(sexpr!({f64::INFINITY}))
        );
        assert_eq!(fire(&CONSTANT_FOLD_RULE, &sexpr!((+ 3 X))), None);
        // Only arithmetic operators are folded
        assert_eq!(fire(&CONSTANT_FOLD_RULE, &sexpr!((DERIV 3 4))), None);
        assert_eq!(fire(&CONSTANT_FOLD_RULE, &sexpr!((max 3 4))), None);
    }

    #[test]
    fn test_coefficient_fold_rule() {
        assert_eq!(
            fire(&COEFFICIENT_FOLD_RULE, &sexpr!((* 3 (* 2 X)))),
            Some(sexpr!((* 6 X)))
        );
        assert_eq!(fire(&COEFFICIENT_FOLD_RULE, &sexpr!((* 3 (* X 2)))), None);
        assert_eq!(fire(&COEFFICIENT_FOLD_RULE, &sexpr!((* X (* 2 Y)))), None);
    }

    #[test]
    fn test_times_zero_fires_with_zero() {
        assert_eq!(ZERO_PRODUCT_RULE.apply(&sexpr!((* 5 0))).unwrap(), Some(sexpr!(0)));
        assert_eq!(ZERO_PRODUCT_RULE.apply(&sexpr!((+ 1 2))).unwrap(), None);
    }

    #[test]
    fn test_transforms_report_missing_bindings() {
        let err = CONSTANT_FOLD_RULE.transform(&Bindings::new()).unwrap_err();
        assert_eq!(
            err,
            RewriteError::Transform {
                rule: "constant-fold-rule",
                source: TransformError::Unbound("op".to_owned()),
            }
        );

        let bindings = pattern!((?op ?V1 ?V2)).matches(&sexpr!((max 3 4))).unwrap();
        assert_eq!(
            CONSTANT_FOLD_RULE.transform(&bindings).unwrap_err(),
            RewriteError::Transform {
                rule: "constant-fold-rule",
                source: TransformError::UnsupportedOperator("max".to_owned()),
            }
        );
    }
}
