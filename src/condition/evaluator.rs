//! Condition set evaluator

use super::ast::{Bound, Condition};
use crate::environment::Environment;

/// Evaluate a condition set against an environment.
///
/// The set is the AND of its clauses. **An empty set evaluates to `false`**:
/// a rule that should always apply must skip evaluation rather than pass
/// an empty set.
pub fn evaluate(conditions: &[Condition], env: &Environment) -> bool {
    !conditions.is_empty() && conditions.iter().all(|c| evaluate_condition(c, env))
}

/// Evaluate one clause.
///
/// A missing field is `false`, never an error. A clause with no side is `false`.
pub fn evaluate_condition(condition: &Condition, env: &Environment) -> bool {
    let Some(value) = env.get_path(&condition.field) else {
        log::debug!("Field '{}' not present, clause is false", condition.field);
        return false;
    };
    let field_value = value.as_f64();

    let left = condition
        .left
        .as_ref()
        .map(|bound| compare(field_value, bound, true));
    let right = condition
        .right
        .as_ref()
        .map(|bound| compare(field_value, bound, false));

    let results: Vec<bool> = [left, right].into_iter().flatten().collect();
    !results.is_empty() && results.iter().all(|r| *r)
}

// `literal_first` puts the literal on the left of the operator.
fn compare(field_value: Option<f64>, bound: &Bound, literal_first: bool) -> bool {
    match field_value {
        Some(v) if literal_first => bound.op.apply(bound.value, v),
        Some(v) => bound.op.apply(v, bound.value),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::parser::parse;
    use serde_json::{json, Value};

    fn env_with(pairs: Vec<(&str, Value)>) -> Environment {
        pairs.into_iter().collect()
    }

    #[test]
    fn test_right_only_clause() {
        let expr = parse("height > 50.0").unwrap();

        assert!(evaluate(&expr, &env_with(vec![("height", json!(60))])));
        assert!(!evaluate(&expr, &env_with(vec![("height", json!(40))])));
        assert!(!evaluate(&expr, &Environment::new()));
    }

    #[test]
    fn test_two_sided_clause() {
        let expr = parse("4.0 < height > 50.0").unwrap();
        let env = env_with(vec![("height", json!(10))]);

        // 4.0 < 10 holds, 10 > 50 does not
        assert!(!evaluate(&expr, &env));

        let range = parse("4.0 < height < 50.0").unwrap();
        assert!(evaluate(&range, &env));
    }

    #[test]
    fn test_left_operand_is_literal() {
        let expr = parse("10 <= width").unwrap();
        assert!(evaluate(&expr, &env_with(vec![("width", json!(12))])));
        assert!(!evaluate(&expr, &env_with(vec![("width", json!(8))])));
    }

    #[test]
    fn test_empty_set_is_false() {
        assert!(!evaluate(&[], &env_with(vec![("height", json!(10))])));
        assert!(!evaluate(&[], &Environment::new()));
    }

    #[test]
    fn test_degenerate_clause_is_false() {
        let expr = parse("height").unwrap();
        assert!(!evaluate(&expr, &env_with(vec![("height", json!(10))])));
    }

    #[test]
    fn test_missing_field_is_false_for_every_operator() {
        let env = env_with(vec![("other", json!(1))]);
        for text in [
            "height < 1",
            "height <= 1",
            "height == 1",
            "height != 1",
            "height >= 1",
            "height > 1",
            "1 < height",
        ] {
            assert!(!evaluate(&parse(text).unwrap(), &env), "{}", text);
        }
    }

    #[test]
    fn test_and_across_lines() {
        let expr = parse("width > 5.0 in\n4.0 in < height > 50.0 in").unwrap();
        assert!(!evaluate(
            &expr,
            &env_with(vec![("height", json!(10)), ("width", json!(6))])
        ));
        assert!(evaluate(
            &expr,
            &env_with(vec![("height", json!(60)), ("width", json!(6))])
        ));
        assert!(!evaluate(
            &expr,
            &env_with(vec![("height", json!(60)), ("width", json!(4))])
        ));
    }

    #[test]
    fn test_exponent_literals() {
        let env = env_with(vec![("height", json!(500))]);
        assert!(!evaluate(&parse("height > 1e3").unwrap(), &env));
        assert!(evaluate(&parse("height > 2.5E-1").unwrap(), &env));
        assert!(evaluate(&parse("4.0e1 in < height").unwrap(), &env));
        assert!(!evaluate(
            &parse("4.0e1 in < height").unwrap(),
            &env_with(vec![("height", json!(30))])
        ));
    }

    #[test]
    fn test_equality_operators() {
        let env = env_with(vec![("count", json!(3))]);
        assert!(evaluate(&parse("count == 3").unwrap(), &env));
        assert!(!evaluate(&parse("count != 3").unwrap(), &env));
        assert!(evaluate(&parse("count != 4").unwrap(), &env));
    }

    #[test]
    fn test_non_numeric_value_is_false() {
        let env = env_with(vec![("status", json!("ready"))]);
        assert!(!evaluate(&parse("status > 1").unwrap(), &env));
        assert!(!evaluate(&parse("status != 1").unwrap(), &env));
    }

    #[test]
    fn test_nested_field() {
        let env = env_with(vec![("categories", json!({"red": 12}))]);
        assert!(evaluate(&parse("categories.red >= 10").unwrap(), &env));
        assert!(!evaluate(&parse("categories.blue >= 10").unwrap(), &env));
    }
}
