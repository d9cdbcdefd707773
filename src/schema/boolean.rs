//! The `boolean` type.

use super::builder::{Internals, Schema};
use super::value::Value;

/// Rule-set marker for [`boolean`] schemas.
#[derive(Debug)]
pub enum Boolean {}

/// Creates a boolean schema. The strings `"true"` and `"false"` coerce.
#[must_use]
pub fn boolean() -> Schema<Boolean> {
    Schema::from_internals(Internals::leaf("boolean", coerce, |value| {
        matches!(value, Value::Bool(_))
    }))
}

fn coerce(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(s) => match s.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::native(Value::from(true), Value::from(true))]
    #[case::string_true(Value::from("true"), Value::from(true))]
    #[case::string_false(Value::from(" false "), Value::from(false))]
    #[case::junk(Value::from("yes"), Value::Null)]
    #[case::number(Value::from(1), Value::Null)]
    fn casts(#[case] input: Value, #[case] expected: Value) {
        assert_eq!(boolean().cast(&input), expected);
    }

    #[rstest]
    fn strict_validation_reports_type() {
        let errors = boolean().validate(&Value::from("yes"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().map(|e| e.rule()), Some("type"));
    }
}
