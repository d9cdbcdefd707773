//! The `number` type and its rules.

use super::builder::{Internals, Schema};
use super::rule::rule_methods;
use super::value::Value;

/// Rule-set marker for [`number`] schemas.
#[derive(Debug)]
pub enum Number {}

/// Creates a number schema. Numeric strings coerce (`"42"` casts to `42`);
/// anything else is absent, or a `type` error when validating.
#[must_use]
pub fn number() -> Schema<Number> {
    Schema::from_internals(Internals::leaf("number", coerce, |value| {
        matches!(value, Value::Number(_))
    }))
}

fn coerce(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => parse_numeric(s.trim()).map(Value::Number),
        _ => None,
    }
}

/// Parses a decimal or exponent literal. Of the non-finite spellings only
/// `Infinity` with an optional sign is accepted; `inf`, `infinity` and
/// `NaN` are not numbers. Literals too large for `f64` overflow to infinity.
fn parse_numeric(text: &str) -> Option<f64> {
    match text {
        "Infinity" | "+Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => text.parse::<f64>().ok().filter(|n| {
            n.is_finite() || (!n.is_nan() && !text.to_ascii_lowercase().contains("inf"))
        }),
    }
}

rule_methods! {
    Number {
        /// Value must be `>= min`.
        "min" => min / min_with = rules::min, min: f64;
        /// Value must be `<= max`.
        "max" => max / max_with = rules::max, max: f64;
        /// Value must be `< less`.
        "lessThan" => less_than / less_than_with = rules::less_than, less: f64;
        /// Value must be `> more`.
        "moreThan" => more_than / more_than_with = rules::more_than, more: f64;
        /// Value must be `> 0`.
        "positive" => positive / positive_with = rules::positive;
        /// Value must be `< 0`.
        "negative" => negative / negative_with = rules::negative;
        /// Value must be an integer within the exactly representable range.
        "integer" => integer / integer_with = rules::integer;
        /// Value must be one of `values`.
        "oneOf" => one_of / one_of_with = rules::one_of, values: Vec<f64>;
        /// Value must not be one of `values`.
        "notOneOf" => not_one_of / not_one_of_with = rules::not_one_of, values: Vec<f64>;
    }
}

mod rules {
    use crate::schema::{ErrorFactory, ValidateError, Value};

    /// Largest integer `n` such that `n` and `n + 1` are both exact in `f64`.
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

    fn check<const N: usize>(
        value: &Value,
        error: &ErrorFactory<'_>,
        attrs: [(&str, String); N],
        message: Option<&str>,
        accept: impl FnOnce(f64) -> bool,
    ) -> Option<ValidateError> {
        error.check(value.as_f64().is_some_and(accept), attrs, message)
    }

    fn join(values: &[f64]) -> String {
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub(super) fn min(
        value: &Value,
        error: &ErrorFactory<'_>,
        min: f64,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("min", min.to_string())], message, |n| n >= min)
    }

    pub(super) fn max(
        value: &Value,
        error: &ErrorFactory<'_>,
        max: f64,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("max", max.to_string())], message, |n| n <= max)
    }

    pub(super) fn less_than(
        value: &Value,
        error: &ErrorFactory<'_>,
        less: f64,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("less", less.to_string())], message, |n| n < less)
    }

    pub(super) fn more_than(
        value: &Value,
        error: &ErrorFactory<'_>,
        more: f64,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("more", more.to_string())], message, |n| n > more)
    }

    pub(super) fn positive(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [], message, |n| n > 0.0)
    }

    pub(super) fn negative(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [], message, |n| n < 0.0)
    }

    pub(super) fn integer(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [], message, |n| {
            n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
        })
    }

    pub(super) fn one_of(
        value: &Value,
        error: &ErrorFactory<'_>,
        values: &[f64],
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("values", join(values))], message, |n| {
            values.contains(&n)
        })
    }

    pub(super) fn not_one_of(
        value: &Value,
        error: &ErrorFactory<'_>,
        values: &[f64],
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("values", join(values))], message, |n| {
            !values.contains(&n)
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::schema::ValidateError;

    fn rules_failed(schema: &Schema<Number>, value: impl Into<Value>) -> Vec<String> {
        schema
            .validate(&value.into())
            .iter()
            .map(|error| error.rule().to_owned())
            .collect()
    }

    #[rstest]
    #[case::numeric_string("42", Value::from(42))]
    #[case::padded("  2.5 ", Value::from(2.5))]
    #[case::exponent("1e3", Value::from(1000))]
    #[case::garbage("abc", Value::Null)]
    #[case::empty("", Value::Null)]
    #[case::nan("NaN", Value::Null)]
    #[case::short_inf("inf", Value::Null)]
    #[case::lowercase_infinity("infinity", Value::Null)]
    #[case::overflow("1e400", Value::Number(f64::INFINITY))]
    #[case::infinity("-Infinity", Value::Number(f64::NEG_INFINITY))]
    fn casts_strings(#[case] input: &str, #[case] expected: Value) {
        assert_eq!(number().cast(&Value::from(input)), expected);
    }

    #[rstest]
    fn non_numeric_string_is_a_type_error() {
        let errors = number().validate(&Value::from("abc"));
        assert_eq!(errors.len(), 1);
        let error = errors.first().expect("one error");
        assert_eq!(error.rule(), "type");
        assert_eq!(error.type_name(), "number");
        assert_eq!(error.attrs().get("type").map(String::as_str), Some("number"));
    }

    #[rstest]
    #[case::min(number().min(5.0), 4.0, true)]
    #[case::min_edge(number().min(5.0), 5.0, false)]
    #[case::max(number().max(5.0), 6.0, true)]
    #[case::less_than(number().less_than(5.0), 5.0, true)]
    #[case::more_than(number().more_than(5.0), 5.0, true)]
    #[case::positive(number().positive(), 0.0, true)]
    #[case::negative(number().negative(), -1.0, false)]
    #[case::integer(number().integer(), 1.5, true)]
    #[case::unsafe_integer(number().integer(), 9_007_199_254_740_992.0, true)]
    #[case::one_of(number().one_of(vec![1.0, 2.0]), 3.0, true)]
    #[case::not_one_of(number().not_one_of(vec![1.0, 2.0]), 2.0, true)]
    fn rule_outcomes(#[case] schema: Schema<Number>, #[case] input: f64, #[case] fails: bool) {
        assert_eq!(!rules_failed(&schema, input).is_empty(), fails);
    }

    #[rstest]
    fn absent_values_fail_every_rule() {
        let schema = number().min(5.0).positive().integer().not_one_of(vec![7.0]);
        assert_eq!(
            rules_failed(&schema, Value::Null),
            vec!["min", "positive", "integer", "notOneOf"]
        );
    }

    #[rstest]
    fn attrs_render_into_messages() {
        let errors = number().one_of(vec![1.0, 2.5]).validate(&Value::from(3));
        assert_eq!(
            errors.first().map(ValidateError::message).as_deref(),
            Some(" must be one of the following values: 1,2.5")
        );
        let errors = number().min_with(10.0, "too small").validate(&Value::from(3));
        assert_eq!(
            errors.first().map(ValidateError::message).as_deref(),
            Some("too small")
        );
    }
}
