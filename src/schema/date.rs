//! The `date` type and its rules.

use chrono::{DateTime, NaiveDate, Utc};

use super::builder::{Internals, Schema};
use super::rule::rule_methods;
use super::value::Value;

/// Rule-set marker for [`date`] schemas.
#[derive(Debug)]
pub enum Date {}

/// Creates a date schema.
///
/// RFC 3339 strings, `YYYY-MM-DD` strings (midnight UTC) and numbers taken
/// as milliseconds since the Unix epoch coerce to [`Value::Date`].
#[must_use]
pub fn date() -> Schema<Date> {
    Schema::from_internals(Internals::leaf("date", coerce, |value| {
        matches!(value, Value::Date(_))
    }))
}

fn coerce(value: &Value) -> Option<Value> {
    match value {
        Value::Date(_) => Some(value.clone()),
        Value::String(s) => parse(s.trim()).map(Value::Date),
        Value::Number(n) => from_millis(*n).map(Value::Date),
        _ => None,
    }
}

/// Coerces `value` the way [`date`] casts it.
pub(crate) fn to_date(value: &Value) -> Option<DateTime<Utc>> {
    coerce(value).and_then(|cast| cast.as_date().copied())
}

fn parse(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "fractional milliseconds are dropped and out-of-range values are rejected by chrono"
)]
fn from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis.trunc() as i64)
}

rule_methods! {
    Date {
        /// Value must be at or after `min`.
        "min" => min / min_with = rules::min, min: DateTime<Utc>;
        /// Value must be at or before `max`.
        "max" => max / max_with = rules::max, max: DateTime<Utc>;
        /// Value must be strictly before `less`.
        "lessThan" => less_than / less_than_with = rules::less_than, less: DateTime<Utc>;
        /// Value must be strictly after `more`.
        "moreThan" => more_than / more_than_with = rules::more_than, more: DateTime<Utc>;
        /// Value must be one of `values`.
        "oneOf" => one_of / one_of_with = rules::one_of, values: Vec<DateTime<Utc>>;
        /// Value must not be one of `values`.
        "notOneOf" => not_one_of / not_one_of_with = rules::not_one_of, values: Vec<DateTime<Utc>>;
    }
}

mod rules {
    use chrono::{DateTime, SecondsFormat, Utc};

    use crate::schema::{ErrorFactory, ValidateError, Value};

    fn check<const N: usize>(
        value: &Value,
        error: &ErrorFactory<'_>,
        attrs: [(&str, String); N],
        message: Option<&str>,
        accept: impl FnOnce(&DateTime<Utc>) -> bool,
    ) -> Option<ValidateError> {
        error.check(value.as_date().is_some_and(accept), attrs, message)
    }

    fn format(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn join(values: &[DateTime<Utc>]) -> String {
        values.iter().map(format).collect::<Vec<_>>().join(",")
    }

    pub(super) fn min(
        value: &Value,
        error: &ErrorFactory<'_>,
        min: DateTime<Utc>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("min", format(&min))], message, |d| *d >= min)
    }

    pub(super) fn max(
        value: &Value,
        error: &ErrorFactory<'_>,
        max: DateTime<Utc>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("max", format(&max))], message, |d| *d <= max)
    }

    pub(super) fn less_than(
        value: &Value,
        error: &ErrorFactory<'_>,
        less: DateTime<Utc>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("less", format(&less))], message, |d| *d < less)
    }

    pub(super) fn more_than(
        value: &Value,
        error: &ErrorFactory<'_>,
        more: DateTime<Utc>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("more", format(&more))], message, |d| *d > more)
    }

    pub(super) fn one_of(
        value: &Value,
        error: &ErrorFactory<'_>,
        values: &[DateTime<Utc>],
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("values", join(values))], message, |d| {
            values.contains(d)
        })
    }

    pub(super) fn not_one_of(
        value: &Value,
        error: &ErrorFactory<'_>,
        values: &[DateTime<Utc>],
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("values", join(values))], message, |d| {
            !values.contains(d)
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::schema::ValidateError;

    #[fixture]
    fn new_year() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    #[case::rfc3339("2024-01-01T02:00:00+02:00")]
    #[case::day_only("2024-01-01")]
    #[case::padded(" 2024-01-01 ")]
    fn casts_strings(new_year: DateTime<Utc>, #[case] input: &str) {
        assert_eq!(date().cast(&Value::from(input)), Value::Date(new_year));
    }

    #[rstest]
    fn casts_epoch_millis(new_year: DateTime<Utc>) {
        let millis = Value::Number(1_704_067_200_000.0);
        assert_eq!(date().cast(&millis), Value::Date(new_year));
    }

    #[rstest]
    #[case::garbage(Value::from("yesterday"))]
    #[case::boolean(Value::from(true))]
    #[case::infinite(Value::Number(f64::INFINITY))]
    fn rejects_uncoercible(#[case] input: Value) {
        assert_eq!(date().cast(&input), Value::Null);
        let errors = date().validate(&input);
        assert_eq!(errors.first().map(ValidateError::rule), Some("type"));
    }

    #[rstest]
    fn bounds_compare_instants(new_year: DateTime<Utc>) {
        let schema = date().min(new_year);
        assert!(schema.is_valid(&Value::from("2024-06-01")));
        let errors = schema.validate(&Value::from("2023-12-31"));
        assert_eq!(
            errors.first().map(ValidateError::message).as_deref(),
            Some(" field must be later than 2024-01-01T00:00:00.000Z")
        );
        assert!(date().more_than(new_year).validate(&Value::Date(new_year)).len() == 1);
        assert!(date().less_than(new_year).is_valid(&Value::from("2023-12-31")));
        assert!(!date().max(new_year).is_valid(&Value::from("2024-01-02")));
    }

    #[rstest]
    fn membership_rules(new_year: DateTime<Utc>) {
        assert!(date().one_of(vec![new_year]).is_valid(&Value::from("2024-01-01")));
        assert!(!date().not_one_of(vec![new_year]).is_valid(&Value::from("2024-01-01")));
        assert!(!date().one_of(vec![new_year]).is_valid(&Value::Null));
        assert!(!date().not_one_of(vec![new_year]).is_valid(&Value::Null));
    }
}
