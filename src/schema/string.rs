//! The `string` type and its rules.
//!
//! Lengths count Unicode scalar values, not bytes.

use regex::Regex;

use super::builder::{Internals, Schema};
use super::rule::rule_methods;
use super::value::Value;

/// Rule-set marker for [`string`] schemas.
#[derive(Debug)]
pub enum Text {}

/// Creates a string schema. Numbers and booleans coerce to their string
/// form.
#[must_use]
pub fn string() -> Schema<Text> {
    Schema::from_internals(Internals::leaf("string", coerce, |value| {
        matches!(value, Value::String(_))
    }))
}

fn coerce(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(_) | Value::Bool(_) => Some(Value::String(value.to_string())),
        _ => None,
    }
}

rule_methods! {
    Text {
        /// Value must contain at least one character.
        "notEmpty" => not_empty / not_empty_with = rules::not_empty;
        /// Value must have at least `min` characters.
        "min" => min / min_with = rules::min, min: usize;
        /// Value must have at most `max` characters.
        "max" => max / max_with = rules::max, max: usize;
        /// Value must have exactly `length` characters.
        "length" => length / length_with = rules::length, length: usize;
        /// Value must match `regex`.
        "matches" => matches / matches_with = rules::matches, regex: Regex;
        /// Value must be an email address.
        "email" => email / email_with = rules::email;
        /// Value must be an absolute or protocol-relative URL.
        "url" => url / url_with = rules::url;
        /// Value must be a UUID.
        "uuid" => uuid / uuid_with = rules::uuid;
        /// Value must have no leading or trailing whitespace.
        "trim" => trim / trim_with = rules::trim;
        /// Value must be lowercase.
        "lowercase" => lowercase / lowercase_with = rules::lowercase;
        /// Value must be uppercase.
        "uppercase" => uppercase / uppercase_with = rules::uppercase;
        /// Value must be one of `values`.
        "oneOf" => one_of / one_of_with = rules::one_of, values: Vec<String>;
        /// Value must not be one of `values`.
        "notOneOf" => not_one_of / not_one_of_with = rules::not_one_of, values: Vec<String>;
    }
}

mod rules {
    use regex::Regex;

    use crate::schema::pattern::{EMAIL, URL, UUID};
    use crate::schema::{ErrorFactory, ValidateError, Value};

    fn check<const N: usize>(
        value: &Value,
        error: &ErrorFactory<'_>,
        attrs: [(&str, String); N],
        message: Option<&str>,
        accept: impl FnOnce(&str) -> bool,
    ) -> Option<ValidateError> {
        error.check(value.as_str().is_some_and(accept), attrs, message)
    }

    fn chars(s: &str) -> usize {
        s.chars().count()
    }

    pub(super) fn not_empty(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [], message, |s| !s.is_empty())
    }

    pub(super) fn min(
        value: &Value,
        error: &ErrorFactory<'_>,
        min: usize,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("min", min.to_string())], message, |s| {
            chars(s) >= min
        })
    }

    pub(super) fn max(
        value: &Value,
        error: &ErrorFactory<'_>,
        max: usize,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("max", max.to_string())], message, |s| {
            chars(s) <= max
        })
    }

    pub(super) fn length(
        value: &Value,
        error: &ErrorFactory<'_>,
        length: usize,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("length", length.to_string())], message, |s| {
            chars(s) == length
        })
    }

    pub(super) fn matches(
        value: &Value,
        error: &ErrorFactory<'_>,
        regex: &Regex,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("regex", format!("/{regex}/"))], message, |s| {
            regex.is_match(s)
        })
    }

    pub(super) fn email(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [], message, |s| EMAIL.is_match(s))
    }

    pub(super) fn url(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [], message, |s| URL.is_match(s))
    }

    pub(super) fn uuid(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [], message, |s| UUID.is_match(s))
    }

    pub(super) fn trim(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [], message, |s| s == s.trim())
    }

    pub(super) fn lowercase(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [], message, |s| s == s.to_lowercase())
    }

    pub(super) fn uppercase(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [], message, |s| s == s.to_uppercase())
    }

    pub(super) fn one_of(
        value: &Value,
        error: &ErrorFactory<'_>,
        values: &[String],
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("values", values.join(","))], message, |s| {
            values.iter().any(|candidate| candidate == s)
        })
    }

    pub(super) fn not_one_of(
        value: &Value,
        error: &ErrorFactory<'_>,
        values: &[String],
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("values", values.join(","))], message, |s| {
            values.iter().all(|candidate| candidate != s)
        })
    }
}
