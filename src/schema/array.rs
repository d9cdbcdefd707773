//! The `array` composite: a sequence of values sharing one element schema.

use super::builder::{InjectedValue, Internals, Node, Schema, Structure};
use super::rule::rule_methods;
use super::validation_error::{ValidateError, ValidationErrors};
use super::value::Value;

/// Rule-set marker for [`array`] schemas.
#[derive(Debug)]
pub enum Array {}

/// Creates an array schema with no element schema. Members pass through
/// cast unchanged; use [`Schema::of`] to cast and validate them.
///
/// The default value is the empty sequence.
#[must_use]
pub fn array() -> Schema<Array> {
    Schema::from_internals(Internals::composite(
        "array",
        Value::Sequence(Vec::new()),
        |value| matches!(value, Value::Sequence(_)),
        Structure::Array(None),
    ))
}

impl Schema<Array> {
    /// Casts and validates every member through `element`.
    #[must_use]
    pub fn of<K>(&self, element: Schema<K>) -> Self {
        self.with_structure(Structure::Array(Some(element.into_node())))
    }
}

/// Casts each member through `element`. Returns `Ok(None)` when `value` is
/// not a sequence.
///
/// # Errors
///
/// Every member that fails a strict cast, re-pathed under its index.
pub(crate) fn cast(
    element: Option<&Node>,
    value: &Value,
    strict: bool,
) -> Result<Option<Value>, ValidationErrors> {
    let Some(items) = value.as_sequence() else {
        return Ok(None);
    };
    let Some(element) = element else {
        return Ok(Some(value.clone()));
    };
    let mut cast_items = Vec::with_capacity(items.len());
    let mut errors = Vec::new();
    for (index, item) in items.iter().enumerate() {
        match element.cast(item, strict) {
            Ok(cast) => cast_items.push(cast),
            Err(failures) => errors.extend(failures.prefixed(&index.to_string())),
        }
    }
    if errors.is_empty() {
        Ok(Some(Value::Sequence(cast_items)))
    } else {
        Err(ValidationErrors::new(errors))
    }
}

/// Validates each member with the root forwarded.
pub(crate) fn validate_items(element: &Node, value: &Value, root: &Value) -> Vec<ValidateError> {
    let Some(items) = value.as_sequence() else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .flat_map(|(index, item)| {
            let segment = index.to_string();
            element
                .validate_injected(InjectedValue { value: item, root })
                .into_iter()
                .map(move |error| error.prefixed(&segment))
        })
        .collect()
}

rule_methods! {
    Array {
        /// Sequence must have at least one item.
        "notEmpty" => not_empty / not_empty_with = rules::not_empty;
        /// Sequence must have at least `min` items.
        "min" => min / min_with = rules::min, min: usize;
        /// Sequence must have at most `max` items.
        "max" => max / max_with = rules::max, max: usize;
        /// Sequence must have exactly `length` items.
        "length" => length / length_with = rules::length, length: usize;
    }
}

mod rules {
    use crate::schema::{ErrorFactory, ValidateError, Value};

    fn check<const N: usize>(
        value: &Value,
        error: &ErrorFactory<'_>,
        attrs: [(&str, String); N],
        message: Option<&str>,
        accept: impl FnOnce(usize) -> bool,
    ) -> Option<ValidateError> {
        let count = value.as_sequence().map(<[Value]>::len);
        error.check(count.is_some_and(accept), attrs, message)
    }

    pub(super) fn not_empty(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [], message, |count| count > 0)
    }

    pub(super) fn min(
        value: &Value,
        error: &ErrorFactory<'_>,
        min: usize,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("min", min.to_string())], message, |count| count >= min)
    }

    pub(super) fn max(
        value: &Value,
        error: &ErrorFactory<'_>,
        max: usize,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("max", max.to_string())], message, |count| count <= max)
    }

    pub(super) fn length(
        value: &Value,
        error: &ErrorFactory<'_>,
        length: usize,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        check(value, error, [("length", length.to_string())], message, |count| {
            count == length
        })
    }
}
