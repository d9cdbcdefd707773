//! The `record` composite: a mapping with arbitrary keys and one value
//! schema.

use indexmap::IndexMap;

use super::builder::{InjectedValue, Internals, Node, Schema, Structure};
use super::validation_error::{ValidateError, ValidationErrors};
use super::value::Value;

/// Rule-set marker for [`record`] schemas.
#[derive(Debug)]
pub enum Record {}

/// Creates a record schema with no value schema. Entries pass through cast
/// unchanged; use [`Schema::values`] to cast and validate them.
///
/// The default value is the empty mapping.
#[must_use]
pub fn record() -> Schema<Record> {
    Schema::from_internals(Internals::composite(
        "record",
        Value::Mapping(IndexMap::new()),
        |value| matches!(value, Value::Mapping(_)),
        Structure::Record(None),
    ))
}

impl Schema<Record> {
    /// Casts and validates every entry value through `element`.
    #[must_use]
    pub fn values<K>(&self, element: Schema<K>) -> Self {
        self.with_structure(Structure::Record(Some(element.into_node())))
    }
}

/// Casts every entry value through `element`, keeping input key order.
/// Returns `Ok(None)` when `value` is not a mapping.
///
/// # Errors
///
/// Every entry that fails a strict cast, re-pathed under its key.
pub(crate) fn cast(
    element: Option<&Node>,
    value: &Value,
    strict: bool,
) -> Result<Option<Value>, ValidationErrors> {
    let Some(entries) = value.as_mapping() else {
        return Ok(None);
    };
    let Some(element) = element else {
        return Ok(Some(value.clone()));
    };
    let mut cast_entries = IndexMap::with_capacity(entries.len());
    let mut errors = Vec::new();
    for (key, entry) in entries {
        match element.cast(entry, strict) {
            Ok(cast) => {
                cast_entries.insert(key.clone(), cast);
            }
            Err(failures) => errors.extend(failures.prefixed(key)),
        }
    }
    if errors.is_empty() {
        Ok(Some(Value::Mapping(cast_entries)))
    } else {
        Err(ValidationErrors::new(errors))
    }
}

/// Validates each entry value with the root forwarded.
pub(crate) fn validate_entries(element: &Node, value: &Value, root: &Value) -> Vec<ValidateError> {
    let Some(entries) = value.as_mapping() else {
        return Vec::new();
    };
    entries
        .iter()
        .flat_map(|(key, entry)| {
            element
                .validate_injected(InjectedValue { value: entry, root })
                .into_iter()
                .map(move |error| error.prefixed(key))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::schema::{number, object, Shape};

    #[rstest]
    fn entries_cast_in_input_order() {
        let schema = record().values(number());
        let input = Value::from_iter([("b", "2"), ("a", "1")]);
        let cast = schema.cast(&input);
        let keys: Vec<&String> = cast.as_mapping().map(|m| m.keys().collect()).unwrap_or_default();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(cast.get("a"), Some(&Value::from(1)));
    }

    #[rstest]
    fn strict_cast_aggregates_like_array_and_object() {
        let schema = record().values(number());
        let input = Value::from_iter([("x", "no"), ("y", "3"), ("z", "nope")]);
        let errors = schema.try_cast(&input).expect_err("two entries fail");
        let fields: Vec<String> = errors.as_slice().iter().map(ValidateError::field).collect();
        assert_eq!(fields, vec!["x", "z"]);
    }

    #[rstest]
    fn entries_validate_under_their_keys() {
        let schema = record().values(object(Shape::new().field("n", number().positive())));
        let input = Value::from_iter([
            ("ok", Value::from_iter([("n", 1)])),
            ("bad", Value::from_iter([("n", -1)])),
        ]);
        let errors = schema.validate(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().map(ValidateError::path), Some(["bad".to_owned(), "n".to_owned()].as_slice()));
    }

    #[rstest]
    fn untyped_record_passes_entries_through() {
        let input = Value::from_iter([("k", Value::Sequence(Vec::new()))]);
        assert_eq!(record().cast(&input), input);
        assert!(record().validate(&input).is_empty());
    }
}
