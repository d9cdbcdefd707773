//! The `object` composite: a mapping with a fixed set of declared keys.
//!
//! Cast touches only the keys present in the input and keeps undeclared
//! keys as they are. Validation walks the declared shape instead, so a
//! declared key missing from the input is validated as null and its
//! `required` rule can fire.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::builder::{InjectedValue, Internals, Node, Schema, Structure};
use super::validation_error::{ValidateError, ValidationErrors};
use super::value::{NULL, Value};

/// Rule-set marker for [`object`] schemas.
#[derive(Debug)]
pub enum Object {}

/// Declared keys of an object schema, in declaration order.
#[derive(Clone, Default)]
pub struct Shape {
    fields: IndexMap<String, Arc<Node>>,
}

impl Shape {
    /// Creates an empty shape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `key` with its child schema. Redeclaring a key replaces the
    /// schema but keeps the original position.
    #[must_use]
    pub fn field<K>(mut self, key: impl Into<String>, schema: Schema<K>) -> Self {
        self.fields.insert(key.into(), schema.into_node());
        self
    }

    /// Number of declared keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when no keys are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().map(|(key, node)| (key, node.type_name())))
            .finish()
    }
}

impl<S: Into<String>, K> FromIterator<(S, Schema<K>)> for Shape {
    fn from_iter<I: IntoIterator<Item = (S, Schema<K>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |shape, (key, schema)| shape.field(key, schema))
    }
}

/// Creates an object schema over `shape`. The default value is the empty
/// mapping.
#[must_use]
pub fn object(shape: Shape) -> Schema<Object> {
    Schema::from_internals(Internals::composite(
        "object",
        Value::Mapping(IndexMap::new()),
        |value| matches!(value, Value::Mapping(_)),
        Structure::Object(shape.fields),
    ))
}

/// Casts each input key that has a declared schema, passing other keys
/// through. Returns `Ok(None)` when `value` is not a mapping.
///
/// # Errors
///
/// Every declared member that fails a strict cast, re-pathed under its key.
pub(crate) fn cast(
    shape: &IndexMap<String, Arc<Node>>,
    value: &Value,
    strict: bool,
) -> Result<Option<Value>, ValidationErrors> {
    let Some(entries) = value.as_mapping() else {
        return Ok(None);
    };
    let mut cast_entries = IndexMap::with_capacity(entries.len());
    let mut errors = Vec::new();
    for (key, member) in entries {
        let Some(child) = shape.get(key) else {
            cast_entries.insert(key.clone(), member.clone());
            continue;
        };
        match child.cast(member, strict) {
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

/// Validates every declared key with the root forwarded.
pub(crate) fn validate_shape(
    shape: &IndexMap<String, Arc<Node>>,
    value: &Value,
    root: &Value,
) -> Vec<ValidateError> {
    let Some(entries) = value.as_mapping() else {
        return Vec::new();
    };
    shape
        .iter()
        .flat_map(|(key, child)| {
            let member = entries.get(key).unwrap_or(&NULL);
            child
                .validate_injected(InjectedValue {
                    value: member,
                    root,
                })
                .into_iter()
                .map(move |error| error.prefixed(key))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::schema::{number, string};

    #[fixture]
    fn person() -> Schema<Object> {
        object(
            Shape::new()
                .field("name", string().required())
                .field("age", number().min(18.0)),
        )
    }

    #[rstest]
    fn cast_preserves_unknown_keys(person: Schema<Object>) {
        let input = Value::from_iter([
            ("age", Value::from("30")),
            ("extra", Value::from("z")),
        ]);
        let cast = person.cast(&input);
        assert_eq!(cast.get("age"), Some(&Value::from(30)));
        assert_eq!(cast.get("extra"), Some(&Value::from("z")));
        assert_eq!(cast.get("name"), None);
    }

    #[rstest]
    fn missing_declared_keys_validate_as_null(person: Schema<Object>) {
        let errors = person.validate(&Value::Mapping(IndexMap::new()));
        let found: Vec<(String, &str)> = errors
            .iter()
            .map(|error| (error.field(), error.rule()))
            .collect();
        assert_eq!(
            found,
            vec![("name".to_owned(), "required"), ("age".to_owned(), "min")]
        );
        assert_eq!(
            errors.first().map(ValidateError::message).as_deref(),
            Some("name is a required field")
        );
    }

    #[rstest]
    fn errors_follow_declaration_order(person: Schema<Object>) {
        let input = Value::from_iter([("age", Value::from(3))]);
        let keys: Vec<String> = person
            .validate(&input)
            .iter()
            .map(ValidateError::field)
            .collect();
        assert_eq!(keys, vec!["name", "age"]);
    }

    #[rstest]
    fn strict_cast_aggregates_members(person: Schema<Object>) {
        let input = Value::from_iter([
            ("name", Value::Sequence(Vec::new())),
            ("age", Value::from("old")),
        ]);
        let errors = person.try_cast(&input).expect_err("both members fail");
        let fields: Vec<String> = errors.as_slice().iter().map(ValidateError::field).collect();
        assert_eq!(fields, vec!["name", "age"]);
    }

    #[rstest]
    fn shape_collects_from_pairs() {
        let shape: Shape = [("a", number()), ("b", number().integer())]
            .into_iter()
            .collect();
        assert_eq!(shape.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(format!("{shape:?}"), r#"{"a": "number", "b": "number"}"#);
    }

    #[rstest]
    fn non_mapping_input_is_a_type_error(person: Schema<Object>) {
        let errors = person.validate(&Value::from(5));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().map(ValidateError::rule), Some("type"));
    }
}
