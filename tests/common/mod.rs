//! Shared helpers for integration tests.

#![expect(dead_code, reason = "each test binary uses a different subset of helpers")]

use castkit::schema::{ValidateError, Value};
pub use test_helpers::{fixture_path, load_fixture};

/// Parses a YAML input value.
///
/// # Panics
///
/// Panics if the YAML is malformed.
pub fn value(yaml: &str) -> Value {
    Value::from_yaml(yaml).unwrap_or_else(|e| panic!("invalid value yaml {yaml:?}: {e}"))
}

/// Summarizes errors as `(dotted path, rule)` pairs.
pub fn paths_and_rules(errors: &[ValidateError]) -> Vec<(String, String)> {
    errors
        .iter()
        .map(|error| (error.path().join("."), error.rule().to_owned()))
        .collect()
}

/// Builds the expected side of a [`paths_and_rules`] comparison.
pub fn expected(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(path, rule)| ((*path).to_owned(), (*rule).to_owned()))
        .collect()
}
