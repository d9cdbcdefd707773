//! Structured validation errors and their locale rendering.
//!
//! A [`ValidateError`] records which type and rule rejected a value, where in
//! the input the value sits, and the attributes needed to render a message.
//! Records are never mutated: crossing a nesting boundary produces a new
//! record with a longer path.

use std::fmt;

use indexmap::IndexMap;

use super::locale::{Locales, MIXED};

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateError {
    type_name: String,
    rule: String,
    path: Vec<String>,
    label: Option<String>,
    attrs: IndexMap<String, String>,
    message: Option<String>,
}

impl ValidateError {
    /// Creates an error for `rule` on a schema of type `type_name`, located
    /// at the root with no label, attributes, or message override.
    #[must_use]
    pub fn new(type_name: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            rule: rule.into(),
            path: Vec::new(),
            label: None,
            attrs: IndexMap::new(),
            message: None,
        }
    }

    /// Creates the synthesized `type` error for a value that fails a
    /// schema's type check.
    #[must_use]
    pub fn type_mismatch(type_name: &str) -> Self {
        Self::new(type_name, "type").with_attrs([("type", type_name)])
    }

    /// Sets the path.
    #[must_use]
    pub fn with_path<I, S>(mut self, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: Option<impl Into<String>>) -> Self {
        self.label = label.map(Into::into);
        self
    }

    /// Sets the attribute bag.
    #[must_use]
    pub fn with_attrs<I, K, V>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attrs = attrs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    /// Sets the explicit message override.
    #[must_use]
    pub fn with_message(mut self, message: Option<impl Into<String>>) -> Self {
        self.message = message.map(Into::into);
        self
    }

    /// Returns a copy of this error with `segment` prepended to its path.
    #[must_use]
    pub fn prefixed(&self, segment: &str) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.push(segment.to_owned());
        path.extend(self.path.iter().cloned());
        Self {
            path,
            ..self.clone()
        }
    }

    /// Type name of the schema that produced the error.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Rule name (`type` for type-check failures).
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Keys and indices from the root to the failing value.
    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Custom label, if the schema had one.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Template attributes.
    #[must_use]
    pub const fn attrs(&self) -> &IndexMap<String, String> {
        &self.attrs
    }

    /// The name substituted for `${field}`: the label if set, else the
    /// dot-joined path.
    #[must_use]
    pub fn field(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.path.join("."))
    }

    /// Renders the error in every locale of `locales`.
    ///
    /// Templates are looked up at `[type][rule]`, then `["mixed"][rule]`.
    /// Unknown pairs render as the empty string and placeholders without a
    /// value substitute the empty string, so rendering never fails.
    #[must_use]
    pub fn locales(&self, locales: &Locales) -> IndexMap<String, String> {
        locales
            .codes()
            .map(|code| (code.to_owned(), self.render(locales, code)))
            .collect()
    }

    /// Renders the error in a single locale.
    #[must_use]
    pub fn render(&self, locales: &Locales, code: &str) -> String {
        let template = locales
            .template(code, &self.type_name, &self.rule)
            .or_else(|| locales.template(code, MIXED, &self.rule))
            .unwrap_or_default();
        let field = self.field();
        Locales::substitute(template, |key| {
            if key == "field" {
                Some(field.as_str())
            } else {
                self.attrs.get(key).map(String::as_str)
            }
        })
    }

    /// The explicit message override, else the English rendering against
    /// `locales`.
    #[must_use]
    pub fn message_in(&self, locales: &Locales) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| self.render(locales, Locales::DEFAULT_LOCALE))
    }

    /// The explicit message override, else the English rendering against
    /// the built-in locale table.
    #[must_use]
    pub fn message(&self) -> String {
        self.message_in(Locales::builtin())
    }
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidateError {}

/// One or more validation errors raised together by a strict cast.
///
/// Composite casts collect every member failure before returning, so a
/// single `ValidationErrors` can describe several paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} validation error(s)", .0.len())]
pub struct ValidationErrors(Vec<ValidateError>);

impl ValidationErrors {
    /// Wraps a list of errors.
    #[must_use]
    pub const fn new(errors: Vec<ValidateError>) -> Self {
        Self(errors)
    }

    /// Returns the errors in the order they were produced.
    #[must_use]
    pub fn as_slice(&self) -> &[ValidateError] {
        &self.0
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no errors are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the errors with `segment` prepended to every path.
    #[must_use]
    pub fn prefixed(self, segment: &str) -> Self {
        Self(self.0.iter().map(|error| error.prefixed(segment)).collect())
    }

    /// Consumes the aggregate and returns the errors.
    #[must_use]
    pub fn into_vec(self) -> Vec<ValidateError> {
        self.0
    }
}

impl From<ValidateError> for ValidationErrors {
    fn from(error: ValidateError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidateError;
    type IntoIter = std::vec::IntoIter<ValidateError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
