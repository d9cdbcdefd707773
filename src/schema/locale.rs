//! Locale message tables.
//!
//! A locale table maps a type name to a rule name to a template string.
//! Templates use `${name}` placeholders. The `mixed` bucket holds templates
//! shared by every type and is consulted when no type-specific entry exists.
//!
//! Tables are read-only once built. The English table ships with the crate
//! and is installed process-wide on first use; additional tables are loaded
//! from YAML and passed to [`super::ValidateError::locales`] explicitly.

use std::sync::{LazyLock, OnceLock};

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use indexmap::IndexMap;
use regex::{Captures, Regex};

use super::error::SchemaError;
use super::pattern::compile;

/// Name of the shared fallback bucket.
pub const MIXED: &str = "mixed";

/// Templates for one locale, keyed by type name then rule name.
pub type LocaleTable = IndexMap<String, IndexMap<String, String>>;

/// Built-in English templates.
const EN: &[(&str, &[(&str, &str)])] = &[
    (
        MIXED,
        &[
            ("required", "${field} is a required field"),
            ("type", "${field} must be a `${type}` type"),
            ("where", "${field} is invalid"),
        ],
    ),
    (
        "string",
        &[
            ("notEmpty", "${field} must not be empty"),
            ("min", "${field} must be at least ${min} characters"),
            ("max", "${field} must be at most ${max} characters"),
            ("length", "${field} must be exactly ${length} characters"),
            ("matches", "${field} must match the following: \"${regex}\""),
            ("email", "${field} must be a valid email"),
            ("url", "${field} must be a valid URL"),
            ("uuid", "${field} must be a valid UUID"),
            ("trim", "${field} must be a trimmed string"),
            ("lowercase", "${field} must be a lowercase string"),
            ("uppercase", "${field} must be a upper case string"),
            ("oneOf", "${field} must be one of the following values: ${values}"),
            ("notOneOf", "${field} must not be one of the following values: ${values}"),
        ],
    ),
    (
        "number",
        &[
            ("min", "${field} must be greater than or equal to ${min}"),
            ("max", "${field} must be less than or equal to ${max}"),
            ("lessThan", "${field} must be less than ${less}"),
            ("moreThan", "${field} must be greater than ${more}"),
            ("positive", "${field} must be a positive number"),
            ("negative", "${field} must be a negative number"),
            ("integer", "${field} must be an integer"),
            ("oneOf", "${field} must be one of the following values: ${values}"),
            ("notOneOf", "${field} must not be one of the following values: ${values}"),
        ],
    ),
    (
        "date",
        &[
            ("min", "${field} field must be later than ${min}"),
            ("max", "${field} field must be at earlier than ${max}"),
            ("lessThan", "${field} field must be earlier than ${less}"),
            ("moreThan", "${field} field must be later than ${more}"),
            ("oneOf", "${field} must be one of the following values: ${values}"),
            ("notOneOf", "${field} must not be one of the following values: ${values}"),
        ],
    ),
    (
        "array",
        &[
            ("notEmpty", "${field} must not be empty"),
            ("min", "${field} field must have at least ${min} items"),
            ("max", "${field} field must have less than or equal to ${max} items"),
            ("length", "${field} must have ${length} items"),
        ],
    ),
];

static BUILTIN: OnceLock<Locales> = OnceLock::new();

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| compile(r"\$\{\s*(\w+)\s*\}"));

/// A set of locale tables keyed by locale code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locales {
    tables: IndexMap<String, LocaleTable>,
}

impl Locales {
    /// Locale used by [`super::ValidateError::message`].
    pub const DEFAULT_LOCALE: &'static str = "en";

    /// Creates an empty set of tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set containing only the built-in English table.
    #[must_use]
    pub fn with_builtin() -> Self {
        let table = EN
            .iter()
            .map(|(type_name, templates)| {
                let rules = templates
                    .iter()
                    .map(|(rule, template)| ((*rule).to_owned(), (*template).to_owned()))
                    .collect();
                ((*type_name).to_owned(), rules)
            })
            .collect();
        let mut locales = Self::new();
        locales.insert(Self::DEFAULT_LOCALE, table);
        locales
    }

    /// The process-wide built-in tables, built on first access.
    #[must_use]
    pub fn builtin() -> &'static Self {
        BUILTIN.get_or_init(Self::with_builtin)
    }

    /// Adds or replaces the table for `code`.
    pub fn insert(&mut self, code: impl Into<String>, table: LocaleTable) {
        self.tables.insert(code.into(), table);
    }

    /// Parses a YAML table and adds it under `code`.
    ///
    /// Entries are merged over an existing table for the same code, so a
    /// partial file can override individual templates.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Locale`] if the YAML is not a
    /// `type -> rule -> template` mapping.
    pub fn insert_yaml(&mut self, code: &str, yaml: &str) -> Result<(), SchemaError> {
        let parsed: LocaleTable =
            serde_saphyr::from_str(yaml).map_err(|error| SchemaError::Locale {
                locale: code.to_owned(),
                reason: error.to_string(),
            })?;
        let table = self.tables.entry(code.to_owned()).or_default();
        for (type_name, rules) in parsed {
            table.entry(type_name).or_default().extend(rules);
        }
        tracing::debug!(locale = code, "locale table loaded");
        Ok(())
    }

    /// Loads every `*.yaml` / `*.yml` file in `dir`, using the file stem as
    /// the locale code.
    ///
    /// Files are read in name order so repeated loads are deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Locale`] if the directory cannot be read or a
    /// file fails to parse.
    pub fn load_dir(&mut self, dir: &Utf8Path) -> Result<(), SchemaError> {
        let io_error = |error: std::io::Error| SchemaError::Locale {
            locale: dir.to_string(),
            reason: error.to_string(),
        };
        let handle = Dir::open_ambient_dir(dir, ambient_authority()).map_err(io_error)?;

        let mut files = Vec::new();
        for listed in handle.entries().map_err(io_error)? {
            let entry = listed.map_err(io_error)?;
            if !entry.file_type().map_err(io_error)?.is_file() {
                continue;
            }
            let name = entry.file_name().map_err(io_error)?;
            let path = Utf8Path::new(&name);
            if matches!(path.extension(), Some("yaml" | "yml")) {
                if let Some(stem) = path.file_stem() {
                    files.push((stem.to_owned(), name.clone()));
                }
            }
        }
        files.sort();

        for (code, name) in files {
            let yaml = handle
                .read_to_string(&name)
                .map_err(|error| SchemaError::Locale {
                    locale: code.clone(),
                    reason: error.to_string(),
                })?;
            self.insert_yaml(&code, &yaml)?;
        }
        Ok(())
    }

    /// Locale codes in insertion order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Returns the table for `code`.
    #[must_use]
    pub fn table(&self, code: &str) -> Option<&LocaleTable> {
        self.tables.get(code)
    }

    /// Looks up the template at `[code][type_name][rule]`.
    #[must_use]
    pub fn template(&self, code: &str, type_name: &str, rule: &str) -> Option<&str> {
        self.tables
            .get(code)?
            .get(type_name)?
            .get(rule)
            .map(String::as_str)
    }

    /// Replaces every `${name}` placeholder in `template` with the value
    /// returned by `lookup`, or the empty string when it returns `None`.
    #[must_use]
    pub fn substitute<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
        PLACEHOLDER
            .replace_all(template, |captures: &Captures<'_>| {
                captures
                    .get(1)
                    .and_then(|name| lookup(name.as_str()))
                    .unwrap_or_default()
                    .to_owned()
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn builtin_has_english_mixed_bucket() {
        let locales = Locales::builtin();
        assert_eq!(
            locales.template("en", MIXED, "required"),
            Some("${field} is a required field")
        );
        assert_eq!(locales.codes().collect::<Vec<_>>(), vec!["en"]);
    }

    #[rstest]
    #[case::spaced("${ field }!", "name!")]
    #[case::repeated("${field}/${field}", "name/name")]
    #[case::unknown("${nope}.", ".")]
    #[case::literal("no placeholders", "no placeholders")]
    fn substitutes_placeholders(#[case] template: &str, #[case] expected: &str) {
        let rendered = Locales::substitute(template, |key| (key == "field").then_some("name"));
        assert_eq!(rendered, expected);
    }

    #[rstest]
    fn partial_yaml_merges_over_existing_table() {
        let mut locales = Locales::with_builtin();
        locales
            .insert_yaml("en", "number:\n  min: 'at least ${min}'")
            .expect("should parse");
        assert_eq!(locales.template("en", "number", "min"), Some("at least ${min}"));
        assert_eq!(
            locales.template("en", "number", "max"),
            Some("${field} must be less than or equal to ${max}")
        );
    }

    #[rstest]
    fn malformed_yaml_is_a_locale_error() {
        let mut locales = Locales::new();
        let result = locales.insert_yaml("de", "- just\n- a list");
        assert!(matches!(result, Err(SchemaError::Locale { ref locale, .. }) if locale == "de"));
    }
}
