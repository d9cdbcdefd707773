//! Multi-document schema descriptor loading.
//!
//! Provides [`load_schema_docs`] which deserializes one or more YAML
//! descriptor documents from a single string and builds a schema from each,
//! and [`load_schema_file`] which reads a descriptor file first.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use super::builder::AnySchema;
use super::descriptor::{DescriptorFailure, build};
use super::diagnostic::SchemaDiagnostic;
use super::error::SchemaError;
use super::raw::RawSchemaDoc;

/// Synthetic source identifier used by [`load_schema_docs`].
const INLINE_SOURCE: &str = "<inline>";

/// A named schema built from a descriptor document.
#[derive(Debug, Clone)]
pub struct SchemaDoc {
    /// The document's `name`.
    pub name: String,
    /// The schema its `schema` node describes.
    pub schema: AnySchema,
}

/// Loads one or more schema descriptors from a YAML string.
///
/// Documents are separated by `---`. Each has a `name` and a `schema` node;
/// a node names its `type` and may carry `label`, `strict`, `default`,
/// `rules` (a list of `{ rule, arg?, message? }`), `of` (array and record
/// element) and `shape` (object members). Unknown keys are rejected.
///
/// # Errors
///
/// Returns [`SchemaError::Deserialize`] if the YAML is malformed or does not
/// match the descriptor format, and [`SchemaError::InvalidDescriptor`] if a
/// node names an unknown type or rule or carries an ill-typed argument.
///
/// # Examples
///
///     use castkit::schema::{Value, load_schema_docs};
///
///     let yaml = r#"
///     name: signup
///     schema:
///       type: object
///       shape:
///         email:
///           type: string
///           rules: [{ rule: required }, { rule: email }]
///     "#;
///     let docs = load_schema_docs(yaml).unwrap();
///     let errors = docs[0].schema.validate(&Value::from_yaml("email: nope").unwrap());
///     assert_eq!(errors[0].rule(), "email");
pub fn load_schema_docs(input: &str) -> Result<Vec<SchemaDoc>, SchemaError> {
    load_schema_docs_with_source(INLINE_SOURCE, input)
}

/// Loads schema descriptors from YAML and records diagnostics against an
/// explicit source identifier.
///
/// # Errors
///
/// Returns [`SchemaError::Deserialize`] when YAML parsing or deserialization
/// fails and [`SchemaError::InvalidDescriptor`] when a node cannot be built.
pub fn load_schema_docs_with_source(
    source: &str,
    input: &str,
) -> Result<Vec<SchemaDoc>, SchemaError> {
    let raw_docs: Vec<RawSchemaDoc> = serde_saphyr::from_multiple(input).map_err(|error| {
        let message = error.to_string();
        let diagnostic = error
            .location()
            .map(|location| SchemaDiagnostic::parse_failure(source, &message, location));
        SchemaError::Deserialize {
            message,
            diagnostic,
        }
    })?;

    let mut docs = Vec::with_capacity(raw_docs.len());
    for raw_doc in raw_docs {
        let schema = build(&raw_doc.schema)
            .map_err(|failure| descriptor_error(source, &raw_doc.name.value, failure))?;
        docs.push(SchemaDoc {
            name: raw_doc.name.value,
            schema,
        });
    }

    tracing::debug!(source, documents = docs.len(), "loaded schema descriptors");
    Ok(docs)
}

/// Reads `path` and loads the descriptors it contains, using the path as
/// the diagnostic source.
///
/// # Errors
///
/// Returns [`SchemaError::Io`] if the file cannot be read, otherwise as
/// [`load_schema_docs_with_source`].
pub fn load_schema_file(path: &Utf8Path) -> Result<Vec<SchemaDoc>, SchemaError> {
    let io_error = |error: std::io::Error| SchemaError::Io {
        path: path.to_string(),
        reason: error.to_string(),
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| SchemaError::Io {
        path: path.to_string(),
        reason: "path has no file name".to_owned(),
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
    let input = dir.read_to_string(file_name).map_err(io_error)?;
    load_schema_docs_with_source(path.as_str(), &input)
}

fn descriptor_error(source: &str, schema: &str, failure: DescriptorFailure) -> SchemaError {
    let diagnostic = SchemaDiagnostic::descriptor_failure(source, &failure);
    SchemaError::InvalidDescriptor {
        schema: schema.to_owned(),
        reason: failure.reason,
        diagnostic: Some(diagnostic),
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
