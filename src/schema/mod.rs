//! Schema construction, casting, validation and error rendering.
//!
//! Schemas are built by calling a type constructor ([`string`], [`number`],
//! [`object`], ...) and chaining builder methods. Every builder method
//! returns a new schema; the receiver is unchanged and can be reused.
//! Schemas can also be loaded from YAML descriptor documents with
//! [`load_schema_docs`].

mod array;
mod boolean;
mod builder;
mod date;
mod descriptor;
mod diagnostic;
mod error;
mod loader;
mod locale;
mod memo;
mod mixed;
mod number;
mod object;
mod pattern;
mod raw;
mod record;
mod rule;
mod string;
mod validation_error;
mod value;

pub use array::{Array, array};
pub use boolean::{Boolean, boolean};
pub use builder::{AnySchema, Schema};
pub use date::{Date, date};
pub use diagnostic::{SchemaDiagnostic, SchemaDiagnosticCode, SourceLocation};
pub use error::SchemaError;
pub use loader::{SchemaDoc, load_schema_docs, load_schema_docs_with_source, load_schema_file};
pub use locale::{LocaleTable, Locales, MIXED};
pub use mixed::{Mixed, mixed};
pub use number::{Number, number};
pub use object::{Object, Shape, object};
pub use record::{Record, record};
pub use rule::{ErrorFactory, RuleArg, WhereContext, common};
pub use string::{Text, string};
pub use validation_error::{ValidateError, ValidationErrors};
pub use value::Value;
