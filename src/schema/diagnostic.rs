//! Located diagnostics for descriptor loading failures.
//!
//! A diagnostic pins a parse failure or an unbuildable descriptor node to a
//! `source:line:column` position so tooling can point at the offending YAML.

use std::fmt;

use serde_saphyr::Location;

use super::descriptor::DescriptorFailure;

/// Stable diagnostic classification codes for descriptor loading failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDiagnosticCode {
    /// YAML deserialization or parse failure.
    ParseFailure,
    /// The descriptor names an unknown type or rule, or a rule argument is
    /// ill-typed.
    DescriptorFailure,
}

impl SchemaDiagnosticCode {
    /// Returns the stable, machine-readable code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParseFailure => "schema.parse_failure",
            Self::DescriptorFailure => "schema.descriptor_failure",
        }
    }
}

/// A 1-indexed position within a named descriptor source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file or source identifier.
    pub source: String,
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed column number.
    pub column: usize,
}

impl SourceLocation {
    /// Places a parser location in `source`. Positions that do not fit
    /// `usize` saturate.
    pub(crate) fn in_source(source: &str, location: Location) -> Self {
        Self {
            source: source.to_owned(),
            line: usize::try_from(location.line()).unwrap_or(usize::MAX),
            column: usize::try_from(location.column()).unwrap_or(usize::MAX),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

/// A located descriptor loading failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDiagnostic {
    /// Stable diagnostic code for programmatic handling.
    pub code: SchemaDiagnosticCode,
    /// Position of the offending YAML node.
    pub location: SourceLocation,
    /// Single-line human-readable message.
    pub message: String,
}

impl SchemaDiagnostic {
    /// A parser failure. Only the first line of the parser's message is
    /// kept; later lines repeat the source excerpt.
    pub(crate) fn parse_failure(source: &str, message: &str, location: Location) -> Self {
        Self {
            code: SchemaDiagnosticCode::ParseFailure,
            location: SourceLocation::in_source(source, location),
            message: message.lines().next().unwrap_or(message).to_owned(),
        }
    }

    /// A descriptor node that parsed but does not describe a schema.
    pub(crate) fn descriptor_failure(source: &str, failure: &DescriptorFailure) -> Self {
        Self {
            code: SchemaDiagnosticCode::DescriptorFailure,
            location: SourceLocation::in_source(source, failure.location),
            message: failure.reason.clone(),
        }
    }

    /// Renders the diagnostic as `<code> | <source>:<line>:<column> | <message>`.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{} | {} | {}", self.code.as_str(), self.location, self.message)
    }
}
