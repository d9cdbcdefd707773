//! Raw descriptor documents with source-location capture.
//!
//! These types mirror the YAML descriptor format and use
//! `serde_saphyr::Spanned` on the fields a descriptor failure can point at,
//! so unknown types, unknown rules and ill-typed arguments map back to line
//! and column coordinates.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_saphyr::{Location, Spanned};

use super::value::Value;

/// One named schema document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawSchemaDoc {
    pub(crate) name: Spanned<String>,
    pub(crate) schema: RawDescriptor,
}

/// A schema node: its type, common settings, rules and children.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawDescriptor {
    #[serde(rename = "type")]
    pub(crate) type_name: Spanned<String>,
    #[serde(default)]
    pub(crate) label: Option<String>,
    #[serde(default)]
    pub(crate) strict: bool,
    #[serde(default)]
    pub(crate) default: Option<Value>,
    #[serde(default)]
    pub(crate) rules: Vec<RawRule>,
    #[serde(default)]
    pub(crate) of: Option<Box<RawDescriptor>>,
    #[serde(default)]
    pub(crate) shape: Option<IndexMap<String, RawDescriptor>>,
}

/// A rule attachment: `{ rule, arg?, message? }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawRule {
    pub(crate) rule: Spanned<String>,
    #[serde(default)]
    pub(crate) arg: Option<Spanned<Value>>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}

impl RawDescriptor {
    /// Location of the `type` value, used when a failure has no closer node.
    #[must_use]
    pub(crate) const fn location(&self) -> Location {
        self.type_name.referenced
    }
}

impl RawRule {
    /// Location of the argument if present, else of the rule name.
    #[must_use]
    pub(crate) fn arg_location(&self) -> Location {
        self.arg
            .as_ref()
            .map_or(self.rule.referenced, |arg| arg.referenced)
    }
}
