//! The `mixed` type: accepts any value and carries only the common rules.

use super::builder::{Internals, Schema};

/// Rule-set marker for [`mixed`] schemas and erased schemas.
#[derive(Debug)]
pub enum Mixed {}

/// Creates a schema that accepts any value unchanged.
#[must_use]
pub fn mixed() -> Schema<Mixed> {
    Schema::from_internals(Internals::leaf("mixed", |value| Some(value.clone()), |_| true))
}
