//! The rule contract shared by every type module.
//!
//! A rule is a pure predicate over a cast value. It receives an
//! [`ErrorFactory`] bound to the schema's type, rule name and label, plus the
//! arguments captured when the rule was attached, and returns at most one
//! error.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::validation_error::ValidateError;
use super::value::Value;

/// Builds errors carrying a node's type, rule, and label context.
#[derive(Debug, Clone, Copy)]
pub struct ErrorFactory<'a> {
    type_name: &'a str,
    rule: &'a str,
    label: Option<&'a str>,
}

impl<'a> ErrorFactory<'a> {
    pub(crate) const fn new(type_name: &'a str, rule: &'a str, label: Option<&'a str>) -> Self {
        Self {
            type_name,
            rule,
            label,
        }
    }

    /// Creates an error with the given template attributes and optional
    /// message override.
    #[must_use]
    pub fn error<I, K, V>(&self, attrs: I, message: Option<&str>) -> ValidateError
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        ValidateError::new(self.type_name, self.rule)
            .with_label(self.label)
            .with_attrs(attrs)
            .with_message(message)
    }

    /// Creates an error with no attributes.
    #[must_use]
    pub fn bare(&self, message: Option<&str>) -> ValidateError {
        self.error(std::iter::empty::<(String, String)>(), message)
    }

    /// Returns `None` when `ok`, else an error with `attrs`.
    #[must_use]
    pub fn check<I, K, V>(&self, ok: bool, attrs: I, message: Option<&str>) -> Option<ValidateError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        (!ok).then(|| self.error(attrs, message))
    }
}

/// Values a `where_` predicate can inspect.
#[derive(Debug, Clone, Copy)]
pub struct WhereContext<'a> {
    /// The cast value at this node.
    pub value: &'a Value,
    /// The cast value at the root of the validation.
    pub root: &'a Value,
    /// The value at this node before casting.
    pub original: &'a Value,
}

/// Predicate over a cast value.
pub(crate) type CheckFn = dyn Fn(&Value, &ErrorFactory<'_>) -> Option<ValidateError> + Send + Sync;

/// Cross-referencing predicate attached with `where_`.
pub(crate) type WhereFn = dyn Fn(WhereContext<'_>) -> bool + Send + Sync;

/// What a rule inspects.
#[derive(Clone)]
pub(crate) enum RuleCheck {
    /// The cast value only.
    Value(Arc<CheckFn>),
    /// The `{ value, root, original }` triple.
    Where {
        predicate: Arc<WhereFn>,
        message: String,
    },
}

/// A named rule attached to a schema.
#[derive(Clone)]
pub(crate) struct Rule {
    pub(crate) name: &'static str,
    pub(crate) check: RuleCheck,
}

impl Rule {
    /// Runs the rule against `context`, producing at most one error.
    pub(crate) fn run(
        &self,
        context: WhereContext<'_>,
        type_name: &str,
        label: Option<&str>,
    ) -> Option<ValidateError> {
        let factory = ErrorFactory::new(type_name, self.name, label);
        match &self.check {
            RuleCheck::Value(check) => check(context.value, &factory),
            RuleCheck::Where { predicate, message } => {
                (!predicate(context)).then(|| factory.bare(Some(message.as_str())))
            }
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish_non_exhaustive()
    }
}

/// An argument captured by a rule method and lent to the rule function on
/// every run.
pub trait RuleArg: Clone + Send + Sync + 'static {
    /// The borrowed form handed to the rule function.
    type Ref<'a>
    where
        Self: 'a;

    /// Borrows the captured argument.
    fn as_arg(&self) -> Self::Ref<'_>;
}

impl RuleArg for f64 {
    type Ref<'a> = Self;

    fn as_arg(&self) -> Self {
        *self
    }
}

impl RuleArg for usize {
    type Ref<'a> = Self;

    fn as_arg(&self) -> Self {
        *self
    }
}

impl RuleArg for DateTime<Utc> {
    type Ref<'a> = Self;

    fn as_arg(&self) -> Self {
        *self
    }
}

impl RuleArg for Regex {
    type Ref<'a> = &'a Self;

    fn as_arg(&self) -> &Self {
        self
    }
}

impl<T: Clone + Send + Sync + 'static> RuleArg for Vec<T> {
    type Ref<'a> = &'a [T];

    fn as_arg(&self) -> &[T] {
        self
    }
}

/// Rules every type shares.
pub mod common {
    use super::{ErrorFactory, ValidateError, Value};

    /// Fails when the value is null or absent.
    #[must_use]
    pub fn required(
        value: &Value,
        error: &ErrorFactory<'_>,
        message: Option<&str>,
    ) -> Option<ValidateError> {
        value.is_null().then(|| error.bare(message))
    }
}

/// Generates one builder method per rule for a schema kind, plus a `*_with`
/// twin that takes a custom failure message.
///
/// Each entry names the rule key used in error records and locale tables,
/// the two method names, the rule function, and its captured arguments.
macro_rules! rule_methods {
    (
        $kind:ty {
            $(
                $(#[$meta:meta])*
                $key:literal => $name:ident / $with:ident = $rule:path $(, $arg:ident : $ty:ty)*;
            )*
        }
    ) => {
        impl $crate::schema::Schema<$kind> {
            $(
                $(#[$meta])*
                #[must_use]
                pub fn $name(&self $(, $arg: $ty)*) -> Self {
                    self.attach(
                        $key,
                        move |value: &$crate::schema::Value, error: &$crate::schema::ErrorFactory<'_>| {
                            $rule(value, error $(, $crate::schema::RuleArg::as_arg(&$arg))*, None)
                        },
                    )
                }

                #[doc = concat!("Like [`Self::", stringify!($name), "`] with a custom failure message.")]
                #[must_use]
                pub fn $with(&self $(, $arg: $ty)*, message: impl Into<String>) -> Self {
                    let text: String = message.into();
                    self.attach(
                        $key,
                        move |value: &$crate::schema::Value, error: &$crate::schema::ErrorFactory<'_>| {
                            $rule(value, error $(, $crate::schema::RuleArg::as_arg(&$arg))*, Some(text.as_str()))
                        },
                    )
                }
            )*
        }
    };
}

pub(crate) use rule_methods;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_null_only() {
        let factory = ErrorFactory::new("string", "required", None);
        assert!(common::required(&Value::Null, &factory, None).is_some());
        assert!(common::required(&Value::from(""), &factory, None).is_none());
        assert!(common::required(&Value::from(false), &factory, None).is_none());
    }

    #[test]
    fn factory_carries_node_context() {
        let factory = ErrorFactory::new("number", "min", Some("Age"));
        let error = factory.error([("min", "18")], Some("grow up"));
        assert_eq!(error.type_name(), "number");
        assert_eq!(error.rule(), "min");
        assert_eq!(error.label(), Some("Age"));
        assert_eq!(error.attrs().get("min").map(String::as_str), Some("18"));
        assert_eq!(error.message(), "grow up");
    }

    #[test]
    fn where_rule_reports_literal_message() {
        let rule = Rule {
            name: "where",
            check: RuleCheck::Where {
                predicate: Arc::new(|context: WhereContext<'_>| context.root.get("ok").is_some()),
                message: "root must carry ok".to_owned(),
            },
        };
        let root = Value::from_iter([("other", 1)]);
        let context = WhereContext {
            value: &Value::Null,
            root: &root,
            original: &Value::Null,
        };
        let error = rule.run(context, "mixed", None).expect("predicate should fail");
        assert_eq!(error.rule(), "where");
        assert_eq!(error.message(), "root must carry ok");
    }
}
