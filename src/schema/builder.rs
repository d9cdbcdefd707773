//! The immutable schema instance and its cast/validate engine.
//!
//! A [`Schema`] wraps shared, immutable internals. Every builder method
//! copies the internals, overrides one field, and returns a new instance;
//! the receiver is never touched, so schemas can be reused and shared
//! freely, including across threads.
//!
//! Validation runs in a fixed order at every node: strict cast, attached
//! rules in attachment order, the type check, then the structural recursion
//! of composite shapes. Errors from children come back with the child's
//! index or key prepended to their path.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use indexmap::IndexMap;

use super::memo::{self, Memo};
use super::mixed::Mixed;
use super::rule::{ErrorFactory, Rule, RuleCheck, WhereContext, common};
use super::validation_error::{ValidateError, ValidationErrors};
use super::value::Value;
use super::{array, object, record};

/// Coerces a raw value for a leaf type. `None` means coercion is impossible.
pub(crate) type CoerceFn = fn(&Value) -> Option<Value>;

/// Post-cast shape predicate.
pub(crate) type TypeCheckFn = fn(&Value) -> bool;

/// Caller-supplied replacement for the cast function.
pub(crate) type TransformFn = dyn Fn(&Value) -> Value + Send + Sync;

/// How a node casts raw input.
#[derive(Clone)]
pub(crate) enum Caster {
    /// The type's own coercion (leaf) or member-wise cast (composite).
    Native,
    /// Identity when the type check passes, else null.
    Strict,
    /// A caller-supplied transform.
    Custom(Arc<TransformFn>),
}

/// The closed set of node structures.
#[derive(Clone)]
pub(crate) enum Structure {
    Leaf(CoerceFn),
    Array(Option<Arc<Node>>),
    Object(IndexMap<String, Arc<Node>>),
    Record(Option<Arc<Node>>),
}

/// A schema's configuration. Copied and overridden by builder methods.
#[derive(Clone)]
pub(crate) struct Internals {
    pub(crate) type_name: &'static str,
    pub(crate) default: Option<Value>,
    pub(crate) label: Option<String>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) cast: Caster,
    pub(crate) type_check: TypeCheckFn,
    pub(crate) structure: Structure,
    pub(crate) memo_capacity: usize,
}

impl Internals {
    /// Internals for a leaf type with no rules.
    pub(crate) const fn leaf(
        type_name: &'static str,
        coerce: CoerceFn,
        type_check: TypeCheckFn,
    ) -> Self {
        Self {
            type_name,
            default: None,
            label: None,
            rules: Vec::new(),
            cast: Caster::Native,
            type_check,
            structure: Structure::Leaf(coerce),
            memo_capacity: memo::DEFAULT_CAPACITY,
        }
    }

    /// Internals for a composite type with a default container value.
    pub(crate) const fn composite(
        type_name: &'static str,
        default: Value,
        type_check: TypeCheckFn,
        structure: Structure,
    ) -> Self {
        Self {
            type_name,
            default: Some(default),
            label: None,
            rules: Vec::new(),
            cast: Caster::Native,
            type_check,
            structure,
            memo_capacity: memo::DEFAULT_CAPACITY,
        }
    }
}

/// A child's view of the validation in progress: its own raw value plus the
/// root cast value, so cross-field rules can look across the whole input.
#[derive(Debug, Clone, Copy)]
pub(crate) struct InjectedValue<'a> {
    pub(crate) value: &'a Value,
    pub(crate) root: &'a Value,
}

/// Shared, immutable schema state.
pub(crate) struct Node {
    internals: Internals,
    memo: Memo,
}

impl Node {
    fn new(internals: Internals) -> Self {
        Self {
            memo: Memo::with_capacity(internals.memo_capacity),
            internals,
        }
    }

    pub(crate) const fn type_name(&self) -> &'static str {
        self.internals.type_name
    }

    /// Casts `value`. In strict mode impossible coercions raise `type`
    /// errors; otherwise they yield null.
    pub(crate) fn cast(&self, value: &Value, strict: bool) -> Result<Value, ValidationErrors> {
        let internals = &self.internals;
        match &internals.cast {
            Caster::Strict => Ok(if (internals.type_check)(value) {
                value.clone()
            } else {
                Value::Null
            }),
            Caster::Custom(transform) => Ok(transform(value)),
            Caster::Native => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                let coerced = match &internals.structure {
                    Structure::Leaf(coerce) => coerce(value),
                    Structure::Array(element) => array::cast(element.as_deref(), value, strict)?,
                    Structure::Object(shape) => object::cast(shape, value, strict)?,
                    Structure::Record(element) => record::cast(element.as_deref(), value, strict)?,
                };
                match coerced {
                    Some(cast) => Ok(cast),
                    None if strict => Err(self.type_error().into()),
                    None => Ok(Value::Null),
                }
            }
        }
    }

    fn type_error(&self) -> ValidateError {
        ValidateError::type_mismatch(self.internals.type_name)
            .with_label(self.internals.label.as_deref())
    }

    /// Top-level validation, memoized per input.
    fn validate(&self, value: &Value) -> Vec<ValidateError> {
        self.memo.get_or_compute(value, || self.validate_at(value, None))
    }

    /// Validation of a child reached through a composite.
    pub(crate) fn validate_injected(&self, injected: InjectedValue<'_>) -> Vec<ValidateError> {
        self.validate_at(injected.value, Some(injected.root))
    }

    fn validate_at(&self, original: &Value, root: Option<&Value>) -> Vec<ValidateError> {
        let internals = &self.internals;
        let value = match self.cast(original, true) {
            Ok(value) => value,
            Err(errors) => return errors.into_vec(),
        };
        let context = WhereContext {
            value: &value,
            root: root.unwrap_or(&value),
            original,
        };
        let label = internals.label.as_deref();

        let mut errors: Vec<ValidateError> = internals
            .rules
            .iter()
            .filter_map(|rule| rule.run(context, internals.type_name, label))
            .collect();

        if value.is_null() {
            return errors;
        }
        if !(internals.type_check)(&value) {
            errors.push(self.type_error());
        }
        errors.extend(self.validate_structure(&value, context.root));
        errors
    }

    fn validate_structure(&self, value: &Value, root: &Value) -> Vec<ValidateError> {
        match &self.internals.structure {
            Structure::Leaf(_) => Vec::new(),
            Structure::Array(element) => element
                .as_deref()
                .map(|element| array::validate_items(element, value, root))
                .unwrap_or_default(),
            Structure::Object(shape) => object::validate_shape(shape, value, root),
            Structure::Record(element) => element
                .as_deref()
                .map(|element| record::validate_entries(element, value, root))
                .unwrap_or_default(),
        }
    }
}

/// An immutable schema.
///
/// The `K` parameter selects which rule methods are available (for example
/// [`super::Number`] adds `min`, `max`, `integer`, ...). It has no runtime
/// representation; [`Schema::erase`] drops it.
///
/// # Examples
///
///     use castkit::schema::{Value, number, object, Shape};
///
///     let schema = object(Shape::new().field("age", number().required().min(18.0)));
///     let errors = schema.validate(&Value::from_yaml("age: 12").unwrap());
///     assert_eq!(errors.len(), 1);
///     assert_eq!(errors[0].path(), ["age"]);
///     assert_eq!(errors[0].rule(), "min");
pub struct Schema<K = Mixed> {
    node: Arc<Node>,
    kind: PhantomData<fn() -> K>,
}

/// A schema whose rule set has been erased to the common rules.
pub type AnySchema = Schema<Mixed>;

impl<K> Clone for Schema<K> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            kind: PhantomData,
        }
    }
}

impl<K> fmt::Debug for Schema<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let internals = &self.node.internals;
        f.debug_struct("Schema")
            .field("type", &internals.type_name)
            .field("label", &internals.label)
            .field("rules", &internals.rules)
            .finish_non_exhaustive()
    }
}

impl<K> Schema<K> {
    pub(crate) fn from_internals(internals: Internals) -> Self {
        Self {
            node: Arc::new(Node::new(internals)),
            kind: PhantomData,
        }
    }

    pub(crate) fn into_node(self) -> Arc<Node> {
        self.node
    }

    /// Copies the internals, applies `update`, and wraps the result in a new
    /// instance with an empty cache.
    fn derive(&self, update: impl FnOnce(&mut Internals)) -> Self {
        let mut internals = self.node.internals.clone();
        update(&mut internals);
        Self::from_internals(internals)
    }

    /// Replaces the child schemas of a composite.
    pub(crate) fn with_structure(&self, structure: Structure) -> Self {
        self.derive(|internals| internals.structure = structure)
    }

    /// Appends a rule.
    pub(crate) fn attach<F>(&self, name: &'static str, check: F) -> Self
    where
        F: Fn(&Value, &ErrorFactory<'_>) -> Option<ValidateError> + Send + Sync + 'static,
    {
        self.derive(|internals| {
            internals.rules.push(Rule {
                name,
                check: RuleCheck::Value(Arc::new(check)),
            });
        })
    }

    /// The type name reported in errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.node.type_name()
    }

    /// Names of the attached rules, in attachment order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.node.internals.rules.iter().map(|rule| rule.name).collect()
    }

    /// Casts `value` leniently. Impossible coercions yield [`Value::Null`]
    /// and rules are not run.
    #[must_use]
    pub fn cast(&self, value: &Value) -> Value {
        self.node.cast(value, false).unwrap_or_default()
    }

    /// Casts `value` strictly: values the type cannot represent raise `type`
    /// errors, and composites report every failing member.
    ///
    /// # Errors
    ///
    /// Returns every cast failure, with paths relative to this schema.
    #[tracing::instrument(level = "trace", skip_all, fields(type_name = self.type_name()))]
    pub fn try_cast(&self, value: &Value) -> Result<Value, ValidationErrors> {
        let cast = self.node.cast(value, true);
        if let Err(errors) = &cast {
            tracing::debug!(errors = errors.len(), "strict cast failed");
        }
        cast
    }

    /// Validates `value` and returns every error found. An empty list means
    /// the value is valid.
    ///
    /// Results are memoized per schema instance, keyed by deep equality of
    /// the input. See [`Schema::memo_capacity`] for the cache bound.
    #[must_use]
    #[tracing::instrument(level = "trace", skip_all, fields(type_name = self.type_name()))]
    pub fn validate(&self, value: &Value) -> Vec<ValidateError> {
        let errors = self.node.validate(value);
        tracing::debug!(errors = errors.len(), "validated");
        errors
    }

    /// Returns `true` when [`Schema::validate`] finds no errors.
    #[must_use]
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_empty()
    }

    /// Sets how many distinct inputs [`Schema::validate`] remembers. The
    /// oldest input is forgotten first once the cache is full; `0` disables
    /// caching. Defaults to 256.
    #[must_use]
    pub fn memo_capacity(&self, capacity: usize) -> Self {
        self.derive(|internals| internals.memo_capacity = capacity)
    }

    /// Disables coercion: values that fail the type check cast to null.
    #[must_use]
    pub fn strict(&self) -> Self {
        self.derive(|internals| internals.cast = Caster::Strict)
    }

    /// Sets the name used for `${field}` in messages instead of the path.
    #[must_use]
    pub fn label(&self, name: impl Into<String>) -> Self {
        let label = name.into();
        self.derive(|internals| internals.label = Some(label))
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(&self, value: impl Into<Value>) -> Self {
        let default = value.into();
        self.derive(|internals| internals.default = Some(default))
    }

    /// The default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.node.internals.default.as_ref()
    }

    /// Replaces the cast function.
    #[must_use]
    pub fn transform<F>(&self, transform: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        let shared: Arc<TransformFn> = Arc::new(transform);
        self.derive(|internals| internals.cast = Caster::Custom(shared))
    }

    /// Attaches a cross-referencing rule. `predicate` sees the cast value,
    /// the root cast value, and the raw value at this node; when it returns
    /// `false` the rule fails with `message`.
    #[doc(alias = "where")]
    #[must_use]
    pub fn where_<F>(&self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(WhereContext<'_>) -> bool + Send + Sync + 'static,
    {
        let rule = Rule {
            name: "where",
            check: RuleCheck::Where {
                predicate: Arc::new(predicate),
                message: message.into(),
            },
        };
        self.derive(|internals| internals.rules.push(rule))
    }

    /// Fails when the value is null or absent.
    #[must_use]
    pub fn required(&self) -> Self {
        self.attach("required", |value, error| common::required(value, error, None))
    }

    /// Like [`Self::required`] with a custom failure message.
    #[must_use]
    pub fn required_with(&self, message: impl Into<String>) -> Self {
        let text: String = message.into();
        self.attach("required", move |value, error| {
            common::required(value, error, Some(&text))
        })
    }

    /// Drops the rule-set marker, keeping only the common builder methods.
    #[must_use]
    pub fn erase(self) -> AnySchema {
        Schema {
            node: self.node,
            kind: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::schema::{mixed, number, string};

    #[rstest]
    fn builders_leave_parent_untouched() {
        let base = number();
        let bounded = base.min(10.0);
        let labelled = bounded.label("Count");
        assert!(base.validate(&Value::from(3)).is_empty());
        assert_eq!(bounded.rule_names(), vec!["min"]);
        assert_eq!(labelled.rule_names(), vec!["min"]);
        let errors = labelled.validate(&Value::from(3));
        assert_eq!(errors.first().and_then(ValidateError::label), Some("Count"));
        let errors = bounded.validate(&Value::from(3));
        assert_eq!(errors.first().and_then(ValidateError::label), None);
    }

    #[rstest]
    fn rules_run_in_attachment_order_without_short_circuit() {
        let schema = number().min(10.0).max(5.0);
        let rules: Vec<String> = schema
            .validate(&Value::from(3))
            .iter()
            .map(|error| error.rule().to_owned())
            .collect();
        assert_eq!(rules, vec!["min"]);
        let schema = number().max(5.0).min(10.0).integer();
        let rules: Vec<String> = schema
            .validate(&Value::from(7.5))
            .iter()
            .map(|error| error.rule().to_owned())
            .collect();
        assert_eq!(rules, vec!["max", "min", "integer"]);
    }

    #[rstest]
    fn strict_disables_coercion() {
        let lenient = number();
        let strict = lenient.strict();
        assert_eq!(lenient.cast(&Value::from("42")), Value::from(42));
        assert_eq!(strict.cast(&Value::from("42")), Value::Null);
        assert!(strict.validate(&Value::from("42")).is_empty());
        assert_eq!(strict.required().validate(&Value::from("42")).len(), 1);
    }

    #[rstest]
    fn transform_replaces_cast_and_type_check_still_runs() {
        let doubled = number().transform(|value| {
            value
                .as_f64()
                .map_or(Value::Null, |n| Value::Number(n * 2.0))
        });
        assert_eq!(doubled.cast(&Value::from(4)), Value::from(8));
        let stringly = number().transform(|_| Value::from("nope"));
        let errors = stringly.validate(&Value::from(1));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().map(ValidateError::rule), Some("type"));
    }

    #[rstest]
    fn where_sees_value_root_and_original() {
        let schema = number().where_(
            |context| {
                context.original == &Value::from("5") && context.value == &Value::from(5)
            },
            "must come from the string 5",
        );
        assert!(schema.validate(&Value::from("5")).is_empty());
        let errors = schema.validate(&Value::from(5));
        assert_eq!(errors.first().map(ValidateError::message).as_deref(), Some("must come from the string 5"));
    }

    #[rstest]
    fn default_is_stored_not_applied() {
        let schema = string().default("anonymous");
        assert_eq!(schema.default_value(), Some(&Value::from("anonymous")));
        assert_eq!(schema.cast(&Value::Null), Value::Null);
    }

    #[rstest]
    fn repeated_validation_hits_the_cache() {
        let schema = mixed().required();
        let first = schema.validate(&Value::Null);
        let second = schema.validate(&Value::Null);
        assert_eq!(first, second);
        assert_eq!(schema.node.memo.len(), 1);
    }

    #[rstest]
    fn validation_cache_stays_bounded() {
        let schema = number().min(0.0).memo_capacity(16);
        for n in 0..1_000 {
            assert!(schema.is_valid(&Value::from(n)));
        }
        assert_eq!(schema.node.memo.len(), 16);
        let uncached = schema.memo_capacity(0);
        assert!(!uncached.is_valid(&Value::from(-1)));
        assert_eq!(uncached.node.memo.len(), 0);
    }

    #[rstest]
    fn erase_keeps_behaviour() {
        let schema = number().min(5.0).erase().required();
        assert_eq!(schema.type_name(), "number");
        assert_eq!(schema.rule_names(), vec!["min", "required"]);
        assert_eq!(schema.validate(&Value::Null).len(), 2);
    }
}
