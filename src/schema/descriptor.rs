//! Builds schemas from raw descriptor nodes.
//!
//! Each type has a fixed table of rule names it accepts. Rule arguments are
//! checked against the Rust argument type of the matching builder method,
//! so a descriptor can express exactly what the builder API can.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_saphyr::Location;

use super::array::{Array, array};
use super::boolean::boolean;
use super::builder::{AnySchema, Schema};
use super::date::{Date, date, to_date};
use super::mixed::mixed;
use super::number::{Number, number};
use super::object::{Shape, object};
use super::raw::{RawDescriptor, RawRule};
use super::record::record;
use super::string::{Text, string};
use super::value::Value;

/// Type names a descriptor may use.
pub(crate) const TYPE_NAMES: &[&str] = &[
    "mixed", "string", "number", "boolean", "date", "array", "object", "record",
];

/// A descriptor node that does not describe a schema.
#[derive(Debug, Clone)]
pub(crate) struct DescriptorFailure {
    pub(crate) reason: String,
    pub(crate) location: Location,
}

impl DescriptorFailure {
    fn new(reason: impl Into<String>, location: Location) -> Self {
        Self {
            reason: reason.into(),
            location,
        }
    }
}

type Built<T> = Result<T, DescriptorFailure>;

/// Picks the plain rule method or its `*_with` twin.
macro_rules! attach {
    ($schema:expr, $rule:expr, $plain:ident / $with:ident $(, $arg:expr)*) => {
        match $rule.message.as_deref() {
            Some(message) => $schema.$with($($arg,)* message),
            None => $schema.$plain($($arg),*),
        }
    };
}

/// Builds the schema described by `raw`.
pub(crate) fn build(raw: &RawDescriptor) -> Built<AnySchema> {
    let type_name = raw.type_name.value.as_str();
    check_children(raw, type_name)?;
    let schema = match type_name {
        "mixed" => apply_rules(mixed(), raw, |_, rule| Err(unknown_rule(rule, "mixed")))?.erase(),
        "boolean" => {
            apply_rules(boolean(), raw, |_, rule| Err(unknown_rule(rule, "boolean")))?.erase()
        }
        "string" => apply_rules(string(), raw, string_rule)?.erase(),
        "number" => apply_rules(number(), raw, number_rule)?.erase(),
        "date" => apply_rules(date(), raw, date_rule)?.erase(),
        "array" => {
            let base = match raw.of.as_deref() {
                Some(element) => array().of(build(element)?),
                None => array(),
            };
            apply_rules(base, raw, array_rule)?.erase()
        }
        "record" => {
            let base = match raw.of.as_deref() {
                Some(element) => record().values(build(element)?),
                None => record(),
            };
            apply_rules(base, raw, |_, rule| Err(unknown_rule(rule, "record")))?.erase()
        }
        "object" => {
            let mut shape = Shape::new();
            for (key, child) in raw.shape.iter().flatten() {
                shape = shape.field(key.as_str(), build(child)?);
            }
            apply_rules(object(shape), raw, |_, rule| Err(unknown_rule(rule, "object")))?.erase()
        }
        other => {
            return Err(DescriptorFailure::new(
                format!(
                    "unknown type '{other}' (expected one of: {})",
                    TYPE_NAMES.join(", ")
                ),
                raw.location(),
            ));
        }
    };
    Ok(apply_settings(schema, raw))
}

fn check_children(raw: &RawDescriptor, type_name: &str) -> Built<()> {
    if raw.of.is_some() && !matches!(type_name, "array" | "record") {
        return Err(DescriptorFailure::new(
            format!("'of' is only valid for array and record, not '{type_name}'"),
            raw.location(),
        ));
    }
    if raw.shape.is_some() && type_name != "object" {
        return Err(DescriptorFailure::new(
            format!("'shape' is only valid for object, not '{type_name}'"),
            raw.location(),
        ));
    }
    Ok(())
}

fn apply_settings(schema: AnySchema, raw: &RawDescriptor) -> AnySchema {
    let labelled = match raw.label.as_deref() {
        Some(label) => schema.label(label),
        None => schema,
    };
    let defaulted = match raw.default.clone() {
        Some(default) => labelled.default(default),
        None => labelled,
    };
    if raw.strict { defaulted.strict() } else { defaulted }
}

/// Attaches `raw.rules` in order. `required` is handled here for every
/// type; other names go to `typed`.
fn apply_rules<K>(
    base: Schema<K>,
    raw: &RawDescriptor,
    typed: impl Fn(&Schema<K>, &RawRule) -> Built<Schema<K>>,
) -> Built<Schema<K>> {
    raw.rules.iter().try_fold(base, |schema, rule| {
        if rule.rule.value == "required" {
            no_arg(rule)?;
            Ok(attach!(schema, rule, required / required_with))
        } else {
            typed(&schema, rule)
        }
    })
}

fn string_rule(schema: &Schema<Text>, rule: &RawRule) -> Built<Schema<Text>> {
    let built = match rule.rule.value.as_str() {
        "notEmpty" => no_arg(rule).map(|()| attach!(schema, rule, not_empty / not_empty_with))?,
        "min" => attach!(schema, rule, min / min_with, count_arg(rule)?),
        "max" => attach!(schema, rule, max / max_with, count_arg(rule)?),
        "length" => attach!(schema, rule, length / length_with, count_arg(rule)?),
        "matches" => attach!(schema, rule, matches / matches_with, regex_arg(rule)?),
        "email" => no_arg(rule).map(|()| attach!(schema, rule, email / email_with))?,
        "url" => no_arg(rule).map(|()| attach!(schema, rule, url / url_with))?,
        "uuid" => no_arg(rule).map(|()| attach!(schema, rule, uuid / uuid_with))?,
        "trim" => no_arg(rule).map(|()| attach!(schema, rule, trim / trim_with))?,
        "lowercase" => no_arg(rule).map(|()| attach!(schema, rule, lowercase / lowercase_with))?,
        "uppercase" => no_arg(rule).map(|()| attach!(schema, rule, uppercase / uppercase_with))?,
        "oneOf" => attach!(schema, rule, one_of / one_of_with, list_arg(rule, "strings", string_item)?),
        "notOneOf" => attach!(
            schema,
            rule,
            not_one_of / not_one_of_with,
            list_arg(rule, "strings", string_item)?
        ),
        _ => return Err(unknown_rule(rule, "string")),
    };
    Ok(built)
}

fn number_rule(schema: &Schema<Number>, rule: &RawRule) -> Built<Schema<Number>> {
    let built = match rule.rule.value.as_str() {
        "min" => attach!(schema, rule, min / min_with, number_arg(rule)?),
        "max" => attach!(schema, rule, max / max_with, number_arg(rule)?),
        "lessThan" => attach!(schema, rule, less_than / less_than_with, number_arg(rule)?),
        "moreThan" => attach!(schema, rule, more_than / more_than_with, number_arg(rule)?),
        "positive" => no_arg(rule).map(|()| attach!(schema, rule, positive / positive_with))?,
        "negative" => no_arg(rule).map(|()| attach!(schema, rule, negative / negative_with))?,
        "integer" => no_arg(rule).map(|()| attach!(schema, rule, integer / integer_with))?,
        "oneOf" => attach!(schema, rule, one_of / one_of_with, list_arg(rule, "numbers", Value::as_f64)?),
        "notOneOf" => attach!(
            schema,
            rule,
            not_one_of / not_one_of_with,
            list_arg(rule, "numbers", Value::as_f64)?
        ),
        _ => return Err(unknown_rule(rule, "number")),
    };
    Ok(built)
}

fn date_rule(schema: &Schema<Date>, rule: &RawRule) -> Built<Schema<Date>> {
    let built = match rule.rule.value.as_str() {
        "min" => attach!(schema, rule, min / min_with, date_arg(rule)?),
        "max" => attach!(schema, rule, max / max_with, date_arg(rule)?),
        "lessThan" => attach!(schema, rule, less_than / less_than_with, date_arg(rule)?),
        "moreThan" => attach!(schema, rule, more_than / more_than_with, date_arg(rule)?),
        "oneOf" => attach!(schema, rule, one_of / one_of_with, list_arg(rule, "dates", to_date)?),
        "notOneOf" => attach!(
            schema,
            rule,
            not_one_of / not_one_of_with,
            list_arg(rule, "dates", to_date)?
        ),
        _ => return Err(unknown_rule(rule, "date")),
    };
    Ok(built)
}

fn array_rule(schema: &Schema<Array>, rule: &RawRule) -> Built<Schema<Array>> {
    let built = match rule.rule.value.as_str() {
        "notEmpty" => no_arg(rule).map(|()| attach!(schema, rule, not_empty / not_empty_with))?,
        "min" => attach!(schema, rule, min / min_with, count_arg(rule)?),
        "max" => attach!(schema, rule, max / max_with, count_arg(rule)?),
        "length" => attach!(schema, rule, length / length_with, count_arg(rule)?),
        _ => return Err(unknown_rule(rule, "array")),
    };
    Ok(built)
}

fn unknown_rule(rule: &RawRule, type_name: &str) -> DescriptorFailure {
    DescriptorFailure::new(
        format!("unknown rule '{}' for type '{type_name}'", rule.rule.value),
        rule.rule.referenced,
    )
}

fn arg_failure(rule: &RawRule, expected: &str) -> DescriptorFailure {
    DescriptorFailure::new(
        format!("rule '{}' expects {expected}", rule.rule.value),
        rule.arg_location(),
    )
}

fn no_arg(rule: &RawRule) -> Built<()> {
    match &rule.arg {
        None => Ok(()),
        Some(_) => Err(arg_failure(rule, "no argument")),
    }
}

fn arg<'a>(rule: &'a RawRule, expected: &str) -> Built<&'a Value> {
    rule.arg
        .as_ref()
        .map(|arg| &arg.value)
        .ok_or_else(|| arg_failure(rule, expected))
}

fn number_arg(rule: &RawRule) -> Built<f64> {
    arg(rule, "a number")?
        .as_f64()
        .ok_or_else(|| arg_failure(rule, "a number"))
}

/// Largest count a descriptor may spell.
const MAX_COUNT: f64 = 4_294_967_295.0;

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the value is checked to be a non-negative integer within u32 range"
)]
fn count_arg(rule: &RawRule) -> Built<usize> {
    const EXPECTED: &str = "a non-negative integer";
    let n = arg(rule, EXPECTED)?
        .as_f64()
        .ok_or_else(|| arg_failure(rule, EXPECTED))?;
    if n.fract() != 0.0 || !(0.0..=MAX_COUNT).contains(&n) {
        return Err(arg_failure(rule, EXPECTED));
    }
    Ok(n as usize)
}

fn regex_arg(rule: &RawRule) -> Built<Regex> {
    let pattern = arg(rule, "a regex pattern string")?
        .as_str()
        .ok_or_else(|| arg_failure(rule, "a regex pattern string"))?;
    Regex::new(pattern).map_err(|error| {
        DescriptorFailure::new(
            format!("rule 'matches' has an invalid pattern: {error}"),
            rule.arg_location(),
        )
    })
}

fn date_arg(rule: &RawRule) -> Built<DateTime<Utc>> {
    to_date(arg(rule, "a date")?).ok_or_else(|| arg_failure(rule, "a date"))
}

fn string_item(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn list_arg<T>(
    rule: &RawRule,
    items: &str,
    item: impl Fn(&Value) -> Option<T>,
) -> Built<Vec<T>> {
    let expected = format!("a list of {items}");
    arg(rule, &expected)?
        .as_sequence()
        .and_then(|values| values.iter().map(item).collect::<Option<Vec<_>>>())
        .ok_or_else(|| arg_failure(rule, &expected))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::schema::raw::RawSchemaDoc;

    fn built(yaml: &str) -> Built<AnySchema> {
        let doc: RawSchemaDoc = serde_saphyr::from_str(yaml).expect("descriptor should parse");
        build(&doc.schema)
    }

    #[rstest]
    fn builds_nested_schema() {
        let schema = built(
            r"
name: order
schema:
  type: object
  shape:
    items:
      type: array
      rules: [{ rule: min, arg: 1 }]
      of:
        type: number
        rules: [{ rule: positive }]
",
        )
        .expect("valid descriptor");
        let input = Value::from_yaml("items: [3, -1]").expect("valid yaml");
        let errors = schema.validate(&input);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().map(|e| e.path().join(".")), Some("items.1".to_owned()));
    }

    #[rstest]
    fn settings_apply_after_rules() {
        let schema = built(
            r"
name: tag
schema:
  type: string
  label: Tag
  strict: true
  default: none
  rules:
    - rule: required
      message: tag please
",
        )
        .expect("valid descriptor");
        assert_eq!(schema.default_value(), Some(&Value::from("none")));
        assert_eq!(schema.cast(&Value::from(5)), Value::Null);
        let errors = schema.validate(&Value::Null);
        assert_eq!(errors.first().map(|e| e.message()).as_deref(), Some("tag please"));
        assert_eq!(errors.first().and_then(|e| e.label()), Some("Tag"));
    }

    #[rstest]
    #[case::unknown_type("type: money", "unknown type 'money'")]
    #[case::unknown_rule("type: boolean\n  rules: [{ rule: min, arg: 1 }]", "unknown rule 'min' for type 'boolean'")]
    #[case::missing_arg("type: number\n  rules: [{ rule: min }]", "rule 'min' expects a number")]
    #[case::extra_arg("type: string\n  rules: [{ rule: email, arg: 1 }]", "rule 'email' expects no argument")]
    #[case::fractional_count("type: array\n  rules: [{ rule: max, arg: 1.5 }]", "expects a non-negative integer")]
    #[case::bad_list("type: number\n  rules: [{ rule: oneOf, arg: [1, x] }]", "expects a list of numbers")]
    #[case::bad_regex("type: string\n  rules: [{ rule: matches, arg: '(' }]", "invalid pattern")]
    #[case::misplaced_of("type: number\n  of: { type: string }", "'of' is only valid")]
    fn rejects_bad_descriptors(#[case] body: &str, #[case] fragment: &str) {
        let failure = built(&format!("name: bad\nschema:\n  {body}\n")).expect_err("should fail");
        assert!(
            failure.reason.contains(fragment),
            "reason {:?} should contain {fragment:?}",
            failure.reason
        );
    }
}
