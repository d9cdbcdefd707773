//! Behavioural tests for schema descriptors using `rstest-bdd`.

mod common;

use castkit::schema::{Shape, array, load_schema_docs, load_schema_docs_with_source, number, object, string};
use common::{load_fixture, paths_and_rules, value};
use rstest_bdd_macros::{given, scenario, then};

const ORDER_DESCRIPTOR: &str = r"
name: order
schema:
  type: object
  shape:
    customer:
      type: string
      rules: [{ rule: required }, { rule: min, arg: 2 }]
    lines:
      type: array
      rules: [{ rule: notEmpty }]
      of:
        type: object
        shape:
          sku: { type: string, rules: [{ rule: required }, { rule: uppercase }] }
          qty: { type: number, rules: [{ rule: integer }, { rule: moreThan, arg: 0 }] }
";

#[given("a descriptor for an order schema")]
fn given_descriptor_for_order_schema() {}

#[then("it reports the same errors as the equivalent builder schema")]
fn then_it_reports_same_errors_as_builder_schema() {
    let docs = load_schema_docs(ORDER_DESCRIPTOR).expect("descriptor should load");
    let Some(loaded) = docs.first() else {
        panic!("descriptor should hold one document");
    };
    let built = object(
        Shape::new()
            .field("customer", string().required().min(2))
            .field(
                "lines",
                array().not_empty().of(object(
                    Shape::new()
                        .field("sku", string().required().uppercase())
                        .field("qty", number().integer().more_than(0.0)),
                )),
            ),
    );

    for input in [
        "{ customer: A, lines: [] }",
        "{ lines: [{ sku: abc, qty: 0 }, { qty: 1.5 }] }",
        "{ customer: Ann, lines: [{ sku: ABC, qty: 2 }] }",
        "{ customer: Ann, lines: [{ sku: ABC, qty: many }] }",
    ] {
        let payload = value(input);
        assert_eq!(
            paths_and_rules(&loaded.schema.validate(&payload)),
            paths_and_rules(&built.validate(&payload)),
            "descriptor and builder disagree on {input}"
        );
    }
}

#[given("a descriptor naming an unknown rule")]
fn given_descriptor_naming_unknown_rule() {}

#[then("loading fails with a located descriptor diagnostic")]
fn then_loading_fails_with_located_descriptor_diagnostic() {
    let source = "tests/fixtures/invalid_unknown_rule.yaml";
    let yaml = load_fixture("invalid_unknown_rule.yaml");
    let result = load_schema_docs_with_source(source, &yaml);
    assert!(result.is_err(), "fixture should fail to build");

    let Err(error) = result else {
        panic!("error should be present");
    };
    let Some(diagnostic) = error.diagnostic() else {
        panic!("diagnostic should be present");
    };
    assert_eq!(diagnostic.code.as_str(), "schema.descriptor_failure");
    assert_eq!(diagnostic.location.source, source);
    assert!(diagnostic.location.line > 0);
    assert!(diagnostic.location.column > 0);
}

#[given("a descriptor with an unknown key")]
fn given_descriptor_with_unknown_key() {}

#[then("loading fails with a located parse diagnostic")]
fn then_loading_fails_with_located_parse_diagnostic() {
    let source = "tests/fixtures/invalid_unknown_key.yaml";
    let yaml = load_fixture("invalid_unknown_key.yaml");
    let Err(error) = load_schema_docs_with_source(source, &yaml) else {
        panic!("fixture should fail parsing");
    };
    assert!(error.to_string().contains("unknown field"));
    let Some(diagnostic) = error.diagnostic() else {
        panic!("diagnostic should be present");
    };
    assert_eq!(diagnostic.code.as_str(), "schema.parse_failure");
    assert_eq!(diagnostic.location.source, source);
    assert!(diagnostic.location.line > 0);
    assert!(diagnostic.location.column > 0);
}

#[scenario(
    path = "tests/features/schema_descriptors.feature",
    name = "Descriptor schemas behave like builder schemas"
)]
fn descriptor_schemas_behave_like_builder_schemas() {}

#[scenario(
    path = "tests/features/schema_descriptors.feature",
    name = "Descriptor failures carry source locations"
)]
fn descriptor_failures_carry_source_locations() {}

#[scenario(
    path = "tests/features/schema_descriptors.feature",
    name = "Malformed descriptors fail to parse"
)]
fn malformed_descriptors_fail_to_parse() {}
