//! Snapshot tests for descriptor diagnostics and rendered messages.

mod common;

use camino::Utf8Path;
use castkit::schema::{Locales, load_schema_docs_with_source};
use common::{fixture_path, load_fixture, value};

fn render_diagnostic_for_fixture(fixture_name: &str) -> String {
    let source = fixture_path(fixture_name);
    let yaml = load_fixture(fixture_name);
    let Err(error) = load_schema_docs_with_source(&source, &yaml) else {
        panic!("fixture should fail");
    };
    let Some(diagnostic) = error.diagnostic() else {
        panic!("descriptor failures should carry structured diagnostics");
    };
    diagnostic.render()
}

#[test]
fn descriptor_unknown_rule_diagnostic_snapshot() {
    let actual = render_diagnostic_for_fixture("invalid_unknown_rule.yaml");
    let expected = include_str!("snapshots/diagnostics/descriptor_unknown_rule.snap").trim_end();
    assert_eq!(actual, expected);
}

#[test]
fn descriptor_bad_arg_diagnostic_snapshot() {
    let actual = render_diagnostic_for_fixture("invalid_bad_arg.yaml");
    let expected = include_str!("snapshots/diagnostics/descriptor_bad_arg.snap").trim_end();
    assert_eq!(actual, expected);
}

#[test]
fn descriptor_unknown_type_diagnostic_snapshot() {
    let actual = render_diagnostic_for_fixture("invalid_unknown_type.yaml");
    let expected = include_str!("snapshots/diagnostics/descriptor_unknown_type.snap").trim_end();
    assert_eq!(actual, expected);
}

#[test]
fn signup_messages_snapshot() {
    let docs = load_schema_docs_with_source("signup.yaml", &load_fixture("signup.yaml"))
        .expect("signup fixture should load");
    let Some(signup) = docs.first() else {
        panic!("signup fixture should hold one document");
    };
    let mut locales = Locales::with_builtin();
    locales
        .load_dir(Utf8Path::new("tests/fixtures/locales"))
        .expect("locale fixtures should load");

    let errors = signup.schema.validate(&value(
        "{ email: nope, age: '15', tags: [ok, ''], prefs: { theme: 3 } }",
    ));
    let actual = errors
        .iter()
        .flat_map(|error| {
            ["en", "fr"].map(|code| {
                format!(
                    "{} [{}] {code}: {}",
                    error.path().join("."),
                    error.rule(),
                    error.render(&locales, code)
                )
            })
        })
        .collect::<Vec<_>>()
        .join("\n");
    let expected = include_str!("snapshots/messages/signup_en_fr.snap").trim_end();
    assert_eq!(actual, expected);
}
