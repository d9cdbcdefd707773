//! Shared fixture helpers for integration tests.
//!
//! Paths are relative to the package root, which is the working directory
//! `cargo test` runs integration tests from.

/// Directory holding test fixtures.
pub const FIXTURE_DIR: &str = "tests/fixtures";

/// Returns the path of fixture `name` as used in diagnostics.
#[must_use]
pub fn fixture_path(name: &str) -> String {
    format!("{FIXTURE_DIR}/{name}")
}

/// Loads a fixture file from the `tests/fixtures/` directory.
///
/// # Panics
///
/// Panics if the file cannot be read.
#[must_use]
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
}
