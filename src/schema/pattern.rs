//! Compiled regular expressions shared by the string rules and the locale
//! renderer.

use std::sync::LazyLock;

use regex::Regex;

/// Compiles a pattern that is a literal in this crate.
#[expect(
    clippy::expect_used,
    reason = "patterns are compile-time literals covered by unit tests"
)]
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

pub(crate) static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@",
        r"[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    ))
});

pub(crate) static URL: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"(?i)^(?:(?:https?|ftp):)?//",
        r"(?:[^\s@/]+@)?",
        r"(?:",
        r"(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)",
        r"|",
        r"(?:[\p{L}\p{N}](?:[\p{L}\p{N}._~-]*[\p{L}\p{N}])?\.)+\p{L}(?:[\p{L}\p{N}_~-]*[\p{L}\p{N}])?\.?",
        r")",
        r"(?::\d*)?",
        r"(?:[/?#]\S*)?$",
    ))
});

pub(crate) static UUID: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"(?i)^(?:[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}",
        r"|00000000-0000-0000-0000-000000000000)$",
    ))
});
