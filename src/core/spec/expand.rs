//! Environment variable expansion for job files.
//!
//! Replaces `${VAR}` and `$VAR` with the variable's value. Unset variables
//! expand to an empty string. A `$` followed by a digit or one of
//! `*#$@!?-` names a single-character shell special variable, so `$5`
//! expands to the (normally unset) variable `5`.

use std::sync::OnceLock;

use regex::{Captures, Regex};

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$(?:\{([A-Za-z0-9_]+|[*#$@!?-])\}|([A-Za-z_][A-Za-z0-9_]*)|([0-9*#$@!?-]))")
            .expect("variable pattern is a valid regex")
    })
}

/// Expand variables from the process environment.
pub fn expand_env(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Expand variables using `lookup`.
pub fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    pattern()
        .replace_all(input, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            lookup(name).unwrap_or_default()
        })
        .into_owned()
}
