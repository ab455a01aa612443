//! Helpers for reading configuration from the process environment.
use std::env;

const TRUTHY: [&str; 5] = ["1", "true", "yes", "y", "on"];
const FALSY: [&str; 5] = ["0", "false", "no", "n", "off"];

/// Returns the value of `key`, or `fallback` when it is unset or empty.
pub fn env_or(key: &str, fallback: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => fallback.to_string(),
    }
}

/// Returns the value of `key` if it is set to something non-empty.
pub fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Reads a boolean toggle.
///
/// Unset, empty and unrecognised values yield `default`.
pub fn env_flag(key: &str, default: bool) -> bool {
    env_opt(key).map_or(default, |v| parse_flag(&v, default))
}

/// Interprets `1/true/yes/y/on` and `0/false/no/n/off`, case-insensitively.
pub fn parse_flag(value: &str, default: bool) -> bool {
    let value = value.trim().to_ascii_lowercase();
    if TRUTHY.contains(&value.as_str()) {
        true
    } else if FALSY.contains(&value.as_str()) {
        false
    } else {
        default
    }
}
