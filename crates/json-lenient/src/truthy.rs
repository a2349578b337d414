//! Shared boolean vocabulary.
//!
//! Producers encode booleans as `1`, `"true"`, `"yes"`, `"y"`, or bare
//! numeric strings. One vocabulary serves both the boolean default policy
//! and the bool-prioritizing coercion strategy so the two never disagree on
//! what a string means.

/// Case-insensitive logical interpretation of a string.
///
/// Numeric strings parse as `i64` and are truthy iff the value is strictly
/// positive: `"11"` is true, `"-11"` and `"0"` are false.
pub fn from_str(text: &str) -> Option<bool> {
    let lower = text.to_ascii_lowercase();
    match lower.as_str() {
        "true" | "t" | "yes" | "y" => Some(true),
        "false" | "f" | "no" | "n" => Some(false),
        _ => lower.parse::<i64>().ok().map(|value| value > 0),
    }
}

/// Exact lossless integer-to-boolean mapping: only `0` and `1` qualify.
pub fn from_exact_int(value: i64) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// Sign-rule integer-to-boolean mapping used by the bool-first probe order:
/// truthy iff strictly positive.
pub fn from_int_sign(value: i64) -> bool {
    value > 0
}
