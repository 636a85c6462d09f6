//! Follower count normalization.

use std::sync::LazyLock;

use regex::Regex;

static COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([0-9.]+)([KM]?)$").unwrap());

/// Longest prefix of `digits` that reads as a decimal number,
/// e.g. `1.2` from `1.2.3`.
fn leading_number(digits: &str) -> Option<f64> {
    let end = digits
        .match_indices('.')
        .nth(1)
        .map_or(digits.len(), |(index, _)| index);
    digits[..end].parse().ok()
}

/// Expand abbreviated counts like `1.2K` or `3M` to plain integers.
///
/// Empty input yields `"0"`. Text that is not a number with an optional
/// `K`/`M` suffix is returned unchanged. Extra decimal points end the
/// number, so `1.2.3K` reads as `1.2K`.
pub fn normalize_count(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "0".to_string();
    }

    let Some(caps) = COUNT_PATTERN.captures(trimmed) else {
        return text.to_string();
    };
    let Some(number) = leading_number(&caps[1]) else {
        return text.to_string();
    };

    let multiplier = match caps[2].to_ascii_uppercase().as_str() {
        "K" => 1_000.0,
        "M" => 1_000_000.0,
        _ => 1.0,
    };

    let value = (number * multiplier).round();
    if !value.is_finite() || value > u64::MAX as f64 {
        return text.to_string();
    }
    (value as u64).to_string()
}
