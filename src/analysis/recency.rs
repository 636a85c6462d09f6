//! Post recency classification.
//!
//! Turns the loosely formatted "time since last post" text shown on a page
//! into a [`Verdict`]. Shapes are tried in order, first match wins:
//! - sentinels: empty, `N/A`, `Error`
//! - relative durations: `3d`, `17h`, `2w`, `45m`, `10s`
//! - month and day with a time: `March 30 at 7:50 AM`
//! - bare month and day: `March 30`
//! - full dates: `August 18, 2022`, `2022-08-18`
//!
//! Anything else is [`Verdict::Unknown`]. Classification never fails and
//! never reads the system clock; callers pass the reference instant.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::months::month_from_name;

/// Default activity window in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Outcome of classifying a last-post timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Posted within the recency window.
    Active,
    /// Posted before the window, or the page had no post information.
    NotActive,
    /// The timestamp text had a shape that could not be interpreted.
    Unknown,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Active => "active",
            Verdict::NotActive => "not_active",
            Verdict::Unknown => "unknown",
        }
    }

    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Active => "Active",
            Verdict::NotActive => "Not Active",
            Verdict::Unknown => "Unknown",
        }
    }

    /// Two-valued projection: only `Active` is true.
    pub fn is_active(&self) -> bool {
        matches!(self, Verdict::Active)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Input is lowercased before matching.
static RELATIVE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)([smhdw])$").unwrap());
static MONTH_DAY_AT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)\.?\s+([0-9]{1,2})\s+at(?:\s.*)?$").unwrap());
static MONTH_DAY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+)\.?\s+([0-9]{1,2})$").unwrap());
static FULL_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z]+)\.?\s+([0-9]{1,2}),?\s+([0-9]{4})(?:\s+at(?:\s.*)?)?$").unwrap()
});
static ISO_DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap());

/// Recency classifier with a configurable activity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecencyClassifier {
    window: Duration,
}

impl Default for RecencyClassifier {
    fn default() -> Self {
        Self::with_window_days(DEFAULT_WINDOW_DAYS)
    }
}

impl RecencyClassifier {
    /// Negative windows are clamped to zero.
    pub fn new(window: Duration) -> Self {
        Self {
            window: window.max(Duration::zero()),
        }
    }

    /// Window given in whole days. Negative values clamp to zero and
    /// windows too large to represent saturate.
    pub fn with_window_days(days: i64) -> Self {
        Self::new(Duration::try_days(days.max(0)).unwrap_or(Duration::MAX))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn classify(&self, input: &str, now: DateTime<Utc>) -> Verdict {
        classify(input, now, self.window)
    }
}

/// Classify last-post text relative to `now`.
///
/// A post is `Active` when it happened at or after `now - window`. Calendar
/// dates without a year are placed in `now`'s year. Dates are compared at
/// day granularity against the cutoff's date.
pub fn classify(input: &str, now: DateTime<Utc>, window: Duration) -> Verdict {
    let text = input.trim().to_lowercase();
    if is_sentinel(&text) {
        return Verdict::NotActive;
    }

    let cutoff = now
        .checked_sub_signed(window.max(Duration::zero()))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    if let Some(caps) = RELATIVE_PATTERN.captures(&text) {
        return classify_relative(&caps[1], &caps[2], now, cutoff);
    }

    if let Some(caps) = MONTH_DAY_AT_PATTERN.captures(&text) {
        return classify_date(month_day_in_year(&caps[1], &caps[2], now.year()), cutoff);
    }

    if let Some(caps) = MONTH_DAY_PATTERN.captures(&text) {
        return classify_date(month_day_in_year(&caps[1], &caps[2], now.year()), cutoff);
    }

    if let Some(caps) = FULL_DATE_PATTERN.captures(&text) {
        let date = caps[3]
            .parse::<i32>()
            .ok()
            .and_then(|year| month_day_in_year(&caps[1], &caps[2], year));
        return classify_date(date, cutoff);
    }

    if let Some(caps) = ISO_DATE_PATTERN.captures(&text) {
        return classify_date(parse_iso_date(&caps), cutoff);
    }

    Verdict::Unknown
}

fn is_sentinel(text: &str) -> bool {
    matches!(text, "" | "n/a" | "error")
}

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit {
        "s" => Some(1),
        "m" => Some(60),
        "h" => Some(3_600),
        "d" => Some(86_400),
        "w" => Some(604_800),
        _ => None,
    }
}

fn classify_relative(
    value: &str,
    unit: &str,
    now: DateTime<Utc>,
    cutoff: DateTime<Utc>,
) -> Verdict {
    let posted_at = relative_offset(value, unit).and_then(|offset| now.checked_sub_signed(offset));
    match posted_at {
        Some(posted_at) if posted_at >= cutoff => Verdict::Active,
        // Unrepresentable offsets lie far before any cutoff.
        _ => Verdict::NotActive,
    }
}

/// Offset described by a relative duration, or None when it overflows.
fn relative_offset(value: &str, unit: &str) -> Option<Duration> {
    let value: u64 = value.parse().ok()?;
    let seconds = value.checked_mul(unit_seconds(unit)?)?;
    Duration::try_seconds(i64::try_from(seconds).ok()?)
}

fn month_day_in_year(month: &str, day: &str, year: i32) -> Option<NaiveDate> {
    let month = month_from_name(month)?;
    let day: u32 = day.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_iso_date(caps: &regex::Captures) -> Option<NaiveDate> {
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn classify_date(date: Option<NaiveDate>, cutoff: DateTime<Utc>) -> Verdict {
    match date {
        Some(date) if date >= cutoff.date_naive() => Verdict::Active,
        Some(_) => Verdict::NotActive,
        None => Verdict::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(timestamp: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(timestamp)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn default_window() -> Duration {
        Duration::days(DEFAULT_WINDOW_DAYS)
    }

    #[test]
    fn test_sentinels_are_not_active() {
        let now = at("2025-06-01T12:00:00Z");
        for input in ["", "   ", "N/A", "n/a", "Error", "ERROR"] {
            assert_eq!(classify(input, now, default_window()), Verdict::NotActive, "{input:?}");
        }
    }

    #[test]
    fn test_relative_window_boundary() {
        let now = at("2025-06-01T12:00:00Z");
        assert_eq!(classify("30d", now, default_window()), Verdict::Active);
        assert_eq!(classify("31d", now, default_window()), Verdict::NotActive);
        assert_eq!(classify("4w", now, default_window()), Verdict::Active);
        assert_eq!(classify("5w", now, default_window()), Verdict::NotActive);
        assert_eq!(classify("720h", now, default_window()), Verdict::Active);
        assert_eq!(classify("721h", now, default_window()), Verdict::NotActive);
    }

    #[test]
    fn test_relative_matches_unit_arithmetic() {
        let now = at("2024-02-29T08:30:00Z");
        let window_seconds = 30 * 86_400u64;
        let values = [0u64, 1, 4, 5, 29, 30, 31, 720, 721, 43_200, 43_201, 2_592_000, 2_592_001];

        for (unit, seconds) in [("s", 1u64), ("m", 60), ("h", 3_600), ("d", 86_400), ("w", 604_800)] {
            for value in values {
                let expected = if value * seconds <= window_seconds {
                    Verdict::Active
                } else {
                    Verdict::NotActive
                };
                let input = format!("{value}{unit}");
                assert_eq!(classify(&input, now, default_window()), expected, "{input}");
            }
        }
    }

    #[test]
    fn test_relative_is_case_insensitive() {
        let now = at("2025-06-01T12:00:00Z");
        assert_eq!(classify("3D", now, default_window()), Verdict::Active);
        assert_eq!(classify(" 17H ", now, default_window()), Verdict::Active);
    }

    #[test]
    fn test_zero_is_always_active() {
        let now = at("2025-06-01T12:00:00Z");
        assert_eq!(classify("0d", now, Duration::zero()), Verdict::Active);
        assert_eq!(classify("0w", now, default_window()), Verdict::Active);
    }

    #[test]
    fn test_relative_overflow_is_not_active() {
        let now = at("2025-06-01T12:00:00Z");
        assert_eq!(classify("999999d", now, default_window()), Verdict::NotActive);
        assert_eq!(
            classify("99999999999999999999999999w", now, default_window()),
            Verdict::NotActive
        );
        assert_eq!(classify("18446744073709551615w", now, default_window()), Verdict::NotActive);
    }

    #[test]
    fn test_bare_month_day_uses_current_year() {
        assert_eq!(
            classify("March 2", at("2025-03-10T12:00:00Z"), default_window()),
            Verdict::Active
        );
        assert_eq!(
            classify("March 2", at("2025-09-10T12:00:00Z"), default_window()),
            Verdict::NotActive
        );
    }

    #[test]
    fn test_month_day_with_time() {
        assert_eq!(
            classify("March 30 at 7:50 AM", at("2025-04-05T00:00:00Z"), default_window()),
            Verdict::Active
        );
        assert_eq!(
            classify("March 30 at 7:50 AM", at("2025-06-01T00:00:00Z"), default_window()),
            Verdict::NotActive
        );
    }

    #[test]
    fn test_date_cutoff_is_inclusive_by_day() {
        let now = at("2025-03-10T12:00:00Z");
        assert_eq!(classify("February 8", now, default_window()), Verdict::Active);
        assert_eq!(classify("February 7", now, default_window()), Verdict::NotActive);
    }

    #[test]
    fn test_full_dates_with_year() {
        let now = at("2025-06-01T00:00:00Z");
        assert_eq!(classify("August 18, 2022", now, default_window()), Verdict::NotActive);
        assert_eq!(classify("May 20, 2025", now, default_window()), Verdict::Active);
        assert_eq!(classify("May 20 2025 at 3:15 PM", now, default_window()), Verdict::Active);
        assert_eq!(classify("Aug. 18, 2022", now, default_window()), Verdict::NotActive);
        assert_eq!(classify("2025-05-20", now, default_window()), Verdict::Active);
        assert_eq!(classify("2022-08-18", now, default_window()), Verdict::NotActive);
    }

    #[test]
    fn test_unrecognized_is_unknown() {
        let now = at("2025-06-01T00:00:00Z");
        for input in ["Yesterday", "Just now", "Smarch 3", "February 30", "3 days ago", "3y", "2025-13-01"] {
            assert_eq!(classify(input, now, default_window()), Verdict::Unknown, "{input:?}");
        }
    }

    #[test]
    fn test_custom_window() {
        let now = at("2025-06-01T00:00:00Z");
        let classifier = RecencyClassifier::with_window_days(7);
        assert_eq!(classifier.classify("7d", now), Verdict::Active);
        assert_eq!(classifier.classify("8d", now), Verdict::NotActive);
        assert_eq!(classifier.classify("1w", now), Verdict::Active);
    }

    #[test]
    fn test_default_classifier_window() {
        assert_eq!(RecencyClassifier::default().window(), Duration::days(30));
    }

    #[test]
    fn test_negative_window_clamps_to_zero() {
        let now = at("2025-06-01T12:00:00Z");
        let classifier = RecencyClassifier::with_window_days(-1);
        assert_eq!(classifier.window(), Duration::zero());
        assert_eq!(classifier.classify("0d", now), Verdict::Active);
        assert_eq!(classifier.classify("1s", now), Verdict::NotActive);
        assert_eq!(classify("0h", now, Duration::days(-3)), Verdict::Active);
        assert_eq!(classify("June 1", now, Duration::days(-3)), Verdict::Active);
    }

    #[test]
    fn test_huge_windows() {
        let now = at("2025-06-01T12:00:00Z");
        let narrow = RecencyClassifier::with_window_days(-1_000_000_000_000_000);
        assert_eq!(narrow.window(), Duration::zero());
        assert_eq!(narrow.classify("999999d", now), Verdict::NotActive);
        assert_eq!(narrow.classify("August 18, 2022", now), Verdict::NotActive);

        let wide = RecencyClassifier::with_window_days(i64::MAX);
        assert_eq!(wide.window(), Duration::MAX);
        assert_eq!(wide.classify("August 18, 2022", now), Verdict::Active);
    }

    #[test]
    fn test_classification_is_repeatable() {
        let now = at("2025-06-01T00:00:00Z");
        let classifier = RecencyClassifier::default();
        for input in ["3d", "March 2", "banana", "", "August 18, 2022"] {
            assert_eq!(classifier.classify(input, now), classifier.classify(input, now));
        }
    }

    #[test]
    fn test_verdict_projections() {
        assert!(Verdict::Active.is_active());
        assert!(!Verdict::NotActive.is_active());
        assert!(!Verdict::Unknown.is_active());
        assert_eq!(Verdict::NotActive.label(), "Not Active");
        assert_eq!(Verdict::Unknown.to_string(), "Unknown");
        assert_eq!(Verdict::NotActive.as_str(), "not_active");
    }
}
