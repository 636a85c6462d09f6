//! Classifier and follower count commands.

use console::style;
use serde::Serialize;

use pagecheck::analysis::{normalize_count, Verdict};
use pagecheck::config::Settings;

use super::helpers::parse_now;

#[derive(Serialize)]
struct CheckResult<'a> {
    input: &'a str,
    verdict: Verdict,
    active: bool,
}

/// Classify each input string and print the verdicts.
pub fn cmd_check(
    settings: &Settings,
    texts: &[String],
    now: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let now = parse_now(now)?;
    let classifier = settings.classifier();

    let results: Vec<CheckResult> = texts
        .iter()
        .map(|text| {
            let verdict = classifier.classify(text, now);
            CheckResult {
                input: text,
                verdict,
                active: verdict.is_active(),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for result in &results {
        let label = match result.verdict {
            Verdict::Active => style(result.verdict.label()).green(),
            Verdict::NotActive => style(result.verdict.label()).red(),
            Verdict::Unknown => style(result.verdict.label()).yellow(),
        };
        println!("{:<32} {}", result.input, label);
    }
    Ok(())
}

/// Normalize each follower count and print it.
pub fn cmd_followers(texts: &[String]) -> anyhow::Result<()> {
    for text in texts {
        println!("{:<16} {}", text, normalize_count(text));
    }
    Ok(())
}
