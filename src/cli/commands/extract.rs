//! Extract page details from a saved HTML file.

use std::path::Path;

use console::style;

use pagecheck::config::Settings;
use pagecheck::models::PageStatus;
use pagecheck::services::build_record;

use super::helpers::parse_now;

pub fn cmd_extract(
    settings: &Settings,
    html_file: &Path,
    url: &str,
    now: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let now = parse_now(now)?;
    let html = std::fs::read_to_string(html_file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", html_file.display(), e))?;

    let record = build_record(url, &html, url, &settings.classifier(), now);

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let fields = [
        ("Page name", &record.page_name),
        ("Username", &record.username),
        ("Followers", &record.followers),
        ("Category", &record.category),
        ("Location", &record.location),
        ("Email", &record.email),
        ("Instagram", &record.instagram_url),
        ("TikTok", &record.tiktok_url),
        ("YouTube", &record.youtube_url),
        ("X", &record.x_url),
        ("Last posted", &record.last_posted),
    ];

    println!("{} {}", style("→").cyan(), style(url).bold());
    for (name, value) in fields {
        if !value.is_empty() {
            println!("  {:<12} {}", format!("{}:", name), value);
        }
    }

    let status = match record.status {
        PageStatus::Active => style(record.status.label()).green(),
        PageStatus::NotActive | PageStatus::Error => style(record.status.label()).red(),
        PageStatus::Unknown => style(record.status.label()).yellow(),
    };
    println!("  {:<12} {}", "Status:", status);
    Ok(())
}
