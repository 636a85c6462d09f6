//! Scrape command: check a list of pages and write the report.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use pagecheck::config::Settings;
use pagecheck::input::load_links;
use pagecheck::scrapers::HttpFetcher;
use pagecheck::services::{ProgressStatus, ScrapeConfig, ScrapeProgress, ScrapeService};

use super::helpers::truncate;

/// Link list read when neither a file nor `--url` is given.
const DEFAULT_LINKS_FILE: &str = "link.csv";

pub async fn cmd_scrape(
    settings: &Settings,
    links_file: Option<&Path>,
    urls: Vec<String>,
) -> anyhow::Result<()> {
    let mut links = match links_file {
        Some(path) => load_links(path)?,
        None if urls.is_empty() => load_links(Path::new(DEFAULT_LINKS_FILE))?,
        None => Vec::new(),
    };
    links.extend(urls);

    if links.is_empty() {
        println!("{} No links to check", style("!").yellow());
        return Ok(());
    }

    println!(
        "{} Checking {} pages (window: {} days)",
        style("→").cyan(),
        links.len(),
        settings.window_days
    );

    let fetcher = HttpFetcher::from_settings(settings)?;
    let service = ScrapeService::new(
        Arc::new(fetcher),
        ScrapeConfig {
            output_dir: settings.output_dir.clone(),
            classifier: settings.classifier(),
            format: settings.report_format,
        },
    );

    let pb = ProgressBar::new(links.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let (event_tx, mut event_rx) = mpsc::channel::<ScrapeProgress>(100);
    let progress_bar = pb.clone();
    let event_handler = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event.status {
                ProgressStatus::Analyzing => {
                    progress_bar.set_message(truncate(&event.current_url, 50));
                }
                ProgressStatus::Completed => progress_bar.inc(1),
                ProgressStatus::Error => {
                    progress_bar.println(format!(
                        "{} {}: {}",
                        style("✗").red(),
                        event.current_url,
                        event.message.unwrap_or_default()
                    ));
                    progress_bar.inc(1);
                }
            }
        }
    });

    let summary = service.run(&links, Utc::now(), event_tx).await;
    let _ = event_handler.await;
    pb.finish_and_clear();
    let summary = summary?;

    println!(
        "{} Checked {} pages, report saved as {}",
        style("✓").green(),
        summary.total_processed,
        summary.output_file.display()
    );
    if let Some(ref failed_file) = summary.failed_links_file {
        println!(
            "{} {} pages failed, links saved to {}",
            style("✗").red(),
            summary.failed_count,
            failed_file.display()
        );
    }

    Ok(())
}
