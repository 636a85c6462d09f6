//! Page scrape service.
//!
//! Fetches each link in turn, extracts page metadata, normalizes the
//! follower count and classifies last-post recency, then writes the report.
//! Separated from UI concerns - emits events for progress tracking.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::analysis::{normalize_count, RecencyClassifier};
use crate::models::{is_placeholder, PageRecord, PageStatus};
use crate::report::{report_file_name, write_failed_links, write_report, ReportError, ReportFormat};
use crate::scrapers::{extract_page, FetchError, PageFetcher};

/// Message attached to progress events for pages that failed.
pub const FAILED_MESSAGE: &str = "Failed to analyze page";

/// Stage of a single page within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Analyzing,
    Completed,
    Error,
}

/// Progress event emitted for each page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeProgress {
    /// 1-based position of the page in the run.
    pub current: usize,
    pub total: usize,
    pub current_url: String,
    pub status: ProgressStatus,
    pub message: Option<String>,
}

/// Result of a scrape run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeSummary {
    pub output_file: PathBuf,
    pub failed_links_file: Option<PathBuf>,
    pub failed_count: usize,
    pub total_processed: usize,
}

/// Configuration for the scrape service.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub output_dir: PathBuf,
    pub classifier: RecencyClassifier,
    pub format: ReportFormat,
}

/// Service for checking a list of pages and writing the report.
pub struct ScrapeService {
    fetcher: Arc<dyn PageFetcher>,
    config: ScrapeConfig,
}

impl ScrapeService {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: ScrapeConfig) -> Self {
        Self { fetcher, config }
    }

    /// Fetch and analyze a single page.
    pub async fn analyze_page(&self, link: &str, now: DateTime<Utc>) -> Result<PageRecord, FetchError> {
        let page = self.fetcher.fetch(link).await?;
        Ok(build_record(link, &page.body, &page.final_url, &self.config.classifier, now))
    }

    /// Check every link, in order, and write the report.
    ///
    /// `now` is the reference instant for recency and the report timestamp.
    /// Page failures become error records; only report I/O aborts the run.
    pub async fn run(
        &self,
        links: &[String],
        now: DateTime<Utc>,
        event_tx: mpsc::Sender<ScrapeProgress>,
    ) -> Result<ScrapeSummary, ReportError> {
        let total = links.len();
        let mut records = Vec::with_capacity(total);
        let mut failed_links = Vec::new();

        for (index, link) in links.iter().enumerate() {
            let current = index + 1;
            info!("({}/{}) Processing: {}", current, total, link);
            let progress = |status, message: Option<&str>| ScrapeProgress {
                current,
                total,
                current_url: link.clone(),
                status,
                message: message.map(str::to_string),
            };

            let _ = event_tx.send(progress(ProgressStatus::Analyzing, None)).await;

            let record = match self.analyze_page(link, now).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("Failed to analyze {}: {}", link, e);
                    PageRecord::failed(link)
                }
            };

            let event = if record.is_failed() {
                failed_links.push(link.clone());
                progress(ProgressStatus::Error, Some(FAILED_MESSAGE))
            } else {
                progress(ProgressStatus::Completed, None)
            };
            records.push(record);
            let _ = event_tx.send(event).await;
        }

        let file_name = report_file_name(&now.with_timezone(&Local), self.config.format);
        let output_file = write_report(&records, &self.config.output_dir, &file_name, self.config.format)?;

        let failed_links_file = if failed_links.is_empty() {
            None
        } else {
            warn!("{} pages failed to analyze.", failed_links.len());
            Some(write_failed_links(&self.config.output_dir, &failed_links)?)
        };

        Ok(ScrapeSummary {
            output_file,
            failed_links_file,
            failed_count: failed_links.len(),
            total_processed: total,
        })
    }
}

/// Turn fetched HTML into a classified page record.
pub fn build_record(
    link: &str,
    html: &str,
    page_url: &str,
    classifier: &RecencyClassifier,
    now: DateTime<Utc>,
) -> PageRecord {
    let details = extract_page(html, page_url);
    let status = PageStatus::from(classifier.classify(&details.last_posted, now));
    let followers = if is_placeholder(&details.followers) {
        details.followers
    } else {
        normalize_count(&details.followers)
    };

    PageRecord {
        link: link.to_string(),
        username: details.username,
        page_name: details.page_name,
        followers,
        category: details.category,
        last_posted: details.last_posted,
        location: details.location,
        email: details.email,
        instagram_url: details.instagram_url,
        tiktok_url: details.tiktok_url,
        youtube_url: details.youtube_url,
        x_url: details.x_url,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::FetchedPage;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            match self.pages.get(url) {
                Some(body) => Ok(FetchedPage {
                    url: url.to_string(),
                    final_url: url.to_string(),
                    status: 200,
                    body: body.clone(),
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn page_html(name: &str, followers: &str, posted: &str) -> String {
        format!(
            r#"<html><body>
            <h1 class="html-h1">{name}</h1>
            <a href="/{name}/followers">{followers} followers</a>
            <div data-pagelet="TimelineFeedUnit_0">
              <span dir="ltr">{name}</span><span dir="ltr">{posted} · Public</span>
            </div>
            </body></html>"#
        )
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn service(pages: &[(&str, String)], output_dir: PathBuf) -> ScrapeService {
        let fetcher = FakeFetcher {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.clone()))
                .collect(),
        };
        ScrapeService::new(
            Arc::new(fetcher),
            ScrapeConfig {
                output_dir,
                classifier: RecencyClassifier::default(),
                format: ReportFormat::Csv,
            },
        )
    }

    #[test]
    fn test_build_record_normalizes_and_classifies() {
        let html = page_html("bluenote", "12.5K", "3d");
        let record = build_record(
            "https://www.facebook.com/bluenote",
            &html,
            "https://www.facebook.com/bluenote",
            &RecencyClassifier::default(),
            now(),
        );

        assert_eq!(record.page_name, "bluenote");
        assert_eq!(record.followers, "12500");
        assert_eq!(record.last_posted, "3d");
        assert_eq!(record.status, PageStatus::Active);
    }

    #[test]
    fn test_build_record_keeps_placeholders() {
        let record = build_record(
            "https://www.facebook.com/empty",
            "<html><body><h1>Empty</h1></body></html>",
            "https://www.facebook.com/empty",
            &RecencyClassifier::default(),
            now(),
        );

        assert_eq!(record.followers, "N/A");
        assert_eq!(record.last_posted, "N/A");
        assert_eq!(record.status, PageStatus::NotActive);
    }

    #[test]
    fn test_build_record_unknown_timestamp() {
        let html = page_html("odd", "10", "Yesterday at 9:00 PM");
        let record = build_record("u", &html, "https://www.facebook.com/odd", &RecencyClassifier::default(), now());
        assert_eq!(record.status, PageStatus::Unknown);
    }

    #[tokio::test]
    async fn test_run_writes_report_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let active = "https://www.facebook.com/active".to_string();
        let stale = "https://www.facebook.com/stale".to_string();
        let missing = "https://www.facebook.com/missing".to_string();
        let service = service(
            &[
                (active.as_str(), page_html("active", "1.2K", "2w")),
                (stale.as_str(), page_html("stale", "3M", "August 18, 2022")),
            ],
            dir.path().join("output"),
        );

        let (tx, mut rx) = mpsc::channel(32);
        let links = vec![active.clone(), missing.clone(), stale.clone()];
        let summary = service.run(&links, now(), tx).await.unwrap();

        assert_eq!(summary.total_processed, 3);
        assert_eq!(summary.failed_count, 1);
        assert!(summary.output_file.exists());

        let failed = std::fs::read_to_string(summary.failed_links_file.unwrap()).unwrap();
        assert_eq!(failed, missing);

        let mut reader = csv::Reader::from_path(&summary.output_file).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][3], "1200");
        assert_eq!(&rows[0][12], "Active");
        assert_eq!(&rows[1][0], "Error");
        assert_eq!(&rows[1][12], "Error");
        assert_eq!(&rows[2][3], "3000000");
        assert_eq!(&rows[2][12], "Not Active");
        assert_eq!(&rows[2][13], "FFFF5C5C");

        let mut statuses = Vec::new();
        while let Ok(event) = rx.try_recv() {
            statuses.push((event.current, event.status, event.message));
        }
        assert_eq!(
            statuses,
            vec![
                (1, ProgressStatus::Analyzing, None),
                (1, ProgressStatus::Completed, None),
                (2, ProgressStatus::Analyzing, None),
                (2, ProgressStatus::Error, Some(FAILED_MESSAGE.to_string())),
                (3, ProgressStatus::Analyzing, None),
                (3, ProgressStatus::Completed, None),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_without_failures_skips_failed_file() {
        let dir = tempfile::tempdir().unwrap();
        let link = "https://www.facebook.com/ok".to_string();
        let service = service(&[(link.as_str(), page_html("ok", "5", "4h"))], dir.path().to_path_buf());

        let (tx, _rx) = mpsc::channel(8);
        let summary = service.run(&[link], now(), tx).await.unwrap();

        assert_eq!(summary.failed_count, 0);
        assert!(summary.failed_links_file.is_none());
        assert!(!dir.path().join("failed_links.txt").exists());
    }

    #[tokio::test]
    async fn test_run_ignores_dropped_receiver() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(&[], dir.path().to_path_buf());

        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let links = vec!["https://www.facebook.com/gone".to_string()];
        let summary = service.run(&links, now(), tx).await.unwrap();
        assert_eq!(summary.failed_count, 1);
    }
}
