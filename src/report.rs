//! Report output for a scrape run.
//!
//! Reports are written to a timestamped file in the output folder, plus a
//! `failed_links.txt` listing pages that could not be analyzed.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::PageRecord;

/// Prefix of report file names.
pub const REPORT_PREFIX: &str = "Facebook_Pages";

/// File listing links that failed analysis.
pub const FAILED_LINKS_FILENAME: &str = "failed_links.txt";

/// Report columns, in output order.
pub const COLUMNS: [&str; 14] = [
    "PAGE NAME",
    "USERNAME",
    "LINK",
    "TOTAL FOLLOWERS",
    "CLASSIFICATION",
    "LOCATION",
    "EMAIL URL",
    "INSTAGRAM URL",
    "TIKTOK URL",
    "YOUTUBE URL",
    "X URL",
    "LAST POSTED",
    "PAGE STATUS",
    "HIGHLIGHT",
];

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Errors that can occur while writing reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Report file name for a run at `at`, e.g.
/// `Facebook_Pages_03-09-2025_04-05-06_PM.csv`.
pub fn report_file_name<Tz>(at: &DateTime<Tz>, format: ReportFormat) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!(
        "{}_{}.{}",
        REPORT_PREFIX,
        at.format("%m-%d-%Y_%I-%M-%S_%p"),
        format.extension()
    )
}

/// Cells of one report row, in [`COLUMNS`] order. Statuses without a
/// highlight colour leave the last cell empty.
pub fn record_row(record: &PageRecord) -> [&str; 14] {
    [
        &record.page_name,
        &record.username,
        &record.link,
        &record.followers,
        &record.category,
        &record.location,
        &record.email,
        &record.instagram_url,
        &record.tiktok_url,
        &record.youtube_url,
        &record.x_url,
        &record.last_posted,
        record.status.label(),
        record.status.highlight_argb().unwrap_or_default(),
    ]
}

/// JSON report entry: the record plus its status highlight colour.
#[derive(Serialize)]
struct ReportEntry<'a> {
    #[serde(flatten)]
    record: &'a PageRecord,
    highlight: Option<&'static str>,
}

impl<'a> From<&'a PageRecord> for ReportEntry<'a> {
    fn from(record: &'a PageRecord) -> Self {
        Self {
            record,
            highlight: record.status.highlight_argb(),
        }
    }
}

/// Write `records` to `output_dir/file_name`, creating the folder if needed.
pub fn write_report(
    records: &[PageRecord],
    output_dir: &Path,
    file_name: &str,
    format: ReportFormat,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(file_name);

    match format {
        ReportFormat::Csv => {
            let mut writer = csv::Writer::from_path(&path)?;
            writer.write_record(COLUMNS)?;
            for record in records {
                writer.write_record(record_row(record))?;
            }
            writer.flush()?;
        }
        ReportFormat::Json => {
            let file = std::fs::File::create(&path)?;
            let entries: Vec<ReportEntry> = records.iter().map(ReportEntry::from).collect();
            serde_json::to_writer_pretty(std::io::BufWriter::new(file), &entries)?;
        }
    }

    info!("Report saved as: {}", path.display());
    Ok(path)
}

/// Write one failed link per line to `output_dir/failed_links.txt`.
pub fn write_failed_links(output_dir: &Path, links: &[String]) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(FAILED_LINKS_FILENAME);
    std::fs::write(&path, links.join("\n"))?;
    Ok(path)
}
