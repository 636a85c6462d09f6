//! Service layer for pagecheck.
//!
//! Domain logic separated from UI concerns, driven by the CLI.

pub mod scrape;

pub use scrape::{
    build_record, ProgressStatus, ScrapeConfig, ScrapeProgress, ScrapeService, ScrapeSummary,
    FAILED_MESSAGE,
};
