//! Page records produced by a scrape run.

use serde::{Deserialize, Serialize};

use crate::analysis::Verdict;

/// Placeholder for scalar fields that could not be found on the page.
pub const NOT_AVAILABLE: &str = "N/A";
/// Placeholder for fields of a page that could not be analyzed.
pub const ERROR_MARKER: &str = "Error";

/// Activity status shown in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageStatus {
    #[serde(rename = "Active")]
    Active,
    #[serde(rename = "Not Active")]
    NotActive,
    #[serde(rename = "Unknown")]
    Unknown,
    /// The page could not be fetched or parsed.
    #[serde(rename = "Error")]
    Error,
}

impl PageStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::NotActive => "Not Active",
            Self::Unknown => "Unknown",
            Self::Error => "Error",
        }
    }

    /// ARGB fill colour for the status cell, if the status is highlighted.
    pub fn highlight_argb(&self) -> Option<&'static str> {
        match self {
            Self::Active => Some("FF92D050"),
            Self::NotActive => Some("FFFF5C5C"),
            Self::Unknown | Self::Error => None,
        }
    }
}

impl From<Verdict> for PageStatus {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Active => Self::Active,
            Verdict::NotActive => Self::NotActive,
            Verdict::Unknown => Self::Unknown,
        }
    }
}

/// Metadata collected for a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub link: String,
    pub username: String,
    pub page_name: String,
    pub followers: String,
    pub category: String,
    pub last_posted: String,
    pub location: String,
    pub email: String,
    pub instagram_url: String,
    pub tiktok_url: String,
    pub youtube_url: String,
    pub x_url: String,
    pub status: PageStatus,
}

impl PageRecord {
    /// Record for a page that could not be analyzed.
    pub fn failed(link: &str) -> Self {
        Self {
            link: link.to_string(),
            username: String::new(),
            page_name: ERROR_MARKER.to_string(),
            followers: ERROR_MARKER.to_string(),
            category: ERROR_MARKER.to_string(),
            last_posted: ERROR_MARKER.to_string(),
            location: String::new(),
            email: String::new(),
            instagram_url: String::new(),
            tiktok_url: String::new(),
            youtube_url: String::new(),
            x_url: String::new(),
            status: PageStatus::Error,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == PageStatus::Error
    }
}

/// Whether a scraped value is one of the placeholder markers.
pub fn is_placeholder(value: &str) -> bool {
    value == NOT_AVAILABLE || value == ERROR_MARKER
}
