//! Data models for pagecheck.

mod page;

pub use page::{is_placeholder, PageRecord, PageStatus, ERROR_MARKER, NOT_AVAILABLE};
