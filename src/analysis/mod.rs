//! Interpretation of loosely structured scraped text.
//!
//! - `recency`: last-post timestamp text to an activity verdict
//! - `followers`: abbreviated follower counts to plain integers

mod followers;
mod months;
mod recency;

pub use followers::normalize_count;
pub use months::month_from_name;
pub use recency::{classify, RecencyClassifier, Verdict, DEFAULT_WINDOW_DAYS};
