//! Page fetching and metadata extraction.

pub mod extract;
pub mod fetcher;
mod http_client;
pub mod social;

pub use extract::{extract_page, PageDetails};
pub use fetcher::{FetchError, FetchedPage, PageFetcher};
pub use http_client::{resolve_user_agent, HttpFetcher, USER_AGENT};
pub use social::{clean_social_link, find_social_link, SocialPlatform};
