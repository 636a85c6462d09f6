//! Page metadata extraction from fetched HTML.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use super::social::{find_social_link, SocialPlatform};
use crate::models::NOT_AVAILABLE;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static PAGE_NAME: LazyLock<Selector> = LazyLock::new(|| selector("h1.html-h1"));
static ANY_HEADING: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static FOLLOWER_LINKS: LazyLock<Selector> = LazyLock::new(|| selector(r#"a[href*="followers"]"#));
static CATEGORY: LazyLock<Selector> = LazyLock::new(|| selector("strong.html-strong"));
static TIMELINE_SPANS: LazyLock<Selector> = LazyLock::new(|| {
    selector(r#"div[data-pagelet="TimelineFeedUnit_0"] span[dir="ltr"]"#)
});
static FEED_UNIT: LazyLock<Selector> = LazyLock::new(|| selector(r#"div[data-pagelet^="FeedUnit"]"#));
static LTR_SPANS: LazyLock<Selector> = LazyLock::new(|| selector(r#"span[dir="ltr"]"#));
static AUTO_SPANS: LazyLock<Selector> = LazyLock::new(|| selector(r#"span[dir="auto"]"#));
static OG_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(r#"meta[property="og:title"]"#));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static ANCHORS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

static FOLLOWER_COUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[0-9][0-9.,]*[KMB]?").unwrap());
static LOCATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+,\s?[A-Za-z\s]+$").unwrap());
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());

/// Longest text accepted as a location.
const MAX_LOCATION_CHARS: usize = 50;

/// Metadata read from a page, before recency classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDetails {
    pub username: String,
    pub page_name: String,
    /// Follower count as displayed, e.g. `12.5K`.
    pub followers: String,
    pub category: String,
    /// Raw last-post text, e.g. `3d` or `March 30 at 7:50 AM`.
    pub last_posted: String,
    pub location: String,
    pub email: String,
    pub instagram_url: String,
    pub tiktok_url: String,
    pub youtube_url: String,
    pub x_url: String,
}

/// Extract page metadata from HTML served for `page_url`.
///
/// Missing scalar fields become `N/A`; missing contact and social fields
/// are left empty.
pub fn extract_page(html: &str, page_url: &str) -> PageDetails {
    let document = Html::parse_document(html);
    let links = collect_links(&document);
    let social = |platform| find_social_link(&links, platform, page_url).unwrap_or_default();

    PageDetails {
        username: extract_username(&document),
        page_name: found_or_na(extract_page_name(&document), "page name", page_url),
        followers: found_or_na(extract_followers(&document), "followers", page_url),
        category: found_or_na(extract_category(&document), "category", page_url),
        last_posted: found_or_na(extract_last_posted(&document), "last posted date", page_url),
        location: found_or_na(extract_location(&document), "location", page_url),
        email: extract_email(&document).unwrap_or_default(),
        instagram_url: social(SocialPlatform::Instagram),
        tiktok_url: social(SocialPlatform::TikTok),
        youtube_url: social(SocialPlatform::YouTube),
        x_url: social(SocialPlatform::X),
    }
}

fn found_or_na(value: Option<String>, field: &str, page_url: &str) -> String {
    value.unwrap_or_else(|| {
        debug!("{} not found for: {}", field, page_url);
        NOT_AVAILABLE.to_string()
    })
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn extract_page_name(document: &Html) -> Option<String> {
    document
        .select(&PAGE_NAME)
        .next()
        .or_else(|| document.select(&ANY_HEADING).next())
        .map(element_text)
        .and_then(non_empty)
}

fn extract_followers(document: &Html) -> Option<String> {
    let text = document
        .select(&FOLLOWER_LINKS)
        .map(element_text)
        .find(|text| text.to_lowercase().contains("followers"))?;

    FOLLOWER_COUNT_PATTERN
        .find(&text)
        .map(|m| m.as_str().to_string())
}

/// The category follows the page-type label, e.g. `<strong>Page</strong> · Jazz Club`.
fn extract_category(document: &Html) -> Option<String> {
    let label = document.select(&CATEGORY).next()?;
    let sibling = label.next_sibling()?;
    let text = match sibling.value() {
        Node::Text(text) => text.trim().to_string(),
        _ => ElementRef::wrap(sibling).map(element_text)?,
    };

    non_empty(text.trim_start_matches('·').trim().to_string())
}

/// The second `ltr` span of the first feed unit holds `<when> · <audience>`.
fn extract_last_posted(document: &Html) -> Option<String> {
    let mut spans: Vec<String> = document.select(&TIMELINE_SPANS).map(element_text).collect();
    if spans.is_empty() {
        if let Some(unit) = document.select(&FEED_UNIT).next() {
            spans = unit.select(&LTR_SPANS).map(element_text).collect();
        }
    }

    let posted = spans.get(1)?.split('·').next().unwrap_or("").trim();
    non_empty(posted.to_string())
}

fn extract_location(document: &Html) -> Option<String> {
    document
        .select(&AUTO_SPANS)
        .map(element_text)
        .find(|text| LOCATION_PATTERN.is_match(text) && text.chars().count() <= MAX_LOCATION_CHARS)
}

fn extract_email(document: &Html) -> Option<String> {
    let text = match document.select(&BODY).next() {
        Some(body) => body.text().collect::<Vec<_>>().join(" "),
        None => document.root_element().text().collect::<Vec<_>>().join(" "),
    };

    EMAIL_PATTERN.find(&text).map(|m| m.as_str().to_string())
}

fn extract_username(document: &Html) -> String {
    let raw = document
        .select(&OG_TITLE)
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
        .or_else(|| document.select(&TITLE).next().map(element_text))
        .unwrap_or_default();

    clean_username(&raw)
}

/// Strip the site suffix from a page title, e.g. `Blue Note | Facebook`.
fn clean_username(title: &str) -> String {
    let head = if let Some((head, _)) = title.split_once('|') {
        head
    } else if let Some((head, _)) = title.split_once('-') {
        head
    } else {
        title
    };
    head.trim().to_string()
}

fn collect_links(document: &Html) -> Vec<String> {
    document
        .select(&ANCHORS)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_URL: &str = "https://www.facebook.com/bluenotecafe";

    const FULL_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Fallback Title - Facebook</title>
  <meta property="og:title" content="Blue Note Cafe | Facebook">
</head>
<body>
  <h1 class="html-h1">Blue Note Cafe</h1>
  <a href="https://www.facebook.com/bluenotecafe/followers/">12.5K followers</a>
  <div><strong class="html-strong">Page</strong> · Jazz Club</div>
  <span dir="auto">Intro</span>
  <span dir="auto">Columbia, Missouri</span>
  <div data-pagelet="TimelineFeedUnit_0">
    <span dir="ltr">Blue Note Cafe</span>
    <span dir="ltr">3d · Shared with Public</span>
  </div>
  <p>Bookings: bookings@bluenote.example.com</p>
  <a href="https://www.instagram.com/bluenotecafe/">Instagram</a>
  <a href="https://l.facebook.com/l.php?u=https%3A%2F%2Fwww.tiktok.com%2F%40bluenote&amp;h=abc">TikTok</a>
  <a href="/bluenotecafe/about">About</a>
  <a href="https://twitter.com/bluenote">Twitter</a>
</body>
</html>"#;

    #[test]
    fn test_extract_full_page() {
        let details = extract_page(FULL_PAGE, PAGE_URL);
        assert_eq!(details.page_name, "Blue Note Cafe");
        assert_eq!(details.username, "Blue Note Cafe");
        assert_eq!(details.followers, "12.5K");
        assert_eq!(details.category, "Jazz Club");
        assert_eq!(details.last_posted, "3d");
        assert_eq!(details.location, "Columbia, Missouri");
        assert_eq!(details.email, "bookings@bluenote.example.com");
        assert_eq!(details.instagram_url, "https://www.instagram.com/bluenotecafe/");
        assert_eq!(details.tiktok_url, "https://www.tiktok.com/@bluenote");
        assert_eq!(details.youtube_url, "");
        assert_eq!(details.x_url, "https://twitter.com/bluenote");
    }

    #[test]
    fn test_extract_empty_page() {
        let details = extract_page("<html><body></body></html>", PAGE_URL);
        assert_eq!(details.page_name, NOT_AVAILABLE);
        assert_eq!(details.followers, NOT_AVAILABLE);
        assert_eq!(details.category, NOT_AVAILABLE);
        assert_eq!(details.last_posted, NOT_AVAILABLE);
        assert_eq!(details.location, NOT_AVAILABLE);
        assert_eq!(details.username, "");
        assert_eq!(details.email, "");
        assert_eq!(details.instagram_url, "");
    }

    #[test]
    fn test_fallback_selectors() {
        let html = r#"<html><head><title>River Books - Home</title></head><body>
            <h1>River Books</h1>
            <div data-pagelet="FeedUnit_2">
              <span dir="ltr">River Books</span>
              <span dir="ltr">March 30 at 7:50 AM · Public</span>
            </div>
        </body></html>"#;
        let details = extract_page(html, PAGE_URL);
        assert_eq!(details.page_name, "River Books");
        assert_eq!(details.username, "River Books");
        assert_eq!(details.last_posted, "March 30 at 7:50 AM");
    }

    #[test]
    fn test_followers_requires_followers_text() {
        let html = r#"<html><body>
            <a href="/page/followers">See all</a>
            <a href="/page/followers">3M Followers</a>
        </body></html>"#;
        assert_eq!(extract_page(html, PAGE_URL).followers, "3M");
    }

    #[test]
    fn test_location_rejects_long_text() {
        let long = format!("{}, Somewhere", "A".repeat(60));
        let html = format!(r#"<html><body><span dir="auto">{}</span></body></html>"#, long);
        assert_eq!(extract_page(&html, PAGE_URL).location, NOT_AVAILABLE);
    }

    #[test]
    fn test_clean_username() {
        assert_eq!(clean_username("Blue Note | Facebook"), "Blue Note");
        assert_eq!(clean_username("Blue Note - Home"), "Blue Note");
        assert_eq!(clean_username("  Blue Note  "), "Blue Note");
        assert_eq!(clean_username(""), "");
    }
}
