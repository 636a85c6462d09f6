//! Social profile link discovery.

use tracing::warn;
use url::Url;

/// Platforms whose profile links are collected from a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialPlatform {
    Instagram,
    TikTok,
    YouTube,
    X,
}

impl SocialPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::TikTok => "tiktok",
            Self::YouTube => "youtube",
            Self::X => "x",
        }
    }

    fn domains(&self) -> &'static [&'static str] {
        match self {
            Self::Instagram => &["instagram.com"],
            Self::TikTok => &["tiktok.com"],
            Self::YouTube => &["youtube.com", "youtu.be"],
            Self::X => &["twitter.com", "x.com"],
        }
    }

    /// Whether `host` is one of the platform's domains or a subdomain of one.
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.domains()
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
    }
}

/// Find the first usable link to `platform` among the page's anchors.
pub fn find_social_link(links: &[String], platform: SocialPlatform, base_url: &str) -> Option<String> {
    links
        .iter()
        .filter_map(|link| clean_social_link(link, platform, base_url))
        .next()
}

/// Resolve a candidate link and keep it only if it points at `platform`.
///
/// Relative links are resolved against `base_url`, outbound redirect links
/// (`l.facebook.com/l.php?u=...`) are unwrapped, and obfuscated `@l.php`
/// links are dropped.
pub fn clean_social_link(link: &str, platform: SocialPlatform, base_url: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    let resolved = resolve_link(link, base_url)?;
    let target = unwrap_redirect(resolved);
    if !target.host_str().is_some_and(|host| platform.matches_host(host)) {
        return None;
    }

    if link.contains("@l.php") {
        warn!("Obfuscated link found for {}: {}", platform.as_str(), link);
        return None;
    }

    Some(target.to_string())
}

fn resolve_link(link: &str, base_url: &str) -> Option<Url> {
    match Url::parse(link) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(base_url).ok()?.join(link).ok(),
        Err(_) => None,
    }
}

fn unwrap_redirect(url: Url) -> Url {
    let is_redirect = url
        .host_str()
        .is_some_and(|host| host.ends_with("facebook.com"))
        && url.path() == "/l.php";
    if !is_redirect {
        return url;
    }

    let target = url
        .query_pairs()
        .find(|(key, _)| key == "u")
        .and_then(|(_, value)| Url::parse(&value).ok());
    target.unwrap_or(url)
}
