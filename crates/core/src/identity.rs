//! Video identity resolution.
//!
//! Maps any page URL to a stable key for "this video". Platform rules are tried
//! in order; the first capture group of the matching rule is the platform ID.
//! URLs that match no rule are keyed by a hash of the whole URL, so derivation
//! never fails.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Youtube,
    Netflix,
    Prime,
    Twitch,
    Other,
}

impl Platform {
    pub fn tag(&self) -> &'static str {
        match self {
            Platform::Youtube => "yt",
            Platform::Netflix => "nf",
            Platform::Prime => "prime",
            Platform::Twitch => "twitch",
            Platform::Other => "other",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "yt" => Some(Platform::Youtube),
            "nf" => Some(Platform::Netflix),
            "prime" => Some(Platform::Prime),
            "twitch" => Some(Platform::Twitch),
            "other" => Some(Platform::Other),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Youtube => "YouTube",
            Platform::Netflix => "Netflix",
            Platform::Prime => "Prime Video",
            Platform::Twitch => "Twitch",
            Platform::Other => "Other",
        }
    }
}

/// Opaque `<tag>_<id>` key identifying one video across visits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoIdentity(String);

impl VideoIdentity {
    pub fn new(platform: Platform, id: &str) -> Self {
        Self(format!("{}_{}", platform.tag(), id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Platform that produced this identity, read back from the tag prefix.
    pub fn platform(&self) -> Option<Platform> {
        self.0
            .split_once('_')
            .and_then(|(tag, _)| Platform::from_tag(tag))
    }
}

impl fmt::Display for VideoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct Rule {
    platform: Platform,
    pattern: Regex,
}

// Domains match case-insensitively, captured IDs keep their case.
static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    [
        (Platform::Youtube, r"[?&]v=([^&]+)"),
        (Platform::Netflix, r"(?i:netflix\.com)/watch/([0-9]+)"),
        (Platform::Prime, r"(?i:amazon\.com)/.*/([A-Z0-9]+)"),
        (Platform::Twitch, r"(?i:twitch\.tv)/videos/([0-9]+)"),
    ]
    .into_iter()
    .map(|(platform, pattern)| Rule {
        platform,
        pattern: Regex::new(pattern).expect("identity rule pattern must compile"),
    })
    .collect()
});

/// Derive the identity of the video behind `url`. Pure and total.
pub fn derive_identity(url: &str) -> VideoIdentity {
    for rule in RULES.iter() {
        if let Some(id) = rule.pattern.captures(url).and_then(|caps| caps.get(1)) {
            return VideoIdentity::new(rule.platform, id.as_str());
        }
    }
    VideoIdentity::new(Platform::Other, &stable_hash(url))
}

/// 32-bit polynomial (x31) hash over UTF-16 code units, as absolute value in base 36.
pub fn stable_hash(input: &str) -> String {
    let hash = input.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    to_base36(hash.unsigned_abs())
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_watch_url() {
        let id = derive_identity("https://youtube.com/watch?v=abc123");
        assert_eq!(id.as_str(), "yt_abc123");
        assert_eq!(id.platform(), Some(Platform::Youtube));
    }

    #[test]
    fn youtube_ignores_extra_params_and_order() {
        let plain = derive_identity("https://www.youtube.com/watch?v=AAA");
        let listed = derive_identity("https://www.youtube.com/watch?v=AAA&list=PL1");
        let reordered = derive_identity("https://www.youtube.com/watch?list=PL1&t=42&v=AAA");
        assert_eq!(plain.as_str(), "yt_AAA");
        assert_eq!(plain, listed);
        assert_eq!(plain, reordered);
    }

    #[test]
    fn v_param_must_be_a_query_param() {
        // `dev=` is not `v=`
        let id = derive_identity("https://example.com/page?dev=1");
        assert_eq!(id.platform(), Some(Platform::Other));
    }

    #[test]
    fn netflix_watch_path() {
        let id = derive_identity("https://www.netflix.com/watch/80100172?trackId=1");
        assert_eq!(id.as_str(), "nf_80100172");
    }

    #[test]
    fn amazon_catalog_id_keeps_case() {
        let id = derive_identity("https://www.Amazon.com/gp/video/detail/B08XYZ12AB/ref=atv_dp");
        assert_eq!(id.as_str(), "prime_B08XYZ12AB");
    }

    #[test]
    fn twitch_videos_path() {
        assert_eq!(
            derive_identity("https://twitch.tv/videos/987").as_str(),
            "twitch_987"
        );
        assert_eq!(
            derive_identity("https://www.TWITCH.tv/videos/123456?t=1h").as_str(),
            "twitch_123456"
        );
    }

    #[test]
    fn domain_is_case_insensitive() {
        let id = derive_identity("HTTPS://WWW.NETFLIX.COM/watch/42");
        assert_eq!(id.as_str(), "nf_42");
    }

    #[test]
    fn rule_order_prefers_query_param() {
        let id = derive_identity("https://www.netflix.com/watch/42?v=zzz");
        assert_eq!(id.as_str(), "yt_zzz");
    }

    #[test]
    fn unknown_url_hashes_deterministically() {
        let first = derive_identity("https://example.com/x");
        let second = derive_identity("https://example.com/x");
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "other_se6ljd");
        assert_ne!(first, derive_identity("https://example.com/y"));
    }

    #[test]
    fn empty_and_malformed_urls_still_resolve() {
        assert_eq!(derive_identity("").as_str(), "other_0");
        let garbage = derive_identity("not a url at all :: %%%");
        assert_eq!(garbage.platform(), Some(Platform::Other));
    }

    #[test]
    fn stable_hash_matches_known_values() {
        assert_eq!(stable_hash(""), "0");
        assert_eq!(stable_hash("a"), "2p");
        assert_eq!(stable_hash("hello"), "1n1e4y");
        // surrogate pair hashes as two code units
        assert_eq!(stable_hash("😀"), "11zz7");
    }
}
