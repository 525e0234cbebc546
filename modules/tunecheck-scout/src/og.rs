use std::sync::LazyLock;

use regex::Regex;
use tunecheck_common::RawMetadata;

/// Only the document head is scanned, capped at this many bytes.
const HEAD_LIMIT: usize = 50_000;

// property/name before content
static OG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta\s+(?:[^>]*?\s)?(?:property|name)\s*=\s*["']og:(\w+)["'][^>]*?\scontent\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*/?\s*>"#,
    )
    .expect("Invalid regex")
});

// content before property/name
static OG_REV_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta\s+(?:[^>]*?\s)?content\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*?\s(?:property|name)\s*=\s*["']og:(\w+)["'][^>]*/?\s*>"#,
    )
    .expect("Invalid regex")
});

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title[^>]*>([^<]+)</title>").expect("Invalid regex"));

/// Read `og:title`, `og:description` and `og:image` out of an HTML page.
///
/// Tags are accepted in either attribute order. The first occurrence of each
/// key wins. Missing tags stay `None`.
pub fn extract_og_tags(html: &str) -> RawMetadata {
    let head = head_section(html);

    let mut meta = RawMetadata::default();
    let mut assign = |key: &str, value: &str| {
        let slot = match key.to_ascii_lowercase().as_str() {
            "title" => &mut meta.title,
            "description" => &mut meta.description,
            "image" => &mut meta.image,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(decode_entities(value.trim()));
        }
    };

    // Content is captured by group 2 or 3 depending on the quote style.
    for cap in OG_RE.captures_iter(head) {
        if let Some(value) = cap.get(2).or_else(|| cap.get(3)) {
            assign(&cap[1], value.as_str());
        }
    }
    for cap in OG_REV_RE.captures_iter(head) {
        if let Some(value) = cap.get(1).or_else(|| cap.get(2)) {
            assign(&cap[3], value.as_str());
        }
    }

    if meta.title.is_none() {
        meta.title = TITLE_RE
            .captures(head)
            .map(|cap| decode_entities(cap[1].trim()));
    }

    meta
}

fn head_section(html: &str) -> &str {
    let limited = truncate_at_char_boundary(html, HEAD_LIMIT);
    match limited.find("</head>") {
        Some(end) => &limited[..end],
        None => limited,
    }
}

fn truncate_at_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Decode the handful of entities that show up in OG attribute values.
pub fn decode_entities(value: &str) -> String {
    // &amp; last so "&amp;quot;" stays "&quot;"
    value
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPOTIFY_HEAD: &str = r#"<!DOCTYPE html><html><head>
        <title>Lo-Fi Beats | Spotify Playlist</title>
        <meta property="og:title" content="Lo-Fi Beats"/>
        <meta property="og:description" content="Playlist &#x27;Chill&#x27; &amp; study &middot; 85 songs"/>
        <meta property="og:image" content="https://i.scdn.co/image/ab67706c0000da84"/>
        </head><body><meta property="og:title" content="body title"/></body></html>"#;

    #[test]
    fn test_extracts_og_tags() {
        let meta = extract_og_tags(SPOTIFY_HEAD);
        assert_eq!(meta.title.as_deref(), Some("Lo-Fi Beats"));
        assert_eq!(
            meta.description.as_deref(),
            Some("Playlist 'Chill' & study &middot; 85 songs")
        );
        assert_eq!(
            meta.image.as_deref(),
            Some("https://i.scdn.co/image/ab67706c0000da84")
        );
    }

    #[test]
    fn test_content_before_property() {
        let html = r#"<head><meta content="Reversed" name="og:title"><meta content="https://img" property="og:image"></head>"#;
        let meta = extract_og_tags(html);
        assert_eq!(meta.title.as_deref(), Some("Reversed"));
        assert_eq!(meta.image.as_deref(), Some("https://img"));
        assert!(meta.description.is_none());
    }

    #[test]
    fn test_apostrophes_inside_double_quotes() {
        let html = r#"<head><meta property="og:title" content="Today's Top Hits"/>
            <meta property="og:description" content="Rock 'n' roll classics"/>
            <meta content='Say "hi"' property='og:image'></head>"#;
        let meta = extract_og_tags(html);
        assert_eq!(meta.title.as_deref(), Some("Today's Top Hits"));
        assert_eq!(meta.description.as_deref(), Some("Rock 'n' roll classics"));
        assert_eq!(meta.image.as_deref(), Some("Say \"hi\""));
    }

    #[test]
    fn test_title_tag_fallback() {
        let html = "<html><head><TITLE> Road Trip &amp; Chill </TITLE></head></html>";
        let meta = extract_og_tags(html);
        assert_eq!(meta.title.as_deref(), Some("Road Trip & Chill"));
        assert!(meta.image.is_none());
    }

    #[test]
    fn test_ignores_body_tags() {
        let html = r#"<html><head></head><body><meta property="og:title" content="Body"/></body></html>"#;
        assert!(extract_og_tags(html).title.is_none());
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(extract_og_tags(""), RawMetadata::default());
    }

    #[test]
    fn test_head_limit_respects_char_boundaries() {
        let html = "é".repeat(HEAD_LIMIT);
        assert!(extract_og_tags(&html).title.is_none());
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("&quot;a&quot; &lt;b&gt;"), "\"a\" <b>");
        assert_eq!(decode_entities("&amp;quot;"), "&quot;");
        assert_eq!(decode_entities("it&#39;s"), "it's");
    }
}
