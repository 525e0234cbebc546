use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::TunecheckError;
use crate::types::{PlaylistMeta, RawMetadata};

/// Matches both web links and `spotify:playlist:` URIs.
static PLAYLIST_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:playlist/|spotify:playlist:)([A-Za-z0-9]+)").expect("Invalid regex")
});

static URL_IN_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("Invalid regex"));

const PAGE_BASE: &str = "https://open.spotify.com/playlist/";

/// Title shown for submissions that carry no playlist link.
pub const FREE_TEXT_TITLE: &str = "Free-text submission";
const FREE_TEXT_DESCRIPTION_CHARS: usize = 300;

/// A validated playlist identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaylistRef {
    id: String,
}

impl PlaylistRef {
    /// Extract the playlist id from anything that contains `playlist/<id>`.
    pub fn parse(input: &str) -> Result<Self, TunecheckError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TunecheckError::MissingInput);
        }
        PLAYLIST_ID_RE
            .captures(input)
            .and_then(|c| c.get(1))
            .map(|m| Self {
                id: m.as_str().to_string(),
            })
            .ok_or(TunecheckError::InvalidPlaylistUrl)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The canonical public page, the only URL ever fetched.
    pub fn page_url(&self) -> String {
        format!("{PAGE_BASE}{}", self.id)
    }
}

impl fmt::Display for PlaylistRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// What the caller submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistInput {
    Link(String),
    Text(String),
}

impl PlaylistInput {
    /// Pick the input from the two request fields. A non-blank link wins.
    pub fn from_fields(
        playlist_url: Option<&str>,
        playlist_text: Option<&str>,
    ) -> Result<Self, TunecheckError> {
        let url = playlist_url.map(str::trim).filter(|s| !s.is_empty());
        let text = playlist_text.map(str::trim).filter(|s| !s.is_empty());
        match (url, text) {
            (Some(url), _) => Ok(PlaylistInput::Link(url.to_string())),
            (None, Some(text)) => Ok(PlaylistInput::Text(text.to_string())),
            (None, None) => Err(TunecheckError::MissingInput),
        }
    }

    /// Decide what to analyze. Text that contains a playlist link is treated
    /// as that link; any other text is scored as-is without fetching.
    pub fn resolve(&self) -> Result<AnalysisTarget, TunecheckError> {
        match self {
            PlaylistInput::Link(url) => PlaylistRef::parse(url).map(AnalysisTarget::Playlist),
            PlaylistInput::Text(text) => {
                if let Ok(playlist) = PlaylistRef::parse(text) {
                    return Ok(AnalysisTarget::Playlist(playlist));
                }
                if URL_IN_TEXT_RE.is_match(text) && text.contains("spotify.com") {
                    return Err(TunecheckError::InvalidPlaylistUrl);
                }
                Ok(AnalysisTarget::FreeText(text.clone()))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisTarget {
    Playlist(PlaylistRef),
    FreeText(String),
}

impl AnalysisTarget {
    /// Cache key; free text is never cached.
    pub fn cache_key(&self) -> Option<&str> {
        match self {
            AnalysisTarget::Playlist(playlist) => Some(playlist.id()),
            AnalysisTarget::FreeText(_) => None,
        }
    }
}

/// Metadata for a free-text submission: the text becomes the description.
pub fn free_text_meta(text: &str) -> PlaylistMeta {
    let mut description: String = text.chars().take(FREE_TEXT_DESCRIPTION_CHARS).collect();
    if description.len() < text.len() {
        description.push('…');
    }
    PlaylistMeta::from_raw(RawMetadata {
        title: Some(FREE_TEXT_TITLE.to_string()),
        description: Some(description),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_IMAGE;

    #[test]
    fn test_parse_web_link() {
        let p = PlaylistRef::parse("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc")
            .unwrap();
        assert_eq!(p.id(), "37i9dQZF1DXcBWIGoYBM5M");
        assert_eq!(
            p.page_url(),
            "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M"
        );
    }

    #[test]
    fn test_parse_localized_link_and_uri() {
        let p = PlaylistRef::parse("https://open.spotify.com/intl-de/playlist/abc123").unwrap();
        assert_eq!(p.id(), "abc123");
        let p = PlaylistRef::parse("spotify:playlist:XYZ789").unwrap();
        assert_eq!(p.id(), "XYZ789");
    }

    #[test]
    fn test_parse_rejects_non_playlist() {
        assert!(matches!(
            PlaylistRef::parse("https://open.spotify.com/album/abc"),
            Err(TunecheckError::InvalidPlaylistUrl)
        ));
        assert!(matches!(
            PlaylistRef::parse("   "),
            Err(TunecheckError::MissingInput)
        ));
    }

    #[test]
    fn test_from_fields_prefers_link() {
        let input = PlaylistInput::from_fields(Some(" https://x/playlist/a "), Some("hello")).unwrap();
        assert_eq!(input, PlaylistInput::Link("https://x/playlist/a".into()));

        let input = PlaylistInput::from_fields(Some(""), Some("hello")).unwrap();
        assert_eq!(input, PlaylistInput::Text("hello".into()));

        assert!(matches!(
            PlaylistInput::from_fields(None, Some("  ")),
            Err(TunecheckError::MissingInput)
        ));
    }

    #[test]
    fn test_text_with_link_resolves_to_playlist() {
        let input = PlaylistInput::Text(
            "check this out https://open.spotify.com/playlist/abc123 thanks".into(),
        );
        let target = input.resolve().unwrap();
        assert_eq!(target.cache_key(), Some("abc123"));
    }

    #[test]
    fn test_plain_text_resolves_to_free_text() {
        let input = PlaylistInput::Text("Get 10k followers fast 💰".into());
        let target = input.resolve().unwrap();
        assert_eq!(target, AnalysisTarget::FreeText("Get 10k followers fast 💰".into()));
        assert!(target.cache_key().is_none());
    }

    #[test]
    fn test_text_with_non_playlist_spotify_link_is_invalid() {
        let input = PlaylistInput::Text("https://open.spotify.com/track/abc".into());
        assert!(matches!(
            input.resolve(),
            Err(TunecheckError::InvalidPlaylistUrl)
        ));
    }

    #[test]
    fn test_free_text_meta() {
        let meta = free_text_meta("short text");
        assert_eq!(meta.title, FREE_TEXT_TITLE);
        assert_eq!(meta.description, "short text");
        assert_eq!(meta.image, DEFAULT_IMAGE);

        let long = "a".repeat(400);
        let meta = free_text_meta(&long);
        assert_eq!(meta.description.chars().count(), FREE_TEXT_DESCRIPTION_CHARS + 1);
        assert!(meta.description.ends_with('…'));
    }
}
