use serde::{Deserialize, Deserializer};

// --- Accounts service ---

/// Response from `POST /api/token` with `grant_type=client_credentials`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    /// Lifetime in seconds, normally 3600.
    pub expires_in: u64,
}

// --- Web API playlist object (trimmed by the `fields` filter) ---

#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Sent as `null` for playlists without a cover.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub images: Vec<Image>,
    pub followers: Option<Followers>,
    pub tracks: Option<TrackPage>,
    pub owner: Option<Owner>,
}

impl Playlist {
    /// The API lists cover images widest first.
    pub fn cover_url(&self) -> Option<&str> {
        self.images.first().map(|i| i.url.as_str())
    }

    pub fn follower_count(&self) -> Option<u64> {
        self.followers.as_ref().map(|f| f.total)
    }

    pub fn track_count(&self) -> Option<u64> {
        self.tracks.as_ref().map(|t| t.total)
    }

    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_ref().and_then(|o| o.display_name.as_deref())
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Followers {
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    pub total: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub display_name: Option<String>,
}

// --- oEmbed ---

/// Public oEmbed payload. No auth needed, but only title and thumbnail are useful.
#[derive(Debug, Clone, Deserialize)]
pub struct OEmbed {
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub provider_name: Option<String>,
}
