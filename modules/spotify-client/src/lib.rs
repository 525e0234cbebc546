pub mod error;
pub mod types;

pub use error::{Result, SpotifyError};
pub use types::{OEmbed, Playlist, TokenResponse};

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

const ACCOUNTS_URL: &str = "https://accounts.spotify.com/api/token";
const API_URL: &str = "https://api.spotify.com/v1";
const OEMBED_URL: &str = "https://open.spotify.com/oembed";

/// Only ask the Web API for what the safety check reads.
const PLAYLIST_FIELDS: &str =
    "name,description,images(url,width,height),followers(total),tracks(total),owner(display_name)";

/// Refresh this long before the advertised expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn from_response(resp: TokenResponse, now: Instant) -> Self {
        let lifetime = Duration::from_secs(resp.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        Self {
            access_token: resp.access_token,
            expires_at: now + lifetime,
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Credentials for the client-credentials grant.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

pub struct SpotifyClient {
    client: reqwest::Client,
    credentials: Option<Credentials>,
    token: Mutex<Option<CachedToken>>,
    api_url: String,
    accounts_url: String,
    oembed_url: String,
}

impl SpotifyClient {
    /// A client without credentials can still call `oembed`.
    pub fn new(client: reqwest::Client, credentials: Option<Credentials>) -> Self {
        Self {
            client,
            credentials,
            token: Mutex::new(None),
            api_url: API_URL.to_string(),
            accounts_url: ACCOUNTS_URL.to_string(),
            oembed_url: OEMBED_URL.to_string(),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_accounts_url(mut self, url: impl Into<String>) -> Self {
        self.accounts_url = url.into();
        self
    }

    pub fn with_oembed_url(mut self, url: impl Into<String>) -> Self {
        self.oembed_url = url.into();
        self
    }

    /// Return a cached app token, requesting a new one when it is stale.
    async fn access_token(&self) -> Result<String> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or_else(|| SpotifyError::Auth("no client credentials configured".into()))?;

        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.is_fresh(Instant::now()) {
                return Ok(cached.access_token.clone());
            }
        }

        tracing::debug!("Requesting Spotify client-credentials token");
        let resp = self
            .client
            .post(&self.accounts_url)
            .basic_auth(&creds.client_id, Some(&creds.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SpotifyError::Auth(format!("token request failed ({status}): {body}")));
        }

        let token: TokenResponse = resp.json().await?;
        let cached = CachedToken::from_response(token, Instant::now());
        let access_token = cached.access_token.clone();
        *guard = Some(cached);
        Ok(access_token)
    }

    /// Fetch public playlist metadata through the Web API.
    pub async fn playlist(&self, playlist_id: &str) -> Result<Playlist> {
        let token = self.access_token().await?;
        let url = playlist_endpoint(&self.api_url, playlist_id)?;

        let resp = self.client.get(url).bearer_auth(&token).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                // Revoked early; drop it so the next call re-authenticates.
                *self.token.lock().await = None;
            }
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let playlist: Playlist = resp.json().await?;
        tracing::debug!(
            playlist_id,
            followers = ?playlist.follower_count(),
            tracks = ?playlist.track_count(),
            "Fetched playlist from Web API"
        );
        Ok(playlist)
    }

    /// Fetch the public oEmbed card for a playlist page.
    pub async fn oembed(&self, page_url: &str) -> Result<OEmbed> {
        let url = url::Url::parse_with_params(&self.oembed_url, &[("url", page_url)])
            .map_err(|e| SpotifyError::Parse(format!("invalid oEmbed URL: {e}")))?;

        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SpotifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }
}

fn playlist_endpoint(api_url: &str, playlist_id: &str) -> Result<url::Url> {
    let base = format!("{}/playlists/{}", api_url.trim_end_matches('/'), playlist_id);
    url::Url::parse_with_params(&base, &[("fields", PLAYLIST_FIELDS)])
        .map_err(|e| SpotifyError::Parse(format!("invalid playlist URL: {e}")))
}
