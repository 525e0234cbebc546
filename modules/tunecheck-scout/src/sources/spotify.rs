use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use spotify_client::SpotifyClient;
use tunecheck_common::{PlaylistRef, RawMetadata};

use crate::traits::PlaylistSource;

/// Official Web API. Needs client credentials.
pub struct SpotifyApiSource {
    client: Arc<SpotifyClient>,
}

impl SpotifyApiSource {
    pub fn new(client: Arc<SpotifyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlaylistSource for SpotifyApiSource {
    fn name(&self) -> &'static str {
        "spotify_api"
    }

    async fn fetch(&self, playlist: &PlaylistRef) -> Result<RawMetadata> {
        let data = self.client.playlist(playlist.id()).await?;
        Ok(RawMetadata {
            image: data.cover_url().map(String::from),
            follower_count: data.follower_count(),
            track_count: data.track_count(),
            owner: data.owner_name().map(String::from),
            title: data.name,
            description: data.description.map(|d| crate::og::decode_entities(&d)),
        })
    }
}

/// Public oEmbed card. Carries a title and thumbnail, never a description.
pub struct OEmbedSource {
    client: Arc<SpotifyClient>,
}

impl OEmbedSource {
    pub fn new(client: Arc<SpotifyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlaylistSource for OEmbedSource {
    fn name(&self) -> &'static str {
        "oembed"
    }

    async fn fetch(&self, playlist: &PlaylistRef) -> Result<RawMetadata> {
        let card = self.client.oembed(&playlist.page_url()).await?;
        Ok(RawMetadata {
            title: card.title,
            image: card.thumbnail_url,
            ..Default::default()
        })
    }
}
