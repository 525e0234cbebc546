use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use proxy_client::{BrowserlessClient, ProxyClient};
use tunecheck_common::{PlaylistRef, RawMetadata};

use crate::og::extract_og_tags;
use crate::traits::PlaylistSource;

/// Fetch the public page straight from the origin.
pub struct DirectSource {
    client: Arc<ProxyClient>,
}

impl DirectSource {
    pub fn new(client: Arc<ProxyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlaylistSource for DirectSource {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fetch(&self, playlist: &PlaylistRef) -> Result<RawMetadata> {
        let html = self.client.direct(&playlist.page_url()).await?;
        Ok(extract_og_tags(&html))
    }
}

/// Fetch the page through the AllOrigins relay.
pub struct AllOriginsSource {
    client: Arc<ProxyClient>,
}

impl AllOriginsSource {
    pub fn new(client: Arc<ProxyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlaylistSource for AllOriginsSource {
    fn name(&self) -> &'static str {
        "allorigins"
    }

    async fn fetch(&self, playlist: &PlaylistRef) -> Result<RawMetadata> {
        let html = self.client.allorigins(&playlist.page_url()).await?;
        Ok(extract_og_tags(&html))
    }
}

/// Fetch the page through corsproxy.io.
pub struct CorsProxySource {
    client: Arc<ProxyClient>,
}

impl CorsProxySource {
    pub fn new(client: Arc<ProxyClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlaylistSource for CorsProxySource {
    fn name(&self) -> &'static str {
        "corsproxy"
    }

    async fn fetch(&self, playlist: &PlaylistRef) -> Result<RawMetadata> {
        let html = self.client.corsproxy(&playlist.page_url()).await?;
        Ok(extract_og_tags(&html))
    }
}

/// Render the page in a hosted headless browser.
pub struct BrowserlessSource {
    client: BrowserlessClient,
}

impl BrowserlessSource {
    pub fn new(client: BrowserlessClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlaylistSource for BrowserlessSource {
    fn name(&self) -> &'static str {
        "browserless"
    }

    async fn fetch(&self, playlist: &PlaylistRef) -> Result<RawMetadata> {
        let html = self.client.content(&playlist.page_url()).await?;
        Ok(extract_og_tags(&html))
    }
}
