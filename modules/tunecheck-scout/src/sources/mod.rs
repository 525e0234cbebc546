mod html;
mod spotify;

pub use html::{AllOriginsSource, BrowserlessSource, CorsProxySource, DirectSource};
pub use spotify::{OEmbedSource, SpotifyApiSource};

use std::sync::Arc;

use tracing::{debug, info, warn};
use tunecheck_common::{PlaylistRef, RawMetadata, SourceAttempt, TunecheckError};

use crate::traits::PlaylistSource;

/// Ordered fallback chain of metadata sources, with an optional enrichment
/// source that runs alongside it.
pub struct SourceChain {
    sources: Vec<Arc<dyn PlaylistSource>>,
    enrichment: Option<Arc<dyn PlaylistSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Arc<dyn PlaylistSource>>) -> Self {
        Self {
            sources,
            enrichment: None,
        }
    }

    /// Run `source` concurrently with the chain and use it to fill gaps.
    pub fn with_enrichment(mut self, source: Arc<dyn PlaylistSource>) -> Self {
        self.enrichment = Some(source);
        self
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Try each source in order. The first success wins.
    pub async fn fetch_sequential(
        &self,
        playlist: &PlaylistRef,
    ) -> Result<RawMetadata, Vec<SourceAttempt>> {
        let mut attempts = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            debug!(source = source.name(), playlist = %playlist, "Trying source");
            match source.fetch(playlist).await {
                Ok(meta) => {
                    info!(
                        source = source.name(),
                        playlist = %playlist,
                        failed_before = attempts.len(),
                        "Fetched playlist metadata"
                    );
                    return Ok(meta);
                }
                Err(e) => {
                    warn!(source = source.name(), playlist = %playlist, error = %e, "Source failed");
                    attempts.push(SourceAttempt::new(source.name(), format!("{e:#}")));
                }
            }
        }

        Err(attempts)
    }

    /// Fetch metadata for a playlist.
    ///
    /// With enrichment configured, at most two requests are in flight: the
    /// current chain step and the enrichment fetch. Chain fields take
    /// precedence; enrichment fills what the chain left empty, or stands in
    /// for the chain entirely when every chain source failed.
    pub async fn fetch(&self, playlist: &PlaylistRef) -> Result<RawMetadata, TunecheckError> {
        let Some(enrichment) = &self.enrichment else {
            return self
                .fetch_sequential(playlist)
                .await
                .map_err(|attempts| TunecheckError::AllSourcesFailed { attempts });
        };

        let (chain, extra) = tokio::join!(self.fetch_sequential(playlist), enrichment.fetch(playlist));

        match (chain, extra) {
            (Ok(meta), Ok(extra)) => Ok(meta.or_else(extra)),
            (Ok(meta), Err(e)) => {
                debug!(source = enrichment.name(), error = %e, "Enrichment failed, using chain result");
                Ok(meta)
            }
            (Err(_), Ok(extra)) => {
                info!(source = enrichment.name(), playlist = %playlist, "Chain failed, using enrichment result");
                Ok(extra)
            }
            (Err(mut attempts), Err(e)) => {
                warn!(source = enrichment.name(), error = %e, "Enrichment failed");
                attempts.push(SourceAttempt::new(enrichment.name(), format!("{e:#}")));
                Err(TunecheckError::AllSourcesFailed { attempts })
            }
        }
    }
}
