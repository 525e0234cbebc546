// Trait seams for the analysis pipeline.
//
// PlaylistSource: one way of getting playlist metadata (page scrape, relay, Web API).
// SafetyScorer: one way of turning metadata into a score.
//
// Both are object-safe so the Analyzer can hold ordered lists of them and tests
// can swap in the fakes from `testing`.

use anyhow::Result;
use async_trait::async_trait;

use tunecheck_common::{Assessment, PlaylistMeta, PlaylistRef, RawMetadata, ScoreBands};

#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Short stable name, used in logs and in the failure details.
    fn name(&self) -> &'static str;

    async fn fetch(&self, playlist: &PlaylistRef) -> Result<RawMetadata>;
}

#[async_trait]
pub trait SafetyScorer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Score the metadata. `Err` means the scorer could not answer at all and
    /// the next scorer should be tried.
    async fn score(&self, meta: &PlaylistMeta, bands: &ScoreBands) -> Result<Assessment>;
}
