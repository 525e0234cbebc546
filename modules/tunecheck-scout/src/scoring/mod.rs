mod chat;
mod classifier;
mod heuristic;

pub use chat::{parse_verdict, ChatScorer, Verdict};
pub use classifier::{risk_of, ClassifierScorer, RISK_LABELS};
pub use heuristic::{HeuristicScorer, BOT_INDICATORS};

use std::sync::Arc;

use tracing::{info, warn};
use tunecheck_common::{Assessment, PlaylistMeta, ScoreBands};

use crate::traits::SafetyScorer;

/// Scorers tried in order until one answers.
pub struct ScoringChain {
    scorers: Vec<Arc<dyn SafetyScorer>>,
    bands: ScoreBands,
}

impl ScoringChain {
    pub fn new(scorers: Vec<Arc<dyn SafetyScorer>>, bands: ScoreBands) -> Self {
        Self { scorers, bands }
    }

    /// An AI primary backed by the heuristic scorer.
    pub fn with_heuristic_backstop(primary: Arc<dyn SafetyScorer>, bands: ScoreBands) -> Self {
        Self::new(vec![primary, Arc::new(HeuristicScorer::new())], bands)
    }

    pub fn bands(&self) -> &ScoreBands {
        &self.bands
    }

    pub fn scorer_names(&self) -> Vec<&'static str> {
        self.scorers.iter().map(|s| s.name()).collect()
    }

    /// Never fails: when every scorer errors the fallback assessment is used.
    pub async fn assess(&self, meta: &PlaylistMeta) -> Assessment {
        for scorer in &self.scorers {
            match scorer.score(meta, &self.bands).await {
                Ok(assessment) => {
                    info!(
                        scorer = scorer.name(),
                        score = assessment.score,
                        category = %assessment.category,
                        "Playlist scored"
                    );
                    return assessment;
                }
                Err(e) => {
                    warn!(scorer = scorer.name(), error = %e, "Scorer failed, trying next");
                }
            }
        }

        warn!("All scorers failed, using fallback assessment");
        Assessment::fallback(&self.bands)
    }
}
