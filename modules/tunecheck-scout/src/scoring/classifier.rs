use std::sync::Arc;

use ai_client::{ClassLabel, TextClassifier};
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use tunecheck_common::{clamp_score, Assessment, Category, PlaylistMeta, ScoreBands};

use crate::traits::SafetyScorer;

/// Labels whose probability counts as risk.
pub const RISK_LABELS: &[&str] = &["toxic", "negative", "spam", "offensive", "hate"];

/// Points taken off at full risk (risk 1.0 -> score 10).
const RISK_PENALTY: f64 = 90.0;

/// Highest probability among risk labels, with the label that carried it.
pub fn risk_of(labels: &[ClassLabel]) -> Option<(&str, f64)> {
    labels
        .iter()
        .filter(|l| RISK_LABELS.iter().any(|r| l.label.eq_ignore_ascii_case(r)))
        .map(|l| (l.label.as_str(), l.score))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

/// Scores with a text-classification model such as a toxicity or
/// sentiment classifier.
pub struct ClassifierScorer {
    classifier: Arc<dyn TextClassifier>,
}

impl ClassifierScorer {
    pub fn new(classifier: Arc<dyn TextClassifier>) -> Self {
        Self { classifier }
    }

    pub fn interpret(&self, labels: &[ClassLabel], bands: &ScoreBands) -> Assessment {
        if labels.is_empty() {
            warn!(model = self.classifier.model(), "Classifier returned no labels");
            return Assessment::fallback(bands);
        }

        let (label, risk) = risk_of(labels).unwrap_or(("none", 0.0));
        let risk = risk.clamp(0.0, 1.0);
        let score = clamp_score(100.0 - RISK_PENALTY * risk);
        let category = bands.category_for(score);
        debug!(label, risk, score, "Classifier risk");

        let reason = match category {
            Category::Risky => "Classifier flagged harmful or spammy language",
            Category::Good => "Classifier found some questionable language",
            Category::Excellent => "Classifier found no harmful language",
        };
        let summary = format!(
            "Model {} rated the playlist text {:.0}% {}.",
            self.classifier.model(),
            risk * 100.0,
            label.to_lowercase()
        );

        Assessment::from_score(score, bands, reason, Some(summary))
    }
}

#[async_trait]
impl SafetyScorer for ClassifierScorer {
    fn name(&self) -> &'static str {
        "classifier"
    }

    async fn score(&self, meta: &PlaylistMeta, bands: &ScoreBands) -> Result<Assessment> {
        let labels = self.classifier.classify(&meta.combined_text()).await?;
        Ok(self.interpret(&labels, bands))
    }
}
