use anyhow::Result;
use async_trait::async_trait;

use tunecheck_common::{clamp_score, Assessment, Category, PlaylistMeta, ScoreBands};

use crate::traits::SafetyScorer;

/// Substrings that tend to show up on playlists built for artificial
/// engagement, with how much each one counts.
pub const BOT_INDICATORS: &[(&str, f64)] = &[
    ("bot", 0.8),
    ("fake", 0.7),
    ("stream", 0.6),
    ("follow", 0.5),
    ("like", 0.5),
    ("subscriber", 0.6),
    ("promotion", 0.4),
    ("💰", 0.7),
    ("🎵", 0.3),
    ("🔥", 0.3),
];

/// Points taken off per unit of indicator weight.
const PENALTY_PER_WEIGHT: f64 = 30.0;

/// Keyword-pattern scorer. Needs no network and never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    /// Indicators present in the title or description, in table order.
    pub fn detect(title: &str, description: &str) -> Vec<(&'static str, f64)> {
        let title = title.to_lowercase();
        let description = description.to_lowercase();
        BOT_INDICATORS
            .iter()
            .filter(|(pattern, _)| title.contains(pattern) || description.contains(pattern))
            .copied()
            .collect()
    }

    pub fn assess(meta: &PlaylistMeta, bands: &ScoreBands) -> Assessment {
        let detected = Self::detect(&meta.title, &meta.description);
        let weight: f64 = detected.iter().map(|(_, w)| w).sum();
        let score = clamp_score(100.0 - weight * PENALTY_PER_WEIGHT);
        let category = bands.category_for(score);

        let mut summary = format!(
            "This playlist \"{}\" appears to be {}. ",
            meta.title,
            category.as_str().to_lowercase()
        );
        if !detected.is_empty() {
            let names: Vec<&str> = detected.iter().map(|(p, _)| *p).collect();
            summary.push_str(&format!("Detected patterns: {}. ", names.join(", ")));
        }
        summary.push_str(match category {
            Category::Excellent => {
                "The playlist shows organic characteristics with no significant bot activity detected in the metadata."
            }
            Category::Good => "Some indicators require attention, but overall appears mostly legitimate.",
            Category::Risky => "Multiple risk factors detected suggesting potential artificial engagement.",
        });

        let reason = match category {
            Category::Risky => "Multiple bot patterns detected",
            Category::Good => "Some patterns require caution",
            Category::Excellent => "Clean and organic playlist",
        };

        Assessment::from_score(score, bands, reason, Some(summary))
    }
}

#[async_trait]
impl SafetyScorer for HeuristicScorer {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn score(&self, meta: &PlaylistMeta, bands: &ScoreBands) -> Result<Assessment> {
        Ok(Self::assess(meta, bands))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunecheck_common::RawMetadata;

    fn meta(title: &str, description: &str) -> PlaylistMeta {
        PlaylistMeta::from_raw(RawMetadata {
            title: Some(title.into()),
            description: Some(description.into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_clean_playlist_is_excellent() {
        let a = HeuristicScorer::assess(&meta("Road Trip", "Songs for the highway"), &ScoreBands::STANDARD);
        assert_eq!(a.score, 100);
        assert_eq!(a.category, Category::Excellent);
        assert_eq!(a.reason, "Clean and organic playlist");
        assert_eq!(
            a.analysis_summary.as_deref(),
            Some("This playlist \"Road Trip\" appears to be excellent. The playlist shows organic characteristics with no significant bot activity detected in the metadata.")
        );
    }

    #[test]
    fn test_pattern_weights() {
        // follow = 0.5 -> 100 - 15 = 85, still excellent
        let a = HeuristicScorer::assess(&meta("Follow me", ""), &ScoreBands::STANDARD);
        assert_eq!(a.score, 85);
        assert_eq!(a.category, Category::Excellent);

        // bot + fake = 1.5 -> 55
        let a = HeuristicScorer::assess(&meta("Bot playlist", "totally fake"), &ScoreBands::STANDARD);
        assert_eq!(a.score, 55);
        assert_eq!(a.category, Category::Good);
        assert_eq!(a.reason, "Some patterns require caution");
        assert_eq!(
            a.analysis_summary.as_deref(),
            Some("This playlist \"Bot playlist\" appears to be good. Detected patterns: bot, fake. Some indicators require attention, but overall appears mostly legitimate.")
        );
    }

    #[test]
    fn test_many_patterns_clamp_to_floor() {
        let a = HeuristicScorer::assess(
            &meta("💰 Stream bot 🔥", "Follow, like and subscriber promotion, fake 🎵"),
            &ScoreBands::STANDARD,
        );
        assert_eq!(a.score, 10);
        assert_eq!(a.category, Category::Risky);
        assert_eq!(a.reason, "Multiple bot patterns detected");
        assert!(a
            .analysis_summary
            .unwrap()
            .ends_with("Multiple risk factors detected suggesting potential artificial engagement."));
    }

    #[test]
    fn test_each_pattern_counted_once() {
        let once = HeuristicScorer::detect("bot", "");
        let twice = HeuristicScorer::detect("bot bot", "bot");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_substring() {
        let detected = HeuristicScorer::detect("STREAMING Hits", "Liked songs");
        let names: Vec<_> = detected.iter().map(|(p, _)| *p).collect();
        assert_eq!(names, vec!["stream", "like"]);
    }

    #[test]
    fn test_lenient_bands_change_category() {
        // stream + like = 1.1 -> 67
        let m = meta("Streaming", "liked");
        let standard = HeuristicScorer::assess(&m, &ScoreBands::STANDARD);
        let lenient = HeuristicScorer::assess(&m, &ScoreBands::LENIENT);
        assert_eq!(standard.score, 67);
        assert_eq!(standard.category, Category::Good);
        assert_eq!(lenient.category, Category::Excellent);
    }
}
