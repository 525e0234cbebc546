use std::sync::Arc;

use ai_client::{extract_json_object, truncate_to_char_boundary, ChatAgent, StructuredOutput};
use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use tunecheck_common::{clamp_score, Assessment, Category, PlaylistMeta, ScoreBands};

use crate::traits::SafetyScorer;

const MAX_DESCRIPTION_BYTES: usize = 2_000;

/// The JSON object the model is asked to answer with.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Safety score from 10 (almost certainly artificial engagement) to 100 (clearly organic).
    #[serde(deserialize_with = "lenient_number")]
    #[schemars(with = "f64")]
    pub score: f64,
    /// One of "Risky", "Good", "Excellent".
    #[serde(default)]
    pub category: Option<String>,
    /// One short sentence explaining the score.
    #[serde(default)]
    pub reason: Option<String>,
    /// Two or three sentences on the signals that drove the score.
    #[serde(default)]
    pub analysis_summary: Option<String>,
}

/// Models sometimes quote numbers. Accept `"72"` as well as `72`.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("score is not representable as f64")),
        serde_json::Value::String(s) => s
            .trim()
            .trim_end_matches('%')
            .parse()
            .map_err(|_| D::Error::custom(format!("score '{s}' is not a number"))),
        other => Err(D::Error::custom(format!("score must be a number, got {other}"))),
    }
}

/// Pull a verdict out of free-form model output. `None` when there is no
/// parseable object with a score in it.
pub fn parse_verdict(content: &str) -> Option<Verdict> {
    let json = extract_json_object(content)?;
    serde_json::from_str(json).ok()
}

fn system_prompt() -> String {
    let schema = serde_json::to_string_pretty(&Verdict::strict_schema()).unwrap_or_default();
    format!(
        "You review music-streaming playlists for signs of artificial engagement: \
         bot streams, bought followers, follow-for-follow schemes and paid placement.\n\
         Judge only from the metadata you are given.\n\
         Answer with a single JSON object matching this schema and nothing else:\n{schema}"
    )
}

fn user_prompt(meta: &PlaylistMeta) -> String {
    let mut prompt = format!(
        "Title: {}\nDescription: {}\n",
        meta.title,
        truncate_to_char_boundary(&meta.description, MAX_DESCRIPTION_BYTES)
    );
    if let Some(owner) = &meta.owner {
        prompt.push_str(&format!("Owner: {owner}\n"));
    }
    if let Some(followers) = meta.follower_count {
        prompt.push_str(&format!("Followers: {followers}\n"));
    }
    if let Some(tracks) = meta.track_count {
        prompt.push_str(&format!("Tracks: {tracks}\n"));
    }
    prompt
}

fn default_reason(category: Category) -> &'static str {
    match category {
        Category::Risky => "Strong signs of artificial engagement",
        Category::Good => "Some signals require caution",
        Category::Excellent => "No signs of artificial engagement",
    }
}

/// Scores by asking a chat-completion model for a JSON verdict.
pub struct ChatScorer {
    agent: Arc<dyn ChatAgent>,
}

impl ChatScorer {
    pub fn new(agent: Arc<dyn ChatAgent>) -> Self {
        Self { agent }
    }

    /// Turn raw model output into an assessment. Unusable output becomes the
    /// fallback assessment rather than an error.
    pub fn interpret(&self, content: &str, bands: &ScoreBands) -> Assessment {
        let Some(verdict) = parse_verdict(content) else {
            warn!(
                provider = self.agent.provider(),
                model = self.agent.model(),
                response = truncate_to_char_boundary(content, 200),
                "Model answer had no usable verdict"
            );
            return Assessment::fallback(bands);
        };

        let score = clamp_score(verdict.score);
        let category = bands.category_for(score);
        if let Some(claimed) = verdict.category.as_deref() {
            if !claimed.eq_ignore_ascii_case(category.as_str()) {
                debug!(claimed, derived = %category, score, "Model category disagrees with bands");
            }
        }

        let reason = verdict
            .reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| default_reason(category).to_string());
        let summary = verdict.analysis_summary.filter(|s| !s.trim().is_empty());

        Assessment::from_score(score, bands, reason, summary)
    }
}

#[async_trait]
impl SafetyScorer for ChatScorer {
    fn name(&self) -> &'static str {
        self.agent.provider()
    }

    async fn score(&self, meta: &PlaylistMeta, bands: &ScoreBands) -> Result<Assessment> {
        debug!(provider = self.agent.provider(), model = self.agent.model(), "Requesting AI verdict");
        let content = self
            .agent
            .chat_completion(&system_prompt(), &user_prompt(meta))
            .await?;
        Ok(self.interpret(&content, bands))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verdict_from_fenced_json() {
        let v = parse_verdict("```json\n{\"score\": 82, \"category\": \"Excellent\", \"reason\": \"organic\"}\n```")
            .unwrap();
        assert_eq!(v.score, 82.0);
        assert_eq!(v.reason.as_deref(), Some("organic"));
        assert!(v.analysis_summary.is_none());
    }

    #[test]
    fn test_parse_verdict_accepts_quoted_score() {
        let v = parse_verdict(r#"Result: {"score": "35%", "analysisSummary": "bots"}"#).unwrap();
        assert_eq!(v.score, 35.0);
        assert_eq!(v.analysis_summary.as_deref(), Some("bots"));
    }

    #[test]
    fn test_parse_verdict_rejects_garbage() {
        assert!(parse_verdict("I cannot help with that.").is_none());
        assert!(parse_verdict("{\"reason\": \"no score\"}").is_none());
        assert!(parse_verdict("{\"score\": \"high\"}").is_none());
        assert!(parse_verdict("{\"score\": 80,}").is_none());
    }

    #[test]
    fn test_system_prompt_carries_schema() {
        let prompt = system_prompt();
        assert!(prompt.contains("\"score\""));
        assert!(prompt.contains("\"analysisSummary\""));
    }

    #[test]
    fn test_user_prompt_includes_known_stats() {
        let mut meta = PlaylistMeta::from_raw(Default::default());
        meta.follower_count = Some(12);
        let prompt = user_prompt(&meta);
        assert!(prompt.contains("Title: Unknown Playlist"));
        assert!(prompt.contains("Followers: 12"));
        assert!(!prompt.contains("Tracks:"));
    }
}
