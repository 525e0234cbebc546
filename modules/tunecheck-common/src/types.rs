use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TunecheckError;

pub const DEFAULT_TITLE: &str = "Unknown Playlist";
pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_IMAGE: &str =
    "https://images.unsplash.com/photo-1493225457124-a3eb161ffa5f?w=300&h=300&fit=crop";

pub const MIN_SCORE: u8 = 10;
pub const MAX_SCORE: u8 = 100;
/// Assigned when no scorer produced a usable number.
pub const NEUTRAL_SCORE: u8 = 50;

// =============================================================================
// Category & bands
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Risky,
    Good,
    Excellent,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Risky => "Risky",
            Category::Good => "Good",
            Category::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two cutoffs that turn a score into a category.
///
/// `Risky` below `risky_below`, `Excellent` from `excellent_from` upwards,
/// `Good` in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBands {
    risky_below: u8,
    excellent_from: u8,
}

impl ScoreBands {
    /// Risky < 40, Good 40–69, Excellent ≥ 70.
    pub const STANDARD: ScoreBands = ScoreBands {
        risky_below: 40,
        excellent_from: 70,
    };

    /// Risky ≤ 40, Good 41–60, Excellent > 60.
    pub const LENIENT: ScoreBands = ScoreBands {
        risky_below: 41,
        excellent_from: 61,
    };

    pub fn new(risky_below: u8, excellent_from: u8) -> Result<Self, TunecheckError> {
        if risky_below > excellent_from {
            return Err(TunecheckError::InvalidBands {
                risky_below,
                excellent_from,
            });
        }
        Ok(Self {
            risky_below,
            excellent_from,
        })
    }

    /// Look up a named preset (`standard`, `lenient`).
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "40/70" => Some(Self::STANDARD),
            "lenient" | "41/60" => Some(Self::LENIENT),
            _ => None,
        }
    }

    pub fn risky_below(&self) -> u8 {
        self.risky_below
    }

    pub fn excellent_from(&self) -> u8 {
        self.excellent_from
    }

    pub fn category_for(&self, score: u8) -> Category {
        if score < self.risky_below {
            Category::Risky
        } else if score >= self.excellent_from {
            Category::Excellent
        } else {
            Category::Good
        }
    }
}

impl Default for ScoreBands {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Round and clamp a raw score into `MIN_SCORE..=MAX_SCORE`.
/// Non-finite input (a model answering "NaN") becomes the neutral score.
pub fn clamp_score(raw: f64) -> u8 {
    if !raw.is_finite() {
        return NEUTRAL_SCORE;
    }
    raw.round().clamp(MIN_SCORE as f64, MAX_SCORE as f64) as u8
}

// =============================================================================
// Metadata
// =============================================================================

/// Whatever a fetch strategy managed to read. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub follower_count: Option<u64>,
    pub track_count: Option<u64>,
    pub owner: Option<String>,
}

impl RawMetadata {
    /// Fill any field still missing here from `other`.
    pub fn or_else(self, other: RawMetadata) -> RawMetadata {
        RawMetadata {
            title: non_blank(self.title).or_else(|| non_blank(other.title)),
            description: non_blank(self.description).or_else(|| non_blank(other.description)),
            image: non_blank(self.image).or_else(|| non_blank(other.image)),
            follower_count: self.follower_count.or(other.follower_count),
            track_count: self.track_count.or(other.track_count),
            owner: non_blank(self.owner).or_else(|| non_blank(other.owner)),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Playlist metadata with the documented defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaylistMeta {
    pub title: String,
    pub description: String,
    pub image: String,
    pub follower_count: Option<u64>,
    pub track_count: Option<u64>,
    pub owner: Option<String>,
}

impl PlaylistMeta {
    pub fn from_raw(raw: RawMetadata) -> Self {
        Self {
            title: non_blank(raw.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: non_blank(raw.description)
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            image: non_blank(raw.image).unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            follower_count: raw.follower_count,
            track_count: raw.track_count,
            owner: non_blank(raw.owner),
        }
    }

    /// Title and description joined, the text every scorer reads.
    pub fn combined_text(&self) -> String {
        format!("{}\n{}", self.title, self.description)
    }
}

// =============================================================================
// Scoring output
// =============================================================================

/// What a scorer produces before it is joined with the metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub score: u8,
    pub category: Category,
    pub reason: String,
    pub analysis_summary: Option<String>,
}

impl Assessment {
    /// Build from a score; category is always derived from the bands.
    pub fn from_score(
        score: u8,
        bands: &ScoreBands,
        reason: impl Into<String>,
        analysis_summary: Option<String>,
    ) -> Self {
        let score = score.clamp(MIN_SCORE, MAX_SCORE);
        Self {
            score,
            category: bands.category_for(score),
            reason: reason.into(),
            analysis_summary,
        }
    }

    /// Fixed object returned when no scorer gave a usable answer.
    pub fn fallback(bands: &ScoreBands) -> Self {
        Self::from_score(
            NEUTRAL_SCORE,
            bands,
            "AI analysis unavailable",
            Some(
                "The analysis service did not return a usable result, so a neutral score was assigned."
                    .to_string(),
            ),
        )
    }
}

/// The 200 response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyReport {
    pub score: u8,
    pub category: Category,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_summary: Option<String>,
    pub title: String,
    pub description: String,
    pub image: String,
}

impl SafetyReport {
    pub fn new(assessment: Assessment, meta: PlaylistMeta) -> Self {
        Self {
            score: assessment.score,
            category: assessment.category,
            reason: assessment.reason,
            analysis_summary: assessment.analysis_summary,
            title: meta.title,
            description: meta.description,
            image: meta.image,
        }
    }
}
