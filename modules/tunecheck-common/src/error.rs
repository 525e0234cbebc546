use serde::Serialize;
use thiserror::Error;

/// One failed fetch strategy, kept so the caller can see why every source failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceAttempt {
    pub source: String,
    pub error: String,
}

impl SourceAttempt {
    pub fn new(source: impl Into<String>, error: impl ToString) -> Self {
        Self {
            source: source.into(),
            error: error.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum TunecheckError {
    #[error("No playlist URL provided.")]
    MissingInput,

    #[error("Invalid Spotify playlist URL")]
    InvalidPlaylistUrl,

    #[error("Failed to fetch playlist data from all sources")]
    AllSourcesFailed { attempts: Vec<SourceAttempt> },

    #[error("Invalid score bands: risky_below ({risky_below}) exceeds excellent_from ({excellent_from})")]
    InvalidBands { risky_below: u8, excellent_from: u8 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl TunecheckError {
    /// True for errors caused by the request rather than by upstreams.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TunecheckError::MissingInput | TunecheckError::InvalidPlaylistUrl
        )
    }

    /// Human-readable detail line for 500 responses.
    pub fn details(&self) -> Option<String> {
        match self {
            TunecheckError::AllSourcesFailed { attempts } if !attempts.is_empty() => Some(
                attempts
                    .iter()
                    .map(|a| format!("{}: {}", a.source, a.error))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            TunecheckError::Anyhow(e) => Some(format!("{e:#}")),
            _ => None,
        }
    }
}
