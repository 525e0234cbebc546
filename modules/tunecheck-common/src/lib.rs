pub mod config;
pub mod error;
pub mod playlist;
pub mod types;

pub use config::{Config, FetchStrategy, LogFormat, ScorerKind};
pub use error::{SourceAttempt, TunecheckError};
pub use playlist::{free_text_meta, AnalysisTarget, PlaylistInput, PlaylistRef};
pub use types::*;
