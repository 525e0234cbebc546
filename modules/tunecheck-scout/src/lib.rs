pub mod analyzer;
pub mod og;
pub mod scoring;
pub mod sources;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use analyzer::Analyzer;
pub use og::extract_og_tags;
pub use scoring::{ChatScorer, ClassifierScorer, HeuristicScorer, ScoringChain};
pub use sources::SourceChain;
pub use traits::{PlaylistSource, SafetyScorer};
