use async_trait::async_trait;

use crate::error::Result;
use crate::huggingface::ClassLabel;

// =============================================================================
// ChatAgent Trait
// =============================================================================

/// Anything that answers a single system + user exchange with text.
///
/// Implemented by every chat-completion provider so callers can hold an
/// `Arc<dyn ChatAgent>` without caring which API sits behind it.
#[async_trait]
pub trait ChatAgent: Send + Sync {
    fn provider(&self) -> &'static str;
    fn model(&self) -> &str;
    async fn chat_completion(&self, system: &str, user: &str) -> Result<String>;
}

// =============================================================================
// TextClassifier Trait
// =============================================================================

#[async_trait]
pub trait TextClassifier: Send + Sync {
    fn model(&self) -> &str;
    async fn classify(&self, text: &str) -> Result<Vec<ClassLabel>>;
}
