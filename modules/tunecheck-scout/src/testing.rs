// Test fakes for the analysis pipeline.
//
// - MockSource (PlaylistSource): canned metadata or a canned failure, counts calls
// - MockScorer (SafetyScorer): canned assessment or failure
// - MockChatAgent (ai_client::ChatAgent): canned model output or transport error
// - MockClassifier (ai_client::TextClassifier): canned labels
//
// Nothing here touches the network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use ai_client::{AiError, ChatAgent, ClassLabel, TextClassifier};
use tunecheck_common::{Assessment, PlaylistMeta, PlaylistRef, RawMetadata, ScoreBands};

use crate::traits::{PlaylistSource, SafetyScorer};

// ---------------------------------------------------------------------------
// MockSource
// ---------------------------------------------------------------------------

pub struct MockSource {
    name: &'static str,
    result: std::result::Result<RawMetadata, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn ok(name: &'static str, meta: RawMetadata) -> Self {
        Self {
            name,
            result: Ok(meta),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &'static str, error: &str) -> Self {
        Self {
            name,
            result: Err(error.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleep before answering, to check that sources overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl PlaylistSource for MockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, _playlist: &PlaylistRef) -> Result<RawMetadata> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.result {
            Ok(meta) => Ok(meta.clone()),
            Err(e) => bail!("{e}"),
        }
    }
}

/// Metadata with all three page fields set.
pub fn page_meta(title: &str, description: &str, image: &str) -> RawMetadata {
    RawMetadata {
        title: Some(title.to_string()),
        description: Some(description.to_string()),
        image: Some(image.to_string()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// MockScorer
// ---------------------------------------------------------------------------

pub struct MockScorer {
    name: &'static str,
    score: Option<u8>,
    calls: AtomicUsize,
}

impl MockScorer {
    /// Always answers with `score`.
    pub fn scoring(name: &'static str, score: u8) -> Self {
        Self {
            name,
            score: Some(score),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always errors.
    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            score: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl SafetyScorer for MockScorer {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn score(&self, _meta: &PlaylistMeta, bands: &ScoreBands) -> Result<Assessment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.score {
            Some(score) => Ok(Assessment::from_score(score, bands, format!("{} verdict", self.name), None)),
            None => bail!("{} is unavailable", self.name),
        }
    }
}

// ---------------------------------------------------------------------------
// MockChatAgent
// ---------------------------------------------------------------------------

enum MockReply {
    Content(String),
    Status(u16),
    Blank,
}

/// Returns the same completion for every prompt, or a provider error.
pub struct MockChatAgent {
    reply: MockReply,
}

impl MockChatAgent {
    pub fn replying(content: &str) -> Self {
        Self {
            reply: MockReply::Content(content.to_string()),
        }
    }

    /// Fail like the provider answered with `status`.
    pub fn failing(status: u16) -> Self {
        Self {
            reply: MockReply::Status(status),
        }
    }

    /// Answer 200 with blank message content, which real agents report as
    /// `AiError::EmptyResponse`.
    pub fn blank() -> Self {
        Self {
            reply: MockReply::Blank,
        }
    }
}

#[async_trait]
impl ChatAgent for MockChatAgent {
    fn provider(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn chat_completion(&self, _system: &str, _user: &str) -> ai_client::error::Result<String> {
        match &self.reply {
            MockReply::Content(content) => Ok(content.clone()),
            MockReply::Status(status) => Err(AiError::Api {
                provider: "mock",
                status: *status,
                message: "mock failure".into(),
            }),
            MockReply::Blank => Err(AiError::EmptyResponse("mock")),
        }
    }
}

// ---------------------------------------------------------------------------
// MockClassifier
// ---------------------------------------------------------------------------

pub struct MockClassifier {
    labels: Vec<ClassLabel>,
}

impl MockClassifier {
    pub fn new(labels: &[(&str, f64)]) -> Self {
        Self {
            labels: labels
                .iter()
                .map(|(label, score)| ClassLabel {
                    label: label.to_string(),
                    score: *score,
                })
                .collect(),
        }
    }
}

#[async_trait]
impl TextClassifier for MockClassifier {
    fn model(&self) -> &str {
        "mock-classifier"
    }

    async fn classify(&self, _text: &str) -> ai_client::error::Result<Vec<ClassLabel>> {
        Ok(self.labels.clone())
    }
}
