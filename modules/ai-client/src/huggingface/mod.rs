//! Hugging Face Inference API text classification.
//!
//! Covers the sentiment and toxicity classifiers (`unitary/toxic-bert`,
//! `distilbert-base-uncased-finetuned-sst-2-english`, ...) that answer a
//! `{"inputs": "..."}` POST with a list of `{label, score}` pairs.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AiError, Result};
use crate::traits::TextClassifier;

const INFERENCE_API_URL: &str = "https://api-inference.huggingface.co/models";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassLabel {
    pub label: String,
    pub score: f64,
}

/// Models return either one list per input (`[[...]]`) or a flat list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<ClassLabel>>),
    Flat(Vec<ClassLabel>),
    Error { error: String },
}

impl ClassifyResponse {
    fn into_labels(self) -> Result<Vec<ClassLabel>> {
        match self {
            ClassifyResponse::Nested(batches) => Ok(batches.into_iter().next().unwrap_or_default()),
            ClassifyResponse::Flat(labels) => Ok(labels),
            ClassifyResponse::Error { error } => Err(AiError::Api {
                provider: "HuggingFace",
                status: 200,
                message: error,
            }),
        }
    }
}

#[derive(Clone)]
pub struct HuggingFace {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl HuggingFace {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: INFERENCE_API_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, self.model)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl TextClassifier for HuggingFace {
    fn model(&self) -> &str {
        &self.model
    }

    async fn classify(&self, text: &str) -> Result<Vec<ClassLabel>> {
        debug!(model = %self.model, chars = text.len(), "HuggingFace classify request");

        let response = self
            .http
            .post(self.endpoint())
            .headers(self.headers()?)
            .json(&serde_json::json!({ "inputs": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                provider: "HuggingFace",
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<ClassifyResponse>(&body)?.into_labels()
    }
}
