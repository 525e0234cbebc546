use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::error::{AiError, Result};

use super::types::*;

pub(crate) const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Wire client for any endpoint speaking the `/chat/completions` dialect.
///
/// OpenRouter, Groq, DeepSeek and friends all reuse this with their own
/// base URL and extra headers.
pub(crate) struct ChatCompletionsClient {
    provider: &'static str,
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    extra_headers: Vec<(&'static str, String)>,
}

impl ChatCompletionsClient {
    pub fn new(provider: &'static str, api_key: &str, http: reqwest::Client) -> Self {
        Self {
            provider,
            api_key: api_key.to_string(),
            http,
            base_url: OPENAI_API_URL.to_string(),
            extra_headers: Vec::new(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_header(mut self, name: &'static str, value: &str) -> Self {
        self.extra_headers.push((name, value.to_string()));
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &self.extra_headers {
            if let Ok(val) = HeaderValue::from_str(value) {
                headers.insert(*name, val);
            }
        }
        Ok(headers)
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        debug!(provider = self.provider, model = %request.model, "chat completion request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                provider: self.provider,
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
