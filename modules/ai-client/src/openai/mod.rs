pub(crate) mod client;
pub(crate) mod schema;
pub(crate) mod types;

pub use schema::StructuredOutput;

use async_trait::async_trait;

use crate::error::{AiError, Result};
use crate::traits::ChatAgent;

use client::ChatCompletionsClient;

const MAX_RESPONSE_TOKENS: u32 = 1024;

// =============================================================================
// OpenAi Agent
// =============================================================================

/// OpenAI chat completions, or any compatible endpoint via `with_base_url`.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    json_mode: bool,
    http: reqwest::Client,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            json_mode: false,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Ask the provider to constrain output to a JSON object.
    /// Not every compatible endpoint honours `response_format`.
    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.json_mode = enabled;
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub(crate) fn client(&self) -> ChatCompletionsClient {
        let client = ChatCompletionsClient::new("OpenAI", &self.api_key, self.http.clone());
        match self.base_url {
            Some(ref url) => client.with_base_url(url),
            None => client,
        }
    }
}

#[async_trait]
impl ChatAgent for OpenAi {
    fn provider(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat_completion(&self, system: &str, user: &str) -> Result<String> {
        let mut request = types::ChatRequest::new(&self.model)
            .message(types::WireMessage::system(system))
            .message(types::WireMessage::user(user))
            .token_limit(MAX_RESPONSE_TOKENS);

        if self.json_mode {
            request = request.json_object();
        }

        self.client()
            .chat(&request)
            .await?
            .into_content()
            .ok_or(AiError::EmptyResponse("OpenAI"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_new() {
        let ai = OpenAi::new("sk-test", "gpt-4o-mini");
        assert_eq!(ai.model(), "gpt-4o-mini");
        assert_eq!(ai.api_key, "sk-test");
        assert!(!ai.json_mode);
    }

    #[test]
    fn test_openai_with_base_url() {
        let ai = OpenAi::new("gsk-test", "llama-3.1-8b-instant")
            .with_base_url("https://api.groq.com/openai/v1");
        assert_eq!(
            ai.base_url,
            Some("https://api.groq.com/openai/v1".to_string())
        );
        assert_eq!(ai.provider(), "openai");
    }
}
