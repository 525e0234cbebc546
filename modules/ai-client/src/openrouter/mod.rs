use async_trait::async_trait;

use crate::error::{AiError, Result};
use crate::openai::client::ChatCompletionsClient;
use crate::openai::types::{ChatRequest, WireMessage};
use crate::traits::ChatAgent;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";
const MAX_RESPONSE_TOKENS: u32 = 1024;

// =============================================================================
// OpenRouter Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenRouter {
    api_key: String,
    pub(crate) model: String,
    app_name: Option<String>,
    site_url: Option<String>,
    http: reqwest::Client,
}

impl OpenRouter {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            app_name: None,
            site_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.site_url = Some(url.into());
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    fn client(&self) -> ChatCompletionsClient {
        let mut client = ChatCompletionsClient::new("OpenRouter", &self.api_key, self.http.clone())
            .with_base_url(OPENROUTER_API_URL);
        if let Some(ref url) = self.site_url {
            client = client.with_header("HTTP-Referer", url);
        }
        if let Some(ref name) = self.app_name {
            client = client.with_header("X-Title", name);
        }
        client
    }
}

#[async_trait]
impl ChatAgent for OpenRouter {
    fn provider(&self) -> &'static str {
        "openrouter"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat_completion(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest::new(&self.model)
            .message(WireMessage::system(system))
            .message(WireMessage::user(user))
            .token_limit(MAX_RESPONSE_TOKENS);

        self.client()
            .chat(&request)
            .await?
            .into_content()
            .ok_or(AiError::EmptyResponse("OpenRouter"))
    }
}
