use std::time::Duration;

use crate::error::{ProxyError, Result};

/// Renders a page in a hosted headless browser via the Browserless
/// `/content` endpoint and returns the resulting HTML.
pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProxyError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        })
    }

    fn endpoint(&self) -> String {
        match self.token {
            Some(ref token) => format!("{}/content?token={token}", self.base_url),
            None => format!("{}/content", self.base_url),
        }
    }

    pub async fn content(&self, url: &str) -> Result<String> {
        tracing::debug!(url, relay = "browserless", "Rendering page");

        let resp = self
            .client
            .post(self.endpoint())
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ProxyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let html = resp.text().await?;
        if html.trim().is_empty() {
            return Err(ProxyError::EmptyBody("browserless"));
        }
        Ok(html)
    }
}
