pub mod browserless;
pub mod error;

pub use browserless::BrowserlessClient;
pub use error::{ProxyError, Result};

use serde::Deserialize;

const ALLORIGINS_URL: &str = "https://api.allorigins.win/get";
const CORSPROXY_URL: &str = "https://corsproxy.io/";

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; TunecheckBot/1.0; playlist safety check)";

/// AllOrigins wraps the upstream page in a JSON envelope.
#[derive(Debug, Deserialize)]
struct AllOriginsEnvelope {
    contents: Option<String>,
}

/// Fetches raw HTML either straight from the origin or through one of the
/// public relays that exist to get around cross-origin restrictions.
pub struct ProxyClient {
    client: reqwest::Client,
    allorigins_url: String,
    corsproxy_url: String,
}

impl ProxyClient {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            allorigins_url: ALLORIGINS_URL.to_string(),
            corsproxy_url: CORSPROXY_URL.to_string(),
        }
    }

    pub fn with_allorigins_url(mut self, url: impl Into<String>) -> Self {
        self.allorigins_url = url.into();
        self
    }

    pub fn with_corsproxy_url(mut self, url: impl Into<String>) -> Self {
        self.corsproxy_url = url.into();
        self
    }

    /// GET the page itself. Only 2xx counts.
    pub async fn direct(&self, target: &str) -> Result<String> {
        tracing::debug!(target, relay = "direct", "Fetching page");
        self.get_text(target, "direct").await
    }

    /// GET through AllOrigins and unwrap `contents`.
    pub async fn allorigins(&self, target: &str) -> Result<String> {
        let endpoint = allorigins_endpoint(&self.allorigins_url, target)?;
        tracing::debug!(target, relay = "allorigins", "Fetching page");

        let body = self.get_text(&endpoint, "allorigins").await?;
        let envelope: AllOriginsEnvelope = serde_json::from_str(&body)?;
        envelope
            .contents
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProxyError::EmptyBody("allorigins"))
    }

    /// GET through corsproxy.io, which passes the body through untouched.
    pub async fn corsproxy(&self, target: &str) -> Result<String> {
        let endpoint = corsproxy_endpoint(&self.corsproxy_url, target);
        tracing::debug!(target, relay = "corsproxy", "Fetching page");
        self.get_text(&endpoint, "corsproxy").await
    }

    async fn get_text(&self, url: &str, relay: &'static str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
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

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Err(ProxyError::EmptyBody(relay));
        }
        Ok(body)
    }
}

fn allorigins_endpoint(base: &str, target: &str) -> Result<String> {
    url::Url::parse_with_params(base, &[("url", target)])
        .map(String::from)
        .map_err(|e| ProxyError::Parse(format!("invalid AllOrigins base URL: {e}")))
}

fn corsproxy_endpoint(base: &str, target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{}?{}", base, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M";

    #[test]
    fn test_allorigins_endpoint_encodes_target() {
        let endpoint = allorigins_endpoint(ALLORIGINS_URL, PAGE).unwrap();
        assert_eq!(
            endpoint,
            "https://api.allorigins.win/get?url=https%3A%2F%2Fopen.spotify.com%2Fplaylist%2F37i9dQZF1DXcBWIGoYBM5M"
        );
    }

    #[test]
    fn test_allorigins_endpoint_rejects_bad_base() {
        assert!(matches!(
            allorigins_endpoint("not a url", PAGE),
            Err(ProxyError::Parse(_))
        ));
    }

    #[test]
    fn test_corsproxy_endpoint_encodes_target() {
        assert_eq!(
            corsproxy_endpoint(CORSPROXY_URL, PAGE),
            "https://corsproxy.io/?https%3A%2F%2Fopen.spotify.com%2Fplaylist%2F37i9dQZF1DXcBWIGoYBM5M"
        );
    }

    #[test]
    fn test_allorigins_envelope_parsing() {
        let envelope: AllOriginsEnvelope = serde_json::from_str(
            r#"{"contents":"<html></html>","status":{"http_code":200}}"#,
        )
        .unwrap();
        assert_eq!(envelope.contents.as_deref(), Some("<html></html>"));

        let envelope: AllOriginsEnvelope = serde_json::from_str(r#"{"contents":null}"#).unwrap();
        assert!(envelope.contents.is_none());
    }
}
