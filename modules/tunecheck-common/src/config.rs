use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::types::ScoreBands;

/// One step of the metadata fetch chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    Direct,
    AllOrigins,
    CorsProxy,
    Browserless,
    SpotifyApi,
}

impl FetchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStrategy::Direct => "direct",
            FetchStrategy::AllOrigins => "allorigins",
            FetchStrategy::CorsProxy => "corsproxy",
            FetchStrategy::Browserless => "browserless",
            FetchStrategy::SpotifyApi => "spotify_api",
        }
    }
}

impl FromStr for FetchStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(FetchStrategy::Direct),
            "allorigins" => Ok(FetchStrategy::AllOrigins),
            "corsproxy" => Ok(FetchStrategy::CorsProxy),
            "browserless" => Ok(FetchStrategy::Browserless),
            "spotify_api" | "spotify" => Ok(FetchStrategy::SpotifyApi),
            other => bail!("unknown fetch strategy '{other}'"),
        }
    }
}

/// Primary scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerKind {
    Heuristic,
    OpenAi,
    OpenRouter,
    HuggingFace,
}

impl ScorerKind {
    pub fn is_ai(&self) -> bool {
        !matches!(self, ScorerKind::Heuristic)
    }
}

impl FromStr for ScorerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(ScorerKind::Heuristic),
            "openai" => Ok(ScorerKind::OpenAi),
            "openrouter" => Ok(ScorerKind::OpenRouter),
            "huggingface" => Ok(ScorerKind::HuggingFace),
            other => bail!("unknown scorer '{other}'"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub model: String,
    /// Sent as `HTTP-Referer` for OpenRouter's app attribution.
    pub site_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct BrowserlessConfig {
    pub url: String,
    pub token: Option<String>,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Web server
    pub api_host: String,
    pub api_port: u16,

    // Fetching
    pub fetch_strategies: Vec<FetchStrategy>,
    pub oembed_enrichment: bool,
    pub fetch_timeout: Duration,

    // Scoring
    pub scorer: ScorerKind,
    pub score_bands: ScoreBands,

    // Providers
    pub openai: Option<OpenAiConfig>,
    pub openrouter: Option<OpenRouterConfig>,
    pub huggingface: Option<HuggingFaceConfig>,
    pub spotify: Option<SpotifyConfig>,
    pub browserless: Option<BrowserlessConfig>,

    // Limits
    pub cache_ttl: Option<Duration>,
    pub rate_limit_per_hour: Option<u32>,

    pub log_format: LogFormat,
}

const DEFAULT_STRATEGIES: &str = "direct,allorigins,corsproxy";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o-mini";
const DEFAULT_HUGGINGFACE_MODEL: &str = "unitary/toxic-bert";

impl Config {
    /// Load configuration from the process environment, reading a local
    /// `.env` first when one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_port = get("API_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("API_PORT must be a number")?;

        let fetch_strategies = get("FETCH_STRATEGIES")
            .unwrap_or_else(|| DEFAULT_STRATEGIES.to_string())
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(FetchStrategy::from_str)
            .collect::<Result<Vec<_>>>()
            .context("FETCH_STRATEGIES is invalid")?;

        let oembed_enrichment = parse_bool(get("OEMBED_ENRICHMENT").as_deref(), true)
            .context("OEMBED_ENRICHMENT must be true or false")?;

        let fetch_timeout = Duration::from_secs(
            get("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("FETCH_TIMEOUT_SECS must be a number")?,
        );

        let scorer: ScorerKind = get("SCORER")
            .unwrap_or_else(|| "heuristic".to_string())
            .parse()?;

        let bands_name = get("SCORE_BANDS").unwrap_or_else(|| "standard".to_string());
        let score_bands = ScoreBands::preset(&bands_name)
            .with_context(|| format!("unknown SCORE_BANDS preset '{bands_name}'"))?;

        let openai = get("OPENAI_API_KEY").map(|api_key| OpenAiConfig {
            api_key,
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: get("OPENAI_BASE_URL"),
        });
        let openrouter = get("OPENROUTER_API_KEY").map(|api_key| OpenRouterConfig {
            api_key,
            model: get("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
            site_url: get("OPENROUTER_SITE_URL"),
        });
        let huggingface = get("HUGGINGFACE_API_KEY").map(|api_key| HuggingFaceConfig {
            api_key,
            model: get("HUGGINGFACE_MODEL")
                .unwrap_or_else(|| DEFAULT_HUGGINGFACE_MODEL.to_string()),
        });
        let spotify = match (get("SPOTIFY_CLIENT_ID"), get("SPOTIFY_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(SpotifyConfig {
                client_id,
                client_secret,
            }),
            _ => None,
        };
        let browserless = get("BROWSERLESS_URL").map(|url| BrowserlessConfig {
            url,
            token: get("BROWSERLESS_TOKEN"),
        });

        let cache_secs: u64 = get("CACHE_TTL_SECS")
            .unwrap_or_else(|| "3600".to_string())
            .parse()
            .context("CACHE_TTL_SECS must be a number")?;
        let rate_limit: u32 = get("RATE_LIMIT_PER_HOUR")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .context("RATE_LIMIT_PER_HOUR must be a number")?;

        let log_format = match get("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase) {
            None => LogFormat::Text,
            Some(f) if f == "text" => LogFormat::Text,
            Some(f) if f == "json" => LogFormat::Json,
            Some(other) => bail!("LOG_FORMAT must be text or json, got '{other}'"),
        };

        let config = Self {
            api_host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port,
            fetch_strategies,
            oembed_enrichment,
            fetch_timeout,
            scorer,
            score_bands,
            openai,
            openrouter,
            huggingface,
            spotify,
            browserless,
            cache_ttl: (cache_secs > 0).then(|| Duration::from_secs(cache_secs)),
            rate_limit_per_hour: (rate_limit > 0).then_some(rate_limit),
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Every selected scorer and strategy must have its credentials.
    pub fn validate(&self) -> Result<()> {
        if self.fetch_strategies.is_empty() && !self.oembed_enrichment {
            bail!("FETCH_STRATEGIES is empty and OEMBED_ENRICHMENT is off; nothing can fetch metadata");
        }

        match self.scorer {
            ScorerKind::Heuristic => {}
            ScorerKind::OpenAi if self.openai.is_none() => {
                bail!("SCORER=openai requires OPENAI_API_KEY")
            }
            ScorerKind::OpenRouter if self.openrouter.is_none() => {
                bail!("SCORER=openrouter requires OPENROUTER_API_KEY")
            }
            ScorerKind::HuggingFace if self.huggingface.is_none() => {
                bail!("SCORER=huggingface requires HUGGINGFACE_API_KEY")
            }
            _ => {}
        }

        for strategy in &self.fetch_strategies {
            match strategy {
                FetchStrategy::SpotifyApi if self.spotify.is_none() => bail!(
                    "fetch strategy spotify_api requires SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET"
                ),
                FetchStrategy::Browserless if self.browserless.is_none() => {
                    bail!("fetch strategy browserless requires BROWSERLESS_URL")
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn parse_bool(value: Option<&str>, default: bool) -> Result<bool> {
    match value.map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => bail!("expected a boolean, got '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(
            config.fetch_strategies,
            vec![
                FetchStrategy::Direct,
                FetchStrategy::AllOrigins,
                FetchStrategy::CorsProxy
            ]
        );
        assert!(config.oembed_enrichment);
        assert_eq!(config.scorer, ScorerKind::Heuristic);
        assert_eq!(config.score_bands, ScoreBands::STANDARD);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.cache_ttl, Some(Duration::from_secs(3600)));
        assert_eq!(config.rate_limit_per_hour, Some(30));
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_zero_disables_cache_and_rate_limit() {
        let config = config_from(&[("CACHE_TTL_SECS", "0"), ("RATE_LIMIT_PER_HOUR", "0")]).unwrap();
        assert!(config.cache_ttl.is_none());
        assert!(config.rate_limit_per_hour.is_none());
    }

    #[test]
    fn test_ai_scorer_requires_key() {
        let err = config_from(&[("SCORER", "openai")]).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));

        let config = config_from(&[("SCORER", "openai"), ("OPENAI_API_KEY", "sk-test")]).unwrap();
        let openai = config.openai.unwrap();
        assert_eq!(openai.model, DEFAULT_OPENAI_MODEL);
        assert!(openai.base_url.is_none());
    }

    #[test]
    fn test_openrouter_site_url_is_optional() {
        let config = config_from(&[("SCORER", "openrouter"), ("OPENROUTER_API_KEY", "or-test")])
            .unwrap();
        assert!(config.openrouter.unwrap().site_url.is_none());

        let config = config_from(&[
            ("SCORER", "openrouter"),
            ("OPENROUTER_API_KEY", "or-test"),
            ("OPENROUTER_SITE_URL", "https://tunecheck.app"),
        ])
        .unwrap();
        let openrouter = config.openrouter.unwrap();
        assert_eq!(openrouter.model, DEFAULT_OPENROUTER_MODEL);
        assert_eq!(openrouter.site_url.as_deref(), Some("https://tunecheck.app"));
    }

    #[test]
    fn test_strategy_requires_credentials() {
        let err = config_from(&[("FETCH_STRATEGIES", "spotify_api,direct")]).unwrap_err();
        assert!(err.to_string().contains("SPOTIFY_CLIENT_ID"));

        let config = config_from(&[
            ("FETCH_STRATEGIES", "spotify_api, direct"),
            ("SPOTIFY_CLIENT_ID", "id"),
            ("SPOTIFY_CLIENT_SECRET", "secret"),
        ])
        .unwrap();
        assert_eq!(
            config.fetch_strategies,
            vec![FetchStrategy::SpotifyApi, FetchStrategy::Direct]
        );

        let err = config_from(&[("FETCH_STRATEGIES", "browserless")]).unwrap_err();
        assert!(err.to_string().contains("BROWSERLESS_URL"));
    }

    #[test]
    fn test_malformed_values() {
        assert!(config_from(&[("API_PORT", "eighty")]).is_err());
        assert!(config_from(&[("FETCH_STRATEGIES", "direct,carrier-pigeon")]).is_err());
        assert!(config_from(&[("SCORE_BANDS", "strict")]).is_err());
        assert!(config_from(&[("SCORER", "magic")]).is_err());
        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
        assert!(config_from(&[("OEMBED_ENRICHMENT", "maybe")]).is_err());
    }

    #[test]
    fn test_lenient_bands_and_json_logs() {
        let config = config_from(&[("SCORE_BANDS", "lenient"), ("LOG_FORMAT", "JSON")]).unwrap();
        assert_eq!(config.score_bands, ScoreBands::LENIENT);
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
