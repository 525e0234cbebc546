use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use ai_client::{HuggingFace, OpenAi, OpenRouter};
use proxy_client::{BrowserlessClient, ProxyClient, USER_AGENT};
use spotify_client::{Credentials, SpotifyClient};
use tunecheck_common::{
    free_text_meta, AnalysisTarget, Config, FetchStrategy, PlaylistInput, PlaylistMeta,
    SafetyReport, ScoreBands, ScorerKind, TunecheckError,
};

use crate::scoring::{ChatScorer, ClassifierScorer, HeuristicScorer, ScoringChain};
use crate::sources::{
    AllOriginsSource, BrowserlessSource, CorsProxySource, DirectSource, OEmbedSource,
    SourceChain, SpotifyApiSource,
};
use crate::traits::{PlaylistSource, SafetyScorer};

const APP_NAME: &str = "Tunecheck";

/// Input validation, metadata fetch and scoring in one call.
pub struct Analyzer {
    sources: SourceChain,
    scoring: ScoringChain,
}

impl Analyzer {
    pub fn new(sources: SourceChain, scoring: ScoringChain) -> Self {
        Self { sources, scoring }
    }

    /// Wire up sources and scorers from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        let proxy = Arc::new(ProxyClient::new(http.clone()));
        let credentials = config.spotify.as_ref().map(|s| Credentials {
            client_id: s.client_id.clone(),
            client_secret: s.client_secret.clone(),
        });
        let spotify = Arc::new(SpotifyClient::new(http.clone(), credentials));

        let mut sources: Vec<Arc<dyn PlaylistSource>> = Vec::new();
        for strategy in &config.fetch_strategies {
            let source: Arc<dyn PlaylistSource> = match strategy {
                FetchStrategy::Direct => Arc::new(DirectSource::new(proxy.clone())),
                FetchStrategy::AllOrigins => Arc::new(AllOriginsSource::new(proxy.clone())),
                FetchStrategy::CorsProxy => Arc::new(CorsProxySource::new(proxy.clone())),
                FetchStrategy::Browserless => {
                    let cfg = config
                        .browserless
                        .as_ref()
                        .context("browserless strategy selected without BROWSERLESS_URL")?;
                    let client =
                        BrowserlessClient::new(&cfg.url, cfg.token.as_deref(), config.fetch_timeout)?;
                    Arc::new(BrowserlessSource::new(client))
                }
                FetchStrategy::SpotifyApi => Arc::new(SpotifyApiSource::new(spotify.clone())),
            };
            sources.push(source);
        }

        let mut chain = SourceChain::new(sources);
        if config.oembed_enrichment {
            chain = chain.with_enrichment(Arc::new(OEmbedSource::new(spotify)));
        }

        let scoring = build_scoring(config, http)?;

        info!(
            sources = ?chain.source_names(),
            oembed = config.oembed_enrichment,
            scorers = ?scoring.scorer_names(),
            bands = ?config.score_bands,
            "Analyzer ready"
        );

        Ok(Self::new(chain, scoring))
    }

    pub fn bands(&self) -> &ScoreBands {
        self.scoring.bands()
    }

    /// Validate and analyze a submission.
    pub async fn analyze(&self, input: &PlaylistInput) -> Result<SafetyReport, TunecheckError> {
        let target = input.resolve()?;
        self.analyze_target(&target).await
    }

    /// Analyze an already-resolved target.
    pub async fn analyze_target(
        &self,
        target: &AnalysisTarget,
    ) -> Result<SafetyReport, TunecheckError> {
        let request_id = Uuid::new_v4();
        let span = match target {
            AnalysisTarget::Playlist(playlist) => {
                info_span!("analyze", %request_id, playlist = %playlist)
            }
            AnalysisTarget::FreeText(_) => info_span!("analyze", %request_id, playlist = "free-text"),
        };

        async move {
            let meta = match target {
                AnalysisTarget::Playlist(playlist) => {
                    PlaylistMeta::from_raw(self.sources.fetch(playlist).await?)
                }
                AnalysisTarget::FreeText(text) => free_text_meta(text),
            };

            let assessment = self.scoring.assess(&meta).await;
            Ok::<_, TunecheckError>(SafetyReport::new(assessment, meta))
        }
        .instrument(span)
        .await
    }
}

fn build_scoring(config: &Config, http: reqwest::Client) -> Result<ScoringChain> {
    let primary: Arc<dyn SafetyScorer> = match config.scorer {
        ScorerKind::Heuristic => {
            return Ok(ScoringChain::new(
                vec![Arc::new(HeuristicScorer::new())],
                config.score_bands,
            ))
        }
        ScorerKind::OpenAi => {
            let cfg = config.openai.as_ref().context("SCORER=openai requires OPENAI_API_KEY")?;
            let mut agent = OpenAi::new(&cfg.api_key, &cfg.model).with_http_client(http);
            agent = match &cfg.base_url {
                Some(url) => agent.with_base_url(url),
                // Only OpenAI itself is known to honour response_format.
                None => agent.with_json_mode(true),
            };
            Arc::new(ChatScorer::new(Arc::new(agent)))
        }
        ScorerKind::OpenRouter => {
            let cfg = config
                .openrouter
                .as_ref()
                .context("SCORER=openrouter requires OPENROUTER_API_KEY")?;
            let mut agent = OpenRouter::new(&cfg.api_key, &cfg.model)
                .with_app_name(APP_NAME)
                .with_http_client(http);
            if let Some(ref site_url) = cfg.site_url {
                agent = agent.with_site_url(site_url);
            }
            Arc::new(ChatScorer::new(Arc::new(agent)))
        }
        ScorerKind::HuggingFace => {
            let cfg = config
                .huggingface
                .as_ref()
                .context("SCORER=huggingface requires HUGGINGFACE_API_KEY")?;
            let classifier = HuggingFace::new(&cfg.api_key, &cfg.model).with_http_client(http);
            Arc::new(ClassifierScorer::new(Arc::new(classifier)))
        }
    };

    Ok(ScoringChain::with_heuristic_backstop(primary, config.score_bands))
}
