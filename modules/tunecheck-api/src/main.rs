use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tunecheck_api::{build_router, AppState};
use tunecheck_common::{Config, LogFormat};
use tunecheck_scout::Analyzer;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let analyzer = Analyzer::from_config(&config)?;
    let state = Arc::new(AppState::new(analyzer, &config));
    let app = build_router(state);

    let addr = config.bind_addr();
    info!(
        cache_ttl = ?config.cache_ttl,
        rate_limit_per_hour = ?config.rate_limit_per_hour,
        "Tunecheck API starting on {addr}"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
