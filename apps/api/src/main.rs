mod aggregation;
mod collection;
mod config;
mod enrichment;
mod errors;
mod extraction;
mod llm_client;
mod pipeline;
mod rewrite;
mod routes;
mod scoring;
mod sources;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::collection::BpeTokenizer;
use crate::config::Config;
use crate::extraction::{BoundedExtractor, Extractor};
use crate::llm_client::LlmClient;
use crate::pipeline::EnrichmentPipeline;
use crate::routes::build_router;
use crate::scoring::LlmAtsScorer;
use crate::sources::Sources;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume enricher v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client behind the shared concurrency bound
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let extractor: Arc<dyn Extractor> = Arc::new(BoundedExtractor::new(
        Arc::new(llm),
        config.max_concurrent_extractions,
    ));
    info!(
        max_in_flight = config.max_concurrent_extractions,
        "Extraction pool ready"
    );

    // Source adapters
    let sources = Sources::live(config.github_token.clone())?;
    if config.github_token.is_none() {
        info!("GITHUB_TOKEN not set, using unauthenticated GitHub API limits");
    }

    let tokenizer = Arc::new(BpeTokenizer::new()?);

    let pipeline = EnrichmentPipeline::new(
        extractor.clone(),
        sources.clone(),
        tokenizer,
        config.pipeline_settings(),
    );

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        scorer: Arc::new(LlmAtsScorer::new(extractor)),
        documents: sources.documents,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
