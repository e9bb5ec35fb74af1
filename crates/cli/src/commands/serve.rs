use std::sync::Arc;

use anyhow::Result;
use docqa_core::{Config, EmbeddingBackend};
use docqa_embeddings::{Embedder, FastEmbedder, HashingEmbedder};
use docqa_http::{AppState, create_router};
use docqa_llm::{LlmClient, RetryPolicy};
use docqa_service::SessionService;
use docqa_service::ingest::PdfLoader;

pub(crate) async fn run(config: Config, host: &str, port: u16) -> Result<()> {
    let api_key = config.require_llm_api_key()?.to_owned();
    let llm = LlmClient::new(api_key, config.llm_base_url.clone())?
        .with_model(config.llm_model.clone())
        .with_temperature(config.llm_temperature)
        .with_retry_policy(RetryPolicy {
            max_retries: config.llm_max_retries,
            base_delay: config.llm_retry_base_delay,
        });
    tracing::info!(model = llm.model(), base_url = llm.base_url(), "LLM client ready");

    let embedder = build_embedder(&config).await?;
    tracing::info!(
        backend = %config.embedding_backend,
        model = embedder.model_id(),
        dimension = embedder.dimension(),
        "Embedder ready"
    );

    let service =
        SessionService::from_config(&config, Arc::new(PdfLoader), embedder, Arc::new(llm)).await?;
    let router = create_router(Arc::new(AppState::new(Arc::new(service))));

    let addr = format!("{host}:{port}");
    tracing::info!(data_dir = %config.data_dir.display(), "Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    match config.embedding_backend {
        EmbeddingBackend::FastEmbed => {
            // model download and ONNX session setup block
            let cache_dir = config.models_dir.clone();
            let embedder =
                tokio::task::spawn_blocking(move || FastEmbedder::new(cache_dir)).await??;
            Ok(Arc::new(embedder))
        },
        EmbeddingBackend::Hashing => Ok(Arc::new(HashingEmbedder::default())),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
