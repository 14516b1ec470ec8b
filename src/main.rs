use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use tower_http::services::ServeDir;
use tracing_subscriber::EnvFilter;

use storyspace_rmcp::{
    auth::Identity,
    config::AppConfig,
    error::ConfigError,
    fetch::HttpImageFetcher,
    mcp_server::{StoryServer, StoryServices},
    openai::OpenAiClient,
    profile::ProfileService,
    store::{documents::LocalDocumentStore, storage::LocalFileStorage},
    story::{StoryLibrary, StoryOrchestrator},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    if config.sign_in_is_unguarded() {
        tracing::warn!("SECRET_KEY is unset; any client that reaches the endpoint can sign in as any user");
    }
    let bind_address = config.bind_address();
    let mcp_path = match config.secret_key.as_deref() {
        Some(value) => format!("/{value}/mcp"),
        None => "/mcp".to_string(),
    };

    let default_identity = match config.default_user_id.as_deref() {
        Some(raw) => Some(Identity::parse(raw).ok_or_else(|| ConfigError::Invalid {
            name: "DEFAULT_USER_ID",
            value: raw.to_string(),
        })?),
        None => None,
    };

    let objects_dir = config.objects_dir();
    let objects = Arc::new(LocalFileStorage::new(objects_dir.clone(), config.object_base_url.clone()));
    let documents = Arc::new(LocalDocumentStore::new(config.documents_dir()));
    let llm = Arc::new(OpenAiClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
    ));
    let orchestrator = StoryOrchestrator::new(
        llm,
        Arc::new(HttpImageFetcher::default()),
        objects,
        documents.clone(),
        config.orchestrator(),
    );
    let services = Arc::new(StoryServices {
        orchestrator,
        library: StoryLibrary::new(documents.clone()),
        profiles: ProfileService::new(documents),
        display_language: config.display_language,
        default_identity,
    });

    let service = StreamableHttpService::new(
        move || Ok(StoryServer::new(services.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new()
        .nest_service(&mcp_path, service)
        .nest_service("/objects", ServeDir::new(objects_dir));
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("bind {bind_address}"))?;

    tracing::info!(
        address = %bind_address,
        path = %mcp_path,
        data_dir = %config.data_dir.display(),
        "story MCP HTTP server started"
    );

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
