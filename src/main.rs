//! StudiHub - campus learning portal and template marketplace

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studihub::{
    api::{self, AppState},
    app::{spawn_auth_listener, AppController, PageSurface, Renderer},
    backend::{spawn_session_refresh, BackendClient},
    config::Config,
    gateway::HttpGateway,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studihub=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting StudiHub portal...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    if config.backend.is_placeholder() {
        tracing::warn!(
            "Backend credentials are placeholders; data loads will fall back to seeded content"
        );
    }

    // Connect the backend client and gateway
    let backend = Arc::new(BackendClient::new(&config.backend)?);
    let auth_events = backend.subscribe_changes();
    let gateway = HttpGateway::boxed(Arc::clone(&backend));
    tracing::info!("Backend client ready: {}", config.backend.url);

    // Build the page controller and populate the initial page
    let renderer = Renderer::new(&config.content)?;
    let mut controller = AppController::new(
        gateway,
        renderer,
        PageSurface::new(),
        config.content.templates_per_page,
    );
    controller.init().await;
    tracing::info!("Initial page populated");

    let app_controller = Arc::new(Mutex::new(controller));

    // Keep the auth widget in sync and the session fresh
    spawn_auth_listener(Arc::clone(&app_controller), auth_events);
    spawn_session_refresh(Arc::clone(&backend));

    // Build router
    let state = AppState {
        app: app_controller,
    };
    let app = api::build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
