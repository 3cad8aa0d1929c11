mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
mod storage;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::storage::BlobStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub blobs: Arc<BlobStore>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "porchlight=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting porchlight...");

    // Load configuration
    let config = Config::load()?;
    let config = Arc::new(config);
    tracing::info!("Configuration loaded");

    // Initialize database
    let db = Database::new(&config.database.path).await?;
    db.run_migrations().await?;
    tracing::info!("Database initialized");

    // Initialize blob store
    let blobs = Arc::new(BlobStore::new(&config.media)?);

    // Create app state
    let state = AppState {
        db,
        config: config.clone(),
        blobs,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn create_router(state: AppState) -> Router {
    // CORS configuration from the configured origin list
    let allow_origin = if state.config.cors.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            state
                .config
                .cors
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any);

    // Everything under /api; admin-gated handlers verify the API key
    // themselves so public and admin methods can share a path.
    let api_routes = Router::new()
        .route(
            "/content",
            get(handlers::content::get_content).put(handlers::content::update_content),
        )
        .route("/content/versions", get(handlers::content::list_versions))
        .route(
            "/content/rollback/:version",
            post(handlers::content::rollback_content),
        )
        .route(
            "/admin/home-layout",
            get(handlers::content::get_home_layout).put(handlers::content::update_home_layout),
        )
        .route("/contact", post(handlers::contact::submit_contact))
        .route("/careers/apply", post(handlers::careers::apply))
        .route(
            "/admin/applications",
            get(handlers::careers::list_applications),
        )
        .route(
            "/media/upload-public",
            post(handlers::media::upload_public_media),
        )
        .route(
            "/admin/files/:id",
            get(handlers::media::download_private_file),
        );

    // Public media (hero images, icons) served straight from disk
    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .nest_service("/media", ServeDir::new(&state.config.media.public_root))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
