//! Problem Admin HTTP Server
//!
//! JSON REST API over the problem and tag services, consumed by the editor
//! UI. Routes live under `/api`:
//!
//! - `problem_endpoints`: problem lookup and upsert
//! - `tag_endpoints`: tag CRUD
//! - `GET /api/health`
//!
//! No authentication. CORS is restricted to the configured origins.

use axum::{
    http::{HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use problem_admin_core::db::{DatabaseService, ProblemStore, TursoStore};
use problem_admin_core::{ProblemService, TagService};

pub mod config;
mod http_error;
mod problem_endpoints;
mod tag_endpoints;

pub use config::{ConfigError, ServerConfig};
pub use http_error::HttpError;

/// Services shared by all endpoints
#[derive(Clone)]
pub struct AppState {
    pub problems: Arc<ProblemService>,
    pub tags: Arc<TagService>,
}

impl AppState {
    /// Wire both services to one libsql store
    pub fn new(db: Arc<DatabaseService>) -> Self {
        let store: Arc<dyn ProblemStore> = Arc::new(TursoStore::new(db));
        Self {
            problems: Arc::new(ProblemService::new(store.clone())),
            tags: Arc::new(TagService::new(store)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Build the application router with all endpoint modules
pub fn create_router(state: AppState, cors_origins: &[HeaderValue]) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .merge(problem_endpoints::routes(state.clone()))
        .merge(tag_endpoints::routes(state))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins.to_vec())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_credentials(false)
}

/// Open the database and serve until the process is stopped
///
/// # Errors
///
/// Returns error if the database cannot be opened or the port cannot be
/// bound.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let db = Arc::new(DatabaseService::new(config.db_path.clone()).await?);
    let app = create_router(AppState::new(db), &config.cors_origins);

    let addr = format!("127.0.0.1:{}", config.port);
    tracing::info!("HTTP server starting on http://{}", addr);
    tracing::info!("Database: {}", config.db_path.display());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
