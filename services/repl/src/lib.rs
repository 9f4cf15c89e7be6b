pub mod config;
pub mod handlers;
pub mod honeypot;
pub mod middleware;
pub mod models;
pub mod page;

use anyhow::Result as AnyhowResult;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use config::ReplConfig;
use honeypot::Honeypot;
use shared::{
    telemetry::{self, TelemetryConfig},
    DatabaseError, ShareStore, StorageFactory,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub type Result<T> = std::result::Result<T, ReplError>;

#[derive(thiserror::Error, Debug)]
pub enum ReplError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl axum::response::IntoResponse for ReplError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ReplError::Database(DatabaseError::NotFound) | ReplError::NotFound(_) => {
                (axum::http::StatusCode::NOT_FOUND, "Not found")
            }
            ReplError::Database(_) => (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Database error",
            ),
            ReplError::Internal(_) => (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
            ),
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = serde_json::json!({
            "error": message,
            "details": self.to_string()
        });

        (status, axum::Json(body)).into_response()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ShareStore>,
    pub honeypot: Arc<Honeypot>,
    pub config: ReplConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn ShareStore>, config: ReplConfig) -> Self {
        Self {
            store,
            honeypot: Arc::new(Honeypot::new(&config.honeypot)),
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let web = Router::new()
        .route("/", get(handlers::index))
        .route(
            "/share",
            post(handlers::store_share).layer(axum_middleware::from_fn_with_state(
                state.clone(),
                honeypot::protect,
            )),
        )
        .route("/share/:hash", get(handlers::show_share))
        .layer(axum_middleware::map_response(middleware::cache_publicly));

    Router::new()
        .merge(web)
        .route("/up", get(handlers::up))
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(telemetry::middleware::trace_layer))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

pub async fn run_server() -> AnyhowResult<()> {
    dotenvy::dotenv().ok();

    let telemetry_config = TelemetryConfig::from_env("repl-server");
    telemetry::init_telemetry(telemetry_config)?;

    info!("REPL server starting...");

    let config = ReplConfig::from_env();
    info!(
        backend = ?config.share_backend,
        honeypot = config.honeypot.enabled,
        "Configuration loaded"
    );

    let store = StorageFactory::create(config.share_backend, config.database.as_ref())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create share store: {}", e))?;
    info!("Share store initialized");

    let app = create_app(AppState::new(store, config.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("REPL server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    telemetry::shutdown_telemetry().await;

    Ok(())
}
