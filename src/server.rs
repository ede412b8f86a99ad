use axum::{
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use hyper::Server;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::client::NasaApodClient;
use crate::config::Config;
use crate::dates::{parse_base_date, today};
use crate::error::{AppError, Result};
use crate::loader::ApodLoader;
use crate::metrics;
use crate::types::LoadResult;
use crate::view::render_index;

/// Shared, read-only state behind every handler.
pub struct AppState {
    pub config: Config,
    pub loader: Option<ApodLoader>,
    pub today: fn() -> chrono::NaiveDate,
}

impl AppState {
    /// Wire the loader from configuration. A missing NASA endpoint is not fatal
    /// here; loader routes answer 500 until it is configured.
    pub fn from_config(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        let loader = match NasaApodClient::from_config(http, &config) {
            Ok(client) => Some(ApodLoader::new(Arc::new(client))),
            Err(AppError::MissingNasaConfig) => {
                warn!("NASA API is not configured; /apod-loader will return 500");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            config,
            loader,
            today,
        })
    }

    pub fn with_loader(config: Config, loader: ApodLoader) -> Self {
        Self {
            config,
            loader: Some(loader),
            today,
        }
    }

    fn loader(&self) -> Result<&ApodLoader> {
        self.loader.as_ref().ok_or(AppError::MissingNasaConfig)
    }
}

#[derive(Debug, Deserialize)]
pub struct ApodLoaderQuery {
    #[serde(rename = "lastDate")]
    pub last_date: Option<String>,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "apod-timeline",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// One page of entries ending at `lastDate` (default: today).
async fn apod_loader(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ApodLoaderQuery>,
) -> Result<Json<LoadResult>> {
    let loader = state.loader()?;
    let base = parse_base_date(query.last_date.as_deref(), (state.today)())?;
    let result = loader.load(state.config.carousel.batch_size, base).await;
    Ok(Json(result))
}

/// Server-rendered first page.
async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let loader = state.loader()?;
    let result = loader
        .load(state.config.carousel.batch_size, (state.today)())
        .await;
    Ok(Html(render_index(&result)?))
}

async fn metrics_text() -> impl IntoResponse {
    match metrics::render() {
        Some(body) => (StatusCode::OK, body).into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Create the HTTP router with all routes
pub fn create_server(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/apod-loader", get(apod_loader))
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        // Demo artwork and other static files
        .nest_service("/assets", ServeDir::new("assets"))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(cors))
}

/// Start the HTTP server on the specified port
pub async fn start_server(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let app = create_server(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server listening on http://localhost:{port}");
    info!("Pagination endpoint: http://localhost:{port}/apod-loader?lastDate=YYYY-MM-DD");

    Server::bind(&addr).serve(app.into_make_service()).await?;
    Ok(())
}
