use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{
        GenerationGateway, HistoryStore, RecipeExpander, RecommendationPipeline, SearchTracker,
    },
};

pub mod history;
pub mod recipes;
pub mod recommendations;

/// Shared application state
///
/// One server instance serves one client installation, so history and the
/// search tracker are global.
pub struct AppState {
    pub pipeline: RecommendationPipeline,
    pub expander: RecipeExpander,
    pub history: HistoryStore,
    pub searches: SearchTracker,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn GenerationGateway>,
        history: HistoryStore,
        geolocation_timeout: Duration,
    ) -> Self {
        Self {
            pipeline: RecommendationPipeline::new(gateway.clone())
                .with_geolocation_timeout(geolocation_timeout),
            expander: RecipeExpander::new(gateway),
            history,
            searches: SearchTracker::new(),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/recommendations", post(recommendations::recommend))
        .route("/recipes", post(recipes::open_recipe))
        .route(
            "/history",
            get(history::list_history).delete(history::clear_history),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
