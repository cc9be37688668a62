use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppError,
    middleware::request_id::RequestId,
    models::{Coordinates, PreferenceQuery, Recommendations},
    routes::AppState,
    services::ClientLocation,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(flatten)]
    pub query: PreferenceQuery,
    /// Present only when the client granted location access
    #[serde(default)]
    pub location: Option<Coordinates>,
}

/// Handler for recommendations endpoint
///
/// Failures keep the `Recommendations` body shape, with `error` set and the
/// status derived from the error kind. A search overtaken by a newer one is
/// answered with 409 and its results are dropped.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> (StatusCode, Json<Recommendations>) {
    let token = state.searches.begin();

    tracing::info!(
        request_id = %request_id,
        search = %token,
        ingredients = request.query.include_ingredients.len(),
        located = request.location.is_some(),
        "Processing recommendation request"
    );

    let result = state
        .pipeline
        .fetch_recommendations(request.query, Arc::new(ClientLocation(request.location)))
        .await;

    if !state.searches.is_current(token) {
        tracing::warn!(
            request_id = %request_id,
            search = %token,
            "Discarding results of superseded search"
        );
        let info = AppError::Superseded.info();
        return (info.kind.status_code(), Json(Recommendations::failed(info)));
    }

    let status = result
        .error
        .as_ref()
        .map(|e| e.kind.status_code())
        .unwrap_or(StatusCode::OK);

    tracing::info!(
        request_id = %request_id,
        cards = result.cards.len(),
        stores = result.stores.len(),
        status = %status,
        "Recommendation request completed"
    );

    (status, Json(result))
}
