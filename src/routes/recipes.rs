use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{DishCard, PreferenceQuery},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct OpenRecipeRequest {
    pub card: DishCard,
    pub query: PreferenceQuery,
}

/// Handler for opening a dish card
///
/// The view is recorded in history before the recipe is expanded, so a failed
/// expansion still counts as a view. A history write failure is logged and
/// does not block the expansion.
pub async fn open_recipe(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<OpenRecipeRequest>,
) -> AppResult<Json<DishCard>> {
    let OpenRecipeRequest { card, query } = request;

    tracing::info!(
        request_id = %request_id,
        dish = %card.dish_name,
        "Opening recipe"
    );

    if let Err(e) = state.history.record(card.clone(), query.clone()).await {
        tracing::warn!(request_id = %request_id, error = %e, "Failed to record recipe view");
    }

    let recipe = state
        .expander
        .expand(&card.dish_name, &card.description, &query)
        .await?;

    Ok(Json(card.with_recipe(recipe)))
}
