use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{error::AppResult, models::HistoryEntry, routes::AppState};

/// Handler for listing viewed recipes, most recent first
pub async fn list_history(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.list().await)
}

/// Handler for erasing the view history
pub async fn clear_history(State(state): State<Arc<AppState>>) -> AppResult<StatusCode> {
    state.history.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}
