use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{PreferenceQuery, RecipeDetails},
    services::providers::GenerationGateway,
};

/// Expands a chosen dish into a full recipe
///
/// Expansions are never cached: opening the same dish again re-fetches it.
#[derive(Clone)]
pub struct RecipeExpander {
    gateway: Arc<dyn GenerationGateway>,
}

impl RecipeExpander {
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self { gateway }
    }

    pub async fn expand(
        &self,
        dish_name: &str,
        description: &str,
        query: &PreferenceQuery,
    ) -> AppResult<RecipeDetails> {
        if dish_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Dish name cannot be empty".to_string(),
            ));
        }

        self.gateway
            .expand_recipe(dish_name, description, query)
            .await
            .map_err(|e| {
                tracing::error!(dish = %dish_name, error = %e, "Recipe expansion failed");
                e
            })
    }
}
