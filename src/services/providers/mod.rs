/// Generation gateway abstraction
///
/// This module wraps the remote generative capabilities behind one trait so the
/// recommendation pipeline and the recipe expander can run against Gemini in
/// production and against fakes in tests.
use crate::{
    error::AppResult,
    models::{Coordinates, DishProposal, PreferenceQuery, RecipeDetails, StoreResult},
};

pub mod gemini;

pub use gemini::GeminiGateway;

/// Trait for remote generation backends
///
/// Every operation is independently fallible. Transport, status and parse
/// failures surface as `AppError::Upstream` (or `AppError::HttpClient`); a
/// safety rejection of an image surfaces as `AppError::GenerationBlocked`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Proposes dishes for the query
    ///
    /// When the query lists ingredients, the backend is instructed to only use
    /// a subset of them. That constraint is not validated locally.
    async fn propose_dishes(&self, query: &PreferenceQuery) -> AppResult<Vec<DishProposal>>;

    /// Renders one photorealistic image, returned as base64 text
    async fn render_dish_image(
        &self,
        proposal: &DishProposal,
        dietary_restriction: &str,
    ) -> AppResult<String>;

    /// Looks up grocery stores near the coordinates
    ///
    /// An empty list is a valid outcome, not an error.
    async fn find_nearby_stores(&self, coordinates: Coordinates) -> AppResult<Vec<StoreResult>>;

    /// Expands a dish into full ingredients and instructions
    async fn expand_recipe(
        &self,
        dish_name: &str,
        description: &str,
        query: &PreferenceQuery,
    ) -> AppResult<RecipeDetails>;

    /// Gateway name for logging and debugging
    fn name(&self) -> &'static str;
}
