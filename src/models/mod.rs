use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::ErrorInfo;

mod preference_query;

pub use preference_query::PreferenceQuery;

/// Maximum number of nearby stores returned to the client
pub const MAX_STORES: usize = 5;

/// A text-only candidate dish, before its image is generated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DishProposal {
    pub dish_name: String,
    pub description: String,
    pub ingredients: Vec<String>,
}

/// A dish proposal enriched with its generated image, ready for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DishCard {
    pub dish_name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    /// Base64 image payload
    #[serde(default)]
    pub image_data: Option<String>,
    /// Filled only after the recipe has been expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,
}

impl DishCard {
    pub fn new(proposal: DishProposal, image_data: Option<String>) -> Self {
        Self {
            dish_name: proposal.dish_name,
            description: proposal.description,
            ingredients: proposal.ingredients,
            image_data,
            instructions: None,
        }
    }

    /// Replaces the key ingredients with the expanded ones and attaches the steps
    pub fn with_recipe(mut self, recipe: RecipeDetails) -> Self {
        self.ingredients = recipe.ingredients;
        self.instructions = Some(recipe.instructions);
        self
    }
}

/// Full ingredient list and steps for one dish
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeDetails {
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

/// A grocery store near the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreResult {
    pub name: String,
    pub uri: String,
}

/// De-duplicates stores by uri and caps the list at [`MAX_STORES`]
///
/// The first occurrence of a uri wins, both for its position and its name.
pub fn dedupe_stores(stores: Vec<StoreResult>) -> Vec<StoreResult> {
    let mut seen = HashSet::new();

    stores
        .into_iter()
        .filter(|store| seen.insert(store.uri.clone()))
        .take(MAX_STORES)
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One viewed recipe, together with the query that produced it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub card: DishCard,
    pub query: PreferenceQuery,
    #[serde(default = "Utc::now")]
    pub viewed_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(card: DishCard, query: PreferenceQuery) -> Self {
        Self {
            card,
            query,
            viewed_at: Utc::now(),
        }
    }

    pub fn dish_name(&self) -> &str {
        &self.card.dish_name
    }
}

/// Outcome of one recommendation search
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Recommendations {
    pub cards: Vec<DishCard>,
    pub stores: Vec<StoreResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl Recommendations {
    pub fn failed(error: ErrorInfo) -> Self {
        Self {
            cards: Vec::new(),
            stores: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

// ============================================================================
// Gemini API Types
// ============================================================================

/// Dish proposal as returned by the structured-output schema
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDishProposal {
    pub dish_name: String,
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl From<ApiDishProposal> for DishProposal {
    fn from(api: ApiDishProposal) -> Self {
        DishProposal {
            dish_name: api.dish_name,
            description: api.description,
            ingredients: api.ingredients,
        }
    }
}

/// Response body of `models/{model}:generateContent`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<ApiCandidate>,
    #[serde(default)]
    pub prompt_feedback: Option<ApiPromptFeedback>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiCandidate {
    #[serde(default)]
    pub content: Option<ApiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub grounding_metadata: Option<ApiGroundingMetadata>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiContent {
    #[serde(default)]
    pub parts: Vec<ApiPart>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiPart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<ApiInlineData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ApiGroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<ApiGroundingChunk>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiGroundingChunk {
    #[serde(default)]
    pub maps: Option<ApiMapsChunk>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiMapsChunk {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GenerateContentResponse {
    fn first_candidate(&self) -> Option<&ApiCandidate> {
        self.candidates.first()
    }

    /// Concatenated text parts of the first candidate, trimmed
    pub fn text(&self) -> String {
        self.first_candidate()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// First inline image payload of the first candidate
    pub fn inline_data(&self) -> Option<&str> {
        self.first_candidate()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.inline_data.as_ref())
                    .map(|d| d.data.as_str())
                    .find(|data| !data.is_empty())
            })
    }

    /// Why no content came back: prompt block reason, then finish reason
    pub fn block_reason(&self) -> String {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
            .or_else(|| self.first_candidate().and_then(|c| c.finish_reason.clone()))
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Stores from Maps grounding chunks; chunks lacking a title or uri are skipped
    pub fn grounded_stores(&self) -> Vec<StoreResult> {
        self.first_candidate()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|metadata| {
                metadata
                    .grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.maps.as_ref())
                    .filter_map(|maps| match (&maps.title, &maps.uri) {
                        (Some(title), Some(uri)) if !title.is_empty() && !uri.is_empty() => {
                            Some(StoreResult {
                                name: title.clone(),
                                uri: uri.clone(),
                            })
                        }
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
