/// Gemini `generateContent` gateway
///
/// Dish proposals and recipes use schema-constrained JSON output on the text
/// model. Images come back as inline base64 parts from the image model. Store
/// lookups use Maps grounding and read the grounding chunks.
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        ApiDishProposal, Coordinates, DishProposal, GenerateContentResponse, PreferenceQuery,
        RecipeDetails, StoreResult,
    },
    services::{prompts, providers::GenerationGateway},
};
use reqwest::Client as HttpClient;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct GeminiGateway {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    text_model: String,
    image_model: String,
    proposal_count: usize,
}

impl GeminiGateway {
    pub fn new(
        api_key: String,
        api_url: String,
        text_model: String,
        image_model: String,
        proposal_count: usize,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            text_model,
            image_model,
            proposal_count,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.gemini_api_key.clone(),
            config.gemini_api_url.clone(),
            config.text_model.clone(),
            config.image_model.clone(),
            config.proposal_count,
        )
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            model
        )
    }

    /// Posts a request body to `model` and decodes the response envelope
    async fn generate(&self, model: &str, body: Value) -> AppResult<GenerateContentResponse> {
        let response = self
            .http_client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                model = %model,
                status = %status,
                body = %body,
                "Gemini request failed"
            );
            return Err(AppError::Upstream(format!(
                "Gemini returned status {}: {}",
                status, body
            )));
        }

        let envelope: GenerateContentResponse = response.json().await?;
        Ok(envelope)
    }

    /// Runs a schema-constrained prompt on the text model, returning the raw JSON text
    async fn generate_json(&self, prompt: String, schema: Value) -> AppResult<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });

        let text = self.generate(&self.text_model, body).await?.text();
        if text.is_empty() {
            return Err(AppError::Upstream("Gemini returned an empty response".to_string()));
        }

        Ok(text)
    }
}

/// Parses the proposal array returned by the text model
pub(crate) fn parse_proposals(text: &str) -> AppResult<Vec<DishProposal>> {
    let proposals: Vec<ApiDishProposal> = serde_json::from_str(text)
        .map_err(|e| AppError::Upstream(format!("Unparsable dish proposals: {}", e)))?;

    Ok(proposals.into_iter().map(DishProposal::from).collect())
}

/// Parses the recipe object returned by the text model
pub(crate) fn parse_recipe(text: &str) -> AppResult<RecipeDetails> {
    serde_json::from_str(text)
        .map_err(|e| AppError::Upstream(format!("Unparsable recipe: {}", e)))
}

/// Extracts the image payload, or reports why the model withheld it
pub(crate) fn extract_image(
    dish_name: &str,
    response: &GenerateContentResponse,
) -> AppResult<String> {
    match response.inline_data() {
        Some(data) => Ok(data.to_string()),
        None => {
            let reason = response.block_reason();
            tracing::error!(dish = %dish_name, reason = %reason, "No image data returned");
            Err(AppError::GenerationBlocked {
                dish: dish_name.to_string(),
                reason,
            })
        }
    }
}

#[async_trait::async_trait]
impl GenerationGateway for GeminiGateway {
    async fn propose_dishes(&self, query: &PreferenceQuery) -> AppResult<Vec<DishProposal>> {
        let prompt = prompts::proposal_prompt(query, self.proposal_count);
        let text = self.generate_json(prompt, prompts::proposal_schema()).await?;
        let proposals = parse_proposals(&text)?;

        tracing::info!(
            cuisine = %query.cuisine_label(),
            diet = %query.diet_label(),
            proposals = proposals.len(),
            gateway = "gemini",
            "Dish proposals received"
        );

        Ok(proposals)
    }

    async fn render_dish_image(
        &self,
        proposal: &DishProposal,
        dietary_restriction: &str,
    ) -> AppResult<String> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": prompts::image_prompt(proposal, dietary_restriction) }]
            }],
            "generationConfig": { "responseModalities": ["IMAGE"] },
        });

        let response = self.generate(&self.image_model, body).await?;
        let image = extract_image(&proposal.dish_name, &response)?;

        tracing::debug!(dish = %proposal.dish_name, bytes = image.len(), "Dish image generated");

        Ok(image)
    }

    async fn find_nearby_stores(&self, coordinates: Coordinates) -> AppResult<Vec<StoreResult>> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompts::NEARBY_STORES_PROMPT }] }],
            "tools": [{ "googleMaps": {} }],
            "toolConfig": {
                "retrievalConfig": {
                    "latLng": {
                        "latitude": coordinates.latitude,
                        "longitude": coordinates.longitude,
                    }
                }
            },
        });

        let response = self.generate(&self.text_model, body).await?;
        let stores = response.grounded_stores();

        if stores.is_empty() {
            tracing::warn!(
                text = %response.text(),
                "No usable Maps grounding chunks for nearby stores"
            );
        } else {
            tracing::info!(stores = stores.len(), "Nearby stores found");
        }

        Ok(stores)
    }

    async fn expand_recipe(
        &self,
        dish_name: &str,
        description: &str,
        query: &PreferenceQuery,
    ) -> AppResult<RecipeDetails> {
        let prompt = prompts::recipe_prompt(dish_name, description, query);
        let text = self.generate_json(prompt, prompts::recipe_schema()).await?;
        let recipe = parse_recipe(&text)?;

        tracing::info!(
            dish = %dish_name,
            ingredients = recipe.ingredients.len(),
            steps = recipe.instructions.len(),
            "Recipe expanded"
        );

        Ok(recipe)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
