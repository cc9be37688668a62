use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use crate::{
    error::{AppError, AppResult},
    models::{dedupe_stores, DishCard, PreferenceQuery, Recommendations, StoreResult},
    services::{
        geolocation::{self, GeolocationSource, DEFAULT_GEOLOCATION_TIMEOUT},
        providers::GenerationGateway,
    },
};

/// Drives one recommendation search end to end
///
/// Stage 1 fetches dish proposals. Stage 2 fans out one image task per
/// proposal. Independently, when the query names no ingredients, a
/// best-effort branch looks up nearby stores; that branch never fails the
/// search.
///
/// Image failures are all-or-nothing: one failed image fails the whole search
/// and no partial card list is returned.
#[derive(Clone)]
pub struct RecommendationPipeline {
    gateway: Arc<dyn GenerationGateway>,
    geolocation_timeout: Duration,
}

impl RecommendationPipeline {
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self {
            gateway,
            geolocation_timeout: DEFAULT_GEOLOCATION_TIMEOUT,
        }
    }

    pub fn with_geolocation_timeout(mut self, timeout: Duration) -> Self {
        self.geolocation_timeout = timeout;
        self
    }

    /// Runs a search and folds any failure into `Recommendations::error`
    pub async fn fetch_recommendations(
        &self,
        query: PreferenceQuery,
        geolocation: Arc<dyn GeolocationSource>,
    ) -> Recommendations {
        match self.run(query, geolocation).await {
            Ok(recommendations) => recommendations,
            Err(e) => {
                tracing::error!(error = %e, "Recommendation search failed");
                Recommendations::failed(e.info())
            }
        }
    }

    /// Runs a search, propagating the first stage-1 or image failure
    #[tracing::instrument(
        skip_all,
        fields(
            cuisine = %query.cuisine_label(),
            diet = %query.diet_label(),
            ingredients = query.include_ingredients.len()
        )
    )]
    pub async fn run(
        &self,
        query: PreferenceQuery,
        geolocation: Arc<dyn GeolocationSource>,
    ) -> AppResult<Recommendations> {
        let start = Instant::now();

        // Store branch runs alongside everything else and resolves on its own
        let store_task = if query.has_ingredients() {
            None
        } else {
            Some(tokio::spawn(nearby_stores(
                self.gateway.clone(),
                geolocation,
                self.geolocation_timeout,
            )))
        };

        // Without proposals there is nothing to illustrate. A still-running
        // store task is left detached.
        let proposals = self.gateway.propose_dishes(&query).await?;

        tracing::info!(proposals = proposals.len(), "Generating dish images");

        let image_tasks: Vec<JoinHandle<AppResult<String>>> = proposals
            .iter()
            .cloned()
            .map(|proposal| {
                let gateway = self.gateway.clone();
                let diet = query.dietary_restriction.clone();
                tokio::spawn(async move { gateway.render_dish_image(&proposal, &diet).await })
            })
            .collect();

        // Joined by position so cards keep proposal order
        let mut images = Vec::with_capacity(image_tasks.len());
        for (index, task) in image_tasks.into_iter().enumerate() {
            match task.await {
                Ok(Ok(image)) => images.push(image),
                Ok(Err(e)) => {
                    tracing::error!(
                        error = %e,
                        dish = %proposals[index].dish_name,
                        "Image generation failed, discarding batch"
                    );
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Image task join error");
                    return Err(AppError::Internal(e.to_string()));
                }
            }
        }

        let stores = match store_task {
            Some(task) => task.await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Store lookup task join error");
                Vec::new()
            }),
            None => Vec::new(),
        };

        let cards: Vec<DishCard> = proposals
            .into_iter()
            .zip(images)
            .map(|(proposal, image)| DishCard::new(proposal, Some(image)))
            .collect();

        tracing::info!(
            cards = cards.len(),
            stores = stores.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Recommendations ready"
        );

        Ok(Recommendations {
            cards,
            stores,
            error: None,
        })
    }
}

/// Best-effort store lookup; every failure resolves to an empty list
async fn nearby_stores(
    gateway: Arc<dyn GenerationGateway>,
    geolocation: Arc<dyn GeolocationSource>,
    timeout: Duration,
) -> Vec<StoreResult> {
    let Some(coordinates) = geolocation::locate(geolocation.as_ref(), timeout).await else {
        return Vec::new();
    };

    match gateway.find_nearby_stores(coordinates).await {
        Ok(stores) => dedupe_stores(stores),
        Err(e) => {
            tracing::warn!(error = %e, "Nearby store lookup failed, continuing without stores");
            Vec::new()
        }
    }
}
