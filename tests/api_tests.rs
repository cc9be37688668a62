use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use tokio::sync::Notify;

use pantry_chef::{
    db::{KeyValueStore, MemoryStore},
    error::{AppError, AppResult},
    models::{
        Coordinates, DishCard, DishProposal, HistoryEntry, PreferenceQuery, RecipeDetails,
        Recommendations, StoreResult,
    },
    routes::{create_router, AppState},
    services::{GenerationGateway, HistoryStore},
};

const HISTORY_KEY: &str = "recipeHistory";

/// In-process gateway with switchable failures
#[derive(Default)]
struct FakeGateway {
    fail_proposals: bool,
    blocked_dish: Option<&'static str>,
    fail_recipes: bool,
    /// Proposals for this cuisine wait for `release_slow`
    slow_cuisine: Option<&'static str>,
    slow_started: Notify,
    release_slow: Notify,
    store_calls: AtomicUsize,
    recipe_calls: AtomicUsize,
}

#[async_trait::async_trait]
impl GenerationGateway for FakeGateway {
    async fn propose_dishes(&self, query: &PreferenceQuery) -> AppResult<Vec<DishProposal>> {
        if self.fail_proposals {
            return Err(AppError::Upstream("Gemini returned an empty response".to_string()));
        }
        if self.slow_cuisine == Some(query.cuisine.as_str()) {
            self.slow_started.notify_one();
            self.release_slow.notified().await;
        }

        Ok(["Tomato Rice", "Lemon Rice", "Curd Rice"]
            .iter()
            .map(|name| DishProposal {
                dish_name: name.to_string(),
                description: format!("{} from the pantry", name),
                ingredients: query.include_ingredients.clone(),
            })
            .collect())
    }

    async fn render_dish_image(
        &self,
        proposal: &DishProposal,
        _dietary_restriction: &str,
    ) -> AppResult<String> {
        if self.blocked_dish == Some(proposal.dish_name.as_str()) {
            return Err(AppError::GenerationBlocked {
                dish: proposal.dish_name.clone(),
                reason: "IMAGE_SAFETY".to_string(),
            });
        }
        Ok(format!("base64-{}", proposal.dish_name))
    }

    async fn find_nearby_stores(&self, _coordinates: Coordinates) -> AppResult<Vec<StoreResult>> {
        self.store_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            StoreResult {
                name: "Green Grocer".to_string(),
                uri: "https://maps.example/green".to_string(),
            },
            StoreResult {
                name: "Green Grocer Annex".to_string(),
                uri: "https://maps.example/green".to_string(),
            },
            StoreResult {
                name: "Daily Needs".to_string(),
                uri: "https://maps.example/daily".to_string(),
            },
        ])
    }

    async fn expand_recipe(
        &self,
        dish_name: &str,
        _description: &str,
        _query: &PreferenceQuery,
    ) -> AppResult<RecipeDetails> {
        self.recipe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_recipes {
            return Err(AppError::Upstream("Unparsable recipe".to_string()));
        }
        Ok(RecipeDetails {
            ingredients: vec!["1 cup rice".to_string()],
            instructions: vec![format!("Cook the {}", dish_name), "Serve".to_string()],
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Backend that reads fine but rejects every write
struct ReadOnlyStore;

#[async_trait::async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> AppResult<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: Vec<u8>) -> AppResult<()> {
        Err(AppError::Storage("read-only replica".to_string()))
    }

    async fn delete(&self, _key: &str) -> AppResult<()> {
        Err(AppError::Storage("read-only replica".to_string()))
    }

    fn name(&self) -> &'static str {
        "read-only"
    }
}

async fn create_test_server_with(
    gateway: Arc<FakeGateway>,
    store: Arc<dyn KeyValueStore>,
) -> TestServer {
    let history = HistoryStore::load(store, HISTORY_KEY).await;
    let state = AppState::new(gateway, history, Duration::from_millis(100));
    TestServer::new(create_router(Arc::new(state))).unwrap()
}

async fn create_test_server(gateway: FakeGateway) -> (TestServer, Arc<FakeGateway>) {
    let gateway = Arc::new(gateway);
    let server = create_test_server_with(gateway.clone(), Arc::new(MemoryStore::new())).await;
    (server, gateway)
}

fn card_json(name: &str) -> Value {
    json!({
        "dish_name": name,
        "description": format!("{} from the pantry", name),
        "ingredients": ["rice"],
        "image_data": "base64"
    })
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server(FakeGateway::default()).await;
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_request_id_echoed() {
    let (server, _) = create_test_server(FakeGateway::default()).await;
    let id = "6f1c1f7e-8d4a-4a4b-9c55-0d7d8b2f6a10";

    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static(id),
        )
        .await;

    assert_eq!(response.header("x-request-id"), id);
}

#[tokio::test]
async fn test_recommendations_with_ingredients() {
    let (server, gateway) = create_test_server(FakeGateway::default()).await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "cuisine": "South Indian",
            "dietary_restriction": "Vegetarian",
            "include_ingredients": ["rice", "tomato", "rice"],
            "location": { "latitude": 12.97, "longitude": 77.59 }
        }))
        .await;

    response.assert_status_ok();
    let result: Recommendations = response.json();

    let names: Vec<&str> = result.cards.iter().map(|c| c.dish_name.as_str()).collect();
    assert_eq!(names, vec!["Tomato Rice", "Lemon Rice", "Curd Rice"]);
    assert_eq!(result.cards[0].image_data.as_deref(), Some("base64-Tomato Rice"));
    assert_eq!(result.cards[0].ingredients, vec!["rice", "tomato"]);
    assert!(result.stores.is_empty());
    assert!(result.error.is_none());
    assert_eq!(gateway.store_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_recommendations_include_deduped_stores() {
    let (server, gateway) = create_test_server(FakeGateway::default()).await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({
            "cuisine": "Italian",
            "location": { "latitude": 40.7, "longitude": -74.0 }
        }))
        .await;

    response.assert_status_ok();
    let result: Recommendations = response.json();

    assert_eq!(gateway.store_calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.stores.len(), 2);
    assert_eq!(result.stores[0].name, "Green Grocer");
    assert_eq!(result.stores[1].name, "Daily Needs");
}

#[tokio::test]
async fn test_recommendations_without_location() {
    let (server, gateway) = create_test_server(FakeGateway::default()).await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "cuisine": "Thai" }))
        .await;

    response.assert_status_ok();
    let result: Recommendations = response.json();
    assert_eq!(result.cards.len(), 3);
    assert!(result.stores.is_empty());
    assert_eq!(gateway.store_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_proposal_failure_maps_to_bad_gateway() {
    let (server, _) = create_test_server(FakeGateway {
        fail_proposals: true,
        ..Default::default()
    })
    .await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "include_ingredients": ["egg"] }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["cards"], json!([]));
    assert_eq!(body["error"]["kind"], "upstream");
}

#[tokio::test]
async fn test_blocked_image_fails_whole_batch() {
    let (server, _) = create_test_server(FakeGateway {
        blocked_dish: Some("Lemon Rice"),
        ..Default::default()
    })
    .await;

    let response = server
        .post("/api/v1/recommendations")
        .json(&json!({ "include_ingredients": ["rice"] }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["cards"], json!([]));
    assert_eq!(body["error"]["kind"], "generation_blocked");
    assert_eq!(body["error"]["reason"], "IMAGE_SAFETY");
}

#[tokio::test]
async fn test_superseded_search_is_discarded() {
    let (server, gateway) = create_test_server(FakeGateway {
        slow_cuisine: Some("Slow"),
        ..Default::default()
    })
    .await;

    let first = async {
        server
            .post("/api/v1/recommendations")
            .json(&json!({ "cuisine": "Slow", "include_ingredients": ["rice"] }))
            .await
    };
    // The newer search starts while the first is still proposing
    let second = async {
        gateway.slow_started.notified().await;
        let response = server
            .post("/api/v1/recommendations")
            .json(&json!({ "cuisine": "Fast", "include_ingredients": ["rice"] }))
            .await;
        gateway.release_slow.notify_one();
        response
    };

    let (first, second) = tokio::join!(first, second);

    second.assert_status_ok();
    first.assert_status(StatusCode::CONFLICT);
    let body: Value = first.json();
    assert_eq!(body["error"]["kind"], "superseded");
    assert_eq!(body["cards"], json!([]));
}

#[tokio::test]
async fn test_open_recipe_expands_and_records_history() {
    let (server, _) = create_test_server(FakeGateway::default()).await;

    let response = server
        .post("/api/v1/recipes")
        .json(&json!({
            "card": card_json("Lemon Rice"),
            "query": { "cuisine": "Indian", "dietary_restriction": "Vegan", "include_ingredients": ["rice"] }
        }))
        .await;

    response.assert_status_ok();
    let card: DishCard = response.json();
    assert_eq!(card.ingredients, vec!["1 cup rice"]);
    assert_eq!(
        card.instructions,
        Some(vec!["Cook the Lemon Rice".to_string(), "Serve".to_string()])
    );
    assert_eq!(card.image_data.as_deref(), Some("base64"));

    let history: Vec<HistoryEntry> = server.get("/api/v1/history").await.json();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].card.dish_name, "Lemon Rice");
    assert_eq!(history[0].query.dietary_restriction, "Vegan");
}

#[tokio::test]
async fn test_reopening_refetches_and_moves_to_front() {
    let (server, gateway) = create_test_server(FakeGateway::default()).await;

    for name in ["Tomato Rice", "Lemon Rice", "Tomato Rice"] {
        server
            .post("/api/v1/recipes")
            .json(&json!({ "card": card_json(name), "query": {} }))
            .await
            .assert_status_ok();
    }

    assert_eq!(gateway.recipe_calls.load(Ordering::SeqCst), 3);

    let history: Vec<HistoryEntry> = server.get("/api/v1/history").await.json();
    let names: Vec<&str> = history.iter().map(|e| e.card.dish_name.as_str()).collect();
    assert_eq!(names, vec!["Tomato Rice", "Lemon Rice"]);
}

#[tokio::test]
async fn test_failed_expansion_still_records_view() {
    let (server, _) = create_test_server(FakeGateway {
        fail_recipes: true,
        ..Default::default()
    })
    .await;

    let response = server
        .post("/api/v1/recipes")
        .json(&json!({ "card": card_json("Curd Rice"), "query": {} }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);

    let history: Vec<HistoryEntry> = server.get("/api/v1/history").await.json();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_history_write_failure_does_not_block_recipe() {
    let gateway = Arc::new(FakeGateway::default());
    let server = create_test_server_with(gateway.clone(), Arc::new(ReadOnlyStore)).await;

    let response = server
        .post("/api/v1/recipes")
        .json(&json!({ "card": card_json("Lemon Rice"), "query": {} }))
        .await;

    response.assert_status_ok();
    let card: DishCard = response.json();
    assert_eq!(
        card.instructions,
        Some(vec!["Cook the Lemon Rice".to_string(), "Serve".to_string()])
    );
    assert_eq!(gateway.recipe_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_history_capacity_over_http() {
    let (server, _) = create_test_server(FakeGateway::default()).await;

    for i in 1..=9 {
        server
            .post("/api/v1/recipes")
            .json(&json!({ "card": card_json(&format!("Dish {}", i)), "query": {} }))
            .await
            .assert_status_ok();
    }

    let history: Vec<HistoryEntry> = server.get("/api/v1/history").await.json();
    assert_eq!(history.len(), 8);
    assert_eq!(history[0].card.dish_name, "Dish 9");
    assert_eq!(history[7].card.dish_name, "Dish 2");
}

#[tokio::test]
async fn test_clear_history_survives_restart() {
    let gateway = Arc::new(FakeGateway::default());
    let store = Arc::new(MemoryStore::new());
    let server = create_test_server_with(gateway.clone(), store.clone()).await;

    server
        .post("/api/v1/recipes")
        .json(&json!({ "card": card_json("Tomato Rice"), "query": {} }))
        .await
        .assert_status_ok();

    // Restart keeps the persisted view
    let restarted = create_test_server_with(gateway.clone(), store.clone()).await;
    let history: Vec<HistoryEntry> = restarted.get("/api/v1/history").await.json();
    assert_eq!(history.len(), 1);

    restarted
        .delete("/api/v1/history")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_eq!(store.get(HISTORY_KEY).await.unwrap(), None);

    let restarted = create_test_server_with(gateway, store).await;
    let history: Vec<HistoryEntry> = restarted.get("/api/v1/history").await.json();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_malformed_history_starts_empty() {
    let store = Arc::new(MemoryStore::with_entry(HISTORY_KEY, "\u{0}garbage"));
    let server = create_test_server_with(Arc::new(FakeGateway::default()), store).await;

    let response = server.get("/api/v1/history").await;
    response.assert_status_ok();
    let history: Vec<HistoryEntry> = response.json();
    assert!(history.is_empty());
}
