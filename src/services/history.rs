use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    db::KeyValueStore,
    error::{AppError, AppResult},
    models::{DishCard, HistoryEntry, PreferenceQuery},
};

/// Maximum number of remembered recipe views
pub const HISTORY_CAPACITY: usize = 8;

/// Most-recently-viewed recipes, persisted under a single key
///
/// Entries are unique by dish name and ordered most recent first. All
/// mutations hold one lock across read, modify and persist, so concurrent
/// callers cannot reintroduce a duplicate.
pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// Reads persisted history once at startup
    ///
    /// Corrupt data is discarded and the store starts empty.
    pub async fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();

        let entries = match store.get(&key).await {
            Ok(Some(bytes)) => match decode(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(error = %e, key = %key, "Discarding malformed history");
                    if let Err(e) = store.delete(&key).await {
                        tracing::warn!(error = %e, "Failed to erase malformed history");
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "History unavailable, starting empty");
                Vec::new()
            }
        };

        tracing::info!(
            entries = entries.len(),
            backend = store.name(),
            "History loaded"
        );

        Self {
            store,
            key,
            entries: Mutex::new(entries),
        }
    }

    /// Records a view, moving an existing entry for the same dish to the front
    ///
    /// The in-memory list is updated even when persisting fails.
    pub async fn record(&self, card: DishCard, query: PreferenceQuery) -> AppResult<()> {
        let mut entries = self.entries.lock().await;

        entries.retain(|entry| entry.dish_name() != card.dish_name);
        entries.insert(0, HistoryEntry::new(card, query));
        entries.truncate(HISTORY_CAPACITY);

        tracing::debug!(
            dish = %entries[0].dish_name(),
            entries = entries.len(),
            "Recorded recipe view"
        );

        let bytes = serde_json::to_vec(&*entries)
            .map_err(|e| AppError::Internal(format!("History serialization error: {}", e)))?;
        self.store.set(&self.key, bytes).await?;

        Ok(())
    }

    pub async fn list(&self) -> Vec<HistoryEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn clear(&self) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        entries.clear();
        self.store.delete(&self.key).await?;

        tracing::info!("History cleared");

        Ok(())
    }
}

fn decode(bytes: &[u8]) -> AppResult<Vec<HistoryEntry>> {
    let mut entries: Vec<HistoryEntry> = serde_json::from_slice(bytes)
        .map_err(|e| AppError::Storage(format!("Malformed persisted history: {}", e)))?;

    // Stored data may predate the invariants; keep the first of each dish
    let mut seen = std::collections::HashSet::new();
    entries.retain(|entry| seen.insert(entry.dish_name().to_string()));
    entries.truncate(HISTORY_CAPACITY);

    Ok(entries)
}
