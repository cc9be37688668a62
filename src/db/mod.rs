pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::create_redis_client;
pub use redis_store::RedisStore;

use crate::error::AppResult;

/// Byte-oriented key-value storage scoped to one client installation
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
