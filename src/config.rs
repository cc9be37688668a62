use serde::Deserialize;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Gemini API key
    pub gemini_api_key: String,

    /// Gemini API base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// Model used for dish proposals, recipes and store lookups
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for dish images
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Number of dishes requested per search
    #[serde(default = "default_proposal_count")]
    pub proposal_count: usize,

    /// Upper bound on waiting for the caller's position
    #[serde(default = "default_geolocation_timeout_ms")]
    pub geolocation_timeout_ms: u64,

    /// Redis connection URL. History is kept in memory when unset.
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Key holding the serialized view history
    #[serde(default = "default_history_key")]
    pub history_key: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_proposal_count() -> usize {
    3
}

fn default_geolocation_timeout_ms() -> u64 {
    5000
}

fn default_history_key() -> String {
    "recipeHistory".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
