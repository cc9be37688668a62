pub mod geolocation;
pub mod history;
pub mod prompts;
pub mod providers;
pub mod recipes;
pub mod recommendations;
pub mod search_tracker;

pub use geolocation::{ClientLocation, GeolocationSource};
pub use history::HistoryStore;
pub use providers::{GeminiGateway, GenerationGateway};
pub use recipes::RecipeExpander;
pub use recommendations::RecommendationPipeline;
pub use search_tracker::SearchTracker;
