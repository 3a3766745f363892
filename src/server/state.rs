//! Application state shared across all request handlers.

use std::sync::Arc;

use tracing::{info, warn};

use crate::chat::ChatHandler;
use crate::config::{AppConfig, GOOGLE_API_KEY_ENV};
use crate::llm::{GeminiClient, GenerativeModel};
use crate::materials::{MaterialStore, SupabaseStore};

/// Shared application state.
pub struct AppState {
    /// Chat turn handler.
    pub chat: ChatHandler,
    /// Material store, also used by the listing endpoint.
    pub store: Arc<dyn MaterialStore>,
    /// Configuration the state was built from.
    pub config: AppConfig,
}

impl AppState {
    /// Build the production state: Gemini model and Supabase store.
    ///
    /// A missing model credential is not fatal here; chat turns report it.
    ///
    /// # Errors
    /// Returns an error if a client cannot be created.
    pub fn new(config: AppConfig) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let model = match config.gemini.api_key.as_deref() {
            Some(api_key) => {
                let client = GeminiClient::new(&config.gemini, api_key)
                    .map_err(|e| format!("Failed to create Gemini client: {e}"))?;
                info!(model = client.model(), "generative model configured");
                let model: Arc<dyn GenerativeModel> = Arc::new(client);
                Some(model)
            }
            None => {
                warn!("{GOOGLE_API_KEY_ENV} is not set; chat requests will fail");
                None
            }
        };

        let store = SupabaseStore::new(&config.supabase)
            .map_err(|e| format!("Failed to create material store: {e}"))?;
        info!(endpoint = %store.endpoint(), "material store configured");

        Self::with_components(config, model, Arc::new(store))
    }

    /// Build state around the given model and store.
    ///
    /// # Errors
    /// Returns an error if the chat handler cannot be created.
    pub fn with_components(
        config: AppConfig,
        model: Option<Arc<dyn GenerativeModel>>,
        store: Arc<dyn MaterialStore>,
    ) -> Result<Arc<Self>, Box<dyn std::error::Error + Send + Sync>> {
        let chat = ChatHandler::new(model, Arc::clone(&store), &config.chat, &config.materials)?
            .with_error_details(config.expose_error_details);
        Ok(Arc::new(Self {
            chat,
            store,
            config,
        }))
    }
}
