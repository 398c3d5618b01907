pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use crate::config::Config;
use crate::error::Result;
use crate::services::save_service::{HttpSaveClient, SaveClient, StubSaveClient};
use crate::services::session_store::SessionStore;
use reqwest::Client;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub save_client: Arc<dyn SaveClient>,
    pub dashboard_path: String,
    pub max_import_bytes: usize,
}

impl AppState {
    pub fn new() -> Result<Self> {
        Self::from_config(crate::config::get_config()?)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let save_client: Arc<dyn SaveClient> = match &config.save_endpoint_url {
            Some(url) => {
                let http_client = Client::builder()
                    .timeout(std::time::Duration::from_secs(config.save_timeout_secs))
                    .build()?;
                tracing::info!(endpoint = %url, "saving tests through create-test endpoint");
                Arc::new(HttpSaveClient::new(url.clone(), http_client))
            }
            None => {
                tracing::warn!("SAVE_ENDPOINT_URL not set, submitted tests are only logged");
                Arc::new(StubSaveClient)
            }
        };

        Ok(Self::with_save_client(save_client, config))
    }

    pub fn with_save_client(save_client: Arc<dyn SaveClient>, config: &Config) -> Self {
        Self {
            sessions: SessionStore::new(),
            save_client,
            dashboard_path: config.dashboard_path.clone(),
            max_import_bytes: config.max_import_bytes,
        }
    }
}
