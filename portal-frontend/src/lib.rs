pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod session;
pub mod startup;

use config::Settings;
use service_core::observability::MetricsHandle;
use services::{ApiGateway, AuthClient};
use session::{SessionEvents, TokenStore};
use std::sync::Arc;

/// Shared application state: configuration and the HTTP plumbing every
/// browser session borrows.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub http: reqwest::Client,
    pub auth_client: Arc<AuthClient>,
    pub metrics: MetricsHandle,
}

impl AppState {
    pub fn new(settings: Settings, metrics: MetricsHandle) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.api.request_timeout())
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        let auth_client = Arc::new(AuthClient::new(http.clone(), &settings.api.base_url));

        Ok(Self {
            settings: Arc::new(settings),
            http,
            auth_client,
            metrics,
        })
    }

    /// Gateway bound to one browser session's credential and event bus.
    pub fn gateway(&self, store: Arc<dyn TokenStore>, events: SessionEvents) -> ApiGateway {
        ApiGateway::new(self.http.clone(), &self.settings.api.base_url, store, events)
    }
}
