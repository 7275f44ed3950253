use serde::Serialize;
use serde_json::json;

use super::api_gateway::{ApiFailure, ApiGateway, ApiRequest, Payload};
use crate::models::Identity;

pub const ME_PATH: &str = "/auth/me";
pub const REGISTER_PATH: &str = "/auth/register";

#[derive(Debug, Serialize)]
pub struct Registration<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
}

/// Account endpoints reached through the gateway (credential attached).
pub struct AccountApi<'a> {
    gateway: &'a ApiGateway,
    profile_path: &'a str,
}

impl<'a> AccountApi<'a> {
    pub fn new(gateway: &'a ApiGateway) -> Self {
        Self {
            gateway,
            profile_path: ME_PATH,
        }
    }

    /// Where profile edits are persisted; `/auth/me` unless configured otherwise.
    pub fn with_profile_path(mut self, profile_path: &'a str) -> Self {
        self.profile_path = profile_path;
        self
    }

    pub async fn me(&self) -> Result<Identity, ApiFailure> {
        self.gateway.send(ApiRequest::get(ME_PATH)).await?.json()
    }

    pub async fn register(&self, registration: &Registration<'_>) -> Result<(), ApiFailure> {
        let body = json!({
            "email": registration.email,
            "password": registration.password,
            "full_name": registration.full_name,
        });
        self.gateway
            .send(ApiRequest::post(REGISTER_PATH).json(body))
            .await?;
        Ok(())
    }

    /// Saves the display name. Returns the updated identity when the backend
    /// echoes one back; some deployments only acknowledge the write.
    pub async fn update_profile(&self, full_name: &str) -> Result<Option<Identity>, ApiFailure> {
        let response = self
            .gateway
            .send(ApiRequest::put(self.profile_path).json(json!({ "full_name": full_name })))
            .await?;

        match response.body {
            Payload::Json(value) => Ok(serde_json::from_value(value).ok()),
            Payload::Text(_) => Ok(None),
        }
    }
}
