use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use service_core::observability::TracedClientExt;
use thiserror::Error;

use super::account_api::AccountApi;
use super::api_gateway::{failure_message, ApiFailure, ApiGateway, Payload};
use crate::models::Identity;
use crate::session::{AuthState, TokenStoreError};

pub const TOKEN_PATH: &str = "/auth/token";

#[derive(Debug, Error)]
pub enum LoginError {
    /// The backend refused the credentials; carries its message.
    #[error("{0}")]
    Rejected(String),

    #[error("No access_token in response")]
    MissingToken,

    #[error("Could not reach the server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not store credential: {0}")]
    Store(#[from] TokenStoreError),

    /// Credential obtained, but the identity lookup that follows failed.
    #[error("{0}")]
    Identity(#[from] ApiFailure),
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Obtains credentials from the backend's token endpoint.
///
/// This is the one call that bypasses the gateway: there is no credential to
/// attach yet, and a 401 here means "wrong password", not "session expired".
pub struct AuthClient {
    client: Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn obtain_token(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<String, LoginError> {
        let url = format!("{}{}", self.base_url, TOKEN_PATH);
        let form = [
            ("username", email),
            ("password", password.expose_secret().as_str()),
        ];

        let response = self.client.traced_post(&url).form(&form).send().await?;
        let status = response.status();
        let body = Payload::parse(response.text().await?);

        if !status.is_success() {
            tracing::info!(status = %status, "Token request rejected");
            return Err(LoginError::Rejected(failure_message(status, &body)));
        }

        let token = match body {
            Payload::Json(value) => serde_json::from_value::<TokenResponse>(value)
                .ok()
                .and_then(|t| t.access_token),
            Payload::Text(_) => None,
        };

        token
            .filter(|t| !t.is_empty())
            .ok_or(LoginError::MissingToken)
    }

    /// Obtains a credential, stores it, fetches the identity once and puts it
    /// on `state`, so the current load needs no separate resolution.
    pub async fn login(
        &self,
        gateway: &ApiGateway,
        state: &AuthState,
        email: &str,
        password: &Secret<String>,
    ) -> Result<Identity, LoginError> {
        let token = self.obtain_token(email, password).await?;
        state.token_store().set(token).await?;

        let identity = AccountApi::new(gateway).me().await?;
        state.set_identity(Some(identity.clone()));

        tracing::info!(
            user_id = %identity.id,
            email = %identity.email,
            "User logged in successfully"
        );
        Ok(identity)
    }
}
