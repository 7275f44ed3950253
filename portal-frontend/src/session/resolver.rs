use super::auth_state::{AuthState, SessionStatus};
use crate::services::{AccountApi, ApiGateway};

/// Turns a stored credential into an identity, once per page load.
///
/// This is the only proactive validity check; everything else learns about
/// an expired credential from the gateway's 401 handling.
pub struct SessionResolver<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> SessionResolver<'a> {
    pub fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    pub async fn resolve(&self, state: &AuthState) -> SessionStatus {
        let credential = match state.token_store().get().await {
            Ok(credential) => credential,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read credential; treating session as anonymous");
                None
            }
        };

        if credential.is_none() {
            state.resolve_to(None);
            return SessionStatus::Anonymous;
        }

        match AccountApi::new(self.gateway).me().await {
            Ok(identity) => {
                tracing::debug!(user_id = %identity.id, "Session resolved");
                state.resolve_to(Some(identity));
                SessionStatus::Authenticated
            }
            Err(failure) => {
                tracing::info!(
                    status = ?failure.status,
                    message = %failure.message,
                    "Stored credential did not resolve; dropping it"
                );
                if let Err(e) = state.token_store().clear().await {
                    tracing::error!(error = %e, "Failed to clear unresolvable credential");
                }
                state.resolve_to(None);
                SessionStatus::Anonymous
            }
        }
    }
}
