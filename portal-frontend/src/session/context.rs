use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use service_core::error::AppError;

use super::auth_state::AuthState;
use super::guard::login_location;
use crate::models::Identity;
use crate::services::ApiGateway;

/// Everything a view needs to act for the browser session of this load.
///
/// Built once per request by the session router and handed to views through
/// request extensions; views never reach for global state.
#[derive(Clone)]
pub struct AuthSession {
    pub state: AuthState,
    pub gateway: ApiGateway,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthSession>().cloned().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "session router did not run for {}",
                parts.uri.path()
            ))
        })
    }
}

/// The signed-in identity. Rejects with a login redirect when absent, which
/// only happens if a view is mounted outside the route guard.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = AuthSession::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        match session.state.identity() {
            Some(identity) => Ok(CurrentUser(identity)),
            None => {
                let requested = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/");
                Err(Redirect::to(&login_location(requested)).into_response())
            }
        }
    }
}
