use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use service_core::middleware::tracing::RequestId;
use std::sync::Arc;
use tower_sessions::Session;

use crate::handlers::navigation::navigate;
use crate::handlers::pages::LoadingTemplate;
use crate::session::{
    events, guard, AccessRequirement, AuthSession, AuthState, GuardDecision, SessionEvent,
    SessionEvents, SessionResolver, SessionTokenStore, TokenStore,
};
use crate::AppState;

/// Top-level view router for one page load.
///
/// Builds the browser session's auth state, resolves the stored credential,
/// hands the result to the view, and afterwards turns any published
/// [`SessionEvent`] into navigation to the login view.
pub async fn session_middleware(
    State(app): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let store: Arc<dyn TokenStore> = Arc::new(SessionTokenStore::new(session));
    let events = SessionEvents::new();
    let mut subscription = events.subscribe();

    let request_id = request.extensions().get::<RequestId>().map(|id| id.0.clone());
    let gateway = app
        .gateway(store.clone(), events.clone())
        .with_request_id(request_id);
    let state = AuthState::new(store, events);

    // Dropping the resolution future on timeout discards its late result.
    let budget = app.settings.api.resolve_timeout();
    match tokio::time::timeout(budget, SessionResolver::new(&gateway).resolve(&state)).await {
        Ok(status) => tracing::debug!(?status, "Session resolution finished"),
        Err(_) => tracing::warn!(
            budget_ms = budget.as_millis() as u64,
            "Session resolution still pending at budget"
        ),
    }

    let path = request.uri().path().to_string();
    let headers = request.headers().clone();
    request
        .extensions_mut()
        .insert(AuthSession { state, gateway });

    let response = next.run(request).await;

    let leave_for_login = events::drain(&mut subscription)
        .into_iter()
        .any(|event| matches!(event, SessionEvent::Invalidated | SessionEvent::LoggedOut));

    if leave_for_login && path != guard::LOGIN_PATH {
        tracing::info!(path = %path, "Session ended during request; routing to login");
        return navigate(&headers, guard::LOGIN_PATH);
    }

    response
}

/// Applies the access decision for the view behind this layer.
pub async fn route_guard(
    State(requirement): State<AccessRequirement>,
    session: AuthSession,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let snapshot = session.state.snapshot();

    match guard::evaluate(&snapshot, &requirement) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Loading => LoadingTemplate::retry_in(1).into_response(),
        GuardDecision::RedirectToLogin => {
            let requested = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            navigate(&headers, &guard::login_location(requested))
        }
        GuardDecision::RedirectToDefault => {
            if let Some(identity) = &snapshot.identity {
                tracing::info!(
                    user_id = %identity.id,
                    path = %request.uri().path(),
                    "Role requirement not met; falling back to default view"
                );
            }
            navigate(&headers, guard::DEFAULT_VIEW)
        }
    }
}
