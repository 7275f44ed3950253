use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use time::Duration;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    admin::admin_dashboard_handler,
    app::{health_check, index},
    auth::{login_handler, login_page, logout_handler, register_handler, register_page},
    items::{create_item, delete_item, edit_item_page, list_items, new_item_page, update_item},
    metrics::metrics,
    profile::{profile_handler, profile_page},
    user::dashboard_handler,
};
use crate::middleware::auth::{route_guard, session_middleware};
use crate::session::AccessRequirement;
use crate::AppState;

pub const ADMIN_ROLE: &str = "admin";

pub fn build_router(state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.settings.server.secure_cookie)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            state.settings.server.session_idle_hours,
        )));

    let signed_in = Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/profile", get(profile_page).post(profile_handler))
        .route("/items", get(list_items))
        .route("/items/new", get(new_item_page).post(create_item))
        .route("/items/:id/edit", get(edit_item_page).post(update_item))
        .route("/items/:id/delete", post(delete_item))
        .route_layer(from_fn_with_state(
            AccessRequirement::authenticated(),
            route_guard,
        ));

    let admin = Router::new()
        .route("/admin", get(admin_dashboard_handler))
        .route_layer(from_fn_with_state(
            AccessRequirement::any_of([ADMIN_ROLE]),
            route_guard,
        ));

    // Every page load resolves the browser session before its view runs.
    let pages = Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login_handler))
        .route("/register", get(register_page).post(register_handler))
        .route("/logout", get(logout_handler).post(logout_handler))
        .merge(signed_in)
        .merge(admin)
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(session_layer);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .merge(pages)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
