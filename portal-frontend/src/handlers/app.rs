use axum::response::{IntoResponse, Redirect};

use crate::session::guard::DEFAULT_VIEW;

pub async fn index() -> impl IntoResponse {
    Redirect::to(DEFAULT_VIEW)
}

pub async fn health_check() -> &'static str {
    "OK"
}
