use askama::Template;
use axum::response::IntoResponse;

use crate::models::{Identity, Item};
use crate::services::ItemsApi;
use crate::session::{AuthSession, CurrentUser};

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub viewer: Option<Identity>,
    pub current_page: &'static str,
    pub user: Identity,
    pub items: Vec<Item>,
    pub items_error: Option<String>,
}

pub async fn dashboard_handler(
    session: AuthSession,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    // A failed item fetch still renders the identity summary.
    let (items, items_error) = match ItemsApi::new(&session.gateway).list().await {
        Ok(items) => (items, None),
        Err(failure) => {
            tracing::warn!(
                user_id = %user.id,
                status = ?failure.status,
                message = %failure.message,
                "Could not load items for dashboard"
            );
            (Vec::new(), Some(failure.message))
        }
    };

    DashboardTemplate {
        viewer: Some(user.clone()),
        current_page: "dashboard",
        user,
        items,
        items_error,
    }
}
