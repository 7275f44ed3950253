use askama::Template;
use axum::response::IntoResponse;

use crate::models::{Identity, Item};
use crate::services::ItemsApi;
use crate::session::{AuthSession, CurrentUser};

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub viewer: Option<Identity>,
    pub current_page: &'static str,
    pub total_items: usize,
    pub active_items: usize,
    pub items_error: Option<String>,
}

impl AdminTemplate {
    fn summarise(user: Identity, items: &[Item]) -> Self {
        Self {
            viewer: Some(user),
            current_page: "admin",
            total_items: items.len(),
            active_items: items.iter().filter(|item| item.is_active()).count(),
            items_error: None,
        }
    }
}

/// Overview for administrators; the route guard keeps everyone else out.
pub async fn admin_dashboard_handler(
    session: AuthSession,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    match ItemsApi::new(&session.gateway).list().await {
        Ok(items) => AdminTemplate::summarise(user, &items),
        Err(failure) => {
            let mut template = AdminTemplate::summarise(user, &[]);
            template.items_error = Some(failure.message);
            template
        }
    }
}
