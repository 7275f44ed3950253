use askama::Template;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use validator::Validate;

use super::navigation::navigate;
use crate::models::forms::{first_validation_message, ProfileForm};
use crate::models::Identity;
use crate::services::AccountApi;
use crate::session::{guard, AuthSession, CurrentUser};
use crate::AppState;

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub viewer: Option<Identity>,
    pub current_page: &'static str,
    pub full_name: String,
    pub error: Option<String>,
}

impl ProfileTemplate {
    fn new(user: Identity, full_name: String) -> Self {
        Self {
            viewer: Some(user),
            current_page: "profile",
            full_name,
            error: None,
        }
    }
}

pub async fn profile_page(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    let full_name = user.full_name.clone().unwrap_or_default();
    ProfileTemplate::new(user, full_name)
}

pub async fn profile_handler(
    State(app): State<AppState>,
    session: AuthSession,
    CurrentUser(user): CurrentUser,
    headers: HeaderMap,
    Form(form): Form<ProfileForm>,
) -> Response {
    if let Err(errors) = form.validate() {
        let mut template = ProfileTemplate::new(user, form.full_name);
        template.error = Some(first_validation_message(&errors));
        return (StatusCode::UNPROCESSABLE_ENTITY, template).into_response();
    }

    let full_name = form.full_name.trim();
    let saved = AccountApi::new(&session.gateway)
        .with_profile_path(&app.settings.api.profile_path)
        .update_profile(full_name)
        .await;

    match saved {
        Ok(echoed) => {
            let updated = echoed.unwrap_or_else(|| with_full_name(user, full_name));
            tracing::info!(user_id = %updated.id, "Profile saved");
            session.state.set_identity(Some(updated));
            navigate(&headers, guard::DEFAULT_VIEW)
        }
        Err(failure) => {
            tracing::info!(user_id = %user.id, message = %failure.message, "Profile save rejected");
            let mut template = ProfileTemplate::new(user, form.full_name);
            template.error = Some(failure.message);
            (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
        }
    }
}

/// Local merge for backends that acknowledge the write without echoing the
/// identity.
fn with_full_name(mut identity: Identity, full_name: &str) -> Identity {
    identity.full_name = (!full_name.is_empty()).then(|| full_name.to_string());
    identity
}
