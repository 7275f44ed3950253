use askama::Template;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use secrecy::ExposeSecret;
use validator::Validate;

use super::navigation::navigate;
use crate::models::forms::{first_validation_message, LoginForm, LoginQuery, RegisterForm};
use crate::models::Identity;
use crate::services::account_api::Registration;
use crate::services::AccountApi;
use crate::session::{guard, AuthSession};
use crate::AppState;

const REGISTERED_NOTICE: &str = "Account created. Please sign in.";

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub viewer: Option<Identity>,
    pub current_page: &'static str,
    pub email: String,
    pub next: Option<String>,
    pub notice: Option<&'static str>,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub viewer: Option<Identity>,
    pub current_page: &'static str,
    pub full_name: String,
    pub email: String,
    pub error: Option<String>,
}

impl LoginTemplate {
    fn new(email: String, next: Option<String>) -> Self {
        Self {
            viewer: None,
            current_page: "login",
            email,
            next: next.filter(|n| !n.is_empty()),
            notice: None,
            error: None,
        }
    }
}

impl RegisterTemplate {
    fn new(full_name: String, email: String) -> Self {
        Self {
            viewer: None,
            current_page: "register",
            full_name,
            email,
            error: None,
        }
    }
}

pub async fn login_page(
    session: AuthSession,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    if session.state.identity().is_some() {
        return navigate(&headers, guard::safe_next(query.next.as_deref()));
    }

    let mut template = LoginTemplate::new(String::new(), query.next);
    if query.registered.is_some() {
        template.notice = Some(REGISTERED_NOTICE);
    }
    template.into_response()
}

pub async fn login_handler(
    State(app): State<AppState>,
    session: AuthSession,
    headers: HeaderMap,
    Form(mut form): Form<LoginForm>,
) -> Response {
    form.normalize();
    if let Err(errors) = form.validate() {
        return login_failure(form, first_validation_message(&errors));
    }

    let result = app
        .auth_client
        .login(&session.gateway, &session.state, &form.email, &form.password)
        .await;

    match result {
        Ok(_) => navigate(&headers, guard::safe_next(form.next.as_deref())),
        Err(e) => {
            tracing::info!(email = %form.email, error = %e, "Login failed");
            login_failure(form, e.to_string())
        }
    }
}

fn login_failure(form: LoginForm, message: String) -> Response {
    let mut template = LoginTemplate::new(form.email, form.next);
    template.error = Some(message);
    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

pub async fn register_page() -> impl IntoResponse {
    RegisterTemplate::new(String::new(), String::new())
}

pub async fn register_handler(
    session: AuthSession,
    headers: HeaderMap,
    Form(mut form): Form<RegisterForm>,
) -> Response {
    form.normalize();
    if let Err(errors) = form.validate() {
        return register_failure(form, first_validation_message(&errors));
    }

    let registration = Registration {
        email: &form.email,
        password: form.password.expose_secret(),
        full_name: &form.full_name,
    };

    match AccountApi::new(&session.gateway).register(&registration).await {
        Ok(()) => {
            tracing::info!(email = %registration.email, "Account registered");
            navigate(&headers, &format!("{}?registered=1", guard::LOGIN_PATH))
        }
        Err(failure) => {
            tracing::info!(status = ?failure.status, message = %failure.message, "Registration rejected");
            register_failure(form, failure.message)
        }
    }
}

fn register_failure(form: RegisterForm, message: String) -> Response {
    let mut template = RegisterTemplate::new(form.full_name, form.email);
    template.error = Some(message);
    (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
}

/// Ends the session. The session router turns the published logout into
/// navigation to the login view.
pub async fn logout_handler(session: AuthSession) -> StatusCode {
    session.state.logout().await;
    StatusCode::NO_CONTENT
}
