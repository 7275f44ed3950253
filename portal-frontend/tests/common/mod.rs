#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use portal_frontend::config::{ApiSettings, ServerSettings, Settings, TelemetrySettings};
use portal_frontend::services::ApiGateway;
use portal_frontend::session::{MemoryTokenStore, SessionEvents, TokenStore};
use portal_frontend::startup::build_router;
use portal_frontend::AppState;
use serde_json::json;
use service_core::observability::detached_handle;
use std::sync::Arc;
use tower::util::ServiceExt;
use wiremock::matchers::{header as header_eq, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_PREFIX: &str = "/api/v1";

pub fn api_path(suffix: &str) -> String {
    format!("{}{}", API_PREFIX, suffix)
}

pub fn test_settings(backend: &MockServer) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            secure_cookie: false,
            session_idle_hours: 1,
        },
        api: ApiSettings {
            base_url: format!("{}{}", backend.uri(), API_PREFIX),
            request_timeout_secs: 5,
            resolve_timeout_ms: 2_000,
            profile_path: "/auth/me".to_string(),
        },
        telemetry: TelemetrySettings::default(),
    }
}

/// Gateway over an in-memory credential, pointed at the mock backend.
pub struct TestGateway {
    pub gateway: ApiGateway,
    pub store: Arc<MemoryTokenStore>,
    pub events: SessionEvents,
}

impl TestGateway {
    pub fn new(backend: &MockServer, credential: Option<&str>) -> Self {
        Self::with_base_url(&format!("{}{}", backend.uri(), API_PREFIX), credential)
    }

    pub fn with_base_url(base_url: &str, credential: Option<&str>) -> Self {
        let store = Arc::new(match credential {
            Some(token) => MemoryTokenStore::with_token(token),
            None => MemoryTokenStore::default(),
        });
        let events = SessionEvents::new();
        let gateway = ApiGateway::new(
            reqwest::Client::new(),
            base_url,
            store.clone(),
            events.clone(),
        );

        Self {
            gateway,
            store,
            events,
        }
    }

    pub async fn credential(&self) -> Option<String> {
        self.store.get().await.expect("memory store never fails")
    }
}

/// The full router in front of a mock backend.
pub struct TestApp {
    pub router: Router,
    pub backend: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(customise: impl FnOnce(&mut Settings)) -> Self {
        let backend = MockServer::start().await;
        let mut settings = test_settings(&backend);
        customise(&mut settings);
        let state = AppState::new(settings, detached_handle()).expect("Failed to build app state");

        TestApp {
            router: build_router(state),
            backend,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(request.body(Body::from(form.to_string())).unwrap())
            .await
            .unwrap()
    }

    /// Mounts a token endpoint and `/auth/me` for `token`, logs in and
    /// returns the session cookie.
    pub async fn login_as(&self, token: &str, identity: serde_json::Value) -> String {
        Mock::given(method("POST"))
            .and(path(api_path("/auth/token")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": token, "token_type": "bearer"})),
            )
            .mount(&self.backend)
            .await;
        Mock::given(method("GET"))
            .and(path(api_path("/auth/me")))
            .and(header_eq("authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(identity))
            .mount(&self.backend)
            .await;

        let response = self
            .post_form("/login", "email=user%40example.com&password=secret", None)
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        session_cookie(&response).expect("login should set a session cookie")
    }
}

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("id="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
