mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{api_path, body_text, location, TestApp};
use serde_json::json;
use std::time::Duration;
use tower::util::ServiceExt;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

fn user() -> serde_json::Value {
    json!({"id": 1, "email": "user@example.com", "full_name": "Grace Hopper", "role": "user"})
}

fn admin() -> serde_json::Value {
    json!({"id": 2, "email": "root@example.com", "roles": ["admin"]})
}

async fn mount_items(app: &TestApp, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(api_path("/items")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&app.backend)
        .await;
}

// =============================================================================
// Infrastructure routes
// =============================================================================

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn index_goes_to_dashboard() {
    let app = TestApp::spawn().await;

    let response = app.get("/", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));
}

// =============================================================================
// Route guard
// =============================================================================

#[tokio::test]
async fn anonymous_visit_redirects_to_login_with_next() {
    let app = TestApp::spawn().await;

    let response = app.get("/items?page=2", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login?next=%2Fitems%3Fpage%3D2"));

    let response = app.get("/dashboard", None).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn htmx_requests_are_redirected_with_hx_redirect() {
    let app = TestApp::spawn().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/profile")
                .header("HX-Request", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("HX-Redirect").unwrap(),
        "/login?next=%2Fprofile"
    );
}

#[tokio::test]
async fn admin_view_requires_admin_role() {
    let app = TestApp::spawn().await;
    mount_items(&app, json!([])).await;
    let cookie = app.login_as("user-token", user()).await;

    let response = app.get("/admin", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn admin_view_renders_for_admins() {
    let app = TestApp::spawn().await;
    mount_items(
        &app,
        json!([{"id": 1, "title": "Lamp", "status": "active"}, {"id": 2, "title": "Desk"}]),
    )
    .await;
    let cookie = app.login_as("admin-token", admin()).await;

    let response = app.get("/admin", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Administration"));
}

#[tokio::test]
async fn slow_resolution_shows_loading_placeholder() {
    let app = TestApp::spawn_with(|settings| settings.api.resolve_timeout_ms = 100).await;
    let cookie = app.login_as("slow-token", user()).await;

    Mock::given(method("GET"))
        .and(path(api_path("/auth/me")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user())
                .set_delay(Duration::from_secs(2)),
        )
        .with_priority(1)
        .mount(&app.backend)
        .await;

    let response = app.get("/dashboard", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("http-equiv=\"refresh\""));
}

// =============================================================================
// Login, registration and logout
// =============================================================================

#[tokio::test]
async fn login_follows_local_next_only() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/token")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
        .mount(&app.backend)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/auth/me")))
        .respond_with(ResponseTemplate::new(200).set_body_json(user()))
        .mount(&app.backend)
        .await;

    let response = app
        .post_form(
            "/login",
            "email=user%40example.com&password=pw&next=%2Fitems%2Fnew",
            None,
        )
        .await;
    assert_eq!(location(&response), Some("/items/new"));

    let response = app
        .post_form(
            "/login",
            "email=user%40example.com&password=pw&next=%2F%2Fevil.example",
            None,
        )
        .await;
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn login_refuses_next_with_control_characters() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("abc", user()).await;

    // Already signed in: the login page forwards to `next` straight away.
    let response = app.get("/login?next=/a%0Ab", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));

    let response = app
        .post_form(
            "/login",
            "email=user%40example.com&password=pw&next=%2F%09%2Fevil.example",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));

    let response = app
        .post_form(
            "/login",
            "email=user%40example.com&password=pw&next=%2Fa%0D%0Ab",
            None,
        )
        .await;
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn login_trims_the_email() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/token")))
        .and(body_string_contains("username=user%40example.com&"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "t"})))
        .expect(1)
        .mount(&app.backend)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path("/auth/me")))
        .respond_with(ResponseTemplate::new(200).set_body_json(user()))
        .mount(&app.backend)
        .await;

    let response = app
        .post_form("/login", "email=+user%40example.com+&password=pw", None)
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn failed_login_is_shown_inline() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/token")))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Incorrect email or password"})),
        )
        .mount(&app.backend)
        .await;

    let response = app
        .post_form("/login", "email=user%40example.com&password=nope", None)
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Incorrect email or password"));
}

#[tokio::test]
async fn duplicate_registration_shows_backend_detail() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/register")))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Email already registered"})),
        )
        .mount(&app.backend)
        .await;

    let response = app
        .post_form(
            "/register",
            "full_name=Ada&email=ada%40example.com&password=secret",
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Email already registered"));
}

#[tokio::test]
async fn successful_registration_goes_to_login() {
    let app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path(api_path("/auth/register")))
        .and(body_partial_json(json!({"email": "ada@example.com", "full_name": "Ada"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 4})))
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app
        .post_form(
            "/register",
            "full_name=Ada&email=ada%40example.com&password=secret",
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login?registered=1"));
}

#[tokio::test]
async fn logout_routes_to_login_and_ends_the_session() {
    let app = TestApp::spawn().await;
    mount_items(&app, json!([])).await;
    let cookie = app.login_as("abc", user()).await;

    let response = app.post_form("/logout", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn backend_rejection_mid_view_routes_to_login() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("abc", user()).await;
    Mock::given(method("GET"))
        .and(path(api_path("/items")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .mount(&app.backend)
        .await;

    let response = app.get("/items", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    // The credential is gone, so the next load resolves anonymous.
    let response = app.get("/profile", Some(&cookie)).await;
    assert_eq!(location(&response), Some("/login?next=%2Fprofile"));
}

// =============================================================================
// Pages
// =============================================================================

#[tokio::test]
async fn dashboard_shows_identity_and_items() {
    let app = TestApp::spawn().await;
    mount_items(&app, json!({"data": [{"id": 1, "title": "Brass lamp", "price": 12.5}]})).await;
    let cookie = app.login_as("abc", user()).await;

    let response = app.get("/dashboard", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Grace Hopper"));
    assert!(body.contains("Brass lamp"));
    assert!(body.contains("12.50"));
}

#[tokio::test]
async fn invalid_item_price_is_rejected_before_the_backend() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("abc", user()).await;
    Mock::given(method("POST"))
        .and(path(api_path("/items")))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.backend)
        .await;

    let response = app
        .post_form("/items/new", "title=Lamp&price=cheap", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response)
        .await
        .contains("Price must be a non-negative number"));
}

#[tokio::test]
async fn creating_an_item_posts_json_and_returns_to_list() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("abc", user()).await;
    Mock::given(method("POST"))
        .and(path(api_path("/items")))
        .and(body_partial_json(json!({"title": "Lamp", "price": 12.5})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9, "title": "Lamp"})))
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app
        .post_form("/items/new", "title=Lamp&description=&price=12.5", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/items"));
}

#[tokio::test]
async fn blank_title_is_rejected_before_the_backend() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("abc", user()).await;
    Mock::given(method("POST"))
        .and(path(api_path("/items")))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.backend)
        .await;

    let response = app
        .post_form("/items/new", "title=+++&price=", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Title is required"));
}

#[tokio::test]
async fn clearing_the_price_on_edit_sends_null() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("abc", user()).await;
    Mock::given(method("PUT"))
        .and(path(api_path("/items/3")))
        .and(body_partial_json(json!({"title": "Lamp", "price": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3, "title": "Lamp"})))
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app
        .post_form("/items/3/edit", "title=Lamp&description=&price=", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/items"));
}

#[tokio::test]
async fn editing_a_missing_item_is_not_found() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("abc", user()).await;
    Mock::given(method("GET"))
        .and(path(api_path("/items/404")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Item not found"})))
        .mount(&app.backend)
        .await;

    let response = app.get("/items/404/edit", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn saving_profile_updates_identity() {
    let app = TestApp::spawn().await;
    let cookie = app.login_as("abc", user()).await;
    Mock::given(method("PUT"))
        .and(path(api_path("/auth/me")))
        .and(body_partial_json(json!({"full_name": "Grace B. Hopper"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&app.backend)
        .await;

    let response = app
        .post_form("/profile", "full_name=Grace+B.+Hopper", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));
}
