//! Single choke point for calls to the REST backend.
//!
//! Every outbound request goes through [`ApiGateway::send`], which attaches the
//! bearer credential when one is stored, normalises the response into
//! `Result<ApiResponse, ApiFailure>`, and reacts to HTTP 401 by clearing the
//! credential and publishing [`SessionEvent::Invalidated`].

use reqwest::{Client, Method, StatusCode, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use service_core::error::AppError;
use service_core::observability::TracedClientExt;
use std::sync::Arc;
use thiserror::Error;

use crate::session::{SessionEvent, SessionEvents, TokenStore};

pub enum RequestBody {
    Empty,
    Json(Value),
    /// Pre-built multipart payload; content-type is left to the transport.
    Multipart(reqwest::multipart::Form),
}

pub struct ApiRequest {
    method: Method,
    path: String,
    body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }
}

/// Response body: JSON when it parses, the raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn parse(raw: String) -> Self {
        match serde_json::from_str(&raw) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(raw),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Payload,
}

impl ApiResponse {
    /// Decodes the body into `T`; a mismatching body is reported as a failure.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiFailure> {
        let value = match self.body {
            Payload::Json(value) => value,
            Payload::Text(text) => {
                tracing::warn!(status = %self.status, len = text.len(), "Expected JSON body from backend");
                return Err(ApiFailure::unexpected(self.status));
            }
        };

        serde_json::from_value(value).map_err(|e| {
            tracing::warn!(status = %self.status, error = %e, "Backend body did not match expected shape");
            ApiFailure::unexpected(self.status)
        })
    }
}

/// A call that did not succeed. `status` is `None` when no response arrived.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiFailure {
    pub status: Option<StatusCode>,
    pub message: String,
}

impl ApiFailure {
    pub fn from_response(status: StatusCode, body: &Payload) -> Self {
        Self {
            status: Some(status),
            message: failure_message(status, body),
        }
    }

    pub fn transport(error: &reqwest::Error) -> Self {
        Self {
            status: None,
            message: format!("Could not reach the server: {}", error),
        }
    }

    fn unexpected(status: StatusCode) -> Self {
        Self {
            status: Some(status),
            message: "Unexpected response from server".to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(StatusCode::UNAUTHORIZED)
    }
}

pub type ApiResult = Result<ApiResponse, ApiFailure>;

impl From<ApiFailure> for AppError {
    fn from(failure: ApiFailure) -> Self {
        match failure.status {
            Some(StatusCode::NOT_FOUND) => AppError::NotFound(anyhow::anyhow!(failure.message)),
            Some(status) if !status.is_server_error() => {
                AppError::BadRequest(anyhow::anyhow!(failure.message))
            }
            _ => AppError::BadGateway(failure.message),
        }
    }
}

/// Human-readable failure text: `detail`, then `error`, then `message`, then
/// the status line's reason phrase.
pub fn failure_message(status: StatusCode, body: &Payload) -> String {
    if let Payload::Json(Value::Object(fields)) = body {
        for key in ["detail", "error", "message"] {
            match fields.get(key) {
                None | Some(Value::Null) => continue,
                Some(Value::String(text)) if text.is_empty() => continue,
                Some(Value::String(text)) => return text.clone(),
                Some(other) => return other.to_string(),
            }
        }
    }

    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

#[derive(Clone)]
pub struct ApiGateway {
    client: Client,
    base_url: Arc<str>,
    store: Arc<dyn TokenStore>,
    events: SessionEvents,
    request_id: Option<Arc<str>>,
}

impl ApiGateway {
    pub fn new(
        client: Client,
        base_url: &str,
        store: Arc<dyn TokenStore>,
        events: SessionEvents,
    ) -> Self {
        Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            store,
            events,
            request_id: None,
        }
    }

    /// Forward the inbound request id to the backend on every call.
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id.map(Arc::from);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn send(&self, request: ApiRequest) -> ApiResult {
        let url = format!("{}{}", self.base_url, request.path);
        let method = request.method.clone();

        let mut outbound = self.client.traced_request(request.method, &url);

        match self.store.get().await {
            Ok(Some(credential)) => outbound = outbound.bearer_auth(credential),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Could not read credential; sending unauthenticated");
            }
        }

        outbound = match request.body {
            RequestBody::Empty => outbound.header(CONTENT_TYPE.as_str(), "application/json"),
            RequestBody::Json(body) => outbound.json(&body),
            RequestBody::Multipart(form) => outbound.multipart(form),
        };

        let response = match outbound.send_with_request_id(self.request_id.as_deref()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(method = %method, url = %url, error = %e, "Backend request failed");
                metrics::counter!(
                    "api_gateway_requests_total",
                    "method" => method.to_string(),
                    "status" => "transport_error"
                )
                .increment(1);
                return Err(ApiFailure::transport(&e));
            }
        };

        let status = response.status();
        metrics::counter!(
            "api_gateway_requests_total",
            "method" => method.to_string(),
            "status" => status.as_u16().to_string()
        )
        .increment(1);

        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_session(&method, &url).await;
        }

        let body = match response.text().await {
            Ok(raw) => Payload::parse(raw),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Failed to read backend response body");
                Payload::Text(String::new())
            }
        };

        if status.is_success() {
            Ok(ApiResponse { status, body })
        } else {
            let failure = ApiFailure::from_response(status, &body);
            tracing::debug!(method = %method, url = %url, status = %status, message = %failure.message, "Backend returned failure");
            Err(failure)
        }
    }

    async fn invalidate_session(&self, method: &Method, url: &str) {
        tracing::warn!(method = %method, url = %url, "Credential rejected by backend; ending session");
        if let Err(e) = self.store.clear().await {
            tracing::error!(error = %e, "Failed to clear rejected credential");
        }
        self.events.publish(SessionEvent::Invalidated);
    }
}
