use axum::{
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::session::guard::DEFAULT_VIEW;

pub const HX_REQUEST: &str = "HX-Request";
pub const HX_REDIRECT: &str = "HX-Redirect";

pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"))
}

/// Client navigation to `location`. htmx requests get an `HX-Redirect`
/// header, plain browser requests a `303 See Other`. A location that is
/// not a valid header value goes to the default view instead.
pub fn navigate(headers: &HeaderMap, location: &str) -> Response {
    let target = HeaderValue::from_str(location).unwrap_or_else(|_| {
        tracing::warn!(location = %location.escape_debug(), "Refusing invalid navigation target");
        HeaderValue::from_static(DEFAULT_VIEW)
    });

    if is_htmx(headers) {
        (StatusCode::OK, [(HX_REDIRECT, target)], "").into_response()
    } else {
        (StatusCode::SEE_OTHER, [(LOCATION, target)]).into_response()
    }
}
