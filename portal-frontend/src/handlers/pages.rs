use askama::Template;

/// Placeholder shown while the session is still resolving. Re-requests the
/// page after `retry_secs`.
#[derive(Template)]
#[template(path = "loading.html")]
pub struct LoadingTemplate {
    pub retry_secs: u32,
}

impl LoadingTemplate {
    pub fn retry_in(retry_secs: u32) -> Self {
        Self { retry_secs }
    }
}
