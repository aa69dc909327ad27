use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Check the bearer token against the configured key. No key configured means open access.
pub fn is_authorized(headers: &HeaderMap, api_key: Option<&str>) -> bool {
    let Some(key) = api_key else {
        return true;
    };

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == key)
}
