use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header::ALLOW, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};

use crate::admin::auth::is_authorized;
use crate::http::server::AppState;
use crate::registry::RegistryError;

/// Query parameter carrying the comma-separated backend list.
pub const BACKENDS_PARAM: &str = "backends";

/// First value of `backends`; repeated occurrences after it are ignored.
fn backends_param(params: Result<Query<Vec<(String, String)>>, QueryRejection>) -> String {
    params
        .ok()
        .and_then(|Query(pairs)| {
            pairs
                .into_iter()
                .find_map(|(name, value)| (name == BACKENDS_PARAM).then_some(value))
        })
        .unwrap_or_default()
}

/// Replace the backend set with the comma-separated `backends` query parameter.
pub async fn update_backends(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    if method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(ALLOW, "POST")],
            "Invalid request method",
        )
            .into_response();
    }

    if !is_authorized(&headers, state.admin.api_key.as_deref()) {
        tracing::warn!("Rejected backend update: bad or missing credentials");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let raw = backends_param(params);

    match state.registry.replace(&raw) {
        Ok(_) => (StatusCode::OK, "Backends updated successfully").into_response(),
        Err(RegistryError::InvalidInput) => {
            tracing::warn!(raw = %raw, "Rejected backend update: no backends provided");
            (StatusCode::BAD_REQUEST, "No backends provided").into_response()
        }
    }
}
