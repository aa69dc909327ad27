//! Request replication.
//!
//! # Responsibilities
//! - Buffer the inbound body once, bounded by `max_body_bytes`
//! - Build one outbound request per backend with the original method,
//!   path+query, headers and an independent view of the body
//! - Record construction failures per backend instead of failing the fan-out

use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_LENGTH, HOST, TRANSFER_ENCODING};
use axum::http::{request, Request};
use http_body_util::{BodyExt, LengthLimitError, Limited};

use crate::fanout::error::{AttemptError, FanoutError};
use crate::registry::Backend;

/// One outbound request, or the reason it could not be built.
#[derive(Debug)]
pub struct Replica {
    pub backend: Backend,
    pub request: Result<Request<Body>, AttemptError>,
}

/// Read the whole inbound body into memory, refusing anything over `limit` bytes.
pub async fn buffer_body(body: Body, limit: usize) -> Result<Bytes, FanoutError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(FanoutError::BodyTooLarge { limit }),
        Err(e) => Err(FanoutError::BodyRead(e)),
    }
}

/// Build one request per backend. The result has the same length and order as `backends`.
pub fn replicate(parts: &request::Parts, body: &Bytes, backends: &[Backend]) -> Vec<Replica> {
    backends
        .iter()
        .map(|backend| Replica {
            backend: backend.clone(),
            request: build_request(backend, parts, body),
        })
        .collect()
}

fn build_request(
    backend: &Backend,
    parts: &request::Parts,
    body: &Bytes,
) -> Result<Request<Body>, AttemptError> {
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    // Bytes clones share the buffer; each request reads its own cursor.
    let mut request = Request::builder()
        .method(parts.method.clone())
        .uri(backend.target(path_and_query))
        .body(Body::from(body.clone()))?;

    // Framing headers are recomputed by the client for the buffered body.
    let headers = request.headers_mut();
    for (name, value) in parts.headers.iter() {
        if name == HOST || name == CONTENT_LENGTH || name == TRANSFER_ENCODING {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    Ok(request)
}
