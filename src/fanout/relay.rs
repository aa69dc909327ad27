//! Response relay.
//!
//! Writes the winner's status and headers, then streams its body. The body
//! is never buffered. An error mid-stream, or a backend that goes quiet for
//! longer than the idle timeout, ends the transfer and is only logged, since
//! the status line has already been committed. Trailers are not forwarded.

use std::time::Duration;

use axum::body::Body;
use axum::http::header::TRANSFER_ENCODING;
use axum::http::Response;
use axum::BoxError;
use futures_util::{stream, StreamExt};

use crate::fanout::error::AttemptError;
use crate::fanout::race::Winner;
use crate::registry::Backend;

pub fn relay(winner: Winner, idle_timeout: Duration) -> Response<Body> {
    let Winner {
        backend, response, ..
    } = winner;
    let (parts, body) = response.into_parts();

    let mut relayed = Response::new(stream_body(backend, body, idle_timeout));
    *relayed.status_mut() = parts.status;

    // Chunked framing is re-applied by the server connection.
    let headers = relayed.headers_mut();
    for (name, value) in parts.headers.iter() {
        if name == TRANSFER_ENCODING {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    relayed
}

/// Forward `body` chunk by chunk. The first error or idle gap is yielded once, then the stream ends.
fn stream_body(backend: Backend, body: Body, idle_timeout: Duration) -> Body {
    let chunks = stream::unfold(
        Some((body.into_data_stream(), backend)),
        move |state| async move {
            let (mut source, backend) = state?;
            let error: BoxError = match tokio::time::timeout(idle_timeout, source.next()).await {
                Ok(Some(Ok(chunk))) => return Some((Ok(chunk), Some((source, backend)))),
                Ok(None) => return None,
                Ok(Some(Err(e))) => e.into(),
                Err(_) => AttemptError::Timeout(idle_timeout).into(),
            };
            tracing::warn!(backend = %backend, error = %error, "Winning response failed mid-stream");
            Some((Err(error), None))
        },
    );
    Body::from_stream(chunks)
}
