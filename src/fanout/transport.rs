//! Outbound HTTP transport.
//!
//! The race coordinator only needs "send one request, get one response";
//! keeping that behind a trait lets the coordinator run against an
//! in-memory transport in tests.

use std::future::Future;

use axum::body::Body;
use axum::http::{Request, Response};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::fanout::error::AttemptError;

pub trait Transport: Clone + Send + Sync + 'static {
    /// Send `request` and resolve once the response head has arrived.
    fn send(
        &self,
        request: Request<Body>,
    ) -> impl Future<Output = Result<Response<Body>, AttemptError>> + Send;
}

/// Pooled hyper-util client shared by every attempt.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
}

impl HyperTransport {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    fn send(
        &self,
        request: Request<Body>,
    ) -> impl Future<Output = Result<Response<Body>, AttemptError>> + Send {
        let response = self.client.request(request);
        async move {
            response
                .await
                .map(|response| response.map(Body::new))
                .map_err(|e| AttemptError::Transport(Box::new(e)))
        }
    }
}
