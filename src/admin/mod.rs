//! Administrative endpoint.
//!
//! `POST {update_path}?backends=a,b,c` swaps the whole backend set.
//! Routing lives in `http::server`; this module only handles the request.

pub mod auth;
pub mod handlers;

pub use handlers::{update_backends, BACKENDS_PARAM};
