//! Request correlation.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the caller did not send one
//! - Echo the ID back on the response
//!
//! # Design Decisions
//! - Request ID added as early as possible (outermost layer) so every
//!   trace span of the request carries it

use axum::http::{HeaderName, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::router::RouterRequest;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Produces a fresh UUID v4 for every request without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// The request ID a dispatched request carries, if it came through the server's layers.
pub fn request_id(request: &RouterRequest) -> Option<&str> {
    request.header(X_REQUEST_ID.as_str())
}
