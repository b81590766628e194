//! Per-request handler plumbing.
//!
//! # Responsibilities
//! - Carry the request/response pair of one inbound call
//! - Define what a business handler exposes to the pipeline
//! - Memoize handler instances inside a per-request factory
//!
//! # Design Decisions
//! - A factory value is created once per request by the app's
//!   `create_factory` closure and dropped with it; nothing is shared
//!   across requests
//! - `HandlerSlot` builds its handler on first access, so sibling
//!   operations reached in the same request reuse one instance

use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::dispatch::error::RouteError;
use crate::dispatch::middleware::MiddlewareChain;
use crate::router::{ResponseSink, RouterRequest};
use crate::schema::{FieldErrors, Schema};

/// The request and response sink of one inbound call.
#[derive(Debug, Clone)]
pub struct RequestResponse {
    request: Arc<RouterRequest>,
    response: ResponseSink,
}

impl RequestResponse {
    pub fn new(request: RouterRequest, response: ResponseSink) -> Self {
        Self {
            request: Arc::new(request),
            response,
        }
    }

    pub fn request(&self) -> &RouterRequest {
        &self.request
    }

    pub fn response(&self) -> &ResponseSink {
        &self.response
    }
}

/// A business handler serving one or more sibling operations.
pub trait RouteHandler: Send + Sync {
    fn request_response(&self) -> &RequestResponse;

    /// Middleware wrapped around every operation this handler serves.
    /// The default is an empty, transparent chain.
    fn middleware(&self) -> MiddlewareChain {
        MiddlewareChain::new()
    }

    fn request(&self) -> &RouterRequest {
        self.request_response().request()
    }

    fn response(&self) -> &ResponseSink {
        self.request_response().response()
    }

    /// Validate the current request against an ad hoc schema and decode it.
    fn validate_request<T: DeserializeOwned>(&self, schema: &dyn Schema) -> Result<T, RouteError>
    where
        Self: Sized,
    {
        let value = schema
            .validate(&self.request().to_value())
            .map_err(|errors| RouteError::invalid_data("Request did not match the expected format", errors))?;
        decode(value)
    }
}

/// Decode a validated value into the operation's request type.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, RouteError> {
    serde_json::from_value(value).map_err(|e| {
        RouteError::invalid_data(
            "Request did not match the expected type",
            FieldErrors::single("$", e.to_string()),
        )
    })
}

/// Lazily built, memoized handler inside a per-request factory.
#[derive(Debug)]
pub struct HandlerSlot<H> {
    cell: OnceLock<H>,
}

impl<H> HandlerSlot<H> {
    pub const fn new() -> Self {
        Self { cell: OnceLock::new() }
    }

    pub fn get_or_init(&self, build: impl FnOnce() -> H) -> &H {
        self.cell.get_or_init(build)
    }

    pub fn get(&self) -> Option<&H> {
        self.cell.get()
    }
}

impl<H> Default for HandlerSlot<H> {
    fn default() -> Self {
        Self::new()
    }
}
