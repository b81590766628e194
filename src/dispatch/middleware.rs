//! Composable middleware around route operations.
//!
//! A handler returns an ordered `MiddlewareChain` from
//! `RouteHandler::middleware`. The first layer added is the outermost: it
//! sees the validated request first and the operation's result last.
//!
//! ```text
//! validated request
//!     → layer 0 → layer 1 → ... → operation
//!     ← layer 0 ← layer 1 ← ... ← result
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::dispatch::error::RouteError;
use crate::dispatch::handler::RequestResponse;

/// One layer of cross-cutting behavior (authorization, auditing, ...).
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Run before, after or around `next`. Returning without calling
    /// `next.run` short-circuits the operation.
    async fn handle(&self, context: &RequestResponse, request: Value, next: Next<'_>) -> Result<Value, RouteError>;
}

/// The innermost step of a chain: the business operation itself.
pub trait Endpoint: Send + Sync {
    fn call<'s>(&'s self, request: Value) -> BoxFuture<'s, Result<Value, RouteError>>;
}

/// The rest of the chain, handed to each middleware.
pub struct Next<'a> {
    layers: &'a [Arc<dyn Middleware>],
    endpoint: &'a dyn Endpoint,
    context: &'a RequestResponse,
}

impl<'a> Next<'a> {
    pub fn run(self, request: Value) -> BoxFuture<'a, Result<Value, RouteError>> {
        match self.layers.split_first() {
            Some((layer, rest)) => {
                let next = Next {
                    layers: rest,
                    endpoint: self.endpoint,
                    context: self.context,
                };
                layer.handle(self.context, request, next)
            }
            None => self.endpoint.call(request),
        }
    }
}

/// Ordered list of middleware layers.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer inside the ones already present.
    pub fn with(mut self, layer: impl Middleware + 'static) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Append every layer of `inner` inside this chain's layers.
    pub fn extend(mut self, inner: MiddlewareChain) -> Self {
        self.layers.extend(inner.layers);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub async fn run(
        &self,
        context: &RequestResponse,
        request: Value,
        endpoint: &dyn Endpoint,
    ) -> Result<Value, RouteError> {
        Next {
            layers: &self.layers,
            endpoint,
            context,
        }
        .run(request)
        .await
    }
}
