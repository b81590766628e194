//! Middleware shared by the sample application's handlers.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;

use crate::dispatch::{Middleware, Next, RequestResponse, RouteError};
use crate::http::request_id;

/// Logs every operation with its outcome and latency.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLog;

#[async_trait]
impl Middleware for RequestLog {
    async fn handle(&self, context: &RequestResponse, request: Value, next: Next<'_>) -> Result<Value, RouteError> {
        let started = Instant::now();
        let result = next.run(request).await;
        tracing::debug!(
            request_id = request_id(context.request()).unwrap_or("-"),
            ok = result.is_ok(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Operation finished"
        );
        result
    }
}

/// Rejects requests without `Authorization: Bearer <key>`.
#[derive(Debug, Clone)]
pub struct RequireApiKey {
    key: String,
}

impl RequireApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn accepts(&self, authorization: Option<&str>) -> bool {
        authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|token| token == self.key)
    }
}

#[async_trait]
impl Middleware for RequireApiKey {
    async fn handle(&self, context: &RequestResponse, request: Value, next: Next<'_>) -> Result<Value, RouteError> {
        if !self.accepts(context.request().header("authorization")) {
            return Err(RouteError::invalid_request("Missing or invalid API key"));
        }
        next.run(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bearer_only() {
        let guard = RequireApiKey::new("s3cret");
        assert!(guard.accepts(Some("Bearer s3cret")));
        assert!(!guard.accepts(Some("Bearer other")));
        assert!(!guard.accepts(Some("s3cret")));
        assert!(!guard.accepts(Some("Bearer  s3cret ")));
        assert!(!guard.accepts(Some("Bearer s3cret ")));
        assert!(!guard.accepts(None));
    }
}
