//! Transport seam between generated calls and the network.

use std::collections::BTreeMap;
use std::future::Future;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::routes::RouteMethod;

/// A fully rendered outgoing call. `path` already carries the query string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRequest {
    pub method: RouteMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Delivers a `ClientRequest`. Whatever it returns is handed back to the
/// caller unmodified.
#[async_trait]
pub trait Transport: Send + Sync {
    type Output: Send;

    async fn send(&self, request: ClientRequest) -> Self::Output;
}

/// Transport backed by an async closure.
pub struct FnTransport<F> {
    send: F,
}

#[async_trait]
impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(ClientRequest) -> Fut + Send + Sync,
    Fut: Future + Send + 'static,
    Fut::Output: Send,
{
    type Output = Fut::Output;

    async fn send(&self, request: ClientRequest) -> Fut::Output {
        (self.send)(request).await
    }
}

pub fn transport_fn<F, Fut>(send: F) -> FnTransport<F>
where
    F: Fn(ClientRequest) -> Fut + Send + Sync,
    Fut: Future + Send + 'static,
{
    FnTransport { send }
}
