//! Client call generation.
//!
//! # Data Flow
//! ```text
//! RouteDefs ──RoutesClient::new──▶ tree of RouteCall (same names as the defs)
//!
//! RouteCall::call(CallRequest {params, query, headers, body})
//!     → compiled template (built once, cached)
//!     → render params (percent-encoded) + query string
//!     → ClientRequest {method, path, headers, body}
//!     → Transport::send → Output, returned unmodified
//! ```
//!
//! # Design Decisions
//! - Paths are composed with the same `join_path` the server binder uses
//! - The client never validates responses; that is the caller's business

pub mod http;
pub mod transport;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use thiserror::Error;
use url::form_urlencoded;

use crate::observability::metrics;
use crate::routes::{join_path, PathTemplate, RenderError, RouteDefEntry, RouteDefs, RouteMethod, TemplateError};

pub use http::{HttpTransport, TransportError, TransportResponse};
pub use transport::{transport_fn, ClientRequest, FnTransport, Transport};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no route or group named '{0}'")]
    UnknownRoute(String),

    #[error("'{0}' is a group, not a route")]
    NotARoute(String),

    #[error("'{0}' is a route, not a group")]
    NotAGroup(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Inputs of one call. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallRequest {
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl CallRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.insert(name.to_string(), value.into());
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Callable stub for one route.
pub struct RouteCall<T> {
    name: String,
    method: RouteMethod,
    path: String,
    compiled: OnceLock<PathTemplate>,
    transport: Arc<T>,
}

impl<T: Transport> RouteCall<T> {
    /// Dotted name from the root of the tree, e.g. `api.items.list`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> RouteMethod {
        self.method
    }

    /// Full path template (all group prefixes applied).
    pub fn path(&self) -> &str {
        &self.path
    }

    fn template(&self) -> Result<&PathTemplate, ClientError> {
        if let Some(template) = self.compiled.get() {
            return Ok(template);
        }
        let parsed = PathTemplate::parse(&self.path)?;
        Ok(self.compiled.get_or_init(|| parsed))
    }

    /// Build the outgoing request without sending it.
    pub fn render(&self, request: CallRequest) -> Result<ClientRequest, ClientError> {
        let mut path = self.template()?.render(&request.params)?;
        if !request.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&request.query)
                .finish();
            path.push('?');
            path.push_str(&query);
        }
        Ok(ClientRequest {
            method: self.method,
            path,
            headers: request.headers,
            body: request.body,
        })
    }

    pub async fn call(&self, request: CallRequest) -> Result<T::Output, ClientError> {
        let outgoing = self.render(request)?;
        metrics::record_client_call(self.method, &self.path);
        Ok(self.transport.send(outgoing).await)
    }
}

enum ClientNode<T> {
    Call(RouteCall<T>),
    Group(RoutesClient<T>),
}

/// Client tree mirroring a `RouteDefs` tree.
pub struct RoutesClient<T> {
    prefix: String,
    nodes: BTreeMap<String, ClientNode<T>>,
}

impl<T: Transport> RoutesClient<T> {
    pub fn new(defs: &RouteDefs, transport: T) -> Self {
        Self::with_prefix(defs, "/", transport)
    }

    /// Mount the tree under `prefix`, mirroring `RoutesBinder::new`.
    pub fn with_prefix(defs: &RouteDefs, prefix: &str, transport: T) -> Self {
        Self::build(defs, &join_path(&["/", prefix]), "", &Arc::new(transport))
    }

    fn build(defs: &RouteDefs, prefix: &str, name_prefix: &str, transport: &Arc<T>) -> Self {
        let nodes = defs
            .iter()
            .map(|(key, entry)| {
                let name = if name_prefix.is_empty() {
                    key.to_string()
                } else {
                    format!("{}.{}", name_prefix, key)
                };
                let node = match entry {
                    RouteDefEntry::Group(group) => {
                        let group_prefix = join_path(&[prefix, group.prefix()]);
                        ClientNode::Group(Self::build(group.children(), &group_prefix, &name, transport))
                    }
                    RouteDefEntry::Route(route) => ClientNode::Call(RouteCall {
                        path: join_path(&[prefix, route.path()]),
                        method: route.method(),
                        name,
                        compiled: OnceLock::new(),
                        transport: Arc::clone(transport),
                    }),
                };
                (key.to_string(), node)
            })
            .collect();

        Self {
            prefix: prefix.to_string(),
            nodes,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn group(&self, name: &str) -> Result<&RoutesClient<T>, ClientError> {
        match self.nodes.get(name) {
            Some(ClientNode::Group(group)) => Ok(group),
            Some(ClientNode::Call(_)) => Err(ClientError::NotAGroup(name.to_string())),
            None => Err(ClientError::UnknownRoute(name.to_string())),
        }
    }

    pub fn route(&self, name: &str) -> Result<&RouteCall<T>, ClientError> {
        match self.nodes.get(name) {
            Some(ClientNode::Call(call)) => Ok(call),
            Some(ClientNode::Group(_)) => Err(ClientError::NotARoute(name.to_string())),
            None => Err(ClientError::UnknownRoute(name.to_string())),
        }
    }

    /// Look up a route by dotted name, e.g. `api.sampleResource.get`.
    pub fn resolve(&self, dotted: &str) -> Result<&RouteCall<T>, ClientError> {
        let (groups, leaf) = match dotted.rsplit_once('.') {
            Some((groups, leaf)) => (Some(groups), leaf),
            None => (None, dotted),
        };
        let mut current = self;
        for name in groups.into_iter().flat_map(|g| g.split('.')) {
            current = current.group(name).map_err(|_| ClientError::UnknownRoute(dotted.to_string()))?;
        }
        current.route(leaf).map_err(|e| match e {
            ClientError::NotARoute(_) => ClientError::NotARoute(dotted.to_string()),
            _ => ClientError::UnknownRoute(dotted.to_string()),
        })
    }

    /// Every route call in the tree, depth first in name order.
    pub fn calls(&self) -> Vec<&RouteCall<T>> {
        let mut out = Vec::new();
        for node in self.nodes.values() {
            match node {
                ClientNode::Call(call) => out.push(call),
                ClientNode::Group(group) => out.extend(group.calls()),
            }
        }
        out
    }
}
