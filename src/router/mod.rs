//! Low-level router seam.
//!
//! # Data Flow
//! ```text
//! RoutesBinder
//!     → Router::register(method, template, RouteHandlerFn)
//!
//! inbound request (axum / serverless event)
//!     → adapter matches (method, path) and builds RouterRequest
//!     → RouteHandlerFn(RouterRequest, ResponseSink)
//!     → adapter converts the SentResponse into its native response
//! ```
//!
//! # Design Decisions
//! - The dispatch core depends on nothing beyond `Router`, `RouterRequest`
//!   and `ResponseSink`
//! - The sink buffers the response; adapters read it back once the
//!   handler future completes
//! - Header names are lowercased on the way in

pub mod axum_router;
pub mod table;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::BoxFuture;
use serde_json::{json, Value};
use thiserror::Error;

use crate::routes::{RouteMethod, TemplateError};

pub use axum_router::AxumRouter;
pub use table::{RouteTable, RouterEvent};

pub type StringMap = BTreeMap<String, String>;

/// Handler registered with a router for one (method, path).
pub type RouteHandlerFn = Arc<dyn Fn(RouterRequest, ResponseSink) -> BoxFuture<'static, ()> + Send + Sync>;

/// Errors raised by router implementations.
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("invalid path template: {0}")]
    Template(#[from] TemplateError),

    #[error("route {method} {path} is already registered")]
    Duplicate { method: RouteMethod, path: String },

    #[error("unrecognized HTTP method \"{0}\"")]
    UnsupportedMethod(String),
}

/// A registry of (method, path template) → handler.
pub trait Router {
    fn register(&mut self, method: RouteMethod, path: &str, handler: RouteHandlerFn) -> Result<(), RouterError>;
}

/// Normalized inbound request handed to route handlers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouterRequest {
    pub params: StringMap,
    pub query: StringMap,
    pub headers: StringMap,
    pub body: Value,
}

impl RouterRequest {
    /// Merge the parts into one structure for schema validation.
    pub fn to_value(&self) -> Value {
        json!({
            "params": self.params,
            "query": self.query,
            "headers": self.headers,
            "body": self.body,
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// The response as buffered by a `ResponseSink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub sent: bool,
}

impl SentResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Debug)]
struct ResponseState {
    status: u16,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Default for ResponseState {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: None,
        }
    }
}

/// Response sink shared between the pipeline and the business handler.
///
/// Cloning shares the same underlying response. The first `send_*` wins;
/// later sends are dropped with a warning.
#[derive(Debug, Clone, Default)]
pub struct ResponseSink {
    state: Arc<Mutex<ResponseState>>,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ResponseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_status(&self, code: u16) -> &Self {
        self.lock().status = code;
        self
    }

    pub fn status(&self) -> u16 {
        self.lock().status
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn set_header(&self, name: &str, value: &str) -> &Self {
        let mut state = self.lock();
        state.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        state.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn send_json(&self, body: &Value) {
        let mut state = self.lock();
        if state.body.is_some() {
            tracing::warn!("Response already sent, dropping JSON body");
            return;
        }
        state.headers.retain(|(k, _)| !k.eq_ignore_ascii_case("content-type"));
        state.headers.push(("content-type".to_string(), "application/json".to_string()));
        state.body = Some(body.to_string().into_bytes());
    }

    pub fn send_raw(&self, body: impl Into<Vec<u8>>) {
        let mut state = self.lock();
        if state.body.is_some() {
            tracing::warn!("Response already sent, dropping raw body");
            return;
        }
        state.body = Some(body.into());
    }

    pub fn is_sent(&self) -> bool {
        self.lock().body.is_some()
    }

    pub fn snapshot(&self) -> SentResponse {
        let state = self.lock();
        SentResponse {
            status: state.status,
            headers: state.headers.clone(),
            body: state.body.clone().unwrap_or_default(),
            sent: state.body.is_some(),
        }
    }
}

/// Parse a raw body by content type: JSON, form-urlencoded, else text.
///
/// An empty body is `null`; an unparseable JSON body falls back to text.
pub fn parse_body(content_type: Option<&str>, raw: &[u8]) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();

    if content_type.contains("application/json") {
        match serde_json::from_slice(raw) {
            Ok(value) => return value,
            Err(e) => tracing::warn!(error = %e, "Failed to parse JSON body"),
        }
    } else if content_type.contains("application/x-www-form-urlencoded") {
        let fields: serde_json::Map<String, Value> = url::form_urlencoded::parse(raw)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();
        return Value::Object(fields);
    }

    Value::String(String::from_utf8_lossy(raw).into_owned())
}

/// Parse a query string (without the leading `?`). Later keys win.
pub fn parse_query(raw: &str) -> StringMap {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_first_send_wins() {
        let sink = ResponseSink::new();
        assert!(!sink.is_sent());
        sink.set_status(201).set_header("X-Test", "1");
        sink.send_raw("first");
        sink.send_json(&json!({"second": true}));
        let sent = sink.snapshot();
        assert_eq!(sent.status, 201);
        assert_eq!(sent.body, b"first");
        assert_eq!(sent.header("x-test"), Some("1"));
        assert_eq!(sent.header("content-type"), None);
        assert!(sent.sent);
    }

    #[test]
    fn test_sink_json() {
        let sink = ResponseSink::new();
        let clone = sink.clone();
        clone.send_json(&json!({"ok": 1}));
        let sent = sink.snapshot();
        assert_eq!(sent.header("Content-Type"), Some("application/json"));
        assert_eq!(sent.json(), Some(json!({"ok": 1})));
    }

    #[test]
    fn test_set_header_replaces() {
        let sink = ResponseSink::new();
        sink.set_header("Content-Type", "text/plain");
        sink.set_header("content-type", "text/html");
        assert_eq!(sink.snapshot().headers, vec![("content-type".to_string(), "text/html".to_string())]);
    }

    #[test]
    fn test_parse_body_by_content_type() {
        assert_eq!(parse_body(Some("application/json; charset=utf-8"), br#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_body(Some("application/x-www-form-urlencoded"), b"a=1&b=x+y"), json!({"a": "1", "b": "x y"}));
        assert_eq!(parse_body(None, b"plain"), json!("plain"));
        assert_eq!(parse_body(Some("application/json"), b"{broken"), json!("{broken"));
        assert_eq!(parse_body(Some("application/json"), b""), Value::Null);
    }

    #[test]
    fn test_request_value_merges_parts() {
        let mut request = RouterRequest::default();
        request.params.insert("id".into(), "42".into());
        request.query = parse_query("x=1&y=%20");
        request.headers.insert("accept".into(), "*/*".into());
        assert_eq!(
            request.to_value(),
            json!({
                "params": {"id": "42"},
                "query": {"x": "1", "y": " "},
                "headers": {"accept": "*/*"},
                "body": null,
            })
        );
        assert_eq!(request.header("Accept"), Some("*/*"));
    }
}
