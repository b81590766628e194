//! In-process route table.
//!
//! # Responsibilities
//! - Match (method, path) against registered templates
//! - Serve serverless-style events without an HTTP server in front
//!
//! # Design Decisions
//! - Precedence is literal > parameter > wildcard, segment by segment
//! - Trailing slashes are ignored, matching is case-sensitive
//! - No match is `Ok(None)` so the caller decides what a miss means

use serde::{Deserialize, Serialize};

use crate::router::{
    parse_body, parse_query, ResponseSink, RouteHandlerFn, Router, RouterError, RouterRequest, SentResponse,
    StringMap,
};
use crate::routes::template::Segment;
use crate::routes::{PathTemplate, RouteMethod};

struct Entry {
    method: RouteMethod,
    template: PathTemplate,
    handler: RouteHandlerFn,
}

/// An inbound event as delivered by a serverless HTTP gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterEvent {
    pub method: String,
    /// May carry a `?query` suffix; it is merged into `query`.
    pub path: String,
    pub query: StringMap,
    pub headers: StringMap,
    pub body: Option<String>,
}

/// Route table with no transport attached.
#[derive(Default)]
pub struct RouteTable {
    entries: Vec<Entry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered (method, template) pairs in registration order.
    pub fn routes(&self) -> Vec<(RouteMethod, String)> {
        self.entries
            .iter()
            .map(|e| (e.method, e.template.as_str().to_string()))
            .collect()
    }

    /// Find the most specific handler for a request path.
    pub fn find(&self, method: RouteMethod, path: &str) -> Option<(RouteHandlerFn, StringMap)> {
        self.entries
            .iter()
            .filter(|e| e.method == method)
            .filter_map(|e| e.template.matches(path).map(|params| (e, params)))
            .min_by_key(|(e, _)| e.template.specificity())
            .map(|(e, params)| (e.handler.clone(), params))
    }

    /// Dispatch an event. `Ok(None)` means no route matched.
    pub async fn handle_event(&self, event: RouterEvent) -> Result<Option<SentResponse>, RouterError> {
        let method: RouteMethod = event
            .method
            .parse()
            .map_err(|_| RouterError::UnsupportedMethod(event.method.clone()))?;

        let (path, raw_query) = match event.path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (event.path.as_str(), None),
        };

        let Some((handler, params)) = self.find(method, path) else {
            tracing::debug!(method = %method, path = %path, "No route matched");
            return Ok(None);
        };

        let mut query = event.query.clone();
        if let Some(raw) = raw_query {
            query.extend(parse_query(raw));
        }
        let headers: StringMap = event
            .headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        let body = event
            .body
            .as_deref()
            .map(|raw| parse_body(headers.get("content-type").map(String::as_str), raw.as_bytes()))
            .unwrap_or_default();

        let request = RouterRequest {
            params,
            query,
            headers,
            body,
        };
        let sink = ResponseSink::new();
        handler(request, sink.clone()).await;
        Ok(Some(sink.snapshot()))
    }
}

impl Router for RouteTable {
    fn register(&mut self, method: RouteMethod, path: &str, handler: RouteHandlerFn) -> Result<(), RouterError> {
        let template = PathTemplate::parse(path)?;
        let conflict = self
            .entries
            .iter()
            .any(|e| e.method == method && same_shape(&e.template, &template));
        if conflict {
            return Err(RouterError::Duplicate {
                method,
                path: path.to_string(),
            });
        }

        tracing::debug!(method = %method, path = %path, "Registered route");
        self.entries.push(Entry {
            method,
            template,
            handler,
        });
        Ok(())
    }
}

/// Two templates are interchangeable if they differ only in parameter names.
fn same_shape(a: &PathTemplate, b: &PathTemplate) -> bool {
    a.segments().len() == b.segments().len()
        && a.segments().iter().zip(b.segments()).all(|pair| match pair {
            (Segment::Literal(x), Segment::Literal(y)) => x == y,
            (Segment::Param(_), Segment::Param(_)) => true,
            (Segment::Wildcard, Segment::Wildcard) => true,
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::future::BoxFuture;
    use std::sync::Arc;

    fn echo(tag: &'static str) -> RouteHandlerFn {
        Arc::new(move |request: RouterRequest, response: ResponseSink| -> BoxFuture<'static, ()> {
            Box::pin(async move {
                response.send_json(&serde_json::json!({
                    "tag": tag,
                    "params": request.params,
                    "query": request.query,
                    "body": request.body,
                }));
            })
        })
    }

    fn table() -> RouteTable {
        let mut table = RouteTable::new();
        table.register(RouteMethod::Get, "/users/:id", echo("param")).unwrap();
        table.register(RouteMethod::Get, "/users/me", echo("literal")).unwrap();
        table.register(RouteMethod::Get, "/*", echo("wildcard")).unwrap();
        table.register(RouteMethod::Post, "/users", echo("create")).unwrap();
        table
    }

    #[tokio::test]
    async fn test_precedence() {
        let table = table();
        let get = |path: &str| RouterEvent {
            method: "GET".into(),
            path: path.into(),
            ..Default::default()
        };

        let sent = table.handle_event(get("/users/me")).await.unwrap().unwrap();
        assert_eq!(sent.json().unwrap()["tag"], "literal");

        let sent = table.handle_event(get("/users/42/")).await.unwrap().unwrap();
        let body = sent.json().unwrap();
        assert_eq!(body["tag"], "param");
        assert_eq!(body["params"]["id"], "42");

        let sent = table.handle_event(get("/users/42/extra")).await.unwrap().unwrap();
        assert_eq!(sent.json().unwrap()["params"]["*"], "users/42/extra");
    }

    #[tokio::test]
    async fn test_query_and_body() {
        let table = table();
        let mut event = RouterEvent {
            method: "post".into(),
            path: "/users?x=1".into(),
            body: Some(r#"{"name":"Jean"}"#.into()),
            ..Default::default()
        };
        event.headers.insert("Content-Type".into(), "application/json".into());

        let sent = table.handle_event(event).await.unwrap().unwrap();
        let body = sent.json().unwrap();
        assert_eq!(body["query"]["x"], "1");
        assert_eq!(body["body"]["name"], "Jean");
    }

    #[tokio::test]
    async fn test_miss_and_bad_method() {
        let table = table();
        let miss = RouterEvent {
            method: "POST".into(),
            path: "/nothing".into(),
            ..Default::default()
        };
        assert!(table.handle_event(miss).await.unwrap().is_none());

        let bad = RouterEvent {
            method: "DELETE".into(),
            path: "/users".into(),
            ..Default::default()
        };
        assert!(matches!(
            table.handle_event(bad).await,
            Err(RouterError::UnsupportedMethod(m)) if m == "DELETE"
        ));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut table = table();
        let result = table.register(RouteMethod::Get, "/users/:userId", echo("again"));
        assert!(matches!(result, Err(RouterError::Duplicate { .. })));
        assert_eq!(table.len(), 4);
    }
}
