//! Axum adapter for the router seam.
//!
//! # Responsibilities
//! - Translate `:name` / `*` templates into axum route syntax
//! - Build `RouterRequest` from axum extractors
//! - Turn the buffered `SentResponse` into an axum `Response`
//!
//! # Design Decisions
//! - Parameters are registered under positional names (`{p0}`, `{p1}`)
//!   and renamed back per route, so sibling routes that spell a parameter
//!   differently never collide inside axum
//! - Duplicate (method, path) registrations are reported as errors rather
//!   than left to panic inside axum

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Path, RawQuery};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter};

use crate::router::{
    parse_body, parse_query, ResponseSink, RouteHandlerFn, Router, RouterError, RouterRequest, SentResponse,
    StringMap,
};
use crate::routes::template::Segment;
use crate::routes::{PathTemplate, RouteMethod, WILDCARD};

/// Builds an `axum::Router` from route registrations.
#[derive(Default)]
pub struct AxumRouter {
    router: axum::Router,
    registered: HashSet<(RouteMethod, String)>,
}

impl AxumRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    pub fn into_router(self) -> axum::Router {
        self.router
    }
}

impl Router for AxumRouter {
    fn register(&mut self, method: RouteMethod, path: &str, handler: RouteHandlerFn) -> Result<(), RouterError> {
        let template = PathTemplate::parse(path)?;
        let (axum_path, names) = positional(&template);

        if !self.registered.insert((method, axum_path.clone())) {
            return Err(RouterError::Duplicate {
                method,
                path: path.to_string(),
            });
        }

        let filter = match method {
            RouteMethod::Get => MethodFilter::GET,
            RouteMethod::Post => MethodFilter::POST,
        };
        let names = Arc::new(names);
        let endpoint = move |Path(raw): Path<HashMap<String, String>>,
                             RawQuery(query): RawQuery,
                             headers: HeaderMap,
                             body: Bytes| {
            let handler = handler.clone();
            let names = names.clone();
            async move { serve(handler, &names, raw, query, headers, body).await }
        };

        tracing::debug!(method = %method, path = %path, axum_path = %axum_path, "Registered route");
        self.router = std::mem::take(&mut self.router).route(&axum_path, on(filter, endpoint));
        Ok(())
    }
}

/// Axum path plus (positional key, declared name) pairs.
fn positional(template: &PathTemplate) -> (String, Vec<(String, String)>) {
    let mut names = Vec::new();
    let parts: Vec<String> = template
        .segments()
        .iter()
        .map(|segment| match segment {
            Segment::Literal(text) => text.clone(),
            Segment::Param(name) => {
                let key = format!("p{}", names.len());
                names.push((key.clone(), name.clone()));
                format!("{{{}}}", key)
            }
            Segment::Wildcard => {
                names.push(("wildcard".to_string(), WILDCARD.to_string()));
                "{*wildcard}".to_string()
            }
        })
        .collect();
    (format!("/{}", parts.join("/")), names)
}

async fn serve(
    handler: RouteHandlerFn,
    names: &[(String, String)],
    raw: HashMap<String, String>,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let params: StringMap = names
        .iter()
        .filter_map(|(key, name)| raw.get(key).map(|v| (name.clone(), v.clone())))
        .collect();

    let mut header_map = StringMap::new();
    for (name, value) in headers.iter() {
        let Ok(value) = value.to_str() else { continue };
        header_map
            .entry(name.as_str().to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    let content_type = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    let request = RouterRequest {
        params,
        query: query.as_deref().map(parse_query).unwrap_or_default(),
        body: parse_body(content_type, &body),
        headers: header_map,
    };

    let sink = ResponseSink::new();
    handler(request, sink.clone()).await;
    into_response(sink.snapshot())
}

/// Convert a buffered response into an axum response.
pub fn into_response(sent: SentResponse) -> Response {
    if !sent.sent {
        tracing::error!("Route handler finished without sending a response");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let mut builder = Response::builder().status(sent.status);
    for (name, value) in &sent.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.body(Body::from(sent.body)).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build response");
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use futures_util::future::BoxFuture;
    use tower::ServiceExt;

    fn echo() -> RouteHandlerFn {
        Arc::new(|request: RouterRequest, response: ResponseSink| -> BoxFuture<'static, ()> {
            Box::pin(async move {
                response.set_status(202);
                response.send_json(&serde_json::json!({
                    "params": request.params,
                    "query": request.query,
                    "body": request.body,
                }));
            })
        })
    }

    #[test]
    fn test_positional_paths() {
        let template = PathTemplate::parse("/users/:id/files/*").unwrap();
        let (path, names) = positional(&template);
        assert_eq!(path, "/users/{p0}/files/{*wildcard}");
        assert_eq!(
            names,
            vec![
                ("p0".to_string(), "id".to_string()),
                ("wildcard".to_string(), "*".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_through_axum() {
        let mut router = AxumRouter::new();
        router.register(RouteMethod::Get, "/users/:id", echo()).unwrap();
        router.register(RouteMethod::Post, "/users/:userId", echo()).unwrap();
        let app = router.into_router();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/users/a%20b?x=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["params"]["id"], "a b");
        assert_eq!(body["query"]["x"], "1");

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/users/7")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"n":1}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["params"]["userId"], "7");
        assert_eq!(body["body"]["n"], 1);
    }

    #[test]
    fn test_duplicate_is_error() {
        let mut router = AxumRouter::new();
        router.register(RouteMethod::Get, "/a/:x", echo()).unwrap();
        assert!(matches!(
            router.register(RouteMethod::Get, "/a/:y", echo()),
            Err(RouterError::Duplicate { .. })
        ));
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_unsent_response_is_server_error() {
        let sent = SentResponse {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
            sent: false,
        };
        assert_eq!(into_response(sent).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
