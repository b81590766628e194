//! HTTP transport over reqwest.
//!
//! # Responsibilities
//! - Resolve a rendered call path against the configured endpoint
//! - Send JSON bodies and decode the response by content type
//!
//! # Design Decisions
//! - Non-2xx statuses are not errors here; the status travels back in
//!   `TransportResponse` for the caller to inspect
//! - Endpoint base paths are kept: `http://host/base` + `/api/x` is
//!   `http://host/base/api/x`

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::client::transport::{ClientRequest, Transport};
use crate::router::parse_body;
use crate::routes::{join_path, RouteMethod};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint url: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    default_headers: BTreeMap<String, String>,
}

impl HttpTransport {
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        Ok(Self::with_client(reqwest::Client::new(), Url::parse(endpoint)?))
    }

    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self {
            client,
            endpoint,
            default_headers: BTreeMap::new(),
        }
    }

    /// Header sent with every request unless the call overrides it.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full URL for a rendered path (which may carry `?query`).
    pub fn url_for(&self, path: &str) -> Url {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path, None),
        };
        let mut url = self.endpoint.clone();
        let full = join_path(&[self.endpoint.path(), path]);
        url.set_path(&full);
        url.set_query(query);
        url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    type Output = Result<TransportResponse, TransportError>;

    async fn send(&self, request: ClientRequest) -> Self::Output {
        let url = self.url_for(&request.path);
        let method = match request.method {
            RouteMethod::Get => reqwest::Method::GET,
            RouteMethod::Post => reqwest::Method::POST,
        };
        tracing::debug!(method = %request.method, url = %url, "Sending request");

        let mut headers = self.default_headers.clone();
        headers.extend(request.headers.into_iter().map(|(k, v)| (k.to_ascii_lowercase(), v)));

        let mut builder = self.client.request(method, url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        Ok(TransportResponse {
            status,
            body: parse_body(content_type.as_deref(), &bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_keeps_base_path_and_query() {
        let transport = HttpTransport::new("http://localhost:8080/base/").unwrap();
        assert_eq!(
            transport.url_for("/api/items?limit=2").as_str(),
            "http://localhost:8080/base/api/items?limit=2"
        );

        let root = HttpTransport::new("http://localhost:8080").unwrap();
        assert_eq!(root.url_for("/a%2Fb").as_str(), "http://localhost:8080/a%2Fb");
        assert_eq!(root.url_for("/").as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_bad_endpoint() {
        assert!(matches!(HttpTransport::new("not a url"), Err(TransportError::Endpoint(_))));
    }
}
