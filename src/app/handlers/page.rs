//! HTML shell for browser navigation.
//!
//! Both page routes answer with the same index document; the client-side
//! app reads the embedded page context and takes over routing.

use serde::Serialize;

use crate::app::types::PageRequest;
use crate::dispatch::{MiddlewareChain, RequestResponse, RouteError, RouteHandler};

/// Values the browser app needs to find the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub routes_endpoint: String,
    pub router_base: String,
}

pub struct PageHandler {
    rr: RequestResponse,
    title: String,
    context: PageContext,
    middleware: MiddlewareChain,
}

impl RouteHandler for PageHandler {
    fn request_response(&self) -> &RequestResponse {
        &self.rr
    }

    fn middleware(&self) -> MiddlewareChain {
        self.middleware.clone()
    }
}

impl PageHandler {
    pub fn new(rr: RequestResponse, title: String, context: PageContext, middleware: MiddlewareChain) -> Self {
        Self {
            rr,
            title,
            context,
            middleware,
        }
    }

    pub async fn root_route(&self) -> Result<(), RouteError> {
        self.send_index_page()
    }

    pub async fn default_route(&self, request: PageRequest) -> Result<(), RouteError> {
        tracing::debug!(path = %request.params.tail, "Serving index page for client route");
        self.send_index_page()
    }

    fn send_index_page(&self) -> Result<(), RouteError> {
        let html = self.index_html()?;
        self.response()
            .set_status(200)
            .set_header("content-type", "text/html; charset=utf-8");
        self.response().send_raw(html);
        Ok(())
    }

    fn index_html(&self) -> Result<String, RouteError> {
        let context = serde_json::to_string(&self.context).map_err(|e| RouteError::Internal(e.into()))?;
        Ok(format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n  <head>\n    <meta charset=\"UTF-8\" />\n    \
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n    \
             <title>{}</title>\n  </head>\n  <body>\n    <div id=\"root\"></div>\n    \
             <script>window.PAGE_CONTEXT = {};</script>\n  </body>\n</html>\n",
            escape_html(&self.title),
            context.replace('<', "\\u003c"),
        ))
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
