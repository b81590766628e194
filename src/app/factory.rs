//! Per-request handler factory.

use std::sync::Arc;

use crate::app::backend::MockBackend;
use crate::app::handlers::page::PageContext;
use crate::app::handlers::{PageHandler, SampleResourceHandler};
use crate::app::middleware::{RequestLog, RequireApiKey};
use crate::app::AppSettings;
use crate::dispatch::{HandlerSlot, MiddlewareChain, RequestResponse};

/// Built once per request; each accessor builds its handler on first use.
pub struct AppHandlers {
    rr: RequestResponse,
    backend: Arc<MockBackend>,
    settings: Arc<AppSettings>,
    sample_resource: HandlerSlot<SampleResourceHandler>,
    pages: HandlerSlot<PageHandler>,
}

impl AppHandlers {
    pub fn new(rr: RequestResponse, backend: Arc<MockBackend>, settings: Arc<AppSettings>) -> Self {
        Self {
            rr,
            backend,
            settings,
            sample_resource: HandlerSlot::new(),
            pages: HandlerSlot::new(),
        }
    }

    pub fn sample_resource(&self) -> &SampleResourceHandler {
        self.sample_resource.get_or_init(|| {
            let mut middleware = MiddlewareChain::new().with(RequestLog);
            if let Some(key) = &self.settings.api_key {
                middleware = middleware.with(RequireApiKey::new(key.clone()));
            }
            SampleResourceHandler::new(self.rr.clone(), Arc::clone(&self.backend), middleware)
        })
    }

    pub fn pages(&self) -> &PageHandler {
        self.pages.get_or_init(|| {
            PageHandler::new(
                self.rr.clone(),
                self.settings.title.clone(),
                PageContext {
                    routes_endpoint: self.settings.routes_endpoint.clone(),
                    router_base: self.settings.router_base.clone(),
                },
                MiddlewareChain::new().with(RequestLog),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{ResponseSink, RouterRequest};

    #[test]
    fn test_accessors_memoize() {
        let handlers = AppHandlers::new(
            RequestResponse::new(RouterRequest::default(), ResponseSink::new()),
            Arc::new(MockBackend::new()),
            Arc::new(AppSettings::default()),
        );
        assert!(std::ptr::eq(handlers.sample_resource(), handlers.sample_resource()));
        assert!(std::ptr::eq(handlers.pages(), handlers.pages()));
    }

    #[test]
    fn test_api_key_adds_guard() {
        let rr = RequestResponse::new(RouterRequest::default(), ResponseSink::new());
        let open = AppHandlers::new(rr.clone(), Arc::new(MockBackend::new()), Arc::new(AppSettings::default()));
        let guarded = AppHandlers::new(
            rr,
            Arc::new(MockBackend::new()),
            Arc::new(AppSettings {
                api_key: Some("k".to_string()),
                ..AppSettings::default()
            }),
        );
        use crate::dispatch::RouteHandler;
        assert_eq!(open.sample_resource().middleware().len(), 1);
        assert_eq!(guarded.sample_resource().middleware().len(), 2);
    }
}
