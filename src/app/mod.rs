//! Sample application built on the route framework.
//!
//! # Data Flow
//! ```text
//! routes.rs (route tree)
//!     → AppServer::add_routes (binds every leaf to an operation)
//!     → per request: factory.rs AppHandlers
//!         → sample_resource() → handlers/sample_resource.rs → backend.rs
//!         → pages()           → handlers/page.rs (HTML shell)
//! ```

pub mod backend;
pub mod factory;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

use std::sync::Arc;

use serde::de::IgnoredAny;

use crate::config::ServerConfig;
use crate::dispatch::{BindError, RoutesBinder};
use crate::router::Router;
use crate::routes::{join_path, RouteDefs};

pub use backend::MockBackend;
pub use factory::AppHandlers;
pub use handlers::{PageHandler, SampleResourceHandler};
pub use routes::route_defs;

/// Settings handlers read on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub title: String,
    pub router_base: String,
    pub routes_endpoint: String,
    pub api_key: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            title: "hanbok sample app".to_string(),
            router_base: "/".to_string(),
            routes_endpoint: "/".to_string(),
            api_key: None,
        }
    }
}

impl AppSettings {
    pub fn from_config(config: &ServerConfig) -> Self {
        let prefix = join_path(&["/", config.routes.prefix.as_str()]);
        Self {
            routes_endpoint: prefix.clone(),
            router_base: prefix,
            api_key: config.security.api_key.clone(),
            ..Self::default()
        }
    }
}

pub struct AppServer {
    defs: RouteDefs,
    backend: Arc<MockBackend>,
    settings: Arc<AppSettings>,
}

impl AppServer {
    pub fn new(defs: RouteDefs, backend: Arc<MockBackend>, settings: AppSettings) -> Self {
        Self {
            defs,
            backend,
            settings: Arc::new(settings),
        }
    }

    pub fn defs(&self) -> &RouteDefs {
        &self.defs
    }

    pub fn backend(&self) -> &Arc<MockBackend> {
        &self.backend
    }

    /// Bind every route of the tree under `prefix`.
    pub fn add_routes<R: Router>(&self, router: &mut R, prefix: &str) -> Result<(), BindError> {
        let backend = Arc::clone(&self.backend);
        let settings = Arc::clone(&self.settings);
        let mut r = RoutesBinder::new(router, prefix, move |rr| {
            AppHandlers::new(rr, Arc::clone(&backend), Arc::clone(&settings))
        });

        let a = &self.defs;
        r.descend(a.group("api")?, |r, a| {
            r.descend(a.group("sampleResource")?, |r, a| {
                r.bind(
                    a.route("list")?,
                    |f| f.sample_resource(),
                    |h, _: IgnoredAny| Box::pin(h.list()),
                )?;
                r.bind(
                    a.route("create")?,
                    |f| f.sample_resource(),
                    |h, request| Box::pin(h.create(request)),
                )?;
                r.bind(
                    a.route("get")?,
                    |f| f.sample_resource(),
                    |h, request| Box::pin(h.get(request)),
                )?;
                r.bind(
                    a.route("delete")?,
                    |f| f.sample_resource(),
                    |h, request| Box::pin(h.delete(request)),
                )?;
                r.bind(
                    a.route("update")?,
                    |f| f.sample_resource(),
                    |h, request| Box::pin(h.update(request)),
                )
            })
        })?;
        r.descend(a.group("pages")?, |r, a| {
            r.bind(
                a.route("root")?,
                |f| f.pages(),
                |h, _: IgnoredAny| Box::pin(h.root_route()),
            )?;
            r.bind(
                a.route("default")?,
                |f| f.pages(),
                |h, request| Box::pin(h.default_route(request)),
            )
        })
    }
}
