//! Binding route definitions to handler operations.
//!
//! # Responsibilities
//! - Walk the route tree alongside the app's registration code
//! - Compose each route's concrete path from the accumulated prefix
//! - Wrap each operation in the pipeline and register it with a `Router`
//!
//! # Design Decisions
//! - The binder owns no handlers; every request builds a fresh factory
//!   through `create_factory` and selects its handler from it
//! - Exhaustiveness is the app's concern: it binds by name, and a wrong
//!   name fails with `DefsError` at startup

use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::dispatch::error::RouteError;
use crate::dispatch::handler::{RequestResponse, RouteHandler};
use crate::dispatch::pipeline::{self, RouteContract};
use crate::router::{ResponseSink, RouteHandlerFn, Router, RouterError, RouterRequest};
use crate::routes::{join_path, DefsError, GroupDef, RouteDef, RouteDefs};
use crate::schema::{AnySchema, Schema};

#[derive(Debug, Error)]
pub enum BindError {
    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Defs(#[from] DefsError),
}

type CreateFactory<F> = Arc<dyn Fn(RequestResponse) -> F + Send + Sync>;

/// Registration cursor over one level of the route tree.
pub struct RoutesBinder<'r, R, F> {
    router: &'r mut R,
    create_factory: CreateFactory<F>,
    prefix: String,
}

impl<'r, R, F> RoutesBinder<'r, R, F>
where
    R: Router,
    F: Send + Sync + 'static,
{
    /// `prefix` is the mount point of the whole tree; dispatch paths are always absolute.
    pub fn new(
        router: &'r mut R,
        prefix: &str,
        create_factory: impl Fn(RequestResponse) -> F + Send + Sync + 'static,
    ) -> Self {
        Self {
            router,
            create_factory: Arc::new(create_factory),
            prefix: join_path(&["/", prefix]),
        }
    }

    /// Accumulated path prefix at this level.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Enter a group: `f` gets a binder whose prefix includes the group's.
    pub fn descend<T>(
        &mut self,
        group: &GroupDef,
        f: impl FnOnce(&mut RoutesBinder<'_, R, F>, &RouteDefs) -> Result<T, BindError>,
    ) -> Result<T, BindError> {
        let mut nested = RoutesBinder {
            router: &mut *self.router,
            create_factory: Arc::clone(&self.create_factory),
            prefix: join_path(&[self.prefix.as_str(), group.prefix()]),
        };
        f(&mut nested, group.children())
    }

    /// Bind one route to an operation.
    ///
    /// `select` picks the handler out of the per-request factory and
    /// `invoke` runs the operation with the decoded request.
    pub fn bind<H, Req, Res, S, I>(&mut self, route: &RouteDef, select: S, invoke: I) -> Result<(), BindError>
    where
        H: RouteHandler + 'static,
        Req: DeserializeOwned + Send + 'static,
        Res: Serialize + Send + 'static,
        S: for<'f> Fn(&'f F) -> &'f H + Send + Sync + 'static,
        I: for<'h> Fn(&'h H, Req) -> BoxFuture<'h, Result<Res, RouteError>> + Send + Sync + 'static,
    {
        let method = route.method();
        let path = join_path(&[self.prefix.as_str(), route.path()]);
        let contract = Arc::new(RouteContract {
            method,
            path: path.clone(),
            request: route
                .request_schema()
                .cloned()
                .unwrap_or_else(|| Arc::new(AnySchema) as Arc<dyn Schema>),
            response: route.response_schema().cloned(),
        });

        let create_factory = Arc::clone(&self.create_factory);
        let select = Arc::new(select);
        let invoke = Arc::new(invoke);
        let handler: RouteHandlerFn = Arc::new(
            move |request: RouterRequest, response: ResponseSink| -> BoxFuture<'static, ()> {
                let contract = Arc::clone(&contract);
                let create_factory = Arc::clone(&create_factory);
                let select = Arc::clone(&select);
                let invoke = Arc::clone(&invoke);
                Box::pin(async move {
                    let factory = create_factory(RequestResponse::new(request, response));
                    let handler = select(&factory);
                    pipeline::run_route(handler, &contract, &*invoke).await;
                })
            },
        );

        self.router.register(method, &path, handler)?;
        tracing::debug!(method = %method, path = %path, "Route bound");
        Ok(())
    }
}
