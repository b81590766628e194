//! The fixed per-request pipeline.
//!
//! ```text
//! merged request {params, query, headers, body}
//!     → request schema          (mismatch → InvalidData, 400)
//!     → handler middleware chain
//!     → decode + operation
//!     → response schema         (mismatch → InvalidResponse, 500)
//!       or "handler must have sent" (nothing sent → NoResponse, 500)
//!     → catch-all: map error (or a panic) to status + JSON body unless already sent
//! ```

use std::any::Any;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::error::RouteError;
use crate::dispatch::handler::{decode, RouteHandler};
use crate::dispatch::middleware::Endpoint;
use crate::observability::metrics;
use crate::router::ResponseSink;
use crate::routes::RouteMethod;
use crate::schema::{FieldErrors, Schema};

/// What a bound route promises: where it lives and what it accepts and returns.
#[derive(Debug)]
pub(crate) struct RouteContract {
    pub method: RouteMethod,
    pub path: String,
    pub request: Arc<dyn Schema>,
    pub response: Option<Arc<dyn Schema>>,
}

/// The business operation as the innermost step of the middleware chain.
struct Invocation<'p, H, I, Req, Res> {
    handler: &'p H,
    invoke: &'p I,
    _types: PhantomData<fn(Req) -> Res>,
}

impl<'p, H, I, Req, Res> Endpoint for Invocation<'p, H, I, Req, Res>
where
    H: RouteHandler,
    I: for<'h> Fn(&'h H, Req) -> BoxFuture<'h, Result<Res, RouteError>> + Send + Sync,
    Req: DeserializeOwned + Send + 'static,
    Res: Serialize + Send + 'static,
{
    fn call<'s>(&'s self, request: Value) -> BoxFuture<'s, Result<Value, RouteError>> {
        Box::pin(async move {
            let typed: Req = decode(request)?;
            let result = (self.invoke)(self.handler, typed).await?;
            serde_json::to_value(result).map_err(|e| RouteError::Internal(e.into()))
        })
    }
}

/// Run one request through the pipeline. Never fails: every error ends up
/// as a response (or a log line when a response was already sent).
pub(crate) async fn run_route<H, I, Req, Res>(handler: &H, contract: &RouteContract, invoke: &I)
where
    H: RouteHandler,
    I: for<'h> Fn(&'h H, Req) -> BoxFuture<'h, Result<Res, RouteError>> + Send + Sync,
    Req: DeserializeOwned + Send + 'static,
    Res: Serialize + Send + 'static,
{
    let started = Instant::now();
    let response = handler.response();
    let status = match execute(handler, contract, invoke).await {
        Ok(()) => response.status(),
        Err(err) => respond_with_error(response, contract, &err),
    };
    metrics::record_dispatch(contract.method, &contract.path, status, started);
}

async fn execute<H, I, Req, Res>(handler: &H, contract: &RouteContract, invoke: &I) -> Result<(), RouteError>
where
    H: RouteHandler,
    I: for<'h> Fn(&'h H, Req) -> BoxFuture<'h, Result<Res, RouteError>> + Send + Sync,
    Req: DeserializeOwned + Send + 'static,
    Res: Serialize + Send + 'static,
{
    let context = handler.request_response();
    let validated = contract
        .request
        .validate(&context.request().to_value())
        .map_err(|errors| RouteError::invalid_data("Request did not match the expected format", errors))?;

    let endpoint = Invocation {
        handler,
        invoke,
        _types: PhantomData,
    };
    let result = AssertUnwindSafe(handler.middleware().run(context, validated, &endpoint))
        .catch_unwind()
        .await
        .map_err(|payload| RouteError::Internal(anyhow!("handler panicked: {}", panic_message(&*payload))))??;

    match &contract.response {
        Some(schema) => {
            let body = schema.validate(&result).map_err(|errors| invalid_response(contract, errors))?;
            context.response().send_json(&body);
        }
        None if !context.response().is_sent() => {
            return Err(RouteError::NoResponse {
                method: contract.method,
                path: contract.path.clone(),
            });
        }
        None => {}
    }
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn invalid_response(contract: &RouteContract, errors: FieldErrors) -> RouteError {
    RouteError::InvalidResponse {
        method: contract.method,
        path: contract.path.clone(),
        errors,
    }
}

/// Map an error onto the response. Returns the status the caller observed.
fn respond_with_error(response: &ResponseSink, contract: &RouteContract, err: &RouteError) -> u16 {
    if err.is_expected() {
        tracing::debug!(
            method = %contract.method,
            route = %contract.path,
            status = err.status(),
            error = %err,
            "Request rejected"
        );
    } else {
        tracing::error!(
            method = %contract.method,
            route = %contract.path,
            error = ?err,
            "Route handler failed"
        );
    }

    if response.is_sent() {
        tracing::warn!(
            method = %contract.method,
            route = %contract.path,
            "Response already sent, error not reported to caller"
        );
        return response.status();
    }

    response.set_status(err.status());
    response.send_json(&err.body());
    err.status()
}
