//! Server-side dispatch.
//!
//! # Data Flow
//! ```text
//! Router adapter (axum, in-memory table)
//!     → RouteHandlerFn registered by binder.rs
//!     → create_factory(RequestResponse)   (one factory per request)
//!     → select(&factory) → handler        (memoized in HandlerSlot)
//!     → pipeline.rs                       (validate, middleware, invoke, respond)
//!     → ResponseSink
//! ```

pub mod binder;
pub mod error;
pub mod handler;
pub mod middleware;
mod pipeline;

pub use binder::{BindError, RoutesBinder};
pub use error::{ErrorKind, RouteError};
pub use handler::{HandlerSlot, RequestResponse, RouteHandler};
pub use middleware::{Endpoint, Middleware, MiddlewareChain, Next};
