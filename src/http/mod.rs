//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum serve, graceful shutdown)
//!     → layers: request ID → trace → timeout → body limit
//!     → router::AxumRouter routes (one per bound route)
//!     → dispatch pipeline
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::HttpServer;
