//! Typed route definitions with symmetric server dispatch and client calls.
//!
//! A route tree is declared once ([`routes`]). The server side binds each
//! leaf to a handler operation through [`dispatch::RoutesBinder`], which
//! validates input and output and maps errors to responses. The client side
//! derives a call stub per leaf with [`client::RoutesClient`]. Both sides
//! compose paths with the same [`routes::join_path`], so they cannot drift.

// Route model and contracts
pub mod routes;
pub mod schema;

// Server and client
pub mod client;
pub mod dispatch;
pub mod router;

// Runtime
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;

// Sample application
pub mod app;

pub use client::RoutesClient;
pub use config::ServerConfig;
pub use dispatch::{RouteError, RoutesBinder};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routes::{define, RouteDefs};
