//! Route definitions shared by server and client.
//!
//! # Data Flow
//! ```text
//! define([...]) / group(prefix, [...]) / get(path) / post(path)
//!     → defs.rs (RouteDefs tree, validated once)
//!     → path.rs (join_path composes prefixes)
//!     → template.rs (parse, render, match)
//!     → consumed by dispatch::RoutesBinder and client::RoutesClient
//! ```
//!
//! # Design Decisions
//! - The tree is the wire contract: no separate schema file, no codegen
//! - Builders are plain data constructors; the only checks are duplicate
//!   names and template syntax

pub mod defs;
pub mod path;
pub mod template;

pub use defs::{group, DefsError, GroupDef, RouteDef, RouteDefEntry, RouteDefs, RouteLeaf, RouteMethod};
pub use path::join_path;
pub use template::{PathTemplate, RenderError, TemplateError, WILDCARD};

/// Build the root mapping of a route tree.
pub fn define<I, K, E>(entries: I) -> Result<RouteDefs, DefsError>
where
    I: IntoIterator<Item = (K, E)>,
    K: Into<String>,
    E: Into<RouteDefEntry>,
{
    RouteDefs::from_entries(entries)
}

/// A `GET` route.
pub fn get(path: impl Into<String>) -> RouteDef {
    RouteDef::new(RouteMethod::Get, path)
}

/// A `POST` route.
pub fn post(path: impl Into<String>) -> RouteDef {
    RouteDef::new(RouteMethod::Post, path)
}
