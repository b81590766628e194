//! Route tree model.
//!
//! # Responsibilities
//! - Hold the declarative tree of groups and leaf routes
//! - Reject duplicate names and malformed templates at construction
//! - Enumerate leaves with their composed dispatch paths
//!
//! # Design Decisions
//! - Immutable after construction; shared by reference with the binder and
//!   the client generator
//! - Group vs route is an enum, not a marker key mixed into the names
//! - Children are kept sorted by name so every walk is deterministic

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routes::path::join_path;
use crate::routes::template::{PathTemplate, Segment, TemplateError};
use crate::schema::Schema;

/// HTTP methods a route can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    Get,
    Post,
}

impl RouteMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "GET",
            RouteMethod::Post => "POST",
        }
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMethod {
    type Err = DefsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(RouteMethod::Get),
            "POST" => Ok(RouteMethod::Post),
            _ => Err(DefsError::UnknownMethod(s.to_string())),
        }
    }
}

/// Errors from building or navigating a route tree.
#[derive(Debug, Error)]
pub enum DefsError {
    #[error("duplicate route name \"{0}\"")]
    DuplicateName(String),

    #[error("invalid path template: {0}")]
    Template(#[from] TemplateError),

    #[error("group prefix \"{0}\" cannot contain a wildcard")]
    WildcardPrefix(String),

    #[error("no route or group named \"{0}\"")]
    Unknown(String),

    #[error("\"{0}\" is a group, not a route")]
    NotARoute(String),

    #[error("\"{0}\" is a route, not a group")]
    NotAGroup(String),

    #[error("unrecognized HTTP method \"{0}\"")]
    UnknownMethod(String),
}

/// A leaf endpoint.
#[derive(Debug, Clone)]
pub struct RouteDef {
    method: RouteMethod,
    path: String,
    request: Option<Arc<dyn Schema>>,
    response: Option<Arc<dyn Schema>>,
}

impl RouteDef {
    pub fn new(method: RouteMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            request: None,
            response: None,
        }
    }

    /// Declare the schema for the merged `{params, query, headers, body}`.
    pub fn with_request(mut self, schema: impl Schema + 'static) -> Self {
        self.request = Some(Arc::new(schema));
        self
    }

    /// Declare the schema for the operation's result. Without one, the
    /// operation is expected to send its own response.
    pub fn with_response(mut self, schema: impl Schema + 'static) -> Self {
        self.response = Some(Arc::new(schema));
        self
    }

    pub fn method(&self) -> RouteMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn request_schema(&self) -> Option<&Arc<dyn Schema>> {
        self.request.as_ref()
    }

    pub fn response_schema(&self) -> Option<&Arc<dyn Schema>> {
        self.response.as_ref()
    }
}

/// A prefix scope holding nested routes and groups.
#[derive(Debug, Clone)]
pub struct GroupDef {
    prefix: String,
    children: RouteDefs,
}

impl GroupDef {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn children(&self) -> &RouteDefs {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub enum RouteDefEntry {
    Route(RouteDef),
    Group(GroupDef),
}

impl From<RouteDef> for RouteDefEntry {
    fn from(route: RouteDef) -> Self {
        RouteDefEntry::Route(route)
    }
}

impl From<GroupDef> for RouteDefEntry {
    fn from(group: GroupDef) -> Self {
        RouteDefEntry::Group(group)
    }
}

/// A leaf as seen from the root: dotted name, method and composed path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RouteLeaf {
    pub name: String,
    pub method: RouteMethod,
    pub path: String,
}

/// Mapping of unique names to routes and groups.
#[derive(Debug, Clone, Default)]
pub struct RouteDefs {
    entries: BTreeMap<String, RouteDefEntry>,
}

impl RouteDefs {
    /// Build a mapping, rejecting duplicate names and bad templates.
    pub fn from_entries<I, K, E>(entries: I) -> Result<Self, DefsError>
    where
        I: IntoIterator<Item = (K, E)>,
        K: Into<String>,
        E: Into<RouteDefEntry>,
    {
        let mut map = BTreeMap::new();
        for (name, entry) in entries {
            let name = name.into();
            let entry = entry.into();
            if let RouteDefEntry::Route(route) = &entry {
                PathTemplate::parse(route.path())?;
            }
            if map.insert(name.clone(), entry).is_some() {
                return Err(DefsError::DuplicateName(name));
            }
        }
        Ok(Self { entries: map })
    }

    pub fn get(&self, name: &str) -> Option<&RouteDefEntry> {
        self.entries.get(name)
    }

    pub fn route(&self, name: &str) -> Result<&RouteDef, DefsError> {
        match self.entries.get(name) {
            Some(RouteDefEntry::Route(route)) => Ok(route),
            Some(RouteDefEntry::Group(_)) => Err(DefsError::NotARoute(name.to_string())),
            None => Err(DefsError::Unknown(name.to_string())),
        }
    }

    pub fn group(&self, name: &str) -> Result<&GroupDef, DefsError> {
        match self.entries.get(name) {
            Some(RouteDefEntry::Group(group)) => Ok(group),
            Some(RouteDefEntry::Route(_)) => Err(DefsError::NotAGroup(name.to_string())),
            None => Err(DefsError::Unknown(name.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteDefEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every leaf mounted at `prefix`, with dotted names and composed paths.
    /// Paths are absolute whether or not `prefix` starts with `/`.
    pub fn leaves(&self, prefix: &str) -> Vec<RouteLeaf> {
        let mut out = Vec::new();
        self.collect_leaves(&join_path(&["/", prefix]), "", &mut out);
        out
    }

    fn collect_leaves(&self, prefix: &str, scope: &str, out: &mut Vec<RouteLeaf>) {
        for (name, entry) in &self.entries {
            let dotted = if scope.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", scope, name)
            };
            match entry {
                RouteDefEntry::Route(route) => out.push(RouteLeaf {
                    name: dotted,
                    method: route.method(),
                    path: join_path(&[prefix, route.path()]),
                }),
                RouteDefEntry::Group(group) => {
                    let nested = join_path(&[prefix, group.prefix()]);
                    group.children.collect_leaves(&nested, &dotted, out);
                }
            }
        }
    }
}

/// Build a group from a prefix and its children.
pub fn group<I, K, E>(prefix: &str, entries: I) -> Result<GroupDef, DefsError>
where
    I: IntoIterator<Item = (K, E)>,
    K: Into<String>,
    E: Into<RouteDefEntry>,
{
    let template = PathTemplate::parse(prefix)?;
    if template.segments().contains(&Segment::Wildcard) {
        return Err(DefsError::WildcardPrefix(prefix.to_string()));
    }
    Ok(GroupDef {
        prefix: prefix.to_string(),
        children: RouteDefs::from_entries(entries)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::{define, get, post};
    use crate::schema::shape;

    fn sample() -> RouteDefs {
        define([
            (
                "api",
                group(
                    "/api",
                    [
                        (
                            "users",
                            RouteDefEntry::from(
                                group(
                                    "/users",
                                    [
                                        ("get", get("/:id")),
                                        ("create", post("/").with_request(shape::any())),
                                    ],
                                )
                                .unwrap(),
                            ),
                        ),
                        ("health", get("/health").into()),
                    ],
                )
                .unwrap(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_leaves_compose_paths() {
        let leaves = sample().leaves("/");
        assert_eq!(
            leaves,
            vec![
                RouteLeaf {
                    name: "api.health".into(),
                    method: RouteMethod::Get,
                    path: "/api/health".into()
                },
                RouteLeaf {
                    name: "api.users.create".into(),
                    method: RouteMethod::Post,
                    path: "/api/users".into()
                },
                RouteLeaf {
                    name: "api.users.get".into(),
                    method: RouteMethod::Get,
                    path: "/api/users/:id".into()
                },
            ]
        );
    }

    #[test]
    fn test_leaves_under_relative_prefix_are_absolute() {
        let paths: Vec<String> = sample().leaves("v1").into_iter().map(|leaf| leaf.path).collect();
        assert_eq!(paths, vec!["/v1/api/health", "/v1/api/users", "/v1/api/users/:id"]);
        let root: Vec<String> = sample().leaves("").into_iter().map(|leaf| leaf.path).collect();
        assert_eq!(root, vec!["/api/health", "/api/users", "/api/users/:id"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = define([("a", get("/x")), ("a", get("/y"))]);
        assert!(matches!(result, Err(DefsError::DuplicateName(name)) if name == "a"));
    }

    #[test]
    fn test_bad_templates_rejected() {
        assert!(matches!(
            define([("a", get("/*/x"))]),
            Err(DefsError::Template(_))
        ));
        assert!(matches!(
            group("/files/*", Vec::<(String, RouteDef)>::new()),
            Err(DefsError::WildcardPrefix(_))
        ));
    }

    #[test]
    fn test_navigation_errors() {
        let defs = sample();
        let api = defs.group("api").unwrap();
        assert_eq!(api.prefix(), "/api");
        assert!(matches!(defs.route("api"), Err(DefsError::NotARoute(_))));
        assert!(matches!(api.children().group("health"), Err(DefsError::NotAGroup(_))));
        assert!(matches!(defs.group("nope"), Err(DefsError::Unknown(_))));
        assert!(api.children().route("health").unwrap().request_schema().is_none());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("get".parse::<RouteMethod>().unwrap(), RouteMethod::Get);
        assert_eq!(RouteMethod::Post.to_string(), "POST");
        assert!("PUT".parse::<RouteMethod>().is_err());
    }
}
