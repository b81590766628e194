//! Path composition.
//!
//! # Responsibilities
//! - Join group prefixes and leaf paths into one dispatch path
//!
//! # Design Decisions
//! - Every part is split on `/` and empty segments are dropped, so repeated,
//!   leading and trailing separators never survive inside the result
//! - The result starts with `/` only when the first part does
//! - Pure function: the server binder and the client generator both call it,
//!   which keeps the two sides of the wire contract identical

/// Join path parts into a normalized path.
///
/// ```
/// use hanbok_routes::routes::join_path;
///
/// assert_eq!(join_path(&["/api/", "/users", ":id"]), "/api/users/:id");
/// assert_eq!(join_path(&["/", "/"]), "/");
/// ```
pub fn join_path<S: AsRef<str>>(parts: &[S]) -> String {
    let Some(first) = parts.first() else {
        return String::new();
    };
    let absolute = first.as_ref().starts_with('/');

    let joined = parts
        .iter()
        .flat_map(|part| part.as_ref().split('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}
