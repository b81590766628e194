//! Error taxonomy for route handlers.
//!
//! | Kind           | Status | Body                                          |
//! |----------------|--------|-----------------------------------------------|
//! | NotFound       | 404    | `{"error": "Not Found", "details": message}`  |
//! | InvalidRequest | 400    | `{"error": "InvalidRequestError", ...}`       |
//! | InvalidData    | 400    | `{"error": "InvalidDataError", "details": fieldErrors}` |
//! | InvalidResponse| 500    | same body as InvalidData, logged as a defect  |
//! | Unclassified   | 500    | `{"error": "Server Error"}`, logged           |

use serde_json::{json, Value};
use thiserror::Error;

use crate::routes::RouteMethod;
use crate::schema::FieldErrors;

/// Coarse classification used for status mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidRequest,
    InvalidData,
    Unclassified,
}

#[derive(Debug, Error)]
pub enum RouteError {
    /// The addressed resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request breaks a business rule.
    #[error("{0}")]
    InvalidRequest(String),

    /// The request did not match its declared shape.
    #[error("{message}: {errors}")]
    InvalidData { message: String, errors: FieldErrors },

    /// The handler's result did not match the declared response shape.
    #[error("response for {method} {path} did not match its schema: {errors}")]
    InvalidResponse {
        method: RouteMethod,
        path: String,
        errors: FieldErrors,
    },

    /// A route without a response schema finished without sending anything.
    #[error("handler for {method} {path} did not send a response")]
    NoResponse { method: RouteMethod, path: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl RouteError {
    pub fn not_found(message: impl Into<String>) -> Self {
        RouteError::NotFound(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        RouteError::InvalidRequest(message.into())
    }

    pub fn invalid_data(message: impl Into<String>, errors: FieldErrors) -> Self {
        RouteError::InvalidData {
            message: message.into(),
            errors,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RouteError::NotFound(_) => ErrorKind::NotFound,
            RouteError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            RouteError::InvalidData { .. } | RouteError::InvalidResponse { .. } => ErrorKind::InvalidData,
            RouteError::NoResponse { .. } | RouteError::Internal(_) => ErrorKind::Unclassified,
        }
    }

    /// Declared outcomes of business code, as opposed to defects.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            RouteError::NotFound(_) | RouteError::InvalidRequest(_) | RouteError::InvalidData { .. }
        )
    }

    pub fn status(&self) -> u16 {
        match self {
            RouteError::NotFound(_) => 404,
            RouteError::InvalidRequest(_) | RouteError::InvalidData { .. } => 400,
            RouteError::InvalidResponse { .. } | RouteError::NoResponse { .. } | RouteError::Internal(_) => 500,
        }
    }

    /// Wire body for this error. Unclassified errors carry no detail.
    pub fn body(&self) -> Value {
        match self {
            RouteError::NotFound(message) => json!({
                "error": "Not Found",
                "details": message,
            }),
            RouteError::InvalidRequest(message) => json!({
                "error": "InvalidRequestError",
                "details": message,
            }),
            RouteError::InvalidData { errors, .. } | RouteError::InvalidResponse { errors, .. } => json!({
                "error": "InvalidDataError",
                "details": errors,
            }),
            RouteError::NoResponse { .. } | RouteError::Internal(_) => json!({
                "error": "Server Error",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_body_mapping() {
        let e = RouteError::not_found("SampleResource \"x\" not found");
        assert_eq!(e.status(), 404);
        assert_eq!(e.body(), json!({"error": "Not Found", "details": "SampleResource \"x\" not found"}));
        assert!(e.is_expected());

        let e = RouteError::invalid_request("name taken");
        assert_eq!((e.status(), e.kind()), (400, ErrorKind::InvalidRequest));
        assert_eq!(e.body()["error"], "InvalidRequestError");

        let e = RouteError::invalid_data("bad", FieldErrors::single("$.body.name", "Required"));
        assert_eq!(e.status(), 400);
        assert_eq!(e.body()["details"]["$.body.name"][0], "Required");
    }

    #[test]
    fn test_defects_hide_details() {
        let e = RouteError::from(anyhow::anyhow!("db password is hunter2"));
        assert_eq!(e.status(), 500);
        assert_eq!(e.kind(), ErrorKind::Unclassified);
        assert!(!e.is_expected());
        assert_eq!(e.body(), json!({"error": "Server Error"}));

        let e = RouteError::NoResponse {
            method: RouteMethod::Get,
            path: "/x".into(),
        };
        assert_eq!(e.status(), 500);
        assert_eq!(e.to_string(), "handler for GET /x did not send a response");
    }

    #[test]
    fn test_response_mismatch_is_server_side() {
        let e = RouteError::InvalidResponse {
            method: RouteMethod::Get,
            path: "/x".into(),
            errors: FieldErrors::single("$.item", "Required"),
        };
        assert_eq!(e.status(), 500);
        assert_eq!(e.kind(), ErrorKind::InvalidData);
        assert!(!e.is_expected());
        assert_eq!(e.body()["error"], "InvalidDataError");
    }
}
