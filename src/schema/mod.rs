//! Schema validation seam.
//!
//! # Data Flow
//! ```text
//! untrusted JSON value
//!     → Schema::validate
//!     → Ok(value)            (possibly normalized by the validator)
//!     → Err(FieldErrors)     (path → messages, every failure collected)
//! ```
//!
//! # Design Decisions
//! - The dispatch core only knows the `Schema` trait; any validator can be
//!   plugged in as long as it reports field-addressable errors
//! - `Shape` is the validator shipped with the crate
//! - Absent schemas mean "accept anything" (`AnySchema`)

pub mod errors;
pub mod shape;

use std::fmt;

use serde_json::Value;

pub use errors::FieldErrors;
pub use shape::Shape;

/// Validates a JSON value against a declared contract.
pub trait Schema: Send + Sync + fmt::Debug {
    /// Return the accepted value, or every field-level failure found.
    fn validate(&self, value: &Value) -> Result<Value, FieldErrors>;
}

/// Accepts any value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnySchema;

impl Schema for AnySchema {
    fn validate(&self, value: &Value) -> Result<Value, FieldErrors> {
        Ok(value.clone())
    }
}

/// Adapts a closure into a `Schema`.
pub struct FnSchema<F> {
    name: &'static str,
    check: F,
}

impl<F> fmt::Debug for FnSchema<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSchema").field("name", &self.name).finish()
    }
}

impl<F> Schema for FnSchema<F>
where
    F: Fn(&Value) -> Result<Value, FieldErrors> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<Value, FieldErrors> {
        (self.check)(value)
    }
}

/// Wrap an external validator so it can be declared on a route.
pub fn from_fn<F>(name: &'static str, check: F) -> FnSchema<F>
where
    F: Fn(&Value) -> Result<Value, FieldErrors> + Send + Sync,
{
    FnSchema { name, check }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_any_schema_is_identity() {
        let value = json!({"params": {"id": "1"}, "body": [1, 2]});
        assert_eq!(AnySchema.validate(&value).unwrap(), value);
    }

    #[test]
    fn test_fn_schema() {
        let even = from_fn("even", |v: &Value| match v.as_i64() {
            Some(n) if n % 2 == 0 => Ok(v.clone()),
            _ => Err(FieldErrors::single("$", "expected an even number")),
        });
        assert!(even.validate(&json!(4)).is_ok());
        let errors = even.validate(&json!(3)).unwrap_err();
        assert_eq!(errors.get("$"), Some(&["expected an even number".to_string()][..]));
        assert!(format!("{:?}", even).contains("even"));
    }
}
