//! Declarative JSON shapes.
//!
//! A small structural validator in the spirit of object-schema libraries:
//! build a `Shape` once with the constructor functions, declare it on a
//! route, and every mismatch comes back as a `FieldErrors` entry.
//!
//! ```
//! use hanbok_routes::schema::{shape, Schema};
//! use serde_json::json;
//!
//! let create = shape::object([
//!     ("body", shape::object([
//!         ("name", shape::string()),
//!         ("age", shape::number().optional()),
//!     ])),
//! ]);
//! assert!(create.validate(&json!({"body": {"name": "Jean"}})).is_ok());
//! let errors = create.validate(&json!({"body": {}})).unwrap_err();
//! assert_eq!(errors.get("$.body.name"), Some(&["Required".to_string()][..]));
//! ```

use serde_json::Value;

use super::{FieldErrors, Schema};

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Any,
    String,
    Number,
    Integer,
    Boolean,
    OneOf(Vec<String>),
    Array(Box<Shape>),
    /// Declared fields are checked; undeclared fields pass through untouched.
    Object(Vec<(String, Shape)>),
    /// The field may be absent.
    Optional(Box<Shape>),
    /// The value may be `null`.
    Nullable(Box<Shape>),
}

pub fn any() -> Shape {
    Shape::Any
}

pub fn string() -> Shape {
    Shape::String
}

pub fn number() -> Shape {
    Shape::Number
}

pub fn integer() -> Shape {
    Shape::Integer
}

pub fn boolean() -> Shape {
    Shape::Boolean
}

pub fn one_of<I, S>(values: I) -> Shape
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Shape::OneOf(values.into_iter().map(Into::into).collect())
}

pub fn array(item: Shape) -> Shape {
    Shape::Array(Box::new(item))
}

pub fn object<I, K>(fields: I) -> Shape
where
    I: IntoIterator<Item = (K, Shape)>,
    K: Into<String>,
{
    Shape::Object(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
}

impl Shape {
    pub fn optional(self) -> Shape {
        Shape::Optional(Box::new(self))
    }

    pub fn nullable(self) -> Shape {
        Shape::Nullable(Box::new(self))
    }

    /// `None` stands for a missing object field.
    fn check(&self, value: Option<&Value>, path: &str, errors: &mut FieldErrors) {
        let value = match (self, value) {
            (Shape::Optional(_), None) => return,
            (Shape::Optional(inner), Some(v)) => return inner.check(Some(v), path, errors),
            (Shape::Nullable(inner), None) => return inner.check(None, path, errors),
            (Shape::Any, _) => return,
            (_, None) => return errors.add(path, "Required"),
            (_, Some(v)) => v,
        };

        match self {
            Shape::Any | Shape::Optional(_) => {}
            Shape::Nullable(inner) => {
                if !value.is_null() {
                    inner.check(Some(value), path, errors);
                }
            }
            Shape::String => expect(value.is_string(), "string", value, path, errors),
            Shape::Number => expect(value.is_number(), "number", value, path, errors),
            Shape::Boolean => expect(value.is_boolean(), "boolean", value, path, errors),
            Shape::Integer => {
                let whole = value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|f| f.fract() == 0.0);
                expect(whole, "integer", value, path, errors);
            }
            Shape::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => {}
                _ => errors.add(
                    path,
                    format!("expected one of [{}], received {}", allowed.join(", "), value),
                ),
            },
            Shape::Array(item) => match value.as_array() {
                Some(items) => {
                    for (i, element) in items.iter().enumerate() {
                        item.check(Some(element), &format!("{}[{}]", path, i), errors);
                    }
                }
                None => expect(false, "array", value, path, errors),
            },
            Shape::Object(fields) => match value.as_object() {
                Some(map) => {
                    for (name, field) in fields {
                        field.check(map.get(name), &format!("{}.{}", path, name), errors);
                    }
                }
                None => expect(false, "object", value, path, errors),
            },
        }
    }
}

impl Schema for Shape {
    fn validate(&self, value: &Value) -> Result<Value, FieldErrors> {
        let mut errors = FieldErrors::new();
        self.check(Some(value), "$", &mut errors);
        if errors.is_empty() {
            Ok(value.clone())
        } else {
            Err(errors)
        }
    }
}

fn expect(ok: bool, expected: &str, value: &Value, path: &str, errors: &mut FieldErrors) {
    if !ok {
        errors.add(path, format!("expected {}, received {}", expected, type_name(value)));
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource() -> Shape {
        object([
            ("publicId", string()),
            ("name", string()),
            ("age", number().optional().nullable()),
        ])
    }

    #[test]
    fn test_valid_value_is_returned_unchanged() {
        let value = json!({
            "publicId": "abc",
            "name": "Jean",
            "age": 14,
            "extra": true
        });
        assert_eq!(resource().validate(&value).unwrap(), value);
    }

    #[test]
    fn test_collects_every_error() {
        let errors = resource()
            .validate(&json!({"publicId": 1, "age": "old"}))
            .unwrap_err();
        assert_eq!(errors.get("$.publicId"), Some(&["expected string, received number".to_string()][..]));
        assert_eq!(errors.get("$.name"), Some(&["Required".to_string()][..]));
        assert_eq!(errors.get("$.age"), Some(&["expected number, received string".to_string()][..]));
    }

    #[test]
    fn test_optional_and_nullable() {
        let s = object([("a", integer().optional()), ("b", string().nullable())]);
        assert!(s.validate(&json!({"b": null})).is_ok());
        let errors = s.validate(&json!({"a": null, "b": "x"})).unwrap_err();
        assert!(errors.get("$.a").is_some());
        let errors = s.validate(&json!({})).unwrap_err();
        assert_eq!(errors.get("$.b"), Some(&["Required".to_string()][..]));
    }

    #[test]
    fn test_array_paths() {
        let s = object([("items", array(resource()))]);
        let errors = s
            .validate(&json!({"items": [{"publicId": "a", "name": "x"}, {"publicId": "b"}]}))
            .unwrap_err();
        assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["$.items[1].name"]);
    }

    #[test]
    fn test_root_type_mismatch() {
        let errors = resource().validate(&json!(null)).unwrap_err();
        assert_eq!(errors.get("$"), Some(&["expected object, received null".to_string()][..]));
    }

    #[test]
    fn test_one_of_and_integer() {
        let s = object([("kind", one_of(["a", "b"])), ("n", integer())]);
        assert!(s.validate(&json!({"kind": "a", "n": 3})).is_ok());
        let errors = s.validate(&json!({"kind": "c", "n": 3.5})).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
