//! Path templates.
//!
//! # Responsibilities
//! - Parse `:name` parameter segments and a trailing `*` wildcard
//! - Render a template with percent-encoded parameter values (client side)
//! - Match a concrete path and extract decoded parameters (server side)
//!
//! # Design Decisions
//! - Parameters occupy a whole segment; partial segments stay literal
//! - Matching is case-sensitive and ignores empty segments, so a trailing
//!   slash on the request path is not significant
//! - Values are encoded with the same set as `encodeURIComponent`, which is
//!   what browsers and most routers expect to decode

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use thiserror::Error;

/// Characters left unescaped by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Parameter name under which the wildcard tail is reported.
pub const WILDCARD: &str = "*";

/// One segment of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

/// Errors from parsing a template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("wildcard must be the last segment of \"{0}\"")]
    MisplacedWildcard(String),

    #[error("empty parameter name in \"{0}\"")]
    EmptyParam(String),

    #[error("parameter \"{name}\" appears more than once in \"{template}\"")]
    DuplicateParam { template: String, name: String },
}

/// Errors from rendering a template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("missing value for path parameter \"{0}\"")]
    MissingParam(String),

    #[error("empty value for path parameter \"{0}\"")]
    EmptyParam(String),
}

/// A parsed path template such as `/api/users/:id` or `/assets/*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    absolute: bool,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse a template.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let raw: Vec<&str> = source.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw.len());

        for (i, part) in raw.iter().enumerate() {
            let segment = if *part == WILDCARD {
                if i + 1 != raw.len() {
                    return Err(TemplateError::MisplacedWildcard(source.to_string()));
                }
                Segment::Wildcard
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(TemplateError::EmptyParam(source.to_string()));
                }
                if segments.contains(&Segment::Param(name.to_string())) {
                    return Err(TemplateError::DuplicateParam {
                        template: source.to_string(),
                        name: name.to_string(),
                    });
                }
                Segment::Param(name.to_string())
            } else {
                Segment::Literal(part.to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            source: source.to_string(),
            absolute: source.starts_with('/'),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// Names of all parameters, in template order. The wildcard is `*`.
    pub fn param_names(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Literal(_) => None,
                Segment::Param(name) => Some(name.as_str()),
                Segment::Wildcard => Some(WILDCARD),
            })
            .collect()
    }

    /// Substitute parameters, percent-encoding each value.
    ///
    /// The wildcard value may contain `/`; each piece between separators is
    /// encoded on its own. A missing wildcard renders as nothing; a missing
    /// or empty named parameter is an error.
    pub fn render(&self, params: &BTreeMap<String, String>) -> Result<String, RenderError> {
        let mut out = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push(text.clone()),
                Segment::Param(name) => {
                    let value = params
                        .get(name)
                        .ok_or_else(|| RenderError::MissingParam(name.clone()))?;
                    if value.is_empty() {
                        return Err(RenderError::EmptyParam(name.clone()));
                    }
                    out.push(utf8_percent_encode(value, COMPONENT).to_string());
                }
                Segment::Wildcard => {
                    let tail = params
                        .get(WILDCARD)
                        .map(|v| {
                            v.split('/')
                                .filter(|p| !p.is_empty())
                                .map(|p| utf8_percent_encode(p, COMPONENT).to_string())
                                .collect::<Vec<_>>()
                                .join("/")
                        })
                        .unwrap_or_default();
                    if !tail.is_empty() {
                        out.push(tail);
                    }
                }
            }
        }

        let joined = out.join("/");
        Ok(if self.absolute { format!("/{}", joined) } else { joined })
    }

    /// Match a concrete request path, returning decoded parameters.
    pub fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = BTreeMap::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => {
                    if parts.get(i) != Some(&text.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let raw = parts.get(i)?;
                    params.insert(name.clone(), decode(raw)?);
                }
                Segment::Wildcard => {
                    let tail = parts
                        .get(i..)
                        .unwrap_or_default()
                        .iter()
                        .map(|p| decode(p))
                        .collect::<Option<Vec<_>>>()?
                        .join("/");
                    params.insert(WILDCARD.to_string(), tail);
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }

    /// Rank used to pick between several matching templates: literals beat
    /// parameters, parameters beat the wildcard. Lower sorts first.
    pub fn specificity(&self) -> Vec<u8> {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(_) => 0,
                Segment::Param(_) => 1,
                Segment::Wildcard => 2,
            })
            .collect()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn decode(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_segments() {
        let t = PathTemplate::parse("/api/users/:id/*").unwrap();
        assert_eq!(
            t.segments(),
            &[
                Segment::Literal("api".into()),
                Segment::Literal("users".into()),
                Segment::Param("id".into()),
                Segment::Wildcard,
            ]
        );
        assert_eq!(t.param_names(), vec!["id", "*"]);
        assert!(t.has_wildcard());
    }

    #[test]
    fn test_parse_rejects_bad_templates() {
        assert_eq!(
            PathTemplate::parse("/a/*/b"),
            Err(TemplateError::MisplacedWildcard("/a/*/b".into()))
        );
        assert_eq!(
            PathTemplate::parse("/a/:"),
            Err(TemplateError::EmptyParam("/a/:".into()))
        );
        assert!(matches!(
            PathTemplate::parse("/:id/x/:id"),
            Err(TemplateError::DuplicateParam { .. })
        ));
    }

    #[test]
    fn test_render_encodes_values() {
        let t = PathTemplate::parse("/api/users/:id").unwrap();
        assert_eq!(t.render(&params(&[("id", "42")])).unwrap(), "/api/users/42");
        assert_eq!(
            t.render(&params(&[("id", "a b/c?")])).unwrap(),
            "/api/users/a%20b%2Fc%3F"
        );
        assert_eq!(
            t.render(&BTreeMap::new()),
            Err(RenderError::MissingParam("id".into()))
        );
        assert_eq!(
            t.render(&params(&[("id", "")])),
            Err(RenderError::EmptyParam("id".into()))
        );
    }

    #[test]
    fn test_render_wildcard() {
        let t = PathTemplate::parse("/files/*").unwrap();
        assert_eq!(
            t.render(&params(&[("*", "docs/read me.txt")])).unwrap(),
            "/files/docs/read%20me.txt"
        );
        assert_eq!(t.render(&BTreeMap::new()).unwrap(), "/files");
        let root = PathTemplate::parse("/").unwrap();
        assert_eq!(root.render(&BTreeMap::new()).unwrap(), "/");
    }

    #[test]
    fn test_matches_extracts_params() {
        let t = PathTemplate::parse("/api/users/:id").unwrap();
        assert_eq!(t.matches("/api/users/42"), Some(params(&[("id", "42")])));
        assert_eq!(t.matches("/api/users/42/"), Some(params(&[("id", "42")])));
        assert_eq!(t.matches("/api/users/a%20b"), Some(params(&[("id", "a b")])));
        assert_eq!(t.matches("/api/users"), None);
        assert_eq!(t.matches("/api/users/42/x"), None);
        assert_eq!(t.matches("/API/users/42"), None);
    }

    #[test]
    fn test_matches_wildcard() {
        let t = PathTemplate::parse("/*").unwrap();
        assert_eq!(t.matches("/a/b"), Some(params(&[("*", "a/b")])));
        assert_eq!(t.matches("/"), Some(params(&[("*", "")])));
    }

    #[test]
    fn test_render_then_match_recovers_values() {
        let t = PathTemplate::parse("/:a/x/:b").unwrap();
        let values = params(&[("a", "ü/%"), ("b", "plain")]);
        let path = t.render(&values).unwrap();
        assert_eq!(t.matches(&path), Some(values));
    }

    #[test]
    fn test_specificity_orders_literals_first() {
        let literal = PathTemplate::parse("/a/b").unwrap();
        let param = PathTemplate::parse("/a/:x").unwrap();
        let wildcard = PathTemplate::parse("/a/*").unwrap();
        assert!(literal.specificity() < param.specificity());
        assert!(param.specificity() < wildcard.specificity());
    }
}
