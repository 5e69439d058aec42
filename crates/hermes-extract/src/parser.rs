//! Request body parsers.
//!
//! A [`Parser`] turns body bytes of one media type into JSON. The pipeline
//! consults its configured parser only when the request's content type
//! matches; other bodies are treated as empty input.

use std::fmt;

use serde_json::{Map, Value as Json};

use crate::{ExtractionError, ExtractionSource};

/// Converts a request body into structured data.
pub trait Parser: fmt::Debug + Send + Sync {
    /// Media type this parser accepts (e.g. `application/json`).
    fn media_type(&self) -> &'static str;

    /// Parses body bytes.
    fn parse(&self, body: &[u8]) -> Result<Json, ExtractionError>;

    /// Returns true if the content type names this parser's media type.
    fn accepts(&self, content_type: Option<&str>) -> bool {
        content_type.is_some_and(|ct| {
            ct.split(';')
                .next()
                .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(self.media_type()))
        })
    }

    /// Parses a body that must hold an object.
    fn parse_object(&self, body: &[u8]) -> Result<Map<String, Json>, ExtractionError> {
        match self.parse(body)? {
            Json::Object(map) => Ok(map),
            _ => Err(ExtractionError::invalid_shape(ExtractionSource::Body, "an object")),
        }
    }
}

/// `application/json` parser.
///
/// # Example
///
/// ```rust
/// use hermes_extract::{JsonParser, Parser};
///
/// let parser = JsonParser;
/// assert!(parser.accepts(Some("application/json; charset=utf-8")));
/// assert!(!parser.accepts(Some("text/plain")));
///
/// let data = parser.parse_object(br#"{"id": 3}"#).unwrap();
/// assert_eq!(data["id"], 3);
/// assert!(parser.parse(b"{").is_err());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl Parser for JsonParser {
    fn media_type(&self) -> &'static str {
        "application/json"
    }

    fn parse(&self, body: &[u8]) -> Result<Json, ExtractionError> {
        serde_json::from_slice(body)
            .map_err(|e| ExtractionError::malformed(ExtractionSource::Body, e.to_string()))
    }
}

/// Looks up a built-in parser by settings name.
#[must_use]
pub fn parser_by_name(name: &str) -> Option<Box<dyn Parser>> {
    match name {
        "json" => Some(Box::new(JsonParser)),
        _ => None,
    }
}
