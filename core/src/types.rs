//! Request descriptions and the normalized result record.
//!
//! # Design
//! `ResultRecord` is the only thing a request call returns. HTTP error
//! statuses are `Success` values carrying their code; `Failure` is reserved
//! for requests that produced no usable response (timeout, connect, DNS,
//! TLS, proxy). Callers match on one enum instead of inspecting transport
//! errors.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::http::{insert_header, HeaderMultiMap, HttpMethod};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Per-request parameters, headers, content type and decode flag.
///
/// Defaults to no params, no extra headers, `application/json` and decoding
/// on.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// Query parameters for GET, body fields for every other method.
    pub params: Map<String, Value>,
    /// Merged over the client's default headers; these win on collision.
    pub headers: BTreeMap<String, String>,
    pub content_type: String,
    /// Parse the response body as JSON. Ignored for non-textual responses
    /// and always off for form-encoded requests.
    pub decode: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            params: Map::new(),
            headers: BTreeMap::new(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            decode: true,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params.extend(params);
        self
    }

    /// Set a header. A name differing only in case replaces the earlier one.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.headers, name.into(), value.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Shorthand for `content_type(FORM_CONTENT_TYPE)`.
    pub fn form(self) -> Self {
        self.content_type(FORM_CONTENT_TYPE)
    }

    pub fn decode(mut self, decode: bool) -> Self {
        self.decode = decode;
        self
    }

    pub(crate) fn is_form(&self) -> bool {
        self.content_type
            .to_ascii_lowercase()
            .contains(FORM_CONTENT_TYPE)
    }

    /// Whether the response will be JSON-decoded: form requests never are.
    pub fn decodes_response(&self) -> bool {
        self.decode && !self.is_form()
    }
}

/// A full request: verb, path relative to the base URL, and options.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub path: String,
    pub options: RequestOptions,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            method,
            path: path.into(),
            options,
        }
    }
}

/// A response body after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Decoding was requested. `None` when the body was empty or not valid
    /// JSON.
    Json(Option<Value>),
    /// Textual body returned as-is (lossy UTF-8).
    Text(String),
    /// Non-textual media, never decoded.
    Raw(Bytes),
}

impl Body {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => value.as_ref(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Body::Json(value) => value.serialize(serializer),
            Body::Text(text) => serializer.serialize_str(text),
            Body::Raw(bytes) => serializer.serialize_bytes(bytes),
        }
    }
}

/// Outcome of a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ResultRecord {
    /// The server answered, with any status code.
    Success {
        code: u16,
        headers: HeaderMultiMap,
        body: Body,
    },
    /// No usable response. `code` is set when a status line was received
    /// before the failure.
    Failure {
        #[serde(rename = "error")]
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<u16>,
    },
}

impl ResultRecord {
    pub fn is_success(&self) -> bool {
        matches!(self, ResultRecord::Success { .. })
    }

    pub fn code(&self) -> Option<u16> {
        match self {
            ResultRecord::Success { code, .. } => Some(*code),
            ResultRecord::Failure { code, .. } => *code,
        }
    }

    pub fn body(&self) -> Option<&Body> {
        match self {
            ResultRecord::Success { body, .. } => Some(body),
            ResultRecord::Failure { .. } => None,
        }
    }

    pub fn headers(&self) -> Option<&HeaderMultiMap> {
        match self {
            ResultRecord::Success { headers, .. } => Some(headers),
            ResultRecord::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ResultRecord::Success { .. } => None,
            ResultRecord::Failure { message, .. } => Some(message),
        }
    }
}
