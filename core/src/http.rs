//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data.
//! `RequestClient` builds an `HttpRequest` and normalizes an `HttpResponse`
//! without touching the network itself; a `Transport` performs the actual
//! I/O in between. Keeping both ends as owned data makes request building
//! and response normalization deterministic and easy to test.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;

/// Response headers keyed by lower-case name, each with its values in the
/// order the server sent them.
pub type HeaderMultiMap = BTreeMap<String, Vec<String>>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `RequestClient::build_request`. `url` is absolute (base URL,
/// path and query string) and `body` is empty when nothing is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Case-insensitive lookup of the first header named `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` for every response that carried a status line,
/// whatever the status code.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMultiMap,
    pub body: Bytes,
}

impl HttpResponse {
    /// The first `content-type` value, if the server sent one.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("content-type"))
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }
}

/// Insert a header into a name → value map, replacing any entry whose name
/// differs only in case. The most recent spelling and value win.
pub fn insert_header(headers: &mut BTreeMap<String, String>, name: String, value: String) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

/// Whether a content type denotes text that may be rendered or decoded as
/// JSON. Everything else (images, video, octet streams...) is passed
/// through untouched. A missing content type counts as textual.
pub fn is_textual(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return true;
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.is_empty()
        || essence.starts_with("text/")
        || essence.contains("json")
        || essence.contains("xml")
        || essence.contains("javascript")
        || essence == "application/x-www-form-urlencoded"
}
