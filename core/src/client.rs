//! Asynchronous request client with a uniform result record.
//!
//! # Design
//! `RequestClient` splits every request into three steps:
//! `build_request` turns a `RequestSpec` into an `HttpRequest` (pure),
//! the `Transport` executes it under the configured timeout, and
//! `normalize_response` turns the `HttpResponse` into a `ResultRecord`
//! (pure). Only the middle step does I/O, so URL building, header merging,
//! body encoding and body decoding are all testable without a network.
//!
//! Requests take `&self`; any number may be in flight on one client.
//! Changing default headers or logging takes `&mut self`, so it cannot race
//! with requests borrowed from the same client.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{Instrument, Span};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::encode;
use crate::error::{ClientError, TransportError};
use crate::http::{insert_header, is_textual, HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Body, RequestOptions, RequestSpec, ResultRecord};

/// Logged bodies are cut to this many characters.
const LOG_BODY_LIMIT: usize = 2048;

/// Reusable client bound to one base URL.
#[derive(Clone)]
pub struct RequestClient {
    config: ClientConfig,
    default_headers: BTreeMap<String, String>,
    logging: bool,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for RequestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestClient")
            .field("config", &self.config)
            .field("default_headers", &self.default_headers)
            .field("logging", &self.logging)
            .finish_non_exhaustive()
    }
}

impl RequestClient {
    /// Build a client that talks to the network through reqwest.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(&config)?;
        tracing::debug!(
            base_url = %config.base_url,
            proxy = ?config.proxy,
            timeout = ?config.timeout,
            verify_tls = config.verify_tls,
            follow_redirects = config.follow_redirects,
            "built request client"
        );
        Ok(Self::with_transport(config, transport))
    }

    /// Build a client on top of a custom transport.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        let mut client = Self {
            default_headers: BTreeMap::new(),
            logging: config.logging,
            transport: Arc::new(transport),
            config,
        };
        let seeded = client.config.default_headers.clone();
        client.with_headers(seeded);
        client
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.default_headers
    }

    /// Merge `headers` into the default headers. Names are compared without
    /// regard to case and later values replace earlier ones.
    pub fn with_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            insert_header(&mut self.default_headers, name.into(), value.into());
        }
        self
    }

    pub fn enable_logging(&mut self) -> &mut Self {
        self.logging = true;
        self
    }

    pub fn disable_logging(&mut self) -> &mut Self {
        self.logging = false;
        self
    }

    pub fn logging_enabled(&self) -> bool {
        self.logging
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> ResultRecord {
        self.request(RequestSpec::new(HttpMethod::Get, path, options)).await
    }

    pub async fn post(&self, path: &str, options: RequestOptions) -> ResultRecord {
        self.request(RequestSpec::new(HttpMethod::Post, path, options)).await
    }

    pub async fn put(&self, path: &str, options: RequestOptions) -> ResultRecord {
        self.request(RequestSpec::new(HttpMethod::Put, path, options)).await
    }

    pub async fn patch(&self, path: &str, options: RequestOptions) -> ResultRecord {
        self.request(RequestSpec::new(HttpMethod::Patch, path, options)).await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> ResultRecord {
        self.request(RequestSpec::new(HttpMethod::Delete, path, options)).await
    }

    /// Send `spec` and normalize whatever happens into a `ResultRecord`.
    pub async fn request(&self, spec: RequestSpec) -> ResultRecord {
        let span = if self.logging {
            tracing::info_span!("request", id = %Uuid::new_v4(), method = %spec.method)
        } else {
            Span::none()
        };
        self.dispatch(spec).instrument(span).await
    }

    async fn dispatch(&self, spec: RequestSpec) -> ResultRecord {
        let decode = spec.options.decodes_response();
        let request = match self.build_request(&spec) {
            Ok(request) => request,
            Err(err) => return self.failure(err),
        };

        if self.logging {
            log_request(&request);
        }

        let outcome = match tokio::time::timeout(self.config.timeout, self.transport.execute(request)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(TransportError::Timeout),
        };

        match outcome {
            Ok(response) => {
                if self.logging {
                    log_response(&response);
                }
                normalize_response(response, decode)
            }
            Err(err) => self.failure(err),
        }
    }

    /// Build the wire request for `spec` without sending it.
    ///
    /// The URL is the base URL followed by the path. Request headers are
    /// merged over the default headers and Content-Type is set last. GET
    /// folds params into the query string and sends no body; other methods
    /// send params form-encoded or as JSON depending on the content type,
    /// and nothing at all when params are empty.
    pub fn build_request(&self, spec: &RequestSpec) -> Result<HttpRequest, TransportError> {
        let options = &spec.options;
        let mut url = format!("{}{}", self.config.base_url, spec.path);

        let mut headers = Vec::with_capacity(self.default_headers.len() + options.headers.len() + 1);
        for (name, value) in self.default_headers.iter().chain(options.headers.iter()) {
            set_header(&mut headers, name, value);
        }
        set_header(&mut headers, "Content-Type", &options.content_type);

        let body = match spec.method {
            HttpMethod::Get => {
                if !options.params.is_empty() {
                    encode::append_query(&mut url, &encode::urlencode(&options.params)?);
                }
                Vec::new()
            }
            _ if options.params.is_empty() => Vec::new(),
            _ if options.is_form() => encode::urlencode(&options.params)?.into_bytes(),
            _ => encode::json(&options.params)?,
        };

        Ok(HttpRequest {
            method: spec.method,
            url,
            headers,
            body,
        })
    }

    fn failure(&self, err: TransportError) -> ResultRecord {
        let message = match err {
            TransportError::Timeout => format!("request timed out after {:?}", self.config.timeout),
            ref other => other.to_string(),
        };
        if self.logging {
            tracing::info!(error = %message, "request failed");
        }
        ResultRecord::Failure {
            message,
            code: err.status(),
        }
    }
}

/// Normalize a response that carried a status line, whatever the code.
///
/// Non-textual media is returned raw. Textual bodies are JSON-decoded when
/// `decode` is set (an unparsable body decodes to `None`) and returned as
/// text otherwise.
pub fn normalize_response(response: HttpResponse, decode: bool) -> ResultRecord {
    let textual = is_textual(response.content_type());
    let body = if !textual {
        Body::Raw(response.body)
    } else if decode {
        Body::Json(serde_json::from_slice(&response.body).ok())
    } else {
        Body::Text(String::from_utf8_lossy(&response.body).into_owned())
    };
    ResultRecord::Success {
        code: response.status,
        headers: response.headers,
        body,
    }
}

/// Replace the value of `name` (case-insensitive) or append it.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    match headers.iter_mut().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
        Some(slot) => *slot = (name.to_string(), value.to_string()),
        None => headers.push((name.to_string(), value.to_string())),
    }
}

fn log_request(request: &HttpRequest) {
    tracing::info!(
        method = %request.method,
        url = %request.url,
        headers = ?request.headers,
        body = %render_body(request.header("content-type"), &request.body),
        "sending request"
    );
}

fn log_response(response: &HttpResponse) {
    tracing::info!(
        status = response.status,
        headers = ?response.headers,
        body = %render_body(response.content_type(), &response.body),
        "received response"
    );
}

/// Human-readable body for logs; never fails.
fn render_body(content_type: Option<&str>, body: &[u8]) -> String {
    if !is_textual(content_type) {
        return format!("<{} bytes of {}>", body.len(), content_type.unwrap_or("unknown type"));
    }
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(LOG_BODY_LIMIT) {
        Some((cut, _)) => format!("{}... ({} bytes total)", &text[..cut], body.len()),
        None => text.into_owned(),
    }
}
