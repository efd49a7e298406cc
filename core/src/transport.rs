//! The I/O seam between `RequestClient` and the network.
//!
//! # Design
//! `Transport` executes one `HttpRequest` and hands back whatever response
//! arrived, any status code included. `ReqwestTransport` is the production
//! implementation; tests substitute their own to simulate slow, failing or
//! misbehaving servers.

use async_trait::async_trait;
use reqwest::redirect::Policy;

use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError};
use crate::http::{HeaderMultiMap, HttpMethod, HttpRequest, HttpResponse};

const MAX_REDIRECTS: usize = 10;

/// Executes HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// reqwest-backed transport configured from a `ClientConfig`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let redirects = if config.follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };
        let builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .redirect(redirects)
            .danger_accept_invalid_certs(!config.verify_tls);

        let builder = match config.proxy_url() {
            Some(url) => {
                let proxy = reqwest::Proxy::all(&url).map_err(|e| ClientError::InvalidProxy {
                    address: url.clone(),
                    message: e.to_string(),
                })?;
                builder.proxy(proxy)
            }
            // Ignore HTTP(S)_PROXY from the environment.
            None => builder.no_proxy(),
        };

        Ok(Self {
            inner: builder.build()?,
        })
    }

}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.inner.request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.method != HttpMethod::Get {
            builder = builder.body(request.body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();

        let mut headers = HeaderMultiMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let body = response.bytes().await.map_err(|e| match TransportError::from(e) {
            TransportError::Timeout => TransportError::Timeout,
            other => TransportError::Body {
                status,
                message: other.to_string(),
            },
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}
