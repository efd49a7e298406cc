//! Asynchronous HTTP request client with normalized results.
//!
//! # Overview
//! `RequestClient` sends GET/POST/PUT/PATCH/DELETE requests against a base
//! URL, optionally through a SOCKS5 proxy, under a timeout, and folds every
//! outcome into a `ResultRecord`: HTTP error statuses are successes carrying
//! their code, while timeouts and network failures are failures carrying a
//! message. No request call returns `Err`.
//!
//! # Design
//! - Request building and response normalization are pure functions over
//!   plain data (`HttpRequest` / `HttpResponse`); the `Transport` trait is
//!   the only I/O boundary.
//! - `ReqwestTransport` is the default transport. It resolves DNS through
//!   the SOCKS5 proxy when one is configured.
//! - Logging goes through `tracing` and only when enabled on the client.
//!
//! ```no_run
//! use request_core::{ClientConfig, RequestClient, RequestOptions, ResultRecord};
//!
//! # async fn run() -> Result<(), request_core::ClientError> {
//! let client = RequestClient::new(ClientConfig::new("https://httpstat.us"))?;
//! match client.get("/200", RequestOptions::new().param("sleep", 100)).await {
//!     ResultRecord::Success { code, body, .. } => println!("{code}: {body:?}"),
//!     ResultRecord::Failure { message, .. } => eprintln!("request failed: {message}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{normalize_response, RequestClient};
pub use config::ClientConfig;
pub use error::{ClientError, TransportError};
pub use http::{HeaderMultiMap, HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Body, RequestOptions, RequestSpec, ResultRecord, FORM_CONTENT_TYPE, JSON_CONTENT_TYPE};
