//! Error types for the request client.
//!
//! # Design
//! Requests never return `Err`: every `TransportError` is folded into a
//! `ResultRecord::Failure` by the client. The enum exists so transports can
//! report what went wrong in a structured way and so tests can fake each
//! failure class. `ClientError` covers the only fallible public step,
//! building a client from its configuration.

use std::error::Error as StdError;

use thiserror::Error;

/// Failures reported by a `Transport` when no complete response is available.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, DNS, TLS or proxy handshake failure; nothing was received.
    #[error("connection failed: {0}")]
    Connect(String),

    /// A status line arrived but the body could not be read.
    #[error("failed to read response body: {message}")]
    Body { status: u16, message: String },

    /// The request could not be sent (malformed URL, header or redirect loop).
    #[error("request failed: {0}")]
    Request(String),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// The status code received before the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Body { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = error_chain(&err);
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(message)
        } else if err.is_builder() || err.is_request() || err.is_redirect() {
            TransportError::Request(message)
        } else {
            TransportError::Other(message)
        }
    }
}

/// Errors raised while building a `RequestClient`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid proxy address {address:?}: {message}")]
    InvalidProxy { address: String, message: String },

    #[error("failed to build HTTP transport: {0}")]
    Build(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Build(error_chain(&err))
    }
}

/// Render an error with all of its sources, outermost first.
///
/// reqwest's top-level messages ("error sending request for url ...") hide
/// the cause, which is usually the interesting part.
pub(crate) fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
