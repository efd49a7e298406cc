//! Client configuration.
//!
//! `ClientConfig` enumerates every knob the client understands. It is built
//! in code with the `with_*` setters or deserialized from a config document,
//! where the timeout is given in (fractional) seconds:
//!
//! ```
//! use request_core::ClientConfig;
//!
//! let config: ClientConfig = serde_json::from_str(
//!     r#"{"base_url": "https://api.example.com", "proxy": "127.0.0.1:9050", "timeout_secs": 2.5}"#,
//! )
//! .unwrap();
//! assert_eq!(config.timeout.as_millis(), 2500);
//! assert!(config.verify_tls);
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::http::insert_header;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings fixed when a `RequestClient` is built.
///
/// `default_headers` and `logging` only seed the client; both can be changed
/// on the client afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Prefix prepended verbatim to every request path.
    pub base_url: String,

    /// SOCKS5 proxy as `host:port`. DNS is resolved by the proxy.
    #[serde(default)]
    pub proxy: Option<String>,

    /// Upper bound for the whole request, from connect to last body byte.
    #[serde(
        default = "default_timeout",
        rename = "timeout_secs",
        deserialize_with = "deserialize_secs"
    )]
    pub timeout: Duration,

    /// When false, certificate and hostname validation are skipped.
    #[serde(default = "enabled")]
    pub verify_tls: bool,

    #[serde(default = "enabled")]
    pub follow_redirects: bool,

    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,

    #[serde(default)]
    pub logging: bool,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
            verify_tls: true,
            follow_redirects: true,
            default_headers: BTreeMap::new(),
            logging: false,
        }
    }

    pub fn with_proxy(mut self, address: impl Into<String>) -> Self {
        self.proxy = Some(address.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disable certificate and hostname verification.
    pub fn danger_skip_tls_verify(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_header(&mut self.default_headers, name.into(), value.into());
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    /// The proxy address as a URL that makes the proxy resolve host names.
    pub(crate) fn proxy_url(&self) -> Option<String> {
        self.proxy.as_deref().map(|address| {
            let address = address
                .strip_prefix("socks5h://")
                .or_else(|| address.strip_prefix("socks5://"))
                .unwrap_or(address);
            format!("socks5h://{address}")
        })
    }
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn enabled() -> bool {
    true
}

fn deserialize_secs<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}
