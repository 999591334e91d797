//! Client configuration.
//!
//! Two layers are configured separately:
//!
//! - [`RestClientConfig`] - how the dispatcher prepares requests and interprets
//!   error bodies. Fixed at construction; a dispatcher never mutates it.
//! - [`ClientConfig`] - how the bundled reqwest transport talks to the network.
//!   Deserializable, so it can live in a service's configuration file.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::protocol::constants::media_types::APPLICATION_JSON;
use crate::tmf::{DefaultTmfErrorResponseConverter, TmfErrorResponseConverter};

/// Dispatcher configuration.
#[derive(Clone)]
pub struct RestClientConfig {
    /// `Content-Type` applied when the caller sets none
    pub default_content_type: String,

    /// Turns decoded TMF envelopes into remote exceptions
    pub converter: Arc<dyn TmfErrorResponseConverter>,
}

impl RestClientConfig {
    /// Replace the envelope converter
    #[must_use]
    pub fn with_converter(mut self, converter: impl TmfErrorResponseConverter + 'static) -> Self {
        self.converter = Arc::new(converter);
        self
    }

    /// Replace the default content type
    #[must_use]
    pub fn with_default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            default_content_type: APPLICATION_JSON.to_string(),
            converter: Arc::new(DefaultTmfErrorResponseConverter),
        }
    }
}

impl fmt::Debug for RestClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClientConfig")
            .field("default_content_type", &self.default_content_type)
            .field("converter", &self.converter)
            .finish()
    }
}

/// Configuration of the reqwest transport.
///
/// # Examples
///
/// ```
/// use microservice_restclient::client::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(r#"{"max_retries": 3}"#).unwrap();
/// assert_eq!(config.max_retries, 3);
/// assert_eq!(config.request_timeout_ms, 30_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Whole-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Retries after the first attempt; `0` disables retrying
    pub max_retries: u32,
    /// Base delay for exponential backoff, in milliseconds
    pub retry_delay_ms: u64,
    /// Idle pooled connections kept per host
    pub max_idle_per_host: usize,
    /// Proxy for all traffic; empty for none
    pub proxy_url: String,
    /// Follow 3xx redirects inside the transport
    pub follow_redirects: bool,
    /// Headers sent with every request unless the caller sets the same name
    pub default_headers: BTreeMap<String, String>,
    /// Log retries
    pub enable_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 30_000,
            connect_timeout_ms: 10_000,
            max_retries: 0,
            retry_delay_ms: 100,
            max_idle_per_host: 32,
            proxy_url: String::new(),
            follow_redirects: true,
            default_headers: BTreeMap::new(),
            enable_logging: true,
        }
    }
}
