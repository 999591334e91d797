//! [`Transport`] binding over `reqwest`.
//!
//! # Features
//!
//! - Connection pooling, timeouts and proxy settings from [`ClientConfig`]
//! - Default headers that caller-supplied headers override
//! - Bounded retry with exponential backoff for connection failures and retryable
//!   statuses (408, 425, 429, 502, 503, 504)
//!
//! When retries are enabled and every attempt fails, the call fails with
//! `"Retries exhausted: <n>/<n>"` and no response attached, so the dispatcher reports
//! a client error.
//!
//! # Examples
//!
//! ```
//! use microservice_restclient::client::ClientConfig;
//! use microservice_restclient::transport::ReqwestTransport;
//!
//! let config = ClientConfig {
//!     max_retries: 2,
//!     retry_delay_ms: 50,
//!     ..Default::default()
//! };
//! let transport = ReqwestTransport::with_config(config).unwrap();
//! assert_eq!(transport.config().max_retries, 2);
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::{Transport, TransportError, TransportRequest, TransportResponse};
use crate::client::utils::{exponential_backoff, is_retryable_status};
use crate::client::ClientConfig;
use crate::protocol::HeaderMultiMap;

/// Transport backed by a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl ReqwestTransport {
    /// Build a transport with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transport from `config`.
    ///
    /// # Errors
    ///
    /// Fails when a default header or the proxy URL is invalid, or the underlying
    /// client cannot be built.
    pub fn with_config(config: ClientConfig) -> Result<Self, TransportError> {
        let default_headers: HeaderMultiMap = config
            .default_headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        let default_headers = default_headers
            .to_http()
            .map_err(|e| TransportError::with_source("Invalid default headers", e))?;

        let mut builder = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(config.max_idle_per_host);

        if !config.follow_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }

        if !config.proxy_url.is_empty() {
            let proxy = reqwest::Proxy::all(&config.proxy_url)
                .map_err(|e| TransportError::with_source("Invalid proxy URL", e))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::with_source("Failed to build HTTP client", e))?;

        Ok(Self::from_client(client, config))
    }

    /// Wrap an existing `reqwest::Client`.
    ///
    /// Only the retry and logging settings of `config` apply; everything else is
    /// already baked into `client`.
    pub fn from_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// Get the transport configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send_once(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let headers = request
            .headers
            .to_http()
            .map_err(|e| TransportError::with_source("Invalid request headers", e))?;

        let mut req_builder = self
            .client
            .request(request.method.into(), request.url.clone())
            .headers(headers);

        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.clone());
        }

        let response = req_builder.send().await?;

        let status = response.status().as_u16();
        let headers = HeaderMultiMap::from(response.headers());
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    fn exhausted(&self, last: TransportError) -> TransportError {
        let max = self.config.max_retries;
        TransportError::with_source(format!("Retries exhausted: {}/{}", max, max), last)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        match Self::with_config(ClientConfig::default()) {
            Ok(transport) => transport,
            Err(e) => {
                tracing::warn!("Failed to build configured HTTP client, using reqwest defaults: {}", e);
                Self::from_client(reqwest::Client::default(), ClientConfig::default())
            }
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<Option<TransportResponse>, TransportError> {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            let failure = match self.send_once(&request).await {
                Ok(response) if max_retries > 0 && is_retryable_status(response.status) => {
                    TransportError::from_status(request.method, &request.url, response)
                }
                Ok(response) => return Ok(Some(response)),
                Err(e) if max_retries > 0 && e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            if attempt >= max_retries {
                return Err(self.exhausted(failure));
            }

            let delay = exponential_backoff(attempt, self.config.retry_delay_ms);
            if self.config.enable_logging {
                tracing::warn!(
                    "Request failed (attempt {}), retrying after {:?}: {}",
                    attempt + 1,
                    delay,
                    failure
                );
            }
            sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HttpMethod;
    use std::collections::BTreeMap;
    use std::error::Error as _;
    use url::Url;

    fn request(url: &str) -> TransportRequest {
        TransportRequest {
            method: HttpMethod::Get,
            url: Url::parse(url).unwrap(),
            headers: HeaderMultiMap::new(),
            body: None,
        }
    }

    #[test]
    fn test_invalid_default_header_is_rejected() {
        let mut default_headers = BTreeMap::new();
        default_headers.insert("bad header".to_string(), "v".to_string());
        let config = ClientConfig {
            default_headers,
            ..Default::default()
        };
        let err = ReqwestTransport::with_config(config).unwrap_err();
        assert_eq!(err.message(), "Invalid default headers");
    }

    #[tokio::test]
    async fn test_connection_failure_without_retries() {
        let transport = ReqwestTransport::new();
        // Port 9 (discard) is closed on test machines
        let err = transport.send(request("http://127.0.0.1:9/")).await.unwrap_err();
        assert!(err.response().is_none());
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let config = ClientConfig {
            max_retries: 2,
            retry_delay_ms: 0,
            enable_logging: false,
            ..Default::default()
        };
        let transport = ReqwestTransport::with_config(config).unwrap();
        let err = transport.send(request("http://127.0.0.1:9/")).await.unwrap_err();
        assert_eq!(err.message(), "Retries exhausted: 2/2");
        assert!(err.response().is_none());
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn test_retryable_status_is_retried() {
        let mut server = mockito::Server::new_async().await;
        let failing = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let config = ClientConfig {
            max_retries: 2,
            retry_delay_ms: 0,
            ..Default::default()
        };
        let transport = ReqwestTransport::with_config(config).unwrap();
        let err = transport
            .send(request(&format!("{}/flaky", server.url())))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Retries exhausted: 2/2");
        assert!(err.source().unwrap().to_string().starts_with("503 Service Unavailable from GET"));
        failing.assert_async().await;
    }

    #[tokio::test]
    async fn test_retry_recovers_after_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let unavailable = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;
        let recovered = server
            .mock("GET", "/flaky")
            .with_status(200)
            .with_body("ok")
            .expect(1)
            .create_async()
            .await;

        let transport = ReqwestTransport::with_config(ClientConfig {
            max_retries: 2,
            retry_delay_ms: 0,
            ..Default::default()
        })
        .unwrap();
        let response = transport
            .send(request(&format!("{}/flaky", server.url())))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(&response.body[..], b"ok");
        unavailable.assert_async().await;
        recovered.assert_async().await;
    }

    #[test]
    fn test_default_uses_default_config() {
        let transport = ReqwestTransport::default();
        assert_eq!(transport.config(), &ClientConfig::default());
    }

    #[tokio::test]
    async fn test_error_status_returned_without_retries() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("nope")
            .create_async()
            .await;

        let transport = ReqwestTransport::new();
        let response = transport
            .send(request(&format!("{}/missing", server.url())))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(&response.body[..], b"nope");
    }

    #[tokio::test]
    async fn test_default_headers_are_sent_and_overridable() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/h")
            .match_header("Test-Header-Name", "Test-Header-Value")
            .match_header("X-Override", "caller")
            .with_status(200)
            .create_async()
            .await;

        let mut default_headers = BTreeMap::new();
        default_headers.insert("Test-Header-Name".to_string(), "Test-Header-Value".to_string());
        default_headers.insert("X-Override".to_string(), "default".to_string());
        let transport = ReqwestTransport::with_config(ClientConfig {
            default_headers,
            ..Default::default()
        })
        .unwrap();

        let mut req = request(&format!("{}/h", server.url()));
        req.headers.add("X-Override", "caller");
        let response = transport.send(req).await.unwrap().unwrap();

        assert_eq!(response.status, 200);
        m.assert_async().await;
    }
}
