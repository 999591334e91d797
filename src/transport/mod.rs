//! The transport seam.
//!
//! The dispatcher never talks to the network itself. It hands a fully prepared
//! [`TransportRequest`] to a [`Transport`] and reacts to the outcome:
//!
//! | Outcome | Dispatcher reaction |
//! |---------|--------------------|
//! | `Ok(Some(response))` | Classify the status, succeed or take the error path |
//! | `Ok(None)` | `ClientError("Null HTTP response")` |
//! | `Err(error)` without response | `ClientError` |
//! | `Err(error)` with response | `ResponseError`, after a TMF decode attempt |
//!
//! Connection pooling, TLS, retries and URI template expansion are the transport's
//! business. [`ReqwestTransport`] is the binding shipped with this crate.
//!
//! # Implementing a transport
//!
//! ```
//! use async_trait::async_trait;
//! use microservice_restclient::transport::{
//!     Transport, TransportError, TransportRequest, TransportResponse,
//! };
//! use microservice_restclient::protocol::HeaderMultiMap;
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl Transport for Canned {
//!     async fn send(
//!         &self,
//!         _request: TransportRequest,
//!     ) -> Result<Option<TransportResponse>, TransportError> {
//!         Ok(Some(TransportResponse::new(204, HeaderMultiMap::new(), "")))
//!     }
//! }
//! ```

mod reqwest_transport;
mod uri;

pub use reqwest_transport::ReqwestTransport;
pub use uri::{expand_template, UriParams};

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use url::Url;

use crate::error::BoxError;
use crate::protocol::{reason_phrase, HeaderMultiMap};
use crate::types::HttpMethod;

/// A request ready to be put on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Concrete target URL, templates already expanded
    pub url: Url,
    /// Complete request headers
    pub headers: HeaderMultiMap,
    /// Serialized body; `None` means no body is sent at all
    pub body: Option<Bytes>,
}

/// What came back from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Raw status code, not necessarily a registered one
    pub status: u16,
    /// Response headers
    pub headers: HeaderMultiMap,
    /// Raw response body
    pub body: Bytes,
}

impl TransportResponse {
    /// Create a response
    pub fn new(status: u16, headers: HeaderMultiMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }
}

/// A failed transport call.
///
/// Errors that still carry a server response are turned into response errors by the
/// dispatcher; all others become client errors.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    response: Option<TransportResponse>,
    retryable: bool,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    /// Create an error with only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: None,
            retryable: false,
            source: None,
        }
    }

    /// Create an error caused by `source`
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(message)
        }
    }

    /// Create an error that carries the server response
    pub fn with_response(message: impl Into<String>, response: TransportResponse) -> Self {
        Self {
            response: Some(response),
            ..Self::new(message)
        }
    }

    /// Error for a response whose status was classified as a failure.
    ///
    /// The message reads `"<status> <reason> from <METHOD> <url>"`.
    pub fn from_status(method: HttpMethod, url: &Url, response: TransportResponse) -> Self {
        let message = match reason_phrase(response.status) {
            Some(reason) => format!("{} {} from {} {}", response.status, reason, method, url),
            None => format!("{} from {} {}", response.status, method, url),
        };
        Self::with_response(message, response)
    }

    /// Mark the error as worth retrying
    #[must_use]
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }

    /// The error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Server response attached to the error
    pub fn response(&self) -> Option<&TransportResponse> {
        self.response.as_ref()
    }

    /// Whether a retry might succeed
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let retryable = error.is_connect() || error.is_timeout();
        let mut transport = TransportError::with_source(error.to_string(), error);
        transport.retryable = retryable;
        transport
    }
}

/// Capability to perform one HTTP exchange.
///
/// `send` is the only required method. Implementations must be safe to share between
/// concurrent callers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the exchange.
    ///
    /// Return the response whatever its status; the dispatcher classifies it. Return
    /// `Err` for failures, attaching the response when one was received.
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<Option<TransportResponse>, TransportError>;

    /// Expand a URI template into a concrete URL.
    fn expand(&self, template: &str, params: &UriParams) -> Result<Url, TransportError> {
        expand_template(template, params)
    }
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<Option<TransportResponse>, TransportError> {
        (**self).send(request).await
    }

    fn expand(&self, template: &str, params: &UriParams) -> Result<Url, TransportError> {
        (**self).expand(template, params)
    }
}
