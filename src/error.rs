//! Error taxonomy for REST calls.
//!
//! Every failure a caller can observe is one of two kinds:
//!
//! | Kind | Meaning |
//! |------|---------|
//! | [`ClientError`] | No usable HTTP response: connection failure, bad URL, body (de)serialization failure |
//! | [`ResponseError`] | The server answered with an error status; status, raw body and headers are kept |
//!
//! [`RestClientError`] wraps both so a single `?` propagates either. A response error
//! optionally carries a [`ResponseCause`]: the original transport error, or a
//! [`RemoteCodeException`] decoded from a TMF error envelope in the body. Never both.

use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::protocol::{resolve_charset, Charset, HeaderMultiMap};
use crate::tmf::RemoteCodeException;
use crate::transport::TransportError;

/// Boxed error used as an opaque source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for REST client operations
pub type Result<T> = std::result::Result<T, RestClientError>;

/// Code reported by every error this library raises itself
pub const REST_CALL_ERROR_CODE: &str = "CORE-LIB-MRA-0001";

/// Title reported alongside [`REST_CALL_ERROR_CODE`]
pub const REST_CALL_ERROR_TITLE: &str = "Exception occurred performing REST call";

/// A machine-readable error code with a human title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Stable code, e.g. `CORE-LIB-MRA-0001`
    pub code: String,
    /// Short description of the code
    pub title: String,
}

impl ErrorCode {
    /// Create a new error code
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
        }
    }

    /// The code shared by [`ClientError`] and [`ResponseError`]
    pub fn rest_call() -> Self {
        Self::new(REST_CALL_ERROR_CODE, REST_CALL_ERROR_TITLE)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.title)
    }
}

/// Any failure surfaced by the REST client.
#[derive(Debug, Error)]
pub enum RestClientError {
    /// Failure with no usable HTTP response
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The server answered with an error status
    #[error(transparent)]
    Response(#[from] ResponseError),
}

impl RestClientError {
    /// The error message, without response details
    pub fn message(&self) -> &str {
        match self {
            RestClientError::Client(e) => e.message(),
            RestClientError::Response(e) => e.message(),
        }
    }

    /// Library error code, identical for both kinds
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::rest_call()
    }

    /// HTTP status, when the failure carries a response
    pub fn status(&self) -> Option<u16> {
        self.as_response().map(ResponseError::status)
    }

    /// Borrow the response error, if this is one
    pub fn as_response(&self) -> Option<&ResponseError> {
        match self {
            RestClientError::Response(e) => Some(e),
            RestClientError::Client(_) => None,
        }
    }

    /// Whether the failure carries an HTTP response
    pub fn is_response(&self) -> bool {
        matches!(self, RestClientError::Response(_))
    }
}

/// A failure that produced no usable HTTP response.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ClientError {
    /// Create an error with only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error caused by `source`
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// The error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Library error code
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::rest_call()
    }
}

/// What caused a [`ResponseError`].
#[derive(Debug, Error)]
pub enum ResponseCause {
    /// The transport-level failure, when the body was not a TMF envelope
    #[error(transparent)]
    Transport(TransportError),

    /// The remote error decoded from a TMF envelope
    #[error(transparent)]
    Remote(RemoteCodeException),
}

/// The server answered, but with an error status.
///
/// The body is kept as the exact bytes received. [`ResponseError::body_as_string`]
/// decodes it on demand with the charset announced by the response headers.
///
/// # Display
///
/// ```
/// use microservice_restclient::error::ResponseError;
/// use microservice_restclient::protocol::HeaderMultiMap;
///
/// let error = ResponseError::new("test", 200, "resp", HeaderMultiMap::new());
/// assert_eq!(
///     error.to_string(),
///     "ResponseError{message=test, httpStatus=200, responseBody=resp}"
/// );
/// ```
#[derive(Debug, Error)]
#[error("ResponseError{{message={message}, httpStatus={status}, responseBody={}}}", decode_body(.body, .headers))]
pub struct ResponseError {
    message: String,
    status: u16,
    body: Bytes,
    headers: HeaderMultiMap,
    #[source]
    cause: Option<ResponseCause>,
}

impl ResponseError {
    /// Create a response error without a cause
    pub fn new(
        message: impl Into<String>,
        status: u16,
        body: impl Into<Bytes>,
        headers: HeaderMultiMap,
    ) -> Self {
        Self {
            message: message.into(),
            status,
            body: body.into(),
            headers,
            cause: None,
        }
    }

    /// Attach the cause
    #[must_use]
    pub fn with_cause(mut self, cause: ResponseCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// The error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status as reported by the transport, including non-standard codes
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw response body
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMultiMap {
        &self.headers
    }

    /// Cause of this error, if known
    pub fn cause(&self) -> Option<&ResponseCause> {
        self.cause.as_ref()
    }

    /// The decoded remote error, when the body was a TMF envelope
    pub fn remote_cause(&self) -> Option<&RemoteCodeException> {
        match &self.cause {
            Some(ResponseCause::Remote(remote)) => Some(remote),
            _ => None,
        }
    }

    /// The transport failure, when the body was not a TMF envelope
    pub fn transport_cause(&self) -> Option<&TransportError> {
        match &self.cause {
            Some(ResponseCause::Transport(transport)) => Some(transport),
            _ => None,
        }
    }

    /// Charset announced by the `Content-Type` response header
    pub fn charset(&self) -> Charset {
        resolve_charset(&self.headers)
    }

    /// The body decoded with [`ResponseError::charset`]
    pub fn body_as_string(&self) -> String {
        decode_body(&self.body, &self.headers)
    }

    /// Library error code
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode::rest_call()
    }
}

fn decode_body(body: &[u8], headers: &HeaderMultiMap) -> String {
    resolve_charset(headers).decode(body)
}
