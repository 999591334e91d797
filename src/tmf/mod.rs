//! TMF error envelope decoding.
//!
//! Services that follow the TMF error guidelines answer failures with a JSON body like:
//!
//! ```json
//! {
//!   "id": "2b1e6f0c-...",
//!   "code": "ORDER-0042",
//!   "reason": "Order not found",
//!   "detail": "Order 17 does not exist",
//!   "status": "404",
//!   "@type": "NC.TMFErrorResponse.v1.0"
//! }
//! ```
//!
//! When an error response arrives, the dispatcher runs the body through
//! [`decode_envelope`] and the configured [`TmfErrorResponseConverter`]. Success yields a
//! [`RemoteCodeException`] that becomes the cause of the response error; any failure is
//! reported as a [`TmfDecodeError`] so the dispatcher can fall back to the plain
//! transport cause.
//!
//! # Examples
//!
//! ```
//! use microservice_restclient::tmf::{
//!     decode_envelope, DefaultTmfErrorResponseConverter, TmfErrorResponseConverter,
//! };
//!
//! let body = br#"{"code": "TEST", "reason": "test reason", "status": "500"}"#;
//! let envelope = decode_envelope(body).unwrap();
//! let remote = DefaultTmfErrorResponseConverter
//!     .build_error_code_exception(&envelope)
//!     .unwrap();
//!
//! assert_eq!(remote.error_code().code, "TEST");
//! assert_eq!(remote.error_code().title, "test reason");
//! assert_eq!(remote.status(), Some(500));
//!
//! assert!(decode_envelope(b"Test internal server error").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::error::ErrorCode;

/// `@type` value of version 1.0 envelopes
pub const TYPE_V1_0: &str = "NC.TMFErrorResponse.v1.0";

/// Remote error document. Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmfErrorResponse {
    /// Occurrence identifier
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Application error code
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short explanation
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Detailed explanation
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// HTTP status, as text
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Envelope type, e.g. [`TYPE_V1_0`]
    #[serde(
        rename = "@type",
        alias = "type",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub r#type: Option<String>,
}

/// Accept strings, numbers and booleans for text fields; `null` is absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;
    use serde_json::Value;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected a string, got {}", other))),
    }
}

/// Why a body could not be turned into a [`RemoteCodeException`].
#[derive(Debug, Error)]
pub enum TmfDecodeError {
    /// The body is not a JSON object of the envelope shape
    #[error("Response body is not a TMF error response: {0}")]
    Json(#[from] serde_json::Error),

    /// The envelope has no usable `code`
    #[error("TMF error response has no error code")]
    MissingCode,
}

/// Parse `bytes` as a [`TmfErrorResponse`].
///
/// Only the structure is checked; an envelope with every field absent decodes fine.
pub fn decode_envelope(bytes: &[u8]) -> Result<TmfErrorResponse, TmfDecodeError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Error raised by a remote service, recovered from its TMF envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteCodeException {
    error_code: ErrorCode,
    status: Option<u16>,
    message: String,
    id: Option<String>,
}

impl RemoteCodeException {
    /// Create a remote exception
    pub fn new(error_code: ErrorCode, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            error_code,
            status,
            message: message.into(),
            id: None,
        }
    }

    /// Attach the remote occurrence id
    #[must_use]
    pub fn with_id(mut self, id: Option<String>) -> Self {
        self.id = id;
        self
    }

    /// Remote error code and title
    pub fn error_code(&self) -> &ErrorCode {
        &self.error_code
    }

    /// HTTP status reported inside the envelope
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Human readable message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Remote occurrence id
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Maps a decoded envelope to a [`RemoteCodeException`].
///
/// Returning `Err` makes the dispatcher fall back to the plain transport cause.
pub trait TmfErrorResponseConverter: Send + Sync + fmt::Debug {
    /// Build the remote exception for `response`
    fn build_error_code_exception(
        &self,
        response: &TmfErrorResponse,
    ) -> Result<RemoteCodeException, TmfDecodeError>;
}

/// Converter used unless another one is configured.
///
/// | Envelope | Exception |
/// |----------|-----------|
/// | `code` | `error_code.code` (required) |
/// | `reason` | `error_code.title` |
/// | `status` | `status`, when numeric |
/// | `detail`, else `reason`, else `code` | `message` |
/// | `id` | `id` |
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTmfErrorResponseConverter;

impl TmfErrorResponseConverter for DefaultTmfErrorResponseConverter {
    fn build_error_code_exception(
        &self,
        response: &TmfErrorResponse,
    ) -> Result<RemoteCodeException, TmfDecodeError> {
        let code = response
            .code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
            .ok_or(TmfDecodeError::MissingCode)?;

        let title = response.reason.clone().unwrap_or_default();
        let status = response
            .status
            .as_deref()
            .and_then(|status| status.trim().parse::<u16>().ok());
        let message = response
            .detail
            .clone()
            .or_else(|| response.reason.clone())
            .unwrap_or_else(|| code.to_string());

        Ok(RemoteCodeException::new(ErrorCode::new(code, title), status, message)
            .with_id(response.id.clone()))
    }
}
