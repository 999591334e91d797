//! Response body decoding.
//!
//! The dispatcher decodes a successful response body into the caller's chosen shape
//! through [`FromResponseBody`]. An empty body always decodes to `None`.
//!
//! | Shape | Decoding |
//! |-------|----------|
//! | `()` | Body discarded |
//! | `String` | Charset from `Content-Type`, UTF-8 when none is announced |
//! | `Bytes` / `Vec<u8>` | Raw bytes |
//! | `serde_json::Value` | JSON document |
//! | [`Json<T>`] | JSON into any `DeserializeOwned` type |

use bytes::Bytes;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::protocol::{resolve_charset_or, Charset, HeaderMultiMap};

/// A response body could not be decoded.
#[derive(Debug, Error)]
pub enum BodyError {
    /// JSON decoding failed
    #[error("Failed to decode response body as JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decodes a response body.
pub trait FromResponseBody: Sized {
    /// Decode `body`. Only called for non-empty bodies.
    fn from_response_body(headers: &HeaderMultiMap, body: Bytes) -> Result<Self, BodyError>;

    /// Decode `body`, mapping an empty body to `None`
    fn decode(headers: &HeaderMultiMap, body: Bytes) -> Result<Option<Self>, BodyError> {
        if body.is_empty() {
            return Ok(None);
        }
        Self::from_response_body(headers, body).map(Some)
    }
}

impl FromResponseBody for () {
    fn from_response_body(_headers: &HeaderMultiMap, _body: Bytes) -> Result<Self, BodyError> {
        Ok(())
    }

    fn decode(_headers: &HeaderMultiMap, _body: Bytes) -> Result<Option<Self>, BodyError> {
        Ok(None)
    }
}

impl FromResponseBody for String {
    fn from_response_body(headers: &HeaderMultiMap, body: Bytes) -> Result<Self, BodyError> {
        Ok(resolve_charset_or(headers, Charset::utf8()).decode(&body))
    }
}

impl FromResponseBody for Bytes {
    fn from_response_body(_headers: &HeaderMultiMap, body: Bytes) -> Result<Self, BodyError> {
        Ok(body)
    }
}

impl FromResponseBody for Vec<u8> {
    fn from_response_body(_headers: &HeaderMultiMap, body: Bytes) -> Result<Self, BodyError> {
        Ok(body.to_vec())
    }
}

impl FromResponseBody for serde_json::Value {
    fn from_response_body(_headers: &HeaderMultiMap, body: Bytes) -> Result<Self, BodyError> {
        Ok(serde_json::from_slice(&body)?)
    }
}

/// JSON body decoded into `T`.
///
/// ```
/// use microservice_restclient::client::Json;
///
/// #[derive(serde::Deserialize)]
/// struct Item {
///     id: u32,
/// }
///
/// fn first_id(entity: microservice_restclient::ResponseEntity<Json<Vec<Item>>>) -> Option<u32> {
///     entity.into_body()?.0.first().map(|item| item.id)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the decoded value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: DeserializeOwned> FromResponseBody for Json<T> {
    fn from_response_body(_headers: &HeaderMultiMap, body: Bytes) -> Result<Self, BodyError> {
        Ok(Json(serde_json::from_slice(&body)?))
    }
}
