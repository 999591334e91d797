//! Request and response value types.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`HttpMethod`] | HTTP method of a call |
//! | [`Target`] | Literal URL or URI template with parameters |
//! | [`RequestBody`] | Serialized request body |
//! | [`RestRequest`] | Everything the dispatcher needs for one call |
//! | [`ResponseEntity`] | Decoded body, status and headers of a successful call |

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::Serialize;
use url::Url;

use crate::error::ClientError;
use crate::protocol::HeaderMultiMap;
use crate::transport::UriParams;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// HEAD
    Head,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// Upper-case method name
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "HEAD" => Ok(HttpMethod::Head),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            "TRACE" => Ok(HttpMethod::Trace),
            _ => Err(ClientError::new(format!("Unsupported HTTP method '{}'", s))),
        }
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Options => http::Method::OPTIONS,
            HttpMethod::Trace => http::Method::TRACE,
        }
    }
}

/// Where a request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Concrete URL
    Url(Url),
    /// URI template expanded by the transport
    Template {
        /// Template text, e.g. `http://host/items/{id}`
        template: String,
        /// Placeholder values
        params: UriParams,
    },
}

impl Target {
    /// A template target
    pub fn template(template: impl Into<String>, params: UriParams) -> Self {
        Target::Template {
            template: template.into(),
            params,
        }
    }
}

impl From<Url> for Target {
    fn from(url: Url) -> Self {
        Target::Url(url)
    }
}

/// A serialized request body.
///
/// An absent body is `None` at the request level; there is no "null" body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody(Bytes);

impl RequestBody {
    /// Serialize `value` as JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when serialization fails.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ClientError> {
        serde_json::to_vec(value)
            .map(|bytes| RequestBody(Bytes::from(bytes)))
            .map_err(|e| ClientError::with_source("Failed to serialize request body", e))
    }

    /// The body bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take the body bytes
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody(Bytes::from(bytes))
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody(Bytes::from(text))
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody(Bytes::copy_from_slice(text.as_bytes()))
    }
}

/// One REST call, in canonical form.
///
/// # Examples
///
/// ```
/// use microservice_restclient::types::{HttpMethod, RestRequest};
///
/// let request = RestRequest::new(HttpMethod::Post, url::Url::parse("http://localhost/items").unwrap())
///     .with_header("X-Trace", "abc")
///     .with_body("{\"name\":\"x\"}");
/// assert_eq!(request.method, HttpMethod::Post);
/// assert!(request.body.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RestRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Destination
    pub target: Target,
    /// Caller headers
    pub headers: Option<HeaderMultiMap>,
    /// Request body
    pub body: Option<RequestBody>,
}

impl RestRequest {
    /// Create a request without headers or body
    pub fn new(method: HttpMethod, target: impl Into<Target>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: None,
            body: None,
        }
    }

    /// Replace the caller headers
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMultiMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Append one header value
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HeaderMultiMap::new)
            .add(name, value);
        self
    }

    /// Set the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Result of a successful call.
///
/// Equality compares body, status and headers; header order and name casing do not
/// matter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseEntity<T> {
    body: Option<T>,
    status: u16,
    headers: HeaderMultiMap,
}

impl<T> ResponseEntity<T> {
    /// Create an entity
    pub fn new(body: Option<T>, status: u16, headers: HeaderMultiMap) -> Self {
        Self {
            body,
            status,
            headers,
        }
    }

    /// Decoded body; `None` when the response had none
    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    /// Take the decoded body
    pub fn into_body(self) -> Option<T> {
        self.body
    }

    /// HTTP status
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMultiMap {
        &self.headers
    }
}
