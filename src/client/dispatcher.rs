//! The request dispatcher.
//!
//! [`RestClient`] turns a call into a [`TransportRequest`], hands it to the configured
//! [`Transport`] and normalizes whatever comes back:
//!
//! 1. Caller headers are copied into a fresh map and `Content-Type` is defaulted.
//! 2. The target is resolved (templates are expanded by the transport) and sent.
//! 3. A 2xx status decodes the body into a [`ResponseEntity`]; anything else is an error.
//! 4. Errors with a response become [`ResponseError`]s, after an attempt to decode a TMF
//!    error envelope from the body. Errors without one become [`ClientError`]s.
//!
//! # Examples
//!
//! ```ignore
//! use microservice_restclient::client::{Json, RestClient};
//! use microservice_restclient::types::HttpMethod;
//!
//! #[tokio::main]
//! async fn main() -> microservice_restclient::Result<()> {
//!     let client = RestClient::new();
//!     let entity = client
//!         .do_request::<Json<serde_json::Value>>("http://localhost:8080/items", HttpMethod::Get, None, None)
//!         .await?;
//!     println!("{} {:?}", entity.status(), entity.body());
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use url::Url;

use crate::client::body::FromResponseBody;
use crate::client::config::RestClientConfig;
use crate::error::{ClientError, ResponseCause, ResponseError, RestClientError, Result};
use crate::protocol::constants::headers::CONTENT_TYPE;
use crate::protocol::{is_error_status, HeaderMultiMap};
use crate::tmf::decode_envelope;
use crate::transport::{
    ReqwestTransport, Transport, TransportError, TransportRequest, TransportResponse, UriParams,
};
use crate::types::{HttpMethod, RequestBody, ResponseEntity, RestRequest, Target};

/// Transport-agnostic REST client.
///
/// Cheap to clone; clones share the transport and the configuration.
#[derive(Clone)]
pub struct RestClient {
    transport: Arc<dyn Transport>,
    config: Arc<RestClientConfig>,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Client over a default [`ReqwestTransport`]
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::new())
    }

    /// Client over `transport` with default configuration
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self::with_config(transport, RestClientConfig::default())
    }

    /// Client over `transport` with `config`
    pub fn with_config(transport: impl Transport + 'static, config: RestClientConfig) -> Self {
        Self::from_shared(Arc::new(transport), Arc::new(config))
    }

    /// Client over an already shared transport and configuration
    pub fn from_shared(transport: Arc<dyn Transport>, config: Arc<RestClientConfig>) -> Self {
        Self { transport, config }
    }

    /// Dispatcher configuration
    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    /// Call a literal URL.
    ///
    /// # Errors
    ///
    /// A URL that does not parse is a [`ClientError`]; see [`RestClient::execute`] for
    /// the rest.
    pub async fn do_request<T: FromResponseBody>(
        &self,
        url: &str,
        method: HttpMethod,
        headers: Option<HeaderMultiMap>,
        body: Option<RequestBody>,
    ) -> Result<ResponseEntity<T>> {
        let url = Url::parse(url)
            .map_err(|e| ClientError::with_source(format!("Invalid URI '{}'", url), e))?;
        self.do_request_uri(url, method, headers, body).await
    }

    /// Call a parsed URL
    pub async fn do_request_uri<T: FromResponseBody>(
        &self,
        url: Url,
        method: HttpMethod,
        headers: Option<HeaderMultiMap>,
        body: Option<RequestBody>,
    ) -> Result<ResponseEntity<T>> {
        self.execute(RestRequest {
            method,
            target: Target::Url(url),
            headers,
            body,
        })
        .await
    }

    /// Call a URI template; the transport expands `params` into it
    pub async fn do_request_template<T: FromResponseBody>(
        &self,
        template: &str,
        params: UriParams,
        method: HttpMethod,
        headers: Option<HeaderMultiMap>,
        body: Option<RequestBody>,
    ) -> Result<ResponseEntity<T>> {
        self.execute(RestRequest {
            method,
            target: Target::template(template, params),
            headers,
            body,
        })
        .await
    }

    /// Perform one call.
    ///
    /// # Errors
    ///
    /// - [`ClientError`] when no usable response was obtained, or the body of a
    ///   successful response could not be decoded
    /// - [`ResponseError`] when the server answered with a non-2xx status
    pub async fn execute<T: FromResponseBody>(
        &self,
        request: RestRequest,
    ) -> Result<ResponseEntity<T>> {
        let RestRequest {
            method,
            target,
            headers,
            body,
        } = request;

        let url = match target {
            Target::Url(url) => url,
            Target::Template { template, params } => self
                .transport
                .expand(&template, &params)
                .map_err(|e| self.normalize(e))?,
        };

        let transport_request = TransportRequest {
            method,
            url,
            headers: self.prepare_headers(headers),
            body: body.map(RequestBody::into_bytes),
        };

        tracing::debug!("{} {}", method, transport_request.url);
        let response = self.dispatch(transport_request).await?;
        tracing::trace!("{} -> {}", method, response.status);

        let body = T::decode(&response.headers, response.body).map_err(|e| {
            RestClientError::from(ClientError::with_source(e.to_string(), e))
        })?;

        Ok(ResponseEntity::new(body, response.status, response.headers))
    }

    async fn dispatch(&self, request: TransportRequest) -> Result<TransportResponse> {
        let method = request.method;
        let url = request.url.clone();

        let response = match self.transport.send(request).await {
            Ok(Some(response)) => response,
            Ok(None) => return Err(ClientError::new("Null HTTP response").into()),
            Err(e) => return Err(self.normalize(e)),
        };

        if is_error_status(response.status) {
            return Err(self.normalize(TransportError::from_status(method, &url, response)));
        }

        Ok(response)
    }

    fn prepare_headers(&self, headers: Option<HeaderMultiMap>) -> HeaderMultiMap {
        let mut prepared = HeaderMultiMap::new();
        if let Some(headers) = &headers {
            prepared.add_all(headers);
        }
        if !prepared.contains_key(CONTENT_TYPE) {
            prepared.set(CONTENT_TYPE, [self.config.default_content_type.as_str()]);
        }
        prepared
    }

    fn normalize(&self, error: TransportError) -> RestClientError {
        match error.response().cloned() {
            None => {
                let message = error.message().to_string();
                ClientError::with_source(message, error).into()
            }
            Some(response) => self.resolve_response_error(error, response).into(),
        }
    }

    fn resolve_response_error(
        &self,
        error: TransportError,
        response: TransportResponse,
    ) -> ResponseError {
        let TransportResponse {
            status,
            headers,
            body,
        } = response;

        let remote = decode_envelope(&body)
            .and_then(|envelope| self.config.converter.build_error_code_exception(&envelope));

        match remote {
            Ok(remote) => ResponseError::new(remote.message().to_string(), status, body, headers)
                .with_cause(ResponseCause::Remote(remote)),
            Err(e) => {
                tracing::debug!("Failed to parse response as TMF error response: {}", e);
                ResponseError::new(error.message().to_string(), status, body, headers)
                    .with_cause(ResponseCause::Transport(error))
            }
        }
    }
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}
