//! Blocking wrapper around [`RestClient`].
//!
//! Each call blocks the current thread on a private current-thread tokio runtime.
//! Must not be used from inside an async context.

use std::sync::Arc;

use tokio::runtime::{Builder, Runtime};
use url::Url;

use crate::client::body::FromResponseBody;
use crate::client::dispatcher::RestClient;
use crate::error::{ClientError, Result};
use crate::protocol::HeaderMultiMap;
use crate::transport::UriParams;
use crate::types::{HttpMethod, RequestBody, ResponseEntity, RestRequest};

/// Blocking REST client.
#[derive(Debug, Clone)]
pub struct BlockingRestClient {
    inner: RestClient,
    runtime: Arc<Runtime>,
}

impl BlockingRestClient {
    /// Wrap `inner`.
    ///
    /// # Errors
    ///
    /// Fails when the runtime cannot be created.
    pub fn new(inner: RestClient) -> std::result::Result<Self, ClientError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ClientError::with_source("Failed to start blocking runtime", e))?;

        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    /// The wrapped async client
    pub fn inner(&self) -> &RestClient {
        &self.inner
    }

    /// Blocking [`RestClient::do_request`]
    pub fn do_request<T: FromResponseBody>(
        &self,
        url: &str,
        method: HttpMethod,
        headers: Option<HeaderMultiMap>,
        body: Option<RequestBody>,
    ) -> Result<ResponseEntity<T>> {
        self.runtime
            .block_on(self.inner.do_request(url, method, headers, body))
    }

    /// Blocking [`RestClient::do_request_uri`]
    pub fn do_request_uri<T: FromResponseBody>(
        &self,
        url: Url,
        method: HttpMethod,
        headers: Option<HeaderMultiMap>,
        body: Option<RequestBody>,
    ) -> Result<ResponseEntity<T>> {
        self.runtime
            .block_on(self.inner.do_request_uri(url, method, headers, body))
    }

    /// Blocking [`RestClient::do_request_template`]
    pub fn do_request_template<T: FromResponseBody>(
        &self,
        template: &str,
        params: UriParams,
        method: HttpMethod,
        headers: Option<HeaderMultiMap>,
        body: Option<RequestBody>,
    ) -> Result<ResponseEntity<T>> {
        self.runtime.block_on(
            self.inner
                .do_request_template(template, params, method, headers, body),
        )
    }

    /// Blocking [`RestClient::execute`]
    pub fn execute<T: FromResponseBody>(&self, request: RestRequest) -> Result<ResponseEntity<T>> {
        self.runtime.block_on(self.inner.execute(request))
    }
}
