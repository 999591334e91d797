//! Client factories.

use std::sync::Arc;

use crate::client::config::{ClientConfig, RestClientConfig};
use crate::client::dispatcher::RestClient;
use crate::error::ClientError;
use crate::transport::ReqwestTransport;

/// Creates configured [`RestClient`]s.
pub trait RestClientFactory: Send + Sync {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Fails when the underlying transport cannot be built.
    fn create(&self) -> Result<RestClient, ClientError>;
}

/// Factory for clients over [`ReqwestTransport`].
///
/// Clients created by one factory share a single connection pool.
///
/// ```
/// use microservice_restclient::client::{ClientConfig, ReqwestRestClientFactory, RestClientFactory};
///
/// let factory = ReqwestRestClientFactory::new(ClientConfig::default());
/// let client = factory.create().unwrap();
/// assert_eq!(client.config().default_content_type, "application/json");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReqwestRestClientFactory {
    transport_config: ClientConfig,
    client_config: Arc<RestClientConfig>,
    transport: Arc<std::sync::OnceLock<Arc<ReqwestTransport>>>,
}

impl ReqwestRestClientFactory {
    /// Factory with transport configuration and default dispatcher configuration
    pub fn new(transport_config: ClientConfig) -> Self {
        Self {
            transport_config,
            ..Default::default()
        }
    }

    /// Replace the dispatcher configuration
    #[must_use]
    pub fn with_client_config(mut self, config: RestClientConfig) -> Self {
        self.client_config = Arc::new(config);
        self
    }

    fn transport(&self) -> Result<Arc<ReqwestTransport>, ClientError> {
        if let Some(transport) = self.transport.get() {
            return Ok(Arc::clone(transport));
        }
        let transport = ReqwestTransport::with_config(self.transport_config.clone())
            .map_err(|e| ClientError::with_source(e.message().to_string(), e))?;
        Ok(Arc::clone(self.transport.get_or_init(|| Arc::new(transport))))
    }
}

impl RestClientFactory for ReqwestRestClientFactory {
    fn create(&self) -> Result<RestClient, ClientError> {
        let transport = self.transport()?;
        tracing::debug!("Created REST client over reqwest transport");
        Ok(RestClient::from_shared(transport, Arc::clone(&self.client_config)))
    }
}
