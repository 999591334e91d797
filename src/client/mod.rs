//! REST client.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── dispatcher - RestClient: header preparation, dispatch, error normalization
//! ├── blocking   - BlockingRestClient over a private runtime
//! ├── body       - Response body decoding
//! ├── factory    - Client factories
//! ├── config     - Dispatcher and transport configuration
//! └── utils      - Retry helpers
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RestClient`] | Async, transport-agnostic client |
//! | [`BlockingRestClient`] | Blocking wrapper |
//! | [`RestClientConfig`] | Dispatcher configuration |
//! | [`ClientConfig`] | reqwest transport configuration |
//! | [`FromResponseBody`] | Decodes response bodies |
//! | [`RestClientFactory`] | Creates configured clients |
//!
//! # Examples
//!
//! ```
//! use microservice_restclient::client::{ClientConfig, RestClient, RestClientConfig};
//! use microservice_restclient::transport::ReqwestTransport;
//!
//! let transport = ReqwestTransport::with_config(ClientConfig {
//!     max_retries: 2,
//!     ..Default::default()
//! })
//! .unwrap();
//! let config = RestClientConfig::default().with_default_content_type("application/xml");
//! let client = RestClient::with_config(transport, config);
//! assert_eq!(client.config().default_content_type, "application/xml");
//! ```

mod blocking;
mod body;
mod config;
mod dispatcher;
mod factory;
pub(crate) mod utils;

pub use blocking::BlockingRestClient;
pub use body::{BodyError, FromResponseBody, Json};
pub use config::{ClientConfig, RestClientConfig};
pub use dispatcher::RestClient;
pub use factory::{ReqwestRestClientFactory, RestClientFactory};
