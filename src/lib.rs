#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! ## Overview
//!
//! The crate issues REST calls through a pluggable [`transport::Transport`] and
//! normalizes every outcome into either a [`ResponseEntity`] or one of two error kinds:
//!
//! | Outcome | Result |
//! |---------|--------|
//! | 2xx response | `Ok(ResponseEntity { body, status, headers })` |
//! | Non-2xx response with a TMF error envelope body | `ResponseError` caused by a `RemoteCodeException` |
//! | Non-2xx response with any other body | `ResponseError` caused by the transport error |
//! | No response (connection failure, bad URL, retries exhausted) | `ClientError` |
//!
//! Statuses outside the 2xx class, including non-standard ones like `999`, are errors.
//!
//! ## Client Usage
//!
//! ```ignore
//! use microservice_restclient::client::{Json, RestClient};
//! use microservice_restclient::types::{HttpMethod, RequestBody};
//! use microservice_restclient::RestClientError;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = RestClient::new();
//!     let body = RequestBody::json(&serde_json::json!({"name": "widget"}))?;
//!
//!     match client
//!         .do_request::<Json<serde_json::Value>>(
//!             "http://localhost:8080/items",
//!             HttpMethod::Post,
//!             None,
//!             Some(body),
//!         )
//!         .await
//!     {
//!         Ok(entity) => println!("{} {:?}", entity.status(), entity.body()),
//!         Err(RestClientError::Response(e)) => match e.remote_cause() {
//!             Some(remote) => eprintln!("remote error {}: {}", remote.error_code(), remote),
//!             None => eprintln!("{}", e),
//!         },
//!         Err(e) => eprintln!("request failed: {}", e),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - **[client]** - Dispatcher, blocking wrapper, body decoding, configuration
//! - **[transport]** - Transport seam and the reqwest binding
//! - **[error]** - Error taxonomy
//! - **[tmf]** - TMF error envelope decoding
//! - **[protocol]** - Header multimap, charset resolution, status classes
//! - **[types]** - Requests, methods and response entities

pub mod client;
pub mod error;
pub mod protocol;
pub mod tmf;
pub mod transport;
pub mod types;

pub use client::{BlockingRestClient, RestClient, RestClientConfig};
pub use error::{ClientError, ResponseError, RestClientError, Result};
pub use protocol::HeaderMultiMap;
pub use types::{HttpMethod, RequestBody, ResponseEntity, RestRequest};

#[cfg(test)]
mod tests;
