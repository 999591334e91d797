//! Basic REST client example
//!
//! Issues a GET and prints the response entity or the normalized error.
//!
//! Run with: cargo run --example basic_client -- http://localhost:8080/items

use microservice_restclient::client::{ClientConfig, Json, RestClient};
use microservice_restclient::transport::ReqwestTransport;
use microservice_restclient::{HttpMethod, RestClientError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:8080/items".to_string());

    println!("REST Client Basic Example");
    println!("=========================\n");
    println!("GET {}", url);

    let transport = ReqwestTransport::with_config(ClientConfig {
        max_retries: 2,
        retry_delay_ms: 200,
        ..Default::default()
    })?;
    let client = RestClient::with_transport(transport);

    match client
        .do_request::<Json<serde_json::Value>>(&url, HttpMethod::Get, None, None)
        .await
    {
        Ok(entity) => {
            println!("\nStatus: {}", entity.status());
            for (name, values) in entity.headers().iter() {
                println!("  {}: {}", name, values.join(", "));
            }
            if let Some(Json(body)) = entity.body() {
                println!("\n{}", serde_json::to_string_pretty(body)?);
            }
        }
        Err(RestClientError::Response(e)) => {
            println!("\nServer answered {}", e.status());
            match e.remote_cause() {
                Some(remote) => println!("  Remote error {}: {}", remote.error_code(), remote),
                None => println!("  {}", e),
            }
        }
        Err(e) => {
            println!("\nRequest failed: {} ({})", e, e.error_code());
        }
    }

    Ok(())
}
