//! End-to-end tests: dispatcher over the reqwest transport against a mock server.

use crate::client::{BlockingRestClient, ClientConfig, Json, RestClient};
use crate::error::RestClientError;
use crate::protocol::HeaderMultiMap;
use crate::tmf::{TmfErrorResponse, TYPE_V1_0};
use crate::transport::{ReqwestTransport, UriParams};
use crate::types::{HttpMethod, RequestBody, ResponseEntity};
use mockito::Matcher;
use serde::{Deserialize, Serialize};
use url::Url;

const TEST_RESPONSE_BODY: &str = "Test response body";
const TEST_HEADER_NAME: &str = "Test-Header-Name";
const ANOTHER_TEST_HEADER_NAME: &str = "Another-Test-Header-Name";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TestEntity {
    id: String,
    name: String,
}

impl TestEntity {
    fn create() -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let name = format!("TestEntity_{}", id);
        Self { id, name }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn client() -> RestClient {
    init_tracing();
    RestClient::with_transport(ReqwestTransport::new())
}

fn test_url(server: &mockito::ServerGuard) -> String {
    format!("{}/test-path?param1=val1", server.url())
}

fn test_path(server: &mut mockito::ServerGuard, method: &str) -> mockito::Mock {
    server
        .mock(method, "/test-path")
        .match_query(Matcher::UrlEncoded("param1".into(), "val1".into()))
}

/// Response headers minus the ones the mock server generates per response.
fn without_generated<T>(entity: ResponseEntity<T>) -> ResponseEntity<T> {
    let status = entity.status();
    let mut headers = entity.headers().clone();
    headers.remove("date");
    ResponseEntity::new(entity.into_body(), status, headers)
}

#[tokio::test]
async fn test_null_request_body() {
    let mut server = mockito::Server::new_async().await;
    let m = test_path(&mut server, "POST")
        .match_body(Matcher::Exact(String::new()))
        .with_status(200)
        .with_body(TEST_RESPONSE_BODY)
        .create_async()
        .await;

    let url = Url::parse(&test_url(&server)).unwrap();
    let response: ResponseEntity<()> = client()
        .do_request_uri(url, HttpMethod::Post, None, None)
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.body().is_none());
    m.assert_async().await;
}

#[tokio::test]
async fn test_non_null_request_body() {
    let request_body = r#"{ "id": 1, "name": "some-test-object" }"#;
    let mut server = mockito::Server::new_async().await;
    let m = test_path(&mut server, "POST")
        .match_header("content-type", "text/plain")
        .match_body(request_body)
        .with_status(200)
        .with_body(TEST_RESPONSE_BODY)
        .create_async()
        .await;

    let headers: HeaderMultiMap = [("Content-Type", "text/plain")].into_iter().collect();
    let response: ResponseEntity<()> = client()
        .do_request(&test_url(&server), HttpMethod::Post, Some(headers), Some(request_body.into()))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    m.assert_async().await;
}

#[tokio::test]
async fn test_url_with_params() {
    let mut server = mockito::Server::new_async().await;
    let m = test_path(&mut server, "POST")
        .with_status(200)
        .create_async()
        .await;

    let response: ResponseEntity<()> = client()
        .do_request(&test_url(&server), HttpMethod::Post, None, None)
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    m.assert_async().await;
}

#[tokio::test]
async fn test_uri_template() {
    let mut server = mockito::Server::new_async().await;
    let m = test_path(&mut server, "POST")
        .with_status(200)
        .create_async()
        .await;

    let mut params = UriParams::new();
    params.insert("param1".to_string(), "val1".to_string());
    let template = format!("{}/test-path?param1={{param1}}", server.url());

    let response: ResponseEntity<()> = client()
        .do_request_template(&template, params, HttpMethod::Post, None, None)
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    m.assert_async().await;
}

#[tokio::test]
async fn test_request_headers() {
    let mut server = mockito::Server::new_async().await;
    let first = test_path(&mut server, "POST")
        .match_header(TEST_HEADER_NAME, Matcher::Missing)
        .match_header(ANOTHER_TEST_HEADER_NAME, Matcher::Missing)
        .match_header("content-type", "application/json")
        .with_status(200)
        .create_async()
        .await;

    let client = client();
    let response: ResponseEntity<()> = client
        .do_request(&test_url(&server), HttpMethod::Post, None, None)
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    first.assert_async().await;
    first.remove_async().await;

    let second = test_path(&mut server, "POST")
        .match_header(TEST_HEADER_NAME, Matcher::Missing)
        .match_header(ANOTHER_TEST_HEADER_NAME, "Another-Header-Value")
        .with_status(200)
        .create_async()
        .await;

    let headers: HeaderMultiMap = [(ANOTHER_TEST_HEADER_NAME, "Another-Header-Value")]
        .into_iter()
        .collect();
    let response: ResponseEntity<()> = client
        .do_request(&test_url(&server), HttpMethod::Post, Some(headers), None)
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    second.assert_async().await;
}

#[tokio::test]
async fn test_response_headers() {
    let mut server = mockito::Server::new_async().await;
    let m = test_path(&mut server, "POST")
        .match_header(TEST_HEADER_NAME, "Test-Header-Value")
        .with_status(200)
        .with_header(TEST_HEADER_NAME, "Test-Header-Response-Value")
        .with_header(ANOTHER_TEST_HEADER_NAME, "Another-Test-Header-Response-Value")
        .with_body(TEST_RESPONSE_BODY)
        .create_async()
        .await;

    let headers: HeaderMultiMap = [(TEST_HEADER_NAME, "Test-Header-Value")].into_iter().collect();
    let response: ResponseEntity<String> = client()
        .do_request(&test_url(&server), HttpMethod::Post, Some(headers), None)
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().first(TEST_HEADER_NAME),
        Some("Test-Header-Response-Value")
    );
    assert_eq!(
        response.headers().first(&ANOTHER_TEST_HEADER_NAME.to_lowercase()),
        Some("Another-Test-Header-Response-Value")
    );
}

#[tokio::test]
async fn test_response_body_mapping() {
    let single = TestEntity::create();
    let collection = vec![TestEntity::create(), TestEntity::create(), TestEntity::create()];
    let single_json = serde_json::to_string(&single).unwrap();

    let mut server = mockito::Server::new_async().await;
    let _single = server
        .mock("POST", "/single")
        .with_status(200)
        .with_header("Content-Type", "application/json")
        .with_body(&single_json)
        .create_async()
        .await;
    let _collection = server
        .mock("POST", "/collection")
        .with_status(200)
        .with_header("Content-Type", "application/json")
        .with_body(serde_json::to_string(&collection).unwrap())
        .create_async()
        .await;

    let client = client();
    let response: ResponseEntity<String> = client
        .do_request(&format!("{}/single", server.url()), HttpMethod::Post, None, None)
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), Some(&single_json));

    let response: ResponseEntity<Json<Vec<TestEntity>>> = client
        .do_request(&format!("{}/collection", server.url()), HttpMethod::Post, None, None)
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.into_body().map(Json::into_inner), Some(collection));
}

#[tokio::test]
async fn test_response_error() {
    let error_body = "Test internal server error";
    let mut server = mockito::Server::new_async().await;
    let m = test_path(&mut server, "POST")
        .with_status(500)
        .with_header("test-err-header", "test-err-header-value")
        .with_header("another-test-err-header", "another-test-err-header-value")
        .with_header("Content-Type", "text/plain")
        .with_body(error_body)
        .create_async()
        .await;

    let err = client()
        .do_request::<()>(&test_url(&server), HttpMethod::Post, None, None)
        .await
        .unwrap_err();
    m.assert_async().await;

    let RestClientError::Response(err) = err else {
        panic!("expected a response error");
    };
    assert_eq!(err.status(), 500);
    assert_eq!(err.body_as_string(), error_body);
    assert_eq!(err.headers().first("test-err-header"), Some("test-err-header-value"));
    assert_eq!(
        err.headers().first("another-test-err-header"),
        Some("another-test-err-header-value")
    );
    assert!(err.remote_cause().is_none());
    assert!(err
        .transport_cause()
        .unwrap()
        .message()
        .starts_with("500 Internal Server Error from POST"));
}

#[tokio::test]
async fn test_response_error_unknown_status_code() {
    let mut server = mockito::Server::new_async().await;
    let _m = test_path(&mut server, "POST")
        .with_status(999)
        .with_header("test-err-header", "test-err-header-value")
        .with_body("Test internal server error")
        .create_async()
        .await;

    let err = client()
        .do_request::<String>(&test_url(&server), HttpMethod::Post, None, None)
        .await
        .unwrap_err();

    let err = err.as_response().unwrap();
    assert_eq!(err.status(), 999);
    assert_eq!(err.headers().first("test-err-header"), Some("test-err-header-value"));
}

#[tokio::test]
async fn test_tmf_error_response() {
    let envelope = TmfErrorResponse {
        id: Some(uuid::Uuid::new_v4().to_string()),
        code: Some("TEST".to_string()),
        reason: Some("test reason".to_string()),
        detail: Some("test detail".to_string()),
        status: Some("500".to_string()),
        r#type: Some(TYPE_V1_0.to_string()),
    };
    let mut server = mockito::Server::new_async().await;
    let _m = test_path(&mut server, "GET")
        .with_status(500)
        .with_header("Content-Type", "application/json")
        .with_body(serde_json::to_vec(&envelope).unwrap())
        .create_async()
        .await;

    let err = client()
        .do_request::<()>(&test_url(&server), HttpMethod::Get, None, None)
        .await
        .unwrap_err();

    let err = err.as_response().unwrap();
    assert_eq!(err.status(), 500);
    assert_eq!(err.message(), "test detail");

    let remote = err.remote_cause().unwrap();
    assert_eq!(remote.error_code().code, "TEST");
    assert_eq!(remote.error_code().title, "test reason");
    assert_eq!(remote.status(), Some(500));
    assert_eq!(remote.id(), envelope.id.as_deref());
}

#[tokio::test]
async fn test_connection_failure() {
    let err = client()
        .do_request::<()>("http://127.0.0.1:9/test-path", HttpMethod::Get, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RestClientError::Client(_)));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_redirect_not_followed_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/moved")
        .with_status(302)
        .with_header("Location", "/elsewhere")
        .create_async()
        .await;

    let transport = ReqwestTransport::with_config(ClientConfig {
        follow_redirects: false,
        ..Default::default()
    })
    .unwrap();
    let err = RestClient::with_transport(transport)
        .do_request::<()>(&format!("{}/moved", server.url()), HttpMethod::Get, None, None)
        .await
        .unwrap_err();

    let err = err.as_response().unwrap();
    assert_eq!(err.status(), 302);
    assert_eq!(err.headers().first("location"), Some("/elsewhere"));
}

#[tokio::test]
async fn test_overloads() {
    let request_body = serde_json::to_string(&TestEntity::create()).unwrap();
    let mut server = mockito::Server::new_async().await;
    let m = test_path(&mut server, "POST")
        .match_header("test-header", "test-req-header-value")
        .match_header("another-test-header", "another-test-req-header-value")
        .match_header("content-type", "application/json")
        .match_body(request_body.as_str())
        .with_status(200)
        .with_header("test-header", "test-header-value")
        .with_header("another-test-header", "another-test-header-value")
        .with_header("Content-Type", "application/json")
        .with_body(TEST_RESPONSE_BODY)
        .expect(3)
        .create_async()
        .await;

    let headers: HeaderMultiMap = [
        ("test-header", "test-req-header-value"),
        ("another-test-header", "another-test-req-header-value"),
        ("Content-Type", "application/json"),
    ]
    .into_iter()
    .collect();
    let body = RequestBody::from(request_body.clone());
    let client = client();

    let first: ResponseEntity<String> = client
        .do_request_uri(
            Url::parse(&test_url(&server)).unwrap(),
            HttpMethod::Post,
            Some(headers.clone()),
            Some(body.clone()),
        )
        .await
        .unwrap();

    let mut params = UriParams::new();
    params.insert("param1".to_string(), "val1".to_string());
    let second: ResponseEntity<String> = client
        .do_request_template(
            &format!("{}/test-path?param1={{param1}}", server.url()),
            params,
            HttpMethod::Post,
            Some(headers.clone()),
            Some(body.clone()),
        )
        .await
        .unwrap();

    let third: ResponseEntity<String> = client
        .do_request(&test_url(&server), HttpMethod::Post, Some(headers), Some(body))
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(first.status(), 200);
    assert_eq!(first.headers().first("test-header"), Some("test-header-value"));
    assert_eq!(first.body().map(String::as_str), Some(TEST_RESPONSE_BODY));

    let first = without_generated(first);
    assert_eq!(first, without_generated(second));
    assert_eq!(first, without_generated(third));
}

#[test]
fn test_blocking_client() {
    init_tracing();
    let mut server = mockito::Server::new();
    let _ok = server
        .mock("GET", "/ok")
        .with_status(200)
        .with_header("Content-Type", "text/plain; charset=utf-8")
        .with_body("héllo")
        .create();
    let _err = server
        .mock("GET", "/err")
        .with_status(404)
        .with_body("missing")
        .create();

    let client = BlockingRestClient::new(RestClient::with_transport(ReqwestTransport::new())).unwrap();

    let response: ResponseEntity<String> = client
        .do_request(&format!("{}/ok", server.url()), HttpMethod::Get, None, None)
        .unwrap();
    assert_eq!(response.body().map(String::as_str), Some("héllo"));

    let err = client
        .do_request::<String>(&format!("{}/err", server.url()), HttpMethod::Get, None, None)
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.as_response().unwrap().body_as_string(), "missing");
}
