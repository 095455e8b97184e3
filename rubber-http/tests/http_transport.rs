//! Integration tests for the reqwest transport against a local mock server.

use rubber_http::*;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_with_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tests/article/_search"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"query": {"match_all": {}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 1,
            "hits": {"total": 0, "hits": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::with_defaults().unwrap();
    let request = TransportRequest::new(
        Method::GET,
        format!("{}/tests/article/_search", server.uri()),
    )
    .with_body(r#"{"query":{"match_all":{}}}"#);

    let response = transport.send(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json().unwrap()["took"], 1);
    assert!(response.url().is_some());
}

#[tokio::test]
async fn test_options_are_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/tests/article/1"))
        .and(query_param("refresh", "true"))
        .and(header("x-opaque-id", "indexer-7"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"result": "created"})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::with_defaults().unwrap();
    let options = RequestOptions::new()
        .query("refresh", "true")
        .header("X-Opaque-Id", "indexer-7");

    let response = transport
        .send(
            TransportRequest::new(Method::PUT, format!("{}/tests/article/1", server.uri()))
                .with_body(r#"{"title":"hello"}"#)
                .with_options(options),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_default_headers_are_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("x-client", "rubber-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(
        TransportConfig::builder()
            .default_header("X-Client", "rubber-tests")
            .build(),
    )
    .unwrap();

    let response = transport
        .send(TransportRequest::new(Method::GET, format!("{}/_count", server.uri())))
        .await
        .unwrap();

    assert!(response.is_success());
}

#[tokio::test]
async fn test_error_status_is_a_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"found": false})))
        .mount(&server)
        .await;

    let transport = HttpTransport::with_defaults().unwrap();
    let response = transport
        .send(TransportRequest::new(Method::GET, format!("{}/a/b/missing", server.uri())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.json().unwrap()["found"], false);
}

#[tokio::test]
async fn test_malformed_body_is_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(";;;"))
        .mount(&server)
        .await;

    let transport = HttpTransport::with_defaults().unwrap();
    let response = transport
        .send(TransportRequest::new(Method::GET, format!("{}/_search", server.uri())))
        .await
        .unwrap();

    assert!(response.json().is_none());
    assert_eq!(response.text(), ";;;");
}

#[tokio::test]
async fn test_per_request_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let transport = HttpTransport::with_defaults().unwrap();
    let err = transport
        .send(
            TransportRequest::new(Method::GET, format!("{}/slow", server.uri()))
                .with_options(RequestOptions::new().timeout(Duration::from_millis(50))),
        )
        .await
        .unwrap_err();

    assert!(err.is_timeout());
}

#[tokio::test]
async fn test_connection_refused() {
    let transport = HttpTransport::new(
        TransportConfig::builder()
            .connect_timeout(Duration::from_secs(2))
            .build(),
    )
    .unwrap();

    let err = transport
        .send(TransportRequest::new(Method::GET, "http://127.0.0.1:1/_search"))
        .await
        .unwrap_err();

    assert!(err.is_connection() || err.is_timeout());
}
