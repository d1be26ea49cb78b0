//! `GET /active-database`, `GET /active-repository` and routing basics.

mod common;

use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{get, namespace_listing, send, test_app, test_app_with};

async fn blazegraph_listing(names: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blazegraph/namespace"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(namespace_listing(names), "application/rdf+xml"),
        )
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn active_database_is_first_namespace() {
    let blazegraph = blazegraph_listing(&["kb1", "kb2"]).await;
    let app = test_app(&blazegraph.uri(), "http://127.0.0.1:1/api/");

    let (status, body) = send(&app.router, get("/active-database")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"active_database": "kb1"}));
}

#[tokio::test]
async fn active_repository_lists_every_namespace() {
    let blazegraph = blazegraph_listing(&["kb1", "kb2"]).await;
    let app = test_app(&blazegraph.uri(), "http://127.0.0.1:1/api/");

    let (status, body) = send(&app.router, get("/active-repository")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"active_repositories": ["kb1", "kb2"]}));
}

#[tokio::test]
async fn empty_listing_is_404() {
    let blazegraph = blazegraph_listing(&[]).await;
    let app = test_app(&blazegraph.uri(), "http://127.0.0.1:1/api/");

    let (status, body) = send(&app.router, get("/active-database")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "No namespaces found"}));

    let (status, body) = send(&app.router, get("/active-repository")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "No active repositories found"}));
}

#[tokio::test]
async fn unexpected_content_type_is_not_parsed() {
    let blazegraph = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blazegraph/namespace"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>hello</html>", "text/html"),
        )
        .mount(&blazegraph)
        .await;
    let app = test_app(&blazegraph.uri(), "http://127.0.0.1:1/api/");

    for uri in ["/active-database", "/active-repository"] {
        let (status, body) = send(&app.router, get(uri)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"message": "Blazegraph returned an unexpected response format"})
        );
    }
}

#[tokio::test]
async fn malformed_listing_is_a_parse_failure() {
    let blazegraph = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blazegraph/namespace"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<rdf:RDF><unclosed>", "application/rdf+xml"),
        )
        .mount(&blazegraph)
        .await;
    let app = test_app(&blazegraph.uri(), "http://127.0.0.1:1/api/");

    for uri in ["/active-database", "/active-repository"] {
        let (status, body) = send(&app.router, get(uri)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"message": "Failed to parse Blazegraph response"}));
    }
}

#[tokio::test]
async fn upstream_failure_is_500() {
    let blazegraph = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blazegraph/namespace"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&blazegraph)
        .await;
    let app = test_app(&blazegraph.uri(), "http://127.0.0.1:1/api/");

    let (status, body) = send(&app.router, get("/active-database")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to connect to Blazegraph: "));

    let (status, body) = send(&app.router, get("/active-repository")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to fetch active repositories: "));
}

#[tokio::test]
async fn homepage_is_plain_text() {
    let app = test_app("http://127.0.0.1:1", "http://127.0.0.1:1/api/");
    let resp = app.router.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let content_type = resp.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"), "{content_type}");
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Welcome to the homepage!");
}

#[tokio::test]
async fn oversized_body_is_json_413() {
    let app = test_app_with("http://127.0.0.1:1", "http://127.0.0.1:1/api/", |config| {
        config.server.max_upload_bytes = 16;
    });
    let body = r#"{"namespace":"much-longer-than-sixteen-bytes"}"#;
    let request = Request::builder()
        .method("POST")
        .uri("/namespace")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();

    let (status, json_body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body, json!({"error": "Request body too large."}));
}

#[tokio::test]
async fn slow_request_is_json_408() {
    let blazegraph = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blazegraph/namespace"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(namespace_listing(&["kb"]), "application/rdf+xml")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&blazegraph)
        .await;

    let app = test_app_with(&blazegraph.uri(), "http://127.0.0.1:1/api/", |config| {
        config.server.request_timeout_secs = 1;
    });
    let (status, body) = send(&app.router, get("/active-repository")).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert_eq!(body, json!({"error": "Request timed out."}));
}

#[tokio::test]
async fn unsupported_methods_are_405() {
    let app = test_app("http://127.0.0.1:1", "http://127.0.0.1:1/api/");
    let cases = [
        ("POST", "/"),
        ("DELETE", "/files"),
        ("GET", "/database"),
        ("GET", "/namespace"),
        ("PUT", "/upload"),
        ("GET", "/connect"),
        ("POST", "/active-database"),
        ("PATCH", "/active-repository"),
    ];
    for (verb, uri) in cases {
        let request = Request::builder()
            .method(verb)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{verb} {uri}");
        assert_eq!(body, json!({"error": "Invalid request method."}));
    }
}

#[tokio::test]
async fn unknown_path_is_404() {
    let app = test_app("http://127.0.0.1:1", "http://127.0.0.1:1/api/");
    let (status, body) = send(&app.router, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Not found."}));
}
