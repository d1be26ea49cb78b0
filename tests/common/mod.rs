#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

use blazegate::blazegraph::{http_client, BlazegraphClient};
use blazegate::ingest::TurtleIngestor;
use blazegate::uploads::SqliteFileStore;
use blazegate::{build_router, AppState, Config};

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const KB_NS: &str = "http://www.bigdata.com/rdf#/features/KB/";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<SqliteFileStore>,
}

/// Router wired to the given upstream URLs and an in-memory record store.
pub fn test_app(blazegraph_url: &str, ingest_url: &str) -> TestApp {
    test_app_with(blazegraph_url, ingest_url, |_| {})
}

/// Like [`test_app`], with a chance to adjust the configuration first.
pub fn test_app_with(
    blazegraph_url: &str,
    ingest_url: &str,
    configure: impl FnOnce(&mut Config),
) -> TestApp {
    let mut config = Config::default();
    config.blazegraph.url = blazegraph_url.to_string();
    config.ingest.url = ingest_url.to_string();
    configure(&mut config);

    let http = http_client(&config.blazegraph).expect("http client");
    let store = Arc::new(SqliteFileStore::open_in_memory().expect("in-memory store"));
    let state = AppState::new(
        BlazegraphClient::new(http.clone(), &config.blazegraph),
        TurtleIngestor::new(http, &config.ingest),
        store.clone(),
    );

    TestApp {
        router: build_router(state, &config.server),
        store,
    }
}

/// Send a request and return status plus JSON body (`Null` if not JSON).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, JsonValue) {
    let resp = router.clone().oneshot(request).await.expect("router call");
    let status = resp.status();
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// POST with an arbitrary (or no) `Content-Type`.
pub fn post_raw(uri: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub const BOUNDARY: &str = "blazegate-test-boundary";

/// One multipart part: field name, optional file name, content.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub data: &'a [u8],
}

pub fn post_multipart(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: text/turtle\r\n\r\n",
                    part.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Namespace listing as Blazegraph serves it.
pub fn namespace_listing(names: &[&str]) -> String {
    let descriptions: String = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            format!(
                r#"<rdf:Description rdf:nodeID="n{i}">
    <rdf:type rdf:resource="http://www.w3.org/ns/sparql-service-description#Dataset"/>
    <kb:Namespace>{name}</kb:Namespace>
  </rdf:Description>
"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns:rdf="{RDF_NS}" xmlns:kb="{KB_NS}">
  {descriptions}</rdf:RDF>"#
    )
}
