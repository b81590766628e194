//! End-to-end: axum server on a real socket, reqwest-backed client.

use std::time::Duration;

use serde_json::json;

use hanbok_routes::app::route_defs;
use hanbok_routes::client::{CallRequest, RoutesClient};
use hanbok_routes::config::ServerConfig;

mod common;

#[tokio::test]
async fn test_client_against_running_server() {
    let (addr, shutdown) = common::start_server(ServerConfig::default()).await;
    let client = RoutesClient::new(&route_defs().unwrap(), common::transport(addr));

    let listed = client
        .resolve("api.sampleResource.list")
        .unwrap()
        .call(CallRequest::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(listed.status, 200);
    let names: Vec<_> = listed.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Jean".to_string()));

    let created = client
        .resolve("api.sampleResource.create")
        .unwrap()
        .call(CallRequest::new().body(json!({"item": {"name": "Zoë", "age": 7}})))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.status, 200);
    let public_id = created.body["item"]["publicId"].as_str().unwrap().to_string();

    let fetched = client
        .resolve("api.sampleResource.get")
        .unwrap()
        .call(CallRequest::new().param("publicId", public_id.as_str()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.body["item"]["name"], "Zoë");
    assert_eq!(fetched.body["item"]["age"], 7);

    let invalid = client
        .resolve("api.sampleResource.create")
        .unwrap()
        .call(CallRequest::new().body(json!({"item": {"age": "seven"}})))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invalid.status, 400);
    assert_eq!(invalid.body["error"], "InvalidDataError");
    assert!(invalid.body["details"]["$.body.item.name"].is_array());

    let missing = client
        .resolve("api.sampleResource.get")
        .unwrap()
        .call(CallRequest::new().param("publicId", "no such id"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(missing.status, 404);
    assert_eq!(missing.body["details"], "SampleResource \"no such id\" not found");

    shutdown.trigger();
}

#[tokio::test]
async fn test_pages_and_request_ids() {
    let (addr, shutdown) = common::start_server(ServerConfig::default()).await;
    let http = reqwest::Client::builder().no_proxy().build().unwrap();

    let root = http.get(format!("http://{}/", addr)).send().await.unwrap();
    assert_eq!(root.status(), 200);
    assert!(root.headers().contains_key("x-request-id"));
    assert!(root.text().await.unwrap().contains("<!DOCTYPE html>"));

    let deep = http
        .get(format!("http://{}/some/client/route", addr))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(deep.status(), 200);
    assert_eq!(deep.headers()["x-request-id"], "trace-me");

    shutdown.trigger();
}

#[tokio::test]
async fn test_prefix_and_api_key_from_config() {
    let mut config = ServerConfig::default();
    config.routes.prefix = "/v1".to_string();
    config.security.api_key = Some("k3y".to_string());
    let (addr, shutdown) = common::start_server(config).await;

    let defs = route_defs().unwrap();
    let anonymous = RoutesClient::with_prefix(&defs, "/v1", common::transport(addr));
    let denied = anonymous
        .resolve("api.sampleResource.list")
        .unwrap()
        .call(CallRequest::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(denied.status, 400);

    let keyed = RoutesClient::with_prefix(
        &defs,
        "/v1",
        common::transport(addr).with_header("authorization", "Bearer k3y"),
    );
    let allowed = keyed
        .resolve("api.sampleResource.list")
        .unwrap()
        .call(CallRequest::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(allowed.status, 200);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(20)).await;
}
