//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::net::TcpListener;

use hanbok_routes::app::{route_defs, AppServer, AppSettings, MockBackend};
use hanbok_routes::client::HttpTransport;
use hanbok_routes::config::ServerConfig;
use hanbok_routes::http::HttpServer;
use hanbok_routes::lifecycle::{startup, Shutdown};
use hanbok_routes::router::{RouteHandlerFn, Router, RouterError, RouteTable, RouterEvent, SentResponse};
use hanbok_routes::routes::RouteMethod;

/// Router that only records what was registered.
#[derive(Default)]
pub struct RecordingRouter {
    pub registered: Vec<(RouteMethod, String)>,
}

impl Router for RecordingRouter {
    fn register(&mut self, method: RouteMethod, path: &str, _handler: RouteHandlerFn) -> Result<(), RouterError> {
        self.registered.push((method, path.to_string()));
        Ok(())
    }
}

/// The sample app bound into an in-memory route table.
pub fn sample_table(api_key: Option<&str>) -> (RouteTable, Arc<MockBackend>) {
    let backend = Arc::new(MockBackend::seeded());
    let settings = AppSettings {
        api_key: api_key.map(str::to_string),
        ..AppSettings::default()
    };
    let app = AppServer::new(route_defs().unwrap(), backend.clone(), settings);
    let mut table = RouteTable::new();
    app.add_routes(&mut table, "/").unwrap();
    (table, backend)
}

pub fn event(method: &str, path: &str, body: Option<Value>) -> RouterEvent {
    let mut headers = BTreeMap::new();
    if body.is_some() {
        headers.insert("content-type".to_string(), "application/json".to_string());
    }
    RouterEvent {
        method: method.to_string(),
        path: path.to_string(),
        headers,
        body: body.map(|b| b.to_string()),
        ..RouterEvent::default()
    }
}

/// Dispatch an event that is expected to match a route.
pub async fn dispatch(table: &RouteTable, event: RouterEvent) -> SentResponse {
    table
        .handle_event(event)
        .await
        .expect("event should be dispatchable")
        .expect("a route should match")
}

/// Start the sample app on an ephemeral port. Trigger the returned
/// `Shutdown` to stop it.
pub async fn start_server(mut config: ServerConfig) -> (SocketAddr, Shutdown) {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    let routes = startup::build_routes(&config, Arc::new(MockBackend::seeded())).unwrap();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let stop = shutdown.wait();
    tokio::spawn(async move {
        let _ = HttpServer::new(config, routes).run_until(listener, stop).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// HTTP transport to a local test server, bypassing any system proxy.
pub fn transport(addr: SocketAddr) -> HttpTransport {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let endpoint = url::Url::parse(&format!("http://{}", addr)).unwrap();
    HttpTransport::with_client(client, endpoint)
}
