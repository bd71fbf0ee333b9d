#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use gymdesk::auth::{AuthContext, MemorySessionStorage};
use gymdesk::error::RequestError;
use gymdesk::request::{ApiClient, HttpRequest, HttpResponse, Method, Transport};

pub const BASE_URL: &str = "http://gym.test/api/v1";
pub const TOKEN: &str = "test-token";

/// In-process stand-in for the REST API: replays canned responses keyed by
/// method and URL and records every request it sees
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<(Method, String), HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every response back, so concurrent callers overlap
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, url(path)), HttpResponse { status, body });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        let target = url(path);
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.url == target)
            .count()
    }

    pub fn last(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let route = self
            .routes
            .lock()
            .unwrap()
            .get(&(request.method, request.url.clone()))
            .cloned();
        route.ok_or_else(|| RequestError::Network(format!("no route for {} {}", request.method.as_str(), request.url)))
    }
}

pub fn url(path: &str) -> String {
    format!("{}/{}", BASE_URL, path)
}

/// Client with a resolved session; `token: None` resolves to anonymous
pub fn client(transport: Arc<FakeTransport>, token: Option<&str>) -> ApiClient {
    let storage = match token {
        Some(t) => MemorySessionStorage::with_entry("token", t),
        None => MemorySessionStorage::new(),
    };
    let auth = AuthContext::new(storage);
    auth.load();
    ApiClient::new(BASE_URL, transport, Arc::new(auth), Duration::from_secs(300))
}

pub fn signed_in(transport: Arc<FakeTransport>) -> ApiClient {
    client(transport, Some(TOKEN))
}
