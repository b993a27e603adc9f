#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use promptdesk::config::ServerConfig;
use promptdesk::server::{AppState, create_router};
use promptdesk::store::{SqliteStore, Store};

/// An in-process server over a fresh database in a temp directory.
pub struct TestApp {
    _temp_dir: TempDir,
    pub store: Arc<SqliteStore>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_completion_type_link(None)
    }

    /// Forces `completion_types.template_id` on or off instead of detecting it.
    pub fn with_completion_type_link(enabled: Option<bool>) -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::new(temp_dir.path().join("promptdesk.db"))
            .expect("open store")
            .with_completion_type_link(enabled);
        store.initialize().expect("initialize schema");
        let store = Arc::new(store);

        let state = Arc::new(AppState::new(
            Arc::clone(&store) as Arc<dyn Store>,
            ServerConfig::default(),
        ));

        Self {
            _temp_dir: temp_dir,
            store,
            router: create_router(state),
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Creates an entity and returns its id.
    pub async fn create(&self, uri: &str, body: Value) -> Value {
        let (status, created) = self.post(uri, body).await;
        assert_eq!(status, StatusCode::CREATED, "create {uri}: {created}");
        created["id"].clone()
    }
}
