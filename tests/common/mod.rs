//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use bugzilla_cache::{BugzillaError, ClientConfig, FetchedResponse, Result, Transport};
use serde_json::Value;
use tempfile::TempDir;
use url::Url;

pub const HOST: &str = "https://example.test";

/// Transport that serves canned JSON by URL and records every request.
#[derive(Default)]
pub struct RecordingTransport {
    routes: HashMap<String, Value>,
    requests: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for the exact URL `url`.
    pub fn route(mut self, url: &str, body: Value) -> Self {
        self.routes.insert(url.to_string(), body);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for RecordingTransport {
    async fn get(&self, url: &Url) -> Result<FetchedResponse> {
        self.requests.lock().unwrap().push(url.to_string());
        // Let other tasks run, as a real network call would.
        tokio::task::yield_now().await;
        match self.routes.get(url.as_str()) {
            Some(body) => Ok(FetchedResponse {
                resolved_url: url.to_string(),
                data: body.clone(),
            }),
            None => Err(BugzillaError::Status {
                status: reqwest::StatusCode::NOT_FOUND,
                url: url.to_string(),
            }),
        }
    }
}

/// Config pointing at a cache file inside `dir`.
pub fn config(dir: &TempDir) -> ClientConfig {
    ClientConfig::default()
        .with_host(HOST)
        .with_cache_file(dir.path().join(".lru-cache.json"))
}
