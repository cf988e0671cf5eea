// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use futures::future::BoxFuture;
use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

type Key = (String, String);

/// A request received by the mock, with its JSON body decoded
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: Value,
}

/// A mock HTTP service replaying scripted responses per method and path.
///
/// Each route holds a queue of responses; the last one is repeated once the
/// others are used up. Unscripted routes answer 404.
#[derive(Clone, Default)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<Key, VecDeque<(u16, String)>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    fn on(self, method: &str, path: &str, responses: Vec<(u16, String)>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), responses.into());
        self
    }

    /// Answer every GET of `path` with the same response
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, vec![(status, body.to_string())])
    }

    /// Answer successive GETs of `path` with successive responses
    pub fn on_get_sequence(self, path: &str, responses: Vec<(u16, String)>) -> Self {
        self.on("GET", path, responses)
    }

    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, vec![(status, body.to_string())])
    }

    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, vec![(status, body.to_string())])
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// Requests received so far with the given method
    pub fn requests(&self, method: &str) -> Vec<RecordedRequest> {
        self.all_requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    pub fn all_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&(method.to_string(), path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mock = self.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let method = parts.method.to_string();
            let path = parts.uri.path().to_string();
            let bytes = body.collect().await?.to_bytes();

            mock.requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path: path.clone(),
                query: parts.uri.query().map(str::to_string),
                body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
            });

            let (status, body) = mock
                .next_response(&method, &path)
                .unwrap_or_else(|| (404, not_found_json("resource", &path)));

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))?)
        })
    }
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": format!("{} \"{}\" not found", resource, name),
        "reason": "NotFound",
        "code": 404
    })
    .to_string()
}
