//! Test doubles shared by unit tests

use crate::client::ClientError;
use crate::client::transport::{ApiRequest, ApiResponse, Transport};
use crate::navigation::{Navigator, Route};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde_json::{Value as JsonValue, json};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned responses in order and records every request
pub struct StubTransport {
    responses: Mutex<VecDeque<(StatusCode, JsonValue)>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub fn new(responses: Vec<(StatusCode, JsonValue)>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        let (status, body) = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request to {}", request.path));
        Ok(ApiResponse {
            status,
            headers: HeaderMap::new(),
            body: body.to_string(),
        })
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

pub fn user_json() -> JsonValue {
    json!({
        "id": 7,
        "email": "ada@example.com",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "user_type": "client",
        "is_email_verified": true
    })
}

pub fn login_body(access: &str, refresh: &str) -> JsonValue {
    json!({"access": access, "refresh": refresh, "user": user_json()})
}
