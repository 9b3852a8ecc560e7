//! Shared fixtures for integration tests

#![allow(dead_code)]

use gigdesk_http::navigation::{Navigator, Route};
use gigdesk_http::session::{MemoryStorage, SessionStorage};
use gigdesk_http::ApiClient;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

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

pub struct Harness {
    pub server: MockServer,
    pub client: ApiClient,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub async fn start() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new())).await
    }

    pub async fn with_storage(storage: Arc<dyn SessionStorage>) -> Self {
        let server = MockServer::start().await;
        let navigator = Arc::new(RecordingNavigator::default());
        let client = ApiClient::builder()
            .base_url(server.uri())
            .storage(storage)
            .navigator(navigator.clone())
            .build()
            .unwrap();
        Self {
            server,
            client,
            navigator,
        }
    }

    /// Sign in with an access token the server will treat as `access`
    pub async fn login_as(&self, access: &str, refresh: &str) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_body(access, refresh)))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;

        self.client
            .session()
            .login("ada@example.com", "correct horse")
            .await
            .unwrap();
    }

    pub async fn mount_refresh(&self, refresh: &str, status: u16, body: Value, times: u64) {
        Mock::given(method("POST"))
            .and(path("/api/auth/token/refresh/"))
            .and(body_json(json!({"refresh": refresh})))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }
}

pub fn user_json() -> Value {
    json!({
        "id": 7,
        "email": "ada@example.com",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "user_type": "client",
        "is_email_verified": true
    })
}

pub fn login_body(access: &str, refresh: &str) -> Value {
    json!({"access": access, "refresh": refresh, "user": user_json()})
}

pub fn job_json(id: i64) -> Value {
    json!({
        "id": id,
        "title": "Logo for a bakery",
        "description": "Need a friendly wordmark and icon for our shop front.",
        "client": user_json(),
        "category": 3,
        "category_name": "Design",
        "skills_required": ["illustrator", "branding"],
        "budget": "250.00",
        "job_type": "fixed",
        "status": "open",
        "created_at": "2024-05-01T09:30:00Z",
        "updated_at": "2024-05-02T11:00:00Z",
        "total_proposals": 4
    })
}
