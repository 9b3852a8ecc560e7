//! Gigdesk API client
//!
//! [`ApiClient`] is the single choke point for API calls. It pairs a
//! [`Transport`] with the shared [`SessionStore`] and routes every request
//! through [`middleware::send_authorized`].

pub mod error;
pub mod jobs;
pub mod messages;
pub mod middleware;
pub mod notifications;
pub mod payments;
pub mod profiles;
pub mod proposals;
pub mod transport;

pub use error::ClientError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

use crate::config::ClientConfig;
use crate::navigation::{LogNavigator, Navigator};
use crate::session::{MemoryStorage, SessionStorage, SessionStore};
use crate::types::Page;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Gigdesk API client
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a new client with in-memory session storage
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Assemble a client from an existing transport and session
    pub fn from_parts(transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Issue an authenticated request. Non-2xx statuses become errors after
    /// the refresh-on-401 handling has run.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<JsonValue>,
        headers: Option<HeaderMap>,
    ) -> Result<ApiResponse, ClientError> {
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        if let Some(headers) = headers {
            request = request.headers(headers);
        }
        self.send(request).await
    }

    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        middleware::send_authorized(self.transport.as_ref(), &self.session, request)
            .await?
            .error_for_status()
    }

    /// Send and decode the JSON response
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        self.send(request).await?.json()
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(ApiRequest::put(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }

    /// Fetch the page after `page`, if any. `next` links are absolute URLs
    /// on the API host; only their path and query are used.
    pub async fn next_page<T: DeserializeOwned>(
        &self,
        page: &Page<T>,
    ) -> Result<Option<Page<T>>, ClientError> {
        let Some(next) = page.next.as_deref() else {
            return Ok(None);
        };
        let path = relative_path(next)?;
        self.get(&path).await.map(Some)
    }
}

fn relative_path(link: &str) -> Result<String, ClientError> {
    if link.starts_with('/') {
        return Ok(link.to_string());
    }
    let url = url::Url::parse(link)
        .map_err(|e| ClientError::Configuration(format!("invalid page link {link}: {e}")))?;
    Ok(match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    })
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    storage: Option<Arc<dyn SessionStorage>>,
    navigator: Option<Arc<dyn Navigator>>,
    transport: Option<Arc<dyn Transport>>,
}

impl ApiClientBuilder {
    /// Builder pre-filled from loaded configuration
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::default()
            .base_url(config.base_url.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Where the session is persisted (default: memory only)
    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Receiver for login/dashboard redirects (default: log only)
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Replace the HTTP transport; `base_url`, `timeout` and `user_agent`
    /// are then ignored
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let base_url = self
                    .base_url
                    .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
                Arc::new(HttpTransport::new(base_url, self.timeout, self.user_agent)?)
            }
        };
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(LogNavigator));

        let session = Arc::new(SessionStore::new(transport.clone(), storage, navigator));
        Ok(ApiClient::from_parts(transport, session))
    }
}
