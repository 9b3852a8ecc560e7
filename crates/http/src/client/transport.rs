//! Base request function the authenticated client is composed around

use super::error::ClientError;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap};
use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Outgoing API request, independent of the underlying HTTP stack
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API root, e.g. `/api/jobs/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<JsonValue>,
    pub headers: HeaderMap,
    /// Bearer credential, filled in by the authenticating middleware
    pub bearer: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Append query parameters from a serializable filter struct.
    ///
    /// Null fields are skipped; non-string scalars use their JSON rendering.
    pub fn query_params<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self, ClientError> {
        if let JsonValue::Object(map) = serde_json::to_value(params)? {
            for (key, value) in map {
                match value {
                    JsonValue::Null => {}
                    JsonValue::String(s) => self.query.push((key, s)),
                    other => self.query.push((key, other.to_string())),
                }
            }
        }
        Ok(self)
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Copy of this request carrying the given bearer credential
    pub fn with_bearer(&self, token: Option<&str>) -> Self {
        Self {
            bearer: token.map(str::to_string),
            ..self.clone()
        }
    }
}

/// Response as seen by the middleware; any HTTP status is a successful send
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn non-2xx statuses into the matching `ClientError`
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::from_status(self.status, &self.body))
        }
    }

    /// Decode the body. An empty body decodes as JSON `null`, so `()` and
    /// `Option<T>` work for 204 responses.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        Ok(serde_json::from_str(body)?)
    }
}

/// Sends one request and reports whatever status comes back. Only failures
/// to obtain a response are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

/// `reqwest`-backed transport rooted at the API base URL
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
        user_agent: Option<String>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        url::Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url}: {e}")))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut builder = ClientBuilder::new()
            .user_agent(user_agent.unwrap_or_else(|| concat!("gigdesk/", env!("CARGO_PKG_VERSION")).into()));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut headers = request.headers;
        if request.bearer.is_some() {
            // bearer_auth appends; the session token replaces any caller value
            headers.remove(AUTHORIZATION);
        }
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(headers);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        trace!(method = %request.method, path = %request.path, status = status.as_u16(), "api response");

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
