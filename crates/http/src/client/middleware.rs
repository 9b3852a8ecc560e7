//! Bearer injection and refresh-on-401, composed around a [`Transport`]

use super::error::ClientError;
use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::session::SessionStore;
use reqwest::StatusCode;

/// A request together with its retry state
#[derive(Debug, Clone)]
pub struct Attempt {
    request: ApiRequest,
    already_retried: bool,
}

impl Attempt {
    pub const fn new(request: ApiRequest) -> Self {
        Self {
            request,
            already_retried: false,
        }
    }

    pub const fn already_retried(&self) -> bool {
        self.already_retried
    }

    /// Whether this response should start a refresh cycle
    pub fn needs_refresh(&self, response: &ApiResponse) -> bool {
        response.status == StatusCode::UNAUTHORIZED && !self.already_retried
    }

    /// The retry for this attempt. There is no retry of a retry.
    #[must_use]
    pub fn retried(self) -> Self {
        Self {
            request: self.request,
            already_retried: true,
        }
    }

    pub fn authorized(&self, token: Option<&str>) -> ApiRequest {
        self.request.with_bearer(token)
    }
}

/// Send `request` with the session's access token.
///
/// A 401 on the first attempt triggers one refresh through the session
/// store. On success the request is re-issued once with the new token and
/// that response is returned as-is. On failure the session is cleared, the
/// user is sent to login and the original 401 response is returned. Every
/// other status, and network errors, pass through untouched.
pub async fn send_authorized(
    transport: &dyn Transport,
    session: &SessionStore,
    request: ApiRequest,
) -> Result<ApiResponse, ClientError> {
    let mut attempt = Attempt::new(request);
    let mut token = session.access_token();

    loop {
        let response = transport.send(attempt.authorized(token.as_deref())).await?;
        if !attempt.needs_refresh(&response) {
            return Ok(response);
        }

        debug!(path = %attempt.request.path, "access token rejected; refreshing");
        attempt = attempt.retried();
        match session.refresh_after(token.as_deref()).await {
            Ok(fresh) => token = Some(fresh),
            Err(e) => {
                warn!(path = %attempt.request.path, error = %e, "token refresh failed");
                session.expire();
                return Ok(response);
            }
        }
    }
}
