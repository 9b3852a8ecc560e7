//! Session store
//!
//! Owns the current user and the access/refresh token pair, mirrors them to
//! a [`SessionStorage`], and exposes the auth operations the rest of the
//! application goes through. One store is created at startup and shared by
//! reference with the API client.
//!
//! Phase transitions:
//!
//! ```text
//! LoggedOut --hydrate (tokens persisted)--> Hydrating
//! Hydrating --refresh ok--> LoggedIn
//! Hydrating --refresh failed--> LoggedOut
//! LoggedOut --login / register with tokens--> LoggedIn
//! LoggedIn  --logout / refresh failure during a request--> LoggedOut
//! ```

pub mod error;
pub mod storage;

pub use error::AuthError;
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError, StorageKeys};

use crate::client::middleware::send_authorized;
use crate::client::transport::{ApiRequest, ApiResponse, Transport};
use crate::client::ClientError;
use crate::navigation::{Navigator, Route};
use crate::types::auth::{
    ChangePasswordRequest, EmailRequest, LoginRequest, LoginResponse, PasswordResetConfirmRequest,
    RefreshRequest, RefreshResponse, RegisterData, RegisterRequest, RegisterResponse, User,
    VerifyEmailRequest,
};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{Mutex, watch};

const LOGIN_PATH: &str = "/api/auth/login/";
const REGISTER_PATH: &str = "/api/auth/register/";
const REFRESH_PATH: &str = "/api/auth/token/refresh/";
const VERIFY_EMAIL_PATH: &str = "/api/auth/verify-email/";
const RESEND_VERIFICATION_PATH: &str = "/api/auth/resend-verification/";
const PASSWORD_RESET_PATH: &str = "/api/auth/password-reset/";
const PASSWORD_RESET_CONFIRM_PATH: &str = "/api/auth/password-reset/confirm/";
const CHANGE_PASSWORD_PATH: &str = "/api/auth/change-password/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    LoggedOut,
    /// Persisted session loaded, refresh in flight
    Hydrating,
    LoggedIn,
}

#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}

/// Snapshot of the session. Holding the tokens as one pair keeps them
/// present or absent together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub tokens: Option<TokenPair>,
    pub user: Option<User>,
}

/// Outcome of a successful registration call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The API issued tokens; the account is signed in
    SignedIn(User),
    /// No tokens yet; the email address has to be confirmed first
    VerificationRequired,
}

pub struct SessionStore {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn SessionStorage>,
    navigator: Arc<dyn Navigator>,
    session: RwLock<Session>,
    phase: watch::Sender<SessionPhase>,
    /// Serializes refresh calls so concurrent 401s share one refresh
    refresh_gate: Mutex<()>,
}

impl SessionStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let (phase, _) = watch::channel(SessionPhase::LoggedOut);
        Self {
            transport,
            storage,
            navigator,
            session: RwLock::new(Session::default()),
            phase,
            refresh_gate: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().tokens.as_ref().map(|t| t.access.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().tokens.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    /// Watch phase changes, including forced logouts
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    /// Sign in with email and password.
    ///
    /// On failure the current session is left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let response = self
            .post_public(LOGIN_PATH, &LoginRequest { email, password })
            .await
            .inspect_err(|e| warn!(error = %e, "login failed"))?;
        let LoginResponse {
            access,
            refresh,
            user,
        } = response.json()?;

        self.establish(TokenPair { access, refresh }, user.clone())?;
        info!(user_id = user.id, user_type = %user.user_type, "logged in");
        self.navigator.navigate(Route::Dashboard(user.user_type));
        Ok(user)
    }

    /// Create an account. When the API answers with a token pair the new
    /// account is signed in exactly like [`login`](Self::login).
    pub async fn register(&self, data: &RegisterData) -> Result<Registration, AuthError> {
        let response = self
            .post_public(REGISTER_PATH, &RegisterRequest::from(data))
            .await
            .inspect_err(|e| warn!(error = %e, "registration failed"))?;
        let body: RegisterResponse = response.json()?;

        if let (Some(access), Some(refresh), Some(user)) = (body.access, body.refresh, body.user) {
            self.establish(TokenPair { access, refresh }, user.clone())?;
            info!(user_id = user.id, "registered and signed in");
            let route = if user.is_email_verified {
                Route::Dashboard(user.user_type)
            } else {
                Route::VerifyEmail
            };
            self.navigator.navigate(route);
            return Ok(Registration::SignedIn(user));
        }

        info!("registered; email verification pending");
        self.navigator.navigate(Route::VerifyEmail);
        Ok(Registration::VerificationRequired)
    }

    /// Drop the session from memory and storage. Never fails.
    pub fn logout(&self) {
        info!("logging out");
        self.clear();
        self.navigator.navigate(Route::Login);
    }

    /// Exchange the refresh token for a new access token
    pub async fn refresh(&self) -> Result<String, AuthError> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_exclusive().await
    }

    /// Refresh on behalf of a request that was rejected while carrying
    /// `stale`. If another request rotated the token in the meantime the
    /// current token is returned without a second refresh call.
    pub(crate) async fn refresh_after(&self, stale: Option<&str>) -> Result<String, AuthError> {
        let _gate = self.refresh_gate.lock().await;
        if let Some(current) = self.access_token() {
            if stale != Some(current.as_str()) {
                debug!("access token already rotated by a concurrent refresh");
                return Ok(current);
            }
        }
        self.refresh_exclusive().await
    }

    async fn refresh_exclusive(&self) -> Result<String, AuthError> {
        let refresh_token = self
            .read()
            .tokens
            .as_ref()
            .map(|t| t.refresh.clone())
            .ok_or(AuthError::NoRefreshToken)?;

        let request = ApiRequest::post(REFRESH_PATH).json(&RefreshRequest {
            refresh: &refresh_token,
        })?;
        let response = self
            .transport
            .send(request)
            .await
            .and_then(ApiResponse::error_for_status)
            .map_err(AuthError::RefreshRejected)?;
        let RefreshResponse { access } = response.json().map_err(AuthError::RefreshRejected)?;

        {
            let mut session = self.write();
            match session.tokens.as_mut() {
                Some(tokens) if tokens.refresh == refresh_token => {
                    tokens.access.clone_from(&access);
                }
                _ => {
                    debug!("session changed during refresh; new access token not stored");
                    return Ok(access);
                }
            }
        }

        if let Err(e) = self.storage.set(StorageKeys::ACCESS_TOKEN, &access) {
            warn!(error = %e, "failed to persist refreshed access token");
        }
        self.phase.send_replace(SessionPhase::LoggedIn);
        debug!("access token refreshed");
        Ok(access)
    }

    /// Irrecoverable auth failure during a request: clear everything and
    /// send the user back to the login entry point
    pub(crate) fn expire(&self) {
        warn!("session could not be renewed; signing out");
        self.clear();
        self.navigator.navigate(Route::Login);
    }

    /// Restore a persisted session at startup.
    ///
    /// The stored user is visible immediately while the phase is
    /// `Hydrating`; a refresh then confirms the session. A failed refresh is
    /// not an error here: everything is evicted and the result is
    /// `LoggedOut`.
    pub async fn hydrate(&self) -> SessionPhase {
        let access = self.load_persisted(StorageKeys::ACCESS_TOKEN);
        let refresh = self.load_persisted(StorageKeys::REFRESH_TOKEN);
        let user = self
            .load_persisted(StorageKeys::USER)
            .and_then(|raw| {
                serde_json::from_str::<User>(&raw)
                    .inspect_err(|e| warn!(error = %e, "ignoring unreadable stored user"))
                    .ok()
            });

        let (Some(access), Some(refresh), Some(user)) = (access, refresh, user) else {
            self.clear();
            return SessionPhase::LoggedOut;
        };

        *self.write() = Session {
            tokens: Some(TokenPair { access, refresh }),
            user: Some(user),
        };
        self.phase.send_replace(SessionPhase::Hydrating);

        match self.refresh().await {
            Ok(_) => {
                info!("stored session restored");
                SessionPhase::LoggedIn
            }
            Err(e) => {
                info!(error = %e, "stored session could not be renewed; starting logged out");
                self.clear();
                SessionPhase::LoggedOut
            }
        }
    }

    pub async fn verify_email(&self, token: &str) -> Result<(), AuthError> {
        self.post_public(VERIFY_EMAIL_PATH, &VerifyEmailRequest { token })
            .await?;
        info!("email verified");
        self.navigator.navigate(Route::Login);
        Ok(())
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        self.post_public(RESEND_VERIFICATION_PATH, &EmailRequest { email })
            .await?;
        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        self.post_public(PASSWORD_RESET_PATH, &EmailRequest { email })
            .await?;
        self.navigator.navigate(Route::Login);
        Ok(())
    }

    pub async fn reset_password_confirm(&self, token: &str, password: &str) -> Result<(), AuthError> {
        self.post_public(
            PASSWORD_RESET_CONFIRM_PATH,
            &PasswordResetConfirmRequest { token, password },
        )
        .await?;
        self.navigator.navigate(Route::Login);
        Ok(())
    }

    /// Change the password of the signed-in account. The current token pair
    /// stays valid.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let request = ApiRequest::post(CHANGE_PASSWORD_PATH).json(&ChangePasswordRequest {
            old_password,
            new_password,
        })?;
        send_authorized(self.transport.as_ref(), self, request)
            .await?
            .error_for_status()?;
        info!("password changed");
        Ok(())
    }

    async fn post_public<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let request = ApiRequest::post(path).json(body)?;
        self.transport.send(request).await?.error_for_status()
    }

    fn establish(&self, tokens: TokenPair, user: User) -> Result<(), AuthError> {
        if let Err(e) = self.persist(&tokens, &user) {
            self.restore_persisted();
            return Err(e);
        }
        *self.write() = Session {
            tokens: Some(tokens),
            user: Some(user),
        };
        self.phase.send_replace(SessionPhase::LoggedIn);
        Ok(())
    }

    /// Put storage back in line with the in-memory session after a partial
    /// write. If the current session cannot be written back either, the
    /// whole session is dropped.
    fn restore_persisted(&self) {
        let Session { tokens, user } = self.snapshot();
        let restored = match (tokens, user) {
            (Some(tokens), Some(user)) => self
                .persist(&tokens, &user)
                .inspect_err(|e| warn!(error = %e, "failed to restore stored session"))
                .is_ok(),
            _ => false,
        };
        if !restored {
            self.clear();
        }
    }

    fn persist(&self, tokens: &TokenPair, user: &User) -> Result<(), AuthError> {
        let user = serde_json::to_string(user).map_err(StorageError::from)?;
        self.storage.set(StorageKeys::ACCESS_TOKEN, &tokens.access)?;
        self.storage.set(StorageKeys::REFRESH_TOKEN, &tokens.refresh)?;
        self.storage.set(StorageKeys::USER, &user)?;
        Ok(())
    }

    fn load_persisted(&self, key: &str) -> Option<String> {
        self.storage
            .get(key)
            .inspect_err(|e| warn!(key, error = %e, "failed to read stored session"))
            .ok()
            .flatten()
    }

    fn clear(&self) {
        *self.write() = Session::default();
        self.clear_persisted();
        self.phase.send_replace(SessionPhase::LoggedOut);
    }

    fn clear_persisted(&self) {
        for key in StorageKeys::ALL {
            if let Err(e) = self.storage.remove(key) {
                warn!(key, error = %e, "failed to clear stored session entry");
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}
