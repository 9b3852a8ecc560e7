//! Session operation errors

use super::storage::StorageError;
use crate::client::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Refresh was needed but no refresh token is stored
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The refresh endpoint failed or returned a non-2xx status
    #[error("Token refresh rejected: {0}")]
    RefreshRejected(#[source] ClientError),

    /// An auth endpoint answered with an error
    #[error(transparent)]
    Api(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Errors after which the stored session can no longer be used
    pub const fn ends_session(&self) -> bool {
        matches!(self, Self::NoRefreshToken | Self::RefreshRejected(_))
    }
}
