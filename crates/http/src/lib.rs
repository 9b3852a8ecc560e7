//! Gigdesk API access layer
//!
//! Everything the marketplace front ends need to talk to the REST API: a
//! shared client that authenticates every request and transparently
//! renews expired access tokens, the session store that owns the token
//! pair and user record, and typed endpoint groups for jobs, proposals,
//! payments, messages and notifications.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod config;
pub mod guard;
pub mod navigation;
pub mod session;
pub mod types;

#[cfg(test)]
mod testing;

pub use client::{ApiClient, ApiClientBuilder, ClientError};
pub use config::ClientConfig;
pub use guard::{Access, authorize};
pub use navigation::{Navigator, Route};
pub use session::{AuthError, Registration, SessionPhase, SessionStore};
