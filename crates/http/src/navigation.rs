//! Navigation requests raised by the session layer
//!
//! The session store never renders anything itself. When a flow ends on a
//! different screen (login after a forced logout, the role dashboard after
//! sign-in) it hands a [`Route`] to the injected [`Navigator`].

use crate::types::UserType;
use std::fmt;

/// Entry points the session layer can send the user to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    VerifyEmail,
    Dashboard(UserType),
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::VerifyEmail => "/verify-email",
            Self::Dashboard(UserType::Client) => "/client/dashboard",
            Self::Dashboard(UserType::Freelancer) => "/freelancer/dashboard",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Records the request in the log and does nothing else
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: Route) {
        debug!(%route, "navigation requested");
    }
}
