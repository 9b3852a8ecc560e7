//! Role-based route gating

use crate::navigation::Route;
use crate::session::SessionPhase;
use crate::types::{User, UserType};

/// Decision for a screen restricted to signed-in users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Session still being restored; render nothing yet
    Pending,
    Granted,
    Redirect(Route),
}

/// Gate a screen on the session. An empty `allowed` slice admits any role.
pub fn authorize(phase: SessionPhase, user: Option<&User>, allowed: &[UserType]) -> Access {
    if phase == SessionPhase::Hydrating {
        return Access::Pending;
    }
    match user {
        None => Access::Redirect(Route::Login),
        Some(user) if !allowed.is_empty() && !allowed.contains(&user.user_type) => {
            Access::Redirect(Route::Dashboard(user.user_type))
        }
        Some(_) => Access::Granted,
    }
}
