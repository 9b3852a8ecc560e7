//! Authentication payloads exchanged with `/api/auth/...`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Client,
    Freelancer,
}

impl UserType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Freelancer => "freelancer",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity record returned by login and registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub is_email_verified: bool,
}

impl User {
    /// Full display name
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Login response
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: User,
}

/// Account registration data supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
}

/// Registration request as the API expects it
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    /// Confirmation copy of the password
    pub password2: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub user_type: UserType,
}

impl<'a> From<&'a RegisterData> for RegisterRequest<'a> {
    fn from(data: &'a RegisterData) -> Self {
        Self {
            email: &data.email,
            password: &data.password,
            password2: &data.password,
            first_name: &data.first_name,
            last_name: &data.last_name,
            user_type: data.user_type,
        }
    }
}

/// Registration response; tokens are only present when the API signs the
/// new account in immediately
#[derive(Debug, Default, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Token refresh request
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Token refresh response
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyEmailRequest<'a> {
    pub token: &'a str,
}

#[derive(Debug, Serialize)]
pub struct EmailRequest<'a> {
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PasswordResetConfirmRequest<'a> {
    pub token: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
}
