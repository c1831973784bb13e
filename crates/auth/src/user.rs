//! User accounts and the registration/login inputs that create or find them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{DomainError, DomainResult, RoleId, UserId};

use crate::RoleType;

/// Provider recorded for accounts created through local registration.
pub const LOCAL_PROVIDER: &str = "local";

/// Stored user account.
///
/// # Invariants
/// - `username` and `email` are unique across all users (enforced by the store).
/// - `email` is stored trimmed and lowercased.
/// - `password_hash` is a PHC string and never leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile: Option<serde_json::Value>,
    pub role: RoleId,
    pub provider: String,
    pub confirmed: bool,
    pub blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User creation payload (password already hashed).
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub profile: Option<serde_json::Value>,
    pub role: RoleId,
    pub provider: String,
    pub confirmed: bool,
    pub blocked: bool,
}

/// Role a registering user may pick for themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationRole {
    Candidate,
    Employer,
}

impl RegistrationRole {
    /// Case-insensitive; anything except "candidate"/"employer" is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "candidate" => Some(RegistrationRole::Candidate),
            "employer" => Some(RegistrationRole::Employer),
            _ => None,
        }
    }

    /// Candidates are stored under the framework's built-in `authenticated` role.
    pub fn role_type(self) -> RoleType {
        match self {
            RegistrationRole::Candidate => RoleType::AUTHENTICATED,
            RegistrationRole::Employer => RoleType::EMPLOYER,
        }
    }
}

/// Validated registration command.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile: Option<serde_json::Value>,
    pub role: RegistrationRole,
}

impl RegisterUser {
    pub fn validate(
        username: Option<String>,
        email: Option<String>,
        password: Option<String>,
        profile: Option<serde_json::Value>,
        role: Option<String>,
    ) -> DomainResult<Self> {
        let (Some(username), Some(email), Some(password)) = (
            non_blank(username),
            non_blank(email),
            password.filter(|p| !p.is_empty()),
        ) else {
            return Err(DomainError::validation(
                "Missing required fields: username, email, and password are required",
            ));
        };

        // Login resolves identifiers containing '@' as emails only.
        if username.contains('@') {
            return Err(DomainError::validation("Username cannot contain \"@\""));
        }

        let email = email.to_lowercase();
        if !looks_like_email(&email) {
            return Err(DomainError::validation("Invalid email format"));
        }

        let role = role
            .as_deref()
            .and_then(RegistrationRole::parse)
            .ok_or_else(|| {
                DomainError::validation(r#"Invalid or missing role: must be "candidate" or "employer""#)
            })?;

        Ok(Self {
            username,
            email,
            password,
            profile: profile.filter(|p| !p.is_null()),
            role,
        })
    }
}

/// Validated login command. `identifier` is an email when it contains '@',
/// otherwise a username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub identifier: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn validate(identifier: Option<String>, password: Option<String>) -> DomainResult<Self> {
        match (non_blank(identifier), password.filter(|p| !p.is_empty())) {
            (Some(identifier), Some(password)) => Ok(Self { identifier, password }),
            _ => Err(DomainError::validation("Missing identifier or password")),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}
