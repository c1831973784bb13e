use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::RoleId;

/// Role type identifier as stored on role records (e.g. "employer").
///
/// Role types are opaque strings at the storage layer; [`RoleType::kind`]
/// interprets them for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleType(Cow<'static, str>);

impl RoleType {
    /// Built-in role every registered candidate receives.
    pub const AUTHENTICATED: RoleType = RoleType(Cow::Borrowed("authenticated"));
    /// Custom role created by the bootstrap routine.
    pub const EMPLOYER: RoleType = RoleType(Cow::Borrowed("employer"));
    /// Built-in role for anonymous callers.
    pub const PUBLIC: RoleType = RoleType(Cow::Borrowed("public"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> RoleKind {
        RoleKind::from_type(self.as_str())
    }
}

impl core::fmt::Display for RoleType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authorization-relevant interpretation of a role type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Candidate,
    Employer,
    /// Any other role (public, admin-managed custom roles).
    Other,
}

impl RoleKind {
    /// Both "authenticated" (the framework default) and "candidate" mean Candidate.
    pub fn from_type(role_type: &str) -> Self {
        match role_type {
            "authenticated" | "candidate" => RoleKind::Candidate,
            "employer" => RoleKind::Employer,
            _ => RoleKind::Other,
        }
    }
}

/// Stored role record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    #[serde(rename = "type")]
    pub role_type: RoleType,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RoleRecord {
    pub fn kind(&self) -> RoleKind {
        self.role_type.kind()
    }
}

/// Role creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub name: String,
    pub role_type: RoleType,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_aliases_map_to_candidate_kind() {
        assert_eq!(RoleType::AUTHENTICATED.kind(), RoleKind::Candidate);
        assert_eq!(RoleType::new("candidate").kind(), RoleKind::Candidate);
        assert_eq!(RoleType::EMPLOYER.kind(), RoleKind::Employer);
        assert_eq!(RoleType::PUBLIC.kind(), RoleKind::Other);
        assert_eq!(RoleType::new("Employer").kind(), RoleKind::Other);
    }
}
