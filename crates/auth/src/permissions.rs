use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use jobboard_core::{PermissionId, RoleId};

/// Permission action identifier (e.g. "api::job.job.create").
///
/// Actions keep the `<namespace>::<api>.<controller>.<action>` naming so grants
/// stay readable next to the routes they guard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

const fn action(name: &'static str) -> Permission {
    Permission(Cow::Borrowed(name))
}

pub const AUTH_REGISTER: Permission = action("plugin::users-permissions.auth.register");
pub const AUTH_CONNECT: Permission = action("plugin::users-permissions.auth.connect");
pub const USER_ME: Permission = action("plugin::users-permissions.user.me");

pub const JOB_CREATE: Permission = action("api::job.job.create");
pub const JOB_FIND: Permission = action("api::job.job.find");
pub const JOB_FIND_ONE: Permission = action("api::job.job.findOne");
pub const JOB_UPDATE: Permission = action("api::job.job.update");
pub const JOB_DELETE: Permission = action("api::job.job.delete");
pub const JOB_PUBLISH: Permission = action("api::job.job.publish");

pub const APPLICATION_CREATE: Permission = action("api::application.application.create");
pub const APPLICATION_ME: Permission = action("api::application.application.me");
pub const APPLICATION_FIND: Permission = action("api::application.application.find");
pub const APPLICATION_FIND_ONE: Permission = action("api::application.application.findOne");
pub const APPLICATION_JOB: Permission = action("api::application.application.job");

/// Grants seeded for the built-in `authenticated` (candidate) role.
pub const CANDIDATE_GRANTS: &[Permission] = &[
    AUTH_REGISTER,
    AUTH_CONNECT,
    USER_ME,
    JOB_FIND,
    JOB_FIND_ONE,
    APPLICATION_CREATE,
    APPLICATION_ME,
];

/// Grants seeded for the `employer` role.
pub const EMPLOYER_GRANTS: &[Permission] = &[
    AUTH_REGISTER,
    AUTH_CONNECT,
    USER_ME,
    JOB_CREATE,
    JOB_FIND,
    JOB_FIND_ONE,
    JOB_UPDATE,
    JOB_DELETE,
    JOB_PUBLISH,
    APPLICATION_FIND,
    APPLICATION_FIND_ONE,
    APPLICATION_JOB,
];

/// A stored (action, role) grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub id: PermissionId,
    pub action: Permission,
    pub role: RoleId,
    pub enabled: bool,
}

/// Grant creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPermissionGrant {
    pub action: Permission,
    pub role: RoleId,
    pub enabled: bool,
}
