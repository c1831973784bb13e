use jobboard_auth::UserRecord;
use jobboard_core::{RoleId, UserId};

/// Authenticated caller for a request, inserted by the auth middleware.
///
/// Present on every protected route.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerContext {
    user: UserRecord,
}

impl CallerContext {
    pub fn new(user: UserRecord) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> UserId {
        self.user.id
    }

    pub fn role_id(&self) -> RoleId {
        self.user.role
    }

    pub fn user(&self) -> &UserRecord {
        &self.user
    }
}
