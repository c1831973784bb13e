//! Centralized authorization policy.
//!
//! Every handler asks the same question: may a caller with this role kind
//! perform this action on a resource they do (or do not) own? The answer lives
//! here and nowhere else.
//!
//! - No IO
//! - No panics

use thiserror::Error;

use jobboard_core::UserId;

use crate::permissions::{self, Permission};
use crate::RoleKind;

/// An operation exposed by the API that requires authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ViewOwnProfile,
    ListJobs,
    ViewJob,
    CreateJob,
    UpdateJob,
    DeleteJob,
    PublishJob,
    ApplyToJob,
    ListOwnApplications,
    ListJobApplications,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::ViewOwnProfile,
        Action::ListJobs,
        Action::ViewJob,
        Action::CreateJob,
        Action::UpdateJob,
        Action::DeleteJob,
        Action::PublishJob,
        Action::ApplyToJob,
        Action::ListOwnApplications,
        Action::ListJobApplications,
    ];

    /// Permission grant the caller's role must hold.
    pub fn permission(self) -> Permission {
        match self {
            Action::ViewOwnProfile => permissions::USER_ME,
            Action::ListJobs => permissions::JOB_FIND,
            Action::ViewJob => permissions::JOB_FIND_ONE,
            Action::CreateJob => permissions::JOB_CREATE,
            Action::UpdateJob => permissions::JOB_UPDATE,
            Action::DeleteJob => permissions::JOB_DELETE,
            Action::PublishJob => permissions::JOB_PUBLISH,
            Action::ApplyToJob => permissions::APPLICATION_CREATE,
            Action::ListOwnApplications => permissions::APPLICATION_ME,
            Action::ListJobApplications => permissions::APPLICATION_JOB,
        }
    }

    /// Whether the action is restricted to the resource owner.
    pub fn requires_ownership(self) -> bool {
        matches!(
            self,
            Action::UpdateJob | Action::DeleteJob | Action::PublishJob | Action::ListJobApplications
        )
    }

    fn role_allowed(self, kind: RoleKind) -> bool {
        match self {
            Action::ViewOwnProfile => true,
            Action::ListJobs | Action::ViewJob => {
                matches!(kind, RoleKind::Candidate | RoleKind::Employer)
            }
            Action::CreateJob
            | Action::UpdateJob
            | Action::DeleteJob
            | Action::PublishJob
            | Action::ListJobApplications => kind == RoleKind::Employer,
            Action::ApplyToJob | Action::ListOwnApplications => kind == RoleKind::Candidate,
        }
    }

    fn wrong_role_message(self) -> &'static str {
        match self {
            Action::ViewOwnProfile => "Forbidden",
            Action::ListJobs | Action::ViewJob => "Only Employers and Candidates can view jobs",
            Action::CreateJob => "Only Employers can create jobs",
            Action::UpdateJob => "Only Employers can update jobs",
            Action::DeleteJob => "Only Employers can delete jobs",
            Action::PublishJob => "Only Employers can publish jobs",
            Action::ApplyToJob => "Only Candidates can apply to jobs",
            Action::ListOwnApplications => "Only Candidates can view their applications",
            Action::ListJobApplications => "Only Employers can view job applications",
        }
    }

    fn not_owner_message(self) -> &'static str {
        match self {
            Action::UpdateJob => "You can only update jobs you created",
            Action::DeleteJob => "You can only delete jobs you created",
            Action::PublishJob => "You can only publish jobs you created",
            Action::ListJobApplications => "You can only view applications for jobs you created",
            _ => "Forbidden",
        }
    }
}

/// Relationship between the caller and the targeted resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Ownership not known yet (role gate only).
    Unchecked,
    Owner,
    NotOwner,
}

impl Ownership {
    pub fn of(owner: UserId, caller: UserId) -> Self {
        if owner == caller {
            Ownership::Owner
        } else {
            Ownership::NotOwner
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("{0}")]
    WrongRole(&'static str),

    #[error("{0}")]
    NotOwner(&'static str),

    #[error("Forbidden")]
    MissingGrant(Permission),
}

/// Decide whether a caller of `kind` may perform `action` given `ownership`.
pub fn authorize(kind: RoleKind, action: Action, ownership: Ownership) -> Result<(), AuthzError> {
    if !action.role_allowed(kind) {
        return Err(AuthzError::WrongRole(action.wrong_role_message()));
    }

    if action.requires_ownership() && ownership == Ownership::NotOwner {
        return Err(AuthzError::NotOwner(action.not_owner_message()));
    }

    Ok(())
}

/// Require that the caller's role holds the grant for `action`.
pub fn require_grant(action: Action, granted: bool) -> Result<(), AuthzError> {
    if granted {
        Ok(())
    } else {
        Err(AuthzError::MissingGrant(action.permission()))
    }
}
