//! Storage abstractions.
//!
//! Stores are synchronous and read-after-write consistent: a record written by
//! one call is visible to the next call on any thread.

mod in_memory;
mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PgStore;

use chrono::{DateTime, Utc};
use thiserror::Error;

use jobboard_applications::{Application, NewApplication};
use jobboard_auth::{
    NewPermissionGrant, NewRole, NewUser, Permission, PermissionGrant, RoleRecord, RoleType,
    UserRecord,
};
use jobboard_core::{JobId, RoleId, UserId};
use jobboard_jobs::{Job, JobPatch, NewJob};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),
    /// A write was rejected by a uniqueness or state check.
    #[error("{0}")]
    Conflict(String),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub trait RoleStore: Send + Sync {
    fn find_role(&self, id: RoleId) -> Result<Option<RoleRecord>, StoreError>;
    fn find_role_by_type(&self, role_type: &RoleType) -> Result<Option<RoleRecord>, StoreError>;
    fn create_role(&self, role: NewRole) -> Result<RoleRecord, StoreError>;
}

pub trait PermissionStore: Send + Sync {
    fn find_grant(
        &self,
        role: RoleId,
        action: &Permission,
    ) -> Result<Option<PermissionGrant>, StoreError>;
    fn create_grant(&self, grant: NewPermissionGrant) -> Result<PermissionGrant, StoreError>;
    fn list_grants(&self, role: RoleId) -> Result<Vec<PermissionGrant>, StoreError>;
}

pub trait UserStore: Send + Sync {
    fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;
    fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
    /// Emails compare case-insensitively.
    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;
    /// Login lookup: an identifier containing '@' matches an email, anything
    /// else a username.
    fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<UserRecord>, StoreError> {
        if identifier.contains('@') {
            self.find_user_by_email(identifier)
        } else {
            self.find_user_by_username(identifier)
        }
    }
    /// Fails with [`StoreError::Conflict`] when the username or email is taken.
    fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;
}

/// Emails are stored lowercased; lookups fold their input the same way.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Listing filter for jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobFilter {
    pub published_only: bool,
    pub employer: Option<UserId>,
}

impl JobFilter {
    pub fn published() -> Self {
        Self {
            published_only: true,
            employer: None,
        }
    }

    fn matches(&self, job: &Job) -> bool {
        (!self.published_only || job.is_published())
            && self.employer.is_none_or(|e| job.employer == e)
    }
}

pub trait JobStore: Send + Sync {
    fn find_job(&self, id: JobId) -> Result<Option<Job>, StoreError>;
    /// Jobs matching the filter, ordered by id.
    fn find_jobs(&self, filter: JobFilter) -> Result<Vec<Job>, StoreError>;
    fn create_job(&self, job: NewJob) -> Result<Job, StoreError>;
    fn update_job(&self, id: JobId, patch: JobPatch) -> Result<Job, StoreError>;
    fn set_job_published_at(
        &self,
        id: JobId,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Job, StoreError>;
    /// Removes the job together with every application that references it.
    fn delete_job(&self, id: JobId) -> Result<Job, StoreError>;
}

pub trait ApplicationStore: Send + Sync {
    /// Inserts the application after re-checking, under the write lock, that
    /// the job is published and the (job, candidate) pair is unused.
    fn create_application(&self, application: NewApplication) -> Result<Application, StoreError>;
    fn find_application_by_pair(
        &self,
        job: JobId,
        candidate: UserId,
    ) -> Result<Option<Application>, StoreError>;
    fn find_applications_by_candidate(
        &self,
        candidate: UserId,
    ) -> Result<Vec<Application>, StoreError>;
    fn find_applications_by_job(&self, job: JobId) -> Result<Vec<Application>, StoreError>;
}

/// Everything the HTTP layer needs from storage.
pub trait Store: RoleStore + PermissionStore + UserStore + JobStore + ApplicationStore {}

impl<T> Store for T where T: RoleStore + PermissionStore + UserStore + JobStore + ApplicationStore {}
