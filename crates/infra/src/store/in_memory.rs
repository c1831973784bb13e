use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use jobboard_applications::{Application, NewApplication};
use jobboard_auth::{
    NewPermissionGrant, NewRole, NewUser, Permission, PermissionGrant, RoleRecord, RoleType,
    UserRecord,
};
use jobboard_core::{ApplicationId, JobId, PermissionId, RoleId, UserId};
use jobboard_jobs::{Job, JobPatch, NewJob};

use super::{
    ApplicationStore, JobFilter, JobStore, PermissionStore, RoleStore, StoreError, UserStore,
    normalize_email,
};

/// Auto-increment table keyed by the raw id.
#[derive(Debug)]
struct Table<V> {
    rows: BTreeMap<u64, V>,
    next_id: u64,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<V> Table<V> {
    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
}

fn job_not_found() -> StoreError {
    StoreError::NotFound("Job not found".to_string())
}

/// In-memory store for dev and tests.
///
/// Lock order is jobs before applications wherever both are held.
#[derive(Debug)]
pub struct InMemoryStore {
    roles: RwLock<Table<RoleRecord>>,
    grants: RwLock<Table<PermissionGrant>>,
    users: RwLock<Table<UserRecord>>,
    jobs: RwLock<Table<Job>>,
    applications: RwLock<Table<Application>>,
}

impl InMemoryStore {
    /// Store seeded with the built-in "Authenticated" and "Public" roles.
    pub fn new() -> Self {
        let store = Self::without_builtin_roles();
        if let Ok(mut roles) = store.roles.write() {
            for (name, role_type, description) in [
                (
                    "Authenticated",
                    RoleType::AUTHENTICATED,
                    "Default role given to authenticated user.",
                ),
                (
                    "Public",
                    RoleType::PUBLIC,
                    "Default role given to unauthenticated user.",
                ),
            ] {
                let id = roles.allocate();
                roles.rows.insert(
                    id,
                    RoleRecord {
                        id: RoleId::new(id),
                        name: name.to_string(),
                        role_type,
                        description: Some(description.to_string()),
                        created_at: Utc::now(),
                    },
                );
            }
        }
        store
    }

    /// Empty store with no roles at all.
    pub fn without_builtin_roles() -> Self {
        Self {
            roles: RwLock::new(Table::default()),
            grants: RwLock::new(Table::default()),
            users: RwLock::new(Table::default()),
            jobs: RwLock::new(Table::default()),
            applications: RwLock::new(Table::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleStore for InMemoryStore {
    fn find_role(&self, id: RoleId) -> Result<Option<RoleRecord>, StoreError> {
        Ok(read(&self.roles)?.rows.get(&id.get()).cloned())
    }

    fn find_role_by_type(&self, role_type: &RoleType) -> Result<Option<RoleRecord>, StoreError> {
        Ok(read(&self.roles)?
            .rows
            .values()
            .find(|r| &r.role_type == role_type)
            .cloned())
    }

    fn create_role(&self, role: NewRole) -> Result<RoleRecord, StoreError> {
        let mut roles = write(&self.roles)?;
        if roles.rows.values().any(|r| r.role_type == role.role_type) {
            return Err(StoreError::Conflict(format!(
                "Role \"{}\" already exists",
                role.role_type.as_str()
            )));
        }
        let id = roles.allocate();
        let record = RoleRecord {
            id: RoleId::new(id),
            name: role.name,
            role_type: role.role_type,
            description: role.description,
            created_at: Utc::now(),
        };
        roles.rows.insert(id, record.clone());
        Ok(record)
    }
}

impl PermissionStore for InMemoryStore {
    fn find_grant(
        &self,
        role: RoleId,
        action: &Permission,
    ) -> Result<Option<PermissionGrant>, StoreError> {
        Ok(read(&self.grants)?
            .rows
            .values()
            .find(|g| g.role == role && &g.action == action)
            .cloned())
    }

    fn create_grant(&self, grant: NewPermissionGrant) -> Result<PermissionGrant, StoreError> {
        let mut grants = write(&self.grants)?;
        if grants
            .rows
            .values()
            .any(|g| g.role == grant.role && g.action == grant.action)
        {
            return Err(StoreError::Conflict(format!(
                "Permission {} already granted to role {}",
                grant.action, grant.role
            )));
        }
        let id = grants.allocate();
        let record = PermissionGrant {
            id: PermissionId::new(id),
            action: grant.action,
            role: grant.role,
            enabled: grant.enabled,
        };
        grants.rows.insert(id, record.clone());
        Ok(record)
    }

    fn list_grants(&self, role: RoleId) -> Result<Vec<PermissionGrant>, StoreError> {
        Ok(read(&self.grants)?
            .rows
            .values()
            .filter(|g| g.role == role)
            .cloned()
            .collect())
    }
}

impl UserStore for InMemoryStore {
    fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(read(&self.users)?.rows.get(&id.get()).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(read(&self.users)?
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let email = normalize_email(email);
        Ok(read(&self.users)?
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = write(&self.users)?;
        if users.rows.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("Username is already taken".to_string()));
        }
        let email = normalize_email(&user.email);
        if users.rows.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict("Email is already registered".to_string()));
        }

        let id = users.allocate();
        let now = Utc::now();
        let record = UserRecord {
            id: UserId::new(id),
            username: user.username,
            email,
            password_hash: user.password_hash,
            profile: user.profile,
            role: user.role,
            provider: user.provider,
            confirmed: user.confirmed,
            blocked: user.blocked,
            created_at: now,
            updated_at: now,
        };
        users.rows.insert(id, record.clone());
        Ok(record)
    }
}

impl JobStore for InMemoryStore {
    fn find_job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        Ok(read(&self.jobs)?.rows.get(&id.get()).cloned())
    }

    fn find_jobs(&self, filter: JobFilter) -> Result<Vec<Job>, StoreError> {
        Ok(read(&self.jobs)?
            .rows
            .values()
            .filter(|j| filter.matches(j))
            .cloned()
            .collect())
    }

    fn create_job(&self, job: NewJob) -> Result<Job, StoreError> {
        let mut jobs = write(&self.jobs)?;
        let id = jobs.allocate();
        let now = Utc::now();
        let record = Job {
            id: JobId::new(id),
            title: job.title,
            description: job.description,
            location: job.location,
            salary_range: job.salary_range,
            job_type: job.job_type,
            employer: job.employer,
            created_at: now,
            updated_at: now,
            published_at: job.published_at,
        };
        jobs.rows.insert(id, record.clone());
        Ok(record)
    }

    fn update_job(&self, id: JobId, patch: JobPatch) -> Result<Job, StoreError> {
        let mut jobs = write(&self.jobs)?;
        let job = jobs.rows.get_mut(&id.get()).ok_or_else(job_not_found)?;
        job.apply(patch, Utc::now());
        Ok(job.clone())
    }

    fn set_job_published_at(
        &self,
        id: JobId,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Job, StoreError> {
        let mut jobs = write(&self.jobs)?;
        let job = jobs.rows.get_mut(&id.get()).ok_or_else(job_not_found)?;
        job.published_at = published_at;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    fn delete_job(&self, id: JobId) -> Result<Job, StoreError> {
        let mut jobs = write(&self.jobs)?;
        let mut applications = write(&self.applications)?;
        let job = jobs.rows.remove(&id.get()).ok_or_else(job_not_found)?;
        applications.rows.retain(|_, a| a.job != id);
        Ok(job)
    }
}

impl ApplicationStore for InMemoryStore {
    fn create_application(&self, application: NewApplication) -> Result<Application, StoreError> {
        let jobs = read(&self.jobs)?;
        let mut applications = write(&self.applications)?;

        let published = jobs
            .rows
            .get(&application.job.get())
            .is_some_and(Job::is_published);
        if !published {
            return Err(StoreError::Conflict(
                "Job not found or not published".to_string(),
            ));
        }
        if applications
            .rows
            .values()
            .any(|a| a.job == application.job && a.candidate == application.candidate)
        {
            return Err(StoreError::Conflict(
                "You have already applied to this job".to_string(),
            ));
        }

        let id = applications.allocate();
        let now = Utc::now();
        let record = Application {
            id: ApplicationId::new(id),
            job: application.job,
            candidate: application.candidate,
            app_status: application.app_status,
            created_at: now,
            updated_at: now,
        };
        applications.rows.insert(id, record.clone());
        Ok(record)
    }

    fn find_application_by_pair(
        &self,
        job: JobId,
        candidate: UserId,
    ) -> Result<Option<Application>, StoreError> {
        Ok(read(&self.applications)?
            .rows
            .values()
            .find(|a| a.job == job && a.candidate == candidate)
            .cloned())
    }

    fn find_applications_by_candidate(
        &self,
        candidate: UserId,
    ) -> Result<Vec<Application>, StoreError> {
        Ok(read(&self.applications)?
            .rows
            .values()
            .filter(|a| a.candidate == candidate)
            .cloned()
            .collect())
    }

    fn find_applications_by_job(&self, job: JobId) -> Result<Vec<Application>, StoreError> {
        Ok(read(&self.applications)?
            .rows
            .values()
            .filter(|a| a.job == job)
            .cloned()
            .collect())
    }
}
