//! Postgres-backed store.
//!
//! The store traits are synchronous, so every call parks the current worker
//! with `block_in_place` and drives the query on the captured runtime handle.
//! This requires the multi-threaded Tokio runtime.
//!
//! Uniqueness (username, email, one application per job and candidate) is
//! enforced by table constraints, so concurrent writers cannot slip past it.

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tokio::runtime::Handle;

use jobboard_applications::{Application, ApplicationStatus, NewApplication};
use jobboard_auth::{
    NewPermissionGrant, NewRole, NewUser, Permission, PermissionGrant, RoleRecord, RoleType,
    UserRecord,
};
use jobboard_core::{ApplicationId, JobId, PermissionId, RoleId, UserId};
use jobboard_jobs::{Job, JobPatch, JobType, NewJob};

use super::{
    ApplicationStore, JobFilter, JobStore, PermissionStore, RoleStore, StoreError, UserStore,
    normalize_email,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS roles (
    id BIGSERIAL PRIMARY KEY,
    name TEXT NOT NULL,
    role_type TEXT NOT NULL,
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT roles_type_key UNIQUE (role_type)
);

CREATE TABLE IF NOT EXISTS permissions (
    id BIGSERIAL PRIMARY KEY,
    action TEXT NOT NULL,
    role_id BIGINT NOT NULL REFERENCES roles (id) ON DELETE CASCADE,
    enabled BOOLEAN NOT NULL,
    CONSTRAINT permissions_role_action_key UNIQUE (role_id, action)
);

CREATE TABLE IF NOT EXISTS users (
    id BIGSERIAL PRIMARY KEY,
    username TEXT NOT NULL,
    email TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    profile JSONB,
    role_id BIGINT NOT NULL REFERENCES roles (id),
    provider TEXT NOT NULL,
    confirmed BOOLEAN NOT NULL,
    blocked BOOLEAN NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT users_username_key UNIQUE (username),
    CONSTRAINT users_email_key UNIQUE (email)
);

CREATE TABLE IF NOT EXISTS jobs (
    id BIGSERIAL PRIMARY KEY,
    employer_id BIGINT NOT NULL REFERENCES users (id),
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    location TEXT,
    salary_range TEXT,
    job_type TEXT,
    published_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS jobs_employer_idx ON jobs (employer_id);

CREATE TABLE IF NOT EXISTS applications (
    id BIGSERIAL PRIMARY KEY,
    job_id BIGINT NOT NULL REFERENCES jobs (id) ON DELETE CASCADE,
    candidate_id BIGINT NOT NULL REFERENCES users (id),
    app_status TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT applications_job_candidate_key UNIQUE (job_id, candidate_id)
);

CREATE INDEX IF NOT EXISTS applications_candidate_idx ON applications (candidate_id);

INSERT INTO roles (name, role_type, description) VALUES
    ('Authenticated', 'authenticated', 'Default role given to authenticated user.'),
    ('Public', 'public', 'Default role given to unauthenticated user.')
ON CONFLICT (role_type) DO NOTHING;
"#;

const SELECT_ROLE: &str = "SELECT id, name, role_type, description, created_at FROM roles";
const SELECT_GRANT: &str = "SELECT id, action, role_id, enabled FROM permissions";
const SELECT_USER: &str = "SELECT id, username, email, password_hash, profile, role_id, provider, \
     confirmed, blocked, created_at, updated_at FROM users";
const SELECT_JOB: &str = "SELECT id, employer_id, title, description, location, salary_range, \
     job_type, published_at, created_at, updated_at FROM jobs";
const SELECT_APPLICATION: &str =
    "SELECT id, job_id, candidate_id, app_status, created_at, updated_at FROM applications";

const JOB_COLUMNS: &str = "id, employer_id, title, description, location, salary_range, \
     job_type, published_at, created_at, updated_at";
const APPLICATION_COLUMNS: &str = "id, job_id, candidate_id, app_status, created_at, updated_at";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StoreError::Conflict(conflict_message(db.constraint()).to_string());
            }
        }
        StoreError::Unavailable(err.to_string())
    }
}

/// User-facing message for a violated unique constraint.
fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_username_key") => "Username is already taken",
        Some("users_email_key") => "Email is already registered",
        Some("applications_job_candidate_key") => "You have already applied to this job",
        Some("roles_type_key") => "Role already exists",
        Some("permissions_role_action_key") => "Permission already granted",
        _ => "Record already exists",
    }
}

fn corrupt(what: &str) -> StoreError {
    StoreError::Unavailable(format!("corrupt {what} row"))
}

fn job_not_found() -> StoreError {
    StoreError::NotFound("Job not found".to_string())
}

/// Ids never exceed `i64::MAX`; anything larger cannot match a row.
fn key(raw: u64) -> i64 {
    i64::try_from(raw).unwrap_or(i64::MAX)
}

fn id_column(row: &PgRow, column: &str) -> Result<u64, StoreError> {
    let raw: i64 = row.try_get(column)?;
    u64::try_from(raw).map_err(|_| corrupt(column))
}

fn role_from_row(row: &PgRow) -> Result<RoleRecord, StoreError> {
    Ok(RoleRecord {
        id: RoleId::new(id_column(row, "id")?),
        name: row.try_get("name")?,
        role_type: RoleType::new(row.try_get::<String, _>("role_type")?),
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
    })
}

fn grant_from_row(row: &PgRow) -> Result<PermissionGrant, StoreError> {
    Ok(PermissionGrant {
        id: PermissionId::new(id_column(row, "id")?),
        action: Permission::new(row.try_get::<String, _>("action")?),
        role: RoleId::new(id_column(row, "role_id")?),
        enabled: row.try_get("enabled")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, StoreError> {
    Ok(UserRecord {
        id: UserId::new(id_column(row, "id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        profile: row.try_get("profile")?,
        role: RoleId::new(id_column(row, "role_id")?),
        provider: row.try_get("provider")?,
        confirmed: row.try_get("confirmed")?,
        blocked: row.try_get("blocked")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn job_from_row(row: &PgRow) -> Result<Job, StoreError> {
    let job_type = row
        .try_get::<Option<String>, _>("job_type")?
        .map(|raw| JobType::parse(&raw).map_err(|_| corrupt("job_type")))
        .transpose()?;
    Ok(Job {
        id: JobId::new(id_column(row, "id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        salary_range: row.try_get("salary_range")?,
        job_type,
        employer: UserId::new(id_column(row, "employer_id")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        published_at: row.try_get("published_at")?,
    })
}

fn application_from_row(row: &PgRow) -> Result<Application, StoreError> {
    let status: String = row.try_get("app_status")?;
    Ok(Application {
        id: ApplicationId::new(id_column(row, "id")?),
        job: JobId::new(id_column(row, "job_id")?),
        candidate: UserId::new(id_column(row, "candidate_id")?),
        app_status: ApplicationStatus::parse(&status).ok_or_else(|| corrupt("app_status"))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Store backed by a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    runtime: Handle,
}

impl PgStore {
    /// Connect, create the schema if missing and seed the built-in roles.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let runtime = Handle::try_current().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        tracing::info!("postgres store ready");
        Ok(Self { pool, runtime })
    }

    fn run<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::task::block_in_place(|| self.runtime.block_on(fut))
    }
}

impl RoleStore for PgStore {
    fn find_role(&self, id: RoleId) -> Result<Option<RoleRecord>, StoreError> {
        self.run(async {
            let row = sqlx::query(&format!("{SELECT_ROLE} WHERE id = $1"))
                .bind(key(id.get()))
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(role_from_row).transpose()
        })
    }

    fn find_role_by_type(&self, role_type: &RoleType) -> Result<Option<RoleRecord>, StoreError> {
        self.run(async {
            let row = sqlx::query(&format!("{SELECT_ROLE} WHERE role_type = $1"))
                .bind(role_type.as_str())
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(role_from_row).transpose()
        })
    }

    fn create_role(&self, role: NewRole) -> Result<RoleRecord, StoreError> {
        self.run(async {
            let row = sqlx::query(
                "INSERT INTO roles (name, role_type, description, created_at) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, name, role_type, description, created_at",
            )
            .bind(&role.name)
            .bind(role.role_type.as_str())
            .bind(role.description.as_deref())
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
            role_from_row(&row)
        })
    }
}

impl PermissionStore for PgStore {
    fn find_grant(
        &self,
        role: RoleId,
        action: &Permission,
    ) -> Result<Option<PermissionGrant>, StoreError> {
        self.run(async {
            let row = sqlx::query(&format!("{SELECT_GRANT} WHERE role_id = $1 AND action = $2"))
                .bind(key(role.get()))
                .bind(action.as_str())
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(grant_from_row).transpose()
        })
    }

    fn create_grant(&self, grant: NewPermissionGrant) -> Result<PermissionGrant, StoreError> {
        self.run(async {
            let row = sqlx::query(
                "INSERT INTO permissions (action, role_id, enabled) VALUES ($1, $2, $3) \
                 RETURNING id, action, role_id, enabled",
            )
            .bind(grant.action.as_str())
            .bind(key(grant.role.get()))
            .bind(grant.enabled)
            .fetch_one(&self.pool)
            .await?;
            grant_from_row(&row)
        })
    }

    fn list_grants(&self, role: RoleId) -> Result<Vec<PermissionGrant>, StoreError> {
        self.run(async {
            let rows = sqlx::query(&format!("{SELECT_GRANT} WHERE role_id = $1 ORDER BY id"))
                .bind(key(role.get()))
                .fetch_all(&self.pool)
                .await?;
            rows.iter().map(grant_from_row).collect()
        })
    }
}

impl UserStore for PgStore {
    fn find_user(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        self.run(async {
            let row = sqlx::query(&format!("{SELECT_USER} WHERE id = $1"))
                .bind(key(id.get()))
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(user_from_row).transpose()
        })
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.run(async {
            let row = sqlx::query(&format!("{SELECT_USER} WHERE username = $1"))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(user_from_row).transpose()
        })
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let email = normalize_email(email);
        self.run(async {
            let row = sqlx::query(&format!("{SELECT_USER} WHERE email = $1"))
                .bind(&email)
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(user_from_row).transpose()
        })
    }

    fn create_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let now = Utc::now();
        self.run(async {
            let row = sqlx::query(
                "INSERT INTO users (username, email, password_hash, profile, role_id, provider, \
                 confirmed, blocked, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9) \
                 RETURNING id, username, email, password_hash, profile, role_id, provider, \
                 confirmed, blocked, created_at, updated_at",
            )
            .bind(&user.username)
            .bind(normalize_email(&user.email))
            .bind(&user.password_hash)
            .bind(user.profile.clone())
            .bind(key(user.role.get()))
            .bind(&user.provider)
            .bind(user.confirmed)
            .bind(user.blocked)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
            user_from_row(&row)
        })
    }
}

impl JobStore for PgStore {
    fn find_job(&self, id: JobId) -> Result<Option<Job>, StoreError> {
        self.run(async {
            let row = sqlx::query(&format!("{SELECT_JOB} WHERE id = $1"))
                .bind(key(id.get()))
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(job_from_row).transpose()
        })
    }

    fn find_jobs(&self, filter: JobFilter) -> Result<Vec<Job>, StoreError> {
        self.run(async {
            let rows = sqlx::query(&format!(
                "{SELECT_JOB} WHERE ($1 = FALSE OR published_at IS NOT NULL) \
                 AND ($2::BIGINT IS NULL OR employer_id = $2) ORDER BY id"
            ))
            .bind(filter.published_only)
            .bind(filter.employer.map(|e| key(e.get())))
            .fetch_all(&self.pool)
            .await?;
            rows.iter().map(job_from_row).collect()
        })
    }

    fn create_job(&self, job: NewJob) -> Result<Job, StoreError> {
        let now = Utc::now();
        self.run(async {
            let row = sqlx::query(&format!(
                "INSERT INTO jobs (employer_id, title, description, location, salary_range, \
                 job_type, published_at, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8) RETURNING {JOB_COLUMNS}"
            ))
            .bind(key(job.employer.get()))
            .bind(&job.title)
            .bind(&job.description)
            .bind(job.location.as_deref())
            .bind(job.salary_range.as_deref())
            .bind(job.job_type.map(JobType::as_str))
            .bind(job.published_at)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;
            job_from_row(&row)
        })
    }

    fn update_job(&self, id: JobId, patch: JobPatch) -> Result<Job, StoreError> {
        self.run(async {
            let mut tx = self.pool.begin().await?;
            let row = sqlx::query(&format!("{SELECT_JOB} WHERE id = $1 FOR UPDATE"))
                .bind(key(id.get()))
                .fetch_optional(&mut *tx)
                .await?;
            let mut job = row
                .as_ref()
                .map(job_from_row)
                .transpose()?
                .ok_or_else(job_not_found)?;
            job.apply(patch, Utc::now());

            sqlx::query(
                "UPDATE jobs SET title = $2, description = $3, location = $4, \
                 salary_range = $5, job_type = $6, updated_at = $7 WHERE id = $1",
            )
            .bind(key(id.get()))
            .bind(&job.title)
            .bind(&job.description)
            .bind(job.location.as_deref())
            .bind(job.salary_range.as_deref())
            .bind(job.job_type.map(JobType::as_str))
            .bind(job.updated_at)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok(job)
        })
    }

    fn set_job_published_at(
        &self,
        id: JobId,
        published_at: Option<DateTime<Utc>>,
    ) -> Result<Job, StoreError> {
        self.run(async {
            let row = sqlx::query(&format!(
                "UPDATE jobs SET published_at = $2, updated_at = $3 WHERE id = $1 \
                 RETURNING {JOB_COLUMNS}"
            ))
            .bind(key(id.get()))
            .bind(published_at)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;
            row.as_ref().map(job_from_row).transpose()?.ok_or_else(job_not_found)
        })
    }

    fn delete_job(&self, id: JobId) -> Result<Job, StoreError> {
        // Applications go with it through ON DELETE CASCADE.
        self.run(async {
            let row = sqlx::query(&format!("DELETE FROM jobs WHERE id = $1 RETURNING {JOB_COLUMNS}"))
                .bind(key(id.get()))
                .fetch_optional(&self.pool)
                .await?;
            row.as_ref().map(job_from_row).transpose()?.ok_or_else(job_not_found)
        })
    }
}

impl ApplicationStore for PgStore {
    fn create_application(&self, application: NewApplication) -> Result<Application, StoreError> {
        let now = Utc::now();
        self.run(async {
            let row = sqlx::query(&format!(
                "INSERT INTO applications (job_id, candidate_id, app_status, created_at, updated_at) \
                 SELECT id, $2, $3, $4, $4 FROM jobs WHERE id = $1 AND published_at IS NOT NULL \
                 RETURNING {APPLICATION_COLUMNS}"
            ))
            .bind(key(application.job.get()))
            .bind(key(application.candidate.get()))
            .bind(application.app_status.as_str())
            .bind(now)
            .fetch_optional(&self.pool)
            .await?;
            match row {
                Some(row) => application_from_row(&row),
                None => Err(StoreError::Conflict(
                    "Job not found or not published".to_string(),
                )),
            }
        })
    }

    fn find_application_by_pair(
        &self,
        job: JobId,
        candidate: UserId,
    ) -> Result<Option<Application>, StoreError> {
        self.run(async {
            let row = sqlx::query(&format!(
                "{SELECT_APPLICATION} WHERE job_id = $1 AND candidate_id = $2"
            ))
            .bind(key(job.get()))
            .bind(key(candidate.get()))
            .fetch_optional(&self.pool)
            .await?;
            row.as_ref().map(application_from_row).transpose()
        })
    }

    fn find_applications_by_candidate(
        &self,
        candidate: UserId,
    ) -> Result<Vec<Application>, StoreError> {
        self.run(async {
            let rows = sqlx::query(&format!(
                "{SELECT_APPLICATION} WHERE candidate_id = $1 ORDER BY id"
            ))
            .bind(key(candidate.get()))
            .fetch_all(&self.pool)
            .await?;
            rows.iter().map(application_from_row).collect()
        })
    }

    fn find_applications_by_job(&self, job: JobId) -> Result<Vec<Application>, StoreError> {
        self.run(async {
            let rows = sqlx::query(&format!("{SELECT_APPLICATION} WHERE job_id = $1 ORDER BY id"))
                .bind(key(job.get()))
                .fetch_all(&self.pool)
                .await?;
            rows.iter().map(application_from_row).collect()
        })
    }
}
