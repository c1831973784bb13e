use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use jobboard_applications::{Application, ApplicationStatus};
use jobboard_auth::{RoleRecord, UserRecord};
use jobboard_core::{ApplicationId, JobId, UserId};
use jobboard_jobs::{Job, JobType};

// -------------------------
// Request DTOs
// -------------------------

/// `{"data": {...}}` request wrapper.
#[derive(Debug, Deserialize)]
pub struct DataRequest<T> {
    pub data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateJobData {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub job_type: Option<String>,
    pub published_at: Option<Value>,
    #[serde(rename = "publishedAt")]
    pub published_at_camel: Option<Value>,
}

impl CreateJobData {
    /// A truthy `published_at`/`publishedAt` publishes the job on creation.
    pub fn wants_publish(&self) -> bool {
        [&self.published_at, &self.published_at_camel]
            .into_iter()
            .flatten()
            .any(is_truthy)
    }
}

/// Editable job fields. Unknown keys are ignored; nullable fields may be
/// cleared with an explicit `null`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateJobData {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub salary_range: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub job_type: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApplyData {
    pub job: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub mine: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile: Option<Value>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub identifier: Option<String>,
    pub password: Option<String>,
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Default, Serialize)]
pub struct Meta {}

/// `{"data": ..., "meta": {}}` response wrapper.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
    pub meta: Meta,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Meta::default(),
        }
    }
}

/// Public face of a user when nested inside jobs and applications.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub profile: Option<Value>,
}

impl From<&UserRecord> for UserSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            profile: user.profile.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub role_type: String,
}

/// Sanitized user: never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub provider: String,
    pub confirmed: bool,
    pub blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub profile: Option<Value>,
    pub role: Option<RoleSummary>,
}

impl UserView {
    pub fn new(user: &UserRecord, role: Option<&RoleRecord>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            provider: user.provider.clone(),
            confirmed: user.confirmed,
            blocked: user.blocked,
            created_at: user.created_at,
            updated_at: user.updated_at,
            profile: user.profile.clone(),
            role: role.map(|r| RoleSummary {
                name: r.name.clone(),
                role_type: r.role_type.as_str().to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub jwt: String,
    pub user: UserView,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub job_type: Option<JobType>,
    pub employer: Option<UserSummary>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<DateTime<Utc>>,
}

impl JobView {
    pub fn new(job: &Job, employer: Option<&UserRecord>) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            description: job.description.clone(),
            location: job.location.clone(),
            salary_range: job.salary_range.clone(),
            job_type: job.job_type,
            employer: employer.map(UserSummary::from),
            created_at: job.created_at,
            updated_at: job.updated_at,
            published_at: job.published_at,
        }
    }
}

/// Job as nested inside an application.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer: Option<UserSummary>,
}

impl JobSummary {
    pub fn new(job: &Job, employer: Option<&UserRecord>) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            employer: employer.map(UserSummary::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub job: Option<JobSummary>,
    pub candidate: Option<UserSummary>,
    pub app_status: ApplicationStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl ApplicationView {
    pub fn new(
        application: &Application,
        job: Option<JobSummary>,
        candidate: Option<&UserRecord>,
    ) -> Self {
        Self {
            id: application.id,
            job,
            candidate: candidate.map(UserSummary::from),
            app_status: application.app_status,
            created_at: application.created_at,
            updated_at: application.updated_at,
        }
    }
}
