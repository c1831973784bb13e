use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use jobboard_core::{ApplicationId, DomainError, DomainResult, INVALID_ID_MESSAGE, JobId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[default]
    Submitted,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "Submitted",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Submitted" => Some(ApplicationStatus::Submitted),
            _ => None,
        }
    }
}

/// Stored application.
///
/// # Invariants
/// - (`job`, `candidate`) is unique across all applications.
/// - `job` references a job that was published when the application was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job: JobId,
    pub candidate: UserId,
    pub app_status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub job: JobId,
    pub candidate: UserId,
    pub app_status: ApplicationStatus,
}

/// Validated "apply" command built from the raw request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyToJob {
    pub job: JobId,
}

impl ApplyToJob {
    /// `job` may be a JSON integer or a decimal string; anything else is rejected.
    pub fn validate(job: Option<&Value>) -> DomainResult<Self> {
        let job = match job {
            None | Some(Value::Null) => {
                return Err(DomainError::validation("Missing job ID in request body"));
            }
            Some(Value::Number(n)) => n
                .as_i64()
                .ok_or_else(|| DomainError::invalid_id(INVALID_ID_MESSAGE))
                .and_then(JobId::try_from_i64)?,
            Some(Value::String(s)) => s.parse::<JobId>()?,
            Some(_) => return Err(DomainError::invalid_id(INVALID_ID_MESSAGE)),
        };
        Ok(Self { job })
    }

    pub fn into_new(self, candidate: UserId) -> NewApplication {
        NewApplication {
            job: self.job,
            candidate,
            app_status: ApplicationStatus::default(),
        }
    }
}
