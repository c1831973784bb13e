use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jobboard_core::{DomainError, DomainResult, JobId, UserId};

pub const JOB_TYPE_ERROR: &str =
    "Invalid job_type: must be one of Full-time, Part-time, Contract, Internship";

/// Employment type whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        JobType::FullTime,
        JobType::PartTime,
        JobType::Contract,
        JobType::Internship,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
        }
    }

    /// Exact, case-sensitive match against the whitelist.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == raw)
            .ok_or_else(|| DomainError::validation(JOB_TYPE_ERROR))
    }
}

impl core::fmt::Display for JobType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored job posting.
///
/// # Invariants
/// - `employer` is set at creation and never changes.
/// - `title` and `description` are never blank.
/// - Candidates only see the job while `published_at` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub job_type: Option<JobType>,
    pub employer: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.employer == user
    }

    /// Apply a validated patch. Only whitelisted fields exist on [`JobPatch`].
    pub fn apply(&mut self, patch: JobPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(salary_range) = patch.salary_range {
            self.salary_range = salary_range;
        }
        if let Some(job_type) = patch.job_type {
            self.job_type = job_type;
        }
        self.updated_at = now;
    }
}

/// Validated job creation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub salary_range: Option<String>,
    pub job_type: Option<JobType>,
    pub employer: UserId,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewJob {
    #[allow(clippy::too_many_arguments)]
    pub fn validate(
        employer: UserId,
        title: Option<String>,
        description: Option<String>,
        location: Option<String>,
        salary_range: Option<String>,
        job_type: Option<String>,
        publish: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let (Some(title), Some(description)) = (non_blank(title), non_blank(description)) else {
            return Err(DomainError::validation(
                "Missing required fields: title and description are required",
            ));
        };

        let job_type = job_type.as_deref().map(JobType::parse).transpose()?;

        Ok(Self {
            title,
            description,
            location,
            salary_range,
            job_type,
            employer,
            published_at: publish.then_some(now),
        })
    }
}

/// Validated partial update restricted to the editable fields.
///
/// The outer `Option` means "field present in the request"; the inner one (for
/// nullable fields) allows clearing a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<Option<String>>,
    pub salary_range: Option<Option<String>>,
    pub job_type: Option<Option<JobType>>,
}

impl JobPatch {
    pub fn validate(
        title: Option<String>,
        description: Option<String>,
        location: Option<Option<String>>,
        salary_range: Option<Option<String>>,
        job_type: Option<Option<String>>,
    ) -> DomainResult<Self> {
        let title = match title {
            Some(t) if t.trim().is_empty() => return Err(DomainError::validation("Title cannot be empty")),
            other => other.map(|t| t.trim().to_string()),
        };
        let description = match description {
            Some(d) if d.trim().is_empty() => {
                return Err(DomainError::validation("Description cannot be empty"));
            }
            other => other.map(|d| d.trim().to_string()),
        };
        let job_type = match job_type {
            Some(Some(raw)) => Some(Some(JobType::parse(&raw)?)),
            Some(None) => Some(None),
            None => None,
        };

        Ok(Self {
            title,
            description,
            location,
            salary_range,
            job_type,
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &JobPatch::default()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
