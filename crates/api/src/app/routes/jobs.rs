use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Extension, Path, Query},
    routing::{get, post},
};
use chrono::Utc;

use jobboard_auth::{Action, RoleKind, UserRecord};
use jobboard_core::{JobId, UserId};
use jobboard_infra::{JobFilter, JobStore, UserStore};
use jobboard_jobs::{Job, JobPatch, NewJob};

use crate::app::dto::{CreateJobData, DataRequest, DataResponse, JobView, ListJobsQuery, UpdateJobData};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::authz::{authorize_action, authorize_owner, role_kind};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_job).get(list_jobs))
        .route("/:id", get(get_job).put(update_job).delete(delete_job))
        .route("/:id/publish", post(publish_job))
        .route("/:id/unpublish", post(unpublish_job))
}

pub async fn create_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    payload: Result<Json<DataRequest<CreateJobData>>, JsonRejection>,
) -> ApiResult<Json<DataResponse<JobView>>> {
    authorize_action(&services, &caller, Action::CreateJob)?;

    let Json(body) = payload?;
    let data = body.data.unwrap_or_default();
    let publish = data.wants_publish();
    let new_job = NewJob::validate(
        caller.user_id(),
        data.title,
        data.description,
        data.location,
        data.salary_range,
        data.job_type,
        publish,
        Utc::now(),
    )?;

    let created = services.store.create_job(new_job)?;
    let job = services
        .store
        .find_job(created.id)?
        .ok_or_else(|| ApiError::internal(format!("job {} missing after create", created.id)))?;
    tracing::info!(job_id = %job.id, employer = %job.employer, published = job.is_published(), "job created");

    let employer = services.store.find_user(job.employer)?;
    Ok(Json(DataResponse::new(JobView::new(&job, employer.as_ref()))))
}

pub async fn list_jobs(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    query: Result<Query<ListJobsQuery>, QueryRejection>,
) -> ApiResult<Json<DataResponse<Vec<JobView>>>> {
    let role = authorize_action(&services, &caller, Action::ListJobs)?;
    let Query(query) = query?;

    let filter = match role_kind(role.as_ref()) {
        RoleKind::Employer if query.mine.unwrap_or(false) => JobFilter {
            published_only: false,
            employer: Some(caller.user_id()),
        },
        RoleKind::Employer => JobFilter::default(),
        _ => JobFilter::published(),
    };

    let jobs = services.store.find_jobs(filter)?;
    let mut employers: HashMap<UserId, Option<UserRecord>> = HashMap::new();
    let mut views = Vec::with_capacity(jobs.len());
    for job in &jobs {
        if !employers.contains_key(&job.employer) {
            employers.insert(job.employer, services.store.find_user(job.employer)?);
        }
        let employer = employers.get(&job.employer).and_then(Option::as_ref);
        views.push(JobView::new(job, employer));
    }

    Ok(Json(DataResponse::new(views)))
}

pub async fn get_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<JobView>>> {
    let job_id: JobId = id.parse()?;
    let role = authorize_action(&services, &caller, Action::ViewJob)?;

    // Candidates never learn that an unpublished job exists.
    let candidate = role_kind(role.as_ref()) == RoleKind::Candidate;
    let job = services
        .store
        .find_job(job_id)?
        .filter(|job| !candidate || job.is_published())
        .ok_or_else(|| ApiError::not_found(format!("Job with ID {job_id} not found")))?;

    let employer = services.store.find_user(job.employer)?;
    Ok(Json(DataResponse::new(JobView::new(&job, employer.as_ref()))))
}

pub async fn update_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    payload: Result<Json<DataRequest<UpdateJobData>>, JsonRejection>,
) -> ApiResult<Json<DataResponse<JobView>>> {
    let job_id: JobId = id.parse()?;
    load_owned_job(&services, &caller, job_id, Action::UpdateJob)?;

    let Json(body) = payload?;
    let data = body
        .data
        .ok_or_else(|| ApiError::bad_request("Missing data in request body"))?;
    let patch = JobPatch::validate(
        data.title,
        data.description,
        data.location,
        data.salary_range,
        data.job_type,
    )?;

    let job = services.store.update_job(job_id, patch)?;
    tracing::info!(job_id = %job.id, "job updated");

    Ok(Json(DataResponse::new(JobView::new(&job, Some(caller.user())))))
}

pub async fn delete_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<JobView>>> {
    let job_id: JobId = id.parse()?;
    load_owned_job(&services, &caller, job_id, Action::DeleteJob)?;

    let job = services.store.delete_job(job_id)?;
    tracing::info!(job_id = %job.id, "job deleted with its applications");

    Ok(Json(DataResponse::new(JobView::new(&job, Some(caller.user())))))
}

pub async fn publish_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<JobView>>> {
    let job_id: JobId = id.parse()?;
    let job = load_owned_job(&services, &caller, job_id, Action::PublishJob)?;

    // Re-publishing keeps the original publication time.
    let published_at = job.published_at.unwrap_or_else(Utc::now);
    let job = services.store.set_job_published_at(job_id, Some(published_at))?;
    tracing::info!(job_id = %job.id, "job published");

    Ok(Json(DataResponse::new(JobView::new(&job, Some(caller.user())))))
}

pub async fn unpublish_job(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<JobView>>> {
    let job_id: JobId = id.parse()?;
    load_owned_job(&services, &caller, job_id, Action::PublishJob)?;

    let job = services.store.set_job_published_at(job_id, None)?;
    tracing::info!(job_id = %job.id, "job unpublished");

    Ok(Json(DataResponse::new(JobView::new(&job, Some(caller.user())))))
}

/// Role gate, existence, then ownership, in that order.
fn load_owned_job(
    services: &AppServices,
    caller: &CallerContext,
    job_id: JobId,
    action: Action,
) -> ApiResult<Job> {
    let role = authorize_action(services, caller, action)?;
    let job = services
        .store
        .find_job(job_id)?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    authorize_owner(role.as_ref(), action, job.employer, caller)?;
    Ok(job)
}
