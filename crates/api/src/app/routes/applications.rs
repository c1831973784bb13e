use std::sync::Arc;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    extract::{Extension, Path},
    routing::{get, post},
};

use jobboard_applications::ApplyToJob;
use jobboard_auth::Action;
use jobboard_core::JobId;
use jobboard_infra::{ApplicationStore, JobStore, UserStore};

use crate::app::dto::{ApplicationView, ApplyData, DataRequest, DataResponse, JobSummary};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::authz::{authorize_action, authorize_owner};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_application))
        .route("/me", get(list_my_applications))
        .route("/job/:id", get(list_job_applications))
}

pub async fn create_application(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    payload: Result<Json<DataRequest<ApplyData>>, JsonRejection>,
) -> ApiResult<Json<DataResponse<ApplicationView>>> {
    authorize_action(&services, &caller, Action::ApplyToJob)?;

    let Json(body) = payload?;
    let cmd = ApplyToJob::validate(body.data.and_then(|d| d.job).as_ref())?;

    let job = services
        .store
        .find_job(cmd.job)?
        .filter(|job| job.is_published())
        .ok_or_else(|| ApiError::bad_request("Job not found or not published"))?;

    if services
        .store
        .find_application_by_pair(job.id, caller.user_id())?
        .is_some()
    {
        return Err(ApiError::bad_request("You have already applied to this job"));
    }

    let application = services
        .store
        .create_application(cmd.into_new(caller.user_id()))?;
    tracing::info!(
        application_id = %application.id,
        job_id = %job.id,
        candidate = %caller.user_id(),
        "application submitted"
    );

    let employer = services.store.find_user(job.employer)?;
    let view = ApplicationView::new(
        &application,
        Some(JobSummary::new(&job, employer.as_ref())),
        Some(caller.user()),
    );
    Ok(Json(DataResponse::new(view)))
}

pub async fn list_my_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> ApiResult<Json<DataResponse<Vec<ApplicationView>>>> {
    authorize_action(&services, &caller, Action::ListOwnApplications)?;

    let applications = services
        .store
        .find_applications_by_candidate(caller.user_id())?;

    let mut views = Vec::with_capacity(applications.len());
    for application in &applications {
        let job = match services.store.find_job(application.job)? {
            Some(job) => {
                let employer = services.store.find_user(job.employer)?;
                Some(JobSummary::new(&job, employer.as_ref()))
            }
            None => None,
        };
        views.push(ApplicationView::new(application, job, Some(caller.user())));
    }

    Ok(Json(DataResponse::new(views)))
}

pub async fn list_job_applications(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataResponse<Vec<ApplicationView>>>> {
    let job_id: JobId = id.parse()?;
    let role = authorize_action(&services, &caller, Action::ListJobApplications)?;

    let job = services
        .store
        .find_job(job_id)?
        .ok_or_else(|| ApiError::not_found(format!("Job with ID {job_id} not found")))?;
    authorize_owner(role.as_ref(), Action::ListJobApplications, job.employer, &caller)?;

    let applications = services.store.find_applications_by_job(job_id)?;
    let mut views = Vec::with_capacity(applications.len());
    for application in &applications {
        let candidate = services.store.find_user(application.candidate)?;
        views.push(ApplicationView::new(
            application,
            Some(JobSummary::new(&job, None)),
            candidate.as_ref(),
        ));
    }

    Ok(Json(DataResponse::new(views)))
}
