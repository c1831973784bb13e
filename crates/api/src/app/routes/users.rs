use std::sync::Arc;

use axum::{Json, extract::Extension};

use jobboard_auth::Action;

use crate::app::dto::UserView;
use crate::app::errors::ApiResult;
use crate::app::services::AppServices;
use crate::authz::authorize_action;
use crate::context::CallerContext;

/// Sanitized profile of the caller (no `data` wrapper).
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> ApiResult<Json<UserView>> {
    let role = authorize_action(&services, &caller, Action::ViewOwnProfile)?;
    Ok(Json(UserView::new(caller.user(), role.as_ref())))
}
