//! API-side authorization guard.
//!
//! Every protected handler calls [`authorize_action`] before touching the
//! store, then [`authorize_owner`] once the targeted job is loaded.

use jobboard_auth::{Action, Ownership, RoleKind, RoleRecord, authorize, require_grant};
use jobboard_core::UserId;
use jobboard_infra::PermissionStore;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CallerContext;

/// Role gate plus permission grant check for `action`.
///
/// Returns the caller's role so handlers can branch on it (candidates only
/// see published jobs) and pass the kind to [`authorize_owner`].
pub fn authorize_action(
    services: &AppServices,
    caller: &CallerContext,
    action: Action,
) -> Result<Option<RoleRecord>, ApiError> {
    let role = services.roles.resolve(&*services.store, caller.role_id())?;
    let kind = role_kind(role.as_ref());

    if let Err(e) = authorize(kind, action, Ownership::Unchecked) {
        tracing::debug!(user_id = %caller.user_id(), ?action, "role gate denied: {e}");
        return Err(e.into());
    }

    let granted = match &role {
        Some(role) => services
            .store
            .find_grant(role.id, &action.permission())?
            .is_some_and(|g| g.enabled),
        None => false,
    };
    if let Err(e) = require_grant(action, granted) {
        tracing::warn!(
            user_id = %caller.user_id(),
            permission = %action.permission(),
            "missing permission grant"
        );
        return Err(e.into());
    }

    Ok(role)
}

/// Ownership check for actions restricted to the job's employer.
pub fn authorize_owner(
    role: Option<&RoleRecord>,
    action: Action,
    owner: UserId,
    caller: &CallerContext,
) -> Result<(), ApiError> {
    authorize(role_kind(role), action, Ownership::of(owner, caller.user_id())).map_err(|e| {
        tracing::debug!(user_id = %caller.user_id(), ?action, "ownership check denied: {e}");
        e.into()
    })
}

pub fn role_kind(role: Option<&RoleRecord>) -> RoleKind {
    role.map(RoleRecord::kind).unwrap_or(RoleKind::Other)
}
