//! Startup bootstrap: ensure the Employer role exists and seed role grants.
//!
//! Safe to run on every start. Failures are logged and never abort startup.

use anyhow::Context;

use jobboard_auth::permissions::{CANDIDATE_GRANTS, EMPLOYER_GRANTS};
use jobboard_auth::{NewPermissionGrant, NewRole, Permission, RoleRecord, RoleType};

use crate::store::Store;

/// What a bootstrap run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub employer_role_created: bool,
    pub grants_created: usize,
}

/// Run the bootstrap routine. Returns `None` when it could not complete.
pub fn run<S>(store: &S) -> Option<BootstrapReport>
where
    S: Store + ?Sized,
{
    match try_run(store) {
        Ok(Some(report)) => {
            tracing::info!(
                employer_role_created = report.employer_role_created,
                grants_created = report.grants_created,
                "bootstrap completed"
            );
            Some(report)
        }
        Ok(None) => None,
        Err(err) => {
            tracing::error!("bootstrap failed: {err:#}");
            None
        }
    }
}

fn try_run<S>(store: &S) -> anyhow::Result<Option<BootstrapReport>>
where
    S: Store + ?Sized,
{
    let Some(authenticated) = store
        .find_role_by_type(&RoleType::AUTHENTICATED)
        .context("looking up authenticated role")?
    else {
        tracing::error!("authenticated role not found; skipping bootstrap");
        return Ok(None);
    };

    let mut report = BootstrapReport::default();

    let employer = match store
        .find_role_by_type(&RoleType::EMPLOYER)
        .context("looking up employer role")?
    {
        Some(role) => role,
        None => {
            let role = store
                .create_role(NewRole {
                    name: "Employer".to_string(),
                    role_type: RoleType::EMPLOYER,
                    description: Some("Can create and manage job postings".to_string()),
                })
                .context("creating employer role")?;
            tracing::info!(role_id = %role.id, "created employer role");
            report.employer_role_created = true;
            role
        }
    };

    report.grants_created += grant_all(store, &authenticated, CANDIDATE_GRANTS)?;
    report.grants_created += grant_all(store, &employer, EMPLOYER_GRANTS)?;

    Ok(Some(report))
}

fn grant_all<S>(store: &S, role: &RoleRecord, actions: &[Permission]) -> anyhow::Result<usize>
where
    S: Store + ?Sized,
{
    let mut created = 0;
    for action in actions {
        if store.find_grant(role.id, action)?.is_some() {
            continue;
        }
        store
            .create_grant(NewPermissionGrant {
                action: action.clone(),
                role: role.id,
                enabled: true,
            })
            .with_context(|| format!("granting {action} to {}", role.role_type.as_str()))?;
        tracing::info!(role = role.role_type.as_str(), %action, "granted permission");
        created += 1;
    }
    Ok(created)
}
