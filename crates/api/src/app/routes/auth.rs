use std::sync::Arc;

use axum::{Json, extract::Extension, extract::rejection::JsonRejection};
use chrono::Utc;

use jobboard_auth::{
    LOCAL_PROVIDER, LoginCredentials, NewUser, PasswordHasher, RegisterUser, TokenIssuer,
};
use jobboard_infra::{RoleStore, UserStore};

use crate::app::dto::{AuthResponse, LoginRequest, RegisterRequest, UserView};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;

const INVALID_LOGIN: &str = "Invalid identifier or password";

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(body) = payload?;
    let cmd = RegisterUser::validate(
        body.username,
        body.email,
        body.password,
        body.profile,
        body.role,
    )?;

    if services.store.find_user_by_username(&cmd.username)?.is_some() {
        return Err(ApiError::bad_request("Username is already taken"));
    }
    if services.store.find_user_by_email(&cmd.email)?.is_some() {
        return Err(ApiError::bad_request("Email is already registered"));
    }

    let role_type = cmd.role.role_type();
    let role = services
        .store
        .find_role_by_type(&role_type)?
        .ok_or_else(|| ApiError::bad_request(format!("Role \"{}\" not found", role_type.as_str())))?;

    let password_hash = hash_password(services.passwords.clone(), cmd.password).await?;

    // The store re-checks uniqueness under its write lock.
    let user = services.store.create_user(NewUser {
        username: cmd.username,
        email: cmd.email,
        password_hash,
        profile: cmd.profile,
        role: role.id,
        provider: LOCAL_PROVIDER.to_string(),
        confirmed: false,
        blocked: false,
    })?;

    let jwt = services.tokens.issue(user.id, Utc::now())?;
    tracing::info!(user_id = %user.id, role = role_type.as_str(), "user registered");

    Ok(Json(AuthResponse {
        jwt,
        user: UserView::new(&user, Some(&role)),
    }))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(body) = payload?;
    let creds = LoginCredentials::validate(body.identifier, body.password)?;

    let Some(user) = services.store.find_user_by_identifier(&creds.identifier)? else {
        tracing::debug!("login for unknown identifier");
        return Err(ApiError::bad_request(INVALID_LOGIN));
    };

    if !verify_password(services.passwords.clone(), creds.password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "login with wrong password");
        return Err(ApiError::bad_request(INVALID_LOGIN));
    }

    if user.blocked {
        tracing::warn!(user_id = %user.id, "blocked user attempted login");
        return Err(ApiError::bad_request(
            "Your account has been blocked by an administrator",
        ));
    }

    let role = services.roles.resolve(&*services.store, user.role)?;
    let jwt = services.tokens.issue(user.id, Utc::now())?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse {
        jwt,
        user: UserView::new(&user, role.as_ref()),
    }))
}

// Argon2 is CPU-bound; keep it off the async workers.
async fn hash_password(hasher: PasswordHasher, password: String) -> ApiResult<String> {
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))??;
    Ok(hash)
}

async fn verify_password(hasher: PasswordHasher, password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))
}
