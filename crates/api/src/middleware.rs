use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use jobboard_auth::JwtValidator;
use jobboard_infra::{Store, UserStore};

use crate::app::errors::ApiError;
use crate::context::CallerContext;

const INVALID_CREDENTIALS: &str = "Missing or invalid credentials";

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub store: Arc<dyn Store>,
}

/// Resolve the bearer token to a stored, non-blocked user.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    let claims = state.jwt.validate(token, Utc::now()).map_err(|e| {
        tracing::debug!("rejected bearer token: {e}");
        ApiError::unauthorized(INVALID_CREDENTIALS)
    })?;

    let user = state
        .store
        .find_user(claims.id)?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    if user.blocked {
        tracing::warn!(user_id = %user.id, "blocked user presented a valid token");
        return Err(ApiError::unauthorized(
            "Your account has been blocked by an administrator",
        ));
    }

    req.extensions_mut().insert(CallerContext::new(user));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        map
    }

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer(&headers("Bearer   ")), None);
        assert_eq!(extract_bearer(&headers("Basic abc")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
