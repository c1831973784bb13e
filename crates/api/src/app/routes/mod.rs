use axum::{
    Router,
    routing::{get, post},
};

pub mod applications;
pub mod auth;
pub mod jobs;
pub mod system;
pub mod users;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/api/auth/local", post(auth::login))
        .route("/api/auth/local/register", post(auth::register))
        .route("/auth/local/register", post(auth::register))
}

/// Endpoints that require an authenticated caller.
pub fn protected_router() -> Router {
    Router::new()
        .route("/api/users/me", get(users::me))
        .nest("/api/jobs", jobs::router())
        .nest("/api/applications", applications::router())
}
