//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, role resolver, token service, password hasher
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and sanitized views
//! - `errors.rs`: the shared error envelope

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: ApiConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(&config).await?);
    Ok(build_app_with(services, &config))
}

/// Build the router over already-constructed services.
pub fn build_app_with(services: Arc<services::AppServices>, config: &ApiConfig) -> Router {
    let auth_state = middleware::AuthState {
        jwt: services.tokens.clone(),
        store: services.store.clone(),
    };

    // Protected routes: require a valid token for a non-blocked user.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(config.max_body_size)),
        )
}
