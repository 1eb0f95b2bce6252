//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store wiring and the realtime channel
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and the JSON views of records
//! - `errors.rs`: the response envelope and error mapping

use std::sync::Arc;

use axum::{Extension, Router, http::HeaderValue, routing::get};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use sitebook_auth::Hs256JwtValidator;
use sitebook_infra::config::AppConfig;
use sitebook_infra::store::StoreError;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid CORS origin `{0}`")]
    CorsOrigin(String),
}

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, BuildError> {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin {
        Some(origin) => {
            let value = origin
                .parse::<HeaderValue>()
                .map_err(|_| BuildError::CorsOrigin(origin.to_string()))?;
            Ok(cors.allow_origin(value))
        }
        None => Ok(cors.allow_origin(Any)),
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, BuildError> {
    let services = Arc::new(services::build_services(config).await?);
    build_app_with_services(config, services)
}

/// Router over already-wired stores; `database` in `config` is ignored.
pub fn build_app_with_services(
    config: &AppConfig,
    services: Arc<services::AppServices>,
) -> Result<Router, BuildError> {
    let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    // Protected routes: require auth + tenant context.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", protected)
        .fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config.cors_origin.as_deref())?),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origin_must_be_a_header_value() {
        assert!(cors_layer(None).is_ok());
        assert!(cors_layer(Some("http://localhost:5173")).is_ok());
        assert!(matches!(
            cors_layer(Some("bad\norigin")),
            Err(BuildError::CorsOrigin(_))
        ));
    }
}
