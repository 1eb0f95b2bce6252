use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Response, sse::Event as SseEvent},
};
use serde_json::json;

use crate::app::errors::{self, ApiError};
use crate::app::services::{self, AppServices};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub async fn health() -> Response {
    errors::ok(StatusCode::OK, json!({ "status": "ok" }))
}

pub async fn whoami(
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    let membership = authz::membership(&tenant, &principal);
    errors::ok(
        StatusCode::OK,
        json!({
            "tenant_id": tenant.tenant_id().to_string(),
            "user_id": principal.user_id().to_string(),
            "roles": membership.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            "permissions": membership.permissions.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
        }),
    )
}

pub async fn stream(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
) -> axum::response::Sse<impl tokio_stream::Stream<Item = Result<SseEvent, std::convert::Infallible>>> {
    services::tenant_sse_stream(services, tenant.tenant_id())
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
