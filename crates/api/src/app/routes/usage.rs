//! Daily usage: the per-category usage records and the one-day batch
//! submission that writes them.

use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    http::StatusCode,
    response::Response,
};
use chrono::Utc;

use sitebook_auth::Permission;
use sitebook_core::Record;
use sitebook_infra::usage_recorder::record_daily_usage;
use sitebook_usage::{
    DailyUsageSubmission, EquipmentUsage, ManpowerUsage, MaterialUsage, UsageCategory,
};

use crate::app::errors::{self, ApiError, ApiJson};
use crate::app::routes::crud;
use crate::app::services::{AppServices, ChangeAction};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

/// Category stores, mounted under `/api/usage`.
pub fn router() -> Router {
    Router::new()
        .nest("/materials", crud::removable::<MaterialUsage>())
        .nest("/manpower", crud::removable::<ManpowerUsage>())
        .nest("/equipment", crud::removable::<EquipmentUsage>())
}

fn resource(category: UsageCategory) -> &'static str {
    match category {
        UsageCategory::Materials => MaterialUsage::RESOURCE,
        UsageCategory::Manpower => ManpowerUsage::RESOURCE,
        UsageCategory::Equipment => EquipmentUsage::RESOURCE,
    }
}

/// POST /api/daily-usage
///
/// Lines missing their reference or amount are skipped. Every other line is
/// written on its own; if any write fails the response is a single 500 with
/// the failure count, and the lines that did succeed stay written.
pub async fn record_daily(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(submission): ApiJson<DailyUsageSubmission>,
) -> Result<Response, ApiError> {
    authz::require(&tenant, &principal, Permission::usage_record())?;

    let tenant_id = tenant.tenant_id();
    let report = record_daily_usage(
        &services.usage_stores(),
        tenant_id,
        submission.plan(),
        Utc::now(),
    )
    .await;

    for written in &report.records {
        services.publish(tenant_id, resource(written.category), written.id, ChangeAction::Created);
    }

    if report.has_failures() {
        let failed = report.failed.total();
        let attempted = failed + report.written.total();
        return Err(ApiError::Internal(format!("{failed} of {attempted} usage writes failed")));
    }

    Ok(errors::ok(StatusCode::CREATED, report))
}
