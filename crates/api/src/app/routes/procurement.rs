use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::post,
};
use chrono::Utc;

use sitebook_auth::Permission;
use sitebook_core::Record;
use sitebook_infra::receiving::receive_order;
use sitebook_materials::MaterialTransaction;
use sitebook_procurement::ProcurementOrder;

use crate::app::errors::{self, ApiError};
use crate::app::routes::{common::parse_uuid, crud};
use crate::app::services::{AppServices, ChangeAction};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    crud::editable::<ProcurementOrder>().route("/:id/receive", post(receive))
}

/// POST /api/procurement/:id/receive
///
/// 409 when the order was already received.
pub async fn receive(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    authz::require(&tenant, &principal, Permission::procurement_receive())?;
    let id = parse_uuid(&id)?;

    let received = receive_order(
        services.procurement.as_ref(),
        services.transactions.as_ref(),
        tenant.tenant_id(),
        id,
        Utc::now(),
    )
    .await?;

    let tenant_id = tenant.tenant_id();
    services.publish(tenant_id, ProcurementOrder::RESOURCE, id, ChangeAction::Updated);
    services.publish(
        tenant_id,
        MaterialTransaction::RESOURCE,
        received.transaction.record_id(),
        ChangeAction::Created,
    );

    Ok(errors::ok(
        StatusCode::OK,
        serde_json::json!({
            "order": crud::view(&received.order)?,
            "transaction": crud::view(&received.transaction)?,
        }),
    ))
}
