//! Materials: master CRUD plus the per-material stock ledger.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
};

use sitebook_materials::{Material, MaterialLedger, TransactionFilter, ledger_for};

use crate::app::errors::{self, ApiError, ApiQuery};
use crate::app::routes::{common::parse_uuid, crud};
use crate::app::services::AppServices;
use crate::context::TenantContext;

pub fn router() -> Router {
    crud::editable::<Material>()
        .route("/:id/transactions", get(material_transactions))
        .route("/:id/stock", get(material_stock))
}

async fn ledger(
    services: &AppServices,
    tenant: TenantContext,
    raw_id: &str,
    filter: &TransactionFilter,
) -> Result<MaterialLedger, ApiError> {
    let id = parse_uuid(raw_id)?;
    let material: Material = crud::load(services, tenant, id).await?;
    let transactions = services.transactions.list(tenant.tenant_id()).await?;
    Ok(ledger_for(material.id, transactions, filter))
}

/// GET /api/materials/:id/transactions?type=&from=&to=
pub async fn material_transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
    ApiQuery(filter): ApiQuery<TransactionFilter>,
) -> Result<Response, ApiError> {
    let ledger = ledger(&services, tenant, &id, &filter).await?;
    Ok(errors::ok(StatusCode::OK, ledger))
}

/// GET /api/materials/:id/stock
///
/// On-hand quantity and value over the unfiltered ledger.
pub async fn material_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let ledger = ledger(&services, tenant, &id, &TransactionFilter::default()).await?;
    Ok(errors::ok(StatusCode::OK, ledger.summary))
}
