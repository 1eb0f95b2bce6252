//! Generic record handlers.
//!
//! Every resource gets the same list/create/get/replace/patch/delete
//! behaviour; what varies per type is its store, its write permission and its
//! JSON view.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::get,
};
use chrono::Utc;
use serde::Serialize;

use sitebook_auth::Permission;
use sitebook_core::id::Uuid;
use sitebook_core::{Creatable, Editable};
use sitebook_infra::store::RecordStore;
use sitebook_materials::{Material, MaterialRequirement, MaterialTransaction};
use sitebook_procurement::ProcurementOrder;
use sitebook_projects::Project;
use sitebook_resources::{Equipment, Staff};
use sitebook_tasks::Task;
use sitebook_usage::{EquipmentUsage, ManpowerUsage, MaterialUsage};

use crate::app::dto::{ListQuery, RecordView};
use crate::app::errors::{self, ApiError, ApiJson, ApiQuery};
use crate::app::routes::common::parse_uuid;
use crate::app::services::{AppServices, ChangeAction};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub trait CrudResource: RecordView {
    fn store(services: &AppServices) -> &Arc<dyn RecordStore<Self>>;

    fn write_permission() -> Permission {
        Permission::write(Self::RESOURCE)
    }
}

macro_rules! crud_resource {
    ($t:ty, $field:ident) => {
        impl CrudResource for $t {
            fn store(services: &AppServices) -> &Arc<dyn RecordStore<Self>> {
                &services.$field
            }
        }
    };
    ($t:ty, $field:ident, $perm:expr) => {
        impl CrudResource for $t {
            fn store(services: &AppServices) -> &Arc<dyn RecordStore<Self>> {
                &services.$field
            }

            fn write_permission() -> Permission {
                $perm
            }
        }
    };
}

crud_resource!(Project, projects);
crud_resource!(Staff, staff);
crud_resource!(Equipment, equipment);
crud_resource!(Material, materials);
crud_resource!(MaterialRequirement, requirements);
crud_resource!(ProcurementOrder, procurement);
crud_resource!(Task, tasks);
crud_resource!(MaterialTransaction, transactions);
crud_resource!(MaterialUsage, material_usage, Permission::usage_record());
crud_resource!(ManpowerUsage, manpower_usage, Permission::usage_record());
crud_resource!(EquipmentUsage, equipment_usage, Permission::usage_record());

/// Full CRUD.
pub fn editable<V: CrudResource + Editable>() -> Router {
    Router::new()
        .route("/", get(list::<V>).post(create::<V>))
        .route(
            "/:id",
            get(fetch::<V>)
                .put(replace::<V>)
                .patch(patch::<V>)
                .delete(delete::<V>),
        )
}

/// List, create and get; records are never changed once written.
pub fn append_only<V: CrudResource + Creatable>() -> Router {
    Router::new()
        .route("/", get(list::<V>).post(create::<V>))
        .route("/:id", get(fetch::<V>))
}

/// Append-only records that may still be removed.
pub fn removable<V: CrudResource + Creatable>() -> Router {
    Router::new()
        .route("/", get(list::<V>).post(create::<V>))
        .route("/:id", get(fetch::<V>).delete(delete::<V>))
}

#[derive(Serialize)]
struct Deleted {
    id: Uuid,
}

pub fn view<V: RecordView>(record: &V) -> Result<serde_json::Value, ApiError> {
    Ok(record.view(Utc::now().date_naive())?)
}

pub async fn load<V: CrudResource>(
    services: &AppServices,
    tenant: TenantContext,
    id: Uuid,
) -> Result<V, ApiError> {
    V::store(services)
        .get(tenant.tenant_id(), id)
        .await?
        .ok_or(ApiError::NotFound)
}

pub async fn list<V: CrudResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Response, ApiError> {
    let project = query.project_filter()?;
    let records = V::store(&services).list(tenant.tenant_id()).await?;

    let today = Utc::now().date_naive();
    let items = records
        .iter()
        .filter(|record| query.matches(*record, project))
        .map(|record| record.view(today))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(resource = V::RESOURCE, count = items.len(), "records listed");
    Ok(errors::ok(StatusCode::OK, items))
}

pub async fn fetch<V: CrudResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_uuid(&id)?;
    let record: V = load(&services, tenant, id).await?;
    Ok(errors::ok(StatusCode::OK, view(&record)?))
}

pub async fn create<V: CrudResource + Creatable>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    ApiJson(draft): ApiJson<V::Draft>,
) -> Result<Response, ApiError> {
    authz::require(&tenant, &principal, V::write_permission())?;

    let record = V::from_draft(Uuid::now_v7(), draft, Utc::now())?;
    let id = record.record_id();
    V::store(&services).insert(tenant.tenant_id(), record.clone()).await?;

    tracing::info!(resource = V::RESOURCE, id = %id, tenant_id = %tenant.tenant_id(), "record created");
    services.publish(tenant.tenant_id(), V::RESOURCE, id, ChangeAction::Created);
    Ok(errors::ok(StatusCode::CREATED, view(&record)?))
}

pub async fn replace<V: CrudResource + Editable>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(draft): ApiJson<V::Draft>,
) -> Result<Response, ApiError> {
    authz::require(&tenant, &principal, V::write_permission())?;
    let id = parse_uuid(&id)?;

    let mut record: V = load(&services, tenant, id).await?;
    record.replace(draft, Utc::now())?;
    save(&services, tenant, record).await
}

pub async fn patch<V: CrudResource + Editable>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<V::Patch>,
) -> Result<Response, ApiError> {
    authz::require(&tenant, &principal, V::write_permission())?;
    let id = parse_uuid(&id)?;

    let mut record: V = load(&services, tenant, id).await?;
    record.apply_patch(changes, Utc::now())?;
    save(&services, tenant, record).await
}

async fn save<V: CrudResource>(
    services: &AppServices,
    tenant: TenantContext,
    record: V,
) -> Result<Response, ApiError> {
    let id = record.record_id();
    V::store(services).update(tenant.tenant_id(), record.clone()).await?;

    tracing::info!(resource = V::RESOURCE, id = %id, tenant_id = %tenant.tenant_id(), "record updated");
    services.publish(tenant.tenant_id(), V::RESOURCE, id, ChangeAction::Updated);
    Ok(errors::ok(StatusCode::OK, view(&record)?))
}

pub async fn delete<V: CrudResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    authz::require(&tenant, &principal, V::write_permission())?;
    let id = parse_uuid(&id)?;

    if !V::store(&services).delete(tenant.tenant_id(), id).await? {
        return Err(ApiError::NotFound);
    }

    tracing::info!(resource = V::RESOURCE, id = %id, tenant_id = %tenant.tenant_id(), "record deleted");
    services.publish(tenant.tenant_id(), V::RESOURCE, id, ChangeAction::Deleted);
    Ok(errors::ok(StatusCode::OK, Deleted { id }))
}
