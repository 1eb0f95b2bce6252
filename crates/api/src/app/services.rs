use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use sitebook_core::TenantId;
use sitebook_core::id::Uuid;
use sitebook_infra::config::AppConfig;
use sitebook_infra::db;
use sitebook_infra::store::{
    InMemoryBackend, PostgresBackend, RecordStore, StoreBackend, StoreError,
};
use sitebook_infra::usage_recorder::UsageStores;
use sitebook_materials::{Material, MaterialRequirement, MaterialTransaction};
use sitebook_procurement::ProcurementOrder;
use sitebook_projects::Project;
use sitebook_resources::{Equipment, Staff};
use sitebook_tasks::Task;
use sitebook_usage::{EquipmentUsage, ManpowerUsage, MaterialUsage};

const REALTIME_CAPACITY: usize = 1024;

/// Realtime message broadcast via SSE.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeMessage {
    pub tenant_id: TenantId,
    pub topic: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// Every record store plus the realtime channel, shared by all handlers.
pub struct AppServices {
    pub projects: Arc<dyn RecordStore<Project>>,
    pub staff: Arc<dyn RecordStore<Staff>>,
    pub equipment: Arc<dyn RecordStore<Equipment>>,
    pub materials: Arc<dyn RecordStore<Material>>,
    pub requirements: Arc<dyn RecordStore<MaterialRequirement>>,
    pub procurement: Arc<dyn RecordStore<ProcurementOrder>>,
    pub tasks: Arc<dyn RecordStore<Task>>,
    pub transactions: Arc<dyn RecordStore<MaterialTransaction>>,
    pub material_usage: Arc<dyn RecordStore<MaterialUsage>>,
    pub manpower_usage: Arc<dyn RecordStore<ManpowerUsage>>,
    pub equipment_usage: Arc<dyn RecordStore<EquipmentUsage>>,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl AppServices {
    pub fn new(backend: &impl StoreBackend) -> Self {
        let (realtime_tx, _) = broadcast::channel(REALTIME_CAPACITY);
        Self {
            projects: backend.store(),
            staff: backend.store(),
            equipment: backend.store(),
            materials: backend.store(),
            requirements: backend.store(),
            procurement: backend.store(),
            tasks: backend.store(),
            transactions: backend.store(),
            material_usage: backend.store(),
            manpower_usage: backend.store(),
            equipment_usage: backend.store(),
            realtime_tx,
        }
    }

    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }

    pub fn usage_stores(&self) -> UsageStores {
        UsageStores {
            materials: self.material_usage.clone(),
            manpower: self.manpower_usage.clone(),
            equipment: self.equipment_usage.clone(),
        }
    }

    /// Announce a record change to the tenant's stream subscribers.
    ///
    /// Lossy: with no subscriber the message is dropped.
    pub fn publish(&self, tenant_id: TenantId, resource: &str, id: Uuid, action: ChangeAction) {
        let _ = self.realtime_tx.send(RealtimeMessage {
            tenant_id,
            topic: "records.changed".to_string(),
            payload: serde_json::json!({
                "resource": resource,
                "id": id,
                "action": action,
            }),
        });
    }
}

/// Wire the stores selected by configuration.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    match &config.database {
        Some(database) => {
            let pool = db::connect(database).await?;
            tracing::info!("using postgres record stores");
            Ok(AppServices::new(&PostgresBackend::new(pool)))
        }
        None => {
            tracing::info!("using in-memory record stores");
            Ok(AppServices::new(&InMemoryBackend))
        }
    }
}

pub fn tenant_sse_stream(
    services: Arc<AppServices>,
    tenant_id: TenantId,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(m) if m.tenant_id == tenant_id => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
