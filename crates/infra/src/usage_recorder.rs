//! Daily usage recorder.
//!
//! Issues the writes of a [`DailyUsagePlan`] one at a time, in plan order. A
//! failed write is logged and counted; it neither undoes earlier writes nor
//! stops later ones.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use sitebook_core::id::Uuid;
use sitebook_core::{Creatable, TenantId};
use sitebook_usage::{
    CategoryCounts, DailyUsagePlan, EquipmentUsage, ManpowerUsage, MaterialUsage, UsageCategory,
    UsageWrite,
};

use crate::store::RecordStore;

/// The three category stores a recorder writes to.
#[derive(Clone)]
pub struct UsageStores {
    pub materials: Arc<dyn RecordStore<MaterialUsage>>,
    pub manpower: Arc<dyn RecordStore<ManpowerUsage>>,
    pub equipment: Arc<dyn RecordStore<EquipmentUsage>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WrittenRecord {
    pub category: UsageCategory,
    pub id: Uuid,
}

/// Outcome of recording one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyUsageReport {
    pub written: CategoryCounts,
    pub skipped: CategoryCounts,
    pub failed: CategoryCounts,
    /// Records that were written, in write order.
    pub records: Vec<WrittenRecord>,
}

impl DailyUsageReport {
    pub fn has_failures(&self) -> bool {
        self.failed.total() > 0
    }
}

async fn write_one(
    stores: &UsageStores,
    tenant_id: TenantId,
    write: UsageWrite,
    now: DateTime<Utc>,
) -> Result<Uuid, String> {
    let id = Uuid::now_v7();
    let stored = match write {
        UsageWrite::Material(draft) => {
            let record = MaterialUsage::from_draft(id, draft, now).map_err(|e| e.to_string())?;
            stores.materials.insert(tenant_id, record).await
        }
        UsageWrite::Manpower(draft) => {
            let record = ManpowerUsage::from_draft(id, draft, now).map_err(|e| e.to_string())?;
            stores.manpower.insert(tenant_id, record).await
        }
        UsageWrite::Equipment(draft) => {
            let record = EquipmentUsage::from_draft(id, draft, now).map_err(|e| e.to_string())?;
            stores.equipment.insert(tenant_id, record).await
        }
    };
    stored.map_err(|e| e.to_string())?;
    Ok(id)
}

pub async fn record_daily_usage(
    stores: &UsageStores,
    tenant_id: TenantId,
    plan: DailyUsagePlan,
    now: DateTime<Utc>,
) -> DailyUsageReport {
    let mut report = DailyUsageReport {
        skipped: plan.skipped,
        ..DailyUsageReport::default()
    };

    for write in plan.writes {
        let category = write.category();
        match write_one(stores, tenant_id, write, now).await {
            Ok(id) => {
                report.written.bump(category);
                report.records.push(WrittenRecord { category, id });
            }
            Err(e) => {
                tracing::warn!(tenant_id = %tenant_id, ?category, "usage write failed: {e}");
                report.failed.bump(category);
            }
        }
    }

    tracing::info!(
        tenant_id = %tenant_id,
        written = report.written.total(),
        skipped = report.skipped.total(),
        failed = report.failed.total(),
        "daily usage recorded"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryRecordStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use serde_json::json;
    use sitebook_materials::MaterialId;
    use sitebook_projects::ProjectId;
    use sitebook_resources::{EquipmentId, StaffId};
    use sitebook_usage::DailyUsageSubmission;

    /// Store that rejects every write.
    struct FailingStore;

    #[async_trait]
    impl<V: sitebook_core::Record> RecordStore<V> for FailingStore {
        async fn get(&self, _: TenantId, _: Uuid) -> StoreResult<Option<V>> {
            Ok(None)
        }
        async fn list(&self, _: TenantId) -> StoreResult<Vec<V>> {
            Ok(Vec::new())
        }
        async fn insert(&self, _: TenantId, _: V) -> StoreResult<()> {
            Err(StoreError::Backend("disk full".into()))
        }
        async fn update(&self, _: TenantId, _: V) -> StoreResult<()> {
            Err(StoreError::Backend("disk full".into()))
        }
        async fn update_if(
            &self,
            _: TenantId,
            _: V,
            _: &(dyn for<'a> Fn(&'a V) -> bool + Send + Sync),
        ) -> StoreResult<bool> {
            Err(StoreError::Backend("disk full".into()))
        }
        async fn delete(&self, _: TenantId, _: Uuid) -> StoreResult<bool> {
            Ok(false)
        }
    }

    fn in_memory() -> (UsageStores, Arc<InMemoryRecordStore<MaterialUsage>>) {
        let materials = Arc::new(InMemoryRecordStore::new());
        let stores = UsageStores {
            materials: materials.clone(),
            manpower: Arc::new(InMemoryRecordStore::new()),
            equipment: Arc::new(InMemoryRecordStore::new()),
        };
        (stores, materials)
    }

    fn plan() -> DailyUsagePlan {
        let submission: DailyUsageSubmission = serde_json::from_value(json!({
            "project_id": ProjectId::new(),
            "date": "2024-05-02",
            "materials": [
                { "quantity": 5 },
                { "material_id": MaterialId::new(), "quantity": 12 },
            ],
            "manpower": [{ "staff_id": StaffId::new(), "hours": 8 }],
            "equipment": [{ "equipment_id": EquipmentId::new(), "hours": 3 }],
        }))
        .unwrap();
        submission.plan()
    }

    #[tokio::test]
    async fn skipped_lines_are_not_written() {
        let (stores, materials) = in_memory();
        let tenant = TenantId::new();

        let report = record_daily_usage(&stores, tenant, plan(), Utc::now()).await;

        assert!(!report.has_failures());
        assert_eq!(report.skipped.materials, 1);
        assert_eq!(report.written, CategoryCounts { materials: 1, manpower: 1, equipment: 1 });
        let categories: Vec<UsageCategory> = report.records.iter().map(|r| r.category).collect();
        assert_eq!(
            categories,
            [UsageCategory::Materials, UsageCategory::Manpower, UsageCategory::Equipment]
        );

        let written = materials.list(tenant).await.unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].quantity, 12.0);
    }

    #[tokio::test]
    async fn failed_write_does_not_stop_later_writes() {
        let (mut stores, _) = in_memory();
        stores.manpower = Arc::new(FailingStore);
        let equipment = Arc::new(InMemoryRecordStore::<EquipmentUsage>::new());
        stores.equipment = equipment.clone();
        let tenant = TenantId::new();

        let report = record_daily_usage(&stores, tenant, plan(), Utc::now()).await;

        assert!(report.has_failures());
        assert_eq!(report.failed, CategoryCounts { materials: 0, manpower: 1, equipment: 0 });
        assert_eq!(report.written.materials, 1);
        assert_eq!(report.written.equipment, 1);
        assert_eq!(equipment.list(tenant).await.unwrap().len(), 1);
    }
}
